//! Spreadsheet rendition of the availability grid: the same table as the CSV,
//! placed below a label row on a dark background.

use crate::{
    constants::{
        COVERAGE_HEADER, EXCEL_BODY_FILL, EXCEL_GRID_LABEL, EXCEL_HEADER_FILL, EXCEL_HEADER_ROW,
        EXCEL_KEY_FONT, EXCEL_LABEL_ROW, EXCEL_PARAMS_LABEL, EXCEL_VALUE_FONT, HOTEL_ID_HEADER,
    },
    error::{AvailabilityError, Result},
    grid::AvailabilityGrid,
};
use log::info;
use rust_xlsxwriter::{Color, ColNum, Format, FormatPattern, RowNum, Workbook};
use std::path::{Path, PathBuf};

/// Columns holding `hotel_id` and `coverage`, rendered in the key font.
const KEY_COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Text(String),
    Number(f64),
    Blank,
}

/// Header plus one row per hotel, in grid order. Missing counts are blank.
pub fn sheet_rows(grid: &AvailabilityGrid) -> Vec<Vec<SheetCell>> {
    let mut header = vec![
        SheetCell::Text(HOTEL_ID_HEADER.to_string()),
        SheetCell::Text(COVERAGE_HEADER.to_string()),
    ];
    header.extend(grid.dates.iter().map(|d| SheetCell::Text(d.clone())));

    let mut rows = Vec::with_capacity(grid.rows.len() + 1);
    rows.push(header);
    for row in &grid.rows {
        let mut cells = Vec::with_capacity(grid.dates.len() + KEY_COLUMNS);
        cells.push(SheetCell::Text(row.hotel_id.clone()));
        cells.push(SheetCell::Number(row.coverage));
        cells.extend(row.cells.iter().map(|c| match c {
            Some(v) => SheetCell::Number(*v as f64),
            None => SheetCell::Blank,
        }));
        rows.push(cells);
    }
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellStyle {
    BodyKey,
    BodyValue,
    HeaderKey,
    HeaderValue,
}

impl CellStyle {
    fn at(row: usize, col: usize) -> Self {
        match (row == EXCEL_HEADER_ROW as usize, col < KEY_COLUMNS) {
            (true, true) => Self::HeaderKey,
            (true, false) => Self::HeaderValue,
            (false, true) => Self::BodyKey,
            (false, false) => Self::BodyValue,
        }
    }
}

struct SheetFormats {
    body_key: Format,
    body_value: Format,
    header_key: Format,
    header_value: Format,
}

impl SheetFormats {
    fn new() -> Self {
        let fill = |rgb: u32, font: u32| {
            Format::new()
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(rgb))
                .set_font_color(Color::RGB(font))
        };
        Self {
            body_key: fill(EXCEL_BODY_FILL, EXCEL_KEY_FONT),
            body_value: fill(EXCEL_BODY_FILL, EXCEL_VALUE_FONT),
            header_key: fill(EXCEL_HEADER_FILL, EXCEL_KEY_FONT),
            header_value: fill(EXCEL_HEADER_FILL, EXCEL_VALUE_FONT),
        }
    }

    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::BodyKey => &self.body_key,
            CellStyle::BodyValue => &self.body_value,
            CellStyle::HeaderKey => &self.header_key,
            CellStyle::HeaderValue => &self.header_value,
        }
    }
}

/// Write the grid as an `.xlsx` workbook. Every cell of the used range is
/// filled, so blanks carry the background too.
pub fn write_excel(grid: &AvailabilityGrid, path: &Path) -> Result<PathBuf> {
    let table = sheet_rows(grid);
    let header_row = EXCEL_HEADER_ROW as usize;
    let total_rows = header_row + table.len();
    // the label row reaches column C even when there are no dates
    let total_cols = table.first().map_or(0, Vec::len).max(KEY_COLUMNS + 1);

    let too_large = || AvailabilityError::SheetTooLarge {
        rows: total_rows,
        cols: total_cols,
    };
    RowNum::try_from(total_rows).map_err(|_| too_large())?;
    ColNum::try_from(total_cols).map_err(|_| too_large())?;

    let formats = SheetFormats::new();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for r in 0..total_rows {
        for c in 0..total_cols {
            // bounds checked above
            let (row, col) = (r as RowNum, c as ColNum);
            let format = formats.get(CellStyle::at(r, c));

            let label = match (r == EXCEL_LABEL_ROW as usize, c) {
                (true, 1) => Some(EXCEL_PARAMS_LABEL),
                (true, 2) => Some(EXCEL_GRID_LABEL),
                _ => None,
            };
            let cell = r
                .checked_sub(header_row)
                .and_then(|t| table.get(t))
                .and_then(|cells| cells.get(c));

            match (label, cell) {
                (Some(text), _) => {
                    worksheet.write_string_with_format(row, col, text, format)?;
                }
                (None, Some(SheetCell::Text(text))) => {
                    worksheet.write_string_with_format(row, col, text.as_str(), format)?;
                }
                (None, Some(SheetCell::Number(n))) => {
                    worksheet.write_number_with_format(row, col, *n, format)?;
                }
                (None, Some(SheetCell::Blank) | None) => {
                    worksheet.write_blank(row, col, format)?;
                }
            }
        }
    }

    crate::export::ensure_parent_dir(path)?;
    workbook.save(path)?;
    info!("Wrote Excel grid to {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridRow;
    use tempfile::TempDir;

    fn grid() -> AvailabilityGrid {
        AvailabilityGrid {
            dates: vec!["2026-08-30".into(), "2026-08-31".into()],
            rows: vec![
                GridRow {
                    hotel_id: "H1".into(),
                    coverage: 0.5,
                    cells: vec![Some(2), Some(0)],
                },
                GridRow {
                    hotel_id: "H2".into(),
                    coverage: 0.0,
                    cells: vec![None, None],
                },
            ],
        }
    }

    #[test]
    fn test_sheet_rows_match_csv_table() {
        let rows = sheet_rows(&grid());
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            vec![
                SheetCell::Text("hotel_id".into()),
                SheetCell::Text("coverage".into()),
                SheetCell::Text("2026-08-30".into()),
                SheetCell::Text("2026-08-31".into()),
            ]
        );
        assert_eq!(
            rows[1],
            vec![
                SheetCell::Text("H1".into()),
                SheetCell::Number(0.5),
                SheetCell::Number(2.0),
                SheetCell::Number(0.0),
            ]
        );
        assert_eq!(rows[2][2], SheetCell::Blank);
    }

    #[test]
    fn test_header_row_styles() {
        let header = EXCEL_HEADER_ROW as usize;
        assert_eq!(CellStyle::at(header, 0), CellStyle::HeaderKey);
        assert_eq!(CellStyle::at(header, 1), CellStyle::HeaderKey);
        assert_eq!(CellStyle::at(header, 2), CellStyle::HeaderValue);
        assert_eq!(CellStyle::at(EXCEL_LABEL_ROW as usize, 1), CellStyle::BodyKey);
        assert_eq!(CellStyle::at(header + 1, 5), CellStyle::BodyValue);
    }

    #[test]
    fn test_write_excel_creates_workbook() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("grid.xlsx");

        let written = write_excel(&grid(), &path).unwrap();
        assert_eq!(written, path);

        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_write_excel_without_dates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("grid.xlsx");
        let g = AvailabilityGrid {
            dates: Vec::new(),
            rows: vec![GridRow {
                hotel_id: "H1".into(),
                coverage: 0.0,
                cells: Vec::new(),
            }],
        };

        write_excel(&g, &path).unwrap();
        assert!(path.exists());
    }
}
