use crate::{
    constants::{COVERAGE_HEADER, HOTEL_ID_HEADER},
    error::{AvailabilityError, Result},
    grid::{AvailabilityGrid, GridRow},
};

use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| AvailabilityError::OpenFile {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads hotel IDs from one column of a CSV file
///
/// # Arguments
/// * `path` - CSV file with a header row
/// * `column` - Header of the ID column; the first column when `None`
///
/// # Errors
/// Returns error if the file cannot be read, has no header, lacks the
/// column, or yields no IDs at all
pub fn read_hotel_ids<P: AsRef<Path>>(path: P, column: Option<&str>) -> Result<Vec<String>> {
    let path = path.as_ref();
    read_hotel_ids_from_reader(open(path)?, column).map_err(|e| match e {
        AvailabilityError::EmptyCsv(_) => AvailabilityError::EmptyCsv(path.to_path_buf()),
        other => other,
    })
}

pub fn read_hotel_ids_from_reader<R: Read>(reader: R, column: Option<&str>) -> Result<Vec<String>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = clean_headers(rdr.headers()?);
    if headers.iter().all(|h| h.is_empty()) {
        return Err(AvailabilityError::EmptyCsv(Default::default()));
    }

    let target = column.unwrap_or(headers[0].as_str()).to_string();
    let index = headers
        .iter()
        .position(|h| *h == target)
        .ok_or_else(|| AvailabilityError::MissingColumn {
            column: target.clone(),
            available: headers.join(", "),
        })?;

    let mut hotel_ids = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        if let Some(id) = rec.get(index).map(str::trim).filter(|s| !s.is_empty()) {
            hotel_ids.push(id.to_string());
        }
    }

    if hotel_ids.is_empty() {
        return Err(AvailabilityError::NoHotelIds(target));
    }
    Ok(hotel_ids)
}

/// Reads a previously written availability CSV back into a grid.
///
/// Every header other than `hotel_id` and `coverage` is a date column.
/// Cells that are blank or not a non-negative number read back as missing.
pub fn read_availability_csv<P: AsRef<Path>>(path: P) -> Result<AvailabilityGrid> {
    read_availability_from_reader(open(path.as_ref())?)
}

pub fn read_availability_from_reader<R: Read>(reader: R) -> Result<AvailabilityGrid> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = clean_headers(rdr.headers()?);
    let id_col = headers.iter().position(|h| h.eq_ignore_ascii_case(HOTEL_ID_HEADER));
    let coverage_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(COVERAGE_HEADER));

    let date_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !h.is_empty() && Some(*i) != id_col && Some(*i) != coverage_col)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let Some(id_col) = id_col else {
        return Ok(AvailabilityGrid::default());
    };

    let mut grid = AvailabilityGrid {
        dates: date_cols.iter().map(|(_, d)| d.clone()).collect(),
        rows: Vec::new(),
    };

    for result in rdr.records() {
        let rec = result?;
        let Some(hotel_id) = rec.get(id_col).filter(|s| !s.is_empty()) else {
            continue;
        };
        let coverage = coverage_col
            .and_then(|c| rec.get(c))
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        let cells = date_cols.iter().map(|(i, _)| parse_cell(&rec, *i)).collect();

        grid.rows.push(GridRow {
            hotel_id: hotel_id.to_string(),
            coverage,
            cells,
        });
    }

    Ok(grid)
}

fn parse_cell(rec: &StringRecord, index: usize) -> Option<u64> {
    let raw = rec.get(index)?;
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f.trunc() as u64)
}

fn clean_headers(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches(UTF8_BOM) } else { h };
            h.trim().to_string()
        })
        .collect()
}
