use crate::{
    constants::{COVERAGE_HEADER, DEFAULT_PNG_SIZE, HOTEL_ID_HEADER},
    error::{AvailabilityError, Result},
    excel,
    grid::{AvailabilityGrid, build_grid},
    heatmap,
    normalize::HotelAvailability,
};
use csv::WriterBuilder;
use log::info;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Which artifacts to produce and where.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub csv_path: Option<PathBuf>,
    pub excel_path: Option<PathBuf>,
    pub png_path: Option<PathBuf>,
    pub png_size: (u32, u32),
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            csv_path: None,
            excel_path: None,
            png_path: None,
            png_size: DEFAULT_PNG_SIZE,
        }
    }
}

/// Files actually written by [`generate_outputs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub csv: Option<PathBuf>,
    pub excel: Option<PathBuf>,
    pub png: Option<PathBuf>,
}

/// Build the grid once and write every enabled artifact. Nothing is written
/// when there are no hotels at all.
pub fn generate_outputs(
    hotels: &HotelAvailability,
    options: &OutputOptions,
) -> Result<WrittenOutputs> {
    let mut written = WrittenOutputs::default();
    if hotels.is_empty() {
        info!("No hotel data parsed; nothing to write.");
        return Ok(written);
    }

    let grid = build_grid(hotels);
    if let Some(path) = &options.csv_path {
        written.csv = Some(write_csv(&grid, path)?);
    }
    if let Some(path) = &options.excel_path {
        written.excel = Some(excel::write_excel(&grid, path)?);
    }
    if let Some(path) = &options.png_path {
        written.png = write_png(&grid, options.png_size, path)?;
    }
    Ok(written)
}

/// Write the grid as `hotel_id, coverage, <date>...`. Missing cells are left
/// empty rather than written as zero.
pub fn write_csv(grid: &AvailabilityGrid, path: &Path) -> Result<PathBuf> {
    let file = create_output_file(path)?;
    write_csv_to(grid, BufWriter::new(file))?;
    info!("Wrote {} hotels to {}", grid.rows.len(), path.display());
    Ok(path.to_path_buf())
}

pub fn write_csv_to<W: Write>(grid: &AvailabilityGrid, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = vec![HOTEL_ID_HEADER, COVERAGE_HEADER];
    header.extend(grid.dates.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in &grid.rows {
        let mut record = Vec::with_capacity(grid.dates.len() + 2);
        record.push(row.hotel_id.clone());
        record.push(format_coverage(row.coverage));
        record.extend(
            row.cells
                .iter()
                .map(|c| c.map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Shortest round-trip form, always with a decimal point: `0.5`, `1.0`, `0.0`
pub fn format_coverage(coverage: f64) -> String {
    format!("{coverage:?}")
}

/// Render and save the heatmap. Returns `None` when there was nothing to draw.
pub fn write_png(grid: &AvailabilityGrid, size: (u32, u32), path: &Path) -> Result<Option<PathBuf>> {
    let Some(image) = heatmap::encode(grid, size)? else {
        return Ok(None);
    };
    ensure_parent_dir(path)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    info!("Wrote PNG heatmap to {}", path.display());
    Ok(Some(path.to_path_buf()))
}

pub(crate) fn create_output_file(path: &Path) -> Result<File> {
    ensure_parent_dir(path)?;
    File::create(path).map_err(|e| AvailabilityError::CreateFile {
        path: path.to_path_buf(),
        source: e,
    })
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| AvailabilityError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}
