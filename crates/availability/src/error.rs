use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AvailabilityError>;

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("Failed to open {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create file {path}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV appears to be empty: {0}")]
    EmptyCsv(PathBuf),

    #[error("Column '{column}' not found. Available columns: {available}")]
    MissingColumn { column: String, available: String },

    #[error("No hotel IDs read from column '{0}'")]
    NoHotelIds(String),

    #[error("Invalid image size {width}x{height}: both dimensions must be positive")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("Sheet of {rows} rows x {cols} columns exceeds spreadsheet limits")]
    SheetTooLarge { rows: usize, cols: usize },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Excel(#[from] rust_xlsxwriter::XlsxError),
}
