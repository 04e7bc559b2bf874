pub mod constants;
pub mod csv_reader;
pub mod error;
pub mod excel;
pub mod export;
pub mod grid;
pub mod heatmap;
pub mod normalize;
pub mod snapshot;
pub mod stay_window;

pub use csv_reader::{read_availability_csv, read_hotel_ids};
pub use error::{AvailabilityError, Result};
pub use excel::write_excel;
pub use export::{OutputOptions, WrittenOutputs, generate_outputs, write_csv, write_png};
pub use grid::{AvailabilityGrid, GridRow, build_grid, include_hotels};
pub use heatmap::{HeatmapMask, Palette, encode};
pub use normalize::{HotelAvailability, NightlyAvailability, normalize};
pub use snapshot::{
    AvailabilitySource, FetchOutcome, SnapshotRecord, SnapshotSource, SnapshotWriter,
};
pub use stay_window::{StayCriteria, StayWindowReport};
