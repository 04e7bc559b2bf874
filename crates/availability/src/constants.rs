use image::Rgb;

/// Tabular output headers
pub const HOTEL_ID_HEADER: &str = "hotel_id";
pub const COVERAGE_HEADER: &str = "coverage";

/// Decimal places kept for coverage ratios
pub const COVERAGE_PRECISION: i32 = 4;

/// Heatmap palette
pub const UNAVAILABLE_COLOR: Rgb<u8> = Rgb([127, 0, 0]); // dark red
pub const AVAILABLE_COLOR: Rgb<u8> = Rgb([0, 176, 80]); // green

/// Heatmap image size in pixels (width, height)
pub const DEFAULT_PNG_SIZE: (u32, u32) = (520, 700);

/// Spreadsheet layout: labels sit on row 2, the table header on row 5
pub const EXCEL_LABEL_ROW: u32 = 1;
pub const EXCEL_HEADER_ROW: u32 = 4;
pub const EXCEL_PARAMS_LABEL: &str = "Params";
pub const EXCEL_GRID_LABEL: &str = "Bookings availability (rooms)";
pub const EXCEL_BODY_FILL: u32 = 0x000000;
pub const EXCEL_HEADER_FILL: u32 = 0x444444;
pub const EXCEL_KEY_FONT: u32 = 0xFFA500; // orange, hotel_id and coverage
pub const EXCEL_VALUE_FONT: u32 = 0xFFFFFF;

/// Stay-window defaults
pub const DEFAULT_LEAD_JUMP_DAYS: u32 = 7;
pub const DEFAULT_STAY_LENGTH_NIGHTS: u32 = 3;
pub const DEFAULT_LEAD_END_DAYS: u32 = 365;
pub const DEFAULT_ROOMS_REQUIRED: u64 = 10;
