//! Bookable stay windows over an availability grid.
//!
//! Starting from `start_date` and stepping by `lead_jump_days` up to
//! `lead_end_days`, each window covers `stay_length_nights` consecutive
//! nights. A hotel can host the stay when the smallest nightly count in the
//! window reaches `rooms_required`.

use crate::{
    constants::{
        COVERAGE_HEADER, COVERAGE_PRECISION, DEFAULT_LEAD_END_DAYS, DEFAULT_LEAD_JUMP_DAYS,
        DEFAULT_ROOMS_REQUIRED, DEFAULT_STAY_LENGTH_NIGHTS, HOTEL_ID_HEADER,
    },
    error::Result,
    export::{create_output_file, format_coverage},
    grid::{AvailabilityGrid, GridRow, round_to},
};
use chrono::{Datelike, Days, Local, NaiveDate};
use csv::WriterBuilder;
use log::info;
use std::{
    collections::HashMap,
    io::{BufWriter, Write},
    path::Path,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayCriteria {
    pub start_date: NaiveDate,
    pub lead_jump_days: u32,
    pub stay_length_nights: u32,
    pub lead_end_days: u32,
    pub rooms_required: u64,
}

impl Default for StayCriteria {
    fn default() -> Self {
        Self::starting(Local::now().date_naive())
    }
}

impl StayCriteria {
    pub fn starting(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            lead_jump_days: DEFAULT_LEAD_JUMP_DAYS,
            stay_length_nights: DEFAULT_STAY_LENGTH_NIGHTS,
            lead_end_days: DEFAULT_LEAD_END_DAYS,
            rooms_required: DEFAULT_ROOMS_REQUIRED,
        }
    }

    /// Replace zero values with the defaults.
    pub fn normalized(self) -> Self {
        fn or_default<T: PartialEq + Default>(value: T, default: T) -> T {
            if value == T::default() { default } else { value }
        }
        Self {
            start_date: self.start_date,
            lead_jump_days: or_default(self.lead_jump_days, DEFAULT_LEAD_JUMP_DAYS),
            stay_length_nights: or_default(self.stay_length_nights, DEFAULT_STAY_LENGTH_NIGHTS),
            lead_end_days: or_default(self.lead_end_days, DEFAULT_LEAD_END_DAYS),
            rooms_required: or_default(self.rooms_required, DEFAULT_ROOMS_REQUIRED),
        }
    }

    /// `start_date + k * lead_jump_days` for every offset up to `lead_end_days`
    pub fn window_starts(&self) -> Vec<NaiveDate> {
        let jump = self.lead_jump_days.max(1) as usize;
        (0..=self.lead_end_days)
            .step_by(jump)
            .map_while(|offset| self.start_date.checked_add_days(Days::new(u64::from(offset))))
            .collect()
    }

    pub fn describe(&self) -> String {
        format!(
            "Start: {} | Jump: {}d | Stay: {}n | End: {}d | Rooms: {}+",
            self.start_date.format(DATE_FORMAT),
            self.lead_jump_days,
            self.stay_length_nights,
            self.lead_end_days,
            self.rooms_required
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayWindow {
    pub start: NaiveDate,
    /// ISO week of the first night, e.g. `W 05`
    pub label: String,
}

impl StayWindow {
    fn new(start: NaiveDate) -> Self {
        Self {
            start,
            label: format!("W {:02}", start.iso_week().week()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowRow {
    pub hotel_id: String,
    /// Share of windows that reach `rooms_required`
    pub coverage: f64,
    /// Minimum rooms over each window; `None` if any night has no data
    pub values: Vec<Option<u64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowStats {
    pub avg_rooms: f64,
    pub max_rooms: u64,
    pub available_ratio: f64,
    pub missing_ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StayWindowReport {
    pub criteria: StayCriteria,
    pub windows: Vec<StayWindow>,
    pub rows: Vec<WindowRow>,
    pub stats: WindowStats,
}

impl StayWindowReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.windows.is_empty()
    }
}

pub fn analyze(grid: &AvailabilityGrid, criteria: &StayCriteria) -> StayWindowReport {
    let criteria = criteria.clone().normalized();
    if grid.dates.is_empty() {
        return StayWindowReport {
            criteria,
            windows: Vec::new(),
            rows: Vec::new(),
            stats: WindowStats::default(),
        };
    }

    let windows: Vec<StayWindow> = criteria
        .window_starts()
        .into_iter()
        .map(StayWindow::new)
        .collect();

    let mut total_rooms = 0u64;
    let mut value_count = 0usize;
    let mut missing_count = 0usize;
    let mut available_count = 0usize;
    let mut max_rooms = 0u64;

    let rows: Vec<WindowRow> = grid
        .rows
        .iter()
        .map(|row| {
            let nightly = nightly_lookup(&grid.dates, row);
            let values: Vec<Option<u64>> = windows
                .iter()
                .map(|w| window_minimum(&nightly, w.start, criteria.stay_length_nights))
                .collect();

            let mut available = 0usize;
            for value in &values {
                match value {
                    None => missing_count += 1,
                    Some(rooms) => {
                        if *rooms >= criteria.rooms_required {
                            available += 1;
                        }
                        total_rooms += rooms;
                        value_count += 1;
                        max_rooms = max_rooms.max(*rooms);
                    }
                }
            }
            available_count += available;

            WindowRow {
                hotel_id: row.hotel_id.clone(),
                coverage: ratio(available, windows.len()),
                values,
            }
        })
        .collect();

    let total_cells = rows.len() * windows.len();
    let stats = WindowStats {
        avg_rooms: if value_count > 0 {
            total_rooms as f64 / value_count as f64
        } else {
            0.0
        },
        max_rooms,
        available_ratio: ratio(available_count, total_cells),
        missing_ratio: ratio(missing_count, total_cells),
    };

    StayWindowReport {
        criteria,
        windows,
        rows,
        stats,
    }
}

fn nightly_lookup<'a>(dates: &'a [String], row: &GridRow) -> HashMap<&'a str, Option<u64>> {
    dates
        .iter()
        .zip(row.cells.iter())
        .map(|(d, c)| (d.as_str(), *c))
        .collect()
}

fn window_minimum(
    nightly: &HashMap<&str, Option<u64>>,
    start: NaiveDate,
    nights: u32,
) -> Option<u64> {
    let mut minimum: Option<u64> = None;
    for i in 0..nights {
        let date = start.checked_add_days(Days::new(u64::from(i)))?;
        let key = date.format(DATE_FORMAT).to_string();
        let count = nightly.get(key.as_str()).copied().flatten()?;
        minimum = Some(minimum.map_or(count, |m| m.min(count)));
    }
    minimum
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 / total as f64, COVERAGE_PRECISION)
}

/// Write the report as `hotel_id, coverage, <window start>...`
pub fn write_report_csv(report: &StayWindowReport, path: &Path) -> Result<()> {
    let file = create_output_file(path)?;
    write_report_to(report, BufWriter::new(file))?;
    info!("Wrote {} stay-window rows to {}", report.rows.len(), path.display());
    Ok(())
}

pub fn write_report_to<W: Write>(report: &StayWindowReport, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = vec![HOTEL_ID_HEADER.to_string(), COVERAGE_HEADER.to_string()];
    header.extend(
        report
            .windows
            .iter()
            .map(|w| w.start.format(DATE_FORMAT).to_string()),
    );
    wtr.write_record(&header)?;

    for row in &report.rows {
        let mut record = vec![row.hotel_id.clone(), format_coverage(row.coverage)];
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|n| n.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
