use crate::constants::COVERAGE_PRECISION;
use crate::normalize::{HotelAvailability, NightlyAvailability};
use std::collections::BTreeSet;

/// One hotel row of the availability grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub hotel_id: String,
    /// Share of axis dates with at least one room, rounded to 4 places
    pub coverage: f64,
    /// Aligned with [`AvailabilityGrid::dates`]; `None` means no data
    pub cells: Vec<Option<u64>>,
}

impl GridRow {
    pub fn available_nights(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some_and(|v| v > 0)).count()
    }
}

/// Hotel x date matrix with rows ordered by hotel ID and columns by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityGrid {
    pub dates: Vec<String>,
    pub rows: Vec<GridRow>,
}

impl AvailabilityGrid {
    /// An empty grid has nothing to render; writers must skip it.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, hotel_id: &str) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.hotel_id == hotel_id)
    }

    /// Stored count for a hotel on a date, if any
    pub fn value(&self, hotel_id: &str, date: &str) -> Option<u64> {
        let col = self.dates.iter().position(|d| d == date)?;
        self.row(hotel_id)?.cells.get(col).copied().flatten()
    }
}

/// Build the grid from every hotel's nightly map.
///
/// The date axis is the union of all dates sorted as strings, which matches
/// chronological order for `YYYY-MM-DD`. A hotel with an empty map still gets
/// a row with no cells filled and coverage `0.0`.
pub fn build_grid(hotels: &HotelAvailability) -> AvailabilityGrid {
    let dates: Vec<String> = hotels
        .values()
        .flat_map(|nightly| nightly.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // BTreeMap iteration already yields hotel IDs in ascending order.
    let rows = hotels
        .iter()
        .map(|(hotel_id, nightly)| build_row(hotel_id, nightly, &dates))
        .collect();

    AvailabilityGrid { dates, rows }
}

fn build_row(hotel_id: &str, nightly: &NightlyAvailability, dates: &[String]) -> GridRow {
    let cells: Vec<Option<u64>> = dates.iter().map(|d| nightly.get(d).copied()).collect();
    let available = cells.iter().filter(|c| c.is_some_and(|v| v > 0)).count();

    GridRow {
        hotel_id: hotel_id.to_string(),
        coverage: coverage(available, dates.len()),
        cells,
    }
}

/// `available / total` rounded to [`COVERAGE_PRECISION`] places; `0.0` when
/// the axis is empty.
pub fn coverage(available: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(available as f64 / total as f64, COVERAGE_PRECISION)
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Make sure every requested hotel has an entry, so a hotel that produced no
/// record at all still shows up as a zero-coverage row.
pub fn include_hotels<I, S>(hotels: &mut HotelAvailability, hotel_ids: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for id in hotel_ids {
        hotels.entry(id.as_ref().to_string()).or_default();
    }
}
