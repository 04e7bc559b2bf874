use anyhow::Result;
use availability::{
    read_availability_csv,
    stay_window::{StayCriteria, analyze, write_report_csv},
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Find bookable stay windows in an availability CSV", long_about = None)]
struct Args {
    /// Availability CSV written by room_availability
    #[arg(default_value = "output_sheets/bookings_search_availability.csv")]
    input: PathBuf,

    /// First night of the first window (YYYY-MM-DD); defaults to today
    #[arg(short = 's', long = "start-date")]
    start_date: Option<NaiveDate>,

    /// Days between window starts
    #[arg(short = 'j', long = "lead-jump-days", default_value_t = 7)]
    lead_jump_days: u32,

    /// Nights per stay
    #[arg(short = 'n', long = "stay-length", default_value_t = 3)]
    stay_length_nights: u32,

    /// Last window start, in days after the start date
    #[arg(short = 'e', long = "lead-end-days", default_value_t = 365)]
    lead_end_days: u32,

    /// Rooms needed on every night of the stay
    #[arg(short = 'r', long = "rooms-required", default_value_t = 10)]
    rooms_required: u64,

    /// Write the window table to this CSV
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    let args = Args::parse();

    let criteria = StayCriteria {
        start_date: args.start_date.unwrap_or_else(|| Local::now().date_naive()),
        lead_jump_days: args.lead_jump_days,
        stay_length_nights: args.stay_length_nights,
        lead_end_days: args.lead_end_days,
        rooms_required: args.rooms_required,
    };

    let grid = read_availability_csv(&args.input)?;
    info!("Source: {}", args.input.display());

    let report = analyze(&grid, &criteria);
    info!("{}", report.criteria.describe());
    if report.is_empty() {
        warn!("No availability columns found; nothing to analyze.");
        return Ok(());
    }

    info!(
        "{} hotels x {} windows ({} .. {})",
        report.rows.len(),
        report.windows.len(),
        report.windows.first().map(|w| w.label.as_str()).unwrap_or("-"),
        report.windows.last().map(|w| w.label.as_str()).unwrap_or("-"),
    );
    info!("Average rooms: {:.2}", report.stats.avg_rooms);
    info!("Max rooms: {}", report.stats.max_rooms);
    info!("Available: {:.1}%", report.stats.available_ratio * 100.0);
    info!("Missing: {:.1}%", report.stats.missing_ratio * 100.0);

    let mut ranked: Vec<_> = report.rows.iter().collect();
    ranked.sort_by(|a, b| {
        b.coverage
            .total_cmp(&a.coverage)
            .then_with(|| a.hotel_id.cmp(&b.hotel_id))
    });
    info!("Top 10 hotels by window coverage:");
    for (i, row) in ranked.iter().take(10).enumerate() {
        info!("{}. {}: {:.1}%", i + 1, row.hotel_id, row.coverage * 100.0);
    }

    if let Some(path) = &args.output {
        write_report_csv(&report, path)?;
    }

    Ok(())
}
