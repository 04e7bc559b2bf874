mod client;
mod config;
mod error;
mod fetch;
mod payload;

use anyhow::{Context, Result, bail};
use availability::{
    AvailabilitySource, HotelAvailability, OutputOptions, SnapshotSource, SnapshotWriter,
    constants::DEFAULT_PNG_SIZE, generate_outputs, include_hotels, read_hotel_ids,
};
use clap::Parser;
use client::{HttpBookingClient, build_http_client, fetch_auth_token};
use config::{ApiArgs, Config, Credentials, load_dotenv};
use error::FetchError;
use fetch::LiveFetchSource;
use log::{debug, error, info, warn};
use std::{io::Write, path::PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Query hotel availability and render CSV / Excel / PNG grids", long_about = None)]
struct Args {
    /// CSV with hotel IDs
    #[arg(default_value = "sheets/kuoni_hotel_summary_with_kuoni.csv")]
    csv_path: PathBuf,

    /// Column containing hotel IDs
    #[arg(long = "hotel-column", default_value = "kuoni_id")]
    hotel_column: String,

    #[command(flatten)]
    api: ApiArgs,

    /// Where to write raw JSONL results
    #[arg(
        long = "jsonl-output",
        visible_alias = "output",
        default_value = "output_sheets/bookings_search_results.jsonl"
    )]
    jsonl_output: PathBuf,

    /// Existing JSONL file to convert with --convert-only (defaults to --jsonl-output)
    #[arg(long = "jsonl-input")]
    jsonl_input: Option<PathBuf>,

    /// Skip API calls and only convert an existing JSONL file
    #[arg(long = "convert-only")]
    convert_only: bool,

    /// Where to write the availability CSV
    #[arg(long = "csv-output", default_value = "output_sheets/bookings_search_availability.csv")]
    csv_output: PathBuf,

    /// Skip writing the availability CSV
    #[arg(long = "no-csv")]
    no_csv: bool,

    /// Where to write the availability Excel grid
    #[arg(long = "excel-output", default_value = "output_sheets/bookings_search_availability.xlsx")]
    excel_output: PathBuf,

    /// Skip writing the Excel file
    #[arg(long = "no-excel")]
    no_excel: bool,

    /// Where to write the availability heatmap PNG
    #[arg(long = "png-output", default_value = "output_sheets/bookings_search_availability.png")]
    png_output: PathBuf,

    /// PNG size in pixels
    #[arg(
        long = "png-size",
        num_args = 2,
        value_names = ["W", "H"],
        action = clap::ArgAction::Set,
        default_values_t = [DEFAULT_PNG_SIZE.0, DEFAULT_PNG_SIZE.1]
    )]
    png_size: Vec<u32>,

    /// Skip writing the availability heatmap PNG
    #[arg(long = "no-png")]
    no_png: bool,
}

impl Args {
    fn output_options(&self) -> Result<OutputOptions> {
        let png_size = match self.png_size.as_slice() {
            [w, h] => (*w, *h),
            other => bail!("--png-size takes exactly two values, got {}", other.len()),
        };
        Ok(OutputOptions {
            csv_path: (!self.no_csv).then(|| self.csv_output.clone()),
            excel_path: (!self.no_excel).then(|| self.excel_output.clone()),
            png_path: (!self.no_png).then(|| self.png_output.clone()),
            png_size,
        })
    }

    /// Snapshot to convert; `None` means fetch live.
    fn replay_path(&self) -> Option<&PathBuf> {
        self.convert_only
            .then(|| self.jsonl_input.as_ref().unwrap_or(&self.jsonl_output))
    }
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    load_dotenv(None);

    if let Err(e) = run(Args::parse()) {
        error!("Error: {e:#}");
        print_hint(&e);
        let _ = std::io::stderr().flush();
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let options = args.output_options()?;

    let hotels = match args.replay_path() {
        Some(path) => {
            let mut source = SnapshotSource::new(path);
            info!("Converting existing snapshot {}", source.path().display());
            source.load()?
        }
        None => fetch_live(&args)?,
    };

    info!("Hotels with data: {}", hotels.len());
    let written = generate_outputs(&hotels, &options)?;
    if let Some(path) = &written.csv {
        info!("Saved CSV to {}", path.display());
    }
    if let Some(path) = &written.excel {
        info!("Saved Excel to {}", path.display());
    }
    if let Some(path) = &written.png {
        info!("Saved PNG to {}", path.display());
    }
    Ok(())
}

fn fetch_live(args: &Args) -> Result<HotelAvailability> {
    let config = Config::from_env(&args.api)?;
    let credentials = Credentials::from_env(&args.api)?;
    let http = build_http_client(config.timeout)?;

    let token = match credentials {
        Credentials::Bearer(token) => token,
        Credentials::Client(creds) => {
            info!("Fetching auth token from {}", creds.auth_url);
            fetch_auth_token(&http, &creds)?
        }
    };

    let hotel_ids = read_hotel_ids(&args.csv_path, Some(args.hotel_column.as_str()))
        .with_context(|| format!("Reading hotel IDs from {}", args.csv_path.display()))?;
    info!("Loaded {} hotel IDs from {}", hotel_ids.len(), args.csv_path.display());
    debug!(
        "Searching {} (event {}, mcode {})",
        config.url, config.template.event_id, config.template.mcode
    );

    let writer = SnapshotWriter::create(&args.jsonl_output)?;
    let client = HttpBookingClient::new(http, config.url.as_str(), token);
    let mut source = LiveFetchSource::new(&client, &config.template, &hotel_ids, writer);
    let mut hotels = source.load()?;
    if source.failures() > 0 {
        warn!(
            "{} of {} hotels failed; see {}",
            source.failures(),
            hotel_ids.len(),
            args.jsonl_output.display()
        );
    }
    info!("Saved raw results to {}", args.jsonl_output.display());

    include_hotels(&mut hotels, &hotel_ids);
    Ok(hotels)
}

fn print_hint(e: &anyhow::Error) {
    use std::io::ErrorKind;

    for cause in e.chain() {
        if let Some(fe) = cause.downcast_ref::<FetchError>() {
            match fe {
                FetchError::MissingCredentials => {
                    error!(
                        "Hint: set KUONI_BOOKINGS_TOKEN, or KUONI_AUTH_CLIENT_ID and KUONI_AUTH_CLIENT_SECRET."
                    );
                    return;
                }
                FetchError::AuthFailed { status: 401 | 403, .. } => {
                    error!("Hint: check the auth client ID, secret and audience.");
                    return;
                }
                _ => {}
            }
        }
        if let Some(ioe) = cause.downcast_ref::<std::io::Error>() {
            match ioe.kind() {
                ErrorKind::NotFound => {
                    error!("Hint: check the input path, or run without --convert-only to fetch.");
                    return;
                }
                ErrorKind::PermissionDenied => {
                    error!("Hint: run in a writable directory or pass different output paths.");
                    return;
                }
                _ => {}
            }
        }
    }
}
