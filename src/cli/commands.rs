use crate::analyzers::DatasetAnalyzer;
use crate::cli::args::{Cli, Commands, FilterArgs, InputArgs};
use crate::config::DashboardConfig;
use crate::error::{ProcessingError, Result};
use crate::models::RecordStore;
use crate::processors::{DateRange, MeasurementFilter};
use crate::readers::ConcurrentReader;
use crate::session::DashboardSession;
use crate::utils::filename::{generate_default_geojson_filename, generate_default_parquet_filename};
use crate::utils::progress::ProgressReporter;
use crate::writers::{GeoJsonWriter, JsonWriter, ParquetWriter};
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn, Level};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = DashboardConfig::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Summary {
            input,
            filter,
            json,
        } => {
            let session = DashboardSession::new(load_store(&input, quiet)?, config);
            let selection = build_filter(&session, &filter)?;

            let view = session.refresh(&selection);
            println!("{}", view.summary());

            if let Some(path) = json {
                ensure_parent_dir(&path)?;
                JsonWriter::new().write(&view, &path)?;
                println!("\nDashboard report written to {}", path.display());
            }
        }

        Commands::Map { input, output_file } => {
            let session = DashboardSession::new(load_store(&input, quiet)?, config);
            let map = session.marker_map();
            println!("{}", map.summary());

            let output_file = output_file.unwrap_or_else(generate_default_geojson_filename);
            ensure_parent_dir(&output_file)?;
            GeoJsonWriter::new().write(map, &output_file)?;
            println!("\nMarkers written to {}", output_file.display());
        }

        Commands::Export {
            input,
            filter,
            output_file,
            compression,
        } => {
            // Reject a bad codec before spending time on the load
            let writer = ParquetWriter::new().with_compression(&compression)?;

            let session = DashboardSession::new(load_store(&input, quiet)?, config);
            let selection = build_filter(&session, &filter)?;
            let subset = session.filtered(&selection);

            if subset.is_empty() {
                println!("No records to write");
                return Ok(());
            }

            let output_file = output_file.unwrap_or_else(generate_default_parquet_filename);
            ensure_parent_dir(&output_file)?;

            println!("Writing {} records to Parquet file...", subset.len());
            writer.write_measurements(&subset, &output_file)?;

            let file_info = writer.get_file_info(&output_file)?;
            println!("\n{}", file_info.summary());
        }

        Commands::Info { input } => {
            let store = load_store(&input, quiet)?;
            let overview = DatasetAnalyzer::new().analyze(&store);
            println!("{}", overview.summary());
        }
    }

    Ok(())
}

/// Install the fmt subscriber: WARN by default, DEBUG when verbose. A log file
/// gets plain text, otherwise output goes to stderr.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}

fn load_store(input: &InputArgs, quiet: bool) -> Result<Arc<RecordStore>> {
    if !input.delimiter.is_ascii() {
        return Err(ProcessingError::Config(format!(
            "Delimiter must be an ASCII character, got '{}'",
            input.delimiter
        )));
    }
    let delimiter = input.delimiter as u8;

    let progress = match input.inputs.as_slice() {
        [single] => ProgressReporter::new_spinner(
            &format!("Loading {}...", single.display()),
            quiet,
        ),
        files => ProgressReporter::new(files.len() as u64, "Loading measurement files...", quiet),
    };

    let store = ConcurrentReader::new(input.max_workers)
        .with_delimiter(delimiter)
        .load_record_store(&input.inputs, Some(&progress))?;

    progress.finish_with_message(&format!(
        "Loaded {} records from {} files",
        store.len(),
        input.inputs.len()
    ));

    Ok(Arc::new(store))
}

/// Combine command-line controls with the session defaults (all stations,
/// full data span)
fn build_filter(session: &DashboardSession, args: &FilterArgs) -> Result<MeasurementFilter> {
    let defaults = session.default_controls();
    let span = defaults
        .as_ref()
        .map(|f| (f.range.start.date(), f.range.end.date()));

    let (Some(start), Some(end)) = (
        args.start.or(span.map(|s| s.0)),
        args.end.or(span.map(|s| s.1)),
    ) else {
        return Err(ProcessingError::MissingData(
            "no timestamped measurements to take a date range from; pass --start and --end"
                .to_string(),
        ));
    };

    if start > end {
        warn!(%start, %end, "start date is after end date, selection will be empty");
    }

    let known = session.store().stations();
    let stations = if args.stations.is_empty() {
        known
    } else {
        for station in &args.stations {
            if !known.contains(station) {
                warn!(station = %station, "station not present in the loaded data");
            }
        }
        args.stations.clone()
    };

    let filter = MeasurementFilter::new(stations, DateRange::from_dates(start, end));
    info!(
        stations = filter.stations.len(),
        %start,
        %end,
        "dashboard controls"
    );

    Ok(filter)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
