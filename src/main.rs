//! CLI entry point for the bikeshare statistics tool.
//!
//! Provides an interactive explorer, a one-shot report command and a listing
//! of the known cities.

use anyhow::Result;
use bikeshare_stats::{
    city::City,
    config::StoreConfig,
    filter::{self, DayFilter, FilterSpec, MonthFilter},
    output::{report_json, write_page, write_report},
    paginate::{DEFAULT_PAGE_SIZE, window},
    record::RecordStore,
    session::Session,
    stats::Report,
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare")]
#[command(about = "Explore US bikeshare trip data", long_about = None)]
struct Cli {
    /// Directory containing chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, global = true, env = "BIKESHARE_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Fail the load on a row with an unreadable start time instead of skipping it
    #[arg(long, global = true, default_value_t = false)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively pick a city and filters, view statistics and raw trips
    Explore {
        /// Trips shown per page
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Print statistics for one city and filter, then exit
    Report {
        /// City key: chicago, "new york city" or washington
        #[arg(short, long)]
        city: City,

        /// Month name (january to june) or "all"
        #[arg(short, long, default_value = "all")]
        month: MonthFilter,

        /// Day name (monday to sunday) or "all"
        #[arg(short, long, default_value = "all")]
        day: DayFilter,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also print the first N matching trips
        #[arg(short, long, default_value_t = 0)]
        rows: usize,
    },
    /// List the available cities and their data files
    Cities,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = StoreConfig {
        data_dir: cli.data_dir,
        ..StoreConfig::default()
    }
    .strict(cli.strict);

    match cli.command.unwrap_or(Commands::Explore {
        page_size: DEFAULT_PAGE_SIZE,
    }) {
        Commands::Explore { page_size } => {
            let store = RecordStore::new(config);
            let mut session = Session::new(store, page_size, io::stdin().lock(), io::stdout());
            session.run()?;
        }
        Commands::Report {
            city,
            month,
            day,
            json,
            rows,
        } => {
            let store = RecordStore::new(config);
            let spec = FilterSpec::new(month, day);
            report(&store, city, &spec, json, rows)?;
        }
        Commands::Cities => {
            for city in City::ALL {
                let path = config.data_dir.join(city.file_name());
                info!(city = city.key(), path = %path.display(), exists = path.exists(), "City");
                println!("{:<15} {}", city.key(), path.display());
            }
        }
    }

    Ok(())
}

/// Loads, filters and reports one city without prompting.
#[tracing::instrument(skip(store, city), fields(city = %city))]
fn report(
    store: &RecordStore,
    city: City,
    spec: &FilterSpec,
    json: bool,
    rows: usize,
) -> Result<()> {
    let table = store.load_city(city)?;
    let view = filter::apply(&table, spec);
    let report = Report::compute(&view);
    let page = window(&view, 0, rows);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        writeln!(out, "{}", report_json(city, spec, &report, &page)?)?;
        return Ok(());
    }

    write_report(&mut out, city, spec, &report)?;
    if table.skipped_rows() > 0 {
        writeln!(
            out,
            "Note: {} rows with an unreadable start time were skipped.",
            table.skipped_rows()
        )?;
    }
    if !page.is_empty() {
        writeln!(out)?;
        write_page(&mut out, table.schema(), 0, &page)?;
    }
    Ok(())
}
