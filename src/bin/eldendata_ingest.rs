use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use eldendata::{ingest, logging, AppConfig, AppContext};
use log::{error, info};

/// Command line options for the ingestion binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Directory holding the CSV exports, overriding the configuration
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory of the sled database, overriding the configuration
    #[arg(long)]
    storage: Option<PathBuf>,
    /// Skip dropping the clean-reingest collection before loading
    #[arg(long, default_value_t = false)]
    keep_existing: bool,
}

/// Loads every CSV export into the store and prints one status line per file.
///
/// Exits non-zero when any file failed to load.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("eldendata_ingest: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.ingestion.data_dir = dir;
    }
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }
    if cli.keep_existing {
        config.ingestion.clean_reingest_collection = None;
    }
    logging::init(&config.log)?;

    let context = AppContext::connect(config)?;
    let settings = &context.config().ingestion;
    let report = ingest::run(
        context.store(),
        &settings.data_dir,
        settings.clean_reingest_collection.as_deref(),
    );
    context.shutdown()?;

    print!("{}", report);
    if report.failed() > 0 {
        error!("{} of {} files failed", report.failed(), report.files.len());
    } else {
        info!("All {} files loaded", report.files.len());
    }
    Ok(report.failed() == 0)
}
