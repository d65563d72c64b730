use std::path::PathBuf;

use clap::Parser;
use eldendata::http::EldenDataHttpServer;
use eldendata::{logging, AppConfig, AppContext};
use log::{error, info};

/// Command line options for the HTTP server binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Port for the HTTP server, overriding the configuration
    #[arg(long)]
    port: Option<u16>,
    /// Directory of the sled database, overriding the configuration
    #[arg(long)]
    storage: Option<PathBuf>,
}

/// Starts the REST server.
///
/// Configuration comes from `--config`, then `ELDENDATA_CONFIG`, then defaults, with
/// `ELDENDATA_*` variables and the flags above applied on top. The store is opened and pinged
/// before binding; an unreachable store aborts startup.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }
    logging::init(&config.log)?;
    info!("Starting eldendata server ({})", config.environment);

    let context = match AppContext::connect(config) {
        Ok(context) => context,
        Err(e) => {
            error!("Cannot start without a store: {}", e);
            return Err(e.into());
        }
    };

    let server = EldenDataHttpServer::new(context.clone());
    let result = server.run().await;
    context.shutdown()?;
    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["test"]);
        assert_eq!(cli.port, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn overrides() {
        let cli = Cli::parse_from(["test", "--port", "9100", "--storage", "/tmp/elden", "--config", "eldendata.toml"]);
        assert_eq!(cli.port, Some(9100));
        assert_eq!(cli.storage, Some(PathBuf::from("/tmp/elden")));
        assert_eq!(cli.config, Some(PathBuf::from("eldendata.toml")));
    }
}
