use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use skystats::airlines::OPENFLIGHTS_AIRLINES_URL;
use skystats::config::Config;
use skystats::logging::init_logging;

mod commands;

use commands::{handle_collect, handle_load_airlines, handle_prune, handle_web};

#[derive(Parser)]
#[command(name = "skystats")]
#[command(about = "ADS-B receiver statistics: collection, aggregation and HTTP API")]
#[command(version)]
struct Cli {
    /// Optional TOML config file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the statistics API
    Web {
        /// Interface to bind (defaults to WEB_INTERFACE or 0.0.0.0)
        #[arg(long)]
        interface: Option<String>,
        /// Port to bind (defaults to WEB_PORT or 3000)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Poll the receiver and store sightings until interrupted
    Collect,
    /// Delete sightings older than the retention window
    Prune {
        /// Days to keep (defaults to DATA_RETENTION_DAYS)
        #[arg(long)]
        days: Option<i64>,
    },
    /// Download the OpenFlights airline list and write the lookup file
    LoadAirlines {
        #[arg(long, default_value = OPENFLIGHTS_AIRLINES_URL)]
        url: String,
        /// Output path (defaults to AIRLINES_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    // Held for the life of the process so buffered events are flushed on exit
    let sentry_guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    });

    init_logging(&cli.log_level, sentry_guard.is_some())?;
    info!("skystats {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Web { interface, port } => {
            if let Some(interface) = interface {
                config.web_interface = interface;
            }
            if let Some(port) = port {
                config.web_port = port;
            }
            handle_web(config).await
        }
        Commands::Collect => handle_collect(config).await,
        Commands::Prune { days } => {
            let days = days.unwrap_or(config.data_retention_days);
            handle_prune(config, days).await
        }
        Commands::LoadAirlines { url, output } => {
            let output = output.unwrap_or_else(|| config.airlines_path.clone());
            handle_load_airlines(&url, &output).await
        }
    }
}
