mod config_cmd;
mod recognize_cmd;
mod serve_cmd;
mod status_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use logging::{init_logger, LogSettings};
use visiongate_config::{config_dir, config_file_path, VisionGateConfig};

#[derive(Parser)]
#[command(name = "visiongate")]
#[command(about = "VisionGate — OCR gateway with reading-order line reconstruction")]
#[command(version)]
struct Cli {
    /// Path to the YAML config file (defaults to ~/.visiongate/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Query a running gateway's health endpoint
    Status,
    /// Run OCR on a local image file and print the reconstructed lines
    Recognize {
        file: PathBuf,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Vertical line-grouping threshold in pixels
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config with secrets masked
    Show,
    /// Write a config file populated with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    match cli.command {
        Commands::Serve { port } => {
            let prepared = visiongate_config::load_and_prepare(&path).await?;
            init_logger(&log_settings(&prepared.config, None));
            for warning in &prepared.warnings {
                warn!(path = %warning.path, message = %warning.message, "Config warning");
            }
            serve_cmd::run(prepared.config, port).await?;
        }
        Commands::Status => {
            let prepared = visiongate_config::load_and_prepare(&path).await?;
            config_cmd::note_config_warnings(&prepared.warnings);
            status_cmd::run(&prepared.config).await?;
        }
        Commands::Recognize {
            file,
            json,
            threshold,
        } => {
            let prepared = visiongate_config::load_and_prepare(&path).await?;
            // Keep stdout clean for the recognized text.
            init_logger(&log_settings(&prepared.config, Some("error")));
            config_cmd::note_config_warnings(&prepared.warnings);
            recognize_cmd::run(&prepared.config, &file, json, threshold).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(&path).await?,
            ConfigAction::Init { force } => config_cmd::init(&path, force).await?,
        },
    }

    Ok(())
}

fn log_settings(config: &VisionGateConfig, level_override: Option<&str>) -> LogSettings {
    LogSettings {
        level: level_override.unwrap_or(config.log_level()).to_string(),
        json: config.log_json(),
        dir: config.log_dir().map(PathBuf::from),
    }
}
