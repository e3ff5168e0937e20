//! chdrunner - run chdman conversions from the command line
//!
//! Resolves the chdman executable, builds argument vectors for the six
//! conversion directions and runs single files or whole batches, streaming
//! progress as it goes.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chdrunner_core::{load_config, validate_config, Config, Direction};

/// Run chdman conversions between CD images and CHD archives.
#[derive(Parser, Debug)]
#[command(name = "chdrunner", author, version, about)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "CHDRUNNER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve and verify the chdman executable
    Locate,

    /// List the chdman options known for a direction
    Options {
        /// Conversion direction (e.g. cue-to-chd, chd-to-iso)
        direction: Direction,
    },

    /// Convert a single file
    Convert {
        /// Conversion direction (e.g. cue-to-chd, chd-to-iso)
        direction: Direction,

        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Extra chdman option as KEY or KEY=VALUE (repeatable)
        #[arg(long = "opt", value_name = "KEY[=VALUE]", allow_hyphen_values = true)]
        options: Vec<String>,
    },

    /// Convert many files one after another
    Batch {
        /// Conversion direction (e.g. cue-to-chd, chd-to-iso)
        direction: Direction,

        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write outputs here instead of next to each input
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Convert even when the output file already exists
        #[arg(long)]
        no_skip_existing: bool,

        /// Stop at the first failed job
        #[arg(long)]
        stop_on_error: bool,

        /// Extra chdman option as KEY or KEY=VALUE (repeatable)
        #[arg(long = "opt", value_name = "KEY[=VALUE]", allow_hyphen_values = true)]
        options: Vec<String>,

        /// Print events and the summary as JSON lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_json);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str, json: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

/// Runs the selected command. `Ok(false)` means the work ran but some of it failed.
async fn run(args: Args) -> Result<bool> {
    let config = load(&args)?;

    match args.command {
        Command::Locate => commands::locate(&config),
        Command::Options { direction } => {
            commands::list_options(direction);
            Ok(true)
        }
        Command::Convert {
            direction,
            input,
            output,
            options,
        } => commands::convert(&config, direction, &input, &output, &options).await,
        Command::Batch {
            direction,
            inputs,
            output_dir,
            no_skip_existing,
            stop_on_error,
            options,
            json,
        } => {
            let mut batch = config.batch.clone();
            if no_skip_existing {
                batch.skip_existing = false;
            }
            if stop_on_error {
                batch.stop_on_error = true;
            }
            let request = commands::BatchRequest {
                direction,
                inputs,
                output_dir,
                options,
                config: batch,
                json,
            };
            commands::batch(&config, request).await
        }
    }
}

fn load(args: &Args) -> Result<Config> {
    let config = load_config(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("Failed to load config from {:?}", path),
        None => "Failed to load configuration".to_string(),
    })?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!(tool = %config.tool.path, "Configuration loaded");
    Ok(config)
}
