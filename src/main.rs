//! lamco-pointer-replay
//!
//! Replays a JSON-lines pointer trace through the tracker and prints the
//! drained records and poll snapshots as JSON.

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lamco_pointer_queue::config::{Config, LOG_FORMATS};
use lamco_pointer_queue::replay::{parse_trace, Replayer};

/// Command-line arguments for lamco-pointer-replay
#[derive(Parser, Debug)]
#[command(name = "lamco-pointer-replay")]
#[command(version, about = "Replay pointer traces through the event queue", long_about = None)]
pub struct Args {
    /// Configuration file path (defaults are used when absent)
    #[arg(short, long, env = "LAMCO_POINTER_CONFIG")]
    pub config: Option<String>,

    /// Trace file, one JSON event per line ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    pub trace: String,

    /// Queue capacity in records
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Start in captured (grabbed) mode
    #[arg(long)]
    pub grabbed: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(
        long,
        value_parser = clap::builder::PossibleValuesParser::new(LOG_FORMATS.iter().copied())
    )]
    pub log_format: Option<String>,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default_config()?,
    };
    let config = config.with_overrides(args.capacity, args.grabbed);
    config.validate()?;

    init_logging(&args, &config)?;

    info!(
        "lamco-pointer-replay v{} ({} {}, commit {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_DATE"),
        env!("BUILD_TIME"),
        env!("GIT_HASH")
    );
    tracing::debug!("Config: {:?}", config);

    let text = read_trace(&args.trace)?;
    let events = parse_trace(&text)?;

    let replayer = Replayer::new(&config);
    let report = replayer.run(&events);

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);

    Ok(())
}

fn read_trace(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read trace from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).context(format!("Failed to read trace file: {}", path))
    }
}

fn init_logging(args: &Args, config: &Config) -> Result<()> {
    use std::fs::File;

    let log_level = match args.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "lamco_pointer_queue={level},lamco_pointer_replay={level},warn",
            level = log_level
        ))
    });

    let log_format = args
        .log_format
        .as_deref()
        .unwrap_or(config.logging.format.as_str());

    let log_file = args
        .log_file
        .clone()
        .or_else(|| {
            config
                .logging
                .log_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
        });

    // stdout carries the report, logs go to stderr
    if let Some(log_file_path) = &log_file {
        let file = File::create(log_file_path)
            .context(format!("Failed to create log file: {}", log_file_path))?;

        match log_format {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path);
    } else {
        match log_format {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
        }
    }

    Ok(())
}
