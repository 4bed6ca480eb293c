//! zipgate CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zipgate_compression::Settings;
use zipgate_config::load_and_merge;

#[derive(Parser)]
#[command(name = "zipgate")]
#[command(about = "Validate and query compression exclusion rules", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration files
    Validate {
        /// Configuration files, outermost scope first
        #[arg(short, long, required = true)]
        config: Vec<PathBuf>,
    },

    /// Show which paths and MIME types bypass compression
    Check {
        /// Configuration files, outermost scope first
        #[arg(short, long, required = true)]
        config: Vec<PathBuf>,

        /// Request path to test (repeatable)
        #[arg(short, long)]
        path: Vec<String>,

        /// MIME type to test (repeatable)
        #[arg(short, long)]
        mime: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Validate { config } => match resolve(&config) {
            Ok(settings) => {
                println!("✓ Configuration is valid");
                print_preferences(&settings);
                println!("  Excluded MIME types: {}", settings.excluded_mime_types().count());
                println!("  Path rules: {}", settings.excluded_paths().len());
                Ok(())
            }
            Err(e) => {
                tracing::error!("Configuration validation failed: {e:#}");
                eprintln!("✗ {e:#}");
                std::process::exit(1);
            }
        },

        Commands::Check { config, path, mime } => {
            let settings = resolve(&config)?;
            print_preferences(&settings);

            for p in &path {
                println!("  path {p}: {}", verdict(settings.is_excluded_path(p)));
            }
            for m in &mime {
                println!("  mime {m}: {}", verdict(settings.is_excluded_mime_type(Some(m.as_str()))));
            }
            Ok(())
        }

        Commands::Version => {
            println!("zipgate");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            Ok(())
        }
    }
}

fn resolve(config: &[PathBuf]) -> Result<Settings> {
    tracing::info!(files = config.len(), "Loading configuration layers");

    let layers = load_and_merge(config.to_vec()).context("failed to load configuration")?;
    let settings = Settings::resolve(&layers).context("invalid compression section")?;

    tracing::debug!(?settings, "Resolved compression settings");
    Ok(settings)
}

fn print_preferences(settings: &Settings) {
    println!("  Algorithm: {}", settings.preferred_algorithm());
    println!("  Level: {}", settings.compression_level());
}

fn verdict(excluded: bool) -> &'static str {
    if excluded {
        "excluded"
    } else {
        "compressed"
    }
}

fn init_tracing(level: &str) {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(filter.into()))
        .init();
}
