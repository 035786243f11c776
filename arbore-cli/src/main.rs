//! Arboré CLI — generate dirty retail test data and load it into a warehouse.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Arboré: dirty test data for the ETL pipeline
#[derive(Parser, Debug)]
#[command(name = "arbore", version, about, long_about = None)]
struct Cli {
    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate dirty orders, warranty claims and supplier specs
    Generate {
        /// Number of orders (before duplicates are appended)
        #[arg(long)]
        orders: Option<usize>,
        /// Number of warranty claims
        #[arg(long)]
        claims: Option<usize>,
        /// Number of supplier wood specs
        #[arg(long)]
        suppliers: Option<usize>,
        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Encoding of the order and claim files
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Generate the clean wood catalog and watch product dimension
    Catalog {
        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Insert records one statement at a time
    Insert {
        /// JSON file holding an array of records or a single record
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,
        /// Read newline-separated records until a blank line
        #[arg(long, conflicts_with = "file")]
        stdin: bool,
    },
    /// Stage records in micro-batches and queue them on the pipes
    Stage {
        /// JSON file holding an array of records or a single record
        file: PathBuf,
        /// Records per staged file
        batch_size: Option<usize>,
    },
    /// Load every queued staged file into its table
    Drain,
    /// Show table counts and recent pipe history
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    /// Pretty-printed JSON array
    Json,
    /// One JSON object per line
    Ndjson,
}

impl From<FormatArg> for arbore_core::OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => arbore_core::OutputFormat::Json,
            FormatArg::Ndjson => arbore_core::OutputFormat::Ndjson,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "arbore", "arbore")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "arbore.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.config.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_insert_requires_file_or_stdin() {
        assert!(Cli::try_parse_from(["arbore", "insert"]).is_err());
        assert!(Cli::try_parse_from(["arbore", "insert", "--stdin"]).is_ok());
        assert!(Cli::try_parse_from(["arbore", "insert", "a.json", "--stdin"]).is_err());
    }

    #[test]
    fn test_stage_batch_size_is_positional() {
        let cli = Cli::try_parse_from(["arbore", "-vv", "stage", "orders.json", "500"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Stage { file, batch_size } => {
                assert_eq!(file, PathBuf::from("orders.json"));
                assert_eq!(batch_size, Some(500));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_generate_format_flag() {
        let cli = Cli::try_parse_from(["arbore", "generate", "--format", "ndjson", "--seed", "7"]).unwrap();
        match cli.command {
            Commands::Generate { format, seed, .. } => {
                assert_eq!(format, Some(FormatArg::Ndjson));
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
