use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use unimigrate_sequencer::{MigrationSequencer, load_manifest};

mod render;

/// Environment variable naming the manifest when `--manifest` is omitted.
const MANIFEST_PATH_ENV: &str = "UNIMIGRATE_MANIFEST";

#[derive(Debug, Parser)]
#[command(name = "unimigrate", version, about = "Order workspace objects into migration steps")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register every object in a manifest and print the resulting steps.
    Plan {
        /// Path to a YAML or JSON registration manifest.
        #[arg(long, short = 'm', env = MANIFEST_PATH_ENV)]
        manifest: PathBuf,
        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Plan { manifest, format } => run_plan(&manifest, format),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_plan(manifest_path: &Path, format: OutputFormat) -> Result<()> {
    let manifest = load_manifest(manifest_path).with_context(|| format!("Failed to load manifest: {}", manifest_path.display()))?;
    let mut sequencer =
        MigrationSequencer::from_manifest(&manifest).with_context(|| format!("Failed to register objects from {}", manifest_path.display()))?;
    let steps = sequencer.generate_steps().context("Failed to order migration steps")?;
    info!(steps = steps.len(), manifest = %manifest_path.display(), "Planned migration");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&steps)?),
        OutputFormat::Table => print!("{}", render::render_table(&steps)),
    }
    Ok(())
}
