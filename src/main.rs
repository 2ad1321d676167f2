//! `critical-css`: run the critical CSS pass against a bundle that is already on disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bundle_critical_css::{BundleManifest, CriticalPlugin, NodeCritical, OutputOptions, PluginConfig};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "critical-css", version, about = "Generate critical CSS for the pages of a written bundle")]
struct Cli {
  /// JSON object describing the written bundle, keyed by file name.
  #[arg(short, long)]
  manifest: PathBuf,

  /// Plugin configuration (JSON or YAML). Discovered in the current directory when omitted.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory the bundle was written to.
  #[arg(short, long)]
  dir: Option<PathBuf>,

  /// Node.js executable used to run the generator.
  #[arg(long, default_value = "node")]
  node: PathBuf,

  /// Log discovery details.
  #[arg(short, long, conflicts_with = "quiet")]
  verbose: bool,

  /// Only log errors.
  #[arg(short, long)]
  quiet: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  initialize_logging(&cli)?;

  let config = match &cli.config {
    Some(path) => PluginConfig::from_path(path)?,
    None => {
      let cwd = std::env::current_dir().context("failed to resolve current directory")?;
      PluginConfig::discover(&cwd)?
    }
  };
  let bundle = BundleManifest::from_path(&cli.manifest)?;
  let output_options = OutputOptions { dir: cli.dir };

  let plugin = CriticalPlugin::new(config, NodeCritical::new(cli.node));
  let outcomes = plugin.generate_pages(&output_options, &bundle);

  let failed = outcomes.iter().filter(|outcome| !outcome.is_success()).count();
  println!(
    "critical CSS: {} page(s) generated, {failed} failed",
    outcomes.len() - failed
  );
  Ok(())
}

fn initialize_logging(cli: &Cli) -> Result<()> {
  let level = if cli.verbose {
    Level::DEBUG
  } else if cli.quiet {
    Level::ERROR
  } else {
    Level::INFO
  };

  let subscriber = FmtSubscriber::builder()
    .with_max_level(level)
    .with_target(false)
    .with_writer(std::io::stderr)
    .finish();

  tracing::subscriber::set_global_default(subscriber)?;
  Ok(())
}
