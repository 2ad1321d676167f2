//! Post-write bundle hook that generates critical CSS for every configured page.

use anyhow::Result;
use tracing::{debug, error, info};

use crate::bundle::{BundleManifest, OutputOptions, discover_stylesheets};
use crate::config::PluginConfig;
use crate::generator::{CriticalGenerator, GenerationError};
use crate::options::{build_generation_options, critical_dest, critical_src};

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "critical";

/// Trait describing a bundler plugin that reacts once the bundle is on disk.
pub trait BundlePlugin {
  /// Fixed identifier of the plugin.
  fn name(&self) -> &str;

  /// Called once per build after every output file has been written.
  fn write_bundle(&self, output_options: &OutputOptions, bundle: &BundleManifest) -> Result<()>;
}

/// Invoked once per page with the generator's error, if any.
pub type CompletionCallback = Box<dyn Fn(Option<&GenerationError>) + Send + Sync>;

/// Result of generating critical CSS for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
  /// URL or path that was rendered.
  pub src: String,
  /// Critical CSS file the generator was asked to write.
  pub target: String,
  /// Failure reported by the generator.
  pub error: Option<GenerationError>,
}

impl PageOutcome {
  /// Whether the generator completed without error.
  pub fn is_success(&self) -> bool {
    self.error.is_none()
  }
}

/// Generates one critical CSS file per configured page after a bundle write.
pub struct CriticalPlugin<G> {
  config: PluginConfig,
  generator: G,
  callback: Option<CompletionCallback>,
}

impl<G: CriticalGenerator> CriticalPlugin<G> {
  /// Create a plugin for the provided configuration and generator.
  pub fn new(config: PluginConfig, generator: G) -> Self {
    Self {
      config,
      generator,
      callback: None,
    }
  }

  /// Register a callback invoked after each page completes.
  pub fn with_callback<F>(mut self, callback: F) -> Self
  where
    F: Fn(Option<&GenerationError>) + Send + Sync + 'static,
  {
    self.callback = Some(Box::new(callback));
    self
  }

  /// Configuration the plugin was built with.
  pub fn config(&self) -> &PluginConfig {
    &self.config
  }

  /// Run the generator for every page, one at a time.
  ///
  /// Nothing happens when the bundle wrote no stylesheets. Page failures are
  /// logged and handed to the callback; they never stop later pages.
  pub fn generate_pages(
    &self,
    output_options: &OutputOptions,
    bundle: &BundleManifest,
  ) -> Vec<PageOutcome> {
    let css = discover_stylesheets(output_options, bundle);
    if css.is_empty() {
      debug!(files = bundle.len(), "no stylesheets in bundle, skipping critical CSS");
      return Vec::new();
    }
    debug!(stylesheets = ?css, "discovered bundle stylesheets");

    let mut outcomes = Vec::with_capacity(self.config.critical_pages.len());
    for page in &self.config.critical_pages {
      let src = critical_src(&self.config, page);
      let target = critical_dest(page);
      let options = build_generation_options(&css, &self.config, page);

      info!("Generating critical CSS from {src} to {target}");
      let error = self.generator.generate(&options).err();
      if let Some(err) = &error {
        error!(%src, %target, "{err}");
      }
      if let Some(callback) = &self.callback {
        callback(error.as_ref());
      }

      outcomes.push(PageOutcome { src, target, error });
    }

    outcomes
  }
}

impl<G: CriticalGenerator> BundlePlugin for CriticalPlugin<G> {
  fn name(&self) -> &str {
    PLUGIN_NAME
  }

  fn write_bundle(&self, output_options: &OutputOptions, bundle: &BundleManifest) -> Result<()> {
    let outcomes = self.generate_pages(output_options, bundle);
    let failed = outcomes.iter().filter(|outcome| !outcome.is_success()).count();
    debug!(pages = outcomes.len(), failed, "critical CSS pass finished");
    Ok(())
  }
}
