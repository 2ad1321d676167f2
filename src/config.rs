//! Plugin configuration describing which pages receive critical CSS.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Config file names probed by [`PluginConfig::discover`], in priority order.
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
  "critical.config.json",
  "critical.config.yaml",
  "critical.config.yml",
];

/// Errors raised while locating or parsing a plugin configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// None of the candidate files exist in the searched directory.
  #[error("no critical config found in {}", .0.display())]
  NotFound(PathBuf),
  /// Failed to read the configuration file.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The file is not valid JSON for a plugin configuration.
  #[error("failed to parse {}: {source}", path.display())]
  Json {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
  /// The file is not valid YAML for a plugin configuration.
  #[error("failed to parse {}: {source}", path.display())]
  Yaml {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_yaml::Error,
  },
}

/// One page to render when extracting critical CSS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageSpec {
  /// Appended to `criticalUrl` to form the URL that gets scraped.
  pub uri: Option<String>,
  /// Output path stem; `_critical.min.css` is appended to it.
  pub template: Option<String>,
}

impl PageSpec {
  /// Build a page from a URI and an output template.
  pub fn new(uri: impl Into<String>, template: impl Into<String>) -> Self {
    Self {
      uri: Some(uri.into()),
      template: Some(template.into()),
    }
  }

  /// URI fragment, empty when unset.
  pub fn uri(&self) -> &str {
    self.uri.as_deref().unwrap_or_default()
  }

  /// Template stem, empty when unset.
  pub fn template(&self) -> &str {
    self.template.as_deref().unwrap_or_default()
  }
}

/// Configuration supplied once when the plugin is constructed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
  /// Base URL or filesystem path that page URIs are appended to.
  pub critical_url: String,
  /// Base directory the generator writes critical CSS files under.
  #[serde(default)]
  pub critical_base: Option<String>,
  /// Pages processed in order on every bundle write.
  #[serde(default)]
  pub critical_pages: Vec<PageSpec>,
  /// Generator options merged last, overriding defaults and computed fields.
  #[serde(default)]
  pub critical_config: Option<Map<String, Value>>,
}

impl PluginConfig {
  /// Locate and load the first candidate config file inside `dir`.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    let candidate = CONFIG_FILE_CANDIDATES
      .iter()
      .map(|name| dir.join(name))
      .find(|path| path.is_file())
      .ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;
    Self::from_path(&candidate)
  }

  /// Read configuration from a JSON or YAML file, chosen by extension.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
      serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
      })
    } else {
      serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
      })
    }
  }
}
