//! Per-page generator options assembled from layered configuration.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::config::{PageSpec, PluginConfig};

/// Appended to a page template to name its critical CSS output.
pub const CRITICAL_SUFFIX: &str = "_critical.min.css";

/// Options handed to the generator for a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GenerationOptions(Map<String, Value>);

impl GenerationOptions {
  /// Look up a single option.
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  /// Page URL or path the generator renders.
  pub fn src(&self) -> Option<&str> {
    self.get("src").and_then(Value::as_str)
  }

  /// File the generator writes critical CSS to.
  pub fn target(&self) -> Option<&str> {
    self.get("target").and_then(Value::as_str)
  }

  /// Borrow the merged options.
  pub fn as_map(&self) -> &Map<String, Value> {
    &self.0
  }

  /// Take ownership of the merged options.
  pub fn into_map(self) -> Map<String, Value> {
    self.0
  }
}

impl From<Map<String, Value>> for GenerationOptions {
  fn from(map: Map<String, Value>) -> Self {
    Self(map)
  }
}

/// Built-in generator defaults applied beneath computed and user options.
pub fn default_critical_config() -> Map<String, Value> {
  Map::from_iter([
    ("inline".to_string(), json!(false)),
    ("minify".to_string(), json!(true)),
    ("extract".to_string(), json!(false)),
    ("width".to_string(), json!(1200)),
    ("height".to_string(), json!(1200)),
    ("penthouse".to_string(), json!({ "blockJSRequests": false })),
  ])
}

/// Merge option layers, later layers winning on key collisions.
///
/// The merge is shallow: a top-level key from a later layer replaces the
/// earlier value wholesale, so nested objects such as `penthouse` are never
/// combined field by field.
pub fn merge_layers<I>(layers: I) -> Map<String, Value>
where
  I: IntoIterator<Item = Map<String, Value>>,
{
  let mut merged = Map::new();
  for layer in layers {
    for (key, value) in layer {
      merged.insert(key, value);
    }
  }
  merged
}

/// URL rendered for a page: `criticalUrl` followed by the page URI, verbatim.
pub fn critical_src(config: &PluginConfig, page: &PageSpec) -> String {
  format!("{}{}", config.critical_url, page.uri())
}

/// Output file for a page: its template followed by [`CRITICAL_SUFFIX`].
pub fn critical_dest(page: &PageSpec) -> String {
  format!("{}{CRITICAL_SUFFIX}", page.template())
}

/// Assemble the options for one page.
///
/// Layers, lowest precedence first: the discovered stylesheets, the built-in
/// defaults, the computed `base`/`src`/`target`, then `criticalConfig`.
pub fn build_generation_options(
  css: &[PathBuf],
  config: &PluginConfig,
  page: &PageSpec,
) -> GenerationOptions {
  let css_layer = Map::from_iter([(
    "css".to_string(),
    Value::Array(
      css
        .iter()
        .map(|path| Value::String(path.to_string_lossy().into_owned()))
        .collect(),
    ),
  )]);

  let mut computed = Map::new();
  if let Some(base) = &config.critical_base {
    computed.insert("base".into(), Value::String(base.clone()));
  }
  computed.insert("src".into(), Value::String(critical_src(config, page)));
  computed.insert("target".into(), Value::String(critical_dest(page)));

  let overrides = config.critical_config.clone().unwrap_or_default();

  merge_layers([css_layer, default_critical_config(), computed, overrides]).into()
}
