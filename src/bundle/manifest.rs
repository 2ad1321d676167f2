//! Loading and interpreting the bundler's record of written output files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

/// Kind tag attached to every emitted bundle entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
  /// Static file such as a stylesheet or image.
  Asset,
  /// JavaScript chunk produced from modules.
  Chunk,
  /// Any tag this crate does not know about.
  #[serde(other)]
  Other,
}

/// Descriptor of a single emitted file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetDescriptor {
  /// Kind tag reported by the bundler.
  #[serde(rename = "type")]
  pub kind: AssetKind,
  /// File name relative to the output directory.
  #[serde(rename = "fileName")]
  pub file_name: String,
}

impl AssetDescriptor {
  /// Describe a static asset.
  pub fn asset(file_name: impl Into<String>) -> Self {
    Self {
      kind: AssetKind::Asset,
      file_name: file_name.into(),
    }
  }

  /// Describe a code chunk.
  pub fn chunk(file_name: impl Into<String>) -> Self {
    Self {
      kind: AssetKind::Chunk,
      file_name: file_name.into(),
    }
  }
}

/// Output options the bundler passes to post-write hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputOptions {
  /// Directory the bundle was written to.
  #[serde(default)]
  pub dir: Option<PathBuf>,
}

impl OutputOptions {
  /// Options pointing at a concrete output directory.
  pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
    Self {
      dir: Some(dir.into()),
    }
  }
}

/// Emitted files keyed by file name, in the order the bundler wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct BundleManifest {
  entries: IndexMap<String, AssetDescriptor>,
}

impl BundleManifest {
  /// Load a manifest serialised as a JSON object of descriptors.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("bundle manifest not found at {}", path.display()))?;
    let manifest: BundleManifest = serde_json::from_str(&content)
      .with_context(|| format!("failed to parse bundle manifest {}", path.display()))?;
    Ok(manifest)
  }

  /// Record an emitted file, keyed by its file name.
  pub fn insert(&mut self, descriptor: AssetDescriptor) {
    self
      .entries
      .insert(descriptor.file_name.clone(), descriptor);
  }

  /// Iterate descriptors in emission order.
  pub fn assets(&self) -> impl Iterator<Item = &AssetDescriptor> {
    self.entries.values()
  }

  /// Number of emitted files.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether the bundle wrote no files.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl FromIterator<AssetDescriptor> for BundleManifest {
  fn from_iter<I: IntoIterator<Item = AssetDescriptor>>(iter: I) -> Self {
    let mut manifest = Self::default();
    for descriptor in iter {
      manifest.insert(descriptor);
    }
    manifest
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn loads_manifest_preserving_emission_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bundle.json");
    fs::write(
      &path,
      r#"{
        "z-main.css": { "type": "asset", "fileName": "z-main.css", "source": "body{}" },
        "app.js": { "type": "chunk", "fileName": "app.js", "isEntry": true },
        "a-vendor.css": { "type": "asset", "fileName": "a-vendor.css" },
        "worker.bin": { "type": "prebuilt-chunk", "fileName": "worker.bin" }
      }"#,
    )
    .unwrap();

    let manifest = BundleManifest::from_path(&path).unwrap();
    let names: Vec<&str> = manifest
      .assets()
      .map(|asset| asset.file_name.as_str())
      .collect();

    assert_eq!(names, ["z-main.css", "app.js", "a-vendor.css", "worker.bin"]);
    let kinds: Vec<AssetKind> = manifest.assets().map(|asset| asset.kind).collect();
    assert_eq!(kinds, [
      AssetKind::Asset,
      AssetKind::Chunk,
      AssetKind::Asset,
      AssetKind::Other
    ]);
  }

  #[test]
  fn missing_manifest_mentions_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = BundleManifest::from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
  }

  #[test]
  fn output_options_dir_is_optional() {
    let options: OutputOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, OutputOptions::default());
  }
}
