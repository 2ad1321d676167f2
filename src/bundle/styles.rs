//! Stylesheet discovery over the files a bundle just wrote.

use std::path::{Component, Path, PathBuf};

use crate::bundle::manifest::{AssetKind, BundleManifest, OutputOptions};

const STYLESHEET_SUFFIX: &str = ".css";

/// Collect the on-disk paths of every emitted stylesheet asset.
///
/// Only entries tagged as static assets whose file name ends in `.css` are
/// returned. Paths are the output directory joined with the file name (see
/// [`join_output_path`]) and keep the manifest's emission order.
pub fn discover_stylesheets(output_options: &OutputOptions, bundle: &BundleManifest) -> Vec<PathBuf> {
  let dir = output_options.dir.as_deref().unwrap_or(Path::new(""));

  bundle
    .assets()
    .filter(|asset| asset.kind == AssetKind::Asset && asset.file_name.ends_with(STYLESHEET_SUFFIX))
    .map(|asset| join_output_path(dir, &asset.file_name))
    .collect()
}

/// Join an emitted file name onto the output directory, resolving `.` and `..`.
///
/// A leading `/` on the file name is treated as relative to `dir`, so the
/// output directory is never dropped.
pub fn join_output_path(dir: &Path, file_name: &str) -> PathBuf {
  let file_parts = Path::new(file_name)
    .components()
    .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)));

  let mut joined = PathBuf::new();
  for component in dir.components().chain(file_parts) {
    match component {
      Component::CurDir => {}
      Component::ParentDir if matches!(joined.components().next_back(), Some(Component::Normal(_))) => {
        joined.pop();
      }
      other => joined.push(other.as_os_str()),
    }
  }
  joined
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bundle::manifest::AssetDescriptor;

  fn bundle() -> BundleManifest {
    [
      AssetDescriptor::asset("assets/theme-123.css"),
      AssetDescriptor::chunk("assets/index.js"),
      AssetDescriptor::chunk("assets/chunk.css"),
      AssetDescriptor::asset("assets/logo.svg"),
      AssetDescriptor::asset("assets/print.CSS"),
      AssetDescriptor::asset("app.css"),
    ]
    .into_iter()
    .collect()
  }

  #[test]
  fn keeps_only_css_assets_in_emission_order() {
    let found = discover_stylesheets(&OutputOptions::with_dir("dist"), &bundle());
    assert_eq!(found, vec![
      PathBuf::from("dist").join("assets/theme-123.css"),
      PathBuf::from("dist").join("app.css"),
    ]);
  }

  #[test]
  fn missing_output_dir_yields_relative_paths() {
    let found = discover_stylesheets(&OutputOptions::default(), &bundle());
    assert_eq!(found, vec![
      PathBuf::from("assets/theme-123.css"),
      PathBuf::from("app.css")
    ]);
  }

  #[test]
  fn resolves_dot_segments_like_node_path_join() {
    let dist = Path::new("dist");
    assert_eq!(join_output_path(dist, "./assets/a.css"), PathBuf::from("dist/assets/a.css"));
    assert_eq!(join_output_path(Path::new("./dist"), "app.css"), PathBuf::from("dist/app.css"));
    assert_eq!(
      join_output_path(Path::new("dist/app"), "../shared/a.css"),
      PathBuf::from("dist/shared/a.css")
    );
    assert_eq!(join_output_path(Path::new(""), "../a.css"), PathBuf::from("../a.css"));
  }

  #[cfg(unix)]
  #[test]
  fn absolute_file_names_stay_under_the_output_dir() {
    assert_eq!(join_output_path(Path::new("dist"), "/abs.css"), PathBuf::from("dist/abs.css"));
    assert_eq!(join_output_path(Path::new("/srv/dist"), "a.css"), PathBuf::from("/srv/dist/a.css"));
  }

  #[test]
  fn discovery_normalises_emitted_names() {
    let bundle: BundleManifest = [AssetDescriptor::asset("./assets/a.css")].into_iter().collect();
    assert_eq!(
      discover_stylesheets(&OutputOptions::with_dir("dist"), &bundle),
      vec![PathBuf::from("dist/assets/a.css")]
    );
  }

  #[test]
  fn bundle_without_stylesheets_is_empty() {
    let bundle: BundleManifest = [AssetDescriptor::chunk("main.js")].into_iter().collect();
    assert!(discover_stylesheets(&OutputOptions::with_dir("dist"), &bundle).is_empty());
  }
}
