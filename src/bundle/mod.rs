//! Views over the bundler's output: the written-files manifest and the stylesheets in it.

pub mod manifest;
pub mod styles;

pub use manifest::{AssetDescriptor, AssetKind, BundleManifest, OutputOptions};
pub use styles::discover_stylesheets;
