#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bundle;
pub mod config;
pub mod generator;
pub mod options;
pub mod plugin;

pub use bundle::{AssetDescriptor, AssetKind, BundleManifest, OutputOptions};
pub use config::{ConfigError, PageSpec, PluginConfig};
pub use generator::{CriticalGenerator, GenerationError, NodeCritical};
pub use options::{CRITICAL_SUFFIX, GenerationOptions};
pub use plugin::{BundlePlugin, CompletionCallback, CriticalPlugin, PLUGIN_NAME, PageOutcome};
