//! # zipgate Configuration
//!
//! Configuration trees with support for:
//! - Multiple formats (YAML, TOML, JSON)
//! - Environment variable expansion
//! - Layering (outer scopes first, inner scopes override)
//!
//! Documents are loaded into an owned [`ConfigNode`] tree which implements
//! [`zipgate_core::Fragment`], and layered trees implement
//! [`zipgate_core::ConfigSource`].

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod layered;
pub mod loader;
pub mod node;

pub use layered::LayeredConfig;
pub use loader::{load_and_merge, load_from_file, load_from_str};
pub use node::ConfigNode;

use std::path::Path;
use zipgate_core::{Error, Result};

/// Load a configuration tree from a file
pub fn load<P: AsRef<Path>>(path: P) -> Result<ConfigNode> {
    load_from_file(path)
}

/// Load a configuration tree from a string
pub fn load_str(content: &str, format: ConfigFormat) -> Result<ConfigNode> {
    load_from_str(content, format)
}

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Config("Unable to detect config format".to_string()))?;

        match ext {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(Error::Config(format!("Unsupported config format: {}", ext))),
        }
    }
}
