//! Configuration loading

use crate::{ConfigFormat, ConfigNode, LayeredConfig};
use regex::Regex;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::Path;
use zipgate_core::{Error, Result};

/// Name given to the root element of every loaded document
pub const ROOT_NAME: &str = "root";

/// Load a configuration tree from a file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ConfigNode> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    let format = ConfigFormat::from_path(path)?;

    tracing::debug!(path = %path.display(), ?format, "Loading configuration file");

    load_from_str(&content, format)
}

/// Expand environment variables in configuration string
/// Supports syntax: ${VAR} and ${VAR:-default}
fn expand_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(:-([^}]*))?\}")
        .map_err(|e| Error::Config(format!("Invalid regex: {e}")))?;

    let mut result = String::with_capacity(content.len());
    let mut last_match = 0;

    for cap in re.captures_iter(content) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let var_name = var_name.as_str();
        let default_value = cap.get(3).map(|m| m.as_str());

        let value = match (env::var(var_name), default_value) {
            (Ok(val), _) => val,
            (Err(_), Some(default)) => default.to_string(),
            (Err(_), None) => {
                return Err(Error::Config(format!(
                    "Environment variable '{var_name}' not set and no default provided"
                )));
            }
        };

        result.push_str(&content[last_match..full_match.start()]);
        result.push_str(&value);
        last_match = full_match.end();
    }

    result.push_str(&content[last_match..]);

    Ok(result)
}

/// Load a configuration tree from a string
pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<ConfigNode> {
    let expanded_content = expand_env_vars(content)?;

    let document: Value = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {e}")))?,
        ConfigFormat::Toml => toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {e}")))?,
        ConfigFormat::Json => serde_json::from_str(&expanded_content)?,
    };

    // An empty YAML document parses as null
    if document.is_null() {
        return Ok(ConfigNode::new(ROOT_NAME));
    }

    ConfigNode::from_value(ROOT_NAME, &document)
}

/// Load multiple configuration files as layers
///
/// Files are layered in order, outermost scope first, so later files
/// override earlier ones:
/// - base.yaml (application defaults)
/// - site.yaml (site-specific exclusions)
/// - local.yaml (developer overrides)
///
/// # Example
///
/// ```no_run
/// use zipgate_config::load_and_merge;
///
/// let layers = load_and_merge(vec!["config/base.yaml", "config/site.yaml"])?;
/// # Ok::<(), zipgate_core::Error>(())
/// ```
pub fn load_and_merge<P: AsRef<Path>>(paths: Vec<P>) -> Result<LayeredConfig> {
    if paths.is_empty() {
        return Err(Error::Config("No configuration files provided".to_string()));
    }

    let mut layers = LayeredConfig::new();

    for path in paths {
        layers.push(load_from_file(path)?);
    }

    Ok(layers)
}
