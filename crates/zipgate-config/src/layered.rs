//! Layered configuration
//!
//! A stack of configuration trees where each layer is a narrower scope
//! than the one before it:
//! - base.yaml (application defaults)
//! - site.yaml (site-specific exclusions)
//! - local.yaml (developer overrides)
//!
//! Layers are never merged into one tree. Consumers fold the fragments of
//! each layer in order, which lets a narrow scope retract what a broad
//! scope declared.

use crate::ConfigNode;
use zipgate_core::{ConfigSource, Fragment};

/// Ordered configuration layers, outermost first
#[derive(Debug, Clone, Default)]
pub struct LayeredConfig {
    layers: Vec<ConfigNode>,
}

impl LayeredConfig {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a narrower layer on top of the stack
    pub fn push(&mut self, layer: ConfigNode) {
        self.layers.push(layer);
    }

    /// Builder-style [`push`](Self::push)
    pub fn with_layer(mut self, layer: ConfigNode) -> Self {
        self.push(layer);
        self
    }

    /// Layers, outermost first
    pub fn layers(&self) -> &[ConfigNode] {
        &self.layers
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl FromIterator<ConfigNode> for LayeredConfig {
    fn from_iter<I: IntoIterator<Item = ConfigNode>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}

impl ConfigSource for LayeredConfig {
    fn fragments(&self, path: &str) -> Vec<&dyn Fragment> {
        let found: Vec<&dyn Fragment> = self
            .layers
            .iter()
            .filter_map(|layer| layer.lookup(path))
            .map(|node| node as &dyn Fragment)
            .collect();

        tracing::trace!(
            path,
            layers = self.layers.len(),
            found = found.len(),
            "Resolved layered fragments"
        );

        found
    }
}
