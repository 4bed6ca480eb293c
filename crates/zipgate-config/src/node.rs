//! Owned configuration tree

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use zipgate_core::{ConfigSource, Error, Fragment, Result};

/// An element of a configuration tree: a name, string attributes and
/// ordered children.
///
/// Documents map onto the tree as follows:
///
/// ```yaml
/// compression:                  # child element "compression"
///   preferredAlgorithm: gzip    # scalar -> attribute
///   excludedPaths:              # sequence -> child element "excludedPaths"
///     - add: { path: /health }  # item -> entry "add" with attributes
///     - delete: { path: .axd }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNode {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child element
    pub fn child(mut self, child: ConfigNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child element in place
    pub fn push_child(&mut self, child: ConfigNode) {
        self.children.push(child);
    }

    /// Element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes, sorted by name
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Child elements in document order
    pub fn child_nodes(&self) -> &[ConfigNode] {
        &self.children
    }

    /// Follow a `/`-separated chain of child scopes.
    ///
    /// Each segment selects the first child with that name. An empty path
    /// resolves to `self`.
    pub fn lookup(&self, path: &str) -> Option<&ConfigNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| {
                node.children.iter().find(|child| child.name == segment)
            })
    }

    /// Build a tree from a parsed document.
    ///
    /// The document root must be a mapping.
    pub fn from_value(name: impl Into<String>, value: &Value) -> Result<Self> {
        let name = name.into();
        match value {
            Value::Object(map) => Self::from_map(name, map),
            other => Err(Error::Config(format!(
                "'{}' must be a mapping, found {}",
                name,
                kind_of(other)
            ))),
        }
    }

    fn from_map(name: String, map: &Map<String, Value>) -> Result<Self> {
        let mut node = ConfigNode::new(name);

        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    node.attributes.insert(key.clone(), s.clone());
                }
                Value::Number(n) => {
                    node.attributes.insert(key.clone(), n.to_string());
                }
                Value::Bool(b) => {
                    node.attributes.insert(key.clone(), b.to_string());
                }
                Value::Object(child) => {
                    node.children.push(Self::from_map(key.clone(), child)?);
                }
                Value::Array(items) => {
                    node.children.push(Self::from_sequence(key, items)?);
                }
            }
        }

        Ok(node)
    }

    fn from_sequence(name: &str, items: &[Value]) -> Result<Self> {
        let mut node = ConfigNode::new(name);

        for (index, item) in items.iter().enumerate() {
            let entry = item
                .as_object()
                .filter(|map| map.len() == 1)
                .and_then(|map| map.iter().next())
                .ok_or_else(|| {
                    Error::Config(format!(
                        "'{name}[{index}]' must be a single-key mapping such as {{ add: {{ ... }} }}"
                    ))
                })?;

            let child = match entry {
                (entry_name, Value::Null) => ConfigNode::new(entry_name.clone()),
                (entry_name, Value::Object(body)) => Self::from_map(entry_name.clone(), body)?,
                (entry_name, other) => {
                    return Err(Error::Config(format!(
                        "'{name}[{index}].{entry_name}' must be a mapping, found {}",
                        kind_of(other)
                    )))
                }
            };
            node.children.push(child);
        }

        Ok(node)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

impl Fragment for ConfigNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn children(&self) -> Vec<&dyn Fragment> {
        self.children.iter().map(|c| c as &dyn Fragment).collect()
    }
}

impl ConfigSource for ConfigNode {
    fn fragments(&self, path: &str) -> Vec<&dyn Fragment> {
        self.lookup(path)
            .map(|node| vec![node as &dyn Fragment])
            .unwrap_or_default()
    }
}
