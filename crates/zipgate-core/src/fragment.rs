//! Read-only view over a hierarchical configuration tree

use std::fmt;

/// A node of a hierarchical configuration source.
///
/// A fragment is an element with a local name, string attributes and
/// ordered child elements. Child elements are fragments themselves, so an
/// `<add type="..."/>` entry and an `<excludedPaths>` scope share the same
/// shape.
pub trait Fragment: fmt::Debug {
    /// Local name of this element
    fn name(&self) -> &str;

    /// Look up an attribute by name
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Child elements in document order
    fn children(&self) -> Vec<&dyn Fragment>;

    /// First child element named `name`
    fn child_scope(&self, name: &str) -> Option<&dyn Fragment> {
        self.children().into_iter().find(|child| child.name() == name)
    }
}

/// Resolves configuration fragments by a well-known path.
///
/// Layered sources return one fragment per layer that declares the path,
/// outermost scope first, so that callers can fold them in override order.
pub trait ConfigSource: Send + Sync + fmt::Debug {
    /// Fragments found at `path`, outermost first
    fn fragments(&self, path: &str) -> Vec<&dyn Fragment>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Element {
        name: &'static str,
        attributes: Vec<(&'static str, &'static str)>,
        children: Vec<Element>,
    }

    impl Fragment for Element {
        fn name(&self) -> &str {
            self.name
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
        }

        fn children(&self) -> Vec<&dyn Fragment> {
            self.children.iter().map(|c| c as &dyn Fragment).collect()
        }
    }

    fn leaf(name: &'static str) -> Element {
        Element {
            name,
            attributes: vec![("type", name)],
            children: vec![],
        }
    }

    #[test]
    fn test_child_scope_returns_first_match() {
        let root = Element {
            name: "compression",
            attributes: vec![],
            children: vec![leaf("add"), leaf("delete"), leaf("add")],
        };

        let found = root.child_scope("delete").unwrap();
        assert_eq!(found.attribute("type"), Some("delete"));
        assert!(root.child_scope("excludedPaths").is_none());
        assert_eq!(root.children().len(), 3);
    }
}
