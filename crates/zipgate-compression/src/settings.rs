//! Compression settings and exclusion matching
//!
//! A [`Settings`] is built once per configuration epoch: start from the
//! defaults, merge each configuration fragment from the outermost scope to
//! the innermost, then share it read-only with request handlers.
//!
//! Fragment layout:
//!
//! ```yaml
//! compression:
//!   preferredAlgorithm: gzip        # gzip | deflate | default
//!   compressionLevel: high          # high | normal | low | default
//!   excludedMimeTypes:
//!     - add: { type: image/png }
//!     - delete: { type: text/css }
//!   excludedPaths:
//!     - add: { path: /health }                  # literal, case-insensitive
//!     - add: { path: "^/api/", type: regex }    # pattern, raw path
//!     - delete: { path: .axd }
//! ```
//!
//! Malformed algorithm or level values and entries missing their value
//! attribute are skipped. An unknown path expression `type` or a pattern
//! that does not compile fails the merge.

use crate::algorithm::{Algorithm, CompressionLevel, Decoded};
use crate::rules::{ExpressionKind, PathRules};
use std::collections::HashSet;
use tracing::{debug, trace};
use zipgate_core::{ConfigSource, Fragment, Result};

/// Well-known path of the compression section in a [`ConfigSource`]
pub const SECTION_PATH: &str = "compression";

/// Path literal excluded by default
const DEFAULT_EXCLUDED_PATH: &str = ".axd";

const PREFERRED_ALGORITHM: &str = "preferredAlgorithm";
const COMPRESSION_LEVEL: &str = "compressionLevel";
const EXCLUDED_MIME_TYPES: &str = "excludedMimeTypes";
const EXCLUDED_PATHS: &str = "excludedPaths";
const ADD: &str = "add";
const DELETE: &str = "delete";
const TYPE: &str = "type";
const PATH: &str = "path";

/// Compression preferences and exclusion rules
#[derive(Debug, Clone)]
pub struct Settings {
    preferred_algorithm: Algorithm,
    compression_level: CompressionLevel,
    excluded_mime_types: HashSet<String>,
    excluded_paths: PathRules,
}

impl Default for Settings {
    fn default() -> Self {
        let mut excluded_paths = PathRules::new();
        excluded_paths.add_literal(DEFAULT_EXCLUDED_PATH);

        Self {
            preferred_algorithm: Algorithm::Default,
            compression_level: CompressionLevel::Default,
            excluded_mime_types: HashSet::new(),
            excluded_paths,
        }
    }
}

impl Settings {
    /// Default settings: no preferences, only `.axd` excluded
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings merged with `fragment`
    pub fn from_fragment(fragment: Option<&dyn Fragment>) -> Result<Self> {
        let mut settings = Self::default();
        settings.merge(fragment)?;
        Ok(settings)
    }

    /// Resolve settings from the [`SECTION_PATH`] section of `source`.
    ///
    /// Every fragment the source returns is merged in order, outermost
    /// first. A source without the section yields the defaults. Nothing is
    /// cached between calls.
    pub fn resolve(source: &dyn ConfigSource) -> Result<Self> {
        let fragments = source.fragments(SECTION_PATH);
        if fragments.is_empty() {
            debug!(path = SECTION_PATH, "No compression section, using defaults");
        }

        let mut settings = Self::default();
        for fragment in fragments {
            settings.merge(Some(fragment))?;
        }
        Ok(settings)
    }

    /// Fold a configuration fragment into these settings.
    ///
    /// `None` leaves the settings untouched. On error the entries applied
    /// before the failing one stay applied; the caller is expected to drop
    /// the settings as a failed configuration load.
    pub fn merge(&mut self, fragment: Option<&dyn Fragment>) -> Result<()> {
        let Some(fragment) = fragment else {
            return Ok(());
        };

        if let Some(value) = fragment.attribute(PREFERRED_ALGORITHM) {
            match Algorithm::decode(value) {
                Decoded::Value(algorithm) => self.preferred_algorithm = algorithm,
                Decoded::Unrecognized => debug!(
                    value,
                    kept = %self.preferred_algorithm,
                    "Ignoring unrecognized preferredAlgorithm"
                ),
            }
        }

        if let Some(value) = fragment.attribute(COMPRESSION_LEVEL) {
            match CompressionLevel::decode(value) {
                Decoded::Value(level) => self.compression_level = level,
                Decoded::Unrecognized => debug!(
                    value,
                    kept = %self.compression_level,
                    "Ignoring unrecognized compressionLevel"
                ),
            }
        }

        if let Some(scope) = fragment.child_scope(EXCLUDED_MIME_TYPES) {
            self.merge_mime_types(scope);
        }

        if let Some(scope) = fragment.child_scope(EXCLUDED_PATHS) {
            self.merge_paths(scope)?;
        }

        Ok(())
    }

    fn merge_mime_types(&mut self, scope: &dyn Fragment) {
        for entry in scope.children() {
            let name = entry.name();
            if name != ADD && name != DELETE {
                continue;
            }

            let Some(mime_type) = entry.attribute(TYPE) else {
                debug!(entry = name, "Ignoring excludedMimeTypes entry without type");
                continue;
            };

            let mime_type = mime_type.to_lowercase();
            trace!(entry = name, mime_type = %mime_type, "Applying MIME type exclusion");
            if name == ADD {
                self.excluded_mime_types.insert(mime_type);
            } else {
                self.excluded_mime_types.remove(&mime_type);
            }
        }
    }

    fn merge_paths(&mut self, scope: &dyn Fragment) -> Result<()> {
        for entry in scope.children() {
            let name = entry.name();
            if name != ADD && name != DELETE {
                continue;
            }

            let kind = ExpressionKind::from_attribute(entry.attribute(TYPE))?;

            let Some(path) = entry.attribute(PATH) else {
                debug!(entry = name, "Ignoring excludedPaths entry without path");
                continue;
            };

            trace!(entry = name, %kind, path, "Applying path exclusion");
            match (name == ADD, kind) {
                (true, ExpressionKind::String) => self.excluded_paths.add_literal(path),
                (true, ExpressionKind::Regex) => self.excluded_paths.add_pattern(path)?,
                (false, ExpressionKind::String) => {
                    self.excluded_paths.remove_literal(path);
                }
                (false, ExpressionKind::Regex) => {
                    self.excluded_paths.remove_pattern(path)?;
                }
            }
        }

        Ok(())
    }

    /// Preferred algorithm
    pub fn preferred_algorithm(&self) -> Algorithm {
        self.preferred_algorithm
    }

    /// Preferred level
    pub fn compression_level(&self) -> CompressionLevel {
        self.compression_level
    }

    /// Whether responses of `mime_type` bypass compression.
    ///
    /// An unknown MIME type (`None`) is always excluded. Matching is exact
    /// and case-insensitive; `text/*` only matches a stored `text/*`.
    pub fn is_excluded_mime_type(&self, mime_type: Option<&str>) -> bool {
        match mime_type {
            None => true,
            Some(mime_type) => self.excluded_mime_types.contains(&mime_type.to_lowercase()),
        }
    }

    /// Whether requests for `path` bypass compression.
    ///
    /// True if the lower-cased path is an excluded literal or any pattern,
    /// in insertion order, matches the raw path. There is no "unknown path"
    /// case: callers must supply a path.
    ///
    /// ```compile_fail
    /// use zipgate_compression::Settings;
    ///
    /// Settings::new().is_excluded_path(None);
    /// ```
    pub fn is_excluded_path(&self, path: &str) -> bool {
        self.excluded_paths.is_excluded(path)
    }

    /// Excluded MIME types (lower-cased, unordered)
    pub fn excluded_mime_types(&self) -> impl Iterator<Item = &str> {
        self.excluded_mime_types.iter().map(String::as_str)
    }

    /// Path exclusion rules
    pub fn excluded_paths(&self) -> &PathRules {
        &self.excluded_paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipgate_config::ConfigNode;
    use zipgate_core::Error;

    fn mime(entry: &str, mime_type: &str) -> ConfigNode {
        ConfigNode::new(entry).attr(TYPE, mime_type)
    }

    fn path(entry: &str, path: &str) -> ConfigNode {
        ConfigNode::new(entry).attr(PATH, path)
    }

    fn pattern(entry: &str, source: &str) -> ConfigNode {
        path(entry, source).attr(TYPE, "regex")
    }

    fn mime_scope(entries: Vec<ConfigNode>) -> ConfigNode {
        entries
            .into_iter()
            .fold(ConfigNode::new(EXCLUDED_MIME_TYPES), ConfigNode::child)
    }

    fn path_scope(entries: Vec<ConfigNode>) -> ConfigNode {
        entries
            .into_iter()
            .fold(ConfigNode::new(EXCLUDED_PATHS), ConfigNode::child)
    }

    fn section() -> ConfigNode {
        ConfigNode::new(SECTION_PATH)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::new();
        assert_eq!(settings.preferred_algorithm(), Algorithm::Default);
        assert_eq!(settings.compression_level(), CompressionLevel::Default);
        assert_eq!(settings.excluded_mime_types().count(), 0);
        assert_eq!(settings.excluded_paths().literals().collect::<Vec<_>>(), vec![".axd"]);
        assert_eq!(settings.excluded_paths().patterns().count(), 0);

        assert!(settings.is_excluded_path(".axd"));
        assert!(settings.is_excluded_path(".AXD"));
        assert!(!settings.is_excluded_path("/index.html"));
        assert!(!settings.is_excluded_mime_type(Some("text/html")));
    }

    #[test]
    fn test_merge_none_is_noop() {
        let mut settings = Settings::new();
        settings.merge(None).unwrap();
        assert!(settings.is_excluded_path(".axd"));
        assert_eq!(settings.excluded_paths().len(), 1);
    }

    #[test]
    fn test_merge_preferences() {
        let fragment = section()
            .attr(PREFERRED_ALGORITHM, "GZip")
            .attr(COMPRESSION_LEVEL, "high");
        let settings = Settings::from_fragment(Some(&fragment)).unwrap();

        assert_eq!(settings.preferred_algorithm(), Algorithm::Gzip);
        assert_eq!(settings.compression_level(), CompressionLevel::High);
    }

    #[test]
    fn test_unrecognized_preferences_keep_prior_values() {
        let mut settings = Settings::from_fragment(Some(
            &section()
                .attr(PREFERRED_ALGORITHM, "deflate")
                .attr(COMPRESSION_LEVEL, "low"),
        ))
        .unwrap();

        settings
            .merge(Some(
                &section()
                    .attr(PREFERRED_ALGORITHM, "bogus")
                    .attr(COMPRESSION_LEVEL, "extreme"),
            ))
            .unwrap();

        assert_eq!(settings.preferred_algorithm(), Algorithm::Deflate);
        assert_eq!(settings.compression_level(), CompressionLevel::Low);
    }

    #[test]
    fn test_mime_add_and_delete() {
        let fragment = section().child(mime_scope(vec![
            mime(ADD, "Image/PNG"),
            mime(ADD, "video/mp4"),
            mime(ADD, "image/png"),
            mime(DELETE, "VIDEO/MP4"),
            mime(DELETE, "never/added"),
        ]));
        let settings = Settings::from_fragment(Some(&fragment)).unwrap();

        assert_eq!(settings.excluded_mime_types().collect::<Vec<_>>(), vec!["image/png"]);
        assert!(settings.is_excluded_mime_type(Some("image/png")));
        assert!(settings.is_excluded_mime_type(Some("IMAGE/Png")));
        assert!(!settings.is_excluded_mime_type(Some("video/mp4")));
    }

    #[test]
    fn test_mime_entries_without_type_or_unknown_name_are_ignored() {
        let fragment = section().child(mime_scope(vec![
            ConfigNode::new(ADD),
            ConfigNode::new(DELETE).attr("value", "image/png"),
            ConfigNode::new("clear"),
            mime("remove", "text/html"),
            mime(ADD, "application/zip"),
        ]));
        let settings = Settings::from_fragment(Some(&fragment)).unwrap();

        assert_eq!(settings.excluded_mime_types().collect::<Vec<_>>(), vec!["application/zip"]);
    }

    #[test]
    fn test_unknown_mime_type_is_excluded() {
        // An absent MIME type is excluded. An absent path cannot be asked
        // about at all: is_excluded_path takes &str, and passing None is a
        // compile error (see its compile_fail doc example).
        let settings = Settings::new();
        assert!(settings.is_excluded_mime_type(None));
        assert!(!settings.is_excluded_path(""));
    }

    #[test]
    fn test_wildcards_match_exactly() {
        let fragment = section().child(mime_scope(vec![mime(ADD, "image/*")]));
        let settings = Settings::from_fragment(Some(&fragment)).unwrap();

        assert!(settings.is_excluded_mime_type(Some("image/*")));
        assert!(!settings.is_excluded_mime_type(Some("image/png")));
    }

    #[test]
    fn test_path_literals_and_patterns() {
        let fragment = section().child(path_scope(vec![
            path(ADD, "/Health"),
            pattern(ADD, r"^/api/.*\.json$"),
        ]));
        let settings = Settings::from_fragment(Some(&fragment)).unwrap();

        assert!(settings.is_excluded_path("/health"));
        assert!(settings.is_excluded_path("/HEALTH"));
        assert!(settings.is_excluded_path("/api/report.json"));
        assert!(!settings.is_excluded_path("/api/report.xml"));
        assert!(settings.is_excluded_path(".axd"));
    }

    #[test]
    fn test_path_type_is_case_insensitive_and_defaults_to_string() {
        let fragment = section().child(path_scope(vec![
            path(ADD, "^/literal$").attr(TYPE, ""),
            path(ADD, "^/pattern$").attr(TYPE, "REGEX"),
            path(ADD, "/explicit").attr(TYPE, "String"),
        ]));
        let settings = Settings::from_fragment(Some(&fragment)).unwrap();

        assert!(settings.is_excluded_path("^/literal$"));
        assert!(!settings.is_excluded_path("/literal"));
        assert!(settings.is_excluded_path("/pattern"));
        assert!(settings.is_excluded_path("/explicit"));
    }

    #[test]
    fn test_delete_default_literal() {
        let fragment = section().child(path_scope(vec![path(DELETE, ".AXD")]));
        let settings = Settings::from_fragment(Some(&fragment)).unwrap();
        assert!(!settings.is_excluded_path(".axd"));
        assert!(settings.excluded_paths().is_empty());
    }

    #[test]
    fn test_delete_missing_rules_is_noop() {
        let fragment = section().child(path_scope(vec![
            path(DELETE, "/never"),
            pattern(DELETE, "^/never$"),
        ]));
        let settings = Settings::from_fragment(Some(&fragment)).unwrap();
        assert_eq!(settings.excluded_paths().len(), 1);
    }

    #[test]
    fn test_path_entries_without_path_are_ignored() {
        let fragment = section().child(path_scope(vec![
            ConfigNode::new(ADD).attr(TYPE, "regex"),
            ConfigNode::new(DELETE),
            path("clear", ".axd"),
        ]));
        let settings = Settings::from_fragment(Some(&fragment)).unwrap();
        assert_eq!(settings.excluded_paths().literals().collect::<Vec<_>>(), vec![".axd"]);
    }

    #[test]
    fn test_unknown_expression_type_fails_merge() {
        let fragment = section()
            .attr(PREFERRED_ALGORITHM, "gzip")
            .child(path_scope(vec![path(ADD, "/static/*").attr(TYPE, "glob")]));

        let err = Settings::from_fragment(Some(&fragment)).unwrap_err();
        assert!(matches!(err, Error::UnknownExpressionType(ref kind) if kind == "glob"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_expression_type_fails_even_without_path() {
        let fragment = section().child(path_scope(vec![ConfigNode::new(DELETE).attr(TYPE, "wildcard")]));
        assert!(Settings::from_fragment(Some(&fragment)).is_err());
    }

    #[test]
    fn test_invalid_pattern_fails_merge() {
        let fragment = section().child(path_scope(vec![pattern(ADD, "^/api/(v1")]));
        let err = Settings::from_fragment(Some(&fragment)).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "^/api/(v1"));
    }

    #[test]
    fn test_failed_merge_keeps_entries_applied_before_failure() {
        let mut settings = Settings::new();
        let fragment = section().child(path_scope(vec![
            path(ADD, "/first"),
            pattern(ADD, "("),
            path(ADD, "/never-reached"),
        ]));

        assert!(settings.merge(Some(&fragment)).is_err());
        assert!(settings.is_excluded_path("/first"));
        assert!(!settings.is_excluded_path("/never-reached"));
    }

    #[test]
    fn test_nested_scopes_override() {
        let app = section()
            .attr(PREFERRED_ALGORITHM, "gzip")
            .child(mime_scope(vec![mime(ADD, "image/png"), mime(ADD, "image/jpeg")]))
            .child(path_scope(vec![pattern(ADD, "^/downloads/")]));
        let site = section()
            .attr(COMPRESSION_LEVEL, "low")
            .child(mime_scope(vec![mime(DELETE, "image/png")]))
            .child(path_scope(vec![pattern(DELETE, "^/downloads/"), path(DELETE, ".axd")]));

        let mut settings = Settings::from_fragment(Some(&app)).unwrap();
        settings.merge(Some(&site)).unwrap();

        assert_eq!(settings.preferred_algorithm(), Algorithm::Gzip);
        assert_eq!(settings.compression_level(), CompressionLevel::Low);
        assert!(!settings.is_excluded_mime_type(Some("image/png")));
        assert!(settings.is_excluded_mime_type(Some("image/jpeg")));
        assert!(!settings.is_excluded_path("/downloads/file.zip"));
        assert!(settings.excluded_paths().is_empty());
    }

    #[test]
    fn test_resolve_from_source() {
        let root = ConfigNode::new("root").child(section().attr(PREFERRED_ALGORITHM, "deflate"));
        let settings = Settings::resolve(&root).unwrap();
        assert_eq!(settings.preferred_algorithm(), Algorithm::Deflate);

        let empty = ConfigNode::new("root");
        let settings = Settings::resolve(&empty).unwrap();
        assert_eq!(settings.preferred_algorithm(), Algorithm::Default);
        assert!(settings.is_excluded_path(".axd"));
    }
}
