//! Compression preferences and exclusion rules for zipgate
//!
//! Decides, per request, whether a MIME type or URL path bypasses response
//! compression, and which algorithm and level a request should prefer.
//!
//! Features:
//! - Case-insensitive MIME type exclusions
//! - Path exclusions as literals or regex patterns
//! - Layered configuration (outer scopes first, inner scopes add or retract)
//! - Lock-free reload through [`SettingsHandle`]
//!
//! # Example
//!
//! ```
//! use zipgate_compression::Settings;
//!
//! let settings = Settings::default();
//! assert!(settings.is_excluded_path(".AXD"));
//! assert!(!settings.is_excluded_mime_type(Some("text/html")));
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod algorithm;
pub mod handle;
pub mod rules;
pub mod settings;

pub use algorithm::{Algorithm, CompressionLevel, Decoded};
pub use handle::SettingsHandle;
pub use rules::{ExpressionKind, PathRule, PathRules};
pub use settings::{Settings, SECTION_PATH};
