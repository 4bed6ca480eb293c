//! # zipgate Core
//!
//! Core types, traits, and error handling shared by the zipgate crates.
//!
//! This crate provides the foundational abstractions:
//! - Error types
//! - The [`Fragment`] view over a hierarchical configuration tree
//! - The [`ConfigSource`] that resolves fragments by path

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod fragment;

pub use error::{Error, Result};
pub use fragment::{ConfigSource, Fragment};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::fragment::{ConfigSource, Fragment};
}
