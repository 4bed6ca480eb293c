//! Compression preferences and their textual encoding

use std::fmt;
use std::str::FromStr;
use zipgate_core::Error;

/// Outcome of decoding a configuration keyword.
///
/// Decoding never fails outright; callers choose what an unrecognized
/// keyword means for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded<T> {
    /// The keyword named a known value
    Value(T),
    /// The keyword is not part of the value set
    Unrecognized,
}

impl<T> Decoded<T> {
    /// Convert into an [`Option`]
    pub fn value(self) -> Option<T> {
        match self {
            Decoded::Value(value) => Some(value),
            Decoded::Unrecognized => None,
        }
    }
}

/// Preferred compression algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// gzip
    Gzip,
    /// deflate
    Deflate,
    /// Leave the choice to the compression pipeline
    #[default]
    Default,
}

impl Algorithm {
    /// Decode a case-insensitive keyword (`gzip`, `deflate`, `default`)
    pub fn decode(s: &str) -> Decoded<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gzip" => Decoded::Value(Self::Gzip),
            "deflate" => Decoded::Value(Self::Deflate),
            "default" => Decoded::Value(Self::Default),
            _ => Decoded::Unrecognized,
        }
    }

    /// Configuration keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
            Self::Default => "default",
        }
    }

    /// Get the Content-Encoding header value, if the algorithm pins one
    pub fn encoding_name(&self) -> Option<&'static str> {
        match self {
            Self::Gzip => Some("gzip"),
            Self::Deflate => Some("deflate"),
            Self::Default => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
            .value()
            .ok_or_else(|| Error::Config(format!("Unknown compression algorithm: {s}")))
    }
}

/// Preferred compression level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionLevel {
    /// Best ratio, most CPU
    High,
    /// Balanced
    Normal,
    /// Fastest
    Low,
    /// Leave the choice to the compression pipeline
    #[default]
    Default,
}

impl CompressionLevel {
    /// Decode a case-insensitive keyword (`high`, `normal`, `low`, `default`)
    pub fn decode(s: &str) -> Decoded<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Decoded::Value(Self::High),
            "normal" => Decoded::Value(Self::Normal),
            "low" => Decoded::Value(Self::Low),
            "default" => Decoded::Value(Self::Default),
            _ => Decoded::Unrecognized,
        }
    }

    /// Configuration keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
            .value()
            .ok_or_else(|| Error::Config(format!("Unknown compression level: {s}")))
    }
}
