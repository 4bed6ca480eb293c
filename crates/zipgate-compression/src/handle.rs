//! Reloadable settings
//!
//! Request handlers read the current [`Settings`] without locking; a reload
//! builds a complete new instance and swaps it in. A live instance is never
//! mutated.

use crate::settings::Settings;
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;
use zipgate_core::{ConfigSource, Result};

/// Shared, atomically replaceable [`Settings`]
pub struct SettingsHandle {
    current: ArcSwap<Settings>,
}

impl SettingsHandle {
    /// Create a handle serving `settings`
    pub fn new(settings: Settings) -> Self {
        Self {
            current: ArcSwap::from_pointee(settings),
        }
    }

    /// Resolve settings from `source` and serve them
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        Ok(Self::new(Settings::resolve(source)?))
    }

    /// Settings of the current configuration epoch
    pub fn load(&self) -> Arc<Settings> {
        self.current.load_full()
    }

    /// Replace the served settings
    pub fn store(&self, settings: Settings) {
        self.current.store(Arc::new(settings));
    }

    /// Re-resolve settings from `source` and swap them in.
    ///
    /// On error the previous settings keep being served.
    pub fn reload(&self, source: &dyn ConfigSource) -> Result<()> {
        match Settings::resolve(source) {
            Ok(settings) => {
                tracing::info!(
                    algorithm = %settings.preferred_algorithm(),
                    level = %settings.compression_level(),
                    path_rules = settings.excluded_paths().len(),
                    "Compression settings reloaded"
                );
                self.store(settings);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Compression settings reload failed, keeping previous settings");
                Err(e)
            }
        }
    }
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl fmt::Debug for SettingsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsHandle")
            .field("current", &self.load())
            .finish()
    }
}
