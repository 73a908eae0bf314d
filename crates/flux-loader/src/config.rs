//! Loader configuration.

use flux_arena::{ArenaConfig, ArenaError};
use flux_format::HEADER_BYTES;

/// Configuration for a [`StreamLoader`](crate::StreamLoader).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Arena sizing for each load.
    pub arena: ArenaConfig,
    /// Whether to cross-check the transport's size hint against the
    /// header. Default: `true`.
    ///
    /// An absent hint, or a hint of zero, is never checked.
    pub enforce_size_hint: bool,
}

impl LoaderConfig {
    /// Config with the given arena settings and size-hint checking on.
    pub fn new(arena: ArenaConfig) -> Self {
        Self {
            arena,
            enforce_size_hint: true,
        }
    }

    /// Turn the size-hint cross-check on or off.
    pub fn with_size_hint_check(mut self, enforce: bool) -> Self {
        self.enforce_size_hint = enforce;
        self
    }

    /// Check the config for internal consistency.
    ///
    /// The arena ceiling must at least fit a header, or no asset could
    /// ever load.
    pub fn validate(&self) -> Result<(), ArenaError> {
        self.arena.validate()?;
        if self.arena.max_capacity < HEADER_BYTES {
            return Err(ArenaError::InvalidConfig {
                reason: "max_capacity is smaller than an asset header",
            });
        }
        Ok(())
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}
