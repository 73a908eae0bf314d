//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for a [`GrowableArena`](crate::GrowableArena).
///
/// Controls the size of the first allocation and the hard ceiling the
/// buffer may grow to. Validated when the arena is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Minimum size of the first allocation in bytes.
    ///
    /// The first `reserve` allocates `max(requested, initial_capacity)`
    /// bytes, so small leading chunks do not trigger a string of tiny
    /// reallocations before the header has been seen.
    ///
    /// Default: 64 KiB.
    pub initial_capacity: usize,

    /// Largest extent the buffer may ever reach, in bytes.
    ///
    /// Requests past this bound fail with
    /// [`ArenaError::CapacityExceeded`]. The header's size field is
    /// untrusted input, so this bounds what a corrupt header can make the
    /// loader allocate.
    ///
    /// Default: 1 GiB.
    pub max_capacity: usize,
}

impl ArenaConfig {
    /// Default first allocation: 64 KiB.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 64 * 1024;

    /// Default ceiling: 1 GiB.
    pub const DEFAULT_MAX_CAPACITY: usize = 1 << 30;

    /// Create a config with the given ceiling and the default first allocation.
    ///
    /// The first allocation is clamped to the ceiling.
    pub fn new(max_capacity: usize) -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY.min(max_capacity),
            max_capacity,
        }
    }

    /// Set the size of the first allocation.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Check the config for internal consistency.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.max_capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_capacity must be non-zero",
            });
        }
        if self.initial_capacity > self.max_capacity {
            return Err(ArenaError::InvalidConfig {
                reason: "initial_capacity exceeds max_capacity",
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_CAPACITY)
    }
}
