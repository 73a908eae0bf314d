//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// `reserve(0)` on an arena that has never been written to. There is
    /// nothing to size the first allocation from.
    InvalidRequest,
    /// The requested extent would grow the buffer past its ceiling.
    CapacityExceeded {
        /// Total extent in bytes that was requested.
        requested: usize,
        /// Configured ceiling in bytes.
        capacity: usize,
    },
    /// The allocator could not provide the requested extent.
    AllocationFailed {
        /// Total extent in bytes that was requested.
        requested: usize,
    },
    /// A [`WriteRegion`](crate::WriteRegion) was used after a later
    /// `reserve` or resize invalidated it.
    StaleRegion {
        /// Generation stamped on the region.
        region_generation: u32,
        /// Current generation of the arena.
        current: u32,
    },
    /// A write or commit would reach past the writable extent.
    OutOfBounds {
        /// One past the last byte the operation would touch.
        requested_end: usize,
        /// Current writable extent in bytes.
        extent: usize,
    },
    /// The arena configuration is inconsistent.
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: &'static str,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest => {
                write!(f, "cannot reserve zero bytes before anything has been written")
            }
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes, capacity {capacity} bytes"
                )
            }
            Self::AllocationFailed { requested } => {
                write!(f, "allocation of {requested} bytes failed")
            }
            Self::StaleRegion {
                region_generation,
                current,
            } => {
                write!(
                    f,
                    "stale write region: generation {region_generation}, current {current}"
                )
            }
            Self::OutOfBounds {
                requested_end,
                extent,
            } => {
                write!(
                    f,
                    "write out of bounds: end {requested_end}, writable extent {extent}"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}
