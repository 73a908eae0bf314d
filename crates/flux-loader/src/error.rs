//! Error types for streaming asset loads.
//!
//! Every variant is terminal for the load it came from: the builder and
//! its arena are dropped and no partial asset is produced. Whether to
//! retry is the caller's decision.

use std::error::Error;
use std::fmt;

use flux_arena::ArenaError;
use flux_format::HeaderError;

use crate::source::TransportError;

/// Errors from [`StreamingBuilder`](crate::StreamingBuilder) and
/// [`StreamLoader`](crate::StreamLoader).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// `reserve(0)` before anything was written; there is nothing to
    /// size the first allocation from.
    InvalidRequest,
    /// The stream ended before the header could be decoded.
    HeaderIncomplete {
        /// Bytes received before the end of the stream.
        received: usize,
    },
    /// The transport's size hint disagrees with the header.
    SizeMismatch {
        /// Size reported by the transport.
        hint: u64,
        /// Size declared by the header.
        declared: usize,
    },
    /// A write would take the asset past its declared size.
    Overflow {
        /// Size declared by the header.
        declared: usize,
        /// Total the write would have reached.
        attempted: usize,
    },
    /// The stream ended with fewer bytes than declared.
    Truncated {
        /// Size declared by the header.
        declared: usize,
        /// Bytes actually received.
        received: usize,
    },
    /// The builder was used after it had been finalized.
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
    },
    /// `finish` was called before exactly the declared number of bytes
    /// had been committed.
    Incomplete {
        /// Bytes committed so far.
        committed: usize,
        /// Declared size, if the header has been decoded.
        declared: Option<usize>,
    },
    /// The header prefix is not a valid asset header.
    MalformedHeader(HeaderError),
    /// The arena rejected an operation.
    Arena(ArenaError),
    /// The transport failed or was closed mid-stream.
    Transport {
        /// Description of the transport failure.
        reason: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest => {
                write!(f, "cannot reserve zero bytes before anything has been written")
            }
            Self::HeaderIncomplete { received } => {
                write!(
                    f,
                    "stream ended after {received} bytes, before the header was complete"
                )
            }
            Self::SizeMismatch { hint, declared } => {
                write!(
                    f,
                    "transport reports {hint} bytes but the header declares {declared}"
                )
            }
            Self::Overflow {
                declared,
                attempted,
            } => {
                write!(
                    f,
                    "asset larger than declared: {attempted} bytes exceeds {declared}"
                )
            }
            Self::Truncated { declared, received } => {
                write!(
                    f,
                    "asset truncated: received {received} of {declared} declared bytes"
                )
            }
            Self::InvalidState { operation } => {
                write!(f, "cannot {operation}: builder already finalized")
            }
            Self::Incomplete {
                committed,
                declared: Some(declared),
            } => {
                write!(
                    f,
                    "asset incomplete: {committed} of {declared} declared bytes committed"
                )
            }
            Self::Incomplete {
                committed,
                declared: None,
            } => {
                write!(
                    f,
                    "asset incomplete: {committed} bytes committed, header not yet decoded"
                )
            }
            Self::MalformedHeader(e) => write!(f, "malformed header: {e}"),
            Self::Arena(e) => write!(f, "arena error: {e}"),
            Self::Transport { reason } => write!(f, "transport failed: {reason}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedHeader(e) => Some(e),
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for LoadError {
    fn from(e: ArenaError) -> Self {
        match e {
            ArenaError::InvalidRequest => Self::InvalidRequest,
            other => Self::Arena(other),
        }
    }
}

impl From<HeaderError> for LoadError {
    fn from(e: HeaderError) -> Self {
        Self::MalformedHeader(e)
    }
}

impl From<TransportError> for LoadError {
    fn from(e: TransportError) -> Self {
        Self::Transport {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_invalid_request_maps_to_load_invalid_request() {
        assert_eq!(
            LoadError::from(ArenaError::InvalidRequest),
            LoadError::InvalidRequest
        );
    }

    #[test]
    fn other_arena_errors_are_wrapped() {
        let e = ArenaError::CapacityExceeded {
            requested: 10,
            capacity: 5,
        };
        assert_eq!(LoadError::from(e.clone()), LoadError::Arena(e));
    }

    #[test]
    fn header_error_is_source() {
        let e = LoadError::from(HeaderError::UnsupportedVersion { found: 3 });
        assert!(e.source().is_some());
        assert_eq!(
            e.to_string(),
            "malformed header: unsupported major format version 3"
        );
    }

    #[test]
    fn transport_error_keeps_reason() {
        let e = LoadError::from(TransportError::new("connection reset"));
        assert_eq!(
            e,
            LoadError::Transport {
                reason: "connection reset".into()
            }
        );
    }

    #[test]
    fn incomplete_display_distinguishes_missing_header() {
        let with = LoadError::Incomplete {
            committed: 10,
            declared: Some(20),
        };
        let without = LoadError::Incomplete {
            committed: 10,
            declared: None,
        };
        assert!(with.to_string().contains("10 of 20"));
        assert!(without.to_string().contains("header not yet decoded"));
    }
}
