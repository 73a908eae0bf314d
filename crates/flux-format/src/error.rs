//! Error types for header decoding.

use std::fmt;

/// Errors produced when a complete header prefix fails validation.
///
/// An incomplete prefix is not an error; see
/// [`Decoded::NotYetAvailable`](crate::Decoded::NotYetAvailable).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderError {
    /// The stream does not start with [`MAGIC`](crate::MAGIC).
    InvalidMagic {
        /// The word found where the magic was expected.
        found: u32,
    },
    /// The major version is not supported by this build.
    UnsupportedVersion {
        /// The major version found in the header.
        found: u32,
    },
    /// The declared size cannot even hold the header.
    SizeTooSmall {
        /// The declared total size in bytes.
        declared: u32,
        /// The smallest valid size in bytes.
        minimum: usize,
    },
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMagic { found } => {
                write!(f, "invalid magic {found:#010x} (expected b\"DWE\\0\")")
            }
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported major format version {found}")
            }
            Self::SizeTooSmall { declared, minimum } => {
                write!(
                    f,
                    "declared size {declared} bytes is smaller than the {minimum}-byte header"
                )
            }
        }
    }
}

impl std::error::Error for HeaderError {}
