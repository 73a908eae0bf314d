//! Self-describing header format of Flux dynamic word embedding assets.
//!
//! Every asset starts with a fixed 36-byte header of nine little-endian
//! 32-bit words. The fourth word is the total asset size in bytes, which
//! is what lets a streaming loader size its buffer before the download
//! has finished.
//!
//! # Format
//!
//! ```text
//! [MAGIC u32] [MAJOR u32] [MINOR u32] [FILE_SIZE u32]
//! [NUM_TIMESTEPS u32] [VOCAB_SIZE u32] [EMBEDDING_DIM u32] [CHUNK_SIZE u32]
//! [SCALE_FACTOR f32]
//! [payload ...]
//! ```
//!
//! [`try_decode`] is a pure function of the bytes seen so far: it reports
//! [`Decoded::NotYetAvailable`] until all header bytes are present and
//! decodes the same header every time after that.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod header;

pub use codec::{encode_header, header_bytes, try_decode, Decoded};
pub use error::HeaderError;
pub use header::FileHeader;

/// Magic word at the start of every asset (`b"DWE\0"` read as little-endian).
pub const MAGIC: u32 = u32::from_le_bytes(*b"DWE\0");

/// Major format version understood by this build.
///
/// Assets with any other major version are rejected.
pub const FORMAT_MAJOR_VERSION: u32 = 0;

/// Minor format version written by this build.
pub const FORMAT_MINOR_VERSION: u32 = 1;

/// Number of 32-bit words in the header.
pub const HEADER_WORDS: usize = 9;

/// Size of the header in bytes.
pub const HEADER_BYTES: usize = HEADER_WORDS * 4;
