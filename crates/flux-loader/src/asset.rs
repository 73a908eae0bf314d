//! The immutable result of a successful load.

use std::fmt;
use std::ops::Deref;

use flux_format::{FileHeader, HEADER_BYTES};

/// A fully materialized asset.
///
/// Owns the buffer that the builder's arena held during the load. Its
/// length always equals the size declared in its header. There is no way
/// to obtain one from a load that did not complete.
pub struct FinalizedAsset {
    bytes: Box<[u8]>,
    header: FileHeader,
}

impl FinalizedAsset {
    /// Only the builder creates assets, after checking the length.
    pub(crate) fn new(bytes: Box<[u8]>, header: FileHeader) -> Self {
        debug_assert_eq!(bytes.len(), header.declared_size());
        Self { bytes, header }
    }

    /// The decoded header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// The whole asset, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Everything after the header.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_BYTES..]
    }

    /// Total length in bytes; equal to the declared size.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the asset has no bytes. Never true for a decoded asset,
    /// since the header alone is non-empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Give up the handle and take the raw bytes.
    pub fn into_bytes(self) -> Box<[u8]> {
        self.bytes
    }
}

impl Deref for FinalizedAsset {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for FinalizedAsset {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for FinalizedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizedAsset")
            .field("len", &self.bytes.len())
            .field("header", &self.header)
            .finish()
    }
}
