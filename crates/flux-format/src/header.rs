//! The decoded asset header.

use std::fmt;

use crate::{FORMAT_MAJOR_VERSION, FORMAT_MINOR_VERSION, HEADER_BYTES, MAGIC};

/// Fixed-layout header at the start of every asset.
///
/// Only `file_size` matters to the loader. The remaining fields describe
/// the embedding tensor for the query engine and are carried through
/// untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FileHeader {
    /// Always [`MAGIC`] for a valid asset.
    pub magic: u32,
    /// Major format version.
    pub major_version: u32,
    /// Minor format version.
    pub minor_version: u32,
    /// Total size of the asset in bytes, header included.
    pub file_size: u32,
    /// Number of timesteps in the embedding trajectory.
    pub num_timesteps: u32,
    /// Number of words in the vocabulary.
    pub vocab_size: u32,
    /// Dimension of each embedding vector.
    pub embedding_dim: u32,
    /// Number of words per compressed chunk.
    pub chunk_size: u32,
    /// Dequantization factor for embedding components.
    pub scale_factor: f32,
}

impl FileHeader {
    /// A current-version header declaring an asset of `file_size` bytes,
    /// with the tensor shape left zeroed.
    pub fn new(file_size: u32) -> Self {
        Self {
            magic: MAGIC,
            major_version: FORMAT_MAJOR_VERSION,
            minor_version: FORMAT_MINOR_VERSION,
            file_size,
            num_timesteps: 0,
            vocab_size: 0,
            embedding_dim: 0,
            chunk_size: 0,
            scale_factor: 1.0,
        }
    }

    /// Set the embedding tensor shape.
    pub fn with_shape(mut self, num_timesteps: u32, vocab_size: u32, embedding_dim: u32) -> Self {
        self.num_timesteps = num_timesteps;
        self.vocab_size = vocab_size;
        self.embedding_dim = embedding_dim;
        self
    }

    /// Set the compression chunk size and scale factor.
    pub fn with_compression(mut self, chunk_size: u32, scale_factor: f32) -> Self {
        self.chunk_size = chunk_size;
        self.scale_factor = scale_factor;
        self
    }

    /// Declared total size in bytes, as a `usize`.
    pub fn declared_size(&self) -> usize {
        self.file_size as usize
    }

    /// Declared payload size in bytes (everything after the header).
    pub fn payload_size(&self) -> usize {
        self.declared_size().saturating_sub(HEADER_BYTES)
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dwe v{}.{}: {} bytes, T={} V={} K={} chunk={} scale={}",
            self.major_version,
            self.minor_version,
            self.file_size,
            self.num_timesteps,
            self.vocab_size,
            self.embedding_dim,
            self.chunk_size,
            self.scale_factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_header_is_current_version() {
        let h = FileHeader::new(1024);
        assert_eq!(h.magic, MAGIC);
        assert_eq!(h.major_version, FORMAT_MAJOR_VERSION);
        assert_eq!(h.declared_size(), 1024);
        assert_eq!(h.payload_size(), 1024 - HEADER_BYTES);
    }

    #[test]
    fn payload_size_saturates_for_tiny_declarations() {
        assert_eq!(FileHeader::new(4).payload_size(), 0);
    }

    #[test]
    fn display_summarises_shape() {
        let h = FileHeader::new(100)
            .with_shape(209, 30_000, 100)
            .with_compression(100, 0.5);
        assert_eq!(
            h.to_string(),
            "dwe v0.1: 100 bytes, T=209 V=30000 K=100 chunk=100 scale=0.5"
        );
    }
}
