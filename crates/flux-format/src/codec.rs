//! Binary encode/decode for the asset header.
//!
//! All words are little-endian. Decoding works on a byte prefix of any
//! length so it can be re-run after every chunk of a streaming download.

use std::io::{self, Write};

use crate::error::HeaderError;
use crate::header::FileHeader;
use crate::{FORMAT_MAJOR_VERSION, HEADER_BYTES, MAGIC};

/// Outcome of decoding a (possibly partial) header prefix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decoded {
    /// Not all header bytes have arrived yet.
    NotYetAvailable,
    /// The header is complete and valid.
    Declared(FileHeader),
}

impl Decoded {
    /// The declared total size, if the header is complete.
    pub fn declared_size(&self) -> Option<usize> {
        match self {
            Self::NotYetAvailable => None,
            Self::Declared(header) => Some(header.declared_size()),
        }
    }
}

// ── Primitive readers ───────────────────────────────────────────

/// Read the little-endian word at `index`. The caller guarantees the
/// prefix is long enough.
fn word_at(prefix: &[u8], index: usize) -> u32 {
    let start = index * 4;
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&prefix[start..start + 4]);
    u32::from_le_bytes(buf)
}

// ── Header encode/decode ────────────────────────────────────────

/// Try to decode the header from the bytes committed so far.
///
/// Pure and idempotent. Words are validated as soon as they arrive: a
/// wrong magic is reported after four bytes and a wrong major version
/// after eight, without waiting for the rest of the header.
pub fn try_decode(prefix: &[u8]) -> Result<Decoded, HeaderError> {
    if prefix.len() >= 4 {
        let magic = word_at(prefix, 0);
        if magic != MAGIC {
            return Err(HeaderError::InvalidMagic { found: magic });
        }
    }
    if prefix.len() >= 8 {
        let major_version = word_at(prefix, 1);
        if major_version != FORMAT_MAJOR_VERSION {
            return Err(HeaderError::UnsupportedVersion {
                found: major_version,
            });
        }
    }
    if prefix.len() < HEADER_BYTES {
        return Ok(Decoded::NotYetAvailable);
    }

    let header = FileHeader {
        magic: word_at(prefix, 0),
        major_version: word_at(prefix, 1),
        minor_version: word_at(prefix, 2),
        file_size: word_at(prefix, 3),
        num_timesteps: word_at(prefix, 4),
        vocab_size: word_at(prefix, 5),
        embedding_dim: word_at(prefix, 6),
        chunk_size: word_at(prefix, 7),
        scale_factor: f32::from_bits(word_at(prefix, 8)),
    };

    if header.declared_size() < HEADER_BYTES {
        return Err(HeaderError::SizeTooSmall {
            declared: header.file_size,
            minimum: HEADER_BYTES,
        });
    }

    Ok(Decoded::Declared(header))
}

/// Encode a header into its fixed 36-byte representation.
pub fn header_bytes(header: &FileHeader) -> [u8; HEADER_BYTES] {
    let words = [
        header.magic,
        header.major_version,
        header.minor_version,
        header.file_size,
        header.num_timesteps,
        header.vocab_size,
        header.embedding_dim,
        header.chunk_size,
        header.scale_factor.to_bits(),
    ];
    let mut out = [0u8; HEADER_BYTES];
    for (dst, word) in out.chunks_exact_mut(4).zip(words) {
        dst.copy_from_slice(&word.to_le_bytes());
    }
    out
}

/// Write a header to any byte sink.
pub fn encode_header(w: &mut dyn Write, header: &FileHeader) -> io::Result<()> {
    w.write_all(&header_bytes(header))
}
