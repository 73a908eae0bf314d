//! Flux: a streaming loader for diachronic word-embedding assets.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Flux sub-crates. For most users, adding `flux` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use flux::prelude::*;
//!
//! // A tiny asset: a header declaring 40 bytes, then 4 payload bytes.
//! let mut data = flux::format::header_bytes(&FileHeader::new(40)).to_vec();
//! data.extend_from_slice(&[1, 2, 3, 4]);
//!
//! // Deliver it in three uneven chunks.
//! let chunks = vec![data[..7].to_vec(), data[7..38].to_vec(), data[38..].to_vec()];
//! let source = IterSource::new(chunks).with_size_hint(40);
//!
//! let asset = StreamLoader::new(LoaderConfig::default())
//!     .unwrap()
//!     .load(source)
//!     .unwrap();
//! assert_eq!(asset.len(), 40);
//! assert_eq!(asset.payload(), &[1, 2, 3, 4]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `flux-arena` | Growable byte arena and generation-checked write regions |
//! | [`format`] | `flux-format` | Asset header layout and incremental header decoding |
//! | [`loader`] | `flux-loader` | Streaming builder, load driver, transports, query boundary |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Growable byte arena (`flux-arena`).
///
/// Most users never touch the arena directly; the
/// [`loader::StreamingBuilder`] owns one per load.
pub use flux_arena as arena;

/// Asset header format (`flux-format`).
///
/// [`format::FileHeader`] and the pure decoder [`format::try_decode`].
pub use flux_format as format;

/// Streaming builder and loader (`flux-loader`).
///
/// [`loader::StreamLoader`] drives a [`loader::ChunkSource`] to a
/// [`loader::FinalizedAsset`].
pub use flux_loader as loader;

/// Common imports for typical Flux usage.
///
/// ```rust
/// use flux::prelude::*;
/// ```
pub mod prelude {
    // Arena
    pub use flux_arena::ArenaConfig;

    // Format
    pub use flux_format::{FileHeader, HeaderError};

    // Loading
    pub use flux_loader::{
        load, load_file, FinalizedAsset, LoadError, LoadReport, LoaderConfig, StreamLoader,
        StreamingBuilder,
    };

    // Transports
    pub use flux_loader::{channel, ChunkSource, IterSource, ReaderSource, TransportError};

    // Progress
    pub use flux_loader::{LoadObserver, LoadProgress};

    // Query boundary
    pub use flux_loader::{QueryEngine, QueryError};
}
