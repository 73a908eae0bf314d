//! Growable single-region byte arena for streaming Flux asset loads.
//!
//! An asset arrives as an unpredictable sequence of chunks whose total
//! size is only learned once the self-describing header has been read.
//! [`GrowableArena`] owns the one contiguous buffer those chunks are
//! copied into and grows it on demand.
//!
//! # Views instead of addresses
//!
//! Growing the buffer may move it. Rather than hand out base addresses
//! that silently dangle after a move, [`GrowableArena::reserve`] returns
//! a [`WriteRegion`]: an offset/length pair stamped with the arena's
//! generation. Every `reserve` bumps the generation, so a region taken
//! before the most recent `reserve` is rejected with
//! [`ArenaError::StaleRegion`] instead of writing to the wrong place.
//!
//! ```text
//! GrowableArena
//! ├── Vec<u8>           (zero-filled writable extent, may relocate)
//! ├── committed         (bytes confirmed written, never decreases)
//! └── generation        (bumped on every reserve / resize)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod growable;
pub mod region;

// Public re-exports for the primary API surface.
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use growable::GrowableArena;
pub use region::WriteRegion;
