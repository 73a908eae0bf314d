//! Streaming builder and loader for Flux embedding assets.
//!
//! An asset is downloaded as a stream of chunks of unknown total size.
//! Its own header, in the first 36 bytes, declares how large it is. This
//! crate turns such a stream into a [`FinalizedAsset`] without ever
//! exposing a partially written one.
//!
//! # Architecture
//!
//! ```text
//! ChunkSource (transport) ──▶ StreamLoader ──▶ StreamingBuilder ──▶ GrowableArena
//!                                                   │
//!                                                   ├── try_decode (header prefix)
//!                                                   └── finish ──▶ FinalizedAsset ──▶ QueryEngine
//! ```
//!
//! - [`StreamingBuilder`] implements the reserve/commit/finish protocol
//!   and the one-time `Growing → Sized` transition.
//! - [`StreamLoader`] is the driver loop: size-hint cross-check,
//!   overflow and truncation detection, progress reporting.
//! - [`source`] provides transports: a crossbeam channel fed by a
//!   producer thread, any `io::Read`, or an in-memory chunk list.
//! - [`query`] defines the interface the downstream query engine offers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod asset;
pub mod builder;
pub mod config;
pub mod error;
pub mod loader;
pub mod progress;
pub mod query;
pub mod source;

// Public re-exports for the primary API surface.
pub use asset::FinalizedAsset;
pub use builder::{BuilderState, Commit, StreamingBuilder};
pub use config::LoaderConfig;
pub use error::LoadError;
pub use loader::{load, load_file, LoadReport, StreamLoader};
pub use progress::{LoadObserver, LoadProgress, NoopObserver};
pub use query::{QueryEngine, QueryError};
pub use source::{
    channel, ChannelSource, ChunkSender, ChunkSource, IterSource, ReaderSource, TransportError,
    TransportEvent,
};
