//! Chunk sources: the transport side of a streaming load.
//!
//! A [`ChunkSource`] yields byte chunks of arbitrary length until it
//! signals end-of-stream with `Ok(None)`. Chunk boundaries carry no
//! meaning; empty chunks are allowed and ignored by the loader.
//!
//! Three sources are provided:
//!
//! - [`ChannelSource`] receives chunks from a producer thread over a
//!   bounded crossbeam channel, so the transport can run elsewhere while
//!   the loader blocks on `recv`. The bound gives backpressure.
//! - [`ReaderSource`] reads fixed-size chunks from any `io::Read`.
//! - [`IterSource`] replays an in-memory list of chunks.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crossbeam_channel::{Receiver, Sender};

/// A transport-level failure (network error, aborted download, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportError {
    reason: String,
}

impl TransportError {
    /// Create a transport error with a human-readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason given by the transport.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl Error for TransportError {}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        Self::new(format!("I/O error: {e}"))
    }
}

/// A source of byte chunks of unknown total size.
pub trait ChunkSource {
    /// Pull the next chunk, blocking until one is available.
    ///
    /// Returns `Ok(None)` at end-of-stream. After that, further calls
    /// keep returning `Ok(None)`.
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Total size reported by the transport (e.g. a content length), if any.
    fn size_hint(&self) -> Option<u64> {
        None
    }
}

impl<S: ChunkSource + ?Sized> ChunkSource for &mut S {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).next_chunk()
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}

impl<S: ChunkSource + ?Sized> ChunkSource for Box<S> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).next_chunk()
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}

// ── Channel transport ───────────────────────────────────────────

/// Message sent from a producer thread to a [`ChannelSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A chunk of body bytes.
    Chunk(Vec<u8>),
    /// The body has been delivered completely.
    Done,
    /// The transport failed; the load must be abandoned.
    Failed(String),
}

/// Create a bounded chunk channel.
///
/// `capacity` is the number of chunks that may be in flight before the
/// producer blocks. `size_hint` is passed through to the loader.
pub fn channel(capacity: usize, size_hint: Option<u64>) -> (ChunkSender, ChannelSource) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (
        ChunkSender { tx },
        ChannelSource {
            rx,
            size_hint,
            done: false,
        },
    )
}

/// Producer half of a chunk channel.
///
/// Dropping the sender without calling [`finish`](Self::finish) is
/// treated by the loader as an aborted transport.
pub struct ChunkSender {
    tx: Sender<TransportEvent>,
}

impl ChunkSender {
    /// Send one chunk, blocking while the channel is full.
    ///
    /// Fails once the loader has stopped listening (it finished or gave
    /// up), which tells the producer to stop downloading.
    pub fn send(&self, chunk: Vec<u8>) -> Result<(), TransportError> {
        self.tx
            .send(TransportEvent::Chunk(chunk))
            .map_err(|_| TransportError::new("loader is no longer receiving"))
    }

    /// Signal end-of-stream.
    pub fn finish(self) -> Result<(), TransportError> {
        self.tx
            .send(TransportEvent::Done)
            .map_err(|_| TransportError::new("loader is no longer receiving"))
    }

    /// Abort the stream with a reason.
    pub fn fail(self, reason: impl Into<String>) {
        // The loader may already be gone; nothing to report to.
        let _ = self.tx.send(TransportEvent::Failed(reason.into()));
    }
}

/// Consumer half of a chunk channel.
pub struct ChannelSource {
    rx: Receiver<TransportEvent>,
    size_hint: Option<u64>,
    done: bool,
}

impl ChunkSource for ChannelSource {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.done {
            return Ok(None);
        }
        match self.rx.recv() {
            Ok(TransportEvent::Chunk(chunk)) => Ok(Some(chunk)),
            Ok(TransportEvent::Done) => {
                self.done = true;
                Ok(None)
            }
            Ok(TransportEvent::Failed(reason)) => Err(TransportError::new(reason)),
            Err(_) => Err(TransportError::new(
                "transport closed before end of stream",
            )),
        }
    }

    fn size_hint(&self) -> Option<u64> {
        self.size_hint
    }
}

// ── Reader transport ────────────────────────────────────────────

/// Reads chunks of up to `chunk_size` bytes from any `io::Read`.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production code
/// can use a `File` or a socket.
pub struct ReaderSource<R: Read> {
    reader: R,
    chunk_size: usize,
    size_hint: Option<u64>,
    done: bool,
}

impl<R: Read> ReaderSource<R> {
    /// Default read size: 64 KiB.
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    /// Wrap a reader. A `chunk_size` of zero is bumped to one.
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            size_hint: None,
            done: false,
        }
    }

    /// Attach a size hint to cross-check against the header.
    pub fn with_size_hint(mut self, size_hint: u64) -> Self {
        self.size_hint = Some(size_hint);
        self
    }

    /// Unwrap the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl ReaderSource<File> {
    /// Open a file, using its length on disk as the size hint.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self::new(file, Self::DEFAULT_CHUNK_SIZE).with_size_hint(len))
    }
}

impl<R: Read> ChunkSource for ReaderSource<R> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.done {
            return Ok(None);
        }
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return Ok(None);
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(Some(buf));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn size_hint(&self) -> Option<u64> {
        self.size_hint
    }
}

// ── In-memory transport ─────────────────────────────────────────

/// Replays a fixed sequence of chunks.
pub struct IterSource<I> {
    chunks: I,
    size_hint: Option<u64>,
}

impl<I: Iterator<Item = Vec<u8>>> IterSource<I> {
    /// Wrap anything that yields chunks.
    pub fn new(chunks: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            chunks: chunks.into_iter(),
            size_hint: None,
        }
    }

    /// Attach a size hint to cross-check against the header.
    pub fn with_size_hint(mut self, size_hint: u64) -> Self {
        self.size_hint = Some(size_hint);
        self
    }
}

impl<I: Iterator<Item = Vec<u8>>> ChunkSource for IterSource<I> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.chunks.next())
    }

    fn size_hint(&self) -> Option<u64> {
        self.size_hint
    }
}
