//! Incremental asset builder.
//!
//! [`StreamingBuilder`] owns the arena for one load and enforces the
//! reserve/write/commit protocol:
//!
//! ```text
//! Growing ──commit completes header──▶ Sized(n) ──finish, committed == n──▶ Finalized
//! ```
//!
//! While `Growing`, every commit first runs the header decoder on the
//! prefix it would produce, so a malformed header, an oversized first
//! chunk or a size that disagrees with the expected one is rejected
//! before any byte is committed. The commit that completes the header
//! resizes the arena to exactly the declared size and returns
//! [`Commit::Declared`]; no later commit ever returns it again.

use flux_arena::{ArenaConfig, GrowableArena, WriteRegion};
use flux_format::{try_decode, Decoded, FileHeader};

use crate::asset::FinalizedAsset;
use crate::error::LoadError;

/// Externally visible builder state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderState {
    /// The header has not been decoded yet.
    Growing,
    /// The header declared this many bytes and the arena has that extent.
    Sized(usize),
    /// The asset has been handed out; the builder is spent.
    Finalized,
}

/// Outcome of a successful [`StreamingBuilder::commit`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use]
pub enum Commit {
    /// Still growing: the header is not complete yet.
    Pending,
    /// This commit completed the header. Returned exactly once per load.
    /// The arena has been resized and may have moved.
    Declared(FileHeader),
    /// Body bytes accepted; the size was already known.
    Accepted,
}

enum Phase {
    Growing,
    Sized(FileHeader),
    /// Holds the final length, since the arena is gone.
    Finalized(usize),
}

/// Builds one asset from a stream of writes.
///
/// Not thread-safe by design: a single load owns a single builder.
/// Dropping an unfinished builder discards everything written.
pub struct StreamingBuilder {
    /// `None` once the asset has been handed out.
    arena: Option<GrowableArena>,
    phase: Phase,
    /// Size the header must declare, if known from elsewhere.
    expected_size: Option<u64>,
}

impl StreamingBuilder {
    /// Create an empty builder with an arena configured by `config`.
    pub fn new(config: ArenaConfig) -> Result<Self, LoadError> {
        Ok(Self {
            arena: Some(GrowableArena::new(config)?),
            phase: Phase::Growing,
            expected_size: None,
        })
    }

    /// Require the header to declare exactly `size` bytes.
    ///
    /// Checked when the header is decoded, before the arena is sized, so a
    /// header that disagrees never causes the declared allocation.
    pub fn expect_size(&mut self, size: u64) {
        self.expected_size = Some(size);
    }

    /// Ensure `additional` writable bytes past the committed prefix.
    ///
    /// Returns a fresh region; every region issued earlier is invalid from
    /// now on. Once sized, reserving past the declared size fails with
    /// [`LoadError::Overflow`] and nothing is allocated.
    pub fn reserve(&mut self, additional: usize) -> Result<WriteRegion, LoadError> {
        if let Phase::Sized(header) = &self.phase {
            let declared = header.declared_size();
            let attempted = self.bytes_committed().saturating_add(additional);
            if attempted > declared {
                return Err(LoadError::Overflow {
                    declared,
                    attempted,
                });
            }
        }
        let arena = self.arena_mut("reserve")?;
        Ok(arena.reserve(additional)?)
    }

    /// Resolve a region to writable memory.
    pub fn region_mut(&mut self, region: WriteRegion) -> Result<&mut [u8], LoadError> {
        let arena = self.arena_mut("write")?;
        Ok(arena.region_mut(region)?)
    }

    /// Confirm that `amount` bytes have been written at the start of the
    /// most recently reserved region.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Overflow`] if the commit would pass the declared size.
    /// - [`LoadError::MalformedHeader`] if the completed header is invalid.
    /// - [`LoadError::SizeMismatch`] if the header disagrees with
    ///   [`expect_size`](Self::expect_size).
    ///
    /// On error nothing is committed.
    /// - [`LoadError::InvalidState`] after finalization.
    pub fn commit(&mut self, amount: usize) -> Result<Commit, LoadError> {
        let declared = match &self.phase {
            Phase::Finalized(_) => {
                return Err(LoadError::InvalidState {
                    operation: "commit",
                })
            }
            Phase::Growing => return self.commit_growing(amount),
            Phase::Sized(header) => header.declared_size(),
        };

        let attempted = self.bytes_committed().saturating_add(amount);
        if attempted > declared {
            return Err(LoadError::Overflow {
                declared,
                attempted,
            });
        }
        self.arena_mut("commit")?.commit(amount)?;
        tracing::trace!(committed = attempted, declared, "body bytes committed");
        Ok(Commit::Accepted)
    }

    /// Reserve, copy and commit one chunk. Empty chunks are no-ops.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<Commit, LoadError> {
        if chunk.is_empty() {
            return match self.phase {
                Phase::Growing => Ok(Commit::Pending),
                Phase::Sized(_) => Ok(Commit::Accepted),
                Phase::Finalized(_) => Err(LoadError::InvalidState {
                    operation: "write",
                }),
            };
        }
        let region = self.reserve(chunk.len())?;
        self.region_mut(region)?[..chunk.len()].copy_from_slice(chunk);
        self.commit(chunk.len())
    }

    /// Consume the builder and hand out the finished asset.
    ///
    /// Valid only once exactly the declared number of bytes has been
    /// committed; otherwise fails with [`LoadError::Incomplete`].
    pub fn finish(mut self) -> Result<FinalizedAsset, LoadError> {
        self.take_finished()
    }

    /// Like [`finish`](Self::finish), but leaves the builder in place in the
    /// `Finalized` state. For owners that cannot give the builder up by
    /// value, such as a handle held across a scripting boundary. Every
    /// later call fails with [`LoadError::InvalidState`].
    pub fn take_finished(&mut self) -> Result<FinalizedAsset, LoadError> {
        let committed = self.bytes_committed();
        let header = match &self.phase {
            Phase::Finalized(_) => {
                return Err(LoadError::InvalidState {
                    operation: "finish",
                })
            }
            Phase::Growing => {
                return Err(LoadError::Incomplete {
                    committed,
                    declared: None,
                })
            }
            Phase::Sized(header) => *header,
        };
        if committed != header.declared_size() {
            return Err(LoadError::Incomplete {
                committed,
                declared: Some(header.declared_size()),
            });
        }

        let arena = self.arena.take().ok_or(LoadError::InvalidState {
            operation: "finish",
        })?;
        self.phase = Phase::Finalized(committed);
        tracing::debug!(len = committed, "asset finalized");
        Ok(FinalizedAsset::new(arena.into_committed(), header))
    }

    /// Current state.
    pub fn state(&self) -> BuilderState {
        match &self.phase {
            Phase::Growing => BuilderState::Growing,
            Phase::Sized(header) => BuilderState::Sized(header.declared_size()),
            Phase::Finalized(_) => BuilderState::Finalized,
        }
    }

    /// Number of bytes committed so far. Never decreases.
    pub fn bytes_committed(&self) -> usize {
        match (&self.phase, &self.arena) {
            (Phase::Finalized(len), _) => *len,
            (_, Some(arena)) => arena.committed(),
            (_, None) => 0,
        }
    }

    /// Declared size, once the header has been decoded.
    pub fn declared_size(&self) -> Option<usize> {
        self.header().map(FileHeader::declared_size)
    }

    /// The decoded header, once available.
    pub fn header(&self) -> Option<&FileHeader> {
        match &self.phase {
            Phase::Sized(header) => Some(header),
            _ => None,
        }
    }

    /// The committed prefix, for inspection.
    pub fn committed_bytes(&self) -> &[u8] {
        match &self.arena {
            Some(arena) => arena.committed_bytes(),
            None => &[],
        }
    }

    /// How many times the arena has moved while holding data.
    pub fn relocations(&self) -> u32 {
        self.arena.as_ref().map_or(0, GrowableArena::relocations)
    }

    fn commit_growing(&mut self, amount: usize) -> Result<Commit, LoadError> {
        let expected = self.expected_size;
        let arena = self.arena_mut("commit")?;

        let header = match try_decode(arena.prefix_with(amount)?)? {
            Decoded::NotYetAvailable => {
                let committed = arena.commit(amount)?;
                tracing::trace!(committed, "header not yet complete");
                return Ok(Commit::Pending);
            }
            Decoded::Declared(header) => header,
        };

        let declared = header.declared_size();
        let attempted = arena.committed().saturating_add(amount);
        if attempted > declared {
            return Err(LoadError::Overflow {
                declared,
                attempted,
            });
        }
        if let Some(hint) = expected {
            if hint != declared as u64 {
                return Err(LoadError::SizeMismatch { hint, declared });
            }
        }
        arena.resize_exact(declared)?;
        let committed = arena.commit(amount)?;
        self.phase = Phase::Sized(header);
        tracing::debug!(declared, committed, "asset header decoded");
        Ok(Commit::Declared(header))
    }

    fn arena_mut(&mut self, operation: &'static str) -> Result<&mut GrowableArena, LoadError> {
        match (&self.phase, self.arena.as_mut()) {
            (Phase::Finalized(_), _) | (_, None) => Err(LoadError::InvalidState { operation }),
            (_, Some(arena)) => Ok(arena),
        }
    }
}
