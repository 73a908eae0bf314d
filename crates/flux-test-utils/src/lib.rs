//! Test utilities and mock types for Flux development.
//!
//! Provides asset fabrication ([`make_asset`], [`fabricate`]), chunk
//! partitioning helpers, a [`ScriptedSource`] transport that records how
//! far the loader read, a [`RecordingObserver`], and a [`MockQueryEngine`]
//! implementing the query-engine boundary.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::VecDeque;

use flux_format::{header_bytes, FileHeader, HEADER_BYTES};
use flux_loader::query::{check_pairs, check_timestep, check_words};
use flux_loader::{
    ChunkSource, FinalizedAsset, LoadObserver, LoadProgress, QueryEngine, QueryError,
    TransportError,
};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ── Asset fabrication ───────────────────────────────────────────

/// A valid asset of `total` bytes: current-version header followed by
/// seeded pseudo-random payload.
///
/// # Panics
///
/// Panics if `total` cannot hold a header.
pub fn make_asset(total: u32, seed: u64) -> Vec<u8> {
    fabricate(FileHeader::new(total).with_shape(3, 16, 4), seed)
}

/// An asset with the given header, padded with seeded payload up to
/// `header.file_size`.
pub fn fabricate(header: FileHeader, seed: u64) -> Vec<u8> {
    let total = header.declared_size();
    assert!(total >= HEADER_BYTES, "asset must at least hold its header");
    let mut bytes = header_bytes(&header).to_vec();
    bytes.resize(total, 0);
    ChaCha8Rng::seed_from_u64(seed).fill_bytes(&mut bytes[HEADER_BYTES..]);
    bytes
}

// ── Partitioning ────────────────────────────────────────────────

/// Split `data` into consecutive chunks of the given sizes.
///
/// # Panics
///
/// Panics if the sizes add up to more than `data.len()`. Bytes past the
/// last size are dropped, which is how truncated streams are simulated.
pub fn split_at_sizes(data: &[u8], sizes: &[usize]) -> Vec<Vec<u8>> {
    let mut out = Vec::with_capacity(sizes.len());
    let mut at = 0;
    for &size in sizes {
        out.push(data[at..at + size].to_vec());
        at += size;
    }
    out
}

/// Split `data` at seeded random points into chunks of up to `max_chunk`
/// bytes. Roughly one chunk in eight is empty.
pub fn random_partition(data: &[u8], seed: u64, max_chunk: usize) -> Vec<Vec<u8>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let max_chunk = max_chunk.max(1) as u64;
    let mut out = Vec::new();
    let mut at = 0;
    while at < data.len() {
        if rng.next_u32() % 8 == 0 {
            out.push(Vec::new());
            continue;
        }
        let size = (1 + rng.next_u64() % max_chunk) as usize;
        let end = (at + size).min(data.len());
        out.push(data[at..end].to_vec());
        at = end;
    }
    out
}

// ── Scripted transport ──────────────────────────────────────────

/// How a [`ScriptedSource`] ends once its chunks run out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ending {
    /// Clean end-of-stream.
    Done,
    /// Transport failure with the given reason.
    Abort(String),
}

/// In-memory transport with an optional size hint and a scripted ending.
///
/// Counts how many chunks the loader actually pulled, so tests can check
/// that a failure stopped the load early.
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
    size_hint: Option<u64>,
    ending: Ending,
    pulled: usize,
}

impl ScriptedSource {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            size_hint: None,
            ending: Ending::Done,
            pulled: 0,
        }
    }

    /// Report `size_hint` as the transport's content length.
    pub fn with_size_hint(mut self, size_hint: u64) -> Self {
        self.size_hint = Some(size_hint);
        self
    }

    /// Fail with `reason` instead of ending cleanly.
    pub fn aborting(mut self, reason: impl Into<String>) -> Self {
        self.ending = Ending::Abort(reason.into());
        self
    }

    /// Number of chunks handed out so far.
    pub fn pulled(&self) -> usize {
        self.pulled
    }

    /// Number of chunks not yet handed out.
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }
}

impl ChunkSource for ScriptedSource {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.chunks.pop_front() {
            Some(chunk) => {
                self.pulled += 1;
                Ok(Some(chunk))
            }
            None => match &self.ending {
                Ending::Done => Ok(None),
                Ending::Abort(reason) => Err(TransportError::new(reason.clone())),
            },
        }
    }

    fn size_hint(&self) -> Option<u64> {
        self.size_hint
    }
}

// ── Observer ────────────────────────────────────────────────────

/// Observer that keeps every callback for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    pub declared: Vec<FileHeader>,
    pub progress: Vec<LoadProgress>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadObserver for RecordingObserver {
    fn on_declared(&mut self, header: &FileHeader) {
        self.declared.push(*header);
    }

    fn on_progress(&mut self, progress: LoadProgress) {
        self.progress.push(progress);
    }
}

// ── Mock query engine ───────────────────────────────────────────

/// Query engine that answers from the raw payload bytes.
///
/// The answers are meaningless but deterministic and have the shapes and
/// argument checks a real engine must have.
pub struct MockQueryEngine {
    asset: FinalizedAsset,
}

impl MockQueryEngine {
    /// The asset the engine owns.
    pub fn asset(&self) -> &FinalizedAsset {
        &self.asset
    }

    fn similarity(&self, a: u32, b: u32, t: u32) -> f32 {
        let payload = self.asset.payload();
        let index = (a as usize * 31 + b as usize * 17 + t as usize) % payload.len();
        payload[index] as f32 / 255.0
    }
}

impl QueryEngine for MockQueryEngine {
    fn from_asset(asset: FinalizedAsset) -> Result<Self, QueryError> {
        let header = asset.header();
        if header.num_timesteps == 0 || header.vocab_size == 0 {
            return Err(QueryError::InvalidAsset {
                reason: "empty embedding shape".into(),
            });
        }
        if asset.payload().is_empty() {
            return Err(QueryError::InvalidAsset {
                reason: "no payload".into(),
            });
        }
        Ok(Self { asset })
    }

    fn num_timesteps(&self) -> u32 {
        self.asset.header().num_timesteps
    }

    fn vocab_size(&self) -> u32 {
        self.asset.header().vocab_size
    }

    fn pairwise_trajectories(
        &self,
        words1: &[u32],
        words2: &[u32],
    ) -> Result<Vec<f32>, QueryError> {
        check_pairs(words1, words2, self.vocab_size())?;
        let mut out = Vec::with_capacity(words1.len() * self.num_timesteps() as usize);
        for (&a, &b) in words1.iter().zip(words2) {
            for t in 0..self.num_timesteps() {
                out.push(self.similarity(a, b, t));
            }
        }
        Ok(out)
    }

    fn most_related_to_at_t(
        &self,
        words: &[u32],
        t: u32,
        amount: u32,
    ) -> Result<Vec<u32>, QueryError> {
        check_words(words, self.vocab_size())?;
        check_timestep(t, self.num_timesteps())?;
        let mut candidates: Vec<u32> = (0..self.vocab_size())
            .filter(|w| !words.contains(w))
            .collect();
        candidates.sort_by(|&x, &y| {
            let sx: f32 = words.iter().map(|&w| self.similarity(w, x, t)).sum();
            let sy: f32 = words.iter().map(|&w| self.similarity(w, y, t)).sum();
            sy.total_cmp(&sx).then(x.cmp(&y))
        });
        candidates.truncate(amount as usize);
        Ok(candidates)
    }

    fn largest_changes_wrt(
        &self,
        word: u32,
        amount: u32,
        min_increasing: u32,
        min_decreasing: u32,
    ) -> Result<Vec<u32>, QueryError> {
        check_words(&[word], self.vocab_size())?;
        let last = self.num_timesteps() - 1;
        let change = |w: u32| self.similarity(word, w, last) - self.similarity(word, w, 0);

        let others: Vec<u32> = (0..self.vocab_size()).filter(|&w| w != word).collect();
        let mut increasing: Vec<u32> = others.iter().copied().filter(|&w| change(w) > 0.0).collect();
        let mut decreasing: Vec<u32> = others.iter().copied().filter(|&w| change(w) <= 0.0).collect();
        increasing.sort_by(|&x, &y| change(y).total_cmp(&change(x)));
        decreasing.sort_by(|&x, &y| change(x).total_cmp(&change(y)));

        let mut out: Vec<u32> = increasing.iter().take(min_increasing as usize).copied().collect();
        out.extend(decreasing.iter().take(min_decreasing as usize));
        let mut rest: Vec<u32> = others.into_iter().filter(|w| !out.contains(w)).collect();
        rest.sort_by(|&x, &y| change(y).abs().total_cmp(&change(x).abs()));
        out.extend(rest);
        out.truncate(amount as usize);
        Ok(out)
    }
}
