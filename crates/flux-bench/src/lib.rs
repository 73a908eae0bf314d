//! Benchmark workloads for the Flux streaming loader.
//!
//! Provides pre-built chunked assets for benchmarking:
//!
//! - [`reference_workload`]: 8 MiB asset in 64 KiB chunks, a typical
//!   network download
//! - [`stress_workload`]: 64 MiB asset in uneven chunks of up to 16 KiB
//! - [`Workload::source`]: a fresh in-memory transport over the chunks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use flux_arena::ArenaConfig;
use flux_loader::LoaderConfig;
use flux_test_utils::{make_asset, random_partition, split_at_sizes, ScriptedSource};

/// A fabricated asset and the chunk sequence it arrives in.
pub struct Workload {
    /// The complete asset bytes.
    pub data: Vec<u8>,
    /// The asset split into transport chunks.
    pub chunks: Vec<Vec<u8>>,
}

impl Workload {
    /// Total asset size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the asset is empty (never true for a valid asset).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A transport over a copy of the chunks, with the exact size hint.
    pub fn source(&self) -> ScriptedSource {
        ScriptedSource::new(self.chunks.clone()).with_size_hint(self.data.len() as u64)
    }
}

/// 8 MiB asset delivered in fixed 64 KiB chunks.
pub fn reference_workload(seed: u64) -> Workload {
    let total = 8 << 20;
    let data = make_asset(total, seed);
    let sizes = vec![64 << 10; (total as usize) / (64 << 10)];
    let chunks = split_at_sizes(&data, &sizes);
    Workload { data, chunks }
}

/// 64 MiB asset delivered in seeded random chunks of up to 16 KiB,
/// with occasional empty chunks.
pub fn stress_workload(seed: u64) -> Workload {
    let data = make_asset(64 << 20, seed);
    let chunks = random_partition(&data, seed, 16 << 10);
    Workload { data, chunks }
}

/// Loader config sized for the stress workload, starting from a small
/// arena so growth cost shows up.
pub fn growth_heavy_config() -> LoaderConfig {
    LoaderConfig::new(ArenaConfig::new(128 << 20).with_initial_capacity(4 << 10))
}
