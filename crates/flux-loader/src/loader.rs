//! The streaming load driver.
//!
//! [`StreamLoader`] pulls chunks from a [`ChunkSource`] one at a time and
//! feeds them through a fresh [`StreamingBuilder`]:
//!
//! 1. Until the header is decoded, every chunk is reserved, copied and
//!    committed. End-of-stream here is [`LoadError::HeaderIncomplete`].
//! 2. The transport's size hint is handed to the builder up front, so the
//!    chunk that completes the header fails with
//!    [`LoadError::SizeMismatch`] before the arena is sized and before any
//!    further chunk is pulled.
//! 3. Body chunks are bounds-checked against the declared size *before*
//!    anything is written, so an oversized chunk fails with
//!    [`LoadError::Overflow`] and leaves the committed bytes untouched.
//! 4. At end-of-stream the asset is finished, or the load fails with
//!    [`LoadError::Truncated`].
//!
//! Any failure drops the builder, discarding partial data. The loader
//! never prefetches: the next chunk is pulled only after the previous one
//! has been committed.

use std::path::Path;

use crate::asset::FinalizedAsset;
use crate::builder::{Commit, StreamingBuilder};
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::progress::{LoadObserver, LoadProgress, NoopObserver};
use crate::source::{ChunkSource, ReaderSource, TransportError};

/// Summary of a completed load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Size declared by the header (equal to the asset length).
    pub declared: usize,
    /// Chunks received from the transport, empty ones included.
    pub chunks: usize,
    /// Empty chunks received and skipped.
    pub empty_chunks: usize,
    /// Times the arena moved while holding data.
    pub relocations: u32,
}

impl LoadReport {
    /// Count a chunk. Returns whether it carries any bytes.
    fn record(&mut self, chunk: &[u8]) -> bool {
        self.chunks += 1;
        if chunk.is_empty() {
            self.empty_chunks += 1;
            false
        } else {
            true
        }
    }
}

/// Drives streaming loads.
///
/// A loader can be reused for any number of sequential loads; each one
/// gets a fresh builder and arena.
pub struct StreamLoader<O = NoopObserver> {
    config: LoaderConfig,
    observer: O,
}

impl StreamLoader<NoopObserver> {
    /// Create a loader without progress reporting.
    pub fn new(config: LoaderConfig) -> Result<Self, LoadError> {
        config.validate()?;
        Ok(Self {
            config,
            observer: NoopObserver,
        })
    }
}

impl<O: LoadObserver> StreamLoader<O> {
    /// Replace the progress observer.
    pub fn with_observer<P: LoadObserver>(self, observer: P) -> StreamLoader<P> {
        StreamLoader {
            config: self.config,
            observer,
        }
    }

    /// The loader's configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The progress observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Give up the loader and keep the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Load one asset from `source`.
    pub fn load<S: ChunkSource>(&mut self, source: S) -> Result<FinalizedAsset, LoadError> {
        self.load_with_report(source).map(|(asset, _)| asset)
    }

    /// Load one asset from `source`, also returning load statistics.
    pub fn load_with_report<S: ChunkSource>(
        &mut self,
        mut source: S,
    ) -> Result<(FinalizedAsset, LoadReport), LoadError> {
        let result = self.run(&mut source);
        match &result {
            Ok((asset, report)) => tracing::info!(
                len = asset.len(),
                chunks = report.chunks,
                relocations = report.relocations,
                "asset loaded"
            ),
            Err(e) => tracing::warn!(error = %e, "asset load failed"),
        }
        result
    }

    fn run<S: ChunkSource>(
        &mut self,
        source: &mut S,
    ) -> Result<(FinalizedAsset, LoadReport), LoadError> {
        let mut builder = StreamingBuilder::new(self.config.arena.clone())?;
        let mut report = LoadReport::default();
        if self.config.enforce_size_hint {
            if let Some(hint) = source.size_hint().filter(|&hint| hint != 0) {
                builder.expect_size(hint);
            }
        }

        let header = loop {
            let Some(chunk) = source.next_chunk()? else {
                return Err(LoadError::HeaderIncomplete {
                    received: builder.bytes_committed(),
                });
            };
            if !report.record(&chunk) {
                continue;
            }
            match builder.write_chunk(&chunk)? {
                Commit::Declared(header) => break header,
                Commit::Pending | Commit::Accepted => {
                    self.observer.on_progress(progress(&builder));
                }
            }
        };

        let declared = header.declared_size();
        self.observer.on_declared(&header);
        self.observer.on_progress(progress(&builder));

        while let Some(chunk) = source.next_chunk()? {
            if !report.record(&chunk) {
                continue;
            }
            let attempted = builder.bytes_committed().saturating_add(chunk.len());
            if attempted > declared {
                return Err(LoadError::Overflow {
                    declared,
                    attempted,
                });
            }
            match builder.write_chunk(&chunk)? {
                Commit::Accepted => {}
                Commit::Pending | Commit::Declared(_) => {
                    return Err(LoadError::InvalidState {
                        operation: "declare",
                    })
                }
            }
            self.observer.on_progress(progress(&builder));
        }

        let received = builder.bytes_committed();
        if received != declared {
            return Err(LoadError::Truncated { declared, received });
        }

        report.declared = declared;
        report.relocations = builder.relocations();
        Ok((builder.finish()?, report))
    }
}

fn progress(builder: &StreamingBuilder) -> LoadProgress {
    LoadProgress {
        committed: builder.bytes_committed(),
        declared: builder.declared_size(),
    }
}

/// Load an asset from `source` with the default configuration.
pub fn load<S: ChunkSource>(source: S) -> Result<FinalizedAsset, LoadError> {
    StreamLoader::new(LoaderConfig::default())?.load(source)
}

/// Load an asset from a file, using its length on disk as the size hint.
pub fn load_file(path: impl AsRef<Path>) -> Result<FinalizedAsset, LoadError> {
    let source = ReaderSource::open(path).map_err(TransportError::from)?;
    load(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IterSource;
    use flux_arena::ArenaConfig;
    use flux_format::{header_bytes, FileHeader, HEADER_BYTES};

    fn asset(total: u32) -> Vec<u8> {
        let mut bytes = header_bytes(&FileHeader::new(total)).to_vec();
        bytes.extend((HEADER_BYTES..total as usize).map(|i| (i * 7 % 256) as u8));
        bytes
    }

    fn split(data: &[u8], sizes: &[usize]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let mut at = 0;
        for &size in sizes {
            out.push(data[at..at + size].to_vec());
            at += size;
        }
        out
    }

    fn loader() -> StreamLoader {
        StreamLoader::new(LoaderConfig::new(
            ArenaConfig::new(1 << 20).with_initial_capacity(16),
        ))
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        declared: Vec<usize>,
        progress: Vec<LoadProgress>,
    }

    impl LoadObserver for Recorder {
        fn on_declared(&mut self, header: &FileHeader) {
            self.declared.push(header.declared_size());
        }

        fn on_progress(&mut self, progress: LoadProgress) {
            self.progress.push(progress);
        }
    }

    #[test]
    fn loads_asset_split_into_chunks() {
        let data = asset(1024);
        let (a, report) = loader()
            .load_with_report(IterSource::new(split(&data, &[10, 500, 514])))
            .unwrap();
        assert_eq!(a.len(), 1024);
        assert_eq!(a.as_bytes(), &data[..]);
        assert_eq!(report.chunks, 3);
        assert_eq!(report.declared, 1024);
    }

    #[test]
    fn empty_chunks_are_counted_and_skipped() {
        let data = asset(200);
        let chunks = vec![vec![], data[..50].to_vec(), vec![], data[50..].to_vec(), vec![]];
        let (a, report) = loader().load_with_report(IterSource::new(chunks)).unwrap();
        assert_eq!(a.len(), 200);
        assert_eq!(report.chunks, 5);
        assert_eq!(report.empty_chunks, 3);
    }

    #[test]
    fn end_before_header_is_header_incomplete() {
        let data = asset(200);
        let err = loader()
            .load(IterSource::new(split(&data, &[10, 20])))
            .unwrap_err();
        assert_eq!(err, LoadError::HeaderIncomplete { received: 30 });
    }

    #[test]
    fn end_before_declared_size_is_truncated() {
        let data = asset(100);
        let err = loader()
            .load(IterSource::new(split(&data, &[40, 40])))
            .unwrap_err();
        assert_eq!(
            err,
            LoadError::Truncated {
                declared: 100,
                received: 80
            }
        );
    }

    #[test]
    fn zero_size_hint_is_not_checked() {
        let data = asset(100);
        let a = loader()
            .load(IterSource::new(vec![data.clone()]).with_size_hint(0))
            .unwrap();
        assert_eq!(a.len(), 100);
    }

    #[test]
    fn size_hint_check_can_be_disabled() {
        let data = asset(100);
        let mut l = StreamLoader::new(LoaderConfig::default().with_size_hint_check(false)).unwrap();
        let a = l
            .load(IterSource::new(vec![data]).with_size_hint(999))
            .unwrap();
        assert_eq!(a.len(), 100);
    }

    #[test]
    fn observer_sees_one_declaration_and_monotonic_progress() {
        let data = asset(300);
        let mut l = loader().with_observer(Recorder::default());
        l.load(IterSource::new(split(&data, &[5, 30, 65, 100, 100])))
            .unwrap();
        assert_eq!(l.observer().declared, vec![300]);
        let rec = l.into_observer();
        assert_eq!(rec.declared, vec![300]);
        assert!(rec
            .progress
            .windows(2)
            .all(|w| w[0].committed <= w[1].committed));
        assert_eq!(rec.progress.first().unwrap().declared, None);
        assert_eq!(rec.progress.last().unwrap().percent(), Some(100));
    }

    #[test]
    fn size_mismatch_leaves_body_unpulled() {
        let data = asset(150);
        let mut source = IterSource::new(split(&data, &[40, 110])).with_size_hint(200);
        let err = loader().load(&mut source).unwrap_err();
        assert_eq!(
            err,
            LoadError::SizeMismatch {
                hint: 200,
                declared: 150
            }
        );
        assert_eq!(source.next_chunk().unwrap().map(|c| c.len()), Some(110));
    }

    #[test]
    fn loader_keeps_its_config() {
        let l = StreamLoader::new(LoaderConfig::default().with_size_hint_check(false)).unwrap();
        assert!(!l.config().enforce_size_hint);
        assert_eq!(l.config().arena, ArenaConfig::default());
    }

    #[test]
    fn loader_is_reusable() {
        let mut l = loader();
        for total in [64u32, 128, 4096] {
            let data = asset(total);
            assert_eq!(l.load(IterSource::new(vec![data])).unwrap().len(), total as usize);
        }
    }

    #[test]
    fn load_file_uses_length_on_disk() {
        let data = asset(2048);
        let path = std::env::temp_dir().join(format!("flux-loader-{}.dwe", std::process::id()));
        std::fs::write(&path, &data).unwrap();
        let a = load_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(a.as_bytes(), &data[..]);
    }

    #[test]
    fn missing_file_is_a_transport_error() {
        let err = load_file("/nonexistent/flux/asset.dwe").unwrap_err();
        assert!(matches!(err, LoadError::Transport { .. }));
    }
}
