//! Load progress reporting.
//!
//! The loader calls into a [`LoadObserver`] once when the header has been
//! decoded and after every non-empty chunk, which is enough to drive a
//! download progress bar.

use flux_format::FileHeader;

/// Snapshot of a load in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    /// Bytes committed so far.
    pub committed: usize,
    /// Declared total size, once the header has been decoded.
    pub declared: Option<usize>,
}

impl LoadProgress {
    /// Fraction of the declared size received, in `[0, 1]`.
    ///
    /// `None` until the header has been decoded.
    pub fn fraction(&self) -> Option<f64> {
        self.declared.map(|declared| {
            if declared == 0 {
                1.0
            } else {
                (self.committed as f64 / declared as f64).min(1.0)
            }
        })
    }

    /// Whole percent received, rounded down.
    pub fn percent(&self) -> Option<u8> {
        self.fraction().map(|f| (f * 100.0).floor() as u8)
    }
}

/// Receives progress callbacks from a [`StreamLoader`](crate::StreamLoader).
///
/// Both methods default to doing nothing.
pub trait LoadObserver {
    /// The header has been decoded and cross-checked. Called at most once
    /// per load.
    fn on_declared(&mut self, header: &FileHeader) {
        let _ = header;
    }

    /// A chunk has been committed.
    fn on_progress(&mut self, progress: LoadProgress) {
        let _ = progress;
    }
}

/// Observer that ignores every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}

impl<O: LoadObserver + ?Sized> LoadObserver for &mut O {
    fn on_declared(&mut self, header: &FileHeader) {
        (**self).on_declared(header);
    }

    fn on_progress(&mut self, progress: LoadProgress) {
        (**self).on_progress(progress);
    }
}
