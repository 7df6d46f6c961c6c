use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared cancellation flag plus the last reported progress percentage.
///
/// Workers poll [`is_cancelled`](Self::is_cancelled) at the start of every
/// row. Setting the flag never interrupts a row already in progress.
#[derive(Debug, Default)]
pub struct RenderCancel {
    cancelled: AtomicBool,
    percent: AtomicU8,
}

impl RenderCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative abort. Calling it again is harmless.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag before starting a new render.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Most recent percentage emitted by the running (or last) pass.
    pub fn progress(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Callback receiving progress percentages in `0..=100`.
pub type ProgressFn = dyn Fn(u8) + Send + Sync;

/// Turns "rows done" into a deduplicated, non-decreasing percentage stream.
///
/// Rows finish out of order on the worker pool, so emission is serialized
/// behind a mutex holding the last emitted value.
pub(crate) struct ProgressReporter<'a> {
    total: usize,
    done: Mutex<(usize, Option<u8>)>,
    sink: Option<&'a ProgressFn>,
    cancel: &'a RenderCancel,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(total: usize, sink: Option<&'a ProgressFn>, cancel: &'a RenderCancel) -> Self {
        Self {
            total,
            done: Mutex::new((0, None)),
            sink,
            cancel,
        }
    }

    /// Record one finished unit of work.
    pub(crate) fn advance(&self) {
        let mut guard = self.done.lock().unwrap_or_else(|e| e.into_inner());
        guard.0 += 1;
        let percent = if self.total == 0 {
            100
        } else {
            (guard.0 * 100 / self.total).min(100) as u8
        };
        if guard.1.map_or(true, |last| percent > last) {
            guard.1 = Some(percent);
            self.emit(percent);
        }
    }

    /// Emit the final `100` unless it was already the last value sent.
    pub(crate) fn finish(&self) {
        let mut guard = self.done.lock().unwrap_or_else(|e| e.into_inner());
        if guard.1 != Some(100) {
            guard.1 = Some(100);
            self.emit(100);
        }
    }

    /// Signal an aborted pass with a `0`.
    pub(crate) fn reset(&self) {
        let mut guard = self.done.lock().unwrap_or_else(|e| e.into_inner());
        guard.1 = Some(0);
        self.emit(0);
    }

    fn emit(&self, percent: u8) {
        self.cancel.percent.store(percent, Ordering::Relaxed);
        if let Some(sink) = self.sink {
            sink(percent);
        }
    }
}
