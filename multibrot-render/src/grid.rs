use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, warn};

use multibrot_core::{EvalConfig, PlaneRegion, PointEvaluator, PointResult};

use crate::cancel::{ProgressFn, ProgressReporter, RenderCancel};

/// Everything that determines the contents of a [`ResultGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridKey {
    pub width: u32,
    pub height: u32,
    pub region: PlaneRegion,
    pub config: EvalConfig,
}

impl GridKey {
    pub fn new(width: u32, height: u32, region: PlaneRegion, config: EvalConfig) -> Self {
        Self {
            width,
            height,
            region,
            config,
        }
    }

    /// Bit-identical comparison: a grid is only reused for the exact same
    /// request, never for one that is merely numerically equal.
    pub fn matches(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.region.same_bits(&other.region)
            && self.config.same_bits(&other.config)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// What [`ResultGrid::ensure_fresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridUpdate {
    /// The stored results already matched the request.
    Reused,
    /// The results were evaluated and stored.
    Recomputed,
    /// Evaluation was aborted; the stored results are unchanged.
    Cancelled,
}

/// Per-pixel [`PointResult`]s for a full frame, row-major with row 0 at
/// the top (maximum y).
///
/// Keeping raw results apart from colored pixels lets a theme change
/// recolor the frame without evaluating a single point.
#[derive(Debug, Clone, Default)]
pub struct ResultGrid {
    key: Option<GridKey>,
    data: Vec<PointResult>,
    nan_estimates: usize,
}

impl ResultGrid {
    /// An empty grid that is stale for every request.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&GridKey> {
        self.key.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.key.map_or(0, |k| k.width)
    }

    pub fn height(&self) -> u32 {
        self.key.map_or(0, |k| k.height)
    }

    pub fn results(&self) -> &[PointResult] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&PointResult> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.data.get(y as usize * self.width() as usize + x as usize)
    }

    /// Number of points whose distance estimate came out NaN or infinite.
    pub fn nan_estimates(&self) -> usize {
        self.nan_estimates
    }

    pub fn is_fresh(&self, key: &GridKey) -> bool {
        self.key.is_some_and(|k| k.matches(key))
    }

    /// Forget the key so that the next request recomputes.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// Reuse the stored results if they match `key`, otherwise evaluate a
    /// new grid and replace the stored one.
    ///
    /// On cancellation the stored grid is left exactly as it was.
    pub fn ensure_fresh<E: PointEvaluator + Sync>(
        &mut self,
        evaluator: &E,
        key: GridKey,
        cancel: &RenderCancel,
        progress: Option<&ProgressFn>,
    ) -> GridUpdate {
        if self.is_fresh(&key) {
            debug!(
                width = key.width,
                height = key.height,
                "Reusing result grid"
            );
            return GridUpdate::Reused;
        }
        match Self::compute(evaluator, key, cancel, progress) {
            Some(grid) => {
                *self = grid;
                GridUpdate::Recomputed
            }
            None => GridUpdate::Cancelled,
        }
    }

    /// Evaluate every pixel of `key` into a new grid.
    ///
    /// Rows are evaluated in parallel and the cancel flag is polled before
    /// each row. Returns `None` if the render was cancelled, after emitting
    /// a progress reset.
    pub fn compute<E: PointEvaluator + Sync>(
        evaluator: &E,
        key: GridKey,
        cancel: &RenderCancel,
        progress: Option<&ProgressFn>,
    ) -> Option<Self> {
        let reporter = ProgressReporter::new(key.height as usize, progress, cancel);
        let mut data = vec![PointResult::BOUNDED; key.pixel_count()];
        let nan_count = AtomicUsize::new(0);

        debug!(
            width = key.width,
            height = key.height,
            order = key.config.order,
            max_iterations = key.config.max_iterations,
            "Evaluating result grid"
        );

        if key.width > 0 {
            data.par_chunks_mut(key.width as usize)
                .enumerate()
                .for_each(|(py, row)| {
                    if cancel.is_cancelled() {
                        return;
                    }
                    for (px, cell) in row.iter_mut().enumerate() {
                        let c = key
                            .region
                            .pixel_to_complex(px as u32, py as u32, key.width, key.height);
                        *cell = evaluator.evaluate(c, &key.config);
                        if cell.has_distance_anomaly() {
                            nan_count.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    reporter.advance();
                });
        }

        if cancel.is_cancelled() {
            reporter.reset();
            debug!("Result grid evaluation cancelled");
            return None;
        }
        reporter.finish();

        let nan_estimates = nan_count.into_inner();
        if nan_estimates > 0 {
            warn!(
                nan_estimates,
                "Distance estimator produced non-finite values"
            );
        }

        Some(Self {
            key: Some(key),
            data,
            nan_estimates,
        })
    }
}
