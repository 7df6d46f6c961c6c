use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use multibrot_core::{EvalConfig, Multibrot, PlaneRegion, PointEvaluator};

use crate::buffer::RenderBuffer;
use crate::cancel::{ProgressFn, RenderCancel};
use crate::error::RenderError;
use crate::grid::{GridKey, ResultGrid};
use crate::registry::ThemeRegistry;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The result of one [`SetRenderer::render`] call that was not ignored.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// The colored frame; all black when `completed` is false.
    pub image: RenderBuffer,
    /// False when the render was cancelled; the committed grid is then
    /// exactly what it was before the call.
    pub completed: bool,
    /// Whether points were evaluated, as opposed to recoloring a cached grid.
    pub recomputed: bool,
    pub elapsed: Duration,
    /// Non-finite distance estimates in the grid that was colored.
    pub nan_estimates: usize,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Evaluates the set into a cached [`ResultGrid`] and colors it with the
/// current theme of a [`ThemeRegistry`].
///
/// `render` is synchronous; callers run it on a worker thread and use
/// [`cancel`](Self::cancel) or the shared [`RenderCancel`] from elsewhere.
/// Only one render runs at a time: a call arriving while another is in
/// flight is ignored.
pub struct SetRenderer<E = Multibrot> {
    evaluator: E,
    grid: Mutex<ResultGrid>,
    cancel: Arc<RenderCancel>,
    progress: Option<Box<ProgressFn>>,
}

impl SetRenderer<Multibrot> {
    pub fn new() -> Self {
        Self::with_evaluator(Multibrot)
    }
}

impl Default for SetRenderer<Multibrot> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PointEvaluator + Sync> SetRenderer<E> {
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            evaluator,
            grid: Mutex::new(ResultGrid::new()),
            cancel: Arc::new(RenderCancel::new()),
            progress: None,
        }
    }

    /// Install a progress sink. Each pass (evaluation, coloring) reports
    /// its own `0..=100` stream; a `0` after other values means the pass
    /// was cancelled.
    pub fn with_progress(mut self, sink: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Request a cooperative abort of the render in flight. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Shared handle for cancelling from another thread.
    pub fn cancel_handle(&self) -> Arc<RenderCancel> {
        Arc::clone(&self.cancel)
    }

    /// Drop the cached grid's key so the next render re-evaluates.
    ///
    /// Blocks while a render is in flight.
    pub fn invalidate(&self) {
        self.lock_grid().invalidate();
    }

    /// Snapshot of the committed grid. Blocks while a render is in flight.
    pub fn committed_grid(&self) -> ResultGrid {
        self.lock_grid().clone()
    }

    fn lock_grid(&self) -> MutexGuard<'_, ResultGrid> {
        self.grid.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Render `region` at `width × height` with the registry's current theme.
    ///
    /// Returns an error for invalid input (nothing is touched), `Ok(None)`
    /// if another render is already running, and otherwise an outcome that
    /// says whether the render completed or was cancelled.
    pub fn render(
        &self,
        region: PlaneRegion,
        width: u32,
        height: u32,
        config: EvalConfig,
        registry: &mut ThemeRegistry,
    ) -> crate::Result<Option<RenderOutcome>> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        region.validate()?;
        config.validate()?;

        let mut committed = match self.grid.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                debug!("Render already in flight, ignoring request");
                return Ok(None);
            }
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
        };

        let start = Instant::now();
        self.cancel.reset();
        let progress = self.progress.as_deref();
        let key = GridKey::new(width, height, region, config);

        debug!(
            width,
            height,
            %region,
            order = config.order,
            max_iterations = config.max_iterations,
            theme = registry.current_name(),
            "Starting render"
        );

        // Evaluate off to the side so a cancelled render never replaces
        // the committed grid.
        let candidate = if committed.is_fresh(&key) {
            debug!("Reusing result grid");
            None
        } else {
            match ResultGrid::compute(&self.evaluator, key, &self.cancel, progress) {
                Some(grid) => Some(grid),
                None => return Ok(Some(self.cancelled(width, height, start, true))),
            }
        };
        let recomputed = candidate.is_some();
        let grid = candidate.as_ref().unwrap_or(&*committed);

        registry.prepare_current(grid);
        let Some(image) = registry
            .current()
            .colorize(grid, config.order, &self.cancel, progress)
        else {
            return Ok(Some(self.cancelled(width, height, start, recomputed)));
        };

        let nan_estimates = grid.nan_estimates();
        if let Some(grid) = candidate {
            *committed = grid;
        }

        let elapsed = start.elapsed();
        info!(
            elapsed_ms = elapsed.as_millis(),
            recomputed,
            nan_estimates,
            zoom = region.zoom_factor(),
            "Render complete"
        );

        Ok(Some(RenderOutcome {
            image,
            completed: true,
            recomputed,
            elapsed,
            nan_estimates,
        }))
    }

    fn cancelled(&self, width: u32, height: u32, start: Instant, recomputed: bool) -> RenderOutcome {
        let elapsed = start.elapsed();
        info!(elapsed_ms = elapsed.as_millis(), "Render cancelled");
        RenderOutcome {
            image: RenderBuffer::new(width, height),
            completed: false,
            recomputed,
            elapsed,
            nan_estimates: 0,
        }
    }
}
