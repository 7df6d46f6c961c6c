use thiserror::Error;

/// Errors originating from the rendering pipeline.
///
/// Only precondition failures end up here; cancellation and numeric
/// anomalies are reported through [`RenderOutcome`](crate::RenderOutcome).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Core(#[from] multibrot_core::CoreError),
}
