use thiserror::Error;

/// Errors originating from the core evaluation engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid order: {0} (must be finite and >= 0.0)")]
    InvalidOrder(f64),

    #[error("invalid region: {reason}")]
    InvalidRegion { reason: String },
}
