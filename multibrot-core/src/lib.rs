pub mod complex;
pub mod error;
pub mod eval;
pub mod region;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use eval::{EvalConfig, Multibrot, PointEvaluator, PointResult};
pub use region::PlaneRegion;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
