use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// The outcome of iterating a single plane point.
///
/// Escape data and the distance estimate latch independently: a point may
/// carry a distance estimate without ever escaping, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointResult {
    /// Iteration at which `|z|²` first exceeded 4, or `None` if the series
    /// stayed bounded for the whole iteration budget.
    pub escape_index: Option<u32>,

    /// `|z|` at the escaping iteration. Zero when the point never escaped.
    pub escape_radius: f64,

    /// `|z|·ln|z| / |dz|` at the first iteration past the distance trigger.
    /// Zero when the trigger never fired; NaN is possible and reported by
    /// the caller rather than repaired here.
    pub distance_estimate: f64,
}

impl PointResult {
    /// A point that never escaped and never produced a distance estimate.
    pub const BOUNDED: Self = Self {
        escape_index: None,
        escape_radius: 0.0,
        distance_estimate: 0.0,
    };

    #[inline]
    pub fn diverged(&self) -> bool {
        self.escape_index.is_some()
    }

    /// True when the distance estimate is NaN or infinite.
    #[inline]
    pub fn has_distance_anomaly(&self) -> bool {
        !self.distance_estimate.is_finite()
    }
}

impl Default for PointResult {
    fn default() -> Self {
        Self::BOUNDED
    }
}

/// Parameters controlling the series iteration.
///
/// Any change to either field invalidates previously computed results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Exponent `a` in `z ← zᵃ + c`. Two gives the classic Mandelbrot set.
    pub order: f64,

    /// Iteration budget before a point is declared bounded.
    pub max_iterations: u32,
}

impl EvalConfig {
    pub const DEFAULT_ORDER: f64 = 2.0;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 500;

    pub fn new(order: f64, max_iterations: u32) -> crate::Result<Self> {
        let config = Self {
            order,
            max_iterations,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(self.max_iterations));
        }
        if !self.order.is_finite() || self.order < 0.0 {
            return Err(CoreError::InvalidOrder(self.order));
        }
        Ok(())
    }

    /// Return a copy with a different `max_iterations` value.
    pub fn with_max_iterations(self, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Return a copy with a different order.
    pub fn with_order(self, order: f64) -> Self {
        Self { order, ..self }
    }

    /// Bit-for-bit comparison, used to decide whether cached results apply.
    pub fn same_bits(&self, other: &Self) -> bool {
        self.order.to_bits() == other.order.to_bits() && self.max_iterations == other.max_iterations
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            order: Self::DEFAULT_ORDER,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Maps a plane point to its convergence result.
///
/// Implementations must be free of shared mutable state so the grid can
/// evaluate rows in parallel. Grid code is generic over this trait for
/// static dispatch.
pub trait PointEvaluator {
    fn evaluate(&self, c: Complex, config: &EvalConfig) -> PointResult;
}

/// The Multibrot series `z_{n+1} = z_nᵃ + c`, `z₀ = 0`, together with its
/// derivative `dz_{n+1} = a·z_nᵃ⁻¹·dz_n + 1`, `dz₀ = 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Multibrot;

impl Multibrot {
    /// `|z|²` above which the series counts as escaped.
    pub const ESCAPE_NORM_SQ: f64 = 4.0;

    /// Iteration count past which the distance estimate is taken.
    pub const DISTANCE_ITERATION_TRIGGER: u32 = 1000;

    /// Derivative modulus past which the distance estimate is taken.
    pub const DISTANCE_DERIVATIVE_TRIGGER: f64 = 1000.0;
}

impl PointEvaluator for Multibrot {
    fn evaluate(&self, c: Complex, config: &EvalConfig) -> PointResult {
        let order = config.order;
        let mut result = PointResult::BOUNDED;

        let mut z = Complex::ZERO;
        let mut dz = Complex::ONE;
        let mut escaped = false;
        let mut estimated = false;

        for i in 0..config.max_iterations {
            // The derivative uses the previous z, so update it first.
            dz = if order == 0.0 {
                Complex::ONE
            } else {
                z.powf(order - 1.0) * dz * order + Complex::ONE
            };
            z = z.powf(order) + c;

            let norm_sq = z.norm_sq();
            if !escaped && norm_sq > Self::ESCAPE_NORM_SQ {
                result.escape_index = Some(i);
                result.escape_radius = norm_sq.sqrt();
                escaped = true;
            }

            let dr = dz.norm();
            if !estimated
                && (i > Self::DISTANCE_ITERATION_TRIGGER || dr > Self::DISTANCE_DERIVATIVE_TRIGGER)
            {
                let r = norm_sq.sqrt();
                result.distance_estimate = r * r.ln() / dr;
                estimated = true;
            }

            if escaped && estimated {
                break;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(re: f64, im: f64, config: EvalConfig) -> PointResult {
        Multibrot.evaluate(Complex::new(re, im), &config)
    }

    #[test]
    fn origin_never_escapes() {
        for max_iterations in [1, 2, 50, 500, 2000] {
            let r = eval(0.0, 0.0, EvalConfig::default().with_max_iterations(max_iterations));
            assert_eq!(r.escape_index, None, "max_iterations = {max_iterations}");
        }
    }

    #[test]
    fn far_point_escapes_immediately() {
        let r = eval(3.0, 0.0, EvalConfig::default());
        assert_eq!(r.escape_index, Some(0));
        assert!(r.escape_radius >= 2.0);
        assert!((r.escape_radius - 3.0).abs() < 1e-12);
    }

    #[test]
    fn known_escape_count() {
        // c = 1: z = 1, 2, 5 → |z|² first exceeds 4 at the third step (index 2).
        let r = eval(1.0, 0.0, EvalConfig::default());
        assert_eq!(r.escape_index, Some(2));
        assert!((r.escape_radius - 5.0).abs() < 1e-12);
    }

    #[test]
    fn minus_one_is_bounded() {
        // Period-2 orbit 0 → -1 → 0 → -1 …
        let r = eval(-1.0, 0.0, EvalConfig::default());
        assert!(!r.diverged());
    }

    #[test]
    fn escaping_point_gets_positive_distance() {
        let r = eval(0.5, 0.5, EvalConfig::default());
        assert!(r.diverged());
        assert!(r.distance_estimate.is_finite());
        assert!(r.distance_estimate > 0.0);
    }

    #[test]
    fn distance_latches_without_escape_budget() {
        // c = 3 escapes at step 0; with a budget of one iteration the
        // derivative never reaches the trigger, so the estimate stays zero.
        let r = eval(3.0, 0.0, EvalConfig::default().with_max_iterations(1));
        assert_eq!(r.escape_index, Some(0));
        assert_eq!(r.distance_estimate, 0.0);
    }

    #[test]
    fn origin_past_iteration_trigger_yields_nan_estimate() {
        // z stays at 0, so |z|·ln|z| = 0·(-∞) once the iteration trigger fires.
        let r = eval(0.0, 0.0, EvalConfig::default().with_max_iterations(1100));
        assert!(!r.diverged());
        assert!(r.has_distance_anomaly());
    }

    #[test]
    fn higher_order_escapes_faster_outside_unit_disk() {
        let c2 = eval(1.2, 0.0, EvalConfig::default());
        let c4 = eval(1.2, 0.0, EvalConfig::default().with_order(4.0));
        assert!(c4.escape_index.unwrap() <= c2.escape_index.unwrap());
    }

    #[test]
    fn fractional_order_is_deterministic() {
        let config = EvalConfig::default().with_order(2.5);
        assert_eq!(eval(-0.3, 0.7, config), eval(-0.3, 0.7, config));
    }

    #[test]
    fn config_validation() {
        assert!(EvalConfig::new(2.0, 0).is_err());
        assert!(EvalConfig::new(-1.0, 10).is_err());
        assert!(EvalConfig::new(f64::NAN, 10).is_err());
        assert!(EvalConfig::new(0.0, 1).is_ok());
        let c = EvalConfig::default();
        assert_eq!(c.order, 2.0);
        assert_eq!(c.max_iterations, 500);
    }

    #[test]
    fn config_bit_comparison() {
        let a = EvalConfig::default();
        assert!(a.same_bits(&a.with_max_iterations(500)));
        assert!(!a.same_bits(&a.with_max_iterations(501)));
        assert!(!a.same_bits(&a.with_order(2.000_000_000_1)));
    }
}
