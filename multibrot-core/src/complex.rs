use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A point of the complex plane, `re + im·i`.
///
/// A small `Copy` type for the iteration loop. Real (non-integer) powers
/// are needed for Multibrot orders, so [`powf`](Self::powf) works in polar
/// form rather than by repeated multiplication.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Squared modulus, used for the escape test.
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Modulus `|z|`.
    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Principal argument in `(-π, π]`.
    #[inline]
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }

    /// Raise to a real power: `|z|ⁿ · e^{i·n·arg z}`.
    ///
    /// `0ⁿ` is `0` for `n > 0`, and `z⁰` is `1`. Orders 1 and 2 take an
    /// exact fast path.
    #[inline]
    pub fn powf(self, n: f64) -> Self {
        if n == 0.0 {
            return Self::ONE;
        }
        if n == 1.0 {
            return self;
        }
        if n == 2.0 {
            return self * self;
        }
        if self.re == 0.0 && self.im == 0.0 {
            return if n > 0.0 {
                Self::ZERO
            } else {
                Self::new(f64::INFINITY, 0.0)
            };
        }
        let r = self.norm().powf(n);
        let theta = self.arg() * n;
        Self::new(r * theta.cos(), r * theta.sin())
    }
}

impl Add for Complex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Sub for Complex {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl Mul for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl Neg for Complex {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl Mul<f64> for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self {
            re: self.re * rhs,
            im: self.im * rhs,
        }
    }
}

impl std::fmt::Display for Complex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.im >= 0.0 {
            write!(f, "{} + {}i", self.re, self.im)
        } else {
            write!(f, "{} - {}i", self.re, -self.im)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex, b: Complex) -> bool {
        (a.re - b.re).abs() < 1e-9 && (a.im - b.im).abs() < 1e-9
    }

    #[test]
    fn i_squared_is_minus_one() {
        let i = Complex::new(0.0, 1.0);
        assert_eq!(i * i, Complex::new(-1.0, 0.0));
    }

    #[test]
    fn operators_act_componentwise() {
        let z = Complex::new(-1.5, 0.25);
        let c = Complex::new(0.5, -0.75);
        assert_eq!(z + c, Complex::new(-1.0, -0.5));
        assert_eq!(z - c, Complex::new(-2.0, 1.0));
        assert_eq!(-c, Complex::new(-0.5, 0.75));
        assert_eq!(c * 4.0, Complex::new(2.0, -3.0));
    }

    #[test]
    fn modulus_and_argument() {
        let z = Complex::new(-6.0, 8.0);
        assert_eq!(z.norm_sq(), 100.0);
        assert_eq!(z.norm(), 10.0);
        assert!((Complex::new(-1.0, 0.0).arg() - std::f64::consts::PI).abs() < 1e-15);
    }

    #[test]
    fn powf_matches_repeated_multiplication() {
        let z = Complex::new(0.3, -1.2);
        assert!(close(z.powf(3.0), z * z * z));
        assert!(close(z.powf(4.0), z * z * z * z));
    }

    #[test]
    fn powf_of_zero() {
        assert_eq!(Complex::ZERO.powf(2.0), Complex::ZERO);
        assert_eq!(Complex::ZERO.powf(2.5), Complex::ZERO);
        assert_eq!(Complex::ZERO.powf(0.0), Complex::ONE);
        assert_eq!(Complex::ZERO.powf(1.0), Complex::ZERO);
        assert!(Complex::ZERO.powf(-1.0).re.is_infinite());
    }

    #[test]
    fn powf_half_is_square_root() {
        // sqrt(2i) = 1 + i
        assert!(close(Complex::new(0.0, 2.0).powf(0.5), Complex::new(1.0, 1.0)));
    }

    #[test]
    fn display_shows_sign_of_imaginary_part() {
        assert_eq!(Complex::new(1.0, -2.0).to_string(), "1 - 2i");
        assert_eq!(Complex::new(-0.5, 0.0).to_string(), "-0.5 + 0i");
    }
}
