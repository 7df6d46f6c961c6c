use std::f64::consts::PI;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::theme::ThemeInfo;

/// Color returned by lookups into an empty palette.
pub const DEFAULT_COLOR: Rgb = Rgb::BLACK;

// ---------------------------------------------------------------------------
// Palette kind
// ---------------------------------------------------------------------------

/// How the palette entries are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaletteKind {
    /// Straight blend from start to end color.
    #[default]
    Linear,
    /// Blend weighted by `ln(1 + i) / ln(n)`.
    Logarithmic,
    /// Blend weighted by `exp(1 + i) / exp(n)`.
    Exponential,
    /// Blend weighted by a quarter cosine wave.
    Trigonometric,
    /// Uniform random colors from a seeded generator.
    Randomized,
    /// Fixed hue sweep, ignores start and end colors.
    Rainbow,
    /// Unrecognized kind from a theme definition. Builds an all-black palette.
    #[serde(other)]
    Unknown,
}

impl PaletteKind {
    /// Kinds offered to theme editors.
    pub fn selectable() -> &'static [PaletteKind] {
        &[
            Self::Linear,
            Self::Logarithmic,
            Self::Exponential,
            Self::Trigonometric,
            Self::Randomized,
            Self::Rainbow,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Logarithmic => "Logarithmic",
            Self::Exponential => "Exponential",
            Self::Trigonometric => "Trigonometric",
            Self::Randomized => "Randomized",
            Self::Rainbow => "Rainbow",
            Self::Unknown => "NoPalette",
        }
    }
}

impl std::fmt::Display for PaletteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaletteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::selectable()
            .iter()
            .copied()
            .find(|k| k.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown palette kind: {s:?}"))
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// An ordered, fixed-length list of colors used as a lookup table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    /// Generate the palette described by `info`.
    ///
    /// Deterministic: the same `info` always yields the same colors, including
    /// for [`PaletteKind::Randomized`], whose generator is seeded once per call.
    pub fn build(info: &ThemeInfo) -> Self {
        let n = info.n_colors;
        let colors = match info.palette_kind {
            PaletteKind::Linear
            | PaletteKind::Logarithmic
            | PaletteKind::Exponential
            | PaletteKind::Trigonometric => (0..n)
                .map(|i| {
                    let f = gradient_weight(info.palette_kind, i, n);
                    Rgb::lerp(info.start_color, info.end_color, f)
                })
                .collect(),
            PaletteKind::Rainbow => (0..n).map(|i| rainbow(i, n)).collect(),
            PaletteKind::Randomized => {
                let mut rng = StdRng::seed_from_u64(info.random_seed);
                (0..n)
                    .map(|_| {
                        let r = rng.gen::<u8>();
                        let g = rng.gen::<u8>();
                        let b = rng.gen::<u8>();
                        Rgb::new(r, g, b)
                    })
                    .collect()
            }
            PaletteKind::Unknown => vec![DEFAULT_COLOR; n],
        };
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// `palette[i mod len]`, wrapping negative indices; black when empty.
    #[inline]
    pub fn cyclic(&self, i: i64) -> Rgb {
        if self.colors.is_empty() {
            return DEFAULT_COLOR;
        }
        let len = self.colors.len() as i64;
        self.colors[i.rem_euclid(len) as usize]
    }

    /// `palette[len − 1 − (i mod len)]`: walks the palette from the end.
    #[inline]
    pub fn inverted(&self, i: i64) -> Rgb {
        if self.colors.is_empty() {
            return DEFAULT_COLOR;
        }
        let len = self.colors.len() as i64;
        self.colors[(len - 1 - i.rem_euclid(len)) as usize]
    }
}

/// Blend weight for the start/end gradient kinds.
fn gradient_weight(kind: PaletteKind, i: usize, n: usize) -> f64 {
    let nf = n as f64;
    let linear = (1.0 + i as f64) / nf;
    match kind {
        PaletteKind::Logarithmic => {
            // A single-entry palette would be ln(1)/ln(1); give it the end color.
            if n == 1 {
                1.0
            } else {
                (1.0 + i as f64).ln() / nf.ln()
            }
        }
        // exp(1 + i) / exp(n), folded into one exponent to stay finite for large n.
        PaletteKind::Exponential => (1.0 + i as f64 - nf).exp(),
        PaletteKind::Trigonometric => (linear * PI - PI / 2.0).cos(),
        _ => linear,
    }
}

/// Folded triangular wave per channel, offset by a third of a turn.
fn rainbow(i: usize, n: usize) -> Rgb {
    let f = (1.0 + i as f64) / n as f64;
    let channel = |offset: f64| {
        let mut phase = f - offset;
        while phase < -0.5 {
            phase += 1.0;
        }
        while phase > 0.5 {
            phase -= 1.0;
        }
        let v = (6.0 * phase.abs() - 1.0).clamp(0.0, 1.0);
        (v * 255.0) as u8
    };
    Rgb::new(channel(3.0 / 6.0), channel(5.0 / 6.0), channel(1.0 / 6.0))
}

/// Draw a fresh seed for a randomized palette from the caller's generator.
pub fn suggest_seed<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    rng.gen_range(0..=i32::MAX as u64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn info(kind: PaletteKind, n: usize) -> ThemeInfo {
        ThemeInfo {
            palette_kind: kind,
            n_colors: n,
            start_color: Rgb::new(0, 0, 0),
            end_color: Rgb::new(200, 100, 50),
            ..ThemeInfo::default()
        }
    }

    #[test]
    fn every_kind_builds_n_colors() {
        for &kind in PaletteKind::selectable() {
            assert_eq!(Palette::build(&info(kind, 37)).len(), 37, "{kind}");
        }
        assert_eq!(Palette::build(&info(PaletteKind::Unknown, 5)).len(), 5);
    }

    #[test]
    fn linear_ends_on_end_color() {
        let p = Palette::build(&info(PaletteKind::Linear, 4));
        // f = 0.25, 0.5, 0.75, 1.0
        assert_eq!(p.colors()[0], Rgb::new(50, 25, 12));
        assert_eq!(p.colors()[3], Rgb::new(200, 100, 50));
    }

    #[test]
    fn logarithmic_starts_on_start_color() {
        let p = Palette::build(&info(PaletteKind::Logarithmic, 10));
        assert_eq!(p.colors()[0], Rgb::BLACK);
        assert_eq!(p.colors()[9], Rgb::new(200, 100, 50));
        assert_eq!(
            Palette::build(&info(PaletteKind::Logarithmic, 1)).colors()[0],
            Rgb::new(200, 100, 50)
        );
    }

    #[test]
    fn exponential_stays_finite_for_large_palettes() {
        let p = Palette::build(&info(PaletteKind::Exponential, 2000));
        assert_eq!(p.colors()[1999], Rgb::new(200, 100, 50));
        assert_eq!(p.colors()[0], Rgb::BLACK);
    }

    #[test]
    fn trigonometric_peaks_mid_palette() {
        let p = Palette::build(&info(PaletteKind::Trigonometric, 8));
        // cos(0) at f = 1/2, cos(π/2) ≈ 0 at f = 1.
        assert_eq!(p.colors()[3], Rgb::new(200, 100, 50));
        assert_eq!(p.colors()[7], Rgb::BLACK);
    }

    #[test]
    fn rainbow_ignores_start_and_end() {
        let mut other = info(PaletteKind::Rainbow, 6);
        other.start_color = Rgb::WHITE;
        assert_eq!(
            Palette::build(&info(PaletteKind::Rainbow, 6)),
            Palette::build(&other)
        );
    }

    #[test]
    fn rainbow_primary_hues() {
        let p = Palette::build(&info(PaletteKind::Rainbow, 6));
        // f = 1/2 → cyan, f = 1 → red.
        assert_eq!(p.colors()[2], Rgb::new(0, 255, 255));
        assert_eq!(p.colors()[5], Rgb::new(255, 0, 0));
    }

    #[test]
    fn randomized_is_deterministic_per_seed() {
        let a = Palette::build(&info(PaletteKind::Randomized, 64));
        let b = Palette::build(&info(PaletteKind::Randomized, 64));
        assert_eq!(a, b);

        let mut reseeded = info(PaletteKind::Randomized, 64);
        reseeded.random_seed += 1;
        assert_ne!(a, Palette::build(&reseeded));
    }

    #[test]
    fn empty_palette_falls_back_to_black() {
        let p = Palette::build(&info(PaletteKind::Linear, 0));
        assert!(p.is_empty());
        assert_eq!(p.cyclic(3), DEFAULT_COLOR);
        assert_eq!(p.inverted(-7), DEFAULT_COLOR);
    }

    #[test]
    fn cyclic_lookup_wraps() {
        let p = Palette::build(&info(PaletteKind::Randomized, 7));
        let len = p.len() as i64;
        for i in -20..20 {
            assert_eq!(p.cyclic(i), p.cyclic(i + len));
            assert_eq!(p.cyclic(i), p.colors()[(((i % len) + len) % len) as usize]);
        }
    }

    #[test]
    fn inverted_lookup_mirrors_cyclic() {
        let p = Palette::build(&info(PaletteKind::Rainbow, 9));
        let len = p.len() as i64;
        for i in -20..20 {
            assert_eq!(p.inverted(i), p.cyclic(len - 1 - i));
        }
    }

    #[test]
    fn kind_labels_parse_back() {
        for &kind in PaletteKind::selectable() {
            assert_eq!(kind.label().parse::<PaletteKind>().unwrap(), kind);
        }
        assert!("rainbow".parse::<PaletteKind>().is_ok());
        assert!("NoPalette".parse::<PaletteKind>().is_err());
    }

    #[test]
    fn suggested_seed_is_reproducible_from_rng() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(suggest_seed(&mut a), suggest_seed(&mut b));
    }
}
