use std::collections::HashMap;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use multibrot_core::PointResult;

use crate::buffer::RenderBuffer;
use crate::cancel::{ProgressFn, ProgressReporter, RenderCancel};
use crate::color::Rgb;
use crate::grid::ResultGrid;
use crate::palette::{Palette, PaletteKind, DEFAULT_COLOR};

/// Palette index scale used by histogram coloring; sized for the usual
/// 100-entry palettes and wrapped for any other length.
const HISTOGRAM_SPAN: f64 = 99.0;

// ---------------------------------------------------------------------------
// Theme kind
// ---------------------------------------------------------------------------

/// How a [`PointResult`] is turned into a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThemeKind {
    /// One color for bounded points, one for escaped points.
    #[default]
    BiColor,
    /// Palette indexed by escape iteration, walked from the end.
    EscapeTime,
    /// Palette position proportional to the boundary distance estimate.
    Distance,
    /// Smooth (fractional) escape count blended between palette entries.
    Continuous,
    /// Palette position from the relative frequency of each escape index.
    Histogram,
    /// Unrecognized kind from a theme definition. Colors everything black.
    #[serde(other)]
    Unknown,
}

impl ThemeKind {
    /// Kinds offered to theme editors, in menu order.
    pub fn selectable() -> &'static [ThemeKind] {
        &[
            Self::BiColor,
            Self::EscapeTime,
            Self::Continuous,
            Self::Histogram,
            Self::Distance,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BiColor => "Bi-Color",
            Self::EscapeTime => "Escape Time",
            Self::Continuous => "Continuous Escape Time",
            Self::Histogram => "Escape Time Histogram",
            Self::Distance => "Distance",
            Self::Unknown => "NoTheme",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Self::BiColor => "BiColor",
            Self::EscapeTime => "EscapeTime",
            Self::Continuous => "Continuous",
            Self::Histogram => "Histogram",
            Self::Distance => "Distance",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether [`Theme::prepare_for_grid`] has work to do for this kind.
    pub fn needs_prepass(self) -> bool {
        self == Self::Histogram
    }
}

impl std::fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ThemeKind {
    type Err = String;

    /// Accepts the display label or the short variant name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::selectable()
            .iter()
            .copied()
            .find(|k| k.label().eq_ignore_ascii_case(s) || k.short_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown theme kind: {s:?}"))
    }
}

// ---------------------------------------------------------------------------
// Theme info
// ---------------------------------------------------------------------------

/// Settings describing one color theme.
///
/// A plain value: editing produces a new `ThemeInfo` which is handed back to
/// [`Theme::set_info`] (or the registry), regenerating the palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeInfo {
    /// Unique key within a [`ThemeRegistry`](crate::ThemeRegistry).
    pub name: String,
    pub theme_kind: ThemeKind,
    pub palette_kind: PaletteKind,
    pub start_color: Rgb,
    pub end_color: Rgb,
    pub n_colors: usize,
    pub converged_color: Rgb,
    pub diverged_color: Rgb,
    pub random_seed: u64,
}

impl ThemeInfo {
    pub const DEFAULT_N_COLORS: usize = 100;
    pub const DEFAULT_RANDOM_SEED: u64 = 1234;

    /// A two-color theme: `converged` inside the set, `diverged` outside.
    pub fn bi_color(name: impl Into<String>, converged: Rgb, diverged: Rgb) -> Self {
        Self {
            name: name.into(),
            theme_kind: ThemeKind::BiColor,
            converged_color: converged,
            diverged_color: diverged,
            ..Self::default()
        }
    }
}

impl Default for ThemeInfo {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            theme_kind: ThemeKind::BiColor,
            palette_kind: PaletteKind::Linear,
            start_color: Rgb::BLACK,
            end_color: Rgb::WHITE,
            n_colors: Self::DEFAULT_N_COLORS,
            converged_color: Rgb::BLACK,
            diverged_color: Rgb::WHITE,
            random_seed: Self::DEFAULT_RANDOM_SEED,
        }
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// A [`ThemeInfo`] bound to its generated palette and, in histogram mode,
/// the escape-index distribution of the grid being colored.
#[derive(Debug, Clone)]
pub struct Theme {
    info: ThemeInfo,
    palette: Palette,
    /// Escape index → frequency normalized by the most frequent index.
    histogram: HashMap<u32, f64>,
}

impl Theme {
    pub fn new(info: ThemeInfo) -> Self {
        let palette = Palette::build(&info);
        Self {
            info,
            palette,
            histogram: HashMap::new(),
        }
    }

    pub fn info(&self) -> &ThemeInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn histogram(&self) -> &HashMap<u32, f64> {
        &self.histogram
    }

    /// Replace the settings, regenerating the palette and dropping any
    /// histogram built for the previous settings.
    pub fn set_info(&mut self, info: ThemeInfo) {
        self.palette = Palette::build(&info);
        self.info = info;
        self.histogram.clear();
    }

    /// Rename without touching the palette.
    pub(crate) fn set_name(&mut self, name: String) {
        self.info.name = name;
    }

    /// Rebuild the escape-index histogram from `grid`.
    ///
    /// Must run every time the backing grid changes; a histogram from an
    /// older grid silently produces wrong colors. No-op for other kinds.
    pub fn prepare_for_grid(&mut self, grid: &ResultGrid) {
        self.histogram.clear();
        if !self.info.theme_kind.needs_prepass() {
            return;
        }

        let mut counts: HashMap<u32, u64> = HashMap::new();
        for idx in grid.results().iter().filter_map(|p| p.escape_index) {
            *counts.entry(idx).or_insert(0) += 1;
        }
        let max = counts.values().copied().max().unwrap_or(0);
        if max == 0 {
            return;
        }
        self.histogram = counts
            .into_iter()
            .map(|(idx, count)| (idx, count as f64 / max as f64))
            .collect();
    }

    /// Color for one point. `order` is the series order the grid was
    /// evaluated with; only continuous coloring reads it.
    pub fn color_for(&self, p: &PointResult, order: f64) -> Rgb {
        if self.info.theme_kind == ThemeKind::Unknown {
            return DEFAULT_COLOR;
        }
        let Some(idx) = p.escape_index else {
            return self.info.converged_color;
        };

        match self.info.theme_kind {
            ThemeKind::BiColor => self.info.diverged_color,
            ThemeKind::EscapeTime => self.palette.inverted(idx as i64),
            ThemeKind::Distance => {
                let n = self.palette.len() as f64 * p.distance_estimate / 4.0;
                let lo = n.floor();
                Rgb::lerp(
                    self.palette.cyclic(lo as i64),
                    self.palette.cyclic((lo + 1.0) as i64),
                    n - lo,
                )
            }
            ThemeKind::Continuous => {
                let n = idx as f64 + 1.0
                    - (p.escape_radius.ln() / std::f64::consts::LN_2).ln() / order.ln();
                let lo = n.floor();
                Rgb::lerp(
                    self.palette.inverted(lo as i64),
                    self.palette.inverted((lo + 1.0) as i64),
                    n - lo,
                )
            }
            ThemeKind::Histogram => {
                let freq = self.histogram.get(&idx).copied().unwrap_or(0.0);
                self.palette.cyclic((HISTOGRAM_SPAN * freq) as i64)
            }
            ThemeKind::Unknown => DEFAULT_COLOR,
        }
    }

    /// Color an entire grid into an RGB buffer.
    ///
    /// Rows are colored in parallel with the cancel flag polled before each
    /// row. Returns `None` on cancellation, after emitting a progress reset.
    /// Call [`prepare_for_grid`](Self::prepare_for_grid) with the same grid
    /// first.
    pub fn colorize(
        &self,
        grid: &ResultGrid,
        order: f64,
        cancel: &RenderCancel,
        progress: Option<&ProgressFn>,
    ) -> Option<RenderBuffer> {
        let mut buffer = RenderBuffer::new(grid.width(), grid.height());
        let reporter = ProgressReporter::new(grid.height() as usize, progress, cancel);
        let stride = buffer.stride();
        let width = grid.width() as usize;

        if width > 0 {
            buffer
                .pixels
                .par_chunks_mut(stride)
                .zip(grid.results().par_chunks(width))
                .for_each(|(row_pixels, row_results)| {
                    if cancel.is_cancelled() {
                        return;
                    }
                    for (pixel, result) in row_pixels
                        .chunks_exact_mut(RenderBuffer::BYTES_PER_PIXEL)
                        .zip(row_results)
                    {
                        pixel.copy_from_slice(&self.color_for(result, order).to_array());
                    }
                    reporter.advance();
                });
        }

        if cancel.is_cancelled() {
            reporter.reset();
            return None;
        }
        reporter.finish();
        Some(buffer)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeInfo::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
