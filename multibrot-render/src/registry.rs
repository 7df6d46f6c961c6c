use tracing::{debug, warn};

use multibrot_core::PointResult;

use crate::color::Rgb;
use crate::grid::ResultGrid;
use crate::theme::{Theme, ThemeInfo};

/// Result of [`ThemeRegistry::add_or_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    Updated,
}

/// Named collection of themes with one current selection.
///
/// Themes keep insertion order for display and names are unique. The
/// registry is never empty: it starts with two built-in themes and no
/// operation removes the last one, so [`current`](Self::current) always
/// resolves.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: Vec<Theme>,
    current: usize,
}

impl ThemeRegistry {
    pub const BLACK_AND_WHITE: &'static str = "Black & White";
    pub const WHITE_AND_BLACK: &'static str = "White & Black";

    /// Registry with the two built-in bi-color themes, the first selected.
    pub fn new() -> Self {
        let mut registry = Self {
            themes: Vec::new(),
            current: 0,
        };
        registry.add_or_update(ThemeInfo::bi_color(
            Self::BLACK_AND_WHITE,
            Rgb::BLACK,
            Rgb::WHITE,
        ));
        registry.add_or_update(ThemeInfo::bi_color(
            Self::WHITE_AND_BLACK,
            Rgb::WHITE,
            Rgb::BLACK,
        ));
        registry.select(Self::BLACK_AND_WHITE);
        registry
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.themes.iter().position(|t| t.name() == name)
    }

    /// Insert a theme, or replace the settings of the theme with the same
    /// name (regenerating its palette). Selection is unchanged.
    pub fn add_or_update(&mut self, info: ThemeInfo) -> AddOutcome {
        match self.position(&info.name) {
            Some(i) => {
                debug!(name = %info.name, "Updating theme");
                self.themes[i].set_info(info);
                AddOutcome::Updated
            }
            None => {
                debug!(name = %info.name, "Adding theme");
                self.themes.push(Theme::new(info));
                AddOutcome::Inserted
            }
        }
    }

    /// Select a theme by name. Unknown names leave the selection alone.
    ///
    /// Returns whether the name was found.
    pub fn select(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.current = i;
                true
            }
            None => false,
        }
    }

    /// Rename the current theme in place, keeping its position and content.
    ///
    /// A different theme already called `new_name` is overwritten, i.e.
    /// removed, so names stay unique.
    pub fn rename_current(&mut self, new_name: impl Into<String>) {
        let new_name = new_name.into();
        if self.themes[self.current].name() == new_name {
            return;
        }
        if let Some(clash) = self.position(&new_name) {
            warn!(name = %new_name, "Rename overwrites an existing theme");
            self.themes.remove(clash);
            if clash < self.current {
                self.current -= 1;
            }
        }
        self.themes[self.current].set_name(new_name);
    }

    /// Replace everything (themes, order, selection) with a copy of `other`.
    pub fn copy_from(&mut self, other: &ThemeRegistry) {
        self.clone_from(other);
    }

    pub fn current(&self) -> &Theme {
        &self.themes[self.current]
    }

    pub(crate) fn current_mut(&mut self) -> &mut Theme {
        &mut self.themes[self.current]
    }

    pub fn current_name(&self) -> &str {
        self.current().name()
    }

    pub fn current_info(&self) -> &ThemeInfo {
        self.current().info()
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.position(name).map(|i| &self.themes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Theme names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|t| t.name())
    }

    /// Theme settings in display order, e.g. for persisting a theme set.
    pub fn infos(&self) -> impl Iterator<Item = &ThemeInfo> {
        self.themes.iter().map(|t| t.info())
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Rebuild the current theme's derived state for `grid`.
    pub fn prepare_current(&mut self, grid: &ResultGrid) {
        self.current_mut().prepare_for_grid(grid);
    }

    /// Color one point with the current theme.
    pub fn color_for(&self, p: &PointResult, order: f64) -> Rgb {
        self.current().color_for(p, order)
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
