pub mod buffer;
pub mod cancel;
pub mod color;
pub mod error;
pub mod grid;
pub mod palette;
pub mod registry;
pub mod renderer;
pub mod theme;

pub use buffer::RenderBuffer;
pub use cancel::{ProgressFn, RenderCancel};
pub use color::Rgb;
pub use error::RenderError;
pub use grid::{GridKey, GridUpdate, ResultGrid};
pub use palette::{suggest_seed, Palette, PaletteKind};
pub use registry::{AddOutcome, ThemeRegistry};
pub use renderer::{RenderOutcome, SetRenderer};
pub use theme::{Theme, ThemeInfo, ThemeKind};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
