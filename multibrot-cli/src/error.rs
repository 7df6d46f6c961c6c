use std::path::PathBuf;

use thiserror::Error;

use multibrot_core::CoreError;
use multibrot_render::RenderError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid theme file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error("unknown theme {0:?} (use --list-themes)")]
    UnknownTheme(String),

    #[error("cannot start render thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("render worker panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
