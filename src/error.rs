//! Crate-wide error handling
//!
//! Level loading, configuration and worker plumbing report through `GameError`.
//! Drag violations are ordinary state transitions and never show up here.

use std::path::PathBuf;

/// Result alias used across the crate
pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Degenerate level geometry: x extent [{min_x}, {max_x}] has no width")]
    DegenerateLevel { min_x: f32, max_x: f32 },

    #[error("Engine rejected the source body at ({x}, {y})")]
    SourceRejected { x: f32, y: f32 },

    #[error("Level parse failed: {0}")]
    LevelParse(#[from] serde_json::Error),

    #[error("Config parse failed: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid color literal: {0:?}")]
    InvalidColor(String),

    #[error("Physics worker is not running")]
    WorkerStopped,
}

/// Wrap an I/O error with the path it happened on
pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> GameError {
    GameError::Io {
        path: path.into(),
        source,
    }
}
