// =============================================================================
// error.rs - Types d'erreur / Error types
// =============================================================================

use thiserror::Error;

/// Résultat de capture / Capture result
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Erreur de capture : la session ne dépasse jamais l'état Inactive
/// Capture error: the session never gets past Inactive
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("surface has no pixels ({width}x{height})")]
    EmptySurface { width: usize, height: usize },

    #[error("surface of {width}x{height} pixels exceeds the {limit} pixel limit")]
    TooLarge { width: usize, height: usize, limit: usize },

    #[error("invalid scale factor: {0}")]
    InvalidScale(f64),

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("row stride {bytes_per_row} is shorter than one row of pixels ({minimum} bytes)")]
    RowStride { bytes_per_row: usize, minimum: usize },

    #[error("source failed to render: {0}")]
    Render(String),

    #[error("screen capture unavailable: {0}")]
    Unavailable(String),
}

impl CaptureError {
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }
}

/// Erreur de chargement de configuration
/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
