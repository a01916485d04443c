//! Error types for the decision engine.
//!
//! Routing itself never fails: unreachable targets and degenerate geometry
//! surface as empty paths or idle steps. Errors here cover construction of
//! the inputs the engine works on.

use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for the decision engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// Failed to parse a RON configuration.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Configuration value outside its valid range.
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// Map dimensions are negative or not finite.
    #[error("Invalid map size {width} x {height}")]
    InvalidMapSize {
        /// Reported map width.
        width: f64,
        /// Reported map height.
        height: f64,
    },

    /// Obstacle with a negative or non-finite extent.
    #[error("Invalid obstacle at ({x}, {y}) with size {width} x {height}")]
    InvalidObstacle {
        /// Corner x.
        x: f64,
        /// Corner y.
        y: f64,
        /// Obstacle width.
        width: f64,
        /// Obstacle height.
        height: f64,
    },
}
