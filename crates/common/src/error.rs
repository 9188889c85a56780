//! Unified error type for the pricing workspace.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid price {0}: must be finite and > 0")]
    InvalidPrice(f64),

    #[error("Invalid context: {0}")]
    InvalidContext(String),

    #[error("Unknown {column} category: {value}")]
    UnknownCategory { column: String, value: String },

    #[error("Prediction failed: {0}")]
    Prediction(String),
}
