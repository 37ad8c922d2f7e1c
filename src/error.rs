//! Error types for coursedown operations.
//!
//! Only configuration problems and unrecoverable navigation states are errors.
//! Missing sub-elements inside a block and failed asset downloads degrade to
//! fallback output instead and never surface here.

use thiserror::Error;

/// Errors that can stop an export run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unsupported output format {0:?} (expected one of: md, txt, pdf)")]
    UnsupportedFormat(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("cannot open lesson {lesson:?} in section {section:?}: {reason}")]
    Navigation {
        section: String,
        lesson: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
