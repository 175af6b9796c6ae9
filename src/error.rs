//! Error types for repository operations

use thiserror::Error;

/// Errors surfaced by the content repository and its collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// No post matches the requested title
    #[error("post not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The notification endpoint answered with a non-2xx status
    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid image path: {0}")]
    InvalidImagePath(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<walkdir::Error> for Error {
    fn from(value: walkdir::Error) -> Self {
        Self::Io(value.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
