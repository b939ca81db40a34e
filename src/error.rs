use thiserror::Error;

/// Errors raised while loading or analysing a fingerprint image.
#[derive(Error, Debug)]
pub enum Error {
    /// The image cannot be analysed: zero-sized, or a channel count other than 1 or 3.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The image file could not be opened or decoded.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A configuration file did not parse, or a report could not be written as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
