use thiserror::Error;

/// Errors raised by the detection engine.
///
/// Boundary handling in the filters is never an error; blobs that cannot be
/// evaluated are dropped by the stage that sees them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid threshold mode '{0}', expected 'percentile' or 'absolute'")]
    InvalidThresholdMode(String),

    #[error("Degenerate image: global maximum is {max}, cannot normalize the detection threshold")]
    DegenerateImage { max: f32 },

    #[error("Invalid image shape {shape:?}: {reason}")]
    InvalidImageShape { shape: Vec<usize>, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] common::SerdeFormatError),
}

pub type Result<T> = std::result::Result<T, Error>;
