use thiserror::Error;

/// Classifier configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisasError {
    #[error("target {0} is unsupported")]
    UnsupportedTarget(String),
    #[error("invalid hex value {0:?}")]
    InvalidHex(String),
}

pub type Result<T> = std::result::Result<T, DisasError>;
