use std::{io, time::Duration};

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeedTestError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response {0}")]
    BadStatus(StatusCode),

    #[error("Read error: {0}")]
    Read(#[source] io::Error),

    #[error("No data received for {0:?}")]
    ReadTimeout(Duration),

    #[error("Output error: {0}")]
    Output(#[source] io::Error),
}

impl SpeedTestError {
    /// Errors raised while the body was being sampled, as opposed to before it started.
    pub fn is_mid_transfer(&self) -> bool {
        matches!(self, Self::Read(_) | Self::ReadTimeout(_))
    }
}

pub type Result<T> = std::result::Result<T, SpeedTestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reads_like_reference_tool() {
        let err = SpeedTestError::BadStatus(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Invalid response 404 Not Found");
    }

    #[test]
    fn read_failures_are_mid_transfer() {
        let err = SpeedTestError::Read(io::Error::other("reset"));
        assert!(err.is_mid_transfer());
        assert!(SpeedTestError::ReadTimeout(Duration::from_secs(1)).is_mid_transfer());
        assert!(!SpeedTestError::InvalidUrl("x".into()).is_mid_transfer());
    }
}
