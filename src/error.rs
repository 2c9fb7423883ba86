//! Error types for DrishtiTrack

use thiserror::Error;

/// DrishtiTrack error type
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Field layout error: {0}")]
    Layout(String),
}

pub type Result<T> = std::result::Result<T, TrackError>;
