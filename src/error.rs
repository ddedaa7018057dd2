//! Error type shared by the scene, audio and rendering layers.

use std::fmt;

use crate::driver::DriverState;

/// Top-level error type for the magical-wave public API.
#[derive(Debug)]
pub enum SceneError {
    /// Bad rosette or parameter values (petal count, radius, FFT size...).
    InvalidConfiguration(String),
    /// The audio payload could not be decoded.
    Decode(String),
    /// Reading the selected file failed.
    Io(std::io::Error),
    /// The output device could not be opened or started.
    Playback(String),
    /// A lifecycle operation was requested in a state that does not allow it.
    InvalidState {
        operation: &'static str,
        state: DriverState,
    },
    /// GPU presenter setup failure.
    Graphics(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::InvalidConfiguration(msg) => write!(f, "invalid configuration: {}", msg),
            SceneError::Decode(msg) => write!(f, "decode error: {}", msg),
            SceneError::Io(e) => write!(f, "I/O error: {}", e),
            SceneError::Playback(msg) => write!(f, "playback error: {}", msg),
            SceneError::InvalidState { operation, state } => {
                write!(f, "cannot {} while {:?}", operation, state)
            }
            SceneError::Graphics(msg) => write!(f, "graphics error: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<symphonia::core::errors::Error> for SceneError {
    fn from(e: symphonia::core::errors::Error) -> Self {
        SceneError::Decode(e.to_string())
    }
}

/// Convenience alias so callers can write `Result<T>` instead of `Result<T, SceneError>`.
pub type Result<T> = std::result::Result<T, SceneError>;
