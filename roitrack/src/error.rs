//! Error types for tracker construction and updates

use thiserror::Error;

/// Result type alias for the tracking library
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors that can occur while creating, binding or updating trackers
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Incorrect tracker name '{name}'. Available trackers are: {}", available.join(", "))]
    UnknownTrackerName {
        name: String,
        available: Vec<&'static str>,
    },

    #[error("Region {0} is empty or lies outside the frame")]
    EmptyRegion(String),

    #[error("Frame size mismatch: expected {expected:?}, got {actual:?}")]
    FrameMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Invalid tracker state: {0}")]
    InvalidState(String),

    #[error("Tracking backend error: {0}")]
    Backend(String),
}

impl TrackError {
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }
}
