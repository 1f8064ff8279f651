//! Error types for the tracking pipeline

use roitrack::TrackError;
use thiserror::Error;

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while opening, tracking and displaying a video
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Error opening video file {path}: {reason}")]
    VideoOpen { path: String, reason: String },

    #[error("Frame acquisition failed: {0}")]
    Frame(String),

    #[error("Region selection failed: {0}")]
    Selection(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}

impl PipelineError {
    pub fn video_open<P: Into<String>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::VideoOpen {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn frame<S: Into<String>>(msg: S) -> Self {
        Self::Frame(msg.into())
    }

    pub fn selection<S: Into<String>>(msg: S) -> Self {
        Self::Selection(msg.into())
    }

    pub fn display<S: Into<String>>(msg: S) -> Self {
        Self::Display(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Process exit code for this error
    ///
    /// Video failures map to 255, the unsigned form of the classic `-1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::VideoOpen { .. } => 255,
            _ => 1,
        }
    }
}
