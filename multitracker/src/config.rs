//! Pipeline configuration
//!
//! Everything the tracking session needs is passed in explicitly through
//! [`PipelineConfig`]; there is no process-wide state. Values can be loaded
//! from a JSON file and then overridden from the command line.

use crate::error::{PipelineError, Result};
use crate::palette::DEFAULT_COLOR_SEED;
use roitrack::{Roi, TrackerKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default video opened when no path is configured
pub const DEFAULT_VIDEO_PATH: &str = "person2_640_480.mp4";

/// Default window title for selection and display
pub const DEFAULT_WINDOW_NAME: &str = "TOPOS:MultiTracker";

/// Key code that cancels tracking (Escape)
pub const ESCAPE_KEY: i32 = 27;

/// Configuration of one tracking session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Video file, or a directory of frame images
    pub video_path: PathBuf,
    /// Algorithm backing every track
    pub tracker: TrackerKind,
    /// Title of the selection and display windows
    pub window_name: String,
    /// Seed of the track color generator
    pub color_seed: u64,
    /// Rectangle stroke width in pixels
    pub stroke_width: u32,
    /// Key poll timeout per frame in milliseconds
    pub key_poll_ms: i32,
    /// Key code that stops tracking
    pub exit_key: i32,
    /// Pre-selected regions, used instead of interactive selection when non-empty
    pub rois: Vec<Roi>,
    /// Write annotated frames here when running headless
    pub output_dir: Option<PathBuf>,
    /// Never open windows, even when the OpenCV backend is available
    pub headless: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            video_path: PathBuf::from(DEFAULT_VIDEO_PATH),
            tracker: TrackerKind::Csrt,
            window_name: DEFAULT_WINDOW_NAME.to_string(),
            color_seed: DEFAULT_COLOR_SEED,
            stroke_width: 2,
            key_poll_ms: 1,
            exit_key: ESCAPE_KEY,
            rois: Vec::new(),
            output_dir: None,
            headless: false,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check values that would otherwise fail later in the loop
    pub fn validate(&self) -> Result<()> {
        if self.stroke_width == 0 {
            return Err(PipelineError::config("stroke_width must be at least 1"));
        }
        if self.key_poll_ms < 1 {
            return Err(PipelineError::config(
                "key_poll_ms must be at least 1 (0 waits forever)",
            ));
        }
        if let Some(roi) = self.rois.iter().find(|roi| roi.width < 0.0 || roi.height < 0.0) {
            return Err(PipelineError::config(format!(
                "region {} has a negative size",
                roi
            )));
        }
        Ok(())
    }
}
