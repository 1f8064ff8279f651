//! Display sinks for rendered frames

use crate::error::Result;
use image::RgbImage;
use std::path::PathBuf;
use std::time::Duration;

/// Receives rendered frames and reports key presses
pub trait FrameSink {
    /// Show one rendered frame
    fn show(&mut self, frame: &RgbImage) -> Result<()>;

    /// Wait up to `timeout` for a key press
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<i32>>;
}

/// Sink without a window
///
/// Counts frames and optionally writes each one as a PNG into `output_dir`.
/// Key presses can be scripted to simulate a user cancelling after a number
/// of frames.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    output_dir: Option<PathBuf>,
    frames_shown: u64,
    /// (frame count, key) pairs, in increasing frame order
    scripted_keys: Vec<(u64, i32)>,
    last_frame: Option<RgbImage>,
}

impl HeadlessSink {
    pub fn new(output_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &output_dir {
            std::fs::create_dir_all(dir)?;
            log::info!("Writing annotated frames to {}", dir.display());
        }

        Ok(Self {
            output_dir,
            ..Default::default()
        })
    }

    /// Report `key` on the poll that follows the `after_frames`-th shown frame
    pub fn with_key_after(mut self, after_frames: u64, key: i32) -> Self {
        self.scripted_keys.push((after_frames, key));
        self.scripted_keys.sort_by_key(|(frame, _)| *frame);
        self
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    /// Most recently shown frame
    pub fn last_frame(&self) -> Option<&RgbImage> {
        self.last_frame.as_ref()
    }
}

impl FrameSink for HeadlessSink {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        self.frames_shown += 1;

        if let Some(dir) = &self.output_dir {
            let path = dir.join(format!("frame_{:05}.png", self.frames_shown));
            frame.save(&path)?;
            log::debug!("Saved {}", path.display());
        }

        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<i32>> {
        match self.scripted_keys.first() {
            Some(&(after, key)) if after <= self.frames_shown => {
                self.scripted_keys.remove(0);
                Ok(Some(key))
            }
            _ => Ok(None),
        }
    }
}
