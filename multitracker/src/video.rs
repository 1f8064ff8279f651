//! Video sources yielding frames one at a time
//!
//! A source is read sequentially and never seeks. `Ok(None)` marks the end
//! of the stream; errors are reserved for frames that exist but cannot be
//! decoded.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// File extensions accepted as frames of an image-sequence video
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Sequential frame producer
pub trait FrameSource {
    /// Next frame, or `None` once the stream is exhausted
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Human readable description (for logging)
    fn describe(&self) -> String;
}

/// Video stored as a directory of numbered frame images
///
/// Frames are played in file-name order, so zero-padded names
/// (`frame_0001.png`, `frame_0002.png`, ...) keep their natural order.
pub struct ImageSequenceSource {
    root: PathBuf,
    frames: VecDeque<PathBuf>,
    frames_read: u64,
}

impl ImageSequenceSource {
    /// Open a frame directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let display = root.display().to_string();

        if !root.is_dir() {
            return Err(PipelineError::video_open(
                display,
                "not a directory of frame images",
            ));
        }

        let mut frames: Vec<PathBuf> = std::fs::read_dir(&root)
            .map_err(|e| PipelineError::video_open(display.clone(), e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_frame_file(path))
            .collect();

        if frames.is_empty() {
            return Err(PipelineError::video_open(display, "no frame images found"));
        }
        frames.sort();

        log::info!("Video opened: {} ({} frames)", display, frames.len());
        Ok(Self {
            root,
            frames: frames.into(),
            frames_read: 0,
        })
    }

    /// Frames not yet read
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.frames.pop_front() else {
            return Ok(None);
        };

        let frame = image::open(&path)
            .map_err(|e| PipelineError::frame(format!("Failed to decode {}: {}", path.display(), e)))?
            .to_rgb8();
        self.frames_read += 1;
        Ok(Some(frame))
    }

    fn describe(&self) -> String {
        format!(
            "image sequence {} ({} read, {} left)",
            self.root.display(),
            self.frames_read,
            self.frames.len()
        )
    }
}

/// In-memory frames, used for synthetic videos
#[derive(Default)]
pub struct MemorySource {
    frames: VecDeque<RgbImage>,
}

impl MemorySource {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frames.pop_front())
    }

    fn describe(&self) -> String {
        format!("in-memory video ({} frames left)", self.frames.len())
    }
}

/// Open the configured video
///
/// Directories are read as image sequences. Any other path needs the
/// OpenCV decoder, available with the `opencv` feature.
pub fn open_source(config: &PipelineConfig) -> Result<Box<dyn FrameSource>> {
    let path = &config.video_path;
    log::info!("Opening video source: {}", path.display());

    if path.is_dir() {
        return Ok(Box::new(ImageSequenceSource::open(path)?));
    }

    #[cfg(feature = "opencv")]
    {
        Ok(Box::new(crate::opencv_backend::CaptureSource::open(path)?))
    }

    #[cfg(not(feature = "opencv"))]
    {
        Err(PipelineError::video_open(
            path.display().to_string(),
            "decoding video files requires the `opencv` feature; pass a directory of frames instead",
        ))
    }
}
