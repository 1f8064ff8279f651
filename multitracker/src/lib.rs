//! Interactive multi-object ROI tracking over video frames
//!
//! The user draws rectangles on the first frame; every following frame is
//! blurred, converted to grayscale and Sobel-filtered, each region is tracked
//! independently with the configured algorithm, and the edge frame is shown
//! with one colored box per region until the video ends or ESC is pressed.
//!
//! Without the `opencv` feature the pipeline runs on directories of frame
//! images with fixed selections and template-matching trackers, which is
//! also how the tests drive it. Trackers are always bound on the first frame
//! as acquired; the template backend cuts its templates from that frame's
//! edge image.
//!
//! ```rust,ignore
//! use multitracker::{
//!     edge_template_factory, open_source, FixedSelector, HeadlessSink, PipelineConfig,
//!     TrackingSession,
//! };
//!
//! let config = PipelineConfig::load("tracking.json")?;
//! let mut source = open_source(&config)?;
//! let mut selector = FixedSelector::new(config.rois.clone());
//! let mut sink = HeadlessSink::new(config.output_dir.clone())?;
//! let outcome = TrackingSession::new(&config, &edge_template_factory())
//!     .run(source.as_mut(), &mut selector, &mut sink)?;
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod image_utils;
pub mod palette;
pub mod pipeline;
pub mod preprocessing;
pub mod selector;
pub mod video;

#[cfg(feature = "opencv")]
pub mod opencv_backend;

pub use config::{PipelineConfig, DEFAULT_VIDEO_PATH, DEFAULT_WINDOW_NAME, ESCAPE_KEY};
pub use display::{FrameSink, HeadlessSink};
pub use error::{PipelineError, Result};
pub use palette::random_colors;
pub use pipeline::{RunOutcome, RunStats, TrackingSession};
pub use preprocessing::{edge_template_factory, EdgePreprocessor};
pub use selector::{FixedSelector, RegionSelector};
pub use video::{open_source, FrameSource, ImageSequenceSource, MemorySource};

/// Names accepted for the tracking algorithm, in display order
pub fn available_trackers() -> Vec<&'static str> {
    roitrack::TrackerKind::names()
}
