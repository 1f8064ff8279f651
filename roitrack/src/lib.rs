//! Region-of-interest tracking library
//!
//! This crate provides single-object trackers selectable by algorithm name and
//! a [`MultiTracker`] aggregate that drives N of them against one frame stream.
//!
//! # Unified Interface
//!
//! Every backend implements [`TrackerFactory`], and every tracker it creates
//! implements [`Tracker`]:
//!
//! ```rust,ignore
//! use roitrack::{MultiTracker, Roi, TemplateFactory, TrackerKind};
//!
//! let rois = [Roi::new(10.0, 10.0, 40.0, 40.0)];
//! // Bind on the acquired color frame, update with single-channel frames
//! let mut tracker = MultiTracker::init_all(&TemplateFactory::default(), TrackerKind::Csrt, &first_rgb, &rois)?;
//! let regions = tracker.update(&next_gray)?;
//! ```

pub mod error;
pub mod kind;
pub mod multi;
pub mod roi;
pub mod template;
pub mod tracker;

pub use error::{Result, TrackError};
pub use kind::TrackerKind;
pub use multi::{MultiTracker, MultiTrackerState, TrackStatus};
pub use roi::Roi;
pub use template::{luma, FrameReducer, MatchMethod, TemplateFactory, TemplateParams, TemplateTracker};
pub use tracker::{create_tracker_by_name, Tracker, TrackerFactory};
