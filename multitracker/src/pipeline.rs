//! Tracking session: selection, tracker setup and the render/display loop
//!
//! Trackers are bound on the first frame exactly as it was acquired. The
//! loop is single-threaded and blocking. Each following frame is acquired,
//! preprocessed, tracked, drawn, shown and followed by one key poll before
//! the next frame is read; the key poll is the only cancellation point.

use crate::config::PipelineConfig;
use crate::display::FrameSink;
use crate::error::{PipelineError, Result};
use crate::image_utils::render_tracks;
use crate::palette::random_colors;
use crate::preprocessing::EdgePreprocessor;
use crate::selector::RegionSelector;
use crate::video::FrameSource;
use roitrack::{MultiTracker, Roi, TrackerFactory};
use std::time::{Duration, Instant};

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The user selected nothing; no tracking was done
    NoRegions,
    /// The video ran out of frames
    Completed(RunStats),
    /// The user pressed the exit key
    Cancelled(RunStats),
}

impl RunOutcome {
    /// Every outcome is a clean exit
    pub fn exit_code(&self) -> u8 {
        0
    }

    pub fn stats(&self) -> Option<&RunStats> {
        match self {
            Self::NoRegions => None,
            Self::Completed(stats) | Self::Cancelled(stats) => Some(stats),
        }
    }
}

/// Tracking loop statistics
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub tracks: usize,
    /// Frames tracked after the first one
    pub frames: u64,
    pub total_processing_time: Duration,
    pub average_fps: f64,
}

impl RunStats {
    fn new(tracks: usize) -> Self {
        Self {
            tracks,
            frames: 0,
            total_processing_time: Duration::ZERO,
            average_fps: 0.0,
        }
    }

    fn calculate_averages(&mut self) {
        let secs = self.total_processing_time.as_secs_f64();
        if self.frames > 0 && secs > 0.0 {
            self.average_fps = self.frames as f64 / secs;
        }
    }
}

/// Components one session is assembled from
pub struct TrackingSession<'a> {
    config: &'a PipelineConfig,
    factory: &'a dyn TrackerFactory,
    preprocessor: EdgePreprocessor,
}

impl<'a> TrackingSession<'a> {
    pub fn new(config: &'a PipelineConfig, factory: &'a dyn TrackerFactory) -> Self {
        Self {
            config,
            factory,
            preprocessor: EdgePreprocessor::new(),
        }
    }

    /// Run the session until the video ends or the user cancels
    pub fn run(
        &self,
        source: &mut dyn FrameSource,
        selector: &mut dyn RegionSelector,
        sink: &mut dyn FrameSink,
    ) -> Result<RunOutcome> {
        self.run_with_callback(source, selector, sink, |_, _| {})
    }

    /// Same as [`TrackingSession::run`], calling `on_frame` with the frame
    /// index and the current regions after every update
    pub fn run_with_callback<F>(
        &self,
        source: &mut dyn FrameSource,
        selector: &mut dyn RegionSelector,
        sink: &mut dyn FrameSink,
        mut on_frame: F,
    ) -> Result<RunOutcome>
    where
        F: FnMut(u64, &[Roi]),
    {
        self.config.validate()?;

        let first = source.next_frame()?.ok_or_else(|| {
            PipelineError::video_open(
                self.config.video_path.display().to_string(),
                "video has no frames",
            )
        })?;
        log::info!(
            "First frame {}x{} from {}",
            first.width(),
            first.height(),
            source.describe()
        );

        let rois = selector.select(&first)?;
        if rois.is_empty() {
            log::info!("No regions selected, nothing to track");
            return Ok(RunOutcome::NoRegions);
        }

        let colors = random_colors(rois.len(), self.config.color_seed);
        // Bind on the frame as acquired; only later frames go through the chain
        let mut tracker = MultiTracker::init_all(self.factory, self.config.tracker, &first, &rois)?;

        log::info!(
            "Started tracking {} region(s), press ESC to quit",
            tracker.len()
        );

        let poll_timeout = Duration::from_millis(self.config.key_poll_ms as u64);
        let mut stats = RunStats::new(tracker.len());

        let cancelled = loop {
            let frame_start = Instant::now();

            let Some(frame) = source.next_frame()? else {
                log::info!("End of video reached");
                break false;
            };

            let edges = self.preprocessor.apply(&frame);
            let regions = tracker.update(&edges)?;
            on_frame(stats.frames, regions);

            let rendered = render_tracks(&edges, regions, &colors, self.config.stroke_width);
            sink.show(&rendered)?;
            stats.frames += 1;
            stats.total_processing_time += frame_start.elapsed();

            if sink.poll_key(poll_timeout)? == Some(self.config.exit_key) {
                log::info!("Exit key pressed after {} frame(s)", stats.frames);
                break true;
            }
        };

        tracker.terminate();
        stats.calculate_averages();
        log::info!(
            "Tracked {} region(s) over {} frame(s) at {:.1} FPS",
            stats.tracks,
            stats.frames,
            stats.average_fps
        );

        Ok(if cancelled {
            RunOutcome::Cancelled(stats)
        } else {
            RunOutcome::Completed(stats)
        })
    }
}
