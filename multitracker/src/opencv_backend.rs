//! OpenCV backend: video decoding, interactive selection, windows and trackers
//! This module is only built with the `opencv` feature

use crate::display::FrameSink;
use crate::error::{PipelineError, Result};
use crate::selector::{sanitize_selection, RegionSelector};
use crate::video::FrameSource;
use image::{GrayImage, RgbImage};
use opencv::{
    core::{Mat, Ptr, Rect, Vector},
    highgui, imgproc,
    prelude::*,
    tracking, video,
    videoio::{VideoCapture, CAP_ANY},
};
use roitrack::{Roi, TrackError, Tracker, TrackerFactory, TrackerKind};
use std::path::Path;
use std::time::Duration;

/// Convert an RGB buffer to an owned BGR `Mat`
pub fn rgb_to_mat(img: &RgbImage) -> Result<Mat> {
    let flat = Mat::from_slice(img.as_raw())?;
    let rgb = flat.reshape(3, img.height() as i32)?.try_clone()?;
    let mut bgr = Mat::default();
    imgproc::cvt_color_def(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR)?;
    Ok(bgr)
}

/// Convert a single-channel buffer to an owned 8-bit `Mat`
pub fn gray_to_mat(img: &GrayImage) -> opencv::Result<Mat> {
    let flat = Mat::from_slice(img.as_raw())?;
    flat.reshape(1, img.height() as i32)?.try_clone()
}

/// Convert a BGR `Mat` as decoded by `VideoCapture` to an RGB buffer
pub fn mat_to_rgb(mat: &Mat) -> Result<RgbImage> {
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(mat, &mut rgb, imgproc::COLOR_BGR2RGB)?;

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let data = rgb.data_bytes()?.to_vec();
    RgbImage::from_vec(width, height, data)
        .ok_or_else(|| PipelineError::frame("Failed to create RgbImage from Mat"))
}

fn roi_to_rect(roi: Roi) -> Rect {
    let (x, y, w, h) = roi.to_pixels();
    Rect::new(x, y, w as i32, h as i32)
}

fn rect_to_roi(rect: Rect) -> Roi {
    Roi::new(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

/// Video file decoded with `VideoCapture`
pub struct CaptureSource {
    cap: VideoCapture,
    path: String,
    frames_read: u64,
}

impl CaptureSource {
    pub fn open(path: &Path) -> Result<Self> {
        let path_str = path.display().to_string();
        let cap = VideoCapture::from_file(&path_str, CAP_ANY)
            .map_err(|e| PipelineError::video_open(path_str.clone(), e.to_string()))?;

        if !cap
            .is_opened()
            .map_err(|e| PipelineError::video_open(path_str.clone(), e.to_string()))?
        {
            return Err(PipelineError::video_open(path_str, "video file is not opened"));
        }

        log::info!("Video file opened: {}", path_str);
        Ok(Self {
            cap,
            path: path_str,
            frames_read: 0,
        })
    }
}

impl FrameSource for CaptureSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let mut frame = Mat::default();
        if !self.cap.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }

        self.frames_read += 1;
        mat_to_rgb(&frame).map(Some)
    }

    fn describe(&self) -> String {
        format!("video file {} ({} frames read)", self.path, self.frames_read)
    }
}

/// Mouse-drawn multi-rectangle selection in a window
///
/// Each rectangle is confirmed with SPACE or ENTER; ESC ends the selection.
pub struct WindowSelector {
    window_name: String,
}

impl WindowSelector {
    pub fn new<S: Into<String>>(window_name: S) -> Self {
        Self {
            window_name: window_name.into(),
        }
    }
}

impl RegionSelector for WindowSelector {
    fn select(&mut self, first_frame: &RgbImage) -> Result<Vec<Roi>> {
        let mat = rgb_to_mat(first_frame)?;
        let mut boxes = Vector::<Rect>::new();

        log::info!("Draw boxes around the objects, SPACE/ENTER confirms, ESC finishes");
        // Crosshair on, boxes drawn from the top-left corner
        highgui::select_rois(&self.window_name, &mat, &mut boxes, true, false, true)
            .map_err(|e| PipelineError::selection(e.to_string()))?;

        let rois: Vec<Roi> = boxes.iter().map(rect_to_roi).collect();
        log::info!("{} region(s) selected", rois.len());
        Ok(sanitize_selection(
            &rois,
            first_frame.width(),
            first_frame.height(),
        ))
    }
}

/// Live display window
pub struct WindowSink {
    window_name: String,
}

impl WindowSink {
    pub fn new<S: Into<String>>(window_name: S) -> Self {
        Self {
            window_name: window_name.into(),
        }
    }
}

impl FrameSink for WindowSink {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        let mat = rgb_to_mat(frame)?;
        highgui::imshow(&self.window_name, &mat)
            .map_err(|e| PipelineError::display(e.to_string()))
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<i32>> {
        let key = highgui::wait_key(timeout.as_millis().max(1) as i32)?;
        Ok((key >= 0).then_some(key))
    }
}

/// Tracker backed by OpenCV's tracking module
pub struct OpenCvTracker {
    kind: TrackerKind,
    inner: Ptr<video::Tracker>,
}

impl Tracker for OpenCvTracker {
    fn kind(&self) -> TrackerKind {
        self.kind
    }

    /// Binds on the acquired frame converted back to BGR, as decoded
    fn init(&mut self, frame: &RgbImage, roi: Roi) -> roitrack::Result<()> {
        let mat = rgb_to_mat(frame).map_err(|e| TrackError::backend(e.to_string()))?;
        self.inner
            .init(&mat, roi_to_rect(roi))
            .map_err(|e| TrackError::backend(e.to_string()))
    }

    fn update(&mut self, frame: &GrayImage) -> roitrack::Result<Option<Roi>> {
        let mat = gray_to_mat(frame).map_err(|e| TrackError::backend(e.to_string()))?;
        let mut rect = Rect::default();
        let found = self
            .inner
            .update(&mat, &mut rect)
            .map_err(|e| TrackError::backend(e.to_string()))?;
        Ok(found.then(|| rect_to_roi(rect)))
    }
}

/// Factory mapping each algorithm name to its OpenCV constructor
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvFactory;

impl OpenCvFactory {
    fn create_inner(kind: TrackerKind) -> opencv::Result<Ptr<video::Tracker>> {
        Ok(match kind {
            TrackerKind::Boosting => {
                tracking::upgrade_tracking_api(&tracking::legacy_TrackerBoosting::create_def()?.into())?
            }
            TrackerKind::Mil => video::TrackerMIL::create_def()?.into(),
            TrackerKind::Kcf => tracking::TrackerKCF::create_def()?.into(),
            TrackerKind::Tld => {
                tracking::upgrade_tracking_api(&tracking::legacy_TrackerTLD::create()?.into())?
            }
            TrackerKind::MedianFlow => tracking::upgrade_tracking_api(
                &tracking::legacy_TrackerMedianFlow::create_def()?.into(),
            )?,
            TrackerKind::Goturn => video::TrackerGOTURN::create_def()?.into(),
            TrackerKind::Mosse => {
                tracking::upgrade_tracking_api(&tracking::legacy_TrackerMOSSE::create()?.into())?
            }
            TrackerKind::Csrt => tracking::TrackerCSRT::create_def()?.into(),
        })
    }
}

impl TrackerFactory for OpenCvFactory {
    fn name(&self) -> &str {
        "opencv"
    }

    fn create(&self, kind: TrackerKind) -> roitrack::Result<Box<dyn Tracker>> {
        let inner = Self::create_inner(kind)
            .map_err(|e| TrackError::backend(format!("Failed to create {} tracker: {}", kind, e)))?;
        Ok(Box::new(OpenCvTracker { kind, inner }))
    }
}
