//! Built-in template-matching trackers
//!
//! Every [`TrackerKind`] is served by the same search loop: the template
//! captured at bind time is matched inside a window around the last known
//! position using `imageproc`'s template matching, and the best match becomes
//! the new region. The algorithms differ in their [`TemplateParams`]: the
//! matching score, how far around the previous position they search, and how
//! quickly the appearance model follows the target.
//!
//! Trackers are bound on the acquired color frame. A [`FrameReducer`] turns
//! that frame into the single-channel image the template is cut from; it
//! should produce the same kind of image the tracker is later updated with.

use crate::error::{Result, TrackError};
use crate::kind::TrackerKind;
use crate::roi::Roi;
use crate::tracker::{visible_region, Tracker, TrackerFactory};
use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::template_matching::{match_template, MatchTemplateMethod};

/// Maps the acquired bind frame to the image the template is taken from
pub type FrameReducer = fn(&RgbImage) -> GrayImage;

/// Plain luma reduction, the default [`FrameReducer`]
pub fn luma(frame: &RgbImage) -> GrayImage {
    image::imageops::grayscale(frame)
}

/// Matching score used to compare the template with candidate positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// Normalized cross-correlation, higher is better
    CrossCorrelation,
    /// Normalized sum of squared differences, lower is better
    SquaredDifference,
}

impl MatchMethod {
    fn to_imageproc(self) -> MatchTemplateMethod {
        match self {
            Self::CrossCorrelation => MatchTemplateMethod::CrossCorrelationNormalized,
            Self::SquaredDifference => MatchTemplateMethod::SumOfSquaredErrorsNormalized,
        }
    }

    /// Map a raw match value to a similarity where higher is better
    fn similarity(self, value: f32) -> f32 {
        match self {
            Self::CrossCorrelation => value,
            Self::SquaredDifference => 1.0 - value,
        }
    }
}

/// Search and model-update settings of one algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateParams {
    pub method: MatchMethod,
    /// Search margin on each side, as a fraction of the larger region side
    pub padding: f32,
    /// Weight of the newest patch when refreshing the template (0 keeps the first one)
    pub learning_rate: f32,
    /// Matches below this similarity count as a lost target
    pub min_score: f32,
}

impl TemplateParams {
    /// Settings used for `kind`
    pub fn for_kind(kind: TrackerKind) -> Self {
        use MatchMethod::*;
        let (method, padding, learning_rate, min_score) = match kind {
            TrackerKind::Boosting => (CrossCorrelation, 1.0, 0.05, 0.3),
            TrackerKind::Mil => (CrossCorrelation, 1.0, 0.05, 0.3),
            TrackerKind::Kcf => (CrossCorrelation, 0.75, 0.075, 0.2),
            TrackerKind::Tld => (SquaredDifference, 2.0, 0.0, 0.0),
            TrackerKind::MedianFlow => (SquaredDifference, 0.5, 1.0, 0.0),
            TrackerKind::Goturn => (CrossCorrelation, 0.5, 1.0, 0.2),
            TrackerKind::Mosse => (CrossCorrelation, 0.5, 0.125, 0.2),
            TrackerKind::Csrt => (CrossCorrelation, 1.0, 0.02, 0.2),
        };

        Self {
            method,
            padding,
            learning_rate,
            min_score,
        }
    }
}

/// Template-matching tracker for a single region
pub struct TemplateTracker {
    kind: TrackerKind,
    params: TemplateParams,
    reducer: FrameReducer,
    /// Appearance model as floating point, blended over time
    model: Vec<f32>,
    template: GrayImage,
    frame_size: (u32, u32),
    /// Top-left corner of the last estimate
    position: (u32, u32),
    last_score: f32,
}

impl TemplateTracker {
    pub fn new(kind: TrackerKind) -> Self {
        Self::with_params(kind, TemplateParams::for_kind(kind))
    }

    pub fn with_params(kind: TrackerKind, params: TemplateParams) -> Self {
        Self {
            kind,
            params,
            reducer: luma,
            model: Vec::new(),
            template: GrayImage::new(0, 0),
            frame_size: (0, 0),
            position: (0, 0),
            last_score: 0.0,
        }
    }

    /// Use `reducer` to turn the bind frame into the template source
    pub fn with_reducer(mut self, reducer: FrameReducer) -> Self {
        self.reducer = reducer;
        self
    }

    /// Similarity of the last accepted or rejected match
    pub fn last_score(&self) -> f32 {
        self.last_score
    }

    fn is_bound(&self) -> bool {
        !self.model.is_empty()
    }

    fn current_roi(&self) -> Roi {
        Roi::new(
            self.position.0 as f32,
            self.position.1 as f32,
            self.template.width() as f32,
            self.template.height() as f32,
        )
    }

    /// Integer search window around the current position, clamped to the frame
    fn search_window(&self) -> (u32, u32, u32, u32) {
        let (tw, th) = self.template.dimensions();
        let margin = (self.params.padding * tw.max(th) as f32).ceil() as u32;
        let (fw, fh) = self.frame_size;

        let x0 = self.position.0.saturating_sub(margin);
        let y0 = self.position.1.saturating_sub(margin);
        let x1 = (self.position.0 + tw + margin).min(fw);
        let y1 = (self.position.1 + th + margin).min(fh);

        (x0, y0, x1 - x0, y1 - y0)
    }

    /// Blend the matched patch into the appearance model
    fn refresh_model(&mut self, frame: &GrayImage) {
        let rate = self.params.learning_rate;
        if rate <= 0.0 {
            return;
        }

        let (tw, th) = self.template.dimensions();
        let (px, py) = self.position;
        for y in 0..th {
            for x in 0..tw {
                let idx = (y * tw + x) as usize;
                let sample = frame.get_pixel(px + x, py + y)[0] as f32;
                self.model[idx] = (1.0 - rate) * self.model[idx] + rate * sample;
            }
        }

        self.template = model_to_image(&self.model, tw, th);
    }
}

impl Tracker for TemplateTracker {
    fn kind(&self) -> TrackerKind {
        self.kind
    }

    fn init(&mut self, frame: &RgbImage, roi: Roi) -> Result<()> {
        let frame = (self.reducer)(frame);
        let visible = visible_region(frame.dimensions(), roi)?;
        let (x, y, w, h) = visible.to_pixels();
        let x = x.max(0) as u32;
        let y = y.max(0) as u32;
        let w = w.min(frame.width() - x);
        let h = h.min(frame.height() - y);
        if w == 0 || h == 0 {
            return Err(TrackError::EmptyRegion(roi.to_string()));
        }

        self.template = image::imageops::crop_imm(&frame, x, y, w, h).to_image();
        self.model = self.template.pixels().map(|p| p[0] as f32).collect();
        self.frame_size = frame.dimensions();
        self.position = (x, y);
        self.last_score = 1.0;

        log::debug!(
            "{} tracker bound to {} (template {}x{})",
            self.kind,
            roi,
            w,
            h
        );
        Ok(())
    }

    fn update(&mut self, frame: &GrayImage) -> Result<Option<Roi>> {
        if !self.is_bound() {
            return Err(TrackError::invalid_state(format!(
                "{} tracker updated before init",
                self.kind
            )));
        }
        if frame.dimensions() != self.frame_size {
            return Err(TrackError::FrameMismatch {
                expected: self.frame_size,
                actual: frame.dimensions(),
            });
        }

        let (wx, wy, ww, wh) = self.search_window();
        let (tw, th) = self.template.dimensions();
        if ww < tw || wh < th {
            return Ok(None);
        }

        let window = image::imageops::crop_imm(frame, wx, wy, ww, wh).to_image();
        let scores = match_template(&window, &self.template, self.params.method.to_imageproc());

        let Some((bx, by, score)) = best_match(&scores, self.params.method) else {
            log::debug!("{} tracker found no finite match score", self.kind);
            return Ok(None);
        };

        self.last_score = score;
        if score < self.params.min_score {
            log::debug!(
                "{} tracker rejected match with score {:.3} < {:.3}",
                self.kind,
                score,
                self.params.min_score
            );
            return Ok(None);
        }

        self.position = (wx + bx, wy + by);
        self.refresh_model(frame);
        Ok(Some(self.current_roi()))
    }
}

/// Best finite match location and its similarity
///
/// Uniform windows make the normalized scores undefined; such positions are skipped.
fn best_match(
    scores: &ImageBuffer<Luma<f32>, Vec<f32>>,
    method: MatchMethod,
) -> Option<(u32, u32, f32)> {
    scores
        .enumerate_pixels()
        .filter(|(_, _, value)| value[0].is_finite())
        .map(|(x, y, value)| (x, y, method.similarity(value[0])))
        .fold(None, |best, candidate| match best {
            Some((_, _, best_score)) if best_score >= candidate.2 => best,
            _ => Some(candidate),
        })
}

fn model_to_image(model: &[f32], width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let value = model[(y * width + x) as usize];
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Factory for the built-in template trackers
#[derive(Clone, Default)]
pub struct TemplateFactory {
    /// Replaces the per-algorithm settings for every tracker when set
    pub params_override: Option<TemplateParams>,
    /// Bind-frame reduction; [`luma`] when unset
    pub reducer: Option<FrameReducer>,
}

impl TemplateFactory {
    pub fn with_reducer(reducer: FrameReducer) -> Self {
        Self {
            params_override: None,
            reducer: Some(reducer),
        }
    }
}

impl TrackerFactory for TemplateFactory {
    fn name(&self) -> &str {
        "template"
    }

    fn create(&self, kind: TrackerKind) -> Result<Box<dyn Tracker>> {
        let params = self
            .params_override
            .unwrap_or_else(|| TemplateParams::for_kind(kind));
        let tracker = TemplateTracker::with_params(kind, params)
            .with_reducer(self.reducer.unwrap_or(luma));
        Ok(Box::new(tracker))
    }
}
