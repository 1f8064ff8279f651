//! Region selection on the first frame
//!
//! Selectors return rectangles in the order the user confirmed them. An empty
//! list is a valid answer and means there is nothing to track.

use crate::error::Result;
use image::RgbImage;
use roitrack::Roi;

/// Produces the initial regions to track
pub trait RegionSelector {
    fn select(&mut self, first_frame: &RgbImage) -> Result<Vec<Roi>>;
}

/// Regions fixed up front (configuration, command line or tests)
#[derive(Debug, Clone, Default)]
pub struct FixedSelector {
    rois: Vec<Roi>,
}

impl FixedSelector {
    pub fn new(rois: Vec<Roi>) -> Self {
        Self { rois }
    }
}

impl RegionSelector for FixedSelector {
    fn select(&mut self, first_frame: &RgbImage) -> Result<Vec<Roi>> {
        Ok(sanitize_selection(
            &self.rois,
            first_frame.width(),
            first_frame.height(),
        ))
    }
}

/// Clamp regions to the frame and drop the ones that end up empty, keeping order
pub fn sanitize_selection(rois: &[Roi], width: u32, height: u32) -> Vec<Roi> {
    rois.iter()
        .enumerate()
        .filter_map(|(i, roi)| {
            let clamped = roi.clamp_to(width, height);
            if clamped.is_empty() {
                log::warn!("Discarding selection #{} {}: empty inside the frame", i, roi);
                None
            } else {
                Some(clamped)
            }
        })
        .collect()
}
