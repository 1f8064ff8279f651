//! Single-object tracker interface and the factory seam between backends

use crate::error::{Result, TrackError};
use crate::kind::TrackerKind;
use crate::roi::Roi;
use image::{GrayImage, RgbImage};

/// Common interface for single-object trackers
///
/// A tracker is bound once with [`Tracker::init`] on the frame as it was
/// acquired, and then fed every following frame through [`Tracker::update`]
/// after preprocessing.
pub trait Tracker: Send {
    /// Algorithm backing this tracker
    fn kind(&self) -> TrackerKind;

    /// Bind the tracker to `roi` in the acquired first frame
    fn init(&mut self, frame: &RgbImage, roi: Roi) -> Result<()>;

    /// Estimate the region in a new frame
    ///
    /// # Returns
    /// `Some(roi)` with the new estimate, or `None` when the target was lost
    /// in this frame.
    fn update(&mut self, frame: &GrayImage) -> Result<Option<Roi>>;
}

/// Creates trackers for a given algorithm
pub trait TrackerFactory {
    /// Backend name (for logging)
    fn name(&self) -> &str;

    /// Create an unbound tracker
    fn create(&self, kind: TrackerKind) -> Result<Box<dyn Tracker>>;
}

/// Resolve `name` and create a tracker for it
///
/// Unknown names are reported together with the list of valid names and
/// returned as [`TrackError::UnknownTrackerName`].
pub fn create_tracker_by_name(factory: &dyn TrackerFactory, name: &str) -> Result<Box<dyn Tracker>> {
    let kind = name.parse::<TrackerKind>().map_err(|e| {
        log::error!("Incorrect tracker name: {}", name);
        log::error!("Available trackers are: {}", TrackerKind::names().join(" "));
        e
    })?;

    log::debug!("Creating {} tracker with {} backend", kind, factory.name());
    factory.create(kind)
}

/// Validate that `roi` lies at least partly inside a frame of `size` and return the visible part
pub fn visible_region(size: (u32, u32), roi: Roi) -> Result<Roi> {
    let clamped = roi.clamp_to(size.0, size.1);
    if clamped.is_empty() {
        return Err(TrackError::EmptyRegion(roi.to_string()));
    }
    Ok(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateFactory;

    #[test]
    fn test_create_by_name_for_every_kind() {
        let factory = TemplateFactory::default();
        for name in TrackerKind::names() {
            let tracker = create_tracker_by_name(&factory, name).unwrap();
            assert_eq!(tracker.kind().name(), name);
        }
    }

    #[test]
    fn test_create_by_unknown_name_fails() {
        let factory = TemplateFactory::default();
        let err = create_tracker_by_name(&factory, "MEANSHIFT").err().unwrap();
        assert!(matches!(err, TrackError::UnknownTrackerName { .. }));
        assert!(err.to_string().contains("BOOSTING, MIL, KCF"));
    }

    #[test]
    fn test_visible_region() {
        let roi = visible_region((50, 40), Roi::new(40.0, 30.0, 20.0, 20.0)).unwrap();
        assert_eq!(roi, Roi::new(40.0, 30.0, 10.0, 10.0));
        assert!(visible_region((50, 40), Roi::new(60.0, 0.0, 5.0, 5.0)).is_err());
    }
}
