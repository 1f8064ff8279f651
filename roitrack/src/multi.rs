//! Aggregate of independent single-object trackers sharing one frame stream

use crate::error::{Result, TrackError};
use crate::kind::TrackerKind;
use crate::roi::Roi;
use crate::tracker::{Tracker, TrackerFactory};
use image::{GrayImage, RgbImage};

/// Lifecycle of a [`MultiTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiTrackerState {
    /// No tracker bound yet
    Uninitialized,
    /// Trackers bound, no frame processed yet
    Initialized,
    /// At least one frame processed
    Updating,
    /// End of stream or user cancel; no further updates
    Terminated,
}

/// Per-track bookkeeping exposed for logging and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackStatus {
    pub id: usize,
    pub initial: Roi,
    /// Last known estimate
    pub current: Roi,
    /// Consecutive frames without a fresh estimate
    pub lost_frames: u32,
    /// Total frames without a fresh estimate
    pub total_lost: u32,
}

struct TrackSlot {
    tracker: Box<dyn Tracker>,
    status: TrackStatus,
}

/// Holds N trackers, each bound to one initial region, and updates them together
///
/// The order of regions returned by [`MultiTracker::update`] is the order in
/// which trackers were added and never changes.
pub struct MultiTracker {
    slots: Vec<TrackSlot>,
    objects: Vec<Roi>,
    frame_size: Option<(u32, u32)>,
    state: MultiTrackerState,
    frames_processed: u64,
}

impl Default for MultiTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiTracker {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            objects: Vec::new(),
            frame_size: None,
            state: MultiTrackerState::Uninitialized,
            frames_processed: 0,
        }
    }

    /// Create one tracker of `kind` per region and bind them all to the acquired first frame
    ///
    /// Either every region is bound or none is: on failure the returned
    /// error describes the first region that could not be bound.
    pub fn init_all(
        factory: &dyn TrackerFactory,
        kind: TrackerKind,
        frame: &RgbImage,
        rois: &[Roi],
    ) -> Result<Self> {
        log::info!(
            "Initializing {} {} tracker(s) with {} backend",
            rois.len(),
            kind,
            factory.name()
        );

        let mut multi = Self::new();
        for roi in rois {
            let tracker = factory.create(kind)?;
            multi.add(tracker, frame, *roi)?;
        }
        Ok(multi)
    }

    /// Bind `tracker` to `roi` in the shared first frame, as acquired
    pub fn add(&mut self, mut tracker: Box<dyn Tracker>, frame: &RgbImage, roi: Roi) -> Result<()> {
        match self.state {
            MultiTrackerState::Uninitialized | MultiTrackerState::Initialized => {}
            state => {
                return Err(TrackError::invalid_state(format!(
                    "cannot add a tracker in state {:?}",
                    state
                )))
            }
        }

        if let Some(expected) = self.frame_size {
            if frame.dimensions() != expected {
                return Err(TrackError::FrameMismatch {
                    expected,
                    actual: frame.dimensions(),
                });
            }
        }

        tracker.init(frame, roi)?;

        let id = self.slots.len();
        self.slots.push(TrackSlot {
            tracker,
            status: TrackStatus {
                id,
                initial: roi,
                current: roi,
                lost_frames: 0,
                total_lost: 0,
            },
        });
        self.objects.push(roi);
        self.frame_size = Some(frame.dimensions());
        self.state = MultiTrackerState::Initialized;

        log::debug!("Track #{} bound to {}", id, roi);
        Ok(())
    }

    /// Update every tracker with `frame`
    ///
    /// # Returns
    /// Exactly one region per track, in insertion order. Tracks whose tracker
    /// lost the target, or failed on this frame, keep their last known region.
    pub fn update(&mut self, frame: &GrayImage) -> Result<&[Roi]> {
        match self.state {
            MultiTrackerState::Initialized | MultiTrackerState::Updating => {}
            state => {
                return Err(TrackError::invalid_state(format!(
                    "cannot update in state {:?}",
                    state
                )))
            }
        }

        for (slot, object) in self.slots.iter_mut().zip(self.objects.iter_mut()) {
            let estimate = slot.tracker.update(frame).unwrap_or_else(|e| {
                log::warn!("Track #{} update failed: {}", slot.status.id, e);
                None
            });

            match estimate {
                Some(roi) => {
                    slot.status.current = roi;
                    slot.status.lost_frames = 0;
                    *object = roi;
                }
                None => {
                    slot.status.lost_frames += 1;
                    slot.status.total_lost += 1;
                    if slot.status.lost_frames == 1 {
                        log::warn!(
                            "Track #{} lost, keeping last known region {}",
                            slot.status.id,
                            slot.status.current
                        );
                    }
                }
            }
        }

        self.frames_processed += 1;
        self.state = MultiTrackerState::Updating;
        Ok(&self.objects)
    }

    /// Stop tracking; later updates fail
    pub fn terminate(&mut self) {
        if self.state != MultiTrackerState::Terminated {
            log::info!(
                "Multi-tracker terminated after {} frame(s)",
                self.frames_processed
            );
        }
        self.state = MultiTrackerState::Terminated;
    }

    /// Current regions in insertion order
    pub fn objects(&self) -> &[Roi] {
        &self.objects
    }

    pub fn track_status(&self, id: usize) -> Option<&TrackStatus> {
        self.slots.get(id).map(|slot| &slot.status)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn state(&self) -> MultiTrackerState {
        self.state
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{luma, TemplateFactory};
    use image::Rgb;

    /// Scripted tracker: moves right by one pixel per frame until `lose_after` updates
    struct ScriptedTracker {
        roi: Roi,
        updates: u32,
        lose_after: u32,
    }

    impl ScriptedTracker {
        fn boxed(lose_after: u32) -> Box<dyn Tracker> {
            Box::new(Self {
                roi: Roi::default(),
                updates: 0,
                lose_after,
            })
        }
    }

    impl Tracker for ScriptedTracker {
        fn kind(&self) -> TrackerKind {
            TrackerKind::Kcf
        }

        fn init(&mut self, _frame: &RgbImage, roi: Roi) -> Result<()> {
            self.roi = roi;
            Ok(())
        }

        fn update(&mut self, _frame: &GrayImage) -> Result<Option<Roi>> {
            self.updates += 1;
            if self.updates > self.lose_after {
                return Ok(None);
            }
            self.roi.x += 1.0;
            Ok(Some(self.roi))
        }
    }

    /// Tracker whose backend errors on every update
    struct BrokenTracker;

    impl Tracker for BrokenTracker {
        fn kind(&self) -> TrackerKind {
            TrackerKind::Goturn
        }

        fn init(&mut self, _frame: &RgbImage, _roi: Roi) -> Result<()> {
            Ok(())
        }

        fn update(&mut self, _frame: &GrayImage) -> Result<Option<Roi>> {
            Err(TrackError::backend("model file missing"))
        }
    }

    fn textured_frame() -> RgbImage {
        RgbImage::from_fn(80, 60, |x, y| {
            let hash = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
            let v = (hash % 251) as u8;
            Rgb([v, v / 2, 255 - v])
        })
    }

    #[test]
    fn test_update_returns_one_region_per_track() {
        let frame = textured_frame();
        let rois = [
            Roi::new(5.0, 5.0, 10.0, 10.0),
            Roi::new(30.0, 20.0, 12.0, 8.0),
            Roi::new(50.0, 40.0, 15.0, 15.0),
        ];
        let mut multi =
            MultiTracker::init_all(&TemplateFactory::default(), TrackerKind::Csrt, &frame, &rois)
                .unwrap();
        assert_eq!(multi.state(), MultiTrackerState::Initialized);

        let gray = luma(&frame);
        for _ in 0..4 {
            let objects = multi.update(&gray).unwrap();
            assert_eq!(objects.len(), rois.len());
        }
        assert_eq!(multi.state(), MultiTrackerState::Updating);
        assert_eq!(multi.frames_processed(), 4);
        assert_eq!(multi.objects(), &rois);
    }

    #[test]
    fn test_lost_track_keeps_last_known_region() {
        let frame = textured_frame();
        let mut multi = MultiTracker::new();
        multi
            .add(ScriptedTracker::boxed(2), &frame, Roi::new(0.0, 0.0, 5.0, 5.0))
            .unwrap();
        multi
            .add(ScriptedTracker::boxed(10), &frame, Roi::new(20.0, 0.0, 5.0, 5.0))
            .unwrap();

        for _ in 0..5 {
            multi.update(&luma(&frame)).unwrap();
        }

        assert_eq!(multi.objects()[0], Roi::new(2.0, 0.0, 5.0, 5.0));
        assert_eq!(multi.objects()[1], Roi::new(25.0, 0.0, 5.0, 5.0));

        let status = multi.track_status(0).unwrap();
        assert_eq!(status.lost_frames, 3);
        assert_eq!(status.total_lost, 3);
        assert_eq!(status.initial, Roi::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(multi.track_status(1).unwrap().lost_frames, 0);
    }

    #[test]
    fn test_add_after_update_is_rejected() {
        let frame = textured_frame();
        let mut multi = MultiTracker::new();
        multi
            .add(ScriptedTracker::boxed(10), &frame, Roi::new(0.0, 0.0, 5.0, 5.0))
            .unwrap();
        multi.update(&luma(&frame)).unwrap();

        let result = multi.add(ScriptedTracker::boxed(10), &frame, Roi::new(1.0, 1.0, 5.0, 5.0));
        assert!(matches!(result, Err(TrackError::InvalidState(_))));
        assert_eq!(multi.len(), 1);
    }

    #[test]
    fn test_bindings_must_share_frame_size() {
        let mut multi = MultiTracker::new();
        multi
            .add(ScriptedTracker::boxed(1), &textured_frame(), Roi::new(0.0, 0.0, 5.0, 5.0))
            .unwrap();
        let result = multi.add(
            ScriptedTracker::boxed(1),
            &RgbImage::new(10, 10),
            Roi::new(0.0, 0.0, 5.0, 5.0),
        );
        assert!(matches!(result, Err(TrackError::FrameMismatch { .. })));
    }

    #[test]
    fn test_init_all_is_atomic() {
        let frame = textured_frame();
        let rois = [
            Roi::new(5.0, 5.0, 10.0, 10.0),
            Roi::new(500.0, 500.0, 10.0, 10.0),
        ];
        let result =
            MultiTracker::init_all(&TemplateFactory::default(), TrackerKind::Kcf, &frame, &rois);
        assert!(matches!(result, Err(TrackError::EmptyRegion(_))));
    }

    #[test]
    fn test_update_requires_bound_trackers() {
        let mut multi = MultiTracker::new();
        assert!(multi.is_empty());
        assert!(multi.update(&luma(&textured_frame())).is_err());
    }

    #[test]
    fn test_terminated_rejects_updates() {
        let frame = textured_frame();
        let mut multi = MultiTracker::new();
        multi
            .add(ScriptedTracker::boxed(10), &frame, Roi::new(0.0, 0.0, 5.0, 5.0))
            .unwrap();
        multi.terminate();
        assert_eq!(multi.state(), MultiTrackerState::Terminated);
        assert!(multi.update(&luma(&frame)).is_err());
    }

    #[test]
    fn test_failing_tracker_counts_as_lost() {
        let frame = textured_frame();
        let gray = luma(&frame);
        let mut multi = MultiTracker::new();
        multi
            .add(ScriptedTracker::boxed(10), &frame, Roi::new(0.0, 0.0, 5.0, 5.0))
            .unwrap();
        multi
            .add(Box::new(BrokenTracker), &frame, Roi::new(10.0, 0.0, 5.0, 5.0))
            .unwrap();

        for frame_index in 1..=3 {
            let objects = multi.update(&gray).unwrap();
            assert_eq!(objects.len(), 2);
            assert_eq!(objects[0], Roi::new(frame_index as f32, 0.0, 5.0, 5.0));
            assert_eq!(objects[1], Roi::new(10.0, 0.0, 5.0, 5.0));
        }

        assert_eq!(multi.frames_processed(), 3);
        assert_eq!(multi.state(), MultiTrackerState::Updating);
        let status = multi.track_status(1).unwrap();
        assert_eq!(status.lost_frames, 3);
        assert_eq!(status.current, Roi::new(10.0, 0.0, 5.0, 5.0));
    }
}
