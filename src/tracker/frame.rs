//! Per-frame input and output of the tracker.

use serde::Serialize;

use crate::tracker::class_id::{CategoryCounts, ClassId};
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Everything the tracker consumes for one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub detections: Vec<Detection>,
    /// Seconds since the previous frame, `None` when unknown
    pub dt: Option<f64>,
    /// Region the detections are relative to; reported boxes are shifted by its origin
    pub region: Option<Rect>,
}

impl FrameInput {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            ..Self::default()
        }
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    pub fn with_region(mut self, region: Rect) -> Self {
        self.region = Some(region);
        self
    }
}

/// A confirmed or lost track as seen by collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackReport {
    pub track_id: u64,
    pub class_id: ClassId,
    pub state: TrackState,
    /// Filtered box in full-frame coordinates
    pub bbox: Rect,
    /// `None` means the speed must not be displayed
    pub speed_kmh: Option<f64>,
}

/// Tracker output for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame_id: u64,
    /// Confirmed and lost tracks, ascending by id
    pub tracks: Vec<TrackReport>,
    /// Tracks counted for the first time this frame
    pub newly_counted: Vec<u64>,
    /// Confirmed tracks per category in this frame
    pub visible: CategoryCounts,
    /// Running ledger totals after this frame
    pub totals: CategoryCounts,
}

impl FrameReport {
    pub fn track(&self, track_id: u64) -> Option<&TrackReport> {
        self.tracks.iter().find(|t| t.track_id == track_id)
    }
}
