//! Vehicle tracking core: SORT-style association, constant-velocity Kalman
//! motion, calibrated speed estimation and de-duplicated category counting.
//!
//! The tracker consumes one frame of detections at a time:
//!
//! ```
//! use speedtrack_rs::{ClassId, CountingLedger, Detection, FrameInput, SortTracker, TrackerConfig};
//!
//! let mut tracker = SortTracker::new(TrackerConfig::default()).unwrap();
//! let mut ledger = CountingLedger::new();
//!
//! let input = FrameInput::new(vec![Detection::new(100.0, 100.0, 50.0, 30.0, ClassId::Car, 0.9)])
//!     .with_dt(0.1);
//! let report = tracker.update(&input, &mut ledger);
//! assert!(report.tracks.is_empty()); // still tentative
//! ```

mod error;
pub mod integration;
pub mod tracker;

pub use error::TrackerError;
pub use tracker::{
    CategoryCounts, ClassId, ClassThresholds, CountingLedger, Detection, FrameInput, FrameReport,
    LedgerEntry, Rect, SortTracker, SpeedEstimator, Track, TrackReport, TrackState, TrackerConfig,
};
