mod class_id;
mod config;
mod frame;
mod kalman_filter;
mod ledger;
mod matching;
mod rect;
mod sort_tracker;
mod speed;
mod track;
mod track_state;

pub use class_id::{CategoryCounts, ClassId};
pub use config::{ClassThresholds, TrackerConfig};
pub use frame::{FrameInput, FrameReport, TrackReport};
pub use kalman_filter::KalmanFilter;
pub use ledger::{CountingLedger, LedgerEntry};
pub use matching::{AssignmentResult, Detection, associate, iou_distance, linear_assignment};
pub use rect::{Rect, iou_batch};
pub use sort_tracker::SortTracker;
pub use speed::SpeedEstimator;
pub use track::{PositionSample, Track};
pub use track_state::TrackState;
