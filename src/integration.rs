//! Integration module for connecting object detection backends with the tracker.
//!
//! This module provides the detector trait, a detection builder, a
//! synchronous detect-then-track pipeline and a threaded tracking stage.

mod builder;
mod detector;
mod pipeline;
mod stage;

pub use builder::DetectionBuilder;
pub use detector::DetectionSource;
pub use pipeline::{ImageFrame, TrackerPipeline};
pub use stage::TrackingStage;
