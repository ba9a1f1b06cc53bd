//! TrackerPipeline for combining detection with tracking.

use crate::TrackerError;
use crate::tracker::{CountingLedger, FrameInput, FrameReport, Rect, SortTracker, TrackerConfig};

use super::DetectionSource;

/// One decoded image region handed to the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ImageFrame<'a> {
    /// Raw bytes of the region the detector runs on
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Seconds since the previous frame, ideally from video timestamps
    pub dt: Option<f64>,
    /// Placement of the region inside the full frame
    pub region: Option<Rect>,
}

/// Bundles a detector, a tracker and the counting ledger.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: SortTracker,
    ledger: CountingLedger,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new pipeline with the given detector, tracker configuration and ledger.
    pub fn new(detector: D, config: TrackerConfig, ledger: CountingLedger) -> Result<Self, TrackerError> {
        Ok(Self {
            detector,
            tracker: SortTracker::new(config)?,
            ledger,
        })
    }

    /// Create a new pipeline with default tracker configuration and an empty ledger.
    pub fn with_default_config(detector: D) -> Result<Self, TrackerError> {
        Self::new(detector, TrackerConfig::default(), CountingLedger::new())
    }

    /// Run detection on the frame and advance the tracker.
    pub fn process_frame(&mut self, frame: &ImageFrame<'_>) -> Result<FrameReport, D::Error> {
        let detections = self.detector.detect(frame.data, frame.width, frame.height)?;
        let input = FrameInput {
            detections,
            dt: frame.dt,
            region: frame.region,
        };
        Ok(self.tracker.update(&input, &mut self.ledger))
    }

    /// Get a reference to the detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the tracker.
    pub fn tracker(&self) -> &SortTracker {
        &self.tracker
    }

    /// Get a reference to the counting ledger.
    pub fn ledger(&self) -> &CountingLedger {
        &self.ledger
    }

    /// Stop the pipeline and hand back the ledger.
    pub fn into_ledger(self) -> CountingLedger {
        self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{ClassId, Detection};

    struct MockDetector {
        x: f32,
        calls: usize,
    }

    impl DetectionSource for MockDetector {
        type Error = std::convert::Infallible;

        fn detect(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<Detection>, Self::Error> {
            self.calls += 1;
            let x = self.x + 5.0 * self.calls as f32;
            Ok(vec![Detection::new(x, 100.0, 50.0, 30.0, ClassId::Car, 0.9)])
        }
    }

    struct FailingDetector;

    impl DetectionSource for FailingDetector {
        type Error = String;

        fn detect(&mut self, _: &[u8], _: u32, _: u32) -> Result<Vec<Detection>, Self::Error> {
            Err("model not loaded".to_string())
        }
    }

    #[test]
    fn test_tracker_pipeline() {
        let detector = MockDetector { x: 100.0, calls: 0 };
        let mut pipeline = TrackerPipeline::with_default_config(detector).unwrap();
        let frame = ImageFrame {
            data: &[],
            width: 640,
            height: 480,
            dt: Some(0.1),
            region: Some(Rect::new(10.0, 20.0, 640.0, 480.0)),
        };

        let first = pipeline.process_frame(&frame).unwrap();
        assert!(first.tracks.is_empty());

        let mut last = first;
        for _ in 0..3 {
            last = pipeline.process_frame(&frame).unwrap();
        }

        assert_eq!(pipeline.detector().calls, 4);
        assert_eq!(last.tracks.len(), 1);
        assert!(last.tracks[0].bbox.y > 110.0);
        assert_eq!(pipeline.ledger().total(ClassId::Car), 1);
        assert_eq!(pipeline.into_ledger().len(), 1);
    }

    #[test]
    fn test_detector_errors_propagate() {
        let mut pipeline = TrackerPipeline::with_default_config(FailingDetector).unwrap();
        let frame = ImageFrame {
            data: &[],
            width: 0,
            height: 0,
            dt: None,
            region: None,
        };
        assert_eq!(pipeline.process_frame(&frame).unwrap_err(), "model not loaded");
        assert_eq!(pipeline.tracker().frame_id(), 0);
    }
}
