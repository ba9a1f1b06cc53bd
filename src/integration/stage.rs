//! Tracking as one stage of a producer/consumer video pipeline.
//!
//! Frames arrive on a bounded queue, reports leave on another. Closing the
//! input side stops the stage after the frame in flight.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, SendError, Sender, bounded};
use log::{debug, info};

use crate::TrackerError;
use crate::tracker::{CountingLedger, FrameInput, FrameReport, SortTracker, TrackerConfig};

pub struct TrackingStage {
    input: Sender<FrameInput>,
    reports: Receiver<FrameReport>,
    handle: JoinHandle<CountingLedger>,
}

impl TrackingStage {
    /// Start the tracking thread with queues holding at most `capacity` items.
    pub fn spawn(
        config: TrackerConfig,
        mut ledger: CountingLedger,
        capacity: usize,
    ) -> Result<Self, TrackerError> {
        let mut tracker = SortTracker::new(config)?;
        let (input, frames) = bounded::<FrameInput>(capacity);
        let (report_tx, reports) = bounded::<FrameReport>(capacity);

        let handle = thread::Builder::new()
            .name("tracking".into())
            .spawn(move || {
                for frame in frames {
                    let report = tracker.update(&frame, &mut ledger);
                    if report_tx.send(report).is_err() {
                        debug!("report consumer gone, stopping tracking stage");
                        break;
                    }
                }
                info!(
                    "tracking stage finished after {} frames, {} objects counted",
                    tracker.frame_id(),
                    ledger.len()
                );
                ledger
            })?;

        Ok(Self {
            input,
            reports,
            handle,
        })
    }

    /// Queue a frame, blocking while the queue is full.
    pub fn send(&self, frame: FrameInput) -> Result<(), SendError<FrameInput>> {
        self.input.send(frame)
    }

    /// A handle for producers on other threads.
    pub fn sender(&self) -> Sender<FrameInput> {
        self.input.clone()
    }

    pub fn reports(&self) -> &Receiver<FrameReport> {
        &self.reports
    }

    /// Close the input queue, wait for the stage to drain and return the ledger.
    ///
    /// Reports not yet received are discarded.
    pub fn finish(self) -> Result<CountingLedger, TrackerError> {
        let Self {
            input,
            reports,
            handle,
        } = self;
        drop(input);
        drop(reports);
        handle.join().map_err(|_| TrackerError::StagePanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{ClassId, Detection};

    #[test]
    fn test_stage_tracks_and_counts() {
        let stage = TrackingStage::spawn(TrackerConfig::default(), CountingLedger::new(), 2).unwrap();

        let mut reports = Vec::new();
        for i in 0..6 {
            let det = Detection::new(100.0 + 5.0 * i as f32, 100.0, 50.0, 30.0, ClassId::Car, 0.9);
            stage.send(FrameInput::new(vec![det]).with_dt(0.1)).unwrap();
            reports.push(stage.reports().recv().unwrap());
        }

        assert_eq!(reports.len(), 6);
        assert_eq!(reports[5].frame_id, 6);
        assert_eq!(reports[5].tracks.len(), 1);
        assert_eq!(reports[3].newly_counted, vec![1]);
        assert_eq!(reports[5].totals.get(ClassId::Car), 1);

        let ledger = stage.finish().unwrap();
        assert_eq!(ledger.total(ClassId::Car), 1);
    }

    #[test]
    fn test_finish_without_frames() {
        let stage = TrackingStage::spawn(TrackerConfig::default(), CountingLedger::new(), 1).unwrap();
        let ledger = stage.finish().unwrap();
        assert!(ledger.is_empty());
    }
}
