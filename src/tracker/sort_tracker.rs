//! Track lifecycle manager: the per-frame SORT loop.

use log::{debug, trace, warn};

use crate::TrackerError;
use crate::tracker::class_id::CategoryCounts;
use crate::tracker::config::TrackerConfig;
use crate::tracker::frame::{FrameInput, FrameReport, TrackReport};
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::ledger::CountingLedger;
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::Rect;
use crate::tracker::speed::SpeedEstimator;
use crate::tracker::track::Track;
use crate::tracker::track_state::TrackState;

/// Owns the active track set and advances it one frame at a time.
pub struct SortTracker {
    tracks: Vec<Track>,
    frame_id: u64,
    next_id: u64,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
    speed_estimator: SpeedEstimator,
}

impl SortTracker {
    /// Create a tracker, rejecting an invalid configuration.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            tracks: Vec::new(),
            frame_id: 0,
            next_id: 1,
            speed_estimator: SpeedEstimator::new(config.world_units_per_pixel),
            config,
            kalman_filter: KalmanFilter::default(),
        })
    }

    /// Get the tracker configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of frames processed so far.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Active tracks in creation order, including tentative ones.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Process one frame of detections and report confirmed and lost tracks.
    ///
    /// Tracks reaching confirmation for the first time are recorded in `ledger`.
    pub fn update(&mut self, input: &FrameInput, ledger: &mut CountingLedger) -> FrameReport {
        self.frame_id += 1;
        let dt = input.dt;

        // Step 0: Drop malformed and low-confidence detections
        let detections = self.filter_detections(&input.detections);

        // Step 1: Predict all existing tracks
        let predicted: Vec<Rect> = self
            .tracks
            .iter()
            .map(|t| t.predict(&self.kalman_filter, dt))
            .collect();

        // Step 2: Associate against current detections
        let det_rects: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::associate(
            &predicted,
            &det_rects,
            self.config.match_threshold,
            self.config.greedy_max_tracks,
        );
        trace!(
            "frame {}: {} tracks, {} detections, {} matches",
            self.frame_id,
            self.tracks.len(),
            detections.len(),
            matches.len()
        );

        // Step 3: Update matched tracks, coast the rest
        let mut newly_counted = Vec::new();
        for (itrack, idet) in matches {
            let track = &mut self.tracks[itrack];
            let was_lost = track.state == TrackState::Lost;
            track.update(detections[idet], &self.kalman_filter, dt, self.frame_id);

            if track.mark_hit(self.config.min_hits) {
                debug!(
                    "track {} confirmed as {} after {} hits",
                    track.track_id, track.class_id, track.hits
                );
                if ledger.record_if_new(track, self.frame_id) {
                    newly_counted.push(track.track_id);
                }
            } else if was_lost {
                debug!("track {} re-acquired", track.track_id);
            }
        }

        for itrack in unmatched_tracks {
            let track = &mut self.tracks[itrack];
            let before = track.state;
            track.coast(&self.kalman_filter, dt);
            track.mark_missed(self.config.lost_grace, self.config.max_age);

            if track.state != before {
                debug!(
                    "track {} {:?} -> {:?} after {} missed frames",
                    track.track_id, before, track.state, track.time_since_update
                );
            }
        }

        // Step 4: Init new tracks
        for idet in unmatched_detections {
            let track = Track::new(
                self.next_id,
                detections[idet],
                &self.kalman_filter,
                self.frame_id,
                self.config.history_len,
            );
            debug!(
                "track {} created as {} at frame {}",
                track.track_id, track.class_id, self.frame_id
            );
            self.next_id += 1;
            self.tracks.push(track);
        }

        // Step 5: Purge deleted tracks
        self.tracks.retain(|t| t.state != TrackState::Deleted);

        self.report(input.region, newly_counted, ledger)
    }

    fn filter_detections<'a>(&self, detections: &'a [Detection]) -> Vec<&'a Detection> {
        detections
            .iter()
            .filter(|det| {
                if !det.bbox.is_valid() {
                    warn!(
                        "frame {}: discarding malformed detection {:?}",
                        self.frame_id, det.bbox
                    );
                    return false;
                }
                det.confidence >= self.config.class_thresholds.for_class(det.class_id)
            })
            .collect()
    }

    fn report(
        &self,
        region: Option<Rect>,
        newly_counted: Vec<u64>,
        ledger: &CountingLedger,
    ) -> FrameReport {
        let mut visible = CategoryCounts::new();
        let tracks = self
            .tracks
            .iter()
            .filter(|t| t.state.is_reported())
            .map(|t| {
                if t.is_confirmed() {
                    visible.increment(t.class_id);
                }
                let rect = t.rect();
                TrackReport {
                    track_id: t.track_id,
                    class_id: t.class_id,
                    state: t.state,
                    bbox: region.map_or(rect, |r| rect.offset_by(&r)),
                    speed_kmh: self.speed_estimator.estimate(t),
                }
            })
            .collect();

        FrameReport {
            frame_id: self.frame_id,
            tracks,
            newly_counted,
            visible,
            totals: *ledger.totals(),
        }
    }
}
