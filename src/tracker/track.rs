//! Single object track for multi-object tracking.

use std::collections::VecDeque;

use log::warn;
use ndarray::{Array1, Array2};

use crate::tracker::class_id::ClassId;
use crate::tracker::kalman_filter::{KalmanFilter, usable_dt};
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// One filtered position in a track's history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// Filtered box center, pixels
    pub center: (f64, f64),
    /// Seconds since the previous sample, `None` when unknown
    pub elapsed: Option<f64>,
}

/// Single object track.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier
    pub track_id: u64,
    /// Category assigned at creation, never re-voted
    pub class_id: ClassId,
    /// Confidence of the last matched detection
    pub confidence: f32,
    /// Current lifecycle state
    pub state: TrackState,
    /// Frames since creation
    pub age: u32,
    /// Successful matches since creation
    pub hits: u32,
    /// Frames since the last matched detection
    pub time_since_update: u32,
    /// Frame ID when track was started
    pub start_frame: u64,
    /// Frame ID of the last matched detection
    pub last_frame: u64,
    mean: Array1<f64>,
    covariance: Array2<f64>,
    history: VecDeque<PositionSample>,
    history_len: usize,
}

fn measurement(rect: &Rect) -> [f64; 4] {
    rect.to_cxcywh().map(f64::from)
}

fn rect_from_mean(mean: &Array1<f64>) -> Rect {
    Rect::from_cxcywh(
        mean[0] as f32,
        mean[1] as f32,
        mean[2] as f32,
        mean[3] as f32,
    )
}

impl Track {
    /// Start a tentative track from an unmatched detection.
    pub fn new(
        track_id: u64,
        detection: &Detection,
        kalman_filter: &KalmanFilter,
        frame_id: u64,
        history_len: usize,
    ) -> Self {
        let (mean, covariance) = kalman_filter.initiate(measurement(&detection.bbox));
        let mut track = Self {
            track_id,
            class_id: detection.class_id,
            confidence: detection.confidence,
            state: TrackState::Tentative,
            age: 0,
            hits: 0,
            time_since_update: 0,
            start_frame: frame_id,
            last_frame: frame_id,
            mean,
            covariance,
            history: VecDeque::with_capacity(history_len),
            history_len,
        };
        track.record_position(None);
        track
    }

    /// Current filtered bounding box.
    pub fn rect(&self) -> Rect {
        rect_from_mean(&self.mean)
    }

    /// Filtered velocity of the box center, pixels per second.
    pub fn velocity(&self) -> (f64, f64) {
        (self.mean[4], self.mean[5])
    }

    pub fn history(&self) -> &VecDeque<PositionSample> {
        &self.history
    }

    /// State fed to the prediction step. A track without a recent match
    /// keeps its size.
    fn mean_to_predict(&self) -> Array1<f64> {
        let mut mean = self.mean.clone();
        if self.time_since_update > 0 {
            mean[6] = 0.0;
            mean[7] = 0.0;
        }
        mean
    }

    /// Predicted bounding box after `dt` seconds. Does not commit the state.
    pub fn predict(&self, kalman_filter: &KalmanFilter, dt: Option<f64>) -> Rect {
        let (mean, _) = kalman_filter.predict(&self.mean_to_predict(), &self.covariance, dt);
        rect_from_mean(&mean)
    }

    /// Advance the state by prediction only, for frames without a match.
    pub fn coast(&mut self, kalman_filter: &KalmanFilter, dt: Option<f64>) {
        let (mean, covariance) =
            kalman_filter.predict(&self.mean_to_predict(), &self.covariance, dt);
        self.mean = mean;
        self.covariance = covariance;
        self.age += 1;
        self.time_since_update += 1;
        self.record_position(dt);
    }

    /// Correct the state with an associated detection.
    ///
    /// With an unusable `dt` the observation is taken as the new position and
    /// the velocity is reset to zero.
    pub fn update(
        &mut self,
        detection: &Detection,
        kalman_filter: &KalmanFilter,
        dt: Option<f64>,
        frame_id: u64,
    ) {
        let observed = measurement(&detection.bbox);

        if usable_dt(dt).is_some() {
            let (predicted_mean, predicted_cov) =
                kalman_filter.predict(&self.mean_to_predict(), &self.covariance, dt);
            match kalman_filter.update(&predicted_mean, &predicted_cov, observed) {
                Ok((mean, covariance)) => {
                    self.mean = mean;
                    self.covariance = covariance;
                }
                Err(err) => {
                    warn!(
                        "track {}: {err}, re-initiating from observation",
                        self.track_id
                    );
                    self.reinitiate(kalman_filter, observed);
                }
            }
        } else {
            self.reinitiate(kalman_filter, observed);
        }

        self.age += 1;
        self.hits += 1;
        self.time_since_update = 0;
        self.last_frame = frame_id;
        self.confidence = detection.confidence;
        self.record_position(dt);
    }

    fn reinitiate(&mut self, kalman_filter: &KalmanFilter, observed: [f64; 4]) {
        let (mean, covariance) = kalman_filter.initiate(observed);
        self.mean = mean;
        self.covariance = covariance;
    }

    fn record_position(&mut self, dt: Option<f64>) {
        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(PositionSample {
            center: (self.mean[0], self.mean[1]),
            elapsed: usable_dt(dt),
        });
    }

    /// Register a matched frame. Returns `true` when the track became
    /// confirmed for the first time.
    pub fn mark_hit(&mut self, min_hits: u32) -> bool {
        match self.state {
            TrackState::Tentative if self.hits >= min_hits => {
                self.state = TrackState::Confirmed;
                true
            }
            TrackState::Lost => {
                self.state = TrackState::Confirmed;
                false
            }
            _ => false,
        }
    }

    /// Register an unmatched frame, after [`Track::coast`].
    pub fn mark_missed(&mut self, lost_grace: u32, max_age: u32) {
        self.state = match self.state {
            TrackState::Tentative => TrackState::Deleted,
            _ if self.time_since_update >= max_age => TrackState::Deleted,
            TrackState::Confirmed if self.time_since_update > lost_grace => TrackState::Lost,
            state => state,
        };
    }

    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }
}
