//! Tracker configuration, fixed at construction.

use serde::Deserialize;

use crate::TrackerError;
use crate::tracker::class_id::ClassId;

/// Minimum detector confidence per category.
///
/// Detections below their category's threshold never reach association.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassThresholds {
    pub car: f32,
    pub motorcycle: f32,
    pub truck: f32,
    pub other: f32,
}

impl Default for ClassThresholds {
    fn default() -> Self {
        Self {
            car: 0.7,
            motorcycle: 0.5,
            truck: 0.5,
            other: 0.5,
        }
    }
}

impl ClassThresholds {
    /// The same threshold for every category.
    pub fn uniform(threshold: f32) -> Self {
        Self {
            car: threshold,
            motorcycle: threshold,
            truck: threshold,
            other: threshold,
        }
    }

    #[inline]
    pub fn for_class(&self, class_id: ClassId) -> f32 {
        match class_id {
            ClassId::Car => self.car,
            ClassId::Motorcycle => self.motorcycle,
            ClassId::Truck => self.truck,
            ClassId::Other => self.other,
        }
    }
}

/// Configuration for the [`SortTracker`](crate::SortTracker).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IoU between a predicted box and a detection for them to match.
    pub match_threshold: f32,
    /// Consecutive matches a tentative track needs to become confirmed.
    pub min_hits: u32,
    /// Frames without a match after which a track is deleted.
    pub max_age: u32,
    /// Missed frames a confirmed track tolerates before it is marked lost.
    pub lost_grace: u32,
    /// Track counts up to this value are associated greedily. At most 1,
    /// where greedy and optimal assignment coincide.
    pub greedy_max_tracks: usize,
    /// Number of filtered positions kept per track.
    pub history_len: usize,
    /// Calibration constant, metres per pixel.
    pub world_units_per_pixel: f64,
    pub class_thresholds: ClassThresholds,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.3,
            min_hits: 3,
            max_age: 30,
            lost_grace: 0,
            greedy_max_tracks: 1,
            history_len: 32,
            world_units_per_pixel: 0.000264583,
            class_thresholds: ClassThresholds::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, TrackerError> {
        let config: TrackerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.match_threshold > 0.0 && self.match_threshold <= 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "match_threshold must be in (0, 1], got {}",
                self.match_threshold
            )));
        }
        if self.min_hits == 0 {
            return Err(TrackerError::InvalidConfig(
                "min_hits must be at least 1".into(),
            ));
        }
        if self.max_age == 0 {
            return Err(TrackerError::InvalidConfig(
                "max_age must be at least 1".into(),
            ));
        }
        if self.lost_grace >= self.max_age {
            return Err(TrackerError::InvalidConfig(format!(
                "lost_grace ({}) must be smaller than max_age ({})",
                self.lost_grace, self.max_age
            )));
        }
        if self.greedy_max_tracks > 1 {
            return Err(TrackerError::InvalidConfig(format!(
                "greedy_max_tracks must be 0 or 1, got {}",
                self.greedy_max_tracks
            )));
        }
        if self.history_len < 2 {
            return Err(TrackerError::InvalidConfig(
                "history_len must keep at least 2 positions".into(),
            ));
        }
        if !(self.world_units_per_pixel.is_finite() && self.world_units_per_pixel > 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "world_units_per_pixel must be positive, got {}",
                self.world_units_per_pixel
            )));
        }
        for class_id in ClassId::ALL {
            let threshold = self.class_thresholds.for_class(class_id);
            if !(0.0..=1.0).contains(&threshold) {
                return Err(TrackerError::InvalidConfig(format!(
                    "confidence threshold for {class_id} must be in [0, 1], got {threshold}"
                )));
            }
        }
        Ok(())
    }
}
