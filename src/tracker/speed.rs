//! Calibrated speed from a track's filtered position history.

use crate::tracker::track::Track;

const MPS_TO_KMH: f64 = 3.6;

/// Converts pixel displacement between consecutive filtered positions into km/h
/// using a fixed linear calibration (metres per pixel).
#[derive(Debug, Clone, Copy)]
pub struct SpeedEstimator {
    world_units_per_pixel: f64,
}

impl SpeedEstimator {
    pub fn new(world_units_per_pixel: f64) -> Self {
        Self {
            world_units_per_pixel,
        }
    }

    /// Instantaneous speed of a confirmed track in km/h.
    ///
    /// `None` means "no display": the track is not confirmed, has fewer than two
    /// positions, or the time between the last two positions is unknown or zero.
    pub fn estimate(&self, track: &Track) -> Option<f64> {
        if !track.is_confirmed() {
            return None;
        }

        let mut recent = track.history().iter().rev();
        let current = recent.next()?;
        let previous = recent.next()?;
        let elapsed = current.elapsed?;

        let dx = current.center.0 - previous.center.0;
        let dy = current.center.1 - previous.center.1;
        let metres = dx.hypot(dy) * self.world_units_per_pixel;
        let speed = metres / elapsed * MPS_TO_KMH;

        speed.is_finite().then_some(speed)
    }
}
