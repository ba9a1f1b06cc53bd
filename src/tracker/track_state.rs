use serde::Serialize;

/// Lifecycle state of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TrackState {
    /// Created from an unmatched detection, not yet confirmed
    #[default]
    Tentative,
    /// Established identity, counted and reported
    Confirmed,
    /// Confirmed track coasting without detections
    Lost,
    /// Retired, about to be purged from the active set
    Deleted,
}

impl TrackState {
    /// Whether tracks in this state are reported to collaborators.
    #[inline]
    pub fn is_reported(self) -> bool {
        matches!(self, TrackState::Confirmed | TrackState::Lost)
    }
}
