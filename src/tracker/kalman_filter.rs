//! Constant-velocity Kalman filter over (cx, cy, w, h) using ndarray, with a
//! nalgebra-based 4x4 inverse.
//!
//! Positions are in pixels and velocities in pixels per second, so the
//! transition matrix depends on the elapsed time `dt` of each step.

use nalgebra::Matrix4;
use ndarray::{Array1, Array2};

use crate::TrackerError;

const NDIM: usize = 4;

/// Lower bound on the box height used to scale noise, keeps covariances
/// positive definite for tiny boxes.
const MIN_SCALE: f64 = 1.0;

/// Returns `dt` when it can be used as a time step: finite and strictly positive.
#[inline]
pub(crate) fn usable_dt(dt: Option<f64>) -> Option<f64> {
    dt.filter(|dt| dt.is_finite() && *dt > 0.0)
}

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    update_mat: Array2<f64>,
    std_weight_position: f64,
    std_weight_velocity: f64,
    /// Frame interval the noise weights are tuned for.
    nominal_dt: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let mut update_mat = Array2::zeros((NDIM, 2 * NDIM));
        for i in 0..NDIM {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
            nominal_dt: 1.0 / 30.0,
        }
    }

    fn motion_mat(dt: f64) -> Array2<f64> {
        let mut motion_mat = Array2::eye(2 * NDIM);
        for i in 0..NDIM {
            motion_mat[[i, NDIM + i]] = dt;
        }
        motion_mat
    }

    fn diagonal(std: &[f64]) -> Array2<f64> {
        Array2::from_diag(&Array1::from_iter(std.iter().map(|s| s * s)))
    }

    /// Create a track state from an unassociated measurement `[cx, cy, w, h]`.
    /// Velocities start at zero with a wide uncertainty.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(2 * NDIM);
        for i in 0..NDIM {
            mean[i] = measurement[i];
        }

        let h = measurement[3].max(MIN_SCALE);
        let pos = 2.0 * self.std_weight_position * h;
        let vel = 10.0 * self.std_weight_velocity * h / self.nominal_dt;
        let cov = Self::diagonal(&[pos, pos, pos, pos, vel, vel, vel, vel]);

        (mean, cov)
    }

    /// Run the prediction step for an elapsed time `dt` (seconds).
    ///
    /// An unusable `dt` applies no displacement and returns the state unchanged.
    /// A size velocity that would shrink the box to zero or below is dropped.
    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        dt: Option<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let Some(dt) = usable_dt(dt) else {
            return (mean.clone(), covariance.clone());
        };

        let h = mean[3].max(MIN_SCALE);
        let ratio = dt / self.nominal_dt;
        let pos = self.std_weight_position * h * ratio;
        let vel = self.std_weight_velocity * h * ratio / self.nominal_dt;
        let motion_cov = Self::diagonal(&[pos, pos, pos, pos, vel, vel, vel, vel]);

        let mut mean = mean.clone();
        for i in 2..NDIM {
            if mean[i] + mean[NDIM + i] * dt <= 0.0 {
                mean[NDIM + i] = 0.0;
            }
        }

        let motion_mat = Self::motion_mat(dt);
        let new_mean = motion_mat.dot(&mean);
        let new_covariance = motion_mat.dot(covariance).dot(&motion_mat.t()) + motion_cov;

        (new_mean, new_covariance)
    }

    /// Project the state distribution into measurement space.
    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3].max(MIN_SCALE);
        let std = self.std_weight_position * h;
        let innovation_cov = Self::diagonal(&[std; NDIM]);

        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + innovation_cov;

        (mean_proj, covariance_proj)
    }

    /// Run the correction step with a measurement `[cx, cy, w, h]`.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Result<(Array1<f64>, Array2<f64>), TrackerError> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let innovation = Array1::from_vec(measurement.to_vec()) - projected_mean;

        // K = P * H^T * S^-1
        // H is [I 0], so P * H^T is the first 4 columns of P (8x4).
        let s_inv = invert_4x4(&projected_cov)?;
        let pht = covariance.dot(&self.update_mat.t());
        let kalman_gain = pht.dot(&s_inv);

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        Ok((new_mean, new_covariance))
    }
}

fn invert_4x4(m: &Array2<f64>) -> Result<Array2<f64>, TrackerError> {
    let inv = Matrix4::from_fn(|i, j| m[[i, j]])
        .try_inverse()
        .ok_or(TrackerError::SingularCovariance)?;
    Ok(Array2::from_shape_fn((NDIM, NDIM), |(i, j)| inv[(i, j)]))
}
