//! Constant-velocity Kalman filter over the XYSR box space, using ndarray and
//! a nalgebra-based inverse for the 4x4 innovation covariance.
//!
//! State layout: `[cx, cy, s, r, vcx, vcy, vs]`. The aspect ratio `r` is
//! modelled as constant and has no rate term.

use ndarray::{Array1, Array2};

const STATE_DIM: usize = 7;
const MEASUREMENT_DIM: usize = 4;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    process_noise: f64,
    measurement_noise: f64,
    initial_uncertainty: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let mut motion_mat = Array2::eye(STATE_DIM);
        // cx, cy and s advance by their rates each step
        for i in 0..STATE_DIM - MEASUREMENT_DIM {
            motion_mat[[i, MEASUREMENT_DIM + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((MEASUREMENT_DIM, STATE_DIM));
        for i in 0..MEASUREMENT_DIM {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            process_noise: 1e-2,
            measurement_noise: 1e-1,
            initial_uncertainty: 1.0,
        }
    }

    /// Override the diagonal noise terms (process, measurement, initial
    /// state uncertainty).
    pub fn with_noise(mut self, process: f64, measurement: f64, initial: f64) -> Self {
        self.process_noise = process;
        self.measurement_noise = measurement;
        self.initial_uncertainty = initial;
        self
    }

    pub fn initial_covariance(&self) -> Array2<f64> {
        Array2::<f64>::eye(STATE_DIM) * self.initial_uncertainty
    }

    /// Build a track state from its first measurement, with zero rates.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(STATE_DIM);
        for i in 0..MEASUREMENT_DIM {
            mean[i] = measurement[i];
        }
        (mean, self.initial_covariance())
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let motion_cov = Array2::<f64>::eye(STATE_DIM) * self.process_noise;

        let new_mean = self.motion_mat.dot(mean);
        let new_covariance = self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + motion_cov;

        (new_mean, new_covariance)
    }

    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let innovation_cov = Array2::<f64>::eye(MEASUREMENT_DIM) * self.measurement_noise;

        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + innovation_cov;

        (mean_proj, covariance_proj)
    }

    /// Correction step. Returns `None` when the innovation covariance is
    /// singular; the caller keeps its predicted state in that case.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Option<(Array1<f64>, Array2<f64>)> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let measurement_arr = Array1::from_vec(measurement.to_vec());
        let innovation = measurement_arr - projected_mean;

        // K = P * H^T * S^-1
        let s_inv = invert_4x4(&projected_cov)?;

        let pht = covariance.dot(&self.update_mat.t()); // 7x4
        let kalman_gain = pht.dot(&s_inv); // 7x4

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        Some((new_mean, new_covariance))
    }

    /// True when the state has diverged: a non-finite entry anywhere or a
    /// negative variance on the diagonal.
    pub fn is_degenerate(mean: &Array1<f64>, covariance: &Array2<f64>) -> bool {
        mean.iter().any(|v| !v.is_finite())
            || covariance.iter().any(|v| !v.is_finite())
            || covariance.diag().iter().any(|&v| v < 0.0)
    }
}

fn invert_4x4(m: &Array2<f64>) -> Option<Array2<f64>> {
    let mut nm = nalgebra::Matrix4::zeros();
    for i in 0..4 {
        for j in 0..4 {
            nm[(i, j)] = m[[i, j]];
        }
    }
    let inv = nm.try_inverse()?;
    let mut res = Array2::zeros((4, 4));
    for i in 0..4 {
        for j in 0..4 {
            res[[i, j]] = inv[(i, j)];
        }
    }
    Some(res)
}
