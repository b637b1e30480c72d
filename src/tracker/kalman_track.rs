//! Single object track driven by a Kalman box model.

use log::warn;
use ndarray::{Array1, Array2};

use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Single object track.
#[derive(Debug, Clone)]
pub struct KalmanTrack {
    /// Session-unique track identifier, starting at 0
    id: u64,
    /// Confidence of the most recent matched detection
    confidence: f32,
    /// Class of the most recent matched detection
    class_id: i32,
    /// Number of predict steps since creation
    age: u32,
    /// Total number of matched detections
    hits: u32,
    /// Consecutive frames matched without a gap
    hit_streak: u32,
    /// Frames since the last matched detection
    time_since_update: u32,
    /// Kalman filter state mean (7-dim XYSR + rates)
    mean: Array1<f64>,
    /// Kalman filter state covariance (7x7)
    covariance: Array2<f64>,
}

impl KalmanTrack {
    /// Create a new track from an unmatched detection.
    pub fn new(id: u64, detection: &Detection, kalman_filter: &KalmanFilter) -> Self {
        let (mean, covariance) = kalman_filter.initiate(to_measurement(&detection.rect));
        let mut track = Self {
            id,
            confidence: detection.confidence,
            class_id: detection.class_id,
            age: 0,
            hits: 0,
            hit_streak: 0,
            time_since_update: 0,
            mean,
            covariance,
        };
        track.recover_if_degenerate(kalman_filter);
        track
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn class_id(&self) -> i32 {
        self.class_id
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn hit_streak(&self) -> u32 {
        self.hit_streak
    }

    pub fn time_since_update(&self) -> u32 {
        self.time_since_update
    }

    /// Lifecycle view for a given confirmation threshold.
    pub fn state(&self, min_hits: u32) -> TrackState {
        if self.time_since_update > 0 {
            TrackState::Lost
        } else if self.hit_streak >= min_hits {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        }
    }

    /// Current best-estimate box in TLWH format, never negative in size.
    pub fn rect(&self) -> Rect {
        Rect::from_xysr(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    /// Advance the state by one frame and return the predicted box.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) -> Rect {
        // Keep the predicted area from going negative
        if self.mean[2] + self.mean[6] <= 0.0 {
            self.mean[6] = 0.0;
        }

        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.recover_if_degenerate(kalman_filter);

        self.age += 1;
        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;

        self.rect()
    }

    /// Correct the state with a matched detection.
    pub fn update(&mut self, detection: &Detection, kalman_filter: &KalmanFilter) {
        self.time_since_update = 0;
        self.hits += 1;
        self.hit_streak += 1;
        self.confidence = detection.confidence;
        self.class_id = detection.class_id;

        let measurement = to_measurement(&detection.rect);
        match kalman_filter.update(&self.mean, &self.covariance, measurement) {
            Some((mean, covariance)) => {
                self.mean = mean;
                self.covariance = covariance;
                self.recover_if_degenerate(kalman_filter);
            }
            None => {
                warn!(
                    "track {}: singular innovation covariance, re-initialising from measurement",
                    self.id
                );
                let (mean, covariance) = kalman_filter.initiate(measurement);
                self.mean = mean;
                self.covariance = covariance;
            }
        }
    }

    fn recover_if_degenerate(&mut self, kalman_filter: &KalmanFilter) {
        if !KalmanFilter::is_degenerate(&self.mean, &self.covariance) {
            return;
        }
        warn!("track {}: filter state diverged, resetting uncertainty", self.id);
        self.covariance = kalman_filter.initial_covariance();
        for v in self.mean.iter_mut() {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
        self.mean[2] = self.mean[2].max(0.0);
    }
}

/// XYSR measurement, computed in f64 so the area of a large box stays finite.
fn to_measurement(rect: &Rect) -> [f64; 4] {
    let (x, y) = (rect.x as f64, rect.y as f64);
    let (w, h) = (rect.width as f64, rect.height as f64);
    let ratio = if h > 0.0 { w / h } else { 0.0 };
    [x + w / 2.0, y + h / 2.0, w * h, ratio]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn detection(x: f32, y: f32, w: f32, h: f32) -> Detection {
        Detection::new(0.9, 1, Rect::new(x, y, w, h))
    }

    #[test]
    fn test_new_track_reproduces_detection() {
        let kf = KalmanFilter::new();
        let track = KalmanTrack::new(4, &detection(10.0, 10.0, 20.0, 40.0), &kf);
        let rect = track.rect();
        assert_abs_diff_eq!(rect.x, 10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(rect.y, 10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(rect.width, 20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(rect.height, 40.0, epsilon = 1e-4);
        assert_eq!(track.id(), 4);
        assert_eq!(track.state(3), TrackState::Tentative);
    }

    #[test]
    fn test_predict_and_update_counters() {
        let kf = KalmanFilter::new();
        let mut track = KalmanTrack::new(0, &detection(10.0, 10.0, 20.0, 20.0), &kf);

        track.predict(&kf);
        assert_eq!(track.age(), 1);
        assert_eq!(track.time_since_update(), 1);
        assert_eq!(track.state(3), TrackState::Lost);

        track.update(&Detection::new(0.5, 7, Rect::new(12.0, 10.0, 20.0, 20.0)), &kf);
        assert_eq!(track.time_since_update(), 0);
        assert_eq!(track.hit_streak(), 1);
        assert_eq!(track.hits(), 1);
        assert_eq!(track.confidence(), 0.5);
        assert_eq!(track.class_id(), 7);
        assert!(track.rect().x > 10.0 && track.rect().x < 12.0);
    }

    #[test]
    fn test_missed_frame_resets_streak() {
        let kf = KalmanFilter::new();
        let det = detection(10.0, 10.0, 20.0, 20.0);
        let mut track = KalmanTrack::new(0, &det, &kf);

        for _ in 0..3 {
            track.predict(&kf);
            track.update(&det, &kf);
        }
        assert_eq!(track.hit_streak(), 3);
        assert_eq!(track.state(3), TrackState::Confirmed);

        // one miss keeps the streak until the next predict
        track.predict(&kf);
        assert_eq!(track.hit_streak(), 3);
        track.predict(&kf);
        assert_eq!(track.hit_streak(), 0);
        assert_eq!(track.time_since_update(), 2);
        assert_eq!(track.hits(), 3);
    }

    #[test]
    fn test_constant_velocity_prediction() {
        let kf = KalmanFilter::new();
        let mut track = KalmanTrack::new(0, &detection(0.0, 10.0, 20.0, 20.0), &kf);

        for step in 1..=10 {
            track.predict(&kf);
            track.update(&detection(step as f32 * 5.0, 10.0, 20.0, 20.0), &kf);
        }
        let predicted = track.predict(&kf);
        // the filter has picked up the +5 px/frame motion
        assert!(predicted.x > 50.0, "predicted x = {}", predicted.x);
        assert_abs_diff_eq!(predicted.width, 20.0, epsilon = 0.5);
    }

    #[test]
    fn test_shrinking_box_never_goes_negative() {
        let kf = KalmanFilter::new();
        let mut track = KalmanTrack::new(0, &detection(50.0, 50.0, 40.0, 40.0), &kf);
        for size in [30.0, 20.0, 10.0, 2.0] {
            track.predict(&kf);
            track.update(&detection(50.0, 50.0, size, size), &kf);
        }
        for _ in 0..20 {
            let rect = track.predict(&kf);
            assert!(rect.width >= 0.0 && rect.height >= 0.0);
            assert!(rect.is_finite());
        }
    }

    #[test]
    fn test_measurement_of_large_box_stays_finite() {
        let rect = Rect::new(10.0, 10.0, 2e19, 2e19);
        let z = to_measurement(&rect);
        assert!(z.iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(z[2], 4e38, epsilon = 1e25);
        assert_abs_diff_eq!(z[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_update_reinitialises_from_measurement() {
        let kf = KalmanFilter::new().with_noise(0.0, 0.0, 0.0);
        let mut track = KalmanTrack::new(2, &detection(10.0, 10.0, 20.0, 20.0), &kf);

        track.predict(&kf);
        track.update(&Detection::new(0.6, 3, Rect::new(12.0, 14.0, 16.0, 18.0)), &kf);

        let rect = track.rect();
        assert_abs_diff_eq!(rect.x, 12.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rect.y, 14.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rect.width, 16.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rect.height, 18.0, epsilon = 1e-3);
        assert_eq!(track.mean[4], 0.0);
        assert_eq!(track.covariance, kf.initial_covariance());

        assert_eq!(track.hits(), 1);
        assert_eq!(track.hit_streak(), 1);
        assert_eq!(track.time_since_update(), 0);
        assert_eq!(track.confidence(), 0.6);
        assert_eq!(track.class_id(), 3);
    }

    #[test]
    fn test_non_finite_state_is_recovered() {
        let kf = KalmanFilter::new();
        let mut track = KalmanTrack::new(0, &detection(10.0, 10.0, 20.0, 20.0), &kf);
        track.mean[0] = f64::NAN;
        track.mean[6] = f64::INFINITY;

        let rect = track.predict(&kf);
        assert!(rect.is_finite());
        assert!(track.mean.iter().all(|v| v.is_finite()));
        assert_eq!(track.covariance, kf.initial_covariance());
        assert_eq!(track.age(), 1);
    }

    #[test]
    fn test_negative_variance_is_recovered() {
        let kf = KalmanFilter::new();
        let mut track = KalmanTrack::new(0, &detection(10.0, 10.0, 20.0, 20.0), &kf);
        track.covariance[[2, 2]] = -100.0;

        track.predict(&kf);
        assert_eq!(track.covariance, kf.initial_covariance());
        assert_abs_diff_eq!(track.mean[2], 400.0, epsilon = 1e-9);
    }
}
