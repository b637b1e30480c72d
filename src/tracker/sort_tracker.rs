//! Main SORT algorithm implementation.

use std::collections::BTreeMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::tracker::bounds::{FrameBounds, NonNegativeOrigin};
use crate::tracker::hungarian::HungarianSolver;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::kalman_track::KalmanTrack;
use crate::tracker::matching::{self, AssignmentResult, AssignmentSolver, Detection};
use crate::tracker::rect::Rect;

/// Configuration for the SortTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frames a track may go unmatched before it is evicted
    pub max_age: u32,
    /// Consecutive matches before a track is reported outside the
    /// startup grace period
    pub min_hits: u32,
    /// Minimum IoU for a solver pairing to count as a match
    pub iou_threshold: f32,
    /// Return the raw detections on the bootstrap frame of a session
    /// instead of the newly created tracks
    pub first_frame_passthrough: bool,
    /// Treat an empty live set at the start of a frame as a new session
    pub reset_when_empty: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 1,
            min_hits: 3,
            iou_threshold: 0.3,
            first_frame_passthrough: true,
            reset_when_empty: false,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.iou_threshold.is_finite() || !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(TrackerError::InvalidConfig(format!(
                "iou_threshold must lie in [0, 1], got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}

/// One reported object of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Track id offset by one; 0 means the record carries no track id
    pub track_id: u64,
    pub confidence: f32,
    pub class_id: i32,
    pub rect: Rect,
}

impl TrackedObject {
    /// Wrap a raw detection that has not been assigned a track.
    pub fn from_detection(detection: &Detection) -> Self {
        Self {
            track_id: 0,
            confidence: detection.confidence,
            class_id: detection.class_id,
            rect: detection.rect,
        }
    }

    pub fn from_track(track: &KalmanTrack) -> Self {
        Self {
            track_id: track.id() + 1,
            confidence: track.confidence(),
            class_id: track.class_id(),
            rect: track.rect(),
        }
    }

    pub fn detection(&self) -> Detection {
        Detection::new(self.confidence, self.class_id, self.rect)
    }
}

/// Tracking session: the live tracks of one video stream plus its frame and
/// id counters.
///
/// Each stream needs its own instance; a frame step runs to completion
/// before the next one starts.
pub struct SortTracker {
    tracks: BTreeMap<u64, KalmanTrack>,
    frame_count: u32,
    next_id: u64,
    fresh_session: bool,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
    solver: Box<dyn AssignmentSolver + Send + Sync>,
    bounds: Box<dyn FrameBounds + Send + Sync>,
}

impl Default for SortTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl SortTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: BTreeMap::new(),
            frame_count: 0,
            next_id: 0,
            fresh_session: true,
            config,
            kalman_filter: KalmanFilter::default(),
            solver: Box::new(HungarianSolver),
            bounds: Box::new(NonNegativeOrigin),
        }
    }

    /// Like [`SortTracker::new`], rejecting out-of-range configuration.
    pub fn try_new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn with_solver<S>(mut self, solver: S) -> Self
    where
        S: AssignmentSolver + Send + Sync + 'static,
    {
        self.solver = Box::new(solver);
        self
    }

    pub fn with_bounds<B>(mut self, bounds: B) -> Self
    where
        B: FrameBounds + Send + Sync + 'static,
    {
        self.bounds = Box::new(bounds);
        self
    }

    pub fn with_kalman_filter(mut self, kalman_filter: KalmanFilter) -> Self {
        self.kalman_filter = kalman_filter;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Frames processed since construction. Not cleared by [`SortTracker::reset`].
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_fresh_session(&self) -> bool {
        self.fresh_session
    }

    /// Live tracks in ascending id order.
    pub fn tracks(&self) -> impl Iterator<Item = &KalmanTrack> {
        self.tracks.values()
    }

    /// Drop every live track and restart ids at 0. The next frame with
    /// detections bootstraps the new session.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.next_id = 0;
        self.fresh_session = true;
    }

    /// Signal the start of a new video sequence.
    pub fn begin_session(&mut self) {
        self.reset();
    }

    /// Run one frame: predict, associate, update, spawn, report, evict.
    ///
    /// The detection batch is validated first; on error nothing changes.
    pub fn update(&mut self, detections: &[Detection]) -> Result<Vec<TrackedObject>> {
        for (index, detection) in detections.iter().enumerate() {
            detection.validate(index)?;
        }

        if self.config.reset_when_empty && self.tracks.is_empty() && !self.fresh_session {
            debug!("frame {}: no live tracks, restarting session", self.frame_count + 1);
            self.reset();
        }

        self.frame_count += 1;

        if self.fresh_session {
            return Ok(self.bootstrap(detections));
        }

        // Step 1: Predict and drop tracks that left the observable region
        let mut track_ids = Vec::with_capacity(self.tracks.len());
        let mut track_rects = Vec::with_capacity(self.tracks.len());
        let kalman_filter = &self.kalman_filter;
        let bounds = &self.bounds;
        self.tracks.retain(|&id, track| {
            let rect = track.predict(kalman_filter);
            if bounds.contains(&rect) {
                track_ids.push(id);
                track_rects.push(rect);
                true
            } else {
                debug!("track {id} left the frame at {rect:?}");
                false
            }
        });

        // Step 2: Associate predictions with detections
        let det_rects: Vec<Rect> = detections.iter().map(|d| d.rect).collect();
        let dists = matching::iou_distance(&track_rects, &det_rects);
        trace!("frame {}: cost matrix {:?}", self.frame_count, dists.dim());

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::linear_assignment(&dists, &*self.solver, self.config.iou_threshold);

        // Step 3: Update matched tracks
        for &(itrack, idet) in &matches {
            if let Some(track) = self.tracks.get_mut(&track_ids[itrack]) {
                track.update(&detections[idet], &self.kalman_filter);
            }
        }

        // Step 4: Init new tracks
        for &idet in &unmatched_detections {
            self.spawn(&detections[idet]);
        }

        // Step 5: Report, then evict
        let output = self.confirmed_tracks();
        let evicted = self.evict();

        debug!(
            "frame {}: {} detections, {} matched, {} unmatched tracks, {} spawned, {} evicted, {} reported",
            self.frame_count,
            detections.len(),
            matches.len(),
            unmatched_tracks.len(),
            unmatched_detections.len(),
            evicted,
            output.len()
        );

        Ok(output)
    }

    fn bootstrap(&mut self, detections: &[Detection]) -> Vec<TrackedObject> {
        for detection in detections {
            self.spawn(detection);
        }
        if !detections.is_empty() {
            self.fresh_session = false;
        }
        debug!(
            "frame {}: session started with {} tracks",
            self.frame_count,
            self.tracks.len()
        );

        if self.config.first_frame_passthrough {
            detections.iter().map(TrackedObject::from_detection).collect()
        } else {
            self.confirmed_tracks()
        }
    }

    fn spawn(&mut self, detection: &Detection) {
        let id = self.next_id;
        self.next_id += 1;
        self.tracks
            .insert(id, KalmanTrack::new(id, detection, &self.kalman_filter));
    }

    /// Tracks updated this frame that are confirmed, or any updated track
    /// while the session is still within its first `min_hits` frames.
    fn confirmed_tracks(&self) -> Vec<TrackedObject> {
        let min_hits = self.config.min_hits;
        let in_grace_period = self.frame_count <= min_hits;
        self.tracks
            .values()
            .filter(|t| t.time_since_update() < 1 && (t.hit_streak() >= min_hits || in_grace_period))
            .map(TrackedObject::from_track)
            .collect()
    }

    fn evict(&mut self) -> usize {
        let before = self.tracks.len();
        let max_age = self.config.max_age;
        self.tracks.retain(|_, t| t.time_since_update() <= max_age);
        before - self.tracks.len()
    }
}
