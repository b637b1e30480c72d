//! SORT (Simple Online and Realtime Tracking) for per-frame object detections.
//!
//! The [`tracker`] module holds the tracking core: a Kalman box model per
//! object, an IoU cost matrix, a minimum-cost assignment solver and the
//! [`SortTracker`] that ties them together frame by frame. The
//! [`integration`] module connects external detectors and flat record
//! buffers to the tracker.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{Result, TrackerError};
pub use integration::{
    DetectionBuilder, DetectionSource, IntoDetections, PipelineError, TrackerPipeline,
    decode_records, encode_records,
};
pub use tracker::{
    AssignmentSolver, Detection, FrameBounds, FrameRect, HungarianSolver, KalmanTrack,
    LapjvSolver, NonNegativeOrigin, Rect, SortTracker, TrackState, TrackedObject, TrackerConfig,
};
