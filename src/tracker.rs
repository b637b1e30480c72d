mod bounds;
mod hungarian;
mod kalman_filter;
mod kalman_track;
mod matching;
mod rect;
mod sort_tracker;
mod track_state;

pub use bounds::{FrameBounds, FrameRect, NonNegativeOrigin};
pub use hungarian::HungarianSolver;
pub use kalman_filter::KalmanFilter;
pub use kalman_track::KalmanTrack;
pub use matching::{
    AssignmentResult, AssignmentSolver, Detection, LapjvSolver, iou_distance, linear_assignment,
};
pub use rect::Rect;
pub use sort_tracker::{SortTracker, TrackedObject, TrackerConfig};
pub use track_state::TrackState;
