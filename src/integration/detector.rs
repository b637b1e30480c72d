//! Trait for object detection backends feeding the tracker.

use crate::tracker::{Detection, Rect};

/// Source of the per-frame detection batch handed to [`SortTracker::update`].
///
/// A source may run a model on the frame or replay detections computed
/// offline; the tracker only sees the resulting `Vec<Detection>`.
///
/// # Example
///
/// ```
/// use sort_track::{Detection, DetectionSource, IntoDetections};
///
/// /// Replays one precomputed batch per frame.
/// struct Replay {
///     frames: std::vec::IntoIter<Vec<(f32, i32, [f32; 4])>>,
/// }
///
/// impl DetectionSource for Replay {
///     type Error = &'static str;
///
///     fn detect(&mut self, _frame: &[u8], _width: u32, _height: u32) -> Result<Vec<Detection>, Self::Error> {
///         self.frames.next().map(IntoDetections::into_detections).ok_or("end of stream")
///     }
/// }
///
/// let mut source = Replay { frames: vec![vec![(0.9, 0, [10.0, 10.0, 20.0, 40.0])]].into_iter() };
/// assert_eq!(source.detect(&[], 640, 480).unwrap().len(), 1);
/// assert!(source.detect(&[], 640, 480).is_err());
/// ```
///
/// [`SortTracker::update`]: crate::SortTracker::update
pub trait DetectionSource {
    type Error;

    /// Produce the detections of one frame. `frame` holds the encoded
    /// image, whose layout is up to the implementation.
    fn detect(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// `(confidence, class_id, [x, y, width, height])` tuples, the shape most
/// detector post-processing steps produce.
impl IntoDetections for Vec<(f32, i32, [f32; 4])> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter()
            .map(|(confidence, class_id, [x, y, w, h])| {
                Detection::new(confidence, class_id, Rect::new(x, y, w, h))
            })
            .collect()
    }
}
