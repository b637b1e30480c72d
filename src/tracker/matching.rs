//! Matching utilities for multi-object tracking.

use log::warn;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::tracker::hungarian::HungarianSolver;
use crate::tracker::rect::Rect;

/// Detection input for the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Detection confidence score
    pub confidence: f32,
    /// Detector class label
    pub class_id: i32,
    /// Bounding box in TLWH format
    pub rect: Rect,
}

impl Detection {
    pub fn new(confidence: f32, class_id: i32, rect: Rect) -> Self {
        Self {
            confidence,
            class_id,
            rect,
        }
    }

    /// Create a detection from TLBR corners.
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class_id: i32) -> Self {
        Self::new(confidence, class_id, Rect::from_tlbr(x1, y1, x2, y2))
    }

    /// Reject boxes the tracker cannot represent: non-finite values, a
    /// negative width/height, or extents whose corner or area overflow.
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |reason: &str| TrackerError::InvalidInput {
            index,
            reason: reason.to_string(),
        };
        if !self.confidence.is_finite() || !self.rect.is_finite() {
            return Err(invalid("non-finite value"));
        }
        if self.rect.width < 0.0 || self.rect.height < 0.0 {
            return Err(invalid("negative box dimensions"));
        }
        let [_, _, x2, y2] = self.rect.to_tlbr();
        if !x2.is_finite() || !y2.is_finite() || !self.rect.area().is_finite() {
            return Err(invalid("box extent overflows"));
        }
        Ok(())
    }
}

/// Compute IoU distance matrix between tracks and detections.
///
/// Entry `(i, j)` is `1 - IoU(track_i, det_j)`, clamped to `[0, 1]`.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f32> {
    let mut dists = Array2::zeros((track_boxes.len(), det_boxes.len()));
    for (i, t) in track_boxes.iter().enumerate() {
        for (j, d) in det_boxes.iter().enumerate() {
            let iou = t.iou(d);
            dists[[i, j]] = if iou.is_finite() {
                (1.0 - iou).clamp(0.0, 1.0)
            } else {
                1.0
            };
        }
    }
    dists
}

/// Minimum-cost bipartite matching over a rows x cols cost matrix.
///
/// The result has one entry per row: the matched column, or `None` when the
/// row is left unassigned (only possible when rows outnumber columns). No
/// column is used twice.
pub trait AssignmentSolver {
    fn solve(&self, cost_matrix: &Array2<f32>) -> Vec<Option<usize>>;
}

/// Jonker-Volgenant assignment through the `lapjv` crate.
///
/// Rectangular inputs are padded to a square with zero-cost dummy cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct LapjvSolver;

impl AssignmentSolver for LapjvSolver {
    fn solve(&self, cost_matrix: &Array2<f32>) -> Vec<Option<usize>> {
        let (num_rows, num_cols) = cost_matrix.dim();
        if num_rows == 0 || num_cols == 0 {
            return vec![None; num_rows];
        }

        let size = num_rows.max(num_cols);
        let mut padded = Array2::<f64>::zeros((size, size));
        for i in 0..num_rows {
            for j in 0..num_cols {
                padded[[i, j]] = cost_matrix[[i, j]] as f64;
            }
        }

        match lapjv::lapjv(&padded) {
            Ok((row_to_col, _)) => row_to_col
                .into_iter()
                .take(num_rows)
                .map(|col| (col < num_cols).then_some(col))
                .collect(),
            Err(err) => {
                warn!("lapjv failed ({err:?}), falling back to Kuhn-Munkres");
                HungarianSolver.solve(cost_matrix)
            }
        }
    }
}

/// Outcome of one association round after the overlap gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// Accepted (track, detection) pairs
    pub matches: Vec<(usize, usize)>,
    /// Tracks left without an accepted detection, ascending
    pub unmatched_tracks: Vec<usize>,
    /// Detections left without an accepted track, ascending
    pub unmatched_detections: Vec<usize>,
}

/// Solve the assignment and demote pairs whose overlap falls below
/// `iou_threshold`: both sides of a demoted pair become unmatched.
pub fn linear_assignment(
    cost_matrix: &Array2<f32>,
    solver: &dyn AssignmentSolver,
    iou_threshold: f32,
) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    let assignment = solver.solve(cost_matrix);

    let mut matches = Vec::new();
    let mut unmatched_tracks = Vec::new();
    let mut unmatched_detections_mask = vec![true; num_cols];

    for (row_idx, col) in assignment.into_iter().enumerate().take(num_rows) {
        match col {
            Some(col_idx) if col_idx < num_cols => {
                if 1.0 - cost_matrix[[row_idx, col_idx]] < iou_threshold {
                    unmatched_tracks.push(row_idx);
                } else {
                    matches.push((row_idx, col_idx));
                    unmatched_detections_mask[col_idx] = false;
                }
            }
            _ => unmatched_tracks.push(row_idx),
        }
    }

    let unmatched_detections = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
