//! Flat `f32` record buffers, the layout used when detections cross a
//! language or process boundary.
//!
//! Each record is seven floats: `confidence, id, x, y, width, height, class`.
//! The id slot is ignored on input and carries the track id (0 for none) on
//! output.

use crate::error::{Result, TrackerError};
use crate::tracker::{Detection, Rect, SortTracker, TrackedObject};

pub const RECORD_LEN: usize = 7;

/// Decode a buffer of whole records into validated detections.
pub fn decode_records(records: &[f32]) -> Result<Vec<Detection>> {
    if records.len() % RECORD_LEN != 0 {
        return Err(TrackerError::MalformedRecords {
            len: records.len(),
            record_len: RECORD_LEN,
        });
    }

    records
        .chunks_exact(RECORD_LEN)
        .enumerate()
        .map(|(index, r)| {
            if !r[6].is_finite() {
                return Err(TrackerError::InvalidInput {
                    index,
                    reason: "non-finite class label".to_string(),
                });
            }
            let detection = Detection::new(r[0], r[6] as i32, Rect::new(r[2], r[3], r[4], r[5]));
            detection.validate(index)?;
            Ok(detection)
        })
        .collect()
}

pub fn encode_records(objects: &[TrackedObject]) -> Vec<f32> {
    let mut out = Vec::with_capacity(objects.len() * RECORD_LEN);
    for o in objects {
        out.extend_from_slice(&[
            o.confidence,
            o.track_id as f32,
            o.rect.x,
            o.rect.y,
            o.rect.width,
            o.rect.height,
            o.class_id as f32,
        ]);
    }
    out
}

impl SortTracker {
    /// Run one frame on a flat record buffer and return the reported
    /// objects in the same layout.
    pub fn update_flat(&mut self, records: &[f32]) -> Result<Vec<f32>> {
        let detections = decode_records(records)?;
        let objects = self.update(&detections)?;
        Ok(encode_records(&objects))
    }
}
