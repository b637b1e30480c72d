//! Integration module for connecting object detection backends and flat
//! record buffers with the SORT tracker.

mod builder;
mod codec;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use codec::{RECORD_LEN, decode_records, encode_records};
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::{PipelineError, TrackerPipeline};
