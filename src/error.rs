use thiserror::Error;

/// Errors surfaced by a tracking frame step.
///
/// A frame that fails validation is rejected as a whole: no track, counter
/// or id is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("invalid detection at index {index}: {reason}")]
    InvalidInput { index: usize, reason: String },

    #[error("record buffer of length {len} is not a multiple of {record_len}")]
    MalformedRecords { len: usize, record_len: usize },

    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
