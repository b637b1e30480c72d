/// Track state enumeration for object tracking lifecycle.
///
/// Deleted tracks are dropped from the tracker rather than kept in a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Newly created or recently re-acquired, not yet confirmed
    #[default]
    Tentative,
    /// Matched for at least `min_hits` consecutive frames
    Confirmed,
    /// Missed its detection in the current frame, aging toward eviction
    Lost,
}
