use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A path extension would pass through a vertex it has already visited.
    ///
    /// `path` renders the offending chain, including the edge that closes the cycle.
    #[error("Cycle detected while extending path: {path}")]
    CycleDetected { path: String },

    /// The summed weight of a path does not fit in `i64`.
    #[error("Path weight overflows i64: {path}")]
    WeightOverflow { path: String },
}
