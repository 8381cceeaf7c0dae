use super::csr::GraphCSR;
use common::{
    error::Error,
    types::{BestPathMap, Vertex},
};

/// Trait for single-source shortest-path solvers over a CSR snapshot.
pub trait GraphSolver {
    /// Computes the best path from `start` to every vertex reachable from it.
    ///
    /// `start` itself is never a key of the result. A `start` that is unknown to the
    /// graph or has no outgoing edges yields an empty map.
    ///
    /// Returns `Err(Error::CycleDetected)` if a path extension would revisit one of
    /// its own vertices, or `Err(Error::WeightOverflow)` if a best path does not fit
    /// in `i64`. No partial result is returned in either case.
    fn best_path_map<T: Vertex>(
        &self,
        graph: &GraphCSR<T>,
        start: &T,
    ) -> Result<BestPathMap<T>, Error>;
}
