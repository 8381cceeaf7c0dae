use tokio::select;
use tokio::sync::watch;
use tokio::time::{self, Duration};

use super::{error::Error, types::SharedGraph};
use common::types::BestPathMap;
use path_engine_core::{GraphCSR, traits::GraphSolver};

/// Periodically computes best paths from a fixed start vertex on a snapshot of the
/// shared graph.
pub struct PathSearcher<S> {
    solver: S,
    graph: SharedGraph,
    start_vertex: String,
    interval_ms: u64,
    shutdown: watch::Receiver<bool>,
}

impl<S> PathSearcher<S>
where
    S: GraphSolver,
{
    pub fn new(
        graph: SharedGraph,
        solver: S,
        start_vertex: String,
        interval_ms: u64,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        PathSearcher {
            solver,
            graph,
            start_vertex,
            interval_ms,
            shutdown,
        }
    }

    /// Runs one search.
    ///
    /// The read lock is held only while the CSR snapshot is taken. Returns `Ok(None)`
    /// when the start vertex is not in the graph yet.
    pub async fn search_once(&self) -> Result<Option<BestPathMap<String>>, Error> {
        let snapshot = {
            let graph_guard = self.graph.read().await;
            if !graph_guard.contains_point(&self.start_vertex) {
                return Ok(None);
            }
            GraphCSR::from_store(&*graph_guard)
        };

        let paths = self.solver.best_path_map(&snapshot, &self.start_vertex)?;
        Ok(Some(paths))
    }

    /// Logs the outcome of one search. Cycle errors are reported, not propagated.
    pub async fn search_and_report(&self) {
        match self.search_once().await {
            Ok(Some(paths)) => {
                let lightest = paths.values().min_by_key(|path| path.weight());
                tracing::info!(
                    start = %self.start_vertex,
                    reachable = paths.len(),
                    lightest = lightest.map(|path| path.to_string()).unwrap_or_default(),
                    "Search complete"
                );
            }
            Ok(None) => {
                tracing::info!(
                    start = %self.start_vertex,
                    "Searcher: start vertex not in graph yet. Skipping."
                );
            }
            Err(e) => {
                tracing::warn!(
                    start = %self.start_vertex,
                    error = %e,
                    "Searcher: graph cannot be processed from this start vertex. Continuing."
                );
            }
        }
    }

    pub async fn run(mut self) -> Result<(), Error> {
        tracing::info!("Searcher ready.");

        let mut interval = time::interval(Duration::from_millis(self.interval_ms));

        // The first tick occurs immediately, but we skip it to wait the full duration
        interval.tick().await;

        loop {
            select! {
                _ = interval.tick() => self.search_and_report().await,
                _ = self.shutdown.changed() => {
                    tracing::info!("Shutdown signal received, stopping searcher.");
                    break;
                }
            }
        }

        Ok(())
    }
}
