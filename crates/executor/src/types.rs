use std::sync::Arc;
use tokio::sync::{RwLock, mpsc::Sender};
use tokio::task::JoinHandle;

use super::error::Error;
use path_engine_core::GraphStore;

/// The store shared between the single writer and the searcher.
///
/// The lock is the external synchronization the store itself does not provide.
pub type SharedGraph = Arc<RwLock<GraphStore<String>>>;

pub type JoinHandleResult = JoinHandle<Result<(), Error>>;

/// A trait defining the contract for any source that generates and streams updates
/// into the main processing pipeline.
///
/// The trait bounds (`Send`, `Sync`, `'static`) are mandatory to ensure the
/// implementation can be safely executed by the multi-threaded asynchronous runtime (Tokio).
#[async_trait::async_trait]
pub trait UpdateStreamer: Send + Sync + 'static {
    async fn run_stream(self, sender: Sender<Vec<EdgeUpdate>>) -> Result<(), Error>;
}

/// One mutation of the shared graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeUpdate {
    Put { from: String, to: String, weight: i64 },
    RemoveEdge { from: String, to: String },
    RemovePoint(String),
}

impl EdgeUpdate {
    pub fn apply(self, graph: &mut GraphStore<String>) {
        match self {
            EdgeUpdate::Put { from, to, weight } => graph.put_edge(from, to, weight),
            EdgeUpdate::RemoveEdge { from, to } => {
                graph.remove_edge(&from, &to);
            }
            EdgeUpdate::RemovePoint(vertex) => {
                graph.remove_point(&vertex);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Simulator,
    Csv(String),
}
