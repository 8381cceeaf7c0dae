use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::sync::watch;

use super::error::Error;
use super::types::{EdgeUpdate, JoinHandleResult, SharedGraph};

/// The single task allowed to mutate the shared graph.
pub struct Writer {
    graph: SharedGraph,
    receiver: Receiver<Vec<EdgeUpdate>>,
    shutdown: watch::Receiver<bool>,
}

impl Writer {
    pub fn new(
        graph: SharedGraph,
        receiver: Receiver<Vec<EdgeUpdate>>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            graph,
            receiver,
            shutdown,
        }
    }

    /// Run the writer asynchronously.
    ///
    /// Applies each received batch under one write lock, released right after the
    /// batch. Exits when the channel closes or shutdown is signalled.
    pub async fn process_updates(mut self) -> Result<(), Error> {
        tracing::info!("Writer ready.");

        loop {
            select! {
                updates = self.receiver.recv() => {
                    match updates {
                        Some(updates) => {
                            let count = updates.len();
                            let mut graph_guard = self.graph.write().await;
                            for update in updates {
                                update.apply(&mut *graph_guard);
                            }
                            tracing::debug!(
                                count,
                                vertices = graph_guard.vertex_count(),
                                edges = graph_guard.edge_count(),
                                "Writer applied batch"
                            );
                        }
                        None => {
                            tracing::info!("Receiver closed, shutting down writer.");
                            break;
                        }
                    }
                }

                _ = self.shutdown.changed() => {
                    tracing::info!("Shutdown signal received, stopping writer.");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Spawns the Writer task onto the Tokio runtime.
    pub fn spawn_task(self) -> JoinHandleResult {
        tokio::spawn(self.process_updates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_engine_core::GraphStore;
    use std::sync::Arc;
    use tokio::sync::{RwLock, mpsc};

    fn put(from: &str, to: &str, weight: i64) -> EdgeUpdate {
        EdgeUpdate::Put {
            from: from.to_string(),
            to: to.to_string(),
            weight,
        }
    }

    #[tokio::test]
    async fn test_applies_batches_until_channel_closes() {
        let graph: SharedGraph = Arc::new(RwLock::new(GraphStore::new()));
        let (tx, rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = Writer::new(graph.clone(), rx, shutdown_rx).spawn_task();

        tx.send(vec![put("a", "b", 1), put("b", "c", 2)]).await.unwrap();
        tx.send(vec![put("a", "b", 5)]).await.unwrap();
        drop(tx);

        handle.await.unwrap().unwrap();

        let graph = graph.read().await;
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(
            graph.edge(&"a".to_string(), &"b".to_string()).map(|e| e.weight),
            Some(5)
        );
    }

    #[tokio::test]
    async fn test_stops_on_shutdown_signal() {
        let graph: SharedGraph = Arc::new(RwLock::new(GraphStore::new()));
        let (_tx, rx) = mpsc::channel::<Vec<EdgeUpdate>>(4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = Writer::new(graph, rx, shutdown_rx).spawn_task();
        shutdown_tx.send(true).unwrap();

        handle.await.unwrap().unwrap();
    }
}
