use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::Sender;
use tokio::time::{self, Duration};

use super::config::SimulatorConfig;
use super::error::Error;
use super::types::{EdgeUpdate, UpdateStreamer};

/// Produces synthetic graph updates for simulation purposes.
///
/// Vertices are named `v0..v{total_nodes}`. Each tick emits `batch_size` updates: mostly
/// `Put` with a weight drawn from `min_weight..=max_weight`, occasionally a `RemoveEdge`.
/// A configured `seed` makes the stream reproducible.
pub struct SimulatorStreamer {
    config: SimulatorConfig,
}

impl SimulatorStreamer {
    pub fn new(config: SimulatorConfig) -> Self {
        SimulatorStreamer { config }
    }

    fn generate_batch(&self, rng: &mut SmallRng) -> Vec<EdgeUpdate> {
        let node_range = 0..self.config.total_nodes;
        let weight_range = self.config.min_weight..=self.config.max_weight;

        (0..self.config.batch_size)
            .map(|_| {
                let from = format!("v{}", rng.random_range(node_range.clone()));
                let to = format!("v{}", rng.random_range(node_range.clone()));

                if rng.random_range(0..1000) < self.config.removal_per_mille {
                    EdgeUpdate::RemoveEdge { from, to }
                } else {
                    let weight = rng.random_range(weight_range.clone());
                    EdgeUpdate::Put { from, to, weight }
                }
            })
            .collect()
    }
}

#[async_trait]
impl UpdateStreamer for SimulatorStreamer {
    /// Runs the simulation asynchronously.
    ///
    /// Backpressure is handled naturally via awaiting on `sender.send()`. Exits
    /// once the receiver is dropped.
    async fn run_stream(self, sender: Sender<Vec<EdgeUpdate>>) -> Result<(), Error> {
        let mut interval = time::interval(Duration::from_millis(self.config.interval_ms));

        let mut rng: SmallRng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        loop {
            interval.tick().await;

            let updates = self.generate_batch(&mut rng);

            tracing::debug!(count = updates.len(), "Simulator sent updates");
            if sender.send(updates).await.is_err() {
                tracing::info!("Simulator shutting down: writer receiver dropped.");
                return Err(Error::ChannelSendFailed);
            }
        }
    }
}
