use tokio::sync::mpsc::Sender;

use super::types::{EdgeUpdate, JoinHandleResult, UpdateStreamer};

pub struct Producer<S: UpdateStreamer> {
    streamer: S,
}

impl<S> Producer<S>
where
    S: UpdateStreamer,
{
    pub fn new(streamer: S) -> Self {
        Producer { streamer }
    }

    /// Spawns the streamer; the channel closes when it finishes.
    pub fn spawn(self, sender: Sender<Vec<EdgeUpdate>>) -> JoinHandleResult {
        tracing::info!("Producer ready.");
        tokio::spawn(async move { self.streamer.run_stream(sender).await })
    }
}
