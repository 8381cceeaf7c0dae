use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::fs::File;
use tokio::sync::mpsc::Sender;

use super::error::Error;
use super::types::{EdgeUpdate, UpdateStreamer};

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOp {
    #[default]
    Put,
    RemoveEdge,
    RemovePoint,
}

// Helper struct for CSV parsing
#[derive(Debug, Deserialize, Default)]
pub struct CsvRecord {
    #[serde(default)]
    pub op: Option<UpdateOp>,

    #[serde(rename = "from")]
    pub from_node: String,

    #[serde(rename = "to", default)]
    pub to_node: Option<String>,

    #[serde(rename = "weight", default)]
    pub weight: Option<i64>,
}

impl CsvRecord {
    fn into_update(self, line: u64) -> Result<EdgeUpdate, Error> {
        let op = self.op.unwrap_or_default();
        let missing = |field: &str| Error::InvalidUpdate {
            line,
            reason: format!("{:?} requires a `{}` value", op, field),
        };

        match op {
            UpdateOp::Put => Ok(EdgeUpdate::Put {
                from: self.from_node,
                to: self.to_node.ok_or_else(|| missing("to"))?,
                weight: self.weight.ok_or_else(|| missing("weight"))?,
            }),
            UpdateOp::RemoveEdge => Ok(EdgeUpdate::RemoveEdge {
                from: self.from_node,
                to: self.to_node.ok_or_else(|| missing("to"))?,
            }),
            UpdateOp::RemovePoint => Ok(EdgeUpdate::RemovePoint(self.from_node)),
        }
    }
}

/// Streams graph updates read from a CSV file with header `op,from,to,weight`.
///
/// `op` may be omitted (defaults to `put`); `to` and `weight` may be blank where the
/// operation does not need them.
pub struct CsvStreamer {
    path: String,
    batch_size: usize,
}

impl CsvStreamer {
    pub fn new(path: String, batch_size: usize) -> Self {
        CsvStreamer { path, batch_size }
    }

    fn parse_csv_to_updates(&self) -> Result<Vec<EdgeUpdate>, Error> {
        let file = File::open(&self.path).map_err(|e| {
            tracing::error!(path = %self.path, error = %e, "Failed to read CSV file");
            Error::IoError(e)
        })?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(file);

        let headers = rdr.headers()?.clone();
        let mut updates = Vec::new();

        for result in rdr.records() {
            let raw = result?;
            let line = raw.position().map_or(0, |pos| pos.line());
            let record: CsvRecord = raw.deserialize(Some(&headers))?;
            updates.push(record.into_update(line)?);
        }
        Ok(updates)
    }
}

#[async_trait::async_trait]
impl UpdateStreamer for CsvStreamer {
    async fn run_stream(self, sender: Sender<Vec<EdgeUpdate>>) -> Result<(), Error> {
        let all_updates = self.parse_csv_to_updates()?;
        let total_updates = all_updates.len();
        let mut updates_sent = 0;

        tracing::info!(total_updates, "CsvStreamer: starting transfer");

        for chunk in all_updates.chunks(self.batch_size) {
            let batch: Vec<EdgeUpdate> = chunk.to_vec();
            if let Err(e) = sender.send(batch).await {
                tracing::warn!(
                    error = %e,
                    "CsvStreamer shutting down: writer receiver dropped during send"
                );
                return Err(Error::ChannelSendFailed);
            }

            updates_sent += chunk.len();
        }

        tracing::info!(updates_sent, "CsvStreamer: transfer complete");
        Ok(())
    }
}
