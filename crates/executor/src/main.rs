pub mod config;
pub mod csv_streamer;
pub mod error;
pub mod producer;
pub mod searcher;
pub mod simulator;
pub mod types;
pub mod writer;

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, mpsc::Sender, watch};
use tracing_subscriber::EnvFilter;

use csv_streamer::CsvStreamer;
use path_engine_core::{GraphStore, SPFASolver};
use producer::Producer;
use searcher::PathSearcher;
use simulator::SimulatorStreamer;
use types::{DataSource, EdgeUpdate, JoinHandleResult, SharedGraph};
use writer::Writer;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(source) = parse_args() else {
        return ExitCode::FAILURE;
    };

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load config");
            return ExitCode::FAILURE;
        }
    };

    let shared_graph: SharedGraph = Arc::new(RwLock::new(GraphStore::new()));
    let (sender, receiver) = mpsc::channel::<Vec<EdgeUpdate>>(config.pipeline.channel_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let producer_handle = spawn_producer(&source, sender, &config);
    let writer_handle = Writer::new(shared_graph.clone(), receiver, shutdown_rx.clone()).spawn_task();
    let searcher = PathSearcher::new(
        shared_graph.clone(),
        SPFASolver::new(),
        config.searcher.start_vertex.clone(),
        config.searcher.interval_ms,
        shutdown_rx,
    );

    match source {
        DataSource::Csv(_) => {
            // Drain the file, then report on the final graph.
            let produced = log_task_result("producer", producer_handle.await);
            let written = log_task_result("writer", writer_handle.await);
            if !(produced && written) {
                tracing::error!("CSV ingestion failed, skipping search.");
                return ExitCode::FAILURE;
            }
            searcher.search_and_report().await;
        }
        DataSource::Simulator => {
            let searcher_handle = tokio::spawn(searcher.run());

            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
            tracing::info!("Ctrl-C received, shutting down pipeline.");
            let _ = shutdown_tx.send(true);

            producer_handle.abort();
            let written = log_task_result("writer", writer_handle.await);
            let searched = log_task_result("searcher", searcher_handle.await);
            if !(written && searched) {
                return ExitCode::FAILURE;
            }
        }
    }

    tracing::info!("Pipeline shut down.");
    ExitCode::SUCCESS
}

/// Parse command-line arguments to determine data source
fn parse_args() -> Option<DataSource> {
    let args: Vec<String> = env::args().collect();
    let source = args
        .get(1)
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "sim".to_string());

    match (source.as_str(), args.get(2)) {
        ("sim", _) => Some(DataSource::Simulator),
        ("csv", Some(path)) => Some(DataSource::Csv(path.clone())),
        _ => {
            eprintln!(
                "Usage: {} <sim|csv> [path_to_csv]\n  - sim: run simulated update stream\n  - csv: read updates from a CSV file",
                args.first().map(String::as_str).unwrap_or("executor")
            );
            None
        }
    }
}

pub fn spawn_producer(
    source: &DataSource,
    sender: Sender<Vec<EdgeUpdate>>,
    config: &config::Config,
) -> JoinHandleResult {
    match source {
        DataSource::Simulator => {
            tracing::info!("Starting SimulatorStreamer producer task...");
            let streamer = SimulatorStreamer::new(config.simulator.clone());
            Producer::new(streamer).spawn(sender)
        }
        DataSource::Csv(path) => {
            tracing::info!(%path, "Starting CsvStreamer producer task...");
            let streamer = CsvStreamer::new(path.clone(), config.pipeline.csv_batch_size);
            Producer::new(streamer).spawn(sender)
        }
    }
}

/// Logs how a task ended. Returns `false` if it failed or panicked.
fn log_task_result(
    task: &str,
    result: Result<Result<(), error::Error>, tokio::task::JoinError>,
) -> bool {
    match result {
        Ok(Ok(())) => {
            tracing::debug!(task, "Task finished");
            true
        }
        Ok(Err(e)) => {
            tracing::error!(task, error = %e, "Task failed");
            false
        }
        Err(e) if e.is_cancelled() => {
            tracing::debug!(task, "Task cancelled");
            true
        }
        Err(e) => {
            tracing::error!(task, error = %e, "Task panicked");
            false
        }
    }
}
