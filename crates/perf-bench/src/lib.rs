// ----------------------------
// Queue discipline benchmark
// ----------------------------

use std::hint::black_box;
use std::time::{Duration, Instant};

use path_engine_core::{GraphCSR, GraphSolver, GraphStore, QueueDiscipline, SPFASolver};

pub const LAYERS: usize = 200;
pub const WIDTH: usize = 50;
pub const ROUNDS: usize = 5;

/// Layered graph: every node of layer `l` links to every node of layer `l + 1`.
///
/// Edges only move forward, so there are no cycles, but weights swing between
/// negative and positive values to make SPFA revisit nodes. Node `0` is the single
/// source feeding layer 0.
pub fn generate_layered_graph(layers: usize, width: usize) -> GraphStore<usize> {
    let node = |layer: usize, slot: usize| 1 + layer * width + slot;
    let mut graph = GraphStore::new();

    for slot in 0..width {
        graph.put_edge(0, node(0, slot), (slot as i64 * 37) % 101);
    }

    for layer in 0..layers.saturating_sub(1) {
        for a in 0..width {
            for b in 0..width {
                // Deterministic pseudo-random weight in -40..=60.
                let mix = (layer * 7919 + a * 104_729 + b * 1_299_709) % 101;
                graph.put_edge(node(layer, a), node(layer + 1, b), mix as i64 - 40);
            }
        }
    }

    graph
}

pub struct BenchReport {
    pub reachable: usize,
    pub checksum: i64,
    pub best: Duration,
}

/// Runs `best_path_map` from node `0` for `rounds` rounds and keeps the fastest.
pub fn run_benchmark(graph: &GraphStore<usize>, discipline: QueueDiscipline, rounds: usize) -> BenchReport {
    let csr = GraphCSR::from_store(graph);
    let solver = SPFASolver::with_discipline(discipline);

    let mut best = Duration::MAX;
    let mut reachable = 0;
    let mut checksum = 0;

    for _ in 0..rounds {
        let start_time = Instant::now();
        let result = solver.best_path_map(&csr, &0);
        let elapsed = start_time.elapsed();

        match black_box(result) {
            Ok(paths) => {
                reachable = paths.len();
                checksum = paths.values().map(|path| path.weight()).sum();
            }
            Err(e) => {
                eprintln!("Benchmark graph unexpectedly has a cycle: {}", e);
            }
        }
        best = best.min(elapsed);
    }

    BenchReport {
        reachable,
        checksum,
        best,
    }
}

pub fn print_report(label: &str, report: &BenchReport) {
    println!("--- {} Benchmark Results ({} layers x {} nodes) ---", label, LAYERS, WIDTH);
    println!("Reachable: {}", report.reachable);
    println!("Checksum: {}", report.checksum);
    println!("Best Elapsed Time: {:?}", report.best);
}
