use path_engine_core::QueueDiscipline;
use perf_bench::*;

fn main() {
    let graph = generate_layered_graph(LAYERS, WIDTH);

    // Plain FIFO: every improved node goes to the back.
    let report = run_benchmark(&graph, QueueDiscipline::Fifo, ROUNDS);

    print_report("FIFO", &report);
}
