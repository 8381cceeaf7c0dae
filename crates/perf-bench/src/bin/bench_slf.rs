use path_engine_core::QueueDiscipline;
use perf_bench::*;

fn main() {
    let graph = generate_layered_graph(LAYERS, WIDTH);

    // Front insertion whenever the candidate beats the queue head.
    let report = run_benchmark(&graph, QueueDiscipline::SmallestLabelFirst, ROUNDS);

    print_report("SLF", &report);
}
