use super::csr::GraphCSR;
use super::traits::GraphSolver;
use common::{
    error::Error,
    types::{BestPathMap, Path, Vertex},
};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

/// Where a vertex whose label improved is put back into the SPFA work queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueDiscipline {
    /// Smallest Label First: push to the front when the candidate weight is smaller
    /// than the weight of the vertex at the head, to the back otherwise.
    #[default]
    SmallestLabelFirst,
    /// Plain FIFO, always push to the back.
    Fifo,
}

/// Solver implementing the Shortest Path Faster Algorithm (SPFA) for single-source shortest
/// paths, with in-band cycle detection through per-path visited sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SPFASolver {
    discipline: QueueDiscipline,
}

/// Index-space path carried through relaxation. Never mutated once built.
///
/// `weight` is the exact edge sum; it only has to fit in `i64` once materialized.
#[derive(Debug)]
struct Route {
    start: usize,
    edges: Vec<usize>,
    passed: HashSet<usize>,
    weight: i128,
}

impl Route {
    fn origin(start: usize) -> Self {
        Route {
            start,
            edges: Vec::new(),
            passed: HashSet::from([start]),
            weight: 0,
        }
    }

    /// Appends CSR edge `edge_idx` to a copy of this route.
    ///
    /// # Errors
    /// Returns `Error::CycleDetected` if the edge leads back onto the route.
    fn extend<T: Vertex>(&self, graph: &GraphCSR<T>, edge_idx: usize) -> Result<Route, Error> {
        let target = graph.edge_targets[edge_idx];
        if self.passed.contains(&target) {
            return Err(self.cycle_error(graph, edge_idx));
        }

        let mut edges = Vec::with_capacity(self.edges.len() + 1);
        edges.extend_from_slice(&self.edges);
        edges.push(edge_idx);

        let mut passed = self.passed.clone();
        passed.insert(target);

        Ok(Route {
            start: self.start,
            edges,
            passed,
            weight: self.weight + i128::from(graph.edge_weights[edge_idx]),
        })
    }

    /// Translates the route back into caller vertices.
    ///
    /// # Errors
    /// Returns `Error::WeightOverflow` if the route weighs more than `i64` can hold.
    fn materialize<T: Vertex>(&self, graph: &GraphCSR<T>) -> Result<Path<T>, Error> {
        self.edges
            .iter()
            .try_fold(Path::new(graph.nodes[self.start].clone()), |path, &i| {
                path.extend(&graph.edge_at(i))
            })
    }

    /// Describes the route closed by `edge_idx`, in the same format as `Path`.
    fn cycle_error<T: Vertex>(&self, graph: &GraphCSR<T>, edge_idx: usize) -> Error {
        let weight = self.weight + i128::from(graph.edge_weights[edge_idx]);
        let mut path = format!(
            "{}->{}({})",
            graph.nodes[self.start], graph.nodes[graph.edge_targets[edge_idx]], weight
        );
        for &i in self.edges.iter().chain(std::iter::once(&edge_idx)) {
            path.push(' ');
            path.push_str(&graph.edge_at(i).to_string());
        }
        Error::CycleDetected { path }
    }
}

/// Working state of one `best_path_map` call.
struct Relaxation<'g, T: Vertex> {
    graph: &'g GraphCSR<T>,
    discipline: QueueDiscipline,
    best: Vec<Option<Rc<Route>>>,
    in_queue: Vec<bool>,
    queue: VecDeque<usize>,
    relaxations: usize,
}

impl<'g, T: Vertex> Relaxation<'g, T> {
    fn new(graph: &'g GraphCSR<T>, discipline: QueueDiscipline, source: usize) -> Self {
        let num_nodes = graph.num_nodes;
        let mut best = vec![None; num_nodes];
        best[source] = Some(Rc::new(Route::origin(source)));

        Relaxation {
            graph,
            discipline,
            best,
            in_queue: vec![false; num_nodes],
            queue: VecDeque::with_capacity(num_nodes),
            relaxations: 0,
        }
    }

    /// Relaxes every edge `u -> v` leaving `u`.
    ///
    /// An undiscovered `v` takes the extended route unconditionally. A discovered `v`
    /// only takes it when strictly lighter. Either way the extension itself fails if
    /// `v` already lies on the route to `u`.
    fn relax_from(&mut self, u: usize) -> Result<(), Error> {
        let Some(current) = self.best[u].clone() else {
            return Ok(());
        };

        for i in self.graph.outgoing(u) {
            let v = self.graph.edge_targets[i];
            let existing = self.best[v].as_ref().map(|route| route.weight);

            if let Some(existing) = existing {
                let candidate = current.weight + i128::from(self.graph.edge_weights[i]);
                if candidate >= existing {
                    continue;
                }
            }

            let next = current.extend(self.graph, i)?;
            let weight = next.weight;
            self.best[v] = Some(Rc::new(next));
            self.relaxations += 1;

            if !self.in_queue[v] {
                self.enqueue(v, weight);
            }
        }

        Ok(())
    }

    fn enqueue(&mut self, v: usize, weight: i128) {
        self.in_queue[v] = true;

        let to_front = match self.discipline {
            QueueDiscipline::SmallestLabelFirst => self
                .queue
                .front()
                .and_then(|&head| self.best[head].as_ref())
                .is_some_and(|head| weight < head.weight),
            QueueDiscipline::Fifo => false,
        };

        if to_front {
            self.queue.push_front(v);
        } else {
            self.queue.push_back(v);
        }
    }

    fn run(mut self, source: usize) -> Result<BestPathMap<T>, Error> {
        self.relax_from(source)?;

        while let Some(u) = self.queue.pop_front() {
            self.in_queue[u] = false;
            self.relax_from(u)?;
        }

        tracing::debug!(
            relaxations = self.relaxations,
            "SPFA relaxation converged"
        );

        let graph = self.graph;
        let mut paths = BestPathMap::with_capacity(graph.num_nodes.saturating_sub(1));
        for (idx, route) in self.best.into_iter().enumerate() {
            if idx == source {
                continue;
            }
            if let Some(route) = route {
                paths.insert(graph.nodes[idx].clone(), route.materialize(graph)?);
            }
        }

        Ok(paths)
    }
}

impl SPFASolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discipline(discipline: QueueDiscipline) -> Self {
        SPFASolver { discipline }
    }

    pub fn discipline(&self) -> QueueDiscipline {
        self.discipline
    }
}

impl GraphSolver for SPFASolver {
    /// Single-source shortest paths from `start` via SPFA.
    ///
    /// # Parameters
    /// - `graph`: The CSR snapshot to traverse.
    /// - `start`: Start vertex; unknown vertices yield an empty map.
    ///
    /// # Returns
    /// - `Ok(paths)` → best path to every vertex reachable from `start`.
    /// - `Err(Error::CycleDetected)` → some extension would revisit its own vertex. This
    ///   only happens around negative cycles: a stored prefix ending at `w` is never
    ///   lighter than the current best path to `w`, so closing a non-negative cycle can
    ///   never beat that best path and is skipped before the revisit check.
    /// - `Err(Error::WeightOverflow)` → a best path weighs more than `i64` can hold.
    ///   Relaxation itself compares exact `i128` sums.
    fn best_path_map<T: Vertex>(
        &self,
        graph: &GraphCSR<T>,
        start: &T,
    ) -> Result<BestPathMap<T>, Error> {
        let Some(source) = graph.index_of(start) else {
            return Ok(BestPathMap::new());
        };

        tracing::debug!(
            %start,
            nodes = graph.num_nodes,
            edges = graph.num_edges(),
            discipline = ?self.discipline,
            "starting SPFA relaxation"
        );

        Relaxation::new(graph, self.discipline, source)
            .run(source)
            .inspect_err(|err| tracing::debug!(%start, %err, "SPFA aborted"))
    }
}

#[cfg(test)]
mod spfa_tests {
    use super::*;
    use crate::store::GraphStore;

    fn build_graph(edges: &[(&str, &str, i64)]) -> GraphCSR<String> {
        let store: GraphStore<String> = edges
            .iter()
            .map(|&(u, v, w)| (u.to_string(), v.to_string(), w))
            .collect();
        GraphCSR::from_store(&store)
    }

    fn weights(paths: &BestPathMap<String>) -> Vec<(String, i64)> {
        let mut out: Vec<(String, i64)> = paths
            .iter()
            .map(|(v, p)| (v.clone(), p.weight()))
            .collect();
        out.sort();
        out
    }

    fn start(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn spfa_prefers_cheaper_two_hop_route() {
        let graph = build_graph(&[("A", "B", 1), ("B", "C", 2), ("A", "C", 10)]);

        let paths = SPFASolver::new().best_path_map(&graph, &start("A")).unwrap();

        let to_c = &paths["C"];
        assert_eq!(to_c.weight(), 3);
        assert_eq!(to_c.to_string(), "A->C(3) A->B(1) B->C(2)");
        assert_eq!(paths["B"].weight(), 1);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn spfa_detects_simple_negative_cycle() {
        let graph = build_graph(&[("A", "B", 1), ("B", "A", -3)]);

        let err = SPFASolver::new()
            .best_path_map(&graph, &start("A"))
            .unwrap_err();

        assert_eq!(
            err,
            Error::CycleDetected {
                path: "A->A(-2) A->B(1) B->A(-3)".to_string()
            }
        );
    }

    #[test]
    fn spfa_positive_cycle_terminates() {
        let graph = build_graph(&[("A", "B", 1), ("B", "A", 3)]);

        let paths = SPFASolver::new().best_path_map(&graph, &start("A")).unwrap();

        assert_eq!(weights(&paths), vec![("B".to_string(), 1)]);
    }

    #[test]
    fn spfa_zero_weight_cycle_terminates() {
        let graph = build_graph(&[("A", "B", 0), ("B", "C", 0), ("C", "A", 0)]);

        let paths = SPFASolver::new().best_path_map(&graph, &start("A")).unwrap();

        assert_eq!(
            weights(&paths),
            vec![("B".to_string(), 0), ("C".to_string(), 0)]
        );
    }

    #[test]
    fn spfa_isolated_start_returns_empty_map() {
        let graph = build_graph(&[("A", "B", 1)]);

        let from_sink = SPFASolver::new().best_path_map(&graph, &start("B")).unwrap();
        let from_unknown = SPFASolver::new().best_path_map(&graph, &start("Z")).unwrap();

        assert!(from_sink.is_empty());
        assert!(from_unknown.is_empty());
    }

    #[test]
    fn spfa_negative_edges_without_cycle() {
        let graph = build_graph(&[
            ("S", "A", 4),
            ("S", "B", 5),
            ("A", "C", 3),
            ("B", "A", -3),
            ("C", "D", -2),
            ("B", "D", 6),
        ]);

        let paths = SPFASolver::new().best_path_map(&graph, &start("S")).unwrap();

        assert_eq!(
            weights(&paths),
            vec![
                ("A".to_string(), 2),
                ("B".to_string(), 5),
                ("C".to_string(), 5),
                ("D".to_string(), 3),
            ]
        );
        assert_eq!(paths["D"].to_string(), "S->D(3) S->B(5) B->A(-3) A->C(3) C->D(-2)");
    }

    #[test]
    fn spfa_detects_cycle_away_from_start() {
        let graph = build_graph(&[("A", "B", 1), ("B", "C", 1), ("C", "B", -5)]);

        let err = SPFASolver::new()
            .best_path_map(&graph, &start("A"))
            .unwrap_err();

        assert_eq!(
            err,
            Error::CycleDetected {
                path: "A->B(-3) A->B(1) B->C(1) C->B(-5)".to_string()
            }
        );
    }

    #[test]
    fn spfa_negative_self_loop_is_cycle() {
        let graph = build_graph(&[("A", "A", -1), ("A", "B", 2)]);

        let result = SPFASolver::new().best_path_map(&graph, &start("A"));

        assert!(matches!(result, Err(Error::CycleDetected { .. })));
    }

    #[test]
    fn spfa_non_negative_self_loop_is_ignored() {
        let graph = build_graph(&[("A", "A", 0), ("A", "B", 2), ("B", "B", 5)]);

        let paths = SPFASolver::new().best_path_map(&graph, &start("A")).unwrap();

        assert_eq!(weights(&paths), vec![("B".to_string(), 2)]);
    }

    #[test]
    fn spfa_unreachable_negative_cycle_is_not_reported() {
        let graph = build_graph(&[("A", "B", 1), ("C", "D", 1), ("D", "C", -2)]);

        let paths = SPFASolver::new().best_path_map(&graph, &start("A")).unwrap();

        assert_eq!(weights(&paths), vec![("B".to_string(), 1)]);
    }

    #[test]
    fn spfa_paths_keep_invariants() {
        let graph = build_graph(&[
            ("A", "B", 2),
            ("A", "C", 7),
            ("B", "C", -1),
            ("C", "D", 4),
            ("B", "D", 9),
        ]);

        let paths = SPFASolver::new().best_path_map(&graph, &start("A")).unwrap();

        for (vertex, path) in &paths {
            assert_eq!(path.start_point(), "A");
            assert_eq!(path.end_point(), vertex);
            assert_eq!(path.way().iter().map(|e| e.weight).sum::<i64>(), path.weight());
            assert_eq!(path.passed_points().len(), path.len() + 1);
            assert_eq!(path.way().first().map(|e| e.from.as_str()), Some("A"));
        }
    }

    #[test]
    fn spfa_fifo_and_slf_agree_on_weights() {
        let graph = build_graph(&[
            ("A", "B", 6),
            ("A", "C", 1),
            ("C", "B", -3),
            ("B", "D", 2),
            ("C", "D", 8),
            ("D", "E", -1),
        ]);

        let slf = SPFASolver::new().best_path_map(&graph, &start("A")).unwrap();
        let fifo = SPFASolver::with_discipline(QueueDiscipline::Fifo)
            .best_path_map(&graph, &start("A"))
            .unwrap();

        assert_eq!(weights(&slf), weights(&fifo));
    }

    #[test]
    fn spfa_repeated_calls_are_equal() {
        let graph = build_graph(&[("A", "B", 3), ("A", "C", 3), ("B", "D", 1), ("C", "D", 1)]);
        let solver = SPFASolver::new();

        let first = solver.best_path_map(&graph, &start("A")).unwrap();
        let second = solver.best_path_map(&graph, &start("A")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn spfa_zero_cycle_past_i64_bound_is_not_a_cycle() {
        let graph = build_graph(&[("S", "V", i64::MAX), ("V", "X", 5), ("X", "V", -5)]);

        let err = SPFASolver::new()
            .best_path_map(&graph, &start("S"))
            .unwrap_err();

        assert_eq!(
            err,
            Error::WeightOverflow {
                path: "S->X(9223372036854775812) S->V(9223372036854775807) V->X(5)".to_string()
            }
        );
    }

    #[test]
    fn spfa_zero_cycle_at_i64_bound_terminates() {
        let graph = build_graph(&[("S", "V", i64::MAX), ("V", "X", -5), ("X", "V", 5)]);

        let paths = SPFASolver::new().best_path_map(&graph, &start("S")).unwrap();

        assert_eq!(
            weights(&paths),
            vec![("V".to_string(), i64::MAX), ("X".to_string(), i64::MAX - 5)]
        );
    }

    /// Seeds `best` for every direct neighbour of `A` with the edge weight.
    fn seeded(graph: &GraphCSR<String>, discipline: QueueDiscipline) -> Relaxation<'_, String> {
        let source = graph.index_of(&start("A")).unwrap();
        let mut relaxation = Relaxation::new(graph, discipline, source);
        let origin = Route::origin(source);

        for i in graph.outgoing(source) {
            let route = origin.extend(graph, i).unwrap();
            relaxation.best[graph.edge_targets[i]] = Some(Rc::new(route));
        }
        relaxation
    }

    fn queued(relaxation: &Relaxation<'_, String>) -> Vec<String> {
        relaxation
            .queue
            .iter()
            .map(|&idx| relaxation.graph.nodes[idx].clone())
            .collect()
    }

    #[test]
    fn slf_puts_lighter_label_in_front_and_heavier_at_back() {
        let graph = build_graph(&[("A", "B", 5), ("A", "C", 2), ("A", "D", 7)]);
        let mut relaxation = seeded(&graph, QueueDiscipline::SmallestLabelFirst);
        let idx = |v: &str| graph.index_of(&start(v)).unwrap();

        relaxation.enqueue(idx("B"), 5);
        relaxation.enqueue(idx("C"), 2);
        assert_eq!(queued(&relaxation), vec!["C", "B"]);

        relaxation.enqueue(idx("D"), 7);
        assert_eq!(queued(&relaxation), vec!["C", "B", "D"]);
        assert!(["B", "C", "D"].iter().all(|&v| relaxation.in_queue[idx(v)]));
    }

    #[test]
    fn slf_equal_label_goes_to_back() {
        let graph = build_graph(&[("A", "B", 3), ("A", "C", 3)]);
        let mut relaxation = seeded(&graph, QueueDiscipline::SmallestLabelFirst);
        let idx = |v: &str| graph.index_of(&start(v)).unwrap();

        relaxation.enqueue(idx("B"), 3);
        relaxation.enqueue(idx("C"), 3);

        assert_eq!(queued(&relaxation), vec!["B", "C"]);
    }

    #[test]
    fn fifo_always_pushes_to_back() {
        let graph = build_graph(&[("A", "B", 5), ("A", "C", 2), ("A", "D", 7)]);
        let mut relaxation = seeded(&graph, QueueDiscipline::Fifo);
        let idx = |v: &str| graph.index_of(&start(v)).unwrap();

        relaxation.enqueue(idx("B"), 5);
        relaxation.enqueue(idx("C"), 2);
        relaxation.enqueue(idx("D"), 7);

        assert_eq!(queued(&relaxation), vec!["B", "C", "D"]);
    }

    // ----------------------------
    // Stress and edge-case tests
    // ----------------------------

    #[test]
    fn spfa_large_linear_graph_no_cycle() {
        let n = 1000u32;
        let store: GraphStore<u32> = (0..n - 1).map(|i| (i, i + 1, -1)).collect();
        let graph = GraphCSR::from_store(&store);

        let paths = SPFASolver::new().best_path_map(&graph, &0).unwrap();

        assert_eq!(paths.len(), (n - 1) as usize);
        assert_eq!(paths[&(n - 1)].weight(), -((n - 1) as i64));
    }

    #[test]
    fn spfa_large_circular_graph_negative_cycle() {
        let n = 1000u32;
        let store: GraphStore<u32> = (0..n).map(|i| (i, (i + 1) % n, -1)).collect();
        let graph = GraphCSR::from_store(&store);

        let result = SPFASolver::new().best_path_map(&graph, &0);

        assert!(matches!(result, Err(Error::CycleDetected { .. })));
    }
}
