use std::collections::{HashMap, HashSet};
use std::fmt;

use common::{
    error::Error,
    types::{BestPathMap, Edge, Path, Vertex},
};

use super::csr::GraphCSR;
use super::solver::SPFASolver;
use super::traits::GraphSolver;

/// Mutable directed graph with at most one edge per ordered `(from, to)` pair.
///
/// - `vertices` -> every known vertex
/// - `adjacency[from][to]` -> the edge `from -> to`
///
/// Not synchronized. A single owner mutates it, and solvers must not read it while a
/// mutation is in progress.
#[derive(Debug, Clone)]
pub struct GraphStore<T: Vertex> {
    vertices: HashSet<T>,
    adjacency: HashMap<T, HashMap<T, Edge<T>>>,
}

impl<T: Vertex> Default for GraphStore<T> {
    fn default() -> Self {
        GraphStore {
            vertices: HashSet::new(),
            adjacency: HashMap::new(),
        }
    }
}

impl<T: Vertex> GraphStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the edge `from -> to`, replacing any previous edge between the same pair.
    ///
    /// Both endpoints are registered as vertices.
    pub fn put_edge(&mut self, from: T, to: T, weight: i64) {
        tracing::trace!(%from, %to, weight, "put edge");

        self.vertices.insert(from.clone());
        self.vertices.insert(to.clone());
        self.adjacency
            .entry(from.clone())
            .or_default()
            .insert(to.clone(), Edge::new(from, to, weight));
    }

    /// Removes the edge `from -> to` and returns it, if it existed.
    ///
    /// The vertex set is then rebuilt from the remaining edges: a vertex left without
    /// any incident edge is dropped, even if the caller still considers it known.
    /// This costs O(E).
    pub fn remove_edge(&mut self, from: &T, to: &T) -> Option<Edge<T>> {
        let removed = match self.adjacency.get_mut(from) {
            Some(targets) => {
                let removed = targets.remove(to);
                if targets.is_empty() {
                    self.adjacency.remove(from);
                }
                removed
            }
            None => None,
        };

        self.vertices = self
            .adjacency
            .values()
            .flat_map(|targets| targets.values())
            .flat_map(|edge| [edge.from.clone(), edge.to.clone()])
            .collect();

        tracing::trace!(%from, %to, removed = removed.is_some(), "remove edge");
        removed
    }

    /// Removes `vertex`, its outgoing edges and every edge pointing at it.
    ///
    /// Returns `true` if the vertex was known. Other vertices stay in the vertex set
    /// even if this leaves them without edges. Worst case O(V·E).
    pub fn remove_point(&mut self, vertex: &T) -> bool {
        let known = self.vertices.remove(vertex);
        self.adjacency.remove(vertex);

        for targets in self.adjacency.values_mut() {
            targets.remove(vertex);
        }
        self.adjacency.retain(|_, targets| !targets.is_empty());

        tracing::trace!(%vertex, known, "remove point");
        known
    }

    pub fn vertices(&self) -> &HashSet<T> {
        &self.vertices
    }

    pub fn contains_point(&self, vertex: &T) -> bool {
        self.vertices.contains(vertex)
    }

    pub fn edge(&self, from: &T, to: &T) -> Option<&Edge<T>> {
        self.adjacency.get(from).and_then(|targets| targets.get(to))
    }

    /// Outgoing edges of `from`, keyed by destination.
    pub fn outgoing(&self, from: &T) -> Option<&HashMap<T, Edge<T>>> {
        self.adjacency.get(from)
    }

    /// Iterates all edges, grouped by source.
    pub fn edges(&self) -> impl Iterator<Item = &Edge<T>> {
        self.adjacency.values().flat_map(|targets| targets.values())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Best path from `start` to every vertex reachable from it, using the default
    /// [`SPFASolver`] on a fresh snapshot of this store.
    ///
    /// # Errors
    /// Returns `Error::CycleDetected` if relaxation runs into a cycle (in practice a
    /// negative one) reachable from `start`, or `Error::WeightOverflow` if a best path
    /// weighs more than `i64` can hold.
    pub fn best_path_map(&self, start: &T) -> Result<BestPathMap<T>, Error> {
        SPFASolver::default().best_path_map(&GraphCSR::from_store(self), start)
    }

    /// Best path from `start` to `end`, or `None` if `end` is unreachable or equals `start`.
    pub fn best_path(&self, start: &T, end: &T) -> Result<Option<Path<T>>, Error> {
        let mut paths = self.best_path_map(start)?;
        Ok(paths.remove(end))
    }
}

impl<T: Vertex> FromIterator<(T, T, i64)> for GraphStore<T> {
    fn from_iter<I: IntoIterator<Item = (T, T, i64)>>(iter: I) -> Self {
        let mut store = GraphStore::new();
        store.extend(iter);
        store
    }
}

impl<T: Vertex> Extend<(T, T, i64)> for GraphStore<T> {
    fn extend<I: IntoIterator<Item = (T, T, i64)>>(&mut self, iter: I) {
        for (from, to, weight) in iter {
            self.put_edge(from, to, weight);
        }
    }
}

impl<T: Vertex> fmt::Display for GraphStore<T> {
    /// One edge per line.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for edge in self.edges() {
            writeln!(f, "{}", edge)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> String {
        v.to_string()
    }

    fn store(edges: &[(&str, &str, i64)]) -> GraphStore<String> {
        edges.iter().map(|&(u, v, w)| (s(u), s(v), w)).collect()
    }

    #[test]
    fn put_edge_registers_both_endpoints() {
        let graph = store(&[("A", "B", 4)]);

        assert!(graph.contains_point(&s("A")));
        assert!(graph.contains_point(&s("B")));
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn put_edge_overwrites_same_pair() {
        let mut graph = store(&[("A", "B", 1)]);
        graph.put_edge(s("A"), s("B"), 7);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge(&s("A"), &s("B")).map(|e| e.weight), Some(7));
    }

    #[test]
    fn opposite_directions_are_distinct_edges() {
        let graph = store(&[("A", "B", 1), ("B", "A", 2)]);

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge(&s("B"), &s("A")).map(|e| e.weight), Some(2));
    }

    #[test]
    fn remove_edge_returns_removed_edge() {
        let mut graph = store(&[("A", "B", 1), ("B", "C", 2)]);

        let removed = graph.remove_edge(&s("A"), &s("B"));

        assert_eq!(removed, Some(Edge::new(s("A"), s("B"), 1)));
        assert!(graph.edge(&s("A"), &s("B")).is_none());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn remove_edge_drops_vertices_without_edges() {
        let mut graph = store(&[("A", "B", 1), ("B", "C", 2)]);

        graph.remove_edge(&s("A"), &s("B"));

        assert!(!graph.contains_point(&s("A")));
        assert!(graph.contains_point(&s("B")));
        assert!(graph.contains_point(&s("C")));
    }

    #[test]
    fn remove_missing_edge_still_rebuilds_vertex_set() {
        let mut graph = store(&[("A", "B", 1), ("B", "C", 2)]);
        graph.remove_point(&s("C"));
        // B survives remove_point without edges of its own...
        assert!(graph.contains_point(&s("B")));

        assert!(graph.remove_edge(&s("X"), &s("Y")).is_none());
        // ...and the rebuild keeps it only because A->B remains.
        assert!(graph.contains_point(&s("B")));
        assert_eq!(graph.vertex_count(), 2);
    }

    #[test]
    fn remove_point_cleans_both_directions() {
        let mut graph = store(&[("A", "B", 1), ("B", "C", 2), ("C", "B", 3), ("C", "A", 4)]);

        assert!(graph.remove_point(&s("B")));

        assert!(!graph.contains_point(&s("B")));
        assert!(graph.outgoing(&s("B")).is_none());
        assert!(graph.edges().all(|e| e.from != "B" && e.to != "B"));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_point(&s("A")));
    }

    #[test]
    fn remove_point_keeps_isolated_neighbours() {
        let mut graph = store(&[("A", "B", 1)]);

        graph.remove_point(&s("B"));

        assert!(graph.contains_point(&s("A")));
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.remove_point(&s("B")));
    }

    #[test]
    fn display_prints_one_edge_per_line() {
        let graph = store(&[("A", "B", 1), ("A", "C", -2)]);
        let rendered = graph.to_string();

        let mut lines: Vec<&str> = rendered.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["A->B(1)", "A->C(-2)"]);
    }

    #[test]
    fn best_path_picks_cheaper_route() {
        let graph = store(&[("A", "B", 1), ("B", "C", 2), ("A", "C", 10)]);

        let path = graph.best_path(&s("A"), &s("C")).unwrap().unwrap();
        assert_eq!(path.weight(), 3);
        assert!(graph.best_path(&s("A"), &s("A")).unwrap().is_none());
        assert!(graph.best_path(&s("C"), &s("A")).unwrap().is_none());
    }
}
