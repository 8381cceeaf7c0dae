use std::collections::HashMap;
use std::ops::Range;

use common::types::{Edge, Vertex};

use super::store::GraphStore;

/// Immutable snapshot of a [`GraphStore`] in Compressed Sparse Row (CSR) format.
///
/// Every vertex gets a dense index on first sight, and the outgoing edges of each
/// node are stored contiguously:
/// - `node_pointers[u]..node_pointers[u+1]` → edges from node `u`
/// - `edge_targets[i]` -> target node of edge `i`
/// - `edge_weights[i]` -> weight of edge `i`
/// - `edge_source_by_index[i]` -> source node of edge `i`
/// - `nodes[u]` / `node_index[&vertex]` -> translation between indices and vertices
///
/// Solvers relax over plain indices and only touch caller vertices when
/// materializing results.
#[derive(Debug, Clone)]
pub struct GraphCSR<T: Vertex> {
    pub(crate) num_nodes: usize,
    pub(crate) nodes: Vec<T>,
    pub(crate) node_index: HashMap<T, usize>,
    pub(crate) node_pointers: Vec<usize>,
    pub(crate) edge_targets: Vec<usize>,
    pub(crate) edge_weights: Vec<i64>,
    pub(crate) edge_source_by_index: Vec<usize>,
}

impl<T: Vertex> GraphCSR<T> {
    /// Snapshots `store`.
    ///
    /// Indices follow the store's edge iteration order (source first, then target),
    /// followed by vertices that have no incident edge. Snapshotting an unchanged store
    /// twice yields identical layouts.
    pub fn from_store(store: &GraphStore<T>) -> Self {
        let mut nodes: Vec<T> = Vec::with_capacity(store.vertex_count());
        let mut node_index: HashMap<T, usize> = HashMap::with_capacity(store.vertex_count());

        let mut intern = |vertex: &T| -> usize {
            if let Some(&idx) = node_index.get(vertex) {
                return idx;
            }
            let idx = nodes.len();
            nodes.push(vertex.clone());
            node_index.insert(vertex.clone(), idx);
            idx
        };

        let edges: Vec<(usize, usize, i64)> = store
            .edges()
            .map(|edge| (intern(&edge.from), intern(&edge.to), edge.weight))
            .collect();

        for vertex in store.vertices() {
            intern(vertex);
        }

        let num_nodes = nodes.len();
        let (node_pointers, edge_targets, edge_weights, edge_source_by_index) =
            Self::build_csr_from_edges(num_nodes, &edges);

        Self {
            num_nodes,
            nodes,
            node_index,
            node_pointers,
            edge_targets,
            edge_weights,
            edge_source_by_index,
        }
    }

    /// Two-pass counting construction of the CSR arrays.
    ///
    /// The first pass counts out-degrees into `node_pointers[u + 1]`, a prefix sum turns
    /// them into offsets, and the second pass drops each edge into the next free slot of
    /// its source. Edges keep their relative input order within a source block.
    fn build_csr_from_edges(
        num_nodes: usize,
        edges: &[(usize, usize, i64)],
    ) -> (Vec<usize>, Vec<usize>, Vec<i64>, Vec<usize>) {
        let m = edges.len();
        let mut node_pointers = vec![0; num_nodes + 1];

        for &(u, _, _) in edges {
            node_pointers[u + 1] += 1;
        }

        for i in 1..=num_nodes {
            node_pointers[i] += node_pointers[i - 1];
        }

        let mut edge_targets = vec![0; m];
        let mut edge_weights = vec![0; m];
        let mut edge_source_by_index = vec![0; m];

        let mut cursor = node_pointers.clone();

        for &(u, v, weight) in edges {
            let pos = cursor[u];
            edge_targets[pos] = v;
            edge_weights[pos] = weight;
            edge_source_by_index[pos] = u;
            cursor[u] += 1;
        }

        (
            node_pointers,
            edge_targets,
            edge_weights,
            edge_source_by_index,
        )
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.edge_targets.len()
    }

    pub fn node_pointers(&self) -> &[usize] {
        &self.node_pointers
    }

    pub fn edge_targets(&self) -> &[usize] {
        &self.edge_targets
    }

    pub fn edge_weights(&self) -> &[i64] {
        &self.edge_weights
    }

    pub fn edge_source_by_index(&self) -> &[usize] {
        &self.edge_source_by_index
    }

    pub fn index_of(&self, vertex: &T) -> Option<usize> {
        self.node_index.get(vertex).copied()
    }

    /// Vertex stored at `idx`, if any.
    pub fn node(&self, idx: usize) -> Option<&T> {
        self.nodes.get(idx)
    }

    /// Caller-facing edge stored at CSR index `edge_idx`, if any.
    pub fn edge(&self, edge_idx: usize) -> Option<Edge<T>> {
        (edge_idx < self.num_edges()).then(|| self.edge_at(edge_idx))
    }

    /// CSR edge indices leaving node `u`. `u` must be a valid index.
    pub(crate) fn outgoing(&self, u: usize) -> Range<usize> {
        self.node_pointers[u]..self.node_pointers[u + 1]
    }

    /// `edge_idx` must be a valid index.
    pub(crate) fn edge_at(&self, edge_idx: usize) -> Edge<T> {
        Edge::new(
            self.nodes[self.edge_source_by_index[edge_idx]].clone(),
            self.nodes[self.edge_targets[edge_idx]].clone(),
            self.edge_weights[edge_idx],
        )
    }
}
