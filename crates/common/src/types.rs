use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use super::error::Error;

/// Identity capability required from graph vertices.
///
/// Two vertex values denote the same node iff they compare equal. Callers must keep
/// `Eq` and `Hash` consistent and stable for as long as a value lives inside a graph;
/// the engine cannot detect a violation. `Display` is used for diagnostics.
pub trait Vertex: Eq + Hash + Clone + fmt::Display {}

impl<T> Vertex for T where T: Eq + Hash + Clone + fmt::Display {}

/// A directed, weighted edge `from -> to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<T> {
    pub from: T,
    pub to: T,
    pub weight: i64,
}

impl<T> Edge<T> {
    pub fn new(from: T, to: T, weight: i64) -> Self {
        Edge { from, to, weight }
    }
}

impl<T: fmt::Display> fmt::Display for Edge<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}->{}({})", self.from, self.to, self.weight)
    }
}

/// An immutable walk from `start_point` to `end_point`.
///
/// Invariants:
/// - `weight` is the exact sum of the weights in `way`.
/// - `passed_points` holds every vertex touched by `way`, both endpoints included.
///
/// Extending a path never mutates it; [`Path::extend`] returns a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<T: Vertex> {
    start_point: T,
    end_point: T,
    way: Vec<Edge<T>>,
    weight: i64,
    passed_points: HashSet<T>,
}

/// Best known path from a fixed start vertex to every vertex reachable from it.
pub type BestPathMap<T> = HashMap<T, Path<T>>;

impl<T: Vertex> Path<T> {
    /// The empty path sitting on `start`, with zero weight.
    pub fn new(start: T) -> Self {
        let mut passed_points = HashSet::new();
        passed_points.insert(start.clone());

        Path {
            end_point: start.clone(),
            start_point: start,
            way: Vec::new(),
            weight: 0,
            passed_points,
        }
    }

    pub fn start_point(&self) -> &T {
        &self.start_point
    }

    pub fn end_point(&self) -> &T {
        &self.end_point
    }

    pub fn way(&self) -> &[Edge<T>] {
        &self.way
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    pub fn passed_points(&self) -> &HashSet<T> {
        &self.passed_points
    }

    pub fn len(&self) -> usize {
        self.way.len()
    }

    pub fn is_empty(&self) -> bool {
        self.way.is_empty()
    }

    /// Returns `true` if `vertex` lies anywhere on this path.
    pub fn passes(&self, vertex: &T) -> bool {
        self.passed_points.contains(vertex)
    }

    /// Builds the path obtained by appending `edge` at the end of `self`.
    ///
    /// `edge.from` is expected to equal `self.end_point()`.
    ///
    /// # Errors
    /// - `Error::CycleDetected` if `edge.to` is already on this path.
    /// - `Error::WeightOverflow` if the new weight does not fit in `i64`.
    ///
    /// Both describe the would-be chain including `edge`.
    pub fn extend(&self, edge: &Edge<T>) -> Result<Path<T>, Error> {
        let exact = i128::from(self.weight) + i128::from(edge.weight);

        if self.passes(&edge.to) {
            return Err(Error::CycleDetected {
                path: self.describe_extension(edge, exact),
            });
        }

        let weight = i64::try_from(exact).map_err(|_| Error::WeightOverflow {
            path: self.describe_extension(edge, exact),
        })?;

        let mut way = Vec::with_capacity(self.way.len() + 1);
        way.extend(self.way.iter().cloned());
        way.push(edge.clone());

        let mut passed_points = self.passed_points.clone();
        passed_points.insert(edge.to.clone());

        Ok(Path {
            start_point: self.start_point.clone(),
            end_point: edge.to.clone(),
            way,
            weight,
            passed_points,
        })
    }

    fn describe_extension(&self, edge: &Edge<T>, weight: i128) -> String {
        let mut out = format!("{}->{}({})", self.start_point, edge.to, weight);
        for step in self.way.iter().chain(std::iter::once(edge)) {
            out.push(' ');
            out.push_str(&step.to_string());
        }
        out
    }
}

impl<T: Vertex> fmt::Display for Path<T> {
    /// Formats as `start->end(weight) edge edge ...`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}->{}({})", self.start_point, self.end_point, self.weight)?;
        for edge in &self.way {
            write!(f, " {}", edge)?;
        }
        Ok(())
    }
}
