//! Directed graphs of locations.
//!
//! A [`SpatialModel`] describes the space of the system at one instant: a fixed number of
//! locations, indexed from `0` to `size - 1`, connected by directed edges carrying a label. The
//! label is usually a weight or a record of properties of the connection, and is converted into
//! a distance by the distance functions of a monitor.
//!
//! # Examples
//!
//! ```rust
//! use strel_spatial::model::SpatialModel;
//!
//! // Ring of three locations
//! let model = SpatialModel::from_edges(3, [(0, 1.0, 1), (1, 1.0, 2), (2, 1.0, 0)]).unwrap();
//!
//! assert_eq!(model.size(), 3);
//! assert_eq!(model.next(0).collect::<Vec<_>>(), vec![(1, &1.0)]);
//! assert_eq!(model.previous(0).collect::<Vec<_>>(), vec![(2, &1.0)]);
//! ```
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpatialModelError {
    #[error("Location {location} is out of range for a model with {size} locations")]
    OutOfRange { location: usize, size: usize },
}

/// Locations connected by directed, labelled edges.
#[derive(Debug, Clone)]
pub struct SpatialModel<E> {
    graph: DiGraph<(), E>,
}

impl<E> SpatialModel<E> {
    /// Create a model with `size` locations and no edges.
    pub fn new(size: usize) -> Self {
        let mut graph = DiGraph::with_capacity(size, 0);

        for _ in 0..size {
            graph.add_node(());
        }

        Self { graph }
    }

    /// Create a model from a list of `(source, label, target)` edges.
    pub fn from_edges<I>(size: usize, edges: I) -> Result<Self, SpatialModelError>
    where
        I: IntoIterator<Item = (usize, E, usize)>,
    {
        let mut model = Self::new(size);

        for (source, label, target) in edges {
            model.add_edge(source, label, target)?;
        }

        Ok(model)
    }

    fn check(&self, location: usize) -> Result<NodeIndex, SpatialModelError> {
        if location < self.size() {
            Ok(NodeIndex::new(location))
        } else {
            Err(SpatialModelError::OutOfRange {
                location,
                size: self.size(),
            })
        }
    }

    /// Add a directed edge from `source` to `target`.
    pub fn add_edge(&mut self, source: usize, label: E, target: usize) -> Result<(), SpatialModelError> {
        let source = self.check(source)?;
        let target = self.check(target)?;

        self.graph.add_edge(source, target, label);
        Ok(())
    }

    /// Number of locations
    pub fn size(&self) -> usize {
        self.graph.node_count()
    }

    /// Locations reachable from `location` through a single edge, with the edge labels.
    pub fn next(&self, location: usize) -> impl Iterator<Item = (usize, &E)> + '_ {
        self.graph
            .edges_directed(NodeIndex::new(location), Direction::Outgoing)
            .map(|edge| (edge.target().index(), edge.weight()))
    }

    /// Locations with an edge into `location`, with the edge labels.
    pub fn previous(&self, location: usize) -> impl Iterator<Item = (usize, &E)> + '_ {
        self.graph
            .edges_directed(NodeIndex::new(location), Direction::Incoming)
            .map(|edge| (edge.source().index(), edge.weight()))
    }

    /// Every edge of the model as a `(source, label, target)` triple.
    pub fn edges(&self) -> impl Iterator<Item = (usize, &E, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.weight(), edge.target().index()))
    }
}

impl<E> SpatialModel<E>
where
    E: Clone,
{
    /// Create a model where every edge connects its locations in both directions.
    pub fn undirected<I>(size: usize, edges: I) -> Result<Self, SpatialModelError>
    where
        I: IntoIterator<Item = (usize, E, usize)>,
    {
        let mut model = Self::new(size);

        for (first, label, second) in edges {
            model.add_edge(first, label.clone(), second)?;
            model.add_edge(second, label, first)?;
        }

        Ok(model)
    }
}
