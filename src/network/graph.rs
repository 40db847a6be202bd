//! In-memory form of a generated network
//!
//! Nodes and edges live in a petgraph directed graph. Insertion order is
//! preserved, which is what makes the written XML reproducible.

use anyhow::{anyhow, Context, Result};
use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt;

use super::types::{EdgeType, JunctionType, TrafficLightLayout, TrafficLightType};

/// Node identifier as it appears in the plain XML (`n12`, `o3`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn lattice(index: usize) -> Self {
        Self(format!("n{}", index))
    }

    pub fn fringe(index: usize) -> Self {
        Self(format!("o{}", index))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub String);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a node is for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// A grid intersection, carrying the traffic light settings
    Lattice {
        tl_type: TrafficLightType,
        tl_layout: TrafficLightLayout,
        keep_clear: bool,
    },
    /// Synthetic source/sink outside the lattice
    Fringe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub junction_type: JunctionType,
    pub kind: NodeKind,
}

impl GridNode {
    pub fn is_fringe(&self) -> bool {
        matches!(self.kind, NodeKind::Fringe)
    }
}

/// Attributes shared by every edge of a generated network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAttributes {
    pub num_lanes: u32,
    pub speed: f64,
    pub priority: i32,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridEdge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub attributes: EdgeAttributes,
}

#[derive(Debug, Default)]
pub struct GridNetwork {
    graph: DiGraph<GridNode, GridEdge>,

    /// Maps XML node ids to their indices in the graph
    node_index: HashMap<NodeId, NodeIndex>,
}

impl GridNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. A node whose id is already present is ignored.
    pub fn add_node(&mut self, node: GridNode) {
        if self.node_index.contains_key(&node.id) {
            return;
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_index.insert(id, index);
    }

    /// Adds a one-way edge between two existing nodes
    pub fn add_edge(&mut self, edge: GridEdge) -> Result<()> {
        let from = *self
            .node_index
            .get(&edge.from)
            .with_context(|| format!("Edge {} starts at unknown node {}", edge.id, edge.from))?;
        let to = *self
            .node_index
            .get(&edge.to)
            .with_context(|| format!("Edge {} ends at unknown node {}", edge.id, edge.to))?;
        self.graph.add_edge(from, to, edge);
        Ok(())
    }

    /// Adds the forward edge followed by its inverse
    pub fn add_edge_pair(
        &mut self,
        forward: EdgeId,
        inverse: EdgeId,
        from: &NodeId,
        to: &NodeId,
        attributes: EdgeAttributes,
    ) -> Result<()> {
        self.add_edge(GridEdge {
            id: forward,
            from: from.clone(),
            to: to.clone(),
            attributes,
        })?;
        self.add_edge(GridEdge {
            id: inverse,
            from: to.clone(),
            to: from.clone(),
            attributes,
        })
    }

    pub fn node(&self, id: &NodeId) -> Option<&GridNode> {
        self.node_index.get(id).map(|index| &self.graph[*index])
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GridNode> {
        self.graph.node_indices().map(move |index| &self.graph[index])
    }

    /// All edges, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &GridEdge> {
        self.graph.edge_indices().map(move |index| &self.graph[index])
    }

    pub fn lattice_nodes(&self) -> impl Iterator<Item = &GridNode> {
        self.nodes().filter(|node| !node.is_fringe())
    }

    pub fn fringe_nodes(&self) -> impl Iterator<Item = &GridNode> {
        self.nodes().filter(|node| node.is_fringe())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Finds the edge leading from one node to another
    pub fn find_edge_between(&self, from: &NodeId, to: &NodeId) -> Result<&GridEdge> {
        let from_index = self
            .node_index
            .get(from)
            .ok_or_else(|| anyhow!("Node {} not found", from))?;
        let to_index = self
            .node_index
            .get(to)
            .ok_or_else(|| anyhow!("Node {} not found", to))?;

        self.graph
            .edges(*from_index)
            .find(|edge| edge.target() == *to_index)
            .map(|edge| edge.weight())
            .ok_or_else(|| anyhow!("No edge found connecting {} to {}", from, to))
    }

    /// Nodes reachable over a single outgoing edge
    pub fn successors(&self, id: &NodeId) -> Vec<&NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Nodes with an edge leading into this one
    pub fn predecessors(&self, id: &NodeId) -> Vec<&NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &NodeId, direction: Direction) -> Vec<&NodeId> {
        let Some(index) = self.node_index.get(id) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(*index, direction)
            .map(|neighbor| &self.graph[neighbor].id)
            .collect()
    }

    pub fn out_degree(&self, id: &NodeId) -> usize {
        self.successors(id).len()
    }

    pub fn in_degree(&self, id: &NodeId) -> usize {
        self.predecessors(id).len()
    }

    /// Fewest-hops route between two nodes, excluding the start node
    pub fn shortest_path(&self, start: &NodeId, end: &NodeId) -> Option<Vec<NodeId>> {
        if start == end {
            return Some(vec![]);
        }
        let start_index = *self.node_index.get(start)?;
        let end_index = *self.node_index.get(end)?;

        let (_, node_path) = astar(
            &self.graph,
            start_index,
            |node| node == end_index,
            |_| 1u32,
            |_| 0,
        )?;

        Some(
            node_path
                .iter()
                .skip(1)
                .map(|index| self.graph[*index].id.clone())
                .collect(),
        )
    }
}
