//! Square lattice generator
//!
//! The lattice grows one ring at a time from a single node at the origin.
//! Growing from size k to k+1 appends 2k+1 nodes along the new right column
//! (bottom to top) and then the new top row (right to left), so after ring k
//! the nodes `n1..=n(k+1)^2` always form a complete square.

use anyhow::{ensure, Result};
use log::debug;

use super::graph::{EdgeAttributes, EdgeId, GridNetwork, GridNode, NodeId, NodeKind};
use super::types::{EdgeType, JunctionType, TrafficLightLayout, TrafficLightType};

/// Everything needed to lay out a grid network
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    /// Number of junctions on one side
    pub grid_size: usize,
    pub junction_type: JunctionType,
    pub tl_type: TrafficLightType,
    pub tl_layout: TrafficLightLayout,
    /// Whether the junction-blocking heuristic is active
    pub keep_clear: bool,
    pub edge_type: EdgeType,
    pub edge_length: f64,
    pub number_of_lanes: u32,
    pub edge_max_speed: f64,
    pub edge_priority: i32,
    /// Ring the lattice with fringe nodes for through-traffic
    pub with_fringe: bool,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            grid_size: 2,
            junction_type: JunctionType::Priority,
            tl_type: TrafficLightType::Actuated,
            tl_layout: TrafficLightLayout::Opposites,
            keep_clear: true,
            edge_type: EdgeType::NormalRoad,
            edge_length: 50.0,
            number_of_lanes: 1,
            edge_max_speed: 13.9,
            edge_priority: 0,
            with_fringe: true,
        }
    }
}

impl GridParams {
    pub fn with_size(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Self::default()
        }
    }

    /// Checks the ranges the simulator accepts
    pub fn validate(&self) -> Result<()> {
        ensure!(self.grid_size > 1, "gridSize should be greater than 1");
        ensure!(self.edge_length > 0.0, "Edge length should be greater than 0");
        ensure!(
            self.number_of_lanes > 0,
            "The number of lanes must be at least 1"
        );
        ensure!(
            self.edge_max_speed > 0.0,
            "The maximum speed on the roads should be greater than 0"
        );
        ensure!(self.edge_priority >= 0, "Priority cannot be negative");
        Ok(())
    }

    fn edge_attributes(&self) -> EdgeAttributes {
        EdgeAttributes {
            num_lanes: self.number_of_lanes,
            speed: self.edge_max_speed,
            priority: self.edge_priority,
            edge_type: self.edge_type,
        }
    }
}

/// 1-based index of the lattice node at a column/row position
pub fn lattice_index(col: usize, row: usize) -> usize {
    if col >= row {
        col * col + 1 + row
    } else {
        row * row + 1 + 2 * row - col
    }
}

/// Builds the lattice (and optionally its fringe) described by `params`
pub fn generate_grid(params: &GridParams) -> Result<GridNetwork> {
    params.validate()?;

    let mut network = GridNetwork::new();
    add_lattice_nodes(&mut network, params);
    add_lattice_edges(&mut network, params)?;
    if params.with_fringe {
        add_fringe(&mut network, params)?;
    }

    debug!(
        "Generated {}x{} grid: {} nodes, {} edges",
        params.grid_size,
        params.grid_size,
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

fn lattice_node(params: &GridParams, index: usize, col: usize, row: usize) -> GridNode {
    GridNode {
        id: NodeId::lattice(index),
        x: params.edge_length * col as f64,
        y: params.edge_length * row as f64,
        junction_type: params.junction_type,
        kind: NodeKind::Lattice {
            tl_type: params.tl_type,
            tl_layout: params.tl_layout,
            keep_clear: params.keep_clear,
        },
    }
}

fn add_lattice_nodes(network: &mut GridNetwork, params: &GridParams) {
    network.add_node(lattice_node(params, 1, 0, 0));

    for k in 1..params.grid_size {
        for i in 0..=2 * k {
            let (col, row) = if i <= k { (k, i) } else { (2 * k - i, k) };
            network.add_node(lattice_node(params, k * k + 1 + i, col, row));
        }
    }
}

fn add_lattice_pair(
    network: &mut GridNetwork,
    start: usize,
    end: usize,
    attributes: EdgeAttributes,
) -> Result<()> {
    network.add_edge_pair(
        EdgeId(format!("n{}ton{}", start, end)),
        EdgeId(format!("n{}ton{}", end, start)),
        &NodeId::lattice(start),
        &NodeId::lattice(end),
        attributes,
    )
}

fn add_lattice_edges(network: &mut GridNetwork, params: &GridParams) -> Result<()> {
    let attributes = params.edge_attributes();

    for k in 1..params.grid_size {
        // Up from the old top row into the new one
        for col in 0..k {
            let start = lattice_index(col, k - 1);
            let end = lattice_index(col, k);
            add_lattice_pair(network, start, end, attributes)?;
        }
        // Across from the old right column, top to bottom
        for row in (0..k).rev() {
            let start = lattice_index(k - 1, row);
            let end = lattice_index(k, row);
            add_lattice_pair(network, start, end, attributes)?;
        }
        // Along the new ring itself
        let first = k * k + 1;
        for i in 0..2 * k {
            add_lattice_pair(network, first + i, first + i + 1, attributes)?;
        }
    }
    Ok(())
}

/// Appends 4N fringe nodes (bottom, right, top and left sides, N each),
/// each wired to its nearest boundary lattice node.
fn add_fringe(network: &mut GridNetwork, params: &GridParams) -> Result<()> {
    let n = params.grid_size;
    let length = params.edge_length;
    let attributes = params.edge_attributes();

    for i in 0..4 * n {
        let j = i % n;
        let ((x, y), (col, row)) = match i / n {
            0 => ((length * j as f64, -length), (j, 0)),
            1 => ((length * n as f64, length * j as f64), (n - 1, j)),
            2 => (
                (length * (n - 1 - j) as f64, length * n as f64),
                (n - 1 - j, n - 1),
            ),
            _ => ((-length, length * (n - 1 - j) as f64), (0, n - 1 - j)),
        };

        let fringe = i + 1;
        let anchor = lattice_index(col, row);
        network.add_node(GridNode {
            id: NodeId::fringe(fringe),
            x,
            y,
            junction_type: JunctionType::Priority,
            kind: NodeKind::Fringe,
        });
        network.add_edge_pair(
            EdgeId(format!("n{}too{}", anchor, fringe)),
            EdgeId(format!("o{}ton{}", fringe, anchor)),
            &NodeId::lattice(anchor),
            &NodeId::fringe(fringe),
            attributes,
        )?;
    }
    Ok(())
}
