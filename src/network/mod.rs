//! Grid network generation
//!
//! Builds an N×N lattice (optionally ringed by fringe nodes), writes it as
//! SUMO plain XML and hands it to `netconvert`.

mod graph;
mod grid;
mod netconvert;
mod plain_xml;
mod types;

pub use graph::{EdgeAttributes, EdgeId, GridEdge, GridNetwork, GridNode, NodeId, NodeKind};
pub use grid::{generate_grid, lattice_index, GridParams};
pub use netconvert::NetConvert;
pub use plain_xml::{edge_types_xml, edges_xml, nodes_xml, write_plain_xml, PlainXmlFiles};
pub use types::{
    EdgeType, EmissionClass, JunctionType, TrafficLightLayout, TrafficLightType, VehicleClass,
};
