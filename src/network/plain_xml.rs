//! SUMO plain XML serialization of a generated network.
//! See <https://sumo.dlr.de/docs/Networks/PlainXML.html>

use anyhow::Result;
use std::path::Path;

use super::graph::{GridNetwork, NodeKind};
use super::grid::GridParams;
use super::types::EdgeType;
use crate::xml::{write_file, XmlDocument, XSI_NAMESPACE};

const NODES_SCHEMA: &str = "http://sumo.dlr.de/xsd/nodes_file.xsd";
const EDGES_SCHEMA: &str = "http://sumo.dlr.de/xsd/edges_file.xsd";
const TYPES_SCHEMA: &str = "http://sumo.dlr.de/xsd/types_file.xsd";

/// Renders the `.nod.xml` document
pub fn nodes_xml(network: &GridNetwork) -> Result<String> {
    let mut doc = XmlDocument::new()?;
    doc.open(
        "nodes",
        &[
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:noNamespaceSchemaLocation", NODES_SCHEMA),
        ],
    )?;

    for node in network.nodes() {
        let mut attributes = vec![
            ("id", node.id.to_string()),
            ("x", node.x.to_string()),
            ("y", node.y.to_string()),
            ("type", node.junction_type.tag().to_string()),
        ];
        if let NodeKind::Lattice {
            tl_type,
            tl_layout,
            keep_clear,
        } = node.kind
        {
            attributes.push(("tlType", tl_type.tag().to_string()));
            attributes.push(("tlLayout", tl_layout.tag().to_string()));
            attributes.push(("keepClear", keep_clear.to_string()));
        }
        doc.empty("node", &attributes)?;
    }

    doc.close("nodes")?;
    doc.finish()
}

/// Renders the `.edg.xml` document
pub fn edges_xml(network: &GridNetwork) -> Result<String> {
    let mut doc = XmlDocument::new()?;
    doc.open(
        "edges",
        &[
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:noNamespaceSchemaLocation", EDGES_SCHEMA),
        ],
    )?;

    for edge in network.edges() {
        let attributes = [
            ("id", edge.id.to_string()),
            ("from", edge.from.to_string()),
            ("to", edge.to.to_string()),
            ("numLanes", edge.attributes.num_lanes.to_string()),
            ("speed", edge.attributes.speed.to_string()),
            ("priority", edge.attributes.priority.to_string()),
            ("type", edge.attributes.edge_type.tag().to_string()),
        ];
        doc.empty("edge", &attributes)?;
    }

    doc.close("edges")?;
    doc.finish()
}

/// Renders the `.typ.xml` document declaring every [`EdgeType`].
/// Per-edge attributes override these, but netconvert still needs the
/// types to exist.
pub fn edge_types_xml(params: &GridParams) -> Result<String> {
    let mut doc = XmlDocument::new()?;
    doc.open(
        "types",
        &[
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:noNamespaceSchemaLocation", TYPES_SCHEMA),
        ],
    )?;

    for edge_type in EdgeType::ALL {
        let attributes = [
            ("id", edge_type.tag().to_string()),
            ("numLanes", edge_type.num_lanes().to_string()),
            ("speed", params.edge_max_speed.to_string()),
            ("priority", params.edge_priority.to_string()),
        ];
        doc.empty("type", &attributes)?;
    }

    doc.close("types")?;
    doc.finish()
}

/// Output locations of the plain XML files
#[derive(Debug, Clone, Copy)]
pub struct PlainXmlFiles<'a> {
    pub nodes: &'a Path,
    pub edges: &'a Path,
    pub types: &'a Path,
}

/// Writes the node, edge and type files for a generated network
pub fn write_plain_xml(
    network: &GridNetwork,
    params: &GridParams,
    files: PlainXmlFiles<'_>,
) -> Result<()> {
    write_file(files.nodes, &nodes_xml(network)?)?;
    write_file(files.edges, &edges_xml(network)?)?;
    write_file(files.types, &edge_types_xml(params)?)?;
    Ok(())
}
