//! Grid network generation tests
//!
//! Checks the lattice layout, the fringe, the connectivity of the generated
//! graph and the plain XML written for netconvert.

use sumo_grid_sim::network::{
    edges_xml, generate_grid, lattice_index, nodes_xml, write_plain_xml, EdgeType, EmissionClass,
    GridParams, JunctionType, NodeId, NodeKind, PlainXmlFiles, TrafficLightLayout,
    TrafficLightType, VehicleClass,
};

fn lattice_only(grid_size: usize) -> GridParams {
    GridParams {
        with_fringe: false,
        ..GridParams::with_size(grid_size)
    }
}

#[test]
fn test_lattice_index_walks_rings() {
    // Ring 1 goes right then up then left
    assert_eq!(lattice_index(0, 0), 1);
    assert_eq!(lattice_index(1, 0), 2);
    assert_eq!(lattice_index(1, 1), 3);
    assert_eq!(lattice_index(0, 1), 4);
    // Ring 2
    assert_eq!(lattice_index(2, 0), 5);
    assert_eq!(lattice_index(2, 2), 7);
    assert_eq!(lattice_index(0, 2), 9);
}

#[test]
fn test_lattice_has_n_squared_nodes() {
    for n in 2..=6 {
        let network = generate_grid(&lattice_only(n)).unwrap();
        assert_eq!(network.node_count(), n * n, "grid size {}", n);
        assert_eq!(network.fringe_nodes().count(), 0);
    }
}

#[test]
fn test_lattice_has_two_edges_per_adjacent_pair() {
    for n in 2..=6 {
        let network = generate_grid(&lattice_only(n)).unwrap();
        // 2N(N-1) undirected pairs, each as two one-way edges
        assert_eq!(network.edge_count(), 4 * n * (n - 1), "grid size {}", n);
    }
}

#[test]
fn test_edges_only_join_adjacent_nodes() {
    let params = lattice_only(5);
    let network = generate_grid(&params).unwrap();

    for edge in network.edges() {
        let from = network.node(&edge.from).unwrap();
        let to = network.node(&edge.to).unwrap();
        let distance = (from.x - to.x).abs() + (from.y - to.y).abs();
        assert_eq!(
            distance, params.edge_length,
            "edge {} joins non-adjacent nodes",
            edge.id
        );
        // Its inverse exists too
        assert!(network.find_edge_between(&edge.to, &edge.from).is_ok());
    }
}

#[test]
fn test_node_positions_follow_edge_length() {
    let params = GridParams {
        edge_length: 30.0,
        ..lattice_only(3)
    };
    let network = generate_grid(&params).unwrap();

    let expected = [
        ("n1", 0.0, 0.0),
        ("n2", 30.0, 0.0),
        ("n3", 30.0, 30.0),
        ("n4", 0.0, 30.0),
        ("n5", 60.0, 0.0),
        ("n7", 60.0, 60.0),
        ("n9", 0.0, 60.0),
    ];
    for (id, x, y) in expected {
        let node = network.node(&NodeId(id.to_string())).unwrap();
        assert_eq!((node.x, node.y), (x, y), "position of {}", id);
    }
}

#[test]
fn test_every_node_links_to_its_lattice_neighbours() {
    for n in 2..=7 {
        let network = generate_grid(&lattice_only(n)).unwrap();
        for col in 0..n {
            for row in 0..n {
                let id = NodeId::lattice(lattice_index(col, row));
                let node = network.node(&id).unwrap();
                assert_eq!((node.x, node.y), (50.0 * col as f64, 50.0 * row as f64));

                let expected = [col > 0, col + 1 < n, row > 0, row + 1 < n]
                    .iter()
                    .filter(|&&inside| inside)
                    .count();
                assert_eq!(network.out_degree(&id), expected, "out of {} in {}x{}", id, n, n);
                assert_eq!(network.in_degree(&id), expected, "into {} in {}x{}", id, n, n);
            }
        }
    }
}

#[test]
fn test_fringe_completes_every_boundary_node() {
    for n in 2..=5 {
        let network = generate_grid(&GridParams::with_size(n)).unwrap();
        for col in 0..n {
            for row in 0..n {
                let id = NodeId::lattice(lattice_index(col, row));
                assert_eq!(network.out_degree(&id), 4, "out of {} in {}x{}", id, n, n);
                assert_eq!(network.in_degree(&id), 4, "into {} in {}x{}", id, n, n);
            }
        }
    }
}

#[test]
fn test_first_ring_edge_order() {
    let network = generate_grid(&lattice_only(2)).unwrap();
    let ids: Vec<String> = network.edges().map(|edge| edge.id.to_string()).collect();
    assert_eq!(
        ids,
        vec![
            "n1ton4", "n4ton1", "n1ton2", "n2ton1", "n2ton3", "n3ton2", "n3ton4", "n4ton3"
        ]
    );
}

#[test]
fn test_fringe_adds_four_n_nodes() {
    let params = GridParams::with_size(3);
    let network = generate_grid(&params).unwrap();

    assert_eq!(network.fringe_nodes().count(), 12);
    assert_eq!(network.lattice_nodes().count(), 9);
    // Lattice pairs plus one pair per fringe node
    assert_eq!(network.edge_count(), 4 * 3 * 2 + 2 * 12);

    for fringe in network.fringe_nodes() {
        assert_eq!(network.out_degree(&fringe.id), 1, "{}", fringe.id);
        assert_eq!(network.in_degree(&fringe.id), 1, "{}", fringe.id);
        assert_eq!(fringe.junction_type, JunctionType::Priority);
    }
}

#[test]
fn test_fringe_positions_and_anchors() {
    let network = generate_grid(&GridParams::with_size(3)).unwrap();

    let expected = [
        ("o1", (0.0, -50.0), "n1"),
        ("o4", (150.0, 0.0), "n5"),
        ("o7", (100.0, 150.0), "n7"),
        ("o10", (-50.0, 100.0), "n9"),
        ("o12", (-50.0, 0.0), "n1"),
    ];
    for (id, position, anchor) in expected {
        let fringe = NodeId(id.to_string());
        let node = network.node(&fringe).unwrap();
        assert_eq!((node.x, node.y), position, "position of {}", id);

        let anchor = NodeId(anchor.to_string());
        let out = network.find_edge_between(&anchor, &fringe).unwrap();
        assert_eq!(out.id.to_string(), format!("{}too{}", anchor, &id[1..]));
        let back = network.find_edge_between(&fringe, &anchor).unwrap();
        assert_eq!(back.id.to_string(), format!("{}ton{}", id, &anchor.0[1..]));
    }
}

#[test]
fn test_fringe_nodes_are_connected_through_the_lattice() {
    let network = generate_grid(&GridParams::with_size(3)).unwrap();
    let start = NodeId::fringe(1);
    let end = NodeId::fringe(7);

    let path = network.shortest_path(&start, &end).unwrap();
    // o1 -> n1, four hops across the lattice, n7 -> o7
    assert_eq!(path.len(), 6);
    assert_eq!(path.first(), Some(&NodeId::lattice(1)));
    assert_eq!(path.last(), Some(&end));
}

#[test]
fn test_grid_size_one_is_rejected() {
    let err = generate_grid(&GridParams::with_size(1)).unwrap_err();
    assert!(
        err.to_string().contains("gridSize should be greater than 1"),
        "unexpected error: {}",
        err
    );
    assert!(generate_grid(&GridParams::with_size(0)).is_err());
}

#[test]
fn test_invalid_edge_settings_are_rejected() {
    let zero_length = GridParams {
        edge_length: 0.0,
        ..GridParams::default()
    };
    assert!(generate_grid(&zero_length).is_err());

    let no_lanes = GridParams {
        number_of_lanes: 0,
        ..GridParams::default()
    };
    assert!(generate_grid(&no_lanes).is_err());
}

#[test]
fn test_generation_is_deterministic() {
    let params = GridParams::with_size(4);
    let first = generate_grid(&params).unwrap();
    let second = generate_grid(&params).unwrap();

    assert_eq!(nodes_xml(&first).unwrap(), nodes_xml(&second).unwrap());
    assert_eq!(edges_xml(&first).unwrap(), edges_xml(&second).unwrap());
}

#[test]
fn test_nodes_xml_attributes() {
    let params = GridParams {
        tl_type: TrafficLightType::Static,
        tl_layout: TrafficLightLayout::Incoming,
        keep_clear: false,
        ..GridParams::with_size(2)
    };
    let xml = nodes_xml(&generate_grid(&params).unwrap()).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
    assert!(xml.contains(
        "<node id=\"n1\" x=\"0\" y=\"0\" type=\"priority\" tlType=\"static\" tlLayout=\"incoming\" keepClear=\"false\"/>"
    ));
    // Fringe nodes carry no traffic light settings
    assert!(xml.contains("<node id=\"o1\" x=\"0\" y=\"-50\" type=\"priority\"/>"));
    assert_eq!(xml.matches("<node ").count(), 4 + 8);
}

#[test]
fn test_edges_xml_attributes() {
    let params = GridParams {
        number_of_lanes: 2,
        edge_max_speed: 20.5,
        edge_priority: 3,
        edge_type: EdgeType::NormalRoad2Lanes,
        ..GridParams::with_size(2)
    };
    let xml = edges_xml(&generate_grid(&params).unwrap()).unwrap();

    assert!(xml.contains(
        "<edge id=\"n1ton4\" from=\"n1\" to=\"n4\" numLanes=\"2\" speed=\"20.5\" priority=\"3\" type=\"normal_road_2lanes\"/>"
    ));
    assert_eq!(xml.matches("<edge ").count(), 8 + 16);
}

#[test]
fn test_write_plain_xml_creates_all_files() {
    let dir = tempfile::tempdir().unwrap();
    let nodes = dir.path().join("plain/nodes.nod.xml");
    let edges = dir.path().join("plain/edges.edg.xml");
    let types = dir.path().join("plain/edge_types.typ.xml");

    let params = GridParams::with_size(3);
    let network = generate_grid(&params).unwrap();
    write_plain_xml(
        &network,
        &params,
        PlainXmlFiles {
            nodes: &nodes,
            edges: &edges,
            types: &types,
        },
    )
    .unwrap();

    let types_xml = std::fs::read_to_string(&types).unwrap();
    for edge_type in EdgeType::ALL {
        assert!(types_xml.contains(&format!("id=\"{}\"", edge_type.tag())));
    }
    assert!(types_xml.contains("numLanes=\"4\""));
    assert_eq!(
        std::fs::read_to_string(&nodes).unwrap(),
        nodes_xml(&network).unwrap()
    );
    assert!(edges.is_file());
}

#[test]
fn test_lattice_nodes_carry_traffic_light_settings() {
    let network = generate_grid(&GridParams::with_size(2)).unwrap();
    for node in network.lattice_nodes() {
        assert_eq!(
            node.kind,
            NodeKind::Lattice {
                tl_type: TrafficLightType::Actuated,
                tl_layout: TrafficLightLayout::Opposites,
                keep_clear: true,
            }
        );
    }
}

#[test]
fn test_enum_codes() {
    assert_eq!(JunctionType::from_code(2).unwrap(), JunctionType::TrafficLight);
    assert_eq!(JunctionType::AllwayStop.tag(), "allway_stop");
    assert_eq!(TrafficLightLayout::from_code(3).unwrap().tag(), "alternateOneWay");
    assert_eq!(VehicleClass::from_code(6).unwrap(), VehicleClass::Truck);
    assert_eq!(EmissionClass::from_code(3).unwrap().tag(), "HBEFA3/PC_G_EU4");
    assert_eq!(EdgeType::NormalRoad3Lanes.code(), 3);

    for code in 1..=8 {
        assert_eq!(JunctionType::from_code(code).unwrap().code(), code);
    }

    let err = JunctionType::from_code(9).unwrap_err();
    assert_eq!(err.to_string(), "Specified junctionType 9 is not supported");
    assert!(TrafficLightType::from_code(0).is_err());
    assert!(EmissionClass::from_code(4).is_err());
}
