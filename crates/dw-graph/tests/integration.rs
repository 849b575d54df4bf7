//! Integration tests for dw-graph.

use std::sync::Arc;

use dw_graph::{
    ConnectionGraphBuilder, EdgeKind, GraphCache, GraphEdge, GraphNode, GraphTraversal,
    SharedGraphCache, signature,
};
use dw_model::*;
use proptest::prelude::*;

fn duct(id: &str, connected_to: Option<&str>) -> Entity {
    let mut props = DuctProps::round(12.0, 10.0);
    props.connected_to = connected_to.map(Into::into);
    props.system_type = Some("supply".to_string());
    Entity::Duct(Duct::new(id, Transform::default(), props))
}

fn diffuser(id: &str, connected_to: &str) -> Entity {
    Entity::Equipment(Equipment {
        id: id.into(),
        transform: Transform::default(),
        props: EquipmentProps {
            name: id.to_string(),
            equipment_type: EquipmentType::Diffuser,
            capacity: 150.0,
            catalog_item_id: None,
            connected_from: None,
            connected_to: Some(connected_to.into()),
            system_type: None,
        },
    })
}

fn room(id: &str) -> Entity {
    Entity::Room(Room {
        id: id.into(),
        transform: Transform::default(),
        props: RoomProps {
            name: "Lobby".to_string(),
            width: 20.0,
            length: 30.0,
            ceiling_height: None,
        },
    })
}

#[test]
fn from_entities_builds_nodes_and_edges() {
    // d1 -> d2 -> d3 <- sd
    let entities = vec![
        duct("d1", Some("d2")),
        duct("d2", Some("d3")),
        duct("d3", None),
        diffuser("sd", "d3"),
        room("r"),
    ];
    let mut cache = GraphCache::default();
    let graph = ConnectionGraphBuilder::from_entities(&entities, &mut cache);

    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.degree("d3"), 2);
    assert_eq!(graph.degree("r"), 0);
    assert_eq!(graph.node("sd").map(|n| n.kind), Some(EntityKind::Equipment));
    assert_eq!(
        graph.node("d1").and_then(|n| n.metadata.system_type.as_deref()),
        Some("supply")
    );
    assert!(graph.check_symmetry().is_ok());
    assert_eq!(graph.signature, signature(["d1", "d2", "d3", "sd", "r"]));
    assert_eq!(cache.len(), 1);
}

#[test]
fn repeated_build_is_served_from_cache() {
    let entities = vec![duct("a", Some("b")), duct("b", None)];
    let mut cache = GraphCache::default();

    let first = ConnectionGraphBuilder::from_entities_cached(&entities, &mut cache);
    let reordered = vec![entities[1].clone(), entities[0].clone()];
    let second = ConnectionGraphBuilder::from_entities_cached(&reordered, &mut cache);

    assert_eq!(first.signature, second.signature);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}

#[test]
fn signature_ignores_topology() {
    // Same ids, different edges: same key. Callers must invalidate.
    let linked = vec![duct("a", Some("b")), duct("b", None)];
    let unlinked = vec![duct("a", None), duct("b", None)];
    let mut cache = GraphCache::default();

    let first = ConnectionGraphBuilder::from_entities_cached(&linked, &mut cache);
    let stale = ConnectionGraphBuilder::from_entities_cached(&unlinked, &mut cache);
    assert!(Arc::ptr_eq(&first, &stale));
    assert_eq!(stale.edge_count(), 1);

    assert!(cache.invalidate(&first.signature));
    let fresh = ConnectionGraphBuilder::from_entities_cached(&unlinked, &mut cache);
    assert_eq!(fresh.edge_count(), 0);
}

#[test]
fn shared_cache_wraps_cached_build() {
    let entities = vec![duct("a", Some("b")), duct("b", None)];
    let shared = SharedGraphCache::new(8);

    let first = ConnectionGraphBuilder::from_entities_cached(&entities, &mut shared.lock());
    let second = ConnectionGraphBuilder::from_entities_cached(&entities, &mut shared.lock());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(shared.len(), 1);
}

#[test]
fn traversal_over_built_graph() {
    let entities = vec![
        duct("d1", Some("d2")),
        duct("d2", Some("d3")),
        duct("d3", None),
        diffuser("sd", "d3"),
    ];
    let mut cache = GraphCache::default();
    let graph = ConnectionGraphBuilder::from_entities(&entities, &mut cache);
    let traversal = GraphTraversal::new(&graph);

    let affected = traversal.get_affected_entities("d1");
    assert_eq!(affected.directly_affected, [dw_core::EntityId::from("d2")]);
    assert_eq!(affected.indirectly_affected.len(), 2);
    assert_eq!(affected.paths["sd"].len(), 4);
}

proptest! {
    #[test]
    fn adjacency_stays_symmetric(pairs in prop::collection::vec((0_u8..8, 0_u8..8), 0..40)) {
        let mut builder = ConnectionGraphBuilder::new();
        for i in 0..8 {
            builder.add_node(GraphNode::new(format!("n{i}"), EntityKind::Duct));
        }
        for (s, t) in pairs {
            builder.add_edge(GraphEdge::new(format!("n{s}"), format!("n{t}"), EdgeKind::Direct));
        }
        let graph = builder.finish((0..8).map(|i| format!("n{i}")));

        prop_assert!(graph.check_symmetry().is_ok());
        for node in graph.nodes() {
            let mut seen = node.connections.clone();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), node.connections.len());
        }
    }
}
