#[macro_use]
extern crate approx;
extern crate anchorage;

use anchorage::math::*;
use anchorage::prelude::*;

fn translate(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(x, y, z))
}

#[test]
fn hierarchy() {
    let mut graph = SceneGraph::new();
    graph.add_object("o1", None, false);
    graph.add_object("o2", None, false);
    graph.add_frame("o1", "f1", None, None);
    graph.add_node("o1", "f1", "n1", None, None);

    assert!(graph.is_ancestor("n1", "f1"));
    assert!(graph.is_ancestor("n1", "o1"));
    assert!(graph.is_ancestor("n1", ROOT_ID));
    assert!(graph.is_ancestor("f1", "o1"));
    assert!(!graph.is_ancestor("f1", "o2"));
    assert!(!graph.is_ancestor("o1", "n1"));

    assert!(graph.is_root(ROOT_ID));
    assert!(!graph.is_root("f1"));
    assert!(graph.is_leaf("n1"));
    assert!(!graph.is_leaf("f1"));

    let descendants: Vec<_> = graph.descendants("o1").collect();
    assert_eq!(descendants, vec![NodeId::from("f1"), NodeId::from("n1")]);
}

#[test]
fn composition_invariant() {
    let mut graph = SceneGraph::new();
    graph.add_object("o", Some(Matrix4::from_angle_z(Deg(90.0)) * translate(5.0, 0.0, 0.0)), false);
    graph.add_frame("o", "f", None, Some(translate(100.0, 0.0, 0.0)));
    graph.add_node("o", "f", "n", None, Some(translate(0.0, 50.0, 0.0)));
    graph.recompute();

    let o = *graph.node("o").unwrap().world_matrix();
    let f = *graph.node("f").unwrap().world_matrix();
    let n = graph.node("n").unwrap();

    assert_ulps_eq!(o * *graph.node("f").unwrap().local_matrix(), f);
    assert_ulps_eq!(f * *n.local_matrix(), *n.world_matrix());
}

#[test]
fn dirty_flags() {
    let mut graph = SceneGraph::new();
    graph.add_object("o", None, false);
    graph.add_frame("o", "f", None, None);
    graph.add_node("o", "f", "n1", None, None);
    graph.add_node("o", "f", "n2", None, None);
    graph.recompute();

    assert!(!graph.node("f").unwrap().needs_recompute());
    assert!(!graph.node("n1").unwrap().needs_recompute());

    graph.set_local_matrix("f", translate(1.0, 0.0, 0.0));

    // The whole subtree under "f" is stale; the ancestor chain only
    // carries the subtree flag.
    assert!(graph.node("f").unwrap().needs_recompute());
    assert!(graph.node("n1").unwrap().needs_recompute());
    assert!(graph.node("n2").unwrap().needs_recompute());
    assert!(!graph.node("o").unwrap().needs_recompute());
    assert!(graph.node("o").unwrap().subtree_needs_recompute());
    assert!(graph.node(ROOT_ID).unwrap().subtree_needs_recompute());

    graph.recompute();

    for id in &["o", "f", "n1", "n2", ROOT_ID] {
        assert!(!graph.node(id).unwrap().needs_recompute());
        assert!(!graph.node(id).unwrap().subtree_needs_recompute());
    }
}

#[test]
fn idempotent_upsert() {
    let mut graph = SceneGraph::new();
    graph.add_object("o", None, false);
    graph.add_object("o", Some(translate(7.0, 0.0, 0.0)), false);

    assert_eq!(graph.len(), 2); // root + o
    assert_ulps_eq!(
        *graph.node("o").unwrap().local_matrix(),
        translate(7.0, 0.0, 0.0)
    );
    assert_eq!(graph.children(ROOT_ID).len(), 1);
}

#[test]
fn relative_round_trip() {
    let mut graph = SceneGraph::new();
    graph.add_object("a", Some(Matrix4::from_angle_y(Deg(45.0)) * translate(3.0, 1.0, 0.0)), false);
    graph.add_object("b", Some(translate(-2.0, 8.0, 5.0)), false);
    graph.recompute();

    let relative = graph.matrix_relative_to("a", "b").unwrap();
    let a = *graph.node("a").unwrap().world_matrix();
    let b = *graph.node("b").unwrap().world_matrix();
    assert_relative_eq!(b * relative, a, epsilon = 1.0e-5);
}

#[test]
fn subtree_removal() {
    let mut graph = SceneGraph::new();
    graph.add_object("o", None, false);
    graph.add_frame("o", "f", None, None);
    graph.add_node("o", "f", "n1", None, None);
    graph.add_node("o", "f", "n2", None, None);

    graph.remove_subtree("f");

    assert!(graph.contains("o"));
    assert!(!graph.contains("f"));
    assert!(!graph.contains("n1"));
    assert!(!graph.contains("n2"));
    assert!(graph.children("o").is_empty());
    assert_eq!(graph.len(), 2);
}

#[test]
fn cycle_rejection() {
    let mut graph = SceneGraph::new();
    graph.add_object("a", None, false);
    graph.add_object("b", None, false);
    graph.add_object("c", None, false);

    graph.set_parent("b", "a").unwrap();
    graph.set_parent("c", "b").unwrap();

    assert!(graph.set_parent("a", "a").is_err());
    assert!(graph.set_parent("a", "c").is_err());
    assert!(graph.set_parent("a", "b").is_err());

    // The hierarchy is untouched by the rejected calls.
    assert_eq!(graph.parent("a"), Some(NodeId::from(ROOT_ID)));
}

#[test]
fn coordinate_adapter_retargets_children() {
    let mut graph = SceneGraph::new();
    graph.add_object("anchor", None, true);

    assert!(graph.contains("anchor.adapter"));
    assert!(graph.node("anchor.adapter").unwrap().is_coordinate_adapter());

    graph.add_frame("anchor", "panel", None, Some(translate(0.0, 100.0, 0.0)));
    assert_eq!(graph.parent("panel"), Some(NodeId::from("anchor.adapter")));

    // A -90 degree rotation about x maps +y onto -z.
    let position = graph.world_position("panel").unwrap();
    assert_relative_eq!(position, Point3::new(0.0, 0.0, -100.0), epsilon = 1.0e-3);
}

#[test]
fn linked_entity_scale_compensation() {
    let mut graph = SceneGraph::new();
    graph.add_object("o", None, false);

    let info = EntityInfo {
        name: "panel".into(),
        kind: "frame".into(),
    };

    let mut outer = LinkedEntity::new(info.clone());
    outer.x = Some(10.0);
    outer.scale = Some(2.0);
    graph.add_frame("o", "f", Some(outer), None);

    let mut inner = LinkedEntity::new(info);
    inner.x = Some(4.0);
    inner.scale = Some(2.0);
    graph.add_node("o", "f", "n", Some(inner), None);

    graph.recompute();

    // The inner scale is divided by the accumulated linked ancestor
    // scale, so the world scale stays 2.0 instead of compounding to 4.0.
    let n = graph.node("n").unwrap().world_matrix().clone();
    assert_relative_eq!(n.x.x, 2.0, epsilon = 1.0e-5);
    assert_relative_eq!(
        graph.world_position("n").unwrap(),
        Point3::new(18.0, 0.0, 0.0),
        epsilon = 1.0e-4
    );
}

#[test]
fn rerender_flags_follow_actual_changes() {
    let mut graph = SceneGraph::new();
    graph.add_object("o", None, false);
    graph.add_frame("o", "f", None, None);
    graph.recompute();
    graph.clear_rerender_flags();

    // Re-flagging without an actual change recomputes but does not mark
    // anything for rerender.
    graph.set_local_matrix("f", Matrix4::identity());
    graph.recompute();
    assert!(!graph.node("f").unwrap().needs_rerender());

    graph.set_local_matrix("f", translate(1.0, 0.0, 0.0));
    graph.recompute();
    assert!(graph.node("f").unwrap().needs_rerender());
    assert!(graph.node("o").unwrap().subtree_needs_rerender());
    assert!(graph.node(ROOT_ID).unwrap().subtree_needs_rerender());
}

#[test]
fn distance_queries() {
    let mut graph = SceneGraph::new();
    graph.add_object("a", Some(translate(0.0, 0.0, 0.0)), false);
    graph.add_object("b", Some(translate(3.0, 4.0, 0.0)), false);

    assert_ulps_eq!(graph.distance_between("a", "b").unwrap(), 5.0);
    assert_ulps_eq!(
        graph.distance_to_point("b", [3.0, 4.0, 12.0]).unwrap(),
        12.0
    );
    assert!(graph.distance_between("a", "ghost").is_none());
    assert!(graph.world_position("ghost").is_none());
}

#[test]
fn reparent_to_world() {
    let mut graph = SceneGraph::new();
    graph.add_object("o", Some(translate(1.0, 0.0, 0.0)), false);
    graph.reparent_to_world("o", "world_a");

    assert_eq!(graph.parent("o"), Some(NodeId::from("world_a")));
    assert_eq!(graph.parent("world_a"), Some(NodeId::from(ROOT_ID)));

    // Refused: a node can not be its own world anchor.
    graph.reparent_to_world("o", "o");
    assert_eq!(graph.parent("o"), Some(NodeId::from("world_a")));
}

#[test]
fn set_position_relative_to() {
    let mut graph = SceneGraph::new();
    graph.add_object("a", Some(translate(10.0, 0.0, 0.0)), false);
    graph.add_object("b", None, false);
    graph.recompute();

    graph.set_position_relative_to("b", "a", &translate(0.0, 5.0, 0.0));
    let position = graph.world_position("b").unwrap();
    assert_relative_eq!(position, Point3::new(10.0, 5.0, 0.0), epsilon = 1.0e-5);
}

#[test]
fn end_to_end_scenario() {
    let mut graph = SceneGraph::new();
    graph.add_object("O", Some(Matrix4::identity()), false);
    graph.add_frame("O", "F", None, Some(translate(100.0, 0.0, 0.0)));
    graph.add_node("O", "F", "N", None, Some(translate(0.0, 50.0, 0.0)));

    assert_relative_eq!(
        graph.world_position("N").unwrap(),
        Point3::new(100.0, 50.0, 0.0),
        epsilon = 1.0e-4
    );

    graph.update_position(&PositionUpdate {
        object: "O",
        frame: None,
        node: None,
        local: translate(10.0, 0.0, 0.0),
        x: None,
        y: None,
        scale: None,
    });

    assert_relative_eq!(
        graph.world_position("N").unwrap(),
        Point3::new(110.0, 50.0, 0.0),
        epsilon = 1.0e-4
    );
}
