//! Grab/move coordinator scenarios driven through the headless harness.

use bevy::prelude::*;

use scene::SceneGraph;

use crate::action_state::ActionStateRegistry;
use crate::oracle::{Oracle, ReparentAssessment, ReparentOracle};
use crate::reversible::ActionProgress;
use crate::test_harness::TestScene;

/// Container "a" with leaf "n1" inside, and a second container "n2" off to
/// the side.
fn two_containers() -> TestScene {
    TestScene::new()
        .with_node("a", "root", Vec3::ZERO, Vec3::splat(4.0))
        .with_node("n1", "a", Vec3::ZERO, Vec3::splat(0.5))
        .with_node("n2", "root", Vec3::new(20.0, 0.0, 0.0), Vec3::splat(2.0))
}

#[test]
fn move_and_undo_scenario() {
    let mut ts = two_containers();

    // The "Move" action state exists with its menu metadata.
    {
        let registry = ts.world_mut().resource::<ActionStateRegistry>();
        let move_ty = registry.lookup("Move").expect("Move is registered");
        assert_eq!(move_ty.icon, 'M');
        assert_eq!(move_ty.color, Color::srgb(0.85, 0.15, 0.15));
    }

    // Grab n1 and drag it over n2: the preview re-parent fires before the
    // drop commits anything.
    ts.press_at(Vec3::ZERO);
    ts.drag_to(Vec3::new(20.0, 0.0, 0.0));
    assert_eq!(ts.parent_of("n1").as_deref(), Some("n2"));

    ts.release();
    let drop_position = ts.position_of("n1").unwrap();
    assert_eq!(ts.parent_of("n1").as_deref(), Some("n2"));
    assert_eq!(drop_position, Vec3::new(20.0, 0.0, 0.0));

    // Exactly one entry, touching exactly n1.
    assert!(ts.history().can_undo());
    assert_eq!(ts.history().entries().len(), 1);
    assert_eq!(
        ts.history().entries()[0].changed_objects(),
        vec!["n1".to_string()]
    );

    ts.undo();
    assert_eq!(ts.parent_of("n1").as_deref(), Some("a"));
    assert_eq!(ts.position_of("n1").unwrap(), Vec3::ZERO);

    ts.redo();
    assert_eq!(ts.parent_of("n1").as_deref(), Some("n2"));
    assert_eq!(ts.position_of("n1").unwrap(), drop_position);
}

#[test]
fn drop_without_target_reverts_parent_and_transform() {
    let mut ts = two_containers();

    ts.press_at(Vec3::ZERO);
    ts.drag_to(Vec3::new(100.0, 0.0, 0.0));
    // The node follows the pointer while dragging.
    assert_eq!(
        ts.position_of("n1").unwrap(),
        Vec3::new(100.0, 0.0, 0.0)
    );

    ts.release();
    assert_eq!(ts.parent_of("n1").as_deref(), Some("a"));
    assert_eq!(ts.position_of("n1").unwrap(), Vec3::ZERO);
    // A fully reverted gesture never becomes a history entry.
    assert!(!ts.history().can_undo());
    assert_eq!(ts.history().entries().len(), 0);
}

#[test]
fn grabbing_empty_space_or_root_stays_no_effect() {
    let mut ts = two_containers();

    // The root has no pick volume; pressing where nothing sits can only
    // "hit" the root, and the root may never be grabbed.
    ts.press_at(Vec3::new(500.0, 0.0, 0.0));
    assert_eq!(
        ts.history().foreground().unwrap().progress(),
        ActionProgress::NoEffect
    );
    ts.release();
    assert_eq!(
        ts.history().foreground().unwrap().progress(),
        ActionProgress::NoEffect
    );
    assert_eq!(ts.history().entries().len(), 0);
}

#[test]
fn preview_reverts_when_dragging_off_the_candidate() {
    let mut ts = two_containers();

    ts.press_at(Vec3::ZERO);
    ts.drag_to(Vec3::new(20.0, 0.0, 0.0));
    assert_eq!(ts.parent_of("n1").as_deref(), Some("n2"));

    // Off into empty space: the preview un-parents back to the original.
    ts.drag_to(Vec3::new(100.0, 0.0, 0.0));
    assert_eq!(ts.parent_of("n1").as_deref(), Some("a"));

    // Dropping with no active preview reverts entirely.
    ts.release();
    assert_eq!(ts.parent_of("n1").as_deref(), Some("a"));
    assert_eq!(ts.position_of("n1").unwrap(), Vec3::ZERO);
    assert!(!ts.history().can_undo());
}

#[test]
fn click_without_drag_is_not_recorded() {
    let mut ts = two_containers();
    ts.press_at(Vec3::ZERO);
    ts.tick(2);
    ts.release();
    assert_eq!(ts.history().entries().len(), 0);
    assert_eq!(ts.parent_of("n1").as_deref(), Some("a"));
    assert_eq!(ts.position_of("n1").unwrap(), Vec3::ZERO);
}

#[test]
fn vanished_grab_target_completes_without_panicking() {
    let mut ts = two_containers();

    ts.press_at(Vec3::ZERO);
    ts.drag_to(Vec3::new(20.0, 0.0, 0.0));

    // Another participant deletes the node mid-drag.
    {
        let mut graph = ts.world_mut().resource_mut::<SceneGraph>();
        let n1 = graph.lookup("n1").unwrap();
        graph.detach(n1).unwrap();
    }

    // The action completes silently; the scene stays consistent and the
    // frame loop keeps running.
    ts.tick(2);
    ts.release();
    assert_eq!(ts.graph().lookup("n1"), None);

    // Undoing whatever was recorded must also tolerate the missing node.
    ts.undo();
    ts.tick(1);
}

/// Oracle that refuses every re-parenting.
struct RefuseAll;

impl ReparentOracle for RefuseAll {
    fn assess(
        &self,
        _graph: &SceneGraph,
        _child: scene::NodeId,
        _new_parent: scene::NodeId,
    ) -> ReparentAssessment {
        ReparentAssessment {
            allowed: false,
            highlight: crate::oracle::HighlightKind::Reject,
        }
    }
}

#[test]
fn rejected_candidates_never_get_previewed() {
    let mut ts = two_containers();
    ts.world_mut()
        .insert_resource(Oracle(Box::new(RefuseAll)));

    ts.press_at(Vec3::ZERO);
    ts.drag_to(Vec3::new(20.0, 0.0, 0.0));
    // The oracle said no: no preview re-parent happened.
    assert_eq!(ts.parent_of("n1").as_deref(), Some("a"));

    ts.release();
    assert_eq!(ts.parent_of("n1").as_deref(), Some("a"));
    assert_eq!(ts.position_of("n1").unwrap(), Vec3::ZERO);
    assert!(!ts.history().can_undo());
}
