//! Scenarios for the one-shot actions (create, delete, edit, mark) and the
//! scale gesture.

use bevy::prelude::*;

use crate::action_state::ActionKind;
use crate::test_harness::TestScene;

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

#[test]
fn new_node_create_undo_redo() {
    let mut ts = TestScene::new().with_node("a", "root", Vec3::ZERO, Vec3::splat(4.0));
    ts.select(ActionKind::NewNode);

    ts.press_at(Vec3::ZERO);
    ts.release();

    assert_eq!(ts.history().entries().len(), 1);
    let created = ts.history().entries()[0].changed_objects()[0].clone();
    assert_eq!(ts.parent_of(&created).as_deref(), Some("a"));
    // The node sits where the probe ray entered the container.
    assert!(approx(
        ts.position_of(&created).unwrap(),
        Vec3::new(0.0, 0.0, 4.0)
    ));

    ts.undo();
    assert_eq!(ts.graph().lookup(&created), None);

    ts.redo();
    assert_eq!(ts.parent_of(&created).as_deref(), Some("a"));
}

#[test]
fn delete_restores_whole_subtree_on_undo() {
    let mut ts = TestScene::new()
        .with_node("b", "root", Vec3::new(5.0, 0.0, 0.0), Vec3::splat(1.0))
        .with_node("c", "b", Vec3::new(6.0, 0.0, 0.0), Vec3::splat(0.5));
    ts.select(ActionKind::DeleteNode);

    ts.press_at(Vec3::new(5.0, 0.0, 0.0));
    ts.release();

    assert_eq!(ts.graph().lookup("b"), None);
    assert_eq!(ts.graph().lookup("c"), None);
    // The entry names every removed node.
    let touched = ts.history().entries()[0].changed_objects();
    assert!(touched.contains(&"b".to_string()));
    assert!(touched.contains(&"c".to_string()));

    ts.undo();
    assert_eq!(ts.parent_of("b").as_deref(), Some("root"));
    assert_eq!(ts.parent_of("c").as_deref(), Some("b"));
    assert_eq!(
        ts.position_of("c").unwrap(),
        Vec3::new(6.0, 0.0, 0.0)
    );

    ts.redo();
    assert_eq!(ts.graph().lookup("b"), None);
    assert_eq!(ts.graph().lookup("c"), None);
}

#[test]
fn edit_label_undo_redo() {
    let mut ts = TestScene::new().with_node("n1", "root", Vec3::ZERO, Vec3::splat(0.5));
    ts.select(ActionKind::EditNode);

    ts.request_edit("n1", "Renamed");
    assert_eq!(ts.label_of("n1").as_deref(), Some("Renamed"));
    assert_eq!(ts.history().entries().len(), 1);

    ts.undo();
    assert_eq!(ts.label_of("n1").as_deref(), Some("N1"));

    ts.redo();
    assert_eq!(ts.label_of("n1").as_deref(), Some("Renamed"));
}

#[test]
fn edit_request_for_missing_node_is_ignored() {
    let mut ts = TestScene::new().with_node("n1", "root", Vec3::ZERO, Vec3::splat(0.5));
    ts.select(ActionKind::EditNode);
    ts.request_edit("ghost", "Whatever");
    assert_eq!(ts.history().entries().len(), 0);
}

#[test]
fn mark_toggle_undo_redo() {
    let mut ts = TestScene::new().with_node("n1", "root", Vec3::ZERO, Vec3::splat(0.5));
    ts.select(ActionKind::Mark);

    ts.press_at(Vec3::ZERO);
    ts.release();
    assert_eq!(ts.is_marked("n1"), Some(true));

    ts.undo();
    assert_eq!(ts.is_marked("n1"), Some(false));

    ts.redo();
    assert_eq!(ts.is_marked("n1"), Some(true));
}

#[test]
fn scale_commit_undo_redo() {
    let mut ts = TestScene::new().with_node("n1", "root", Vec3::ZERO, Vec3::splat(0.5));
    ts.select(ActionKind::Scale);

    ts.press_at(Vec3::ZERO);
    // Two world units of upward travel: factor 1 + 2 * 0.25 = 1.5.
    ts.drag_to(Vec3::new(0.0, 2.0, 0.0));
    ts.release();

    assert!(approx(ts.scale_of("n1").unwrap(), Vec3::splat(1.5)));
    assert_eq!(ts.history().entries().len(), 1);

    ts.undo();
    assert!(approx(ts.scale_of("n1").unwrap(), Vec3::ONE));

    ts.redo();
    assert!(approx(ts.scale_of("n1").unwrap(), Vec3::splat(1.5)));
}

#[test]
fn scale_chains_onto_the_same_node_without_reselecting() {
    let mut ts = TestScene::new().with_node("n1", "root", Vec3::ZERO, Vec3::splat(0.5));
    ts.select(ActionKind::Scale);

    ts.press_at(Vec3::ZERO);
    ts.drag_to(Vec3::new(0.0, 2.0, 0.0));
    ts.release();
    assert!(approx(ts.scale_of("n1").unwrap(), Vec3::splat(1.5)));

    // Press over empty space: the chained instance continues with n1.
    ts.press_at(Vec3::new(100.0, 0.0, 0.0));
    ts.drag_to(Vec3::new(100.0, 1.0, 0.0));
    ts.release();

    // 1.5 * (1 + 1 * 0.25) = 1.875
    assert!(approx(ts.scale_of("n1").unwrap(), Vec3::splat(1.875)));
    assert_eq!(ts.history().entries().len(), 2);
}

#[test]
fn completed_actions_truncate_the_redo_tail() {
    let mut ts = TestScene::new().with_node("n1", "root", Vec3::ZERO, Vec3::splat(0.5));
    ts.select(ActionKind::Mark);

    // Three committed toggles.
    for _ in 0..3 {
        ts.press_at(Vec3::ZERO);
        ts.release();
    }
    assert_eq!(ts.history().entries().len(), 3);

    ts.undo();
    ts.undo();
    assert!(ts.history().can_redo());

    // A new completion discards the undone tail.
    ts.press_at(Vec3::ZERO);
    ts.release();
    assert_eq!(ts.history().entries().len(), 2);
    assert!(!ts.history().can_redo());

    // Redo is a no-op now.
    let marked = ts.is_marked("n1");
    ts.redo();
    assert_eq!(ts.is_marked("n1"), marked);
}
