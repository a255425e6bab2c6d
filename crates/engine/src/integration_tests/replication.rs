//! Replication behavior of committed, undone, and remote actions.

use bevy::prelude::*;

use net::transport::MemoryEndpoint;
use net::{decode_frame, encode_frame, NetCommand, NetEnvelope, Transport};

use crate::test_harness::TestScene;

/// Drains every frame the observer endpoint has seen and returns the
/// commands sent by the harness participant (id 1).
fn sent_commands(observer: &mut MemoryEndpoint) -> Vec<NetCommand> {
    let mut commands = Vec::new();
    while let Some(bytes) = observer.try_recv() {
        let envelope = decode_frame(&bytes).expect("harness frames decode");
        if envelope.requester == 1 {
            commands.push(envelope.command);
        }
    }
    commands
}

fn move_scene() -> TestScene {
    TestScene::new()
        .with_node("a", "root", Vec3::ZERO, Vec3::splat(4.0))
        .with_node("n1", "a", Vec3::ZERO, Vec3::splat(0.5))
        .with_node("n2", "root", Vec3::new(20.0, 0.0, 0.0), Vec3::splat(2.0))
}

#[test]
fn committed_move_broadcasts_absolute_state() {
    let mut ts = move_scene();
    let mut observer = ts.capture_wire();

    ts.press_at(Vec3::ZERO);
    ts.drag_to(Vec3::new(20.0, 0.0, 0.0));
    ts.release();

    let commands = sent_commands(&mut observer);
    assert_eq!(
        commands,
        vec![
            NetCommand::SetParent {
                child: "n1".to_string(),
                parent: "n2".to_string(),
            },
            NetCommand::MoveNode {
                id: "n1".to_string(),
                position: [20.0, 0.0, 0.0],
            },
        ]
    );
}

#[test]
fn undo_and_redo_rebroadcast_the_restored_state() {
    let mut ts = move_scene();
    let mut observer = ts.capture_wire();

    ts.press_at(Vec3::ZERO);
    ts.drag_to(Vec3::new(20.0, 0.0, 0.0));
    ts.release();
    let _ = sent_commands(&mut observer);

    ts.undo();
    assert_eq!(
        sent_commands(&mut observer),
        vec![
            NetCommand::SetParent {
                child: "n1".to_string(),
                parent: "a".to_string(),
            },
            NetCommand::MoveNode {
                id: "n1".to_string(),
                position: [0.0, 0.0, 0.0],
            },
        ]
    );

    ts.redo();
    assert_eq!(
        sent_commands(&mut observer),
        vec![
            NetCommand::SetParent {
                child: "n1".to_string(),
                parent: "n2".to_string(),
            },
            NetCommand::MoveNode {
                id: "n1".to_string(),
                position: [20.0, 0.0, 0.0],
            },
        ]
    );
}

#[test]
fn reverted_drags_send_nothing() {
    let mut ts = move_scene();
    let mut observer = ts.capture_wire();

    ts.press_at(Vec3::ZERO);
    ts.drag_to(Vec3::new(100.0, 0.0, 0.0));
    ts.release();

    assert!(sent_commands(&mut observer).is_empty());
}

#[test]
fn remote_commands_apply_without_entering_the_history() {
    let mut ts = move_scene();
    let mut observer = ts.capture_wire();

    let remote = NetEnvelope {
        requester: 2,
        seq: 1,
        command: NetCommand::NewNode {
            id: "remote-1".to_string(),
            parent: "root".to_string(),
            label: "Remote".to_string(),
            position: [7.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
            half_extents: [0.5, 0.5, 0.5],
            marked: false,
        },
    };
    // Delivered twice: the second application converges on the same state.
    observer.send(encode_frame(&remote));
    observer.send(encode_frame(&remote));
    ts.tick(1);

    assert_eq!(ts.parent_of("remote-1").as_deref(), Some("root"));
    assert_eq!(
        ts.position_of("remote-1").unwrap(),
        Vec3::new(7.0, 0.0, 0.0)
    );
    // Remote effects are apply-only: the local history records nothing and
    // undo stays a no-op.
    assert_eq!(ts.history().entries().len(), 0);
    ts.undo();
    assert_eq!(ts.parent_of("remote-1").as_deref(), Some("root"));
}

#[test]
fn remote_command_for_missing_node_is_skipped_not_fatal() {
    let mut ts = move_scene();
    let mut observer = ts.capture_wire();

    observer.send(encode_frame(&NetEnvelope {
        requester: 2,
        seq: 1,
        command: NetCommand::MoveNode {
            id: "ghost".to_string(),
            position: [1.0, 1.0, 1.0],
        },
    }));
    observer.send(encode_frame(&NetEnvelope {
        requester: 2,
        seq: 2,
        command: NetCommand::MarkNode {
            id: "n1".to_string(),
            on: true,
        },
    }));
    ts.tick(1);

    // The bad command was skipped; the following one still applied.
    assert_eq!(ts.is_marked("n1"), Some(true));
}
