/// INTEGRATION TESTS: a room driving the engine for connected clients
///
/// Covers:
/// 1. Incoming clients get a snapshot, then only diffs
/// 2. Queued actions are applied at the start of the next tick
/// 3. Ticks with nothing to report are not broadcast
/// 4. Back pressure: full inbound queue, shared senders, full client outbox
/// 5. Unknown client keys
use std::thread;

use crossbeam_channel::TrySendError;
use serde_json::Value as Json;

use tickstate_server::{Room, RoomConfig, RoomError};
use tickstate_shared::Entity;
use tickstate_test::{schema, Fields, GameAction, GameActions, PLAYER};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn room_with(config: RoomConfig) -> (Room<GameActions>, Fields) {
    let schema = schema();
    let fields = Fields::resolve(&schema).unwrap();
    let room = Room::new(schema, config, GameActions::new(fields));
    (room, fields)
}

fn decode(frame: &[u8]) -> Json {
    serde_json::from_slice(frame).unwrap()
}

#[test]
fn deploy_creates_the_zone() {
    init_logger();
    let (room, _) = room_with(RoomConfig::default());

    let zone = room.actions().zone().unwrap();
    assert!(room.engine().handle(zone).exists());
    assert_eq!(room.current_tick(), 0);
}

#[test]
fn incoming_client_gets_snapshot_then_diffs() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig::default());
    let zone = room.actions().zone().unwrap();
    room.tick().unwrap();

    let client = room.connect();
    assert!(!room.is_connected(&client));

    let report = room.tick().unwrap();
    assert_eq!(report.promoted, vec![client]);
    assert_eq!(report.recipients, 0, "nothing changed this tick");
    assert!(room.is_connected(&client));

    let frames = room.drain_outbox(&client).unwrap();
    assert_eq!(frames.len(), 1);
    let snapshot = decode(&frames[0]);
    let zone_json = &snapshot["zone"][zone.id.to_string()];
    assert_eq!(zone_json["operationKind"], "UNCHANGED");
    assert_eq!(zone_json["tags"], serde_json::json!([]));

    room.try_submit(GameAction::SpawnPlayer).unwrap();
    let report = room.tick().unwrap();
    assert_eq!(report.actions, 1);
    assert_eq!(report.recipients, 1);
    assert!(report.promoted.is_empty());

    let frames = room.drain_outbox(&client).unwrap();
    assert_eq!(frames.len(), 1);
    let diff = decode(&frames[0]);
    let player = room.actions().spawned()[0];
    let players = &diff["zone"][zone.id.to_string()]["players"];
    assert_eq!(players[0]["id"], serde_json::json!(player.id.to_u64()));
    assert_eq!(players[0]["operationKind"], "UPDATE");
}

#[test]
fn first_tick_publishes_deploy_before_snapshot() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig::default());
    let client = room.connect();

    let report = room.tick().unwrap();

    assert_eq!(report.elements, 1, "the zone created on deploy");
    assert_eq!(report.recipients, 0, "incoming clients skip the diff");
    assert_eq!(room.pending_frames(&client).unwrap(), 1);
}

#[test]
fn quiet_ticks_are_not_broadcast() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig::default());
    let client = room.connect();
    room.tick().unwrap();
    room.drain_outbox(&client).unwrap();

    for _ in 0..3 {
        let report = room.tick().unwrap();
        assert_eq!(report.elements, 0);
        assert_eq!(report.recipients, 0);
    }
    assert_eq!(room.pending_frames(&client).unwrap(), 0);
    assert_eq!(room.actions().ticks(), 4);
}

#[test]
fn move_and_remove_player() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig::default());
    let zone = room.actions().zone().unwrap();
    room.try_submit(GameAction::SpawnPlayer).unwrap();
    room.tick().unwrap();
    let player = room.actions().spawned()[0];

    let client = room.connect();
    room.tick().unwrap();
    room.drain_outbox(&client).unwrap();

    room.try_submit(GameAction::MovePlayer {
        player: player.id,
        x: 5.0,
        y: -2.5,
    })
    .unwrap();
    room.tick().unwrap();
    let diff = decode(&room.drain_outbox(&client).unwrap()[0]);
    let zone_json = &diff["zone"][zone.id.to_string()];
    assert_eq!(zone_json["operationKind"], "UNCHANGED");
    let position = &zone_json["players"][0]["position"];
    assert_eq!(position["operationKind"], "UPDATE");
    assert_eq!(position["x"], 5.0);
    assert_eq!(position["y"], -2.5);

    room.try_submit(GameAction::RemovePlayer { player: player.id })
        .unwrap();
    room.tick().unwrap();
    let diff = decode(&room.drain_outbox(&client).unwrap()[0]);
    let removed = &diff["zone"][zone.id.to_string()]["players"][0];
    assert_eq!(removed["operationKind"], "DELETE");
    assert!(removed.get("position").is_none());
    assert!(!room.engine().handle(player).exists());
}

#[test]
fn target_actions_reach_the_diff() {
    init_logger();
    let (mut room, fields) = room_with(RoomConfig::default());
    room.try_submit(GameAction::SpawnPlayer).unwrap();
    room.try_submit(GameAction::SpawnPlayer).unwrap();
    room.tick().unwrap();
    let (a, b) = (room.actions().spawned()[0], room.actions().spawned()[1]);

    room.try_submit(GameAction::SetTarget {
        player: a.id,
        target: b,
    })
    .unwrap();
    room.tick().unwrap();
    assert_eq!(room.engine().handle(a).target(fields.player_target), Some(b));

    room.try_submit(GameAction::ClearTarget { player: a.id })
        .unwrap();
    room.tick().unwrap();
    assert!(room.engine().handle(a).target(fields.player_target).is_none());
}

#[test]
fn unknown_entities_in_actions_are_ignored() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig::default());
    room.tick().unwrap();

    let ghost = Entity::new(PLAYER, room.engine_mut().generate_id());
    room.try_submit(GameAction::SetTarget {
        player: ghost.id,
        target: ghost,
    })
    .unwrap();
    room.try_submit(GameAction::RemovePlayer { player: ghost.id })
        .unwrap();

    let report = room.tick().unwrap();
    assert_eq!(report.actions, 2);
    assert_eq!(report.elements, 0);
}

#[test]
fn full_inbound_queue_rejects_actions() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig {
        inbound_capacity: 2,
        ..Default::default()
    });

    room.try_submit(GameAction::SpawnPlayer).unwrap();
    room.try_submit(GameAction::SpawnPlayer).unwrap();
    assert!(matches!(
        room.try_submit(GameAction::SpawnPlayer),
        Err(RoomError::InboundFull)
    ));

    let report = room.tick().unwrap();
    assert_eq!(report.actions, 2);
    room.try_submit(GameAction::SpawnPlayer).unwrap();
}

#[test]
fn actions_from_other_threads() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig::default());
    let sender = room.action_sender();

    let worker = thread::spawn(move || {
        for _ in 0..3 {
            sender.send(GameAction::SpawnPlayer).unwrap();
        }
    });
    worker.join().unwrap();

    let report = room.tick().unwrap();
    assert_eq!(report.actions, 3);
    assert_eq!(room.actions().spawned().len(), 3);
}

#[test]
fn shared_sender_respects_the_inbound_bound() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig {
        inbound_capacity: 4,
        ..Default::default()
    });
    let sender = room.action_sender();
    assert_eq!(sender.capacity(), Some(4));

    // one sender borrowed by several producers at once
    let accepted: usize = thread::scope(|scope| {
        let producers: Vec<_> = (0..3)
            .map(|_| {
                scope.spawn(|| {
                    (0..4)
                        .filter(|_| sender.try_send(GameAction::SpawnPlayer).is_ok())
                        .count()
                })
            })
            .collect();
        producers
            .into_iter()
            .map(|producer| producer.join().unwrap())
            .sum()
    });
    assert_eq!(accepted, 4);
    assert!(sender.is_full());
    assert!(matches!(
        sender.try_send(GameAction::SpawnPlayer),
        Err(TrySendError::Full(_))
    ));
    assert!(matches!(
        room.try_submit(GameAction::SpawnPlayer),
        Err(RoomError::InboundFull)
    ));

    let report = room.tick().unwrap();
    assert_eq!(report.actions, 4);
    assert!(sender.is_empty());
}

#[test]
fn slow_client_is_dropped() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig {
        outbound_capacity: 1,
        ..Default::default()
    });
    let slow = room.connect();
    let fast = room.connect();
    room.tick().unwrap();
    room.drain_outbox(&fast).unwrap();

    room.try_submit(GameAction::SpawnPlayer).unwrap();
    let report = room.tick().unwrap();

    assert_eq!(report.dropped, vec![slow]);
    assert_eq!(report.recipients, 1);
    assert!(!room.is_connected(&slow));
    assert!(matches!(
        room.drain_outbox(&slow),
        Err(RoomError::UnknownClient(key)) if key == slow
    ));
    assert_eq!(room.drain_outbox(&fast).unwrap().len(), 1);
}

#[test]
fn disconnect_unknown_client() {
    init_logger();
    let (mut room, _) = room_with(RoomConfig::default());
    let client = room.connect();
    assert_eq!(room.client_keys().count(), 1);

    room.disconnect(&client).unwrap();
    assert_eq!(room.client_keys().count(), 0);
    assert!(matches!(
        room.disconnect(&client),
        Err(RoomError::UnknownClient(_))
    ));
    assert!(room.pending_frames(&client).is_err());
}
