/// PROPERTY TESTS: engine invariants under random operation scripts
///
/// After every operation of a random script:
/// 1. No shared edge points at a missing entity
/// 2. Owned entities survive a direct delete
/// 3. Replacing a union occupant removes the previous one
///
/// After the whole script, a snapshot followed by a commit leaves nothing to
/// report.
use proptest::prelude::*;

use tickstate_shared::{Entity, Value};
use tickstate_test::{TestGame, ITEM, PLAYER, POSITION, ZONE, ZONE_ITEM};

#[derive(Clone, Debug)]
enum Op {
    SpawnPlayer { in_zone: bool },
    SpawnZoneItem,
    Target(usize, usize),
    TargetZoneItem(usize, usize),
    Untarget(usize),
    Guild(usize, usize),
    Move(usize, f64),
    Origin(usize, bool),
    RemovePlayer(usize),
    Delete(usize),
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(|in_zone| Op::SpawnPlayer { in_zone }),
        Just(Op::SpawnZoneItem),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Target(a, b)),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::TargetZoneItem(a, b)),
        any::<usize>().prop_map(Op::Untarget),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Guild(a, b)),
        (any::<usize>(), -100.0..100.0f64).prop_map(|(a, x)| Op::Move(a, x)),
        (any::<usize>(), any::<bool>()).prop_map(|(a, to_player)| Op::Origin(a, to_player)),
        any::<usize>().prop_map(Op::RemovePlayer),
        any::<usize>().prop_map(Op::Delete),
        Just(Op::Tick),
    ]
}

fn pick(entities: &[Entity], index: usize) -> Option<Entity> {
    if entities.is_empty() {
        return None;
    }
    Some(entities[index % entities.len()])
}

struct Script {
    game: TestGame,
    zone: Entity,
}

impl Script {
    fn new() -> Self {
        let mut game = TestGame::new();
        let zone = game.engine.create(ZONE);
        Self { game, zone }
    }

    fn apply(&mut self, op: Op) {
        let fields = self.game.fields;
        let engine = &mut self.game.engine;
        let players = engine.entities(PLAYER);

        match op {
            Op::SpawnPlayer { in_zone: true } => {
                engine.add_child(fields.zone_players, self.zone.id);
            }
            Op::SpawnPlayer { in_zone: false } => {
                engine.create(PLAYER);
            }
            Op::SpawnZoneItem => {
                engine.add_child(fields.zone_items, self.zone.id);
            }
            Op::Target(a, b) => {
                if let (Some(a), Some(b)) = (pick(&players, a), pick(&players, b)) {
                    engine.set_ref(fields.player_target, a.id, b);
                }
            }
            Op::TargetZoneItem(a, b) => {
                let zone_items = engine.entities(ZONE_ITEM);
                if let (Some(a), Some(b)) = (pick(&players, a), pick(&zone_items, b)) {
                    engine.set_ref(fields.player_target, a.id, b);
                    engine.add_ref(fields.player_targeted_by, a.id, b);
                }
            }
            Op::Untarget(a) => {
                if let Some(a) = pick(&players, a) {
                    engine.unset_ref(fields.player_target, a.id);
                }
            }
            Op::Guild(a, b) => {
                if let (Some(a), Some(b)) = (pick(&players, a), pick(&players, b)) {
                    engine.add_ref(fields.player_guild_members, a.id, b);
                }
            }
            Op::Move(a, x) => {
                let positions = engine.entities(POSITION);
                if let Some(position) = pick(&positions, a) {
                    engine.set_value(fields.position_x, position.id, x);
                }
            }
            Op::Origin(a, to_player) => {
                let items = engine.entities(ITEM);
                let Some(item) = pick(&items, a) else {
                    return;
                };
                let before = engine.handle(item).variant(fields.item_origin);
                let kind = if to_player { PLAYER } else { POSITION };
                let after = engine.set_variant(fields.item_origin, item.id, kind);
                assert!(!after.is_stub());
                assert_eq!(engine.handle(item).variant(fields.item_origin), Some(after));
                if let Some(before) = before {
                    assert!(!engine.handle(before).exists(), "old occupant must go");
                }
            }
            Op::RemovePlayer(a) => {
                let members = engine.handle(self.zone).children(fields.zone_players);
                if let Some(player) = pick(&members, a) {
                    engine.remove_children(fields.zone_players, self.zone.id, &[player.id]);
                    assert!(!engine.handle(player).exists());
                }
            }
            Op::Delete(a) => {
                let Some(player) = pick(&players, a) else {
                    return;
                };
                let owned = engine.handle(player).has_parent();
                engine.delete(player);
                assert_eq!(engine.handle(player).exists(), owned);
            }
            Op::Tick => {
                self.game.tick();
            }
        }
    }

    fn check_references(&self) {
        let fields = self.game.fields;
        let engine = &self.game.engine;
        for player in engine.entities(PLAYER) {
            let handle = engine.handle(player);
            if let Some(target) = handle.target(fields.player_target) {
                assert!(engine.handle(target).exists(), "dangling target {:?}", target);
            }
            for member in handle.targets(fields.player_guild_members) {
                assert!(engine.handle(member).exists(), "dangling member {:?}", member);
            }
            for target in handle.targets(fields.player_targeted_by) {
                assert!(engine.handle(target).exists(), "dangling target {:?}", target);
            }
        }
        for item in engine.entities(ITEM) {
            if let Some(origin) = engine.handle(item).variant(fields.item_origin) {
                assert!(engine.handle(origin).exists());
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scripts_keep_references_valid(ops in prop::collection::vec(op(), 1..40)) {
        let mut script = Script::new();
        for op in ops {
            script.apply(op);
            script.check_references();
        }

        script.game.snapshot();
        script.game.engine.commit();
        prop_assert!(script.game.diff().is_empty());
        prop_assert!(script.game.engine.is_clean());
    }

    #[test]
    fn assembly_is_read_only(ops in prop::collection::vec(op(), 1..30)) {
        let mut script = Script::new();
        for op in ops {
            script.apply(op);
        }

        let first = script.game.diff();
        let second = script.game.diff();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn removing_absent_tags_is_a_noop(
        tags in prop::collection::vec("[a-z]{1,6}", 0..6),
        absent in prop::collection::vec("[0-9]{1,6}", 1..4),
    ) {
        let mut game = TestGame::new();
        let tags_field = game.fields.zone_tags;
        let zone = game.engine.create(ZONE);
        game.engine.add_values(tags_field, zone.id, tags.iter().map(String::as_str));
        game.tick();

        let absent: Vec<Value> = absent.into_iter().map(Value::from).collect();
        game.engine.remove_values(tags_field, zone.id, &absent);

        prop_assert!(game.engine.is_clean());
        prop_assert_eq!(game.engine.handle(zone).values(tags_field).len(), tags.len());
    }
}
