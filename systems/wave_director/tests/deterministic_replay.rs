use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use social_defence_core::{Command, EnemyId, EnemyKind, Event};
use social_defence_system_wave_director::{Config, WaveDirector};
use social_defence_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let first = replay(scripted_frames());
    let second = replay(scripted_frames());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        !first.spawns.is_empty(),
        "script is expected to release spawns"
    );
}

fn replay(frames: Vec<Vec<Command>>) -> ReplayOutcome {
    let mut world = World::new();
    let mut director = WaveDirector::new(Config::new(Duration::from_millis(750)));
    let mut spawns = Vec::new();

    for frame in frames {
        let mut events = Vec::new();
        for command in frame {
            world::apply(&mut world, command, &mut events);
        }

        let mut commands = Vec::new();
        director.handle(&events, &mut commands);

        for command in commands {
            if let Command::SpawnEnemy { kind, scale } = command {
                spawns.push(SpawnRecord {
                    kind,
                    scale_bits: scale.to_bits(),
                });
                let mut produced = Vec::new();
                world::apply(&mut world, Command::SpawnEnemy { kind, scale }, &mut produced);
                let _ = produced
                    .iter()
                    .find(|event| matches!(event, Event::EnemySpawned { .. }))
                    .expect("spawn command produces an enemy");
            }
        }
    }

    let enemies = query::enemy_view(&world)
        .into_vec()
        .into_iter()
        .map(|snapshot| EnemyState {
            id: snapshot.id,
            kind: snapshot.kind,
            x_bits: snapshot.position.x().to_bits(),
            y_bits: snapshot.position.y().to_bits(),
            health_bits: snapshot.health.to_bits(),
        })
        .collect();

    ReplayOutcome { enemies, spawns }
}

fn scripted_frames() -> Vec<Vec<Command>> {
    let tick = |millis| Command::Tick {
        dt: Duration::from_millis(millis),
    };

    vec![
        vec![Command::StartWave, tick(500)],
        vec![tick(500)],
        vec![tick(250)],
        vec![tick(1_000)],
        vec![tick(2_000)],
        vec![tick(750)],
        vec![tick(750)],
    ]
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    enemies: Vec<EnemyState>,
    spawns: Vec<SpawnRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SpawnRecord {
    kind: EnemyKind,
    scale_bits: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct EnemyState {
    id: EnemyId,
    kind: EnemyKind,
    x_bits: u32,
    y_bits: u32,
    health_bits: u32,
}
