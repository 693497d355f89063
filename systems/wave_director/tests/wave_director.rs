use std::time::Duration;

use social_defence_core::{wave_plan, Command, Event, GameOutcome};
use social_defence_system_wave_director::{Config, WaveDirector};
use social_defence_world::{self as world, query, World};

fn pump(
    world: &mut World,
    director: &mut WaveDirector,
    frame_events: Vec<Event>,
) -> Vec<Event> {
    let mut commands = Vec::new();
    director.handle(&frame_events, &mut commands);

    let mut produced = Vec::new();
    for command in commands {
        world::apply(world, command, &mut produced);
    }
    produced
}

#[test]
fn director_spawns_the_full_quota_at_the_configured_cadence() {
    let mut world = World::new();
    let mut director = WaveDirector::new(Config::new(Duration::from_secs(1)));

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartWave, &mut events);
    let plan = wave_plan(1).expect("first wave defined");

    let mut spawned = 0;
    for _ in 0..40 {
        let mut frame_events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut frame_events,
        );
        events.extend(frame_events);

        let produced = pump(&mut world, &mut director, std::mem::take(&mut events));
        spawned += produced
            .iter()
            .filter(|event| matches!(event, Event::EnemySpawned { .. }))
            .count();
    }

    assert_eq!(spawned as u32, plan.count, "expected one spawn per interval");
    assert!(!director.is_armed(), "quota exhaustion disarms the schedule");
    assert_eq!(query::pending_spawns(&world), 0);
}

#[test]
fn no_spawns_before_the_first_interval_elapses() {
    let mut world = World::new();
    let mut director = WaveDirector::new(Config::new(Duration::from_secs(1)));

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartWave, &mut events);
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(999),
        },
        &mut events,
    );

    let produced = pump(&mut world, &mut director, events);
    assert!(produced.is_empty());
    assert!(director.is_armed());
}

#[test]
fn large_frame_delta_releases_multiple_spawns() {
    let mut world = World::new();
    let mut director = WaveDirector::new(Config::new(Duration::from_secs(1)));

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartWave, &mut events);
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(3),
        },
        &mut events,
    );

    let produced = pump(&mut world, &mut director, events);
    let spawns = produced
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    assert_eq!(spawns, 3);
}

#[test]
fn session_end_in_the_same_batch_suppresses_spawning() {
    let mut director = WaveDirector::default();
    let mut commands = Vec::new();

    let mut events = Vec::new();
    let mut world = World::new();
    world::apply(&mut world, Command::StartWave, &mut events);
    events.push(Event::TimeAdvanced {
        dt: Duration::from_secs(2),
    });
    events.push(Event::GameEnded {
        outcome: GameOutcome::Defeat,
    });

    director.handle(&events, &mut commands);
    assert!(commands.is_empty(), "cancelled schedules never spawn");
    assert!(!director.is_armed());
}

#[test]
fn reset_invalidates_the_armed_schedule() {
    let mut director = WaveDirector::default();
    let mut commands = Vec::new();

    let mut events = Vec::new();
    let mut world = World::new();
    world::apply(&mut world, Command::StartWave, &mut events);
    director.handle(&events, &mut commands);
    assert!(director.is_armed());

    director.handle(&[Event::SessionReset], &mut commands);
    assert!(!director.is_armed());

    director.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(5),
        }],
        &mut commands,
    );
    assert!(commands.is_empty());
}
