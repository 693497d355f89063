#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn scheduler that releases each wave's enemies.
//!
//! The director arms itself when a wave starts, accumulates simulated time
//! from [`Event::TimeAdvanced`], and emits one [`Command::SpawnEnemy`] per
//! elapsed spawn interval until the wave's quota is exhausted. It doubles as
//! the cancellation token demanded by session teardown: terminal states and
//! resets disarm it immediately, so no stale schedule can spawn into a
//! finished session.

use std::time::Duration;

use social_defence_core::{Command, EnemyKind, Event, SPAWN_INTERVAL};

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence.
    #[must_use]
    pub const fn new(spawn_interval: Duration) -> Self {
        Self { spawn_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(SPAWN_INTERVAL)
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveWave {
    kind: EnemyKind,
    scale: f32,
    remaining: u32,
}

/// Pure system that deterministically emits spawn commands for the active wave.
#[derive(Debug)]
pub struct WaveDirector {
    spawn_interval: Duration,
    accumulator: Duration,
    active: Option<ActiveWave>,
}

impl WaveDirector {
    /// Creates a new wave director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            active: None,
        }
    }

    /// Reports whether a wave schedule is currently armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }

    /// Disarms the schedule, dropping any unspawned quota.
    pub fn cancel(&mut self) {
        self.active = None;
        self.accumulator = Duration::ZERO;
    }

    /// Consumes world events and emits spawn commands for elapsed intervals.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::WaveStarted { plan, .. } => {
                    self.active = Some(ActiveWave {
                        kind: plan.kind,
                        scale: plan.scale,
                        remaining: plan.count,
                    });
                    self.accumulator = Duration::ZERO;
                }
                Event::GameEnded { .. } | Event::SessionReset => self.cancel(),
                _ => {}
            }
        }

        if self.spawn_interval.is_zero() {
            return;
        }

        let Some(active) = self.active.as_mut() else {
            return;
        };

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        while self.accumulator >= self.spawn_interval && active.remaining > 0 {
            self.accumulator -= self.spawn_interval;
            active.remaining -= 1;
            out.push(Command::SpawnEnemy {
                kind: active.kind,
                scale: active.scale,
            });
        }

        if active.remaining == 0 {
            self.cancel();
        }
    }
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
