#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that folds events into session statistics.
//!
//! The system consumes the world's broadcast stream and maintains a running
//! [`StatsReport`] for the control panel's secondary readout. Whenever a
//! handled batch changes the report, an [`Event::StatsUpdated`] is published
//! so adapters can refresh without polling.

use social_defence_core::{Event, StatsReport};

/// Pure analytics system aggregating the session's event stream.
#[derive(Debug, Default)]
pub struct Analytics {
    report: StatsReport,
}

impl Analytics {
    /// Creates a new analytics system with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current aggregated report.
    #[must_use]
    pub fn report(&self) -> StatsReport {
        self.report
    }

    /// Consumes world events and publishes a refreshed report when it changed.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        let before = self.report;

        for event in events {
            match event {
                Event::EnemyDestroyed { reward, .. } => {
                    self.report.enemies_defeated += 1;
                    self.report.energy_earned += reward;
                }
                Event::EnemyLeaked { .. } => self.report.enemies_leaked += 1,
                Event::ProjectileFired { .. } => self.report.shots_fired += 1,
                Event::WaveCompleted { bonus, .. } => {
                    self.report.waves_completed += 1;
                    self.report.energy_earned += bonus;
                }
                Event::TowerPlaced { kind, .. } => self.report.energy_spent += kind.cost(),
                Event::TowerUpgraded { kind, .. } => {
                    self.report.energy_spent += kind.upgrade_cost();
                }
                Event::TowerSold { refund, .. } => self.report.energy_earned += refund,
                Event::SessionReset => self.report = StatsReport::default(),
                _ => {}
            }
        }

        if self.report != before {
            out.push(Event::StatsUpdated {
                report: self.report,
            });
        }
    }
}
