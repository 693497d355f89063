#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Social Defence.
//!
//! The world owns every entity collection and all session counters. Adapters
//! and systems mutate it exclusively through [`apply`], which executes one
//! [`Command`] and appends the resulting [`Event`] values. Each frame tick
//! runs one whole sub-step per unit of the active speed multiplier; a
//! sub-step advances enemies, then towers, then projectiles, in that order.

mod path;
mod towers;

pub use path::PathLayout;

use social_defence_core::{
    wave_bonus, wave_plan, Command, EnemyId, EnemyKind, Event, GameOutcome, GridCell, KindColor,
    PlacementError, ProjectileId, RemovalError, SessionPhase, SpeedMultiplier, TowerId, TowerKind,
    UpgradeError, Viewport, WorldPoint, PROJECTILE_HIT_MARGIN, PROJECTILE_RADIUS, PROJECTILE_SPEED,
    STARTING_COMFORT, STARTING_ENERGY, WELCOME_BANNER,
};

use towers::TowerRegistry;

const DEFAULT_CONTAINER_WIDTH: f32 = 800.0;

/// Sentinel column an invalidated projectile is displaced to; the cleanup
/// pass sweeps anything left of the playfield.
const OFF_FIELD_X: f32 = -100.0;

/// Represents the authoritative Social Defence session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    viewport: Viewport,
    path: PathLayout,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    energy: u32,
    comfort: u32,
    wave: u32,
    pending_spawns: u32,
    phase: SessionPhase,
    speed: SpeedMultiplier,
    next_enemy_id: u32,
    next_projectile_id: u32,
}

impl World {
    /// Creates a new session ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        let viewport = Viewport::from_container_width(DEFAULT_CONTAINER_WIDTH);
        let path = PathLayout::from_viewport(viewport);
        Self {
            banner: WELCOME_BANNER,
            viewport,
            path,
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            energy: STARTING_ENERGY,
            comfort: STARTING_COMFORT,
            wave: 0,
            pending_spawns: 0,
            phase: SessionPhase::Preparing,
            speed: SpeedMultiplier::Normal,
            next_enemy_id: 0,
            next_projectile_id: 0,
        }
    }

    /// Restores the initial session, keeping the viewport and path.
    fn reset_session(&mut self) {
        self.enemies.clear();
        self.towers = TowerRegistry::new();
        self.projectiles.clear();
        self.energy = STARTING_ENERGY;
        self.comfort = STARTING_COMFORT;
        self.wave = 0;
        self.pending_spawns = 0;
        self.phase = SessionPhase::Preparing;
        self.speed = SpeedMultiplier::Normal;
        self.next_enemy_id = 0;
        self.next_projectile_id = 0;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureViewport { viewport } => {
            world.viewport = viewport;
            world.path = PathLayout::from_viewport(viewport);
            out_events.push(Event::ViewportConfigured { viewport });
        }
        Command::Tick { dt } => {
            if world.phase.is_terminal() {
                return;
            }

            out_events.push(Event::TimeAdvanced { dt });

            for _ in 0..world.speed.sub_steps() {
                advance_enemies(world, out_events);
                if world.phase.is_terminal() {
                    break;
                }
                tick_towers(world, out_events);
                resolve_projectiles(world, out_events);
            }

            resolve_wave_completion(world, out_events);
        }
        Command::StartWave => start_wave(world, out_events),
        Command::SpawnEnemy { kind, scale } => spawn_enemy(world, kind, scale, out_events),
        Command::PlaceTower { kind, cell } => place_tower(world, kind, cell, out_events),
        Command::UpgradeTower { tower } => upgrade_tower(world, tower, out_events),
        Command::SellTower { tower } => sell_tower(world, tower, out_events),
        Command::SetSpeed { multiplier } => {
            if world.phase.is_terminal() {
                return;
            }
            world.speed = multiplier;
            out_events.push(Event::SpeedChanged { multiplier });
        }
        Command::Reset => {
            world.reset_session();
            out_events.push(Event::SessionReset);
        }
    }
}

fn start_wave(world: &mut World, out_events: &mut Vec<Event>) {
    // A wave in progress and terminal phases refuse silently.
    if world.phase != SessionPhase::Preparing {
        return;
    }

    let next = world.wave + 1;
    match wave_plan(next) {
        None => {
            world.phase = SessionPhase::Won;
            out_events.push(Event::GameEnded {
                outcome: GameOutcome::Victory,
            });
        }
        Some(plan) => {
            world.wave = next;
            world.pending_spawns = plan.count;
            world.phase = SessionPhase::WaveInProgress;
            out_events.push(Event::WaveStarted { wave: next, plan });
        }
    }
}

fn spawn_enemy(world: &mut World, kind: EnemyKind, scale: f32, out_events: &mut Vec<Event>) {
    if world.phase.is_terminal() {
        return;
    }

    if world.phase == SessionPhase::WaveInProgress {
        world.pending_spawns = world.pending_spawns.saturating_sub(1);
    }

    let id = EnemyId::new(world.next_enemy_id);
    world.next_enemy_id += 1;
    let enemy = Enemy::spawn(id, kind, scale, world.path.start());
    out_events.push(Event::EnemySpawned {
        enemy: id,
        kind,
        position: enemy.position,
    });
    world.enemies.push(enemy);
}

fn advance_enemies(world: &mut World, out_events: &mut Vec<Event>) {
    let boundary = world.viewport.width();

    let mut index = 0;
    while index < world.enemies.len() {
        let enemy = &mut world.enemies[index];
        enemy.advance(world.path.waypoints());

        if enemy.position.x() > boundary {
            let leaked = world.enemies.remove(index);
            world.comfort = world.comfort.saturating_sub(1);
            out_events.push(Event::EnemyLeaked {
                enemy: leaked.id,
                comfort_remaining: world.comfort,
            });

            if world.comfort == 0 {
                world.phase = SessionPhase::Lost;
                out_events.push(Event::GameEnded {
                    outcome: GameOutcome::Defeat,
                });
                return;
            }
        } else {
            index += 1;
        }
    }
}

fn tick_towers(world: &mut World, out_events: &mut Vec<Event>) {
    let World {
        towers,
        enemies,
        projectiles,
        next_projectile_id,
        ..
    } = world;

    for tower in towers.iter_mut() {
        tower.cooldown = tower.cooldown.saturating_sub(1);
        if tower.cooldown > 0 {
            continue;
        }

        let Some(target) = acquire_target(tower.position, tower.range, enemies) else {
            continue;
        };

        let id = ProjectileId::new(*next_projectile_id);
        *next_projectile_id += 1;
        projectiles.push(Projectile {
            id,
            position: tower.position,
            target,
            damage: tower.damage,
            color: tower.kind.projectile_color(),
        });
        tower.cooldown = tower.fire_period;
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower: tower.id,
            target,
        });
    }
}

/// First live enemy within range in spawn order wins; there is deliberately
/// no closest-first or lowest-health tie-break.
fn acquire_target(origin: WorldPoint, range: f32, enemies: &[Enemy]) -> Option<EnemyId> {
    enemies
        .iter()
        .find(|enemy| origin.distance_to(enemy.position) < range)
        .map(|enemy| enemy.id)
}

fn resolve_projectiles(world: &mut World, out_events: &mut Vec<Event>) {
    let hit_distance = PROJECTILE_RADIUS + PROJECTILE_HIT_MARGIN;

    let mut index = 0;
    while index < world.projectiles.len() {
        let target_id = world.projectiles[index].target;
        let target_position = world
            .enemies
            .iter()
            .find(|enemy| enemy.id == target_id)
            .map(|enemy| enemy.position);

        let projectile = &mut world.projectiles[index];
        projectile.advance(target_position);

        // Cleanup before impact: off-field projectiles and orphaned shots.
        if projectile.position.x() < 0.0 || target_position.is_none() {
            let _ = world.projectiles.remove(index);
            continue;
        }

        if let Some(target_position) = target_position {
            if projectile.position.distance_to(target_position) < hit_distance {
                let damage = projectile.damage;
                let _ = world.projectiles.remove(index);
                damage_enemy(world, target_id, damage, out_events);
                continue;
            }
        }

        index += 1;
    }
}

fn damage_enemy(world: &mut World, target: EnemyId, damage: f32, out_events: &mut Vec<Event>) {
    let Some(position) = world.enemies.iter().position(|enemy| enemy.id == target) else {
        return;
    };

    let enemy = &mut world.enemies[position];
    enemy.health = (enemy.health - damage).max(0.0);
    if enemy.health <= 0.0 {
        let destroyed = world.enemies.remove(position);
        world.energy = world.energy.saturating_add(destroyed.reward);
        out_events.push(Event::EnemyDestroyed {
            enemy: destroyed.id,
            reward: destroyed.reward,
        });
    }
}

fn resolve_wave_completion(world: &mut World, out_events: &mut Vec<Event>) {
    if world.phase == SessionPhase::WaveInProgress
        && world.pending_spawns == 0
        && world.enemies.is_empty()
    {
        world.phase = SessionPhase::Preparing;
        let bonus = wave_bonus(world.wave);
        world.energy = world.energy.saturating_add(bonus);
        out_events.push(Event::WaveCompleted {
            wave: world.wave,
            bonus,
        });
    }
}

fn place_tower(world: &mut World, kind: TowerKind, cell: GridCell, out_events: &mut Vec<Event>) {
    if world.phase.is_terminal() {
        return;
    }

    let reason = if !world.viewport.contains(cell.center()) {
        Some(PlacementError::OutOfBounds)
    } else if world.path.blocks_cell(cell) {
        Some(PlacementError::OnPath)
    } else if world.towers.occupies(cell) {
        Some(PlacementError::Occupied)
    } else if world.energy < kind.cost() {
        Some(PlacementError::InsufficientEnergy)
    } else {
        None
    };

    if let Some(reason) = reason {
        out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
        return;
    }

    world.energy -= kind.cost();
    let tower = world.towers.place(kind, cell);
    out_events.push(Event::TowerPlaced { tower, kind, cell });
}

fn upgrade_tower(world: &mut World, tower: TowerId, out_events: &mut Vec<Event>) {
    if world.phase.is_terminal() {
        return;
    }

    let Some(state) = world.towers.get_mut(tower) else {
        out_events.push(Event::TowerUpgradeRejected {
            tower,
            reason: UpgradeError::MissingTower,
        });
        return;
    };

    if !state.can_upgrade() {
        out_events.push(Event::TowerUpgradeRejected {
            tower,
            reason: UpgradeError::MaxLevel,
        });
        return;
    }

    let cost = state.kind.upgrade_cost();
    if world.energy < cost {
        out_events.push(Event::TowerUpgradeRejected {
            tower,
            reason: UpgradeError::InsufficientEnergy,
        });
        return;
    }

    if state.upgrade() {
        world.energy -= cost;
        out_events.push(Event::TowerUpgraded {
            tower,
            kind: state.kind,
            level: state.level,
        });
    }
}

fn sell_tower(world: &mut World, tower: TowerId, out_events: &mut Vec<Event>) {
    if world.phase.is_terminal() {
        return;
    }

    let Some(state) = world.towers.remove(tower) else {
        out_events.push(Event::TowerSaleRejected {
            tower,
            reason: RemovalError::MissingTower,
        });
        return;
    };

    let refund = state.sell_refund();
    world.energy = world.energy.saturating_add(refund);
    out_events.push(Event::TowerSold { tower, refund });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{PathLayout, World};
    use social_defence_core::{
        EnemySnapshot, EnemyView, ProjectileSnapshot, ProjectileView, SessionPhase,
        SpeedMultiplier, TowerId, TowerSnapshot, TowerView, Viewport,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the playfield dimensions.
    #[must_use]
    pub fn viewport(world: &World) -> Viewport {
        world.viewport
    }

    /// Provides read-only access to the session path.
    #[must_use]
    pub fn path(world: &World) -> &PathLayout {
        &world.path
    }

    /// Social energy available to the session.
    #[must_use]
    pub fn energy(world: &World) -> u32 {
        world.energy
    }

    /// Comfort points remaining before the session is lost.
    #[must_use]
    pub fn comfort(world: &World) -> u32 {
        world.comfort
    }

    /// One-based index of the most recently started wave, zero before any.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Current phase of the session state machine.
    #[must_use]
    pub fn phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Active frame speed multiplier.
    #[must_use]
    pub fn speed(world: &World) -> SpeedMultiplier {
        world.speed
    }

    /// Number of enemies the active wave has yet to release.
    #[must_use]
    pub fn pending_spawns(world: &World) -> u32 {
        world.pending_spawns
    }

    /// Captures a read-only view of the enemies on the path.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                position: enemy.position,
                health: enemy.health,
                max_health: enemy.max_health,
                speed: enemy.speed,
                reward: enemy.reward,
                path_index: enemy.path_index,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Retrieves a snapshot of a single tower, if it exists.
    #[must_use]
    pub fn tower(world: &World, id: TowerId) -> Option<TowerSnapshot> {
        world
            .towers
            .iter()
            .find(|tower| tower.id == id)
            .map(|tower| tower.snapshot())
    }

    /// Refund the provided tower would yield if sold now.
    #[must_use]
    pub fn sell_refund(world: &World, id: TowerId) -> Option<u32> {
        world
            .towers
            .iter()
            .find(|tower| tower.id == id)
            .map(|tower| tower.sell_refund())
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position,
                target: projectile.target,
                damage: projectile.damage,
                color: projectile.color,
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: WorldPoint,
    health: f32,
    max_health: f32,
    speed: f32,
    reward: u32,
    path_index: usize,
}

impl Enemy {
    fn spawn(id: EnemyId, kind: EnemyKind, scale: f32, start: WorldPoint) -> Self {
        let max_health = kind.scaled_health(scale);
        Self {
            id,
            kind,
            position: start,
            health: max_health,
            max_health,
            speed: kind.base_speed(),
            reward: kind.scaled_reward(scale),
            path_index: 1,
        }
    }

    /// Steers toward the current waypoint at fixed speed, advancing the
    /// cursor once within one movement step. No overshoot correction; an
    /// enemy past the final waypoint idles in place.
    fn advance(&mut self, waypoints: &[WorldPoint]) {
        let Some(target) = waypoints.get(self.path_index).copied() else {
            return;
        };

        let angle = (target.y() - self.position.y()).atan2(target.x() - self.position.x());
        self.position = WorldPoint::new(
            self.position.x() + angle.cos() * self.speed,
            self.position.y() + angle.sin() * self.speed,
        );

        if self.position.distance_to(target) < self.speed {
            self.path_index += 1;
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    id: ProjectileId,
    position: WorldPoint,
    target: EnemyId,
    damage: f32,
    color: KindColor,
}

impl Projectile {
    /// Homes on the live target position; a missing or dead target displaces
    /// the projectile off-field for the cleanup pass instead of removing it
    /// here.
    fn advance(&mut self, target_position: Option<WorldPoint>) {
        let Some(target) = target_position else {
            self.position = WorldPoint::new(OFF_FIELD_X, self.position.y());
            return;
        };

        let angle = (target.y() - self.position.y()).atan2(target.x() - self.position.x());
        self.position = WorldPoint::new(
            self.position.x() + angle.cos() * PROJECTILE_SPEED,
            self.position.y() + angle.sin() * PROJECTILE_SPEED,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_defence_core::wave_count;
    use std::time::Duration;

    fn tick(world: &mut World, events: &mut Vec<Event>) {
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            events,
        );
    }

    fn spawn(world: &mut World, kind: EnemyKind, scale: f32) -> EnemyId {
        let mut events = Vec::new();
        apply(world, Command::SpawnEnemy { kind, scale }, &mut events);
        match events.as_slice() {
            [Event::EnemySpawned { enemy, .. }] => *enemy,
            other => panic!("expected EnemySpawned, got {other:?}"),
        }
    }

    fn enemy_mut(world: &mut World, id: EnemyId) -> &mut Enemy {
        world
            .enemies
            .iter_mut()
            .find(|enemy| enemy.id == id)
            .expect("enemy exists")
    }

    #[test]
    fn fresh_session_matches_initial_counters() {
        let world = World::new();
        assert_eq!(query::energy(&world), 100);
        assert_eq!(query::comfort(&world), 10);
        assert_eq!(query::wave(&world), 0);
        assert_eq!(query::phase(&world), SessionPhase::Preparing);
        assert_eq!(query::speed(&world), SpeedMultiplier::Normal);
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn spawned_enemy_scales_health_and_reward() {
        let mut world = World::new();
        let id = spawn(&mut world, EnemyKind::SmallTalk, 1.2);

        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("one enemy");
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.health, 12.0);
        assert_eq!(snapshot.max_health, 12.0);
        assert_eq!(snapshot.reward, 6);
        assert_eq!(snapshot.position, query::path(&world).start());
        assert_eq!(snapshot.path_index, 1);
    }

    #[test]
    fn enemy_advances_toward_first_waypoint() {
        let mut world = World::new();
        let _ = spawn(&mut world, EnemyKind::SmallTalk, 1.0);
        let start = query::path(&world).start();

        let mut events = Vec::new();
        tick(&mut world, &mut events);

        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("one enemy");
        // The first leg runs horizontally, so one tick moves one speed unit right.
        assert!((snapshot.position.x() - (start.x() + 1.0)).abs() < 1e-4);
        assert!((snapshot.position.y() - start.y()).abs() < 1e-4);
    }

    #[test]
    fn enemy_with_exhausted_path_idles_in_place() {
        let mut world = World::new();
        let id = spawn(&mut world, EnemyKind::SmallTalk, 1.0);
        let waypoint_count = query::path(&world).waypoints().len();
        let parked = WorldPoint::new(300.0, 300.0);
        {
            let enemy = enemy_mut(&mut world, id);
            enemy.path_index = waypoint_count;
            enemy.position = parked;
        }

        let mut events = Vec::new();
        tick(&mut world, &mut events);
        tick(&mut world, &mut events);

        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("enemy still present");
        assert_eq!(snapshot.position, parked);
        assert_eq!(query::comfort(&world), 10);
    }

    #[test]
    fn leak_drains_comfort_and_removes_enemy() {
        let mut world = World::new();
        let id = spawn(&mut world, EnemyKind::SmallTalk, 1.0);
        let boundary = query::viewport(&world).width();
        {
            let enemy = enemy_mut(&mut world, id);
            enemy.path_index = 5;
            enemy.position = WorldPoint::new(boundary + 1.0, 125.0);
        }

        let mut events = Vec::new();
        tick(&mut world, &mut events);

        assert!(query::enemy_view(&world).is_empty());
        assert_eq!(query::comfort(&world), 9);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::EnemyLeaked {
                comfort_remaining: 9,
                ..
            }
        )));
    }

    #[test]
    fn ten_leaks_lose_the_session() {
        let mut world = World::new();
        let boundary = query::viewport(&world).width();

        for _ in 0..10 {
            let id = spawn(&mut world, EnemyKind::RumorMill, 1.0);
            let enemy = enemy_mut(&mut world, id);
            enemy.path_index = 5;
            enemy.position = WorldPoint::new(boundary + 1.0, 125.0);
            let mut events = Vec::new();
            tick(&mut world, &mut events);
        }

        assert_eq!(query::comfort(&world), 0);
        assert_eq!(query::phase(&world), SessionPhase::Lost);

        // A lost session stops processing ticks entirely.
        let mut events = Vec::new();
        tick(&mut world, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn tower_targets_first_enemy_in_spawn_order() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        let tower_center = GridCell::new(1, 1).center();

        let first = spawn(&mut world, EnemyKind::SmallTalk, 1.0);
        let second = spawn(&mut world, EnemyKind::SmallTalk, 1.0);
        {
            // Park the later spawn closer to the tower than the earlier one.
            let waypoint_count = query::path(&world).waypoints().len();
            let enemy = enemy_mut(&mut world, first);
            enemy.path_index = waypoint_count;
            enemy.position = WorldPoint::new(tower_center.x() + 100.0, tower_center.y());
            let enemy = enemy_mut(&mut world, second);
            enemy.path_index = waypoint_count;
            enemy.position = WorldPoint::new(tower_center.x() + 20.0, tower_center.y());
        }

        events.clear();
        tick(&mut world, &mut events);

        let target = events
            .iter()
            .find_map(|event| match event {
                Event::ProjectileFired { target, .. } => Some(*target),
                _ => None,
            })
            .expect("tower fired");
        assert_eq!(target, first);
    }

    #[test]
    fn projectile_impact_damages_and_rewards() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        let tower_center = GridCell::new(1, 1).center();

        // Scale 0.1 leaves a single hit point.
        let id = spawn(&mut world, EnemyKind::SmallTalk, 0.1);
        {
            let waypoint_count = query::path(&world).waypoints().len();
            let enemy = enemy_mut(&mut world, id);
            enemy.path_index = waypoint_count;
            enemy.position = WorldPoint::new(tower_center.x() + 8.0, tower_center.y());
        }

        let energy_before = query::energy(&world);
        events.clear();
        tick(&mut world, &mut events);

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemyDestroyed { reward: 1, .. })));
        assert!(query::enemy_view(&world).is_empty());
        assert!(query::projectile_view(&world).iter().next().is_none());
        assert_eq!(query::energy(&world), energy_before + 1);
    }

    #[test]
    fn dead_target_invalidates_projectiles_without_double_reward() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        world.energy = 200;
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(3, 1),
            },
            &mut events,
        );

        let id = spawn(&mut world, EnemyKind::SmallTalk, 0.1);
        {
            let waypoint_count = query::path(&world).waypoints().len();
            let enemy = enemy_mut(&mut world, id);
            enemy.path_index = waypoint_count;
            // Within hit range of the first tower's muzzle after one step.
            enemy.position = WorldPoint::new(GridCell::new(1, 1).center().x() + 8.0, 75.0);
        }

        let energy_before = query::energy(&world);
        events.clear();
        tick(&mut world, &mut events);

        let destroyed = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 1);
        assert_eq!(query::energy(&world), energy_before + 1);
        // The second tower's projectile was invalidated and swept.
        assert!(query::projectile_view(&world).iter().next().is_none());
    }

    #[test]
    fn upgrade_spends_energy_and_grows_stats() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        let tower = match events.as_slice() {
            [Event::TowerPlaced { tower, .. }] => *tower,
            other => panic!("expected TowerPlaced, got {other:?}"),
        };

        events.clear();
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);

        assert_eq!(query::energy(&world), 20);
        let snapshot = query::tower(&world, tower).expect("tower exists");
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.range, 144.0);
        assert_eq!(snapshot.damage, 1.4);
        assert_eq!(snapshot.fire_period, 26);
    }

    #[test]
    fn third_upgrade_is_rejected_and_stats_hold() {
        let mut world = World::new();
        world.energy = 500;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        let tower = match events.as_slice() {
            [Event::TowerPlaced { tower, .. }] => *tower,
            other => panic!("expected TowerPlaced, got {other:?}"),
        };

        apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        let before = query::tower(&world, tower).expect("tower exists");
        let energy_before = query::energy(&world);

        events.clear();
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);

        assert_eq!(
            events,
            vec![Event::TowerUpgradeRejected {
                tower,
                reason: UpgradeError::MaxLevel,
            }],
        );
        assert_eq!(query::tower(&world, tower).expect("tower exists"), before);
        assert_eq!(query::energy(&world), energy_before);
    }

    #[test]
    fn selling_unupgraded_phone_check_refunds_thirty_five() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        let tower = match events.as_slice() {
            [Event::TowerPlaced { tower, .. }] => *tower,
            other => panic!("expected TowerPlaced, got {other:?}"),
        };
        assert_eq!(query::sell_refund(&world, tower), Some(35));

        events.clear();
        apply(&mut world, Command::SellTower { tower }, &mut events);

        assert_eq!(events, vec![Event::TowerSold { tower, refund: 35 }]);
        assert_eq!(query::energy(&world), 85);
        assert!(query::tower(&world, tower).is_none());
    }

    #[test]
    fn placement_is_rejected_with_a_specific_reason() {
        let mut world = World::new();
        let mut events = Vec::new();

        // The first path leg occupies row 3.
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(2, 3),
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlacementRejected {
                reason: PlacementError::OnPath,
                ..
            }]
        ));

        events.clear();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(40, 0),
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlacementRejected {
                reason: PlacementError::OutOfBounds,
                ..
            }]
        ));

        events.clear();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Headphones,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        assert!(matches!(
            events.last(),
            Some(Event::TowerPlacementRejected {
                reason: PlacementError::Occupied,
                ..
            })
        ));

        events.clear();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::AwkwardJoke,
                cell: GridCell::new(5, 1),
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlacementRejected {
                reason: PlacementError::InsufficientEnergy,
                ..
            }]
        ));
    }

    #[test]
    fn wave_lifecycle_awards_bonus_exactly_once() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::StartWave, &mut events);

        assert_eq!(query::phase(&world), SessionPhase::WaveInProgress);
        assert_eq!(query::wave(&world), 1);
        assert!(matches!(
            events.as_slice(),
            [Event::WaveStarted { wave: 1, .. }]
        ));

        // A duplicate start while the wave runs is a silent no-op.
        events.clear();
        apply(&mut world, Command::StartWave, &mut events);
        assert!(events.is_empty());

        // The wave stays open until its full quota has spawned.
        assert_eq!(query::pending_spawns(&world), 5);
        tick(&mut world, &mut events);
        assert_eq!(query::phase(&world), SessionPhase::WaveInProgress);

        events.clear();
        for _ in 0..5 {
            let _ = spawn(&mut world, EnemyKind::SmallTalk, 1.0);
        }
        assert_eq!(query::pending_spawns(&world), 0);

        // Clear the field; completion is detected after the frame's sub-steps.
        world.enemies.clear();
        let energy_before = query::energy(&world);
        events.clear();
        tick(&mut world, &mut events);

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::WaveCompleted { wave: 1, bonus: 60 })));
        assert_eq!(query::energy(&world), energy_before + 60);
        assert_eq!(query::phase(&world), SessionPhase::Preparing);

        // No second completion fires for the same wave.
        events.clear();
        tick(&mut world, &mut events);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::WaveCompleted { .. })));
    }

    #[test]
    fn wave_three_completion_awards_eighty() {
        let mut world = World::new();
        world.wave = 2;
        let mut events = Vec::new();
        apply(&mut world, Command::StartWave, &mut events);
        assert_eq!(query::wave(&world), 3);

        world.pending_spawns = 0;
        events.clear();
        tick(&mut world, &mut events);

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::WaveCompleted { wave: 3, bonus: 80 })));
    }

    #[test]
    fn starting_past_the_final_wave_wins_without_spawning() {
        let mut world = World::new();
        world.wave = wave_count();

        let mut events = Vec::new();
        apply(&mut world, Command::StartWave, &mut events);

        assert_eq!(
            events,
            vec![Event::GameEnded {
                outcome: GameOutcome::Victory,
            }],
        );
        assert_eq!(query::phase(&world), SessionPhase::Won);
        assert!(query::enemy_view(&world).is_empty());

        // Spawns into a terminal session are dropped.
        events.clear();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::SmallTalk,
                scale: 1.0,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn fast_speed_runs_two_whole_sub_steps() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetSpeed {
                multiplier: SpeedMultiplier::Fast,
            },
            &mut events,
        );
        assert_eq!(query::speed(&world), SpeedMultiplier::Fast);

        let _ = spawn(&mut world, EnemyKind::SmallTalk, 1.0);
        let start = query::path(&world).start();

        events.clear();
        tick(&mut world, &mut events);

        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("one enemy");
        assert!((snapshot.position.x() - (start.x() + 2.0)).abs() < 1e-4);
    }

    #[test]
    fn reset_restores_the_initial_session() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::StartWave, &mut events);
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetSpeed {
                multiplier: SpeedMultiplier::Fast,
            },
            &mut events,
        );
        let _ = spawn(&mut world, EnemyKind::PartyAnimal, 1.7);

        events.clear();
        apply(&mut world, Command::Reset, &mut events);

        assert_eq!(events, vec![Event::SessionReset]);
        assert_eq!(query::energy(&world), 100);
        assert_eq!(query::comfort(&world), 10);
        assert_eq!(query::wave(&world), 0);
        assert_eq!(query::phase(&world), SessionPhase::Preparing);
        assert_eq!(query::speed(&world), SpeedMultiplier::Normal);
        assert!(query::enemy_view(&world).is_empty());
        assert!(query::tower_view(&world).iter().next().is_none());
    }

    #[test]
    fn terminal_phase_ignores_everything_but_reset() {
        let mut world = World::new();
        world.phase = SessionPhase::Lost;

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::PhoneCheck,
                cell: GridCell::new(1, 1),
            },
            &mut events,
        );
        apply(&mut world, Command::StartWave, &mut events);
        apply(
            &mut world,
            Command::SetSpeed {
                multiplier: SpeedMultiplier::Fast,
            },
            &mut events,
        );
        assert!(events.is_empty());

        apply(&mut world, Command::Reset, &mut events);
        assert_eq!(events, vec![Event::SessionReset]);
        assert_eq!(query::phase(&world), SessionPhase::Preparing);
    }
}
