#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Social Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Social Defence.";

/// Side length of a single placement tile measured in world units.
pub const TILE_LENGTH: f32 = 50.0;

/// Social energy granted to a fresh session.
pub const STARTING_ENERGY: u32 = 100;

/// Comfort points granted to a fresh session; one point drains per leak.
pub const STARTING_COMFORT: u32 = 10;

/// Collision radius of every enemy disc.
pub const ENEMY_RADIUS: f32 = 15.0;

/// Distance a projectile covers per simulation tick.
pub const PROJECTILE_SPEED: f32 = 5.0;

/// Radius of every projectile dot.
pub const PROJECTILE_RADIUS: f32 = 5.0;

/// Extra margin added to the projectile radius when detecting impacts.
pub const PROJECTILE_HIT_MARGIN: f32 = 5.0;

/// Number of upgrade levels a tower may accumulate.
pub const MAX_UPGRADE_LEVEL: u8 = 2;

/// Lower bound applied to the fire period when upgrades shorten it.
pub const MIN_FIRE_PERIOD: u32 = 5;

/// Cadence at which the wave director releases enemies onto the path.
pub const SPAWN_INTERVAL: Duration = Duration::from_secs(1);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the playfield dimensions and regenerates the path polyline.
    ConfigureViewport {
        /// Snapped playfield dimensions derived from the window.
        viewport: Viewport,
    },
    /// Advances the simulation by one rendered frame.
    ///
    /// The world runs one whole sub-step per unit of the active speed
    /// multiplier; `dt` carries the real elapsed time for spawn scheduling.
    Tick {
        /// Wall-clock duration that elapsed since the previous frame.
        dt: Duration,
    },
    /// Requests the next wave, refused silently while one is in progress.
    StartWave,
    /// Requests that a scaled enemy enter the path at its starting point.
    SpawnEnemy {
        /// Type of enemy to create.
        kind: EnemyKind,
        /// Health/reward scale factor declared by the active wave.
        scale: f32,
    },
    /// Requests construction of a tower anchored at the provided cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Grid cell whose centre anchors the tower.
        cell: GridCell,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Requests removal of a tower in exchange for a partial refund.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Selects how many whole sub-steps each frame advances.
    SetSpeed {
        /// Speed multiplier the session should adopt.
        multiplier: SpeedMultiplier,
    },
    /// Discards the session and restores the initial state.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one frame.
    TimeAdvanced {
        /// Wall-clock duration that elapsed in the frame.
        dt: Duration,
    },
    /// Confirms that the playfield dimensions changed.
    ViewportConfigured {
        /// Dimensions now in effect.
        viewport: Viewport,
    },
    /// Announces that a wave began and spawning may commence.
    WaveStarted {
        /// One-based index of the wave that started.
        wave: u32,
        /// Composition of the wave for the spawn scheduler.
        plan: WavePlan,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Type of the spawned enemy.
        kind: EnemyKind,
        /// Starting position on the path.
        position: WorldPoint,
    },
    /// Reports that an enemy crossed the playfield boundary.
    EnemyLeaked {
        /// Identifier of the enemy that leaked.
        enemy: EnemyId,
        /// Comfort points remaining after the drain.
        comfort_remaining: u32,
    },
    /// Confirms that an enemy was destroyed and its reward credited.
    EnemyDestroyed {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Social energy credited for the kill.
        reward: u32,
    },
    /// Confirms that a tower emitted a projectile at a target.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile homes on.
        target: EnemyId,
    },
    /// Confirms that a tower was placed and its cost deducted.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell anchoring the tower.
        cell: GridCell,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: GridCell,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower advanced one upgrade level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Type of the upgraded tower.
        kind: TowerKind,
        /// Upgrade level now in effect.
        level: u8,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted for upgrade.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was sold and the refund credited.
    TowerSold {
        /// Identifier of the tower that was removed.
        tower: TowerId,
        /// Social energy refunded for the sale.
        refund: u32,
    },
    /// Reports that a tower sale request was rejected.
    TowerSaleRejected {
        /// Identifier of the tower targeted for sale.
        tower: TowerId,
        /// Specific reason the sale failed.
        reason: RemovalError,
    },
    /// Announces that the active wave finished and its bonus was credited.
    WaveCompleted {
        /// One-based index of the completed wave.
        wave: u32,
        /// End-of-wave bonus credited to the session.
        bonus: u32,
    },
    /// Announces that the frame speed multiplier changed.
    SpeedChanged {
        /// Multiplier now in effect.
        multiplier: SpeedMultiplier,
    },
    /// Announces that the session reached a terminal state.
    GameEnded {
        /// Whether the player won or lost.
        outcome: GameOutcome,
    },
    /// Announces that the session was reinitialised.
    SessionReset,
    /// Publishes a refreshed session statistics report.
    StatsUpdated {
        /// Aggregated statistics for the running session.
        report: StatsReport,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Continuous position expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new point from world-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the point.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Computes the Euclidean distance between two points.
    #[must_use]
    pub fn distance_to(self, other: WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Location of a single placement cell expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    column: u32,
    row: u32,
}

impl GridCell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Centre of the cell in world units.
    #[must_use]
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(
            self.column as f32 * TILE_LENGTH + TILE_LENGTH / 2.0,
            self.row as f32 * TILE_LENGTH + TILE_LENGTH / 2.0,
        )
    }

    /// Cell containing the provided world position, if it is non-negative.
    #[must_use]
    pub fn containing(point: WorldPoint) -> Option<Self> {
        if point.x() < 0.0 || point.y() < 0.0 {
            return None;
        }

        Some(Self::new(
            (point.x() / TILE_LENGTH) as u32,
            (point.y() / TILE_LENGTH) as u32,
        ))
    }
}

/// Playfield dimensions snapped to whole placement tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    const FALLBACK_CONTAINER_WIDTH: f32 = 800.0;
    const MIN_CONTAINER_WIDTH: f32 = 100.0;

    /// Derives a playfield from the hosting container's width.
    ///
    /// The width snaps down to whole tiles and the height tracks a 4:3 aspect
    /// ratio, also snapped. Degenerate container widths fall back to a default
    /// so the path derivation always has room to work with.
    #[must_use]
    pub fn from_container_width(container_width: f32) -> Self {
        let container =
            if container_width.is_finite() && container_width >= Self::MIN_CONTAINER_WIDTH {
                container_width
            } else {
                Self::FALLBACK_CONTAINER_WIDTH
            };

        let width = (container / TILE_LENGTH).floor() * TILE_LENGTH;
        let height = (width * 0.75 / TILE_LENGTH).floor() * TILE_LENGTH;
        Self { width, height }
    }

    /// Width of the playfield in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the playfield in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Reports whether the provided point lies inside the playfield.
    #[must_use]
    pub fn contains(&self, point: WorldPoint) -> bool {
        point.x() >= 0.0 && point.x() < self.width && point.y() >= 0.0 && point.y() < self.height
    }
}

/// Number of whole simulation sub-steps executed per rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedMultiplier {
    /// One sub-step per frame.
    Normal,
    /// Two sub-steps per frame.
    Fast,
}

impl SpeedMultiplier {
    /// Number of whole sub-steps each frame advances.
    #[must_use]
    pub const fn sub_steps(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Fast => 2,
        }
    }

    /// Returns the other multiplier, used by the speed toggle control.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Fast,
            Self::Fast => Self::Normal,
        }
    }
}

/// Phase of the session state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Between waves; placement and wave starts are accepted.
    Preparing,
    /// A wave is active; duplicate wave starts are refused.
    WaveInProgress,
    /// Terminal victory state; only a reset re-initialises the session.
    Won,
    /// Terminal defeat state; only a reset re-initialises the session.
    Lost,
}

impl SessionPhase {
    /// Reports whether the phase ends the session.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Terminal outcome of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Every wave was survived.
    Victory,
    /// Comfort drained to zero.
    Defeat,
}

impl GameOutcome {
    /// Headline shown by the terminal-state dialog.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Victory => "You've Survived!",
            Self::Defeat => "Overwhelmed!",
        }
    }

    /// Narrative shown beneath the terminal-state headline.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Victory => "You navigated all social events and made it home. Time to recharge.",
            Self::Defeat => "Your comfort level dropped to zero. You had to retreat home early.",
        }
    }
}

/// Opaque RGB colour attached to enemy and tower kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KindColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl KindColor {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Social events that march along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Weak chatter that trickles in early.
    SmallTalk,
    /// Slightly tougher and faster interruption.
    GroupChatNotification,
    /// Slow bruiser with a large health pool.
    SurpriseParty,
    /// Fast mid-game threat.
    NetworkingEvent,
    /// The slowest, toughest obligation in the campaign.
    PublicSpeakingGig,
    /// Fast and durable late-game rusher.
    PartyAnimal,
    /// Fragile but very fast swarm unit.
    RumorMill,
}

impl EnemyKind {
    /// Unscaled health pool of the kind.
    #[must_use]
    pub const fn base_health(self) -> u32 {
        match self {
            Self::SmallTalk => 10,
            Self::GroupChatNotification => 15,
            Self::SurpriseParty => 100,
            Self::NetworkingEvent => 20,
            Self::PublicSpeakingGig => 150,
            Self::PartyAnimal => 40,
            Self::RumorMill => 8,
        }
    }

    /// Distance the kind covers per simulation tick. Never scaled.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            Self::SmallTalk => 1.0,
            Self::GroupChatNotification => 1.2,
            Self::SurpriseParty => 0.8,
            Self::NetworkingEvent => 1.5,
            Self::PublicSpeakingGig => 0.7,
            Self::PartyAnimal => 2.2,
            Self::RumorMill => 2.5,
        }
    }

    /// Unscaled social energy credited when the kind is destroyed.
    #[must_use]
    pub const fn base_reward(self) -> u32 {
        match self {
            Self::SmallTalk => 5,
            Self::GroupChatNotification => 8,
            Self::SurpriseParty => 30,
            Self::NetworkingEvent => 10,
            Self::PublicSpeakingGig => 50,
            Self::PartyAnimal => 15,
            Self::RumorMill => 4,
        }
    }

    /// Display name shown beneath the enemy disc.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SmallTalk => "Small Talk",
            Self::GroupChatNotification => "Group Chat Notification",
            Self::SurpriseParty => "Surprise Party",
            Self::NetworkingEvent => "Networking Event",
            Self::PublicSpeakingGig => "Public Speaking Gig",
            Self::PartyAnimal => "Party Animal",
            Self::RumorMill => "Rumor Mill",
        }
    }

    /// Display colour of the enemy disc.
    #[must_use]
    pub const fn color(self) -> KindColor {
        match self {
            Self::SmallTalk => KindColor::from_rgb(0xe5, 0x3e, 0x3e),
            Self::GroupChatNotification => KindColor::from_rgb(0xf6, 0xad, 0x55),
            Self::SurpriseParty => KindColor::from_rgb(0x38, 0xb2, 0xac),
            Self::NetworkingEvent => KindColor::from_rgb(0x80, 0x5a, 0xd5),
            Self::PublicSpeakingGig => KindColor::from_rgb(0x71, 0x80, 0x96),
            Self::PartyAnimal => KindColor::from_rgb(0xec, 0xc9, 0x4b),
            Self::RumorMill => KindColor::from_rgb(0x63, 0xb3, 0xed),
        }
    }

    /// Health pool after applying the wave's scale factor.
    #[must_use]
    pub fn scaled_health(self, scale: f32) -> f32 {
        (self.base_health() as f32 * scale).round()
    }

    /// Kill reward after applying the wave's scale factor.
    #[must_use]
    pub fn scaled_reward(self, scale: f32) -> u32 {
        (self.base_reward() as f32 * scale).round() as u32
    }
}

/// Avoidance tactics the player can construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap tower with low damage and a fast fire rate.
    PhoneCheck,
    /// Expensive tower with high damage and a slow fire rate.
    AwkwardJoke,
    /// Short-ranged tower that fires rapid, weak shots.
    Headphones,
}

impl TowerKind {
    /// All constructible tower kinds in control-panel order.
    pub const ALL: [Self; 3] = [Self::PhoneCheck, Self::AwkwardJoke, Self::Headphones];

    /// Social energy required to place the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::PhoneCheck => 50,
            Self::AwkwardJoke => 100,
            Self::Headphones => 75,
        }
    }

    /// Targeting radius before upgrades, in world units.
    #[must_use]
    pub const fn base_range(self) -> f32 {
        match self {
            Self::PhoneCheck => 120.0,
            Self::AwkwardJoke => 150.0,
            Self::Headphones => 90.0,
        }
    }

    /// Damage carried by each projectile before upgrades.
    #[must_use]
    pub const fn base_damage(self) -> f32 {
        match self {
            Self::PhoneCheck => 1.0,
            Self::AwkwardJoke => 5.0,
            Self::Headphones => 0.5,
        }
    }

    /// Ticks between shots before upgrades.
    #[must_use]
    pub const fn base_fire_period(self) -> u32 {
        match self {
            Self::PhoneCheck => 30,
            Self::AwkwardJoke => 80,
            Self::Headphones => 10,
        }
    }

    /// Social energy charged for each upgrade level.
    #[must_use]
    pub fn upgrade_cost(self) -> u32 {
        (self.cost() as f32 * 0.6).round() as u32
    }

    /// Display name shown on the control panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PhoneCheck => "Phone Check",
            Self::AwkwardJoke => "Awkward Joke",
            Self::Headphones => "Headphones",
        }
    }

    /// One-line summary shown on the control panel.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::PhoneCheck => "Low dmg, fast fire rate",
            Self::AwkwardJoke => "High dmg, slow fire rate",
            Self::Headphones => "Rapid but weak",
        }
    }

    /// Display colour of the tower body.
    #[must_use]
    pub const fn color(self) -> KindColor {
        match self {
            Self::PhoneCheck => KindColor::from_rgb(0x31, 0x82, 0xce),
            Self::AwkwardJoke => KindColor::from_rgb(0xd6, 0x9e, 0x2e),
            Self::Headphones => KindColor::from_rgb(0x9f, 0x7a, 0xea),
        }
    }

    /// Display colour of the tower's projectiles.
    #[must_use]
    pub const fn projectile_color(self) -> KindColor {
        match self {
            Self::PhoneCheck => KindColor::from_rgb(0xa0, 0xde, 0xff),
            Self::AwkwardJoke => KindColor::from_rgb(0xfe, 0xee, 0xb5),
            Self::Headphones => KindColor::from_rgb(0xe9, 0xd8, 0xfd),
        }
    }
}

/// Composition of a single wave: one kind, spawned sequentially.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavePlan {
    /// Number of enemies the wave releases.
    pub count: u32,
    /// Type of enemy the wave releases.
    pub kind: EnemyKind,
    /// Health/reward scale factor applied to every spawn.
    pub scale: f32,
}

impl WavePlan {
    const fn new(count: u32, kind: EnemyKind, scale: f32) -> Self {
        Self { count, kind, scale }
    }
}

const WAVES: [WavePlan; 8] = [
    WavePlan::new(5, EnemyKind::SmallTalk, 1.0),
    WavePlan::new(8, EnemyKind::SmallTalk, 1.2),
    WavePlan::new(10, EnemyKind::GroupChatNotification, 1.3),
    WavePlan::new(1, EnemyKind::SurpriseParty, 1.5),
    WavePlan::new(15, EnemyKind::NetworkingEvent, 1.4),
    WavePlan::new(5, EnemyKind::PublicSpeakingGig, 2.0),
    WavePlan::new(10, EnemyKind::PartyAnimal, 1.7),
    WavePlan::new(12, EnemyKind::RumorMill, 2.2),
];

/// Number of waves defined for the campaign.
#[must_use]
pub const fn wave_count() -> u32 {
    WAVES.len() as u32
}

/// Retrieves the plan for the provided one-based wave index.
#[must_use]
pub fn wave_plan(wave: u32) -> Option<WavePlan> {
    if wave == 0 {
        return None;
    }
    WAVES.get(wave as usize - 1).copied()
}

/// End-of-wave bonus credited when the provided wave completes.
#[must_use]
pub const fn wave_bonus(wave: u32) -> u32 {
    50 + 10 * wave
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the playfield.
    OutOfBounds,
    /// The requested cell overlaps the path corridor.
    OnPath,
    /// Another tower already occupies the requested cell.
    Occupied,
    /// The session cannot afford the tower's cost.
    InsufficientEnergy,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// The tower already reached the maximum upgrade level.
    MaxLevel,
    /// The session cannot afford the upgrade's cost.
    InsufficientEnergy,
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No tower with the provided identifier exists.
    MissingTower,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Type of the enemy.
    pub kind: EnemyKind,
    /// Current position in world units.
    pub position: WorldPoint,
    /// Remaining health.
    pub health: f32,
    /// Health the enemy spawned with.
    pub max_health: f32,
    /// Distance covered per simulation tick.
    pub speed: f32,
    /// Social energy credited if the enemy is destroyed.
    pub reward: u32,
    /// Index of the waypoint the enemy currently steers toward.
    pub path_index: usize,
}

impl EnemySnapshot {
    /// Remaining health expressed as a fraction of the spawn health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// Read-only snapshot describing all enemies on the path.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Type of the tower.
    pub kind: TowerKind,
    /// Cell anchoring the tower.
    pub cell: GridCell,
    /// Centre of the tower in world units.
    pub position: WorldPoint,
    /// Current targeting radius.
    pub range: f32,
    /// Current projectile damage.
    pub damage: f32,
    /// Current ticks between shots.
    pub fire_period: u32,
    /// Ticks remaining until the tower may fire again.
    pub cooldown: u32,
    /// Upgrade level in effect.
    pub level: u8,
}

impl TowerSnapshot {
    /// Reports whether another upgrade level is available.
    #[must_use]
    pub const fn can_upgrade(&self) -> bool {
        self.level < MAX_UPGRADE_LEVEL
    }
}

/// Read-only snapshot describing all towers placed in the session.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Current position in world units.
    pub position: WorldPoint,
    /// Enemy the projectile homes on.
    pub target: EnemyId,
    /// Damage applied on impact.
    pub damage: f32,
    /// Display colour inherited from the firing tower.
    pub color: KindColor,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Aggregated statistics for a running session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsReport {
    /// Enemies destroyed by projectiles.
    pub enemies_defeated: u32,
    /// Enemies that crossed the playfield boundary.
    pub enemies_leaked: u32,
    /// Projectiles fired by all towers.
    pub shots_fired: u32,
    /// Social energy credited from kills, bonuses, and sales.
    pub energy_earned: u32,
    /// Social energy spent on placements and upgrades.
    pub energy_spent: u32,
    /// Waves completed since the session began.
    pub waves_completed: u32,
}
