#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Social Defence adapters.
//!
//! Backends receive a declarative [`Scene`] each frame and never touch the
//! world directly; the driving adapter populates the scene from world queries
//! and maps captured [`FrameInput`] back into simulation commands.

use anyhow::Result as AnyResult;
use glam::Vec2;
use social_defence_core::{
    EnemyId, GameOutcome, KindColor, SessionPhase, SpeedMultiplier, StatsReport, TowerId,
    TowerKind, Viewport, WorldPoint,
};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Converts a kind palette entry into a presentable color.
    #[must_use]
    pub const fn from_kind(color: KindColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }

    /// Returns the same color with the provided alpha channel.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Converts a world-space point into the vector type backends consume.
#[must_use]
pub fn vec2_from(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position expressed in world units, when over the playfield.
    pub cursor_world_space: Option<Vec2>,
    /// Whether the adapter detected a placement/selection click this frame.
    pub confirm_action: bool,
    /// Tower kind chosen on the control panel this frame, if any.
    pub select_kind: Option<TowerKind>,
    /// Whether an upgrade of the selected tower was requested.
    pub upgrade_action: bool,
    /// Whether a sale of the selected tower was requested.
    pub sell_action: bool,
    /// Whether the next wave was requested.
    pub start_wave: bool,
    /// Whether the speed toggle was requested.
    pub toggle_speed: bool,
    /// Whether a full session reset was requested.
    pub reset_action: bool,
}

/// Visual tier of a tower, derived from its upgrade level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TowerTier {
    /// Level 0 renders as a plain square.
    Square,
    /// Level 1 renders with rounded corners.
    Rounded,
    /// Level 2 renders as a circle.
    Circle,
}

impl TowerTier {
    /// Maps an upgrade level onto its visual tier.
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Square,
            1 => Self::Rounded,
            _ => Self::Circle,
        }
    }
}

/// Tile grid descriptor drawn beneath the playfield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Playfield dimensions the grid covers.
    pub viewport: Viewport,
    /// Side length of a single square tile.
    pub tile_length: f32,
    /// Color applied to the grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Constructs a grid descriptor, validating the tile length.
    pub fn new(
        viewport: Viewport,
        tile_length: f32,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if !(tile_length > 0.0) {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            viewport,
            tile_length,
            line_color,
        })
    }

    /// Number of whole columns the grid spans.
    #[must_use]
    pub fn columns(&self) -> u32 {
        (self.viewport.width() / self.tile_length) as u32
    }

    /// Number of whole rows the grid spans.
    #[must_use]
    pub fn rows(&self) -> u32 {
        (self.viewport.height() / self.tile_length) as u32
    }
}

/// Path ribbon drawn across the playfield.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PathPresentation {
    /// Ordered polyline points in world units.
    pub points: Vec<Vec2>,
    /// Stroke width of the ribbon.
    pub stroke_width: f32,
    /// Color applied to the ribbon.
    pub color: Color,
}

/// Immutable snapshot describing an enemy disc within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Identifier of the enemy in the simulation.
    pub id: EnemyId,
    /// Centre of the disc in world units.
    pub position: Vec2,
    /// Radius of the disc.
    pub radius: f32,
    /// Remaining health as a fraction of spawn health.
    pub health_fraction: f32,
    /// Fill color of the disc.
    pub color: Color,
    /// Label drawn beneath the disc.
    pub label: &'static str,
}

/// Immutable snapshot describing a tower within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier of the tower in the simulation.
    pub id: TowerId,
    /// Centre of the tower in world units.
    pub position: Vec2,
    /// Side length of the tower body.
    pub size: f32,
    /// Visual tier derived from the upgrade level.
    pub tier: TowerTier,
    /// Fill color of the tower body.
    pub color: Color,
    /// Current targeting radius, drawn when the tower is selected.
    pub range: f32,
    /// Whether the tower is currently selected on screen.
    pub selected: bool,
}

/// Immutable snapshot describing a projectile dot within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Centre of the dot in world units.
    pub position: Vec2,
    /// Radius of the dot.
    pub radius: f32,
    /// Fill color of the dot.
    pub color: Color,
}

/// Declarative placement preview emitted while a tower kind is selected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPreview {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Snapped centre of the hovered cell.
    pub position: Vec2,
    /// Side length of the preview body.
    pub size: f32,
    /// Targeting radius drawn around the preview.
    pub range: f32,
    /// Body color of the preview.
    pub color: Color,
    /// Whether the hovered cell accepts the placement.
    pub placeable: bool,
}

/// Control panel entry for one constructible tower kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerButtonView {
    /// Tower kind the button constructs.
    pub kind: TowerKind,
    /// Placement cost shown on the button.
    pub cost: u32,
    /// One-line description shown beneath the label.
    pub description: &'static str,
    /// Whether the session can afford the kind right now.
    pub affordable: bool,
    /// Whether the kind is the active placement selection.
    pub selected: bool,
}

/// Upgrade/sell affordances for the selected tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedTowerPanel {
    /// Identifier of the selected tower.
    pub tower: TowerId,
    /// Upgrade price, absent once the tower is maxed.
    pub upgrade_cost: Option<u32>,
    /// Whether the session can afford the upgrade right now.
    pub upgrade_affordable: bool,
    /// Refund the sale would credit.
    pub refund: u32,
}

/// Read-only projection of the session counters for the control panel.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlPanelView {
    /// Social energy available to the session.
    pub energy: u32,
    /// Comfort points remaining.
    pub comfort: u32,
    /// One-based index of the most recently started wave.
    pub wave: u32,
    /// Phase of the session state machine.
    pub phase: SessionPhase,
    /// Active frame speed multiplier.
    pub speed: SpeedMultiplier,
    /// Whether the start-wave control is unlocked.
    pub start_enabled: bool,
    /// Buttons for every constructible tower kind.
    pub tower_buttons: Vec<TowerButtonView>,
    /// Affordances for the selected tower, if any.
    pub selected_tower: Option<SelectedTowerPanel>,
    /// Latest aggregated statistics, if the analytics system published any.
    pub stats: Option<StatsReport>,
}

impl ControlPanelView {
    /// Builds the tower buttons for the provided energy and selection.
    #[must_use]
    pub fn tower_buttons_for(energy: u32, selected: Option<TowerKind>) -> Vec<TowerButtonView> {
        TowerKind::ALL
            .iter()
            .map(|&kind| TowerButtonView {
                kind,
                cost: kind.cost(),
                description: kind.description(),
                affordable: energy >= kind.cost(),
                selected: selected == Some(kind),
            })
            .collect()
    }
}

/// Terminal-state dialog content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOverPresentation {
    /// Headline of the dialog.
    pub title: &'static str,
    /// Narrative shown beneath the headline.
    pub message: &'static str,
}

impl GameOverPresentation {
    /// Builds the dialog content for a terminal outcome.
    #[must_use]
    pub const fn from_outcome(outcome: GameOutcome) -> Self {
        Self {
            title: outcome.title(),
            message: outcome.message(),
        }
    }
}

/// Scene content describing one presentable frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Playfield dimensions, present once the viewport is configured.
    pub grid: Option<GridPresentation>,
    /// Path ribbon across the playfield.
    pub path: PathPresentation,
    /// Enemy discs in spawn order.
    pub enemies: Vec<SceneEnemy>,
    /// Tower bodies in placement order.
    pub towers: Vec<SceneTower>,
    /// Projectile dots in firing order.
    pub projectiles: Vec<SceneProjectile>,
    /// Placement preview while a kind is selected.
    pub preview: Option<PlacementPreview>,
    /// Control panel projection.
    pub panel: Option<ControlPanelView>,
    /// Terminal-state dialog, present once the session ended.
    pub game_over: Option<GameOverPresentation>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Social Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tile length must be positive to avoid a degenerate grid.
    InvalidTileLength {
        /// Provided tile length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile_length must be positive (received {tile_length})")
            }
        }
    }
}

impl Error for RenderingError {}
