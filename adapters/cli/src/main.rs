#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Social Defence experience.
//!
//! The adapter owns the frame pump: captured input maps onto commands, the
//! world applies them plus one tick, the wave director answers the broadcast
//! events with spawn commands, and the resulting state is projected into a
//! declarative scene for the rendering backend.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use log::info;
use social_defence_core::{
    Command, Event, GameOutcome, GridCell, SessionPhase, TowerId, TowerKind, Viewport, WorldPoint,
    ENEMY_RADIUS, PROJECTILE_RADIUS, TILE_LENGTH,
};
use social_defence_rendering::{
    vec2_from, Color, ControlPanelView, FrameInput, GameOverPresentation, GridPresentation,
    PathPresentation, PlacementPreview, Presentation, RenderingBackend, Scene, SceneEnemy,
    SceneProjectile, SceneTower, SelectedTowerPanel, TowerTier,
};
use social_defence_rendering_macroquad::{theme::Theme, MacroquadBackend};
use social_defence_system_analytics::Analytics;
use social_defence_system_bootstrap::Bootstrap;
use social_defence_system_wave_director::WaveDirector;
use social_defence_world::{self as world, query, World};

/// Survive the social calendar: place avoidance tactics, hold your comfort.
#[derive(Debug, Parser)]
#[command(name = "social-defence")]
struct Args {
    /// Container width the playfield is derived from, in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Render as fast as possible instead of syncing to the display.
    #[arg(long)]
    no_vsync: bool,

    /// Draw a frame-rate overlay in the playfield corner.
    #[arg(long)]
    show_fps: bool,

    /// Path to a TOML theme file overriding the built-in palette.
    #[arg(long)]
    theme: Option<std::path::PathBuf>,
}

/// Player-side selection state, owned by the adapter rather than the world.
#[derive(Clone, Copy, Debug, Default)]
struct Selection {
    /// Tower kind armed for placement, if any.
    placement_kind: Option<TowerKind>,
    /// Placed tower whose affordances are open, if any.
    tower: Option<TowerId>,
}

struct Session {
    world: World,
    director: WaveDirector,
    analytics: Analytics,
    selection: Selection,
    cursor: Option<Vec2>,
    theme: Theme,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let theme = args
        .theme
        .as_ref()
        .map(Theme::from_file)
        .transpose()
        .context("failed to load theme file")?
        .unwrap_or_default();

    let mut world = World::new();
    let bootstrap = Bootstrap::default();
    info!("{}", bootstrap.welcome_banner(&world));

    let mut startup_events = Vec::new();
    for command in bootstrap.initial_commands(args.width) {
        world::apply(&mut world, command, &mut startup_events);
    }

    let mut session = Session {
        world,
        director: WaveDirector::default(),
        analytics: Analytics::new(),
        selection: Selection::default(),
        cursor: None,
        theme,
    };

    let mut scene = Scene::default();
    populate_scene(&session, &mut scene);

    let presentation = Presentation::new("Social Defence", theme.background, scene);
    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps)
        .with_theme(theme);

    backend.run(presentation, move |frame_dt, input, scene| {
        run_frame(&mut session, frame_dt, input);
        populate_scene(&session, scene);
    })
}

/// Applies one frame: input commands, the tick, scheduled spawns, analytics.
fn run_frame(session: &mut Session, frame_dt: Duration, input: FrameInput) {
    session.cursor = input.cursor_world_space;

    let mut events = Vec::new();
    for command in map_input_commands(session, input) {
        world::apply(&mut session.world, command, &mut events);
    }

    world::apply(&mut session.world, Command::Tick { dt: frame_dt }, &mut events);

    let mut spawn_commands = Vec::new();
    session.director.handle(&events, &mut spawn_commands);
    for command in spawn_commands {
        world::apply(&mut session.world, command, &mut events);
    }

    let mut published = Vec::new();
    session.analytics.handle(&events, &mut published);
    events.extend(published);

    react_to_events(session, &events);
}

/// Maps the frame's captured input onto simulation commands.
fn map_input_commands(session: &mut Session, input: FrameInput) -> Vec<Command> {
    let mut commands = Vec::new();

    if input.reset_action {
        session.selection = Selection::default();
        commands.push(Command::Reset);
        return commands;
    }

    if let Some(kind) = input.select_kind {
        if session.selection.placement_kind == Some(kind) {
            // Re-selecting the armed kind disarms placement.
            session.selection.placement_kind = None;
        } else if query::energy(&session.world) >= kind.cost() {
            session.selection.placement_kind = Some(kind);
            session.selection.tower = None;
        }
    }

    if input.start_wave {
        commands.push(Command::StartWave);
    }

    if input.toggle_speed {
        commands.push(Command::SetSpeed {
            multiplier: query::speed(&session.world).toggled(),
        });
    }

    if let Some(tower) = session.selection.tower {
        if input.upgrade_action {
            commands.push(Command::UpgradeTower { tower });
        }
        if input.sell_action {
            commands.push(Command::SellTower { tower });
        }
    }

    if input.confirm_action {
        if let Some(cursor) = input.cursor_world_space {
            let point = WorldPoint::new(cursor.x, cursor.y);
            if let Some(cell) = GridCell::containing(point) {
                if let Some(kind) = session.selection.placement_kind {
                    commands.push(Command::PlaceTower { kind, cell });
                } else {
                    session.selection.tower = tower_at(&session.world, cell);
                }
            }
        }
    }

    commands
}

/// Keeps adapter-side selection consistent with the applied events.
fn react_to_events(session: &mut Session, events: &[Event]) {
    for event in events {
        match event {
            Event::TowerPlaced { .. } => session.selection.placement_kind = None,
            Event::TowerSold { tower, .. } if session.selection.tower == Some(*tower) => {
                session.selection.tower = None;
            }
            Event::SessionReset => session.selection = Selection::default(),
            Event::WaveStarted { wave, .. } => info!("wave {wave} started"),
            Event::WaveCompleted { wave, bonus } => {
                info!("wave {wave} completed (+{bonus} energy)");
            }
            Event::GameEnded { outcome } => info!("session ended: {}", outcome.title()),
            _ => {}
        }
    }

    if let Some(tower) = session.selection.tower {
        if query::tower(&session.world, tower).is_none() {
            session.selection.tower = None;
        }
    }
}

fn tower_at(world: &World, cell: GridCell) -> Option<TowerId> {
    query::tower_view(world)
        .iter()
        .find(|snapshot| snapshot.cell == cell)
        .map(|snapshot| snapshot.id)
}

/// Projects the session into the declarative scene the backend draws.
fn populate_scene(session: &Session, scene: &mut Scene) {
    let world = &session.world;
    let theme = &session.theme;
    let viewport = query::viewport(world);
    let energy = query::energy(world);
    let phase = query::phase(world);

    scene.grid = GridPresentation::new(viewport, TILE_LENGTH, theme.grid).ok();
    scene.path = PathPresentation {
        points: query::path(world)
            .waypoints()
            .iter()
            .copied()
            .map(vec2_from)
            .collect(),
        stroke_width: TILE_LENGTH * 0.6,
        color: theme.path,
    };

    scene.enemies = query::enemy_view(world)
        .iter()
        .map(|snapshot| SceneEnemy {
            id: snapshot.id,
            position: vec2_from(snapshot.position),
            radius: ENEMY_RADIUS,
            health_fraction: snapshot.health_fraction(),
            color: Color::from_kind(snapshot.kind.color()),
            label: snapshot.kind.label(),
        })
        .collect();

    scene.towers = query::tower_view(world)
        .iter()
        .map(|snapshot| {
            let selected = session.selection.tower == Some(snapshot.id);
            let color = Color::from_kind(snapshot.kind.color());
            SceneTower {
                id: snapshot.id,
                position: vec2_from(snapshot.position),
                size: TILE_LENGTH * 0.8,
                tier: TowerTier::from_level(snapshot.level),
                color: if selected { color.lighten(0.15) } else { color },
                range: snapshot.range,
                selected,
            }
        })
        .collect();

    scene.projectiles = query::projectile_view(world)
        .iter()
        .map(|snapshot| SceneProjectile {
            position: vec2_from(snapshot.position),
            radius: PROJECTILE_RADIUS,
            color: Color::from_kind(snapshot.color),
        })
        .collect();

    scene.preview = placement_preview(session, viewport, energy);

    let selected_tower = session.selection.tower.and_then(|id| {
        query::tower(world, id).map(|snapshot| SelectedTowerPanel {
            tower: id,
            upgrade_cost: snapshot
                .can_upgrade()
                .then(|| snapshot.kind.upgrade_cost()),
            upgrade_affordable: energy >= snapshot.kind.upgrade_cost(),
            refund: query::sell_refund(world, id).unwrap_or(0),
        })
    });

    scene.panel = Some(ControlPanelView {
        energy,
        comfort: query::comfort(world),
        wave: query::wave(world),
        phase,
        speed: query::speed(world),
        start_enabled: phase == SessionPhase::Preparing,
        tower_buttons: ControlPanelView::tower_buttons_for(
            energy,
            session.selection.placement_kind,
        ),
        selected_tower,
        stats: Some(session.analytics.report()),
    });

    scene.game_over = match phase {
        SessionPhase::Won => Some(GameOverPresentation::from_outcome(GameOutcome::Victory)),
        SessionPhase::Lost => Some(GameOverPresentation::from_outcome(GameOutcome::Defeat)),
        SessionPhase::Preparing | SessionPhase::WaveInProgress => None,
    };
}

fn placement_preview(
    session: &Session,
    viewport: Viewport,
    energy: u32,
) -> Option<PlacementPreview> {
    let kind = session.selection.placement_kind?;
    let cursor = session.cursor?;
    let cell = GridCell::containing(WorldPoint::new(cursor.x, cursor.y))?;
    let center = cell.center();

    let occupied = query::tower_view(&session.world)
        .iter()
        .any(|snapshot| snapshot.cell == cell);
    let placeable = viewport.contains(center)
        && !query::path(&session.world).blocks_cell(cell)
        && !occupied
        && energy >= kind.cost();

    Some(PlacementPreview {
        kind,
        position: vec2_from(center),
        size: TILE_LENGTH * 0.8,
        range: kind.base_range(),
        color: Color::from_kind(kind.color()),
        placeable,
    })
}
