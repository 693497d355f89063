#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Social Defence.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter uses Macroquad's immediate-mode UI module so the control panel
//! can host widgets. All UI-specific calls live inside the local `ui` module
//! to avoid leaking Macroquad UI types throughout the renderer.

pub mod theme;
mod ui;

use self::theme::Theme;
use self::ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult};
use anyhow::Result;
use glam::Vec2;
use macroquad::math::Vec2 as MacroquadVec2;
use macroquad::{
    color::WHITE,
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
    shapes::{draw_circle, draw_circle_lines, draw_line, draw_rectangle, draw_rectangle_lines},
    text::{draw_text, measure_text},
};
use social_defence_core::{TowerKind, Viewport};
use social_defence_rendering::{
    Color, FrameInput, GridPresentation, PathPresentation, PlacementPreview, Presentation,
    RenderingBackend, Scene, SceneEnemy, SceneProjectile, SceneTower, TowerTier,
};
use std::time::Duration;

/// Width of the control panel docked right of the playfield.
const PANEL_WIDTH: f32 = 280.0;

/// Corner radius used for mid-tier tower bodies.
const ROUNDED_CORNER_RADIUS: f32 = 10.0;

/// Tracks UI-sourced interactions so they can be merged with physical input
/// on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    select_kind_latched: Option<TowerKind>,
    start_wave_latched: bool,
    toggle_speed_latched: bool,
    upgrade_latched: bool,
    sell_latched: bool,
    restart_latched: bool,
}

impl ControlPanelInputState {
    /// Returns the latched tower selection, clearing it so it fires once.
    pub fn take_select_kind(&mut self) -> Option<TowerKind> {
        self.select_kind_latched.take()
    }

    /// Records that a tower button was pressed this frame.
    pub fn register_select_kind(&mut self, kind: TowerKind) {
        self.select_kind_latched = Some(kind);
    }

    /// Returns whether the UI requested a wave start, clearing the latch.
    pub fn take_start_wave(&mut self) -> bool {
        std::mem::take(&mut self.start_wave_latched)
    }

    /// Records that the start-wave button was pressed this frame.
    pub fn register_start_wave(&mut self) {
        self.start_wave_latched = true;
    }

    /// Returns whether the UI requested a speed toggle, clearing the latch.
    pub fn take_toggle_speed(&mut self) -> bool {
        std::mem::take(&mut self.toggle_speed_latched)
    }

    /// Records that the speed toggle button was pressed this frame.
    pub fn register_toggle_speed(&mut self) {
        self.toggle_speed_latched = true;
    }

    /// Returns whether the UI requested an upgrade, clearing the latch.
    pub fn take_upgrade(&mut self) -> bool {
        std::mem::take(&mut self.upgrade_latched)
    }

    /// Records that the upgrade button was pressed this frame.
    pub fn register_upgrade(&mut self) {
        self.upgrade_latched = true;
    }

    /// Returns whether the UI requested a sale, clearing the latch.
    pub fn take_sell(&mut self) -> bool {
        std::mem::take(&mut self.sell_latched)
    }

    /// Records that the sell button was pressed this frame.
    pub fn register_sell(&mut self) {
        self.sell_latched = true;
    }

    /// Returns whether the UI requested a restart, clearing the latch.
    pub fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_latched)
    }

    /// Records that the restart button was pressed this frame.
    pub fn register_restart(&mut self) {
        self.restart_latched = true;
    }

    fn register_ui_result(&mut self, result: ControlPanelUiResult) {
        if let Some(kind) = result.select_kind {
            self.register_select_kind(kind);
        }
        if result.start_wave {
            self.register_start_wave();
        }
        if result.toggle_speed {
            self.register_toggle_speed();
        }
        if result.upgrade {
            self.register_upgrade();
        }
        if result.sell {
            self.register_sell();
        }
        if result.restart {
            self.register_restart();
        }
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `1`/`2`/`3` select a tower kind for placement.
    select_kind: Option<TowerKind>,
    /// `Enter` starts the next wave.
    start_wave: bool,
    /// `F` toggles the speed multiplier.
    toggle_speed: bool,
    /// `U` upgrades the selected tower.
    upgrade: bool,
    /// `X` sells the selected tower.
    sell: bool,
    /// `R` resets the session.
    reset: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let select_kind = if is_key_pressed(KeyCode::Key1) {
            Some(TowerKind::PhoneCheck)
        } else if is_key_pressed(KeyCode::Key2) {
            Some(TowerKind::AwkwardJoke)
        } else if is_key_pressed(KeyCode::Key3) {
            Some(TowerKind::Headphones)
        } else {
            None
        };

        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            select_kind,
            start_wave: is_key_pressed(KeyCode::Enter),
            toggle_speed: is_key_pressed(KeyCode::F),
            upgrade: is_key_pressed(KeyCode::U),
            sell: is_key_pressed(KeyCode::X),
            reset: is_key_pressed(KeyCode::R),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    theme: Theme,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            theme: Theme::default(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Synchronises presentation with the display refresh rate, or not.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend draws a frame-rate overlay.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Applies a palette to the playfield chrome.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            theme,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let viewport = scene
            .grid
            .map(|grid| grid.viewport)
            .unwrap_or_else(|| Viewport::from_container_width(800.0));

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: (viewport.width() + PANEL_WIDTH) as i32,
            window_height: viewport.height() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut panel_input = ControlPanelInputState::default();
            let background = to_macroquad_color(clear_color);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(&scene, keyboard, &mut panel_input);

                update_scene(frame_dt, frame_input, &mut scene);

                draw_scene(&scene, &theme);

                if let Some(panel) = &scene.panel {
                    let panel_origin = MacroquadVec2::new(viewport.width(), 0.0);
                    let panel_size = MacroquadVec2::new(PANEL_WIDTH, viewport.height());
                    let context = ControlPanelUiContext {
                        origin: panel_origin,
                        size: panel_size,
                        background: to_macroquad_color(theme.panel),
                        view: panel,
                        session_over: scene.game_over.is_some(),
                    };
                    let result = {
                        let mut root = macroquad::ui::root_ui();
                        draw_control_panel_ui(&mut root, context)
                    };
                    panel_input.register_ui_result(result);
                }

                if show_fps {
                    let fps_text = format!("{} fps", macroquad::time::get_fps());
                    draw_text(&fps_text, 8.0, 18.0, 18.0, WHITE);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input(
    scene: &Scene,
    keyboard: KeyboardShortcuts,
    panel_input: &mut ControlPanelInputState,
) -> FrameInput {
    let cursor = cursor_world_position(scene);

    FrameInput {
        cursor_world_space: cursor,
        confirm_action: cursor.is_some() && is_mouse_button_pressed(MouseButton::Left),
        select_kind: keyboard.select_kind.or_else(|| panel_input.take_select_kind()),
        upgrade_action: keyboard.upgrade || panel_input.take_upgrade(),
        sell_action: keyboard.sell || panel_input.take_sell(),
        start_wave: keyboard.start_wave || panel_input.take_start_wave(),
        toggle_speed: keyboard.toggle_speed || panel_input.take_toggle_speed(),
        reset_action: keyboard.reset || panel_input.take_restart(),
    }
}

fn cursor_world_position(scene: &Scene) -> Option<Vec2> {
    let grid = scene.grid?;
    let (x, y) = mouse_position();
    let point = Vec2::new(x, y);
    let inside = x >= 0.0 && x < grid.viewport.width() && y >= 0.0 && y < grid.viewport.height();
    inside.then_some(point)
}

fn draw_scene(scene: &Scene, theme: &Theme) {
    draw_path(&scene.path);
    if let Some(grid) = &scene.grid {
        draw_grid(grid);
    }
    for tower in &scene.towers {
        draw_tower(tower);
    }
    if let Some(preview) = &scene.preview {
        draw_preview(preview);
    }
    for enemy in &scene.enemies {
        draw_enemy(enemy, theme);
    }
    for projectile in &scene.projectiles {
        draw_projectile(projectile);
    }
    if let Some(game_over) = &scene.game_over {
        draw_game_over(scene, game_over.title, game_over.message);
    }
}

fn draw_path(path: &PathPresentation) {
    if path.points.len() < 2 {
        return;
    }

    let color = to_macroquad_color(path.color);
    for segment in path.points.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        draw_line(a.x, a.y, b.x, b.y, path.stroke_width, color);
    }

    // Round joints, matching the ribbon's stroke.
    for joint in &path.points[1..path.points.len() - 1] {
        draw_circle(joint.x, joint.y, path.stroke_width / 2.0, color);
    }
}

fn draw_grid(grid: &GridPresentation) {
    let color = to_macroquad_color(grid.line_color);
    let width = grid.viewport.width();
    let height = grid.viewport.height();

    for column in 0..=grid.columns() {
        let x = column as f32 * grid.tile_length;
        draw_line(x, 0.0, x, height, 1.0, color);
    }
    for row in 0..=grid.rows() {
        let y = row as f32 * grid.tile_length;
        draw_line(0.0, y, width, y, 1.0, color);
    }
}

fn draw_tower(tower: &SceneTower) {
    if tower.selected {
        let ring = to_macroquad_color(Color::new(1.0, 1.0, 1.0, 0.08));
        let outline = to_macroquad_color(Color::new(1.0, 1.0, 1.0, 0.25));
        draw_circle(tower.position.x, tower.position.y, tower.range, ring);
        draw_circle_lines(tower.position.x, tower.position.y, tower.range, 2.0, outline);
    }

    let body = to_macroquad_color(tower.color);
    let outline = to_macroquad_color(Color::from_rgb_u8(0x1a, 0x20, 0x2c));
    let half = tower.size / 2.0;
    let left = tower.position.x - half;
    let top = tower.position.y - half;

    match tower.tier {
        TowerTier::Square => {
            draw_rectangle(left, top, tower.size, tower.size, body);
            draw_rectangle_lines(left, top, tower.size, tower.size, 2.0, outline);
        }
        TowerTier::Rounded => {
            draw_rounded_rectangle(left, top, tower.size, tower.size, ROUNDED_CORNER_RADIUS, body);
        }
        TowerTier::Circle => {
            draw_circle(tower.position.x, tower.position.y, half, body);
            draw_circle_lines(tower.position.x, tower.position.y, half, 2.0, outline);
        }
    }
}

/// Approximates a rounded rectangle with two rectangles and corner discs.
fn draw_rounded_rectangle(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    radius: f32,
    color: macroquad::color::Color,
) {
    draw_rectangle(x + radius, y, width - 2.0 * radius, height, color);
    draw_rectangle(x, y + radius, width, height - 2.0 * radius, color);
    for (corner_x, corner_y) in [
        (x + radius, y + radius),
        (x + width - radius, y + radius),
        (x + radius, y + height - radius),
        (x + width - radius, y + height - radius),
    ] {
        draw_circle(corner_x, corner_y, radius, color);
    }
}

fn draw_enemy(enemy: &SceneEnemy, theme: &Theme) {
    draw_circle(
        enemy.position.x,
        enemy.position.y,
        enemy.radius,
        to_macroquad_color(enemy.color),
    );

    let bar_width = enemy.radius * 2.0;
    let bar_height = 5.0;
    let bar_left = enemy.position.x - enemy.radius;
    let bar_top = enemy.position.y - enemy.radius - 10.0;
    draw_rectangle(
        bar_left,
        bar_top,
        bar_width,
        bar_height,
        to_macroquad_color(theme.health_track),
    );
    draw_rectangle(
        bar_left,
        bar_top,
        bar_width * enemy.health_fraction.clamp(0.0, 1.0),
        bar_height,
        to_macroquad_color(theme.health_fill),
    );

    let font_size = 14.0;
    let metrics = measure_text(enemy.label, None, font_size as u16, 1.0);
    draw_text(
        enemy.label,
        enemy.position.x - metrics.width / 2.0,
        enemy.position.y + enemy.radius + 14.0,
        font_size,
        WHITE,
    );
}

fn draw_preview(preview: &PlacementPreview) {
    let ring = to_macroquad_color(Color::new(1.0, 1.0, 1.0, 0.1));
    draw_circle(preview.position.x, preview.position.y, preview.range, ring);

    let body = if preview.placeable {
        preview.color.with_alpha(0.6)
    } else {
        Color::from_rgb_u8(0xe5, 0x3e, 0x3e).with_alpha(0.6)
    };
    let half = preview.size / 2.0;
    draw_rectangle(
        preview.position.x - half,
        preview.position.y - half,
        preview.size,
        preview.size,
        to_macroquad_color(body),
    );
}

fn draw_projectile(projectile: &SceneProjectile) {
    draw_circle(
        projectile.position.x,
        projectile.position.y,
        projectile.radius,
        to_macroquad_color(projectile.color),
    );
}

fn draw_game_over(scene: &Scene, title: &str, message: &str) {
    let Some(grid) = &scene.grid else {
        return;
    };
    let width = grid.viewport.width();
    let height = grid.viewport.height();

    draw_rectangle(
        0.0,
        0.0,
        width,
        height,
        to_macroquad_color(Color::new(0.0, 0.0, 0.0, 0.6)),
    );

    let title_size = 42.0;
    let title_metrics = measure_text(title, None, title_size as u16, 1.0);
    draw_text(
        title,
        (width - title_metrics.width) / 2.0,
        height / 2.0 - 16.0,
        title_size,
        WHITE,
    );

    let message_size = 20.0;
    let message_metrics = measure_text(message, None, message_size as u16, 1.0);
    draw_text(
        message,
        (width - message_metrics.width) / 2.0,
        height / 2.0 + 20.0,
        message_size,
        WHITE,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
