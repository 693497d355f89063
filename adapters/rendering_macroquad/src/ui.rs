//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter
//! can remain agnostic of Macroquad's UI types. Control-panel button presses
//! are returned to the caller, which latches them for the next frame's input.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};
use social_defence_core::{SessionPhase, SpeedMultiplier, TowerKind};
use social_defence_rendering::ControlPanelView;

/// Outcome of rendering the control panel UI for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Tower kind whose button was pressed this frame, if any.
    pub select_kind: Option<TowerKind>,
    /// Whether the start-wave button was pressed.
    pub start_wave: bool,
    /// Whether the speed toggle button was pressed.
    pub toggle_speed: bool,
    /// Whether the upgrade button was pressed.
    pub upgrade: bool,
    /// Whether the sell button was pressed.
    pub sell: bool,
    /// Whether the restart button was pressed.
    pub restart: bool,
}

/// Layout and data for drawing the control panel this frame.
#[derive(Clone, Debug)]
pub(crate) struct ControlPanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub origin: Vec2,
    /// Panel dimensions in screen space.
    pub size: Vec2,
    /// Background colour applied to the window skin.
    pub background: Color,
    /// Counter and affordance projection exposed by the simulation.
    pub view: &'a ControlPanelView,
    /// Whether the session has ended and a restart should be offered.
    pub session_over: bool,
}

/// Renders the control panel's labels and interactive elements.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext<'_>,
) -> ControlPanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(12.0, 12.0, 12.0, 12.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 2.0, 2.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(43, 108, 176, 255))
        .color_hovered(Color::from_rgba(49, 130, 206, 255))
        .color_clicked(Color::from_rgba(44, 82, 130, 255))
        .color_selected(Color::from_rgba(43, 108, 176, 255))
        .color_selected_hovered(Color::from_rgba(49, 130, 206, 255))
        .color_inactive(Color::from_rgba(74, 85, 104, 200))
        .margin(RectOffset::new(0.0, 0.0, 6.0, 6.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut result = ControlPanelUiResult::default();
    let view = context.view;
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        ui.label(None, &format!("Social Energy: {}", view.energy));
        ui.label(None, &format!("Comfort: {}", view.comfort));
        ui.label(None, &format!("Wave: {}", view.wave));

        let phase_label = match view.phase {
            SessionPhase::Preparing => "Between waves",
            SessionPhase::WaveInProgress => "Wave in progress",
            SessionPhase::Won => "Survived",
            SessionPhase::Lost => "Overwhelmed",
        };
        ui.label(None, phase_label);
        ui.separator();

        ui.label(None, "Avoidance Tactics");
        for button in &view.tower_buttons {
            let marker = if button.selected { "> " } else { "" };
            let caption = format!("{marker}{} (${})", button.kind.label(), button.cost);
            if ui.button(None, caption.as_str()) {
                result.select_kind = Some(button.kind);
            }
            ui.label(None, button.description);
        }
        ui.separator();

        if view.start_enabled {
            if ui.button(None, "Start Wave") {
                result.start_wave = true;
            }
        } else {
            ui.label(None, "Start Wave (locked)");
        }

        let speed_caption = match view.speed {
            SpeedMultiplier::Normal => "Normal Speed (1x)",
            SpeedMultiplier::Fast => "Fast Speed (2x)",
        };
        if ui.button(None, speed_caption) {
            result.toggle_speed = true;
        }

        if let Some(selected) = &view.selected_tower {
            ui.separator();
            match selected.upgrade_cost {
                Some(cost) if selected.upgrade_affordable => {
                    if ui.button(None, format!("Upgrade (${cost})").as_str()) {
                        result.upgrade = true;
                    }
                }
                Some(cost) => {
                    ui.label(None, &format!("Upgrade (${cost}) - low energy"));
                }
                None => {
                    ui.label(None, "Maxed");
                }
            }
            if ui.button(None, format!("Sell (+${})", selected.refund).as_str()) {
                result.sell = true;
            }
        }

        if let Some(stats) = &view.stats {
            ui.separator();
            ui.label(None, &format!("Defeated: {}", stats.enemies_defeated));
            ui.label(None, &format!("Leaked: {}", stats.enemies_leaked));
            ui.label(None, &format!("Shots: {}", stats.shots_fired));
            ui.label(
                None,
                &format!(
                    "Energy +{} / -{}",
                    stats.energy_earned, stats.energy_spent
                ),
            );
        }

        if context.session_over {
            ui.separator();
            if ui.button(None, "Play Again") {
                result.restart = true;
            }
        }
    });

    ui.pop_skin();

    result
}
