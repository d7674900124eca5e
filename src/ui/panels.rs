use egui::{Color32, Context, RichText, ScrollArea, Ui};

use crate::config::{LEVEL_DOMAIN, RANGE_DOMAIN, RESOLUTION_DOMAIN};
use crate::math::{LEVEL_FUNCTION, PlotResult, SURFACE_FUNCTIONS};
use crate::renderer::CameraMode;
use crate::ui::state::{AppMode, SurfaceViewMode, UiState};
use crate::ui::theme::*;

#[derive(Default)]
pub struct UiActions {
    pub replot: bool,
    pub reset_camera: bool,
}

/// Summary of the last sampling pass shown under the formula.
pub struct PlotInfo<'a> {
    pub result: Option<&'a PlotResult>,
    pub fps: f32,
}

pub fn draw_side_panel(ctx: &Context, state: &mut UiState, info: &PlotInfo) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(340.0)
        .max_width(440.0)
        .default_width(380.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("Multivariable Calculus").strong());
                ui.add_space(4.0);
                ui.label(RichText::new("Functions of several variables").color(TEXT_MUTED).size(11.0));
                ui.add_space(16.0);

                section_header(ui, "TOPIC");
                ui.horizontal(|ui| {
                    actions.replot |= mode_button(ui, state, AppMode::TwoVariable, "z = f(x, y)", ACCENT_TEAL);
                    actions.replot |= mode_button(ui, state, AppMode::ThreeVariable, "w = f(x, y, z)", ACCENT_AMBER);
                });
                ui.add_space(16.0);
                ui.separator();
                ui.add_space(12.0);

                match state.app_mode {
                    AppMode::TwoVariable => two_variable_controls(ui, state, &mut actions),
                    AppMode::ThreeVariable => three_variable_controls(ui, state, &mut actions),
                }

                ui.add_space(12.0);
                formula_card(ui, info);
                ui.add_space(16.0);

                ui.separator();
                ui.add_space(12.0);
                view_controls(ui, state, &mut actions);
                ui.add_space(16.0);

                if state.show_stats {
                    stats_panel(ui, info);
                }
            });
        });

    actions
}

fn mode_button(ui: &mut Ui, state: &mut UiState, mode: AppMode, label: &str, accent: Color32) -> bool {
    let active = state.app_mode == mode;
    let button = egui::Button::new(RichText::new(label).color(if active { BG_PURE_BLACK } else { TEXT_PRIMARY }))
        .fill(if active { accent } else { BG_WIDGET })
        .min_size(egui::vec2(140.0, 32.0));

    if ui.add(button).clicked() && !active {
        state.app_mode = mode;
        return true;
    }
    false
}

fn two_variable_controls(ui: &mut Ui, state: &mut UiState, actions: &mut UiActions) {
    concept(
        ui,
        "A function of two variables assigns a unique real number z to each pair (x, y) in its domain.",
        &[
            "Graph: a surface in 3D space.",
            "Level curves: the curves cut out by horizontal planes z = k.",
        ],
    );
    ui.add_space(12.0);

    section_header(ui, "EXAMPLE FUNCTION");
    let current = state.function_choice.function();
    egui::ComboBox::from_id_salt("surface_functions")
        .selected_text(current.name)
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for function in SURFACE_FUNCTIONS {
                let selected = state.function_choice == function.choice;
                if ui.selectable_label(selected, function.name).clicked() && !selected {
                    state.function_choice = function.choice;
                    actions.replot = true;
                }
            }
        });
    ui.add_space(4.0);
    ui.label(RichText::new(state.function_choice.function().description).color(TEXT_MUTED).size(11.0).italics());
    ui.add_space(12.0);

    section_header(ui, "PARAMETERS");
    egui::Grid::new("surface_params").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
        ui.label("Grid resolution");
        actions.replot |= ui
            .add(egui::Slider::new(&mut state.resolution, RESOLUTION_DOMAIN.0..=RESOLUTION_DOMAIN.1))
            .changed();
        ui.end_row();

        ui.label("Axis range");
        actions.replot |= ui
            .add(egui::Slider::new(&mut state.range_val, RANGE_DOMAIN.0..=RANGE_DOMAIN.1).prefix("±"))
            .changed();
        ui.end_row();
    });
}

fn three_variable_controls(ui: &mut Ui, state: &mut UiState, actions: &mut UiActions) {
    concept(
        ui,
        "A function of three variables assigns a number w to each triple (x, y, z).",
        &[
            "Its graph would need four dimensions, so we draw level surfaces instead.",
            "Level surface: all points where f(x, y, z) = k for a constant k.",
        ],
    );
    ui.add_space(12.0);

    section_header(ui, "LEVEL SURFACE");
    ui.label(RichText::new(LEVEL_FUNCTION.name).color(TEXT_MUTED).size(11.0).italics());
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        ui.label("Level value (k)");
        actions.replot |= ui
            .add(egui::Slider::new(&mut state.iso_val, LEVEL_DOMAIN.0..=LEVEL_DOMAIN.1))
            .changed();
    });
    ui.add_space(6.0);
    ui.label(
        RichText::new(format!(
            "Visualizing the level surface where the function value w is constant: w = {}.",
            state.iso_val
        ))
        .color(TEXT_MUTED)
        .size(11.0),
    );
    ui.add_space(8.0);
    ui.label(
        RichText::new(
            "As k changes you select a different slice of the 4D graph of w = x² + y² + z². \
             For w to increase the sphere must grow larger.",
        )
        .color(TEXT_PRIMARY)
        .size(11.0),
    );
}

fn concept(ui: &mut Ui, summary: &str, bullets: &[&str]) {
    section_header(ui, "CONCEPT");
    ui.label(RichText::new(summary).color(TEXT_PRIMARY).size(12.0));
    for bullet in bullets {
        ui.label(RichText::new(format!("•  {bullet}")).color(TEXT_MUTED).size(11.0));
    }
}

fn formula_card(ui: &mut Ui, info: &PlotInfo) {
    let Some(result) = info.result else {
        return;
    };

    egui::Frame::default()
        .fill(BG_PURE_BLACK)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(&result.formula).color(TEXT_BRIGHT).size(20.0).family(egui::FontFamily::Monospace));
            });
        });
}

fn view_controls(ui: &mut Ui, state: &mut UiState, actions: &mut UiActions) {
    section_header(ui, "VIEW");

    let three_d = match state.app_mode {
        AppMode::TwoVariable => {
            ui.horizontal(|ui| {
                ui.label("Plot:");
                if ui.selectable_label(state.surface_view == SurfaceViewMode::Surface3D, "3D Surface").clicked() {
                    state.surface_view = SurfaceViewMode::Surface3D;
                }
                if ui.selectable_label(state.surface_view == SurfaceViewMode::Contour2D, "Contour Map").clicked() {
                    state.surface_view = SurfaceViewMode::Contour2D;
                }
            });
            state.surface_view == SurfaceViewMode::Surface3D
        }
        AppMode::ThreeVariable => {
            ui.checkbox(&mut state.show_samples, "Show sample points");
            true
        }
    };

    if three_d {
        ui.checkbox(&mut state.show_grid, "Show grid");
        ui.horizontal(|ui| {
            ui.label("Camera:");
            if ui.selectable_label(state.camera_mode == CameraMode::Orbital, "Orbital").clicked() {
                state.camera_mode = CameraMode::Orbital;
            }
            if ui.selectable_label(state.camera_mode == CameraMode::Free, "Free").clicked() {
                state.camera_mode = CameraMode::Free;
            }
            if ui.button("Reset").clicked() {
                actions.reset_camera = true;
            }
        });
    }

    ui.horizontal(|ui| {
        ui.checkbox(&mut state.vsync_enabled, "VSync");
        ui.checkbox(&mut state.show_stats, "Stats");
    });
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn stats_panel(ui: &mut Ui, info: &PlotInfo) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if info.fps >= 60.0 { ACCENT_TEAL } else if info.fps >= 30.0 { ACCENT_AMBER } else { ACCENT_RED };

            egui::Grid::new("stats").num_columns(2).spacing([20.0, 4.0]).show(ui, |ui| {
                ui.label(RichText::new("FPS").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.0}", info.fps)).color(fps_color));
                ui.end_row();

                let Some(result) = info.result else {
                    return;
                };

                ui.label(RichText::new("Samples").color(TEXT_MUTED));
                ui.label(RichText::new(result.sample_count.to_string()).color(TEXT_PRIMARY));
                ui.end_row();

                ui.label(RichText::new("Sample ms").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.2}", result.elapsed_ms)).color(TEXT_PRIMARY));
                ui.end_row();

                match &result.kind {
                    crate::math::PlotKind::Surface(plot) => {
                        ui.label(RichText::new("z range").color(TEXT_MUTED));
                        ui.label(
                            RichText::new(format!("{:.3} .. {:.3}", plot.mesh.z_min, plot.mesh.z_max))
                                .color(ACCENT_TEAL),
                        );
                        ui.end_row();

                        ui.label(RichText::new("Levels").color(TEXT_MUTED));
                        ui.label(RichText::new(plot.curves.len().to_string()).color(TEXT_PRIMARY));
                        ui.end_row();

                        if let (Some(first), Some(last)) = (plot.curves.first(), plot.curves.last()) {
                            ui.label(RichText::new("Level span").color(TEXT_MUTED));
                            ui.label(
                                RichText::new(format!("{:.3} .. {:.3}", first.level, last.level))
                                    .color(TEXT_PRIMARY),
                            );
                            ui.end_row();
                        }
                    }
                    crate::math::PlotKind::LevelSurface(plot) => {
                        ui.label(RichText::new("Radius").color(TEXT_MUTED));
                        ui.label(RichText::new(format!("√k = {:.4}", plot.radius)).color(ACCENT_AMBER));
                        ui.end_row();

                        ui.label(RichText::new("max |w − k|").color(TEXT_MUTED));
                        ui.label(RichText::new(format!("{:.2e}", plot.residual)).color(TEXT_PRIMARY));
                        ui.end_row();
                    }
                }
            });
        });
}

/// Colour-scale legend for the active plot, top-left of the viewport.
pub fn draw_legend(ctx: &Context, title: &str, low: f32, high: f32, colors: [Color32; 5]) {
    egui::Area::new(egui::Id::new("legend"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(title).color(TEXT_MUTED).size(11.0));
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(160.0, 10.0), egui::Sense::hover());
                    let step = rect.width() / colors.len() as f32;
                    for (i, color) in colors.iter().enumerate() {
                        let min = rect.left_top() + egui::vec2(i as f32 * step, 0.0);
                        ui.painter().rect_filled(
                            egui::Rect::from_min_size(min, egui::vec2(step + 0.5, rect.height())),
                            0.0,
                            *color,
                        );
                    }
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(format!("{low:.2}")).color(TEXT_MUTED).size(10.0));
                        ui.add_space(80.0);
                        ui.label(RichText::new(format!("{high:.2}")).color(TEXT_MUTED).size(10.0));
                    });
                });
        });
}

pub fn draw_help_overlay(ctx: &Context, mode: CameraMode, pos: [f32; 3]) {
    let hint = match mode {
        CameraMode::Orbital => "RMB+Drag - Orbit | Scroll - Zoom",
        CameraMode::Free => "WASD - Move | RMB+Drag - Look | Scroll - Speed",
    };
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new(hint).color(TEXT_MUTED));
                    ui.label(RichText::new(format!("Camera: ({:.0}, {:.0}, {:.0})", pos[0], pos[1], pos[2])).color(TEXT_MUTED));
                });
        });
}
