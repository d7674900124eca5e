use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

pub const BG_PURE_BLACK: Color32 = Color32::from_rgb(0, 0, 0);
pub const BG_PANEL: Color32 = Color32::from_rgb(8, 9, 12);
pub const BG_WIDGET: Color32 = Color32::from_rgb(18, 20, 26);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(28, 32, 42);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(38, 44, 58);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(172, 174, 180);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(110, 112, 120);
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(225, 227, 232);

pub const ACCENT_TEAL: Color32 = Color32::from_rgb(33, 145, 140);
pub const ACCENT_AMBER: Color32 = Color32::from_rgb(240, 162, 46);
pub const ACCENT_RED: Color32 = Color32::from_rgb(180, 42, 42);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgba_premultiplied(40, 70, 80, 77);
pub const BORDER_ACCENT: Color32 = ACCENT_TEAL;

/// Five stops of the colour scales used by the shaders, low to high.
pub const VIRIDIS_STOPS: [Color32; 5] = [
    Color32::from_rgb(68, 1, 84),
    Color32::from_rgb(59, 82, 139),
    Color32::from_rgb(33, 145, 140),
    Color32::from_rgb(94, 201, 98),
    Color32::from_rgb(253, 231, 37),
];

pub const PLASMA_STOPS: [Color32; 5] = [
    Color32::from_rgb(13, 8, 135),
    Color32::from_rgb(126, 3, 168),
    Color32::from_rgb(204, 71, 120),
    Color32::from_rgb(248, 149, 64),
    Color32::from_rgb(240, 249, 33),
];

fn widget_rounding() -> Rounding {
    Rounding::same(4.0)
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.window_rounding = Rounding::same(6.0);
    visuals.faint_bg_color = BG_PANEL;
    visuals.extreme_bg_color = BG_PURE_BLACK;
    visuals.code_bg_color = BG_PURE_BLACK;
    visuals.hyperlink_color = ACCENT_TEAL;
    visuals.warn_fg_color = ACCENT_AMBER;
    visuals.error_fg_color = ACCENT_RED;
    visuals.selection.bg_fill = ACCENT_TEAL.gamma_multiply(0.4);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT_TEAL);
    visuals.slider_trailing_fill = true;
    visuals.handle_shape = egui::style::HandleShape::Circle;

    let widgets = &mut visuals.widgets;
    for (w, fill, stroke, text) in [
        (&mut widgets.noninteractive, BG_WIDGET, Stroke::new(1.0, BORDER_SUBTLE), TEXT_MUTED),
        (&mut widgets.inactive, BG_WIDGET, Stroke::new(1.0, BORDER_SUBTLE), TEXT_PRIMARY),
        (&mut widgets.hovered, BG_WIDGET_HOVER, Stroke::new(1.0, BORDER_ACCENT), TEXT_BRIGHT),
        (&mut widgets.active, BG_WIDGET_ACTIVE, Stroke::new(2.0, ACCENT_TEAL), TEXT_BRIGHT),
        (&mut widgets.open, BG_WIDGET_ACTIVE, Stroke::new(1.0, BORDER_ACCENT), TEXT_BRIGHT),
    ] {
        w.bg_fill = fill;
        w.weak_bg_fill = fill;
        w.bg_stroke = stroke;
        w.fg_stroke = Stroke::new(1.0, text);
        w.rounding = widget_rounding();
    }
    widgets.noninteractive.weak_bg_fill = BG_PANEL;

    let mut style = (*ctx.style()).clone();
    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.slider_width = 180.0;

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(13.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
