//! Shared UI components.

use eframe::egui::{self, Button, Color32, CornerRadius, Frame, Margin, Response, RichText, Stroke, Ui};

/// Status indicator colors.
pub mod colors {
    use super::Color32;

    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    pub const ERROR: Color32 = Color32::from_rgb(255, 100, 100);
    pub const WARNING: Color32 = Color32::from_rgb(255, 200, 100);
    pub const NEUTRAL: Color32 = Color32::from_rgb(150, 150, 150);
    pub const ACCENT: Color32 = Color32::from_rgb(99, 102, 241);
    pub const ERROR_BG: Color32 = Color32::from_rgb(76, 5, 25);
}

/// Small uppercase caption above a form field or value.
pub fn caption(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text.to_uppercase()).small().color(colors::NEUTRAL));
}

/// Render a rounded badge, e.g. a department code.
pub fn badge(ui: &mut Ui, text: &str) {
    Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .stroke(Stroke::new(1.0, colors::ACCENT))
        .corner_radius(CornerRadius::same(8))
        .inner_margin(Margin::symmetric(6, 1))
        .show(ui, |ui| {
            ui.label(RichText::new(text).small().strong());
        });
}

/// Button with a leading icon.
pub fn styled_button_with_icon(ui: &mut Ui, icon: &str, text: &str) -> Response {
    ui.button(format!("{icon} {text}"))
}

/// Accent-filled submit button, disabled while `enabled` is false.
pub fn primary_button_with_icon(ui: &mut Ui, icon: &str, text: &str, enabled: bool) -> Response {
    let label = if icon.is_empty() {
        RichText::new(text).strong()
    } else {
        RichText::new(format!("{icon} {text}")).strong()
    };
    ui.add_enabled(enabled, Button::new(label.color(Color32::WHITE)).fill(colors::ACCENT))
}

/// Compact destructive action (e.g. remove from roster).
pub fn danger_action_button(ui: &mut Ui, icon: &str, text: &str, enabled: bool) -> Response {
    ui.add_enabled(
        enabled,
        Button::new(RichText::new(format!("{icon} {text}")).color(colors::ERROR)).small(),
    )
}

/// Label + single-line text input laid out vertically.
pub fn text_field(ui: &mut Ui, label: &str, value: &mut String, hint: &str) -> Response {
    caption(ui, label);
    let response = ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    );
    ui.add_space(6.0);
    response
}
