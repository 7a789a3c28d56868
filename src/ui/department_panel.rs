//! Department list and create/edit form shown in the side panel.

use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{ARROWS_CLOCKWISE, BUILDINGS, PENCIL, PLUS};

use super::components::{badge, caption, colors, primary_button_with_icon, styled_button_with_icon, text_field};
use crate::config::BASE_URL_ENV;
use crate::console::Console;

/// Show the side panel contents.
pub fn show(console: &mut Console, ui: &mut Ui) {
    ui.add_space(8.0);
    ui.heading(RichText::new("Department Management").size(22.0).strong());
    ui.label(
        RichText::new(format!(
            "View staffing, budgets, and leadership for each department. Set {BASE_URL_ENV} if the backend runs on another host."
        ))
        .small()
        .color(colors::NEUTRAL),
    );
    ui.add_space(12.0);

    ScrollArea::vertical().id_salt("side_scroll").show(ui, |ui| {
        ui.group(|ui| {
            show_list(console, ui);
        });
        ui.add_space(12.0);
        ui.group(|ui| {
            show_form(console, ui);
        });
    });
}

fn show_list(console: &mut Console, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("{BUILDINGS} Departments")).strong().size(16.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if styled_button_with_icon(ui, ARROWS_CLOCKWISE, "Refresh").clicked() {
                console.load_departments();
            }
        });
    });
    ui.add_space(8.0);

    let state = console.state();
    if state.is_loading_departments() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new("Loading departments…").color(colors::NEUTRAL));
        });
    } else if state.departments().is_empty() {
        ui.label(RichText::new("No departments yet. Create the first one.").color(colors::NEUTRAL));
    }

    let selected_id = state.selected_id();
    let mut clicked = None;
    for dept in state.departments() {
        let is_selected = selected_id == Some(dept.id);
        let response = ui
            .scope(|ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    let name = RichText::new(&dept.name).strong();
                    let name = if is_selected { name.color(colors::ACCENT) } else { name };
                    ui.label(name);
                    badge(ui, &dept.code);
                });
                ui.label(
                    RichText::new(dept.location.as_deref().unwrap_or("N/A").to_uppercase())
                        .small()
                        .color(colors::NEUTRAL),
                );
                let plural = if dept.employee_count == 1 { "" } else { "s" };
                ui.label(
                    RichText::new(format!("{} employee{plural}", dept.employee_count))
                        .small()
                        .color(colors::NEUTRAL),
                );
            })
            .response;

        let response = ui.interact(response.rect, ui.id().with(("dept", dept.id)), egui::Sense::click());
        if is_selected {
            ui.painter()
                .rect_stroke(response.rect.expand(3.0), 6.0, (1.0, colors::ACCENT), egui::StrokeKind::Outside);
        } else if response.hovered() {
            ui.painter().rect_stroke(
                response.rect.expand(3.0),
                6.0,
                (1.0, ui.visuals().weak_text_color()),
                egui::StrokeKind::Outside,
            );
        }
        if response.clicked() {
            clicked = Some(dept.id);
        }
        ui.add_space(10.0);
    }

    if let Some(id) = clicked {
        console.select_department(id);
    }
}

fn show_form(console: &mut Console, ui: &mut Ui) {
    let editing = console.state().department_form.is_editing();
    let submitting = console.state().is_submitting_department();

    let title = if editing { "Edit Department" } else { "Create Department" };
    ui.label(RichText::new(title).strong().size(16.0));
    ui.add_space(8.0);

    let form = &mut console.state_mut().department_form;
    text_field(ui, "Name *", &mut form.name, "Product Engineering");
    text_field(ui, "Code *", &mut form.code, "ENG");
    text_field(ui, "Location", &mut form.location, "New York");
    text_field(ui, "Head of Department", &mut form.head, "Ada Lovelace");
    text_field(ui, "Annual Budget", &mut form.annual_budget, "2500000");

    caption(ui, "Description");
    ui.add(
        egui::TextEdit::multiline(&mut form.description)
            .desired_rows(3)
            .desired_width(f32::INFINITY)
            .hint_text("Responsible for delivering product features and platform capabilities."),
    );
    ui.add_space(10.0);

    let (icon, label) = match (editing, submitting) {
        (false, false) => (PLUS, "Create Department"),
        (false, true) => ("", "Creating…"),
        (true, false) => (PENCIL, "Save Changes"),
        (true, true) => ("", "Saving…"),
    };

    ui.horizontal(|ui| {
        if primary_button_with_icon(ui, icon, label, !submitting).clicked() {
            console.submit_department_form();
        }
        if editing && ui.button("Cancel").clicked() {
            console.state_mut().department_form.reset();
        }
    });
}
