//! Selected department detail, roster table and add-employee form.

use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_phosphor::regular::{PENCIL, TRASH, USERS};

use super::components::{badge, caption, colors, danger_action_button, primary_button_with_icon, text_field};
use crate::console::Console;
use crate::models::{DepartmentDetail, EmploymentStatus};

/// Employee the user asked to remove.
#[derive(Debug, Clone)]
pub struct RemoveRequest {
    pub department_id: i64,
    pub employee_id: i64,
    pub name: String,
}

/// Show the central panel body.
///
/// Returns the employee whose Remove button was clicked, if any.
pub fn show(console: &mut Console, ui: &mut Ui) -> Option<RemoveRequest> {
    let Some(detail) = console.state().selected().cloned() else {
        show_placeholder(ui);
        return None;
    };

    let mut remove = None;
    ScrollArea::vertical().id_salt("detail_scroll").show(ui, |ui| {
        show_header(console, ui, &detail);
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        ui.columns(2, |columns| {
            remove = show_roster(console, &mut columns[0], &detail);
            columns[1].group(|ui| show_employee_form(console, ui));
        });
    });
    remove
}

fn show_placeholder(ui: &mut Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.heading(RichText::new("No Department Selected").size(24.0));
        ui.add_space(10.0);
        ui.label(
            RichText::new(
                "Select an existing department or create a new one to begin tracking headcount, hiring velocity, and budget utilization.",
            )
            .color(colors::NEUTRAL),
        );
    });
}

fn show_header(console: &mut Console, ui: &mut Ui, detail: &DepartmentDetail) {
    ui.horizontal(|ui| {
        ui.heading(RichText::new(&detail.name).size(24.0).strong());
        badge(ui, &detail.code);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(format!("{PENCIL} Edit")).clicked() {
                console.edit_selected_department();
            }
        });
    });
    ui.label(
        RichText::new(detail.description.as_deref().unwrap_or("No description")).color(colors::NEUTRAL),
    );
    ui.add_space(10.0);

    egui::Grid::new("department_facts")
        .num_columns(4)
        .spacing([40.0, 4.0])
        .show(ui, |ui| {
            caption(ui, "Head");
            caption(ui, "Location");
            caption(ui, "Budget");
            caption(ui, "Employees");
            ui.end_row();

            ui.label(detail.head.as_deref().unwrap_or("Unassigned"));
            ui.label(detail.location.as_deref().unwrap_or("Unknown"));
            ui.label(detail.budget_display().unwrap_or_else(|| "Not set".to_string()));
            ui.label(detail.employees.len().to_string());
            ui.end_row();
        });
}

fn show_roster(console: &Console, ui: &mut Ui, detail: &DepartmentDetail) -> Option<RemoveRequest> {
    let employees = &detail.employees;
    ui.label(RichText::new(format!("{USERS} People")).strong().size(16.0));
    ui.add_space(8.0);

    if employees.is_empty() {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(
                    RichText::new("No employees assigned yet. Add the first team member using the form.")
                        .color(colors::NEUTRAL),
                );
                ui.add_space(20.0);
            });
        });
        return None;
    }

    let removing = console.state().is_removing_employee();
    let mut remove = None;

    TableBuilder::new(ui)
        .id_salt("roster_table")
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::remainder().at_least(160.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(110.0))
        .column(Column::auto())
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("Name");
            });
            header.col(|ui| {
                ui.strong("Status");
            });
            header.col(|ui| {
                ui.strong("Dates");
            });
            header.col(|_| {});
        })
        .body(|mut body| {
            for employee in employees {
                body.row(56.0, |mut row| {
                    row.col(|ui| {
                        ui.vertical(|ui| {
                            ui.label(RichText::new(employee.full_name()).strong());
                            ui.label(
                                RichText::new(
                                    employee.job_title.as_deref().unwrap_or("Team Member").to_uppercase(),
                                )
                                .small()
                                .color(colors::NEUTRAL),
                            );
                            ui.label(RichText::new(&employee.email).small().color(colors::NEUTRAL));
                        });
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(employee.status.label()).color(status_color(employee.status)));
                    });
                    row.col(|ui| {
                        ui.vertical(|ui| {
                            if let Some(start) = employee.start_date {
                                ui.label(RichText::new(format!("Start: {start}")).small());
                            }
                            if let Some(end) = employee.end_date {
                                ui.label(RichText::new(format!("End: {end}")).small());
                            }
                        });
                    });
                    row.col(|ui| {
                        if danger_action_button(ui, TRASH, "Remove", !removing).clicked() {
                            remove = Some(RemoveRequest {
                                department_id: detail.id,
                                employee_id: employee.id,
                                name: employee.full_name(),
                            });
                        }
                    });
                });
            }
        });

    remove
}

fn status_color(status: EmploymentStatus) -> egui::Color32 {
    match status {
        EmploymentStatus::Active => colors::SUCCESS,
        EmploymentStatus::OnLeave => colors::WARNING,
        EmploymentStatus::Inactive => colors::NEUTRAL,
    }
}

fn show_employee_form(console: &mut Console, ui: &mut Ui) {
    let submitting = console.state().is_submitting_employee();

    ui.label(RichText::new("Add Employee").strong().size(16.0));
    ui.add_space(8.0);

    let form = &mut console.state_mut().employee_form;
    text_field(ui, "First Name *", &mut form.first_name, "");
    text_field(ui, "Last Name *", &mut form.last_name, "");
    text_field(ui, "Email *", &mut form.email, "name@example.com");
    text_field(ui, "Job Title", &mut form.job_title, "");

    caption(ui, "Status");
    egui::ComboBox::from_id_salt("employee_status")
        .selected_text(form.status.label())
        .show_ui(ui, |ui| {
            for status in EmploymentStatus::ALL {
                ui.selectable_value(&mut form.status, status, status.label());
            }
        });
    ui.add_space(6.0);

    ui.columns(2, |columns| {
        text_field(&mut columns[0], "Start Date", &mut form.start_date, "YYYY-MM-DD");
        text_field(&mut columns[1], "End Date", &mut form.end_date, "YYYY-MM-DD");
    });
    ui.add_space(6.0);

    let label = if submitting { "Adding…" } else { "Add Employee" };
    if primary_button_with_icon(ui, "", label, !submitting).clicked() {
        console.add_employee();
    }
}
