//! Main application window.

use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui::{self, Align, Layout, RichText};
use egui_phosphor::regular::{BROOM, PLUGS_CONNECTED, WARNING};
use tokio::sync::mpsc;

use crate::client::{ApiClient, DepartmentApi};
use crate::config::{ApiConfig, AppConfig, BASE_URL_ENV, validate_base_url};
use crate::console::{Console, LogLevel};
use crate::error::AppError;

use super::components::{colors, styled_button_with_icon};
use super::detail_panel::{self, RemoveRequest};
use super::department_panel;

/// Timeout for the settings dialog's connection test.
const CONNECTION_TEST_TIMEOUT_SECS: u64 = 5;

/// API connection dialog state.
#[derive(Default)]
struct SettingsDialog {
    open: bool,
    url_input: String,
    test_rx: Option<mpsc::UnboundedReceiver<Result<usize, String>>>,
    test_status: Option<Result<usize, String>>,
}

/// Main application state.
pub struct App {
    rt: tokio::runtime::Runtime,
    console: Console,
    config: AppConfig,
    config_path: PathBuf,
    settings: SettingsDialog,
    show_activity: bool,
    pending_removal: Option<RemoveRequest>,
}

impl App {
    /// Build the window state and kick off the initial department load.
    pub fn new(
        rt: tokio::runtime::Runtime,
        api: Arc<dyn DepartmentApi>,
        config: AppConfig,
        config_path: PathBuf,
        startup_error: Option<AppError>,
    ) -> Self {
        let console =
            Console::new(api, rt.handle().clone()).with_resync_after_write(config.ui.resync_after_write);

        let mut app = Self {
            rt,
            console,
            config,
            config_path,
            settings: SettingsDialog::default(),
            show_activity: false,
            pending_removal: None,
        };

        app.console.load_departments();
        if let Some(error) = startup_error {
            app.console.state_mut().set_notice(error);
        }

        app
    }

    fn open_settings(&mut self) {
        self.settings = SettingsDialog {
            open: true,
            url_input: self.config.api.base_url.clone(),
            ..Default::default()
        };
    }

    /// Start a connection test against the URL typed in the dialog.
    fn test_connection(&mut self) {
        let url = self.settings.url_input.trim().to_string();
        if let Err(e) = validate_base_url(&url) {
            self.settings.test_status = Some(Err(e.to_string()));
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.settings.test_rx = Some(rx);
        self.settings.test_status = None;

        let api_config = ApiConfig {
            base_url: url,
            timeout_secs: Some(CONNECTION_TEST_TIMEOUT_SECS),
        };
        self.rt.spawn(async move {
            let result = match ApiClient::new(&api_config) {
                Ok(client) => client.list_departments().await.map(|list| list.len()),
                Err(e) => Err(e),
            };
            let _ = tx.send(result.map_err(|e| e.to_string()));
        });
    }

    /// Save the dialog's URL, reconnect and reload.
    fn save_settings(&mut self) -> bool {
        let url = self.settings.url_input.trim().to_string();
        if let Err(e) = validate_base_url(&url) {
            self.settings.test_status = Some(Err(e.to_string()));
            return false;
        }

        self.config.api.base_url = url;
        if let Err(e) = self.config.save(&self.config_path) {
            tracing::error!("Failed to save config: {}", e);
            self.console
                .state_mut()
                .set_notice(AppError::config(format!("Failed to save config: {e}")));
        } else {
            tracing::info!("Saved config to {:?}", self.config_path);
        }

        match ApiClient::new(&self.config.api) {
            Ok(client) => {
                tracing::info!("API base URL set to {}", client.base_url());
                self.console
                    .state_mut()
                    .log(LogLevel::Info, format!("Connected to {}", client.base_url()));
                self.console.set_api(Arc::new(client));
                self.console.load_departments();
            }
            Err(e) => self.console.state_mut().set_error(e),
        }
        true
    }

    /// Apply a Remove click, asking first when configured to.
    fn request_removal(&mut self, request: RemoveRequest) {
        if self.config.ui.confirm_removals {
            self.pending_removal = Some(request);
        } else {
            self.console.remove_employee(request.department_id, request.employee_id);
        }
    }

    /// Poll async operation results.
    fn poll_async_results(&mut self) {
        self.console.poll();

        if let Some(mut rx) = self.settings.test_rx.take() {
            match rx.try_recv() {
                Ok(result) => {
                    self.settings.test_status = Some(result);
                }
                Err(mpsc::error::TryRecvError::Empty) => {
                    self.settings.test_rx = Some(rx);
                }
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    // Channel closed, keep None
                }
            }
        }
    }

    /// Render menu bar.
    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("Settings", |ui| {
                    if ui.button("API Connection").clicked() {
                        self.open_settings();
                        ui.close();
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Activity Log").clicked() {
                        self.show_activity = true;
                        ui.close();
                    }
                });
            });
        });
    }

    /// Render status bar (display only, no interaction).
    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(24.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("API: {}", self.config.api.base_url)).color(colors::NEUTRAL));

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let in_flight = self.console.in_flight();
                        if in_flight > 0 {
                            let plural = if in_flight == 1 { "" } else { "s" };
                            ui.label(format!("{in_flight} request{plural} in flight"));
                            ui.spinner();
                        }
                    });
                });
            });
    }

    /// Render the startup notice and the last operation error, if any.
    fn show_error_banners(&mut self, ui: &mut egui::Ui) {
        if let Some(notice) = self.console.state().notice()
            && error_banner(ui, notice, &self.config.api.base_url)
        {
            self.console.state_mut().dismiss_notice();
        }
        if let Some(error) = self.console.state().error()
            && error_banner(ui, error, &self.config.api.base_url)
        {
            self.console.state_mut().dismiss_error();
        }
    }

    /// Render API connection dialog.
    fn show_settings_dialog(&mut self, ctx: &egui::Context) {
        if !self.settings.open {
            return;
        }

        let mut open = true;
        egui::Window::new("API Connection")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.add_space(10.0);

                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([20.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Base URL:");
                        if ui
                            .add(egui::TextEdit::singleline(&mut self.settings.url_input).desired_width(280.0))
                            .changed()
                        {
                            self.settings.test_status = None;
                        }
                        ui.end_row();
                    });

                ui.add_space(15.0);

                ui.horizontal(|ui| {
                    let testing = self.settings.test_rx.is_some();
                    if ui
                        .add_enabled(!testing, egui::Button::new(format!("{PLUGS_CONNECTED} Test Connection")))
                        .clicked()
                    {
                        self.test_connection();
                    }

                    ui.add_space(10.0);

                    if self.settings.test_rx.is_some() {
                        ui.spinner();
                        ui.label("Testing...");
                    } else if let Some(result) = &self.settings.test_status {
                        match result {
                            Ok(count) => {
                                ui.colored_label(colors::SUCCESS, format!("Connected ({count} departments)"));
                            }
                            Err(e) => {
                                ui.colored_label(colors::ERROR, format!("Failed: {}", e));
                            }
                        }
                    }
                });

                ui.add_space(15.0);
                ui.separator();
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        self.settings.open = false;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.button("Save").clicked() && self.save_settings() {
                            self.settings.open = false;
                        }
                    });
                });
            });

        if !open {
            self.settings.open = false;
        }
    }

    /// Render the activity log window.
    fn show_activity_log(&mut self, ctx: &egui::Context) {
        if !self.show_activity {
            return;
        }

        let mut open = true;
        let mut clear = false;
        egui::Window::new("Activity Log")
            .default_width(480.0)
            .default_height(320.0)
            .open(&mut open)
            .show(ctx, |ui| {
                if styled_button_with_icon(ui, BROOM, "Clear").clicked() {
                    clear = true;
                }
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_salt("activity_scroll")
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for entry in self.console.state().activity() {
                            let color = match entry.level {
                                LogLevel::Info => ui.visuals().text_color(),
                                LogLevel::Success => colors::SUCCESS,
                                LogLevel::Error => colors::ERROR,
                            };
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new(entry.timestamp.format("%H:%M:%S").to_string())
                                        .monospace()
                                        .color(colors::NEUTRAL),
                                );
                                ui.label(RichText::new(&entry.message).color(color));
                            });
                        }
                    });
            });

        if clear {
            self.console.state_mut().clear_log();
        }
        if !open {
            self.show_activity = false;
        }
    }

    /// Render the removal confirmation dialog.
    fn show_remove_confirm(&mut self, ctx: &egui::Context) {
        let Some(target) = self.pending_removal.clone() else {
            return;
        };

        egui::Window::new("Remove Employee")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Remove '{}' from this department?", target.name));
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        self.pending_removal = None;
                    }
                    if ui.button(RichText::new("Remove").color(colors::ERROR)).clicked() {
                        self.console.remove_employee(target.department_id, target.employee_id);
                        self.pending_removal = None;
                    }
                });
            });
    }
}

/// Draw one error banner. Returns `true` when Dismiss was clicked.
fn error_banner(ui: &mut egui::Ui, error: &AppError, base_url: &str) -> bool {
    let mut dismiss = false;
    egui::Frame::new()
        .fill(colors::ERROR_BG)
        .stroke(egui::Stroke::new(1.0, colors::ERROR))
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{WARNING} {error}")).color(colors::ERROR));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.small_button("Dismiss").clicked() {
                        dismiss = true;
                    }
                });
            });

            if let Some(fields) = error.field_errors() {
                for (field, reason) in fields {
                    ui.label(RichText::new(format!("• {field}: {reason}")).small().color(colors::ERROR));
                }
            }

            if error.is_unreachable() {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!(
                        "Ensure the department API is running at {base_url} or set {BASE_URL_ENV} (Settings → API Connection)."
                    ))
                    .small()
                    .color(colors::WARNING),
                );
            }
        });
    ui.add_space(12.0);
    dismiss
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async results
        self.poll_async_results();

        // Request repaint during async operations
        if self.console.is_busy() || self.settings.test_rx.is_some() {
            ctx.request_repaint();
        }

        self.show_menu_bar(ctx);
        self.show_status_bar(ctx);

        egui::SidePanel::left("departments_panel")
            .resizable(true)
            .default_width(320.0)
            .min_width(260.0)
            .show(ctx, |ui| {
                department_panel::show(&mut self.console, ui);
            });

        let mut removal = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_error_banners(ui);
            removal = detail_panel::show(&mut self.console, ui);
        });
        if let Some(request) = removal {
            self.request_removal(request);
        }

        self.show_settings_dialog(ctx);
        self.show_activity_log(ctx);
        self.show_remove_confirm(ctx);
    }
}
