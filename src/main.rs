//! Department Console - desktop client for department and employee management.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use department_console as app;
use eframe::egui;
use tracing_subscriber::prelude::*;

use app::client::ApiClient;
use app::config::{AppConfig, ConfigLoadResult, log_dir};
use app::error::AppError;
use app::ui::App;

/// Desktop console for departments and their rosters.
#[derive(Parser)]
#[command(name = "department-console", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Explicit config file path
    #[arg(long, value_name = "PATH", conflicts_with = "dev")]
    config: Option<PathBuf>,

    /// Override the API base URL (takes precedence over DEPARTMENT_API_BASE_URL)
    #[arg(long, value_name = "URL")]
    api_base_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging: stderr plus a daily rolling file
    let log_dir = log_dir();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "department-console.log");
    let (file_writer, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    tracing::info!("Department Console starting...");
    tracing::info!("Log directory: {:?}", log_dir);

    // Determine config path based on mode
    let config_path = match (cli.config, cli.dev) {
        (Some(path), _) => path,
        (None, true) => {
            tracing::info!("Dev mode: loading config from current directory");
            PathBuf::from("config.toml")
        }
        (None, false) => AppConfig::default_path(),
    };
    tracing::info!("Config path: {:?}", config_path);

    let (mut config, startup_error) = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded successfully");
            (config, None)
        }
        ConfigLoadResult::Missing => {
            tracing::info!("Config missing, using defaults");
            (AppConfig::default(), None)
        }
        ConfigLoadResult::Invalid(e) => {
            tracing::warn!("Config invalid: {}", e);
            (AppConfig::default(), Some(AppError::config(e.to_string())))
        }
    };

    config.apply_env_overrides();
    config.apply_base_url_override(cli.api_base_url.as_deref());
    config
        .validate()
        .with_context(|| format!("Invalid API base URL: {}", config.api.base_url))?;

    let client = ApiClient::new(&config.api)?;
    tracing::info!("API base URL: {}", client.base_url());

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Department Console")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Department Console",
        options,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);

            Ok(Box::new(App::new(rt, Arc::new(client), config, config_path, startup_error)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run window: {e}"))?;

    tracing::info!("Department Console exiting");
    Ok(())
}
