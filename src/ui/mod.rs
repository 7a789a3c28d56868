//! GUI panels and application window.

pub mod app;
pub mod components;
pub mod department_panel;
pub mod detail_panel;

pub use app::App;
