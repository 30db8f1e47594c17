//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the core runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the Energy Analytics Platform workspace.
//! This crate exposes configuration loading, logging, wall-clock labels and
//! version metadata consumed by the simulator and the dashboard binary.

pub mod config;
pub mod logging;
pub mod time;
pub mod version;

pub use config::{
    AppConfig, DashboardConfig, LoadedAppConfig, LoggingConfig, MetricsConfig, PanelId,
    SimulationConfig,
};
pub use logging::{init_tracing, ConsoleTarget, LogFormat};
pub use version::VersionInfo;
