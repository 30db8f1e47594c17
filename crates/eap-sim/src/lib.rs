//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "01-bootstrap"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulation runtime module exports and shared types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Synthetic grid telemetry for the Energy Analytics Platform.
//!
//! A [`TelemetrySimulator`] owns a recurring tokio task. Every tick it draws a
//! [`TelemetrySample`] into a bounded [`RollingBuffer`], may raise an [`Alert`]
//! into the newest-first [`AlertFeed`], regenerates the
//! [`SystemHealthSnapshot`] and publishes a [`DashboardSnapshot`] to observers.

pub mod alerts;
pub mod buffer;
pub mod error;
pub mod generator;
pub mod sample;
pub mod schedule;
pub mod simulator;
pub mod source;
pub mod state;

pub use alerts::{
    Alert, AlertFeed, AlertId, AlertKind, AlertPolicy, AlertTemplate, Severity,
    ThresholdAlertPolicy, DEFAULT_ALERT_THRESHOLD,
};
pub use buffer::RollingBuffer;
pub use error::{SimResult, SimulatorError};
pub use generator::{DecimalRange, IntRange, TelemetryProfile};
pub use sample::{ConnectionStatus, SystemHealthSnapshot, TelemetrySample};
pub use simulator::{
    ObserverId, SimulatorBuilder, SnapshotObserver, TelemetrySimulator, TickReport,
    DEFAULT_TICK_INTERVAL,
};
pub use source::{Clock, FixedClock, RandomSource, ScriptedSource, SeededSource, SystemClock};
pub use state::{DashboardSnapshot, SimulationState};
