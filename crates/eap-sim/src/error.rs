//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulator error taxonomy."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use thiserror::Error;

/// Failures surfaced by the simulator lifecycle. Ticks themselves never fail.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("no tokio runtime with a timer is available to schedule ticks")]
    UnsupportedEnvironment,
    #[error("tick interval must be greater than zero")]
    InvalidInterval,
    #[error("alert policy requires at least one template")]
    NoAlertTemplates,
}

pub type SimResult<T> = Result<T, SimulatorError>;
