//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulator-owned state and the read-only snapshot handed to renderers."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::alerts::{Alert, AlertFeed, AlertIdSequence};
use crate::buffer::RollingBuffer;
use crate::sample::{ConnectionStatus, SystemHealthSnapshot, TelemetrySample};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;
pub const DEFAULT_ALERT_CAPACITY: usize = 5;

/// Everything the simulator mutates on a tick.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub(crate) tick: u64,
    pub(crate) history: RollingBuffer<TelemetrySample>,
    pub(crate) alerts: AlertFeed,
    pub(crate) alert_ids: AlertIdSequence,
    pub(crate) health: SystemHealthSnapshot,
    pub(crate) connection: ConnectionStatus,
}

impl SimulationState {
    pub fn new(history_capacity: usize, alert_capacity: usize) -> Self {
        Self {
            tick: 0,
            history: RollingBuffer::with_capacity(history_capacity),
            alerts: AlertFeed::with_capacity(alert_capacity),
            alert_ids: AlertIdSequence::default(),
            health: SystemHealthSnapshot::default(),
            connection: ConnectionStatus::default(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn history(&self) -> &RollingBuffer<TelemetrySample> {
        &self.history
    }

    pub fn alerts(&self) -> &AlertFeed {
        &self.alerts
    }

    pub fn health(&self) -> SystemHealthSnapshot {
        self.health
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            tick: self.tick,
            samples: self.history.to_vec(),
            alerts: self.alerts.to_vec(),
            health: self.health,
            connection: self.connection,
        }
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_ALERT_CAPACITY)
    }
}

/// Immutable copy of simulator state between ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Number of ticks applied so far.
    pub tick: u64,
    /// Oldest first.
    pub samples: Vec<TelemetrySample>,
    /// Newest first.
    pub alerts: Vec<Alert>,
    pub health: SystemHealthSnapshot,
    pub connection: ConnectionStatus,
}

impl DashboardSnapshot {
    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.last()
    }

    /// The alert raised on the most recent tick, if any.
    pub fn newest_alert(&self) -> Option<&Alert> {
        self.alerts.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_empty_with_initial_health() {
        let state = SimulationState::default();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.tick, 0);
        assert!(snapshot.samples.is_empty());
        assert!(snapshot.alerts.is_empty());
        assert!(snapshot.latest().is_none());
        assert_eq!(snapshot.health, SystemHealthSnapshot::default());
        assert_eq!(snapshot.connection, ConnectionStatus::Connected);
        assert_eq!(state.history().capacity(), 20);
        assert_eq!(state.alerts().capacity(), 5);
    }
}
