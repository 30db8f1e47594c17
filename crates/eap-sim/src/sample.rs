//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Telemetry, health, and link status value types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// One synthetic grid reading produced per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    /// Wall-clock label, e.g. `3:04:05 PM`.
    pub timestamp: String,
    /// System load in MW.
    pub load: u32,
    /// Generation in MW.
    pub generation: u32,
    /// Bus voltage in kV, two decimal places.
    pub voltage: f64,
    /// Grid frequency in Hz, two decimal places.
    pub frequency: f64,
    /// Power factor, three decimal places.
    pub power_factor: f64,
}

/// Synthetic host utilisation percentages, replaced wholesale every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemHealthSnapshot {
    pub cpu: u8,
    pub memory: u8,
    pub disk: u8,
    pub network: u8,
}

impl SystemHealthSnapshot {
    /// Component readings in display order, labelled for metrics and widgets.
    pub fn components(&self) -> [(&'static str, u8); 4] {
        [
            ("cpu", self.cpu),
            ("memory", self.memory),
            ("disk", self.disk),
            ("network", self.network),
        ]
    }
}

impl Default for SystemHealthSnapshot {
    /// Readings shown before the first tick lands.
    fn default() -> Self {
        Self {
            cpu: 45,
            memory: 62,
            disk: 38,
            network: 85,
        }
    }
}

/// State of the single simulated SCADA link.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_serializes_with_camel_case_fields() {
        let sample = TelemetrySample {
            timestamp: "3:04:05 PM".into(),
            load: 1200,
            generation: 1300,
            voltage: 232.5,
            frequency: 60.01,
            power_factor: 0.951,
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["powerFactor"], 0.951);
        assert_eq!(json["load"], 1200);
    }

    #[test]
    fn connection_status_renders_lowercase() {
        assert_eq!(ConnectionStatus::default().to_string(), "connected");
        assert_eq!(ConnectionStatus::Disconnected.as_ref(), "disconnected");
        assert!(!ConnectionStatus::Disconnected.is_connected());
    }

    #[test]
    fn health_components_follow_display_order() {
        let labels: Vec<_> = SystemHealthSnapshot::default()
            .components()
            .iter()
            .map(|(label, _)| *label)
            .collect();
        assert_eq!(labels, ["cpu", "memory", "disk", "network"]);
    }
}
