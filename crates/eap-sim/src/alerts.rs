//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Synthetic alert templates, emission policy, and bounded feed."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

use crate::error::{SimResult, SimulatorError};

/// Default probability cut: an alert is raised when the draw exceeds it.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.95;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Critical,
    Info,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Unique, monotonically increasing alert token derived from creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub u64);

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out [`AlertId`]s that never repeat or go backwards, even when the
/// clock stalls or steps back.
#[derive(Debug, Default, Clone)]
pub struct AlertIdSequence {
    last: Option<u64>,
}

impl AlertIdSequence {
    pub fn next(&mut self, epoch_millis: u64) -> AlertId {
        let value = match self.last {
            Some(last) if epoch_millis <= last => last + 1,
            _ => epoch_millis,
        };
        self.last = Some(value);
        AlertId(value)
    }
}

/// Fixed alert wording, stamped into an [`Alert`] when emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTemplate {
    pub kind: AlertKind,
    pub message: String,
    pub severity: Severity,
}

impl AlertTemplate {
    pub fn new(kind: AlertKind, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind,
            message: message.into(),
            severity,
        }
    }

    /// The three templates the grid simulation draws from.
    pub fn standard_set() -> Vec<AlertTemplate> {
        vec![
            AlertTemplate::new(
                AlertKind::Warning,
                "High load detected in Sector 3",
                Severity::Medium,
            ),
            AlertTemplate::new(
                AlertKind::Critical,
                "Voltage fluctuation detected",
                Severity::High,
            ),
            AlertTemplate::new(
                AlertKind::Info,
                "Scheduled maintenance in 2 hours",
                Severity::Low,
            ),
        ]
    }

    pub fn stamp(self, id: AlertId, timestamp: String) -> Alert {
        Alert {
            id,
            kind: self.kind,
            message: self.message,
            severity: self.severity,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub severity: Severity,
    /// Date and time label, e.g. `6/1/2024, 3:04:05 PM`.
    pub timestamp: String,
}

/// Decides, from uniform draws in `[0, 1)`, whether a tick raises an alert and
/// which one.
pub trait AlertPolicy: Send {
    fn should_emit(&self, draw: f64) -> bool;
    fn select(&self, draw: f64) -> AlertTemplate;
}

/// Emits when the draw is strictly above `threshold`, then picks a template
/// uniformly.
#[derive(Debug, Clone)]
pub struct ThresholdAlertPolicy {
    threshold: f64,
    templates: Vec<AlertTemplate>,
}

impl ThresholdAlertPolicy {
    pub fn new(threshold: f64, templates: Vec<AlertTemplate>) -> SimResult<Self> {
        if templates.is_empty() {
            return Err(SimulatorError::NoAlertTemplates);
        }
        Ok(Self {
            threshold,
            templates,
        })
    }

    /// Standard templates at the given threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            templates: AlertTemplate::standard_set(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn templates(&self) -> &[AlertTemplate] {
        &self.templates
    }
}

impl Default for ThresholdAlertPolicy {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_ALERT_THRESHOLD)
    }
}

impl AlertPolicy for ThresholdAlertPolicy {
    fn should_emit(&self, draw: f64) -> bool {
        draw > self.threshold
    }

    fn select(&self, draw: f64) -> AlertTemplate {
        let last = self.templates.len() - 1;
        let scaled = draw.clamp(0.0, 1.0) * self.templates.len() as f64;
        let index = (scaled.floor() as usize).min(last);
        self.templates[index].clone()
    }
}

/// Newest-first alert list holding at most `capacity` entries.
#[derive(Debug, Clone)]
pub struct AlertFeed {
    alerts: VecDeque<Alert>,
    capacity: usize,
}

impl AlertFeed {
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            alerts: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Prepend `alert`, returning the oldest entry if it fell off the end.
    pub fn push(&mut self, alert: Alert) -> Option<Alert> {
        self.alerts.push_front(alert);
        if self.alerts.len() > self.capacity {
            self.alerts.pop_back()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn to_vec(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn alert(id: u64) -> Alert {
        AlertTemplate::standard_set()[0]
            .clone()
            .stamp(AlertId(id), format!("t{id}"))
    }

    #[test]
    fn threshold_is_strict() {
        let policy = ThresholdAlertPolicy::default();
        assert!(!policy.should_emit(0.95));
        assert!(policy.should_emit(0.950_001));
        assert!(!policy.should_emit(0.0));
    }

    #[test]
    fn select_partitions_unit_interval_evenly() {
        let policy = ThresholdAlertPolicy::default();
        assert_eq!(policy.select(0.0).severity, Severity::Medium);
        assert_eq!(policy.select(0.34).kind, AlertKind::Critical);
        assert_eq!(policy.select(0.67).kind, AlertKind::Info);
        assert_eq!(policy.select(0.999_999).kind, AlertKind::Info);
    }

    #[test]
    fn standard_templates_cover_every_kind_once() {
        let kinds: Vec<_> = AlertTemplate::standard_set()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        for kind in AlertKind::iter() {
            assert_eq!(kinds.iter().filter(|k| **k == kind).count(), 1);
        }
    }

    #[test]
    fn empty_template_list_is_rejected() {
        assert!(matches!(
            ThresholdAlertPolicy::new(0.5, Vec::new()),
            Err(SimulatorError::NoAlertTemplates)
        ));
    }

    #[test]
    fn feed_keeps_newest_first_and_drops_oldest() {
        let mut feed = AlertFeed::with_capacity(5);
        for id in 1..=5 {
            assert!(feed.push(alert(id)).is_none());
        }
        let evicted = feed.push(alert(6)).expect("sixth alert evicts the first");
        assert_eq!(evicted.id, AlertId(1));
        let ids: Vec<_> = feed.iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![6, 5, 4, 3, 2]);
    }

    #[test]
    fn id_sequence_is_strictly_increasing() {
        let mut ids = AlertIdSequence::default();
        assert_eq!(ids.next(1_000), AlertId(1_000));
        assert_eq!(ids.next(1_000), AlertId(1_001));
        assert_eq!(ids.next(900), AlertId(1_002));
        assert_eq!(ids.next(5_000), AlertId(5_000));
    }

    #[test]
    fn alert_serializes_kind_as_type() {
        let json = serde_json::to_value(alert(42)).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["severity"], "medium");
        assert_eq!(json["id"], 42);
    }
}
