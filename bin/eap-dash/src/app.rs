//! ---
//! ems_section: "12-gui-dashboard"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Dashboard view state, tab navigation and display labels."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eap_common::PanelId;
use eap_sim::DashboardSnapshot;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Alerts above this count flip the active-alerts card to `High`.
const HIGH_ALERT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Tab {
    Dashboard,
    Analytics,
    #[strum(serialize = "SCADA")]
    Scada,
    System,
}

impl Tab {
    const COUNT: usize = 4;

    pub fn index(&self) -> usize {
        Tab::iter().position(|tab| tab == *self).unwrap_or(0)
    }

    fn from_index(index: usize) -> Self {
        Tab::iter().nth(index % Tab::COUNT).unwrap_or(Tab::Dashboard)
    }
}

impl From<PanelId> for Tab {
    fn from(panel: PanelId) -> Self {
        match panel {
            PanelId::Dashboard => Tab::Dashboard,
            PanelId::Analytics => Tab::Analytics,
            PanelId::Scada => Tab::Scada,
            PanelId::System => Tab::System,
        }
    }
}

pub struct App {
    tab: Tab,
    snapshot: Arc<DashboardSnapshot>,
}

impl App {
    pub fn new(tab: Tab, snapshot: Arc<DashboardSnapshot>) -> Self {
        Self { tab, snapshot }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    pub fn update(&mut self, snapshot: Arc<DashboardSnapshot>) {
        self.snapshot = snapshot;
    }

    pub fn select(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn next_tab(&mut self) {
        self.tab = Tab::from_index(self.tab.index() + 1);
    }

    pub fn previous_tab(&mut self) {
        self.tab = Tab::from_index(self.tab.index() + Tab::COUNT - 1);
    }

    /// Apply a key press. Returns `true` when the dashboard should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char(digit @ '1'..='4') => {
                let index = digit as usize - '1' as usize;
                self.select(Tab::from_index(index));
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.next_tab(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.previous_tab(),
            _ => {}
        }
        false
    }

    pub fn load_label(&self) -> String {
        match self.snapshot.latest() {
            Some(sample) => format!("{} MW", sample.load),
            None => "0 MW".to_owned(),
        }
    }

    pub fn generation_label(&self) -> String {
        match self.snapshot.latest() {
            Some(sample) => format!("{} MW", sample.generation),
            None => "0 MW".to_owned(),
        }
    }

    pub fn voltage_label(&self) -> String {
        match self.snapshot.latest() {
            Some(sample) => format!("{:.2} kV", sample.voltage),
            None => "0 kV".to_owned(),
        }
    }

    pub fn frequency_label(&self) -> String {
        match self.snapshot.latest() {
            Some(sample) => format!("{:.2} Hz", sample.frequency),
            None => "0 Hz".to_owned(),
        }
    }

    pub fn power_factor_label(&self) -> String {
        match self.snapshot.latest() {
            Some(sample) => format!("{:.3}", sample.power_factor),
            None => "0".to_owned(),
        }
    }

    pub fn alert_level(&self) -> &'static str {
        if self.snapshot.alerts.len() > HIGH_ALERT_COUNT {
            "High"
        } else {
            "Normal"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eap_sim::{ScriptedSource, TelemetrySimulator};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn tabs_wrap_in_both_directions() {
        let mut app = App::new(Tab::Dashboard, Arc::default());
        app.previous_tab();
        assert_eq!(app.tab(), Tab::System);
        app.next_tab();
        assert_eq!(app.tab(), Tab::Dashboard);
        assert!(!app.handle_key(key(KeyCode::BackTab)));
        assert_eq!(app.tab(), Tab::System);
    }

    #[test]
    fn digits_jump_and_quit_keys_exit() {
        let mut app = App::new(Tab::Dashboard, Arc::default());
        assert!(!app.handle_key(key(KeyCode::Char('3'))));
        assert_eq!(app.tab(), Tab::Scada);
        assert!(!app.handle_key(key(KeyCode::Char('9'))));
        assert_eq!(app.tab(), Tab::Scada);
        assert!(app.handle_key(key(KeyCode::Char('q'))));
        assert!(app.handle_key(key(KeyCode::Esc)));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn labels_fall_back_before_first_sample() {
        let app = App::new(Tab::Dashboard, Arc::default());
        assert_eq!(app.load_label(), "0 MW");
        assert_eq!(app.generation_label(), "0 MW");
        assert_eq!(app.voltage_label(), "0 kV");
        assert_eq!(app.frequency_label(), "0 Hz");
        assert_eq!(app.power_factor_label(), "0");
        assert_eq!(app.alert_level(), "Normal");
    }

    #[test]
    fn labels_follow_latest_sample() {
        // sample draws, alert draw, template draw, then four health draws
        let simulator = TelemetrySimulator::builder()
            .random_source(ScriptedSource::new([
                0.5, 0.5, 0.5, 0.5, 0.5, 0.99, 0.0, 0.0, 0.0, 0.0, 0.0,
            ]))
            .build();
        simulator.tick();
        let app = App::new(Tab::Dashboard, Arc::new(simulator.snapshot()));
        assert_eq!(app.load_label(), "1300 MW");
        assert_eq!(app.generation_label(), "1300 MW");
        assert_eq!(app.voltage_label(), "232.50 kV");
        assert_eq!(app.frequency_label(), "60.00 Hz");
        assert_eq!(app.power_factor_label(), "0.950");
        assert_eq!(app.snapshot().alerts.len(), 1);
    }

    #[test]
    fn many_alerts_raise_the_level() {
        let simulator = TelemetrySimulator::builder()
            .random_source(ScriptedSource::new([0.99]))
            .build();
        for _ in 0..4 {
            simulator.tick();
        }
        let app = App::new(Tab::Dashboard, Arc::new(simulator.snapshot()));
        assert_eq!(app.alert_level(), "High");
        assert_eq!(Tab::from(PanelId::Scada).to_string(), "SCADA");
    }
}
