//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Maps uniform draws onto telemetry and health readings."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::{DateTime, TimeZone};
use eap_common::time::time_label;

use crate::sample::{SystemHealthSnapshot, TelemetrySample};
use crate::source::RandomSource;

/// Integer range `[base, base + span)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub base: u32,
    pub span: u32,
}

impl IntRange {
    pub const fn new(base: u32, span: u32) -> Self {
        Self { base, span }
    }

    pub fn min(&self) -> u32 {
        self.base
    }

    pub fn max(&self) -> u32 {
        self.base + self.span.saturating_sub(1)
    }

    pub fn draw(&self, random: &mut dyn RandomSource) -> u32 {
        let offset = (random.next_unit() * f64::from(self.span)).floor() as u32;
        self.base + offset.min(self.span.saturating_sub(1))
    }
}

/// Decimal range `[base, base + width]`, rounded to `places`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimalRange {
    pub base: f64,
    pub width: f64,
    pub places: i32,
}

impl DecimalRange {
    pub const fn new(base: f64, width: f64, places: i32) -> Self {
        Self {
            base,
            width,
            places,
        }
    }

    pub fn min(&self) -> f64 {
        self.base
    }

    pub fn max(&self) -> f64 {
        round_to(self.base + self.width, self.places)
    }

    pub fn draw(&self, random: &mut dyn RandomSource) -> f64 {
        round_to(random.next_unit() * self.width + self.base, self.places)
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Ranges for every synthetic field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryProfile {
    pub load_mw: IntRange,
    pub generation_mw: IntRange,
    pub voltage_kv: DecimalRange,
    pub frequency_hz: DecimalRange,
    pub power_factor: DecimalRange,
    pub cpu: IntRange,
    pub memory: IntRange,
    pub disk: IntRange,
    pub network: IntRange,
}

impl TelemetryProfile {
    pub const GRID: TelemetryProfile = TelemetryProfile {
        load_mw: IntRange::new(800, 1000),
        generation_mw: IntRange::new(850, 900),
        voltage_kv: DecimalRange::new(230.0, 5.0, 2),
        frequency_hz: DecimalRange::new(59.9, 0.2, 2),
        power_factor: DecimalRange::new(0.9, 0.1, 3),
        cpu: IntRange::new(40, 30),
        memory: IntRange::new(55, 20),
        disk: IntRange::new(35, 15),
        network: IntRange::new(75, 25),
    };

    /// Draws load, generation, voltage, frequency and power factor, in that order.
    pub fn sample<Tz: TimeZone>(
        &self,
        random: &mut dyn RandomSource,
        at: &DateTime<Tz>,
    ) -> TelemetrySample
    where
        Tz::Offset: std::fmt::Display,
    {
        TelemetrySample {
            timestamp: time_label(at),
            load: self.load_mw.draw(random),
            generation: self.generation_mw.draw(random),
            voltage: self.voltage_kv.draw(random),
            frequency: self.frequency_hz.draw(random),
            power_factor: self.power_factor.draw(random),
        }
    }

    /// Draws cpu, memory, disk and network independently.
    pub fn health(&self, random: &mut dyn RandomSource) -> SystemHealthSnapshot {
        SystemHealthSnapshot {
            cpu: percent(self.cpu.draw(random)),
            memory: percent(self.memory.draw(random)),
            disk: percent(self.disk.draw(random)),
            network: percent(self.network.draw(random)),
        }
    }
}

impl Default for TelemetryProfile {
    fn default() -> Self {
        Self::GRID
    }
}

fn percent(value: u32) -> u8 {
    value.min(100) as u8
}
