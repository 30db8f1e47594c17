//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Injectable randomness and wall-clock sources."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::{DateTime, Local};
use rand::prelude::*;

/// Largest value a source may return; keeps `floor(u * n) < n`.
const MAX_UNIT: f64 = 1.0 - f64::EPSILON;

/// Uniform draws in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

/// `StdRng`-backed source, reproducible when seeded.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted. Values are clamped
/// into `[0, 1)`; an empty script yields zeros.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws
                .into_iter()
                .map(|draw| if draw.is_nan() { 0.0 } else { draw.clamp(0.0, MAX_UNIT) })
                .collect(),
            cursor: 0,
        }
    }

    /// Number of draws handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        draw
    }
}

/// Wall-clock used for sample and alert labels.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        eap_common::time::local_now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sources_repeat() {
        let mut a = SeededSource::from_seed(7);
        let mut b = SeededSource::from_seed(7);
        for _ in 0..32 {
            let draw = a.next_unit();
            assert_eq!(draw, b.next_unit());
            assert!((0.0..1.0).contains(&draw));
        }
    }

    #[test]
    fn scripted_source_cycles_and_clamps() {
        let mut source = ScriptedSource::new([0.25, 1.0, -3.0, f64::NAN]);
        assert_eq!(source.next_unit(), 0.25);
        assert!(source.next_unit() < 1.0);
        assert_eq!(source.next_unit(), 0.0);
        assert_eq!(source.next_unit(), 0.0);
        assert_eq!(source.next_unit(), 0.25);
        assert_eq!(source.consumed(), 5);
    }

    #[test]
    fn empty_script_yields_zero() {
        let mut source = ScriptedSource::new(Vec::new());
        assert_eq!(source.next_unit(), 0.0);
    }
}
