//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Periodic tick scheduling for the simulator task."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Fixed-period ticker whose first tick lands one full period after creation.
///
/// Late ticks are delayed rather than replayed in a burst.
#[derive(Debug)]
pub struct TickSchedule {
    interval: Interval,
    period: Duration,
}

impl TickSchedule {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}
