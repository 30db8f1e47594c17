//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "tests"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Scheduling and rolling-window behaviour of the telemetry simulator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eap_sim::{
    AlertKind, AlertPolicy, AlertTemplate, DashboardSnapshot, SeededSource, Severity,
    SimulatorError, TelemetrySimulator, DEFAULT_TICK_INTERVAL,
};

const INTERVAL: Duration = DEFAULT_TICK_INTERVAL;

fn seeded(seed: u64) -> TelemetrySimulator {
    TelemetrySimulator::builder()
        .random_source(SeededSource::from_seed(seed))
        .build()
}

fn after_ticks(ticks: u32) -> Duration {
    INTERVAL * ticks + Duration::from_millis(1)
}

/// Raises an alert on every tick, cycling through the standard templates.
struct EveryTick;

impl AlertPolicy for EveryTick {
    fn should_emit(&self, _draw: f64) -> bool {
        true
    }

    fn select(&self, draw: f64) -> AlertTemplate {
        let templates = AlertTemplate::standard_set();
        let index = ((draw * templates.len() as f64) as usize).min(templates.len() - 1);
        templates[index].clone()
    }
}

#[tokio::test(start_paused = true)]
async fn one_interval_yields_exactly_one_sample() {
    let simulator = seeded(11);
    simulator.start(INTERVAL).unwrap();
    assert!(simulator.is_running());

    tokio::time::sleep(INTERVAL - Duration::from_millis(1)).await;
    assert_eq!(simulator.ticks(), 0, "first tick waits a full interval");

    tokio::time::sleep(Duration::from_millis(2)).await;
    let snapshot = simulator.snapshot();
    assert_eq!(snapshot.tick, 1);
    assert_eq!(snapshot.samples.len(), 1);
    assert!(snapshot.alerts.len() <= 1);
    let health = snapshot.health;
    assert!((40..=69).contains(&health.cpu));
    assert!((55..=74).contains(&health.memory));
    assert!((35..=49).contains(&health.disk));
    assert!((75..=99).contains(&health.network));

    simulator.stop();
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_ticks() {
    let simulator = seeded(12);
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    simulator.subscribe(move |_: &DashboardSnapshot| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    simulator.start(INTERVAL).unwrap();
    tokio::time::sleep(after_ticks(3)).await;
    assert_eq!(simulator.ticks(), 3);

    simulator.stop();
    simulator.stop();
    assert!(!simulator.is_running());
    let frozen = simulator.snapshot();

    tokio::time::sleep(after_ticks(10)).await;
    assert_eq!(simulator.snapshot(), frozen);
    assert_eq!(notified.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn repeated_start_does_not_double_schedule() {
    let simulator = seeded(13);
    simulator.start(INTERVAL).unwrap();
    simulator.start(INTERVAL).unwrap();
    tokio::time::sleep(after_ticks(2)).await;
    assert_eq!(simulator.ticks(), 2);
    simulator.stop();
}

#[tokio::test(start_paused = true)]
async fn start_with_new_interval_replaces_schedule() {
    let simulator = seeded(14);
    simulator.start(INTERVAL).unwrap();
    simulator.start(Duration::from_millis(500)).unwrap();
    tokio::time::sleep(Duration::from_millis(2001)).await;
    // 500, 1000, 1500, 2000 from the new schedule; nothing from the old one.
    assert_eq!(simulator.ticks(), 4);
    simulator.stop();
}

#[tokio::test(start_paused = true)]
async fn dropping_the_simulator_cancels_the_schedule() {
    let notified = Arc::new(AtomicUsize::new(0));
    {
        let simulator = seeded(15);
        let counter = notified.clone();
        simulator.subscribe(move |_: &DashboardSnapshot| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        simulator.start(INTERVAL).unwrap();
        tokio::time::sleep(after_ticks(1)).await;
    }
    tokio::time::sleep(after_ticks(5)).await;
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn watch_receiver_wakes_on_each_tick() {
    let simulator = seeded(16);
    let mut updates = simulator.watch();
    simulator.start(INTERVAL).unwrap();

    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().tick, 1);
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().tick, 2);

    simulator.shutdown().await;
}

#[test]
fn twenty_first_tick_evicts_the_first_sample() {
    let simulator = seeded(17);
    let produced: Vec<_> = (0..21).map(|_| simulator.tick().sample).collect();
    let retained = simulator.samples();
    assert_eq!(retained.len(), 20);
    assert_eq!(retained, produced[1..].to_vec());

    for _ in 0..50 {
        simulator.tick();
        assert!(simulator.samples().len() <= 20);
    }
}

#[test]
fn sixth_alert_evicts_the_first() {
    let simulator = TelemetrySimulator::builder()
        .random_source(SeededSource::from_seed(18))
        .alert_policy(EveryTick)
        .build();

    let raised: Vec<_> = (0..6)
        .map(|_| simulator.tick().alert.expect("policy alerts on every tick"))
        .collect();
    let feed = simulator.alerts();
    assert_eq!(feed.len(), 5);
    let mut expected: Vec<_> = raised[1..].to_vec();
    expected.reverse();
    assert_eq!(feed, expected);
    assert!(feed.iter().all(|alert| alert.id != raised[0].id));
}

#[test]
fn every_sample_stays_within_range() {
    let simulator = seeded(19);
    for _ in 0..2_000 {
        let report = simulator.tick();
        let sample = report.sample;
        assert!((800..=1799).contains(&sample.load));
        assert!((850..=1749).contains(&sample.generation));
        assert!((230.0..=235.0).contains(&sample.voltage));
        assert!((59.9..=60.1).contains(&sample.frequency));
        assert!((0.9..=1.0).contains(&sample.power_factor));
        if let Some(alert) = report.alert {
            let expected = match alert.kind {
                AlertKind::Warning => Severity::Medium,
                AlertKind::Critical => Severity::High,
                AlertKind::Info => Severity::Low,
            };
            assert_eq!(alert.severity, expected);
        }
    }
}

#[test]
fn alert_rate_converges_to_five_percent() {
    let simulator = seeded(0x5EED);
    let ticks = 100_000;
    let alerts = (0..ticks)
        .filter(|_| simulator.tick().alert.is_some())
        .count();
    let rate = alerts as f64 / ticks as f64;
    // Standard error is ~0.0007 at this sample size.
    assert!((rate - 0.05).abs() < 0.004, "alert rate {rate}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stop_is_final_while_ticks_race_on_other_workers() {
    let simulator = seeded(20);
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    simulator.subscribe(move |_: &DashboardSnapshot| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    simulator.start(Duration::from_millis(1)).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    simulator.stop();

    let calls = notified.load(Ordering::SeqCst);
    let frozen = simulator.snapshot();
    assert!(calls > 0, "schedule never ticked");
    assert_eq!(frozen.tick as usize, calls);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notified.load(Ordering::SeqCst), calls);
    assert_eq!(simulator.snapshot(), frozen);
}

#[test]
fn start_reports_missing_timer_driver() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime without timers");
    let simulator = seeded(21);
    let result = runtime.block_on(async { simulator.start(INTERVAL) });
    assert!(matches!(result, Err(SimulatorError::UnsupportedEnvironment)));
    assert!(!simulator.is_running());
}
