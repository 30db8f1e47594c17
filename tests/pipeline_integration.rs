//! ---
//! ems_section: "15-testing-qa-runbook"
//! ems_subsection: "integration-tests"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Config, simulator and metrics wired together end to end."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use eap_common::AppConfig;
use eap_metrics::{new_registry, spawn_http_server, SimulatorMetrics};
use eap_sim::{DashboardSnapshot, TelemetrySimulator};

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../configs/dashboard.toml")
}

#[test]
fn shipped_config_matches_defaults() {
    let config = AppConfig::load(&[shipped_config()]).expect("shipped config parses");
    let defaults = AppConfig::default();
    assert_eq!(config.simulation.tick_interval, defaults.simulation.tick_interval);
    assert_eq!(config.simulation.history_capacity, 20);
    assert_eq!(config.simulation.alert_capacity, 5);
    assert!(!config.metrics.enabled);
}

#[test]
fn seeded_runs_are_reproducible() {
    let mut config = AppConfig::default();
    config.simulation.random_seed = Some(2024);
    let first = TelemetrySimulator::from_config(&config.simulation, None);
    let second = TelemetrySimulator::from_config(&config.simulation, None);
    for _ in 0..30 {
        let a = first.tick();
        let b = second.tick();
        assert_eq!(a.sample.load, b.sample.load);
        assert_eq!(a.sample.voltage, b.sample.voltage);
        assert_eq!(a.health, b.health);
        assert_eq!(a.alert.is_some(), b.alert.is_some());
    }
    assert_eq!(first.samples().len(), 20);
}

#[test]
fn configured_capacities_bound_the_snapshot() {
    let mut config = AppConfig::default();
    config.simulation.random_seed = Some(5);
    config.simulation.history_capacity = 4;
    config.simulation.alert_capacity = 2;
    config.simulation.alert_threshold = 0.0;
    let simulator = TelemetrySimulator::from_config(&config.simulation, None);
    for _ in 0..10 {
        simulator.tick();
    }
    let snapshot = simulator.snapshot();
    assert_eq!(snapshot.samples.len(), 4);
    assert_eq!(snapshot.alerts.len(), 2);
    assert!(snapshot.alerts[0].id > snapshot.alerts[1].id);
}

#[tokio::test]
async fn metrics_endpoint_reports_ticks() {
    let registry = new_registry();
    let metrics = SimulatorMetrics::new(registry.clone()).expect("metrics register");
    let mut config = AppConfig::default();
    config.simulation.random_seed = Some(9);
    let simulator = TelemetrySimulator::from_config(&config.simulation, Some(metrics.clone()));
    for _ in 0..3 {
        simulator.tick();
    }
    assert_eq!(metrics.ticks(), 3);

    let server = spawn_http_server(registry, SocketAddr::from(([127, 0, 0, 1], 0)))
        .expect("metrics server binds");
    let body = scrape(server.addr()).await;
    assert!(body.contains("eap_sim_ticks_total 3"), "{body}");
    assert!(body.contains("eap_sim_history_len 3"), "{body}");
    server.shutdown().await.expect("server stops");
}

#[tokio::test(start_paused = true)]
async fn snapshots_serialize_for_external_consumers() {
    let simulator = TelemetrySimulator::builder().build();
    let mut updates = simulator.watch();
    simulator.start(Duration::from_millis(100)).expect("start");
    updates.changed().await.expect("first tick");
    let snapshot = updates.borrow_and_update().clone();
    simulator.shutdown().await;

    let json = serde_json::to_value(&*snapshot).expect("serialize");
    assert_eq!(json["tick"], 1);
    assert!(json["samples"][0]["timestamp"].is_string());
    assert_eq!(json["connection"], "connected");
    let back: DashboardSnapshot = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, *snapshot);
}

async fn scrape(addr: SocketAddr) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("request");
    let mut body = String::new();
    stream.read_to_string(&mut body).await.expect("response");
    body
}
