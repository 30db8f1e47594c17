//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metrics collection and export utilities."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, StatusCode};
use axum::routing::get;
use axum::{response::IntoResponse, Router};
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder, TEXT_FORMAT,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Shared registry type used across services.
pub type SharedRegistry = Arc<Registry>;

/// Produce a new shared registry.
pub fn new_registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

/// Spawn an HTTP server that exposes the registry at `/metrics`.
///
/// Must be called from within a tokio runtime. Binding to port `0` is allowed;
/// [`MetricsServer::addr`] reports the port actually assigned.
pub fn spawn_http_server(registry: SharedRegistry, addr: SocketAddr) -> Result<MetricsServer> {
    let app = Router::new().route(
        "/metrics",
        get({
            let registry = registry.clone();
            move || metrics_handler(registry.clone())
        }),
    );

    let std_listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind metrics listener {}", addr))?;
    std_listener
        .set_nonblocking(true)
        .with_context(|| "failed to configure metrics listener as non-blocking")?;
    let bound = std_listener
        .local_addr()
        .with_context(|| "failed to read metrics listener address")?;
    let listener = TcpListener::from_std(std_listener)
        .with_context(|| "failed to convert std listener into tokio listener")?;

    info!(address = %bound, "metrics server starting");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let service = app.into_make_service();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        axum::serve(listener, service)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .context("metrics server encountered an error")?;
        Ok(())
    });

    Ok(MetricsServer {
        addr: bound,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

async fn metrics_handler(registry: SharedRegistry) -> impl IntoResponse {
    let families = registry.gather();
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&families) {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(TEXT_FORMAT),
            )],
            body,
        ),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))],
                String::from("metrics encoding error"),
            )
        }
    }
}

/// Handle to the running HTTP exporter.
#[derive(Debug)]
pub struct MetricsServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl MetricsServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and await task completion.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(anyhow::Error::new(join_err)),
        }
    }
}

/// Metrics recorded by the telemetry simulator on every tick.
#[derive(Clone, Debug)]
pub struct SimulatorMetrics {
    registry: SharedRegistry,
    ticks_total: IntCounter,
    alerts_total: IntCounterVec,
    history_len: IntGauge,
    tick_seconds: Histogram,
    health_percent: IntGaugeVec,
}

impl SimulatorMetrics {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let ticks_total = IntCounter::with_opts(Opts::new(
            "eap_sim_ticks_total",
            "Total number of simulation ticks applied",
        ))?;
        registry.register(Box::new(ticks_total.clone()))?;

        let alerts_total = IntCounterVec::new(
            Opts::new(
                "eap_sim_alerts_total",
                "Synthetic alerts emitted by severity",
            ),
            &["severity"],
        )?;
        registry.register(Box::new(alerts_total.clone()))?;

        let history_len = IntGauge::with_opts(Opts::new(
            "eap_sim_history_len",
            "Number of samples currently held in the rolling buffer",
        ))?;
        registry.register(Box::new(history_len.clone()))?;

        let buckets = prometheus::exponential_buckets(0.000_01, 4.0, 10)
            .context("failed to construct histogram buckets")?;
        let tick_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "eap_sim_tick_seconds",
                "Wall time spent applying a single simulation tick",
            )
            .buckets(buckets),
        )?;
        registry.register(Box::new(tick_seconds.clone()))?;

        let health_percent = IntGaugeVec::new(
            Opts::new(
                "eap_sim_health_percent",
                "Latest synthetic system health reading by component",
            ),
            &["component"],
        )?;
        registry.register(Box::new(health_percent.clone()))?;

        Ok(Self {
            registry,
            ticks_total,
            alerts_total,
            history_len,
            tick_seconds,
            health_percent,
        })
    }

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    pub fn record_tick(&self, seconds: f64, history_len: usize) {
        self.ticks_total.inc();
        self.tick_seconds.observe(seconds);
        self.history_len.set(history_len as i64);
    }

    pub fn record_alert(&self, severity: &str) {
        self.alerts_total.with_label_values(&[severity]).inc();
    }

    pub fn set_health(&self, component: &str, percent: u8) {
        self.health_percent
            .with_label_values(&[component])
            .set(i64::from(percent));
    }

    pub fn ticks(&self) -> u64 {
        self.ticks_total.get()
    }

    pub fn alerts(&self, severity: &str) -> u64 {
        self.alerts_total.with_label_values(&[severity]).get()
    }
}

pub use prometheus;

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn simulator_metrics_track_ticks_and_alerts() {
        let metrics = SimulatorMetrics::new(new_registry()).unwrap();
        metrics.record_tick(0.001, 3);
        metrics.record_tick(0.002, 4);
        metrics.record_alert("high");
        metrics.set_health("cpu", 55);
        assert_eq!(metrics.ticks(), 2);
        assert_eq!(metrics.alerts("high"), 1);
        assert_eq!(metrics.alerts("low"), 0);
        let families = metrics.registry().gather();
        assert!(families
            .iter()
            .any(|family| family.get_name() == "eap_sim_history_len"));
    }

    #[test]
    fn registering_twice_on_one_registry_fails() {
        let registry = new_registry();
        SimulatorMetrics::new(registry.clone()).unwrap();
        assert!(SimulatorMetrics::new(registry).is_err());
    }

    #[tokio::test]
    async fn handler_labels_body_with_text_format() {
        let registry = new_registry();
        SimulatorMetrics::new(registry.clone()).unwrap();
        let response = metrics_handler(registry).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            TEXT_FORMAT
        );
    }

    #[tokio::test]
    async fn http_server_serves_text_exposition() {
        let registry = new_registry();
        let metrics = SimulatorMetrics::new(registry.clone()).unwrap();
        metrics.record_tick(0.0005, 1);

        let server = spawn_http_server(registry, "127.0.0.1:0".parse().unwrap()).unwrap();
        let mut stream = tokio::net::TcpStream::connect(server.addr()).await.unwrap();
        stream
            .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("eap_sim_ticks_total 1"));
        assert!(response.contains(TEXT_FORMAT));

        server.shutdown().await.unwrap();
    }
}
