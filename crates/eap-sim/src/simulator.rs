//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Telemetry simulator lifecycle, tick pipeline, and observers."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use eap_common::config::SimulationConfig;
use eap_common::time::{date_time_label, epoch_millis};
use eap_metrics::SimulatorMetrics;
use parking_lot::{Mutex, MutexGuard, RwLock};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::alerts::{Alert, AlertPolicy, ThresholdAlertPolicy};
use crate::error::{SimResult, SimulatorError};
use crate::generator::TelemetryProfile;
use crate::sample::{ConnectionStatus, SystemHealthSnapshot, TelemetrySample};
use crate::schedule::TickSchedule;
use crate::source::{Clock, RandomSource, SeededSource, SystemClock};
use crate::state::{
    DashboardSnapshot, SimulationState, DEFAULT_ALERT_CAPACITY, DEFAULT_HISTORY_CAPACITY,
};

/// Interval used by the grid dashboard.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(2000);

/// Receives every snapshot right after a tick has been applied.
///
/// Observers run on the ticking task while publication order is held, and must
/// not call back into the [`TelemetrySimulator`]. Copy what you need out of the
/// snapshot instead.
pub trait SnapshotObserver: Send + Sync {
    fn on_snapshot(&self, snapshot: &DashboardSnapshot);
}

impl<F> SnapshotObserver for F
where
    F: Fn(&DashboardSnapshot) + Send + Sync,
{
    fn on_snapshot(&self, snapshot: &DashboardSnapshot) {
        self(snapshot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// What a single tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub sample: TelemetrySample,
    pub alert: Option<Alert>,
    pub health: SystemHealthSnapshot,
}

struct Engine {
    state: SimulationState,
    profile: TelemetryProfile,
    random: Box<dyn RandomSource>,
    policy: Box<dyn AlertPolicy>,
    clock: Box<dyn Clock>,
    /// Bumped on every stop; scheduled tasks carry the epoch they were started in.
    epoch: u64,
}

impl Engine {
    fn advance(&mut self) -> TickReport {
        let now = self.clock.now();

        let sample = self.profile.sample(self.random.as_mut(), &now);
        self.state.history.push(sample.clone());

        let alert = if self.policy.should_emit(self.random.next_unit()) {
            let template = self.policy.select(self.random.next_unit());
            let id = self.state.alert_ids.next(epoch_millis(&now));
            let alert = template.stamp(id, date_time_label(&now));
            self.state.alerts.push(alert.clone());
            Some(alert)
        } else {
            None
        };

        let health = self.profile.health(self.random.as_mut());
        self.state.health = health;
        self.state.tick += 1;

        TickReport {
            tick: self.state.tick,
            sample,
            alert,
            health,
        }
    }
}

struct Shared {
    engine: Mutex<Engine>,
    /// Held from the end of a mutation until its snapshot is published, so
    /// publications keep tick order and `stop` can wait out an in-flight one.
    publish_gate: Mutex<()>,
    observers: RwLock<Vec<(ObserverId, Arc<dyn SnapshotObserver>)>>,
    next_observer: AtomicU64,
    updates: watch::Sender<Arc<DashboardSnapshot>>,
    metrics: Option<SimulatorMetrics>,
}

impl Shared {
    fn tick_in_epoch(&self, epoch: u64) -> Option<TickReport> {
        let started = Instant::now();
        let engine = self.engine.lock();
        if engine.epoch != epoch {
            return None;
        }
        Some(self.advance_locked(engine, started))
    }

    fn advance_locked(&self, mut engine: MutexGuard<'_, Engine>, started: Instant) -> TickReport {
        let report = engine.advance();
        let snapshot = Arc::new(engine.state.snapshot());
        let _gate = self.publish_gate.lock();
        drop(engine);

        debug!(
            tick = report.tick,
            load_mw = report.sample.load,
            generation_mw = report.sample.generation,
            voltage_kv = report.sample.voltage,
            frequency_hz = report.sample.frequency,
            alert = report.alert.is_some(),
            "telemetry tick applied"
        );
        if let Some(alert) = &report.alert {
            info!(
                alert_id = %alert.id,
                kind = %alert.kind,
                severity = %alert.severity,
                message = %alert.message,
                "synthetic alert raised"
            );
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_tick(started.elapsed().as_secs_f64(), snapshot.samples.len());
            if let Some(alert) = &report.alert {
                metrics.record_alert(alert.severity.as_ref());
            }
            for (component, percent) in report.health.components() {
                metrics.set_health(component, percent);
            }
        }

        self.publish(&snapshot);
        report
    }

    fn publish(&self, snapshot: &Arc<DashboardSnapshot>) {
        let observers: Vec<Arc<dyn SnapshotObserver>> = self
            .observers
            .read()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer.on_snapshot(snapshot);
        }
        self.updates.send_replace(snapshot.clone());
    }
}

struct RunningTask {
    interval: Duration,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the synthetic telemetry state and the recurring task that advances it.
///
/// Dropping the simulator stops the schedule.
pub struct TelemetrySimulator {
    shared: Arc<Shared>,
    task: Mutex<Option<RunningTask>>,
}

impl std::fmt::Debug for TelemetrySimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySimulator")
            .field("running", &self.is_running())
            .field("ticks", &self.ticks())
            .finish_non_exhaustive()
    }
}

impl TelemetrySimulator {
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::default()
    }

    /// Build a simulator from configuration. Entropy seeds the generator unless
    /// `random_seed` is set.
    pub fn from_config(config: &SimulationConfig, metrics: Option<SimulatorMetrics>) -> Self {
        let random = config
            .random_seed
            .map(SeededSource::from_seed)
            .unwrap_or_else(SeededSource::from_entropy);
        let mut builder = Self::builder()
            .history_capacity(config.history_capacity)
            .alert_capacity(config.alert_capacity)
            .alert_policy(ThresholdAlertPolicy::with_threshold(config.alert_threshold))
            .random_source(random);
        if let Some(metrics) = metrics {
            builder = builder.metrics(metrics);
        }
        builder.build()
    }

    /// Begin ticking every `interval` on the current tokio runtime.
    ///
    /// Calling this while already running with the same interval is a no-op; a
    /// different interval replaces the running schedule. Fails with
    /// [`SimulatorError::UnsupportedEnvironment`] outside a runtime or on one
    /// built without timers.
    pub fn start(&self, interval: Duration) -> SimResult<()> {
        if interval.is_zero() {
            return Err(SimulatorError::InvalidInterval);
        }
        let runtime = Handle::try_current().map_err(|_| SimulatorError::UnsupportedEnvironment)?;

        let mut task = self.task.lock();
        if let Some(running) = task.as_ref() {
            if running.interval == interval && !running.handle.is_finished() {
                debug!(interval_ms = interval.as_millis() as u64, "simulator already running");
                return Ok(());
            }
        }
        let schedule = {
            let _context = runtime.enter();
            catch_unwind(AssertUnwindSafe(|| TickSchedule::new(interval)))
                .map_err(|_| SimulatorError::UnsupportedEnvironment)?
        };
        if let Some(previous) = task.take() {
            info!(
                previous_ms = previous.interval.as_millis() as u64,
                interval_ms = interval.as_millis() as u64,
                "restarting simulator schedule"
            );
            drop(self.halt(previous));
        }

        let epoch = self.shared.engine.lock().epoch;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = runtime.spawn(run_schedule(
            self.shared.clone(),
            schedule,
            epoch,
            shutdown_rx,
        ));
        *task = Some(RunningTask {
            interval,
            shutdown: shutdown_tx,
            handle,
        });
        info!(interval_ms = interval.as_millis() as u64, "telemetry simulator started");
        Ok(())
    }

    /// Cancel the schedule. Once this returns no scheduled tick mutates state or
    /// reaches an observer. Safe to call repeatedly.
    pub fn stop(&self) {
        let running = self.task.lock().take();
        if let Some(running) = running {
            drop(self.halt(running));
            info!("telemetry simulator stopped");
        }
    }

    /// Stop and wait for the scheduled task to exit.
    pub async fn shutdown(self) {
        let running = self.task.lock().take();
        if let Some(running) = running {
            if let Err(err) = self.halt(running).await {
                warn!(error = %err, "simulator task ended abnormally");
            }
            info!("telemetry simulator shut down");
        }
    }

    fn halt(&self, running: RunningTask) -> JoinHandle<()> {
        self.shared.engine.lock().epoch += 1;
        // Wait out a publication that started before the epoch moved.
        drop(self.shared.publish_gate.lock());
        let _ = running.shutdown.send(());
        running.handle
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Apply one tick immediately, independent of the schedule.
    pub fn tick(&self) -> TickReport {
        let started = Instant::now();
        self.shared
            .advance_locked(self.shared.engine.lock(), started)
    }

    /// Register `observer` to receive every future snapshot.
    pub fn subscribe(&self, observer: impl SnapshotObserver + 'static) -> ObserverId {
        let id = ObserverId(self.shared.next_observer.fetch_add(1, Ordering::Relaxed));
        let observer: Arc<dyn SnapshotObserver> = Arc::new(observer);
        self.shared.observers.write().push((id, observer));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.shared.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Receiver that always holds the most recent snapshot.
    pub fn watch(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.shared.engine.lock().state.snapshot()
    }

    /// Oldest first.
    pub fn samples(&self) -> Vec<TelemetrySample> {
        self.shared.engine.lock().state.history().to_vec()
    }

    pub fn latest_sample(&self) -> Option<TelemetrySample> {
        self.shared.engine.lock().state.history().latest().cloned()
    }

    /// Newest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.shared.engine.lock().state.alerts().to_vec()
    }

    pub fn health(&self) -> SystemHealthSnapshot {
        self.shared.engine.lock().state.health()
    }

    pub fn ticks(&self) -> u64 {
        self.shared.engine.lock().state.tick()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.shared.engine.lock().state.connection()
    }

    /// The tick never changes the link status; this is the only way to flip it.
    /// The change becomes visible to observers on the next tick.
    pub fn set_connection_status(&self, status: ConnectionStatus) {
        let mut engine = self.shared.engine.lock();
        if engine.state.connection != status {
            info!(from = %engine.state.connection, to = %status, "scada link status changed");
            engine.state.connection = status;
        }
    }
}

impl Drop for TelemetrySimulator {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_schedule(
    shared: Arc<Shared>,
    mut schedule: TickSchedule,
    epoch: u64,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = schedule.tick() => {
                if shared.tick_in_epoch(epoch).is_none() {
                    break;
                }
            }
        }
    }
    debug!(
        epoch,
        period_ms = schedule.period().as_millis() as u64,
        "simulator schedule exited"
    );
}

/// Assembles a [`TelemetrySimulator`] with injected sources.
pub struct SimulatorBuilder {
    history_capacity: usize,
    alert_capacity: usize,
    profile: TelemetryProfile,
    random: Option<Box<dyn RandomSource>>,
    policy: Option<Box<dyn AlertPolicy>>,
    clock: Option<Box<dyn Clock>>,
    metrics: Option<SimulatorMetrics>,
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            alert_capacity: DEFAULT_ALERT_CAPACITY,
            profile: TelemetryProfile::default(),
            random: None,
            policy: None,
            clock: None,
            metrics: None,
        }
    }
}

impl SimulatorBuilder {
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn alert_capacity(mut self, capacity: usize) -> Self {
        self.alert_capacity = capacity;
        self
    }

    pub fn profile(mut self, profile: TelemetryProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Some(Box::new(random));
        self
    }

    pub fn alert_policy(mut self, policy: impl AlertPolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn metrics(mut self, metrics: SimulatorMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> TelemetrySimulator {
        let state = SimulationState::new(self.history_capacity, self.alert_capacity);
        let (updates, _) = watch::channel(Arc::new(state.snapshot()));
        let engine = Engine {
            state,
            profile: self.profile,
            random: self
                .random
                .unwrap_or_else(|| Box::new(SeededSource::from_entropy())),
            policy: self
                .policy
                .unwrap_or_else(|| Box::new(ThresholdAlertPolicy::default())),
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            epoch: 0,
        };
        TelemetrySimulator {
            shared: Arc::new(Shared {
                engine: Mutex::new(engine),
                publish_gate: Mutex::new(()),
                observers: RwLock::new(Vec::new()),
                next_observer: AtomicU64::new(0),
                updates,
                metrics: self.metrics,
            }),
            task: Mutex::new(None),
        }
    }
}
