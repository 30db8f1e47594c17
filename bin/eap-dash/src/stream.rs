//! ---
//! ems_section: "12-gui-dashboard"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Headless newline-delimited JSON snapshot stream."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use eap_sim::{DashboardSnapshot, TelemetrySimulator};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Write one JSON snapshot per tick to `out` until `ticks` snapshots were
/// written (`0` means unbounded) or Ctrl-C is received.
pub async fn run<W: Write>(
    simulator: &TelemetrySimulator,
    interval: Duration,
    ticks: u64,
    mut out: W,
) -> Result<u64> {
    let (tx, mut rx) = mpsc::unbounded_channel::<DashboardSnapshot>();
    let observer = simulator.subscribe(move |snapshot: &DashboardSnapshot| {
        let _ = tx.send(snapshot.clone());
    });
    if let Err(err) = simulator.start(interval) {
        simulator.unsubscribe(observer);
        return Err(err.into());
    }
    info!(interval_ms = interval.as_millis() as u64, ticks, "streaming snapshots");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut written = 0u64;
    let result = loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => {
                info!(written, "interrupt received, stopping stream");
                break Ok(());
            }
            received = rx.recv() => {
                let Some(snapshot) = received else {
                    warn!("simulator dropped its observers");
                    break Ok(());
                };
                if let Err(err) = write_line(&mut out, &snapshot) {
                    break Err(err);
                }
                written += 1;
                if ticks != 0 && written >= ticks {
                    break Ok(());
                }
            }
        }
    };

    simulator.stop();
    simulator.unsubscribe(observer);
    result.map(|()| written)
}

fn write_line<W: Write>(out: &mut W, snapshot: &DashboardSnapshot) -> Result<()> {
    serde_json::to_writer(&mut *out, snapshot).context("serializing snapshot")?;
    out.write_all(b"\n").context("writing snapshot")?;
    out.flush().context("flushing snapshot stream")?;
    Ok(())
}
