//! BSP Runner - runs a full detection session on the simulated board
//!
//! Usage: `bsp-runner [session.json]`. Log verbosity follows `RUST_LOG`.

mod scenario;
mod session;

use anyhow::{Context, Result};
use bsp_core::TracingValueLogger;
use session::{run_session, SessionConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read session config {}", path))?;
            SessionConfig::from_json(&json).with_context(|| format!("invalid session config {}", path))?
        }
        None => SessionConfig::default(),
    };
    info!(
        gaze_epochs = config.gaze_epochs,
        reaction_trials = config.reaction_trials,
        "starting session"
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);
    let mut session = tokio::task::spawn_blocking(move || {
        run_session(&config, &worker_cancel, &mut TracingValueLogger)
    });

    let report = tokio::select! {
        joined = &mut session => joined.context("session task failed")??,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupt received, stopping after the current phase");
            cancel.store(true, Ordering::Relaxed);
            session.await.context("session task failed")??
        }
    };

    let json = serde_json::to_string_pretty(&report).context("failed to serialize session report")?;
    println!("{}", json);
    Ok(())
}
