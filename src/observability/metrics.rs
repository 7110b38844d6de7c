//! Session metrics.
//!
//! Counters are recorded through the `metrics` facade and are no-ops until
//! [`init_metrics`] installs a Prometheus recorder. There is no HTTP
//! listener; the rendering is read back with [`render_metrics`].

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::catalog::Level;
use crate::error::ShadowCueError;
use crate::phase::Phase;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder.
///
/// # Errors
///
/// Returns [`ShadowCueError::Metrics`] when another recorder is already
/// installed.
pub fn init_metrics() -> Result<(), ShadowCueError> {
    if HANDLE.get().is_some() {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ShadowCueError::Metrics(e.to_string()))?;
    let _ = HANDLE.set(handle);
    describe_metrics();
    Ok(())
}

/// Renders all recorded metrics in Prometheus text format.
///
/// Returns `None` when no recorder was installed.
#[must_use]
pub fn render_metrics() -> Option<String> {
    HANDLE.get().map(PrometheusHandle::render)
}

fn describe_metrics() {
    describe_counter!(
        "shadowcue_cues_announced_total",
        "Cues passed to the announcer"
    );
    describe_counter!(
        "shadowcue_phase_transitions_total",
        "Phases entered by the sequencer"
    );
    describe_counter!(
        "shadowcue_session_restarts_total",
        "Automatic restarts after a setting changed"
    );
    describe_counter!(
        "shadowcue_empty_pool_total",
        "Draws that found no enabled cues"
    );
    describe_counter!(
        "shadowcue_edits_rejected_total",
        "Edits that were not applied"
    );
    describe_gauge!(
        "shadowcue_session_active",
        "Whether the user has a session running (1 = active)"
    );
}

/// Records a phase entry, and the announcement when one was made.
pub fn record_phase(phase: Phase, announced: bool) {
    counter!("shadowcue_phase_transitions_total", "phase" => phase.as_str()).increment(1);
    if announced {
        counter!("shadowcue_cues_announced_total", "phase" => phase.as_str()).increment(1);
    }
}

/// Records a draw against an empty selectable set.
pub fn record_empty_pool(level: Level) {
    counter!("shadowcue_empty_pool_total", "level" => level.as_str()).increment(1);
}

/// Records an automatic restart.
pub fn record_restart(reason: &'static str) {
    counter!("shadowcue_session_restarts_total", "reason" => reason).increment(1);
}

/// Records a rejected edit.
pub fn record_edit_rejected(operation: &'static str) {
    counter!("shadowcue_edits_rejected_total", "operation" => operation).increment(1);
}

/// Sets the session-active gauge.
pub fn set_session_active(active: bool) {
    gauge!("shadowcue_session_active").set(if active { 1.0 } else { 0.0 });
}
