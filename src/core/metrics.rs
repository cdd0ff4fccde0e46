use std::sync::OnceLock;
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_completion(flow: &'static str, outcome: &'static str, elapsed: Duration) {
    metrics::counter!("ai_completion_requests_total", "flow" => flow, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("ai_completion_duration_seconds", "flow" => flow)
        .record(elapsed.as_secs_f64());
}
