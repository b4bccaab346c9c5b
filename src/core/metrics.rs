use std::sync::OnceLock;

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init(settings: &Settings) -> anyhow::Result<()> {
    if settings.telemetry().prometheus_textfile.is_none() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

/// Write the current snapshot for a node-exporter textfile collector.
pub fn flush(settings: &Settings) -> anyhow::Result<()> {
    let (Some(path), Some(body)) = (&settings.telemetry().prometheus_textfile, render()) else {
        return Ok(());
    };

    let tmp = path.with_extension("prom.tmp");
    std::fs::write(&tmp, body)
        .with_context(|| format!("Failed to write metrics to {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move metrics into {}", path.display()))?;
    Ok(())
}
