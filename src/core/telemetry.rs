use sha2::{Digest, Sha256};
use tracing_subscriber::{fmt, fmt::format::FmtSpan, EnvFilter};

use crate::core::config::Settings;

/// Install the global subscriber. Stdout carries the response document, so
/// every log line goes to stderr.
pub fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let telemetry = settings.telemetry();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(telemetry.log_level.as_str()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);

    let installed = if telemetry.json { builder.json().try_init() } else { builder.try_init() };
    installed.map_err(|err| anyhow::anyhow!("Failed to install log subscriber: {err}"))
}

/// Short, stable identifier for a seed that is safe to put in logs.
pub fn seed_fingerprint(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    hex::encode(&digest[..6])
}
