pub mod api;
pub mod core;
pub mod schemas;
pub mod services;

#[cfg(test)]
mod test_support;

use std::env;
use std::fs;
use std::io::{self, Read};

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use crate::api::EngineResponse;
use crate::core::{config::Settings, telemetry};

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    request_path: Option<String>,
    pretty: bool,
}

pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let args = parse_args(env::args().skip(1))?;
    let payload = read_payload(args.request_path.as_deref())?;

    tracing::debug!(
        environment = %settings.runtime().environment.as_str(),
        estimator = settings.irt().estimator.as_str(),
        keyed_seeds = settings.seed_namespace().is_keyed(),
        "Exam engine ready"
    );

    let (output, failures) = process_payload(&payload, &settings)?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    core::metrics::flush(&settings)?;

    if failures > 0 {
        Err(anyhow!("{failures} request(s) failed"))
    } else {
        Ok(())
    }
}

/// A payload is one request object or an array of them; the output mirrors
/// its shape.
fn process_payload(payload: &str, settings: &Settings) -> Result<(Value, usize)> {
    if !payload.trim_start().starts_with('[') {
        let response = api::handle_request(payload, settings);
        let failures = usize::from(!response.is_success());
        return Ok((response.body, failures));
    }

    let requests: Vec<Value> =
        serde_json::from_str(payload).context("Invalid JSON in request batch")?;
    let responses: Vec<EngineResponse> = requests
        .iter()
        .map(|request| api::handle_request(&request.to_string(), settings))
        .collect();
    let failures = responses.iter().filter(|response| !response.is_success()).count();
    Ok((Value::Array(responses.into_iter().map(|response| response.body).collect()), failures))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let mut request_path = env::var("EXAM_ENGINE_REQUEST").ok().filter(|value| !value.is_empty());
    let mut pretty = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--request" => {
                let path = args.next().ok_or_else(|| anyhow!("--request missing value"))?;
                request_path = Some(path);
            }
            "--pretty" => pretty = true,
            _ => return Err(anyhow!("Unknown argument: {arg}")),
        }
    }

    Ok(CliArgs { request_path: request_path.filter(|path| path != "-"), pretty })
}

fn read_payload(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {path}")),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("Failed to read request from stdin")?;
            Ok(buffer)
        }
    }
}
