//! JSON action boundary between the engine and the service that embeds it.

pub mod errors;
mod handlers;
pub mod requests;

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::requests::EngineRequest;
use crate::core::config::Settings;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineResponse {
    pub status: u16,
    pub body: Value,
}

impl EngineResponse {
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Parse, run and encode one request. Never fails: every error becomes a
/// `{status, detail}` body.
pub fn handle_request(body: &str, settings: &Settings) -> EngineResponse {
    let started = Instant::now();
    let (action, result) = match serde_json::from_str::<EngineRequest>(body) {
        Ok(request) => {
            let action = request.action();
            let span = tracing::info_span!("engine_request", action);
            let _entered = span.enter();
            (action, dispatch(request, settings))
        }
        Err(err) => ("unknown", Err(ApiError::from(err))),
    };

    let response = match result {
        Ok(body) => EngineResponse { status: 200, body },
        Err(err) => {
            tracing::warn!(action, error = %err, "Engine request rejected");
            let error = err.into_response();
            let status = error.status;
            match serde_json::to_value(error) {
                Ok(body) => EngineResponse { status, body },
                Err(_) => EngineResponse { status, body: Value::Null },
            }
        }
    };

    let status_label = response.status.to_string();
    metrics::counter!(
        "engine_requests_total",
        "action" => action,
        "status" => status_label
    )
    .increment(1);
    metrics::histogram!("engine_request_duration_seconds", "action" => action)
        .record(started.elapsed().as_secs_f64());

    response
}

pub fn dispatch(request: EngineRequest, settings: &Settings) -> Result<Value, ApiError> {
    match request {
        EngineRequest::BuildView(payload) => encode(handlers::build_view(settings, payload)?),
        EngineRequest::RecordAnswer(payload) => {
            encode(handlers::record_answer(settings, payload)?)
        }
        EngineRequest::Grade(payload) => encode(handlers::grade(settings, payload)?),
        EngineRequest::EstimateAbility(payload) => encode(handlers::ability(settings, payload)?),
        EngineRequest::Score(payload) => encode(handlers::score(payload)?),
        EngineRequest::ResolveScale(payload) => encode(handlers::resolve_scale(payload)),
    }
}

fn encode(value: impl Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|err| ApiError::internal(err, "Failed to encode response"))
}
