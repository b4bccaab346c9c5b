use std::env;

use super::types::{AbilityEstimator, AnswerTokenPolicy, ConfigError, Environment};

pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn parse_usize(field: &'static str, value: String) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidValue { field, value })
}

pub(super) fn parse_f64(field: &'static str, value: String) -> Result<f64, ConfigError> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ConfigError::InvalidValue { field, value }),
    }
}

pub(super) fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|val| val.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

pub(super) fn parse_estimator(value: String) -> Result<AbilityEstimator, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "eap" => Ok(AbilityEstimator::Eap),
        "mle" => Ok(AbilityEstimator::Mle),
        _ => Err(ConfigError::InvalidValue { field: "IRT_ESTIMATOR", value }),
    }
}

pub(super) fn parse_token_policy(value: String) -> Result<AnswerTokenPolicy, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "passthrough" | "pass_through" | "lenient" => Ok(AnswerTokenPolicy::PassThrough),
        "strict" => Ok(AnswerTokenPolicy::Strict),
        _ => Err(ConfigError::InvalidValue { field: "ANSWER_TOKEN_POLICY", value }),
    }
}
