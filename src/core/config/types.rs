use thiserror::Error;

use crate::schemas::question::ItemParameters;

#[derive(Debug, Clone)]
pub struct Settings {
    pub(super) runtime: RuntimeSettings,
    pub(super) irt: IrtSettings,
    pub(super) answers: AnswerSettings,
    pub(super) seeds: SeedSettings,
    pub(super) telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct IrtSettings {
    pub quadrature_points: usize,
    pub default_item: ResolvedItem,
    pub estimator: AbilityEstimator,
}

/// Item parameters with every field filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedItem {
    pub discrimination: f64,
    pub difficulty: f64,
    pub guessing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityEstimator {
    Eap,
    Mle,
}

#[derive(Debug, Clone)]
pub struct AnswerSettings {
    pub token_policy: AnswerTokenPolicy,
}

/// What the remapper does with a letter that is not part of the active view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerTokenPolicy {
    #[default]
    PassThrough,
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct SeedSettings {
    pub(crate) secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
    pub prometheus_textfile: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub environment: Environment,
    pub strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl AbilityEstimator {
    pub fn as_str(self) -> &'static str {
        match self {
            AbilityEstimator::Eap => "eap",
            AbilityEstimator::Mle => "mle",
        }
    }
}

impl Default for ResolvedItem {
    fn default() -> Self {
        Self { discrimination: 1.0, difficulty: 0.0, guessing: 0.25 }
    }
}

impl ResolvedItem {
    /// Fill the unset or malformed fields of `params` from `self`.
    pub fn resolve(&self, params: &ItemParameters) -> ResolvedItem {
        let finite = |value: Option<f64>| value.filter(|v| v.is_finite());
        ResolvedItem {
            discrimination: finite(params.discrimination).unwrap_or(self.discrimination),
            difficulty: finite(params.difficulty).unwrap_or(self.difficulty),
            guessing: finite(params.guessing)
                .filter(|c| (0.0..1.0).contains(c))
                .unwrap_or(self.guessing),
        }
    }
}

impl Default for IrtSettings {
    fn default() -> Self {
        Self {
            quadrature_points: 30,
            default_item: ResolvedItem::default(),
            estimator: AbilityEstimator::Eap,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}
