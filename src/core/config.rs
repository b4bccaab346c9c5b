mod parsing;
mod settings;
mod types;

pub use types::{
    AbilityEstimator, AnswerSettings, AnswerTokenPolicy, ConfigError, Environment, IrtSettings,
    ResolvedItem, RuntimeSettings, Settings, TelemetrySettings,
};
