use std::path::PathBuf;

use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_environment, parse_estimator, parse_f64,
    parse_token_policy, parse_usize,
};
use super::types::{
    AnswerSettings, AnswerTokenPolicy, ConfigError, Environment, IrtSettings, ResolvedItem,
    RuntimeSettings, SeedSettings, Settings, TelemetrySettings,
};
use crate::schemas::attempt::SeedNamespace;

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = parse_environment(
            env_optional("EXAM_ENGINE_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("EXAM_ENGINE_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let quadrature_points =
            parse_usize("IRT_QUADRATURE_POINTS", env_or_default("IRT_QUADRATURE_POINTS", "30"))?;
        let discrimination = parse_f64(
            "IRT_DEFAULT_DISCRIMINATION",
            env_or_default("IRT_DEFAULT_DISCRIMINATION", "1"),
        )?;
        let difficulty =
            parse_f64("IRT_DEFAULT_DIFFICULTY", env_or_default("IRT_DEFAULT_DIFFICULTY", "0"))?;
        let guessing =
            parse_f64("IRT_DEFAULT_GUESSING", env_or_default("IRT_DEFAULT_GUESSING", "0.25"))?;
        let estimator = parse_estimator(env_or_default("IRT_ESTIMATOR", "eap"))?;

        let token_policy =
            parse_token_policy(env_or_default("ANSWER_TOKEN_POLICY", "passthrough"))?;
        let seed_secret = env_optional("EXAM_SEED_SECRET");

        let log_level = env_or_default("EXAM_ENGINE_LOG_LEVEL", "info");
        let json = env_optional("EXAM_ENGINE_LOG_JSON")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);
        let prometheus_textfile = env_optional("PROMETHEUS_TEXTFILE").map(PathBuf::from);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            irt: IrtSettings {
                quadrature_points,
                default_item: ResolvedItem { discrimination, difficulty, guessing },
                estimator,
            },
            answers: AnswerSettings { token_policy },
            seeds: SeedSettings { secret: seed_secret },
            telemetry: TelemetrySettings { log_level, json, prometheus_textfile },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub fn irt(&self) -> &IrtSettings {
        &self.irt
    }

    pub fn answers(&self) -> &AnswerSettings {
        &self.answers
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub fn seed_namespace(&self) -> SeedNamespace {
        SeedNamespace::new(self.seeds.secret.clone())
    }

    pub fn with_token_policy(mut self, policy: AnswerTokenPolicy) -> Self {
        self.answers.token_policy = policy;
        self
    }

    pub fn with_seed_secret(mut self, secret: impl Into<String>) -> Self {
        self.seeds.secret = Some(secret.into());
        self
    }

    pub fn with_irt(mut self, irt: IrtSettings) -> Self {
        self.irt = irt;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.irt.quadrature_points < 2 {
            return Err(ConfigError::InvalidValue {
                field: "IRT_QUADRATURE_POINTS",
                value: self.irt.quadrature_points.to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.irt.default_item.guessing) {
            return Err(ConfigError::InvalidValue {
                field: "IRT_DEFAULT_GUESSING",
                value: self.irt.default_item.guessing.to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.seeds.secret.is_none() {
            return Err(ConfigError::MissingSecret("EXAM_SEED_SECRET"));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runtime: RuntimeSettings {
                environment: Environment::Development,
                strict_config: false,
            },
            irt: IrtSettings::default(),
            answers: AnswerSettings { token_policy: AnswerTokenPolicy::PassThrough },
            seeds: SeedSettings::default(),
            telemetry: TelemetrySettings {
                log_level: "info".to_string(),
                json: false,
                prometheus_textfile: None,
            },
        }
    }
}
