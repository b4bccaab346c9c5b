use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::schemas::attempt::{AttemptSeed, QuestionView, StoredAnswer};
use crate::schemas::exam::ExamScoring;
use crate::schemas::question::{CanonicalQuestion, ItemParameters};
use crate::services::irt::AbilityEstimate;
use crate::services::scoring::{Grade, ScoreScale};

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EngineRequest {
    BuildView(BuildViewRequest),
    RecordAnswer(RecordAnswerRequest),
    Grade(GradeRequest),
    EstimateAbility(EstimateAbilityRequest),
    Score(ScoreRequest),
    ResolveScale(ResolveScaleRequest),
}

impl EngineRequest {
    pub fn action(&self) -> &'static str {
        match self {
            EngineRequest::BuildView(_) => "build_view",
            EngineRequest::RecordAnswer(_) => "record_answer",
            EngineRequest::Grade(_) => "grade",
            EngineRequest::EstimateAbility(_) => "estimate_ability",
            EngineRequest::Score(_) => "score",
            EngineRequest::ResolveScale(_) => "resolve_scale",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BuildViewRequest {
    #[validate(nested)]
    pub questions: Vec<CanonicalQuestion>,
    #[validate(nested)]
    pub seed: AttemptSeed,
    #[serde(default)]
    #[validate(range(min = 1, message = "question_limit must be positive"))]
    pub question_limit: Option<u32>,
    #[serde(default)]
    pub stored_answers: Vec<StoredAnswer>,
}

#[derive(Debug, Serialize)]
pub struct BuildViewResponse {
    pub questions: Vec<QuestionView>,
    /// Stored answers expressed in this attempt's display letters.
    pub answers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordAnswerRequest {
    #[validate(nested)]
    pub questions: Vec<CanonicalQuestion>,
    #[validate(nested)]
    pub seed: AttemptSeed,
    #[serde(default)]
    #[validate(range(min = 1, message = "question_limit must be positive"))]
    pub question_limit: Option<u32>,
    #[serde(deserialize_with = "crate::schemas::deserialize_id")]
    pub question_id: String,
    #[serde(default, alias = "selected_answer")]
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct RecordAnswerResponse {
    pub question_id: String,
    /// Canonical form to persist.
    pub answer: String,
    pub is_correct: bool,
    pub requires_manual_grading: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GradeRequest {
    #[validate(nested)]
    pub questions: Vec<CanonicalQuestion>,
    #[serde(default)]
    pub answers: Vec<StoredAnswer>,
    #[serde(default)]
    #[validate(nested)]
    pub exam: ExamScoring,
}

#[derive(Debug, Deserialize)]
pub struct EstimateAbilityRequest {
    #[serde(deserialize_with = "deserialize_responses")]
    pub responses: Vec<bool>,
    #[serde(default)]
    pub items: Vec<ItemParameters>,
}

#[derive(Debug, Serialize)]
pub struct EstimateAbilityResponse {
    #[serde(flatten)]
    pub estimate: AbilityEstimate,
    pub ability_scaled: u16,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScoreRequest {
    pub correct: usize,
    pub total: usize,
    #[serde(default)]
    #[validate(nested)]
    pub exam: ExamScoring,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolveScaleRequest {
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub passing_score: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ResolveScaleResponse {
    pub score_scale: ScoreScale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
}

/// Responses arrive as booleans or as the 0/1 integers stored per answer.
fn deserialize_responses<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawResponse {
        Flag(bool),
        Score(f64),
    }

    let raw = Vec::<RawResponse>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|value| match value {
            RawResponse::Flag(flag) => flag,
            RawResponse::Score(score) => score > 0.0,
        })
        .collect())
}
