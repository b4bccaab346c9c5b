use serde::{Deserialize, Serialize};
use validator::Validate;

/// The scoring-related part of an exam definition. Any field may be missing
/// depending on which call site assembled it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ExamScoring {
    #[serde(default)]
    #[validate(range(min = 0.0, message = "max_score must be non-negative"))]
    pub max_score: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "passing_score must be non-negative"))]
    pub passing_score: Option<f64>,
}

impl ExamScoring {
    pub fn new(max_score: Option<f64>, passing_score: Option<f64>) -> Self {
        Self { max_score, passing_score }
    }

    /// Passing score the exam actually set. Zero and non-finite values count
    /// as unset; the caller picks the scale default.
    pub fn explicit_passing_score(&self) -> Option<f64> {
        self.passing_score.filter(|value| value.is_finite() && *value > 0.0)
    }
}
