use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::schemas::exam::ExamScoring;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    Standard,
    Utbk,
}

impl ScaleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScaleKind::Standard => "standard",
            ScaleKind::Utbk => "utbk",
        }
    }
}

/// Numeric range a final score is reported on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreScale {
    pub key: ScaleKind,
    pub min: f64,
    pub max: f64,
    pub label: &'static str,
}

impl ScoreScale {
    pub const STANDARD: ScoreScale =
        ScoreScale { key: ScaleKind::Standard, min: 0.0, max: 100.0, label: "0-100" };
    pub const UTBK: ScoreScale =
        ScoreScale { key: ScaleKind::Utbk, min: 10.0, max: 1000.0, label: "10-1000" };

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Passing score used when the exam does not set one.
    pub fn default_passing(&self) -> f64 {
        match self.key {
            ScaleKind::Standard => 60.0,
            ScaleKind::Utbk => 550.0,
        }
    }

    pub fn validate_passing(&self, passing: f64) -> Result<(), ScaleError> {
        if self.span() <= 0.0 {
            return Err(ScaleError::DegenerateScale { min: self.min, max: self.max });
        }
        if !passing.is_finite() || passing < self.min || passing > self.max {
            return Err(ScaleError::PassingScoreOutOfRange {
                passing,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("score scale {min}-{max} is degenerate")]
    DegenerateScale { min: f64, max: f64 },
    #[error("passing score {passing} is outside the scale {min}-{max}")]
    PassingScoreOutOfRange { passing: f64, min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::A => "Luar Biasa",
            Grade::B => "Baik",
            Grade::C => "Cukup",
            Grade::D => "Kurang",
            Grade::E => "Sangat Kurang",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Grade::A => "#10B981",
            Grade::B => "#3B82F6",
            Grade::C => "#F59E0B",
            Grade::D => "#EF4444",
            Grade::E => "#6B7280",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Pick a scale from whichever signals the caller has. Passing scores above
/// 100 or a max of at least 1000 mean UTBK; a max of at most 100 means
/// standard; failing both, a raw score above 100 means UTBK.
pub fn resolve_score_scale(
    max_score: Option<f64>,
    passing_score: Option<f64>,
    score: Option<f64>,
) -> ScoreScale {
    let max = present(max_score);
    let passing = present(passing_score);

    if passing.is_some_and(|p| p > 100.0) || max.is_some_and(|m| m >= 1000.0) {
        return ScoreScale::UTBK;
    }
    if max.is_some_and(|m| m <= 100.0) {
        return ScoreScale::STANDARD;
    }
    if present(score).is_some_and(|s| s > 100.0) {
        return ScoreScale::UTBK;
    }
    ScoreScale::STANDARD
}

/// Max score as stored on an exam: only 100 and 1000 exist.
pub fn normalized_max_score(raw_max: Option<f64>, passing_score: Option<f64>) -> f64 {
    if passing_score.is_some_and(|p| p.is_finite() && p > 100.0) {
        return 1000.0;
    }
    if raw_max.is_some_and(|m| m.is_finite() && m > 100.0) {
        return 1000.0;
    }
    100.0
}

pub fn scale_for_exam(exam: &ExamScoring) -> ScoreScale {
    let max = normalized_max_score(exam.max_score, exam.passing_score);
    resolve_score_scale(Some(max), exam.passing_score, None)
}

/// Linear map from a raw percentage onto `scale`, rounded to one decimal.
pub fn scale_to_score(percentage: f64, scale: &ScoreScale) -> f64 {
    let pct = if percentage.is_finite() { percentage.clamp(0.0, 100.0) } else { 0.0 };
    let raw = scale.min + (pct / 100.0) * scale.span();
    (raw * 10.0).round() / 10.0
}

/// Inverse of [`scale_to_score`], clamped to `[0, 100]`. Zero for a
/// degenerate scale.
pub fn score_to_percentage(score: f64, scale: &ScoreScale) -> f64 {
    let span = scale.span();
    if span <= 0.0 {
        return 0.0;
    }
    let value = if score.is_finite() { score } else { 0.0 };
    (((value - scale.min) / span) * 100.0).clamp(0.0, 100.0)
}

pub fn grade_from_percentage(percentage: f64) -> Grade {
    match percentage {
        p if p >= 90.0 => Grade::A,
        p if p >= 80.0 => Grade::B,
        p if p >= 70.0 => Grade::C,
        p if p >= 60.0 => Grade::D,
        _ => Grade::E,
    }
}

pub fn grade_from_score(score: f64, scale: &ScoreScale) -> Grade {
    grade_from_percentage(score_to_percentage(score, scale))
}

/// θ on the 200-800 reporting band used next to the ability percentile.
pub fn theta_to_scaled_score(theta: f64) -> u16 {
    if theta.is_nan() {
        return 500;
    }
    (500.0 + 100.0 * theta).clamp(200.0, 800.0).round() as u16
}
