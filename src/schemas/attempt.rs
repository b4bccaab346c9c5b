use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schemas::deserialize_id;
use crate::schemas::question::QuestionKind;

/// The identifiers a shuffle is derived from. Seeds are rebuilt from these on
/// every request and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct AttemptSeed {
    #[serde(deserialize_with = "deserialize_id")]
    #[validate(length(min = 1, message = "exam_id must not be empty"))]
    pub exam_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    #[validate(length(min = 1, message = "attempt_id must not be empty"))]
    pub attempt_id: String,
    #[serde(deserialize_with = "deserialize_id", alias = "user_id")]
    #[validate(length(min = 1, message = "student_id must not be empty"))]
    pub student_id: String,
}

impl AttemptSeed {
    pub fn new(
        exam_id: impl Into<String>,
        attempt_id: impl Into<String>,
        student_id: impl Into<String>,
    ) -> Self {
        Self {
            exam_id: exam_id.into(),
            attempt_id: attempt_id.into(),
            student_id: student_id.into(),
        }
    }

    /// Seed for the order of the whole question list.
    pub fn question_order(&self) -> String {
        format!("exam:{}:attempt:{}:user:{}", self.exam_id, self.attempt_id, self.student_id)
    }

    /// Seed for the option order of one question.
    pub fn question(&self, question_id: &str) -> String {
        format!("exam:{}:attempt:{}:question:{}", self.exam_id, self.attempt_id, question_id)
    }
}

/// Optional server-side secret mixed into every seed. Without one, seeds are
/// exactly the composed identifier strings.
#[derive(Debug, Clone, Default)]
pub struct SeedNamespace {
    secret: Option<String>,
}

impl SeedNamespace {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret: secret.filter(|value| !value.is_empty()) }
    }

    pub fn is_keyed(&self) -> bool {
        self.secret.is_some()
    }

    pub fn apply(&self, seed: String) -> String {
        match &self.secret {
            Some(secret) => format!("{secret}:{seed}"),
            None => seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayOption {
    pub letter: char,
    pub text: String,
}

/// Display letter <-> canonical letter tables for one question in one
/// attempt. Serialized with the view so the caller can keep them alongside
/// the attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionRemap {
    display_to_canonical: BTreeMap<char, char>,
    canonical_to_display: BTreeMap<char, char>,
}

impl OptionRemap {
    /// Builds both tables from `(display, canonical)` pairs.
    pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (char, char)>) -> Self {
        let mut remap = Self::default();
        for (display, canonical) in pairs {
            remap.display_to_canonical.insert(display, canonical);
            remap.canonical_to_display.insert(canonical, display);
        }
        remap
    }

    pub fn to_canonical(&self, display: char) -> Option<char> {
        self.display_to_canonical.get(&display).copied()
    }

    pub fn to_display(&self, canonical: char) -> Option<char> {
        self.canonical_to_display.get(&canonical).copied()
    }
}

/// The student-facing form of one question. Remapped kinds carry their
/// letter tables inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub question_id: String,
    pub kind: QuestionKind,
    pub position: usize,
    pub prompt: String,
    pub options: Vec<DisplayOption>,
    #[serde(flatten)]
    pub remap: Option<OptionRemap>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptView {
    pub questions: Vec<QuestionView>,
}

impl AttemptView {
    pub fn question(&self, question_id: &str) -> Option<&QuestionView> {
        self.questions.iter().find(|view| view.question_id == question_id)
    }
}

/// A canonical answer as the collaborator stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAnswer {
    #[serde(deserialize_with = "deserialize_id")]
    pub question_id: String,
    #[serde(default, alias = "selected_answer")]
    pub answer: String,
}

impl StoredAnswer {
    pub fn new(question_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question_id: question_id.into(), answer: answer.into() }
    }
}
