use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::config::AnswerTokenPolicy;
use crate::schemas::attempt::{AttemptView, OptionRemap, QuestionView, StoredAnswer};
use crate::schemas::question::QuestionKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemapError {
    #[error("answer token '{token}' is not an option of question {question_id}")]
    InvalidAnswerToken { question_id: String, token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    ToCanonical,
    ToDisplay,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::ToCanonical => "to_canonical",
            Direction::ToDisplay => "to_display",
        }
    }

    fn lookup(self, remap: &OptionRemap, letter: char) -> Option<char> {
        match self {
            Direction::ToCanonical => remap.to_canonical(letter),
            Direction::ToDisplay => remap.to_display(letter),
        }
    }
}

/// Translates answers between what one student saw and what is stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerRemapper {
    policy: AnswerTokenPolicy,
}

impl AnswerRemapper {
    pub fn new(policy: AnswerTokenPolicy) -> Self {
        Self { policy }
    }

    /// Display-letter answer to the canonical form used for storage.
    pub fn to_canonical(&self, answer: &str, view: &QuestionView) -> Result<String, RemapError> {
        self.remap(answer, view, Direction::ToCanonical)
    }

    /// Stored canonical answer to the letters shown in `view`.
    pub fn to_display(&self, answer: &str, view: &QuestionView) -> Result<String, RemapError> {
        self.remap(answer, view, Direction::ToDisplay)
    }

    /// Stored answers of an in-progress attempt, keyed by question id, in the
    /// letters of the current view. Answers to questions outside the view
    /// are dropped.
    pub fn display_answers(
        &self,
        view: &AttemptView,
        answers: &[StoredAnswer],
    ) -> Result<BTreeMap<String, String>, RemapError> {
        let mut mapped = BTreeMap::new();
        for stored in answers {
            let Some(question) = view.question(&stored.question_id) else {
                continue;
            };
            mapped.insert(stored.question_id.clone(), self.to_display(&stored.answer, question)?);
        }
        Ok(mapped)
    }

    fn remap(
        &self,
        answer: &str,
        view: &QuestionView,
        direction: Direction,
    ) -> Result<String, RemapError> {
        let Some(remap) = &view.remap else {
            return Ok(answer.to_string());
        };

        metrics::counter!("answers_remapped_total", "direction" => direction.as_str()).increment(1);

        if view.kind == QuestionKind::MultiSelect {
            let mut letters = split_tokens(answer)
                .map(|token| self.map_token(token, remap, direction, &view.question_id))
                .collect::<Result<Vec<_>, _>>()?;
            letters.sort();
            letters.dedup();
            return Ok(letters.join(","));
        }

        let token = answer.trim();
        if token.is_empty() {
            return Ok(String::new());
        }
        self.map_token(token, remap, direction, &view.question_id)
    }

    fn map_token(
        &self,
        token: &str,
        remap: &OptionRemap,
        direction: Direction,
        question_id: &str,
    ) -> Result<String, RemapError> {
        let mut chars = token.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            if let Some(mapped) = direction.lookup(remap, letter) {
                return Ok(mapped.to_string());
            }
        }

        metrics::counter!("answer_tokens_unrecognized_total").increment(1);
        match self.policy {
            AnswerTokenPolicy::PassThrough => {
                tracing::warn!(
                    question_id,
                    token,
                    direction = direction.as_str(),
                    "Unrecognized answer token passed through"
                );
                Ok(token.to_string())
            }
            AnswerTokenPolicy::Strict => Err(RemapError::InvalidAnswerToken {
                question_id: question_id.to_string(),
                token: token.to_string(),
            }),
        }
    }
}

fn split_tokens(answer: &str) -> impl Iterator<Item = &str> {
    answer.split(',').map(str::trim).filter(|token| !token.is_empty())
}

/// Sorted, de-duplicated, comma-joined form of a multi-select answer, so
/// that `"C,A"` and `"A,C"` compare equal.
pub fn canonicalize_multi(answer: &str) -> String {
    let mut tokens: Vec<&str> = split_tokens(answer).collect();
    tokens.sort_unstable();
    tokens.dedup();
    tokens.join(",")
}
