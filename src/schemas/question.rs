use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::schemas::deserialize_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[serde(alias = "multiple_choice")]
    SingleChoice,
    #[serde(alias = "multiple_choice_complex")]
    MultiSelect,
    TrueFalse,
    ShortAnswer,
    Essay,
}

impl QuestionKind {
    /// Kinds whose options are reordered per attempt.
    pub fn is_shuffled(self) -> bool {
        matches!(self, QuestionKind::SingleChoice | QuestionKind::MultiSelect)
    }
}

/// An option with its storage-level letter. The letter never changes once
/// assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOption {
    pub letter: char,
    pub text: String,
}

/// The two shapes options are stored in: five flat slots, or a free list of
/// entries. Stored labels on list entries are ignored; the letter is always
/// the entry's position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionSet {
    Dynamic(Vec<RawOption>),
    Fixed(FixedOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FixedOptions {
    #[serde(default, alias = "option_a")]
    pub a: Option<String>,
    #[serde(default, alias = "option_b")]
    pub b: Option<String>,
    #[serde(default, alias = "option_c")]
    pub c: Option<String>,
    #[serde(default, alias = "option_d")]
    pub d: Option<String>,
    #[serde(default, alias = "option_e")]
    pub e: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawOption {
    #[serde(default)]
    pub text: Option<String>,
}

/// Per-item 3PL parameters as authored. Unset fields fall back to the
/// configured defaults when the item is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemParameters {
    #[serde(default)]
    pub discrimination: Option<f64>,
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(default)]
    pub guessing: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CanonicalQuestion {
    #[serde(deserialize_with = "deserialize_id")]
    #[validate(length(min = 1, message = "question id must not be empty"))]
    pub id: String,
    #[serde(alias = "question_type")]
    pub kind: QuestionKind,
    #[serde(default, alias = "question_text")]
    pub prompt: String,
    #[serde(default, deserialize_with = "deserialize_option_set")]
    pub options: Vec<CanonicalOption>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(flatten)]
    pub item: ItemParameters,
}

/// Display letters run `A..=Z`.
pub fn letter_for_index(index: usize) -> Option<char> {
    u8::try_from(index).ok().filter(|value| *value < 26).map(|value| (b'A' + value) as char)
}

impl OptionSet {
    /// Collapse either shape into the single list the shuffle and remap code
    /// work on. Options without text are dropped.
    pub fn normalize(self) -> Vec<CanonicalOption> {
        match self {
            OptionSet::Fixed(fixed) => [fixed.a, fixed.b, fixed.c, fixed.d, fixed.e]
                .into_iter()
                .enumerate()
                .filter_map(|(index, text)| {
                    let text = text.filter(|value| !value.trim().is_empty())?;
                    Some(CanonicalOption { letter: letter_for_index(index)?, text })
                })
                .collect(),
            OptionSet::Dynamic(raw) => normalize_dynamic(raw),
        }
    }
}

fn normalize_dynamic(raw: Vec<RawOption>) -> Vec<CanonicalOption> {
    if raw.len() > 26 {
        tracing::warn!(count = raw.len(), "Dropping options beyond letter Z");
    }

    raw.into_iter()
        .enumerate()
        .filter_map(|(index, option)| {
            let text = option.text.filter(|value| !value.trim().is_empty())?;
            Some(CanonicalOption { letter: letter_for_index(index)?, text })
        })
        .collect()
}

fn deserialize_option_set<'de, D>(deserializer: D) -> Result<Vec<CanonicalOption>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<OptionSet>::deserialize(deserializer)?;
    Ok(raw.map(OptionSet::normalize).unwrap_or_default())
}

impl CanonicalQuestion {
    pub fn new(
        id: impl Into<String>,
        kind: QuestionKind,
        prompt: impl Into<String>,
        options: OptionSet,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            prompt: prompt.into(),
            options: options.normalize(),
            correct_answer: correct_answer.into(),
            item: ItemParameters::default(),
        }
    }

    pub fn with_item(mut self, item: ItemParameters) -> Self {
        self.item = item;
        self
    }

    pub fn letters(&self) -> Vec<char> {
        self.options.iter().map(|option| option.letter).collect()
    }

    pub fn option_text(&self, letter: char) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.letter == letter)
            .map(|option| option.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_options_skip_empty_slots() {
        let options = OptionSet::Fixed(FixedOptions {
            a: Some("Jakarta".to_string()),
            b: Some("Bandung".to_string()),
            c: Some("  ".to_string()),
            d: Some("Surabaya".to_string()),
            e: None,
        })
        .normalize();

        let letters: Vec<char> = options.iter().map(|option| option.letter).collect();
        assert_eq!(letters, vec!['A', 'B', 'D']);
        assert_eq!(options[2].text, "Surabaya");
    }

    #[test]
    fn dynamic_letters_follow_position_not_stored_label() {
        let options: OptionSet = serde_json::from_value(serde_json::json!([
            { "label": "B", "text": "two" },
            { "label": "A", "text": "one" },
            { "label": "C", "text": "  " },
            { "text": "four" }
        ]))
        .expect("dynamic options");

        let options = options.normalize();
        assert_eq!(options[0], CanonicalOption { letter: 'A', text: "two".to_string() });
        assert_eq!(options[1], CanonicalOption { letter: 'B', text: "one".to_string() });
        let letters: Vec<char> = options.iter().map(|option| option.letter).collect();
        assert_eq!(letters, vec!['A', 'B', 'D']);
    }

    #[test]
    fn letters_stop_at_z() {
        assert_eq!(letter_for_index(0), Some('A'));
        assert_eq!(letter_for_index(25), Some('Z'));
        assert_eq!(letter_for_index(26), None);
        assert_eq!(letter_for_index(1000), None);
    }

    #[test]
    fn deserializes_legacy_row_shape() {
        let question: CanonicalQuestion = serde_json::from_value(serde_json::json!({
            "id": 17,
            "question_type": "multiple_choice_complex",
            "question_text": "Pilih bilangan prima",
            "options": { "option_a": "2", "option_b": "4", "option_c": "5", "option_d": "" },
            "correct_answer": "A,C",
            "discrimination": 1.4
        }))
        .expect("legacy question");

        assert_eq!(question.id, "17");
        assert_eq!(question.kind, QuestionKind::MultiSelect);
        assert_eq!(question.letters(), vec!['A', 'B', 'C']);
        assert_eq!(question.item.discrimination, Some(1.4));
        assert_eq!(question.item.guessing, None);
    }

    #[test]
    fn deserializes_dynamic_list_shape() {
        let question: CanonicalQuestion = serde_json::from_value(serde_json::json!({
            "id": "q-1",
            "kind": "single_choice",
            "prompt": "2 + 2",
            "options": [{ "label": "A", "text": "3" }, { "label": "B", "text": "4" }],
            "correct_answer": "B"
        }))
        .expect("dynamic question");

        assert_eq!(question.option_text('B'), Some("4"));
        assert!(question.validate().is_ok());
    }

    #[test]
    fn empty_id_fails_validation() {
        let question = CanonicalQuestion::new(
            "",
            QuestionKind::Essay,
            "Jelaskan",
            OptionSet::Dynamic(Vec::new()),
            "",
        );
        assert!(question.validate().is_err());
    }
}
