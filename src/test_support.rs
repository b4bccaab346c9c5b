use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::schemas::question::{
    CanonicalQuestion, FixedOptions, ItemParameters, OptionSet, QuestionKind,
};

const ENGINE_ENV_VARS: &[&str] = &[
    "EXAM_ENGINE_ENV",
    "ENVIRONMENT",
    "EXAM_ENGINE_STRICT_CONFIG",
    "EXAM_ENGINE_LOG_LEVEL",
    "EXAM_ENGINE_LOG_JSON",
    "PROMETHEUS_TEXTFILE",
    "IRT_QUADRATURE_POINTS",
    "IRT_DEFAULT_DISCRIMINATION",
    "IRT_DEFAULT_DIFFICULTY",
    "IRT_DEFAULT_GUESSING",
    "IRT_ESTIMATOR",
    "ANSWER_TOKEN_POLICY",
    "EXAM_SEED_SECRET",
];

/// Serializes tests that touch process environment.
pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Mutex::new(()));
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn set_test_env() {
    for key in ENGINE_ENV_VARS {
        std::env::remove_var(key);
    }
    std::env::set_var("EXAM_ENGINE_ENV", "test");
}

pub(crate) fn four_option_question(
    id: &str,
    kind: QuestionKind,
    correct: &str,
) -> CanonicalQuestion {
    CanonicalQuestion::new(
        id,
        kind,
        format!("Soal {id}"),
        OptionSet::Fixed(FixedOptions {
            a: Some("opsi A".to_string()),
            b: Some("opsi B".to_string()),
            c: Some("opsi C".to_string()),
            d: Some("opsi D".to_string()),
            e: None,
        }),
        correct,
    )
}

pub(crate) fn true_false_question(id: &str, correct: &str) -> CanonicalQuestion {
    CanonicalQuestion::new(
        id,
        QuestionKind::TrueFalse,
        format!("Pernyataan {id}"),
        OptionSet::Fixed(FixedOptions {
            a: Some("Benar".to_string()),
            b: Some("Salah".to_string()),
            ..FixedOptions::default()
        }),
        correct,
    )
}

pub(crate) fn short_answer_question(id: &str, correct: &str) -> CanonicalQuestion {
    CanonicalQuestion::new(
        id,
        QuestionKind::ShortAnswer,
        format!("Isian {id}"),
        OptionSet::Dynamic(Vec::new()),
        correct,
    )
}

/// `size` questions with ids `q1..`, cycling through the auto-graded kinds
/// and spreading item difficulty over [-2, 2].
pub(crate) fn bank(size: usize) -> Vec<CanonicalQuestion> {
    (1..=size)
        .map(|n| {
            let id = format!("q{n}");
            let question = match n % 4 {
                0 => true_false_question(&id, "A"),
                1 => four_option_question(&id, QuestionKind::SingleChoice, "B"),
                2 => four_option_question(&id, QuestionKind::MultiSelect, "A,C"),
                _ => short_answer_question(&id, "Jakarta"),
            };
            let difficulty = -2.0 + 4.0 * (n as f64) / (size.max(1) as f64);
            question.with_item(ItemParameters {
                discrimination: Some(1.0 + (n % 3) as f64 * 0.25),
                difficulty: Some(difficulty),
                guessing: None,
            })
        })
        .collect()
}
