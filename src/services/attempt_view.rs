use crate::core::telemetry::seed_fingerprint;
use crate::schemas::attempt::{
    AttemptSeed, AttemptView, DisplayOption, OptionRemap, QuestionView, SeedNamespace,
};
use crate::schemas::question::{letter_for_index, CanonicalQuestion};
use crate::services::shuffle::shuffle_deterministic;

/// Student-facing form of one question. Single-choice and multi-select
/// options are reordered by `seed` and relabelled `A, B, C, ...`; every other
/// kind is shown exactly as stored.
pub fn build_question_view(
    question: &CanonicalQuestion,
    seed: &str,
    position: usize,
) -> QuestionView {
    if !question.kind.is_shuffled() {
        return QuestionView {
            question_id: question.id.clone(),
            kind: question.kind,
            position,
            prompt: question.prompt.clone(),
            options: question
                .options
                .iter()
                .map(|option| DisplayOption { letter: option.letter, text: option.text.clone() })
                .collect(),
            remap: None,
        };
    }

    let shuffled = shuffle_deterministic(&question.letters(), seed);

    let mut options = Vec::with_capacity(shuffled.len());
    let mut pairs = Vec::with_capacity(shuffled.len());
    for (index, canonical) in shuffled.into_iter().enumerate() {
        let Some(display) = letter_for_index(index) else { break };
        let Some(text) = question.option_text(canonical) else { continue };
        options.push(DisplayOption { letter: display, text: text.to_string() });
        pairs.push((display, canonical));
    }

    QuestionView {
        question_id: question.id.clone(),
        kind: question.kind,
        position,
        prompt: question.prompt.clone(),
        options,
        remap: Some(OptionRemap::from_pairs(pairs)),
    }
}

/// Attempt-wide question order. The limit is applied after shuffling, so
/// each attempt draws its own sample from the whole bank.
pub fn order_questions<'a>(
    questions: &'a [CanonicalQuestion],
    seed: &str,
    question_limit: Option<u32>,
) -> Vec<&'a CanonicalQuestion> {
    let refs: Vec<&CanonicalQuestion> = questions.iter().collect();
    let mut ordered = shuffle_deterministic(&refs, seed);
    if let Some(limit) = question_limit.filter(|limit| *limit > 0) {
        ordered.truncate(limit as usize);
    }
    ordered
}

pub fn build_attempt_view(
    questions: &[CanonicalQuestion],
    seed: &AttemptSeed,
    namespace: &SeedNamespace,
    question_limit: Option<u32>,
) -> AttemptView {
    let order_seed = namespace.apply(seed.question_order());
    let ordered = order_questions(questions, &order_seed, question_limit);

    let views: Vec<QuestionView> = ordered
        .into_iter()
        .enumerate()
        .map(|(index, question)| {
            let question_seed = namespace.apply(seed.question(&question.id));
            build_question_view(question, &question_seed, index + 1)
        })
        .collect();

    tracing::debug!(
        seed = %seed_fingerprint(&order_seed),
        bank_size = questions.len(),
        shown = views.len(),
        "Built attempt view"
    );
    metrics::counter!("attempt_views_built_total").increment(1);

    AttemptView { questions: views }
}
