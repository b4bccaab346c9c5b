use std::collections::HashMap;

use serde::Serialize;

use crate::core::config::IrtSettings;
use crate::schemas::attempt::StoredAnswer;
use crate::schemas::exam::ExamScoring;
use crate::schemas::question::{CanonicalQuestion, ItemParameters, QuestionKind};
use crate::services::answer_remap::canonicalize_multi;
use crate::services::irt::{estimate_ability, AbilityEstimate};
use crate::services::scoring::{
    grade_from_score, scale_for_exam, scale_to_score, theta_to_scaled_score, Grade, ScoreScale,
};

/// Whether a stored canonical answer matches the key. Essays and empty
/// answers are never correct.
pub fn is_correct(kind: QuestionKind, answer: &str, correct_answer: &str) -> bool {
    let answer = answer.trim();
    if answer.is_empty() {
        return false;
    }
    match kind {
        QuestionKind::SingleChoice | QuestionKind::TrueFalse => answer == correct_answer.trim(),
        QuestionKind::MultiSelect => {
            let selected = canonicalize_multi(answer);
            !selected.is_empty() && selected == canonicalize_multi(correct_answer)
        }
        QuestionKind::ShortAnswer => {
            answer.to_lowercase() == correct_answer.trim().to_lowercase()
        }
        QuestionKind::Essay => false,
    }
}

pub fn requires_manual_grading(kind: QuestionKind) -> bool {
    kind == QuestionKind::Essay
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub kind: QuestionKind,
    pub answer: String,
    pub is_correct: bool,
    pub requires_manual_grading: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalScore {
    pub raw_percentage: f64,
    pub score: f64,
    pub grade: Grade,
    pub grade_label: &'static str,
    pub passed: bool,
    pub passing_score: f64,
    pub score_scale: ScoreScale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptResult {
    pub correct: usize,
    pub total: usize,
    #[serde(flatten)]
    pub final_score: FinalScore,
    pub ability: AbilityEstimate,
    pub ability_scaled: u16,
    pub questions: Vec<QuestionOutcome>,
}

pub fn compute_final_score(correct: usize, total: usize, exam: &ExamScoring) -> FinalScore {
    let raw_percentage =
        if total > 0 { (correct.min(total) as f64 * 100.0) / total as f64 } else { 0.0 };
    let score_scale = scale_for_exam(exam);
    let score = scale_to_score(raw_percentage, &score_scale);
    let grade = grade_from_score(score, &score_scale);
    let passing_score =
        exam.explicit_passing_score().unwrap_or_else(|| score_scale.default_passing());

    FinalScore {
        raw_percentage,
        score,
        grade,
        grade_label: grade.label(),
        passed: score >= passing_score,
        passing_score,
        score_scale,
    }
}

/// Grade a submitted attempt. Only answered questions count towards the
/// total; answers to questions outside `questions` are ignored, and a
/// repeated answer replaces the earlier one.
pub fn grade_attempt(
    questions: &[CanonicalQuestion],
    answers: &[StoredAnswer],
    exam: &ExamScoring,
    irt: &IrtSettings,
) -> AttemptResult {
    let latest: HashMap<&str, &str> = answers
        .iter()
        .map(|stored| (stored.question_id.as_str(), stored.answer.as_str()))
        .collect();

    let known = questions.iter().filter(|q| latest.contains_key(q.id.as_str())).count();
    if known < latest.len() {
        tracing::debug!(ignored = latest.len() - known, "Ignoring answers to unknown questions");
    }

    let mut outcomes = Vec::with_capacity(known);
    let mut items: Vec<ItemParameters> = Vec::with_capacity(known);
    for question in questions {
        let Some(answer) = latest.get(question.id.as_str()) else {
            continue;
        };
        outcomes.push(QuestionOutcome {
            question_id: question.id.clone(),
            kind: question.kind,
            answer: answer.to_string(),
            is_correct: is_correct(question.kind, answer, &question.correct_answer),
            requires_manual_grading: requires_manual_grading(question.kind),
        });
        items.push(question.item);
    }

    let responses: Vec<bool> = outcomes.iter().map(|outcome| outcome.is_correct).collect();
    let correct = responses.iter().filter(|hit| **hit).count();
    let total = outcomes.len();

    let final_score = compute_final_score(correct, total, exam);
    let ability = estimate_ability(&responses, &items, irt);

    tracing::info!(
        correct,
        total,
        score = final_score.score,
        grade = %final_score.grade,
        passed = final_score.passed,
        scale = final_score.score_scale.key.as_str(),
        theta = ability.theta,
        "Attempt graded"
    );
    metrics::counter!("attempts_graded_total", "scale" => final_score.score_scale.key.as_str())
        .increment(1);

    AttemptResult {
        correct,
        total,
        ability_scaled: theta_to_scaled_score(ability.theta),
        final_score,
        ability,
        questions: outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scoring::ScaleKind;
    use crate::test_support::{four_option_question, short_answer_question};

    fn ten_single_choice() -> Vec<CanonicalQuestion> {
        (1..=10)
            .map(|id| four_option_question(&id.to_string(), QuestionKind::SingleChoice, "B"))
            .collect()
    }

    fn answers_with_hits(hits: usize) -> Vec<StoredAnswer> {
        (1..=10)
            .map(|id| StoredAnswer::new(id.to_string(), if id <= hits { "B" } else { "A" }))
            .collect()
    }

    #[test]
    fn correctness_per_kind() {
        assert!(is_correct(QuestionKind::SingleChoice, " B ", "B"));
        assert!(!is_correct(QuestionKind::SingleChoice, "b", "B"));
        assert!(is_correct(QuestionKind::MultiSelect, "C,A", "A,C"));
        assert!(!is_correct(QuestionKind::MultiSelect, "A", "A,C"));
        assert!(!is_correct(QuestionKind::MultiSelect, ",", ""));
        assert!(is_correct(QuestionKind::ShortAnswer, "  jakarta", "Jakarta "));
        assert!(is_correct(QuestionKind::TrueFalse, "A", "A"));
        assert!(!is_correct(QuestionKind::Essay, "panjang", "panjang"));
        assert!(!is_correct(QuestionKind::SingleChoice, "", ""));
    }

    #[test]
    fn standard_scale_attempt() {
        let exam = ExamScoring::new(Some(100.0), Some(60.0));
        let result = grade_attempt(
            &ten_single_choice(),
            &answers_with_hits(7),
            &exam,
            &IrtSettings::default(),
        );

        assert_eq!((result.correct, result.total), (7, 10));
        assert_eq!(result.final_score.raw_percentage, 70.0);
        assert_eq!(result.final_score.score, 70.0);
        assert_eq!(result.final_score.grade, Grade::C);
        assert!(result.final_score.passed);
        assert_eq!(result.final_score.score_scale.key, ScaleKind::Standard);
        assert!(result.ability.theta > 0.0);
    }

    #[test]
    fn utbk_scale_attempt() {
        let exam = ExamScoring::new(Some(1000.0), Some(550.0));
        let result = grade_attempt(
            &ten_single_choice(),
            &answers_with_hits(4),
            &exam,
            &IrtSettings::default(),
        );

        assert_eq!(result.final_score.score, 406.0);
        assert_eq!(result.final_score.grade, Grade::E);
        assert!(!result.final_score.passed);
        assert_eq!(result.final_score.score_scale.key, ScaleKind::Utbk);
    }

    #[test]
    fn empty_attempt_is_neutral() {
        let result = grade_attempt(
            &ten_single_choice(),
            &[],
            &ExamScoring::default(),
            &IrtSettings::default(),
        );
        assert_eq!(result.total, 0);
        assert_eq!(result.final_score.score, 0.0);
        assert!(!result.final_score.passed);
        assert_eq!(result.ability.theta, 0.0);
        assert_eq!(result.ability.percentile, 50);
        assert_eq!(result.ability_scaled, 500);
    }

    #[test]
    fn unknown_and_repeated_answers() {
        let questions = vec![
            four_option_question("1", QuestionKind::SingleChoice, "B"),
            short_answer_question("2", "Bandung"),
        ];
        let answers = vec![
            StoredAnswer::new("1", "A"),
            StoredAnswer::new("1", "B"),
            StoredAnswer::new("99", "C"),
            StoredAnswer::new("2", "bandung"),
        ];
        let result = grade_attempt(
            &questions,
            &answers,
            &ExamScoring::default(),
            &IrtSettings::default(),
        );

        assert_eq!((result.correct, result.total), (2, 2));
        assert_eq!(result.questions[0].answer, "B");
        assert_eq!(result.final_score.score, 100.0);
        assert_eq!(result.final_score.grade, Grade::A);
    }

    #[test]
    fn passing_default_follows_scale() {
        let score = compute_final_score(6, 10, &ExamScoring::new(Some(100.0), None));
        assert_eq!(score.passing_score, 60.0);
        assert!(score.passed);
        assert!(!compute_final_score(5, 10, &ExamScoring::default()).passed);

        let utbk = compute_final_score(2, 20, &ExamScoring::new(Some(1000.0), None));
        assert_eq!(utbk.score, 109.0);
        assert_eq!(utbk.passing_score, 550.0);
        assert!(!utbk.passed);

        let utbk = compute_final_score(6, 10, &ExamScoring::new(Some(1000.0), Some(0.0)));
        assert_eq!(utbk.passing_score, 550.0);
        assert!(utbk.passed);
    }

    #[test]
    fn result_serializes_flat() {
        let result = grade_attempt(
            &ten_single_choice(),
            &answers_with_hits(9),
            &ExamScoring::default(),
            &IrtSettings::default(),
        );
        let json = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(json["score"], 90.0);
        assert_eq!(json["grade"], "A");
        assert_eq!(json["score_scale"]["key"], "standard");
        assert_eq!(json["ability"]["estimator"], "eap");
        assert_eq!(json["questions"].as_array().map(Vec::len), Some(10));
    }
}
