use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::requests::{
    BuildViewRequest, BuildViewResponse, EstimateAbilityRequest, EstimateAbilityResponse,
    GradeRequest, RecordAnswerRequest, RecordAnswerResponse, ResolveScaleRequest,
    ResolveScaleResponse, ScoreRequest,
};
use crate::core::config::Settings;
use crate::schemas::question::CanonicalQuestion;
use crate::services::answer_remap::AnswerRemapper;
use crate::services::attempt_view::build_attempt_view;
use crate::services::grading::{
    compute_final_score, grade_attempt, is_correct, requires_manual_grading, AttemptResult,
    FinalScore,
};
use crate::services::irt::estimate_ability;
use crate::services::scoring::{
    grade_from_score, resolve_score_scale, scale_for_exam, score_to_percentage,
    theta_to_scaled_score,
};

pub(crate) fn build_view(
    settings: &Settings,
    payload: BuildViewRequest,
) -> Result<BuildViewResponse, ApiError> {
    payload.validate()?;

    let view = build_attempt_view(
        &payload.questions,
        &payload.seed,
        &settings.seed_namespace(),
        payload.question_limit,
    );
    let remapper = AnswerRemapper::new(settings.answers().token_policy);
    let answers = remapper.display_answers(&view, &payload.stored_answers)?;

    Ok(BuildViewResponse { questions: view.questions, answers })
}

pub(crate) fn record_answer(
    settings: &Settings,
    payload: RecordAnswerRequest,
) -> Result<RecordAnswerResponse, ApiError> {
    payload.validate()?;

    let view = build_attempt_view(
        &payload.questions,
        &payload.seed,
        &settings.seed_namespace(),
        payload.question_limit,
    );
    let question_view = view
        .question(&payload.question_id)
        .ok_or_else(|| ApiError::NotFound("Question not found in this attempt".to_string()))?;
    let question = find_question(&payload.questions, &payload.question_id)?;

    let remapper = AnswerRemapper::new(settings.answers().token_policy);
    let answer = remapper.to_canonical(&payload.answer, question_view)?;

    Ok(RecordAnswerResponse {
        question_id: question.id.clone(),
        is_correct: is_correct(question.kind, &answer, &question.correct_answer),
        requires_manual_grading: requires_manual_grading(question.kind),
        answer,
    })
}

pub(crate) fn grade(settings: &Settings, payload: GradeRequest) -> Result<AttemptResult, ApiError> {
    payload.validate()?;
    Ok(grade_attempt(&payload.questions, &payload.answers, &payload.exam, settings.irt()))
}

pub(crate) fn ability(
    settings: &Settings,
    payload: EstimateAbilityRequest,
) -> Result<EstimateAbilityResponse, ApiError> {
    if !payload.items.is_empty() && payload.items.len() != payload.responses.len() {
        return Err(ApiError::Unprocessable(format!(
            "Expected {} item parameter sets, got {}",
            payload.responses.len(),
            payload.items.len()
        )));
    }

    let items = if payload.items.is_empty() {
        vec![Default::default(); payload.responses.len()]
    } else {
        payload.items
    };
    let estimate = estimate_ability(&payload.responses, &items, settings.irt());

    Ok(EstimateAbilityResponse { ability_scaled: theta_to_scaled_score(estimate.theta), estimate })
}

pub(crate) fn score(payload: ScoreRequest) -> Result<FinalScore, ApiError> {
    payload.validate()?;
    if payload.correct > payload.total {
        return Err(ApiError::Unprocessable(format!(
            "correct ({}) exceeds total ({})",
            payload.correct, payload.total
        )));
    }
    if let Some(passing) = payload.exam.passing_score {
        scale_for_exam(&payload.exam).validate_passing(passing)?;
    }
    Ok(compute_final_score(payload.correct, payload.total, &payload.exam))
}

pub(crate) fn resolve_scale(payload: ResolveScaleRequest) -> ResolveScaleResponse {
    let score_scale =
        resolve_score_scale(payload.max_score, payload.passing_score, payload.score);
    let percentage = payload.score.map(|score| score_to_percentage(score, &score_scale));
    let grade = payload.score.map(|score| grade_from_score(score, &score_scale));
    ResolveScaleResponse { score_scale, percentage, grade }
}

fn find_question<'a>(
    questions: &'a [CanonicalQuestion],
    question_id: &str,
) -> Result<&'a CanonicalQuestion, ApiError> {
    questions
        .iter()
        .find(|question| question.id == question_id)
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}
