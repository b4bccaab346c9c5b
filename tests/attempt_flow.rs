use exam_engine::api::handle_request;
use exam_engine::core::config::Settings;
use serde_json::{json, Value};

fn bank() -> Value {
    let mut questions: Vec<Value> = (1..=8u8)
        .map(|id| {
            let discrimination = 1.0 + f64::from(id) / 10.0;
            let difficulty = -1.0 + f64::from(id) / 4.0;
            json!({
                "id": id,
                "question_type": "multiple_choice",
                "question_text": format!("Soal {id}"),
                "options": {
                    "option_a": "satu",
                    "option_b": "dua",
                    "option_c": "tiga",
                    "option_d": "empat",
                    "option_e": "lima"
                },
                "correct_answer": "C",
                "discrimination": discrimination,
                "difficulty": difficulty
            })
        })
        .collect();
    questions.push(json!({
        "id": 9,
        "question_type": "multiple_choice_complex",
        "question_text": "Pilih bilangan genap",
        "options": [
            { "label": "A", "text": "2" },
            { "label": "B", "text": "3" },
            { "label": "C", "text": "4" },
            { "label": "D", "text": "5" }
        ],
        "correct_answer": "A,C"
    }));
    questions.push(json!({
        "id": 10,
        "question_type": "essay",
        "question_text": "Jelaskan fotosintesis"
    }));
    Value::Array(questions)
}

fn seed() -> Value {
    json!({ "exam_id": 3, "attempt_id": 12, "user_id": 77 })
}

fn call(request: Value) -> Value {
    let response = handle_request(&request.to_string(), &Settings::default());
    assert_eq!(response.status, 200, "unexpected error: {}", response.body);
    response.body
}

/// Display letter of the option whose text is `canonical_text`.
fn display_letter_for(view: &Value, canonical_text: &str) -> String {
    view["options"]
        .as_array()
        .expect("options")
        .iter()
        .find(|option| option["text"] == canonical_text)
        .and_then(|option| option["letter"].as_str())
        .expect("option present")
        .to_string()
}

#[test]
fn attempt_round_trip_through_the_request_boundary() {
    let view = call(json!({ "action": "build_view", "questions": bank(), "seed": seed() }));
    let questions = view["questions"].as_array().expect("questions").clone();
    assert_eq!(questions.len(), 10);

    let reload = call(json!({ "action": "build_view", "questions": bank(), "seed": seed() }));
    assert_eq!(reload["questions"], view["questions"]);

    let mut stored = Vec::new();
    for question in &questions {
        let id = question["question_id"].as_str().expect("id").to_string();
        let answer = match question["kind"].as_str().expect("kind") {
            "single_choice" => display_letter_for(question, "tiga"),
            "multi_select" => {
                let mut picks =
                    vec![display_letter_for(question, "4"), display_letter_for(question, "2")];
                picks.sort();
                picks.join(",")
            }
            _ => "Cahaya diubah menjadi energi kimia".to_string(),
        };

        let recorded = call(json!({
            "action": "record_answer",
            "questions": bank(),
            "seed": seed(),
            "question_id": id,
            "answer": answer
        }));
        stored.push(json!({ "question_id": id, "answer": recorded["answer"] }));
    }

    let graded = call(json!({
        "action": "grade",
        "questions": bank(),
        "answers": stored,
        "exam": { "max_score": 100, "passing_score": 60 }
    }));

    assert_eq!(graded["correct"], 9);
    assert_eq!(graded["total"], 10);
    assert_eq!(graded["score"], 90.0);
    assert_eq!(graded["grade"], "A");
    assert_eq!(graded["passed"], true);
    let essay = graded["questions"]
        .as_array()
        .expect("outcomes")
        .iter()
        .find(|outcome| outcome["kind"] == "essay")
        .cloned()
        .expect("essay outcome");
    assert_eq!(essay["requires_manual_grading"], true);
    assert_eq!(essay["is_correct"], false);
}

#[test]
fn reload_restores_answers_in_display_letters() {
    let stored = json!([{ "question_id": 9, "answer": "A,C" }]);
    let view = call(json!({
        "action": "build_view",
        "questions": bank(),
        "seed": seed(),
        "stored_answers": stored
    }));

    let multi = view["questions"]
        .as_array()
        .expect("questions")
        .iter()
        .find(|question| question["question_id"] == "9")
        .cloned()
        .expect("multi-select question");
    let mut expected = vec![display_letter_for(&multi, "2"), display_letter_for(&multi, "4")];
    expected.sort();
    assert_eq!(view["answers"]["9"], expected.join(","));
}

#[test]
fn question_limit_draws_a_per_attempt_sample() {
    let mut seen = std::collections::BTreeSet::new();
    for attempt in 1..=10 {
        let view = call(json!({
            "action": "build_view",
            "questions": bank(),
            "seed": { "exam_id": 3, "attempt_id": attempt, "user_id": 77 },
            "question_limit": 3
        }));
        let questions = view["questions"].as_array().expect("questions");
        assert_eq!(questions.len(), 3);
        for question in questions {
            seen.insert(question["question_id"].as_str().expect("id").to_string());
        }
    }
    assert!(seen.len() > 3);
}

#[test]
fn answering_a_question_outside_the_sample_is_not_found() {
    let view = call(json!({
        "action": "build_view",
        "questions": bank(),
        "seed": seed(),
        "question_limit": 2
    }));
    let shown: Vec<&str> = view["questions"]
        .as_array()
        .expect("questions")
        .iter()
        .filter_map(|question| question["question_id"].as_str())
        .collect();
    let hidden = (1..=10)
        .map(|id| id.to_string())
        .find(|id| !shown.contains(&id.as_str()))
        .expect("a hidden question");

    let response = handle_request(
        &json!({
            "action": "record_answer",
            "questions": bank(),
            "seed": seed(),
            "question_limit": 2,
            "question_id": hidden,
            "answer": "A"
        })
        .to_string(),
        &Settings::default(),
    );
    assert_eq!(response.status, 404);
}

#[test]
fn utbk_exam_scores_on_the_wide_scale() {
    let scored = call(json!({
        "action": "score",
        "correct": 4,
        "total": 10,
        "exam": { "max_score": 1000, "passing_score": 550 }
    }));
    assert_eq!(scored["score"], 406.0);
    assert_eq!(scored["grade"], "E");
    assert_eq!(scored["passed"], false);
    assert_eq!(scored["score_scale"]["key"], "utbk");
}

#[test]
fn empty_responses_estimate_to_the_median() {
    let estimate = call(json!({ "action": "estimate_ability", "responses": [], "items": [] }));
    assert_eq!(estimate["theta"], 0.0);
    assert_eq!(estimate["percentile"], 50);
}
