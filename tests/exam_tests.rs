// tests/exam_tests.rs

use campus_portal::{
    config::Config,
    models::exam::{AnswerEntry, OptionLetter, SubmitQuizRequest},
    quiz::{
        ExamSession, HttpExamClient, ScoringClient, Student, SubmitOutcome, TickEvent,
    },
    routes,
    state::AppState,
    utils::jwt::{ADMIN_ROLE, sign_jwt},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

const SECRET: &str = "test_secret_for_integration_tests";

async fn spawn_app() -> String {
    let config = Config {
        database_url: None,
        jwt_secret: SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        seed_exams: None,
    };
    let state = AppState::in_memory(config).expect("Failed to build state");
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

fn admin_token() -> String {
    sign_jwt("placement-admin", ADMIN_ROLE, SECRET, 600).unwrap()
}

fn question(text: &str, answer: &str) -> Value {
    json!({
        "text": text,
        "options": { "A": "one", "B": "two", "C": "three", "D": "four" },
        "answer": answer
    })
}

/// Creates a two-question, one-minute exam whose keys are B and C.
async fn create_exam(client: &reqwest::Client, address: &str) -> i64 {
    let response = client
        .post(format!("{}/api/exams", address))
        .bearer_auth(admin_token())
        .json(&json!({
            "name": "Aptitude round",
            "durationMinutes": 1,
            "questions": [question("1 + 1 = ?", "B"), question("1 + 2 = ?", "C")]
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    body["data"]["id"].as_i64().expect("Exam id not found")
}

fn submission(exam_id: i64, answers: &[Option<OptionLetter>]) -> SubmitQuizRequest {
    let started_at = Utc::now() - Duration::seconds(30);
    SubmitQuizRequest {
        exam_id,
        student_name: "Asha Rao".to_string(),
        usn: "1ab21cs001".to_string(),
        answers: answers
            .iter()
            .map(|a| AnswerEntry { selected_option: *a })
            .collect(),
        started_at,
        submitted_at: Utc::now(),
    }
}

#[tokio::test]
async fn public_exam_hides_answer_keys() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let id = create_exam(&client, &address).await;

    let body: Value = client
        .get(format!("{}/api/exams/{}", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let questions = body["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for q in questions {
        assert!(q.get("answer").is_none());
        assert_eq!(q["options"]["A"], "one");
    }

    let list: Value = client
        .get(format!("{}/api/exams", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["data"][0]["questionCount"], 2);
    assert!(list["data"][0].get("questions").is_none());
}

#[tokio::test]
async fn create_exam_rejects_incomplete_questions() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/exams", address))
        .bearer_auth(admin_token())
        .json(&json!({
            "name": "Broken",
            "durationMinutes": 10,
            "questions": [{ "text": "Pick one", "options": { "A": "x", "B": "y" }, "answer": "A" }]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "questions[0].options");
}

#[tokio::test]
async fn session_auto_submits_when_time_runs_out() {
    let address = spawn_app().await;
    let http = reqwest::Client::new();
    let id = create_exam(&http, &address).await;

    let client = HttpExamClient::new(address.as_str());
    let exam = client.fetch_exam(id).await.expect("Failed to fetch exam");
    let student = Student {
        name: "Asha Rao".to_string(),
        usn: "1ab21cs001".to_string(),
    };
    let mut session = ExamSession::new(exam, student, Utc::now());
    session.select(0, OptionLetter::B);

    let mut payload = None;
    for _ in 0..60 {
        if let Some(TickEvent::AutoSubmit(p)) = session.tick(Utc::now()) {
            assert!(payload.is_none(), "auto-submit fired twice");
            payload = Some(p);
        }
    }
    let payload = payload.expect("timer never expired");
    assert_eq!(
        payload.answers,
        vec![
            AnswerEntry { selected_option: Some(OptionLetter::B) },
            AnswerEntry { selected_option: None },
        ]
    );

    let result = client.submit(&payload).await;
    let outcome = session.finish_submit(result).expect("no submission in flight");
    let SubmitOutcome::Completed(score) = outcome else {
        panic!("submission failed: {:?}", outcome);
    };
    assert_eq!(score.score, 1);
    assert_eq!(score.total_questions, 2);

    let results: Value = http
        .get(format!("{}/api/exams/{}/results", address, id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results["count"], 1);
    assert_eq!(results["data"][0]["usn"], "1AB21CS001");
    assert_eq!(results["data"][0]["score"], 1);
}

#[tokio::test]
async fn submit_to_unknown_exam_surfaces_server_message() {
    let address = spawn_app().await;
    let client = HttpExamClient::new(address.as_str());

    let err = client
        .submit(&submission(999_999, &[Some(OptionLetter::A)]))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Exam not found");
}

#[tokio::test]
async fn submit_rejects_extra_answers_and_time_travel() {
    let address = spawn_app().await;
    let http = reqwest::Client::new();
    let id = create_exam(&http, &address).await;
    let url = format!("{}/api/exams/submit-quiz", address);

    let too_many = submission(id, &[None, None, None]);
    let response = http.post(&url).json(&too_many).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let mut backwards = submission(id, &[Some(OptionLetter::B)]);
    backwards.submitted_at = backwards.started_at - Duration::seconds(1);
    let response = http.post(&url).json(&backwards).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // fewer answers than questions count the rest as wrong
    let short = submission(id, &[Some(OptionLetter::B)]);
    let body: Value = http.post(&url).json(&short).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["data"], json!({ "score": 1, "totalQuestions": 2 }));
}

#[tokio::test]
async fn results_and_delete_are_admin_only() {
    let address = spawn_app().await;
    let http = reqwest::Client::new();
    let id = create_exam(&http, &address).await;

    let response = http
        .get(format!("{}/api/exams/{}/results", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = http
        .delete(format!("{}/api/exams/{}", address, id))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = http
        .get(format!("{}/api/exams/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn malformed_submission_gets_a_json_400() {
    let address = spawn_app().await;
    let http = reqwest::Client::new();
    let id = create_exam(&http, &address).await;

    let mut body = serde_json::to_value(submission(id, &[Some(OptionLetter::B)])).unwrap();
    body["examId"] = Value::Null;
    let response = http
        .post(format!("{}/api/exams/submit-quiz", address))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());

    // the client surfaces the server's own text
    let client = HttpExamClient::new(address.as_str());
    let mut blank_usn = submission(id, &[None]);
    blank_usn.usn = String::new();
    let err = client.submit(&blank_usn).await.unwrap_err();
    assert_eq!(err.user_message(), "Validation failed");
}
