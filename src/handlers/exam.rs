// src/handlers/exam.rs

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::exam::{CreateExamRequest, ExamSummary, NewQuizResult, SubmitQuizRequest, score_answers},
    repo::{ExamStore, StorageError},
    utils::jwt::AdminUser,
};

fn exam_not_found() -> AppError {
    AppError::NotFound("Exam not found".to_string())
}

/// Lists available exams without their questions.
pub async fn list_exams(State(exams): State<ExamStore>) -> Result<impl IntoResponse, AppError> {
    let summaries: Vec<ExamSummary> = exams
        .list_exams()
        .await
        .map_err(|e| {
            tracing::error!("Failed to list exams: {:?}", e);
            AppError::from(e)
        })?
        .iter()
        .map(|exam| exam.summary())
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": summaries.len(),
        "data": summaries
    })))
}

/// Returns an exam for taking: questions and options, never the answer keys.
pub async fn get_exam(
    State(exams): State<ExamStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = exams.get_exam(id).await?.ok_or_else(exam_not_found)?;

    Ok(Json(json!({ "success": true, "data": exam.to_public() })))
}

/// Scores a submitted attempt and records the result.
///
/// * `answers` is the ordered list the client built, one entry per question.
/// * Correctness is decided here; the client never sees the key.
pub async fn submit_quiz(
    State(exams): State<ExamStore>,
    req: Result<Json<SubmitQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = req?;
    req.validate()?;

    if req.submitted_at < req.started_at {
        return Err(AppError::BadRequest(
            "submittedAt cannot be earlier than startedAt".to_string(),
        ));
    }

    let exam = exams
        .get_exam(req.exam_id)
        .await?
        .ok_or_else(exam_not_found)?;

    if req.answers.len() > exam.questions.len() {
        return Err(AppError::BadRequest(format!(
            "Expected at most {} answers, got {}",
            exam.questions.len(),
            req.answers.len()
        )));
    }

    let score = score_answers(&exam.questions, &req.answers);
    let usn = req.usn.trim().to_uppercase();

    let result = NewQuizResult {
        exam_id: exam.id,
        student_name: req.student_name.trim().to_string(),
        usn: usn.clone(),
        score,
        answers: req.answers,
        started_at: req.started_at,
        submitted_at: req.submitted_at,
    };

    exams.insert_result(result).await.map_err(|e| match e {
        StorageError::NotFound => exam_not_found(),
        other => {
            tracing::error!("Failed to record quiz result: {:?}", other);
            AppError::from(other)
        }
    })?;

    tracing::info!(
        "Exam {} submitted by {}: {}/{}",
        exam.id,
        usn,
        score.score,
        score.total_questions
    );

    Ok(Json(json!({ "success": true, "data": score })))
}

/// Creates an exam with its answer keys.
/// Admin only.
pub async fn create_exam(
    admin: AdminUser,
    State(exams): State<ExamStore>,
    payload: Result<Json<CreateExamRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let exam = exams.insert_exam(payload).await.map_err(|e| {
        tracing::error!("Failed to create exam: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!("Exam {} created by {}", exam.id, admin.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": exam })),
    ))
}

/// Deletes an exam together with its recorded results.
/// Admin only.
pub async fn delete_exam(
    admin: AdminUser,
    State(exams): State<ExamStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !exams.delete_exam(id).await? {
        return Err(exam_not_found());
    }

    tracing::info!("Exam {} deleted by {}", id, admin.username);

    Ok(Json(json!({
        "success": true,
        "message": "Exam deleted successfully"
    })))
}

/// Recorded results of one exam, best score first.
/// Admin only.
pub async fn list_results(
    _admin: AdminUser,
    State(exams): State<ExamStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    exams.get_exam(id).await?.ok_or_else(exam_not_found)?;

    let results = exams.list_results(id).await?;

    Ok(Json(json!({
        "success": true,
        "count": results.len(),
        "data": results
    })))
}
