// src/quiz/client.rs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::models::exam::{ExamSummary, PublicExam, QuizScore, SubmitQuizRequest};

/// Shown when the server did not say what went wrong.
pub const GENERIC_SUBMIT_FAILURE: &str = "Failed to submit exam. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx answer; `message` is the server's own text when it sent one.
    #[error("server responded with {status}")]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Text suitable for showing to the learner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            _ => GENERIC_SUBMIT_FAILURE.to_string(),
        }
    }
}

/// The single network call a submission makes.
#[async_trait]
pub trait ScoringClient: Send + Sync {
    async fn submit(&self, request: &SubmitQuizRequest) -> Result<QuizScore, ClientError>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the exam endpoints.
#[derive(Debug, Clone)]
pub struct HttpExamClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpExamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_exams(&self) -> Result<Vec<ExamSummary>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/exams", self.base_url))
            .send()
            .await?;
        read_data(response).await
    }

    pub async fn fetch_exam(&self, exam_id: i64) -> Result<PublicExam, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/exams/{}", self.base_url, exam_id))
            .send()
            .await?;
        read_data(response).await
    }
}

#[async_trait]
impl ScoringClient for HttpExamClient {
    async fn submit(&self, request: &SubmitQuizRequest) -> Result<QuizScore, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/exams/submit-quiz", self.base_url))
            .json(request)
            .send()
            .await?;
        read_data(response).await
    }
}

/// Unwraps `{data: ...}` on success, or pulls `{message}` out of an error body.
async fn read_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty());
        return Err(ClientError::Server { status, message });
    }

    let body = response.bytes().await?;
    serde_json::from_slice::<Envelope<T>>(&body)
        .map(|envelope| envelope.data)
        .map_err(|e| ClientError::Decode(e.to_string()))
}
