use anyhow::Result;
use async_trait::async_trait;
use core_types::{Question, QuestionStore};
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("forum api returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// HTTP realization of the question-store boundary against a remote forum
/// API. Any non-success status becomes a typed error so callers route to
/// their failed state instead of treating the response as persisted.
pub struct HttpQuestionApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpQuestionApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    async fn ok_or_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status { status, body })
    }
}

#[async_trait]
impl QuestionStore for HttpQuestionApi {
    async fn fetch_questions(&self) -> Result<Vec<Question>> {
        let response = self
            .client
            .get(self.endpoint("questions"))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let response = Self::ok_or_status(response).await?;
        let questions = response.json().await.map_err(ApiError::Transport)?;
        Ok(questions)
    }

    async fn save_question(&self, question: &Question) -> Result<Question> {
        let response = self
            .client
            .post(self.endpoint("questions"))
            .json(question)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let response = Self::ok_or_status(response).await?;
        let saved = response.json().await.map_err(ApiError::Transport)?;
        Ok(saved)
    }
}
