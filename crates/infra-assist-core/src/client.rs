use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

/// Everything that can go wrong between sending a question and reading its answer
#[derive(Debug, Error)]
pub enum AskError {
    #[error("request to ask endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ask endpoint returned status {status}")]
    BadStatus { status: u16 },

    #[error("malformed ask response: {0}")]
    Malformed(String),

    #[error("ask task did not complete: {0}")]
    Interrupted(String),
}

/// Something that can answer a question
#[async_trait]
pub trait AskBackend: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, AskError>;
}

/// HTTP client for the `POST /ask` endpoint
#[derive(Clone, Debug)]
pub struct AskClient {
    client: Client,
    base_url: String,
}

impl AskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }
}

#[async_trait]
impl AskBackend for AskClient {
    async fn ask(&self, question: &str) -> Result<String, AskError> {
        let url = self.ask_url();
        tracing::debug!(%url, chars = question.chars().count(), "sending question");

        // .json() sets Content-Type: application/json
        let response = self
            .client
            .post(&url)
            .json(&AskRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let parsed: AskResponse =
            serde_json::from_slice(&body).map_err(|e| AskError::Malformed(e.to_string()))?;

        tracing::debug!(chars = parsed.answer.chars().count(), "received answer");
        Ok(parsed.answer)
    }
}
