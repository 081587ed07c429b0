//! Report writer backed by a local Ollama server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::prompt::{user_message, SYSTEM_PROMPT};
use crate::{ReportError, ReportInput, ReportWriter};

const TEMPERATURE: f32 = 0.7;

/// Chat client for Ollama's `/api/chat` endpoint.
pub struct OllamaReportWriter {
    client: reqwest::Client,
    host: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaReportWriter {
    /// `host` should be like `http://localhost:11434` (no trailing slash).
    pub fn new(host: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn request<'a>(&'a self, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: TEMPERATURE,
            },
        }
    }
}

#[async_trait]
impl ReportWriter for OllamaReportWriter {
    fn name(&self) -> &str {
        &self.model
    }

    async fn write_report(&self, input: &ReportInput) -> Result<String, ReportError> {
        let url = format!("{}/api/chat", self.host);
        let user = user_message(input)?;

        info!(url = %url, model = %self.model, "requesting report from ollama");
        let resp = self.client.post(&url).json(&self.request(&user)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReportError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = resp.json().await?;
        debug!(chars = chat.message.content.chars().count(), "ollama replied");
        Ok(chat.message.content.trim().to_string())
    }
}
