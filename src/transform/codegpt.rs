use super::{ContentTransformer, TransformError};
use crate::config::{TransformConfig, TransformCredentials};
use crate::url::CanonicalUrl;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Instruction sent ahead of every page's text
pub const CLEANUP_INSTRUCTION: &str = "Clean up the following text extracted from a web page. \
Keep every title, subtitle, and code block exactly as written. \
Remove navigation menus, cookie notices, advertisements, footers, and other boilerplate. \
Reply with the cleaned text only.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(rename = "agentId", skip_serializing_if = "Option::is_none")]
    agent_id: Option<&'a str>,
    messages: Vec<ChatMessage>,
    format: &'static str,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Cleanup service client speaking the CodeGPT chat completions API
pub struct CodeGptTransformer {
    http: Client,
    endpoint: String,
    credentials: TransformCredentials,
    agent_id: Option<String>,
}

impl CodeGptTransformer {
    /// Builds the client
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint and request timeout
    /// * `credentials` - API key and optional agent id
    ///
    /// An agent id from the environment takes precedence over the one in
    /// the configuration file.
    pub fn new(
        config: &TransformConfig,
        credentials: TransformCredentials,
    ) -> Result<Self, TransformError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        let agent_id = credentials
            .agent_id
            .clone()
            .or_else(|| config.agent_id.clone());

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            credentials,
            agent_id,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Agent the requests are routed to, if any
    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id.as_deref()
    }

    fn headers(&self) -> Result<HeaderMap, TransformError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.credentials.api_key))
            .map_err(|e| TransformError::Malformed(format!("Invalid API key header: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl ContentTransformer for CodeGptTransformer {
    fn name(&self) -> &str {
        "codegpt"
    }

    async fn transform(&self, url: &CanonicalUrl, text: &str) -> Result<String, TransformError> {
        let request = ChatRequest {
            agent_id: self.agent_id.as_deref(),
            messages: vec![ChatMessage {
                role: "user",
                content: format!("{}\n\n{}", CLEANUP_INSTRUCTION, text),
            }],
            format: "text",
            stream: false,
        };

        tracing::debug!("Sending {} bytes from {} to cleanup service", text.len(), url);

        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| TransformError::Malformed(e.to_string()))?;

        let cleaned = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TransformError::Malformed("response has no choices".to_string()))?;

        if cleaned.trim().is_empty() {
            return Err(TransformError::Empty);
        }

        Ok(cleaned)
    }
}
