use crate::constants::endpoints;
use crate::error::GrokgramError;
use crate::llm::traits::*;
use serde::Deserialize;
use tracing::{debug, warn};

/// Chat-completions client for the xAI API.
pub struct GrokClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GrokClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: endpoints::GROK_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
struct GrokResponse {
    #[serde(default)]
    choices: Vec<GrokChoice>,
}

#[derive(Debug, Deserialize)]
struct GrokChoice {
    message: GrokMessage,
}

#[derive(Debug, Deserialize)]
struct GrokMessage {
    content: Option<String>,
}

/// Turn a successful response body into a [`Completion`].
///
/// Anything that does not decode into a first choice with visible text is
/// handed back raw.
pub(crate) fn interpret_body(body: &[u8]) -> Completion {
    match serde_json::from_slice::<GrokResponse>(body) {
        Ok(parsed) => match parsed.choices.into_iter().next() {
            Some(GrokChoice {
                message: GrokMessage { content: Some(content) },
            }) if !content.trim().is_empty() => Completion::Reply(content),
            Some(_) => {
                warn!("First choice has no content, falling back to raw body");
                Completion::Degraded(body.to_vec())
            }
            None => {
                warn!("Completion response had no choices, falling back to raw body");
                Completion::Degraded(body.to_vec())
            }
        },
        Err(e) => {
            warn!("Failed to decode completion response, falling back to raw body: {e}");
            Completion::Degraded(body.to_vec())
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for GrokClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GrokgramError> {
        let url = format!("{}{}", self.base_url, endpoints::CHAT_COMPLETIONS_PATH);
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(GrokgramError::Llm(format!(
                "Grok API error ({}): {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let completion = interpret_body(&body);
        if let Completion::Reply(ref text) = completion {
            debug!(chars = text.chars().count(), "Completion received");
        }
        Ok(completion)
    }
}
