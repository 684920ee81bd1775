use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex");
    static ref PHONE_RE: Regex = Regex::new(r"\b\d{10}\b").expect("valid regex");
}

/// Strip emails and 10-digit phone numbers before the text leaves the
/// process for the upstream model.
pub fn redact_sensitive_info(text: &str) -> String {
    let text = EMAIL_RE.replace_all(text, "[REDACTED EMAIL]");
    PHONE_RE.replace_all(&text, "[REDACTED PHONE]").into_owned()
}

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("reply service unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("reply service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed reply service response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplySuggestion {
    pub reply: String,
    pub sentiment: Sentiment,
    pub summary: String,
}

/// Explicit configuration for the reply collaborator; built once at
/// startup, no ambient API-key lookup inside the client.
#[derive(Debug, Clone)]
pub struct ReplyConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl ReplyConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "gpt-4".to_owned(),
            base_url: "https://api.openai.com".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

pub struct ReplyClient {
    config: ReplyConfig,
    http: reqwest::Client,
}

impl ReplyClient {
    pub fn new(config: ReplyConfig) -> Self {
        Self { config, http: reqwest::Client::new() }
    }

    /// Ask the model to analyze the review and draft a reply. The review
    /// text is redacted first. Failures come back as typed errors, never
    /// a default suggestion.
    pub async fn suggest(&self, review_text: &str) -> Result<ReplySuggestion, ReplyError> {
        let clean_text = redact_sensitive_info(review_text);
        let body = json!({
            "model": self.config.model,
            "temperature": 0.7,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a helpful assistant that analyzes customer reviews."
                },
                {
                    "role": "user",
                    "content": format!(
                        "Analyze the sentiment of this review and summarize it: {clean_text}"
                    )
                }
            ]
        });

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReplyError::Api { status: status.as_u16(), body });
        }

        let payload: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| ReplyError::MalformedResponse(e.to_string()))?;
        let summary = payload
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| ReplyError::MalformedResponse("no choices in response".into()))?;

        Ok(suggestion_from_summary(summary))
    }
}

fn suggestion_from_summary(summary: String) -> ReplySuggestion {
    let lower = summary.to_lowercase();
    let sentiment = if lower.contains("positive") {
        Sentiment::Positive
    } else if lower.contains("neutral") {
        Sentiment::Neutral
    } else {
        Sentiment::Negative
    };
    let reply = format!(
        "We appreciate your feedback. Based on your review, we understand that: \
         {summary}. Please let us know if we can assist further."
    );
    ReplySuggestion { reply, sentiment, summary }
}
