//! Optional generative-text service.
//!
//! Every failure (no credential, network error, unexpected payload) is logged and
//! turned into an empty result; callers fall back to the offline suggesters.

use anyhow::{anyhow, Result};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_TITLES: usize = 5;
const TITLE_TEMPERATURE: f32 = 0.7;
const CHAT_TEMPERATURE: f32 = 0.4;
const CHAT_SYSTEM_PROMPT: &str =
    "You recommend internal stories to read based on the user's interests. Be concise and friendly.";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`; `None` without a key.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
        let mut cfg = Self::new(key.trim());
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            if !model.trim().is_empty() { cfg.model = model.trim().to_string(); }
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            if !url.trim().is_empty() { cfg.base_url = url.trim().trim_end_matches('/').to_string(); }
        }
        Some(cfg)
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat-completions client for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("storytips/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str { &self.config.model }

    async fn complete(&self, messages: Vec<ChatMessage<'_>>, temperature: f32) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = ChatRequest { model: &self.config.model, messages, temperature };
        let resp = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("completion request failed with status {}", resp.status()));
        }
        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| anyhow!("completion response had no content"))
    }
}

/// Generative-text capability: a configured client, or nothing at all.
#[derive(Debug, Clone)]
pub enum TextGenerator {
    Available(OpenAiClient),
    Unavailable,
}

impl TextGenerator {
    pub fn from_env() -> Self { Self::from_config(LlmConfig::from_env()) }

    pub fn from_config(config: Option<LlmConfig>) -> Self {
        match config.map(OpenAiClient::new) {
            Some(Ok(client)) => {
                tracing::info!(model = client.model(), "text generation available");
                TextGenerator::Available(client)
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "could not build text generation client");
                TextGenerator::Unavailable
            }
            None => TextGenerator::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool { matches!(self, TextGenerator::Available(_)) }

    /// Up to five titles for a story draft; empty when unavailable or on any failure.
    pub async fn suggest_titles(&self, text: &str) -> Vec<String> {
        let TextGenerator::Available(client) = self else { return Vec::new() };
        let prompt = format!(
            "Suggest 5 short, catchy, executive-friendly titles for an internal employee story. Story context:\n{text}\nReturn one title per line, no numbering."
        );
        let messages = vec![ChatMessage { role: "user", content: &prompt }];
        match client.complete(messages, TITLE_TEMPERATURE).await {
            Ok(content) => parse_title_lines(&content),
            Err(e) => {
                tracing::warn!(error = %e, "title suggestion failed");
                Vec::new()
            }
        }
    }

    /// Free-text reading recommendation; empty when unavailable or on any failure.
    pub async fn chat_answer(&self, prompt: &str, context: &str) -> String {
        let TextGenerator::Available(client) = self else { return String::new() };
        let user = format!("User question: {prompt}\n\nStory context:\n{context}");
        let messages = vec![
            ChatMessage { role: "system", content: CHAT_SYSTEM_PROMPT },
            ChatMessage { role: "user", content: &user },
        ];
        match client.complete(messages, CHAT_TEMPERATURE).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "chat answer failed");
                String::new()
            }
        }
    }
}

/// Generated titles when the service produces any, otherwise the offline templates.
pub async fn suggest_titles_or_offline(generator: &TextGenerator, text: &str) -> Vec<String> {
    let titles = generator.suggest_titles(text).await;
    if titles.is_empty() { storycore::suggest::suggest_titles_offline(text) } else { titles }
}

/// One title per non-blank line, list markers and surrounding spaces stripped, at most five.
pub fn parse_title_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.trim_matches(|c: char| c == '-' || c == ' ').trim().to_string())
        .filter(|l| !l.is_empty())
        .take(MAX_TITLES)
        .collect()
}
