use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::config::ModelConfig;

/// Model used when neither a model nor a known provider is configured
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default model for a provider name, if the provider is known
///
/// genai picks the adapter from the model name, so choosing the model is
/// enough to route requests to the provider.
pub fn default_model_for(provider: &str) -> Option<&'static str> {
    match provider.trim().to_ascii_lowercase().as_str() {
        "gemini" | "google" => Some(DEFAULT_MODEL),
        "openai" => Some("gpt-4o-mini"),
        "anthropic" | "claude" => Some("claude-3-5-haiku-latest"),
        "groq" => Some("llama-3.1-8b-instant"),
        "ollama" => Some("llama3.2"),
        _ => None,
    }
}

/// Something that turns a prompt into raw text
///
/// This is the only seam between the advisory engine and the network. The
/// production implementation talks to a hosted model through genai; tests
/// substitute a scripted or mocked generator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Identifier of the model prompts are sent to
    fn model_id(&self) -> &str;

    /// Generate text for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{provider} request for model {model} failed: {cause}")]
    Provider {
        provider: String,
        model: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("model {model} returned no text content")]
    EmptyResponse { model: String },

    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    pub fn provider(
        provider: impl Into<String>,
        model: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            model: model.into(),
            cause: Box::new(cause),
        }
    }
}

/// A generator backed by the genai client
///
/// API keys are picked up by genai from the environment (`GEMINI_API_KEY`,
/// `OPENAI_API_KEY`, ...), so the provider follows from the model name.
#[derive(Debug, Clone)]
pub struct GenAiGenerator {
    client: genai::Client,
    model: String,
    temperature: Option<f64>,
}

impl GenAiGenerator {
    /// Create a generator with the default genai client
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(genai::Client::default(), model)
    }

    pub fn with_client(client: genai::Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        if config.model.is_none() && default_model_for(&config.provider).is_none() {
            tracing::warn!(
                "Unknown provider '{}' and no model configured, using {}",
                config.provider,
                DEFAULT_MODEL
            );
        }
        let mut generator = Self::new(config.model_id());
        generator.temperature = config.temperature.map(f64::from);
        generator
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl TextGenerator for GenAiGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let chat_request = genai::chat::ChatRequest::default()
            .append_message(genai::chat::ChatMessage::user(prompt.to_string()));

        let mut chat_options = genai::chat::ChatOptions::default();
        if let Some(temperature) = self.temperature {
            chat_options = chat_options.with_temperature(temperature);
        }

        let response = match self
            .client
            .exec_chat(&self.model, chat_request, Some(&chat_options))
            .await
        {
            Ok(response) => {
                tracing::debug!("GenAI Response:\n{:#?}", response);
                response
            }
            Err(e) => {
                crate::log_error!("GenAI API error", e);
                return Err(GenerationError::provider("genai", &self.model, e));
            }
        };

        let text: String = response
            .content
            .into_iter()
            .filter_map(|content| match content {
                genai::chat::MessageContent::Text(text) => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse {
                model: self.model.clone(),
            });
        }

        Ok(text)
    }
}

/// Generator that replays canned outcomes, for tests and offline demos
///
/// Outcomes are consumed in order; once exhausted the last one repeats.
/// Every call is counted so callers can assert how often the network
/// would have been hit.
#[derive(Debug)]
pub struct ScriptedGenerator {
    model: String,
    outcomes: Mutex<Vec<Result<String, String>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new(outcomes: Vec<Result<String, String>>) -> Self {
        Self {
            model: "scripted".to_string(),
            outcomes: Mutex::new(outcomes),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Wait this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Always answer with this text
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    /// Always fail with this message
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(vec![Err(message.into())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = {
            let mut outcomes = self
                .outcomes
                .lock()
                .map_err(|e| GenerationError::Other(e.to_string()))?;
            if outcomes.len() > 1 {
                outcomes.remove(0)
            } else {
                outcomes
                    .first()
                    .cloned()
                    .unwrap_or_else(|| Err("no scripted outcome".to_string()))
            }
        };

        outcome.map_err(GenerationError::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_generator_replays_in_order() {
        let generator = ScriptedGenerator::new(vec![
            Ok("first".to_string()),
            Err("QUOTA_EXCEEDED".to_string()),
        ]);

        assert_eq!(generator.generate("p").await.unwrap(), "first");
        assert!(generator.generate("p").await.is_err());
        // last outcome repeats
        assert!(generator.generate("p").await.is_err());
        assert_eq!(generator.calls(), 3);
    }

    #[test]
    fn test_from_config_uses_provider_default() {
        let config = ModelConfig {
            provider: "openai".to_string(),
            model: None,
            temperature: Some(0.2),
        };
        let generator = GenAiGenerator::from_config(&config);
        assert_eq!(generator.model_id(), "gpt-4o-mini");
        assert_eq!(generator.temperature, Some(f64::from(0.2f32)));
    }
}
