use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::{AdvisoryRequest, AdvisoryResult, PreparedRequest};
use crate::{
    AdvisoryError, Result,
    config::AdvisorConfig,
    model::{GenAiGenerator, TextGenerator},
};

/// How an invocation of the model failed, as far as the user is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationFailure {
    InvalidApiKey,
    QuotaExceeded,
    SafetyBlocked,
    Unavailable,
}

impl InvocationFailure {
    /// Classify from the provider's error text
    pub fn classify(message: &str) -> Self {
        if message.contains("API_KEY_INVALID") {
            Self::InvalidApiKey
        } else if message.contains("QUOTA_EXCEEDED") {
            Self::QuotaExceeded
        } else if message.contains("SAFETY") {
            Self::SafetyBlocked
        } else {
            Self::Unavailable
        }
    }

    /// Text suitable for showing next to a degraded result
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidApiKey => "AI service is currently unavailable. Please try again later.",
            Self::QuotaExceeded => "AI service limit reached. Please try again tomorrow.",
            Self::SafetyBlocked => "Unable to process request due to safety guidelines.",
            Self::Unavailable => "AI service temporarily unavailable. Using local insights instead.",
        }
    }
}

/// Why the heuristics were used instead of the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FallbackReason {
    Invocation { failure: InvocationFailure },
    TimedOut,
    MalformedResponse { detail: String },
}

impl FallbackReason {
    fn from_error(error: &AdvisoryError) -> Self {
        match error {
            AdvisoryError::ExternalInvocationFailure { cause, .. } => {
                if cause.is::<tokio::time::error::Elapsed>() {
                    Self::TimedOut
                } else {
                    Self::Invocation {
                        failure: InvocationFailure::classify(&error_chain(error)),
                    }
                }
            }
            AdvisoryError::MalformedResponse { detail, .. } => Self::MalformedResponse {
                detail: detail.clone(),
            },
            _ => Self::Invocation {
                failure: InvocationFailure::Unavailable,
            },
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Invocation { failure } => failure.user_message(),
            Self::TimedOut | Self::MalformedResponse { .. } => {
                InvocationFailure::Unavailable.user_message()
            }
        }
    }
}

/// Where an advisory result came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum Provenance {
    External,
    Fallback { reason: FallbackReason },
}

/// An advisory result together with its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub result: AdvisoryResult,
    pub provenance: Provenance,
}

impl Advisory {
    pub fn is_fallback(&self) -> bool {
        matches!(self.provenance, Provenance::Fallback { .. })
    }
}

/// Runs advisory calls against a text generator
///
/// Holds no per-call state, so one advisor can serve any number of
/// concurrent calls. Each call makes at most one request to the generator
/// and never retries.
#[derive(Debug, Clone)]
pub struct Advisor {
    generator: Arc<dyn TextGenerator>,
    timeout: Option<Duration>,
}

impl Advisor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            timeout: None,
        }
    }

    /// Build an advisor backed by genai, as described by the config
    pub fn from_config(config: &AdvisorConfig) -> Self {
        Self {
            generator: Arc::new(GenAiGenerator::from_config(&config.model)),
            timeout: config.timeout,
        }
    }

    /// Give up on the model after this long and use the heuristics
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn model_id(&self) -> &str {
        self.generator.model_id()
    }

    /// Produce advice for a request
    ///
    /// Only an invalid request is reported as an error. Every failure past
    /// that point is absorbed and answered with the local heuristics; the
    /// returned provenance says which path was taken.
    pub async fn advise(&self, request: &AdvisoryRequest) -> Result<Advisory> {
        let prepared = request.prepare()?;
        let prompt = prepared.render_prompt()?;
        let use_case = prepared.use_case();

        tracing::debug!("Prompt for {}:\n{}", use_case, prompt);

        match self.attempt(&prepared, &prompt).await {
            Ok(result) => {
                tracing::debug!("{} answered by {}", use_case, self.model_id());
                Ok(Advisory {
                    result,
                    provenance: Provenance::External,
                })
            }
            Err(error) => {
                crate::log_recovered!(format!("{} falling back to heuristics", use_case), error);
                Ok(Advisory {
                    result: prepared.fallback(),
                    provenance: Provenance::Fallback {
                        reason: FallbackReason::from_error(&error),
                    },
                })
            }
        }
    }

    async fn attempt(&self, prepared: &PreparedRequest<'_>, prompt: &str) -> Result<AdvisoryResult> {
        let raw = self.invoke(prompt).await?;
        tracing::debug!("Raw {} response:\n{}", prepared.use_case(), raw);
        prepared.interpret(&raw)
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let model = self.generator.model_id();
        let call = self.generator.generate(prompt);

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|elapsed| AdvisoryError::invocation_failure(model, elapsed))?,
            None => call.await,
        };

        outcome.map_err(|e| AdvisoryError::invocation_failure(model, e))
    }
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut current = error.source();
    while let Some(cause) = current {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        current = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GenerationError, MockTextGenerator};
    use crate::types::TaskInput;
    use pretty_assertions::assert_eq;

    fn mock_generator(outcome: fn() -> std::result::Result<String, GenerationError>) -> Arc<dyn TextGenerator> {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_model_id()
            .return_const("mock-model".to_string());
        generator
            .expect_generate()
            .times(1)
            .returning(move |_| outcome());
        Arc::new(generator)
    }

    #[test]
    fn test_classify_provider_messages() {
        assert_eq!(
            InvocationFailure::classify("400 API_KEY_INVALID: bad key"),
            InvocationFailure::InvalidApiKey
        );
        assert_eq!(
            InvocationFailure::classify("429 QUOTA_EXCEEDED"),
            InvocationFailure::QuotaExceeded
        );
        assert_eq!(
            InvocationFailure::classify("blocked: SAFETY"),
            InvocationFailure::SafetyBlocked
        );
        assert_eq!(
            InvocationFailure::classify("connection reset"),
            InvocationFailure::Unavailable
        );
    }

    #[test]
    fn test_classification_reads_nested_causes() {
        let cause = std::io::Error::other("400 API_KEY_INVALID");
        let error = AdvisoryError::invocation_failure(
            "gemini-1.5-flash",
            GenerationError::provider("genai", "gemini-1.5-flash", cause),
        );

        let chain = error_chain(&error);
        assert!(chain.starts_with("External text generation failed: genai request"));
        assert_eq!(
            FallbackReason::from_error(&error),
            FallbackReason::Invocation {
                failure: InvocationFailure::InvalidApiKey
            }
        );
    }

    #[tokio::test]
    async fn test_external_result_used_when_valid() {
        let advisor = Advisor::new(mock_generator(|| {
            Ok(r#"{"subtasks": ["Outline"], "estimatedTimes": [10], "recommendations": []}"#
                .to_string())
        }));

        let request = AdvisoryRequest::task_breakdown(TaskInput::new("Write report"), None);
        let advisory = advisor.advise(&request).await.unwrap();

        assert_eq!(advisory.provenance, Provenance::External);
        let AdvisoryResult::TaskBreakdown(breakdown) = advisory.result else {
            panic!("wrong variant");
        };
        assert_eq!(breakdown.subtasks, vec!["Outline"]);
    }

    #[tokio::test]
    async fn test_quota_error_falls_back_with_reason() {
        let advisor = Advisor::new(mock_generator(|| {
            Err(GenerationError::Other("429 QUOTA_EXCEEDED for project".to_string()))
        }));

        let request = AdvisoryRequest::task_breakdown(
            TaskInput::new("Write report").with_estimated_duration(30),
            None,
        );
        let advisory = advisor.advise(&request).await.unwrap();

        assert_eq!(
            advisory.provenance,
            Provenance::Fallback {
                reason: FallbackReason::Invocation {
                    failure: InvocationFailure::QuotaExceeded
                }
            }
        );
        assert_eq!(
            advisory.result,
            AdvisoryResult::TaskBreakdown(super::super::fallback::task_breakdown(
                &TaskInput::new("Write report").with_estimated_duration(30)
            ))
        );
    }

    #[tokio::test]
    async fn test_malformed_text_falls_back() {
        let advisor = Advisor::new(mock_generator(|| Ok("Sure! Here's a plan...".to_string())));
        let advisory = advisor
            .advise(&AdvisoryRequest::focus_insight(vec![], vec![]))
            .await
            .unwrap();

        assert!(advisory.is_fallback());
        assert!(matches!(
            advisory.provenance,
            Provenance::Fallback {
                reason: FallbackReason::MalformedResponse { .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_request_never_calls_generator() {
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();
        generator
            .expect_model_id()
            .return_const("mock-model".to_string());
        let advisor = Advisor::new(Arc::new(generator));

        let request = AdvisoryRequest::new(Some("tarot".to_string()), Default::default());
        let err = advisor.advise(&request).await.unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[test]
    fn test_fallback_reason_serializes() {
        let provenance = Provenance::Fallback {
            reason: FallbackReason::Invocation {
                failure: InvocationFailure::SafetyBlocked,
            },
        };
        let value = serde_json::to_value(&provenance).unwrap();
        assert_eq!(value["source"], "fallback");
        assert_eq!(value["reason"]["kind"], "invocation");
        assert_eq!(value["reason"]["failure"], "safety-blocked");
    }
}
