use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum AdvisoryError {
    #[error("Invalid advisory request")]
    #[diagnostic(
        code(neurofocus_core::invalid_request),
        help("{reason}. Valid use cases: {}", valid_use_cases.join(", "))
    )]
    InvalidRequest {
        use_case: Option<String>,
        reason: String,
        valid_use_cases: Vec<String>,
    },

    #[error("External text generation failed")]
    #[diagnostic(
        code(neurofocus_core::external_invocation_failure),
        help("Check the API key and quota for model '{model}'")
    )]
    ExternalInvocationFailure {
        model: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Malformed model response")]
    #[diagnostic(
        code(neurofocus_core::malformed_response),
        help("The {use_case} response did not match the expected shape: {detail}")
    )]
    MalformedResponse { use_case: String, detail: String },

    #[error("Configuration error")]
    #[diagnostic(
        code(neurofocus_core::configuration_error),
        help("Check configuration file at {config_path}")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("TOML parse error: {0}")]
    TomlParse(String),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),
}

pub type Result<T> = std::result::Result<T, AdvisoryError>;

impl AdvisoryError {
    pub fn invalid_request(use_case: Option<&str>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            use_case: use_case.map(str::to_string),
            reason: reason.into(),
            valid_use_cases: crate::advisory::UseCase::ALL
                .iter()
                .map(|u| u.tag().to_string())
                .collect(),
        }
    }

    pub fn invocation_failure(
        model: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ExternalInvocationFailure {
            model: model.into(),
            cause: Box::new(cause),
        }
    }

    pub fn malformed(use_case: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            use_case: use_case.into(),
            detail: detail.into(),
        }
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    #[test]
    fn test_invalid_request_lists_use_cases() {
        let error = AdvisoryError::invalid_request(Some("horoscope"), "Unknown use case");
        let report = Report::new(error);
        let output = format!("{:?}", report);
        assert!(output.contains("invalid_request"));
        assert!(output.contains("task-breakdown, focus-insight"));
    }

    #[test]
    fn test_malformed_response_mentions_use_case() {
        let error = AdvisoryError::malformed("daily-summary", "missing field `summary`");
        let report = Report::new(error);
        let output = format!("{:?}", report);
        assert!(output.contains("daily-summary"));
        assert!(output.contains("missing field `summary`"));
    }
}
