//! Error types for the onboarding form.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Configuration-related errors. Raised once at startup, never per submission.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors turning a raw submitted document into a `FormInput`.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed form document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {value:?} is not one of the allowed options")]
    InvalidEnum { field: String, value: String },
}

/// Faults where the onboarding endpoint produced no response at all.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Request(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.to_string())
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_top_level() {
        let err: Error = ConfigError::MissingEnvVar("ONBOARDING_ENDPOINT_URL".into()).into();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required environment variable: ONBOARDING_ENDPOINT_URL"
        );
    }

    #[test]
    fn invalid_enum_names_field_and_value() {
        let err = DecodeError::InvalidEnum {
            field: "services".into(),
            value: "SEO".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("services"));
        assert!(msg.contains("\"SEO\""));
    }

    #[test]
    fn transport_request_message_is_verbatim() {
        let err = TransportError::Request("connection refused".into());
        assert_eq!(err.to_string(), "connection refused");
    }
}
