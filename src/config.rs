//! Configuration types.

use reqwest::Url;

use crate::error::ConfigError;

/// Environment variable holding the onboarding endpoint URL.
pub const ENDPOINT_ENV: &str = "ONBOARDING_ENDPOINT_URL";
/// Environment variable overriding the outbound User-Agent.
pub const USER_AGENT_ENV: &str = "ONBOARDING_USER_AGENT";

/// Onboarding client configuration, resolved once at process start.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Where validated submissions are POSTed.
    pub endpoint: Url,
    /// User-Agent header sent with every submission.
    pub user_agent: String,
}

impl OnboardingConfig {
    /// Build a config for an already-known endpoint.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            user_agent: default_user_agent(),
        }
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup (tests pass a closure over a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(ENDPOINT_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(ENDPOINT_ENV.to_string()))?;

        let endpoint = parse_endpoint(&raw)?;

        let user_agent = lookup(USER_AGENT_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_user_agent);

        Ok(Self {
            endpoint,
            user_agent,
        })
    }
}

fn default_user_agent() -> String {
    format!("onboarding-form/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        key: ENDPOINT_ENV.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidValue {
            key: ENDPOINT_ENV.to_string(),
            message: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}
