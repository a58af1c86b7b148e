//! Runtime configuration
//!
//! Everything is read from the environment once at startup (after an
//! optional `.env` file has been loaded by `main`).

use std::time::Duration;
use thiserror::Error;

const DEFAULT_LANGUAGE_CODE: &str = "en-US";
const DEFAULT_ENDPOINT: &str = "https://dialogflow.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 8000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PROJECT_ID is not set. Check your .env file.")]
    MissingProjectId,
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Settings for reaching the intent detection agent
#[derive(Debug, Clone)]
pub struct IntentConfig {
    pub project_id: String,
    pub language_code: String,
    /// OAuth bearer token; `None` sends unauthenticated requests
    pub access_token: Option<String>,
    pub endpoint: String,
    /// Upper bound on a single detect-intent call
    pub timeout: Duration,
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub intent: IntentConfig,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let project_id = get("PROJECT_ID").ok_or(ConfigError::MissingProjectId)?;

        let timeout_secs = match get("DIALOGFLOW_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("DIALOGFLOW_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DIALOGFLOW_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let port = match get("CHAT_PORT") {
            Some(raw) => parse_number::<u16>("CHAT_PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            intent: IntentConfig {
                project_id,
                language_code: get("DIALOGFLOW_LANGUAGE_CODE")
                    .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string()),
                access_token: get("DIALOGFLOW_ACCESS_TOKEN"),
                endpoint: get("DIALOGFLOW_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            port,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("PROJECT_ID", "kce-enquiry")])).unwrap();

        assert_eq!(config.intent.project_id, "kce-enquiry");
        assert_eq!(config.intent.language_code, "en-US");
        assert_eq!(config.intent.endpoint, "https://dialogflow.googleapis.com");
        assert_eq!(config.intent.access_token, None);
        assert_eq!(config.intent.timeout, Duration::from_secs(30));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PROJECT_ID", "p"),
            ("DIALOGFLOW_LANGUAGE_CODE", "en-IN"),
            ("DIALOGFLOW_ACCESS_TOKEN", "ya29.token"),
            ("DIALOGFLOW_ENDPOINT", "https://asia-northeast1-dialogflow.googleapis.com"),
            ("DIALOGFLOW_TIMEOUT_SECS", " 10 "),
            ("CHAT_PORT", "9090"),
        ]))
        .unwrap();

        assert_eq!(config.intent.language_code, "en-IN");
        assert_eq!(config.intent.access_token.as_deref(), Some("ya29.token"));
        assert_eq!(
            config.intent.endpoint,
            "https://asia-northeast1-dialogflow.googleapis.com"
        );
        assert_eq!(config.intent.timeout, Duration::from_secs(10));
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_missing_or_blank_project_id() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingProjectId
        );
        assert_eq!(
            AppConfig::from_lookup(lookup(&[("PROJECT_ID", "   ")])).unwrap_err(),
            ConfigError::MissingProjectId
        );
    }

    #[test]
    fn test_invalid_numbers() {
        let err = AppConfig::from_lookup(lookup(&[("PROJECT_ID", "p"), ("CHAT_PORT", "eighty")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "CHAT_PORT",
                value: "eighty".to_string()
            }
        );

        let err = AppConfig::from_lookup(lookup(&[
            ("PROJECT_ID", "p"),
            ("DIALOGFLOW_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "DIALOGFLOW_TIMEOUT_SECS",
                ..
            }
        ));
    }
}
