//! Client configuration loaded via OrthoConfig.
//!
//! Every value is optional in the environment (`EGO_HOUSE_*`); accessors
//! apply the local-development defaults.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_TOKEN_KEY: &str = "auth_token";
const DEFAULT_SESSION_KEY: &str = "auth-storage";
const DEFAULT_STATE_DIR: &str = ".ego-house";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Configuration errors surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The API base URL did not parse or is not http(s).
    #[error("invalid API URL '{value}': {reason}")]
    InvalidApiUrl {
        /// URL as configured.
        value: String,
        /// Parser or scheme complaint.
        reason: String,
    },
}

/// Settings controlling where the client talks to and where it keeps
/// session state.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EGO_HOUSE")]
pub struct ClientSettings {
    /// Backend base URL.
    pub api_url: Option<String>,
    /// Storage key for the bearer-token mirror.
    pub token_key: Option<String>,
    /// Storage key for the persisted session blob.
    pub session_key: Option<String>,
    /// Directory holding persisted client state.
    pub state_dir: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl ClientSettings {
    /// Parsed backend base URL, falling back to the local development URL.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_API_URL);
        let url = Url::parse(raw).map_err(|error| ConfigError::InvalidApiUrl {
            value: raw.to_owned(),
            reason: error.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidApiUrl {
                value: raw.to_owned(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }

    /// Token mirror key.
    pub fn token_key(&self) -> &str {
        non_blank(self.token_key.as_deref()).unwrap_or(DEFAULT_TOKEN_KEY)
    }

    /// Session blob key.
    pub fn session_key(&self) -> &str {
        non_blank(self.session_key.as_deref()).unwrap_or(DEFAULT_SESSION_KEY)
    }

    /// State directory, relative to the working directory by default.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
    }

    /// Request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "EGO_HOUSE_API_URL",
        "EGO_HOUSE_TOKEN_KEY",
        "EGO_HOUSE_SESSION_KEY",
        "EGO_HOUSE_STATE_DIR",
        "EGO_HOUSE_REQUEST_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("ego-house")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_url().expect("default URL parses").as_str(),
            "http://localhost:3000/"
        );
        assert_eq!(settings.token_key(), DEFAULT_TOKEN_KEY);
        assert_eq!(settings.session_key(), DEFAULT_SESSION_KEY);
        assert_eq!(settings.state_dir(), PathBuf::from(DEFAULT_STATE_DIR));
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("EGO_HOUSE_API_URL", Some("https://api.ego.house/v1".to_owned())),
            ("EGO_HOUSE_TOKEN_KEY", Some("ego_token".to_owned())),
            ("EGO_HOUSE_SESSION_KEY", Some("ego-session".to_owned())),
            ("EGO_HOUSE_STATE_DIR", Some("/tmp/ego-state".to_owned())),
            ("EGO_HOUSE_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_url().expect("URL parses").as_str(),
            "https://api.ego.house/v1"
        );
        assert_eq!(settings.token_key(), "ego_token");
        assert_eq!(settings.session_key(), "ego-session");
        assert_eq!(settings.state_dir(), PathBuf::from("/tmp/ego-state"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://ego.house")]
    fn invalid_api_urls_are_reported(#[case] raw: &str) {
        let settings = ClientSettings {
            api_url: Some(raw.to_owned()),
            token_key: None,
            session_key: None,
            state_dir: None,
            request_timeout_secs: None,
        };
        assert!(matches!(
            settings.api_url(),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
    }
}
