//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::Url;
use std::path::PathBuf;
use tracing::Level;

pub const AUTHORIZE_URL_VAR: &str = "OAUTH_AUTHORIZE_URL";
pub const TOKEN_URL_VAR: &str = "OAUTH_TOKEN_URL";
pub const CLIENT_ID_VAR: &str = "OAUTH_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "OAUTH_CLIENT_SECRET";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// One clause per violated OAuth field, in declaration order.
    #[error("{}", .0.join("; "))]
    Violations(Vec<String>),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Endpoints and client credentials of the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthConfig {
    pub authorize_url: Url,
    pub token_url: Url,
    pub client_id: String,
    pub client_secret: String,
}

fn parse_http_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    let web_scheme = matches!(url.scheme(), "http" | "https");
    (web_scheme && url.host_str().is_some()).then_some(url)
}

fn url_required(var: &str, example: &str) -> String {
    format!("{var} is required and must be a valid URL (e.g. {example})")
}

fn value_required(var: &str, example: &str) -> String {
    format!("{var} is required (e.g. {example})")
}

impl OAuthConfig {
    /// Validates the four required OAuth values, reading them through `lookup`.
    ///
    /// Values are trimmed before validation. Every violated field contributes its
    /// own clause to the error, so one failed start reports all of them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut violations = Vec::new();

        let authorize_url = read(AUTHORIZE_URL_VAR).and_then(|raw| parse_http_url(&raw));
        if authorize_url.is_none() {
            violations.push(url_required(
                AUTHORIZE_URL_VAR,
                "https://auth.example.com/oauth/authorize",
            ));
        }

        let token_url = read(TOKEN_URL_VAR).and_then(|raw| parse_http_url(&raw));
        if token_url.is_none() {
            violations.push(url_required(
                TOKEN_URL_VAR,
                "https://auth.example.com/oauth/token",
            ));
        }

        let client_id = read(CLIENT_ID_VAR);
        if client_id.is_none() {
            violations.push(value_required(
                CLIENT_ID_VAR,
                "cd49f429-f2f3-444f-b35d-7997cb35d358",
            ));
        }

        let client_secret = read(CLIENT_SECRET_VAR);
        if client_secret.is_none() {
            violations.push(value_required(CLIENT_SECRET_VAR, "xyz789abc123"));
        }

        match (authorize_url, token_url, client_id, client_secret) {
            (Some(authorize_url), Some(token_url), Some(client_id), Some(client_secret)) => {
                Ok(Self {
                    authorize_url,
                    token_url,
                    client_id,
                    client_secret,
                })
            }
            _ => Err(ConfigError::Violations(violations)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub oauth: OAuthConfig,
    pub data_dir: PathBuf,
    pub log_level: Level,
    /// Scheme of the app's redirect URI, `<scheme>://redirect`.
    pub app_scheme: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let oauth = OAuthConfig::from_lookup(&lookup)?;

        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let app_scheme = lookup("APP_SCHEME").unwrap_or_else(|| "taskkeeper".to_string());

        Ok(Self {
            oauth,
            data_dir,
            log_level,
            app_scheme,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (AUTHORIZE_URL_VAR, "https://auth.example.com/authorize".to_string()),
            (TOKEN_URL_VAR, "https://auth.example.com/token".to_string()),
            (CLIENT_ID_VAR, "cd49f429-f2f3-444f-b35d-7997cb35d358".to_string()),
            (CLIENT_SECRET_VAR, "xyz789abc123".to_string()),
        ])
    }

    fn oauth_from(env: &HashMap<&'static str, String>) -> Result<OAuthConfig, ConfigError> {
        OAuthConfig::from_lookup(|var| env.get(var).cloned())
    }

    #[test]
    fn valid_values_load() {
        let config = oauth_from(&valid_env()).unwrap();
        assert_eq!(config.authorize_url.as_str(), "https://auth.example.com/authorize");
        assert_eq!(config.client_secret, "xyz789abc123");
    }

    #[test]
    fn surrounding_whitespace_does_not_change_the_result() {
        let padded: HashMap<_, _> = valid_env()
            .into_iter()
            .map(|(k, v)| (k, format!("  {v}\t")))
            .collect();
        assert_eq!(oauth_from(&padded).unwrap(), oauth_from(&valid_env()).unwrap());
    }

    #[test]
    fn single_violation_names_its_field() {
        let mut env = valid_env();
        env.insert(AUTHORIZE_URL_VAR, "not-a-url".to_string());
        let err = oauth_from(&env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "OAUTH_AUTHORIZE_URL is required and must be a valid URL (e.g. https://auth.example.com/oauth/authorize)"
        );

        let mut env = valid_env();
        env.remove(CLIENT_ID_VAR);
        let err = oauth_from(&env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "OAUTH_CLIENT_ID is required (e.g. cd49f429-f2f3-444f-b35d-7997cb35d358)"
        );
    }

    #[test]
    fn every_violation_is_reported_in_declaration_order() {
        let env = HashMap::from([
            (AUTHORIZE_URL_VAR, "not-a-url".to_string()),
            (TOKEN_URL_VAR, "ftp://files.example.com".to_string()),
            (CLIENT_ID_VAR, "   ".to_string()),
        ]);
        let ConfigError::Violations(clauses) = oauth_from(&env).unwrap_err() else {
            panic!("expected aggregated violations");
        };
        assert_eq!(clauses.len(), 4);
        assert!(clauses[0].starts_with(AUTHORIZE_URL_VAR));
        assert!(clauses[1].starts_with(TOKEN_URL_VAR));
        assert!(clauses[2].starts_with(CLIENT_ID_VAR));
        assert!(clauses[3].starts_with(CLIENT_SECRET_VAR));
    }

    #[test]
    fn optional_settings_have_defaults_and_bad_log_level_fails() {
        let env = valid_env();
        let config = Config::from_lookup(|var| env.get(var).cloned()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.app_scheme, "taskkeeper");

        let mut env = valid_env();
        env.insert("RUST_LOG", "chatty".to_string());
        let err = Config::from_lookup(|var| env.get(var).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "RUST_LOG"));
    }
}
