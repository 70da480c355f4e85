//! Live-server configuration read from the environment

use gx_rest_client::{AuthConfig, RestClient};
use tracing::info;

use crate::error::{HarnessError, HarnessResult};

pub const DEFAULT_PORT: u16 = 8080;

/// Where the live Galaxy instance is and how to log into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfig {
    pub host: String,
    pub port: u16,
    pub use_https: bool,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey(String),
    Login { email: String, password: String },
}

impl TestConfig {
    /// Read `GALAXY_HOST`, `GALAXY_PORT`, `GALAXY_HTTPS` and either
    /// `GALAXY_API_KEY` or `GALAXY_EMAIL`/`GALAXY_PASSWORD`.
    ///
    /// Returns `Ok(None)` when no host is set, which callers treat as
    /// "skip the live tests".
    pub fn from_env() -> HarnessResult<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> HarnessResult<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(host) = lookup("GALAXY_HOST").filter(|h| !h.is_empty()) else {
            return Ok(None);
        };

        let port = match lookup("GALAXY_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| HarnessError::Config(format!("GALAXY_PORT is not a port: {}", port)))?,
            None => DEFAULT_PORT,
        };
        let use_https = lookup("GALAXY_HTTPS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let credentials = match (
            lookup("GALAXY_API_KEY"),
            lookup("GALAXY_EMAIL"),
            lookup("GALAXY_PASSWORD"),
        ) {
            (Some(key), _, _) => Credentials::ApiKey(key),
            (None, Some(email), Some(password)) => Credentials::Login { email, password },
            _ => {
                return Err(HarnessError::Config(
                    "set GALAXY_API_KEY or both GALAXY_EMAIL and GALAXY_PASSWORD".to_string(),
                ))
            }
        };

        Ok(Some(Self {
            host,
            port,
            use_https,
            credentials,
        }))
    }

    /// Build an authenticated client for the configured server.
    pub async fn connect(&self) -> HarnessResult<RestClient> {
        let client = match &self.credentials {
            Credentials::ApiKey(key) => RestClient::from_host(
                &self.host,
                self.port,
                self.use_https,
                AuthConfig::with_api_key(key.clone()),
            )?,
            Credentials::Login { email, password } => {
                let mut client = RestClient::from_host(
                    &self.host,
                    self.port,
                    self.use_https,
                    AuthConfig::default(),
                )?;
                client.authenticate(email, password).await?;
                client
            }
        };

        let version = client.version().await?;
        info!(
            url = %client.base_url(),
            version = %version.version_major,
            "connected to Galaxy"
        );
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_host_skips() {
        assert_eq!(TestConfig::from_lookup(lookup(&[])).unwrap(), None);
        assert_eq!(
            TestConfig::from_lookup(lookup(&[("GALAXY_HOST", "")])).unwrap(),
            None
        );
    }

    #[test]
    fn test_login_config() {
        let config = TestConfig::from_lookup(lookup(&[
            ("GALAXY_HOST", "galaxy.local"),
            ("GALAXY_PORT", "8443"),
            ("GALAXY_HTTPS", "true"),
            ("GALAXY_EMAIL", "admin@example.org"),
            ("GALAXY_PASSWORD", "secret"),
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(config.port, 8443);
        assert!(config.use_https);
        assert_eq!(
            config.credentials,
            Credentials::Login {
                email: "admin@example.org".to_string(),
                password: "secret".to_string()
            }
        );
    }

    #[test]
    fn test_api_key_takes_precedence() {
        let config = TestConfig::from_lookup(lookup(&[
            ("GALAXY_HOST", "localhost"),
            ("GALAXY_API_KEY", "feedc0de"),
            ("GALAXY_EMAIL", "admin@example.org"),
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.use_https);
        assert_eq!(config.credentials, Credentials::ApiKey("feedc0de".to_string()));
    }

    #[test]
    fn test_incomplete_config_is_an_error() {
        let result = TestConfig::from_lookup(lookup(&[
            ("GALAXY_HOST", "localhost"),
            ("GALAXY_EMAIL", "admin@example.org"),
        ]));
        assert!(matches!(result, Err(HarnessError::Config(_))));

        let result = TestConfig::from_lookup(lookup(&[
            ("GALAXY_HOST", "localhost"),
            ("GALAXY_PORT", "eighty"),
            ("GALAXY_API_KEY", "feedc0de"),
        ]));
        assert!(matches!(result, Err(HarnessError::Config(_))));
    }
}
