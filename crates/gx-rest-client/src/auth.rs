//! Authentication methods for the REST API client

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};

/// Authentication methods supported by the API
#[derive(Debug, Clone, Default)]
pub enum AuthMethod {
    /// Galaxy API key (`x-api-key: <key>`)
    ApiKey(String),
    /// HTTP Basic credentials, accepted only by the baseauth endpoint
    Basic { email: String, password: String },
    /// No authentication
    #[default]
    None,
}

impl AuthMethod {
    /// Apply authentication headers to a request
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        match self {
            AuthMethod::ApiKey(key) => {
                headers.insert(
                    HeaderName::from_static("x-api-key"),
                    HeaderValue::from_str(key)?,
                );
            }
            AuthMethod::Basic { email, password } => {
                let encoded = STANDARD.encode(format!("{}:{}", email, password));
                let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))?;
                value.set_sensitive(true);
                headers.insert(HeaderName::from_static("authorization"), value);
            }
            AuthMethod::None => {}
        }
        Ok(())
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    pub fn basic(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Authentication configuration for the client
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub method: AuthMethod,
}

impl AuthConfig {
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::api_key(key),
        }
    }

    pub fn with_basic(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::basic(email, password),
        }
    }

    /// The API key in use, if the client has one
    pub fn api_key(&self) -> Option<&str> {
        match &self.method {
            AuthMethod::ApiKey(key) => Some(key),
            _ => None,
        }
    }

    /// Get headers for this authentication configuration
    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        self.method.apply_to_headers(&mut headers)?;
        Ok(headers)
    }
}
