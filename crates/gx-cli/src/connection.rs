use anyhow::{Context, Result};
use clap::Args;
use gx_rest_client::{AuthConfig, RestClient};

/// Server address and credentials, shared by every command
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Galaxy base URL
    #[arg(long, env = "GALAXY_URL", default_value = "http://localhost:8080/", global = true)]
    pub url: String,

    /// API key to sign requests with
    #[arg(long, env = "GALAXY_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Account email, exchanged with the password for an API key
    #[arg(long, env = "GALAXY_EMAIL", global = true, requires = "password")]
    pub email: Option<String>,

    #[arg(long, env = "GALAXY_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,
}

impl ConnectionArgs {
    pub async fn connect(&self) -> Result<RestClient> {
        let auth = match &self.api_key {
            Some(key) => AuthConfig::with_api_key(key.clone()),
            None => AuthConfig::default(),
        };
        let mut client = RestClient::from_url(&self.url, auth)
            .with_context(|| format!("Invalid Galaxy URL: {}", self.url))?;

        if self.api_key.is_none() {
            if let (Some(email), Some(password)) = (&self.email, &self.password) {
                client
                    .authenticate(email, password)
                    .await
                    .context("Failed to authenticate")?;
            }
        }
        Ok(client)
    }
}
