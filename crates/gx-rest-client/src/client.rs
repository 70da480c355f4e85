//! Connection handle and request plumbing shared by the resource façades

use gx_rest_api_contract::*;
use reqwest::multipart::Form;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::AuthConfig;
use crate::error::{RestClientError, RestClientResult};
use crate::histories::Histories;
use crate::history_contents::HistoryContents;
use crate::tools::Tools;
use crate::workflows::Workflows;

/// REST API client for a Galaxy server
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    base_url: Url,
    auth: AuthConfig,
}

impl RestClient {
    /// Create a new REST client
    pub fn new(base_url: Url, auth: AuthConfig) -> RestClientResult<Self> {
        let http_client = HttpClient::builder().user_agent("gx-rest-client/0.1").build()?;

        Ok(Self {
            http_client,
            base_url: with_trailing_slash(base_url),
            auth,
        })
    }

    /// Create a client from a base URL string
    pub fn from_url(base_url: &str, auth: AuthConfig) -> RestClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        Self::new(base_url, auth)
    }

    /// Create a client for `host:port`, over HTTPS when `use_https` is set
    pub fn from_host(
        host: &str,
        port: u16,
        use_https: bool,
        auth: AuthConfig,
    ) -> RestClientResult<Self> {
        let scheme = if use_https { "https" } else { "http" };
        Self::from_url(&format!("{}://{}:{}/", scheme, host, port), auth)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the authentication config
    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// The API key requests are currently signed with
    pub fn api_key(&self) -> Option<&str> {
        self.auth.api_key()
    }

    /// Exchange user credentials for an API key.
    ///
    /// On success every later request is signed with the returned key.
    pub async fn authenticate(&mut self, email: &str, password: &str) -> RestClientResult<()> {
        let credentials = AuthConfig::with_basic(email, password);
        let request = self.builder(Method::GET, "api/authenticate/baseauth", &credentials)?;
        let response: AuthenticateResponse = self.send(request).await.map_err(|e| match e {
            RestClientError::ServerError { details, .. } => RestClientError::Auth(details.err_msg),
            RestClientError::UnexpectedResponse { status, .. } => {
                RestClientError::Auth(format!("authentication rejected with status {}", status))
            }
            other => other,
        })?;

        info!(email, "authenticated against {}", self.base_url);
        self.auth = AuthConfig::with_api_key(response.api_key);
        Ok(())
    }

    /// Server version; doubles as a connectivity check
    pub async fn version(&self) -> RestClientResult<VersionInfo> {
        self.get("api/version", &[]).await
    }

    pub fn workflows(&self) -> Workflows<'_> {
        Workflows::new(self)
    }

    pub fn histories(&self) -> Histories<'_> {
        Histories::new(self)
    }

    pub fn history_contents(&self) -> HistoryContents<'_> {
        HistoryContents::new(self)
    }

    pub fn tools(&self) -> Tools<'_> {
        Tools::new(self)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> RestClientResult<T> {
        let request = self.builder(Method::GET, path, &self.auth)?.query(query);
        self.send(request).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> RestClientResult<T> {
        let request = self.builder(Method::POST, path, &self.auth)?.json(body);
        self.send(request).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> RestClientResult<T> {
        let request = self.builder(Method::PUT, path, &self.auth)?.json(body);
        self.send(request).await
    }

    pub(crate) async fn delete<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> RestClientResult<T> {
        let mut request = self.builder(Method::DELETE, path, &self.auth)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> RestClientResult<T> {
        let request = self.builder(Method::POST, path, &self.auth)?.multipart(form);
        self.send(request).await
    }

    fn builder(
        &self,
        method: Method,
        path: &str,
        auth: &AuthConfig,
    ) -> RestClientResult<RequestBuilder> {
        // Paths are relative so a base URL such as https://host/galaxy/ keeps its prefix.
        let url = self.base_url.join(path)?;
        debug!(method = method.as_str(), path, "galaxy request");

        let headers = auth.headers().map_err(|e| RestClientError::Auth(e.to_string()))?;
        Ok(self.http_client.request(method, url).headers(headers))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> RestClientResult<T> {
        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> RestClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            // 204 and other empty bodies decode as JSON null
            let body = if text.trim().is_empty() { "null" } else { text.as_str() };
            return serde_json::from_str(body).map_err(RestClientError::from);
        }

        warn!(%status, "galaxy request failed");
        match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(details) => Err(RestClientError::ServerError { status, details }),
            Err(_) => Err(RestClientError::UnexpectedResponse { status, body: text }),
        }
    }

    /// Absolute endpoint URL with each segment percent-encoded, for path
    /// components that are not encoded ids (tool ids contain `/` and spaces)
    pub(crate) fn endpoint(&self, segments: &[&str]) -> RestClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RestClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn build_query_params<T: Serialize>(
        &self,
        params: &T,
    ) -> RestClientResult<Vec<(String, String)>> {
        let mut pairs = Vec::new();

        if let serde_json::Value::Object(map) = serde_json::to_value(params)? {
            for (key, val) in map {
                let val_str = match val {
                    serde_json::Value::Null => continue,
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    other => other.to_string(),
                };
                pairs.push((key, val_str));
            }
        }

        Ok(pairs)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
