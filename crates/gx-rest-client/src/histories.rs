//! History endpoints

use gx_rest_api_contract::*;
use validator::Validate;

use crate::client::RestClient;
use crate::error::RestClientResult;

/// Façade over `/api/histories`
#[derive(Debug, Clone, Copy)]
pub struct Histories<'a> {
    client: &'a RestClient,
}

impl<'a> Histories<'a> {
    pub(crate) fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    pub async fn index(&self) -> RestClientResult<Vec<History>> {
        self.client.get("api/histories", &[]).await
    }

    pub async fn show(&self, history_id: &str) -> RestClientResult<History> {
        validate_encoded_id("history", history_id)?;
        self.client.get(&format!("api/histories/{}", history_id), &[]).await
    }

    /// Create a new, empty history and make it the user's current one
    pub async fn create(&self, name: &str) -> RestClientResult<History> {
        let request = CreateHistoryRequest {
            name: name.to_string(),
        };
        request.validate().map_err(ApiContractError::from)?;
        self.client.post("api/histories", &request).await
    }

    /// Mark a history deleted, purging its datasets when `purge` is set
    pub async fn delete(&self, history_id: &str, purge: bool) -> RestClientResult<History> {
        validate_encoded_id("history", history_id)?;
        self.client
            .delete(
                &format!("api/histories/{}", history_id),
                Some(&DeleteHistoryRequest { purge }),
            )
            .await
    }
}
