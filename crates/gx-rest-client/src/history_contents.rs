//! Datasets and collections inside a history

use gx_rest_api_contract::*;

use crate::client::RestClient;
use crate::error::RestClientResult;

#[derive(Debug, Clone, Copy)]
pub struct HistoryContents<'a> {
    client: &'a RestClient,
}

impl<'a> HistoryContents<'a> {
    pub(crate) fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// Contents of a history in `hid` order
    pub async fn index(&self, history_id: &str) -> RestClientResult<Vec<HistoryContent>> {
        validate_encoded_id("history", history_id)?;
        self.client
            .get(&format!("api/histories/{}/contents", history_id), &[])
            .await
    }

    pub async fn show(&self, history_id: &str, content_id: &str) -> RestClientResult<HistoryContent> {
        validate_encoded_id("history", history_id)?;
        validate_encoded_id("history content", content_id)?;
        self.client
            .get(&format!("api/histories/{}/contents/{}", history_id, content_id), &[])
            .await
    }
}
