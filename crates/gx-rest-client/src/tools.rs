//! Tool listing and execution, including dataset uploads

use gx_rest_api_contract::*;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::client::RestClient;
use crate::error::RestClientResult;

#[derive(Debug, Clone, Copy)]
pub struct Tools<'a> {
    client: &'a RestClient,
}

impl<'a> Tools<'a> {
    pub(crate) fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// Flat list of every tool in the toolbox
    pub async fn index(&self) -> RestClientResult<Vec<Tool>> {
        let query = ToolListQuery {
            in_panel: Some(false),
        };
        let params = self.client.build_query_params(&query)?;
        self.client.get("api/tools", &params).await
    }

    /// Toolbox as the tool panel shows it: sections whose `elems` hold tools,
    /// labels and nested sections
    pub async fn panel(&self) -> RestClientResult<Value> {
        let query = ToolListQuery {
            in_panel: Some(true),
        };
        let params = self.client.build_query_params(&query)?;
        self.client.get("api/tools", &params).await
    }

    pub async fn show(&self, tool_id: &str) -> RestClientResult<Tool> {
        if tool_id.is_empty() {
            return Err(ApiContractError::MissingField("tool_id").into());
        }
        let url = self.client.endpoint(&["api", "tools", tool_id])?;
        self.client.get(url.as_str(), &[]).await
    }

    /// Run an upload tool (normally `upload1`) that places `files` into a
    /// history. Every file is read before the request is sent.
    pub async fn create(
        &self,
        tool_id: &str,
        history_id: &str,
        files: &[UploadFile],
    ) -> RestClientResult<ToolRun> {
        if tool_id.is_empty() {
            return Err(ApiContractError::MissingField("tool_id").into());
        }
        validate_encoded_id("history", history_id)?;

        let inputs = serde_json::to_string(&upload_tool_inputs(files))?;
        let mut form = Form::new()
            .text("tool_id", tool_id.to_string())
            .text("history_id", history_id.to_string())
            .text("inputs", inputs);

        for (index, file) in files.iter().enumerate() {
            let data = tokio::fs::read(&file.path).await?;
            debug!(name = %file.name, bytes = data.len(), "attaching upload");
            form = form.part(upload_field_name(index), Part::bytes(data).file_name(file.name.clone()));
        }

        self.client.post_multipart("api/tools", form).await
    }
}
