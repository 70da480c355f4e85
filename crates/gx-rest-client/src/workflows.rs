//! Workflow, invocation and invocation-step endpoints

use gx_rest_api_contract::*;
use serde_json::Value;
use tracing::debug;
use validator::Validate;

use crate::client::RestClient;
use crate::error::RestClientResult;

/// Façade over `/api/workflows`
#[derive(Debug, Clone, Copy)]
pub struct Workflows<'a> {
    client: &'a RestClient,
}

impl<'a> Workflows<'a> {
    pub(crate) fn new(client: &'a RestClient) -> Self {
        Self { client }
    }

    /// List workflows owned by or shared with the user, plus published
    /// workflows when `show_published` is set
    pub async fn index(&self, show_published: bool) -> RestClientResult<Vec<WorkflowSummary>> {
        let query = WorkflowListQuery {
            show_published: Some(show_published),
            ..WorkflowListQuery::default()
        };
        self.list(&query).await
    }

    pub async fn list(&self, query: &WorkflowListQuery) -> RestClientResult<Vec<WorkflowSummary>> {
        let params = self.client.build_query_params(query)?;
        self.client.get("api/workflows", &params).await
    }

    /// Detailed view of a workflow, including its steps
    pub async fn show(&self, workflow_id: &str, instance: bool) -> RestClientResult<Workflow> {
        validate_encoded_id("workflow", workflow_id)?;
        let query = WorkflowShowQuery {
            instance: instance.then_some(true),
        };
        let params = self.client.build_query_params(&query)?;
        self.client.get(&format!("api/workflows/{}", workflow_id), &params).await
    }

    /// Import a workflow document or extract one from a history
    pub async fn create(&self, request: &CreateWorkflowRequest) -> RestClientResult<Workflow> {
        if request.workflow.is_none() && request.from_history_id.is_none() {
            return Err(ApiContractError::MissingField("workflow").into());
        }
        request.validate().map_err(ApiContractError::from)?;
        self.client.post("api/workflows", request).await
    }

    /// Import a workflow from the text of a `.ga` file
    pub async fn create_from_json(&self, workflow_json: &str) -> RestClientResult<Workflow> {
        let request = CreateWorkflowRequest::from_json(workflow_json)?;
        self.create(&request).await
    }

    /// Replace a workflow's definition with a new `.ga` document
    pub async fn update(&self, workflow_id: &str, workflow_json: &str) -> RestClientResult<Workflow> {
        let request = UpdateWorkflowRequest::from_json(workflow_json)?;
        self.update_with(workflow_id, &request).await
    }

    pub async fn update_with(
        &self,
        workflow_id: &str,
        request: &UpdateWorkflowRequest,
    ) -> RestClientResult<Workflow> {
        validate_encoded_id("workflow", workflow_id)?;
        self.client.put(&format!("api/workflows/{}", workflow_id), request).await
    }

    /// Schedule a workflow run. The returned invocation is normally `new`;
    /// the server advances it asynchronously.
    pub async fn invoke(
        &self,
        workflow_id: &str,
        request: &InvokeWorkflowRequest,
    ) -> RestClientResult<Invocation> {
        validate_encoded_id("workflow", workflow_id)?;
        request.validate().map_err(ApiContractError::from)?;
        debug!(workflow_id, inputs = request.inputs.len(), "invoking workflow");
        self.client
            .post(&format!("api/workflows/{}/invocations", workflow_id), request)
            .await
    }

    pub async fn index_invocations(&self, workflow_id: &str) -> RestClientResult<Vec<Invocation>> {
        validate_encoded_id("workflow", workflow_id)?;
        self.client
            .get(&format!("api/workflows/{}/invocations", workflow_id), &[])
            .await
    }

    pub async fn show_invocation(
        &self,
        workflow_id: &str,
        invocation_id: &str,
    ) -> RestClientResult<Invocation> {
        self.client.get(&invocation_path(workflow_id, invocation_id)?, &[]).await
    }

    /// Details of one step of an invocation
    pub async fn invocation_step(
        &self,
        workflow_id: &str,
        invocation_id: &str,
        step_id: &str,
    ) -> RestClientResult<InvocationStep> {
        let path = step_path(workflow_id, invocation_id, step_id)?;
        self.client.get(&path, &[]).await
    }

    /// Resume (`action = true`) or cancel a paused invocation step
    pub async fn update_invocation_step(
        &self,
        workflow_id: &str,
        invocation_id: &str,
        step_id: &str,
        action: bool,
    ) -> RestClientResult<InvocationStep> {
        let path = step_path(workflow_id, invocation_id, step_id)?;
        self.client.put(&path, &InvocationStepAction { action }).await
    }

    pub async fn cancel_invocation(
        &self,
        workflow_id: &str,
        invocation_id: &str,
    ) -> RestClientResult<Invocation> {
        let path = invocation_path(workflow_id, invocation_id)?;
        self.client.delete(&path, None::<&()>).await
    }

    /// Workflow as the editor renders it; inputs carry the editor's
    /// form state rather than the `.ga` step fields
    pub async fn export(&self, workflow_id: &str) -> RestClientResult<Value> {
        self.fetch_document(workflow_id, Some("editor")).await
    }

    /// Workflow document as served for download (`.ga` style)
    pub async fn download(&self, workflow_id: &str) -> RestClientResult<Value> {
        self.fetch_document(workflow_id, None).await
    }

    /// Render a module as the workflow editor would when it is added to a
    /// workflow
    pub async fn build_module(&self, request: &BuildModuleRequest) -> RestClientResult<Value> {
        request.validate().map_err(ApiContractError::from)?;
        self.client.post("api/workflows/build_module", request).await
    }

    pub async fn delete(&self, workflow_id: &str) -> RestClientResult<WorkflowDeletion> {
        validate_encoded_id("workflow", workflow_id)?;
        self.client
            .delete(&format!("api/workflows/{}", workflow_id), None::<&()>)
            .await
    }

    async fn fetch_document(&self, workflow_id: &str, style: Option<&str>) -> RestClientResult<Value> {
        validate_encoded_id("workflow", workflow_id)?;
        let query = WorkflowDownloadQuery {
            style: style.map(str::to_string),
        };
        let params = self.client.build_query_params(&query)?;
        self.client
            .get(&format!("api/workflows/{}/download", workflow_id), &params)
            .await
    }
}

fn invocation_path(workflow_id: &str, invocation_id: &str) -> RestClientResult<String> {
    validate_encoded_id("workflow", workflow_id)?;
    validate_encoded_id("invocation", invocation_id)?;
    Ok(format!("api/workflows/{}/invocations/{}", workflow_id, invocation_id))
}

fn step_path(workflow_id: &str, invocation_id: &str, step_id: &str) -> RestClientResult<String> {
    let base = invocation_path(workflow_id, invocation_id)?;
    validate_encoded_id("invocation step", step_id)?;
    Ok(format!("{}/steps/{}", base, step_id))
}
