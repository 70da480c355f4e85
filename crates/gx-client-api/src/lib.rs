//! Client API trait for Galaxy workflow resources
//!
//! Every operation either yields the decoded resource or a `ClientApiError`.
//! Callers are expected to treat all errors alike: a bad identifier, a
//! rejected payload and an unreachable server are reported through the same
//! channel and none of them is retried.

use async_trait::async_trait;
use gx_rest_api_contract::*;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl From<ApiContractError> for ClientApiError {
    fn from(err: ApiContractError) -> Self {
        ClientApiError::InvalidRequest(err.to_string())
    }
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

#[async_trait]
pub trait GalaxyApi: Send + Sync {
    // Workflows
    async fn list_workflows(&self, show_published: bool) -> ClientApiResult<Vec<WorkflowSummary>>;
    async fn show_workflow(&self, workflow_id: &str, instance: bool) -> ClientApiResult<Workflow>;
    async fn create_workflow(&self, request: &CreateWorkflowRequest) -> ClientApiResult<Workflow>;
    async fn update_workflow(
        &self,
        workflow_id: &str,
        request: &UpdateWorkflowRequest,
    ) -> ClientApiResult<Workflow>;
    /// Create a workflow from `.ga` text; text that is not a JSON object is
    /// refused without contacting the server
    async fn create_workflow_from_json(&self, workflow_json: &str) -> ClientApiResult<Workflow> {
        let request = CreateWorkflowRequest::from_json(workflow_json)?;
        self.create_workflow(&request).await
    }
    async fn update_workflow_from_json(
        &self,
        workflow_id: &str,
        workflow_json: &str,
    ) -> ClientApiResult<Workflow> {
        let request = UpdateWorkflowRequest::from_json(workflow_json)?;
        self.update_workflow(workflow_id, &request).await
    }
    async fn invoke_workflow(
        &self,
        workflow_id: &str,
        request: &InvokeWorkflowRequest,
    ) -> ClientApiResult<Invocation>;
    async fn list_invocations(&self, workflow_id: &str) -> ClientApiResult<Vec<Invocation>>;
    async fn show_invocation(
        &self,
        workflow_id: &str,
        invocation_id: &str,
    ) -> ClientApiResult<Invocation>;
    async fn show_invocation_step(
        &self,
        workflow_id: &str,
        invocation_id: &str,
        step_id: &str,
    ) -> ClientApiResult<InvocationStep>;
    async fn update_invocation_step(
        &self,
        workflow_id: &str,
        invocation_id: &str,
        step_id: &str,
        action: bool,
    ) -> ClientApiResult<InvocationStep>;
    async fn cancel_invocation(
        &self,
        workflow_id: &str,
        invocation_id: &str,
    ) -> ClientApiResult<Invocation>;
    async fn export_workflow(&self, workflow_id: &str) -> ClientApiResult<Value>;
    async fn download_workflow(&self, workflow_id: &str) -> ClientApiResult<Value>;
    async fn build_module(&self, request: &BuildModuleRequest) -> ClientApiResult<Value>;
    async fn delete_workflow(&self, workflow_id: &str) -> ClientApiResult<WorkflowDeletion>;

    // Histories and their contents
    async fn list_histories(&self) -> ClientApiResult<Vec<History>>;
    async fn show_history(&self, history_id: &str) -> ClientApiResult<History>;
    async fn create_history(&self, name: &str) -> ClientApiResult<History>;
    async fn delete_history(&self, history_id: &str, purge: bool) -> ClientApiResult<History>;
    async fn list_history_contents(&self, history_id: &str)
        -> ClientApiResult<Vec<HistoryContent>>;
    async fn show_history_content(
        &self,
        history_id: &str,
        content_id: &str,
    ) -> ClientApiResult<HistoryContent>;

    // Tools
    async fn list_tools(&self) -> ClientApiResult<Vec<Tool>>;
    async fn show_tool(&self, tool_id: &str) -> ClientApiResult<Tool>;
    async fn run_upload(
        &self,
        tool_id: &str,
        history_id: &str,
        files: &[UploadFile],
    ) -> ClientApiResult<ToolRun>;
}
