//! REST API client for Galaxy
//!
//! `RestClient` is the connection and authentication handle. Resource
//! façades (`workflows()`, `histories()`, `history_contents()`, `tools()`)
//! borrow it and issue exactly one HTTP request per method. Identifiers are
//! checked locally before anything is sent; every failure, local or remote,
//! comes back as a `RestClientError`.

pub mod auth;
pub mod client;
pub mod error;
pub mod histories;
pub mod history_contents;
pub mod tools;
pub mod workflows;

pub use auth::*;
pub use client::*;
pub use error::*;
pub use histories::Histories;
pub use history_contents::HistoryContents;
pub use tools::Tools;
pub use workflows::Workflows;

use async_trait::async_trait;
use gx_client_api::{ClientApiError, ClientApiResult, GalaxyApi};
use gx_rest_api_contract::*;
use serde_json::Value;

fn to_client_error(err: RestClientError) -> ClientApiError {
    match err {
        RestClientError::ApiContract(e) => ClientApiError::InvalidRequest(e.to_string()),
        RestClientError::Json(e) => ClientApiError::Unexpected(e.to_string()),
        other => ClientApiError::Server(other.to_string()),
    }
}

#[async_trait]
impl GalaxyApi for client::RestClient {
    async fn list_workflows(&self, show_published: bool) -> ClientApiResult<Vec<WorkflowSummary>> {
        self.workflows().index(show_published).await.map_err(to_client_error)
    }

    async fn show_workflow(&self, workflow_id: &str, instance: bool) -> ClientApiResult<Workflow> {
        self.workflows()
            .show(workflow_id, instance)
            .await
            .map_err(to_client_error)
    }

    async fn create_workflow(&self, request: &CreateWorkflowRequest) -> ClientApiResult<Workflow> {
        self.workflows().create(request).await.map_err(to_client_error)
    }

    async fn update_workflow(
        &self,
        workflow_id: &str,
        request: &UpdateWorkflowRequest,
    ) -> ClientApiResult<Workflow> {
        self.workflows()
            .update_with(workflow_id, request)
            .await
            .map_err(to_client_error)
    }

    async fn create_workflow_from_json(&self, workflow_json: &str) -> ClientApiResult<Workflow> {
        self.workflows()
            .create_from_json(workflow_json)
            .await
            .map_err(to_client_error)
    }

    async fn update_workflow_from_json(
        &self,
        workflow_id: &str,
        workflow_json: &str,
    ) -> ClientApiResult<Workflow> {
        self.workflows()
            .update(workflow_id, workflow_json)
            .await
            .map_err(to_client_error)
    }

    async fn invoke_workflow(
        &self,
        workflow_id: &str,
        request: &InvokeWorkflowRequest,
    ) -> ClientApiResult<Invocation> {
        self.workflows()
            .invoke(workflow_id, request)
            .await
            .map_err(to_client_error)
    }

    async fn list_invocations(&self, workflow_id: &str) -> ClientApiResult<Vec<Invocation>> {
        self.workflows()
            .index_invocations(workflow_id)
            .await
            .map_err(to_client_error)
    }

    async fn show_invocation(
        &self,
        workflow_id: &str,
        invocation_id: &str,
    ) -> ClientApiResult<Invocation> {
        self.workflows()
            .show_invocation(workflow_id, invocation_id)
            .await
            .map_err(to_client_error)
    }

    async fn show_invocation_step(
        &self,
        workflow_id: &str,
        invocation_id: &str,
        step_id: &str,
    ) -> ClientApiResult<InvocationStep> {
        self.workflows()
            .invocation_step(workflow_id, invocation_id, step_id)
            .await
            .map_err(to_client_error)
    }

    async fn update_invocation_step(
        &self,
        workflow_id: &str,
        invocation_id: &str,
        step_id: &str,
        action: bool,
    ) -> ClientApiResult<InvocationStep> {
        self.workflows()
            .update_invocation_step(workflow_id, invocation_id, step_id, action)
            .await
            .map_err(to_client_error)
    }

    async fn cancel_invocation(
        &self,
        workflow_id: &str,
        invocation_id: &str,
    ) -> ClientApiResult<Invocation> {
        self.workflows()
            .cancel_invocation(workflow_id, invocation_id)
            .await
            .map_err(to_client_error)
    }

    async fn export_workflow(&self, workflow_id: &str) -> ClientApiResult<Value> {
        self.workflows().export(workflow_id).await.map_err(to_client_error)
    }

    async fn download_workflow(&self, workflow_id: &str) -> ClientApiResult<Value> {
        self.workflows().download(workflow_id).await.map_err(to_client_error)
    }

    async fn build_module(&self, request: &BuildModuleRequest) -> ClientApiResult<Value> {
        self.workflows().build_module(request).await.map_err(to_client_error)
    }

    async fn delete_workflow(&self, workflow_id: &str) -> ClientApiResult<WorkflowDeletion> {
        self.workflows().delete(workflow_id).await.map_err(to_client_error)
    }

    async fn list_histories(&self) -> ClientApiResult<Vec<History>> {
        self.histories().index().await.map_err(to_client_error)
    }

    async fn show_history(&self, history_id: &str) -> ClientApiResult<History> {
        self.histories().show(history_id).await.map_err(to_client_error)
    }

    async fn create_history(&self, name: &str) -> ClientApiResult<History> {
        self.histories().create(name).await.map_err(to_client_error)
    }

    async fn delete_history(&self, history_id: &str, purge: bool) -> ClientApiResult<History> {
        self.histories()
            .delete(history_id, purge)
            .await
            .map_err(to_client_error)
    }

    async fn list_history_contents(
        &self,
        history_id: &str,
    ) -> ClientApiResult<Vec<HistoryContent>> {
        self.history_contents()
            .index(history_id)
            .await
            .map_err(to_client_error)
    }

    async fn show_history_content(
        &self,
        history_id: &str,
        content_id: &str,
    ) -> ClientApiResult<HistoryContent> {
        self.history_contents()
            .show(history_id, content_id)
            .await
            .map_err(to_client_error)
    }

    async fn list_tools(&self) -> ClientApiResult<Vec<Tool>> {
        self.tools().index().await.map_err(to_client_error)
    }

    async fn show_tool(&self, tool_id: &str) -> ClientApiResult<Tool> {
        self.tools().show(tool_id).await.map_err(to_client_error)
    }

    async fn run_upload(
        &self,
        tool_id: &str,
        history_id: &str,
        files: &[UploadFile],
    ) -> ClientApiResult<ToolRun> {
        self.tools()
            .create(tool_id, history_id, files)
            .await
            .map_err(to_client_error)
    }
}
