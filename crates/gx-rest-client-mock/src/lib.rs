//! Mock Galaxy client backed by an in-memory server model
//!
//! `MockClient` answers the `GalaxyApi` operations the way a Galaxy server
//! would for the cases the workflow test suite exercises: malformed ids are
//! refused, unknown ids are "404"s, invocations start out `new` and move to
//! `scheduled` after being polled, and scheduled tool steps drop their
//! outputs into the target history.

mod state;

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use gx_client_api::{ClientApiError, ClientApiResult, GalaxyApi};
use gx_rest_api_contract::*;
use serde_json::{json, Value};
use tracing::debug;
use validator::Validate;

use state::{
    bad_request, export_document, inputs_from_document, not_found, ordered_steps,
    steps_from_document, MockState, StoredInvocation,
};

/// Number of `show_invocation` polls before an invocation is scheduled
const DEFAULT_POLLS_TO_SCHEDULE: u32 = 2;

pub struct MockClient {
    state: Mutex<MockState>,
    polls_to_schedule: u32,
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::new("admin")),
            polls_to_schedule: DEFAULT_POLLS_TO_SCHEDULE,
        }
    }

    /// Change how many polls an invocation spends in progress.
    pub fn with_polls_to_schedule(mut self, polls: u32) -> Self {
        self.polls_to_schedule = polls.max(1);
        self
    }

    /// Register an extra tool in the mock's toolbox.
    pub fn with_tool(self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.lock().add_tool(Tool {
            id: id.into(),
            name: name.into(),
            version: Some("1.0.0".to_string()),
            description: None,
            panel_section_name: None,
        });
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GalaxyApi for MockClient {
    async fn list_workflows(&self, show_published: bool) -> ClientApiResult<Vec<WorkflowSummary>> {
        let state = self.lock();
        Ok(state
            .workflows
            .values()
            .filter(|stored| !stored.workflow.deleted)
            .filter(|stored| {
                show_published || stored.workflow.owner.as_deref() == Some(state.owner.as_str())
            })
            .map(|stored| stored.summary())
            .collect())
    }

    async fn show_workflow(&self, workflow_id: &str, _instance: bool) -> ClientApiResult<Workflow> {
        Ok(self.lock().workflow(workflow_id)?.workflow.clone())
    }

    async fn create_workflow(&self, request: &CreateWorkflowRequest) -> ClientApiResult<Workflow> {
        request.validate().map_err(ApiContractError::from)?;
        let mut state = self.lock();

        let (name, document) = match (&request.workflow, &request.from_history_id) {
            (Some(document), _) => {
                let name = document
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("Unnamed workflow")
                    .to_string();
                (name, document.clone())
            }
            (None, Some(history_id)) => {
                state.history(history_id)?;
                let mut steps = serde_json::Map::new();
                for (index, dataset_id) in request.dataset_ids.iter().enumerate() {
                    if state.find_dataset(dataset_id).is_none() {
                        return Err(not_found("dataset", dataset_id));
                    }
                    steps.insert(
                        index.to_string(),
                        json!({"id": index, "type": "data_input", "name": "Input dataset"}),
                    );
                }
                let name = request
                    .workflow_name
                    .clone()
                    .unwrap_or_else(|| "Workflow constructed from history".to_string());
                let mut document = serde_json::Map::new();
                document.insert("name".into(), Value::from(name.clone()));
                document.insert("steps".into(), Value::Object(steps));
                (name, document)
            }
            (None, None) => return Err(ApiContractError::MissingField("workflow").into()),
        };

        let mut workflow = state.insert_workflow(name, document);
        if let Some(publish) = request.publish {
            workflow.published = publish;
            state.workflow_mut(&workflow.id)?.workflow.published = publish;
        }
        debug!(workflow_id = %workflow.id, "mock workflow created");
        Ok(workflow)
    }

    async fn update_workflow(
        &self,
        workflow_id: &str,
        request: &UpdateWorkflowRequest,
    ) -> ClientApiResult<Workflow> {
        let mut state = self.lock();
        let stored = state.workflow_mut(workflow_id)?;
        let document = request.workflow.clone();

        if let Some(name) = document.get("name").and_then(Value::as_str) {
            stored.workflow.name = name.to_string();
        }
        stored.workflow.steps = steps_from_document(&document);
        stored.workflow.inputs = inputs_from_document(&document);
        stored.workflow.version = Some(stored.workflow.version.unwrap_or_default() + 1);
        stored.document = document;
        Ok(stored.workflow.clone())
    }

    async fn invoke_workflow(
        &self,
        workflow_id: &str,
        request: &InvokeWorkflowRequest,
    ) -> ClientApiResult<Invocation> {
        request.validate().map_err(ApiContractError::from)?;
        let mut state = self.lock();

        let stored = state.workflow(workflow_id)?;
        if stored.workflow.deleted {
            return Err(bad_request("workflow has been deleted"));
        }
        let workflow_name = stored.workflow.name.clone();
        let steps = ordered_steps(&stored.workflow);

        let by_step_id = request.inputs_by.as_deref() == Some("step_id");
        let mut input_hids = std::collections::BTreeMap::new();
        for (position, step) in steps.iter().enumerate() {
            if step.step_type != "data_input" {
                continue;
            }
            let key = if by_step_id {
                step.id.to_string()
            } else {
                position.to_string()
            };
            let input = request.inputs.get(&key).ok_or_else(|| {
                bad_request(format!(
                    "Workflow cannot be run because input step '{}' is not specified",
                    step.id
                ))
            })?;
            let dataset = state
                .find_dataset(&input.id)
                .ok_or_else(|| not_found("dataset", &input.id))?;
            if let Some(hid) = dataset.hid {
                input_hids.insert(step.id, hid);
            }
        }

        let history_id = match &request.history_id {
            Some(history_id) => state.history(history_id)?.id.clone(),
            None => {
                let name = request
                    .history
                    .clone()
                    .unwrap_or_else(|| format!("{} output", workflow_name));
                state.insert_history(name).id
            }
        };

        let invocation_id = state.next_id();
        let mut invocation_steps = Vec::with_capacity(steps.len());
        for position in 0..steps.len() {
            invocation_steps.push(InvocationStep {
                id: state.next_id(),
                order_index: Some(position as u32),
                workflow_step_id: None,
                workflow_step_label: None,
                state: Some("new".to_string()),
                job_id: None,
                action: None,
                update_time: None,
            });
        }

        let invocation = Invocation {
            id: invocation_id.clone(),
            workflow_id: Some(workflow_id.to_string()),
            history_id: Some(history_id),
            state: InvocationState::New,
            uuid: None,
            update_time: Some(Utc::now().naive_utc()),
            steps: invocation_steps,
            model_class: Some("WorkflowInvocation".to_string()),
        };
        state.invocations.insert(
            invocation_id,
            StoredInvocation {
                invocation: invocation.clone(),
                polls: 0,
                input_hids,
            },
        );
        Ok(invocation)
    }

    async fn list_invocations(&self, workflow_id: &str) -> ClientApiResult<Vec<Invocation>> {
        let state = self.lock();
        state.workflow(workflow_id)?;
        Ok(state
            .invocations
            .values()
            .filter(|stored| stored.invocation.workflow_id.as_deref() == Some(workflow_id))
            .map(|stored| stored.invocation.clone())
            .collect())
    }

    async fn show_invocation(
        &self,
        workflow_id: &str,
        invocation_id: &str,
    ) -> ClientApiResult<Invocation> {
        let mut state = self.lock();
        let stored = state.invocation_mut(workflow_id, invocation_id)?;
        if stored.invocation.state.is_in_progress() {
            stored.polls += 1;
            if stored.polls < self.polls_to_schedule {
                stored.invocation.state = InvocationState::Running;
                for step in stored.invocation.steps.iter_mut() {
                    step.state = Some("ready".to_string());
                }
            } else {
                state.schedule_invocation(invocation_id);
            }
        }
        Ok(state.invocation_mut(workflow_id, invocation_id)?.invocation.clone())
    }

    async fn show_invocation_step(
        &self,
        workflow_id: &str,
        invocation_id: &str,
        step_id: &str,
    ) -> ClientApiResult<InvocationStep> {
        validate_encoded_id("invocation step", step_id)?;
        let mut state = self.lock();
        let stored = state.invocation_mut(workflow_id, invocation_id)?;
        stored
            .invocation
            .steps
            .iter()
            .find(|step| step.id == step_id)
            .cloned()
            .ok_or_else(|| not_found("invocation step", step_id))
    }

    async fn update_invocation_step(
        &self,
        workflow_id: &str,
        invocation_id: &str,
        step_id: &str,
        action: bool,
    ) -> ClientApiResult<InvocationStep> {
        validate_encoded_id("invocation step", step_id)?;
        let mut state = self.lock();
        let stored = state.invocation_mut(workflow_id, invocation_id)?;
        let step = stored
            .invocation
            .steps
            .iter_mut()
            .find(|step| step.id == step_id)
            .ok_or_else(|| not_found("invocation step", step_id))?;
        step.action = Some(action);
        step.update_time = Some(Utc::now().naive_utc());
        Ok(step.clone())
    }

    async fn cancel_invocation(
        &self,
        workflow_id: &str,
        invocation_id: &str,
    ) -> ClientApiResult<Invocation> {
        let mut state = self.lock();
        let stored = state.invocation_mut(workflow_id, invocation_id)?;
        stored.invocation.state = InvocationState::Cancelled;
        stored.invocation.update_time = Some(Utc::now().naive_utc());
        Ok(stored.invocation.clone())
    }

    async fn export_workflow(&self, workflow_id: &str) -> ClientApiResult<Value> {
        Ok(export_document(&self.lock().workflow(workflow_id)?.workflow))
    }

    async fn download_workflow(&self, workflow_id: &str) -> ClientApiResult<Value> {
        let state = self.lock();
        let stored = state.workflow(workflow_id)?;
        let mut document = stored.document.clone();
        document
            .entry("a_galaxy_workflow")
            .or_insert_with(|| Value::from("true"));
        document
            .entry("format-version")
            .or_insert_with(|| Value::from("0.1"));
        document.insert("name".into(), Value::from(stored.workflow.name.clone()));
        Ok(Value::Object(document))
    }

    async fn build_module(&self, request: &BuildModuleRequest) -> ClientApiResult<Value> {
        request.validate().map_err(ApiContractError::from)?;
        let state = self.lock();
        match request.module_type.as_str() {
            "tool" => {
                let tool_id = request
                    .tool_id
                    .as_deref()
                    .ok_or(ApiContractError::MissingField("tool_id"))?;
                let tool = state
                    .tools
                    .get(tool_id)
                    .ok_or_else(|| not_found("tool", tool_id))?;
                Ok(json!({
                    "type": "tool",
                    "name": tool.name,
                    "tool_id": tool.id,
                    "tool_version": tool.version,
                    "inputs": request.inputs.clone().unwrap_or(Value::Null),
                }))
            }
            "data_input" | "data_collection_input" | "parameter_input" | "pause" => Ok(json!({
                "type": request.module_type,
                "name": request.module_type.replace('_', " "),
            })),
            other => Err(bad_request(format!("unknown module type '{}'", other))),
        }
    }

    async fn delete_workflow(&self, workflow_id: &str) -> ClientApiResult<WorkflowDeletion> {
        let mut state = self.lock();
        let stored = state.workflow_mut(workflow_id)?;
        stored.workflow.deleted = true;
        Ok(WorkflowDeletion::Workflow(stored.summary()))
    }

    async fn list_histories(&self) -> ClientApiResult<Vec<History>> {
        Ok(self
            .lock()
            .histories
            .values()
            .filter(|history| !history.deleted)
            .cloned()
            .collect())
    }

    async fn show_history(&self, history_id: &str) -> ClientApiResult<History> {
        self.lock().history(history_id).cloned()
    }

    async fn create_history(&self, name: &str) -> ClientApiResult<History> {
        let request = CreateHistoryRequest {
            name: name.to_string(),
        };
        request.validate().map_err(ApiContractError::from)?;
        Ok(self.lock().insert_history(request.name))
    }

    async fn delete_history(&self, history_id: &str, purge: bool) -> ClientApiResult<History> {
        let mut state = self.lock();
        state.history(history_id)?;
        let history = state
            .histories
            .get_mut(history_id)
            .ok_or_else(|| not_found("history", history_id))?;
        history.deleted = true;
        history.purged = purge;
        Ok(history.clone())
    }

    async fn list_history_contents(
        &self,
        history_id: &str,
    ) -> ClientApiResult<Vec<HistoryContent>> {
        let state = self.lock();
        state.history(history_id)?;
        Ok(state.contents.get(history_id).cloned().unwrap_or_default())
    }

    async fn show_history_content(
        &self,
        history_id: &str,
        content_id: &str,
    ) -> ClientApiResult<HistoryContent> {
        validate_encoded_id("history content", content_id)?;
        let state = self.lock();
        state.history(history_id)?;
        state
            .contents
            .get(history_id)
            .and_then(|contents| contents.iter().find(|content| content.id == content_id))
            .cloned()
            .ok_or_else(|| not_found("history content", content_id))
    }

    async fn list_tools(&self) -> ClientApiResult<Vec<Tool>> {
        Ok(self.lock().tools.values().cloned().collect())
    }

    async fn show_tool(&self, tool_id: &str) -> ClientApiResult<Tool> {
        self.lock()
            .tools
            .get(tool_id)
            .cloned()
            .ok_or_else(|| not_found("tool", tool_id))
    }

    async fn run_upload(
        &self,
        tool_id: &str,
        history_id: &str,
        files: &[UploadFile],
    ) -> ClientApiResult<ToolRun> {
        for file in files {
            std::fs::metadata(&file.path).map_err(|e| {
                ClientApiError::InvalidRequest(format!("cannot read {}: {}", file.path.display(), e))
            })?;
        }

        let mut state = self.lock();
        if !state.tools.contains_key(tool_id) {
            return Err(not_found("tool", tool_id));
        }
        state.history(history_id)?;

        let mut outputs = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            let content = state.add_dataset(history_id, file.name.clone());
            outputs.push(ToolOutput {
                id: content.id,
                name: content.name,
                hid: content.hid,
                output_name: Some(format!("output{}", index)),
            });
        }
        let job = Job {
            id: state.next_id(),
            tool_id: Some(tool_id.to_string()),
            state: Some("ok".to_string()),
        };

        Ok(ToolRun {
            outputs,
            jobs: vec![job],
            implicit_collections: Vec::new(),
            output_collections: Vec::new(),
        })
    }
}
