//! In-memory model of the server-side resources the mock answers from

use std::collections::BTreeMap;

use chrono::Utc;
use gx_client_api::{ClientApiError, ClientApiResult};
use gx_rest_api_contract::*;
use serde_json::{json, Map, Value};

pub(crate) struct StoredWorkflow {
    pub workflow: Workflow,
    pub document: Map<String, Value>,
}

impl StoredWorkflow {
    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            id: self.workflow.id.clone(),
            name: self.workflow.name.clone(),
            owner: self.workflow.owner.clone(),
            published: self.workflow.published,
            deleted: self.workflow.deleted,
            tags: self.workflow.tags.clone(),
            url: self.workflow.url.clone(),
            latest_workflow_uuid: self.workflow.latest_workflow_uuid.clone(),
            number_of_steps: Some(self.workflow.steps.len() as u32),
            update_time: Some(Utc::now().naive_utc()),
            model_class: Some("StoredWorkflow".to_string()),
        }
    }
}

pub(crate) struct StoredInvocation {
    pub invocation: Invocation,
    pub polls: u32,
    /// hid of the dataset each data-input step was fed with
    pub input_hids: BTreeMap<u64, u32>,
}

pub(crate) struct MockState {
    next_id: u64,
    pub workflows: BTreeMap<String, StoredWorkflow>,
    pub invocations: BTreeMap<String, StoredInvocation>,
    pub histories: BTreeMap<String, History>,
    pub contents: BTreeMap<String, Vec<HistoryContent>>,
    pub tools: BTreeMap<String, Tool>,
    pub owner: String,
}

impl MockState {
    pub fn new(owner: impl Into<String>) -> Self {
        let mut state = Self {
            next_id: 0,
            workflows: BTreeMap::new(),
            invocations: BTreeMap::new(),
            histories: BTreeMap::new(),
            contents: BTreeMap::new(),
            tools: BTreeMap::new(),
            owner: owner.into(),
        };
        for (id, name, section) in [
            ("upload1", "Upload File", "Get Data"),
            ("cat1", "Concatenate datasets", "Text Manipulation"),
            ("wc_gnu", "Line/Word/Character count", "Text Manipulation"),
            ("sort1", "Sort", "Filter and Sort"),
        ] {
            state.add_tool(Tool {
                id: id.to_string(),
                name: name.to_string(),
                version: Some("1.0.0".to_string()),
                description: None,
                panel_section_name: Some(section.to_string()),
            });
        }
        state
    }

    pub fn add_tool(&mut self, tool: Tool) {
        self.tools.insert(tool.id.clone(), tool);
    }

    /// Fixed-width hex ids keep map order equal to creation order.
    pub fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:016x}", 0x0a1b_2c3d_0000_0000_u64 + self.next_id)
    }

    pub fn workflow(&self, workflow_id: &str) -> ClientApiResult<&StoredWorkflow> {
        validate_encoded_id("workflow", workflow_id)?;
        self.workflows
            .get(workflow_id)
            .ok_or_else(|| not_found("workflow", workflow_id))
    }

    pub fn workflow_mut(&mut self, workflow_id: &str) -> ClientApiResult<&mut StoredWorkflow> {
        validate_encoded_id("workflow", workflow_id)?;
        self.workflows
            .get_mut(workflow_id)
            .ok_or_else(|| not_found("workflow", workflow_id))
    }

    pub fn history(&self, history_id: &str) -> ClientApiResult<&History> {
        validate_encoded_id("history", history_id)?;
        self.histories
            .get(history_id)
            .ok_or_else(|| not_found("history", history_id))
    }

    pub fn invocation_mut(
        &mut self,
        workflow_id: &str,
        invocation_id: &str,
    ) -> ClientApiResult<&mut StoredInvocation> {
        self.workflow(workflow_id)?;
        validate_encoded_id("invocation", invocation_id)?;
        self.invocations
            .get_mut(invocation_id)
            .filter(|stored| stored.invocation.workflow_id.as_deref() == Some(workflow_id))
            .ok_or_else(|| not_found("invocation", invocation_id))
    }

    pub fn insert_workflow(&mut self, name: String, document: Map<String, Value>) -> Workflow {
        let id = self.next_id();
        let workflow = Workflow {
            id: id.clone(),
            name,
            owner: Some(self.owner.clone()),
            published: false,
            deleted: false,
            tags: Vec::new(),
            annotation: document
                .get("annotation")
                .and_then(Value::as_str)
                .map(str::to_string),
            version: Some(0),
            latest_workflow_uuid: document.get("uuid").and_then(Value::as_str).map(str::to_string),
            inputs: inputs_from_document(&document),
            steps: steps_from_document(&document),
            url: Some(format!("/api/workflows/{}", id)),
        };
        self.workflows.insert(
            id,
            StoredWorkflow {
                workflow: workflow.clone(),
                document,
            },
        );
        workflow
    }

    pub fn insert_history(&mut self, name: String) -> History {
        let id = self.next_id();
        let history = History {
            id: id.clone(),
            name,
            deleted: false,
            purged: false,
            size: Some(0),
            update_time: Some(Utc::now().naive_utc()),
            url: Some(format!("/api/histories/{}", id)),
        };
        self.histories.insert(id.clone(), history.clone());
        self.contents.insert(id, Vec::new());
        history
    }

    /// Append a dataset to a history, assigning the next hid.
    pub fn add_dataset(&mut self, history_id: &str, name: String) -> HistoryContent {
        let id = self.next_id();
        let contents = self.contents.entry(history_id.to_string()).or_default();
        let hid = contents.len() as u32 + 1;
        let content = HistoryContent {
            id,
            name,
            hid: Some(hid),
            content_type: Some("file".to_string()),
            history_content_type: Some("dataset".to_string()),
            state: Some("ok".to_string()),
            deleted: false,
            visible: true,
        };
        contents.push(content.clone());
        content
    }

    pub fn find_dataset(&self, dataset_id: &str) -> Option<&HistoryContent> {
        self.contents
            .values()
            .flat_map(|contents| contents.iter())
            .find(|content| content.id == dataset_id)
    }

    pub fn tool_name(&self, tool_id: &str) -> String {
        self.tools
            .get(tool_id)
            .map(|tool| tool.name.clone())
            .unwrap_or_else(|| tool_id.to_string())
    }
}

pub(crate) fn not_found(kind: &str, id: &str) -> ClientApiError {
    ClientApiError::Server(format!("404 Not Found: no {} with id {}", kind, id))
}

pub(crate) fn bad_request(message: impl Into<String>) -> ClientApiError {
    ClientApiError::Server(format!("400 Bad Request: {}", message.into()))
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Translate the `steps` of a `.ga` document into the shape show returns.
pub(crate) fn steps_from_document(document: &Map<String, Value>) -> BTreeMap<String, WorkflowStep> {
    let Some(Value::Object(steps)) = document.get("steps") else {
        return BTreeMap::new();
    };

    steps
        .iter()
        .map(|(key, step)| {
            let id = step
                .get("id")
                .and_then(Value::as_u64)
                .or_else(|| key.parse().ok())
                .unwrap_or_default();
            let input_steps = step
                .get("input_connections")
                .and_then(Value::as_object)
                .map(|connections| {
                    connections
                        .iter()
                        .filter_map(|(name, connection)| {
                            // Multi-input connections are lists
                            let connection = match connection.as_array() {
                                Some(list) => list.first()?,
                                None => connection,
                            };
                            Some((
                                name.clone(),
                                StepConnection {
                                    source_step: connection.get("id")?.as_u64()?,
                                    step_output: str_field(connection, "output_name")?,
                                },
                            ))
                        })
                        .collect()
                })
                .unwrap_or_default();

            let workflow_step = WorkflowStep {
                id,
                step_type: str_field(step, "type").unwrap_or_else(|| "tool".to_string()),
                tool_id: str_field(step, "tool_id"),
                tool_version: str_field(step, "tool_version"),
                annotation: str_field(step, "annotation"),
                input_steps,
                tool_inputs: Value::Null,
            };
            (id.to_string(), workflow_step)
        })
        .collect()
}

pub(crate) fn inputs_from_document(document: &Map<String, Value>) -> BTreeMap<String, WorkflowInput> {
    let Some(Value::Object(steps)) = document.get("steps") else {
        return BTreeMap::new();
    };

    steps
        .iter()
        .filter(|(_, step)| step.get("type").and_then(Value::as_str) == Some("data_input"))
        .map(|(key, step)| {
            let label = str_field(step, "label")
                .or_else(|| str_field(step, "name"))
                .unwrap_or_else(|| "Input dataset".to_string());
            let input = WorkflowInput {
                label,
                uuid: str_field(step, "uuid"),
                value: String::new(),
            };
            (key.clone(), input)
        })
        .collect()
}

/// Editor-style rendering used by export
pub(crate) fn export_document(workflow: &Workflow) -> Value {
    json!({
        "name": workflow.name,
        "version": workflow.version,
        "annotation": workflow.annotation,
        "inputs": workflow.inputs,
        "steps": workflow.steps,
    })
}

impl MockState {
    /// Finish scheduling an invocation: every tool step gets a job and writes
    /// one output dataset into the invocation's history, named the way
    /// Galaxy names tool outputs ("<tool> on data <hid>").
    pub fn schedule_invocation(&mut self, invocation_id: &str) {
        let Some(stored) = self.invocations.get(invocation_id) else {
            return;
        };
        let workflow_id = stored.invocation.workflow_id.clone().unwrap_or_default();
        let history_id = stored.invocation.history_id.clone().unwrap_or_default();
        let mut hids = stored.input_hids.clone();
        let steps = self
            .workflows
            .get(&workflow_id)
            .map(|stored| ordered_steps(&stored.workflow))
            .unwrap_or_default();

        let mut jobs = BTreeMap::new();
        for step in steps.iter().filter(|step| step.step_type == "tool") {
            let input_hid = step
                .input_steps
                .values()
                .filter_map(|connection| hids.get(&connection.source_step))
                .copied()
                .min();
            let tool_name = self.tool_name(step.tool_id.as_deref().unwrap_or("unknown"));
            let name = match input_hid {
                Some(hid) => format!("{} on data {}", tool_name, hid),
                None => tool_name,
            };
            let output = self.add_dataset(&history_id, name);
            if let Some(hid) = output.hid {
                hids.insert(step.id, hid);
            }
            let job_id = self.next_id();
            jobs.insert(step.id, job_id);
        }

        if let Some(stored) = self.invocations.get_mut(invocation_id) {
            stored.invocation.state = InvocationState::Scheduled;
            stored.invocation.update_time = Some(Utc::now().naive_utc());
            for invocation_step in stored.invocation.steps.iter_mut() {
                invocation_step.state = Some("scheduled".to_string());
                invocation_step.job_id = invocation_step
                    .order_index
                    .and_then(|index| steps.get(index as usize))
                    .and_then(|step| jobs.get(&step.id))
                    .cloned();
            }
        }
    }
}

/// Workflow steps in execution order
pub(crate) fn ordered_steps(workflow: &Workflow) -> Vec<WorkflowStep> {
    let mut steps: Vec<WorkflowStep> = workflow.steps.values().cloned().collect();
    steps.sort_by_key(|step| step.id);
    steps
}
