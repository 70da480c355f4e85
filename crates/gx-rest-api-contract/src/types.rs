//! API contract types for the Galaxy workflow REST service

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use validator::{Validate, ValidationError};

use crate::error::ApiContractResult;
use crate::validation::{encoded_id_field, is_encoded_id, parse_workflow_document};

/// Workflow invocation lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationState {
    New,
    Ready,
    Running,
    Scheduled,
    Cancelling,
    Cancelled,
    Failed,
    #[serde(other)]
    Unknown,
}

impl InvocationState {
    /// The remote engine is still scheduling this invocation.
    pub fn is_in_progress(self) -> bool {
        matches!(self, InvocationState::New | InvocationState::Running)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_in_progress()
    }
}

/// Source of a dataset referenced as a workflow input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSource {
    /// History dataset association
    Hda,
    /// Library dataset
    Ldda,
    /// History dataset collection association
    Hdca,
}

/// Workflow entry as returned by the index endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_workflow_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_class: Option<String>,
}

/// Detailed workflow description returned by show, create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_workflow_uuid: Option<String>,
    /// Workflow inputs keyed by step index
    #[serde(default)]
    pub inputs: BTreeMap<String, WorkflowInput>,
    /// Workflow steps keyed by step id
    #[serde(default)]
    pub steps: BTreeMap<String, WorkflowStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInput {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: u64,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(default)]
    pub input_steps: BTreeMap<String, StepConnection>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub tool_inputs: Value,
}

/// Connection from an upstream step output into a step input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConnection {
    pub source_step: u64,
    pub step_output: String,
}

/// One execution instance of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<String>,
    pub state: InvocationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub steps: Vec<InvocationStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_class: Option<String>,
}

/// Execution record of one workflow node within an invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationStep {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_step_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_step_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<NaiveDateTime>,
}

/// Result of deleting a workflow.
///
/// Depending on the server version Galaxy answers with a status message,
/// with the deleted workflow itself, or with `204 No Content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkflowDeletion {
    Workflow(WorkflowSummary),
    Message(String),
    /// Empty response body
    NoContent,
}

impl WorkflowDeletion {
    pub fn is_deleted(&self) -> bool {
        match self {
            WorkflowDeletion::Workflow(workflow) => workflow.deleted,
            WorkflowDeletion::Message(_) | WorkflowDeletion::NoContent => true,
        }
    }
}

/// History summary and detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub purged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Dataset or collection held in a history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryContent {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hid: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

/// Tool description from the tools index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_section_name: Option<String>,
}

/// Response to a tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRun {
    #[serde(default)]
    pub outputs: Vec<ToolOutput>,
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub implicit_collections: Vec<Value>,
    #[serde(default)]
    pub output_collections: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Error payload returned by Galaxy on non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub err_msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err_code: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticateResponse {
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version_major: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_minor: Option<String>,
}

/// Query parameters for the workflow index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_deleted: Option<bool>,
}

/// Query parameters for showing a single workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowShowQuery {
    /// Interpret the id as a stored workflow instance rather than the
    /// stored workflow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<bool>,
}

/// Query parameters for downloading a workflow document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDownloadQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Query parameters for the tools index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_panel: Option<bool>,
}

/// Workflow creation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateWorkflowRequest {
    /// Workflow document in `.ga` format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Map<String, Value>>,
    /// Extract a workflow from an existing history instead
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "encoded_id_field"))]
    pub from_history_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[validate(custom(function = "encoded_id_list"))]
    pub job_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[validate(custom(function = "encoded_id_list"))]
    pub dataset_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importable: Option<bool>,
}

impl CreateWorkflowRequest {
    /// Build a request from workflow text, failing if it is not a JSON object.
    pub fn from_json(text: &str) -> ApiContractResult<Self> {
        Ok(Self {
            workflow: Some(parse_workflow_document(text)?),
            ..Self::default()
        })
    }

    pub fn from_history(history_id: impl Into<String>, workflow_name: impl Into<String>) -> Self {
        Self {
            from_history_id: Some(history_id.into()),
            workflow_name: Some(workflow_name.into()),
            ..Self::default()
        }
    }

    pub fn published(mut self, publish: bool) -> Self {
        self.publish = Some(publish);
        self
    }
}

/// Workflow update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateWorkflowRequest {
    pub workflow: Map<String, Value>,
}

impl UpdateWorkflowRequest {
    pub fn from_json(text: &str) -> ApiContractResult<Self> {
        Ok(Self {
            workflow: parse_workflow_document(text)?,
        })
    }
}

/// Reference to a dataset fed into a workflow input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInput {
    pub src: DatasetSource,
    pub id: String,
}

impl DatasetInput {
    pub fn hda(id: impl Into<String>) -> Self {
        Self {
            src: DatasetSource::Hda,
            id: id.into(),
        }
    }
}

/// Workflow invocation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct InvokeWorkflowRequest {
    /// Dataset inputs keyed by step index
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    #[validate(custom(function = "dataset_inputs"))]
    pub inputs: BTreeMap<String, DatasetInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs_by: Option<String>,
    /// Send outputs to this existing history
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "encoded_id_field"))]
    pub history_id: Option<String>,
    /// Name of a new history to create for the outputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub replacement_params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_tool_state_corrections: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_add_to_history: Option<bool>,
}

impl InvokeWorkflowRequest {
    /// Map history datasets onto workflow inputs in step-index order.
    pub fn with_datasets<S: AsRef<str>>(dataset_ids: &[S]) -> Self {
        let inputs = dataset_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (index.to_string(), DatasetInput::hda(id.as_ref())))
            .collect();
        Self {
            inputs,
            inputs_by: Some("step_index".to_string()),
            ..Self::default()
        }
    }

    pub fn in_history(mut self, history_id: impl Into<String>) -> Self {
        self.history_id = Some(history_id.into());
        self
    }

    pub fn in_new_history(mut self, name: impl Into<String>) -> Self {
        self.history = Some(name.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_replacement_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.replacement_params.insert(key.into(), value.into());
        self
    }
}

/// Resume (`true`) or cancel (`false`) a paused invocation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationStepAction {
    pub action: bool,
}

/// Request to build the editor representation of a workflow module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BuildModuleRequest {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Module type cannot be empty"))]
    pub module_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "encoded_id_field"))]
    pub content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
}

impl BuildModuleRequest {
    pub fn tool(tool_id: impl Into<String>) -> Self {
        Self {
            module_type: "tool".to_string(),
            tool_id: Some(tool_id.into()),
            content_id: None,
            inputs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateHistoryRequest {
    #[validate(length(min = 1, message = "History name cannot be empty"))]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteHistoryRequest {
    pub purge: bool,
}

/// A local file to upload into a history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub path: PathBuf,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Build the `inputs` document of the `upload1` tool for a set of files.
///
/// Each file is attached as the multipart field `files_{i}|file_data`.
pub fn upload_tool_inputs(files: &[UploadFile]) -> Value {
    let mut inputs = Map::new();
    inputs.insert("file_count".into(), Value::from(files.len()));
    inputs.insert("dbkey".into(), Value::from("?"));
    inputs.insert("file_type".into(), Value::from("auto"));
    for (index, file) in files.iter().enumerate() {
        inputs.insert(format!("files_{}|type", index), Value::from("upload_dataset"));
        inputs.insert(format!("files_{}|NAME", index), Value::from(file.name.clone()));
    }
    Value::Object(inputs)
}

pub fn upload_field_name(index: usize) -> String {
    format!("files_{}|file_data", index)
}

fn encoded_id_list(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().all(|v| is_encoded_id(v)) {
        Ok(())
    } else {
        Err(ValidationError::new("encoded_id"))
    }
}

fn dataset_inputs(inputs: &BTreeMap<String, DatasetInput>) -> Result<(), ValidationError> {
    if inputs.values().all(|input| is_encoded_id(&input.id)) {
        Ok(())
    } else {
        Err(ValidationError::new("encoded_id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_state_parsing() {
        let invocation: Invocation = serde_json::from_str(
            r#"{
                "id": "df7a1f0c02a5b08e",
                "workflow_id": "f2db41e1fa331b3e",
                "history_id": "1cd8e2f6b131e891",
                "state": "new",
                "update_time": "2024-03-05T10:11:12.345678",
                "model_class": "WorkflowInvocation"
            }"#,
        )
        .unwrap();
        assert_eq!(invocation.state, InvocationState::New);
        assert!(invocation.state.is_in_progress());
        assert!(invocation.steps.is_empty());

        let state: InvocationState = serde_json::from_str("\"requires_materialization\"").unwrap();
        assert_eq!(state, InvocationState::Unknown);
        assert!(state.is_terminal());
        assert!(InvocationState::Scheduled.is_terminal());
    }

    #[test]
    fn test_workflow_show_parsing() {
        let workflow: Workflow = serde_json::from_str(
            r#"{
                "id": "f2db41e1fa331b3e",
                "name": "UnitTest_Workflow",
                "owner": "admin",
                "inputs": {"0": {"label": "input", "value": "", "uuid": "b4b1"}},
                "steps": {
                    "0": {"id": 0, "type": "data_input", "input_steps": {}},
                    "1": {
                        "id": 1,
                        "type": "tool",
                        "tool_id": "wc_gnu",
                        "tool_version": "1.0.0",
                        "input_steps": {"input1": {"source_step": 0, "step_output": "output"}}
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(workflow.steps.len(), 2);
        assert_eq!(workflow.steps["1"].input_steps["input1"].source_step, 0);
        assert_eq!(workflow.inputs["0"].label, "input");
    }

    #[test]
    fn test_workflow_deletion_shapes() {
        let message: WorkflowDeletion =
            serde_json::from_str("\"Workflow 'wf' successfully deleted\"").unwrap();
        assert!(message.is_deleted());

        let workflow: WorkflowDeletion =
            serde_json::from_str(r#"{"id": "f2db41e1fa331b3e", "name": "wf", "deleted": true}"#)
                .unwrap();
        assert!(workflow.is_deleted());

        let empty: WorkflowDeletion = serde_json::from_str("null").unwrap();
        assert_eq!(empty, WorkflowDeletion::NoContent);
        assert!(empty.is_deleted());
    }

    #[test]
    fn test_invoke_request_serialization() {
        let request = InvokeWorkflowRequest::with_datasets(&["1cd8e2f6b131e891"])
            .in_history("f597429621d6eb2b");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["inputs"]["0"]["src"], "hda");
        assert_eq!(json["inputs"]["0"]["id"], "1cd8e2f6b131e891");
        assert_eq!(json["inputs_by"], "step_index");
        assert_eq!(json["history_id"], "f597429621d6eb2b");
        assert!(json.get("replacement_params").is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_invoke_request_rejects_bad_dataset_id() {
        let request = InvokeWorkflowRequest::with_datasets(&["@@@"]);
        assert!(request.validate().is_err());

        let request = InvokeWorkflowRequest::with_datasets(&["1cd8e2f6b131e891"]).in_history("123");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_from_json() {
        let request = CreateWorkflowRequest::from_json(r#"{"name": "wf", "steps": {}}"#).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["workflow"]["name"], "wf");
        assert!(json.get("publish").is_none());

        assert!(CreateWorkflowRequest::from_json("{ Incorrect JSON }").is_err());
    }

    #[test]
    fn test_upload_tool_inputs() {
        let files = vec![UploadFile::new("test.bed", "/tmp/test.bed")];
        let inputs = upload_tool_inputs(&files);
        assert_eq!(inputs["files_0|NAME"], "test.bed");
        assert_eq!(inputs["files_0|type"], "upload_dataset");
        assert_eq!(inputs["file_count"], 1);
        assert_eq!(upload_field_name(0), "files_0|file_data");
    }

    #[test]
    fn test_build_module_request_validation() {
        assert!(BuildModuleRequest::tool("cat1").validate().is_ok());

        let mut request = BuildModuleRequest::tool("cat1");
        request.module_type.clear();
        assert!(request.validate().is_err());
    }
}
