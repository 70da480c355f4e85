//! Workflow scenarios shared by the mock and live suites
//!
//! Each scenario exercises one workflow operation the way a user would,
//! including the failure cases: a malformed identifier or a broken workflow
//! document must come back as an error rather than a result. Scenarios build
//! on each other's outputs (a created workflow, its invocation, a step of
//! that invocation), so `run_workflow_suite` drives them in order.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use gx_client_api::GalaxyApi;
use gx_rest_api_contract::*;
use gx_test_harness::{wait_for_invocation, Fixtures, PollConfig};
use serde_json::Value;
use tracing::info;

pub const WORKFLOW_FILE: &str = "Galaxy-Workflow-UnitTest_Workflow.ga";
pub const UPDATED_WORKFLOW_FILE: &str = "Galaxy-Workflow-update.ga";
pub const UPLOAD_FILE: &str = "test.bed";
pub const INVOKE_HISTORY: &str = "Testing Workflows Invoke";
/// Name Galaxy gives the count tool's output on the first dataset
pub const COUNT_OUTPUT: &str = "Line/Word/Character count on data 1";

pub fn fixtures() -> Fixtures {
    Fixtures::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("files"))
}

/// Identifiers collected while the suite runs
#[derive(Debug, Clone, Default)]
pub struct SuiteState {
    pub workflow_id: String,
    pub history_id: String,
    pub content_id: String,
    pub invocation_id: String,
    pub step_id: String,
}

pub async fn run_workflow_suite(
    api: &dyn GalaxyApi,
    fixtures: &Fixtures,
    poll: PollConfig,
) -> Result<SuiteState> {
    let workflow_id = create(api, fixtures).await?;
    let listed_id = index(api).await?;
    show(api, &listed_id).await?;

    let (history_id, content_id) = invoke(api, fixtures, &workflow_id, poll).await?;
    let invocation_id = index_invocations(api, &workflow_id).await?;
    let step_id = show_invocation(api, &workflow_id, &invocation_id).await?;
    invocation_steps(api, &workflow_id, &invocation_id, &step_id).await?;
    update_invocation_step(api, &workflow_id, &invocation_id, &step_id).await?;
    cancel_invocation(api, &workflow_id, &invocation_id).await?;

    update(api, fixtures, &workflow_id).await?;
    export(api, &workflow_id).await?;
    download(api, &workflow_id).await?;
    build_module(api).await?;
    delete(api, &workflow_id).await?;

    info!(workflow_id = %workflow_id, "workflow suite passed");
    Ok(SuiteState {
        workflow_id,
        history_id,
        content_id,
        invocation_id,
        step_id,
    })
}

/// List workflows with and without published ones; returns the first id.
pub async fn index(api: &dyn GalaxyApi) -> Result<String> {
    let workflows = api.list_workflows(false).await.context("index")?;
    api.list_workflows(true)
        .await
        .context("index with published workflows")?;

    let first = workflows.first().context("no workflows listed")?;
    Ok(first.id.clone())
}

pub async fn show(api: &dyn GalaxyApi, workflow_id: &str) -> Result<Workflow> {
    let workflow = api
        .show_workflow(workflow_id, false)
        .await
        .context("show")?;
    ensure!(workflow.id == workflow_id, "show returned workflow {}", workflow.id);

    // The instance flag only changes how the id is interpreted
    api.show_workflow(workflow_id, true)
        .await
        .context("show by instance")?;

    ensure!(
        api.show_workflow("123", true).await.is_err(),
        "show should fail for a malformed workflow id"
    );
    ensure!(
        api.show_workflow("123", false).await.is_err(),
        "show should fail for a malformed workflow id"
    );
    Ok(workflow)
}

/// Import the unit-test workflow; returns its id.
pub async fn create(api: &dyn GalaxyApi, fixtures: &Fixtures) -> Result<String> {
    let document = fixtures.workflow_json(WORKFLOW_FILE)?;
    let workflow = api
        .create_workflow_from_json(&document)
        .await
        .context("create")?;
    ensure!(!workflow.steps.is_empty(), "created workflow has no steps");

    ensure!(
        api.create_workflow_from_json("{ Incorrect JSON }").await.is_err(),
        "create should reject a document that is not JSON"
    );
    Ok(workflow.id)
}

/// Invoke into a new history, then into a fresh history holding the input,
/// waiting for each invocation to be scheduled. Returns the history and input
/// dataset ids.
pub async fn invoke(
    api: &dyn GalaxyApi,
    fixtures: &Fixtures,
    workflow_id: &str,
    poll: PollConfig,
) -> Result<(String, String)> {
    let history = api.create_history(INVOKE_HISTORY).await?;
    fixtures.upload(api, &history.id, UPLOAD_FILE).await?;

    let contents = api.list_history_contents(&history.id).await?;
    let content_id = contents
        .first()
        .map(|content| content.id.clone())
        .context("content was not added to history")?;

    let request = InvokeWorkflowRequest::with_datasets(&[content_id.as_str()]);
    let invocation = api
        .invoke_workflow(workflow_id, &request)
        .await
        .context("invoke with default parameters")?;
    ensure!(
        invocation.state == InvocationState::New,
        "new invocation is in state {:?}",
        invocation.state
    );
    wait_for_invocation(api, workflow_id, invocation, poll).await?;

    let request = request.in_history(history.id.clone());
    let invocation = api
        .invoke_workflow(workflow_id, &request)
        .await
        .context("invoke into an existing history")?;
    wait_for_invocation(api, workflow_id, invocation, poll).await?;

    let contents = api.list_history_contents(&history.id).await?;
    ensure!(
        contents.get(1).map(|content| content.name.as_str()) == Some(COUNT_OUTPUT),
        "workflow output not in the target history: {:?}",
        contents.iter().map(|content| &content.name).collect::<Vec<_>>()
    );
    Ok((history.id, content_id))
}

/// Returns the id of the first invocation.
pub async fn index_invocations(api: &dyn GalaxyApi, workflow_id: &str) -> Result<String> {
    let invocations = api
        .list_invocations(workflow_id)
        .await
        .context("index invocations")?;
    let first = invocations.first().context("no invocations listed")?;

    ensure!(
        api.list_invocations("@@@").await.is_err(),
        "index invocations should fail for a malformed workflow id"
    );
    Ok(first.id.clone())
}

/// Returns the id of the invocation's first step.
pub async fn show_invocation(
    api: &dyn GalaxyApi,
    workflow_id: &str,
    invocation_id: &str,
) -> Result<String> {
    let invocation = api
        .show_invocation(workflow_id, invocation_id)
        .await
        .context("show invocation")?;
    let step = invocation.steps.first().context("invocation has no steps")?;

    ensure!(
        api.show_invocation(workflow_id, "@@").await.is_err(),
        "show invocation should fail for a malformed invocation id"
    );
    Ok(step.id.clone())
}

pub async fn invocation_steps(
    api: &dyn GalaxyApi,
    workflow_id: &str,
    invocation_id: &str,
    step_id: &str,
) -> Result<InvocationStep> {
    let step = api
        .show_invocation_step(workflow_id, invocation_id, step_id)
        .await
        .context("invocation step")?;
    ensure!(step.id == step_id, "step lookup returned {}", step.id);

    ensure!(
        api.show_invocation_step(workflow_id, "@@@", step_id)
            .await
            .is_err(),
        "invocation step should fail for a malformed invocation id"
    );
    ensure!(
        api.show_invocation_step("@@@", "@@@", step_id)
            .await
            .is_err(),
        "invocation step should fail for a malformed workflow id"
    );
    Ok(step)
}

pub async fn update_invocation_step(
    api: &dyn GalaxyApi,
    workflow_id: &str,
    invocation_id: &str,
    step_id: &str,
) -> Result<InvocationStep> {
    let step = api
        .update_invocation_step(workflow_id, invocation_id, step_id, true)
        .await
        .context("update invocation step")?;
    ensure!(step.id == step_id, "update returned step {}", step.id);

    ensure!(
        api.update_invocation_step(workflow_id, invocation_id, "@@@", true)
            .await
            .is_err(),
        "update invocation step should fail for a malformed step id"
    );
    Ok(step)
}

pub async fn cancel_invocation(
    api: &dyn GalaxyApi,
    workflow_id: &str,
    invocation_id: &str,
) -> Result<Invocation> {
    let invocation = api
        .cancel_invocation(workflow_id, invocation_id)
        .await
        .context("cancel invocation")?;
    ensure!(
        matches!(
            invocation.state,
            InvocationState::Cancelled | InvocationState::Cancelling
        ),
        "cancelled invocation is in state {:?}",
        invocation.state
    );

    ensure!(
        api.cancel_invocation(workflow_id, "@@@").await.is_err(),
        "cancel should fail for a malformed invocation id"
    );
    Ok(invocation)
}

pub async fn update(api: &dyn GalaxyApi, fixtures: &Fixtures, workflow_id: &str) -> Result<Workflow> {
    let document = fixtures.workflow_json(UPDATED_WORKFLOW_FILE)?;
    let workflow = api
        .update_workflow_from_json(workflow_id, &document)
        .await
        .context("update")?;

    ensure!(
        api.update_workflow_from_json("@@@", &document).await.is_err(),
        "update should fail for a malformed workflow id"
    );
    ensure!(
        api.update_workflow_from_json(workflow_id, "{Workflow Update Test}")
            .await
            .is_err(),
        "update should reject a document that is not JSON"
    );
    Ok(workflow)
}

pub async fn export(api: &dyn GalaxyApi, workflow_id: &str) -> Result<Value> {
    let exported = api.export_workflow(workflow_id).await.context("export")?;
    ensure!(exported.is_object(), "export did not return a document");

    ensure!(
        api.export_workflow("@@@").await.is_err(),
        "export should fail for a malformed workflow id"
    );
    Ok(exported)
}

pub async fn download(api: &dyn GalaxyApi, workflow_id: &str) -> Result<Value> {
    let document = api.download_workflow(workflow_id).await.context("download")?;
    ensure!(
        document.get("steps").is_some_and(Value::is_object),
        "downloaded workflow has no steps"
    );

    ensure!(
        api.download_workflow("@@@").await.is_err(),
        "download should fail for a malformed workflow id"
    );
    Ok(document)
}

pub async fn build_module(api: &dyn GalaxyApi) -> Result<Value> {
    let module = api
        .build_module(&BuildModuleRequest::tool("cat1"))
        .await
        .context("build module")?;
    ensure!(module.get("name").is_some(), "module has no name");

    let mut untyped = BuildModuleRequest::tool("cat1");
    untyped.module_type.clear();
    ensure!(
        api.build_module(&untyped).await.is_err(),
        "build module should fail without a module type"
    );
    Ok(module)
}

pub async fn delete(api: &dyn GalaxyApi, workflow_id: &str) -> Result<()> {
    let deleted = api.delete_workflow(workflow_id).await.context("delete")?;
    ensure!(deleted.is_deleted(), "workflow not marked as deleted");

    ensure!(
        api.delete_workflow("@@@").await.is_err(),
        "deleting a malformed workflow id should fail"
    );
    Ok(())
}
