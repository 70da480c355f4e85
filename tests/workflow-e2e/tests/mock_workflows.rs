use gx_client_api::GalaxyApi;
use gx_rest_api_contract::*;
use gx_rest_client_mock::MockClient;
use gx_test_harness::{init_tracing, wait_for_invocation, PollConfig};
use gx_workflow_e2e::*;

async fn client_with_workflow() -> (MockClient, String) {
    init_tracing();
    let client = MockClient::new();
    let workflow_id = create(&client, &fixtures()).await.unwrap();
    (client, workflow_id)
}

/// Invoke the workflow into a history holding `test.bed` and wait for it.
async fn scheduled_invocation(client: &MockClient, workflow_id: &str) -> Invocation {
    let history = client.create_history(INVOKE_HISTORY).await.unwrap();
    let dataset_id = fixtures()
        .upload(client, &history.id, UPLOAD_FILE)
        .await
        .unwrap();
    let request = InvokeWorkflowRequest::with_datasets(&[dataset_id]).in_history(&history.id);
    let invocation = client.invoke_workflow(workflow_id, &request).await.unwrap();
    wait_for_invocation(client, workflow_id, invocation, PollConfig::fast())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_suite_against_mock() {
    init_tracing();
    let client = MockClient::new();
    let state = run_workflow_suite(&client, &fixtures(), PollConfig::fast())
        .await
        .unwrap();

    let workflow = client.show_workflow(&state.workflow_id, false).await.unwrap();
    assert!(workflow.deleted);
    assert!(client.list_workflows(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_index_and_show() {
    let (client, workflow_id) = client_with_workflow().await;
    assert_eq!(index(&client).await.unwrap(), workflow_id);

    let workflow = show(&client, &workflow_id).await.unwrap();
    assert_eq!(workflow.name, "UnitTest_Workflow");
    assert_eq!(workflow.steps["1"].tool_id.as_deref(), Some("wc_gnu"));
}

#[tokio::test]
async fn test_index_fails_without_workflows() {
    let client = MockClient::new();
    assert!(index(&client).await.is_err());
}

#[tokio::test]
async fn test_text_that_is_not_json_stores_nothing() {
    let client = MockClient::new();
    let result = client.create_workflow_from_json("{ Incorrect JSON }").await;
    assert!(matches!(result, Err(gx_client_api::ClientApiError::InvalidRequest(_))));
    assert!(client.list_workflows(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_show_unknown_workflow() {
    let client = MockClient::new();
    let result = client.show_workflow("f2db41e1fa331b3e", false).await;
    assert!(matches!(result, Err(ref e) if e.to_string().contains("404")));
}

#[tokio::test]
async fn test_invoke_writes_output_into_history() {
    let (client, workflow_id) = client_with_workflow().await;
    let (history_id, content_id) = invoke(&client, &fixtures(), &workflow_id, PollConfig::fast())
        .await
        .unwrap();

    let contents = client.list_history_contents(&history_id).await.unwrap();
    assert_eq!(contents[0].id, content_id);
    assert_eq!(contents[0].name, UPLOAD_FILE);
    assert_eq!(contents[1].name, COUNT_OUTPUT);

    // Two invocations: one into a new history, one into ours
    assert_eq!(client.list_invocations(&workflow_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_scheduled_steps_have_jobs() {
    let (client, workflow_id) = client_with_workflow().await;
    let invocation = scheduled_invocation(&client, &workflow_id).await;

    assert_eq!(invocation.state, InvocationState::Scheduled);
    assert_eq!(invocation.steps.len(), 2);
    assert!(invocation.steps[0].job_id.is_none());
    assert!(invocation.steps[1].job_id.is_some());
}

#[tokio::test]
async fn test_invocation_lookups() {
    let (client, workflow_id) = client_with_workflow().await;
    let invocation = scheduled_invocation(&client, &workflow_id).await;

    let invocation_id = index_invocations(&client, &workflow_id).await.unwrap();
    assert_eq!(invocation_id, invocation.id);

    let step_id = show_invocation(&client, &workflow_id, &invocation_id).await.unwrap();
    assert_eq!(step_id, invocation.steps[0].id);

    let step = invocation_steps(&client, &workflow_id, &invocation_id, &step_id)
        .await
        .unwrap();
    assert_eq!(step.order_index, Some(0));
}

#[tokio::test]
async fn test_invocation_belongs_to_its_workflow() {
    let (client, workflow_id) = client_with_workflow().await;
    let invocation = scheduled_invocation(&client, &workflow_id).await;
    let other_id = create(&client, &fixtures()).await.unwrap();

    assert!(client.show_invocation(&other_id, &invocation.id).await.is_err());
}

#[tokio::test]
async fn test_update_step_and_cancel() {
    let (client, workflow_id) = client_with_workflow().await;
    let invocation = scheduled_invocation(&client, &workflow_id).await;
    let step_id = invocation.steps[1].id.clone();

    let step = update_invocation_step(&client, &workflow_id, &invocation.id, &step_id)
        .await
        .unwrap();
    assert_eq!(step.action, Some(true));

    let cancelled = cancel_invocation(&client, &workflow_id, &invocation.id)
        .await
        .unwrap();
    assert_eq!(cancelled.state, InvocationState::Cancelled);
}

#[tokio::test]
async fn test_update_replaces_steps() {
    let (client, workflow_id) = client_with_workflow().await;
    let workflow = update(&client, &fixtures(), &workflow_id).await.unwrap();

    assert_eq!(workflow.steps.len(), 3);
    assert_eq!(workflow.steps["2"].tool_id.as_deref(), Some("sort1"));
    assert_eq!(workflow.version, Some(1));
}

#[tokio::test]
async fn test_export_and_download_differ() {
    let (client, workflow_id) = client_with_workflow().await;
    let exported = export(&client, &workflow_id).await.unwrap();
    let downloaded = download(&client, &workflow_id).await.unwrap();

    assert!(exported["inputs"].is_object());
    assert_eq!(downloaded["a_galaxy_workflow"], "true");
    assert_ne!(exported, downloaded);
}

#[tokio::test]
async fn test_build_module() {
    let client = MockClient::new();
    let module = build_module(&client).await.unwrap();
    assert_eq!(module["tool_id"], "cat1");
}

#[tokio::test]
async fn test_delete() {
    let (client, workflow_id) = client_with_workflow().await;
    delete(&client, &workflow_id).await.unwrap();

    let invocation = client
        .invoke_workflow(&workflow_id, &InvokeWorkflowRequest::default())
        .await;
    assert!(invocation.is_err());
}
