//! Workflow document handlers.
//!
//! Every operation is scoped to the authenticated owner. Workflows owned by
//! someone else are indistinguishable from missing ones.

use std::sync::Arc;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;

use crate::extract::{AuthState, Json, Path, ValidateJson};
use crate::handler::request::{CreateWorkflow, UpdateWorkflow, WorkflowPathParams};
use crate::handler::response::{Deleted, ErrorResponse, WorkflowEnvelope, Workflows};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{ServiceState, WorkflowRepository};

/// Tracing target for workflow operations.
const TRACING_TARGET: &str = "weave_server::handler::workflows";

fn workflow_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Workflow not found")
        .with_resource("workflow")
}

/// Lists the caller's workflows, most recently updated first.
#[tracing::instrument(skip_all, fields(owner_id = %auth_state.owner_id()))]
async fn list_workflows(
    State(workflows): State<Arc<dyn WorkflowRepository>>,
    auth_state: AuthState,
) -> Result<(StatusCode, Json<Workflows>)> {
    let workflows = workflows.list(auth_state.owner_id()).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        workflow_count = workflows.len(),
        "Workflows listed"
    );

    Ok((StatusCode::OK, Json(Workflows { workflows })))
}

fn list_workflows_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List workflows")
        .description("Returns the caller's workflows sorted by last update, newest first.")
        .response::<200, Json<Workflows>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Creates a workflow.
#[tracing::instrument(skip_all, fields(owner_id = %auth_state.owner_id()))]
async fn create_workflow(
    State(workflows): State<Arc<dyn WorkflowRepository>>,
    auth_state: AuthState,
    ValidateJson(request): ValidateJson<CreateWorkflow>,
) -> Result<(StatusCode, Json<WorkflowEnvelope>)> {
    let (name, graph) = request.into_parts();
    let workflow = workflows
        .create(auth_state.owner_id(), name, graph)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        workflow_id = %workflow.id,
        node_count = workflow.nodes.len(),
        "Workflow created"
    );

    Ok((StatusCode::CREATED, Json(workflow.into())))
}

fn create_workflow_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create workflow")
        .description(
            "Creates a workflow. The name defaults to \"Untitled Workflow\" and the graph to \
             an empty one. Transient node state is stripped before storing.",
        )
        .response::<201, Json<WorkflowEnvelope>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Returns a single workflow.
#[tracing::instrument(
    skip_all,
    fields(
        owner_id = %auth_state.owner_id(),
        workflow_id = %path_params.workflow_id,
    )
)]
async fn read_workflow(
    State(workflows): State<Arc<dyn WorkflowRepository>>,
    auth_state: AuthState,
    Path(path_params): Path<WorkflowPathParams>,
) -> Result<(StatusCode, Json<WorkflowEnvelope>)> {
    let Some(workflow) = workflows
        .get(path_params.workflow_id, auth_state.owner_id())
        .await?
    else {
        return Err(workflow_not_found());
    };

    Ok((StatusCode::OK, Json(workflow.into())))
}

fn read_workflow_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get workflow")
        .description("Returns the workflow document with its full graph.")
        .response::<200, Json<WorkflowEnvelope>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Applies a partial update to a workflow.
#[tracing::instrument(
    skip_all,
    fields(
        owner_id = %auth_state.owner_id(),
        workflow_id = %path_params.workflow_id,
    )
)]
async fn update_workflow(
    State(workflows): State<Arc<dyn WorkflowRepository>>,
    auth_state: AuthState,
    Path(path_params): Path<WorkflowPathParams>,
    ValidateJson(request): ValidateJson<UpdateWorkflow>,
) -> Result<(StatusCode, Json<WorkflowEnvelope>)> {
    let Some(workflow) = workflows
        .update(
            path_params.workflow_id,
            auth_state.owner_id(),
            request.into(),
        )
        .await?
    else {
        return Err(workflow_not_found());
    };

    tracing::info!(
        target: TRACING_TARGET,
        node_count = workflow.nodes.len(),
        edge_count = workflow.edges.len(),
        "Workflow updated"
    );

    Ok((StatusCode::OK, Json(workflow.into())))
}

fn update_workflow_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update workflow")
        .description(
            "Replaces the name, nodes or edges that are present in the body and bumps \
             `updatedAt`. Concurrent updates are last-writer-wins.",
        )
        .response::<200, Json<WorkflowEnvelope>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Deletes a workflow.
#[tracing::instrument(
    skip_all,
    fields(
        owner_id = %auth_state.owner_id(),
        workflow_id = %path_params.workflow_id,
    )
)]
async fn delete_workflow(
    State(workflows): State<Arc<dyn WorkflowRepository>>,
    auth_state: AuthState,
    Path(path_params): Path<WorkflowPathParams>,
) -> Result<(StatusCode, Json<Deleted>)> {
    let deleted = workflows
        .delete(path_params.workflow_id, auth_state.owner_id())
        .await?;

    if !deleted {
        return Err(workflow_not_found());
    }

    tracing::info!(target: TRACING_TARGET, "Workflow deleted");

    Ok((StatusCode::OK, Json(Deleted { success: true })))
}

fn delete_workflow_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete workflow")
        .description("Permanently removes the workflow document.")
        .response::<200, Json<Deleted>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for workflow management.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/workflows",
            get_with(list_workflows, list_workflows_docs)
                .post_with(create_workflow, create_workflow_docs),
        )
        .api_route(
            "/workflows/{workflowId}",
            get_with(read_workflow, read_workflow_docs)
                .put_with(update_workflow, update_workflow_docs)
                .delete_with(delete_workflow, delete_workflow_docs),
        )
        .with_path_items(|item| item.tag("Workflows"))
}
