//! Single-shot generation handler.

use std::sync::Arc;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use weave_rig::orchestrator::Generator;

use crate::extract::{AuthState, Json, ValidateJson};
use crate::handler::Result;
use crate::handler::request::Generate;
use crate::handler::response::{ErrorResponse, Generated};
use crate::service::ServiceState;

/// Tracing target for generation operations.
const TRACING_TARGET: &str = "weave_server::handler::generate";

/// Routes a prompt through intent classification and runs the providers.
#[tracing::instrument(
    skip_all,
    fields(
        owner_id = %auth_state.owner_id(),
        model = %request.model,
    )
)]
async fn generate(
    State(generator): State<Arc<dyn Generator>>,
    auth_state: AuthState,
    ValidateJson(request): ValidateJson<Generate>,
) -> Result<(StatusCode, Json<Generated>)> {
    tracing::debug!(
        target: TRACING_TARGET,
        image_count = request.images.len(),
        has_system_prompt = request.system_prompt.is_some(),
        "Generating"
    );

    let output = generator.generate(request.into_request()).await?;

    tracing::info!(
        target: TRACING_TARGET,
        intent = %output.intent,
        has_content = output.content.is_some(),
        has_image = output.image.is_some(),
        "Generation completed"
    );

    Ok((StatusCode::OK, Json(output.into())))
}

fn generate_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Generate")
        .description(
            "Classifies the prompt as text, image or both, then calls the matching providers. \
             Input images may be inline data URLs or durable references.",
        )
        .response::<200, Json<Generated>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<500, Json<ErrorResponse>>()
}

/// Returns routes for generation.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/generate", post_with(generate, generate_docs))
        .with_path_items(|item| item.tag("Generation"))
}
