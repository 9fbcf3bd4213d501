//! Image upload and retrieval handlers.
//!
//! Uploads move inline `data:` URLs out of workflow documents and into object
//! storage. The returned URL points back at `GET /images/{key}`, which is
//! public so that `<img>` tags can load it without a token.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use weave_rig::provider::data_url;

use crate::extract::{AuthState, Json, Path};
use crate::handler::request::{ImagePathParams, Upload};
use crate::handler::response::{ErrorResponse, ImageContent, Uploaded};
use crate::handler::{ErrorKind, Result};
use crate::service::{ImageFormat, ImageStore, ServiceError, ServiceState};

/// Tracing target for image operations.
const TRACING_TARGET: &str = "weave_server::handler::images";

/// Stores an inline image and returns its durable URL.
#[tracing::instrument(skip_all, fields(owner_id = %auth_state.owner_id()))]
async fn upload_image(
    State(image_store): State<ImageStore>,
    auth_state: AuthState,
    Json(request): Json<Upload>,
) -> Result<(StatusCode, Json<Uploaded>)> {
    if request.image.trim().is_empty() {
        return Err(ErrorKind::BadRequest
            .with_message("No image provided")
            .with_resource("image"));
    }

    let Some(inline) = data_url::decode(&request.image) else {
        return Err(ErrorKind::BadRequest
            .with_message("Invalid image data")
            .with_resource("image"));
    };

    if ImageFormat::from_media_type(&inline.media_type).is_none() {
        return Err(ErrorKind::BadRequest
            .with_message("Unsupported image type")
            .with_context(format!("Received media type: {}", inline.media_type))
            .with_resource("image"));
    }

    let key = image_store.put(&inline).await?;
    let url = image_store.url_for(&key);

    tracing::info!(
        target: TRACING_TARGET,
        key = %key,
        size = inline.bytes.len(),
        "Image uploaded"
    );

    Ok((StatusCode::OK, Json(Uploaded::new(url))))
}

fn upload_image_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Upload image")
        .description(
            "Decodes a base64 `data:` URL and stores the image. Accepts PNG, JPEG, GIF, \
             WebP and SVG.",
        )
        .response::<200, Json<Uploaded>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<413, Json<ErrorResponse>>()
}

/// Serves a stored image.
#[tracing::instrument(skip_all, fields(key = %path_params.key))]
async fn read_image(
    State(image_store): State<ImageStore>,
    Path(path_params): Path<ImagePathParams>,
) -> Result<ImageContent> {
    let image = match image_store.get(&path_params.key).await {
        Ok(image) => image,
        Err(ServiceError::NotFound { .. }) => {
            return Err(ErrorKind::NotFound
                .with_message("Image not found")
                .with_resource("image"));
        }
        Err(error) => return Err(error.into()),
    };

    tracing::debug!(
        target: TRACING_TARGET,
        size = image.bytes.len(),
        "Image served"
    );

    Ok(image.into())
}

fn read_image_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get image")
        .description("Returns the raw bytes of an uploaded image. No authentication required.")
        .response_with::<200, ImageContent, _>(|res| res.description("Image bytes"))
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for image upload and retrieval.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/upload", post_with(upload_image, upload_image_docs))
        .api_route("/images/{key}", get_with(read_image, read_image_docs))
        .with_path_items(|item| item.tag("Images"))
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::handler::test::{bearer_token, create_test_server_with_router};

    #[tokio::test]
    async fn upload_then_read_serves_the_bytes() -> anyhow::Result<()> {
        let (server, state) = create_test_server_with_router(|_| routes())?;
        let image = data_url::encode("image/png", b"png-bytes");

        let response = server
            .post("/upload")
            .authorization_bearer(bearer_token(&state, Uuid::new_v4()))
            .json(&json!({ "image": image }))
            .await;
        response.assert_status_ok();

        let uploaded = response.json::<Uploaded>();
        assert!(uploaded.success);
        assert!(uploaded.url.starts_with("https://weave.test/images/"));
        assert!(uploaded.url.ends_with(".png"));

        let path = uploaded.url.trim_start_matches("https://weave.test");
        let response = server.get(path).await;
        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "image/png");
        assert_eq!(response.as_bytes().to_vec(), b"png-bytes");
        Ok(())
    }

    #[tokio::test]
    async fn upload_rejects_bad_input() -> anyhow::Result<()> {
        let (server, state) = create_test_server_with_router(|_| routes())?;
        let token = bearer_token(&state, Uuid::new_v4());

        let cases = [
            (json!({}), "No image provided"),
            (json!({ "image": "   " }), "No image provided"),
            (json!({ "image": "not a data url" }), "Invalid image data"),
            (
                json!({ "image": data_url::encode("text/plain", b"hello") }),
                "Unsupported image type",
            ),
        ];

        for (body, message) in cases {
            let response = server
                .post("/upload")
                .authorization_bearer(&token)
                .json(&body)
                .await;
            response.assert_status_bad_request();
            assert_eq!(response.json::<serde_json::Value>()["message"], message);
        }
        Ok(())
    }

    #[tokio::test]
    async fn upload_requires_a_token() -> anyhow::Result<()> {
        let (server, _) = create_test_server_with_router(|_| routes())?;

        let response = server
            .post("/upload")
            .json(&json!({ "image": data_url::encode("image/png", b"png") }))
            .await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    async fn unknown_images_are_not_found() -> anyhow::Result<()> {
        let (server, _) = create_test_server_with_router(|_| routes())?;

        let response = server.get(&format!("/images/{}.png", Uuid::now_v7())).await;
        response.assert_status_not_found();
        assert_eq!(response.json::<serde_json::Value>()["message"], "Image not found");

        let response = server.get("/images/secret.txt").await;
        response.assert_status_not_found();
        Ok(())
    }
}
