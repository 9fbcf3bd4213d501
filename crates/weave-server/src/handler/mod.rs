//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! Every route except `GET /health` and `GET /images/{key}` requires a bearer
//! token, enforced per handler by the [`AuthState`] extractor.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler
//! [`AuthState`]: crate::extract::AuthState

mod error;
mod generate;
mod health;
mod images;
mod workflows;

pub mod request;
pub mod response;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;

/// Tracing target for handler-level logging.
pub(crate) const TRACING_TARGET: &str = "weave_server::handler";

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(generate::routes())
        .merge(workflows::routes())
        .merge(images::routes())
        .merge(health::routes())
        .fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;
    use std::time::Duration;

    use aide::axum::ApiRouter;
    use aide::openapi::OpenApi;
    use axum::extract::FromRef;
    use axum_test::TestServer;
    use uuid::Uuid;
    use weave_rig::intent::Intent;
    use weave_rig::orchestrator::{GenerationOutput, GenerationRequest, Generator};

    use crate::extract::AuthClaims;
    use crate::service::{AuthKeys, ServiceConfig, ServiceState};

    /// Generator that echoes the prompt back as text.
    ///
    /// The prompt `fail` reports missing provider credentials.
    #[derive(Debug, Default)]
    pub struct FakeGenerator;

    #[async_trait::async_trait]
    impl Generator for FakeGenerator {
        async fn generate(&self, request: GenerationRequest) -> weave_rig::Result<GenerationOutput> {
            if request.user_prompt == "fail" {
                return Err(weave_rig::Error::missing_credentials("OPENAI_API_KEY"));
            }

            Ok(GenerationOutput {
                intent: Intent::TextOnly,
                content: Some(format!("echo: {}", request.user_prompt)),
                image: None,
            })
        }
    }

    /// Returns state backed by in-memory storage and the [`FakeGenerator`].
    pub fn create_test_state() -> anyhow::Result<ServiceState> {
        let config = ServiceConfig::builder()
            .with_auth_secret("test-secret")
            .with_public_base_url("https://weave.test")
            .build()?;

        let state = ServiceState::from_config(&config, Arc::new(FakeGenerator))?;
        Ok(state)
    }

    /// Returns a signed bearer token for the given owner.
    pub fn bearer_token(state: &ServiceState, owner_id: Uuid) -> String {
        let auth_keys = AuthKeys::from_ref(state);
        AuthClaims::new(owner_id, Duration::from_secs(3600))
            .encode(&auth_keys)
            .unwrap()
    }

    /// Returns a new [`TestServer`] with the given router and its state.
    pub fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> ApiRouter<ServiceState>,
    ) -> anyhow::Result<(TestServer, ServiceState)> {
        let state = create_test_state()?;
        let router = router(state.clone());
        let server = create_test_server_with_state(router, state.clone())?;
        Ok((server, state))
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: ApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router
            .finish_api(&mut OpenApi::default())
            .with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with all routes.
    pub fn create_test_server() -> anyhow::Result<(TestServer, ServiceState)> {
        create_test_server_with_router(|_| super::routes())
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/does-not-exist").await;
        response.assert_status_not_found();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}
