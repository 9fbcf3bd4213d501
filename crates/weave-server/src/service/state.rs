//! Application state and dependency injection.

use std::sync::Arc;

use weave_rig::orchestrator::Generator;

use crate::service::{
    AuthKeys, DocumentStore, ImageStore, Result, ServiceConfig, WorkflowRepository,
};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    generator: Arc<dyn Generator>,
    workflows: Arc<dyn WorkflowRepository>,
    image_store: ImageStore,
    auth_keys: AuthKeys,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Workflow documents and uploaded images share one storage operator.
    pub fn from_config(config: &ServiceConfig, generator: Arc<dyn Generator>) -> Result<Self> {
        config.validate()?;

        let operator = config.connect_storage()?;
        let service_state = Self {
            generator,
            workflows: Arc::new(DocumentStore::new(operator.clone())),
            image_store: ImageStore::new(operator, &config.public_base_url),
            auth_keys: config.load_auth_keys()?,
        };

        Ok(service_state)
    }

    /// Assembles state from already constructed services.
    pub fn new(
        generator: Arc<dyn Generator>,
        workflows: Arc<dyn WorkflowRepository>,
        image_store: ImageStore,
        auth_keys: AuthKeys,
    ) -> Self {
        Self {
            generator,
            workflows,
            image_store,
            auth_keys,
        }
    }
}

impl std::fmt::Debug for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceState")
            .field("image_store", &self.image_store)
            .field("auth_keys", &self.auth_keys)
            .finish_non_exhaustive()
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(generator: Arc<dyn Generator>);
impl_di!(workflows: Arc<dyn WorkflowRepository>);
impl_di!(image_store: ImageStore);
impl_di!(auth_keys: AuthKeys);
