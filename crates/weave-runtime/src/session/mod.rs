//! Editor session: one open workflow and its collaborators.
//!
//! The session owns the [`GraphStore`] behind an async mutex. The lock is
//! never held across provider or storage calls, so runs on different nodes
//! proceed concurrently and each re-reads the graph at invocation time.

mod run;
mod save;
mod storage;

use std::sync::Arc;

pub use run::{RunSequencer, RunTicket};
pub use save::{
    AUTOSAVE_DEBOUNCE, AutoSaveConfig, AutoSaveConfigBuilder, LOAD_GRACE, LoadTicket, SaveBlocked,
    SavePhase, SaveState,
};
pub use storage::{ImageUploader, WorkflowStorage};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use weave_rig::orchestrator::{GenerationRequest, Generator};

use crate::behavior::{ImageFetcher, collect_inputs};
use crate::graph::{GeneratorData, GeneratorPatch, Graph, ImagePatch, NodeId, NodeKind};
use crate::sanitize::sanitize;
use crate::store::GraphStore;
use crate::workflow::WorkflowId;
use crate::{WorkflowError, WorkflowResult};

/// Tracing target for session operations.
pub const TRACING_TARGET: &str = "weave_runtime::session";

/// Error stored on a generator that has nothing to send.
pub const MISSING_PROMPT: &str = "Please connect a Prompt input or enter a system prompt";

/// Model used when a generator has none set.
pub const FALLBACK_MODEL: &str = "gpt-4o";

struct SessionState {
    store: GraphStore,
    name: String,
    save: SaveState,
    runs: RunSequencer,
}

struct SessionInner {
    state: Mutex<SessionState>,
    generator: Arc<dyn Generator>,
    storage: Arc<dyn WorkflowStorage>,
    uploader: Arc<dyn ImageUploader>,
    fetcher: Arc<dyn ImageFetcher>,
    config: AutoSaveConfig,
    changes: watch::Sender<u64>,
}

/// An open workflow with generation, upload and auto-save wired in.
#[derive(Clone)]
pub struct EditorSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Creates a session with no document loaded.
    pub fn new(
        generator: Arc<dyn Generator>,
        storage: Arc<dyn WorkflowStorage>,
        uploader: Arc<dyn ImageUploader>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self::with_config(generator, storage, uploader, fetcher, AutoSaveConfig::default())
    }

    /// Creates a session with custom auto-save timing.
    pub fn with_config(
        generator: Arc<dyn Generator>,
        storage: Arc<dyn WorkflowStorage>,
        uploader: Arc<dyn ImageUploader>,
        fetcher: Arc<dyn ImageFetcher>,
        config: AutoSaveConfig,
    ) -> Self {
        let state = SessionState {
            store: GraphStore::new(),
            name: String::new(),
            save: SaveState::default(),
            runs: RunSequencer::default(),
        };
        let (changes, _) = watch::channel(0);

        let inner = SessionInner {
            state: Mutex::new(state),
            generator,
            storage,
            uploader,
            fetcher,
            config,
            changes,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    fn notify_changed(&self) {
        self.inner.changes.send_modify(|version| *version += 1);
    }

    /// Returns the document most recently confirmed loaded, or being loaded.
    pub async fn document(&self) -> Option<WorkflowId> {
        self.inner.state.lock().await.save.document()
    }

    /// Returns the current save phase.
    pub async fn phase(&self) -> SavePhase {
        self.inner.state.lock().await.save.phase()
    }

    /// Returns the workflow name.
    pub async fn name(&self) -> String {
        self.inner.state.lock().await.name.clone()
    }

    /// Returns a copy of the live graph.
    pub async fn snapshot(&self) -> Graph {
        self.inner.state.lock().await.store.snapshot()
    }

    /// Loads a document, replacing the graph and resetting history.
    ///
    /// A load that is superseded by a later `open` is discarded. A failed
    /// load leaves the session unloaded and returns the error so the caller
    /// can navigate away.
    pub async fn open(&self, id: WorkflowId) -> WorkflowResult<()> {
        let ticket = {
            let mut state = self.inner.state.lock().await;
            state.runs.reset();
            state.save.begin_load(id)
        };

        tracing::debug!(target: TRACING_TARGET, workflow_id = %id, "Loading workflow");

        let loaded = self
            .inner
            .storage
            .load(id)
            .await
            .and_then(|workflow| {
                if workflow.id == id {
                    Ok(workflow)
                } else {
                    Err(WorkflowError::storage(format!(
                        "requested workflow {id} but received {}",
                        workflow.id
                    )))
                }
            });

        let mut state = self.inner.state.lock().await;
        match loaded {
            Ok(workflow) => {
                if !state.save.finish_load(&ticket, Instant::now()) {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        workflow_id = %id,
                        "Discarding superseded workflow load"
                    );
                    return Ok(());
                }

                tracing::info!(
                    target: TRACING_TARGET,
                    workflow_id = %id,
                    nodes = workflow.nodes.len(),
                    edges = workflow.edges.len(),
                    "Workflow loaded"
                );

                state.store.replace(workflow.graph());
                state.name = workflow.name;
                Ok(())
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    workflow_id = %id,
                    error = %error,
                    "Failed to load workflow"
                );

                if state.save.fail_load(&ticket) {
                    state.store.replace(Graph::default());
                    state.name.clear();
                }
                Err(error)
            }
        }
    }

    /// Runs a closure against the graph store and schedules an auto-save.
    pub async fn mutate<R>(&self, mutate: impl FnOnce(&mut GraphStore) -> R) -> R {
        let result = {
            let mut state = self.inner.state.lock().await;
            mutate(&mut state.store)
        };

        self.notify_changed();
        result
    }

    /// Renames the workflow and schedules an auto-save.
    pub async fn rename(&self, name: impl Into<String>) {
        self.inner.state.lock().await.name = name.into();
        self.notify_changed();
    }

    /// Runs a generator node and writes the result back into it.
    ///
    /// Generation failures are stored on the node, not returned. Returns
    /// whether the result was applied; it is dropped if a newer run of the
    /// same node started in the meantime.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or is not a generator.
    pub async fn run_node(&self, id: &NodeId) -> WorkflowResult<bool> {
        let (ticket, graph, data) = {
            let mut state = self.inner.state.lock().await;
            let node = state
                .store
                .node(id)
                .ok_or_else(|| WorkflowError::NodeNotFound(id.clone()))?;
            let Some(data) = node.as_generator().cloned() else {
                return Err(WorkflowError::invalid_node(id.clone(), "not a generator node"));
            };

            state.store.update_node_data(id, GeneratorPatch::run_started());
            let ticket = state.runs.issue(id);
            (ticket, state.store.snapshot(), data)
        };
        self.notify_changed();

        tracing::info!(
            target: TRACING_TARGET,
            node_id = %id,
            sequence = ticket.sequence,
            "Running generator node"
        );

        let patch = match self.build_request(&graph, id, &data).await {
            Some(request) => match self.inner.generator.generate(request).await {
                Ok(output) => GeneratorPatch::run_succeeded(output.content, output.image),
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        node_id = %id,
                        error = %error,
                        "Generation failed"
                    );
                    GeneratorPatch::run_failed(error.to_string())
                }
            },
            None => GeneratorPatch::run_failed(MISSING_PROMPT),
        };

        let applied = {
            let mut state = self.inner.state.lock().await;
            state.runs.is_current(&ticket) && state.store.update_node_data(id, patch)
        };

        if applied {
            self.notify_changed();
        } else {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %id,
                sequence = ticket.sequence,
                "Discarding stale run result"
            );
        }

        Ok(applied)
    }

    /// Builds the generation request, or `None` if there is no prompt.
    ///
    /// The prompt is the connected prompt input, falling back to the node's
    /// user prompt and then its system prompt.
    async fn build_request(
        &self,
        graph: &Graph,
        id: &NodeId,
        data: &GeneratorData,
    ) -> Option<GenerationRequest> {
        let inputs = collect_inputs(graph, id, self.inner.fetcher.as_ref()).await;

        let prompt = [&inputs.prompt_text, &data.user_prompt, &data.system_prompt]
            .into_iter()
            .find(|prompt| !prompt.is_empty())?;
        let model = if data.model.is_empty() {
            FALLBACK_MODEL
        } else {
            data.model.as_str()
        };

        Some(
            GenerationRequest::new(model, prompt.as_str())
                .with_system_prompt(data.system_prompt.as_str())
                .with_images(inputs.images),
        )
    }

    /// Attaches an inline image to an image node.
    ///
    /// The image is uploaded for a durable reference. If the upload fails,
    /// the inline bytes are kept as the display reference so the image is
    /// not lost. Returns whether the upload succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or is not an image node,
    /// including when it was removed while the upload was in flight.
    pub async fn attach_image(&self, id: &NodeId, inline: impl Into<String>) -> WorkflowResult<bool> {
        let inline = inline.into();
        {
            let state = self.inner.state.lock().await;
            let node = state
                .store
                .node(id)
                .ok_or_else(|| WorkflowError::NodeNotFound(id.clone()))?;
            if !matches!(node.kind, NodeKind::Image(_)) {
                return Err(WorkflowError::invalid_node(id.clone(), "not an image node"));
            }
        }

        let (image_url, uploaded) = match self.inner.uploader.upload(&inline).await {
            Ok(url) => (url, true),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    error = %error,
                    "Image upload failed, keeping inline image"
                );
                (inline.clone(), false)
            }
        };

        let patch = ImagePatch {
            image_url: Some(Some(image_url.clone())),
            image_base64: Some(Some(inline)),
            ..ImagePatch::default()
        };
        if !self.mutate(|store| store.update_node_data(id, patch)).await {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %id,
                image_url = %image_url,
                uploaded,
                "Image node removed during upload, dropping image"
            );
            return Err(WorkflowError::NodeNotFound(id.clone()));
        }

        Ok(uploaded)
    }

    /// Saves a sanitized snapshot if the save gates allow it.
    ///
    /// Returns `Ok(false)` when a gate blocked the save. A failed save is
    /// logged and returned; the live graph is left as is.
    pub async fn save_now(&self) -> WorkflowResult<bool> {
        let (document, name, graph) = {
            let mut state = self.inner.state.lock().await;
            let generating = state.store.graph().any_generating();
            let document =
                match state
                    .save
                    .begin_save(Instant::now(), self.inner.config.load_grace, generating)
                {
                    Ok(document) => document,
                    Err(blocked) => {
                        tracing::debug!(
                            target: TRACING_TARGET,
                            reason = %blocked,
                            "Save skipped"
                        );
                        return Ok(false);
                    }
                };

            (document, state.name.clone(), sanitize(state.store.graph()))
        };

        let result = self.inner.storage.save(document, &name, graph).await;
        self.inner.state.lock().await.save.finish_save(document);

        match result {
            Ok(()) => {
                tracing::debug!(target: TRACING_TARGET, workflow_id = %document, "Workflow saved");
                Ok(true)
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    workflow_id = %document,
                    error = %error,
                    "Failed to save workflow"
                );
                Err(error)
            }
        }
    }

    /// Spawns the auto-save task.
    ///
    /// A save runs once no change has been made for the debounce period;
    /// every change restarts the wait. The task stops when `cancel` fires.
    pub fn spawn_autosave(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let session = self.clone();
        let mut changes = self.inner.changes.subscribe();
        let debounce = self.inner.config.debounce;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                loop {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return,
                        changed = changes.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                        () = tokio::time::sleep(debounce) => break,
                    }
                }

                // Failures are logged by save_now and retried on the next change.
                let _ = session.save_now().await;
            }

            tracing::debug!(target: TRACING_TARGET, "Auto-save stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use weave_rig::intent::Intent;
    use weave_rig::orchestrator::GenerationOutput;

    use super::*;
    use crate::graph::{Connection, NodeType, Position, TextPatch};
    use crate::workflow::Workflow;

    #[derive(Default)]
    struct FakeStorage {
        workflows: StdMutex<HashMap<WorkflowId, (Workflow, Duration)>>,
        saved: StdMutex<Vec<(WorkflowId, String, Graph)>>,
        fail_saves: bool,
    }

    impl FakeStorage {
        fn insert(&self, workflow: Workflow, delay: Duration) -> WorkflowId {
            let id = workflow.id;
            self.workflows.lock().unwrap().insert(id, (workflow, delay));
            id
        }

        fn saved(&self) -> Vec<(WorkflowId, String, Graph)> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl WorkflowStorage for FakeStorage {
        async fn load(&self, id: WorkflowId) -> WorkflowResult<Workflow> {
            let entry = self.workflows.lock().unwrap().get(&id).cloned();
            let (workflow, delay) = entry.ok_or_else(|| WorkflowError::storage("not found"))?;
            tokio::time::sleep(delay).await;
            Ok(workflow)
        }

        async fn save(&self, id: WorkflowId, name: &str, graph: Graph) -> WorkflowResult<()> {
            if self.fail_saves {
                return Err(WorkflowError::storage("disk full"));
            }
            self.saved.lock().unwrap().push((id, name.to_owned(), graph));
            Ok(())
        }
    }

    struct FakeUploader(Option<&'static str>);

    #[async_trait::async_trait]
    impl ImageUploader for FakeUploader {
        async fn upload(&self, _inline: &str) -> WorkflowResult<String> {
            self.0
                .map(str::to_owned)
                .ok_or_else(|| WorkflowError::storage("upload failed"))
        }
    }

    struct NoFetcher;

    #[async_trait::async_trait]
    impl ImageFetcher for NoFetcher {
        async fn fetch(&self, url: &str) -> WorkflowResult<String> {
            Err(WorkflowError::fetch(url))
        }
    }

    /// Echoes the user prompt, sleeping for prompts that start with "slow".
    #[derive(Default)]
    struct EchoGenerator {
        requests: StdMutex<Vec<GenerationRequest>>,
    }

    #[async_trait::async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, request: GenerationRequest) -> weave_rig::Result<GenerationOutput> {
            self.requests.lock().unwrap().push(request.clone());
            if request.user_prompt.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
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

    struct Harness {
        session: EditorSession,
        storage: Arc<FakeStorage>,
        generator: Arc<EchoGenerator>,
    }

    fn harness_with(storage: FakeStorage, uploader: FakeUploader) -> Harness {
        let storage = Arc::new(storage);
        let generator = Arc::new(EchoGenerator::default());
        let session = EditorSession::new(
            generator.clone(),
            storage.clone(),
            Arc::new(uploader),
            Arc::new(NoFetcher),
        );

        Harness {
            session,
            storage,
            generator,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeStorage::default(), FakeUploader(Some("https://cdn.example.com/1.png")))
    }

    async fn open_blank(harness: &Harness) -> WorkflowId {
        let id = harness
            .storage
            .insert(Workflow::new("Blank", Graph::default()), Duration::ZERO);
        harness.session.open(id).await.unwrap();
        id
    }

    async fn add_generator(session: &EditorSession, user_prompt: &str) -> NodeId {
        let user_prompt = user_prompt.to_owned();
        session
            .mutate(move |store| {
                let id = store.add_node(NodeType::Generator, Position::default());
                store.update_node_data(
                    &id,
                    GeneratorPatch {
                        user_prompt: Some(user_prompt),
                        ..GeneratorPatch::default()
                    },
                );
                id
            })
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn open_replaces_graph_and_history() {
        let harness = harness();
        let sample = Workflow::sample();
        let id = harness.storage.insert(sample.clone(), Duration::ZERO);

        harness.session.mutate(|store| store.add_node(NodeType::Text, Position::default())).await;
        harness.session.open(id).await.unwrap();

        assert_eq!(harness.session.snapshot().await, sample.graph());
        assert_eq!(harness.session.name().await, "Product Listing Generator");
        assert_eq!(harness.session.phase().await, SavePhase::Ready);
        assert!(!harness.session.mutate(|store| store.can_undo()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_open_leaves_session_unloaded() {
        let harness = harness();

        let result = harness.session.open(WorkflowId::generate()).await;
        assert!(matches!(result, Err(WorkflowError::Storage(_))));
        assert_eq!(harness.session.phase().await, SavePhase::Unloaded);
        assert_eq!(harness.session.document().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_open_is_discarded() {
        let harness = harness();
        let slow = harness
            .storage
            .insert(Workflow::sample(), Duration::from_secs(5));
        let fast = harness
            .storage
            .insert(Workflow::new("Fast", Graph::default()), Duration::ZERO);

        let pending = tokio::spawn({
            let session = harness.session.clone();
            async move { session.open(slow).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        harness.session.open(fast).await.unwrap();
        pending.await.unwrap().unwrap();

        assert_eq!(harness.session.document().await, Some(fast));
        assert_eq!(harness.session.name().await, "Fast");
        assert!(harness.session.snapshot().await.nodes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_writes_response_into_node() {
        let harness = harness();
        open_blank(&harness).await;
        let id = add_generator(&harness.session, "hello").await;

        assert!(harness.session.run_node(&id).await.unwrap());

        let graph = harness.session.snapshot().await;
        let data = graph.node(&id).unwrap().as_generator().unwrap();
        assert_eq!(data.response.as_deref(), Some("echo: hello"));
        assert!(!data.is_loading);
        assert_eq!(data.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn connected_prompt_takes_precedence() {
        let harness = harness();
        open_blank(&harness).await;
        let id = add_generator(&harness.session, "fallback").await;
        harness
            .session
            .mutate(|store| {
                let text = store.add_node(NodeType::Text, Position::default());
                store.update_node_data(
                    &text,
                    TextPatch {
                        content: Some("from the wire".to_owned()),
                        ..TextPatch::default()
                    },
                );
                store
                    .connect(Connection::new(text, None, id.clone(), Some("prompt")))
                    .unwrap();
            })
            .await;

        harness.session.run_node(&id).await.unwrap();

        let requests = harness.generator.requests.lock().unwrap().clone();
        assert_eq!(requests[0].user_prompt, "from the wire");
        assert_eq!(requests[0].model, "gpt-4o");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_prompt_is_stored_as_error() {
        let harness = harness();
        open_blank(&harness).await;
        let id = add_generator(&harness.session, "").await;

        harness.session.run_node(&id).await.unwrap();

        let graph = harness.session.snapshot().await;
        let data = graph.node(&id).unwrap().as_generator().unwrap();
        assert_eq!(data.error.as_deref(), Some(MISSING_PROMPT));
        assert!(!data.is_loading);
        assert!(harness.generator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn generation_error_is_stored_on_node() {
        let harness = harness();
        open_blank(&harness).await;
        let id = add_generator(&harness.session, "fail").await;

        assert!(harness.session.run_node(&id).await.unwrap());

        let graph = harness.session.snapshot().await;
        let data = graph.node(&id).unwrap().as_generator().unwrap();
        assert!(data.error.as_deref().unwrap().contains("OPENAI_API_KEY"));
        assert_eq!(data.response, None);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_run_result_is_dropped() {
        let harness = harness();
        open_blank(&harness).await;
        let id = add_generator(&harness.session, "slow start").await;

        let first = tokio::spawn({
            let session = harness.session.clone();
            let id = id.clone();
            async move { session.run_node(&id).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        harness
            .session
            .mutate(|store| {
                store.update_node_data(
                    &id,
                    GeneratorPatch {
                        user_prompt: Some("quick".to_owned()),
                        ..GeneratorPatch::default()
                    },
                )
            })
            .await;
        assert!(harness.session.run_node(&id).await.unwrap());
        assert!(!first.await.unwrap().unwrap());

        let graph = harness.session.snapshot().await;
        let data = graph.node(&id).unwrap().as_generator().unwrap();
        assert_eq!(data.response.as_deref(), Some("echo: quick"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_rejects_non_generator_nodes() {
        let harness = harness();
        open_blank(&harness).await;
        let text = harness
            .session
            .mutate(|store| store.add_node(NodeType::Text, Position::default()))
            .await;

        assert!(matches!(
            harness.session.run_node(&text).await,
            Err(WorkflowError::InvalidNode { .. })
        ));
        assert!(matches!(
            harness.session.run_node(&NodeId::from("ghost")).await,
            Err(WorkflowError::NodeNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn attach_image_keeps_inline_fallback_on_upload_failure() {
        let harness = harness_with(FakeStorage::default(), FakeUploader(None));
        open_blank(&harness).await;
        let id = harness
            .session
            .mutate(|store| store.add_node(NodeType::Image, Position::default()))
            .await;

        let inline = "data:image/png;base64,AAAA";
        assert!(!harness.session.attach_image(&id, inline).await.unwrap());

        let graph = harness.session.snapshot().await;
        let NodeKind::Image(data) = &graph.node(&id).unwrap().kind else {
            panic!("expected image node");
        };
        assert_eq!(data.image_url.as_deref(), Some(inline));
        assert_eq!(data.image_base64.as_deref(), Some(inline));
    }

    #[tokio::test(start_paused = true)]
    async fn attach_image_stores_durable_reference() {
        let harness = harness();
        open_blank(&harness).await;
        let id = harness
            .session
            .mutate(|store| store.add_node(NodeType::Image, Position::default()))
            .await;

        assert!(harness.session.attach_image(&id, "data:image/png;base64,AAAA").await.unwrap());

        let graph = harness.session.snapshot().await;
        let NodeKind::Image(data) = &graph.node(&id).unwrap().kind else {
            panic!("expected image node");
        };
        assert_eq!(data.image_url.as_deref(), Some("https://cdn.example.com/1.png"));
    }

    /// Holds the upload until released, signalling once it has started.
    #[derive(Default)]
    struct GatedUploader {
        started: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait::async_trait]
    impl ImageUploader for GatedUploader {
        async fn upload(&self, _inline: &str) -> WorkflowResult<String> {
            self.started.notify_one();
            self.release.notified().await;
            Ok("https://cdn.example.com/2.png".to_owned())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn attach_image_reports_node_removed_during_upload() {
        let uploader = GatedUploader::default();
        let (started, release) = (uploader.started.clone(), uploader.release.clone());
        let storage = Arc::new(FakeStorage::default());
        let generator = Arc::new(EchoGenerator::default());
        let harness = Harness {
            session: EditorSession::new(
                generator.clone(),
                storage.clone(),
                Arc::new(uploader),
                Arc::new(NoFetcher),
            ),
            storage,
            generator,
        };
        open_blank(&harness).await;
        let id = harness
            .session
            .mutate(|store| store.add_node(NodeType::Image, Position::default()))
            .await;

        let (attached, removed) = tokio::join!(
            harness.session.attach_image(&id, "data:image/png;base64,AAAA"),
            async {
                started.notified().await;
                let removed = harness.session.mutate(|store| store.delete_node(&id)).await;
                release.notify_one();
                removed
            }
        );

        assert!(removed);
        assert!(matches!(attached, Err(WorkflowError::NodeNotFound(missing)) if missing == id));
        assert!(harness.session.snapshot().await.node(&id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn save_is_gated_and_sanitized() {
        let harness = harness();
        let id = open_blank(&harness).await;
        let node = add_generator(&harness.session, "hello").await;

        assert!(!harness.session.save_now().await.unwrap());

        tokio::time::sleep(LOAD_GRACE).await;
        harness
            .session
            .mutate(|store| store.update_node_data(&node, GeneratorPatch::run_started()))
            .await;
        assert!(!harness.session.save_now().await.unwrap());

        harness
            .session
            .mutate(|store| store.update_node_data(&node, GeneratorPatch::run_failed("boom")))
            .await;
        assert!(harness.session.save_now().await.unwrap());

        let saved = harness.storage.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, id);
        let data = saved[0].2.node(&node).unwrap().as_generator().unwrap();
        assert_eq!(data.error, None);
        assert!(!data.is_loading);

        let live = harness.session.snapshot().await;
        let live = live.node(&node).unwrap().as_generator().unwrap();
        assert_eq!(live.error.as_deref(), Some("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_returns_to_ready() {
        let storage = FakeStorage {
            fail_saves: true,
            ..FakeStorage::default()
        };
        let harness = harness_with(storage, FakeUploader(None));
        open_blank(&harness).await;
        tokio::time::sleep(LOAD_GRACE).await;

        assert!(harness.session.save_now().await.is_err());
        assert_eq!(harness.session.phase().await, SavePhase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn autosave_debounces_changes() {
        let harness = harness();
        open_blank(&harness).await;
        tokio::time::sleep(LOAD_GRACE).await;

        let cancel = CancellationToken::new();
        let task = harness.session.spawn_autosave(cancel.clone());

        harness.session.rename("Draft").await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        harness.session.rename("Final").await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(harness.storage.saved().is_empty());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let saved = harness.storage.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].1, "Final");

        cancel.cancel();
        task.await.unwrap();
    }
}
