//! Per-document save state machine.
//!
//! `Unloaded → Loading → Ready → Saving → Ready`. Saves start only from
//! `Ready`, and only once the load grace period has elapsed and no node is
//! generating. Starting a new load invalidates every earlier load ticket, so
//! a slow load cannot overwrite a newer document and no save can target a
//! document other than the one most recently confirmed loaded.

use std::time::Duration;

use derive_builder::Builder;
use strum::{AsRefStr, Display};
use tokio::time::Instant;

use crate::workflow::WorkflowId;

/// Quiet period after the last change before an automatic save.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(2);

/// Period after a load during which saves are suppressed.
pub const LOAD_GRACE: Duration = Duration::from_secs(3);

/// Timing of automatic saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
#[builder(
    name = "AutoSaveConfigBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct AutoSaveConfig {
    /// Quiet period after the last change.
    #[builder(default = "AUTOSAVE_DEBOUNCE")]
    pub debounce: Duration,
    /// Saves are suppressed for this long after a load.
    #[builder(default = "LOAD_GRACE")]
    pub load_grace: Duration,
}

impl AutoSaveConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.debounce.is_some_and(|debounce| debounce.is_zero()) {
            return Err("debounce must be greater than zero".into());
        }
        Ok(())
    }
}

impl AutoSaveConfig {
    /// Returns a builder for the configuration.
    pub fn builder() -> AutoSaveConfigBuilder {
        AutoSaveConfigBuilder::default()
    }
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce: AUTOSAVE_DEBOUNCE,
            load_grace: LOAD_GRACE,
        }
    }
}

/// Phase of the per-document save state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SavePhase {
    /// No document is loaded.
    #[default]
    Unloaded,
    /// A document load is in flight.
    Loading,
    /// The document is loaded and may be saved.
    Ready,
    /// A save is in flight.
    Saving,
}

/// Why a save did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SaveBlocked {
    /// No document has been loaded.
    NotLoaded,
    /// The document is still loading.
    Loading,
    /// Another save is in flight.
    InFlight,
    /// The document was loaded too recently.
    WithinLoadGrace,
    /// A node is mid-generation.
    Generating,
}

/// Identifies one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    /// Document being loaded.
    pub document: WorkflowId,
    generation: u64,
}

/// Load and save bookkeeping for the open document.
#[derive(Debug, Clone, Default)]
pub struct SaveState {
    phase: SavePhase,
    document: Option<WorkflowId>,
    loaded_at: Option<Instant>,
    generation: u64,
}

impl SaveState {
    /// Returns the current phase.
    pub fn phase(&self) -> SavePhase {
        self.phase
    }

    /// Returns the document most recently confirmed loaded, or being loaded.
    pub fn document(&self) -> Option<WorkflowId> {
        self.document
    }

    /// Starts loading a document, invalidating any earlier load.
    pub fn begin_load(&mut self, document: WorkflowId) -> LoadTicket {
        self.generation += 1;
        self.phase = SavePhase::Loading;
        self.document = Some(document);
        self.loaded_at = None;

        LoadTicket {
            document,
            generation: self.generation,
        }
    }

    /// Returns true if the ticket belongs to the latest load.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && self.phase == SavePhase::Loading
    }

    /// Confirms a load. Returns false if the ticket was superseded.
    pub fn finish_load(&mut self, ticket: &LoadTicket, now: Instant) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.phase = SavePhase::Ready;
        self.loaded_at = Some(now);
        true
    }

    /// Abandons a load. Returns false if the ticket was superseded.
    pub fn fail_load(&mut self, ticket: &LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.phase = SavePhase::Unloaded;
        self.document = None;
        true
    }

    /// Enters `Saving` if every gate passes, returning the document to save.
    pub fn begin_save(
        &mut self,
        now: Instant,
        load_grace: Duration,
        any_generating: bool,
    ) -> Result<WorkflowId, SaveBlocked> {
        let document = match self.phase {
            SavePhase::Unloaded => return Err(SaveBlocked::NotLoaded),
            SavePhase::Loading => return Err(SaveBlocked::Loading),
            SavePhase::Saving => return Err(SaveBlocked::InFlight),
            SavePhase::Ready => self.document.ok_or(SaveBlocked::NotLoaded)?,
        };

        let loaded_at = self.loaded_at.ok_or(SaveBlocked::NotLoaded)?;
        if now.saturating_duration_since(loaded_at) < load_grace {
            return Err(SaveBlocked::WithinLoadGrace);
        }
        if any_generating {
            return Err(SaveBlocked::Generating);
        }

        self.phase = SavePhase::Saving;
        Ok(document)
    }

    /// Leaves `Saving`. Ignored if a new load started meanwhile.
    pub fn finish_save(&mut self, document: WorkflowId) {
        if self.phase == SavePhase::Saving && self.document == Some(document) {
            self.phase = SavePhase::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(at: Instant) -> (SaveState, WorkflowId) {
        let mut state = SaveState::default();
        let document = WorkflowId::generate();
        let ticket = state.begin_load(document);
        assert!(state.finish_load(&ticket, at));
        (state, document)
    }

    #[test]
    fn unloaded_document_cannot_save() {
        let mut state = SaveState::default();
        assert_eq!(
            state.begin_save(Instant::now(), LOAD_GRACE, false),
            Err(SaveBlocked::NotLoaded)
        );

        state.begin_load(WorkflowId::generate());
        assert_eq!(
            state.begin_save(Instant::now(), LOAD_GRACE, false),
            Err(SaveBlocked::Loading)
        );
    }

    #[test]
    fn save_waits_for_load_grace() {
        let start = Instant::now();
        let (mut state, document) = loaded(start);

        assert_eq!(
            state.begin_save(start + Duration::from_secs(1), LOAD_GRACE, false),
            Err(SaveBlocked::WithinLoadGrace)
        );
        assert_eq!(
            state.begin_save(start + LOAD_GRACE, LOAD_GRACE, false),
            Ok(document)
        );
        assert_eq!(state.phase(), SavePhase::Saving);
    }

    #[test]
    fn saves_are_mutually_exclusive() {
        let start = Instant::now();
        let (mut state, document) = loaded(start);
        let later = start + LOAD_GRACE;

        assert_eq!(state.begin_save(later, LOAD_GRACE, true), Err(SaveBlocked::Generating));
        assert!(state.begin_save(later, LOAD_GRACE, false).is_ok());
        assert_eq!(state.begin_save(later, LOAD_GRACE, false), Err(SaveBlocked::InFlight));

        state.finish_save(document);
        assert_eq!(state.phase(), SavePhase::Ready);
    }

    #[test]
    fn superseded_load_is_discarded() {
        let mut state = SaveState::default();
        let first = state.begin_load(WorkflowId::generate());
        let second = state.begin_load(WorkflowId::generate());

        assert!(!state.finish_load(&first, Instant::now()));
        assert!(!state.fail_load(&first));
        assert!(state.finish_load(&second, Instant::now()));
        assert_eq!(state.document(), Some(second.document));
    }

    #[test]
    fn failed_load_returns_to_unloaded() {
        let mut state = SaveState::default();
        let ticket = state.begin_load(WorkflowId::generate());

        assert!(state.fail_load(&ticket));
        assert_eq!(state.phase(), SavePhase::Unloaded);
        assert_eq!(state.document(), None);
    }

    #[test]
    fn new_load_during_save_keeps_loading_phase() {
        let start = Instant::now();
        let (mut state, document) = loaded(start);
        state
            .begin_save(start + LOAD_GRACE, LOAD_GRACE, false)
            .unwrap();

        state.begin_load(WorkflowId::generate());
        state.finish_save(document);
        assert_eq!(state.phase(), SavePhase::Loading);
    }

    #[test]
    fn builder_rejects_zero_debounce() {
        let config = AutoSaveConfig::builder()
            .with_load_grace(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(config.debounce, AUTOSAVE_DEBOUNCE);
        assert_eq!(config.load_grace, Duration::ZERO);

        assert!(
            AutoSaveConfig::builder()
                .with_debounce(Duration::ZERO)
                .build()
                .is_err()
        );
    }
}
