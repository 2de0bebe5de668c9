//! The workspace state machine over tabs, units, notes, and transcripts.

use crate::backend::{ApiClient, ApiError, NoteRecord, QueryError, TabRecord, UnitRecord};
use crate::config::get_config;
use crate::ingest::{IngestApi, IngestError, IngestOutcome, IngestionPipeline};
use crate::workspace::chat::ChatLine;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Input rejected locally; no request was made.
    #[error("{0}")]
    InvalidInput(&'static str),
    /// Operation attempted without the required selection state.
    #[error("{0}")]
    PreconditionFailed(&'static str),
    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The ingestion pipeline aborted.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl From<QueryError> for WorkspaceError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::EmptyQuery => WorkspaceError::InvalidInput("query text must not be empty"),
            QueryError::Api(error) => WorkspaceError::Api(error),
        }
    }
}

/// In-memory workspace session: hierarchy, selection pointers, transcripts.
///
/// Operations take `&mut self`, so each one's effects are applied atomically
/// with respect to the next — two sends against the same transcript cannot
/// interleave on one `Workspace`. Callers sharing a workspace across tasks
/// wrap it in a mutex, which serializes whole operations.
pub struct Workspace {
    api: Arc<ApiClient>,
    ingest: Arc<dyn IngestApi>,
    top_k: Option<usize>,
    tabs: Vec<TabRecord>,
    units: Vec<UnitRecord>,
    notes: Vec<NoteRecord>,
    transcripts: HashMap<String, Vec<ChatLine>>,
    active_tab: Option<String>,
    active_unit: Option<String>,
}

impl Workspace {
    /// Build a workspace around an existing backend client.
    pub fn new(api: Arc<ApiClient>) -> Self {
        let ingest = Arc::new(IngestionPipeline::new(Arc::clone(&api)));
        Self::with_pipeline(api, ingest)
    }

    /// Build a workspace with a caller-supplied ingestion pipeline.
    pub fn with_pipeline(api: Arc<ApiClient>, ingest: Arc<dyn IngestApi>) -> Self {
        Self {
            api,
            ingest,
            top_k: None,
            tabs: Vec::new(),
            units: Vec::new(),
            notes: Vec::new(),
            transcripts: HashMap::new(),
            active_tab: None,
            active_unit: None,
        }
    }

    /// Build a workspace from the process configuration.
    pub fn from_env() -> Result<Self, ApiError> {
        let api = Arc::new(ApiClient::from_env()?);
        let mut workspace = Self::new(api);
        workspace.top_k = get_config().search_top_k;
        Ok(workspace)
    }

    /// Currently loaded tabs.
    pub fn tabs(&self) -> &[TabRecord] {
        &self.tabs
    }

    /// Units loaded for the active tab.
    pub fn units(&self) -> &[UnitRecord] {
        &self.units
    }

    /// Notes loaded for the active unit.
    pub fn notes(&self) -> &[NoteRecord] {
        &self.notes
    }

    /// Identifier of the active tab, when one is selected.
    pub fn active_tab_id(&self) -> Option<&str> {
        self.active_tab.as_deref()
    }

    /// Identifier of the active unit, when one is selected.
    pub fn active_unit_id(&self) -> Option<&str> {
        self.active_unit.as_deref()
    }

    /// Chat transcript for a unit, when one has been created.
    pub fn transcript(&self, unit_id: &str) -> Option<&[ChatLine]> {
        self.transcripts.get(unit_id).map(Vec::as_slice)
    }

    /// Chat transcript for the active unit.
    pub fn active_transcript(&self) -> Option<&[ChatLine]> {
        self.active_unit
            .as_deref()
            .and_then(|unit_id| self.transcript(unit_id))
    }

    /// Replace the tab set from the store.
    ///
    /// Keeps the active tab when it still exists; otherwise selects the first
    /// tab of a non-empty result, or clears the selection entirely.
    pub async fn load_tabs(&mut self) -> Result<(), WorkspaceError> {
        self.tabs = self.api.list_tabs().await?;

        let active_resolves = self
            .active_tab
            .as_ref()
            .is_some_and(|id| self.tabs.iter().any(|tab| &tab.id == id));
        if active_resolves {
            return Ok(());
        }

        self.clear_tab_scope();
        if let Some(first) = self.tabs.first().map(|tab| tab.id.clone()) {
            self.select_tab(&first).await?;
        }
        Ok(())
    }

    /// Make a tab active and load its units.
    ///
    /// An id that does not resolve to a loaded tab clears the selection and
    /// the dependent unit/note state instead of failing.
    pub async fn select_tab(&mut self, id: &str) -> Result<(), WorkspaceError> {
        if !self.tabs.iter().any(|tab| tab.id == id) {
            self.clear_tab_scope();
            return Ok(());
        }
        self.active_tab = Some(id.to_string());
        self.load_units(id).await
    }

    /// Replace the unit set for one tab from the store.
    ///
    /// Keeps the active unit when it is still present; otherwise selects the
    /// first unit of a non-empty result, or clears the unit selection and the
    /// note list.
    pub async fn load_units(&mut self, tab_id: &str) -> Result<(), WorkspaceError> {
        self.units = self.api.list_units(tab_id).await?;

        let active_resolves = self
            .active_unit
            .as_ref()
            .is_some_and(|id| self.units.iter().any(|unit| &unit.id == id));
        if active_resolves {
            return Ok(());
        }

        match self.units.first().map(|unit| unit.id.clone()) {
            Some(first) => self.select_unit(&first).await,
            None => {
                self.active_unit = None;
                self.notes.clear();
                Ok(())
            }
        }
    }

    /// Make a unit active, reload its note list, and ensure it has a transcript.
    ///
    /// The transcript is created empty on first selection and preserved
    /// across later selections; it is only dropped when the unit is deleted.
    pub async fn select_unit(&mut self, id: &str) -> Result<(), WorkspaceError> {
        if !self.units.iter().any(|unit| unit.id == id) {
            return Err(WorkspaceError::InvalidInput(
                "unit does not belong to the active tab",
            ));
        }
        self.active_unit = Some(id.to_string());
        self.transcripts.entry(id.to_string()).or_default();
        self.notes.clear();
        self.notes = self.api.list_notes(id).await?;
        Ok(())
    }

    /// Create a tab and make it active. A new tab starts with no units.
    pub async fn create_tab(
        &mut self,
        name: &str,
        color: &str,
    ) -> Result<TabRecord, WorkspaceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::InvalidInput("tab name must not be empty"));
        }

        let tab = self.api.create_tab(name, color).await?;
        self.active_tab = Some(tab.id.clone());
        self.active_unit = None;
        self.units.clear();
        self.notes.clear();
        self.tabs.push(tab.clone());
        Ok(tab)
    }

    /// Create a unit under the active tab and make it active.
    pub async fn create_unit(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<UnitRecord, WorkspaceError> {
        let tab_id = self
            .active_tab
            .clone()
            .ok_or(WorkspaceError::PreconditionFailed("no tab is selected"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::InvalidInput("unit name must not be empty"));
        }

        let unit = self.api.create_unit(&tab_id, name, description).await?;
        self.transcripts.insert(unit.id.clone(), Vec::new());
        self.active_unit = Some(unit.id.clone());
        self.notes.clear();
        self.units.push(unit.clone());
        Ok(unit)
    }

    /// Delete a tab, cascading to its units' transcripts.
    ///
    /// The unit list is fetched from the store before the delete so transcript
    /// cleanup covers units this session never loaded. If the deleted tab was
    /// active, the first remaining tab is selected, or the selection cleared.
    pub async fn delete_tab(&mut self, id: &str) -> Result<(), WorkspaceError> {
        let unit_ids: Vec<String> = self
            .api
            .list_units(id)
            .await?
            .into_iter()
            .map(|unit| unit.id)
            .collect();

        self.api.delete_tab(id).await?;

        self.tabs.retain(|tab| tab.id != id);
        for unit_id in &unit_ids {
            self.transcripts.remove(unit_id);
        }

        if self.active_tab.as_deref() == Some(id) {
            for unit in &self.units {
                self.transcripts.remove(&unit.id);
            }
            self.clear_tab_scope();
            if let Some(first) = self.tabs.first().map(|tab| tab.id.clone()) {
                self.select_tab(&first).await?;
            }
        }
        Ok(())
    }

    /// Delete a unit and its transcript.
    ///
    /// On remote success the unit is removed locally and, if it was active,
    /// the first remaining unit in the tab is selected (or the selection
    /// cleared). On remote failure the local list is left untouched and the
    /// unit set is reloaded from the store to reconcile.
    pub async fn delete_unit(&mut self, id: &str) -> Result<(), WorkspaceError> {
        if let Err(error) = self.api.delete_unit(id).await {
            if let Some(tab_id) = self.active_tab.clone() {
                if let Err(reload_error) = self.load_units(&tab_id).await {
                    tracing::warn!(tab = %tab_id, error = %reload_error, "Reconciling unit reload failed");
                }
            }
            return Err(error.into());
        }

        self.units.retain(|unit| unit.id != id);
        self.transcripts.remove(id);

        if self.active_unit.as_deref() == Some(id) {
            match self.units.first().map(|unit| unit.id.clone()) {
                Some(first) => self.select_unit(&first).await?,
                None => {
                    self.active_unit = None;
                    self.notes.clear();
                }
            }
        }
        Ok(())
    }

    /// Send a chat message scoped to the active unit.
    ///
    /// The user line is appended optimistically and rolled back if the ask
    /// call fails, so the transcript never holds a question with no matching
    /// answer and no surfaced error.
    pub async fn send_message(&mut self, text: &str) -> Result<String, WorkspaceError> {
        let unit_id = self
            .active_unit
            .clone()
            .ok_or(WorkspaceError::PreconditionFailed("no unit is selected"))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(WorkspaceError::InvalidInput(
                "message text must not be empty",
            ));
        }

        let api = Arc::clone(&self.api);
        let top_k = self.top_k;
        let transcript = self.transcripts.entry(unit_id.clone()).or_default();
        let restore_len = transcript.len();
        transcript.push(ChatLine::user(text));

        match api.ask(text, &unit_id, top_k).await {
            Ok(answer) => {
                transcript.push(ChatLine::assistant(answer.answer.clone()));
                Ok(answer.answer)
            }
            Err(error) => {
                transcript.truncate(restore_len);
                Err(error.into())
            }
        }
    }

    /// Ingest an uploaded document into the active unit.
    ///
    /// Overall success is extraction's success; a persistence failure is a
    /// soft error, so the note list is only refreshed when a note exists.
    pub async fn upload_document(
        &mut self,
        file: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<IngestOutcome, WorkspaceError> {
        let unit_id = self
            .active_unit
            .clone()
            .ok_or(WorkspaceError::PreconditionFailed("no unit is selected"))?;

        let ingest = Arc::clone(&self.ingest);
        let outcome = ingest
            .ingest_document(file, filename, mime_type, &unit_id)
            .await?;

        if outcome.persistence_ok() {
            match self.api.list_notes(&unit_id).await {
                Ok(notes) => self.notes = notes,
                Err(error) => {
                    tracing::warn!(unit = %unit_id, %error, "Refreshing notes after ingestion failed");
                }
            }
        }
        Ok(outcome)
    }

    fn clear_tab_scope(&mut self) {
        self.active_tab = None;
        self.active_unit = None;
        self.units.clear();
        self.notes.clear();
    }
}
