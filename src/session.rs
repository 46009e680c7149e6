//! One user's dashboard: the workspace plus the stores and controllers that
//! hang off it.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::{AnalysisClient, AnalysisService, HealthStatus};
use crate::bookmarks::BookmarkRegistry;
use crate::case::{BookmarkEntry, CaseSnapshot, EvidenceItem, SnapshotId};
use crate::config::Config;
use crate::decode::Decoded;
use crate::error::{AppResult, PipelineError, ServiceError, ServiceResult, StorageResult};
use crate::evidence::EvidenceManager;
use crate::history::HistoryCache;
use crate::notes::NotesController;
use crate::pipeline::{CasePipeline, CaseWorkspace, Notice, SharedWorkspace};
use crate::storage::{KeyValueStore, SqliteStore};
use crate::views;

/// Shared state for one dashboard session.
pub struct CaseSession {
    /// Application configuration.
    pub config: Config,
    service: Arc<dyn AnalysisService>,
    workspace: SharedWorkspace,
    pipeline: CasePipeline,
    history: HistoryCache,
    bookmarks: BookmarkRegistry,
    notes: Mutex<NotesController>,
}

impl CaseSession {
    /// Create a session over an existing service and store.
    pub fn new(
        config: Config,
        service: Arc<dyn AnalysisService>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let history = HistoryCache::new(store.clone());
        let pipeline = CasePipeline::new(
            service.clone(),
            history.clone(),
            config.request.clone(),
            config.dashboard.clone(),
        );
        let bookmarks = BookmarkRegistry::new(store.clone());
        let notes = NotesController::new(store, config.dashboard.notes_autosave_window());

        Self {
            config,
            service,
            workspace: Arc::new(Mutex::new(CaseWorkspace::new())),
            pipeline,
            history,
            bookmarks,
            notes: Mutex::new(notes),
        }
    }

    /// Open the configured database and service client.
    pub async fn connect(config: Config) -> AppResult<Self> {
        let store = SqliteStore::new(&config.database).await?;
        info!(path = %config.database.path.display(), "Database initialized");

        let client = AnalysisClient::new(
            &config.service,
            config.endpoints.clone(),
            config.request.clone(),
        )?;
        info!(base_url = %config.service.base_url, "Analysis client initialized");

        Ok(Self::new(config, Arc::new(client), Arc::new(store)))
    }

    /// The workspace the dashboard renders.
    pub fn workspace(&self) -> &SharedWorkspace {
        &self.workspace
    }

    /// Run the analysis pipeline for a document and open its notes.
    pub async fn analyze(&self, name: &str, text: &str) -> Result<CaseSnapshot, PipelineError> {
        let result = self.pipeline.run(&self.workspace, name, text).await;
        self.open_notes(name).await;
        result
    }

    /// Upload evidence for the current session. A rejected upload leaves a
    /// notice and adds nothing.
    pub async fn upload_evidence(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> ServiceResult<EvidenceItem> {
        match EvidenceManager::analyze(self.service.as_ref(), filename, content).await {
            Ok(item) => {
                self.workspace
                    .lock()
                    .await
                    .evidence_mut()
                    .append(item.clone());
                Ok(item)
            }
            Err(e) => {
                if let ServiceError::UploadRejected { filename } = &e {
                    self.workspace
                        .lock()
                        .await
                        .set_notice(Notice::EvidenceRejected {
                            filename: filename.clone(),
                        });
                }
                Err(e)
            }
        }
    }

    /// Stored history, newest first.
    pub async fn history(&self) -> StorageResult<Vec<CaseSnapshot>> {
        self.history.list().await
    }

    /// Load a snapshot into the workspace. Returns `None` if it is gone.
    pub async fn restore(&self, id: SnapshotId) -> StorageResult<Option<CaseSnapshot>> {
        let Some(snapshot) = self.history.load(id).await? else {
            return Ok(None);
        };

        self.workspace.lock().await.restore(&snapshot);
        self.open_notes(&snapshot.name).await;
        Ok(Some(snapshot))
    }

    /// Delete a snapshot from history.
    pub async fn remove_from_history(&self, id: SnapshotId) -> StorageResult<bool> {
        self.history.remove(id).await
    }

    /// Bookmark or un-bookmark the current case. Returns whether it is now
    /// bookmarked.
    pub async fn toggle_bookmark(&self) -> StorageResult<bool> {
        let entry = BookmarkEntry::capture(&*self.workspace.lock().await);
        self.bookmarks.toggle(entry).await
    }

    /// All bookmarks.
    pub async fn bookmarks(&self) -> StorageResult<Vec<BookmarkEntry>> {
        self.bookmarks.list().await
    }

    /// Whether the current case is bookmarked.
    pub async fn is_bookmarked(&self) -> StorageResult<bool> {
        let name = self.workspace.lock().await.name().to_string();
        self.bookmarks.is_bookmarked(&name).await
    }

    /// Edit the current case's notes; saved after the autosave window.
    pub async fn edit_notes(&self, text: impl Into<String>) {
        self.notes.lock().await.edit(text);
    }

    /// Save the current case's notes immediately.
    pub async fn save_notes(&self) -> StorageResult<()> {
        self.notes.lock().await.save_now().await
    }

    /// Current note text.
    pub async fn notes(&self) -> String {
        self.notes.lock().await.text().to_string()
    }

    /// Plain-text summary of the current case.
    pub async fn summary(&self) -> String {
        let ws = self.workspace.lock().await;
        views::case_summary(
            ws.analysis().and_then(Decoded::as_ok),
            ws.risk().and_then(Decoded::as_ok),
            ws.strength().and_then(Decoded::as_ok),
        )
    }

    /// Checklist for the current case type.
    pub async fn checklist(&self) -> &'static [&'static str] {
        let ws = self.workspace.lock().await;
        let case_type = ws
            .analysis()
            .and_then(Decoded::as_ok)
            .and_then(|a| a.case_type.clone())
            .unwrap_or_default();
        views::checklist_for(&case_type)
    }

    /// One line per uploaded evidence item.
    pub async fn evidence_digest(&self) -> Vec<String> {
        views::evidence_digest(self.workspace.lock().await.evidence().items())
    }

    /// Probe the analysis service.
    pub async fn health(&self) -> ServiceResult<HealthStatus> {
        self.service.health().await
    }

    async fn open_notes(&self, name: &str) {
        let result = self.notes.lock().await.switch_case(name).await;
        if let Err(e) = result {
            warn!(case = %name, error = %e, "Failed to load notes");
            self.workspace
                .lock()
                .await
                .set_notice(Notice::StorageUnavailable {
                    message: e.to_string(),
                });
        }
    }
}
