//! Per-case notes with debounced autosave.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::StorageResult;
use crate::storage::{load_json, notes_key, save_json, KeyValueStore};

/// Runs the most recently scheduled task once no new task has been
/// scheduled for a full window.
pub struct Debouncer {
    window: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            handle: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace any pending task with `task`, to run after the window.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let window = self.window;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            task.await;
        }));
    }

    /// Drop the pending task. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Notes for the current case, saved after the user stops typing.
///
/// Notes are keyed by case name. Edits made before any case is selected
/// are kept in memory only.
pub struct NotesController {
    store: Arc<dyn KeyValueStore>,
    case_name: Option<String>,
    text: String,
    debouncer: Debouncer,
}

impl NotesController {
    pub fn new(store: Arc<dyn KeyValueStore>, window: Duration) -> Self {
        Self {
            store,
            case_name: None,
            text: String::new(),
            debouncer: Debouncer::new(window),
        }
    }

    /// Replace the note text and restart the autosave window.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();

        let Some(name) = self.case_name.clone() else {
            debug!("Note edited with no case selected, not scheduling save");
            return;
        };

        let store = self.store.clone();
        let text = self.text.clone();
        self.debouncer.schedule(async move {
            match persist(store.as_ref(), &name, &text).await {
                Ok(()) => debug!(case = %name, "Note autosaved"),
                Err(e) => warn!(case = %name, error = %e, "Note autosave failed"),
            }
        });
    }

    /// Persist the current text now and cancel any pending autosave.
    pub async fn save_now(&mut self) -> StorageResult<()> {
        self.debouncer.cancel();
        match &self.case_name {
            Some(name) => {
                persist(self.store.as_ref(), name, &self.text).await?;
                info!(case = %name, "Note saved");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Flush any pending edit for the current case, then load `name`'s note
    /// (empty if it has none).
    pub async fn switch_case(&mut self, name: impl Into<String>) -> StorageResult<()> {
        let name = name.into();

        if self.debouncer.is_pending() {
            self.save_now().await?;
        }

        let text: Option<String> = load_json(self.store.as_ref(), &notes_key(&name)).await?;
        debug!(case = %name, found = text.is_some(), "Note loaded");

        self.text = text.unwrap_or_default();
        self.case_name = Some(name);
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn case_name(&self) -> Option<&str> {
        self.case_name.as_deref()
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }
}

async fn persist(store: &dyn KeyValueStore, name: &str, text: &str) -> StorageResult<()> {
    save_json(store, &notes_key(name), text).await
}
