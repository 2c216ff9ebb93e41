use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{Result, StorageError};
use crate::loader::Loader;
use crate::metadata::NotebookMetadata;
use crate::models::{ApiResult, Config};
use crate::notebooks::NotebookStore;
use crate::notes::NoteStore;
use crate::paths::StoragePaths;
use crate::welcome::create_welcome_note_if_empty;

/// Shows a folder in the operating system's file browser.
pub trait FolderRevealer: Send + Sync {
    fn reveal(&self, path: &Path) -> Result<()>;
}

/// Opens folders with the platform's default handler.
pub struct SystemRevealer;

impl FolderRevealer for SystemRevealer {
    fn reveal(&self, path: &Path) -> Result<()> {
        open::that_detached(path).map_err(|e| StorageError::Reveal {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Tries `primary` and falls back to `fallback` when it fails.
pub struct FallbackRevealer {
    primary: Arc<dyn FolderRevealer>,
    fallback: Arc<dyn FolderRevealer>,
}

impl FallbackRevealer {
    pub fn new(primary: Arc<dyn FolderRevealer>, fallback: Arc<dyn FolderRevealer>) -> Self {
        Self { primary, fallback }
    }
}

impl FolderRevealer for FallbackRevealer {
    fn reveal(&self, path: &Path) -> Result<()> {
        match self.primary.reveal(path) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("{}; retrying with the system handler", e);
                self.fallback.reveal(path)
            }
        }
    }
}

/// A named operation issued by the UI.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(
    tag = "operation",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    SaveNote {
        id: String,
        title: String,
        content: String,
        notebook_id: Option<String>,
    },
    DeleteNote {
        id: String,
        title: String,
        notebook_id: Option<String>,
    },
    GetStoragePath,
    DeleteNotebook {
        notebook_id: String,
    },
    CreateNotebook {
        notebook_id: String,
        display_name: String,
        parent_id: Option<String>,
    },
    LoadNotebooks,
    LoadNotes,
    OpenStorageFolder,
}

impl Request {
    pub fn operation(&self) -> &'static str {
        match self {
            Request::SaveNote { .. } => "save-note",
            Request::DeleteNote { .. } => "delete-note",
            Request::GetStoragePath => "get-storage-path",
            Request::DeleteNotebook { .. } => "delete-notebook",
            Request::CreateNotebook { .. } => "create-notebook",
            Request::LoadNotebooks => "load-notebooks",
            Request::LoadNotes => "load-notes",
            Request::OpenStorageFolder => "open-storage-folder",
        }
    }
}

/// The storage layer assembled over one root folder.
pub struct Storage {
    paths: StoragePaths,
    notes: NoteStore,
    notebooks: NotebookStore,
    loader: Loader,
    revealer: Arc<dyn FolderRevealer>,
}

impl Storage {
    pub fn new(paths: StoragePaths, revealer: Arc<dyn FolderRevealer>) -> Self {
        let metadata = Arc::new(NotebookMetadata::new(paths.metadata_file()));
        Self {
            notes: NoteStore::new(paths.clone()),
            notebooks: NotebookStore::new(paths.clone(), Arc::clone(&metadata)),
            loader: Loader::new(paths.clone(), metadata),
            paths,
            revealer,
        }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn notebooks(&self) -> &NotebookStore {
        &self.notebooks
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Prepares the store for use.
    ///
    /// Fails only when the root folder cannot be created; recovery and the
    /// welcome note are best effort.
    pub fn startup(&self, config: &Config) -> Result<()> {
        let root = self.paths.ensure_root()?;
        log::info!("Storing notes in {}", root.display());

        if config.recover_on_startup {
            match self.notes.recover() {
                Ok(report) if !report.is_empty() => log::warn!(
                    "Recovered storage: removed {} temp files and {} duplicate notes",
                    report.removed_temp_files.len(),
                    report.removed_duplicates.len()
                ),
                Ok(_) => {}
                Err(e) => log::error!("Recovery scan failed: {}", e),
            }
        }

        if config.create_welcome_note {
            if let Err(e) = create_welcome_note_if_empty(&self.loader, &self.notes) {
                log::error!("Failed to create welcome note: {}", e);
            }
        }

        Ok(())
    }

    /// Runs one request to completion and folds the outcome into an
    /// [`ApiResult`].
    pub fn dispatch(&self, request: Request) -> ApiResult {
        let operation = request.operation();
        let result = match request {
            Request::SaveNote {
                id,
                title,
                content,
                notebook_id,
            } => self
                .notes
                .save(&id, &title, &content, notebook_id.as_deref())
                .map(|path| ApiResult::with_file_path(path.to_string_lossy())),
            Request::DeleteNote {
                id,
                title,
                notebook_id,
            } => self
                .notes
                .delete(&id, &title, notebook_id.as_deref())
                .map(ApiResult::with_flag),
            Request::GetStoragePath => Ok(ApiResult::with_path(
                self.paths.root_storage_path().to_string_lossy(),
            )),
            Request::DeleteNotebook { notebook_id } => {
                self.notebooks.delete(&notebook_id).map(ApiResult::with_flag)
            }
            Request::CreateNotebook {
                notebook_id,
                display_name,
                parent_id,
            } => self
                .notebooks
                .create(&notebook_id, &display_name, parent_id.as_deref())
                .map(|path| ApiResult::with_folder_path(path.to_string_lossy())),
            Request::LoadNotebooks => match self.loader.load_notebooks() {
                Ok(notebooks) => Ok(ApiResult::with_notebooks(notebooks)),
                // The UI always expects a list, even on failure.
                Err(e) => {
                    log::error!("{} failed: {}", operation, e);
                    return ApiResult {
                        notebooks: Some(Vec::new()),
                        ..ApiResult::from_error(&e)
                    };
                }
            },
            Request::LoadNotes => Ok(ApiResult::with_notes(self.loader.load_notes())),
            Request::OpenStorageFolder => self
                .paths
                .ensure_root()
                .and_then(|root| self.revealer.reveal(&root))
                .map(|()| ApiResult::success()),
        };

        result.unwrap_or_else(|e| {
            log::error!("{} failed: {}", operation, e);
            ApiResult::from_error(&e)
        })
    }
}

/// Async front door used by the UI process.
///
/// Requests are handled one at a time, each on the blocking thread pool so
/// the caller's event loop keeps running.
pub struct Bridge {
    storage: Arc<Storage>,
    gate: Mutex<()>,
}

impl Bridge {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(storage),
            gate: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub async fn handle(&self, request: Request) -> ApiResult {
        let _guard = self.gate.lock().await;
        let operation = request.operation();
        let storage = Arc::clone(&self.storage);

        match tokio::task::spawn_blocking(move || storage.dispatch(request)).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("{} did not complete: {}", operation, e);
                ApiResult::error(format!("{} did not complete: {}", operation, e))
            }
        }
    }
}
