use std::path::Path;

use tauri::{AppHandle, State};
use tauri_plugin_opener::OpenerExt;

use crate::bridge::{Bridge, FolderRevealer, Request};
use crate::error::{Result as StorageResult, StorageError};
use crate::models::ApiResult;

/// Reveals folders through the opener plugin so the file manager selects
/// the folder instead of opening it.
pub struct OpenerRevealer {
    app: AppHandle,
}

impl OpenerRevealer {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl FolderRevealer for OpenerRevealer {
    fn reveal(&self, path: &Path) -> StorageResult<()> {
        self.app
            .opener()
            .reveal_item_in_dir(path)
            .map_err(|e| StorageError::Reveal {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

/// Returns the absolute storage root in `path`.
#[tauri::command]
pub async fn get_storage_path(bridge: State<'_, Bridge>) -> Result<ApiResult, String> {
    Ok(bridge.handle(Request::GetStoragePath).await)
}

/// Shows the storage root in the system file manager, creating it first if
/// needed.
#[tauri::command]
pub async fn open_storage_folder(bridge: State<'_, Bridge>) -> Result<ApiResult, String> {
    Ok(bridge.handle(Request::OpenStorageFolder).await)
}
