use tauri::State;

use crate::bridge::{Bridge, Request};
use crate::models::ApiResult;

/// Creates a notebook folder and records its display name.
///
/// # Arguments
/// * `notebook_id` - Folder name, sanitized before use
/// * `display_name` - Name shown in the sidebar
/// * `parent_id` - Optional parent notebook for nesting
#[tauri::command]
pub async fn create_notebook_folder(
    notebook_id: String,
    display_name: String,
    parent_id: Option<String>,
    bridge: State<'_, Bridge>,
) -> Result<ApiResult, String> {
    Ok(bridge
        .handle(Request::CreateNotebook {
            notebook_id,
            display_name,
            parent_id,
        })
        .await)
}

/// Deletes a notebook folder, its notes, and its sub-notebooks.
#[tauri::command]
pub async fn delete_notebook_folder(
    notebook_id: String,
    bridge: State<'_, Bridge>,
) -> Result<ApiResult, String> {
    Ok(bridge.handle(Request::DeleteNotebook { notebook_id }).await)
}

#[tauri::command]
pub async fn load_notebooks(bridge: State<'_, Bridge>) -> Result<ApiResult, String> {
    Ok(bridge.handle(Request::LoadNotebooks).await)
}
