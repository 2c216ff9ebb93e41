use tauri::State;

use crate::bridge::{Bridge, Request};
use crate::models::ApiResult;

/// Writes a note to `<title>_<id>.md`, renaming the file if the title or
/// notebook changed since the last save.
///
/// # Arguments
/// * `id` - Numeric note id
/// * `title` - Display title; sanitized into the file name
/// * `content` - Markdown body
/// * `notebook_id` - Optional notebook folder holding the note
#[tauri::command]
pub async fn save_note_to_file(
    id: String,
    title: String,
    content: String,
    notebook_id: Option<String>,
    bridge: State<'_, Bridge>,
) -> Result<ApiResult, String> {
    Ok(bridge
        .handle(Request::SaveNote {
            id,
            title,
            content,
            notebook_id,
        })
        .await)
}

/// Deletes a note file. `success` is false when no file was found.
#[tauri::command]
pub async fn delete_note_file(
    id: String,
    title: String,
    notebook_id: Option<String>,
    bridge: State<'_, Bridge>,
) -> Result<ApiResult, String> {
    Ok(bridge
        .handle(Request::DeleteNote {
            id,
            title,
            notebook_id,
        })
        .await)
}

#[tauri::command]
pub async fn load_notes(bridge: State<'_, Bridge>) -> Result<ApiResult, String> {
    Ok(bridge.handle(Request::LoadNotes).await)
}
