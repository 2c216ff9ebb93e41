use chrono::Utc;

use crate::error::Result;
use crate::loader::Loader;
use crate::notes::NoteStore;

/// Bundled first-run note.
pub const WELCOME_TEMPLATE: &str = include_str!("../resources/welcomeNote.md");

pub const WELCOME_TITLE: &str = "Welcome to Inkdrop";

/// Writes the welcome note when the store holds no notes at all.
///
/// Returns whether a note was written. Guarded only by the note count, so
/// deleting every note brings the welcome note back on next start.
pub fn create_welcome_note_if_empty(loader: &Loader, notes: &NoteStore) -> Result<bool> {
    if !loader.load_notes().is_empty() {
        log::debug!("Existing notes found, skipping welcome note");
        return Ok(false);
    }

    let id = Utc::now().timestamp_millis().to_string();
    let path = notes.save(&id, WELCOME_TITLE, WELCOME_TEMPLATE, None)?;
    log::info!("Created welcome note at {}", path.display());
    Ok(true)
}
