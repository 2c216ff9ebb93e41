use std::fs;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{Result, StorageError};
use crate::metadata::NotebookMetadata;
use crate::models::{NoteRecord, NotebookRecord};
use crate::notes::{scan_note_files, NoteFile};
use crate::paths::{StoragePaths, METADATA_FILE_NAME};
use crate::sanitize::{desanitize_name, title_from_file_segment};

/// Rebuilds the UI's note and notebook collections from the storage tree.
///
/// Nothing is cached: every call rescans the disk.
#[derive(Debug, Clone)]
pub struct Loader {
    paths: StoragePaths,
    metadata: Arc<NotebookMetadata>,
}

impl Loader {
    pub fn new(paths: StoragePaths, metadata: Arc<NotebookMetadata>) -> Self {
        Self { paths, metadata }
    }

    /// Every folder directly under the root is a notebook.
    pub fn load_notebooks(&self) -> Result<Vec<NotebookRecord>> {
        let root = self.paths.root_storage_path();
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let sidecar = self.metadata.load();
        let entries =
            fs::read_dir(root).map_err(|e| StorageError::io("list storage folder", root, e))?;

        let mut notebooks = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", root.display(), e);
                    continue;
                }
            };
            let id = entry.file_name().to_string_lossy().into_owned();
            if id == METADATA_FILE_NAME || id.starts_with('.') {
                continue;
            }
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let (name, parent_id) = match sidecar.get(&id) {
                Some(meta) => (meta.name().to_string(), meta.parent_id().map(str::to_string)),
                None => (desanitize_name(&id), None),
            };
            let name = if name.is_empty() { id.clone() } else { name };

            notebooks.push(NotebookRecord {
                id,
                name,
                parent_id,
            });
        }

        notebooks.sort_by(|a, b| a.id.cmp(&b.id));
        log::debug!("Loaded {} notebooks", notebooks.len());
        Ok(notebooks)
    }

    /// Reads every note file in the root and in each notebook folder.
    ///
    /// Files that cannot be read are logged and left out.
    pub fn load_notes(&self) -> Vec<NoteRecord> {
        let notes: Vec<NoteRecord> = scan_note_files(self.paths.root_storage_path())
            .into_iter()
            .filter_map(|file| match read_note_record(&file) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping note file: {}", e);
                    None
                }
            })
            .collect();
        log::debug!("Loaded {} notes", notes.len());
        notes
    }
}

fn read_note_record(file: &NoteFile) -> Result<NoteRecord> {
    let content = fs::read_to_string(&file.path)
        .map_err(|e| StorageError::io("read note", &file.path, e))?;
    let stats =
        fs::metadata(&file.path).map_err(|e| StorageError::io("stat note", &file.path, e))?;

    let updated = stats
        .modified()
        .map_err(|e| StorageError::io("read modification time of", &file.path, e))?;
    // Not every filesystem records birth time.
    let created = stats.created().unwrap_or(updated);

    Ok(NoteRecord {
        id: file.id.clone(),
        title: title_from_file_segment(&file.title_segment),
        content,
        notebook: file.notebook.clone(),
        created_at: DateTime::<Utc>::from(created),
        updated_at: DateTime::<Utc>::from(updated),
    })
}
