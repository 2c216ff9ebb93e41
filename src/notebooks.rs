use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Result, StorageError};
use crate::metadata::{NotebookEntry, NotebookMap, NotebookMetadata};
use crate::paths::StoragePaths;
use crate::sanitize::sanitize_name;

/// Creates and removes notebook folders and keeps the sidecar in step.
#[derive(Debug, Clone)]
pub struct NotebookStore {
    paths: StoragePaths,
    metadata: Arc<NotebookMetadata>,
}

impl NotebookStore {
    pub fn new(paths: StoragePaths, metadata: Arc<NotebookMetadata>) -> Self {
        Self { paths, metadata }
    }

    /// Creates `<root>/<sanitize(notebook_id)>` and records its display name.
    ///
    /// Creating an existing notebook only updates the sidecar entry.
    pub fn create(
        &self,
        notebook_id: &str,
        display_name: &str,
        parent_id: Option<&str>,
    ) -> Result<PathBuf> {
        self.paths.ensure_root()?;
        let folder = self.paths.notebook_dir(notebook_id)?;
        let key = sanitize_name(notebook_id);

        if folder.is_dir() {
            log::debug!("Notebook folder already exists: {}", folder.display());
        } else {
            fs::create_dir_all(&folder)
                .map_err(|e| StorageError::io("create notebook folder", &folder, e))?;
            log::info!("Created notebook folder {}", folder.display());
        }

        let parent = parent_id.map(sanitize_name);
        self.metadata
            .upsert(&key, NotebookEntry::new(display_name, parent))?;

        Ok(folder)
    }

    /// Removes a notebook folder with everything inside it.
    ///
    /// Sub-notebooks recorded with this notebook as their parent are removed
    /// too. Returns whether the notebook's own folder existed. There is no
    /// recovery: every note inside is gone.
    pub fn delete(&self, notebook_id: &str) -> Result<bool> {
        let key = sanitize_name(notebook_id);
        let folder = self.paths.notebook_dir(notebook_id)?;
        let existed = folder.is_dir();

        let mut doomed = vec![key.clone()];
        doomed.extend(descendants_of(&key, &self.metadata.load()));

        for id in &doomed {
            let Ok(dir) = self.paths.notebook_dir(id) else {
                log::warn!("Skipping invalid notebook id '{}' in metadata", id);
                continue;
            };
            if dir.is_dir() {
                fs::remove_dir_all(&dir)
                    .map_err(|e| StorageError::io("delete notebook folder", &dir, e))?;
                log::info!("Deleted notebook folder {}", dir.display());
            }
        }

        if self.metadata.path().exists() {
            self.metadata.remove(&doomed)?;
        }

        Ok(existed)
    }
}

/// Ids of every notebook nested under `parent`, at any depth.
fn descendants_of(parent: &str, map: &NotebookMap) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut frontier = vec![parent.to_string()];

    while let Some(current) = frontier.pop() {
        for (id, entry) in map {
            if entry.parent_id() == Some(current.as_str())
                && id != parent
                && !found.contains(id)
            {
                found.push(id.clone());
                frontier.push(id.clone());
            }
        }
    }

    found
}
