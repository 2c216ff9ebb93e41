use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::error::{Result, StorageError};

/// One sidecar value.
///
/// Top-level notebooks are stored as a bare display-name string, which is the
/// historical format. Sub-notebooks are stored as an object so the parent
/// survives a reload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum NotebookEntry {
    Name(String),
    Nested {
        name: String,
        #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
    },
}

impl NotebookEntry {
    pub fn new(name: impl Into<String>, parent_id: Option<String>) -> Self {
        match parent_id.filter(|p| !p.is_empty()) {
            Some(parent_id) => NotebookEntry::Nested {
                name: name.into(),
                parent_id: Some(parent_id),
            },
            None => NotebookEntry::Name(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NotebookEntry::Name(name) => name,
            NotebookEntry::Nested { name, .. } => name,
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        match self {
            NotebookEntry::Name(_) => None,
            NotebookEntry::Nested { parent_id, .. } => parent_id.as_deref(),
        }
    }
}

pub type NotebookMap = BTreeMap<String, NotebookEntry>;

/// Owner of `notebooks.json`.
///
/// All mutations are read-modify-write cycles of the whole file, serialised
/// through one lock. Concurrent writers from other processes are still
/// last-writer-wins.
#[derive(Debug)]
pub struct NotebookMetadata {
    path: PathBuf,
    lock: Mutex<()>,
}

impl NotebookMetadata {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the sidecar, failing on unreadable or malformed content.
    pub fn read(&self) -> Result<NotebookMap> {
        if !self.path.exists() {
            return Ok(NotebookMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::io("read notebook metadata", &self.path, e))?;
        if content.trim().is_empty() {
            return Ok(NotebookMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Reads the sidecar, treating any failure as "no entries".
    ///
    /// The sidecar is advisory: notebooks exist because their folders exist,
    /// and a damaged file only costs display names.
    pub fn load(&self) -> NotebookMap {
        match self.read() {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Ignoring notebook metadata: {}", e);
                NotebookMap::new()
            }
        }
    }

    pub fn get(&self, notebook_id: &str) -> Option<NotebookEntry> {
        self.load().remove(notebook_id)
    }

    /// Inserts or replaces the entry for `notebook_id`.
    pub fn upsert(&self, notebook_id: &str, entry: NotebookEntry) -> Result<()> {
        self.update(|map| {
            map.insert(notebook_id.to_string(), entry);
        })
    }

    /// Removes the given entries; missing ids are ignored.
    pub fn remove(&self, notebook_ids: &[String]) -> Result<()> {
        self.update(|map| {
            for id in notebook_ids {
                map.remove(id);
            }
        })
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut NotebookMap),
    {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut map = self.load();
        f(&mut map);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::io("create storage folder", parent, e))?;
        }
        let content = serde_json::to_string_pretty(&map)?;
        write_atomic(&self.path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn metadata_in(dir: &Path) -> NotebookMetadata {
        NotebookMetadata::new(&dir.join("notebooks.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(metadata_in(dir.path()).load().is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let dir = tempdir().unwrap();
        let metadata = metadata_in(dir.path());
        fs::write(metadata.path(), "{ not json").unwrap();

        assert!(metadata.read().is_err());
        assert!(metadata.load().is_empty());
    }

    #[test]
    fn test_upsert_writes_pretty_json() {
        let dir = tempdir().unwrap();
        let metadata = metadata_in(dir.path());

        metadata
            .upsert("notebook-5", NotebookEntry::new("Work", None))
            .unwrap();

        let content = fs::read_to_string(metadata.path()).unwrap();
        assert_eq!(content, "{\n  \"notebook-5\": \"Work\"\n}");
    }

    #[test]
    fn test_upsert_replaces_display_name() {
        let dir = tempdir().unwrap();
        let metadata = metadata_in(dir.path());

        metadata.upsert("nb", NotebookEntry::new("Old", None)).unwrap();
        metadata.upsert("nb", NotebookEntry::new("New", None)).unwrap();

        assert_eq!(metadata.get("nb").unwrap().name(), "New");
        assert_eq!(metadata.load().len(), 1);
    }

    #[test]
    fn test_nested_entry_round_trip() {
        let dir = tempdir().unwrap();
        let metadata = metadata_in(dir.path());

        metadata
            .upsert("notebook-6", NotebookEntry::new("Drafts", Some("notebook-5".into())))
            .unwrap();

        let content = fs::read_to_string(metadata.path()).unwrap();
        assert!(content.contains("\"parentId\": \"notebook-5\""));

        let entry = metadata.get("notebook-6").unwrap();
        assert_eq!(entry.name(), "Drafts");
        assert_eq!(entry.parent_id(), Some("notebook-5"));
    }

    #[test]
    fn test_reads_plain_string_format() {
        let dir = tempdir().unwrap();
        let metadata = metadata_in(dir.path());
        fs::write(metadata.path(), r#"{"a": "Alpha", "b": {"name": "Beta"}}"#).unwrap();

        let map = metadata.read().unwrap();
        assert_eq!(map["a"], NotebookEntry::Name("Alpha".into()));
        assert_eq!(map["b"].name(), "Beta");
        assert_eq!(map["b"].parent_id(), None);
    }

    #[test]
    fn test_remove_entries() {
        let dir = tempdir().unwrap();
        let metadata = metadata_in(dir.path());
        metadata.upsert("a", NotebookEntry::new("A", None)).unwrap();
        metadata.upsert("b", NotebookEntry::new("B", None)).unwrap();

        metadata.remove(&["a".to_string(), "missing".to_string()]).unwrap();

        let map = metadata.load();
        assert!(!map.contains_key("a"));
        assert!(map.contains_key("b"));
    }

    #[test]
    fn test_empty_parent_is_top_level() {
        let entry = NotebookEntry::new("Work", Some(String::new()));
        assert_eq!(entry, NotebookEntry::Name("Work".into()));
    }
}
