use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StorageError};
use crate::models::Config;
use crate::sanitize::sanitize_name;

/// Folder names probed under the home directory when the platform does not
/// report a documents directory.
const DOCUMENTS_CANDIDATES: [&str; 3] = ["Documents", "Documentos", "My Documents"];

/// Name of the notebook display-name sidecar at the storage root.
pub const METADATA_FILE_NAME: &str = "notebooks.json";

/// Returns the user's documents directory.
///
/// Uses the platform API first, then the first existing locale-specific
/// candidate under the home directory, and finally `home/Documents` even if
/// it does not exist yet. Never fails.
pub fn documents_dir() -> PathBuf {
    resolve_documents_dir(dirs::document_dir(), dirs::home_dir())
}

fn resolve_documents_dir(platform: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = platform.filter(|dir| dir.is_dir()) {
        return dir;
    }

    let home = home.unwrap_or_else(|| PathBuf::from("."));
    DOCUMENTS_CANDIDATES
        .iter()
        .map(|name| home.join(name))
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| home.join(DOCUMENTS_CANDIDATES[0]))
}

/// Validates a single sanitized path segment so it cannot leave its parent.
///
/// Sanitized names never contain separators, but `.` and `..` survive
/// sanitization unchanged and an empty segment would alias the parent.
/// Dot-prefixed names are rejected too: the scanner skips hidden folders,
/// so notes written there could never be found again.
pub fn validate_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.starts_with('.')
}

/// Layout of the note storage tree.
///
/// ```text
/// <root>/
/// ├── notebooks.json                    # notebook id -> display name
/// ├── <title>_<id>.md                   # notes without a notebook
/// └── <notebook-id>/<title>_<id>.md     # notes inside a notebook
/// ```
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
    metadata_file: PathBuf,
}

impl StoragePaths {
    /// Resolves the storage root from configuration.
    ///
    /// An explicit `storage_dir` wins; otherwise the root is
    /// `<documents>/<folder_name>`.
    pub fn resolve(config: &Config) -> Self {
        let root = match config.storage_dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => documents_dir().join(&config.folder_name),
        };
        Self::new_with_root(&root)
    }

    /// Creates a layout rooted at an explicit directory. Useful for testing.
    pub fn new_with_root(root: &Path) -> Self {
        let root = root.to_path_buf();
        let metadata_file = root.join(METADATA_FILE_NAME);
        Self {
            root,
            metadata_file,
        }
    }

    pub fn root_storage_path(&self) -> &Path {
        &self.root
    }

    pub fn metadata_file(&self) -> &Path {
        &self.metadata_file
    }

    /// Creates the root directory if needed and returns it.
    pub fn ensure_root(&self) -> Result<PathBuf> {
        if !self.root.is_dir() {
            fs::create_dir_all(&self.root)
                .map_err(|e| StorageError::io("create storage folder", &self.root, e))?;
            log::info!("Created storage folder at {}", self.root.display());
        }
        Ok(self.root.clone())
    }

    /// Returns `<root>/<sanitize(notebook_id)>`.
    ///
    /// Ids that would be hidden or collide with the metadata sidecar are
    /// rejected.
    pub fn notebook_dir(&self, notebook_id: &str) -> Result<PathBuf> {
        let segment = sanitize_name(notebook_id);
        if !validate_segment(&segment) || segment.eq_ignore_ascii_case(METADATA_FILE_NAME) {
            return Err(StorageError::InvalidNotebookId(notebook_id.to_string()));
        }
        Ok(self.root.join(segment))
    }

    /// Folder a note belongs in: the root when it has no notebook.
    pub fn folder_for(&self, notebook_id: Option<&str>) -> Result<PathBuf> {
        match notebook_id {
            Some(id) if !id.is_empty() => self.notebook_dir(id),
            _ => Ok(self.root.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_documents_dir_prefers_platform_dir() {
        let temp_dir = tempdir().unwrap();
        let platform = temp_dir.path().join("Docs");
        fs::create_dir(&platform).unwrap();

        let resolved = resolve_documents_dir(Some(platform.clone()), Some(temp_dir.path().into()));
        assert_eq!(resolved, platform);
    }

    #[test]
    fn test_documents_dir_probes_candidates() {
        let home = tempdir().unwrap();
        fs::create_dir(home.path().join("Documentos")).unwrap();

        // Platform dir reported but missing on disk.
        let resolved = resolve_documents_dir(
            Some(home.path().join("missing")),
            Some(home.path().to_path_buf()),
        );
        assert_eq!(resolved, home.path().join("Documentos"));
    }

    #[test]
    fn test_documents_dir_candidate_order() {
        let home = tempdir().unwrap();
        fs::create_dir(home.path().join("My Documents")).unwrap();
        fs::create_dir(home.path().join("Documents")).unwrap();

        let resolved = resolve_documents_dir(None, Some(home.path().to_path_buf()));
        assert_eq!(resolved, home.path().join("Documents"));
    }

    #[test]
    fn test_documents_dir_defaults_when_nothing_exists() {
        let home = tempdir().unwrap();
        let resolved = resolve_documents_dir(None, Some(home.path().to_path_buf()));
        assert_eq!(resolved, home.path().join("Documents"));
        assert!(!resolved.exists());
    }

    #[test]
    fn test_resolve_uses_storage_dir_override() {
        let temp_dir = tempdir().unwrap();
        let config = Config {
            storage_dir: Some(temp_dir.path().to_string_lossy().into_owned()),
            ..Config::default()
        };
        let paths = StoragePaths::resolve(&config);
        assert_eq!(paths.root_storage_path(), temp_dir.path());
        assert_eq!(paths.metadata_file(), temp_dir.path().join("notebooks.json"));
    }

    #[test]
    fn test_resolve_appends_folder_name() {
        let config = Config::default();
        let paths = StoragePaths::resolve(&config);
        assert!(paths.root_storage_path().ends_with("inkdrop-notes"));
    }

    #[test]
    fn test_ensure_root_idempotent() {
        let temp_dir = tempdir().unwrap();
        let paths = StoragePaths::new_with_root(&temp_dir.path().join("a").join("inkdrop-notes"));

        assert!(!paths.root_storage_path().exists());
        let first = paths.ensure_root().unwrap();
        let second = paths.ensure_root().unwrap();

        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn test_ensure_root_fails_when_blocked_by_file() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a folder").unwrap();

        let paths = StoragePaths::new_with_root(&blocker.join("inkdrop-notes"));
        assert!(paths.ensure_root().is_err());
    }

    #[test]
    fn test_notebook_dir_sanitizes() {
        let temp_dir = tempdir().unwrap();
        let paths = StoragePaths::new_with_root(temp_dir.path());

        assert_eq!(
            paths.notebook_dir("My Work/Stuff").unwrap(),
            temp_dir.path().join("My_Work_Stuff")
        );
    }

    #[test]
    fn test_notebook_dir_rejects_traversal() {
        let temp_dir = tempdir().unwrap();
        let paths = StoragePaths::new_with_root(temp_dir.path());

        assert!(paths.notebook_dir("..").is_err());
        assert!(paths.notebook_dir(".").is_err());
        assert!(paths.notebook_dir("").is_err());
        assert!(paths.notebook_dir("../etc").is_err());
        // Separators are sanitized away, so this stays inside the root.
        assert_eq!(
            paths.notebook_dir("a/../b").unwrap(),
            temp_dir.path().join("a_.._b")
        );
    }

    #[test]
    fn test_notebook_dir_rejects_hidden_names() {
        let temp_dir = tempdir().unwrap();
        let paths = StoragePaths::new_with_root(temp_dir.path());

        let err = paths.notebook_dir(".archive").unwrap_err();
        assert!(matches!(err, StorageError::InvalidNotebookId(ref id) if id == ".archive"));
        assert!(paths.notebook_dir(".notebooks.json.tmp").is_err());
        assert!(paths.notebook_dir("archive.").is_ok());
    }

    #[test]
    fn test_notebook_dir_rejects_metadata_file_name() {
        let temp_dir = tempdir().unwrap();
        let paths = StoragePaths::new_with_root(temp_dir.path());

        assert!(paths.notebook_dir("notebooks.json").is_err());
        assert!(paths.notebook_dir("Notebooks.JSON").is_err());
        assert!(paths.notebook_dir("notebooks").is_ok());
    }

    #[test]
    fn test_folder_for() {
        let temp_dir = tempdir().unwrap();
        let paths = StoragePaths::new_with_root(temp_dir.path());

        assert_eq!(paths.folder_for(None).unwrap(), temp_dir.path());
        assert_eq!(paths.folder_for(Some("")).unwrap(), temp_dir.path());
        assert_eq!(
            paths.folder_for(Some("notebook-5")).unwrap(),
            temp_dir.path().join("notebook-5")
        );
    }
}
