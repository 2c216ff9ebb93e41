use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use crate::atomic::{is_temp_file_name, write_atomic};
use crate::error::{Result, StorageError};
use crate::paths::StoragePaths;
use crate::sanitize::{note_file_name, parse_note_file_name, validate_note_id};

/// A note file found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteFile {
    pub path: PathBuf,
    pub id: String,
    /// Sanitized title segment of the file name.
    pub title_segment: String,
    /// Enclosing folder name for notes inside a notebook.
    pub notebook: Option<String>,
}

/// What a recovery pass cleaned up.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecoveryReport {
    pub removed_temp_files: Vec<PathBuf>,
    pub removed_duplicates: Vec<PathBuf>,
}

impl RecoveryReport {
    pub fn is_empty(&self) -> bool {
        self.removed_temp_files.is_empty() && self.removed_duplicates.is_empty()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Lists every file in the root and one level of notebook folders.
///
/// Root files come first, then each notebook folder's files, all in file
/// name order. Hidden folders are skipped; unreadable folders are logged and
/// skipped.
fn scan_files(root: &Path) -> Vec<DirEntry> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut root_files = Vec::new();
    let mut nested_files = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_hidden(e)));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if entry.depth() == 1 {
                    root_files.push(entry);
                } else {
                    nested_files.push(entry);
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("Skipping unreadable entry under {}: {}", root.display(), e),
        }
    }

    root_files.extend(nested_files);
    root_files
}

fn note_file_from_entry(entry: &DirEntry) -> Option<NoteFile> {
    let file_name = entry.file_name().to_str()?;
    let (title_segment, id) = parse_note_file_name(file_name)?;
    let notebook = if entry.depth() == 2 {
        entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    } else {
        None
    };

    Some(NoteFile {
        path: entry.path().to_path_buf(),
        id: id.to_string(),
        title_segment: title_segment.to_string(),
        notebook,
    })
}

/// Every note file under `root`, in scan order.
pub fn scan_note_files(root: &Path) -> Vec<NoteFile> {
    scan_files(root)
        .iter()
        .filter_map(note_file_from_entry)
        .collect()
}

// Two distinct paths can name one file on case-insensitive filesystems.
fn is_same_file(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        match (fs::metadata(a), fs::metadata(b)) {
            (Ok(x), Ok(y)) => x.dev() == y.dev() && x.ino() == y.ino(),
            _ => false,
        }
    }
    #[cfg(not(unix))]
    {
        a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
    }
}

fn remove_if_present(path: &Path, action: &'static str) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::io(action, path, e)),
    }
}

/// Reads, writes, relocates and deletes individual note files.
///
/// A note's identity is the numeric id embedded in its file name; title and
/// notebook are derived from the file name and its folder.
#[derive(Debug, Clone)]
pub struct NoteStore {
    paths: StoragePaths,
}

impl NoteStore {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Locates the file holding note `id`, searching the root and then each
    /// notebook folder.
    pub fn find_note_file(&self, id: &str) -> Result<Option<PathBuf>> {
        validate_note_id(id)?;
        let found = scan_note_files(self.paths.root_storage_path())
            .into_iter()
            .find(|note| note.id == id)
            .map(|note| note.path);
        log::debug!("Lookup for note {}: {:?}", id, found);
        Ok(found)
    }

    /// Writes a note, moving its file when the title or notebook changed.
    ///
    /// The new content lands atomically at the target path before the old
    /// file is removed, so an interruption can leave a duplicate but never
    /// loses the note. [`NoteStore::recover`] removes such duplicates.
    pub fn save(
        &self,
        id: &str,
        title: &str,
        content: &str,
        notebook_id: Option<&str>,
    ) -> Result<PathBuf> {
        validate_note_id(id)?;
        self.paths.ensure_root()?;

        let existing = self.find_note_file(id)?;

        let folder = self.paths.folder_for(notebook_id)?;
        if !folder.is_dir() {
            fs::create_dir_all(&folder)
                .map_err(|e| StorageError::io("create notebook folder", &folder, e))?;
            log::info!("Created notebook folder {}", folder.display());
        }
        let target = folder.join(note_file_name(title, id));

        write_atomic(&target, content)?;

        match existing {
            Some(old) if old != target => {
                if !is_same_file(&old, &target) {
                    remove_if_present(&old, "remove previous copy of note")?;
                }
                log::info!("Moved note {} to {}", id, target.display());
            }
            Some(_) => log::debug!("Updated note {} in place", id),
            None => log::info!("Created note {} at {}", id, target.display()),
        }

        Ok(target)
    }

    /// Deletes a note file and reports whether one was removed.
    ///
    /// The path is first computed from the caller's title and notebook. If
    /// nothing is there (the caller's title is stale), the note is looked up
    /// by id instead.
    pub fn delete(&self, id: &str, title: &str, notebook_id: Option<&str>) -> Result<bool> {
        validate_note_id(id)?;
        if !self.paths.root_storage_path().is_dir() {
            return Ok(false);
        }

        let expected = self.paths.folder_for(notebook_id)?.join(note_file_name(title, id));
        let target = if expected.is_file() {
            Some(expected)
        } else {
            self.find_note_file(id)?
        };

        match target {
            Some(path) => {
                let removed = remove_if_present(&path, "delete note")?;
                if removed {
                    log::info!("Deleted note {} ({})", id, path.display());
                }
                Ok(removed)
            }
            None => {
                log::debug!("Nothing to delete for note {}", id);
                Ok(false)
            }
        }
    }

    /// Raw read of a note file; `None` when it does not exist.
    pub fn read(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io("read note", path, e)),
        }
    }

    /// Cleans up after interrupted saves.
    ///
    /// Removes leftover temp files and, for every id stored more than once,
    /// keeps the most recently modified copy.
    pub fn recover(&self) -> Result<RecoveryReport> {
        let mut report = RecoveryReport::default();
        let files = scan_files(self.paths.root_storage_path());

        for entry in &files {
            let is_temp = entry.file_name().to_str().map(is_temp_file_name).unwrap_or(false);
            if is_temp && remove_if_present(entry.path(), "remove stale temp file")? {
                log::warn!("Removed stale temp file {}", entry.path().display());
                report.removed_temp_files.push(entry.path().to_path_buf());
            }
        }

        let mut by_id: HashMap<String, Vec<NoteFile>> = HashMap::new();
        for note in files.iter().filter_map(note_file_from_entry) {
            by_id.entry(note.id.clone()).or_default().push(note);
        }

        let mut ids: Vec<_> = by_id.keys().cloned().collect();
        ids.sort();
        for id in ids {
            let copies = &by_id[&id];
            if copies.len() < 2 {
                continue;
            }

            let newest = copies
                .iter()
                .enumerate()
                .max_by_key(|(index, note)| (modified_time(&note.path), std::cmp::Reverse(*index)))
                .map(|(index, _)| index)
                .unwrap_or(0);

            for (index, note) in copies.iter().enumerate() {
                if index != newest && remove_if_present(&note.path, "remove duplicate note")? {
                    log::warn!(
                        "Removed duplicate of note {} at {} (kept {})",
                        id,
                        note.path.display(),
                        copies[newest].path.display()
                    );
                    report.removed_duplicates.push(note.path.clone());
                }
            }
        }

        Ok(report)
    }
}

fn modified_time(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
