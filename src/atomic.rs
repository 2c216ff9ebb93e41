use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StorageError};

const TEMP_PREFIX: &str = ".";
const TEMP_SUFFIX: &str = ".tmp";

/// Hidden sibling used while `path` is being written.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}{}", TEMP_PREFIX, file_name, TEMP_SUFFIX))
}

/// True for leftovers of an interrupted [`write_atomic`].
pub fn is_temp_file_name(file_name: &str) -> bool {
    file_name.len() > TEMP_PREFIX.len() + TEMP_SUFFIX.len()
        && file_name.starts_with(TEMP_PREFIX)
        && file_name.ends_with(TEMP_SUFFIX)
}

/// Writes `contents` to a temp sibling and renames it over `path`.
///
/// Readers observe either the previous file or the complete new one. The
/// temp file is removed again if the rename fails.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp = temp_path_for(path);
    fs::write(&temp, contents).map_err(|e| StorageError::io("write", &temp, e))?;

    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(StorageError::io("replace", path, e));
    }
    Ok(())
}
