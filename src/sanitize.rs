use crate::error::{Result, StorageError};

/// Fallback file-name segment for notes whose title sanitizes to nothing.
pub const UNTITLED_FILE_SEGMENT: &str = "Untitled_Note";

/// Fallback display title for notes whose file-name segment is blank.
pub const UNTITLED_TITLE: &str = "Untitled Note";

const NOTE_EXTENSION: &str = ".md";

fn is_reserved(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
}

/// Converts an arbitrary title or identifier into a filesystem-safe segment.
///
/// Reserved path characters become `_`, whitespace runs become a single `_`,
/// and runs of underscores collapse to one. The result never contains a path
/// separator, and `sanitize_name(sanitize_name(x)) == sanitize_name(x)`.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if is_reserved(c) || c.is_whitespace() { '_' } else { c };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim().to_string()
}

/// Best-effort inverse of [`sanitize_name`] for display: underscores become
/// spaces. Lossy for names that contained literal underscores.
pub fn desanitize_name(segment: &str) -> String {
    segment.replace('_', " ").trim().to_string()
}

/// Builds `<sanitized-title>_<id>.md`.
pub fn note_file_name(title: &str, id: &str) -> String {
    let safe_title = sanitize_name(title);
    let safe_title = if safe_title.is_empty() {
        UNTITLED_FILE_SEGMENT
    } else {
        safe_title.as_str()
    };
    format!("{}_{}{}", safe_title, id, NOTE_EXTENSION)
}

/// Splits a note file name into its title segment and numeric id.
///
/// Accepts exactly the names matching `^(.+)_([0-9]+)\.md$`. The split is at
/// the last underscore, so a title ending in digits (`Plan_2024_17.md`) still
/// yields the trailing run as the id.
pub fn parse_note_file_name(file_name: &str) -> Option<(&str, &str)> {
    let stem = file_name.strip_suffix(NOTE_EXTENSION)?;
    let (title, id) = stem.rsplit_once('_')?;
    if title.is_empty() || !is_numeric_id(id) {
        return None;
    }
    Some((title, id))
}

/// Recovers a display title from the title segment of a note file name.
pub fn title_from_file_segment(segment: &str) -> String {
    let title = desanitize_name(segment);
    if title.is_empty() {
        UNTITLED_TITLE.to_string()
    } else {
        title
    }
}

fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Rejects note ids that would not survive the file-name round trip.
///
/// Ids are embedded verbatim in file names, so anything other than ASCII
/// digits could either escape the storage root or never be found again.
pub fn validate_note_id(id: &str) -> Result<()> {
    if is_numeric_id(id) {
        Ok(())
    } else {
        Err(StorageError::InvalidNoteId(id.to_string()))
    }
}
