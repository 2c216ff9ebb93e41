use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, StorageError};

/// A notebook as seen by the UI.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotebookRecord {
    /// Sanitized folder name; also the logical key.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// A note reconstructed from a file on disk.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response envelope for every bridge operation.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebooks: Option<Vec<NotebookRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<NoteRecord>>,
}

impl ApiResult {
    /// Create a successful result
    pub fn success() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Create an error result from a bare message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Create an error result carrying the failure category
    pub fn from_error(err: &StorageError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            ..Default::default()
        }
    }

    /// `{ success: flag }` with no message; used where "nothing to do" is not an error.
    pub fn with_flag(success: bool) -> Self {
        Self {
            success,
            ..Default::default()
        }
    }

    pub fn with_file_path(path: impl Into<String>) -> Self {
        Self {
            success: true,
            file_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_folder_path(path: impl Into<String>) -> Self {
        Self {
            success: true,
            folder_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            success: true,
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_notebooks(notebooks: Vec<NotebookRecord>) -> Self {
        Self {
            success: true,
            notebooks: Some(notebooks),
            ..Default::default()
        }
    }

    pub fn with_notes(notes: Vec<NoteRecord>) -> Self {
        Self {
            success: true,
            notes: Some(notes),
            ..Default::default()
        }
    }
}

/// Application configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Absolute storage root; overrides documents-folder discovery.
    pub storage_dir: Option<String>,
    /// Subfolder of the documents directory holding all notes.
    pub folder_name: String,
    pub create_welcome_note: bool,
    pub recover_on_startup: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: None,
            folder_name: "inkdrop-notes".to_string(),
            create_welcome_note: true,
            recover_on_startup: true,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_api_result_success() {
        let result = ApiResult::success();
        assert!(result.success);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_api_result_error() {
        let result = ApiResult::error("test error");
        assert!(!result.success);
        assert_eq!(result.error, Some("test error".to_string()));
        assert!(result.error_kind.is_none());
    }

    #[test]
    fn test_api_result_from_error_carries_kind() {
        let err = StorageError::io(
            "write note",
            Path::new("/notes/a_1.md"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let result = ApiResult::from_error(&err);
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::PermissionDenied));
        assert!(result.error.unwrap().contains("write note"));
    }

    #[test]
    fn test_api_result_serializes_camel_case_and_skips_empty() {
        let json = serde_json::to_value(ApiResult::with_file_path("/n/a_1.md")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "filePath": "/n/a_1.md" }));

        let json = serde_json::to_value(ApiResult::with_flag(false)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false }));
    }

    #[test]
    fn test_note_record_serialization() {
        let created = DateTime::parse_from_rfc3339("2023-11-14T22:13:20Z")
            .unwrap()
            .with_timezone(&Utc);
        let note = NoteRecord {
            id: "1700000000000".into(),
            title: "My First Note".into(),
            content: "# Hi".into(),
            notebook: None,
            created_at: created,
            updated_at: created,
        };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], "1700000000000");
        assert_eq!(json["createdAt"], "2023-11-14T22:13:20Z");
        assert!(json.get("notebook").is_none());
    }

    #[test]
    fn test_notebook_record_parent_id() {
        let record = NotebookRecord {
            id: "notebook-6".into(),
            name: "Drafts".into(),
            parent_id: Some("notebook-5".into()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["parentId"], "notebook-5");
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.folder_name, "inkdrop-notes");
        assert!(config.storage_dir.is_none());
        assert!(config.create_welcome_note);
        assert!(config.recover_on_startup);
        assert_eq!(config.log_level, "info");
    }
}
