pub mod atomic;
pub mod bridge;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod metadata;
pub mod models;
pub mod notebooks;
pub mod notes;
pub mod paths;
pub mod sanitize;
pub mod welcome;

pub use bridge::{Bridge, FallbackRevealer, FolderRevealer, Request, Storage, SystemRevealer};
pub use error::{ErrorKind, Result, StorageError};
pub use models::{ApiResult, Config, NoteRecord, NotebookRecord};
pub use paths::StoragePaths;

use std::path::PathBuf;

use config::{default_config_path, ConfigManager};

/// Installs the process-wide logger.
///
/// `RUST_LOG` overrides `default_level`. Calling this more than once is a
/// no-op.
pub fn init_logging(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Loads the user's configuration, creating it with defaults on first run.
///
/// Platforms without a config directory get the defaults.
pub fn load_config() -> Result<Config> {
    load_config_at(default_config_path())
}

fn load_config_at(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Ok(ConfigManager::load_or_init(path)?.get()),
        None => Ok(Config::default()),
    }
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;
    use tauri::Manager;

    let loaded = load_config();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(&config.log_level);
    if let Err(e) = loaded {
        log::warn!("Using default configuration: {}", e);
    }
    let paths = StoragePaths::resolve(&config);

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(move |app| {
            let revealer = Arc::new(FallbackRevealer::new(
                Arc::new(commands::OpenerRevealer::new(app.handle().clone())),
                Arc::new(SystemRevealer),
            ));
            let storage = Storage::new(paths, revealer);
            storage.startup(&config)?;
            app.manage(Bridge::new(storage));

            #[cfg(debug_assertions)]
            {
                if let Some(window) = app.get_webview_window("main") {
                    window.open_devtools();
                }
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::save_note_to_file,
            commands::delete_note_file,
            commands::load_notes,
            commands::create_notebook_folder,
            commands::delete_notebook_folder,
            commands::load_notebooks,
            commands::get_storage_path,
            commands::open_storage_folder,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_without_config_dir_uses_defaults() {
        assert_eq!(load_config_at(None).unwrap(), Config::default());
    }

    #[test]
    fn test_load_config_first_run_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inkdrop").join("config.json");

        assert_eq!(load_config_at(Some(path.clone())).unwrap(), Config::default());
        assert!(path.is_file());
    }

    #[test]
    fn test_load_config_reports_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_config_at(Some(path)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging("debug");
        init_logging("info");
        log::info!("logging initialised");
    }
}
