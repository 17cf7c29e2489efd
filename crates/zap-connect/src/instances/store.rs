use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use zap_common::{InstanceId, PlatformError};
use zap_config::schema::StorageConfig;

const APP_NAME: &str = "zap";
const SELECTION_FILE: &str = "selection.json";

/// Persists which instance was selected last.
pub trait SelectionStore: Send + Sync {
    fn last_selected(&self) -> Option<InstanceId>;
    fn remember(&self, id: &InstanceId) -> Result<(), PlatformError>;
}

/// In-process store. Nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    selected: Mutex<Option<InstanceId>>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(id: impl Into<InstanceId>) -> Self {
        Self {
            selected: Mutex::new(Some(id.into())),
        }
    }
}

impl SelectionStore for MemorySelectionStore {
    fn last_selected(&self) -> Option<InstanceId> {
        self.selected.lock().ok().and_then(|guard| guard.clone())
    }

    fn remember(&self, id: &InstanceId) -> Result<(), PlatformError> {
        let mut guard = self
            .selected
            .lock()
            .map_err(|e| PlatformError::StorageError(e.to_string()))?;
        *guard = Some(id.clone());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SelectionFile {
    #[serde(default)]
    last_selected: Option<InstanceId>,
}

/// JSON file store, by default `<data_dir>/zap/selection.json`.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured override, or the platform data directory.
    pub fn from_config(config: &StorageConfig) -> Result<Self, PlatformError> {
        match &config.selection_file {
            Some(path) => Ok(Self::new(path)),
            None => Ok(Self::new(default_selection_path()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Option<SelectionFile> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read selection file");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt selection file");
                None
            }
        }
    }
}

impl SelectionStore for FileSelectionStore {
    fn last_selected(&self) -> Option<InstanceId> {
        self.read().and_then(|file| file.last_selected)
    }

    fn remember(&self, id: &InstanceId) -> Result<(), PlatformError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PlatformError::PathError(e.to_string()))?;
        }
        let file = SelectionFile {
            last_selected: Some(id.clone()),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| PlatformError::StorageError(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| PlatformError::StorageError(e.to_string()))?;
        tracing::debug!(path = %self.path.display(), instance = %id, "selection saved");
        Ok(())
    }
}

fn default_selection_path() -> Result<PathBuf, PlatformError> {
    dirs::data_dir()
        .map(|d| d.join(APP_NAME).join(SELECTION_FILE))
        .ok_or_else(|| PlatformError::PathError("could not determine data directory".into()))
}
