// File: src/persistence.rs
use crate::core::classifier::ClassifierModel;
use crate::error::DiagnosisError;
use log::{debug, error};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("catalog format error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("{0}")]
    Unavailable(String),
}

impl From<StoreError> for DiagnosisError {
    fn from(err: StoreError) -> Self {
        error!("Backing store failure: {err}");
        DiagnosisError::unavailable(err.to_string())
    }
}

/// Durable home of the classifier between process runs.
pub trait ModelStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<ClassifierModel>, StoreError>;
    fn save(&self, model: &ClassifierModel) -> Result<(), StoreError>;
}

/// Bincode snapshot on disk, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<Option<ClassifierModel>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);
        let model: ClassifierModel = bincode::deserialize_from(reader)?;
        Ok(Some(model))
    }

    fn save(&self, model: &ClassifierModel) -> Result<(), StoreError> {
        let parent_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            bincode::serialize_into(&mut writer, model)?;
            writer.flush()?;
        }

        temp_file
            .persist(&self.path)
            .map_err(|e| StoreError::Io(e.error))?;
        debug!("Classifier snapshot written to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the snapshot in memory. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryModelStore {
    slot: Arc<Mutex<(Option<ClassifierModel>, usize)>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: ClassifierModel) -> Self {
        Self {
            slot: Arc::new(Mutex::new((Some(model), 0))),
        }
    }

    pub fn snapshot(&self) -> Option<ClassifierModel> {
        self.slot.lock().ok().and_then(|slot| slot.0.clone())
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.slot.lock().map(|slot| slot.1).unwrap_or(0)
    }
}

impl ModelStore for MemoryModelStore {
    fn load(&self) -> Result<Option<ClassifierModel>, StoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(slot.0.clone())
    }

    fn save(&self, model: &ClassifierModel) -> Result<(), StoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        slot.0 = Some(model.clone());
        slot.1 += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::DEFAULT_SMOOTHING;

    #[test]
    fn missing_snapshot_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("modelo.bin"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("nested").join("modelo.bin"));
        let model = ClassifierModel::fit(&[("fiebre tos", "gripe")], DEFAULT_SMOOTHING);
        store.save(&model).unwrap();
        assert_eq!(store.load().unwrap(), Some(model));
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modelo.bin");
        fs::write(&path, b"\xff\xff\xff\xff\xff\xff\xff\xff\xff").unwrap();
        let err = FileModelStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Snapshot(_)));
        let mapped: DiagnosisError = err.into();
        assert_eq!(mapped.status_code(), 500);
    }

    #[test]
    fn memory_store_counts_saves() {
        let store = MemoryModelStore::new();
        let model = ClassifierModel::fit(&[("tos", "gripe")], DEFAULT_SMOOTHING);
        store.save(&model).unwrap();
        store.save(&model).unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load().unwrap(), Some(model));
    }
}
