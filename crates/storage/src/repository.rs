use async_trait::async_trait;
use exam_core::model::{SessionSnapshot, Settings};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which user settings are persisted.
pub const SETTINGS_KEY: &str = "examAppSettings";
/// Key under which the resumable session snapshot is persisted.
pub const SNAPSHOT_KEY: &str = "examAppState";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),
}

//
// ─── KEY-VALUE CONTRACT ────────────────────────────────────────────────────────
//

/// Minimal string key-value store; every persisted record sits on top of it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value for `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn put(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

async fn get_json<T: DeserializeOwned>(
    store: &(impl KeyValueStore + ?Sized),
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

async fn put_json<T: Serialize + Sync>(
    store: &(impl KeyValueStore + ?Sized),
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw =
        serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    store.put(key, raw).await
}

//
// ─── TYPED REPOSITORIES ────────────────────────────────────────────────────────
//

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load persisted settings; `None` on first launch.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn get_settings(&self) -> Result<Option<Settings>, StorageError>;

    /// Persist settings, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or encoding failures.
    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Load the saved session snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn load_snapshot(&self) -> Result<Option<SessionSnapshot>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend or encoding failures.
    async fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_snapshot(&self) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: KeyValueStore> SettingsRepository for T {
    async fn get_settings(&self) -> Result<Option<Settings>, StorageError> {
        get_json(self, SETTINGS_KEY).await
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        put_json(self, SETTINGS_KEY, settings).await
    }
}

#[async_trait]
impl<T: KeyValueStore> SnapshotRepository for T {
    async fn load_snapshot(&self) -> Result<Option<SessionSnapshot>, StorageError> {
        get_json(self, SNAPSHOT_KEY).await
    }

    async fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<(), StorageError> {
        put_json(self, SNAPSHOT_KEY, snapshot).await
    }

    async fn clear_snapshot(&self) -> Result<(), StorageError> {
        self.remove(SNAPSHOT_KEY).await
    }
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory store for testing and ephemeral sessions.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub settings: Arc<dyn SettingsRepository>,
    pub snapshots: Arc<dyn SnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryRepository::new())
    }

    /// Wire every repository to the same key-value store.
    #[must_use]
    pub fn from_store<S: KeyValueStore + Clone + 'static>(store: S) -> Self {
        let settings: Arc<dyn SettingsRepository> = Arc::new(store.clone());
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(store);
        Self {
            settings,
            snapshots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{ChoiceLetter, Question, Theme};

    #[tokio::test]
    async fn settings_round_trip_and_default_to_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_settings().await.unwrap().is_none());

        let settings = Settings {
            theme: Theme::Dark,
            ..Settings::default()
        };
        repo.save_settings(&settings).await.unwrap();
        assert_eq!(repo.get_settings().await.unwrap(), Some(settings));
        assert!(repo.get(SETTINGS_KEY).await.unwrap().unwrap().contains("dark"));
    }

    #[tokio::test]
    async fn snapshot_save_load_clear() {
        let storage = Storage::in_memory();
        let a = ChoiceLetter::from_index(0).unwrap();
        let snapshot = SessionSnapshot {
            exam_questions: vec![Question::new("HPGE".into(), "Q", vec!["x".into()], a)].into(),
            exam_locked: true,
            ..SessionSnapshot::default()
        };

        storage.snapshots.save_snapshot(&snapshot).await.unwrap();
        let loaded = storage.snapshots.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);

        storage.snapshots.clear_snapshot().await.unwrap();
        assert!(storage.snapshots.load_snapshot().await.unwrap().is_none());
        // clearing twice is fine
        storage.snapshots.clear_snapshot().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_value_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.put(SETTINGS_KEY, "{not json".into()).await.unwrap();
        let err = repo.get_settings().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
