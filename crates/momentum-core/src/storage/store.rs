//! Typed load/save wrapper over a string key/value backend.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Persistence keys. Values are JSON documents.
pub mod keys {
    pub const TASKS: &str = "tasks";
    pub const STREAK: &str = "streak";
    pub const LAST_ACTIVE_DATE: &str = "lastActiveDate";
    pub const REWARD_POINTS: &str = "reward_points";
    pub const REWARDS: &str = "rewards";
    pub const PENDING_REWARDS: &str = "pending_rewards";
    pub const UNLOCKED_REWARDS: &str = "unlocked_rewards";
    pub const USAGE: &str = "social_media_usage";
    pub const TODAY_USAGE: &str = "today_social_media_usage";
    pub const USAGE_LIMIT: &str = "social_media_usage_limit";
    pub const USAGE_DATE: &str = "social_media_usage_date";
    pub const USAGE_LIMIT_REACHED: &str = "social_media_limit_reached";
    pub const FOCUS_SESSION: &str = "focus_session";
    pub const REST_SESSION: &str = "rest_session";
}

/// Raw string key/value storage.
pub trait KvBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write all entries or none of them.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), StorageError>;
}

/// Process-local backend, used by tests and as a fallback when the
/// on-disk database cannot be opened.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

/// JSON-typed view over a [`KvBackend`].
pub struct PersistentStore {
    backend: Box<dyn KvBackend>,
}

impl PersistentStore {
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Load and decode a value. Missing keys yield `Ok(None)`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Codec {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Load a value, falling back to `default` when it is missing or
    /// cannot be decoded. Decode failures are logged, not returned.
    pub fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StorageError> {
        match self.load(key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(default),
            Err(StorageError::Codec { key, source }) => {
                tracing::warn!(%key, error = %source, "discarding malformed stored value");
                Ok(default)
            }
            Err(e) => Err(e),
        }
    }

    /// Encode and write a batch of values in one backend call.
    pub fn save_batch(&mut self, batch: &[(&str, serde_json::Value)]) -> Result<(), StorageError> {
        let encoded = batch
            .iter()
            .map(|(key, value)| {
                serde_json::to_string(value)
                    .map(|raw| (*key, raw))
                    .map_err(|source| StorageError::Codec {
                        key: (*key).to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.backend.set_many(&encoded)
    }

    /// Encode and write a single value.
    pub fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value).map_err(|source| StorageError::Codec {
            key: key.to_string(),
            source,
        })?;
        self.save_batch(&[(key, value)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_as_none() {
        let store = PersistentStore::in_memory();
        let value: Option<u32> = store.load(keys::STREAK).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn save_then_load_typed_value() {
        let mut store = PersistentStore::in_memory();
        store.save(keys::REWARD_POINTS, &120u64).unwrap();
        let points: Option<u64> = store.load(keys::REWARD_POINTS).unwrap();
        assert_eq!(points, Some(120));
    }

    #[test]
    fn malformed_value_is_a_codec_error() {
        let mut backend = MemoryBackend::new();
        backend
            .set_many(&[(keys::STREAK, "not json".to_string())])
            .unwrap();
        let store = PersistentStore::new(backend);
        let err = store.load::<u32>(keys::STREAK).unwrap_err();
        assert!(matches!(err, StorageError::Codec { .. }));
        assert_eq!(store.load_or(keys::STREAK, 7u32).unwrap(), 7);
    }
}
