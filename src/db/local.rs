// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local key/value store used in mock mode.
//!
//! Values are kept as JSON text keyed by [`EntityKey::local_key`]. When the
//! store is opened with a path, the whole map is written back to that file
//! on every change so it survives restarts. A change that cannot be written
//! is not applied.

use crate::db::EntityKey;
use crate::error::AppError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Local persistent key/value store.
#[derive(Clone)]
pub struct LocalStore {
    entries: Arc<DashMap<String, String>>,
    path: Option<Arc<PathBuf>>,
    /// Serializes writers so each change lands on the latest snapshot
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            path: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open (or start) a file-backed store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let entries = DashMap::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let stored: BTreeMap<String, String> = serde_json::from_str(&contents)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Corrupt local store {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                for (key, value) in stored {
                    entries.insert(key, value);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to read local store {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            count = entries.len(),
            "Opened local store"
        );

        Ok(Self {
            entries: Arc::new(entries),
            path: Some(Arc::new(path)),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Read and decode a value. Missing keys are `Ok(None)`.
    pub async fn get<T: DeserializeOwned>(&self, key: &EntityKey<'_>) -> Result<Option<T>, AppError> {
        let key = key.local_key();
        let Some(raw) = self.entries.get(&key).map(|v| v.value().clone()) else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AppError::Database(format!("Corrupt local entry {}: {}", key, e)))
    }

    /// Replace a value.
    pub async fn put<T: Serialize>(&self, key: &EntityKey<'_>, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize failed: {}", e)))?;

        let _guard = self.write_lock.lock().await;
        self.commit(key.local_key(), Some(raw)).await
    }

    /// Overlay the present fields of `value` onto the stored object.
    pub async fn merge<T: Serialize>(&self, key: &EntityKey<'_>, value: &T) -> Result<(), AppError> {
        let update = serde_json::to_value(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize failed: {}", e)))?;
        let key = key.local_key();

        let _guard = self.write_lock.lock().await;
        let existing = self.entries.get(&key).map(|v| v.value().clone());
        let existing = existing
            .map(|raw| serde_json::from_str::<Value>(&raw))
            .transpose()
            .map_err(|e| AppError::Database(format!("Corrupt local entry {}: {}", key, e)))?;

        let merged = merge_objects(existing, update);
        self.commit(key, Some(merged.to_string())).await
    }

    pub async fn remove(&self, key: &EntityKey<'_>) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.commit(key.local_key(), None).await
    }

    /// Apply one change. The caller holds `write_lock`.
    ///
    /// File-backed stores write the changed snapshot first; the in-memory map
    /// only sees the change once it is on disk.
    async fn commit(&self, key: String, value: Option<String>) -> Result<(), AppError> {
        if let Some(path) = &self.path {
            let mut snapshot: BTreeMap<String, String> = self
                .entries
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect();
            match &value {
                Some(raw) => snapshot.insert(key.clone(), raw.clone()),
                None => snapshot.remove(&key),
            };
            write_snapshot(path, &snapshot).await?;
        }

        match value {
            Some(raw) => {
                self.entries.insert(key, raw);
            }
            None => {
                self.entries.remove(&key);
            }
        }
        Ok(())
    }
}

/// Atomically replace the backing file with `snapshot`.
async fn write_snapshot(path: &Path, snapshot: &BTreeMap<String, String>) -> Result<(), AppError> {
    let contents = serde_json::to_string_pretty(snapshot)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize failed: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create store dir: {}", e)))?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| AppError::Database(format!("Failed to write local store: {}", e)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| AppError::Database(format!("Failed to replace local store: {}", e)))?;

    Ok(())
}

/// Shallow merge: non-null top-level fields of `update` win.
fn merge_objects(existing: Option<Value>, update: Value) -> Value {
    match (existing, update) {
        (Some(Value::Object(mut base)), Value::Object(fields)) => {
            for (name, value) in fields {
                if !value.is_null() {
                    base.insert(name, value);
                }
            }
            Value::Object(base)
        }
        (_, update) => update,
    }
}
