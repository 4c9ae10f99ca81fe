//! Durable client-local preferences.
//!
//! A small key/value JSON file kept next to the board tables. The daily
//! reminder collaborator reads two fixed keys from it.

use chrono::NaiveDate;
use kanban_core::{KanbanError, KanbanResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::store::AtomicWriter;

pub const NOTIFICATION_PERMISSION_KEY: &str = "notification-permission";
pub const LAST_DAILY_NOTIFICATION_KEY: &str = "lastDailyNotification";

#[derive(Debug, Clone)]
pub struct LocalPrefs {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl LocalPrefs {
    /// Open the preferences file; a missing file yields empty preferences.
    pub async fn load(path: impl AsRef<Path>) -> KanbanResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match AtomicWriter::read_optional(&path).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| KanbanError::Serialization(e.to_string()))?,
            None => BTreeMap::new(),
        };
        Ok(Self { path, values })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub async fn set(&mut self, key: &str, value: Value) -> KanbanResult<()> {
        self.values.insert(key.to_string(), value);
        self.save().await
    }

    pub async fn remove(&mut self, key: &str) -> KanbanResult<()> {
        if self.values.remove(key).is_some() {
            self.save().await?;
        }
        Ok(())
    }

    pub fn notification_permission(&self) -> Option<&str> {
        self.get(NOTIFICATION_PERMISSION_KEY).and_then(Value::as_str)
    }

    pub async fn set_notification_permission(&mut self, permission: &str) -> KanbanResult<()> {
        self.set(NOTIFICATION_PERMISSION_KEY, Value::from(permission))
            .await
    }

    /// Day the daily summary was last shown. Unparseable values read as unset.
    pub fn last_daily_notification(&self) -> Option<NaiveDate> {
        self.get(LAST_DAILY_NOTIFICATION_KEY)
            .and_then(Value::as_str)
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
    }

    pub async fn set_last_daily_notification(&mut self, date: NaiveDate) -> KanbanResult<()> {
        self.set(
            LAST_DAILY_NOTIFICATION_KEY,
            Value::from(date.format("%Y-%m-%d").to_string()),
        )
        .await
    }

    async fn save(&self) -> KanbanResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.values)
            .map_err(|e| KanbanError::Serialization(e.to_string()))?;
        AtomicWriter::write_atomic(&self.path, &bytes).await
    }
}
