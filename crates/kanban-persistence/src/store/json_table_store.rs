use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kanban_core::{KanbanError, KanbanResult};
use kanban_domain::ColumnId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::atomic_writer::AtomicWriter;
use super::tables::Tables;
use crate::rows::{
    BoardPatch, BoardRow, ColumnPatch, ColumnRow, NewBoard, NewColumn, NewTask, TaskPatch, TaskRow,
};
use crate::traits::{PersistenceMetadata, RemoteStore};

const FORMAT_VERSION: u32 = 1;

/// Remote store backed by a single JSON file.
///
/// The tables are read lazily on first use and rewritten atomically after
/// every successful write, so a failed write leaves both the file and the
/// cached tables untouched.
#[derive(Debug)]
pub struct JsonTableStore {
    path: PathBuf,
    instance_id: Uuid,
    tables: Mutex<Option<Tables>>,
}

/// On-disk layout of the tables file
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: Tables,
}

impl JsonTableStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id: Uuid::new_v4(),
            tables: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    async fn load_tables(&self) -> KanbanResult<Tables> {
        let Some(bytes) = AtomicWriter::read_optional(&self.path).await? else {
            tracing::info!("No tables file at {}, starting empty", self.path.display());
            return Ok(Tables::default());
        };

        let envelope: JsonEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| KanbanError::Serialization(e.to_string()))?;
        if envelope.version != FORMAT_VERSION {
            return Err(KanbanError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }

        tracing::info!(
            "Loaded {} boards, {} columns and {} tasks from {}",
            envelope.data.boards.len(),
            envelope.data.columns.len(),
            envelope.data.tasks.len(),
            self.path.display()
        );
        Ok(envelope.data)
    }

    async fn save_tables(&self, tables: &Tables) -> KanbanResult<()> {
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(FORMAT_VERSION, self.instance_id),
            data: tables.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| KanbanError::Serialization(e.to_string()))?;
        AtomicWriter::write_atomic(&self.path, &bytes).await
    }

    async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> KanbanResult<T> {
        let mut guard = self.tables.lock().await;
        if guard.is_none() {
            *guard = Some(self.load_tables().await?);
        }
        let tables = guard.get_or_insert_with(Tables::default);
        Ok(f(tables))
    }

    async fn write<T>(
        &self,
        f: impl FnOnce(&mut Tables, DateTime<Utc>) -> KanbanResult<T>,
    ) -> KanbanResult<T> {
        let mut guard = self.tables.lock().await;
        let mut next = match guard.as_ref() {
            Some(tables) => tables.clone(),
            None => self.load_tables().await?,
        };
        let result = f(&mut next, Utc::now())?;
        self.save_tables(&next).await?;
        *guard = Some(next);
        Ok(result)
    }
}

#[async_trait]
impl RemoteStore for JsonTableStore {
    async fn find_board_by_owner(&self, owner_id: &str) -> KanbanResult<Option<BoardRow>> {
        self.read(|t| t.find_board_by_owner(owner_id)).await
    }

    async fn insert_board(&self, board: NewBoard) -> KanbanResult<BoardRow> {
        self.write(|t, now| Ok(t.insert_board(board, now))).await
    }

    async fn update_board(&self, id: &str, patch: BoardPatch) -> KanbanResult<()> {
        self.write(|t, now| t.update_board(id, patch, now)).await
    }

    async fn insert_columns(&self, columns: Vec<NewColumn>) -> KanbanResult<Vec<ColumnRow>> {
        self.write(|t, now| t.insert_columns(columns, now)).await
    }

    async fn update_column(&self, id: &str, patch: ColumnPatch) -> KanbanResult<()> {
        self.write(|t, now| t.update_column(id, patch, now)).await
    }

    async fn delete_column(&self, id: &str) -> KanbanResult<()> {
        self.write(|t, _| t.delete_column(id)).await
    }

    async fn select_columns(&self, board_id: &str) -> KanbanResult<Vec<ColumnRow>> {
        self.read(|t| t.select_columns(board_id)).await
    }

    async fn insert_task(&self, task: NewTask) -> KanbanResult<TaskRow> {
        self.write(|t, now| t.insert_task(task, now)).await
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> KanbanResult<()> {
        self.write(|t, now| t.update_task(id, patch, now)).await
    }

    async fn delete_task(&self, id: &str) -> KanbanResult<()> {
        self.write(|t, _| t.delete_task(id)).await
    }

    async fn delete_tasks_by_column(&self, column_id: &str) -> KanbanResult<()> {
        self.write(|t, _| {
            let removed = t.delete_tasks_by_column(column_id);
            tracing::debug!("Deleted {} tasks of column {}", removed, column_id);
            Ok(())
        })
        .await
    }

    async fn select_tasks(&self, column_ids: &[ColumnId]) -> KanbanResult<Vec<TaskRow>> {
        self.read(|t| t.select_tasks(column_ids)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn seed(store: &JsonTableStore) -> (BoardRow, ColumnRow) {
        let board = store
            .insert_board(NewBoard {
                title: "Persisted".to_string(),
                user_id: "u1".to_string(),
            })
            .await
            .unwrap();
        let column = store
            .insert_columns(vec![NewColumn {
                board_id: board.id.clone(),
                title: "Todo".to_string(),
                color: "#D6E8FF".to_string(),
                position: 0,
            }])
            .await
            .unwrap()
            .remove(0);
        (board, column)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonTableStore::new(dir.path().join("kanban.json"));

        assert!(store.find_board_by_owner("u1").await.unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kanban.json");

        let (board, column) = {
            let store = JsonTableStore::new(&path);
            seed(&store).await
        };

        let reopened = JsonTableStore::new(&path);
        assert_eq!(
            reopened.find_board_by_owner("u1").await.unwrap(),
            Some(board.clone())
        );
        assert_eq!(reopened.select_columns(&board.id).await.unwrap(), vec![column]);
    }

    #[tokio::test]
    async fn test_file_uses_versioned_envelope() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kanban.json");
        let store = JsonTableStore::new(&path);
        seed(&store).await;

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(
            raw["metadata"]["instance_id"],
            store.instance_id().to_string()
        );
        assert_eq!(raw["data"]["boards"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kanban.json");
        let store = JsonTableStore::new(&path);
        seed(&store).await;
        let before = std::fs::read(&path).unwrap();

        let err = store.delete_task("ghost").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_rejects_unknown_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kanban.json");
        std::fs::write(
            &path,
            r#"{"version": 9, "metadata": {"format_version": 9, "instance_id": "00000000-0000-0000-0000-000000000000", "saved_at": "2024-01-01T00:00:00Z"}, "data": {}}"#,
        )
        .unwrap();

        let store = JsonTableStore::new(&path);
        assert!(matches!(
            store.find_board_by_owner("u1").await,
            Err(KanbanError::Serialization(_))
        ));
    }
}
