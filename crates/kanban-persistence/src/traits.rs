use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kanban_core::KanbanResult;
use kanban_domain::ColumnId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rows::{
    BoardPatch, BoardRow, ColumnPatch, ColumnRow, NewBoard, NewColumn, NewTask, TaskPatch, TaskRow,
};

/// Metadata written alongside file-backed tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the process that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(format_version: u32, instance_id: Uuid) -> Self {
        Self {
            format_version,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Row-level access to the remote board tables.
///
/// Inserts return the stored row with its generated id and timestamps.
/// Updating or deleting a row that does not exist is a `NotFound` error.
/// Selects return rows ordered by `position`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn find_board_by_owner(&self, owner_id: &str) -> KanbanResult<Option<BoardRow>>;

    async fn insert_board(&self, board: NewBoard) -> KanbanResult<BoardRow>;

    async fn update_board(&self, id: &str, patch: BoardPatch) -> KanbanResult<()>;

    async fn insert_columns(&self, columns: Vec<NewColumn>) -> KanbanResult<Vec<ColumnRow>>;

    async fn update_column(&self, id: &str, patch: ColumnPatch) -> KanbanResult<()>;

    async fn delete_column(&self, id: &str) -> KanbanResult<()>;

    async fn select_columns(&self, board_id: &str) -> KanbanResult<Vec<ColumnRow>>;

    async fn insert_task(&self, task: NewTask) -> KanbanResult<TaskRow>;

    async fn update_task(&self, id: &str, patch: TaskPatch) -> KanbanResult<()>;

    async fn delete_task(&self, id: &str) -> KanbanResult<()>;

    async fn delete_tasks_by_column(&self, column_id: &str) -> KanbanResult<()>;

    async fn select_tasks(&self, column_ids: &[ColumnId]) -> KanbanResult<Vec<TaskRow>>;
}
