use async_trait::async_trait;
use chrono::Utc;
use kanban_core::KanbanResult;
use kanban_domain::ColumnId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::tables::Tables;
use crate::rows::{
    BoardPatch, BoardRow, ColumnPatch, ColumnRow, NewBoard, NewColumn, NewTask, TaskPatch, TaskRow,
};
use crate::traits::RemoteStore;

/// Remote store held entirely in memory.
///
/// An optional latency is awaited before every call, which lets tests keep a
/// request in flight while a second caller arrives.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    latency: Option<Duration>,
    board_fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: Mutex::new(tables),
            ..Self::default()
        }
    }

    /// Number of `find_board_by_owner` calls served so far.
    pub fn board_fetches(&self) -> usize {
        self.board_fetches.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Tables {
        self.tables.lock().clone()
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn find_board_by_owner(&self, owner_id: &str) -> KanbanResult<Option<BoardRow>> {
        self.board_fetches.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self.tables.lock().find_board_by_owner(owner_id))
    }

    async fn insert_board(&self, board: NewBoard) -> KanbanResult<BoardRow> {
        self.pause().await;
        Ok(self.tables.lock().insert_board(board, Utc::now()))
    }

    async fn update_board(&self, id: &str, patch: BoardPatch) -> KanbanResult<()> {
        self.pause().await;
        self.tables.lock().update_board(id, patch, Utc::now())
    }

    async fn insert_columns(&self, columns: Vec<NewColumn>) -> KanbanResult<Vec<ColumnRow>> {
        self.pause().await;
        self.tables.lock().insert_columns(columns, Utc::now())
    }

    async fn update_column(&self, id: &str, patch: ColumnPatch) -> KanbanResult<()> {
        self.pause().await;
        self.tables.lock().update_column(id, patch, Utc::now())
    }

    async fn delete_column(&self, id: &str) -> KanbanResult<()> {
        self.pause().await;
        self.tables.lock().delete_column(id)
    }

    async fn select_columns(&self, board_id: &str) -> KanbanResult<Vec<ColumnRow>> {
        self.pause().await;
        Ok(self.tables.lock().select_columns(board_id))
    }

    async fn insert_task(&self, task: NewTask) -> KanbanResult<TaskRow> {
        self.pause().await;
        self.tables.lock().insert_task(task, Utc::now())
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> KanbanResult<()> {
        self.pause().await;
        self.tables.lock().update_task(id, patch, Utc::now())
    }

    async fn delete_task(&self, id: &str) -> KanbanResult<()> {
        self.pause().await;
        self.tables.lock().delete_task(id)
    }

    async fn delete_tasks_by_column(&self, column_id: &str) -> KanbanResult<()> {
        self.pause().await;
        self.tables.lock().delete_tasks_by_column(column_id);
        Ok(())
    }

    async fn select_tasks(&self, column_ids: &[ColumnId]) -> KanbanResult<Vec<TaskRow>> {
        self.pause().await;
        Ok(self.tables.lock().select_tasks(column_ids))
    }
}
