use chrono::{DateTime, Utc};
use kanban_core::{KanbanError, KanbanResult};
use kanban_domain::ColumnId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rows::{
    BoardPatch, BoardRow, ColumnPatch, ColumnRow, NewBoard, NewColumn, NewTask, TaskPatch, TaskRow,
};

/// In-process copy of the three board tables with the row semantics of the
/// remote database: generated ids, foreign keys checked on insert and
/// cascading deletes from columns to tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub boards: Vec<BoardRow>,
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
    #[serde(default)]
    pub tasks: Vec<TaskRow>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Tables {
    /// Oldest board owned by `owner_id`.
    pub fn find_board_by_owner(&self, owner_id: &str) -> Option<BoardRow> {
        self.boards
            .iter()
            .filter(|b| b.user_id == owner_id)
            .min_by_key(|b| b.created_at)
            .cloned()
    }

    pub fn insert_board(&mut self, board: NewBoard, now: DateTime<Utc>) -> BoardRow {
        let row = BoardRow {
            id: new_id(),
            title: board.title,
            user_id: board.user_id,
            created_at: now,
            updated_at: now,
        };
        self.boards.push(row.clone());
        row
    }

    pub fn update_board(
        &mut self,
        id: &str,
        patch: BoardPatch,
        now: DateTime<Utc>,
    ) -> KanbanResult<()> {
        let row = self
            .boards
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| KanbanError::NotFound(format!("board {}", id)))?;
        patch.apply_to(row, now);
        Ok(())
    }

    pub fn insert_columns(
        &mut self,
        columns: Vec<NewColumn>,
        now: DateTime<Utc>,
    ) -> KanbanResult<Vec<ColumnRow>> {
        if let Some(missing) = columns
            .iter()
            .find(|c| !self.boards.iter().any(|b| b.id == c.board_id))
        {
            return Err(KanbanError::NotFound(format!("board {}", missing.board_id)));
        }

        let rows: Vec<ColumnRow> = columns
            .into_iter()
            .map(|c| ColumnRow {
                id: new_id(),
                title: c.title,
                board_id: c.board_id,
                position: c.position,
                color: c.color,
                created_at: now,
                updated_at: now,
            })
            .collect();
        self.columns.extend(rows.iter().cloned());
        Ok(rows)
    }

    pub fn update_column(
        &mut self,
        id: &str,
        patch: ColumnPatch,
        now: DateTime<Utc>,
    ) -> KanbanResult<()> {
        let row = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| KanbanError::NotFound(format!("column {}", id)))?;
        patch.apply_to(row, now);
        Ok(())
    }

    pub fn delete_column(&mut self, id: &str) -> KanbanResult<()> {
        let before = self.columns.len();
        self.columns.retain(|c| c.id != id);
        if self.columns.len() == before {
            return Err(KanbanError::NotFound(format!("column {}", id)));
        }
        self.tasks.retain(|t| t.column_id != id);
        Ok(())
    }

    pub fn select_columns(&self, board_id: &str) -> Vec<ColumnRow> {
        let mut rows: Vec<ColumnRow> = self
            .columns
            .iter()
            .filter(|c| c.board_id == board_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.position);
        rows
    }

    pub fn insert_task(&mut self, task: NewTask, now: DateTime<Utc>) -> KanbanResult<TaskRow> {
        if !self.columns.iter().any(|c| c.id == task.column_id) {
            return Err(KanbanError::NotFound(format!("column {}", task.column_id)));
        }
        let row = task.into_row(new_id(), now);
        self.tasks.push(row.clone());
        Ok(row)
    }

    pub fn update_task(
        &mut self,
        id: &str,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> KanbanResult<()> {
        if let Some(column_id) = &patch.column_id {
            if !self.columns.iter().any(|c| &c.id == column_id) {
                return Err(KanbanError::NotFound(format!("column {}", column_id)));
            }
        }
        let row = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| KanbanError::NotFound(format!("task {}", id)))?;
        patch.apply_to(row, now);
        Ok(())
    }

    pub fn delete_task(&mut self, id: &str) -> KanbanResult<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Err(KanbanError::NotFound(format!("task {}", id)));
        }
        Ok(())
    }

    pub fn delete_tasks_by_column(&mut self, column_id: &str) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.column_id != column_id);
        before - self.tasks.len()
    }

    pub fn select_tasks(&self, column_ids: &[ColumnId]) -> Vec<TaskRow> {
        let mut rows: Vec<TaskRow> = self
            .tasks
            .iter()
            .filter(|t| column_ids.contains(&t.column_id))
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.position);
        rows
    }
}
