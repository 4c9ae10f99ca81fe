use chrono::{DateTime, Utc};
use kanban_core::{KanbanError, KanbanResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::column::{Column, ColumnId};
use crate::commands::{Command, CommandContext};
use crate::task::{Task, TaskId};

pub type BoardId = String;

/// A board in normalized form: columns in display order, each listing its
/// task ids in order, and a flat map holding the tasks themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub columns: Vec<Column>,
    pub tasks: HashMap<TaskId, Task>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn new(id: impl Into<BoardId>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            columns: Vec::new(),
            tasks: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    /// The column whose ordered task list contains `task_id`.
    pub fn column_containing(&self, task_id: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.task_ids.iter().any(|id| id == task_id))
    }

    /// Tasks of a column in display order.
    pub fn tasks_in(&self, column_id: &str) -> Vec<&Task> {
        self.column(column_id)
            .map(|column| {
                column
                    .task_ids
                    .iter()
                    .filter_map(|id| self.tasks.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    /// Execute a command against a copy of the board and keep the copy only
    /// if the command succeeds, so a rejected command leaves no partial edits.
    pub fn apply(&mut self, command: &dyn Command, now: DateTime<Utc>) -> KanbanResult<()> {
        let mut next = self.clone();
        {
            let mut context = CommandContext {
                board: &mut next,
                now,
            };
            command.execute(&mut context)?;
        }
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Rewrite column positions to match array order.
    pub(crate) fn renumber_columns(&mut self, now: DateTime<Utc>) {
        for (index, column) in self.columns.iter_mut().enumerate() {
            column.update_position(index as u32, now);
        }
    }

    /// Rewrite task positions of one column to match its `task_ids` order.
    pub(crate) fn renumber_tasks(&mut self, column_id: &str, now: DateTime<Utc>) {
        let Some(column) = self.columns.iter().find(|c| c.id == column_id) else {
            return;
        };
        for (index, task_id) in column.task_ids.iter().enumerate() {
            if let Some(task) = self.tasks.get_mut(task_id) {
                task.update_position(index as u32, now);
            }
        }
    }

    /// Verify the structural invariants of the normalized model.
    ///
    /// Checks that columns are densely numbered, that every listed task id
    /// exists and points back at its column with a matching position, that no
    /// id is listed twice and that no task is left unlisted.
    pub fn check_invariants(&self) -> KanbanResult<()> {
        let mut listed: HashSet<&str> = HashSet::new();

        for (index, column) in self.columns.iter().enumerate() {
            if column.position as usize != index {
                return Err(KanbanError::Internal(format!(
                    "column {} has position {} at index {}",
                    column.id, column.position, index
                )));
            }

            for (task_index, task_id) in column.task_ids.iter().enumerate() {
                let task = self.tasks.get(task_id).ok_or_else(|| {
                    KanbanError::Internal(format!(
                        "column {} lists unknown task {}",
                        column.id, task_id
                    ))
                })?;
                if task.column_id != column.id {
                    return Err(KanbanError::Internal(format!(
                        "task {} is listed in {} but points at {}",
                        task_id, column.id, task.column_id
                    )));
                }
                if task.position as usize != task_index {
                    return Err(KanbanError::Internal(format!(
                        "task {} has position {} at index {}",
                        task_id, task.position, task_index
                    )));
                }
                if !listed.insert(task_id.as_str()) {
                    return Err(KanbanError::Internal(format!(
                        "task {} is listed more than once",
                        task_id
                    )));
                }
            }
        }

        if let Some(orphan) = self.tasks.keys().find(|id| !listed.contains(id.as_str())) {
            return Err(KanbanError::Internal(format!(
                "task {} is not listed in any column",
                orphan
            )));
        }

        Ok(())
    }
}
