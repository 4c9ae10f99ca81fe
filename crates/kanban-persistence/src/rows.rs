//! Table rows exchanged with the remote store and their conversion into the
//! normalized domain model.

use chrono::{DateTime, Utc};
use kanban_domain::{
    Board, BoardId, Column, ColumnId, ColumnUpdate, FieldUpdate, Priority, Task, TaskDraft,
    TaskId, TaskUpdate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRow {
    pub id: BoardId,
    pub title: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub id: ColumnId,
    pub title: String,
    pub board_id: BoardId,
    pub position: u32,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub column_id: ColumnId,
    pub position: u32,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub category_color: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBoard {
    pub title: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewColumn {
    pub board_id: BoardId,
    pub title: String,
    pub color: String,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub column_id: ColumnId,
    pub position: u32,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub category_color: String,
    pub tags: Vec<String>,
    pub assignee: Option<String>,
}

impl NewTask {
    pub fn from_draft(column_id: impl Into<ColumnId>, position: u32, draft: TaskDraft) -> Self {
        Self {
            column_id: column_id.into(),
            position,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            due_date: draft.due_date,
            category_color: draft.category_color,
            tags: draft.tags,
            assignee: draft.assignee,
        }
    }

    pub fn into_row(self, id: TaskId, now: DateTime<Utc>) -> TaskRow {
        TaskRow {
            id,
            title: self.title,
            description: self.description,
            column_id: self.column_id,
            position: self.position,
            priority: self.priority,
            due_date: self.due_date,
            category_color: self.category_color,
            tags: self.tags,
            assignee: self.assignee,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardPatch {
    pub title: Option<String>,
}

impl BoardPatch {
    pub fn apply_to(self, row: &mut BoardRow, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            row.title = title;
        }
        row.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPatch {
    pub title: Option<String>,
    pub color: Option<String>,
    pub position: Option<u32>,
}

impl ColumnPatch {
    pub fn position(position: u32) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn apply_to(self, row: &mut ColumnRow, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            row.title = title;
        }
        if let Some(color) = self.color {
            row.color = color;
        }
        if let Some(position) = self.position {
            row.position = position;
        }
        row.updated_at = now;
    }
}

impl From<ColumnUpdate> for ColumnPatch {
    fn from(update: ColumnUpdate) -> Self {
        Self {
            title: update.title,
            color: update.color,
            position: None,
        }
    }
}

/// Task row patch. Unlike `TaskUpdate` it can relocate the task, which the
/// board store uses to persist moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: FieldUpdate<String>,
    pub priority: Option<Priority>,
    pub due_date: FieldUpdate<DateTime<Utc>>,
    pub category_color: Option<String>,
    pub tags: Option<Vec<String>>,
    pub assignee: FieldUpdate<String>,
    pub column_id: Option<ColumnId>,
    pub position: Option<u32>,
}

impl TaskPatch {
    pub fn move_to(column_id: impl Into<ColumnId>, position: u32) -> Self {
        Self {
            column_id: Some(column_id.into()),
            position: Some(position),
            ..Default::default()
        }
    }

    /// Renumber a task within the column it already belongs to.
    pub fn position(position: u32) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn apply_to(self, row: &mut TaskRow, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            row.title = title;
        }
        self.description.apply_to(&mut row.description);
        if let Some(priority) = self.priority {
            row.priority = priority;
        }
        self.due_date.apply_to(&mut row.due_date);
        if let Some(color) = self.category_color {
            row.category_color = color;
        }
        if let Some(tags) = self.tags {
            row.tags = tags;
        }
        self.assignee.apply_to(&mut row.assignee);
        if let Some(column_id) = self.column_id {
            row.column_id = column_id;
        }
        if let Some(position) = self.position {
            row.position = position;
        }
        row.updated_at = now;
    }
}

impl From<TaskUpdate> for TaskPatch {
    fn from(update: TaskUpdate) -> Self {
        Self {
            title: update.title,
            description: update.description,
            priority: update.priority,
            due_date: update.due_date,
            category_color: update.category_color,
            tags: update.tags,
            assignee: update.assignee,
            column_id: None,
            position: None,
        }
    }
}

impl From<ColumnRow> for Column {
    fn from(row: ColumnRow) -> Self {
        Column {
            id: row.id,
            title: row.title,
            color: row.color,
            board_id: row.board_id,
            position: row.position,
            task_ids: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            description: row.description,
            column_id: row.column_id,
            position: row.position,
            priority: row.priority,
            due_date: row.due_date,
            category_color: row.category_color,
            tags: row.tags,
            assignee: row.assignee,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Build the normalized board from raw rows.
///
/// Columns and each column's tasks are ordered by stored position (ties keep
/// fetch order) and then renumbered densely from 0. Tasks whose column is not
/// part of the board are dropped.
pub fn assemble_board(board: BoardRow, columns: Vec<ColumnRow>, tasks: Vec<TaskRow>) -> Board {
    let mut columns = columns;
    columns.sort_by_key(|c| c.position);

    let mut grouped: HashMap<ColumnId, Vec<TaskRow>> = columns
        .iter()
        .map(|c| (c.id.clone(), Vec::new()))
        .collect();
    let mut dropped = 0usize;
    for task in tasks {
        match grouped.get_mut(&task.column_id) {
            Some(bucket) => bucket.push(task),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::warn!(
            "Dropped {} task rows that reference columns outside board {}",
            dropped,
            board.id
        );
    }

    let mut assembled = Board {
        id: board.id,
        title: board.title,
        columns: Vec::with_capacity(columns.len()),
        tasks: HashMap::new(),
        created_at: board.created_at,
        updated_at: board.updated_at,
    };

    for (index, row) in columns.into_iter().enumerate() {
        let mut column = Column::from(row);
        column.position = index as u32;

        let mut rows = grouped.remove(&column.id).unwrap_or_default();
        rows.sort_by_key(|t| t.position);
        for (task_index, row) in rows.into_iter().enumerate() {
            let mut task = Task::from(row);
            task.position = task_index as u32;
            column.task_ids.push(task.id.clone());
            assembled.tasks.insert(task.id.clone(), task);
        }

        assembled.columns.push(column);
    }

    assembled
}
