use chrono::{DateTime, Utc};
use kanban_core::{KanbanError, KanbanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::column::ColumnId;
use crate::field_update::FieldUpdate;
use crate::palette::DEFAULT_TASK_COLOR;
use crate::validation::{
    normalize_tags, optional_text, require_color, require_title, MAX_DESCRIPTION_LEN,
    MAX_TASK_TITLE_LEN,
};

pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(KanbanError::Validation(format!(
                "Unknown priority '{}', expected low, medium or high",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// Back-reference to the owning column; membership itself lives in
    /// `Column::task_ids`.
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

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        column_id: impl Into<ColumnId>,
        title: impl Into<String>,
        position: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            column_id: column_id.into(),
            position,
            priority: Priority::default(),
            due_date: None,
            category_color: DEFAULT_TASK_COLOR.to_string(),
            tags: Vec::new(),
            assignee: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due < now)
    }

    pub fn update_position(&mut self, position: u32, now: DateTime<Utc>) {
        if self.position != position {
            self.position = position;
            self.updated_at = now;
        }
    }

    pub fn move_to_column(&mut self, column_id: ColumnId, position: u32, now: DateTime<Utc>) {
        self.column_id = column_id;
        self.position = position;
        self.updated_at = now;
    }
}

/// Fields supplied when creating a task. Id, column, position and timestamps
/// are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub category_color: String,
    pub tags: Vec<String>,
    pub assignee: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            due_date: None,
            category_color: DEFAULT_TASK_COLOR.to_string(),
            tags: Vec::new(),
            assignee: None,
        }
    }

    pub fn validated(self) -> KanbanResult<Self> {
        Ok(Self {
            title: require_title("Task", &self.title, MAX_TASK_TITLE_LEN)?,
            description: optional_text(self.description, MAX_DESCRIPTION_LEN)?,
            priority: self.priority,
            due_date: self.due_date,
            category_color: require_color(&self.category_color)?,
            tags: normalize_tags(self.tags)?,
            assignee: optional_text(self.assignee, MAX_TASK_TITLE_LEN)?,
        })
    }
}

/// Editable task fields. Column membership and position are deliberately
/// absent: they change only through `MoveTask`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: FieldUpdate<String>,
    pub priority: Option<Priority>,
    pub due_date: FieldUpdate<DateTime<Utc>>,
    pub category_color: Option<String>,
    pub tags: Option<Vec<String>>,
    pub assignee: FieldUpdate<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && !self.description.is_change()
            && self.priority.is_none()
            && !self.due_date.is_change()
            && self.category_color.is_none()
            && self.tags.is_none()
            && !self.assignee.is_change()
    }

    pub fn validated(self) -> KanbanResult<Self> {
        Ok(Self {
            title: self
                .title
                .map(|t| require_title("Task", &t, MAX_TASK_TITLE_LEN))
                .transpose()?,
            description: self
                .description
                .try_and_then(|d| optional_text(Some(d), MAX_DESCRIPTION_LEN))?,
            priority: self.priority,
            due_date: self.due_date,
            category_color: self
                .category_color
                .map(|c| require_color(&c))
                .transpose()?,
            tags: self.tags.map(normalize_tags).transpose()?,
            assignee: self
                .assignee
                .try_and_then(|a| optional_text(Some(a), MAX_TASK_TITLE_LEN))?,
        })
    }

    pub fn apply_to(self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            task.title = title;
        }
        self.description.apply_to(&mut task.description);
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        self.due_date.apply_to(&mut task.due_date);
        if let Some(color) = self.category_color {
            task.category_color = color;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        self.assignee.apply_to(&mut task.assignee);
        task.updated_at = now;
    }
}
