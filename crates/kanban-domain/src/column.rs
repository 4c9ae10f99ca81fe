use chrono::{DateTime, Utc};
use kanban_core::KanbanResult;
use serde::{Deserialize, Serialize};

use crate::board::BoardId;
use crate::column_role::ColumnRole;
use crate::task::TaskId;
use crate::validation::{require_color, require_title, MAX_COLUMN_TITLE_LEN};

pub type ColumnId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub color: String,
    pub board_id: BoardId,
    pub position: u32,
    /// Authoritative display order of the column's tasks.
    #[serde(default)]
    pub task_ids: Vec<TaskId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    pub fn new(
        id: impl Into<ColumnId>,
        board_id: impl Into<BoardId>,
        title: impl Into<String>,
        color: impl Into<String>,
        position: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            color: color.into(),
            board_id: board_id.into(),
            position,
            task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn role(&self) -> ColumnRole {
        ColumnRole::classify(&self.title)
    }

    pub fn index_of(&self, task_id: &str) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task_id)
    }

    pub fn update_position(&mut self, position: u32, now: DateTime<Utc>) {
        if self.position != position {
            self.position = position;
            self.updated_at = now;
        }
    }

    pub fn update(&mut self, updates: ColumnUpdate, now: DateTime<Utc>) {
        if let Some(title) = updates.title {
            self.title = title;
        }
        if let Some(color) = updates.color {
            self.color = color;
        }
        self.updated_at = now;
    }
}

/// Editable column fields. Position and task membership are changed only
/// through reorder and move operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnUpdate {
    pub title: Option<String>,
    pub color: Option<String>,
}

impl ColumnUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.color.is_none()
    }

    pub fn validated(self) -> KanbanResult<Self> {
        Ok(Self {
            title: self
                .title
                .map(|t| require_title("Column", &t, MAX_COLUMN_TITLE_LEN))
                .transpose()?,
            color: self.color.map(|c| require_color(&c)).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_merges_only_given_fields() {
        let created = Utc::now();
        let mut column = Column::new("c1", "b1", "Todo", "#D6E8FF", 0, created);
        let later = created + chrono::Duration::seconds(5);

        column.update(
            ColumnUpdate {
                title: Some("Backlog".to_string()),
                color: None,
            },
            later,
        );

        assert_eq!(column.title, "Backlog");
        assert_eq!(column.color, "#D6E8FF");
        assert_eq!(column.updated_at, later);
    }

    #[test]
    fn test_update_position_only_touches_on_change() {
        let created = Utc::now();
        let mut column = Column::new("c1", "b1", "Todo", "#D6E8FF", 2, created);
        let later = created + chrono::Duration::seconds(5);

        column.update_position(2, later);
        assert_eq!(column.updated_at, created);

        column.update_position(0, later);
        assert_eq!(column.position, 0);
        assert_eq!(column.updated_at, later);
    }

    #[test]
    fn test_validated_trims_and_rejects_blank_title() {
        let ok = ColumnUpdate {
            title: Some("  Doing ".to_string()),
            color: None,
        }
        .validated()
        .unwrap();
        assert_eq!(ok.title.as_deref(), Some("Doing"));

        let blank = ColumnUpdate {
            title: Some("   ".to_string()),
            color: None,
        };
        assert!(blank.validated().is_err());
    }
}
