use super::{Command, CommandContext};
use crate::{Column, ColumnId, ColumnUpdate};
use kanban_core::{KanbanError, KanbanResult};

/// Append a persisted column to the right end of the board.
pub struct InsertColumn {
    pub column: Column,
}

impl Command for InsertColumn {
    fn execute(&self, context: &mut CommandContext) -> KanbanResult<()> {
        let board = &mut *context.board;
        if board.column(&self.column.id).is_some() {
            return Err(KanbanError::Internal(format!(
                "column {} already exists",
                self.column.id
            )));
        }
        let mut column = self.column.clone();
        column.position = board.columns.len() as u32;
        column.task_ids.clear();
        column.updated_at = context.now;
        board.columns.push(column);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Insert column '{}'", self.column.title)
    }
}

pub struct UpdateColumn {
    pub column_id: ColumnId,
    pub updates: ColumnUpdate,
}

impl Command for UpdateColumn {
    fn execute(&self, context: &mut CommandContext) -> KanbanResult<()> {
        let column = context
            .board
            .column_mut(&self.column_id)
            .ok_or_else(|| KanbanError::NotFound(format!("column {}", self.column_id)))?;
        column.update(self.updates.clone(), context.now);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Update column {}", self.column_id)
    }
}

/// Remove a column together with every task it holds.
pub struct RemoveColumn {
    pub column_id: ColumnId,
}

impl Command for RemoveColumn {
    fn execute(&self, context: &mut CommandContext) -> KanbanResult<()> {
        let board = &mut *context.board;
        let index = board
            .column_index(&self.column_id)
            .ok_or_else(|| KanbanError::NotFound(format!("column {}", self.column_id)))?;

        let column = board.columns.remove(index);
        for task_id in &column.task_ids {
            board.tasks.remove(task_id);
        }
        board.renumber_columns(context.now);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Remove column {}", self.column_id)
    }
}

/// Put columns in the given order. Unknown and repeated ids are skipped;
/// columns missing from the list keep their relative order after the listed
/// ones.
pub struct ReorderColumns {
    pub ordered_ids: Vec<ColumnId>,
}

impl Command for ReorderColumns {
    fn execute(&self, context: &mut CommandContext) -> KanbanResult<()> {
        let board = &mut *context.board;
        let mut remaining = std::mem::take(&mut board.columns);
        let mut ordered = Vec::with_capacity(remaining.len());

        for id in &self.ordered_ids {
            if let Some(index) = remaining.iter().position(|c| &c.id == id) {
                ordered.push(remaining.remove(index));
            }
        }
        ordered.append(&mut remaining);

        board.columns = ordered;
        board.renumber_columns(context.now);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Reorder {} columns", self.ordered_ids.len())
    }
}
