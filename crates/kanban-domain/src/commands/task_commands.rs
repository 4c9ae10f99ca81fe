use super::{Command, CommandContext};
use crate::{ColumnId, Task, TaskId, TaskUpdate};
use kanban_core::{KanbanError, KanbanResult};

/// Append a persisted task to the end of its column.
pub struct InsertTask {
    pub task: Task,
}

impl Command for InsertTask {
    fn execute(&self, context: &mut CommandContext) -> KanbanResult<()> {
        let board = &mut *context.board;
        if board.tasks.contains_key(&self.task.id) {
            return Err(KanbanError::Internal(format!(
                "task {} already exists",
                self.task.id
            )));
        }
        let column = board
            .column_mut(&self.task.column_id)
            .ok_or_else(|| KanbanError::NotFound(format!("column {}", self.task.column_id)))?;

        let position = column.task_ids.len() as u32;
        column.task_ids.push(self.task.id.clone());
        column.updated_at = context.now;

        let mut task = self.task.clone();
        task.position = position;
        task.updated_at = context.now;
        board.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Insert task '{}'", self.task.title)
    }
}

pub struct UpdateTask {
    pub task_id: TaskId,
    pub updates: TaskUpdate,
}

impl Command for UpdateTask {
    fn execute(&self, context: &mut CommandContext) -> KanbanResult<()> {
        let task = context
            .board
            .tasks
            .get_mut(&self.task_id)
            .ok_or_else(|| KanbanError::NotFound(format!("task {}", self.task_id)))?;
        self.updates.clone().apply_to(task, context.now);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Update task {}", self.task_id)
    }
}

/// Remove a task from the board and from its column's ordering.
pub struct RemoveTask {
    pub task_id: TaskId,
}

impl Command for RemoveTask {
    fn execute(&self, context: &mut CommandContext) -> KanbanResult<()> {
        let board = &mut *context.board;
        let task = board
            .tasks
            .remove(&self.task_id)
            .ok_or_else(|| KanbanError::NotFound(format!("task {}", self.task_id)))?;

        if let Some(column) = board.column_mut(&task.column_id) {
            column.task_ids.retain(|id| id != &self.task_id);
            column.updated_at = context.now;
        }
        board.renumber_tasks(&task.column_id, context.now);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Remove task {}", self.task_id)
    }
}

/// Move a task to `index` in the destination column. When source and
/// destination are the same column this is a reorder: the task is taken out
/// first, so the index refers to the list without it.
pub struct MoveTask {
    pub task_id: TaskId,
    pub source_column_id: ColumnId,
    pub dest_column_id: ColumnId,
    pub index: usize,
}

impl MoveTask {
    /// Insertion index after clamping to the destination list as it will be
    /// once the task has been taken out of its source column.
    pub fn effective_index(&self, board: &crate::Board) -> KanbanResult<usize> {
        let dest = board
            .column(&self.dest_column_id)
            .ok_or_else(|| KanbanError::NotFound(format!("column {}", self.dest_column_id)))?;
        let len = if self.source_column_id == self.dest_column_id {
            dest.task_ids.len().saturating_sub(1)
        } else {
            dest.task_ids.len()
        };
        Ok(self.index.min(len))
    }
}

impl Command for MoveTask {
    fn execute(&self, context: &mut CommandContext) -> KanbanResult<()> {
        let now = context.now;
        let board = &mut *context.board;

        let owner = board
            .tasks
            .get(&self.task_id)
            .map(|task| task.column_id.clone())
            .ok_or_else(|| KanbanError::NotFound(format!("task {}", self.task_id)))?;
        if owner != self.source_column_id {
            return Err(KanbanError::NotFound(format!(
                "task {} in column {}",
                self.task_id, self.source_column_id
            )));
        }
        let index = self.effective_index(board)?;

        let source = board
            .column_mut(&self.source_column_id)
            .ok_or_else(|| KanbanError::NotFound(format!("column {}", self.source_column_id)))?;
        source.task_ids.retain(|id| id != &self.task_id);
        source.updated_at = now;

        let dest = board
            .column_mut(&self.dest_column_id)
            .ok_or_else(|| KanbanError::NotFound(format!("column {}", self.dest_column_id)))?;
        dest.task_ids.insert(index, self.task_id.clone());
        dest.updated_at = now;

        if let Some(task) = board.tasks.get_mut(&self.task_id) {
            task.move_to_column(self.dest_column_id.clone(), index as u32, now);
        }

        board.renumber_tasks(&self.source_column_id, now);
        if self.dest_column_id != self.source_column_id {
            board.renumber_tasks(&self.dest_column_id, now);
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Move task {} from column {} to column {} at {}",
            self.task_id, self.source_column_id, self.dest_column_id, self.index
        )
    }
}
