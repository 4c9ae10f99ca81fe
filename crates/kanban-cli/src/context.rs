use kanban_core::{AppConfig, KanbanError, KanbanResult};
use kanban_domain::{Board, Column, Task};
use kanban_persistence::JsonTableStore;
use kanban_sync::{BoardStore, MutationOutcome};
use std::sync::Arc;

/// One CLI invocation's view of the board: a store over the tables file with
/// the owner's board already loaded.
pub struct CliContext {
    store: BoardStore,
}

impl CliContext {
    pub async fn load(file_path: &str, owner_id: &str) -> anyhow::Result<Self> {
        let remote = Arc::new(JsonTableStore::new(file_path));
        let store = BoardStore::new(remote, AppConfig::load());

        store.load_board(owner_id).await;
        if let Some(message) = store.error() {
            anyhow::bail!(message);
        }

        Ok(Self { store })
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn board(&self) -> KanbanResult<Board> {
        self.store
            .board()
            .ok_or_else(|| KanbanError::Internal("board is not loaded".to_string()))
    }

    /// Turn a store outcome into an error the binary can report.
    ///
    /// `Failed` already carries the store's user-facing message, so it is
    /// passed through as plain text rather than wrapped in another error kind.
    pub fn finish(&self, outcome: MutationOutcome) -> anyhow::Result<()> {
        tracing::debug!("Mutation outcome: {:?}", outcome);
        match outcome {
            MutationOutcome::Failed(message) => Err(anyhow::anyhow!(message)),
            other => Ok(other.into_result()?),
        }
    }

    pub fn column(&self, column_id: &str) -> KanbanResult<Column> {
        self.board()?
            .column(column_id)
            .cloned()
            .ok_or_else(|| KanbanError::NotFound(format!("column {}", column_id)))
    }

    pub fn task(&self, task_id: &str) -> KanbanResult<Task> {
        self.board()?
            .task(task_id)
            .cloned()
            .ok_or_else(|| KanbanError::NotFound(format!("task {}", task_id)))
    }

    /// The column appended by the last successful `add_column`.
    pub fn last_column(&self) -> KanbanResult<Column> {
        self.board()?
            .columns
            .last()
            .cloned()
            .ok_or_else(|| KanbanError::Internal("board has no columns".to_string()))
    }

    /// The task at the end of `column_id`, i.e. the one `add_task` just created.
    pub fn last_task_in(&self, column_id: &str) -> KanbanResult<Task> {
        let board = self.board()?;
        board
            .column(column_id)
            .and_then(|column| column.task_ids.last())
            .and_then(|task_id| board.task(task_id))
            .cloned()
            .ok_or_else(|| KanbanError::Internal(format!("column {} has no tasks", column_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::error_message;
    use tempfile::tempdir;

    async fn context() -> (tempfile::TempDir, CliContext) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.json");
        let ctx = CliContext::load(path.to_str().unwrap(), "local")
            .await
            .unwrap();
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_failed_outcome_keeps_store_message() {
        let (_dir, ctx) = context().await;
        let message = "Too many requests. Wait a moment and try again.";

        let err = ctx
            .finish(MutationOutcome::Failed(message.to_string()))
            .unwrap_err();

        assert_eq!(error_message(&err), message);
    }

    #[tokio::test]
    async fn test_other_outcomes_use_error_messages() {
        let (_dir, ctx) = context().await;

        assert!(ctx.finish(MutationOutcome::Applied).is_ok());
        assert!(ctx.finish(MutationOutcome::Ignored).is_ok());
        let err = ctx
            .finish(MutationOutcome::NotFound("task t9".to_string()))
            .unwrap_err();
        assert_eq!(error_message(&err), "Not found: task t9");
        let err = ctx
            .finish(MutationOutcome::Invalid("Task title is required".to_string()))
            .unwrap_err();
        assert_eq!(error_message(&err), "Task title is required");
    }
}
