use chrono::{DateTime, Utc};
use kanban_core::KanbanResult;

pub mod board_commands;
pub mod column_commands;
pub mod task_commands;

pub use board_commands::*;
pub use column_commands::*;
pub use task_commands::*;

/// A local board mutation.
///
/// Commands are the only code that edits a loaded `Board`; each one leaves the
/// board's invariants intact or fails without effect (see `Board::apply`).
pub trait Command: Send + Sync {
    fn execute(&self, context: &mut CommandContext) -> KanbanResult<()>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

/// Board being mutated plus the single timestamp stamped on everything the
/// command touches.
pub struct CommandContext<'a> {
    pub board: &'a mut crate::Board,
    pub now: DateTime<Utc>,
}
