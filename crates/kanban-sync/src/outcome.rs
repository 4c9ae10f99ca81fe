use kanban_core::{KanbanError, KanbanResult};

/// Result of a board store mutation.
///
/// Store operations report through this value instead of returning errors;
/// only `Failed` also sets the store's error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The remote write succeeded and the local board was updated.
    Applied,
    /// No board is loaded.
    NotLoaded,
    /// A referenced id is not on the board. Nothing was sent.
    NotFound(String),
    /// Input was rejected before any remote call.
    Invalid(String),
    /// The remote write failed; the local board is unchanged.
    Failed(String),
    /// A drop that does not change anything.
    Ignored,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }

    /// Convert into a `Result` for callers that surface failures as errors.
    /// `Ignored` counts as success.
    pub fn into_result(self) -> KanbanResult<()> {
        match self {
            MutationOutcome::Applied | MutationOutcome::Ignored => Ok(()),
            MutationOutcome::NotLoaded => {
                Err(KanbanError::Internal("board is not loaded".to_string()))
            }
            MutationOutcome::NotFound(what) => Err(KanbanError::NotFound(what)),
            MutationOutcome::Invalid(msg) => Err(KanbanError::Validation(msg)),
            MutationOutcome::Failed(msg) => Err(KanbanError::Remote(msg)),
        }
    }
}
