//! Board import validation.

use super::models::ImportSummary;
use kanban_core::{KanbanError, KanbanResult};
use serde_json::Value;

pub struct BoardImporter;

impl BoardImporter {
    /// Accept a file only if it is a JSON object with a string `id`, a string
    /// `title` and a `columns` array.
    // TODO: merge an accepted import into the remote store (replace or append
    // columns and tasks) instead of only validating it.
    pub fn validate(json: &str) -> KanbanResult<ImportSummary> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| KanbanError::Serialization(format!("not valid JSON: {}", e)))?;

        let invalid = || {
            KanbanError::Validation(
                "Invalid file: expected an exported board with id, title and columns".to_string(),
            )
        };

        let board_id = value.get("id").and_then(Value::as_str).ok_or_else(invalid)?;
        let title = value.get("title").and_then(Value::as_str).ok_or_else(invalid)?;
        let columns = value
            .get("columns")
            .and_then(Value::as_array)
            .ok_or_else(invalid)?;
        let tasks = value
            .get("tasks")
            .and_then(Value::as_object)
            .map(|tasks| tasks.len())
            .unwrap_or(0);

        Ok(ImportSummary {
            board_id: board_id.to_string(),
            title: title.to_string(),
            columns: columns.len(),
            tasks,
        })
    }

    pub fn validate_file(path: &std::path::Path) -> KanbanResult<ImportSummary> {
        let content = std::fs::read_to_string(path)?;
        Self::validate(&content)
    }
}
