//! Board export functionality.

use crate::Board;
use chrono::NaiveDate;
use std::io;
use std::path::Path;

/// Serializes board snapshots for user-initiated downloads.
pub struct BoardExporter;

impl BoardExporter {
    /// Serialize the board to pretty JSON.
    pub fn to_json(board: &Board) -> Result<String, io::Error> {
        serde_json::to_string_pretty(board).map_err(io::Error::other)
    }

    /// Suggested download name, e.g. `kanban-board-2024-05-01.json`.
    pub fn file_name(date: NaiveDate) -> String {
        format!("kanban-board-{}.json", date.format("%Y-%m-%d"))
    }

    pub fn export_to_file(board: &Board, path: &Path) -> io::Result<()> {
        let json = Self::to_json(board)?;
        std::fs::write(path, json)?;
        tracing::info!("Exported board {} to {}", board.id, path.display());
        Ok(())
    }
}
