use crate::context::CliContext;
use crate::output;
use chrono::Utc;
use kanban_domain::{BoardExporter, BoardImporter};
use std::path::{Path, PathBuf};

pub fn handle_export(ctx: &CliContext, destination: Option<PathBuf>) -> anyhow::Result<()> {
    let board = ctx.board()?;
    let path = destination
        .unwrap_or_else(|| PathBuf::from(BoardExporter::file_name(Utc::now().date_naive())));

    BoardExporter::export_to_file(&board, &path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    output::output_success(serde_json::json!({
        "board_id": board.id,
        "path": path.display().to_string(),
    }));
    Ok(())
}

/// Validate an export file. Accepted files are reported, not merged.
pub fn handle_import(path: &Path) -> anyhow::Result<()> {
    let summary = BoardImporter::validate_file(path)?;
    output::output_success(&summary);
    Ok(())
}
