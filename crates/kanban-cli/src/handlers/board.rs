use crate::cli::BoardAction;
use crate::context::CliContext;
use crate::handlers::export;
use crate::output;
use chrono::Utc;
use kanban_domain::BoardStats;

pub async fn handle(ctx: &CliContext, action: BoardAction) -> anyhow::Result<()> {
    match action {
        BoardAction::Show => {
            output::output_success(ctx.board()?);
        }
        BoardAction::Rename { title } => {
            let outcome = ctx.store().update_board_title(&title).await;
            ctx.finish(outcome)?;
            output::output_success(ctx.board()?);
        }
        BoardAction::Stats => {
            let stats = BoardStats::compute(&ctx.board()?, Utc::now());
            output::output_success(serde_json::json!({
                "columns": stats.columns,
                "total_tasks": stats.total_tasks,
                "completed_tasks": stats.completed_tasks,
                "overdue_tasks": stats.overdue_tasks,
                "completion_ratio": stats.completion_ratio(),
            }));
        }
        BoardAction::Export { output } => export::handle_export(ctx, output)?,
        BoardAction::Import { path } => export::handle_import(&path)?,
    }
    Ok(())
}
