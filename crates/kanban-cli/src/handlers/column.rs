use crate::cli::ColumnAction;
use crate::context::CliContext;
use crate::handlers::palette::resolve_color;
use crate::output;
use kanban_domain::ColumnUpdate;

pub async fn handle(ctx: &CliContext, action: ColumnAction) -> anyhow::Result<()> {
    match action {
        ColumnAction::Add { title, color } => {
            let color = color.map(resolve_color);
            let outcome = ctx.store().add_column(&title, color.as_deref()).await;
            ctx.finish(outcome)?;
            output::output_success(ctx.last_column()?);
        }
        ColumnAction::Update { id, title, color } => {
            let updates = ColumnUpdate {
                title,
                color: color.map(resolve_color),
            };
            if updates.is_empty() {
                anyhow::bail!("Nothing to update: pass --title or --color");
            }
            let outcome = ctx.store().update_column(&id, updates).await;
            ctx.finish(outcome)?;
            output::output_success(ctx.column(&id)?);
        }
        ColumnAction::Delete { id } => {
            let outcome = ctx.store().delete_column(&id).await;
            ctx.finish(outcome)?;
            output::output_success(serde_json::json!({"deleted": id}));
        }
        ColumnAction::Reorder { ids } => {
            let outcome = ctx.store().reorder_columns(ids).await;
            ctx.finish(outcome)?;
            output::output_success(ctx.board()?.column_ids());
        }
    }
    Ok(())
}
