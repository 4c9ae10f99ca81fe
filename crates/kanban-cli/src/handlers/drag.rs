use crate::context::CliContext;
use crate::output;

pub async fn handle(ctx: &CliContext, active: String, over: Option<String>) -> anyhow::Result<()> {
    let outcome = ctx.store().handle_drag_end(&active, over.as_deref()).await;
    let changed = outcome.is_applied();
    ctx.finish(outcome)?;

    let board = ctx.board()?;
    let columns: Vec<_> = board
        .columns
        .iter()
        .map(|column| {
            serde_json::json!({
                "id": column.id,
                "task_ids": column.task_ids,
            })
        })
        .collect();
    output::output_success(serde_json::json!({
        "changed": changed,
        "columns": columns,
    }));
    Ok(())
}
