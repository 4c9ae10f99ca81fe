use crate::cli::{TaskAction, TaskAddArgs, TaskUpdateArgs};
use crate::context::CliContext;
use crate::handlers::palette::resolve_color;
use crate::output;
use chrono::{DateTime, NaiveDate, Utc};
use kanban_domain::{FieldUpdate, Priority, TaskDraft, TaskUpdate};

pub async fn handle(ctx: &CliContext, action: TaskAction) -> anyhow::Result<()> {
    match action {
        TaskAction::Add(args) => {
            let column_id = args.column_id.clone();
            let draft = build_draft(args)?;
            let outcome = ctx.store().add_task(&column_id, draft).await;
            ctx.finish(outcome)?;
            output::output_success(ctx.last_task_in(&column_id)?);
        }
        TaskAction::Update(args) => {
            let id = args.id.clone();
            let updates = build_update(args)?;
            if updates.is_empty() {
                anyhow::bail!("Nothing to update");
            }
            let outcome = ctx.store().update_task(&id, updates).await;
            ctx.finish(outcome)?;
            output::output_success(ctx.task(&id)?);
        }
        TaskAction::Delete { id } => {
            let outcome = ctx.store().delete_task(&id).await;
            ctx.finish(outcome)?;
            output::output_success(serde_json::json!({"deleted": id}));
        }
        TaskAction::Move {
            id,
            from,
            to,
            index,
        } => {
            let outcome = ctx.store().move_task(&id, &from, &to, index).await;
            ctx.finish(outcome)?;
            output::output_success(ctx.task(&id)?);
        }
    }
    Ok(())
}

fn build_draft(args: TaskAddArgs) -> anyhow::Result<TaskDraft> {
    let mut draft = TaskDraft::new(args.title);
    draft.description = args.description;
    if let Some(priority) = args.priority {
        draft.priority = priority.parse::<Priority>()?;
    }
    draft.due_date = args.due_date.as_deref().map(parse_due_date).transpose()?;
    if let Some(color) = args.color {
        draft.category_color = resolve_color(color);
    }
    draft.tags = args.tags;
    draft.assignee = args.assignee;
    Ok(draft)
}

fn build_update(args: TaskUpdateArgs) -> anyhow::Result<TaskUpdate> {
    let due_date = match args.due_date.as_deref() {
        Some(raw) => FieldUpdate::Set(parse_due_date(raw)?),
        None if args.clear_due_date => FieldUpdate::Clear,
        None => FieldUpdate::NoChange,
    };

    Ok(TaskUpdate {
        title: args.title,
        description: text_update(args.description, args.clear_description),
        priority: args
            .priority
            .map(|p| p.parse::<Priority>())
            .transpose()?,
        due_date,
        category_color: args.color.map(resolve_color),
        tags: args.tags,
        assignee: text_update(args.assignee, args.clear_assignee),
    })
}

fn text_update(value: Option<String>, clear: bool) -> FieldUpdate<String> {
    match value {
        Some(value) => FieldUpdate::Set(value),
        None if clear => FieldUpdate::Clear,
        None => FieldUpdate::NoChange,
    }
}

/// Accept a calendar date (midnight UTC) or a full RFC 3339 timestamp.
fn parse_due_date(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| anyhow::anyhow!("Invalid due date '{}': use YYYY-MM-DD or RFC 3339", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_due_date_accepts_plain_date() {
        let due = parse_due_date("2024-05-01").unwrap();
        assert_eq!((due.year(), due.month(), due.day()), (2024, 5, 1));
    }

    #[test]
    fn test_parse_due_date_accepts_rfc3339() {
        let due = parse_due_date("2024-05-01T12:30:00+02:00").unwrap();
        assert_eq!(due.to_rfc3339(), "2024-05-01T10:30:00+00:00");
    }

    #[test]
    fn test_parse_due_date_rejects_garbage() {
        assert!(parse_due_date("next tuesday").is_err());
    }

    #[test]
    fn test_text_update() {
        assert_eq!(text_update(None, false), FieldUpdate::NoChange);
        assert_eq!(text_update(None, true), FieldUpdate::Clear);
        assert_eq!(
            text_update(Some("ana".to_string()), false),
            FieldUpdate::Set("ana".to_string())
        );
    }
}
