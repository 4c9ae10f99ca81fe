//! Fetching and first-time seeding of an owner's board.

use kanban_core::{retry_with_backoff, AppConfig, KanbanError, KanbanResult, RetryPolicy};
use kanban_domain::{Board, ColumnId};
use kanban_persistence::{
    assemble_board, BoardRow, ColumnPatch, NewBoard, NewColumn, RemoteStore, TaskPatch,
};
use std::collections::HashMap;
use std::sync::Arc;

/// The parts of `AppConfig` a load needs, owned so a load future can outlive
/// the call that started it.
#[derive(Debug, Clone)]
pub(crate) struct LoadSettings {
    pub retry: RetryPolicy,
    pub board_title: String,
    pub column_titles: Vec<String>,
    pub column_color: String,
}

impl From<&AppConfig> for LoadSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            retry: config.retry_policy(),
            board_title: config.default_board_title.clone(),
            column_titles: config.default_columns.clone(),
            column_color: config.default_column_color.clone(),
        }
    }
}

/// Load the owner's board, retrying rate-limited failures.
pub(crate) async fn fetch_board(
    remote: Arc<dyn RemoteStore>,
    owner_id: String,
    settings: LoadSettings,
) -> KanbanResult<Board> {
    retry_with_backoff(&settings.retry, KanbanError::is_rate_limited, || {
        fetch_once(remote.as_ref(), &owner_id, &settings)
    })
    .await
}

async fn fetch_once(
    remote: &dyn RemoteStore,
    owner_id: &str,
    settings: &LoadSettings,
) -> KanbanResult<Board> {
    let board = match remote.find_board_by_owner(owner_id).await? {
        Some(board) => board,
        None => seed_board(remote, owner_id, settings).await?,
    };

    let columns = remote.select_columns(&board.id).await?;
    let column_ids: Vec<ColumnId> = columns.iter().map(|c| c.id.clone()).collect();
    let tasks = remote.select_tasks(&column_ids).await?;

    tracing::debug!(
        "Fetched board {} with {} columns and {} tasks",
        board.id,
        columns.len(),
        tasks.len()
    );

    let stored_columns: HashMap<String, u32> =
        columns.iter().map(|c| (c.id.clone(), c.position)).collect();
    let stored_tasks: HashMap<String, u32> =
        tasks.iter().map(|t| (t.id.clone(), t.position)).collect();

    let board = assemble_board(board, columns, tasks);
    write_back_positions(remote, &board, &stored_columns, &stored_tasks).await?;
    Ok(board)
}

/// Persist the dense positions `assemble_board` gave to rows stored with gaps
/// or duplicates, so later renumbering writes start from what the remote holds.
async fn write_back_positions(
    remote: &dyn RemoteStore,
    board: &Board,
    stored_columns: &HashMap<String, u32>,
    stored_tasks: &HashMap<String, u32>,
) -> KanbanResult<()> {
    let mut rewritten = 0usize;
    for column in &board.columns {
        if stored_columns.get(&column.id) != Some(&column.position) {
            remote
                .update_column(&column.id, ColumnPatch::position(column.position))
                .await?;
            rewritten += 1;
        }
        for task_id in &column.task_ids {
            let Some(task) = board.task(task_id) else {
                continue;
            };
            if stored_tasks.get(task_id) != Some(&task.position) {
                remote
                    .update_task(task_id, TaskPatch::position(task.position))
                    .await?;
                rewritten += 1;
            }
        }
    }
    if rewritten > 0 {
        tracing::info!("Normalised {} stored positions on board {}", rewritten, board.id);
    }
    Ok(())
}

async fn seed_board(
    remote: &dyn RemoteStore,
    owner_id: &str,
    settings: &LoadSettings,
) -> KanbanResult<BoardRow> {
    tracing::info!("No board for owner {}, creating one", owner_id);
    let board = remote
        .insert_board(NewBoard {
            title: settings.board_title.clone(),
            user_id: owner_id.to_string(),
        })
        .await?;

    let columns = settings
        .column_titles
        .iter()
        .enumerate()
        .map(|(index, title)| NewColumn {
            board_id: board.id.clone(),
            title: title.clone(),
            color: settings.column_color.clone(),
            position: index as u32,
        })
        .collect();
    remote.insert_columns(columns).await?;

    Ok(board)
}
