use async_trait::async_trait;
use chrono::Utc;
use kanban_core::{AppConfig, KanbanError, KanbanResult, RetryConfig};
use kanban_domain::{ColumnId, TaskDraft, TaskUpdate};
use kanban_persistence::{
    BoardPatch, BoardRow, ColumnPatch, ColumnRow, NewBoard, NewColumn, NewTask, RemoteStore,
    TaskPatch, TaskRow,
};
use kanban_sync::{BoardStore, MutationOutcome};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Remote {}

    #[async_trait]
    impl RemoteStore for Remote {
        async fn find_board_by_owner(&self, owner_id: &str) -> KanbanResult<Option<BoardRow>>;
        async fn insert_board(&self, board: NewBoard) -> KanbanResult<BoardRow>;
        async fn update_board(&self, id: &str, patch: BoardPatch) -> KanbanResult<()>;
        async fn insert_columns(&self, columns: Vec<NewColumn>) -> KanbanResult<Vec<ColumnRow>>;
        async fn update_column(&self, id: &str, patch: ColumnPatch) -> KanbanResult<()>;
        async fn delete_column(&self, id: &str) -> KanbanResult<()>;
        async fn select_columns(&self, board_id: &str) -> KanbanResult<Vec<ColumnRow>>;
        async fn insert_task(&self, task: NewTask) -> KanbanResult<TaskRow>;
        async fn update_task(&self, id: &str, patch: TaskPatch) -> KanbanResult<()>;
        async fn delete_task(&self, id: &str) -> KanbanResult<()>;
        async fn delete_tasks_by_column(&self, column_id: &str) -> KanbanResult<()>;
        async fn select_tasks(&self, column_ids: &[ColumnId]) -> KanbanResult<Vec<TaskRow>>;
    }
}

const OWNER: &str = "owner-1";

fn fast_config() -> AppConfig {
    AppConfig {
        retry: RetryConfig {
            max_retries: 3,
            base_delay_ms: 1,
            max_delay_ms: 2,
            jitter_ms: 0,
        },
        ..AppConfig::default()
    }
}

fn board_row() -> BoardRow {
    let now = Utc::now();
    BoardRow {
        id: "b1".to_string(),
        title: "Remote board".to_string(),
        user_id: OWNER.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn column_row(id: &str, position: u32) -> ColumnRow {
    let now = Utc::now();
    ColumnRow {
        id: id.to_string(),
        title: id.to_string(),
        board_id: "b1".to_string(),
        position,
        color: "#D6E8FF".to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn task_row(id: &str, column_id: &str, position: u32) -> TaskRow {
    NewTask::from_draft(column_id, position, TaskDraft::new(id)).into_row(id.to_string(), Utc::now())
}

/// Remote holding b1 with columns todo [t1, t2] and done [].
fn expect_board(mock: &mut MockRemote) {
    mock.expect_find_board_by_owner()
        .returning(|_| Ok(Some(board_row())));
    mock.expect_select_columns()
        .returning(|_| Ok(vec![column_row("todo", 0), column_row("done", 1)]));
    mock.expect_select_tasks()
        .returning(|_| Ok(vec![task_row("t1", "todo", 0), task_row("t2", "todo", 1)]));
}

async fn loaded(mock: MockRemote) -> BoardStore {
    let store = BoardStore::new(Arc::new(mock), fast_config());
    store.load_board(OWNER).await;
    assert!(store.board().is_some(), "load failed: {:?}", store.error());
    store
}

#[tokio::test]
async fn test_failed_update_keeps_local_board() {
    let mut mock = MockRemote::new();
    expect_board(&mut mock);
    mock.expect_update_task()
        .times(1)
        .returning(|_, _| Err(KanbanError::from_remote_message("connection reset by peer")));
    let store = loaded(mock).await;
    let before = store.board().unwrap();

    let outcome = store
        .update_task(
            "t1",
            TaskUpdate {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(outcome, MutationOutcome::Failed(_)));
    assert_eq!(store.board().unwrap(), before);
    let error = store.error().unwrap();
    assert!(error.contains("connection reset"), "{}", error);
}

#[tokio::test]
async fn test_failed_move_keeps_positions() {
    let mut mock = MockRemote::new();
    expect_board(&mut mock);
    mock.expect_update_task()
        .times(1)
        .returning(|_, _| Err(KanbanError::Remote("timeout".to_string())));
    let store = loaded(mock).await;
    let before = store.board().unwrap();

    let outcome = store.move_task("t2", "todo", "done", 0).await;

    assert!(matches!(outcome, MutationOutcome::Failed(_)));
    assert_eq!(store.board().unwrap(), before);
}

#[tokio::test]
async fn test_move_persists_clamped_destination_and_shifted_sibling() {
    let mut mock = MockRemote::new();
    expect_board(&mut mock);
    mock.expect_update_task()
        .withf(|id, patch| {
            id.to_string() == "t1"
                && patch.column_id.as_deref() == Some("todo")
                && patch.position == Some(1)
        })
        .times(1)
        .returning(|_, _| Ok(()));
    mock.expect_update_task()
        .withf(|id, patch| {
            id.to_string() == "t2" && patch.column_id.is_none() && patch.position == Some(0)
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let store = loaded(mock).await;

    let outcome = store.move_task("t1", "todo", "todo", 10).await;

    assert_eq!(outcome, MutationOutcome::Applied);
    let board = store.board().unwrap();
    assert_eq!(board.column("todo").unwrap().task_ids, vec!["t2", "t1"]);
}

#[tokio::test]
async fn test_failed_sibling_renumber_keeps_board() {
    let mut mock = MockRemote::new();
    expect_board(&mut mock);
    mock.expect_delete_task().times(1).returning(|_| Ok(()));
    mock.expect_update_task()
        .times(1)
        .returning(|_, _| Err(KanbanError::Remote("offline".to_string())));
    let store = loaded(mock).await;
    let before = store.board().unwrap();

    let outcome = store.delete_task("t1").await;

    assert!(matches!(outcome, MutationOutcome::Failed(_)));
    assert_eq!(store.board().unwrap(), before);
}

#[tokio::test]
async fn test_partial_column_delete_leaves_board() {
    let mut mock = MockRemote::new();
    expect_board(&mut mock);
    mock.expect_delete_tasks_by_column()
        .times(1)
        .returning(|_| Ok(()));
    mock.expect_delete_column()
        .times(1)
        .returning(|_| Err(KanbanError::Remote("constraint failed".to_string())));
    let store = loaded(mock).await;
    let before = store.board().unwrap();

    let outcome = store.delete_column("todo").await;

    assert!(matches!(outcome, MutationOutcome::Failed(_)));
    assert_eq!(store.board().unwrap(), before);
}

#[tokio::test]
async fn test_reorder_stops_at_first_failed_write() {
    let mut mock = MockRemote::new();
    expect_board(&mut mock);
    mock.expect_update_column()
        .times(1)
        .returning(|_, _| Err(KanbanError::Remote("offline".to_string())));
    let store = loaded(mock).await;

    let outcome = store
        .reorder_columns(vec!["done".to_string(), "todo".to_string()])
        .await;

    assert!(matches!(outcome, MutationOutcome::Failed(_)));
    assert_eq!(store.board().unwrap().column_ids(), vec!["todo", "done"]);
}

#[tokio::test]
async fn test_invalid_input_skips_remote() {
    let mut mock = MockRemote::new();
    expect_board(&mut mock);
    mock.expect_insert_task().never();
    mock.expect_update_board().never();
    let store = loaded(mock).await;

    assert!(matches!(
        store.add_task("todo", TaskDraft::new("")).await,
        MutationOutcome::Invalid(_)
    ));
    assert!(matches!(
        store.update_board_title(&"x".repeat(101)).await,
        MutationOutcome::Invalid(_)
    ));
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_rate_limited_load_is_retried() {
    let mut mock = MockRemote::new();
    let mut calls = 0;
    mock.expect_find_board_by_owner()
        .times(3)
        .returning(move |_| {
            calls += 1;
            if calls < 3 {
                Err(KanbanError::from_remote_message("429 Too Many Requests"))
            } else {
                Ok(Some(board_row()))
            }
        });
    mock.expect_select_columns()
        .returning(|_| Ok(vec![column_row("todo", 0)]));
    mock.expect_select_tasks().returning(|_| Ok(Vec::new()));

    let store = BoardStore::new(Arc::new(mock), fast_config());
    store.load_board(OWNER).await;

    assert_eq!(store.board().unwrap().title, "Remote board");
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_exhausted_rate_limit_surfaces_message() {
    let mut mock = MockRemote::new();
    mock.expect_find_board_by_owner()
        .times(4)
        .returning(|_| Err(KanbanError::from_remote_message("rate limit exceeded")));

    let store = BoardStore::new(Arc::new(mock), fast_config());
    store.load_board(OWNER).await;

    assert!(store.board().is_none());
    assert!(!store.is_loading());
    assert_eq!(
        store.error().as_deref(),
        Some("Too many requests. Wait a moment and try again.")
    );
}

#[tokio::test]
async fn test_unauthorized_load_is_not_retried() {
    let mut mock = MockRemote::new();
    mock.expect_find_board_by_owner()
        .times(1)
        .returning(|_| Err(KanbanError::from_remote_message("JWT expired")));

    let store = BoardStore::new(Arc::new(mock), fast_config());
    store.load_board(OWNER).await;

    assert!(store.board().is_none());
    let error = store.error().unwrap();
    assert!(error.contains("sign in again"), "{}", error);
}

#[tokio::test]
async fn test_missing_board_is_seeded() {
    let mut mock = MockRemote::new();
    mock.expect_find_board_by_owner()
        .times(1)
        .returning(|_| Ok(None));
    mock.expect_insert_board()
        .withf(|board| board.title == "My Kanban" && board.user_id == OWNER)
        .times(1)
        .returning(|_| Ok(board_row()));
    mock.expect_insert_columns()
        .withf(|columns| {
            columns.iter().map(|c| c.title.as_str()).collect::<Vec<_>>()
                == vec!["To Do", "Doing", "Done"]
                && columns.iter().map(|c| c.position).collect::<Vec<_>>() == vec![0, 1, 2]
        })
        .times(1)
        .returning(|_| Ok(Vec::new()));
    mock.expect_select_columns()
        .returning(|_| Ok(vec![column_row("a", 0), column_row("b", 1), column_row("c", 2)]));
    mock.expect_select_tasks().returning(|_| Ok(Vec::new()));

    let store = BoardStore::new(Arc::new(mock), fast_config());
    store.load_board(OWNER).await;

    assert_eq!(store.board().unwrap().columns.len(), 3);
}
