use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use kanban_core::{AppConfig, KanbanError, KanbanResult};
use kanban_domain::commands::{
    Command, InsertColumn, InsertTask, MoveTask, RemoveColumn, RemoveTask, RenameBoard,
    ReorderColumns, UpdateColumn, UpdateTask,
};
use kanban_domain::validation::{
    require_color, require_title, MAX_BOARD_TITLE_LEN, MAX_COLUMN_TITLE_LEN,
};
use kanban_domain::{
    interpret_drag_end, Board, ColumnId, ColumnUpdate, DragAction, ModalKind, ModalMode,
    ModalPayload, ModalState, TaskDraft, TaskUpdate,
};
use kanban_persistence::{BoardPatch, ColumnPatch, NewColumn, NewTask, RemoteStore, TaskPatch};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

use crate::events::StoreEvent;
use crate::loader::{fetch_board, LoadSettings};
use crate::outcome::MutationOutcome;

const EVENT_CAPACITY: usize = 64;

type SharedLoad = Shared<BoxFuture<'static, Result<Board, Arc<KanbanError>>>>;

struct CachedBoard {
    owner_id: String,
    board: Board,
    fetched_at: Instant,
}

struct InFlightLoad {
    id: u64,
    future: SharedLoad,
}

#[derive(Default)]
struct StoreState {
    board: Option<Board>,
    error: Option<String>,
    modal: ModalState,
    cache: Option<CachedBoard>,
    in_flight: HashMap<String, InFlightLoad>,
    next_load_id: u64,
}

/// Holds the loaded board and keeps it consistent with the remote tables.
///
/// Every mutation validates its input against the current board, writes to
/// the remote store, and only after the write succeeds applies the matching
/// domain command to the local board. A failed write leaves the board as it
/// was and records a user-facing error.
///
/// The store is shared by reference; all methods take `&self`. Internal state
/// sits behind a mutex that is never held across an `.await`.
pub struct BoardStore {
    remote: Arc<dyn RemoteStore>,
    config: AppConfig,
    state: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl BoardStore {
    pub fn new(remote: Arc<dyn RemoteStore>, config: AppConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            remote,
            config,
            state: Mutex::new(StoreState::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn board(&self) -> Option<Board> {
        self.state.lock().board.clone()
    }

    /// True while any owner's load is still in flight.
    pub fn is_loading(&self) -> bool {
        !self.state.lock().in_flight.is_empty()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.lock().error = Some(message.clone());
        self.emit(StoreEvent::Error(message));
    }

    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    pub fn modal_state(&self) -> ModalState {
        self.state.lock().modal.clone()
    }

    pub fn open_modal(&self, kind: ModalKind, mode: ModalMode, payload: ModalPayload) {
        self.state.lock().modal.open(kind, mode, payload);
        self.emit(StoreEvent::ModalChanged);
    }

    pub fn close_modal(&self) {
        self.state.lock().modal.close();
        self.emit(StoreEvent::ModalChanged);
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn cache_ttl(&self) -> Duration {
        self.config.cache_ttl()
    }

    /// Load (or create) the board owned by `owner_id`.
    ///
    /// A board fetched for the same owner within the cache window is reused
    /// without a remote call. Concurrent loads for the same owner share one
    /// fetch and all observe its result.
    pub async fn load_board(&self, owner_id: &str) {
        let (load_id, future) = {
            let mut state = self.state.lock();

            let fresh = state.cache.as_ref().and_then(|cached| {
                (cached.owner_id == owner_id && cached.fetched_at.elapsed() < self.cache_ttl())
                    .then(|| cached.board.clone())
            });
            if let Some(board) = fresh {
                tracing::debug!("Serving board for {} from cache", owner_id);
                state.board = Some(board);
                state.error = None;
                drop(state);
                self.emit(StoreEvent::BoardLoaded);
                return;
            }

            if let Some(load) = state.in_flight.get(owner_id) {
                tracing::debug!("Joining in-flight load for {}", owner_id);
                (load.id, load.future.clone())
            } else {
                let id = state.next_load_id;
                state.next_load_id += 1;
                let future = fetch_board(
                    Arc::clone(&self.remote),
                    owner_id.to_string(),
                    LoadSettings::from(&self.config),
                )
                .map(|result| result.map_err(Arc::new))
                .boxed()
                .shared();
                state.in_flight.insert(
                    owner_id.to_string(),
                    InFlightLoad {
                        id,
                        future: future.clone(),
                    },
                );
                state.error = None;
                drop(state);
                self.emit(StoreEvent::LoadStarted {
                    owner_id: owner_id.to_string(),
                });
                (id, future)
            }
        };

        let result = future.await;

        let mut state = self.state.lock();
        // Whoever resumes first publishes the shared result; the rest see the
        // entry gone and leave the state alone.
        let owns_entry = state
            .in_flight
            .get(owner_id)
            .is_some_and(|load| load.id == load_id);
        if !owns_entry {
            return;
        }
        state.in_flight.remove(owner_id);

        match result {
            Ok(board) => {
                tracing::info!("Loaded board {} for {}", board.id, owner_id);
                state.cache = Some(CachedBoard {
                    owner_id: owner_id.to_string(),
                    board: board.clone(),
                    fetched_at: Instant::now(),
                });
                state.board = Some(board);
                state.error = None;
                drop(state);
                self.emit(StoreEvent::BoardLoaded);
            }
            Err(e) => {
                tracing::error!("Failed to load board for {}: {}", owner_id, e);
                let message = e.user_message();
                state.board = None;
                state.error = Some(message.clone());
                drop(state);
                self.emit(StoreEvent::Error(message));
            }
        }
    }

    /// Apply a command to the local board after its remote write succeeded.
    fn commit(&self, command: &dyn Command) -> MutationOutcome {
        let description = command.description();
        let mut state = self.state.lock();
        let Some(board) = state.board.as_mut() else {
            return MutationOutcome::NotLoaded;
        };

        tracing::debug!("Executing: {}", description);
        if let Err(e) = board.apply(command, Utc::now()) {
            tracing::warn!("Local apply of '{}' failed: {}", description, e);
            return match e {
                KanbanError::NotFound(what) => MutationOutcome::NotFound(what),
                other => MutationOutcome::Failed(other.user_message()),
            };
        }

        let snapshot = board.clone();
        if let Some(cached) = state.cache.as_mut() {
            if cached.board.id == snapshot.id {
                cached.board = snapshot;
            }
        }
        drop(state);

        self.emit(StoreEvent::BoardChanged { description });
        MutationOutcome::Applied
    }

    fn fail(&self, action: &str, e: KanbanError) -> MutationOutcome {
        tracing::error!("Failed to {}: {}", action, e);
        let message = e.user_message();
        self.state.lock().error = Some(message.clone());
        self.emit(StoreEvent::Error(message.clone()));
        MutationOutcome::Failed(message)
    }

    /// Persist the positions `after` renumbered relative to `before`, skipping
    /// `skip_task` whose row was already written.
    async fn persist_shifted_positions(
        &self,
        before: &Board,
        after: &Board,
        skip_task: Option<&str>,
    ) -> KanbanResult<()> {
        for column in &after.columns {
            if let Some(old) = before.column(&column.id) {
                if old.position != column.position {
                    self.remote
                        .update_column(&column.id, ColumnPatch::position(column.position))
                        .await?;
                }
            }

            for task_id in &column.task_ids {
                if skip_task == Some(task_id.as_str()) {
                    continue;
                }
                let (Some(old), Some(new)) = (before.task(task_id), after.task(task_id)) else {
                    continue;
                };
                if old.position != new.position {
                    self.remote
                        .update_task(task_id, TaskPatch::position(new.position))
                        .await?;
                }
            }
        }
        Ok(())
    }

    /// Preview `command` on a copy of `board`.
    fn preview(board: &Board, command: &dyn Command) -> KanbanResult<Board> {
        let mut preview = board.clone();
        preview.apply(command, Utc::now())?;
        Ok(preview)
    }

    pub async fn add_task(&self, column_id: &str, draft: TaskDraft) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };
        let Some(column) = board.column(column_id) else {
            return MutationOutcome::NotFound(format!("column {}", column_id));
        };
        let draft = match draft.validated() {
            Ok(draft) => draft,
            Err(e) => return MutationOutcome::Invalid(e.user_message()),
        };

        let position = column.task_ids.len() as u32;
        let row = match self
            .remote
            .insert_task(NewTask::from_draft(column_id, position, draft))
            .await
        {
            Ok(row) => row,
            Err(e) => return self.fail("add task", e),
        };

        self.commit(&InsertTask { task: row.into() })
    }

    pub async fn update_task(&self, task_id: &str, updates: TaskUpdate) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };
        if board.task(task_id).is_none() {
            return MutationOutcome::NotFound(format!("task {}", task_id));
        }
        let updates = match updates.validated() {
            Ok(updates) => updates,
            Err(e) => return MutationOutcome::Invalid(e.user_message()),
        };

        if let Err(e) = self
            .remote
            .update_task(task_id, TaskPatch::from(updates.clone()))
            .await
        {
            return self.fail("update task", e);
        }

        self.commit(&UpdateTask {
            task_id: task_id.to_string(),
            updates,
        })
    }

    pub async fn delete_task(&self, task_id: &str) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };
        if board.task(task_id).is_none() {
            return MutationOutcome::NotFound(format!("task {}", task_id));
        }

        let command = RemoveTask {
            task_id: task_id.to_string(),
        };
        let preview = match Self::preview(&board, &command) {
            Ok(preview) => preview,
            Err(e) => return self.fail("delete task", e),
        };

        if let Err(e) = self.remote.delete_task(task_id).await {
            return self.fail("delete task", e);
        }
        if let Err(e) = self.persist_shifted_positions(&board, &preview, None).await {
            return self.fail("renumber tasks", e);
        }

        self.commit(&command)
    }

    /// Move a task to `new_index` of `dest_column_id`. The index is clamped
    /// to the destination list; within one column this is a reorder.
    pub async fn move_task(
        &self,
        task_id: &str,
        source_column_id: &str,
        dest_column_id: &str,
        new_index: usize,
    ) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };
        let in_source = board
            .task(task_id)
            .is_some_and(|task| task.column_id == source_column_id);
        if !in_source {
            return MutationOutcome::NotFound(format!(
                "task {} in column {}",
                task_id, source_column_id
            ));
        }

        let command = MoveTask {
            task_id: task_id.to_string(),
            source_column_id: source_column_id.to_string(),
            dest_column_id: dest_column_id.to_string(),
            index: new_index,
        };
        let index = match command.effective_index(&board) {
            Ok(index) => index,
            Err(e) => return MutationOutcome::NotFound(e.to_string()),
        };
        let preview = match Self::preview(&board, &command) {
            Ok(preview) => preview,
            Err(e) => return self.fail("move task", e),
        };

        if let Err(e) = self
            .remote
            .update_task(task_id, TaskPatch::move_to(dest_column_id, index as u32))
            .await
        {
            return self.fail("move task", e);
        }
        if let Err(e) = self
            .persist_shifted_positions(&board, &preview, Some(task_id))
            .await
        {
            return self.fail("renumber tasks", e);
        }

        self.commit(&command)
    }

    pub async fn add_column(&self, title: &str, color: Option<&str>) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };
        let title = match require_title("Column", title, MAX_COLUMN_TITLE_LEN) {
            Ok(title) => title,
            Err(e) => return MutationOutcome::Invalid(e.user_message()),
        };
        let color = color.unwrap_or(self.config.default_column_color.as_str());
        let color = match require_color(color) {
            Ok(color) => color,
            Err(e) => return MutationOutcome::Invalid(e.user_message()),
        };

        let new_column = NewColumn {
            board_id: board.id.clone(),
            title,
            color,
            position: board.columns.len() as u32,
        };
        let row = match self.remote.insert_columns(vec![new_column]).await {
            Ok(mut rows) if !rows.is_empty() => rows.remove(0),
            Ok(_) => {
                return self.fail(
                    "add column",
                    KanbanError::Remote("insert returned no column".to_string()),
                )
            }
            Err(e) => return self.fail("add column", e),
        };

        self.commit(&InsertColumn { column: row.into() })
    }

    pub async fn update_column(&self, column_id: &str, updates: ColumnUpdate) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };
        if board.column(column_id).is_none() {
            return MutationOutcome::NotFound(format!("column {}", column_id));
        }
        let updates = match updates.validated() {
            Ok(updates) => updates,
            Err(e) => return MutationOutcome::Invalid(e.user_message()),
        };

        if let Err(e) = self
            .remote
            .update_column(column_id, ColumnPatch::from(updates.clone()))
            .await
        {
            return self.fail("update column", e);
        }

        self.commit(&UpdateColumn {
            column_id: column_id.to_string(),
            updates,
        })
    }

    /// Delete a column and every task in it.
    pub async fn delete_column(&self, column_id: &str) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };
        if board.column(column_id).is_none() {
            return MutationOutcome::NotFound(format!("column {}", column_id));
        }

        let command = RemoveColumn {
            column_id: column_id.to_string(),
        };
        let preview = match Self::preview(&board, &command) {
            Ok(preview) => preview,
            Err(e) => return self.fail("delete column", e),
        };

        if let Err(e) = self.remote.delete_tasks_by_column(column_id).await {
            return self.fail("delete column tasks", e);
        }
        if let Err(e) = self.remote.delete_column(column_id).await {
            return self.fail("delete column", e);
        }
        if let Err(e) = self.persist_shifted_positions(&board, &preview, None).await {
            return self.fail("renumber columns", e);
        }

        self.commit(&command)
    }

    /// Put columns in the given order. Unknown ids are skipped and columns
    /// not listed follow the listed ones in their current order.
    pub async fn reorder_columns(&self, ordered_ids: Vec<ColumnId>) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };
        if !ordered_ids.iter().any(|id| board.column(id).is_some()) {
            return MutationOutcome::NotFound(format!("columns {}", ordered_ids.join(", ")));
        }

        let command = ReorderColumns { ordered_ids };
        let preview = match Self::preview(&board, &command) {
            Ok(preview) => preview,
            Err(e) => return self.fail("reorder columns", e),
        };

        for (index, column) in preview.columns.iter().enumerate() {
            if let Err(e) = self
                .remote
                .update_column(&column.id, ColumnPatch::position(index as u32))
                .await
            {
                return self.fail("reorder columns", e);
            }
        }

        self.commit(&command)
    }

    pub async fn update_board_title(&self, title: &str) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };
        let title = match require_title("Board", title, MAX_BOARD_TITLE_LEN) {
            Ok(title) => title,
            Err(e) => return MutationOutcome::Invalid(e.user_message()),
        };

        let patch = BoardPatch {
            title: Some(title.clone()),
        };
        if let Err(e) = self.remote.update_board(&board.id, patch).await {
            return self.fail("rename board", e);
        }

        self.commit(&RenameBoard { title })
    }

    /// Turn a finished drag into at most one mutation.
    pub async fn handle_drag_end(&self, active_id: &str, over_id: Option<&str>) -> MutationOutcome {
        let Some(board) = self.board() else {
            return MutationOutcome::NotLoaded;
        };

        match interpret_drag_end(&board, active_id, over_id) {
            None => {
                tracing::debug!("Drop of {} onto {:?} changes nothing", active_id, over_id);
                MutationOutcome::Ignored
            }
            Some(DragAction::ReorderColumns(ordered_ids)) => {
                self.reorder_columns(ordered_ids).await
            }
            Some(DragAction::MoveTask {
                task_id,
                source_column_id,
                dest_column_id,
                index,
            }) => {
                self.move_task(&task_id, &source_column_id, &dest_column_id, index)
                    .await
            }
        }
    }
}
