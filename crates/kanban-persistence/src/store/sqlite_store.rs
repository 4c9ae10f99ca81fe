use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kanban_core::{KanbanError, KanbanResult};
use kanban_domain::{ColumnId, Priority};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::rows::{
    BoardPatch, BoardRow, ColumnPatch, ColumnRow, NewBoard, NewColumn, NewTask, TaskPatch, TaskRow,
};
use crate::traits::RemoteStore;

const SCHEMA: &str = include_str!("../schema.sql");

const BOARD_FIELDS: &str = "id, title, user_id, created_at, updated_at";
const COLUMN_FIELDS: &str = "id, title, board_id, position, color, created_at, updated_at";
const TASK_FIELDS: &str = "id, title, description, column_id, position, priority, due_date,
    category_color, tags, assignee, created_at, updated_at";

fn db_error(e: sqlx::Error) -> KanbanError {
    KanbanError::from_remote_message(e.to_string())
}

fn parse_time(raw: &str) -> KanbanResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| KanbanError::Serialization(format!("bad timestamp '{}': {}", raw, e)))
}

/// Remote store over a SQLite database with the board/column/task schema.
pub struct SqliteStore {
    path: PathBuf,
    pool: tokio::sync::OnceCell<Pool<Sqlite>>,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pool: tokio::sync::OnceCell::new(),
        }
    }

    async fn get_pool(&self) -> KanbanResult<&Pool<Sqlite>> {
        self.pool
            .get_or_try_init(|| async {
                let options = SqliteConnectOptions::from_str(&format!(
                    "sqlite://{}?mode=rwc",
                    self.path.display()
                ))
                .map_err(db_error)?
                .create_if_missing(true)
                .foreign_keys(true);

                let pool = SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
                    .map_err(db_error)?;

                sqlx::raw_sql(SCHEMA)
                    .execute(&pool)
                    .await
                    .map_err(db_error)?;

                tracing::info!("Opened SQLite store at {}", self.path.display());
                Ok(pool)
            })
            .await
    }

    fn row_to_board(row: &SqliteRow) -> KanbanResult<BoardRow> {
        Ok(BoardRow {
            id: row.try_get("id").map_err(db_error)?,
            title: row.try_get("title").map_err(db_error)?,
            user_id: row.try_get("user_id").map_err(db_error)?,
            created_at: parse_time(&row.try_get::<String, _>("created_at").map_err(db_error)?)?,
            updated_at: parse_time(&row.try_get::<String, _>("updated_at").map_err(db_error)?)?,
        })
    }

    fn row_to_column(row: &SqliteRow) -> KanbanResult<ColumnRow> {
        Ok(ColumnRow {
            id: row.try_get("id").map_err(db_error)?,
            title: row.try_get("title").map_err(db_error)?,
            board_id: row.try_get("board_id").map_err(db_error)?,
            position: row.try_get::<i64, _>("position").map_err(db_error)?.max(0) as u32,
            color: row.try_get("color").map_err(db_error)?,
            created_at: parse_time(&row.try_get::<String, _>("created_at").map_err(db_error)?)?,
            updated_at: parse_time(&row.try_get::<String, _>("updated_at").map_err(db_error)?)?,
        })
    }

    fn row_to_task(row: &SqliteRow) -> KanbanResult<TaskRow> {
        let tags: String = row.try_get("tags").map_err(db_error)?;
        let due_date: Option<String> = row.try_get("due_date").map_err(db_error)?;
        let priority: String = row.try_get("priority").map_err(db_error)?;

        Ok(TaskRow {
            id: row.try_get("id").map_err(db_error)?,
            title: row.try_get("title").map_err(db_error)?,
            description: row.try_get("description").map_err(db_error)?,
            column_id: row.try_get("column_id").map_err(db_error)?,
            position: row.try_get::<i64, _>("position").map_err(db_error)?.max(0) as u32,
            priority: priority.parse::<Priority>().unwrap_or_default(),
            due_date: due_date.as_deref().map(parse_time).transpose()?,
            category_color: row.try_get("category_color").map_err(db_error)?,
            tags: serde_json::from_str(&tags)
                .map_err(|e| KanbanError::Serialization(e.to_string()))?,
            assignee: row.try_get("assignee").map_err(db_error)?,
            created_at: parse_time(&row.try_get::<String, _>("created_at").map_err(db_error)?)?,
            updated_at: parse_time(&row.try_get::<String, _>("updated_at").map_err(db_error)?)?,
        })
    }

    async fn fetch_task(&self, id: &str) -> KanbanResult<TaskRow> {
        let pool = self.get_pool().await?;
        let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_FIELDS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| KanbanError::NotFound(format!("task {}", id)))?;
        Self::row_to_task(&row)
    }

    async fn write_task(&self, task: &TaskRow) -> KanbanResult<()> {
        let pool = self.get_pool().await?;
        let tags = serde_json::to_string(&task.tags)
            .map_err(|e| KanbanError::Serialization(e.to_string()))?;

        sqlx::query(
            "INSERT INTO tasks (id, title, description, column_id, position, priority, due_date,
                category_color, tags, assignee, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                column_id = excluded.column_id,
                position = excluded.position,
                priority = excluded.priority,
                due_date = excluded.due_date,
                category_color = excluded.category_color,
                tags = excluded.tags,
                assignee = excluded.assignee,
                updated_at = excluded.updated_at",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.column_id)
        .bind(task.position as i64)
        .bind(task.priority.as_str())
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(&task.category_color)
        .bind(&tags)
        .bind(&task.assignee)
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .execute(pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn delete_by_id(&self, table: &str, kind: &str, id: &str) -> KanbanResult<()> {
        let pool = self.get_pool().await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(KanbanError::NotFound(format!("{} {}", kind, id)));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn find_board_by_owner(&self, owner_id: &str) -> KanbanResult<Option<BoardRow>> {
        let pool = self.get_pool().await?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM boards WHERE user_id = ? ORDER BY created_at LIMIT 1",
            BOARD_FIELDS
        ))
        .bind(owner_id)
        .fetch_optional(pool)
        .await
        .map_err(db_error)?;
        row.as_ref().map(Self::row_to_board).transpose()
    }

    async fn insert_board(&self, board: NewBoard) -> KanbanResult<BoardRow> {
        let pool = self.get_pool().await?;
        let now = Utc::now();
        let row = BoardRow {
            id: Uuid::new_v4().to_string(),
            title: board.title,
            user_id: board.user_id,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO boards (id, title, user_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.title)
        .bind(&row.user_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(pool)
        .await
        .map_err(db_error)?;
        Ok(row)
    }

    async fn update_board(&self, id: &str, patch: BoardPatch) -> KanbanResult<()> {
        let pool = self.get_pool().await?;
        let current = sqlx::query(&format!("SELECT {} FROM boards WHERE id = ?", BOARD_FIELDS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| KanbanError::NotFound(format!("board {}", id)))?;
        let mut row = Self::row_to_board(&current)?;
        patch.apply_to(&mut row, Utc::now());

        sqlx::query("UPDATE boards SET title = ?, updated_at = ? WHERE id = ?")
            .bind(&row.title)
            .bind(row.updated_at.to_rfc3339())
            .bind(id)
            .execute(pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn insert_columns(&self, columns: Vec<NewColumn>) -> KanbanResult<Vec<ColumnRow>> {
        let pool = self.get_pool().await?;
        let now = Utc::now();
        let mut tx = pool.begin().await.map_err(db_error)?;
        let mut rows = Vec::with_capacity(columns.len());

        for column in columns {
            let row = ColumnRow {
                id: Uuid::new_v4().to_string(),
                title: column.title,
                board_id: column.board_id,
                position: column.position,
                color: column.color,
                created_at: now,
                updated_at: now,
            };
            sqlx::query(
                "INSERT INTO columns (id, title, board_id, position, color, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&row.id)
            .bind(&row.title)
            .bind(&row.board_id)
            .bind(row.position as i64)
            .bind(&row.color)
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
            rows.push(row);
        }

        tx.commit().await.map_err(db_error)?;
        Ok(rows)
    }

    async fn update_column(&self, id: &str, patch: ColumnPatch) -> KanbanResult<()> {
        let pool = self.get_pool().await?;
        let current = sqlx::query(&format!("SELECT {} FROM columns WHERE id = ?", COLUMN_FIELDS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| KanbanError::NotFound(format!("column {}", id)))?;
        let mut row = Self::row_to_column(&current)?;
        patch.apply_to(&mut row, Utc::now());

        sqlx::query(
            "UPDATE columns SET title = ?, color = ?, position = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&row.title)
        .bind(&row.color)
        .bind(row.position as i64)
        .bind(row.updated_at.to_rfc3339())
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn delete_column(&self, id: &str) -> KanbanResult<()> {
        self.delete_by_id("columns", "column", id).await
    }

    async fn select_columns(&self, board_id: &str) -> KanbanResult<Vec<ColumnRow>> {
        let pool = self.get_pool().await?;
        sqlx::query(&format!(
            "SELECT {} FROM columns WHERE board_id = ? ORDER BY position",
            COLUMN_FIELDS
        ))
        .bind(board_id)
        .fetch_all(pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(Self::row_to_column)
        .collect()
    }

    async fn insert_task(&self, task: NewTask) -> KanbanResult<TaskRow> {
        let row = task.into_row(Uuid::new_v4().to_string(), Utc::now());
        self.write_task(&row).await?;
        Ok(row)
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> KanbanResult<()> {
        let mut row = self.fetch_task(id).await?;
        patch.apply_to(&mut row, Utc::now());
        self.write_task(&row).await
    }

    async fn delete_task(&self, id: &str) -> KanbanResult<()> {
        self.delete_by_id("tasks", "task", id).await
    }

    async fn delete_tasks_by_column(&self, column_id: &str) -> KanbanResult<()> {
        let pool = self.get_pool().await?;
        sqlx::query("DELETE FROM tasks WHERE column_id = ?")
            .bind(column_id)
            .execute(pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn select_tasks(&self, column_ids: &[ColumnId]) -> KanbanResult<Vec<TaskRow>> {
        if column_ids.is_empty() {
            return Ok(Vec::new());
        }
        let pool = self.get_pool().await?;
        let placeholders = vec!["?"; column_ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM tasks WHERE column_id IN ({}) ORDER BY position",
            TASK_FIELDS, placeholders
        );

        let mut query = sqlx::query(&sql);
        for id in column_ids {
            query = query.bind(id);
        }
        query
            .fetch_all(pool)
            .await
            .map_err(db_error)?
            .iter()
            .map(Self::row_to_task)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_domain::TaskDraft;
    use tempfile::tempdir;

    async fn seeded(store: &SqliteStore) -> (BoardRow, Vec<ColumnRow>) {
        let board = store
            .insert_board(NewBoard {
                title: "Sql".to_string(),
                user_id: "u1".to_string(),
            })
            .await
            .unwrap();
        let columns = store
            .insert_columns(
                ["Todo", "Done"]
                    .iter()
                    .enumerate()
                    .map(|(i, title)| NewColumn {
                        board_id: board.id.clone(),
                        title: title.to_string(),
                        color: "#D6E8FF".to_string(),
                        position: i as u32,
                    })
                    .collect(),
            )
            .await
            .unwrap();
        (board, columns)
    }

    #[tokio::test]
    async fn test_board_and_columns_round_trip() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("kanban.db"));
        let (board, columns) = seeded(&store).await;

        let found = store.find_board_by_owner("u1").await.unwrap().unwrap();
        assert_eq!(found.id, board.id);
        assert_eq!(store.select_columns(&board.id).await.unwrap().len(), 2);
        assert_eq!(columns[1].position, 1);
    }

    #[tokio::test]
    async fn test_task_move_and_cascade() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("kanban.db"));
        let (_, columns) = seeded(&store).await;

        let mut draft = TaskDraft::new("Ship");
        draft.tags = vec!["release".to_string()];
        let task = store
            .insert_task(NewTask::from_draft(columns[0].id.clone(), 0, draft))
            .await
            .unwrap();

        store
            .update_task(&task.id, TaskPatch::move_to(columns[1].id.clone(), 0))
            .await
            .unwrap();
        let moved = store.select_tasks(&[columns[1].id.clone()]).await.unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].tags, vec!["release"]);

        store.delete_column(&columns[1].id).await.unwrap();
        assert!(store
            .select_tasks(&[columns[1].id.clone()])
            .await
            .unwrap()
            .is_empty());
        assert!(store.delete_task(&task.id).await.unwrap_err().is_not_found());
    }
}
