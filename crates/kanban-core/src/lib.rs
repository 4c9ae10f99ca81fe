pub mod config;
pub mod error;
pub mod result;
pub mod retry;

pub use config::{AppConfig, RetryConfig, DEFAULT_COLUMN_COLOR};
pub use error::KanbanError;
pub use result::KanbanResult;
pub use retry::{retry_with_backoff, RetryPolicy};
