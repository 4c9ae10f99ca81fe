pub mod board;
pub mod column;
pub mod column_role;
pub mod commands;
pub mod drag;
pub mod export;
pub mod field_update;
pub mod modal;
pub mod palette;
pub mod stats;
pub mod task;
pub mod validation;

pub use board::{Board, BoardId};
pub use column::{Column, ColumnId, ColumnUpdate};
pub use column_role::ColumnRole;
pub use drag::{interpret_drag_end, DragAction};
pub use export::{BoardExporter, BoardImporter, ImportSummary};
pub use field_update::FieldUpdate;
pub use modal::{ConfirmAction, ModalKind, ModalMode, ModalPayload, ModalState};
pub use palette::{color_hex, DEFAULT_TASK_COLOR, PASTEL_COLORS};
pub use stats::BoardStats;
pub use task::{Priority, Task, TaskDraft, TaskId, TaskUpdate};
