//! Drag-and-drop interpretation.
//!
//! Turns the final state of a drag gesture (the dragged element and the
//! element under the pointer at release) into at most one board mutation.
//! Nothing here edits the board; callers dispatch the returned action.

use serde::{Deserialize, Serialize};

use crate::{Board, ColumnId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragAction {
    /// New left-to-right column order.
    ReorderColumns(Vec<ColumnId>),
    MoveTask {
        task_id: TaskId,
        source_column_id: ColumnId,
        dest_column_id: ColumnId,
        index: usize,
    },
}

/// Decide what a drop means.
///
/// * column dropped on another column: array-move the dragged column to the
///   target's slot;
/// * task dropped on a task of another column: insert right after it;
/// * task dropped on another column itself: insert at the top;
/// * task dropped on a task of its own column: take the target's index;
/// * anything else (no target, unknown ids, same slot): nothing.
pub fn interpret_drag_end(board: &Board, active_id: &str, over_id: Option<&str>) -> Option<DragAction> {
    let over_id = over_id?;

    let active_column = board.column_index(active_id);
    let over_column = board.column_index(over_id);
    if let (Some(from), Some(to)) = (active_column, over_column) {
        if from != to {
            return Some(DragAction::ReorderColumns(array_move(
                &board.column_ids(),
                from,
                to,
            )));
        }
    }

    board.task(active_id)?;
    let source = board.column_containing(active_id)?;

    let dest = match board.column(over_id) {
        Some(column) => column,
        None => {
            board.task(over_id)?;
            board.column_containing(over_id)?
        }
    };

    if source.id != dest.id {
        let index = if over_id == dest.id {
            0
        } else {
            dest.index_of(over_id)
                .map(|i| i + 1)
                .unwrap_or(dest.task_ids.len())
        };
        return Some(DragAction::MoveTask {
            task_id: active_id.to_string(),
            source_column_id: source.id.clone(),
            dest_column_id: dest.id.clone(),
            index,
        });
    }

    let active_index = source.index_of(active_id)?;
    let over_index = source.index_of(over_id)?;
    if active_index == over_index {
        return None;
    }
    Some(DragAction::MoveTask {
        task_id: active_id.to_string(),
        source_column_id: source.id.clone(),
        dest_column_id: source.id.clone(),
        index: over_index,
    })
}

/// Move the element at `from` to `to`; elements in between slide toward the
/// vacated slot.
pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut moved = items.to_vec();
    if from >= moved.len() {
        return moved;
    }
    let item = moved.remove(from);
    let to = to.min(moved.len());
    moved.insert(to, item);
    moved
}
