use serde::{Deserialize, Serialize};

use crate::{ColumnId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalKind {
    #[default]
    None,
    Task,
    Column,
    Settings,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalMode {
    #[default]
    Create,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmAction {
    DeleteTask,
    DeleteColumn,
}

/// What the open editor is about.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModalPayload {
    #[default]
    Empty,
    NewTask {
        column_id: ColumnId,
    },
    Task {
        task_id: TaskId,
    },
    Column {
        column_id: ColumnId,
    },
    Confirm {
        message: String,
        action: ConfirmAction,
        target_id: String,
    },
}

/// Which editor dialog is open. Editors read this to pick a form and call
/// the board store themselves on submit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModalState {
    pub is_open: bool,
    pub kind: ModalKind,
    pub mode: ModalMode,
    pub payload: ModalPayload,
}

impl ModalState {
    pub fn open(&mut self, kind: ModalKind, mode: ModalMode, payload: ModalPayload) {
        self.is_open = true;
        self.kind = kind;
        self.mode = mode;
        self.payload = payload;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_showing(&self, kind: ModalKind) -> bool {
        self.is_open && self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let state = ModalState::default();
        assert!(!state.is_open);
        assert_eq!(state.kind, ModalKind::None);
        assert_eq!(state.payload, ModalPayload::Empty);
    }

    #[test]
    fn test_open_then_close() {
        let mut state = ModalState::default();
        state.open(
            ModalKind::Task,
            ModalMode::Edit,
            ModalPayload::Task {
                task_id: "t1".to_string(),
            },
        );
        assert!(state.is_showing(ModalKind::Task));
        assert!(!state.is_showing(ModalKind::Column));
        assert_eq!(state.mode, ModalMode::Edit);

        state.close();
        assert_eq!(state, ModalState::default());
    }

    #[test]
    fn test_open_replaces_previous_dialog() {
        let mut state = ModalState::default();
        state.open(
            ModalKind::Task,
            ModalMode::Create,
            ModalPayload::NewTask {
                column_id: "c1".to_string(),
            },
        );
        state.open(ModalKind::Settings, ModalMode::Edit, ModalPayload::Empty);

        assert_eq!(state.kind, ModalKind::Settings);
        assert_eq!(state.payload, ModalPayload::Empty);
    }
}
