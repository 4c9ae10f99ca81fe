//! Input checks applied before anything is sent to the remote store.

use kanban_core::{KanbanError, KanbanResult};

pub const MAX_BOARD_TITLE_LEN: usize = 100;
pub const MAX_COLUMN_TITLE_LEN: usize = 50;
pub const MAX_TASK_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_TAGS: usize = 5;

/// Trimmed title, rejected when blank or longer than `max_len` characters.
pub fn require_title(kind: &str, raw: &str, max_len: usize) -> KanbanResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(KanbanError::Validation(format!("{} title is required", kind)));
    }
    if title.chars().count() > max_len {
        return Err(KanbanError::Validation(format!(
            "{} title must be at most {} characters",
            kind, max_len
        )));
    }
    Ok(title.to_string())
}

pub fn require_color(raw: &str) -> KanbanResult<String> {
    let color = raw.trim();
    if color.is_empty() {
        return Err(KanbanError::Validation("Color is required".to_string()));
    }
    Ok(color.to_string())
}

/// Trim optional free text; blank text becomes `None`.
pub fn optional_text(raw: Option<String>, max_len: usize) -> KanbanResult<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if text.chars().count() > max_len {
        return Err(KanbanError::Validation(format!(
            "Text must be at most {} characters",
            max_len
        )));
    }
    Ok(Some(text.to_string()))
}

/// Trim tags, drop blanks and duplicates (first occurrence wins) and enforce
/// the tag limit.
pub fn normalize_tags(tags: Vec<String>) -> KanbanResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|t| t == tag) {
            continue;
        }
        normalized.push(tag.to_string());
    }
    if normalized.len() > MAX_TAGS {
        return Err(KanbanError::Validation(format!(
            "A task can have at most {} tags",
            MAX_TAGS
        )));
    }
    Ok(normalized)
}
