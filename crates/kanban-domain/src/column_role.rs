use serde::{Deserialize, Serialize};

/// What a column means for progress reporting.
///
/// Boards carry no explicit status field, so the role is derived from the
/// column title. Keep the title heuristics here rather than at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Open,
    Done,
}

const DONE_MARKERS: [&str; 4] = ["done", "feito", "concluí", "conclui"];

impl ColumnRole {
    pub fn classify(title: &str) -> Self {
        let title = title.to_lowercase();
        if DONE_MARKERS.iter().any(|marker| title.contains(marker)) {
            ColumnRole::Done
        } else {
            ColumnRole::Open
        }
    }

    pub fn is_done(self) -> bool {
        self == ColumnRole::Done
    }
}
