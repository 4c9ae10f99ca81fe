//! Import result model.

use serde::{Deserialize, Serialize};

/// What an accepted import file contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub board_id: String,
    pub title: String,
    pub columns: usize,
    /// Tasks found in the `tasks` map; zero when the map is absent.
    pub tasks: usize,
}
