pub mod board;
pub mod column;
pub mod drag;
pub mod export;
pub mod palette;
pub mod prefs;
pub mod task;
