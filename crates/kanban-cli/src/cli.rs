use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")");

#[derive(Parser)]
#[command(name = "kanban")]
#[command(about = "Drive a kanban board from the command line", long_about = None)]
#[command(version, long_version = LONG_VERSION)]
pub struct Cli {
    /// Path to the board tables file (or set KANBAN_FILE env var)
    #[arg(long, value_name = "FILE", env = "KANBAN_FILE", global = true)]
    pub file: Option<String>,

    /// Owner whose board is loaded or created
    #[arg(long, env = "KANBAN_OWNER", default_value = "local", global = true)]
    pub owner: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Board operations
    Board(BoardCommand),
    /// Column operations
    Column(ColumnCommand),
    /// Task operations
    Task(TaskCommand),
    /// Apply a finished drag: drop ACTIVE onto OVER
    Drag {
        /// Id of the dragged task or column
        active: String,
        /// Id of the task or column it was dropped on; omit for a drop outside
        over: Option<String>,
    },
    /// List the pastel colours; their names are accepted wherever --color is
    Palette,
    /// Client-local preferences stored next to the board file
    Prefs(PrefsCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Board commands
#[derive(Args)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Print the whole board
    Show,
    /// Change the board title
    Rename {
        #[arg(long)]
        title: String,
    },
    /// Task counts per state
    Stats,
    /// Write the board to a JSON file
    Export {
        /// Destination; defaults to kanban-board-<date>.json in the current directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check that a file is an exported board
    Import { path: PathBuf },
}

// Column commands
#[derive(Args)]
pub struct ColumnCommand {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Append a column
    Add {
        #[arg(long)]
        title: String,
        /// Hex color (e.g. #FFD6E0) or palette name (e.g. Pink)
        #[arg(long)]
        color: Option<String>,
    },
    /// Change a column's title or color
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Hex color or palette name
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a column and its tasks
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Put columns in the given order
    Reorder {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },
}

// Task commands
#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the end of a column
    Add(TaskAddArgs),
    /// Edit a task's fields
    Update(TaskUpdateArgs),
    /// Delete a task
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Move a task to a position in a column
    Move {
        #[arg(long)]
        id: String,
        /// Column the task is in now
        #[arg(long)]
        from: String,
        /// Destination column
        #[arg(long)]
        to: String,
        /// Zero-based index in the destination; clamped to the column length
        #[arg(long)]
        index: usize,
    },
}

#[derive(Args)]
pub struct TaskAddArgs {
    #[arg(long)]
    pub column_id: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// low, medium or high
    #[arg(long)]
    pub priority: Option<String>,
    /// YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub due_date: Option<String>,
    /// Hex color or palette name
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
    #[arg(long)]
    pub assignee: Option<String>,
}

#[derive(Args)]
pub struct TaskUpdateArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    #[arg(long)]
    pub clear_description: bool,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long, conflicts_with = "clear_due_date")]
    pub due_date: Option<String>,
    #[arg(long)]
    pub clear_due_date: bool,
    #[arg(long)]
    pub color: Option<String>,
    /// Replaces all tags; pass an empty value to remove them
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
    #[arg(long, conflicts_with = "clear_assignee")]
    pub assignee: Option<String>,
    #[arg(long)]
    pub clear_assignee: bool,
}

// Preference commands
#[derive(Args)]
pub struct PrefsCommand {
    #[command(subcommand)]
    pub action: PrefsAction,
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Print the stored preferences
    Show,
    /// Record the notification permission
    Permission {
        #[arg(value_parser = ["granted", "denied", "default"])]
        value: String,
    },
    /// Record the day the daily summary was last shown
    Notified {
        /// YYYY-MM-DD; defaults to today (UTC)
        #[arg(long)]
        date: Option<String>,
    },
}
