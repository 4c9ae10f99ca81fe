mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("KANBAN_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::output_error(&output::error_message(&e));
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "kanban", &mut std::io::stdout());
        return Ok(());
    }
    if let Commands::Palette = cli.command {
        handlers::palette::handle();
        return Ok(());
    }

    let file_path = cli
        .file
        .ok_or_else(|| anyhow::anyhow!("--file is required (or set KANBAN_FILE)"))?;

    if let Commands::Prefs(prefs_cmd) = cli.command {
        let prefs_path = handlers::prefs::prefs_path(&file_path);
        return handlers::prefs::handle(&prefs_path, prefs_cmd.action).await;
    }

    let ctx = CliContext::load(&file_path, &cli.owner).await?;

    match cli.command {
        Commands::Board(board_cmd) => handlers::board::handle(&ctx, board_cmd.action).await?,
        Commands::Column(column_cmd) => handlers::column::handle(&ctx, column_cmd.action).await?,
        Commands::Task(task_cmd) => handlers::task::handle(&ctx, task_cmd.action).await?,
        Commands::Drag { active, over } => handlers::drag::handle(&ctx, active, over).await?,
        Commands::Palette | Commands::Prefs(_) | Commands::Completions { .. } => {}
    }

    Ok(())
}
