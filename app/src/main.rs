//! Folio - Document editor application
//!
//! Loads the workspace from the data directory, prints the document sidebar
//! and the active document's statistics, and writes the workspace back.
//! Autosave runs in the background while the app is up.

use anyhow::anyhow;
use folio::{commands, AppState};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the data directory
const DATA_DIR_ENV: &str = "FOLIO_DATA_DIR";
const DEFAULT_DATA_DIR: &str = ".folio";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Folio");

    let data_dir = std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    tracing::info!("Data directory: {:?}", data_dir);

    let state = AppState::open(&data_dir)?;
    let autosave_task = state.start_autosave();

    print_sidebar(&state)?;
    print_active_stats(&state)?;

    if let Some(task) = autosave_task {
        task.abort();
    }
    if commands::save_workspace(&state).await.map_err(|e| anyhow!(e))? {
        tracing::info!("Workspace saved to {:?}", state.workspace_path());
    }
    Ok(())
}

fn print_sidebar(state: &AppState) -> anyhow::Result<()> {
    let entries = commands::list_sidebar(state).map_err(|e| anyhow!(e))?;
    println!("Documents");
    for entry in entries {
        let marker = if entry.is_active { '*' } else { ' ' };
        let indent = "  ".repeat(entry.depth);
        match entry.words {
            Some(words) => println!("{marker} {indent}{} ({words} words)", entry.title),
            None => println!("{marker} {indent}{}/", entry.title),
        }
    }
    Ok(())
}

fn print_active_stats(state: &AppState) -> anyhow::Result<()> {
    let Some(stats) = commands::get_active_stats(state).map_err(|e| anyhow!(e))? else {
        println!("\nNo document open");
        return Ok(());
    };
    println!(
        "\n{} words · {} characters · {} min read · health {}/100",
        stats.words, stats.characters, stats.reading_minutes, stats.health
    );
    Ok(())
}
