//! Personal study assistant: vocabulary store, review scheduler and quiz.

pub mod commands;
pub mod config;
pub mod db;
pub mod quiz;
pub mod state;
pub mod terminal;

use crate::config::Config;
use crate::db::{DbError, SqliteRepository};
use crate::state::AppState;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Open the store described by `config`, creating the data directory.
///
/// Returns the state and, when the store had to be replaced because it was
/// unreadable, where the old file was moved.
pub fn open_app(config: &Config) -> Result<(AppState, Option<PathBuf>), DbError> {
    fs::create_dir_all(&config.data_dir)?;

    let db_path = config.db_path();
    info!(path = %db_path.display(), "opening store");
    let opened = SqliteRepository::open_or_recover(&db_path)?;
    if let Some(backup) = &opened.recovered_from {
        warn!(backup = %backup.display(), "previous store was unreadable and has been set aside");
    }

    let state = AppState::new(opened.repository, config.settings.clone());
    Ok((state, opened.recovered_from))
}
