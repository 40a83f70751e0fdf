//! Configuration: data directory and user settings.

use std::fs;
use std::path::{Path, PathBuf};
use study_core::Settings;
use tracing::{debug, warn};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "STUDY_DATA_DIR";
/// Database file name inside the data directory.
pub const DB_FILE: &str = "vocabulary.db";
/// Settings file name inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Resolve the data directory (flag, then environment, then platform
    /// default) and read its settings file.
    pub fn load(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        Self::from_dir(data_dir)
    }

    pub fn from_dir(data_dir: PathBuf) -> Self {
        let settings = read_settings(&data_dir.join(CONFIG_FILE));
        Self { data_dir, settings }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }
}

/// Platform data directory, falling back to the current directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("study-assistant")
}

/// Read settings from `path`. A missing file gives the defaults; an
/// unreadable one is reported and ignored.
pub fn read_settings(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Settings::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read settings, using defaults");
            return Settings::default();
        }
    };

    match toml::from_str::<Settings>(&content) {
        Ok(settings) => validate(settings),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed settings, using defaults");
            Settings::default()
        }
    }
}

fn validate(mut settings: Settings) -> Settings {
    let defaults = Settings::default();
    if settings.daily_reset_hour > 23 {
        warn!(value = settings.daily_reset_hour, "daily_reset_hour must be 0-23, using default");
        settings.daily_reset_hour = defaults.daily_reset_hour;
    }
    if settings.default_quiz_size == 0 {
        warn!("default_quiz_size must be at least 1, using default");
        settings.default_quiz_size = defaults.default_quiz_size;
    }
    if settings.interval_step_days == 0 {
        warn!("interval_step_days must be at least 1, using default");
        settings.interval_step_days = defaults.interval_step_days;
    }
    if settings.max_interval_days == 0 {
        warn!("max_interval_days must be at least 1, using default");
        settings.max_interval_days = defaults.max_interval_days;
    }
    settings
}
