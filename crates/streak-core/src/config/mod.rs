mod defaults;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::StreakError;
use defaults::*;

/// Environment variable consulted when `telegram.bot_token` is empty.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Top-level streak configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub glyphs: GlyphConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// State snapshot file name, relative to `data_dir` unless absolute.
    #[serde(default = "default_store_file")]
    pub store_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Language used for chats that never picked one (`ru`, `ua`, `en`).
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_file: default_store_file(),
            log_level: default_log_level(),
            language: default_language(),
        }
    }
}

impl StreakConfig {
    /// Absolute path of the state snapshot.
    pub fn store_path(&self) -> PathBuf {
        let file = shellexpand(&self.store_file);
        if Path::new(&file).is_absolute() {
            return PathBuf::from(file);
        }
        PathBuf::from(shellexpand(&self.data_dir)).join(file)
    }
}

/// Daily tick times, all interpreted in one process-wide timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// IANA timezone name (e.g. "Europe/Kyiv").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Start-of-day tick, "HH:MM".
    #[serde(default = "default_day_start")]
    pub day_start: String,
    /// End-of-day tick, "HH:MM". Must be later than `day_start`.
    #[serde(default = "default_day_end")]
    pub day_end: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            day_start: default_day_start(),
            day_end: default_day_end(),
        }
    }
}

/// Status glyphs embedded in chat titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlyphConfig {
    #[serde(default = "default_active_glyph")]
    pub active: String,
    #[serde(default = "default_waiting_glyph")]
    pub waiting: String,
    #[serde(default = "default_inactive_glyph")]
    pub inactive: String,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            active: default_active_glyph(),
            waiting: default_waiting_glyph(),
            inactive: default_inactive_glyph(),
        }
    }
}

/// Title synchronization and persistence retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum concurrent renames during a tick batch.
    #[serde(default = "default_rename_concurrency")]
    pub rename_concurrency: usize,
    #[serde(default = "default_rename_timeout_secs")]
    pub rename_timeout_secs: u64,
    /// How often a failed snapshot write is retried.
    #[serde(default = "default_flush_retry_secs")]
    pub flush_retry_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            rename_concurrency: default_rename_concurrency(),
            rename_timeout_secs: default_rename_timeout_secs(),
            flush_retry_secs: default_flush_retry_secs(),
        }
    }
}

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: String::new(),
        }
    }
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), StreakError> {
        crate::schedule::DaySchedule::from_config(&self.schedule)?;
        crate::title::TitleCodec::new(&self.glyphs)?;
        if self.sync.rename_concurrency == 0 {
            return Err(StreakError::Config(
                "sync.rename_concurrency must be at least 1".into(),
            ));
        }
        if self.sync.rename_timeout_secs == 0 {
            return Err(StreakError::Config(
                "sync.rename_timeout_secs must be at least 1".into(),
            ));
        }
        if !matches!(self.streak.language.as_str(), "ru" | "ua" | "en") {
            return Err(StreakError::Config(format!(
                "unsupported language '{}' (expected ru, ua or en)",
                self.streak.language
            )));
        }
        Ok(())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. An empty bot token is
/// filled from `TELEGRAM_BOT_TOKEN` when that variable is set.
pub fn load(path: &str) -> Result<Config, StreakError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StreakError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str::<Config>(&content)
            .map_err(|e| StreakError::Config(format!("failed to parse config: {}", e)))?
    } else {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    if config.telegram.bot_token.is_empty() {
        if let Ok(token) = std::env::var(BOT_TOKEN_ENV) {
            config.telegram.bot_token = token;
        }
    }

    Ok(config)
}
