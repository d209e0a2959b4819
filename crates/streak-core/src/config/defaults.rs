//! Default value functions used by serde for config deserialization.

pub fn default_data_dir() -> String {
    "~/.streak".to_string()
}

pub fn default_store_file() -> String {
    "state.json".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_language() -> String {
    "ru".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_timezone() -> String {
    "UTC".to_string()
}

pub fn default_day_start() -> String {
    "00:01".to_string()
}

pub fn default_day_end() -> String {
    "23:59".to_string()
}

pub fn default_active_glyph() -> String {
    "\u{1f525}".to_string()
}

pub fn default_waiting_glyph() -> String {
    "\u{23f3}".to_string()
}

pub fn default_inactive_glyph() -> String {
    "\u{1f9ca}".to_string()
}

pub fn default_rename_concurrency() -> usize {
    4
}

pub fn default_rename_timeout_secs() -> u64 {
    10
}

pub fn default_flush_retry_secs() -> u64 {
    30
}
