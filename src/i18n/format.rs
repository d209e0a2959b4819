//! Format helpers for strings with interpolation.

use super::t;
use streak_core::streak::Status;

/// Format the `/streak` reply.
pub fn streak_show(lang: &str, streak: u32, status: Status) -> String {
    let status_text = match status {
        Status::Idle => t("status_idle", lang),
        Status::Waiting => t("status_waiting", lang),
        Status::Confirmed => t("status_confirmed", lang),
    };
    match lang {
        "ru" => format!("Текущий стрик: <b>{streak}</b> ({status_text})"),
        "ua" => format!("Поточний стрик: <b>{streak}</b> ({status_text})"),
        _ => format!("Current streak: <b>{streak}</b> ({status_text})"),
    }
}

/// Format the `/set` confirmation.
pub fn streak_set(lang: &str, value: u32) -> String {
    match lang {
        "ru" => format!("Стрик установлен на {value}"),
        "ua" => format!("Стрик встановлено на {value}"),
        _ => format!("Streak set to {value}"),
    }
}
