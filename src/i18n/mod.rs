//! Internationalization: localized strings for bot command responses.
//!
//! Uses a simple `t(key, lang)` function for static strings and
//! `format_*()` helpers for strings with interpolation.
//! Supported languages: Russian (default), Ukrainian, English (fallback for
//! unknown codes).

mod format;


pub use format::*;

/// Language codes accepted by `/lang`.
pub const SUPPORTED: [&str; 3] = ["ru", "ua", "en"];

/// Whether `code` is a supported language code.
pub fn is_supported(code: &str) -> bool {
    SUPPORTED.contains(&code)
}

/// Return a localized static string for `key` in the given `lang`.
/// Falls back to English for unknown languages.
pub fn t(key: &str, lang: &str) -> &'static str {
    match key {
        "help" => match lang {
            "ru" => "<b>Команды бота:</b>\n\
                     /help — список команд\n\
                     /streak — показать стрик\n\
                     /set X — установить стрик\n\
                     /reset — сбросить стрик\n\
                     /toggle_deletes — включить/выключить автоудаление сервисных сообщений\n\
                     /lang ru|ua|en — язык бота",
            "ua" => "<b>Команди бота:</b>\n\
                     /help — список команд\n\
                     /streak — показати стрик\n\
                     /set X — встановити стрик\n\
                     /reset — скинути стрик\n\
                     /toggle_deletes — увімкнути/вимкнути авто‑видалення сервісних повідомлень\n\
                     /lang ru|ua|en — мова бота",
            _ => "<b>Bot commands:</b>\n\
                  /help — list commands\n\
                  /streak — show streak\n\
                  /set X — set streak\n\
                  /reset — reset streak\n\
                  /toggle_deletes — enable/disable service message auto-delete\n\
                  /lang ru|ua|en — bot language",
        },
        "deletes_on" => match lang {
            "ru" => "Авто‑удаление сервисных сообщений: <b>включено</b>",
            "ua" => "Авто‑видалення сервісних повідомлень: <b>увімкнено</b>",
            _ => "Service auto-delete: <b>enabled</b>",
        },
        "deletes_off" => match lang {
            "ru" => "Авто‑удаление сервисных сообщений: <b>выключено</b>",
            "ua" => "Авто‑видалення сервісних повідомлень: <b>вимкнено</b>",
            _ => "Service auto-delete: <b>disabled</b>",
        },
        "admin_only" => match lang {
            "ru" => "Эта команда доступна только администраторам.",
            "ua" => "Ця команда доступна лише адміністраторам.",
            _ => "Only administrators can use this command.",
        },
        "set_usage" => match lang {
            "ru" => "Использование: /set 10",
            "ua" => "Використання: /set 10",
            _ => "Usage: /set 10",
        },
        "lang_usage" => match lang {
            "ru" => "Использование: /lang ru|ua|en",
            "ua" => "Використання: /lang ru|ua|en",
            _ => "Usage: /lang ru|ua|en",
        },
        "streak_reset" => match lang {
            "ru" => "Стрик сброшен.",
            "ua" => "Стрик скинуто.",
            _ => "Streak reset.",
        },
        "language_set" => match lang {
            "ru" => "Язык: русский",
            "ua" => "Мова: українська",
            _ => "Language: English",
        },
        "command_failed" => match lang {
            "ru" => "Не удалось сохранить изменения, попробуйте позже.",
            "ua" => "Не вдалося зберегти зміни, спробуйте пізніше.",
            _ => "Could not save the change, please try again later.",
        },
        "status_idle" => match lang {
            "ru" => "ожидание нового дня",
            "ua" => "очікування нового дня",
            _ => "waiting for the next day",
        },
        "status_waiting" => match lang {
            "ru" => "сегодня ещё никто не писал",
            "ua" => "сьогодні ще ніхто не писав",
            _ => "nobody has written today yet",
        },
        "status_confirmed" => match lang {
            "ru" => "сегодня засчитан",
            "ua" => "сьогодні зараховано",
            _ => "today counted",
        },
        _ => "???",
    }
}
