//! Per-chat streak state machine.
//!
//! Three events drive a day: the start-of-day tick arms the cycle, the first
//! qualifying message confirms it, and the end-of-day tick penalizes silence.
//! Administrative overrides set or reset the counter directly. Transitions are
//! pure: the only notion of time is the `today` date passed in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::title::Glyph;

/// Where a chat is within the current day cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No cycle is open.
    #[default]
    Idle,
    /// Start-of-day fired, no qualifying message yet.
    Waiting,
    /// A qualifying message already counted for this cycle.
    Confirmed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Confirmed => "confirmed",
        }
    }
}

/// Persisted per-chat state.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Consecutive qualifying days.
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub status: Status,
    /// Chat title without any streak suffix, captured lazily.
    #[serde(default)]
    pub base_title: Option<String>,
    /// Date of the last accepted start-of-day tick.
    #[serde(default)]
    pub last_cycle_date: Option<NaiveDate>,
    /// Reply language code; `None` uses the process default.
    #[serde(default)]
    pub language: Option<String>,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakEvent {
    QualifyingMessage,
    StartOfDay,
    EndOfDay,
    AdminSet(u32),
    AdminReset,
}

/// Whether the chat title must be re-rendered after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleDirective {
    None,
    Render { streak: u32, glyph: Glyph },
}

impl TitleDirective {
    fn render(streak: u32, glyph: Glyph) -> Self {
        Self::Render { streak, glyph }
    }
}

/// Apply one event to a record.
pub fn transition(
    record: &ChatRecord,
    event: StreakEvent,
    today: NaiveDate,
) -> (ChatRecord, TitleDirective) {
    let mut next = record.clone();

    let directive = match event {
        StreakEvent::StartOfDay => {
            if record.last_cycle_date == Some(today) {
                // Duplicate delivery for the same day.
                TitleDirective::None
            } else {
                next.status = Status::Waiting;
                next.last_cycle_date = Some(today);
                if next.streak > 0 {
                    TitleDirective::render(next.streak, Glyph::Waiting)
                } else {
                    TitleDirective::render(0, Glyph::Inactive)
                }
            }
        }
        StreakEvent::QualifyingMessage => match record.status {
            Status::Waiting => {
                next.status = Status::Confirmed;
                next.streak = record.streak.saturating_add(1);
                TitleDirective::render(next.streak, Glyph::Active)
            }
            // Already counted, or no cycle open yet.
            Status::Confirmed | Status::Idle => TitleDirective::None,
        },
        StreakEvent::EndOfDay => match record.status {
            Status::Waiting => {
                next.status = Status::Idle;
                next.streak = 0;
                TitleDirective::render(0, Glyph::Inactive)
            }
            Status::Confirmed => {
                next.status = Status::Idle;
                TitleDirective::None
            }
            Status::Idle => TitleDirective::None,
        },
        StreakEvent::AdminSet(value) => {
            next.status = Status::Idle;
            next.streak = value;
            if value > 0 {
                TitleDirective::render(value, Glyph::Active)
            } else {
                TitleDirective::render(0, Glyph::Inactive)
            }
        }
        StreakEvent::AdminReset => {
            next.status = Status::Idle;
            next.streak = 0;
            TitleDirective::render(0, Glyph::Inactive)
        }
    };

    (next, directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(streak: u32, status: Status) -> ChatRecord {
        ChatRecord {
            streak,
            status,
            ..Default::default()
        }
    }

    #[test]
    fn test_start_of_day_arms_cycle() {
        let (next, directive) =
            transition(&record(3, Status::Idle), StreakEvent::StartOfDay, day("2024-01-02"));
        assert_eq!(next.streak, 3);
        assert_eq!(next.status, Status::Waiting);
        assert_eq!(next.last_cycle_date, Some(day("2024-01-02")));
        assert_eq!(
            directive,
            TitleDirective::Render {
                streak: 3,
                glyph: Glyph::Waiting
            }
        );
    }

    #[test]
    fn test_message_after_start_confirms_and_increments() {
        let today = day("2024-01-02");
        let (armed, _) = transition(&record(3, Status::Idle), StreakEvent::StartOfDay, today);
        let (next, directive) = transition(&armed, StreakEvent::QualifyingMessage, today);
        assert_eq!(next.streak, 4);
        assert_eq!(next.status, Status::Confirmed);
        assert_eq!(
            directive,
            TitleDirective::Render {
                streak: 4,
                glyph: Glyph::Active
            }
        );
    }

    #[test]
    fn test_second_message_is_noop() {
        let today = day("2024-01-02");
        let confirmed = record(4, Status::Confirmed);
        let (next, directive) = transition(&confirmed, StreakEvent::QualifyingMessage, today);
        assert_eq!(next, confirmed);
        assert_eq!(directive, TitleDirective::None);
    }

    #[test]
    fn test_message_before_start_does_not_confirm() {
        let today = day("2024-01-02");
        let idle = record(2, Status::Idle);
        let (next, directive) = transition(&idle, StreakEvent::QualifyingMessage, today);
        assert_eq!(next.status, Status::Idle);
        assert_eq!(next.streak, 2);
        assert_eq!(directive, TitleDirective::None);

        // The later start tick leaves the day waiting; the early message did not count.
        let (armed, _) = transition(&next, StreakEvent::StartOfDay, today);
        assert_eq!(armed.status, Status::Waiting);
        assert_eq!(armed.streak, 2);
    }

    #[test]
    fn test_silent_day_resets() {
        let (next, directive) =
            transition(&record(5, Status::Waiting), StreakEvent::EndOfDay, day("2024-01-02"));
        assert_eq!(next.streak, 0);
        assert_eq!(next.status, Status::Idle);
        assert_eq!(
            directive,
            TitleDirective::Render {
                streak: 0,
                glyph: Glyph::Inactive
            }
        );
    }

    #[test]
    fn test_confirmed_day_keeps_streak() {
        let (next, directive) =
            transition(&record(5, Status::Confirmed), StreakEvent::EndOfDay, day("2024-01-02"));
        assert_eq!(next.streak, 5);
        assert_eq!(next.status, Status::Idle);
        assert_eq!(directive, TitleDirective::None);
    }

    #[test]
    fn test_end_of_day_on_idle_is_noop() {
        let idle = record(5, Status::Idle);
        let (next, directive) = transition(&idle, StreakEvent::EndOfDay, day("2024-01-02"));
        assert_eq!(next, idle);
        assert_eq!(directive, TitleDirective::None);
    }

    #[test]
    fn test_duplicate_start_tick_ignored() {
        let today = day("2024-01-02");
        let (first, _) = transition(&record(1, Status::Idle), StreakEvent::StartOfDay, today);
        let (confirmed, _) = transition(&first, StreakEvent::QualifyingMessage, today);

        let (again, directive) = transition(&confirmed, StreakEvent::StartOfDay, today);
        assert_eq!(again, confirmed);
        assert_eq!(directive, TitleDirective::None);
    }

    #[test]
    fn test_start_with_zero_streak_renders_inactive() {
        let (next, directive) =
            transition(&ChatRecord::default(), StreakEvent::StartOfDay, day("2024-01-02"));
        assert_eq!(next.status, Status::Waiting);
        assert_eq!(
            directive,
            TitleDirective::Render {
                streak: 0,
                glyph: Glyph::Inactive
            }
        );
    }

    #[test]
    fn test_admin_set() {
        let today = day("2024-01-02");
        let (next, directive) =
            transition(&record(2, Status::Waiting), StreakEvent::AdminSet(10), today);
        assert_eq!(next.streak, 10);
        assert_eq!(next.status, Status::Idle);
        assert_eq!(
            directive,
            TitleDirective::Render {
                streak: 10,
                glyph: Glyph::Active
            }
        );

        let (zero, directive) =
            transition(&record(7, Status::Confirmed), StreakEvent::AdminSet(0), today);
        assert_eq!(zero.streak, 0);
        assert_eq!(zero.status, Status::Idle);
        assert_eq!(
            directive,
            TitleDirective::Render {
                streak: 0,
                glyph: Glyph::Inactive
            }
        );
    }

    #[test]
    fn test_admin_reset_keeps_cycle_date() {
        let today = day("2024-01-02");
        let mut rec = record(9, Status::Confirmed);
        rec.last_cycle_date = Some(today);
        let (next, _) = transition(&rec, StreakEvent::AdminReset, today);
        assert_eq!(next.streak, 0);
        assert_eq!(next.status, Status::Idle);
        assert_eq!(next.last_cycle_date, Some(today));
    }

    #[test]
    fn test_increment_saturates() {
        let today = day("2024-01-02");
        let (next, _) = transition(
            &record(u32::MAX, Status::Waiting),
            StreakEvent::QualifyingMessage,
            today,
        );
        assert_eq!(next.streak, u32::MAX);
    }

    #[test]
    fn test_multi_day_sequence() {
        let mut rec = ChatRecord::default();
        let days = ["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-04"];
        let active = [true, true, false, true];
        let mut history = Vec::new();
        for (d, spoke) in days.iter().zip(active) {
            let today = day(d);
            rec = transition(&rec, StreakEvent::StartOfDay, today).0;
            if spoke {
                rec = transition(&rec, StreakEvent::QualifyingMessage, today).0;
                rec = transition(&rec, StreakEvent::QualifyingMessage, today).0;
            }
            rec = transition(&rec, StreakEvent::EndOfDay, today).0;
            history.push(rec.streak);
        }
        assert_eq!(history, vec![1, 2, 0, 1]);
        assert_eq!(rec.status, Status::Idle);
    }

    #[test]
    fn test_record_json_defaults() {
        let rec: ChatRecord = serde_json::from_str(r#"{"streak": 4}"#).unwrap();
        assert_eq!(rec.streak, 4);
        assert_eq!(rec.status, Status::Idle);
        assert!(rec.base_title.is_none());
        assert!(rec.last_cycle_date.is_none());

        let rec: ChatRecord = serde_json::from_str(
            r#"{"streak": 1, "status": "waiting", "last_cycle_date": "2024-01-02"}"#,
        )
        .unwrap();
        assert_eq!(rec.status, Status::Waiting);
        assert_eq!(rec.last_cycle_date, Some(day("2024-01-02")));
    }
}
