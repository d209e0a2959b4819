//! Daily tick schedule in one process-wide timezone.
//!
//! Pure date/time math for the tick loop: which tick fires next, what
//! "today" is, and which ticks a record missed while the process was down.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

use crate::{
    config::ScheduleConfig,
    error::StreakError,
    streak::{ChatRecord, Status, StreakEvent},
};

/// The two process-wide daily ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    StartOfDay,
    EndOfDay,
}

impl TickKind {
    pub fn event(self) -> StreakEvent {
        match self {
            Self::StartOfDay => StreakEvent::StartOfDay,
            Self::EndOfDay => StreakEvent::EndOfDay,
        }
    }
}

impl fmt::Display for TickKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartOfDay => write!(f, "start"),
            Self::EndOfDay => write!(f, "end"),
        }
    }
}

impl FromStr for TickKind {
    type Err = StreakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" | "start-of-day" => Ok(Self::StartOfDay),
            "end" | "end-of-day" => Ok(Self::EndOfDay),
            other => Err(StreakError::Config(format!(
                "unknown tick '{other}' (expected start or end)"
            ))),
        }
    }
}

/// Parsed tick times and timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySchedule {
    tz: Tz,
    start: NaiveTime,
    end: NaiveTime,
}

impl DaySchedule {
    pub fn new(tz: Tz, start: NaiveTime, end: NaiveTime) -> Result<Self, StreakError> {
        if end <= start {
            return Err(StreakError::Config(format!(
                "day_end ({end}) must be later than day_start ({start})"
            )));
        }
        Ok(Self { tz, start, end })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self, StreakError> {
        let tz: Tz = config
            .timezone
            .parse()
            .map_err(|_| StreakError::Config(format!("invalid timezone '{}'", config.timezone)))?;
        let start = parse_hhmm(&config.day_start, "day_start")?;
        let end = parse_hhmm(&config.day_end, "day_end")?;
        Self::new(tz, start, end)
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// The local wall-clock time of a tick.
    pub fn time_of(&self, kind: TickKind) -> NaiveTime {
        match kind {
            TickKind::StartOfDay => self.start,
            TickKind::EndOfDay => self.end,
        }
    }

    /// Calendar date of `now` in the configured timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// Resolve a local date and time to an instant.
    ///
    /// Ambiguous times (DST fall-back) take the earliest instant; times that
    /// do not exist (DST spring-forward) move to the first valid minute after.
    pub fn instant(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let mut local = date.and_time(time);
        for _ in 0..=180 {
            if let Some(t) = self.tz.from_local_datetime(&local).earliest() {
                return t.with_timezone(&Utc);
            }
            local += chrono::Duration::minutes(1);
        }
        // No zone has a gap longer than three hours; treat the time as UTC.
        Utc.from_utc_datetime(&date.and_time(time))
    }

    /// The next tick strictly after `now`.
    pub fn next_tick(&self, now: DateTime<Utc>) -> (TickKind, DateTime<Utc>) {
        let today = self.today(now);
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        [
            (TickKind::StartOfDay, self.instant(today, self.start)),
            (TickKind::EndOfDay, self.instant(today, self.end)),
            (TickKind::StartOfDay, self.instant(tomorrow, self.start)),
        ]
        .into_iter()
        .find(|(_, at)| *at > now)
        .unwrap_or((TickKind::StartOfDay, self.instant(tomorrow, self.start)))
    }

    /// Ticks a record missed while the process was not running, in order.
    ///
    /// 1. A cycle left open on an earlier day is closed.
    /// 2. Today's start tick is replayed once its time has passed.
    /// 3. Today's end tick is replayed once its time has passed.
    pub fn catch_up_events(&self, record: &ChatRecord, now: DateTime<Utc>) -> Vec<StreakEvent> {
        let today = self.today(now);
        let local_time = now.with_timezone(&self.tz).time();
        let mut events = Vec::new();
        let mut open = record.status != Status::Idle;
        let mut cycle = record.last_cycle_date;

        if open && cycle.map_or(true, |d| d < today) {
            events.push(StreakEvent::EndOfDay);
            open = false;
        }
        if local_time >= self.start && cycle != Some(today) {
            events.push(StreakEvent::StartOfDay);
            open = true;
            cycle = Some(today);
        }
        if local_time >= self.end && open && cycle == Some(today) {
            events.push(StreakEvent::EndOfDay);
        }
        events
    }
}

fn parse_hhmm(value: &str, field: &str) -> Result<NaiveTime, StreakError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| StreakError::Config(format!("invalid {field} '{value}' (expected HH:MM)")))
}
