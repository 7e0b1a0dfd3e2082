use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const SLOT_FORMAT: &str = "%H:%M";
const LONG_DATE_FORMAT: &str = "%A, %B %-d, %Y";
const HOURS_FORMAT: &str = "%-I:%M %p";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("opening time {opening} is after closing time {closing}")]
    OpeningAfterClosing {
        opening: NaiveTime,
        closing: NaiveTime,
    },
    #[error("slot interval must be between 1 and 1439 minutes, got {0}")]
    InvalidInterval(i64),
    #[error("lead time must not be negative, got {0} hours")]
    NegativeLeadTime(i64),
}

/// Service hours during which tables can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    opening: NaiveTime,
    closing: NaiveTime,
    interval: Duration,
    lead_time: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            opening: clock_time(17, 0),
            closing: clock_time(21, 30),
            interval: Duration::minutes(15),
            lead_time: Duration::hours(2),
        }
    }
}

fn clock_time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

impl Schedule {
    pub fn new(
        opening: NaiveTime,
        closing: NaiveTime,
        interval_minutes: i64,
        lead_time_hours: i64,
    ) -> Result<Self, ScheduleError> {
        if opening > closing {
            return Err(ScheduleError::OpeningAfterClosing { opening, closing });
        }
        if !(1..24 * 60).contains(&interval_minutes) {
            return Err(ScheduleError::InvalidInterval(interval_minutes));
        }
        if lead_time_hours < 0 {
            return Err(ScheduleError::NegativeLeadTime(lead_time_hours));
        }
        Ok(Self {
            opening,
            closing,
            interval: Duration::minutes(interval_minutes),
            lead_time: Duration::hours(lead_time_hours),
        })
    }

    pub fn opening(&self) -> NaiveTime {
        self.opening
    }

    /// Every slot start from opening to closing, both inclusive.
    pub fn slot_times(&self) -> Vec<NaiveTime> {
        let mut slots = vec![];
        let mut slot = self.opening;
        loop {
            slots.push(slot);
            let (next, wrapped) = slot.overflowing_add_signed(self.interval);
            if wrapped != 0 || next > self.closing {
                break;
            }
            slot = next;
        }
        slots
    }

    pub fn hours_label(&self) -> String {
        format!(
            "Seating daily: {} - {}",
            self.opening.format(HOURS_FORMAT),
            self.closing.format(HOURS_FORMAT)
        )
    }
}

/// The date and slot a new draft starts out with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateTimeSelection {
    pub date: String,
    pub time: String,
}

/// Strict `YYYY-MM-DD` parsing. No date for empty or malformed input.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Like [`parse_calendar_date`], but an empty value means `today`.
pub fn parse_local_date(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    if value.trim().is_empty() {
        return Some(today);
    }
    parse_calendar_date(value)
}

pub fn format_long_date(value: &str, today: NaiveDate) -> String {
    match parse_local_date(value, today) {
        Some(date) => date.format(LONG_DATE_FORMAT).to_string(),
        None => value.to_string(),
    }
}

pub fn generate_time_slots(value: &str, schedule: &Schedule) -> Vec<String> {
    if parse_calendar_date(value).is_none() {
        return vec![];
    }
    schedule
        .slot_times()
        .into_iter()
        .map(|slot| slot.format(SLOT_FORMAT).to_string())
        .collect()
}

pub fn compute_default_date_time(now: NaiveDateTime, schedule: &Schedule) -> DateTimeSelection {
    let target = now + schedule.lead_time;
    let (date, time) = if target.time() < schedule.opening {
        (target.date(), schedule.opening)
    } else {
        match schedule
            .slot_times()
            .into_iter()
            .find(|slot| *slot >= target.time())
        {
            Some(slot) => (target.date(), slot),
            None => (
                target.date().succ_opt().unwrap_or(target.date()),
                schedule.opening,
            ),
        }
    };
    DateTimeSelection {
        date: date.format(DATE_FORMAT).to_string(),
        time: time.format(SLOT_FORMAT).to_string(),
    }
}
