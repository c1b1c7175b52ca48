//! Daily slot enumeration.
//!
//! Walks the provider's working-hours window in steps of the meeting duration,
//! pins each step to the reference date in the provider timezone, and labels
//! the resulting instant for the visitor.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{format_hhmm, SlotSchedule};
use crate::dst;

const LABEL_FORMAT: &str = "%-I:%M %p";

/// One bookable meeting start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// The provider-local date the slot was generated for.
    pub provider_date: NaiveDate,
    /// Provider wall-clock start, `HH:MM` 24-hour.
    pub provider_time: String,
    /// Provider wall-clock start, 12-hour (`8:00 AM`).
    pub provider_label: String,
    /// The same instant in the visitor's timezone, 12-hour.
    pub local_label: String,
    /// The visitor-local date of the instant. Differs from the reference date
    /// when the timezone offset pushes the label across midnight.
    pub local_date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Minute offsets (past provider midnight) at which slots start.
///
/// Steps from `window_start` by `duration` while a whole meeting still fits
/// before `window_end`. Returns an empty list for an empty window or a zero
/// duration.
pub fn slot_offsets(window_start: u32, window_end: u32, duration: u32) -> Vec<u32> {
    let mut offsets = Vec::new();
    if duration == 0 {
        return offsets;
    }

    let mut current = window_start;
    while current + duration <= window_end {
        offsets.push(current);
        current += duration;
    }
    offsets
}

/// Generate the slots offered on `reference_date`, labelled for `visitor_tz`.
///
/// The visitor timezone affects labels only: the number of slots and their
/// provider times are the same for every visitor. Slots that a DST gap makes
/// nonexistent are shifted forward rather than dropped (see [`dst`]).
pub fn generate_daily_slots(
    schedule: &SlotSchedule,
    visitor_tz: Tz,
    reference_date: NaiveDate,
) -> Vec<TimeSlot> {
    let provider_tz = schedule.provider_tz();
    let duration = Duration::minutes(schedule.duration() as i64);

    let slots: Vec<TimeSlot> = slot_offsets(
        schedule.window_start(),
        schedule.window_end(),
        schedule.duration(),
    )
    .into_iter()
    .map(|offset| {
        let wall_clock = minutes_to_time(offset);
        let naive = reference_date.and_time(wall_clock);

        if dst::is_in_gap(&provider_tz, &naive) {
            warn!(
                date = %reference_date,
                time = %format_hhmm(offset),
                timezone = %provider_tz,
                "slot falls in a DST gap; shifting forward"
            );
        }

        let start = dst::resolve_local(&provider_tz, &naive, schedule.dst_policy())
            .with_timezone(&Utc);
        let local = start.with_timezone(&visitor_tz);

        TimeSlot {
            provider_date: reference_date,
            provider_time: format_hhmm(offset),
            provider_label: wall_clock.format(LABEL_FORMAT).to_string(),
            local_label: local.format(LABEL_FORMAT).to_string(),
            local_date: local.date_naive(),
            start,
            end: start + duration,
        }
    })
    .collect();

    debug!(
        date = %reference_date,
        visitor = %visitor_tz,
        count = slots.len(),
        "generated daily slots"
    );

    slots
}

/// Find the slot starting at provider time `provider_time` (`HH:MM`).
pub fn find_slot<'a>(slots: &'a [TimeSlot], provider_time: &str) -> Option<&'a TimeSlot> {
    slots.iter().find(|s| s.provider_time == provider_time)
}

fn minutes_to_time(minutes: u32) -> NaiveTime {
    // Slot starts are always before the end of the window, which is at most 24:00.
    NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0).unwrap_or(NaiveTime::MIN)
}
