//! Resolving provider wall-clock times across DST transitions.
//!
//! A slot is defined as a wall-clock time in the provider's timezone. Twice a
//! year that wall-clock time either does not exist (spring forward) or exists
//! twice (fall back). Slots are never dropped: a time inside a gap is shifted
//! forward past it, and a repeated time picks one occurrence per [`DstPolicy`].

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Longest span searched backwards for the offset in force before a gap.
/// Real-world gaps are at most a day (Samoa skipped 2011-12-30).
const MAX_GAP_PROBE_HOURS: i64 = 48;

/// Policy for wall-clock times repeated by a fall-back transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Use the first occurrence (the pre-transition, summer offset).
    #[default]
    Earlier,
    /// Use the second occurrence (the post-transition, winter offset).
    Later,
}

/// Map a provider-local wall-clock time to an absolute instant.
///
/// Times inside a spring-forward gap are interpreted with the offset in force
/// before the gap, which moves them forward by the gap length (01:30 in
/// Europe/London on the last Sunday of March becomes 02:30 BST).
pub fn resolve_local(tz: &Tz, naive: &NaiveDateTime, policy: DstPolicy) -> DateTime<Tz> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earlier, later) => match policy {
            DstPolicy::Earlier => earlier,
            DstPolicy::Later => later,
        },
        LocalResult::None => shift_past_gap(tz, naive),
    }
}

/// Whether `naive` falls inside a spring-forward gap in `tz`.
pub fn is_in_gap(tz: &Tz, naive: &NaiveDateTime) -> bool {
    matches!(tz.from_local_datetime(naive), LocalResult::None)
}

fn shift_past_gap(tz: &Tz, naive: &NaiveDateTime) -> DateTime<Tz> {
    // Find the UTC offset that applied just before the gap opened.
    let offset_seconds = (1..=MAX_GAP_PROBE_HOURS)
        .find_map(|hours| {
            tz.from_local_datetime(&(*naive - Duration::hours(hours)))
                .earliest()
                .map(|dt| dt.offset().fix().local_minus_utc())
        })
        .unwrap_or(0);

    let utc_naive = *naive - Duration::seconds(offset_seconds as i64);
    tz.from_utc_datetime(&utc_naive)
}
