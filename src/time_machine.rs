//! Time-machine recall.
//!
//! Partitions a couple's memories into three windows relative to today:
//! anniversaries of today's month/day from earlier years, the exact day one
//! calendar month ago, and a ±3-day window around that day. The two
//! month-ago buckets are disjoint by construction; the anniversary bucket
//! is an independent criterion.
//!
//! Month subtraction uses chrono's clamping arithmetic, so one month before
//! Mar 31 is Feb 28 (Feb 29 in leap years) rather than an overflow into
//! early March.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::domain::Memory;

/// Half-width of the "around one month ago" window, in days.
pub const RECALL_WINDOW_DAYS: u64 = 3;

/// Memories grouped by recall window, each sorted ascending by date.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalBuckets {
    pub on_this_day: Vec<Memory>,
    pub exactly_one_month_ago: Vec<Memory>,
    pub around_one_month_ago: Vec<Memory>,
}

impl TemporalBuckets {
    /// True when no window matched anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on_this_day.is_empty()
            && self.exactly_one_month_ago.is_empty()
            && self.around_one_month_ago.is_empty()
    }
}

/// Classify `memories` into recall buckets relative to `today`.
///
/// Callers pass a plain calendar date with the time of day already
/// stripped. The anniversary rule matches on the raw `-MM-DD` suffix plus a
/// parsed year, so a string like `2023-02-29` still counts even though it
/// is not a real calendar day; the month-ago rules need a full parse and
/// silently skip dates that fail it.
#[must_use]
pub fn recall(memories: &[Memory], today: NaiveDate) -> TemporalBuckets {
    let mut buckets = TemporalBuckets::default();

    let anniversary_suffix = format!("-{:02}-{:02}", today.month(), today.day());
    let window = month_window(today);

    for memory in memories {
        // Anniversary: same month and day, strictly earlier year.
        if memory.date.ends_with(&anniversary_suffix)
            && let Some(year) = leading_year(&memory.date)
            && year < today.year()
        {
            buckets.on_this_day.push(memory.clone());
        }

        let Some((anchor, start, end)) = window else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(&memory.date, "%Y-%m-%d") else {
            continue;
        };

        if date == anchor {
            buckets.exactly_one_month_ago.push(memory.clone());
        } else if date >= start && date <= end {
            buckets.around_one_month_ago.push(memory.clone());
        }
    }

    buckets.on_this_day.sort_by(|a, b| a.date.cmp(&b.date));
    buckets.exactly_one_month_ago.sort_by(|a, b| a.date.cmp(&b.date));
    buckets.around_one_month_ago.sort_by(|a, b| a.date.cmp(&b.date));

    buckets
}

/// The "one month ago" anchor and its inclusive ±[`RECALL_WINDOW_DAYS`]
/// window. `None` only when the arithmetic leaves the representable
/// calendar range.
fn month_window(today: NaiveDate) -> Option<(NaiveDate, NaiveDate, NaiveDate)> {
    let anchor = today.checked_sub_months(Months::new(1))?;
    let start = anchor.checked_sub_days(Days::new(RECALL_WINDOW_DAYS))?;
    let end = anchor.checked_add_days(Days::new(RECALL_WINDOW_DAYS))?;
    Some((anchor, start, end))
}

fn leading_year(date: &str) -> Option<i32> {
    date.split('-').next()?.parse().ok()
}
