// --- File: crates/appointly_gcal/src/normalize.rs ---
//! Turns provider event records into busy intervals on the epoch-millisecond line.

use crate::logic::GcalError;
use appointly_common::services::{CalendarEventRecord, EventBoundary};
use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// A half-open `[start_ms, end_ms)` span during which the calendar is occupied.
///
/// No ordering between `start_ms` and `end_ms` is enforced; zero-width and
/// inverted intervals are passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusyInterval {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl BusyInterval {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn from_datetimes<A: TimeZone, B: TimeZone>(start: &DateTime<A>, end: &DateTime<B>) -> Self {
        Self::new(start.timestamp_millis(), end.timestamp_millis())
    }

    /// Strict overlap with the candidate span `[start_ms, end_ms)`.
    /// Touching endpoints do not conflict.
    pub fn overlaps(&self, start_ms: i64, end_ms: i64) -> bool {
        self.start_ms < end_ms && self.end_ms > start_ms
    }
}

/// One endpoint of an event, resolved once from the loosely typed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSpan {
    /// A precise instant with its own offset.
    Timed(DateTime<FixedOffset>),
    /// A calendar date, interpreted as local midnight of the query timezone.
    AllDay(NaiveDate),
}

impl EventSpan {
    /// `date_time` wins when a boundary carries both fields.
    pub fn from_boundary(boundary: &EventBoundary) -> Option<Self> {
        match (boundary.date_time, boundary.date) {
            (Some(instant), _) => Some(EventSpan::Timed(instant)),
            (None, Some(date)) => Some(EventSpan::AllDay(date)),
            (None, None) => None,
        }
    }

    pub fn to_millis(&self, tz: Tz) -> i64 {
        match self {
            EventSpan::Timed(instant) => instant.timestamp_millis(),
            EventSpan::AllDay(date) => resolve_local(tz, date.and_time(NaiveTime::MIN)).timestamp_millis(),
        }
    }
}

/// Normalizes raw events into busy intervals, preserving order and count.
///
/// Fails with [`GcalError::MalformedInterval`] when an event lacks either form of
/// its start or end.
pub fn normalize_events(events: &[CalendarEventRecord], tz: Tz) -> Result<Vec<BusyInterval>, GcalError> {
    debug!("Normalizing {} events in {}", events.len(), tz);
    events
        .iter()
        .map(|event| {
            let start = EventSpan::from_boundary(&event.start);
            let end = EventSpan::from_boundary(&event.end);
            match (start, end) {
                (Some(start), Some(end)) => Ok(BusyInterval::new(start.to_millis(tz), end.to_millis(tz))),
                _ => {
                    let label = event.id.as_deref().or(event.summary.as_deref()).unwrap_or("<unnamed>");
                    warn!("Event {} is missing a start or end", label);
                    Err(GcalError::MalformedInterval(label.to_string()))
                }
            }
        })
        .collect()
}

/// Maps a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (clocks falling back) take the earlier instant. Times inside a
/// gap (clocks springing forward) move forward to the first valid minute.
pub fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut candidate = naive;
    // No real transition gap comes close to a day.
    for _ in 0..(24 * 60) {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(resolved) => return resolved,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => candidate += Duration::minutes(1),
        }
    }
    Utc.from_utc_datetime(&naive).with_timezone(&tz)
}
