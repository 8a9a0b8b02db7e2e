//! Service abstractions for external services.
//!
//! The calendar provider sits behind [`CalendarService`] so the HTTP layer can be
//! exercised against in-memory implementations.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A trait for calendar service operations.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// List the (already expanded) events overlapping `[start_time, end_time)`,
    /// ordered by start time.
    fn list_events(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEventRecord>, Self::Error>;

    /// Insert a new event.
    fn insert_event(
        &self,
        calendar_id: &str,
        booking: BookingRequest,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error>;
}

/// One endpoint of a provider event, as loosely typed as the provider sends it.
///
/// Timed events carry `date_time`; all-day events carry only `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBoundary {
    pub date_time: Option<DateTime<FixedOffset>>,
    pub date: Option<NaiveDate>,
}

impl EventBoundary {
    pub fn timed(date_time: DateTime<FixedOffset>) -> Self {
        Self {
            date_time: Some(date_time),
            date: None,
        }
    }

    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            date_time: None,
            date: Some(date),
        }
    }
}

/// An event record as returned by the calendar provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventRecord {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub start: EventBoundary,
    pub end: EventBoundary,
}

/// A reminder override attached to a booked event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// "email" or "popup".
    pub method: String,
    pub minutes: i32,
}

/// A fully specified event to be written to the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// IANA timezone label stored with both ends of the event.
    pub time_zone: String,
    pub attendees: Vec<String>,
    pub reminders: Vec<Reminder>,
}

/// Represents the result of a calendar event operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventResult {
    /// The ID of the event.
    pub event_id: Option<String>,
    /// The status of the event.
    pub status: String,
}
