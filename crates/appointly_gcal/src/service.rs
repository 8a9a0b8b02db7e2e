// --- File: crates/appointly_gcal/src/service.rs ---
//! Google Calendar service implementation.
//!
//! This module provides an implementation of the CalendarService trait for Google Calendar.

use appointly_common::services::{
    BookingRequest, BoxFuture, CalendarEventRecord, CalendarEventResult, CalendarService,
    EventBoundary,
};
use chrono::{DateTime, Utc};
use google_calendar3::api::{Event, EventAttendee, EventDateTime, EventReminder, EventReminders};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::{AuthError, HubType, TokenCache};

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Authorization failed: {0}")]
    Auth(#[from] AuthError),
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
    tokens: TokenCache,
}

impl GoogleCalendarService {
    /// Create a new Google Calendar service.
    pub fn new(calendar_hub: Arc<HubType>, tokens: TokenCache) -> Self {
        Self {
            calendar_hub,
            tokens,
        }
    }
}

fn to_boundary(value: Option<EventDateTime>) -> EventBoundary {
    match value {
        Some(edt) => EventBoundary {
            date_time: edt.date_time.map(|dt| dt.fixed_offset()),
            date: edt.date,
        },
        None => EventBoundary::default(),
    }
}

fn to_record(event: Event) -> CalendarEventRecord {
    CalendarEventRecord {
        id: event.id,
        summary: event.summary,
        start: to_boundary(event.start),
        end: to_boundary(event.end),
    }
}

fn to_google_event(booking: BookingRequest) -> Event {
    let at = |instant: DateTime<Utc>| EventDateTime {
        date_time: Some(instant),
        time_zone: Some(booking.time_zone.clone()),
        ..Default::default()
    };

    Event {
        summary: Some(booking.summary.clone()),
        description: booking.description.clone(),
        start: Some(at(booking.start.with_timezone(&Utc))),
        end: Some(at(booking.end.with_timezone(&Utc))),
        attendees: Some(
            booking
                .attendees
                .iter()
                .map(|email| EventAttendee {
                    email: Some(email.clone()),
                    ..Default::default()
                })
                .collect(),
        ),
        reminders: Some(EventReminders {
            use_default: Some(false),
            overrides: Some(
                booking
                    .reminders
                    .iter()
                    .map(|r| EventReminder {
                        method: Some(r.method.clone()),
                        minutes: Some(r.minutes),
                    })
                    .collect(),
            ),
        }),
        ..Default::default()
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Lists the expanded (single) events between `start_time` and `end_time`,
    /// ordered by start time, following pagination to the end.
    ///
    /// # Errors
    ///
    /// Returns a `GcalServiceError` if:
    /// * No token has been obtained yet or it cannot be refreshed (Auth)
    /// * The API call to Google Calendar fails (ApiError)
    fn list_events(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEventRecord>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            // Surface a missing or dead token before the API call hides it.
            self.tokens.access_token().await?;

            let mut records = Vec::new();
            let mut page_token: Option<String> = None;
            loop {
                let mut call = calendar_hub
                    .events()
                    .list(&calendar_id)
                    .time_min(start_time)
                    .time_max(end_time)
                    .single_events(true)
                    .order_by("startTime");
                if let Some(token) = page_token.as_deref() {
                    call = call.page_token(token);
                }

                let (_response, page) = call.doit().await?;
                records.extend(page.items.unwrap_or_default().into_iter().map(to_record));

                match page.next_page_token {
                    Some(next) => page_token = Some(next),
                    None => break,
                }
            }

            debug!(
                "Fetched {} events from {} between {} and {}",
                records.len(),
                calendar_id,
                start_time,
                end_time
            );
            Ok(records)
        })
    }

    /// Creates the booked event, with attendee and reminder overrides, in the
    /// specified calendar.
    fn insert_event(
        &self,
        calendar_id: &str,
        booking: BookingRequest,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            self.tokens.access_token().await?;

            let (_response, created_event) = calendar_hub
                .events()
                .insert(to_google_event(booking), &calendar_id)
                .doit()
                .await?;

            info!("Created event {:?} in {}", created_event.id, calendar_id);
            Ok(CalendarEventResult {
                event_id: created_event.id,
                status: created_event.status.unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }
}
