// --- File: crates/appointly_gcal/src/logic.rs ---
use crate::normalize::{resolve_local, BusyInterval};
use appointly_common::services::{BookingRequest, Reminder};
use appointly_config::{AvailabilityConfig, GcalConfig};
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, SecondsFormat, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- Error Handling ---
use thiserror::Error;
#[derive(Error, Debug, PartialEq)]
pub enum GcalError {
    #[error("Event has no usable start or end: {0}")]
    MalformedInterval(String),
    #[error("Unknown time zone: {0}")]
    InvalidTimezone(String),
    #[error("Invalid availability policy: {0}")]
    InvalidPolicy(String),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
}

// --- Data Structures ---
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CheckAvailabilityRequest {
    pub args: AvailabilityArgs,
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailabilityArgs {
    /// IANA timezone the slots are computed and rendered in.
    #[cfg_attr(feature = "openapi", schema(example = "America/New_York"))]
    pub time_zone: Option<String>,
    /// Reference instant; defaults to the time of the request.
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-05T08:00:00-04:00"))]
    pub now: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailabilityResponse {
    #[serde(rename = "availableSlots")]
    pub available_slots: Vec<SlotResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotResponse {
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-05T09:00:00.000-04:00"))]
    pub start: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-05T10:00:00.000-04:00"))]
    pub end: String,
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SaveBookingRequest {
    pub args: BookingArgs,
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingArgs {
    #[cfg_attr(feature = "openapi", schema(example = "jane@example.com"))]
    pub user_email: Option<String>,
    /// A slot `start` exactly as returned by `/check_availability`.
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-05T09:00:00.000-04:00"))]
    pub appointment_time: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingResponse {
    pub message: String,
    #[serde(rename = "eventId")]
    pub event_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

// --- Availability Policy ---

/// Business-hours rules the slot engine works against.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityPolicy {
    pub business_start: NaiveTime,
    pub business_end: NaiveTime,
    pub slot_length: Duration,
    pub horizon_days: u32,
    /// Minimum distance from "now" to the first slot once today's window has opened.
    pub lead_time: Duration,
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self {
            business_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            business_end: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_length: Duration::hours(1),
            horizon_days: 2,
            lead_time: Duration::minutes(30),
        }
    }
}

impl AvailabilityPolicy {
    pub fn from_config(config: &AvailabilityConfig) -> Result<Self, GcalError> {
        let parse = |label: &str, value: &str| {
            NaiveTime::parse_from_str(value, "%H:%M")
                .map_err(|e| GcalError::InvalidPolicy(format!("{} '{}': {}", label, value, e)))
        };
        if config.slot_length_minutes <= 0 {
            return Err(GcalError::InvalidPolicy(format!(
                "slot_length_minutes must be positive, got {}",
                config.slot_length_minutes
            )));
        }
        if config.lead_time_minutes < 0 {
            return Err(GcalError::InvalidPolicy(format!(
                "lead_time_minutes must not be negative, got {}",
                config.lead_time_minutes
            )));
        }
        Ok(Self {
            business_start: parse("business_start", &config.business_start)?,
            business_end: parse("business_end", &config.business_end)?,
            slot_length: Duration::minutes(config.slot_length_minutes),
            horizon_days: config.horizon_days,
            lead_time: Duration::minutes(config.lead_time_minutes),
        })
    }
}

// --- Availability Logic ---

/// A bookable window in the caller's timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl From<&Slot> for SlotResponse {
    fn from(slot: &Slot) -> Self {
        Self {
            start: slot.start.to_rfc3339_opts(SecondsFormat::Millis, false),
            end: slot.end.to_rfc3339_opts(SecondsFormat::Millis, false),
        }
    }
}

pub fn parse_time_zone(name: &str) -> Result<Tz, GcalError> {
    name.parse::<Tz>()
        .map_err(|_| GcalError::InvalidTimezone(name.to_string()))
}

/// First local hour boundary at or after `instant`.
fn hour_boundary_at_or_after(instant: DateTime<Tz>) -> DateTime<Tz> {
    let floor = instant
        - Duration::minutes(i64::from(instant.minute()))
        - Duration::seconds(i64::from(instant.second()))
        - Duration::nanoseconds(i64::from(instant.nanosecond()));
    if floor == instant {
        floor
    } else {
        floor + Duration::hours(1)
    }
}

fn next_local_midnight(instant: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let next_day = instant.date_naive().succ_opt()?;
    Some(resolve_local(instant.timezone(), next_day.and_time(NaiveTime::MIN)))
}

/// Computes the free slots of the next `policy.horizon_days` local days.
///
/// Each day is walked from business start in `slot_length` steps while the step
/// start is before business end, so the last slot may run past business end when
/// the two are not aligned. On day 0, a window that has already opened restarts
/// at the first hour boundary at least `lead_time` after `now`. A slot is dropped
/// when any busy interval strictly overlaps it.
pub fn compute_availability(
    now: DateTime<Tz>,
    busy: &[BusyInterval],
    policy: &AvailabilityPolicy,
) -> Vec<Slot> {
    let tz = now.timezone();
    debug!(
        "Computing availability from {} in {} over {} days against {} busy intervals",
        now,
        tz,
        policy.horizon_days,
        busy.len()
    );

    let mut slots = Vec::new();
    let mut anchor = now;

    for day in 0..policy.horizon_days {
        let date = anchor.date_naive();
        let mut cursor = resolve_local(tz, date.and_time(policy.business_start));
        let day_end = resolve_local(tz, date.and_time(policy.business_end));

        let mut skip_day = false;
        if day == 0 && cursor < now {
            cursor = hour_boundary_at_or_after(now + policy.lead_time);
            skip_day = cursor > day_end;
        }

        if !skip_day {
            while cursor < day_end {
                let slot_end = cursor + policy.slot_length;
                let (start_ms, end_ms) = (cursor.timestamp_millis(), slot_end.timestamp_millis());
                if !busy.iter().any(|b| b.overlaps(start_ms, end_ms)) {
                    slots.push(Slot {
                        start: cursor,
                        end: slot_end,
                    });
                }
                cursor = slot_end;
            }
        }

        anchor = match next_local_midnight(&anchor) {
            Some(midnight) => midnight,
            None => break,
        };
    }

    debug!("Found {} available slots", slots.len());
    slots
}

/// Same as [`compute_availability`], resolving the timezone by name first.
pub fn compute_availability_in(
    now: DateTime<Utc>,
    time_zone: &str,
    busy: &[BusyInterval],
    policy: &AvailabilityPolicy,
) -> Result<Vec<Slot>, GcalError> {
    let tz = parse_time_zone(time_zone)?;
    Ok(compute_availability(now.with_timezone(&tz), busy, policy))
}

// --- Booking Logic ---

pub fn parse_appointment_time(value: &str) -> Result<DateTime<FixedOffset>, GcalError> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| GcalError::TimeParseError(format!("Invalid appointment_time '{}': {}", value, e)))
}

/// Builds the calendar event for a slot starting at `start`.
pub fn build_booking(
    start: DateTime<FixedOffset>,
    attendee: &str,
    policy: &AvailabilityPolicy,
    gcal: &GcalConfig,
) -> BookingRequest {
    BookingRequest {
        summary: "Scheduled Appointment".to_string(),
        description: Some(format!("Appointment booked for {}", attendee)),
        start,
        end: start + policy.slot_length,
        time_zone: gcal.booking_time_zone.clone(),
        attendees: vec![attendee.to_string()],
        reminders: vec![
            Reminder {
                method: "email".to_string(),
                minutes: gcal.reminder_email_minutes,
            },
            Reminder {
                method: "popup".to_string(),
                minutes: gcal.reminder_popup_minutes,
            },
        ],
    }
}

/// Whether any busy interval strictly overlaps `[start, end)`.
pub fn has_conflict<A: TimeZone, B: TimeZone>(
    busy: &[BusyInterval],
    start: &DateTime<A>,
    end: &DateTime<B>,
) -> bool {
    let (start_ms, end_ms) = (start.timestamp_millis(), end.timestamp_millis());
    busy.iter().any(|b| b.overlaps(start_ms, end_ms))
}
