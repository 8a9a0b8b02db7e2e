// File: crates/appointly_gcal/src/handlers.rs
use crate::auth::{AuthError, TokenCache};
use crate::logic::{
    build_booking, compute_availability, has_conflict, parse_appointment_time, parse_time_zone,
    AvailabilityPolicy, AvailabilityResponse, BookingResponse, CheckAvailabilityRequest,
    GcalError, SaveBookingRequest, SlotResponse,
};
use crate::normalize::normalize_events;
use crate::service::GcalServiceError;
use appointly_common::error::{
    auth_error, config_error, conflict, external_service_error, internal_error, validation_error,
    AppointlyError,
};
use appointly_common::logging::log_result;
use appointly_common::services::CalendarService;
use appointly_config::GcalConfig;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Json, Redirect},
};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

const GOOGLE_CALENDAR: &str = "Google Calendar";

// Define shared state needed by GCal handlers
#[derive(Clone)]
pub struct GcalState {
    pub gcal: GcalConfig,
    pub policy: AvailabilityPolicy,
    pub tokens: TokenCache,
    pub calendar: Arc<dyn CalendarService<Error = GcalServiceError>>,
}

// --- Error mapping ---

impl From<GcalError> for AppointlyError {
    fn from(err: GcalError) -> Self {
        match err {
            GcalError::MalformedInterval(_) => external_service_error(GOOGLE_CALENDAR, err),
            GcalError::InvalidTimezone(_) | GcalError::TimeParseError(_) => validation_error(err),
            GcalError::InvalidPolicy(_) => config_error(err),
        }
    }
}

impl From<AuthError> for AppointlyError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotAuthenticated | AuthError::MissingRefreshToken => auth_error(err),
            AuthError::TokenEndpoint { .. } | AuthError::Http(_) => {
                external_service_error("Google OAuth", err)
            }
            AuthError::Credentials(_) => config_error(err),
            AuthError::Io(_) | AuthError::Json(_) => internal_error(err),
        }
    }
}

impl From<GcalServiceError> for AppointlyError {
    fn from(err: GcalServiceError) -> Self {
        match err {
            GcalServiceError::Auth(auth) => auth.into(),
            GcalServiceError::ApiError(api) => external_service_error(GOOGLE_CALENDAR, api),
        }
    }
}

// --- Auth ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
}

/// Redirects the calendar owner to Google's consent screen.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/auth",
    responses(
        (status = 307, description = "Redirect to the Google consent screen"),
        (status = 500, description = "OAuth client credentials are unusable")
    ),
    tag = "Auth"
))]
pub async fn auth_handler(State(state): State<Arc<GcalState>>) -> Result<Redirect, AppointlyError> {
    let url = state.tokens.authorization_url()?;
    info!("Redirecting to Google consent screen");
    Ok(Redirect::temporary(&url))
}

/// Completes the consent flow by exchanging the authorization code.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/auth/callback",
    params(AuthCallbackQuery),
    responses(
        (status = 200, description = "Token stored", body = String),
        (status = 400, description = "Missing code or exchange rejected", body = String)
    ),
    tag = "Auth"
))]
pub async fn auth_callback_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<AuthCallbackQuery>,
) -> (StatusCode, &'static str) {
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing authorization code.");
    };

    match state.tokens.exchange_code(&code).await {
        Ok(()) => (StatusCode::OK, "Authentication successful."),
        Err(e) => {
            error!("Error retrieving access token: {}", e);
            (StatusCode::BAD_REQUEST, "Authentication failed.")
        }
    }
}

// --- Availability ---

/// Handler to get available time slots.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/check_availability",
    request_body = CheckAvailabilityRequest,
    responses(
        (status = 200, description = "Free slots over the horizon", body = AvailabilityResponse),
        (status = 400, description = "Missing or unknown time zone, or invalid now"),
        (status = 401, description = "Calendar not connected yet"),
        (status = 502, description = "Calendar provider failed or returned malformed events")
    ),
    tag = "GCal"
))]
pub async fn check_availability_handler(
    State(state): State<Arc<GcalState>>,
    Json(payload): Json<CheckAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppointlyError> {
    let time_zone = payload
        .args
        .time_zone
        .filter(|tz| !tz.is_empty())
        .ok_or_else(|| validation_error("Missing time_zone."))?;
    let tz = parse_time_zone(&time_zone)?;

    let now = match payload.args.now.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| validation_error(format!("Invalid now '{}': {}", raw, e)))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let window_end = now + Duration::days(i64::from(state.policy.horizon_days));

    let events = state
        .calendar
        .list_events(&state.gcal.calendar_id, now, window_end)
        .await?;
    let busy = normalize_events(&events, tz)?;
    let slots = compute_availability(now.with_timezone(&tz), &busy, &state.policy);

    info!("Returning {} available slots for {}", slots.len(), tz);
    Ok(Json(AvailabilityResponse {
        available_slots: slots.iter().map(SlotResponse::from).collect(),
    }))
}

// --- Booking ---

/// Handler to book a slot returned by `/check_availability`.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/save_booking",
    request_body = SaveBookingRequest,
    responses(
        (status = 200, description = "Appointment booked", body = BookingResponse),
        (status = 400, description = "Missing required fields or unparsable appointment_time"),
        (status = 401, description = "Calendar not connected yet"),
        (status = 409, description = "Slot is no longer free"),
        (status = 502, description = "Calendar provider failed")
    ),
    tag = "GCal"
))]
pub async fn save_booking_handler(
    State(state): State<Arc<GcalState>>,
    Json(payload): Json<SaveBookingRequest>,
) -> Result<Json<BookingResponse>, AppointlyError> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let (Some(user_email), Some(appointment_time)) = (
        non_empty(payload.args.user_email),
        non_empty(payload.args.appointment_time),
    ) else {
        return Err(validation_error("Missing required fields."));
    };

    let start = parse_appointment_time(&appointment_time)?;
    let booking = build_booking(start, &user_email, &state.policy, &state.gcal);
    let booking_tz = parse_time_zone(&state.gcal.booking_time_zone).map_err(config_error)?;

    let overlapping = state
        .calendar
        .list_events(
            &state.gcal.calendar_id,
            booking.start.with_timezone(&Utc),
            booking.end.with_timezone(&Utc),
        )
        .await?;
    if has_conflict(&normalize_events(&overlapping, booking_tz)?, &booking.start, &booking.end) {
        info!("Slot {} is already taken", appointment_time);
        return Err(conflict("Requested time slot is no longer available."));
    }

    let end_time = booking.end.to_rfc3339_opts(SecondsFormat::Millis, false);
    let result = log_result(
        state
            .calendar
            .insert_event(&state.gcal.calendar_id, booking)
            .await,
        "Appointment booked successfully",
        "Error booking appointment",
    )?;

    Ok(Json(BookingResponse {
        message: "Appointment booked successfully.".to_string(),
        event_id: result.event_id,
        start_time: appointment_time,
        end_time,
    }))
}
