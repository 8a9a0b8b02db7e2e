// --- File: crates/appointly_gcal/src/routes.rs ---

use crate::auth::{create_calendar_hub, TokenCache};
use crate::handlers::{
    auth_callback_handler, auth_handler, check_availability_handler, save_booking_handler,
    GcalState,
};
use crate::logic::{parse_time_zone, AvailabilityPolicy};
use crate::service::GoogleCalendarService;
use appointly_common::error::{config_error, AppointlyError};
use appointly_common::HTTP_CLIENT;
use appointly_config::AppConfig;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

/// Routes of the calendar feature over an already built state.
pub fn router(state: Arc<GcalState>) -> Router {
    Router::new()
        .route("/auth", get(auth_handler))
        .route("/auth/callback", get(auth_callback_handler))
        .route("/check_availability", post(check_availability_handler))
        .route("/save_booking", post(save_booking_handler))
        .with_state(state)
}

/// Creates a router containing all routes for the Google Calendar feature,
/// wired to the real Google client.
pub async fn routes(config: Arc<AppConfig>) -> Result<Router, AppointlyError> {
    let gcal = config.gcal.clone().unwrap_or_default();
    let policy = AvailabilityPolicy::from_config(&config.availability)?;
    parse_time_zone(&gcal.booking_time_zone).map_err(config_error)?;

    let tokens = TokenCache::load(&gcal, HTTP_CLIENT.clone()).await?;
    let calendar_hub = create_calendar_hub(tokens.clone())?;
    let calendar = GoogleCalendarService::new(Arc::new(calendar_hub), tokens.clone());
    info!("Google Calendar routes ready for calendar '{}'", gcal.calendar_id);

    Ok(router(Arc::new(GcalState {
        gcal,
        policy,
        tokens,
        calendar: Arc::new(calendar),
    })))
}
