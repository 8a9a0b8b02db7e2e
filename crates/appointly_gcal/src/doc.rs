// File: crates/appointly_gcal/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    AvailabilityArgs, AvailabilityResponse, BookingArgs, BookingResponse,
    CheckAvailabilityRequest, SaveBookingRequest, SlotResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth_handler,
        crate::handlers::auth_callback_handler,
        crate::handlers::check_availability_handler,
        crate::handlers::save_booking_handler
    ),
    components(
        schemas(
            CheckAvailabilityRequest,
            AvailabilityArgs,
            AvailabilityResponse,
            SlotResponse,
            SaveBookingRequest,
            BookingArgs,
            BookingResponse
        )
    ),
    tags(
        (name = "GCal", description = "Availability and booking against Google Calendar"),
        (name = "Auth", description = "One-time OAuth consent for the calendar owner")
    ),
    servers(
        (url = "/", description = "Appointly API server")
    )
)]
pub struct GcalApiDoc;
