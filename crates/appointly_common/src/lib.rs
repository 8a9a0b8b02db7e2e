// --- File: crates/appointly_common/src/lib.rs ---

pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod routes; // Route definitions
pub mod services; // Service abstractions

// Re-export the routes function to be used by the main backend service
pub use routes::routes;

pub use error::{
    auth_error, config_error, conflict, external_service_error, internal_error, validation_error,
    AppointlyError, Context, HttpStatusCode,
};

pub use http::client::{create_client, HTTP_CLIENT};

pub use logging::{init, init_from_config, init_with_level, log_result};

pub use features::is_feature_enabled;

#[cfg(feature = "gcal")]
pub use features::is_gcal_enabled;
