// --- File: crates/appointly_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level for the `appointly` targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are additionally written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// --- Google Calendar Config ---
// Client id/secret live in the Google credentials file, never in this config.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    /// Path to the OAuth client credentials downloaded from the Google console.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    /// Path where the access/refresh token pair is persisted.
    #[serde(default = "default_token_path")]
    pub token_path: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// Timezone label written on booked events.
    #[serde(default = "default_booking_time_zone")]
    pub booking_time_zone: String,
    #[serde(default = "default_reminder_email_minutes")]
    pub reminder_email_minutes: i32,
    #[serde(default = "default_reminder_popup_minutes")]
    pub reminder_popup_minutes: i32,
}

impl Default for GcalConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            token_path: default_token_path(),
            calendar_id: default_calendar_id(),
            booking_time_zone: default_booking_time_zone(),
            reminder_email_minutes: default_reminder_email_minutes(),
            reminder_popup_minutes: default_reminder_popup_minutes(),
        }
    }
}

fn default_credentials_path() -> String {
    "credentials.json".to_string()
}

fn default_token_path() -> String {
    "token.json".to_string()
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_booking_time_zone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_reminder_email_minutes() -> i32 {
    20
}

fn default_reminder_popup_minutes() -> i32 {
    10
}

// --- Availability Config ---
/// Business-hours policy used when computing bookable slots.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AvailabilityConfig {
    /// Local start of the business day, `HH:MM`.
    #[serde(default = "default_business_start")]
    pub business_start: String,
    /// Local end of the business day, `HH:MM`.
    #[serde(default = "default_business_end")]
    pub business_end: String,
    #[serde(default = "default_slot_length_minutes")]
    pub slot_length_minutes: i64,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Minimum distance from "now" to the first slot of an already started day.
    #[serde(default = "default_lead_time_minutes")]
    pub lead_time_minutes: i64,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            business_start: default_business_start(),
            business_end: default_business_end(),
            slot_length_minutes: default_slot_length_minutes(),
            horizon_days: default_horizon_days(),
            lead_time_minutes: default_lead_time_minutes(),
        }
    }
}

fn default_business_start() -> String {
    "09:00".to_string()
}

fn default_business_end() -> String {
    "19:00".to_string()
}

fn default_slot_length_minutes() -> i64 {
    60
}

fn default_horizon_days() -> u32 {
    2
}

fn default_lead_time_minutes() -> i64 {
    30
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub availability: AvailabilityConfig,
}
