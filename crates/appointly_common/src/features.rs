//! Runtime feature flag handling.
//!
//! Compile-time features (`gcal`, `openapi`) decide what is built; the helpers here
//! decide, from configuration, whether a built feature is switched on.

#[cfg(feature = "gcal")]
use appointly_config::AppConfig;

/// A feature is enabled when its flag is set and its configuration section exists.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Google Calendar feature is enabled at runtime.
#[cfg(feature = "gcal")]
pub fn is_gcal_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_gcal, config.gcal.as_ref())
}
