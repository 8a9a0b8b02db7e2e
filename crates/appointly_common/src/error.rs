// --- File: crates/appointly_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Appointly errors.
///
/// Each crate keeps its own domain errors and converts them into this enum at the
/// HTTP boundary, where [`HttpStatusCode`] picks the response status.
#[derive(Error, Debug)]
pub enum AppointlyError {
    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a conflict (e.g., slot already taken)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for AppointlyError {
    fn status_code(&self) -> u16 {
        match self {
            AppointlyError::ConfigError(_) => 500,
            AppointlyError::AuthError(_) => 401,
            AppointlyError::ValidationError(_) => 400,
            AppointlyError::ExternalServiceError { .. } => 502,
            AppointlyError::ConflictError(_) => 409,
            AppointlyError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, AppointlyError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, AppointlyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, AppointlyError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| AppointlyError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, AppointlyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| AppointlyError::InternalError(format!("{}: {}", f(), error)))
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> AppointlyError {
    AppointlyError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> AppointlyError {
    AppointlyError::ValidationError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> AppointlyError {
    AppointlyError::AuthError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> AppointlyError {
    AppointlyError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> AppointlyError {
    AppointlyError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> AppointlyError {
    AppointlyError::InternalError(message.to_string())
}
