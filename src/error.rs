//! Unified error handling for the location-reporter library.
//!
//! Every failure in the dispatch pipeline is terminal at the point of
//! detection: handlers return these errors, and the dispatcher turns them into
//! log lines instead of escalating them to the event source.

/// Unified error type for location-reporter operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum ReporterError {
    /// Coarse location permission is not currently granted
    #[error("Coarse location permission not granted")]
    PermissionDenied,

    /// The geofencing subsystem delivered an event with an error status
    #[error("Geofencing event error (code {code})")]
    Geofencing { code: i32 },

    /// Transmitting a location update failed
    #[error("Location update submission failed: {message}")]
    Submission { message: String },

    /// Inbound action identifier is not one this dispatcher handles
    #[error("Unrecognized trigger '{action}'")]
    UnrecognizedTrigger { action: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// HTTP/webhook error
    #[error("{}", format_http(.message, .status_code))]
    HttpError {
        message: String,
        status_code: Option<u16>,
    },

    /// Task runtime could not be created
    #[error("Runtime error: {message}")]
    RuntimeError { message: String },
}

fn format_http(message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("HTTP error ({}): {}", code, message),
        None => format!("HTTP error: {}", message),
    }
}

impl ReporterError {
    /// Whether this outcome is routine for a background event handler.
    ///
    /// Routine outcomes are logged at warning level, everything else at error.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ReporterError::PermissionDenied | ReporterError::UnrecognizedTrigger { .. }
        )
    }
}

/// Result type alias for location-reporter operations.
pub type Result<T> = std::result::Result<T, ReporterError>;

/// Extension trait for converting Option to ReporterError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a configuration error.
    fn ok_or_config(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_config(self, message: &str) -> Result<T> {
        self.ok_or_else(|| ReporterError::ConfigError {
            message: message.to_string(),
        })
    }
}
