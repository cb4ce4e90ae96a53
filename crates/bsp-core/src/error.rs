//! Error handling for the BSP Framework
//!
//! Detector runs never fail; errors only surface while building
//! configurations, windows and simulated hardware.

use core::fmt;

/// Result type alias for BSP Framework operations
pub type BspResult<T> = Result<T, BspError>;

/// Error type for all BSP Framework operations
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BspError {
    /// A configuration field holds an unusable value
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: &'static str,
    },

    /// Configuration could not be parsed or serialized
    ConfigurationError {
        /// Description of the failure
        message: String,
    },

    /// Invalid sampling rate for a detector loop
    InvalidSamplingRate {
        /// Provided sampling rate
        rate: f32,
        /// Valid range description
        valid_range: String,
    },

    /// Sliding window requested with an unusable capacity
    InvalidWindowSize {
        /// Requested capacity
        requested: usize,
    },

    /// Simulated hardware failure
    SimulationError {
        /// Description of the failure
        message: String,
    },
}

impl fmt::Display for BspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BspError::InvalidConfig { field, reason } => {
                write!(f, "Invalid configuration for {}: {}", field, reason)
            }
            BspError::ConfigurationError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            BspError::InvalidSamplingRate { rate, valid_range } => {
                write!(f, "Invalid sampling rate: {}Hz, valid range: {}",
                       rate, valid_range)
            }
            BspError::InvalidWindowSize { requested } => {
                write!(f, "Invalid window size: {}, capacity must be at least 1",
                       requested)
            }
            BspError::SimulationError { message } => {
                write!(f, "Simulation error: {}", message)
            }
        }
    }
}

impl std::error::Error for BspError {}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($field:expr, $reason:expr) => {
        $crate::error::BspError::InvalidConfig {
            field: $field,
            reason: $reason,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BspError::InvalidSamplingRate {
            rate: 0.0,
            valid_range: "1-10000Hz".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid sampling rate"));
        assert!(display.contains("1-10000Hz"));
    }

    #[test]
    fn test_config_error_macro() {
        let error = config_error!("threshold", "must be positive");
        assert_eq!(
            error,
            BspError::InvalidConfig {
                field: "threshold",
                reason: "must be positive",
            }
        );
        assert!(error.to_string().contains("threshold"));
    }
}
