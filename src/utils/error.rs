use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FareError {
    #[error("Location not found: {id}")]
    LocationNotFound { id: String },

    #[error("Origin and destination must be different locations")]
    SameLocation,

    #[error("Invalid distance: {distance_km} km")]
    InvalidDistance { distance_km: f64 },

    #[error("No distance method could produce a result: {message}")]
    DistanceProviderUnavailable { message: String },

    #[error("Location store error: {message}")]
    LocationStoreError { message: String },

    #[error("Audit recorder error: {message}")]
    AuditError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

/// Failures of the external routing provider. These never reach callers:
/// the distance resolver turns them into a fallback.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Routing provider is not configured: {0}")]
    NotConfigured(String),

    #[error("Routing provider timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Routing provider rejected the request: rate limit exceeded")]
    RateLimited,

    #[error("Routing provider returned status {status}: {message}")]
    ApiError { status: String, message: String },

    #[error("Routing provider returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Malformed routing response: {0}")]
    Malformed(String),

    #[error("Underlying request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Request,
    Calculation,
    Collaborator,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

/// Machine-readable error shape returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    pub kind: &'static str,
    pub message: String,
}

impl FareError {
    pub fn kind(&self) -> &'static str {
        match self {
            FareError::LocationNotFound { .. } => "location_not_found",
            FareError::SameLocation => "same_location",
            FareError::InvalidDistance { .. } => "invalid_distance",
            FareError::DistanceProviderUnavailable { .. } => "distance_provider_unavailable",
            FareError::LocationStoreError { .. } => "location_store_error",
            FareError::AuditError { .. } => "audit_error",
            FareError::IoError(_) => "io_error",
            FareError::CsvError(_) => "csv_error",
            FareError::SerializationError(_) => "serialization_error",
            FareError::ConfigError { .. }
            | FareError::MissingConfigError { .. }
            | FareError::InvalidConfigValueError { .. }
            | FareError::ConfigValidationError { .. } => "configuration_error",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FareError::LocationNotFound { .. } | FareError::SameLocation => ErrorCategory::Request,
            FareError::InvalidDistance { .. } | FareError::DistanceProviderUnavailable { .. } => {
                ErrorCategory::Calculation
            }
            FareError::LocationStoreError { .. } | FareError::AuditError { .. } => {
                ErrorCategory::Collaborator
            }
            FareError::ConfigError { .. }
            | FareError::MissingConfigError { .. }
            | FareError::InvalidConfigValueError { .. }
            | FareError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            FareError::IoError(_) | FareError::CsvError(_) | FareError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request => ErrorSeverity::Medium,
            ErrorCategory::Collaborator => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Calculation | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FareError::LocationNotFound { id } => {
                format!("We could not find a location with id '{}'", id)
            }
            FareError::SameLocation => {
                "Origin and destination are the same place, there is no trip to price".to_string()
            }
            FareError::InvalidDistance { .. } | FareError::DistanceProviderUnavailable { .. } => {
                "The fare could not be calculated right now".to_string()
            }
            FareError::ConfigError { .. }
            | FareError::MissingConfigError { .. }
            | FareError::InvalidConfigValueError { .. }
            | FareError::ConfigValidationError { .. } => format!("Configuration problem: {}", self),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FareError::LocationNotFound { .. } => "Check the location id against the catalog",
            FareError::SameLocation => "Pick a destination different from the origin",
            FareError::InvalidDistance { .. } => {
                "Inspect the routing provider response, it reported an impossible distance"
            }
            FareError::DistanceProviderUnavailable { .. } => {
                "Check the haversine settings in the configuration file"
            }
            FareError::LocationStoreError { .. } => "Check that the location catalog is readable",
            FareError::AuditError { .. } => "Check the audit log path and its permissions",
            FareError::ConfigError { .. }
            | FareError::MissingConfigError { .. }
            | FareError::InvalidConfigValueError { .. }
            | FareError::ConfigValidationError { .. } => "Fix the configuration file and try again",
            FareError::IoError(_) => "Check file paths and permissions",
            FareError::CsvError(_) => "Check that the catalog is a valid CSV file",
            FareError::SerializationError(_) => "Check that the JSON input is well formed",
        }
    }

    pub fn to_descriptor(&self) -> ErrorDescriptor {
        ErrorDescriptor {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors_are_request_category() {
        let err = FareError::LocationNotFound { id: "42".to_string() };
        assert_eq!(err.category(), ErrorCategory::Request);
        assert_eq!(err.kind(), "location_not_found");
        assert_eq!(FareError::SameLocation.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_descriptor_carries_kind_and_message() {
        let descriptor = FareError::InvalidDistance { distance_km: -1.5 }.to_descriptor();
        assert_eq!(descriptor.kind, "invalid_distance");
        assert_eq!(descriptor.message, "Invalid distance: -1.5 km");

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["kind"], "invalid_distance");
    }

    #[test]
    fn test_config_variants_share_kind() {
        let err = FareError::MissingConfigError {
            field: "provider.api_key".to_string(),
        };
        assert_eq!(err.kind(), "configuration_error");
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_severity_by_category() {
        assert_eq!(
            FareError::AuditError { message: "disk full".to_string() }.severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(
            FareError::DistanceProviderUnavailable { message: "all down".to_string() }.severity(),
            ErrorSeverity::Critical
        );
        assert!(ErrorSeverity::Medium < ErrorSeverity::High);
    }
}
