// ABOUTME: Unified error type and error codes for the analytics engine
// ABOUTME: Separates invalid input, task conflicts, store outages and bad configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! # Unified Error Handling System
//!
//! Defines the error codes and the `AppError` type shared by every crate in
//! the workspace. Insufficient data is deliberately *not* an error here: the
//! analyzers report it as a structured value so callers can render guidance.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the analytics engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Malformed or out-of-range input
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,

    // Resource Management (4000-4999)
    /// A resource with the same identifier already exists (task admission)
    #[serde(rename = "RESOURCE_ALREADY_EXISTS")]
    ResourceAlreadyExists = 4001,

    // External collaborators (5000-5999)
    /// The time-series store could not serve the request
    #[serde(rename = "STORE_UNAVAILABLE")]
    StoreUnavailable = 5001,

    // Configuration (6000-6999)
    /// Configuration value present but invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Payload could not be serialized or deserialized
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidInput => "invalid input",
            Self::ResourceAlreadyExists => "already exists",
            Self::StoreUnavailable => "store unavailable",
            Self::ConfigInvalid => "invalid configuration",
            Self::SerializationError => "serialization failed",
        };
        f.write_str(label)
    }
}

/// Who and what an error concerns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// User identifier if available
    pub user: Option<String>,
    /// Resource identifier if applicable (task id, environment variable)
    pub resource_id: Option<String>,
}

/// Unified error type for the analytics engine
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Attach the user the failing operation was running for
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.context.user = Some(user.into());
        self
    }

    /// Attach a resource identifier
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.context.resource_id = Some(resource_id.into());
        self
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Identifier already in use
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceAlreadyExists, message)
    }

    /// Time-series store failure
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreUnavailable, message)
    }

    /// Configuration value that failed validation
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        let mut app_error = Self::new(ErrorCode::SerializationError, error.to_string());
        app_error.source = Some(Box::new(error));
        app_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_context() {
        let error = AppError::conflict("task already running")
            .with_user("lifter@example.com")
            .with_resource_id("performance_model:lifter@example.com:90");

        assert_eq!(error.code, ErrorCode::ResourceAlreadyExists);
        assert_eq!(error.context.user.as_deref(), Some("lifter@example.com"));
        assert_eq!(error.to_string(), "already exists: task already running");
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let error: AppError = parse_err.into();
        assert_eq!(error.code, ErrorCode::SerializationError);
        assert!(error.source.is_some());
    }

    #[test]
    fn test_error_code_wire_names() {
        let json = serde_json::to_value(ErrorCode::StoreUnavailable).unwrap();
        assert_eq!(json, "STORE_UNAVAILABLE");
    }
}
