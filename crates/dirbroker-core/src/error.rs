//! Error types for dirbroker plans
//!
//! Two kinds reach the caller:
//! - client-caused request problems, surfaced verbatim
//! - backend failures from the credential store or binding provider
//!
//! Neither kind is retried here.

use dirbroker_path::{IdError, LocationError};
use dirbroker_store::StoreError;

/// Main plan error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceBrokerError {
    /// Missing or malformed request data
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Store or binding provider failure
    #[error("{operation} failed: {source}")]
    Backend {
        /// Plan operation that was running
        operation: &'static str,
        #[source]
        source: BackendError,
    },

    /// No plan registered under the requested name
    #[error("unknown plan: {0}")]
    UnknownPlan(String),
}

impl ServiceBrokerError {
    #[inline]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn backend(operation: &'static str, source: impl Into<BackendError>) -> Self {
        Self::Backend {
            operation,
            source: source.into(),
        }
    }

    /// Caused by the request rather than the system
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. } | Self::UnknownPlan(_))
    }

    /// Whether the surrounding framework may retry the call
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend { source, .. } => source.is_retryable(),
            Self::InvalidRequest { .. } | Self::UnknownPlan(_) => false,
        }
    }
}

impl From<LocationError> for ServiceBrokerError {
    fn from(e: LocationError) -> Self {
        Self::invalid_request(e.to_string())
    }
}

impl From<IdError> for ServiceBrokerError {
    fn from(e: IdError) -> Self {
        Self::invalid_request(e.to_string())
    }
}

/// Collaborator failures wrapped by [`ServiceBrokerError::Backend`]
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Binding(#[from] BindingError),
}

impl BackendError {
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::Binding(e) => matches!(e, BindingError::Unavailable(_)),
        }
    }
}

/// Binding provider errors
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// Provider backend could not be reached
    #[error("binding provider unavailable: {0}")]
    Unavailable(String),

    /// Provider is misconfigured
    #[error("invalid binding configuration: {0}")]
    InvalidConfiguration(String),

    #[error("internal binding error: {0}")]
    Internal(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Not valid TOML for [`crate::BrokerConfig`]
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but semantically wrong
    #[error("invalid config: {0}")]
    Invalid(String),

    /// Tracing subscriber could not be installed
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_display() {
        let err = ServiceBrokerError::invalid_request("missing required parameter set");
        assert_eq!(err.to_string(), "invalid request: missing required parameter set");
        assert!(err.is_client_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn location_errors_are_client_errors() {
        let err: ServiceBrokerError = dirbroker_path::resolve("").unwrap_err().into();
        assert!(matches!(err, ServiceBrokerError::InvalidRequest { .. }));
    }

    #[test]
    fn backend_retryability_follows_source() {
        let transient = ServiceBrokerError::backend("provision", StoreError::unavailable("zk"));
        assert!(transient.is_retryable());
        assert!(!transient.is_client_error());
        assert_eq!(
            transient.to_string(),
            "provision failed: credential store unavailable: zk"
        );

        let fatal = ServiceBrokerError::backend(
            "bind",
            BindingError::InvalidConfiguration("no base uri".into()),
        );
        assert!(!fatal.is_retryable());
    }

    #[test]
    fn unknown_plan_is_client_error() {
        assert!(ServiceBrokerError::UnknownPlan("x".into()).is_client_error());
    }
}
