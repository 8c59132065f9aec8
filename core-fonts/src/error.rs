//! # Font Engine Error Types
//!
//! Per-page failures are carried as data inside `FetchOutcome`, so this enum
//! is `Clone`. Only configuration misuse is ever returned through `Err`.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors produced by the font preloading and cache engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    // ========================================================================
    // Caller Errors
    // ========================================================================
    /// The engine was given an unusable setting (empty origin, zero concurrency).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The page number lies outside the mushaf.
    #[error("Invalid page {0}: pages run from 1 to 604")]
    InvalidPage(u16),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// Download failed: transport error, non-success status or empty body.
    #[error("Network error: {0}")]
    Network(String),

    /// Local read, write, rename, list or delete failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The host refused to register a cached font.
    #[error("Font registration failed: {0}")]
    Registration(String),

    // ========================================================================
    // Batch Errors
    // ========================================================================
    /// Some pages of a preload run failed.
    #[error("{failed} of {total} pages failed to preload")]
    PartialBatchFailure { failed: usize, total: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FontError {
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, FontError::Configuration(_))
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, FontError::Network(_))
    }

    /// Returns `true` if re-running the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FontError::Network(_) | FontError::Storage(_) | FontError::PartialBatchFailure { .. }
        )
    }
}

impl From<BridgeError> for FontError {
    fn from(err: BridgeError) -> Self {
        if err.is_network() {
            FontError::Network(err.to_string())
        } else {
            FontError::Storage(err.to_string())
        }
    }
}

impl From<core_runtime::Error> for FontError {
    fn from(err: core_runtime::Error) -> Self {
        match err {
            core_runtime::Error::Config(msg) => FontError::Configuration(msg),
            core_runtime::Error::CapabilityMissing { capability, message } => {
                FontError::Configuration(format!("{}: {}", capability, message))
            }
            core_runtime::Error::Internal(msg) => FontError::Internal(msg),
        }
    }
}

/// Result type for font engine operations.
pub type Result<T> = std::result::Result<T, FontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_network_errors_stay_network() {
        let err: FontError = BridgeError::Http {
            status: 404,
            url: "https://cdn.example/QCF_P001.TTF".to_string(),
        }
        .into();
        assert!(err.is_network_error());

        let err: FontError = BridgeError::Network("connection reset".to_string()).into();
        assert!(err.is_network_error());
    }

    #[test]
    fn test_bridge_local_errors_become_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: FontError = BridgeError::Io(io).into();
        assert!(matches!(err, FontError::Storage(_)));

        let err: FontError = BridgeError::OperationFailed("disk full".to_string()).into();
        assert!(matches!(err, FontError::Storage(_)));
    }

    #[test]
    fn test_runtime_error_conversion() {
        let err: FontError = core_runtime::Error::Config("bad".to_string()).into();
        assert!(err.is_configuration_error());

        let err: FontError = core_runtime::Error::Internal("boom".to_string()).into();
        assert_eq!(err, FontError::Internal("boom".to_string()));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(FontError::Network("timeout".to_string()).is_retryable());
        assert!(FontError::PartialBatchFailure { failed: 1, total: 3 }.is_retryable());
        assert!(!FontError::InvalidPage(0).is_retryable());
        assert!(!FontError::Configuration("origin".to_string()).is_retryable());
        assert!(!FontError::Registration("rejected".to_string()).is_retryable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            FontError::PartialBatchFailure { failed: 2, total: 50 }.to_string(),
            "2 of 50 pages failed to preload"
        );
        assert_eq!(
            FontError::InvalidPage(605).to_string(),
            "Invalid page 605: pages run from 1 to 604"
        );
    }
}
