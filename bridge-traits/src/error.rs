use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Transport-level failure: unreachable host, TLS, timeout, broken stream.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` when the failure happened on the network side of a bridge.
    pub fn is_network(&self) -> bool {
        matches!(self, BridgeError::Network(_) | BridgeError::Http { .. })
    }

    /// Returns `true` when the error means "the path does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, BridgeError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
