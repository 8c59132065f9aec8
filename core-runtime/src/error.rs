use thiserror::Error;

/// Failures raised while assembling the runtime (configuration, bridges, logging).
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value was rejected by `validate()`.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A host bridge was not injected and no desktop default is available.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Name of the missing bridge, if this is a capability error.
    pub fn missing_capability(&self) -> Option<&str> {
        match self {
            Error::CapabilityMissing { capability, .. } => Some(capability),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_name_is_exposed() {
        let err = Error::CapabilityMissing {
            capability: "SettingsStore".to_string(),
            message: "inject one".to_string(),
        };
        assert_eq!(err.missing_capability(), Some("SettingsStore"));
        assert_eq!(Error::Config("x".to_string()).missing_capability(), None);
    }
}
