use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Font error: {0}")]
    Fonts(#[from] core_fonts::FontError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Name of the bridge the host still has to provide, if that is what failed.
    pub fn missing_capability(&self) -> Option<&str> {
        match self {
            CoreError::CapabilityMissing { capability, .. } => Some(capability),
            CoreError::Runtime(err) => err.missing_capability(),
            _ => None,
        }
    }
}
