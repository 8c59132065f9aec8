//! Font Registration Abstraction
//!
//! The host text stack (CoreText, Android `Typeface`, a desktop rasterizer)
//! owns the actual font registration call. The core only guarantees that the
//! bytes it hands over are exactly the bytes that were cached on disk.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Container format of a font payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    /// TrueType outlines (`.ttf`)
    TrueType,
    /// OpenType with CFF outlines (`.otf`)
    OpenType,
}

impl FontFormat {
    /// Short format tag understood by host font loaders.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontFormat::TrueType => "ttf",
            FontFormat::OpenType => "otf",
        }
    }

    /// Guess the format from the leading sfnt version tag.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data.get(..4)? {
            [0x00, 0x01, 0x00, 0x00] | b"true" => Some(FontFormat::TrueType),
            b"OTTO" => Some(FontFormat::OpenType),
            _ => None,
        }
    }
}

/// Font registration sink
///
/// Makes a loaded font usable by the rendering layer under `name`.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::fonts::{FontFormat, FontRegistrar};
///
/// async fn register(registrar: &dyn FontRegistrar, bytes: Bytes) -> Result<String> {
///     registrar.register_font("QCF_P001", bytes, FontFormat::TrueType).await
/// }
/// ```
#[async_trait]
pub trait FontRegistrar: Send + Sync {
    /// Register raw font bytes under `name`.
    ///
    /// Returns the family name the host assigned, which may differ from the
    /// requested one.
    async fn register_font(&self, name: &str, data: Bytes, format: FontFormat) -> Result<String>;

    /// Whether a font was already registered under `name` in this process.
    async fn is_registered(&self, name: &str) -> bool {
        let _ = name;
        false
    }
}
