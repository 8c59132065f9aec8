//! In-process font registry for desktop hosts and headless runs

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    fonts::{FontFormat, FontRegistrar},
};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct RegisteredFont {
    data: Bytes,
    format: FontFormat,
}

/// Keeps registered font payloads in memory, keyed by family name.
///
/// Desktop renderers look fonts up here by the name the core registered them
/// under. Payloads are checked against the sfnt header so an HTML error page
/// saved by a misconfigured origin is rejected instead of silently accepted.
#[derive(Default)]
pub struct InMemoryFontRegistry {
    fonts: RwLock<HashMap<String, RegisteredFont>>,
}

impl InMemoryFontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.fonts.read().get(name).map(|font| font.data.clone())
    }

    /// Format registered under `name`, if any.
    pub fn format_of(&self, name: &str) -> Option<FontFormat> {
        self.fonts.read().get(name).map(|font| font.format)
    }

    /// Number of registered families.
    pub fn len(&self) -> usize {
        self.fonts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.read().is_empty()
    }
}

#[async_trait]
impl FontRegistrar for InMemoryFontRegistry {
    async fn register_font(&self, name: &str, data: Bytes, format: FontFormat) -> Result<String> {
        let sniffed = FontFormat::sniff(&data).ok_or_else(|| {
            BridgeError::OperationFailed(format!("{} is not an sfnt font payload", name))
        })?;

        if sniffed != format {
            debug!(
                name,
                declared = format.as_str(),
                detected = sniffed.as_str(),
                "Font format differs from declared format"
            );
        }

        self.fonts.write().insert(
            name.to_string(),
            RegisteredFont {
                data,
                format: sniffed,
            },
        );

        debug!(name, format = sniffed.as_str(), "Registered font");
        Ok(name.to_string())
    }

    async fn is_registered(&self, name: &str) -> bool {
        self.fonts.read().contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTF_HEADER: &[u8] = &[0x00, 0x01, 0x00, 0x00, 0x00, 0x0c];

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = InMemoryFontRegistry::new();
        let data = Bytes::from_static(TTF_HEADER);

        let family = registry
            .register_font("QCF_P001", data.clone(), FontFormat::TrueType)
            .await
            .unwrap();

        assert_eq!(family, "QCF_P001");
        assert!(registry.is_registered("QCF_P001").await);
        assert_eq!(registry.get("QCF_P001"), Some(data));
        assert_eq!(registry.format_of("QCF_P001"), Some(FontFormat::TrueType));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_non_font_payload() {
        let registry = InMemoryFontRegistry::new();
        let result = registry
            .register_font(
                "QCF_P002",
                Bytes::from_static(b"<html>404</html>"),
                FontFormat::TrueType,
            )
            .await;

        assert!(result.is_err());
        assert!(!registry.is_registered("QCF_P002").await);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_records_detected_format() {
        let registry = InMemoryFontRegistry::new();
        registry
            .register_font("QCF_P003", Bytes::from_static(b"OTTO\x00\x00"), FontFormat::TrueType)
            .await
            .unwrap();

        assert_eq!(registry.format_of("QCF_P003"), Some(FontFormat::OpenType));
    }
}
