//! # Asset Identity
//!
//! Maps a page number to the font asset that renders it: a `QCF_P###` name,
//! the remote URL it is served from and the local file it is cached in.
//! Everything here is pure and derived on demand; nothing is persisted.

use crate::error::{FontError, Result};
use std::path::{Path, PathBuf};

/// First page of the mushaf.
pub const FIRST_PAGE: u16 = 1;

/// Last page of the mushaf.
pub const LAST_PAGE: u16 = 604;

const NAME_PREFIX: &str = "QCF_P";
const REMOTE_EXTENSION: &str = ".TTF";
const LOCAL_EXTENSION: &str = ".ttf";

/// Returns `true` if `page` lies in `1..=604`.
pub fn is_valid_page(page: u16) -> bool {
    (FIRST_PAGE..=LAST_PAGE).contains(&page)
}

/// Font name for a page: `1 -> QCF_P001`, `604 -> QCF_P604`.
pub fn name_for(page: u16) -> String {
    format!("{}{:03}", NAME_PREFIX, page)
}

/// Remote URL for a font name. The origin is concatenated as-is, so it must
/// carry its trailing `/`.
pub fn remote_url_for(name: &str, origin: &str) -> Result<String> {
    validate_origin(origin)?;
    Ok(format!("{}{}{}", origin, name, REMOTE_EXTENSION))
}

/// Local file name for a font name (`QCF_P001.ttf`).
pub fn file_name_for(name: &str) -> String {
    format!("{}{}", name, LOCAL_EXTENSION)
}

/// Rejects empty and whitespace-only origins.
pub fn validate_origin(origin: &str) -> Result<()> {
    if origin.trim().is_empty() {
        return Err(FontError::Configuration(
            "Font origin cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Reverses the local naming pattern: `QCF_P123.ttf -> Some(123)`.
///
/// Only names [`file_name_for`] could have produced parse: exactly three
/// digits naming a page in 1..=604. `QCF_P0001.ttf` or `QCF_P000.ttf` is `None`,
/// so every cached page maps to a single file.
pub fn parse_page(file_name: &str) -> Option<u16> {
    let digits = file_name
        .strip_prefix(NAME_PREFIX)?
        .strip_suffix(LOCAL_EXTENSION)?;

    if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok().filter(|&page| is_valid_page(page))
}

/// Everything needed to fetch and cache one page font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetIdentity {
    pub page: u16,
    pub name: String,
    pub remote_url: String,
    pub local_path: PathBuf,
}

/// Owns the assets directory and derives identities inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    assets_dir: PathBuf,
}

impl AssetLayout {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn local_path_for(&self, name: &str) -> PathBuf {
        self.assets_dir.join(file_name_for(name))
    }

    /// Local path of a page's font, without any origin.
    pub fn local_path_for_page(&self, page: u16) -> Result<PathBuf> {
        if !is_valid_page(page) {
            return Err(FontError::InvalidPage(page));
        }
        Ok(self.local_path_for(&name_for(page)))
    }

    /// Full identity of a page's font.
    ///
    /// Fails with `InvalidPage` outside `1..=604` and with `Configuration`
    /// on an empty origin.
    pub fn identity(&self, page: u16, origin: &str) -> Result<AssetIdentity> {
        if !is_valid_page(page) {
            return Err(FontError::InvalidPage(page));
        }

        let name = name_for(page);
        let remote_url = remote_url_for(&name, origin)?;
        let local_path = self.local_path_for(&name);

        Ok(AssetIdentity {
            page,
            name,
            remote_url,
            local_path,
        })
    }
}
