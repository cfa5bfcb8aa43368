//! Shared types passed between pipeline stages.
//!
//! The header parser produces declared paths, the asset store turns them into
//! [`AssetId`]s, and the compile driver pairs the two into [`ResolvedAsset`]s
//! for substitution and reporting.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Content hash identifying a stored asset.
///
/// Lower-case hex SHA-256 of the asset bytes. Doubles as the filename inside
/// the asset directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Wrap an already computed hex digest.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A declared asset after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAsset {
    /// Position in the header, as referenced by `@N@` placeholders
    pub index: usize,
    /// Path exactly as written after `@asset`
    pub source: String,
    pub id: AssetId,
    /// Replacement text emitted for the placeholder (`assets/<id>`)
    pub url: String,
}

/// Summary of a successful compile run.
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    pub page_name: String,
    pub output_path: PathBuf,
    pub asset_dir: PathBuf,
    pub assets: Vec<ResolvedAsset>,
    pub body_bytes: usize,
}

impl CompileReport {
    /// Number of distinct stored files backing the declared assets.
    pub fn unique_assets(&self) -> usize {
        let mut ids: Vec<&AssetId> = self.assets.iter().map(|a| &a.id).collect();
        ids.sort();
        ids.dedup();
        ids.len()
    }
}
