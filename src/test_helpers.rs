//! Shared test utilities for the shac test suite.
//!
//! Provides a throwaway [`Workspace`] with a source directory for documents
//! and assets and an output directory that starts out absent, plus
//! inspection helpers that panic with a clear message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let ws = Workspace::new();
//! let logo = ws.write_source("logo.png", b"...");
//! let src = format!("@page Home\n@asset {}\n@html\n@0@", logo.display());
//! compile(Cursor::new(src), &ws.config()).unwrap();
//!
//! assert_eq!(ws.asset_names().len(), 1);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::compile::Outcome;
use crate::config::BuildConfig;
use crate::types::CompileReport;

// =========================================================================
// Fixture setup
// =========================================================================

pub struct Workspace {
    tmp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        Self { tmp }
    }

    /// Directory holding source documents and assets.
    pub fn source_dir(&self) -> PathBuf {
        self.tmp.path().join("src")
    }

    /// Output directory. Not created until a compile run needs it.
    pub fn out_dir(&self) -> PathBuf {
        self.tmp.path().join("out")
    }

    /// Write a file under the source directory and return its absolute path.
    pub fn write_source(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.source_dir().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, bytes).unwrap();
        path
    }

    /// Default config pointed at this workspace's output directory.
    pub fn config(&self) -> BuildConfig {
        BuildConfig {
            output_dir: self.out_dir(),
            ..BuildConfig::default()
        }
    }

    pub fn config_with_root(&self, root_url: &str) -> BuildConfig {
        BuildConfig {
            root_url: Some(root_url.to_string()),
            ..self.config()
        }
    }

    // =====================================================================
    // Output inspection
    // =====================================================================

    /// Read a compiled document as UTF-8. Panics if it was not written.
    pub fn read_output(&self, page_name: &str) -> String {
        let path = self.out_dir().join(page_name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("output '{}' not readable: {e}", path.display()))
    }

    /// Read a stored asset by id. Panics with the stored ids on a miss.
    pub fn read_asset(&self, id: &str) -> Vec<u8> {
        let path = self.out_dir().join("assets").join(id);
        fs::read(&path).unwrap_or_else(|_| {
            let names = self.asset_names();
            panic!("asset '{id}' not stored. Available: {names:?}")
        })
    }

    /// Sorted filenames in the default asset directory.
    pub fn asset_names(&self) -> Vec<String> {
        list_names(&self.out_dir().join("assets"))
    }
}

fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot list '{}': {e}", dir.display()))
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =========================================================================
// Outcome helpers
// =========================================================================

/// Unwrap a compiled outcome. Panics on `Skipped`.
pub fn expect_compiled(outcome: Outcome) -> CompileReport {
    match outcome {
        Outcome::Compiled(report) => report,
        Outcome::Skipped => panic!("expected a compiled document, got Skipped"),
    }
}

pub fn sorted(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items
}
