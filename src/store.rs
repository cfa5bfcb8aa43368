//! Content-addressed asset store.
//!
//! Every asset declared in a document header is copied into the asset
//! directory under the SHA-256 of its bytes:
//!
//! ```text
//! dist/
//! ├── Home
//! └── assets/
//!     ├── 2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae
//!     └── fcde2b2edba56bf408601fb721fe9b5c338d10ee429ea04fae5511b68fbf8fb9
//! ```
//!
//! ## Idempotence
//!
//! Identical content always lands on the same filename, so ingesting a file
//! that is already present simply rewrites the same bytes. There is no
//! existence check and no "already stored" branch: two documents (or two
//! concurrent runs) that share an image share one stored file, and renaming
//! or moving a source asset does not change its stored name.
//!
//! Nothing is ever deleted. Assets written before a failing ingest stay on
//! disk.

use crate::types::AssetId;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to create asset directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write asset {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle to an asset directory on disk.
#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    /// Open the store at `dir`, creating it and any missing parents.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the stored file for `id`.
    pub fn path_of(&self, id: &AssetId) -> PathBuf {
        self.dir.join(id.as_str())
    }

    /// Copy `source` into the store and return its content id.
    pub fn ingest(&self, source: &Path) -> Result<AssetId, StoreError> {
        let bytes = fs::read(source).map_err(|e| StoreError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        self.put(&bytes)
    }

    /// Store raw bytes under their content id.
    pub fn put(&self, bytes: &[u8]) -> Result<AssetId, StoreError> {
        let id = AssetId::from_hex(hash_bytes(bytes));
        let target = self.path_of(&id);
        fs::write(&target, bytes).map_err(|source| StoreError::Write {
            path: target,
            source,
        })?;
        Ok(id)
    }
}

/// SHA-256 of `bytes`, returned as a lower-case hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
