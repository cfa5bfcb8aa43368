//! Document compilation: header → assets → substitution → output file.
//!
//! This is the only module that touches the filesystem for the output side.
//! The stages run strictly in sequence because each needs the complete
//! result of the previous one:
//!
//! 1. Parse the directive header. Any syntax problem aborts here, before the
//!    asset directory exists or any asset is read.
//! 2. Create the asset directory and ingest every declared asset in
//!    declaration order. The first unreadable asset aborts the run; assets
//!    stored before it stay on disk.
//! 3. Read the remaining body and run both substitution passes.
//! 4. Write `<output_dir>/<page name>`.
//!
//! An `@ignore` document stops after step 1 and produces nothing.

use crate::config::{BuildConfig, ConfigError};
use crate::header::{self, HeaderError, ParsedHeader};
use crate::store::{AssetStore, StoreError};
use crate::substitute::{self, Substitution};
use crate::types::{AssetId, CompileReport, ResolvedAsset};
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{0}")]
    Header(#[from] HeaderError),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("failed to open source file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read document body: {0}")]
    ReadBody(#[source] io::Error),
    #[error("failed to create output file {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Broad failure class, used to pick the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Filesystem failure
    System,
    /// Bad flags or configuration
    Usage,
    /// Malformed source document
    Parse,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::System => 1,
            ErrorKind::Usage => 2,
            ErrorKind::Parse => 3,
        }
    }
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Header(_) => ErrorKind::Parse,
            CompileError::Config(_) => ErrorKind::Usage,
            CompileError::Store(_)
            | CompileError::Open { .. }
            | CompileError::ReadBody(_)
            | CompileError::WriteOutput { .. } => ErrorKind::System,
        }
    }
}

/// Result of a run that did not fail.
#[derive(Debug)]
pub enum Outcome {
    /// The document opened with `@ignore`.
    Skipped,
    Compiled(CompileReport),
}

/// Compile the document read from `reader` according to `config`.
///
/// Relative asset paths in the header are resolved against the process
/// working directory.
pub fn compile<R: BufRead>(mut reader: R, config: &BuildConfig) -> Result<Outcome, CompileError> {
    let header = match header::parse_header(&mut reader)? {
        ParsedHeader::Ignored => return Ok(Outcome::Skipped),
        ParsedHeader::Page(header) => header,
    };

    let store = AssetStore::open(config.asset_path())?;
    let mut assets = Vec::with_capacity(header.assets.len());
    for (index, source) in header.assets.iter().enumerate() {
        let id = store.ingest(source)?;
        assets.push(ResolvedAsset {
            index,
            source: source.display().to_string(),
            url: substitute::asset_url(&config.asset_dir, &id),
            id,
        });
    }

    let mut body = Vec::new();
    reader.read_to_end(&mut body).map_err(CompileError::ReadBody)?;

    let ids: Vec<AssetId> = assets.iter().map(|a| a.id.clone()).collect();
    let root_url = config.effective_root_url();
    let document = substitute::substitute(
        &body,
        &ids,
        &Substitution {
            asset_prefix: &config.asset_dir,
            root_url: &root_url,
            style: config.placeholders,
        },
    );

    let output_path = config.output_dir.join(&header.page_name);
    write_output(&output_path, &document)?;

    Ok(Outcome::Compiled(CompileReport {
        page_name: header.page_name.display().to_string(),
        output_path,
        asset_dir: store.dir().to_path_buf(),
        assets,
        body_bytes: document.len(),
    }))
}

/// Open `source` and compile it.
pub fn compile_file(source: &Path, config: &BuildConfig) -> Result<Outcome, CompileError> {
    let file = fs::File::open(source).map_err(|e| CompileError::Open {
        path: source.to_path_buf(),
        source: e,
    })?;
    compile(BufReader::new(file), config)
}

/// Write the finished document, creating parent directories for nested
/// page names such as `blog/post.html`.
fn write_output(path: &Path, document: &[u8]) -> Result<(), CompileError> {
    let wrap = |source: io::Error| CompileError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, document).map_err(wrap)
}
