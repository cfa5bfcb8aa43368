//! Directive header parsing.
//!
//! Every source document opens with a short block of directive lines that
//! names the page and declares the assets it references:
//!
//! ```text
//! @page Home              # line 1: output name
//! @asset img/logo.png     # asset index 0
//! @asset css/site.css     # asset index 1
//! @html                   # end of header, body follows
//! <!doctype html>...
//! ```
//!
//! A document whose first line is `@ignore` is excluded from the build: the
//! parser reports [`ParsedHeader::Ignored`] and the caller stops without
//! writing anything.
//!
//! Parsing consumes exactly the header lines, so after a successful parse the
//! reader sits on the first byte of the body.

use std::io::{self, BufRead};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const IGNORE_DIRECTIVE: &str = "@ignore";
pub const PAGE_DIRECTIVE: &str = "@page";
pub const ASSET_DIRECTIVE: &str = "@asset";
pub const BODY_MARKER: &str = "@html";

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("failed to read header: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected end of input after line {line}: no @html found")]
    UnexpectedEof { line: usize },
    #[error("syntax error: no @page found at line 1")]
    MissingPage,
    #[error("syntax error: no input given to @page")]
    EmptyPageName,
    #[error("syntax error: page name {0:?} must be a relative path inside the output directory")]
    UnsafePageName(String),
    #[error("syntax error: invalid directive at line {line}: {text:?}")]
    InvalidDirective { line: usize, text: String },
    #[error("syntax error: no input given to @asset at line {line}")]
    EmptyAssetPath { line: usize },
}

/// Page name and declared assets, in declaration order.
///
/// Header lines are taken as raw bytes, so names that are not valid UTF-8
/// survive unchanged on Unix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub page_name: PathBuf,
    pub assets: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedHeader {
    /// Line 1 was `@ignore`; nothing should be produced.
    Ignored,
    Page(Header),
}

/// Parse the directive header from `reader`.
///
/// Reads line by line up to and including the `@html` marker, never further.
pub fn parse_header<R: BufRead>(reader: &mut R) -> Result<ParsedHeader, HeaderError> {
    let mut lines = HeaderLines { reader, line: 0 };

    let first = lines.next_line()?;
    if directive_argument(&first, IGNORE_DIRECTIVE).is_some() {
        return Ok(ParsedHeader::Ignored);
    }
    let page_name = match directive_argument(&first, PAGE_DIRECTIVE) {
        Some([]) => return Err(HeaderError::EmptyPageName),
        Some(name) => path_from_bytes(name),
        None => return Err(HeaderError::MissingPage),
    };
    if !is_safe_page_name(&page_name) {
        return Err(HeaderError::UnsafePageName(page_name.display().to_string()));
    }

    let mut assets = Vec::new();
    loop {
        let raw = lines.next_line()?;
        let line = raw.trim_ascii();
        if line == BODY_MARKER.as_bytes() {
            break;
        }
        match directive_argument(line, ASSET_DIRECTIVE) {
            Some([]) => return Err(HeaderError::EmptyAssetPath { line: lines.line }),
            Some(path) => assets.push(path_from_bytes(path)),
            None => {
                return Err(HeaderError::InvalidDirective {
                    line: lines.line,
                    text: String::from_utf8_lossy(line).into_owned(),
                });
            }
        }
    }

    Ok(ParsedHeader::Page(Header { page_name, assets }))
}

struct HeaderLines<'a, R> {
    reader: &'a mut R,
    line: usize,
}

impl<R: BufRead> HeaderLines<'_, R> {
    fn next_line(&mut self) -> Result<Vec<u8>, HeaderError> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Err(HeaderError::UnexpectedEof { line: self.line });
        }
        self.line += 1;
        Ok(buf)
    }
}

/// If `line` starts with `keyword`, return the trimmed text after the first
/// whitespace.
///
/// Only the prefix is checked: `@page Home` and `@pages Home` both yield
/// `Some(b"Home")`, while a bare `@page` or `@pageHome` yields `Some(b"")`.
fn directive_argument<'a>(line: &'a [u8], keyword: &str) -> Option<&'a [u8]> {
    let rest = line.strip_prefix(keyword.as_bytes())?;
    Some(match rest.iter().position(u8::is_ascii_whitespace) {
        Some(split) => rest[split..].trim_ascii(),
        None => &[],
    })
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// The page name becomes a path under the output directory, so it may not
/// be absolute or climb out with `..`.
fn is_safe_page_name(name: &Path) -> bool {
    let mut has_file = false;
    for component in name.components() {
        match component {
            Component::Normal(_) => has_file = true,
            Component::CurDir => {}
            _ => return false,
        }
    }
    has_file
}
