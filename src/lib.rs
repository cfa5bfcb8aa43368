//! # shac
//!
//! A static-document compiler. A source document names its output page,
//! declares the files it references, and then carries an opaque body with
//! placeholder tokens:
//!
//! ```text
//! @page Home
//! @asset img/logo.png
//! @html
//! <img src="@0@"><a href="@$@/about">About</a>
//! ```
//!
//! Compiling it copies `img/logo.png` into a content-addressed asset store
//! and writes `Home` with the tokens resolved:
//!
//! ```text
//! dist/
//! ├── Home        <img src="assets/9f86d0..."><a href="https://example.com/about">About</a>
//! └── assets/
//!     └── 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
//! ```
//!
//! # Architecture: One-Way Pipeline
//!
//! ```text
//! 1. Header      source lines  →  page name + declared asset paths
//! 2. Store       asset paths   →  content ids (files under assets/)
//! 3. Substitute  body + ids    →  finished document bytes
//! ```
//!
//! Each stage consumes the complete output of the one before, so the run is
//! strictly sequential. Stages 1 and 3 do no filesystem I/O: the header
//! parser works on any `BufRead`, and substitution is a pure function of
//! the body, the ids and a [`substitute::Substitution`] value. That keeps
//! both testable without a temp directory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`header`] | Stage 1: parses `@ignore` / `@page` / `@asset` / `@html` directives |
//! | [`store`] | Stage 2: SHA-256 content-addressed asset directory |
//! | [`substitute`] | Stage 3: `@N@` and `@$@` placeholder passes |
//! | [`compile`] | Runs the stages, reads the source, writes the output document |
//! | [`config`] | `shac.toml` loading, CLI overrides, validation |
//! | [`types`] | Types shared between stages (`AssetId`, `ResolvedAsset`, `CompileReport`) |
//! | [`output`] | CLI output formatting for compile runs |
//!
//! # Design Decisions
//!
//! ## Content Addressing
//!
//! Assets are stored under the hash of their bytes, never their source name.
//! Re-running a build rewrites identical files in place, two documents that
//! share an image share one stored copy, and a changed asset gets a new URL
//! so caches never serve a stale version.
//!
//! ## Lenient Placeholders
//!
//! An `@N@` token with no matching asset is left in the output as written
//! instead of failing the build. Bodies often contain `@` for unrelated
//! reasons, and a visible leftover token is easy to spot in review.
//!
//! ## Explicit Token Grammar
//!
//! The quoted (`"@N@"`) and bare (`@N@`) asset token grammars are chosen by
//! configuration, not detected per document. A document is only ever read
//! one way.

pub mod compile;
pub mod config;
pub mod header;
pub mod output;
pub mod store;
pub mod substitute;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
