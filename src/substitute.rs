//! Placeholder substitution for document bodies.
//!
//! The body after `@html` is opaque bytes with two kinds of tokens:
//!
//! | Token | Replaced with |
//! |-------|---------------|
//! | `@N@` (or `"@N@"`) | path of the N-th declared asset, e.g. `assets/9f86d0...` |
//! | `@$@` | the configured root URL, verbatim |
//!
//! Substitution runs as two strictly sequential passes over the whole body:
//! asset tokens first, root tokens second. Each pass is a single
//! leftmost-first scan over non-overlapping matches, so text inserted by a
//! pass is never rescanned by that pass, and a root URL that happens to
//! contain `@0@` stays as written.
//!
//! Asset tokens whose index is out of range are left in place untouched.
//! Anything that is not an exact token match (`@x@`, `@@`, `@-1@`) is
//! ordinary body text.
//!
//! ## Token Variants
//!
//! Two asset token grammars exist. The document format picks one through
//! [`PlaceholderStyle`]; they are never mixed or guessed:
//!
//! - **bare**: the token is `@0@`, replaced by `assets/<id>`.
//! - **quoted**: the token is `"@0@"` including its quotes, replaced by
//!   `"assets/<id>"`. Unquoted `@0@` is left alone in this mode.

use crate::types::AssetId;
use regex::bytes::{Captures, NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

/// `@N@`, ASCII digits only.
static BARE_ASSET_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([0-9]+)@").expect("valid asset token pattern"));

/// `"@N@"`, quotes included in the match.
static QUOTED_ASSET_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""@([0-9]+)@""#).expect("valid quoted asset token pattern"));

static ROOT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\$@").expect("valid root token pattern"));

/// Which asset-index token grammar a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// `@N@`
    #[default]
    Bare,
    /// `"@N@"`
    Quoted,
}

impl PlaceholderStyle {
    fn pattern(self) -> &'static Regex {
        match self {
            PlaceholderStyle::Bare => &BARE_ASSET_TOKEN,
            PlaceholderStyle::Quoted => &QUOTED_ASSET_TOKEN,
        }
    }

    fn render(self, url: &str) -> String {
        match self {
            PlaceholderStyle::Bare => url.to_string(),
            PlaceholderStyle::Quoted => format!("\"{url}\""),
        }
    }
}

impl fmt::Display for PlaceholderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderStyle::Bare => f.write_str("bare"),
            PlaceholderStyle::Quoted => f.write_str("quoted"),
        }
    }
}

/// Everything substitution needs besides the body and the asset list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution<'a> {
    /// Asset subdirectory as seen from the document, e.g. `assets`
    pub asset_prefix: &'a str,
    pub root_url: &'a str,
    pub style: PlaceholderStyle,
}

/// Run both passes over `body` and return the finished document.
pub fn substitute(body: &[u8], assets: &[AssetId], params: &Substitution<'_>) -> Vec<u8> {
    let with_assets = replace_asset_placeholders(body, assets, params.asset_prefix, params.style);
    replace_root_placeholders(&with_assets, params.root_url).into_owned()
}

/// Pass 1: rewrite asset-index tokens against `assets`.
pub fn replace_asset_placeholders<'h>(
    body: &'h [u8],
    assets: &[AssetId],
    asset_prefix: &str,
    style: PlaceholderStyle,
) -> Cow<'h, [u8]> {
    style.pattern().replace_all(body, |caps: &Captures<'_>| {
        match token_index(&caps[1]).and_then(|i| assets.get(i)) {
            Some(id) => style.render(&asset_url(asset_prefix, id)).into_bytes(),
            // Out of range: keep the token as written
            None => caps[0].to_vec(),
        }
    })
}

/// Pass 2: rewrite every `@$@` with `root_url`.
pub fn replace_root_placeholders<'h>(body: &'h [u8], root_url: &str) -> Cow<'h, [u8]> {
    ROOT_TOKEN.replace_all(body, NoExpand(root_url.as_bytes()))
}

/// Document-relative path of a stored asset: `<prefix>/<id>`.
pub fn asset_url(asset_prefix: &str, id: &AssetId) -> String {
    let prefix = asset_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        id.to_string()
    } else {
        format!("{prefix}/{id}")
    }
}

/// Parse the digit payload of a token. Indices too large for `usize` are
/// treated like any other out-of-range index.
fn token_index(digits: &[u8]) -> Option<usize> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}
