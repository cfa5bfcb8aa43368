//! Build configuration.
//!
//! Settings come from three layers, each overriding the one below:
//!
//! ```text
//! stock defaults  →  shac.toml  →  command-line flags
//! ```
//!
//! `shac.toml` is read from the working directory when present, or from the
//! file passed with `--config` (which must then exist).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output_dir = "."          # Output website directory
//! asset_dir = "assets"      # Asset subdirectory under output_dir
//! # root_url = "/"          # Replacement for @$@ (default: output_dir)
//! placeholders = "bare"     # Asset token grammar: "bare" (@N@) or "quoted" ("@N@")
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::substitute::PlaceholderStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "shac.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML encode error: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings for one compile run.
///
/// All fields have defaults. Config files need only specify the values they
/// want to override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory receiving the output document and the asset directory.
    pub output_dir: PathBuf,
    /// Asset subdirectory, relative to `output_dir`.
    pub asset_dir: String,
    /// Replacement for `@$@`. Falls back to `output_dir` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,
    /// Asset placeholder grammar used by the documents.
    pub placeholders: PlaceholderStyle,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            asset_dir: "assets".to_string(),
            root_url: None,
            placeholders: PlaceholderStyle::default(),
        }
    }
}

impl BuildConfig {
    /// Validate values that serde alone cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        if self.asset_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "asset_dir must not be empty".into(),
            ));
        }
        let inside = Path::new(&self.asset_dir)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside {
            return Err(ConfigError::Validation(format!(
                "asset_dir must be a relative path inside output_dir, got {:?}",
                self.asset_dir
            )));
        }
        Ok(())
    }

    /// Directory the asset store writes into.
    pub fn asset_path(&self) -> PathBuf {
        self.output_dir.join(&self.asset_dir)
    }

    /// Root URL with the output-directory fallback applied.
    pub fn effective_root_url(&self) -> String {
        match &self.root_url {
            Some(url) => url.clone(),
            None => self.output_dir.to_string_lossy().into_owned(),
        }
    }
}

/// Command-line values layered on top of the file config.
///
/// Only flags the user actually passed are `Some`; they serialize into a
/// sparse TOML table and merge like any other layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholders: Option<PlaceholderStyle>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BuildConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `shac.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    load_raw_config_file(&config_path).map(Some)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_raw_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge layers in order on top of the stock defaults, then deserialize and
/// validate the result.
pub fn resolve_config(
    layers: impl IntoIterator<Item = toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = layers
        .into_iter()
        .fold(stock_defaults_value(), merge_toml);
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Resolve the config for a run.
///
/// `explicit` names a config file that must exist; otherwise `shac.toml` in
/// `dir` is used when present. `overrides` always win.
pub fn load_config(
    dir: &Path,
    explicit: Option<&Path>,
    overrides: &Overrides,
) -> Result<BuildConfig, ConfigError> {
    let file_layer = match explicit {
        Some(path) => Some(load_raw_config_file(path)?),
        None => load_raw_config(dir)?,
    };
    let cli_layer = toml::Value::try_from(overrides)?;
    resolve_config(file_layer.into_iter().chain(std::iter::once(cli_layer)))
}

/// Returns a fully-commented stock `shac.toml`.
///
/// Used by the `--gen-config` flag.
pub fn stock_config_toml() -> &'static str {
    r##"# shac configuration
# ==================
# All settings are optional. Values shown below are the defaults.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# Output website directory. The compiled document is written to
# <output_dir>/<page name>.
output_dir = "."

# Asset subdirectory, relative to output_dir. Declared assets are stored
# here under the SHA-256 of their contents, and @N@ placeholders expand
# to "<asset_dir>/<hash>".
asset_dir = "assets"

# Replacement for @$@ placeholders, inserted verbatim.
# When unset, the output directory path is used.
# root_url = "https://example.com"

# Asset placeholder grammar:
#   "bare"   - @N@ is replaced by the asset path
#   "quoted" - "@N@" (quotes included) is replaced by the quoted asset path
placeholders = "bare"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = BuildConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.asset_dir, "assets");
        assert_eq!(config.root_url, None);
        assert_eq!(config.placeholders, PlaceholderStyle::Bare);
    }

    #[test]
    fn root_url_defaults_to_output_dir() {
        let config = BuildConfig {
            output_dir: PathBuf::from("public/site"),
            ..BuildConfig::default()
        };
        assert_eq!(config.effective_root_url(), "public/site");
    }

    #[test]
    fn explicit_root_url_wins() {
        let config = BuildConfig {
            root_url: Some("https://example.com".into()),
            ..BuildConfig::default()
        };
        assert_eq!(config.effective_root_url(), "https://example.com");
    }

    #[test]
    fn asset_path_joins_output_dir() {
        let config = BuildConfig {
            output_dir: PathBuf::from("dist"),
            asset_dir: "static/assets".into(),
            ..BuildConfig::default()
        };
        assert_eq!(config.asset_path(), PathBuf::from("dist/static/assets"));
    }

    #[test]
    fn parse_partial_config() {
        let config: BuildConfig = toml::from_str(r#"asset_dir = "media""#).unwrap();
        assert_eq!(config.asset_dir, "media");
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn parse_quoted_placeholders() {
        let config: BuildConfig = toml::from_str(r#"placeholders = "quoted""#).unwrap();
        assert_eq!(config.placeholders, PlaceholderStyle::Quoted);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<BuildConfig, _> = toml::from_str(r#"assets_dir = "x""#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_placeholder_style_rejected() {
        let result: Result<BuildConfig, _> = toml::from_str(r#"placeholders = "angled""#);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_accepts_defaults() {
        assert!(BuildConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_asset_dir() {
        let config = BuildConfig {
            asset_dir: "  ".into(),
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_escaping_asset_dir() {
        for dir in ["../shared", "/var/assets", "a/../../b"] {
            let config = BuildConfig {
                asset_dir: dir.into(),
                ..BuildConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "{dir} should be rejected"
            );
        }
    }

    #[test]
    fn validate_rejects_empty_output_dir() {
        let config = BuildConfig {
            output_dir: PathBuf::new(),
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Merging and loading
    // =========================================================================

    #[test]
    fn merge_overlay_replaces_scalars_and_keeps_rest() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str(r#"asset_dir = "media""#).unwrap();
        let merged: BuildConfig = merge_toml(base, overlay).try_into().unwrap();
        assert_eq!(merged.asset_dir, "media");
        assert_eq!(merged.output_dir, PathBuf::from("."));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None, &Overrides::default()).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn load_config_reads_file_from_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "output_dir = \"dist\"\nroot_url = \"/\"\n",
        )
        .unwrap();

        let config = load_config(tmp.path(), None, &Overrides::default()).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("dist"));
        assert_eq!(config.root_url.as_deref(), Some("/"));
        assert_eq!(config.asset_dir, "assets");
    }

    #[test]
    fn overrides_beat_file_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "output_dir = \"dist\"\nasset_dir = \"media\"\n",
        )
        .unwrap();
        let overrides = Overrides {
            output_dir: Some(PathBuf::from("public")),
            placeholders: Some(PlaceholderStyle::Quoted),
            ..Overrides::default()
        };

        let config = load_config(tmp.path(), None, &overrides).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert_eq!(config.asset_dir, "media");
        assert_eq!(config.placeholders, PlaceholderStyle::Quoted);
    }

    #[test]
    fn explicit_config_file_is_used_instead_of_dir_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "asset_dir = \"ignored\"\n").unwrap();
        let explicit = tmp.path().join("site.toml");
        fs::write(&explicit, "asset_dir = \"chosen\"\n").unwrap();

        let config = load_config(tmp.path(), Some(explicit.as_path()), &Overrides::default()).unwrap();

        assert_eq!(config.asset_dir, "chosen");
    }

    #[test]
    fn missing_explicit_config_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(
            tmp.path(),
            Some(tmp.path().join("missing.toml").as_path()),
            &Overrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path(), None, &Overrides::default());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_override_fails_validation() {
        let tmp = TempDir::new().unwrap();
        let overrides = Overrides {
            asset_dir: Some("../outside".into()),
            ..Overrides::default()
        };
        let result = load_config(tmp.path(), None, &overrides);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: BuildConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, BuildConfig::default());
    }
}
