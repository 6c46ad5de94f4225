//! Site-wide option store.
//!
//! The engine reads configuration through the [`OptionStore`] trait: an
//! opaque mapping from option name to value, globally scoped per site and
//! read-only to the resolvers. Hosts back it with whatever storage they
//! have; [`MemoryOptions`] is the in-process implementation used by tests
//! and embedders, and [`load_toml_options`] builds one from a TOML file.
//!
//! ## Value coercion
//!
//! Option values arrive from legacy storage in whatever shape they were
//! written: booleans as `"1"`/`"on"`, numbers as strings, flags as ints.
//! [`OptionValue`] coerces permissively instead of rejecting — a wrong
//! type never produces an error, only a documented default.
//!
//! ## Option keys
//!
//! All keys the resolvers read are constants in this module. One quirk is
//! preserved on purpose: the title separator's historical key is the
//! misspelled [`TITLE_SEPARATOR_LEGACY`] (`"title_seperator"`). It is
//! honored as a read alias; new installations should write only the
//! correctly spelled [`TITLE_SEPARATOR`], which wins when both are set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

// =============================================================================
// Option keys
// =============================================================================

/// Title separator, correctly spelled. Wins over the legacy key.
pub const TITLE_SEPARATOR: &str = "title_separator";
/// Historical misspelling of the title separator key, read as an alias.
pub const TITLE_SEPARATOR_LEGACY: &str = "title_seperator";
/// Description separator.
pub const DESCRIPTION_SEPARATOR: &str = "description_separator";

/// Site name joined into titles and generated descriptions.
pub const SITE_NAME: &str = "site_name";
/// Explicit title for the home page.
pub const HOME_TITLE: &str = "home_title";
/// Explicit description for the home page.
pub const HOME_DESCRIPTION: &str = "home_description";

/// Whether the site name is joined onto non-home titles.
pub const ADD_BLOGNAME: &str = "add_blogname";
/// Whether the site name is joined onto the home title.
pub const HOME_ADD_TAGLINE: &str = "home_add_tagline";
/// `"left"` or `"right"`: where the site name lands on non-home titles.
pub const BLOGNAME_LOCATION: &str = "blogname_location";
/// `"left"` or `"right"`: where the site name lands on the home title.
pub const HOME_BLOGNAME_LOCATION: &str = "home_blogname_location";
/// Whether generated descriptions mention the site name.
pub const DESCRIPTION_INCLUDE_BLOGNAME: &str = "description_include_blogname";

/// Whether the host serves human-readable paths (vs query-string URLs).
pub const PRETTY_PERMALINKS: &str = "pretty_permalinks";
/// Host convention: pages get a trailing slash.
pub const SLASH_PAGES: &str = "slash_pages";
/// Site base URL, e.g. `"https://example.com"` or `"http://example.com/blog"`.
pub const HOME_URL: &str = "home_url";
/// Post id of the designated static front page; `0`/absent means none.
pub const PAGE_ON_FRONT: &str = "page_on_front";
/// Forced canonical scheme: `"auto"` (default), `"http"`, `"https"`,
/// `"relative"`.
pub const CANONICAL_SCHEME: &str = "canonical_scheme";

// =============================================================================
// Values
// =============================================================================

/// A stored option value.
///
/// Coercion rules (never failing):
/// - to bool: `Bool` as-is; `Int` non-zero; `Str` falsy for `""`, `"0"`,
///   `"false"`, `"off"`, `"no"` (case-insensitive), truthy otherwise.
/// - to int: `Int` as-is; `Bool` 0/1; `Str` parsed, else `None`.
/// - to string: the value's natural rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl OptionValue {
    pub fn truthy(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Int(i) => *i != 0,
            OptionValue::Str(s) => {
                !matches!(s.to_ascii_lowercase().as_str(), "" | "0" | "false" | "off" | "no")
            }
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Bool(b) => Some(i64::from(*b)),
            OptionValue::Int(i) => Some(*i),
            OptionValue::Str(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> String {
        match self {
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Int(i) => i.to_string(),
            OptionValue::Str(s) => s.clone(),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

// =============================================================================
// Store
// =============================================================================

/// Read-only site configuration, keyed by option name.
///
/// Absent keys are not errors; every caller has a documented default.
pub trait OptionStore {
    fn get(&self, name: &str) -> Option<OptionValue>;

    /// Non-empty string value, or `None`.
    fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.as_str()).filter(|s| !s.is_empty())
    }

    /// Boolean with a default for absent keys.
    fn get_bool(&self, name: &str, default: bool) -> bool {
        self.get(name).map(|v| v.truthy()).unwrap_or(default)
    }

    /// Non-negative integer; absent, unparsable, or negative values
    /// resolve to `0`.
    fn get_u64(&self, name: &str) -> u64 {
        self.get(name)
            .and_then(|v| v.as_int())
            .and_then(|i| u64::try_from(i).ok())
            .unwrap_or(0)
    }
}

/// In-memory option store for tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryOptions {
    values: HashMap<String, OptionValue>,
}

impl MemoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }
}

impl OptionStore for MemoryOptions {
    fn get(&self, name: &str) -> Option<OptionValue> {
        self.values.get(name).cloned()
    }
}

// =============================================================================
// TOML loading
// =============================================================================

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported value for option '{key}': expected string, integer, or boolean")]
    Unsupported { key: String },
}

/// Load an option store from a TOML file.
///
/// Scalar values become options under their key. Nested tables flatten by
/// underscore-joining the path, so `[home]` `title = "..."` becomes the
/// `home_title` option. Arrays, floats, and datetimes are rejected —
/// option storage is scalar-only.
pub fn load_toml_options(path: &Path) -> Result<MemoryOptions, OptionsError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    let mut store = MemoryOptions::new();
    flatten_into(&mut store, "", &value)?;
    Ok(store)
}

fn flatten_into(
    store: &mut MemoryOptions,
    prefix: &str,
    value: &toml::Value,
) -> Result<(), OptionsError> {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let full = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}_{key}")
                };
                flatten_into(store, &full, val)?;
            }
            Ok(())
        }
        toml::Value::String(s) => {
            store.set(prefix, s.as_str());
            Ok(())
        }
        toml::Value::Integer(i) => {
            store.set(prefix, *i);
            Ok(())
        }
        toml::Value::Boolean(b) => {
            store.set(prefix, *b);
            Ok(())
        }
        _ => Err(OptionsError::Unsupported {
            key: prefix.to_string(),
        }),
    }
}
