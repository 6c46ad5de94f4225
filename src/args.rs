//! Per-resolver argument bags.
//!
//! Callers pass a *partial* set of overrides; each bag is built fresh per
//! call by merging the caller's values over the documented defaults
//! (copy-on-merge, never mutated afterwards). Legacy call sites supply
//! loosely typed maps, so merging is permissive by contract:
//!
//! - unknown keys are ignored,
//! - missing keys take their documented defaults,
//! - values are coerced to the declared type (truthy strings and ints to
//!   bool, numeric strings to int, scalars to string),
//! - uncoercible values are treated as absent, never rejected.
//!
//! A bag never fails to construct. The only hard boundary is here: past
//! this point the resolvers work with fully typed values.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache;

/// Arguments for [`Engine::resolve_title`](crate::engine::Engine::resolve_title).
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TitleArgs {
    /// Consult the item's custom title field. Default `true`.
    pub use_custom_field: bool,
    /// Return only the bare title, skipping site-name composition.
    /// Used by social tags and breadcrumbs. Default `false`.
    pub notagline: bool,
    /// Treat the render as the front page. Default `false`.
    pub is_front_page: bool,
    /// The render is the designated static front page. Default `false`.
    pub page_on_front: bool,
    /// The title is being resolved for a description phrase; protection
    /// affixes are skipped. Default `false`.
    pub for_description: bool,
    /// Caller-supplied raw title (feed passthrough and legacy filters).
    pub title: Option<String>,
    /// Caller-supplied separator token (legacy compatibility mode only).
    pub sep: Option<String>,
    /// Caller-supplied separator location (legacy compatibility mode only).
    pub seplocation: Option<String>,
    /// Host glue prints the result itself. Cache-insignificant.
    pub echo: bool,
}

impl Default for TitleArgs {
    fn default() -> Self {
        Self {
            use_custom_field: true,
            notagline: false,
            is_front_page: false,
            page_on_front: false,
            for_description: false,
            title: None,
            sep: None,
            seplocation: None,
            echo: false,
        }
    }
}

impl TitleArgs {
    /// Merge caller overrides over the defaults. See the module docs for
    /// the coercion rules.
    pub fn from_partial(partial: &Value) -> Self {
        merge_over_defaults(Self::default(), partial)
    }

    /// Fingerprint of the cache-significant arguments.
    pub fn fingerprint(&self) -> String {
        fingerprint_without_echo(self)
    }
}

/// Arguments for
/// [`Engine::resolve_description`](crate::engine::Engine::resolve_description).
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DescriptionArgs {
    /// Consult the explicit description sources (custom field, home
    /// option, term field) before generating. Default `true`.
    pub use_custom_field: bool,
    /// Host glue prints the result itself. Cache-insignificant.
    pub echo: bool,
}

impl Default for DescriptionArgs {
    fn default() -> Self {
        Self {
            use_custom_field: true,
            echo: false,
        }
    }
}

impl DescriptionArgs {
    pub fn from_partial(partial: &Value) -> Self {
        merge_over_defaults(Self::default(), partial)
    }

    pub fn fingerprint(&self) -> String {
        fingerprint_without_echo(self)
    }
}

/// Arguments for [`Engine::resolve_url`](crate::engine::Engine::resolve_url).
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UrlArgs {
    /// Resolve the bare home URL, skipping all per-item logic.
    /// Default `false`.
    pub home: bool,
    /// Honor a custom canonical field on singular items. Default `true`.
    pub use_custom_field: bool,
    /// The call comes from outside the current render (sitemaps, feeds);
    /// there is no request path to echo for archives. Default `false`.
    pub is_external_call: bool,
    /// Always append a trailing slash. Default `false`.
    pub forceslash: bool,
    /// Force the paged URL form even when only the body-page counter is
    /// set; a counter of 0/1 still appends nothing. Default `false`.
    pub paged: bool,
    /// Host glue prints the result itself. Cache-insignificant.
    pub echo: bool,
}

impl Default for UrlArgs {
    fn default() -> Self {
        Self {
            home: false,
            use_custom_field: true,
            is_external_call: false,
            forceslash: false,
            paged: false,
            echo: false,
        }
    }
}

impl UrlArgs {
    pub fn from_partial(partial: &Value) -> Self {
        merge_over_defaults(Self::default(), partial)
    }

    pub fn fingerprint(&self) -> String {
        fingerprint_without_echo(self)
    }
}

// =============================================================================
// Merge machinery
// =============================================================================

/// Merge a partial JSON object over a serialized defaults struct,
/// coercing each supplied value to the shape of the default it replaces.
fn merge_over_defaults<T: Serialize + DeserializeOwned>(defaults: T, partial: &Value) -> T {
    let mut base = serde_json::to_value(&defaults).expect("default args must serialize");

    if let (Some(base_map), Some(partial_map)) = (base.as_object_mut(), partial.as_object()) {
        for (key, slot) in base_map.iter_mut() {
            if let Some(supplied) = partial_map.get(key)
                && let Some(coerced) = coerce_like(slot, supplied)
            {
                *slot = coerced;
            }
        }
    }

    serde_json::from_value(base).expect("merged args must deserialize")
}

/// Coerce `supplied` to the kind of `template`. `None` means the value
/// cannot be coerced and the default stands.
fn coerce_like(template: &Value, supplied: &Value) -> Option<Value> {
    match template {
        Value::Bool(_) => match supplied {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::Number(n) => Some(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
            Value::String(s) => Some(Value::Bool(!matches!(
                s.to_ascii_lowercase().as_str(),
                "" | "0" | "false" | "off" | "no"
            ))),
            _ => None,
        },
        Value::Number(_) => match supplied {
            Value::Number(n) => Some(Value::Number(n.clone())),
            Value::Bool(b) => Some(Value::from(i64::from(*b))),
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        },
        // Null templates are optional strings
        Value::String(_) | Value::Null => match supplied {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            Value::Null => Some(Value::Null),
            _ => None,
        },
        _ => None,
    }
}

/// Fingerprint every field except the `echo` flag, which is declared
/// cache-insignificant: two calls differing only in `echo` share a slot.
fn fingerprint_without_echo<T: Serialize>(args: &T) -> String {
    let mut value = serde_json::to_value(args).expect("args must serialize");
    if let Some(map) = value.as_object_mut() {
        map.remove("echo");
    }
    cache::fingerprint_value(&value)
}
