//! Shared types used across all three resolvers.
//!
//! These types cross the engine boundary: callers construct [`ItemRef`]s to
//! say *what* is being resolved, and hosts may swap the [`Lexicon`] to
//! relocate every literal the resolvers can emit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the content unit a resolver call is about.
///
/// Invariants:
/// - `taxonomy` is set only for taxonomy terms.
/// - `is_home` is mutually exclusive with a set `taxonomy`.
///
/// Constructed per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Post id, or term id when `taxonomy` is set. `0` for the blog home.
    pub id: u64,
    /// Taxonomy name for term/archive items (`"category"`, `"post_tag"`, ...).
    pub taxonomy: Option<String>,
    /// Whether this is the site home (front page) render.
    pub is_home: bool,
}

impl ItemRef {
    /// A singular post or page.
    pub fn post(id: u64) -> Self {
        Self {
            id,
            taxonomy: None,
            is_home: false,
        }
    }

    /// A taxonomy term (term archive).
    pub fn term(taxonomy: impl Into<String>, id: u64) -> Self {
        Self {
            id,
            taxonomy: Some(taxonomy.into()),
            is_home: false,
        }
    }

    /// The site home page.
    pub fn home() -> Self {
        Self {
            id: 0,
            taxonomy: None,
            is_home: true,
        }
    }

    pub fn is_term(&self) -> bool {
        self.taxonomy.is_some()
    }

    /// Non-taxonomy archive: no id, no taxonomy, not the home page.
    /// Covers date/author/search/post-type archives, which carry no
    /// queried object of their own.
    pub fn is_archive(&self) -> bool {
        self.id == 0 && self.taxonomy.is_none() && !self.is_home
    }

    /// Cache key for this item: `"{taxonomy}_{id}"` when a taxonomy is
    /// present, else the numeric id, else the synthetic home id.
    pub fn key(&self) -> String {
        match &self.taxonomy {
            Some(tax) => format!("{}_{}", tax, self.id),
            None if self.is_home => "home".to_string(),
            None => self.id.to_string(),
        }
    }
}

/// URL scheme for canonical output and domain mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
        }
    }
}

/// Every localized literal the resolvers can insert.
///
/// The engine does not own localization tables; it only exposes the
/// insertion points. Hosts swap the defaults for translated strings.
/// Templates use `%s` as the placeholder for the wrapped title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    /// Fallback when the whole title cascade comes up empty.
    pub untitled: String,
    /// Title for 404 renders.
    pub not_found: String,
    /// Prefix for search-result titles; the query is appended after a space.
    pub search_prefix: String,
    /// Wrap for password-protected items (`%s` = bare title).
    pub protected: String,
    /// Wrap for private items (`%s` = bare title).
    pub private: String,
    /// Word used in pagination suffixes (`... | Page 2`).
    pub page_word: String,
    /// Connector between a generated description and the site name.
    pub connector: String,
    /// Ellipsis appended to truncated excerpts.
    pub ellipsis: String,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            untitled: "Untitled".to_string(),
            not_found: "404".to_string(),
            search_prefix: "Search results for:".to_string(),
            protected: "Protected: %s".to_string(),
            private: "Private: %s".to_string(),
            page_word: "Page".to_string(),
            connector: "on".to_string(),
            ellipsis: "...".to_string(),
        }
    }
}

impl Lexicon {
    /// Apply a `%s` template to a title.
    pub fn wrap(template: &str, title: &str) -> String {
        template.replace("%s", title)
    }
}
