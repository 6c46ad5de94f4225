//! Capability adapters for multisite domain mapping and URL translation.
//!
//! Companion-plugin integration is a capability trait, not runtime
//! probing: each capability has shipped implementations, and an engine
//! without registered adapters takes the no-op path, which is the
//! default case.
//!
//! **Domain mapping**: a multisite install may remap a site onto a
//! custom external domain. Adapters are consulted in registration order;
//! the first one reporting an active mapping supplies the base URL and
//! scheme directly, short-circuiting host assembly. Each adapter caches
//! its site-level lookup for one hour
//! ([`DOMAIN_MAP_TTL`](crate::cache::DOMAIN_MAP_TTL)), independent of any
//! per-request state.
//!
//! **Translation**: a language-localization layer may rewrite canonical
//! paths. The engine treats it as a pure path-in/path-out transform plus
//! an optional host override; adapters see the site-relative path,
//! before the home base path is prefixed.

use crate::cache::{DOMAIN_MAP_TTL, TtlSlot};
use crate::types::Scheme;

// =============================================================================
// Domain mapping
// =============================================================================

/// An active mapping: the URL base (scheme + host, no trailing slash)
/// the site's paths should be assembled under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMapping {
    pub base_url: String,
    pub scheme: Scheme,
}

/// One candidate row in a mapping table.
#[derive(Debug, Clone)]
pub struct DomainMapEntry {
    pub id: u64,
    pub domain: String,
    pub scheme: Scheme,
    pub is_primary: bool,
}

/// "Is this site domain-mapped?" capability.
pub trait DomainMappingAdapter: Send + Sync {
    /// The active mapping for the current site, or `None`.
    fn mapping(&self) -> Option<DomainMapping>;
}

/// Table-driven mapping adapter: picks the entry marked primary, else
/// the lowest-id entry. The pick is cached for one hour because the
/// table originates from an external plugin's storage.
pub struct TableDomainMapping {
    entries: Vec<DomainMapEntry>,
    cache: TtlSlot<Option<DomainMapping>>,
}

impl TableDomainMapping {
    pub fn new(entries: Vec<DomainMapEntry>) -> Self {
        Self {
            entries,
            cache: TtlSlot::new(),
        }
    }

    fn pick(&self) -> Option<DomainMapping> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.is_primary)
            .or_else(|| self.entries.iter().min_by_key(|e| e.id))?;
        Some(DomainMapping {
            base_url: format!("{}://{}", entry.scheme, entry.domain),
            scheme: entry.scheme,
        })
    }
}

impl DomainMappingAdapter for TableDomainMapping {
    fn mapping(&self) -> Option<DomainMapping> {
        self.cache.get_or_insert_with(DOMAIN_MAP_TTL, || self.pick())
    }
}

// =============================================================================
// Translation
// =============================================================================

/// Result of a translation rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    /// The rewritten site-relative path.
    pub path: String,
    /// Host to use instead of the home host (per-language domains).
    pub host_override: Option<String>,
}

impl PathRewrite {
    /// A rewrite that changes nothing.
    pub fn unchanged(path: &str) -> Self {
        Self {
            path: path.to_string(),
            host_override: None,
        }
    }
}

/// Language-negotiation capability.
pub trait TranslationAdapter: Send + Sync {
    fn rewrite(&self, path: &str) -> PathRewrite;
}

/// The default when no translation layer is active.
pub struct NoopTranslation;

impl TranslationAdapter for NoopTranslation {
    fn rewrite(&self, path: &str) -> PathRewrite {
        PathRewrite::unchanged(path)
    }
}

/// Subdirectory negotiation: `/about/` becomes `/fr/about/`.
pub struct SubdirectoryTranslation {
    pub lang: String,
}

impl TranslationAdapter for SubdirectoryTranslation {
    fn rewrite(&self, path: &str) -> PathRewrite {
        let rest = path.strip_prefix('/').unwrap_or(path);
        PathRewrite {
            path: format!("/{}/{}", self.lang, rest),
            host_override: None,
        }
    }
}

/// Query-parameter negotiation: `/about/` becomes `/about/?lang=fr`.
pub struct QueryParamTranslation {
    pub lang: String,
}

impl TranslationAdapter for QueryParamTranslation {
    fn rewrite(&self, path: &str) -> PathRewrite {
        let joiner = if path.contains('?') { '&' } else { '?' };
        PathRewrite {
            path: format!("{path}{joiner}lang={}", self.lang),
            host_override: None,
        }
    }
}

/// Per-language domain negotiation: the path is untouched but the host
/// is substituted (e.g. `fr.example.com`).
pub struct DomainTranslation {
    pub host: String,
}

impl TranslationAdapter for DomainTranslation {
    fn rewrite(&self, path: &str) -> PathRewrite {
        PathRewrite {
            path: path.to_string(),
            host_override: Some(self.host.clone()),
        }
    }
}
