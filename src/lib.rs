//! # Pagemeta
//!
//! Per-page SEO metadata resolution for CMS content: given an item
//! reference (post, page, term archive, search, home) and the facts
//! about the current render, compute the document title, the meta
//! description, and the canonical URL.
//!
//! None of this is simple field lookup. Each value comes out of a
//! deterministic, multi-source fallback cascade (custom field →
//! per-item generated value → site-wide option → global default)
//! combined with composition rules (separators, affixes, pagination
//! suffixes, length budgets) and, for URLs, location-dependent path
//! assembly with adapter seams for domain mapping and translation
//! layers.
//!
//! # Architecture: Engine + Request Context
//!
//! An [`engine::Engine`] is built once per site around two external
//! collaborators — an [`options::OptionStore`] (keyed site
//! configuration) and a [`content::ContentAccessor`] (raw item
//! attributes). Per-request state lives in a
//! [`context::RequestContext`], created fresh for every incoming
//! request and discarded with it:
//!
//! ```text
//! let engine = Engine::new(options, content);        // per site
//! let ctx = RequestContext::new(render_state);       // per request
//! let title = engine.resolve_title(&ctx, &item, &args);
//! let desc  = engine.resolve_description(&ctx, &item, &args);
//! let url   = engine.resolve_url(&ctx, &item, &args);
//! ```
//!
//! All three resolvers are idempotent: identical calls within one
//! request return byte-identical strings, backed by per-request
//! memoization keyed on `(resolver, item, argument fingerprint)`.
//! Results are plain strings, never pre-escaped — context-appropriate
//! escaping belongs to the caller embedding them in markup.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | `Engine` assembly: collaborators, hooks, adapters, cache store |
//! | [`title`] | Title resolution: bare-title cascade, affixes, pagination, site-name composition, legacy compatibility mode |
//! | [`description`] | Description resolution: explicit sources, length-bounded generation, week-long cache |
//! | [`url`] | Canonical URL resolution: per-type paths, translation rewriting, domain mapping, scheme and slash policy |
//! | [`separator`] | Configured joining glyph per context, memoized per request |
//! | [`args`] | Typed argument bags with permissive merge-over-defaults construction |
//! | [`context`] | `RenderState` and the per-request memoization context |
//! | [`cache`] | Memo keys, the cross-request `CacheStore`, TTL slots, stats |
//! | [`options`] | Option store trait, coercing getters, TOML loader, option keys |
//! | [`content`] | Content accessor trait, attribute bags, in-memory implementation |
//! | [`adapters`] | Domain-mapping and translation capability traits plus shipped implementations |
//! | [`hooks`] | Short-circuit title/description extension points |
//! | [`text`] | Entity decoding, tag/shortcode stripping, word-boundary truncation |
//! | [`types`] | `ItemRef`, `Scheme`, and the `Lexicon` of literal insertion points |
//!
//! # Design Decisions
//!
//! ## No Errors on the Resolution Path
//!
//! Missing data is not an error: absence at any cascade step falls
//! through to the next source, terminating in a literal placeholder
//! only for titles. Malformed caller arguments are coerced or dropped
//! to defaults at the [`args`] boundary. The worst observable failure
//! is a less-specific metadata string, never a failed render. The only
//! `Result` in the crate is the host-facing TOML options loader.
//!
//! ## Explicit Context Instead of Statics
//!
//! The per-request caches are held by an explicit context object with
//! a scoped lifetime rather than process-wide statics, so state cannot
//! leak between requests. Two further cache tiers exist with longer
//! lifetimes: generated descriptions (one week, versioned keys, host
//! invalidation hook) and adapter domain lookups (one hour), both
//! behind the [`cache::CacheStore`] abstraction.
//!
//! ## Capability Traits Instead of Plugin Probing
//!
//! Companion-plugin integration (multisite domain mapping, language
//! negotiation) is expressed as capability traits with no-op defaults,
//! selected explicitly at engine construction. The absent-adapter case
//! is the default path, not a runtime discovery failure.
//!
//! ## Preserved Quirks
//!
//! The title separator honors its historically misspelled option key
//! (`title_seperator`) as a read alias, and the legacy title-filter
//! compatibility mode reproduces the old re-wrapping behavior for
//! themes without native title-tag support. Both are documented in
//! [`options`] and [`title`].

pub mod adapters;
pub mod args;
pub mod cache;
pub mod content;
pub mod context;
pub mod description;
pub mod engine;
pub mod hooks;
pub mod options;
pub mod separator;
pub mod text;
pub mod title;
pub mod types;
pub mod url;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use args::{DescriptionArgs, TitleArgs, UrlArgs};
pub use context::{RenderState, RequestContext};
pub use engine::Engine;
pub use types::{ItemRef, Lexicon, Scheme};
