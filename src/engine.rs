//! Engine assembly.
//!
//! An [`Engine`] owns the external collaborators (option store, content
//! accessor), the optional hooks and adapters, and the cross-request
//! cache store. It is constructed once per site and outlives requests;
//! per-request state lives in
//! [`RequestContext`](crate::context::RequestContext), which callers
//! create fresh for every incoming request.
//!
//! The three resolution entry points are implemented in their own
//! modules: [`crate::title`], [`crate::description`], [`crate::url`].

use std::sync::Mutex;

use crate::adapters::{DomainMappingAdapter, TranslationAdapter};
use crate::cache::{CacheStats, CacheStore, MemoryStore, description_key};
use crate::content::ContentAccessor;
use crate::hooks::{DescriptionHook, TitleHook};
use crate::options::{self, OptionStore};
use crate::types::{ItemRef, Lexicon};

/// The metadata resolution engine for one site.
pub struct Engine {
    pub(crate) options: Box<dyn OptionStore>,
    pub(crate) content: Box<dyn ContentAccessor>,
    pub(crate) title_hook: Option<Box<dyn TitleHook>>,
    pub(crate) description_hook: Option<Box<dyn DescriptionHook>>,
    pub(crate) domain_adapters: Vec<Box<dyn DomainMappingAdapter>>,
    pub(crate) translation: Option<Box<dyn TranslationAdapter>>,
    pub(crate) store: Box<dyn CacheStore>,
    pub(crate) lexicon: Lexicon,
    /// Whether the host theme declares native title-tag support. Themes
    /// without it go through the legacy compatibility path when they
    /// pass their own separators.
    pub(crate) native_title_tag: bool,
    pub(crate) desc_stats: Mutex<CacheStats>,
}

impl Engine {
    pub fn new(
        options: impl OptionStore + 'static,
        content: impl ContentAccessor + 'static,
    ) -> Self {
        Self {
            options: Box::new(options),
            content: Box::new(content),
            title_hook: None,
            description_hook: None,
            domain_adapters: Vec::new(),
            translation: None,
            store: Box::new(MemoryStore::new()),
            lexicon: Lexicon::default(),
            native_title_tag: true,
            desc_stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn with_title_hook(mut self, hook: impl TitleHook + 'static) -> Self {
        self.title_hook = Some(Box::new(hook));
        self
    }

    pub fn with_description_hook(mut self, hook: impl DescriptionHook + 'static) -> Self {
        self.description_hook = Some(Box::new(hook));
        self
    }

    /// Register a domain-mapping adapter. Adapters are consulted in
    /// registration order; the first active mapping wins.
    pub fn with_domain_adapter(mut self, adapter: impl DomainMappingAdapter + 'static) -> Self {
        self.domain_adapters.push(Box::new(adapter));
        self
    }

    pub fn with_translation(mut self, adapter: impl TranslationAdapter + 'static) -> Self {
        self.translation = Some(Box::new(adapter));
        self
    }

    /// Swap the cross-request cache store (default: in-process
    /// [`MemoryStore`]).
    pub fn with_store(mut self, store: impl CacheStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_native_title_tag(mut self, native: bool) -> Self {
        self.native_title_tag = native;
        self
    }

    /// Invalidate the cached generated description for an item. Hosts
    /// call this when the underlying content changes.
    pub fn invalidate_description(&self, item: &ItemRef) {
        self.store.delete(&description_key(&item.key()));
    }

    /// Hit/miss counters for the generated-description cache.
    pub fn description_stats(&self) -> CacheStats {
        *self.desc_stats.lock().expect("stats poisoned")
    }

    // =========================================================================
    // Shared option shorthands
    // =========================================================================

    pub(crate) fn site_name(&self) -> String {
        self.options.get_str(options::SITE_NAME).unwrap_or_default()
    }

    /// Post id of the designated static front page, 0 when none.
    pub(crate) fn static_front_page(&self) -> u64 {
        self.options.get_u64(options::PAGE_ON_FRONT)
    }
}
