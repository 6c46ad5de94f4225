//! Per-request resolution state.
//!
//! Resolved titles, URLs, and separators are memoized in an explicit
//! [`RequestContext`] rather than anything process-wide: constructed when
//! a request starts, passed to every resolver call, discarded when the
//! request ends. Nothing in it survives to the next request, so
//! cross-request leakage is structurally impossible.
//!
//! [`RenderState`] carries the facts about the current render that the
//! host's request dispatcher knows: what kind of page is being rendered,
//! pagination counters, whether the connection is secure, and the raw
//! request path (used as the canonical fallback for non-taxonomy
//! archives).

use std::cell::RefCell;
use std::collections::HashMap;

use crate::cache::MemoKey;
use crate::separator::SepContext;

/// Facts about the current render, supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    /// Syndication feed render: titles pass through undecorated.
    pub is_feed: bool,
    /// Admin screen render: editor state is mutable mid-request, so the
    /// title memo is bypassed.
    pub is_admin: bool,
    pub is_preview: bool,
    pub is_404: bool,
    /// `Some` when rendering search results; the query string itself.
    pub search_query: Option<String>,
    /// Body-page counter (`<!--nextpage-->` style splits), 0 or 1 when
    /// not paginated.
    pub page: u32,
    /// Archive-page counter, 0 or 1 when not paginated.
    pub paged: u32,
    pub max_pages: u32,
    /// Whether the current request arrived over TLS.
    pub is_secure: bool,
    /// Raw path of the current request, e.g. `"/2024/03/"`.
    pub request_path: String,
}

impl RenderState {
    pub fn is_search(&self) -> bool {
        self.search_query.is_some()
    }

    /// The effective page number: the larger of the two counters.
    pub fn page_number(&self) -> u32 {
        self.page.max(self.paged)
    }

    pub fn is_paged(&self) -> bool {
        self.page_number() >= 2
    }
}

/// State scoped to one resolution pass of one incoming request.
///
/// Holds the per-request memoization for titles, descriptions, URLs, and
/// separators. The engine is single-threaded per request, so interior
/// mutability is a plain `RefCell`.
#[derive(Debug, Default)]
pub struct RequestContext {
    pub render: RenderState,
    memo: RefCell<HashMap<MemoKey, String>>,
    separators: RefCell<HashMap<SepContext, String>>,
}

impl RequestContext {
    pub fn new(render: RenderState) -> Self {
        Self {
            render,
            memo: RefCell::new(HashMap::new()),
            separators: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn memo_get(&self, key: &MemoKey) -> Option<String> {
        self.memo.borrow().get(key).cloned()
    }

    pub(crate) fn memo_put(&self, key: MemoKey, value: String) {
        self.memo.borrow_mut().insert(key, value);
    }

    /// Separator for a context, resolved at most once per request.
    pub(crate) fn separator_memo(
        &self,
        context: SepContext,
        resolve: impl FnOnce() -> String,
    ) -> String {
        if let Some(glyph) = self.separators.borrow().get(&context) {
            return glyph.clone();
        }
        let glyph = resolve();
        self.separators
            .borrow_mut()
            .insert(context, glyph.clone());
        glyph
    }
}
