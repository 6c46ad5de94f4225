//! Meta description resolution.
//!
//! Explicit descriptions come from the home-description option, the
//! item's custom description field, or the term's custom field. When no
//! explicit value exists, one is **generated**: the item's bare title
//! phrase joined with a length-bounded excerpt synthesized from the
//! excerpt field, term description, or content body.
//!
//! Generation touches content-body parsing and is comparatively
//! expensive, so generated values are cached across requests for one
//! week under a versioned key. Hosts call
//! [`Engine::invalidate_description`](crate::engine::Engine::invalidate_description)
//! when the underlying content changes.
//!
//! Every returned description passes one normalization pipeline
//! (entities decoded, tags stripped, whitespace collapsed); output is
//! plain text, never pre-escaped. An item with no title, no excerpt
//! source, and no site-name fallback resolves to the empty string —
//! callers decide whether empty is acceptable.

use crate::args::{DescriptionArgs, TitleArgs};
use crate::cache::{DESCRIPTION_TTL, MemoKey, Resolver, description_key};
use crate::content::DESCRIPTION_FIELD;
use crate::context::RequestContext;
use crate::engine::Engine;
use crate::hooks;
use crate::options;
use crate::separator::SepContext;
use crate::text;
use crate::types::ItemRef;

/// Budget for a whole generated description, without the site name.
const DESCRIPTION_BUDGET: usize = 151;
/// Budget when the site name and connector are appended.
const DESCRIPTION_BUDGET_WITH_BLOGNAME: usize = 149;

impl Engine {
    /// Resolve the meta description for an item.
    pub fn resolve_description(
        &self,
        ctx: &RequestContext,
        item: &ItemRef,
        args: &DescriptionArgs,
    ) -> String {
        let memo_key = MemoKey::new(Resolver::Description, item.key(), args.fingerprint());
        if let Some(cached) = ctx.memo_get(&memo_key) {
            return cached;
        }

        let result = hooks::winning(
            self.description_hook
                .as_ref()
                .and_then(|h| h.description(item)),
        )
        .map(|hooked| text::normalize(&hooked))
        .or_else(|| self.custom_description(item, args))
        .unwrap_or_else(|| self.generated_description(ctx, item));

        ctx.memo_put(memo_key, result.clone());
        result
    }

    /// Positional compatibility shim for legacy call sites.
    pub fn resolve_description_legacy(&self, ctx: &RequestContext, id: u64) -> String {
        log::warn!(
            "resolve_description with a positional id is deprecated; pass an ItemRef and DescriptionArgs"
        );
        self.resolve_description(ctx, &ItemRef::post(id), &DescriptionArgs::default())
    }

    /// Explicit description sources, first non-empty wins.
    fn custom_description(&self, item: &ItemRef, args: &DescriptionArgs) -> Option<String> {
        if !args.use_custom_field {
            return None;
        }
        let value = if self.is_front_item(item) {
            self.options.get_str(options::HOME_DESCRIPTION)
        } else if let Some(tax) = &item.taxonomy {
            self.content
                .term_custom_field(tax, item.id, DESCRIPTION_FIELD)
        } else if item.id != 0 {
            self.content.custom_field(DESCRIPTION_FIELD, item.id)
        } else {
            None
        };
        hooks::winning(value).map(|v| text::normalize(&v))
    }

    /// Generate a description, consulting the cross-request cache first.
    fn generated_description(&self, ctx: &RequestContext, item: &ItemRef) -> String {
        let key = description_key(&item.key());
        if let Some(cached) = self.store.get(&key) {
            self.desc_stats.lock().expect("stats poisoned").hit();
            return cached;
        }

        let value = self.synthesize_description(ctx, item);
        self.store.set(&key, &value, DESCRIPTION_TTL);
        let mut stats = self.desc_stats.lock().expect("stats poisoned");
        stats.miss();
        log::debug!("description cache: {stats}");
        value
    }

    fn synthesize_description(&self, ctx: &RequestContext, item: &ItemRef) -> String {
        let title_args = TitleArgs {
            notagline: true,
            for_description: true,
            ..Default::default()
        };
        let mut phrase = text::normalize(&self.bare_title(ctx, item, &title_args));
        // The untitled literal is a title-only affordance; a description
        // built on it would say nothing about the content
        if phrase == self.lexicon.untitled {
            phrase.clear();
        }

        let include_blogname = self
            .options
            .get_bool(options::DESCRIPTION_INCLUDE_BLOGNAME, false);
        let sitename = self.site_name();

        let max_length = if include_blogname {
            let reserved = format!("{phrase} {} {sitename}", self.lexicon.connector);
            DESCRIPTION_BUDGET_WITH_BLOGNAME.saturating_sub(text::char_count(&reserved))
        } else {
            DESCRIPTION_BUDGET.saturating_sub(text::char_count(&phrase))
        };

        let source = self.excerpt_source(item);
        let excerpt = text::truncate_words(&text::normalize(&source), max_length, &self.lexicon.ellipsis);

        if !excerpt.is_empty() && !phrase.is_empty() {
            let sep = self.separator(ctx, SepContext::Description);
            format!("{phrase} {sep} {excerpt}")
        } else if !excerpt.is_empty() {
            excerpt
        } else if include_blogname && !phrase.is_empty() && !sitename.is_empty() {
            format!("{phrase} {} {sitename}", self.lexicon.connector)
        } else {
            phrase
        }
    }

    /// Raw excerpt source: explicit excerpt field, else term
    /// description, else the content body with shortcodes stripped (tag
    /// stripping happens in normalization).
    fn excerpt_source(&self, item: &ItemRef) -> String {
        if let Some(tax) = &item.taxonomy {
            return self
                .content
                .term(tax, item.id)
                .map(|t| t.description)
                .unwrap_or_default();
        }
        if item.id == 0 {
            return String::new();
        }
        match self.content.post(item.id) {
            Some(post) => match post.excerpt.filter(|e| !e.trim().is_empty()) {
                Some(excerpt) => excerpt,
                None => text::strip_shortcodes(&post.content),
            },
            None => String::new(),
        }
    }

    /// Home-page resolution: the home item itself, or the designated
    /// static front page.
    pub(crate) fn is_front_item(&self, item: &ItemRef) -> bool {
        if item.is_home {
            return true;
        }
        let front_id = self.static_front_page();
        front_id != 0 && !item.is_term() && item.id == front_id
    }
}
