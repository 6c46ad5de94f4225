//! Document title resolution.
//!
//! The final title is produced in two layers. The **bare title** comes
//! from an ordered source cascade — override hook, custom field, then a
//! per-type generator — with protection affixes and a pagination suffix
//! applied on top. **Composition** then joins the bare title with the
//! site name on the configured side, unless the caller asked for the
//! undecorated form (`notagline`) or the relevant toggle is off.
//!
//! Resolution order for the bare title, first non-empty wins:
//!
//! 1. the registered [`TitleHook`](crate::hooks::TitleHook)
//! 2. the item's custom title field (when `use_custom_field`)
//! 3. front page: home title option, the front page's own custom field,
//!    the site name
//! 4. term: its custom title field, `"{label}: {name}"`, the raw label
//! 5. 404 literal / search prefix + query / the stored post title
//! 6. the untitled literal
//!
//! Feed renders bypass everything: feeds must not be decorated, so the
//! caller's raw title is returned trimmed, verbatim.
//!
//! Results are memoized per item for the rest of the request, except on
//! admin screens where editor state is mutable mid-request and every
//! call recomputes.

use crate::args::TitleArgs;
use crate::cache::{MemoKey, Resolver};
use crate::content::TITLE_FIELD;
use crate::context::RequestContext;
use crate::engine::Engine;
use crate::hooks;
use crate::options;
use crate::separator::SepContext;
use crate::types::{ItemRef, Lexicon};

impl Engine {
    /// Resolve the document title for an item.
    pub fn resolve_title(&self, ctx: &RequestContext, item: &ItemRef, args: &TitleArgs) -> String {
        // Feeds must not be decorated
        if ctx.render.is_feed {
            return args.title.as_deref().unwrap_or("").trim().to_string();
        }

        // Legacy title-filter calls announce themselves by carrying their
        // own separator; they bypass the cascade entirely
        if let Some(sep) = args.sep.as_deref()
            && !sep.is_empty()
        {
            let raw = args.title.as_deref().unwrap_or("");
            let location = args.seplocation.as_deref().unwrap_or("right");
            return self.legacy_title(ctx, raw, sep, location);
        }

        let memo_key = MemoKey::new(Resolver::Title, item.key(), args.fingerprint());
        if !ctx.render.is_admin
            && let Some(cached) = ctx.memo_get(&memo_key)
        {
            return cached;
        }

        let bare = self.bare_title(ctx, item, args);
        let result = if args.notagline {
            bare
        } else {
            self.compose_blogname(ctx, item, args, bare)
        };

        if !ctx.render.is_admin {
            ctx.memo_put(memo_key, result.clone());
        }
        result
    }

    /// Positional compatibility shim for legacy call sites.
    pub fn resolve_title_legacy(&self, ctx: &RequestContext, id: u64) -> String {
        log::warn!("resolve_title with a positional id is deprecated; pass an ItemRef and TitleArgs");
        self.resolve_title(ctx, &ItemRef::post(id), &TitleArgs::default())
    }

    /// Legacy title-filter compatibility mode.
    ///
    /// Active only when the host theme lacks native title-tag support
    /// *and* the caller passed its own separator: the already-bare title
    /// is stripped of the caller's separator token at either edge (to
    /// avoid doubling), then re-wrapped with the engine's resolved
    /// separator, site name always on the right. With native title-tag
    /// support, or without a caller separator, the input passes through
    /// untouched.
    pub fn legacy_title(
        &self,
        ctx: &RequestContext,
        title: &str,
        sep: &str,
        _seplocation: &str,
    ) -> String {
        if self.native_title_tag || sep.is_empty() {
            return title.to_string();
        }
        log::debug!("legacy title filter re-wrapping with caller separator {sep:?}");

        let stripped = strip_edge_separator(title.trim(), sep);
        let name = self.site_name();
        if name.is_empty() {
            return stripped;
        }
        let engine_sep = self.separator(ctx, SepContext::Title);
        format!("{stripped} {engine_sep} {name}")
    }

    /// The bare title: cascade plus affixes plus pagination, no site
    /// name. This is what `notagline` callers and the description
    /// generator consume.
    pub(crate) fn bare_title(
        &self,
        ctx: &RequestContext,
        item: &ItemRef,
        args: &TitleArgs,
    ) -> String {
        let front = self.is_front_resolution(item, args);

        let mut title = hooks::winning(
            self.title_hook.as_ref().and_then(|h| h.bare_title(item)),
        )
        .or_else(|| self.custom_title_field(item, args))
        .or_else(|| self.generated_title(ctx, item, front))
        .unwrap_or_else(|| self.lexicon.untitled.clone());

        // Protection affixes: singular items only, never for description
        // phrases
        if !args.for_description
            && !item.is_term()
            && !item.is_home
            && item.id != 0
            && let Some(post) = self.content.post(item.id)
        {
            if post.is_protected() {
                title = Lexicon::wrap(&self.lexicon.protected, &title);
            } else if post.is_private() {
                title = Lexicon::wrap(&self.lexicon.private, &title);
            }
        }

        // Pagination suffix
        let render = &ctx.render;
        if render.is_paged() && !render.is_404 && !render.is_admin && !render.is_preview {
            let sep = self.separator(ctx, SepContext::Title);
            let n = render.page_number();
            title.push_str(&format!(" {sep} {} {n}", self.lexicon.page_word));
        }

        title
    }

    /// Whether this call resolves the front page.
    fn is_front_resolution(&self, item: &ItemRef, args: &TitleArgs) -> bool {
        args.page_on_front || args.is_front_page || self.is_front_item(item)
    }

    fn custom_title_field(&self, item: &ItemRef, args: &TitleArgs) -> Option<String> {
        if !args.use_custom_field {
            return None;
        }
        let value = match &item.taxonomy {
            Some(tax) => self.content.term_custom_field(tax, item.id, TITLE_FIELD),
            None if item.id != 0 => self.content.custom_field(TITLE_FIELD, item.id),
            None => None,
        };
        hooks::winning(value)
    }

    fn generated_title(&self, ctx: &RequestContext, item: &ItemRef, front: bool) -> Option<String> {
        if front {
            return self.home_title_source();
        }
        if let Some(tax) = &item.taxonomy {
            return self.term_title_source(tax, item.id);
        }
        if ctx.render.is_404 {
            return hooks::winning(Some(self.lexicon.not_found.clone()));
        }
        if let Some(query) = &ctx.render.search_query {
            return Some(format!("{} {query}", self.lexicon.search_prefix));
        }
        hooks::winning(self.content.post(item.id).map(|p| p.title))
    }

    /// Home titles have their own cascade: explicit option, the front
    /// page's own custom field, the site name.
    fn home_title_source(&self) -> Option<String> {
        hooks::winning(self.options.get_str(options::HOME_TITLE))
            .or_else(|| {
                let front_id = self.static_front_page();
                if front_id == 0 {
                    return None;
                }
                hooks::winning(self.content.custom_field(TITLE_FIELD, front_id))
            })
            .or_else(|| hooks::winning(Some(self.site_name())))
    }

    fn term_title_source(&self, taxonomy: &str, id: u64) -> Option<String> {
        if let Some(custom) =
            hooks::winning(self.content.term_custom_field(taxonomy, id, TITLE_FIELD))
        {
            return Some(custom);
        }
        let label = self
            .content
            .taxonomy(taxonomy)
            .map(|t| t.label)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| taxonomy.to_string());
        match self.content.term(taxonomy, id) {
            Some(term) if !term.name.is_empty() => Some(format!("{label}: {}", term.name)),
            _ => Some(label),
        }
    }

    fn compose_blogname(
        &self,
        ctx: &RequestContext,
        item: &ItemRef,
        args: &TitleArgs,
        bare: String,
    ) -> String {
        let front = self.is_front_resolution(item, args);
        let enabled = if front {
            self.options.get_bool(options::HOME_ADD_TAGLINE, false)
        } else {
            self.options.get_bool(options::ADD_BLOGNAME, false)
        };
        if !enabled {
            return bare;
        }
        let name = self.site_name();
        if name.is_empty() || name == bare {
            return bare;
        }
        let sep = self.separator(ctx, SepContext::Title);
        let location_key = if front {
            options::HOME_BLOGNAME_LOCATION
        } else {
            options::BLOGNAME_LOCATION
        };
        let location = self
            .options
            .get_str(location_key)
            .unwrap_or_else(|| "right".to_string());
        if location == "left" {
            format!("{name} {sep} {bare}")
        } else {
            format!("{bare} {sep} {name}")
        }
    }
}

/// Strip a leading and trailing occurrence of the caller's separator
/// token, with its surrounding whitespace.
fn strip_edge_separator(title: &str, sep: &str) -> String {
    let mut t = title;
    if let Some(rest) = t.strip_prefix(sep) {
        t = rest.trim_start();
    }
    if let Some(rest) = t.strip_suffix(sep) {
        t = rest.trim_end();
    }
    t.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        CountingTitleHook, FixedTitleHook, PostAttrs, RenderState, Site, request,
    };

    // =========================================================================
    // Cascade order
    // =========================================================================

    #[test]
    fn custom_field_wins_over_post_title() {
        let mut site = Site::basic();
        site.content.set_field(42, TITLE_FIELD, "Custom Title");
        let engine = site.engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        assert_eq!(title, "Custom Title");
    }

    #[test]
    fn post_title_used_without_custom_field() {
        let engine = Site::basic().engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        assert_eq!(title, "Hello World");
    }

    #[test]
    fn custom_field_ignored_when_disabled() {
        let mut site = Site::basic();
        site.content.set_field(42, TITLE_FIELD, "Custom Title");
        let engine = site.engine();
        let ctx = request();

        let args = TitleArgs {
            use_custom_field: false,
            ..Default::default()
        };
        assert_eq!(engine.resolve_title(&ctx, &ItemRef::post(42), &args), "Hello World");
    }

    #[test]
    fn untitled_fallback_when_everything_absent() {
        let engine = Site::basic().engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(999), &TitleArgs::default());
        assert_eq!(title, "Untitled");
    }

    #[test]
    fn hook_short_circuits_cascade() {
        let mut site = Site::basic();
        site.content.set_field(42, TITLE_FIELD, "Custom Title");
        let engine = site.engine().with_title_hook(FixedTitleHook("Hooked"));
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        assert_eq!(title, "Hooked");
    }

    // =========================================================================
    // Per-type generators
    // =========================================================================

    #[test]
    fn term_title_joins_label_and_name() {
        let engine = Site::basic().engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::term("category", 7), &TitleArgs::default());
        assert_eq!(title, "Category: News");
    }

    #[test]
    fn term_custom_field_wins() {
        let mut site = Site::basic();
        site.content
            .set_term_field("category", 7, TITLE_FIELD, "All The News");
        let engine = site.engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::term("category", 7), &TitleArgs::default());
        assert_eq!(title, "All The News");
    }

    #[test]
    fn unknown_term_falls_back_to_label() {
        let engine = Site::basic().engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::term("category", 99), &TitleArgs::default());
        assert_eq!(title, "Category");
    }

    #[test]
    fn not_found_render_uses_404_literal() {
        let engine = Site::basic().engine();
        let mut render = RenderState::default();
        render.is_404 = true;
        let ctx = RequestContext::new(render);

        let title = engine.resolve_title(&ctx, &ItemRef::post(0), &TitleArgs::default());
        assert_eq!(title, "404");
    }

    #[test]
    fn search_render_prefixes_query() {
        let engine = Site::basic().engine();
        let mut render = RenderState::default();
        render.search_query = Some("rust".to_string());
        let ctx = RequestContext::new(render);

        let title = engine.resolve_title(&ctx, &ItemRef::post(0), &TitleArgs::default());
        assert_eq!(title, "Search results for: rust");
    }

    #[test]
    fn home_uses_home_title_option() {
        let mut site = Site::basic();
        site.options.set(options::HOME_TITLE, "Welcome Home");
        let engine = site.engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::home(), &TitleArgs::default());
        assert_eq!(title, "Welcome Home");
    }

    #[test]
    fn home_falls_back_to_site_name() {
        let engine = Site::basic().engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::home(), &TitleArgs::default());
        assert_eq!(title, "My Site");
    }

    #[test]
    fn static_front_page_uses_home_generator() {
        let mut site = Site::basic();
        site.options.set(options::PAGE_ON_FRONT, 42i64);
        site.options.set(options::HOME_TITLE, "Front Matters");
        // Custom field on the page itself would win at the cascade's
        // custom-field step, so clear the stage for the generator.
        let engine = site.engine();
        let ctx = request();

        let args = TitleArgs {
            use_custom_field: false,
            ..Default::default()
        };
        let title = engine.resolve_title(&ctx, &ItemRef::post(42), &args);
        assert_eq!(title, "Front Matters");
    }

    // =========================================================================
    // Affixes and pagination
    // =========================================================================

    #[test]
    fn protected_post_is_wrapped() {
        let mut site = Site::basic();
        site.content.add_post(PostAttrs {
            id: 50,
            title: "Secret Post".to_string(),
            status: "publish".to_string(),
            password: Some("pw".to_string()),
            ..Default::default()
        });
        let engine = site.engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(50), &TitleArgs::default());
        assert_eq!(title, "Protected: Secret Post");
    }

    #[test]
    fn private_post_is_wrapped() {
        let mut site = Site::basic();
        site.content.add_post(PostAttrs {
            id: 51,
            title: "Quiet Post".to_string(),
            status: "private".to_string(),
            ..Default::default()
        });
        let engine = site.engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(51), &TitleArgs::default());
        assert_eq!(title, "Private: Quiet Post");
    }

    #[test]
    fn description_context_skips_affixes() {
        let mut site = Site::basic();
        site.content.add_post(PostAttrs {
            id: 50,
            title: "Secret Post".to_string(),
            status: "publish".to_string(),
            password: Some("pw".to_string()),
            ..Default::default()
        });
        let engine = site.engine();
        let ctx = request();

        let args = TitleArgs {
            for_description: true,
            notagline: true,
            ..Default::default()
        };
        assert_eq!(engine.resolve_title(&ctx, &ItemRef::post(50), &args), "Secret Post");
    }

    #[test]
    fn page_two_appends_suffix() {
        let engine = Site::basic().engine();
        let mut render = RenderState::default();
        render.page = 2;
        render.paged = 1;
        let ctx = RequestContext::new(render);

        let args = TitleArgs {
            notagline: true,
            ..Default::default()
        };
        let title = engine.resolve_title(&ctx, &ItemRef::post(42), &args);
        assert_eq!(title, "Hello World | Page 2");
    }

    #[test]
    fn unpaged_render_has_no_suffix() {
        let engine = Site::basic().engine();
        let mut render = RenderState::default();
        render.page = 1;
        render.paged = 1;
        let ctx = RequestContext::new(render);

        let args = TitleArgs {
            notagline: true,
            ..Default::default()
        };
        assert_eq!(engine.resolve_title(&ctx, &ItemRef::post(42), &args), "Hello World");
    }

    #[test]
    fn preview_suppresses_pagination_suffix() {
        let engine = Site::basic().engine();
        let mut render = RenderState::default();
        render.page = 2;
        render.is_preview = true;
        let ctx = RequestContext::new(render);

        let args = TitleArgs {
            notagline: true,
            ..Default::default()
        };
        assert_eq!(engine.resolve_title(&ctx, &ItemRef::post(42), &args), "Hello World");
    }

    // =========================================================================
    // Blogname composition
    // =========================================================================

    #[test]
    fn blogname_joined_right() {
        let mut site = Site::basic();
        site.options.set(options::ADD_BLOGNAME, true);
        site.options.set(options::BLOGNAME_LOCATION, "right");
        let engine = site.engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        assert_eq!(title, "Hello World | My Site");
    }

    #[test]
    fn blogname_joined_left() {
        let mut site = Site::basic();
        site.options.set(options::ADD_BLOGNAME, true);
        site.options.set(options::BLOGNAME_LOCATION, "left");
        let engine = site.engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        assert_eq!(title, "My Site | Hello World");
    }

    #[test]
    fn dash_separator_via_legacy_key() {
        let mut site = Site::basic();
        site.options.set(options::ADD_BLOGNAME, true);
        site.options.remove(options::TITLE_SEPARATOR);
        site.options.set(options::TITLE_SEPARATOR_LEGACY, "dash");
        let engine = site.engine();
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        assert_eq!(title, "Hello World - My Site");
    }

    #[test]
    fn notagline_skips_composition() {
        let mut site = Site::basic();
        site.options.set(options::ADD_BLOGNAME, true);
        let engine = site.engine();
        let ctx = request();

        let args = TitleArgs {
            notagline: true,
            ..Default::default()
        };
        assert_eq!(engine.resolve_title(&ctx, &ItemRef::post(42), &args), "Hello World");
    }

    #[test]
    fn home_tagline_toggle_is_independent() {
        let mut site = Site::basic();
        site.options.set(options::ADD_BLOGNAME, true);
        site.options.set(options::HOME_TITLE, "Welcome");
        // home_add_tagline not set: home composition stays off even
        // though the global toggle is on
        let engine = site.engine();
        let ctx = request();

        assert_eq!(
            engine.resolve_title(&ctx, &ItemRef::home(), &TitleArgs::default()),
            "Welcome"
        );
    }

    #[test]
    fn home_tagline_composes_when_enabled() {
        let mut site = Site::basic();
        site.options.set(options::HOME_TITLE, "Welcome");
        site.options.set(options::HOME_ADD_TAGLINE, true);
        site.options.set(options::HOME_BLOGNAME_LOCATION, "right");
        let engine = site.engine();
        let ctx = request();

        assert_eq!(
            engine.resolve_title(&ctx, &ItemRef::home(), &TitleArgs::default()),
            "Welcome | My Site"
        );
    }

    #[test]
    fn swapped_lexicon_relocates_literals() {
        let lexicon = Lexicon {
            untitled: "Sans titre".to_string(),
            ..Default::default()
        };
        let engine = Site::basic().engine().with_lexicon(lexicon);
        let ctx = request();

        let title = engine.resolve_title(&ctx, &ItemRef::post(999), &TitleArgs::default());
        assert_eq!(title, "Sans titre");
    }

    // =========================================================================
    // Feed passthrough
    // =========================================================================

    #[test]
    fn feed_returns_raw_title_trimmed() {
        let mut site = Site::basic();
        site.options.set(options::ADD_BLOGNAME, true);
        let engine = site.engine();
        let mut render = RenderState::default();
        render.is_feed = true;
        let ctx = RequestContext::new(render);

        let args = TitleArgs {
            title: Some("  Feed Item  ".to_string()),
            ..Default::default()
        };
        assert_eq!(engine.resolve_title(&ctx, &ItemRef::post(42), &args), "Feed Item");
    }

    // =========================================================================
    // Memoization
    // =========================================================================

    #[test]
    fn identical_calls_are_idempotent_and_memoized() {
        let site = Site::basic();
        let hook = CountingTitleHook::default();
        let counter = hook.counter();
        let engine = site.engine().with_title_hook(hook);
        let ctx = request();

        let first = engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        let second = engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        assert_eq!(first, second);
        assert_eq!(*counter.lock().unwrap(), 1, "second call must hit the memo");
    }

    #[test]
    fn different_args_do_not_share_memo_slot() {
        let mut site = Site::basic();
        site.options.set(options::ADD_BLOGNAME, true);
        let engine = site.engine();
        let ctx = request();

        let decorated = engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        let bare = engine.resolve_title(
            &ctx,
            &ItemRef::post(42),
            &TitleArgs {
                notagline: true,
                ..Default::default()
            },
        );
        assert_eq!(decorated, "Hello World | My Site");
        assert_eq!(bare, "Hello World");
    }

    #[test]
    fn admin_renders_always_recompute() {
        let site = Site::basic();
        let hook = CountingTitleHook::default();
        let counter = hook.counter();
        let engine = site.engine().with_title_hook(hook);
        let mut render = RenderState::default();
        render.is_admin = true;
        let ctx = RequestContext::new(render);

        engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        engine.resolve_title(&ctx, &ItemRef::post(42), &TitleArgs::default());
        assert_eq!(*counter.lock().unwrap(), 2, "admin must recompute");
    }

    // =========================================================================
    // Legacy compatibility mode
    // =========================================================================

    #[test]
    fn legacy_mode_rewraps_with_engine_separator() {
        let mut site = Site::basic();
        site.options.set(options::TITLE_SEPARATOR, "dash");
        let engine = site.engine().with_native_title_tag(false);
        let ctx = request();

        let out = engine.legacy_title(&ctx, "Hello World »", "»", "right");
        assert_eq!(out, "Hello World - My Site");
    }

    #[test]
    fn legacy_mode_strips_leading_separator() {
        let engine = Site::basic().engine().with_native_title_tag(false);
        let ctx = request();

        let out = engine.legacy_title(&ctx, "» Hello World", "»", "left");
        assert_eq!(out, "Hello World | My Site");
    }

    #[test]
    fn legacy_mode_inactive_with_native_title_tag() {
        let engine = Site::basic().engine();
        let ctx = request();

        assert_eq!(engine.legacy_title(&ctx, "Hello World »", "»", "right"), "Hello World »");
    }

    #[test]
    fn legacy_mode_inactive_without_caller_separator() {
        let engine = Site::basic().engine().with_native_title_tag(false);
        let ctx = request();

        assert_eq!(engine.legacy_title(&ctx, "Hello World", "", "right"), "Hello World");
    }

    #[test]
    fn caller_separator_args_route_through_legacy_path() {
        let engine = Site::basic().engine().with_native_title_tag(false);
        let ctx = request();

        let args = TitleArgs {
            title: Some("Hello World »".to_string()),
            sep: Some("»".to_string()),
            seplocation: Some("right".to_string()),
            ..Default::default()
        };
        assert_eq!(
            engine.resolve_title(&ctx, &ItemRef::post(42), &args),
            "Hello World | My Site"
        );
    }

    #[test]
    fn caller_separator_passes_through_with_native_title_tag() {
        let engine = Site::basic().engine();
        let ctx = request();

        let args = TitleArgs {
            title: Some("Hello World »".to_string()),
            sep: Some("»".to_string()),
            ..Default::default()
        };
        assert_eq!(engine.resolve_title(&ctx, &ItemRef::post(42), &args), "Hello World »");
    }

    #[test]
    fn strip_edge_separator_both_sides() {
        assert_eq!(strip_edge_separator("| Hello |", "|"), "Hello");
        assert_eq!(strip_edge_separator("Hello", "|"), "Hello");
    }
}
