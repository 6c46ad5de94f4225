//! Canonical URL resolution.
//!
//! URLs are assembled in stages: a site-relative **path** built per
//! content type, an optional **translation rewrite** of that path, an
//! optional **domain-mapping short-circuit** that replaces host
//! assembly entirely, then **scheme resolution**, the **trailing-slash
//! policy**, and output escaping.
//!
//! Every call starts from a clean slate: trailing-slash policy, host
//! override, and scheme override are call-scoped, because different
//! items in one request may resolve to different hosts.
//!
//! Path forms:
//! - home / static front page: the bare home-directory path
//! - singular: the host's permalink, plus `"{n}/"` (pretty) or
//!   `?page=/&page=` (default structure) when paginated
//! - term: rewrite structure + ancestor slug chain + term slug (pretty,
//!   ancestors most-distant first, `page/{n}/` when paginated) or
//!   `?cat=` / `?{query_var}=` / `?taxonomy=&term=` + `&paged=`
//!   (default structure)
//! - other archives: the raw request path, or the home path for
//!   external calls with no request to echo
//!
//! A custom canonical field on a singular item is used verbatim (its own
//! scheme parsed out) and disables automatic slashing, as do drafts.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::args::UrlArgs;
use crate::cache::{MemoKey, Resolver};
use crate::content::{CANONICAL_FIELD, TermAttrs};
use crate::context::RequestContext;
use crate::engine::Engine;
use crate::hooks;
use crate::options;
use crate::types::{ItemRef, Scheme};

/// Characters percent-encoded in final URLs. Ampersands and query
/// delimiters stay raw so default-structure query strings remain
/// readable.
const URL_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'^');

/// State scoped to a single `resolve_url` call.
struct CallState {
    /// Whether the trailing-slash policy applies at all.
    auto_slash: bool,
    /// Host substituted by a translation adapter.
    host_override: Option<String>,
    /// Scheme carried by a custom canonical or a domain mapping.
    explicit_scheme: Option<Scheme>,
}

impl CallState {
    fn fresh() -> Self {
        Self {
            auto_slash: true,
            host_override: None,
            explicit_scheme: None,
        }
    }
}

/// Parsed `home_url` option.
struct HomeBase {
    scheme: Scheme,
    host: String,
    /// Base directory path, `""` or `"/dir"` without a trailing slash.
    path: String,
}

fn parse_home_url(url: &str) -> HomeBase {
    let (scheme, rest) = if let Some(rest) = url.strip_prefix("https://") {
        (Scheme::Https, rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        (Scheme::Http, rest)
    } else {
        (Scheme::Http, url.strip_prefix("//").unwrap_or(url))
    };
    let (host, path) = match rest.split_once('/') {
        Some((host, path)) => (host.to_string(), format!("/{path}")),
        None => (rest.to_string(), String::new()),
    };
    HomeBase {
        scheme,
        host,
        path: path.trim_end_matches('/').to_string(),
    }
}

/// What the scheme option forces, if anything.
enum ForcedScheme {
    Auto,
    Fixed(Scheme),
    Relative,
}

impl Engine {
    /// Resolve the canonical URL for an item.
    pub fn resolve_url(&self, ctx: &RequestContext, item: &ItemRef, args: &UrlArgs) -> String {
        let memo_key = MemoKey::new(Resolver::Url, item.key(), args.fingerprint());
        if let Some(cached) = ctx.memo_get(&memo_key) {
            return cached;
        }

        let result = self.build_url(ctx, item, args);
        ctx.memo_put(memo_key, result.clone());
        result
    }

    /// Positional compatibility shim for legacy call sites.
    pub fn resolve_url_legacy(&self, ctx: &RequestContext, id: u64) -> String {
        log::warn!("resolve_url with a positional id is deprecated; pass an ItemRef and UrlArgs");
        self.resolve_url(ctx, &ItemRef::post(id), &UrlArgs::default())
    }

    fn build_url(&self, ctx: &RequestContext, item: &ItemRef, args: &UrlArgs) -> String {
        // Each call starts from a clean slate
        let mut state = CallState::fresh();
        let home = parse_home_url(
            &self
                .options
                .get_str(options::HOME_URL)
                .unwrap_or_else(|| "http://localhost".to_string()),
        );
        let pretty = self.options.get_bool(options::PRETTY_PERMALINKS, true);

        // Steps 2-4: a full URL (custom canonical) or a site-relative path
        let mut full_url: Option<String> = None;
        let rel_path: String;

        if args.home {
            rel_path = "/".to_string();
        } else if let Some(custom) = self.custom_canonical(item, args) {
            state.auto_slash = false;
            if custom.starts_with("https://") {
                state.explicit_scheme = Some(Scheme::Https);
            } else if custom.starts_with("http://") {
                state.explicit_scheme = Some(Scheme::Http);
            }
            full_url = Some(custom);
            rel_path = String::new();
        } else if item.is_home {
            rel_path = "/".to_string();
        } else if let Some(tax) = &item.taxonomy {
            rel_path = self.term_path(ctx, tax, item.id, args, pretty);
        } else if item.is_archive() {
            rel_path = if !args.is_external_call && !ctx.render.request_path.is_empty() {
                ctx.render.request_path.clone()
            } else {
                "/".to_string()
            };
        } else {
            rel_path = self.singular_path(ctx, item, args, pretty, &mut state);
        }

        if full_url.is_none() {
            // Step 5: translation rewriting, path in / path out
            let mut path = rel_path;
            if let Some(translation) = &self.translation {
                let rewrite = translation.rewrite(&path);
                path = rewrite.path;
                if let Some(host) = rewrite.host_override {
                    state.host_override = Some(host);
                }
            }

            // Step 6: domain-mapping adapters, fixed order, first active
            // mapping short-circuits host assembly
            for adapter in &self.domain_adapters {
                if let Some(mapping) = adapter.mapping() {
                    full_url = Some(format!("{}{path}", mapping.base_url));
                    state.explicit_scheme = Some(mapping.scheme);
                    break;
                }
            }

            if full_url.is_none() {
                let host = state.host_override.clone().unwrap_or_else(|| home.host.clone());
                full_url = Some(format!("//{host}{}{path}", home.path));
            }
        }

        let url = full_url.unwrap_or_default();

        // Step 7: scheme — explicit wins over derived, the forced
        // override wins over both
        let derived = if ctx.render.is_secure {
            Scheme::Https
        } else {
            home.scheme
        };
        let scheme = state.explicit_scheme.unwrap_or(derived);
        let url = match self.forced_scheme() {
            ForcedScheme::Relative => make_scheme_relative(&url),
            ForcedScheme::Fixed(forced) => set_scheme(&url, forced),
            ForcedScheme::Auto => {
                if url.starts_with("//") {
                    format!("{scheme}:{url}")
                } else {
                    url
                }
            }
        };

        // Step 8: trailing-slash policy
        let url = if state.auto_slash {
            let add = args.forceslash || self.options.get_bool(options::SLASH_PAGES, true);
            with_trailing_slash(url, add)
        } else {
            url
        };

        // Step 9: escape for output
        utf8_percent_encode(&url, URL_ESCAPE).to_string()
    }

    fn forced_scheme(&self) -> ForcedScheme {
        match self
            .options
            .get_str(options::CANONICAL_SCHEME)
            .as_deref()
        {
            Some("http") => ForcedScheme::Fixed(Scheme::Http),
            Some("https") => ForcedScheme::Fixed(Scheme::Https),
            Some("relative") => ForcedScheme::Relative,
            _ => ForcedScheme::Auto,
        }
    }

    fn custom_canonical(&self, item: &ItemRef, args: &UrlArgs) -> Option<String> {
        if !args.use_custom_field || item.is_term() || item.is_home || item.id == 0 {
            return None;
        }
        hooks::winning(self.content.custom_field(CANONICAL_FIELD, item.id))
    }

    fn singular_path(
        &self,
        ctx: &RequestContext,
        item: &ItemRef,
        args: &UrlArgs,
        pretty: bool,
        state: &mut CallState,
    ) -> String {
        // A real static front page canonicalizes to the home directory
        if self.is_front_item(item) {
            return "/".to_string();
        }

        let post = self.content.post(item.id);
        if let Some(post) = &post
            && post.is_draft()
        {
            state.auto_slash = false;
        }

        let mut path = self.content.permalink_path(item.id).unwrap_or_else(|| {
            match &post {
                Some(post) if pretty => format!("/{}/", post.slug),
                Some(post) => format!("/?p={}", post.id),
                None => "/".to_string(),
            }
        });

        let n = ctx.render.page_number();
        if n >= 2 && (args.paged || ctx.render.is_paged()) {
            if path.contains('?') {
                path.push_str(&format!("&page={n}"));
            } else if pretty {
                if !path.ends_with('/') {
                    path.push('/');
                }
                path.push_str(&format!("{n}/"));
            } else {
                path.push_str(&format!("?page={n}"));
            }
        }

        path
    }

    fn term_path(
        &self,
        ctx: &RequestContext,
        tax_name: &str,
        id: u64,
        args: &UrlArgs,
        pretty: bool,
    ) -> String {
        let taxonomy = self.content.taxonomy(tax_name);
        let term = self.content.term(tax_name, id);
        let n = ctx.render.page_number();
        let paged = n >= 2 && (args.paged || ctx.render.is_paged());

        if pretty {
            let Some(term) = term else {
                return "/".to_string();
            };
            let mut segments: Vec<String> = Vec::new();
            match &taxonomy {
                Some(tax) => {
                    let rewrite = tax.rewrite_slug.clone().unwrap_or_else(|| tax.name.clone());
                    segments.extend(
                        rewrite
                            .split('/')
                            .filter(|s| !s.is_empty())
                            .map(String::from),
                    );
                    if tax.hierarchical {
                        segments.extend(self.ancestor_slugs(tax_name, &term));
                    }
                }
                None => segments.push(tax_name.to_string()),
            }
            segments.push(term.slug.clone());
            let mut path = format!("/{}/", segments.join("/"));
            if paged {
                path.push_str(&format!("page/{n}/"));
            }
            path
        } else {
            let mut query = match (&taxonomy, &term) {
                (Some(tax), Some(term)) if tax.name == "category" => {
                    format!("?cat={}", term.id)
                }
                (Some(tax), Some(term)) if tax.query_var.is_some() => {
                    format!("?{}={}", tax.query_var.as_deref().unwrap_or_default(), term.slug)
                }
                (_, Some(term)) => format!("?taxonomy={tax_name}&term={}", term.slug),
                (_, None) => format!("?taxonomy={tax_name}"),
            };
            if paged {
                query.push_str(&format!("&paged={n}"));
            }
            format!("/{query}")
        }
    }

    /// Slugs of a term's ancestors, most distant first.
    fn ancestor_slugs(&self, tax_name: &str, term: &TermAttrs) -> Vec<String> {
        let mut slugs = Vec::new();
        let mut parent = term.parent;
        // Bounded walk: a corrupt parent chain must not loop forever
        for _ in 0..32 {
            let Some(pid) = parent else { break };
            match self.content.term(tax_name, pid) {
                Some(ancestor) => {
                    slugs.push(ancestor.slug.clone());
                    parent = ancestor.parent;
                }
                None => break,
            }
        }
        slugs.reverse();
        slugs
    }
}

/// Swap or install a scheme on a URL that has a host.
fn set_scheme(url: &str, scheme: Scheme) -> String {
    if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("//"))
    {
        format!("{scheme}://{rest}")
    } else {
        // No recognizable host part; left verbatim
        url.to_string()
    }
}

/// Reduce a URL to its scheme-relative form.
fn make_scheme_relative(url: &str) -> String {
    if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    {
        format!("//{rest}")
    } else {
        url.to_string()
    }
}

/// Apply the trailing-slash convention. URLs with query strings or
/// fragments are left alone.
fn with_trailing_slash(url: String, add: bool) -> String {
    if url.contains('?') || url.contains('#') {
        return url;
    }
    if add {
        if url.ends_with('/') {
            url
        } else {
            format!("{url}/")
        }
    } else {
        let trimmed = url.trim_end_matches('/');
        // "http://" and "//" must keep their slashes
        if trimmed.is_empty() || trimmed.ends_with(':') {
            url
        } else {
            trimmed.to_string()
        }
    }
}
