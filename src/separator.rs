//! Separator resolution.
//!
//! Titles and descriptions join their parts with a configured glyph. The
//! option token maps as: `"pipe"` to `|`, `"dash"` to `-`, any other
//! non-empty token `t` to the HTML named entity `&{t};` (e.g. `"raquo"`
//! to `&raquo;`), and empty/unset to `|`.
//!
//! The title context reads the historically misspelled
//! `title_seperator` option as a fallback alias of `title_separator`;
//! see [`crate::options`] for the precedence decision. The resolved
//! glyph is memoized per context for the lifetime of the request — the
//! underlying option cannot change mid-request.

use crate::context::RequestContext;
use crate::engine::Engine;
use crate::options;

/// Which separator is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SepContext {
    Title,
    Description,
}

/// Map a configured token to its glyph.
fn glyph_for(token: &str) -> String {
    match token {
        "" => "|".to_string(),
        "pipe" => "|".to_string(),
        "dash" => "-".to_string(),
        other => format!("&{other};"),
    }
}

impl Engine {
    /// The joining glyph for a context, memoized for the request.
    pub fn separator(&self, ctx: &RequestContext, context: SepContext) -> String {
        ctx.separator_memo(context, || {
            let token = match context {
                SepContext::Title => self
                    .options
                    .get_str(options::TITLE_SEPARATOR)
                    .or_else(|| self.options.get_str(options::TITLE_SEPARATOR_LEGACY)),
                SepContext::Description => self.options.get_str(options::DESCRIPTION_SEPARATOR),
            };
            glyph_for(token.as_deref().unwrap_or(""))
        })
    }
}
