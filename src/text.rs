//! Text normalization for description and title synthesis.
//!
//! Raw CMS content arrives as HTML-ish text: entity references, markup
//! tags, bracketed shortcodes, and arbitrary whitespace. Everything a
//! resolver emits goes through some subset of these passes:
//!
//! - [`decode_entities`] — named and numeric entity references to characters
//! - [`strip_tags`] — remove markup tags and comments, keep text content
//! - [`strip_shortcodes`] — remove `[bracket]` shortcodes, keep inner text
//! - [`collapse_whitespace`] — any whitespace run to a single space
//! - [`normalize`] — the full pipeline, applied to every description
//! - [`truncate_words`] — length-budget cut that never splits a word
//!
//! Length counting policy: lengths are counted in Unicode scalar values
//! *after* entity decoding, so `&amp;` counts as one character. Entities
//! that do not decode count as their literal source characters.

/// Decode HTML entity references to plain characters.
///
/// Handles the common named entities plus decimal (`&#65;`) and hex
/// (`&#x41;`) character references. Unknown or malformed entities are
/// passed through verbatim.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '&' {
            result.push(c);
            continue;
        }

        // Collect up to the terminating ';'
        let mut entity = String::new();
        let mut terminated = false;
        while let Some(&next) = chars.peek() {
            if next == ';' {
                chars.next();
                terminated = true;
                break;
            }
            if next == '&' || next.is_whitespace() || entity.len() > 10 {
                break;
            }
            entity.push(next);
            chars.next();
        }

        if !terminated {
            result.push('&');
            result.push_str(&entity);
            continue;
        }

        match decode_entity(&entity) {
            Some(decoded) => result.push(decoded),
            None => {
                result.push('&');
                result.push_str(&entity);
                result.push(';');
            }
        }
    }

    result
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "hellip" => Some('\u{2026}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "laquo" => Some('\u{00AB}'),
        "raquo" => Some('\u{00BB}'),
        "middot" => Some('\u{00B7}'),
        "copy" => Some('\u{00A9}'),
        "reg" => Some('\u{00AE}'),
        "trade" => Some('\u{2122}'),
        s if s.starts_with('#') => {
            let code = if let Some(hex) = s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                s[1..].parse().ok()
            };
            code.and_then(char::from_u32)
        }
        _ => None,
    }
}

/// Remove markup tags, keeping text content.
///
/// `<p>Hello <em>world</em></p>` becomes `Hello world`. HTML comments
/// (`<!-- ... -->`) are removed entirely. A `<` that never closes is kept
/// as literal text.
pub fn strip_tags(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        let after = &rest[open..];

        // Comments have their own terminator
        if let Some(body) = after.strip_prefix("<!--") {
            match body.find("-->") {
                Some(end) => rest = &body[end + 3..],
                None => return result, // unterminated comment swallows the rest
            }
            continue;
        }

        match after.find('>') {
            Some(close) => rest = &after[close + 1..],
            None => {
                // Unclosed '<' is literal text
                result.push_str(after);
                return result;
            }
        }
    }

    result.push_str(rest);
    result
}

/// Remove `[bracket]`-style shortcodes, keeping any enclosed text.
///
/// Both self-contained (`[gallery id="1"]`) and paired
/// (`[quote]text[/quote]`) forms are removed; paired forms keep their
/// inner text since only the markers are markup. A `[` not followed by an
/// identifier is left alone.
pub fn strip_shortcodes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let is_shortcode = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '/' || c == '_');

        if !is_shortcode {
            result.push_str(&rest[..open + 1]);
            rest = after;
            continue;
        }

        match after.find(']') {
            Some(close) => {
                result.push_str(&rest[..open]);
                rest = &after[close + 1..];
            }
            None => {
                // Unterminated bracket is literal text
                result.push_str(rest);
                return result;
            }
        }
    }

    result.push_str(rest);
    result
}

/// Collapse any run of whitespace (including newlines and tabs) into a
/// single space.
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_ws = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_ws && !result.is_empty() {
                result.push(' ');
            }
            in_ws = true;
        } else {
            result.push(c);
            in_ws = false;
        }
    }
    if result.ends_with(' ') {
        result.pop();
    }
    result
}

/// The full normalization pipeline applied to every resolved description:
/// strip tags, decode entities, collapse whitespace, trim.
///
/// Tags are stripped before entities are decoded so that `&lt;` in the
/// source survives as a literal `<` instead of being mistaken for
/// markup. Output is plain text, never pre-escaped; context-appropriate
/// escaping is the caller's job.
pub fn normalize(s: &str) -> String {
    collapse_whitespace(&decode_entities(&strip_tags(s)))
}

/// Count in Unicode scalar values.
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Truncate to at most `max_chars` characters without splitting a word,
/// appending `ellipsis` when anything was cut.
///
/// The cut is made at `max_chars`, then a trailing partial word is
/// dropped at the last space. Any space left before the ellipsis is
/// collapsed, so the result never contains `" ..."`.
pub fn truncate_words(s: &str, max_chars: usize, ellipsis: &str) -> String {
    if char_count(s) <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let cut: String = s.chars().take(max_chars).collect();
    let at_boundary = s.chars().nth(max_chars).is_some_and(char::is_whitespace);

    let kept = if at_boundary {
        cut.as_str()
    } else {
        // Drop the trailing partial word
        match cut.rfind(' ') {
            Some(pos) => &cut[..pos],
            None => cut.as_str(),
        }
    };

    let mut out = kept.to_string();
    out.push_str(ellipsis);
    out.replace(&format!(" {ellipsis}"), ellipsis)
}
