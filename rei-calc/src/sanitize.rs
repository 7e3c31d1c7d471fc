//! Text sanitization for user-supplied deal fields.
//!
//! Deal names, addresses and notes come from documents and HTTP bodies and
//! end up in reports, so they are stripped on the way in and escaped on the
//! way out.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// Patterns
// ============================================================================

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Default limit for single-line fields.
pub const MAX_FIELD_LEN: usize = 200;

/// Limit for free-form notes.
pub const MAX_NOTES_LEN: usize = 4_000;

// ============================================================================
// Public API
// ============================================================================

/// Escape characters with meaning in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Remove `<...>` markup.
pub fn strip_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").into_owned()
}

/// Strip tags and control characters, trim, and cap the length in chars.
pub fn sanitize_text(text: &str, max_len: usize) -> String {
    let stripped = strip_tags(text);
    let cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    cleaned.trim().chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;&#x2F;a&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>12 Oak</b> St<script>x</script>"), "12 Oak Stx");
        assert_eq!(strip_tags("3 < 4"), "3 < 4");
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("  <i>Duplex</i>\u{0007}  ", 50), "Duplex");
        assert_eq!(sanitize_text("line one\nline two", 50), "line one\nline two");
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        assert_eq!(sanitize_text("Café Row", 4), "Café");
        assert_eq!(sanitize_text("", 10), "");
    }
}
