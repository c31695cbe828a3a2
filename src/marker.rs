//! Document marker plumbing for embedded secrets
//!
//! Inside a note, a token travels as an inline code span:
//!
//! ```text
//! `evernote_secret <token>`
//! ```
//!
//! This module formats and strips that marker, and applies the legacy
//! markup normalization to decrypted plaintext. None of it is a
//! cryptographic concern; it is all plain string handling.

/// Marker prefix preceding the token inside the code span.
pub const MARKER_PREFIX: &str = "evernote_secret ";

/// Wrap a token in the document marker form.
pub fn format_secret(token: &str) -> String {
    format!("`{}{}`", MARKER_PREFIX, token)
}

/// Extract the bare token from marked (or already bare) text.
///
/// Tolerates surrounding whitespace and backticks, with or without the
/// marker prefix, so text copied from a note can be fed in directly.
pub fn strip_secret(text: &str) -> &str {
    let stripped = text.trim().trim_matches('`');
    stripped.strip_prefix(MARKER_PREFIX).unwrap_or(stripped)
}

/// Remove literal `<div>`/`</div>` fragments from decrypted plaintext.
///
/// Secrets imported from the original note system historically carried
/// these markup fragments inside the encrypted text. Stripping them is a
/// deliberate post-decryption normalization step, not a decryption
/// artifact; plaintext that never contained them passes through unchanged.
pub fn strip_legacy_markup(text: &str) -> String {
    text.replace("<div>", "").replace("</div>", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_secret() {
        assert_eq!(
            format_secret("QUJDRA=="),
            "`evernote_secret QUJDRA==`"
        );
    }

    #[test]
    fn test_strip_marked_secret() {
        assert_eq!(strip_secret("`evernote_secret QUJDRA==`"), "QUJDRA==");
    }

    #[test]
    fn test_strip_bare_token_passthrough() {
        assert_eq!(strip_secret("QUJDRA=="), "QUJDRA==");
    }

    #[test]
    fn test_strip_tolerates_whitespace() {
        assert_eq!(strip_secret("  `evernote_secret QUJDRA==`\n"), "QUJDRA==");
    }

    #[test]
    fn test_strip_prefix_without_backticks() {
        assert_eq!(strip_secret("evernote_secret QUJDRA=="), "QUJDRA==");
    }

    #[test]
    fn test_strip_backticks_without_prefix() {
        assert_eq!(strip_secret("`QUJDRA==`"), "QUJDRA==");
    }

    #[test]
    fn test_format_strip_roundtrip() {
        let token = "c29tZSB0b2tlbg==";
        assert_eq!(strip_secret(&format_secret(token)), token);
    }

    #[test]
    fn test_legacy_markup_stripped() {
        assert_eq!(strip_legacy_markup("<div>hello</div>"), "hello");
        assert_eq!(
            strip_legacy_markup("<div>line one</div><div>line two</div>"),
            "line oneline two"
        );
    }

    #[test]
    fn test_legacy_markup_untouched_text() {
        assert_eq!(strip_legacy_markup("no markup here"), "no markup here");
        assert_eq!(strip_legacy_markup(""), "");
    }

    #[test]
    fn test_legacy_markup_other_tags_preserved() {
        assert_eq!(strip_legacy_markup("<span>kept</span>"), "<span>kept</span>");
    }
}
