//! String-level encode/decode of secret tokens
//!
//! The caller-facing surface of the codec: plaintext and password in,
//! token out, and the inverse. Composes the armor, frame crypto, and
//! plaintext normalization layers. Each call is stateless and atomic:
//! it either returns the complete result or a typed error, never
//! partial output.

use crate::armor;
use crate::error::{ErrorCategory, ErrorKind, NotecryptError, Result};
use crate::marker;
use crate::secretcrypt;

/// Encrypt plaintext into a portable token.
///
/// The token is ASCII-safe base64 over a freshly randomized frame;
/// encrypting the same inputs twice yields different tokens.
pub fn encode(plaintext: &str, password: &str) -> Result<String> {
    let frame_bytes = secretcrypt::encrypt(password.as_bytes(), plaintext.as_bytes())
        .map_err(|e| e.with_context("encryption failed"))?;
    Ok(armor::wrap(&frame_bytes))
}

/// Decrypt a token back into plaintext.
///
/// Authentication gates decryption; the returned text has had the
/// legacy markup normalization applied (see [`marker::strip_legacy_markup`]).
pub fn decode(token: &str, password: &str) -> Result<String> {
    let frame_bytes = armor::unwrap(token)?;
    let plaintext = secretcrypt::decrypt(password.as_bytes(), &frame_bytes)?;
    let text = String::from_utf8(plaintext).map_err(|e| {
        NotecryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidEncoding,
            "decrypted data is not valid UTF-8",
            e,
        )
    })?;
    Ok(marker::strip_legacy_markup(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MIN_FRAME_LEN;
    use base64::{Engine, engine::general_purpose::STANDARD};

    #[test]
    fn test_roundtrip_simple() {
        let token = encode("attack at dawn", "hunter2").unwrap();
        assert_eq!(decode(&token, "hunter2").unwrap(), "attack at dawn");
    }

    #[test]
    fn test_roundtrip_empty_string() {
        let token = encode("", "hunter2").unwrap();
        assert_eq!(decode(&token, "hunter2").unwrap(), "");
    }

    #[test]
    fn test_roundtrip_non_ascii() {
        let plaintext = "pässwörd notes — 秘密 🦀";
        let token = encode(plaintext, "hunter2").unwrap();
        assert_eq!(decode(&token, "hunter2").unwrap(), plaintext);
    }

    #[test]
    fn test_roundtrip_multiline() {
        let plaintext = "line one\nline two\r\nline three\n";
        let token = encode(plaintext, "hunter2").unwrap();
        assert_eq!(decode(&token, "hunter2").unwrap(), plaintext);
    }

    #[test]
    fn test_token_is_ascii() {
        let token = encode("secret", "hunter2").unwrap();
        assert!(token.is_ascii());
        assert!(!token.contains(char::is_whitespace));
    }

    #[test]
    fn test_encode_is_randomized() {
        let t1 = encode("secret", "hunter2").unwrap();
        let t2 = encode("secret", "hunter2").unwrap();
        assert_ne!(t1, t2);

        assert_eq!(decode(&t1, "hunter2").unwrap(), "secret");
        assert_eq!(decode(&t2, "hunter2").unwrap(), "secret");
    }

    #[test]
    fn test_wrong_password_fails() {
        let token = encode("secret", "correct").unwrap();
        let err = decode(&token, "wrong").expect_err("expected authentication failure");
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
    }

    #[test]
    fn test_not_base64_rejected() {
        let err = decode("definitely not a token!", "pw").expect_err("expected malformed token");
        assert_eq!(err.kind, Some(ErrorKind::MalformedToken));
    }

    #[test]
    fn test_short_token_rejected() {
        // Valid base64, but the decoded frame is below the minimum length.
        let short = STANDARD.encode(vec![0u8; MIN_FRAME_LEN - 1]);
        let err = decode(&short, "pw").expect_err("expected truncated frame");
        assert_eq!(err.kind, Some(ErrorKind::TruncatedFrame));
    }

    #[test]
    fn test_tampered_token_fails() {
        let token = encode("secret", "hunter2").unwrap();
        let mut frame_bytes = STANDARD.decode(&token).unwrap();
        let mid = frame_bytes.len() / 2;
        frame_bytes[mid] ^= 0x80;
        let tampered = STANDARD.encode(&frame_bytes);

        let err = decode(&tampered, "hunter2").expect_err("expected authentication failure");
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
    }

    #[test]
    fn test_legacy_markup_normalized() {
        let token = encode("<div>hello</div>", "hunter2").unwrap();
        assert_eq!(decode(&token, "hunter2").unwrap(), "hello");
    }

    #[test]
    fn test_plaintext_mentioning_divs_after_normalization() {
        let token = encode("<div>a</div> and literal text", "hunter2").unwrap();
        assert_eq!(decode(&token, "hunter2").unwrap(), "a and literal text");
    }
}
