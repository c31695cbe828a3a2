//! Text armoring for binary frames
//!
//! Provides standard base64 encoding (with padding) for encrypted frames.
//! The armored token is:
//! - ASCII-safe and free of whitespace
//! - Suitable for embedding inside an inline code span in a note
//!
//! Unlike formats that carry a textual version prefix, the version marker
//! here is the binary magic at the start of the frame itself; the armor
//! layer is a plain base64 shell around it.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{ErrorCategory, ErrorKind, NotecryptError, Result};

/// Wrap frame bytes in armor, returning the token string.
pub fn wrap(body: &[u8]) -> String {
    STANDARD.encode(body)
}

/// Unwrap an armored token, returning the original frame bytes.
///
/// Anything that is not strict base64 (standard alphabet, padded) is
/// rejected; no whitespace tolerance, no alternate alphabets.
pub fn unwrap(token: &str) -> Result<Vec<u8>> {
    STANDARD.decode(token).map_err(|e| {
        NotecryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedToken,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })
}
