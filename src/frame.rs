//! Binary layout of one encrypted secret
//!
//! A frame is the byte string that gets base64-armored into a token:
//! - magic: 4 bytes, fixed ASCII tag "ENC0"
//! - cipher salt: 16 bytes
//! - MAC salt: 16 bytes
//! - IV: 16 bytes
//! - ciphertext: variable length (AES block multiple)
//! - MAC: 32 bytes, computed over everything before it
//!
//! All fields are packed back to back, no alignment or length prefixes.
//! The format tag doubles as a version marker; there is exactly one
//! supported version and none of its parameters are negotiable.

use crate::error::{ErrorCategory, ErrorKind, NotecryptError, Result};

/// Fixed ASCII tag identifying the format version.
pub const MAGIC: &[u8; 4] = b"ENC0";

/// Length of the cipher-key salt in bytes.
pub const CIPHER_SALT_LEN: usize = 16;

/// Length of the MAC-key salt in bytes.
pub const MAC_SALT_LEN: usize = 16;

/// Length of the AES-CBC initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// Length of the HMAC-SHA-256 tag in bytes.
pub const MAC_LEN: usize = 32;

/// Smallest byte length a frame can have (empty ciphertext).
pub const MIN_FRAME_LEN: usize = MAGIC.len() + CIPHER_SALT_LEN + MAC_SALT_LEN + IV_LEN + MAC_LEN;

/// Borrowed view of a parsed frame.
///
/// Holds references into the original byte string; nothing is copied
/// until decryption produces plaintext.
#[derive(Debug)]
pub struct Frame<'a> {
    pub cipher_salt: &'a [u8; CIPHER_SALT_LEN],
    pub mac_salt: &'a [u8; MAC_SALT_LEN],
    pub iv: &'a [u8; IV_LEN],
    pub ciphertext: &'a [u8],
    pub mac: &'a [u8; MAC_LEN],
    authenticated: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Parse a frame from raw bytes by fixed offsets.
    ///
    /// Length and format-tag checks happen here, before any key
    /// derivation is attempted by callers.
    pub fn parse(bytes: &'a [u8]) -> Result<Frame<'a>> {
        if bytes.len() < MIN_FRAME_LEN {
            return Err(NotecryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::TruncatedFrame,
                "input too short to hold an encrypted secret; likely truncated",
            ));
        }

        let mut pos = 0;

        if &bytes[pos..pos + MAGIC.len()] != MAGIC {
            return Err(NotecryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::UnsupportedFormat,
                "input does not carry a format tag we support",
            ));
        }
        pos += MAGIC.len();

        let cipher_salt: &[u8; CIPHER_SALT_LEN] = bytes[pos..pos + CIPHER_SALT_LEN]
            .try_into()
            .map_err(|_| internal_invariant("cipher salt slice has wrong length"))?;
        pos += CIPHER_SALT_LEN;

        let mac_salt: &[u8; MAC_SALT_LEN] = bytes[pos..pos + MAC_SALT_LEN]
            .try_into()
            .map_err(|_| internal_invariant("MAC salt slice has wrong length"))?;
        pos += MAC_SALT_LEN;

        let iv: &[u8; IV_LEN] = bytes[pos..pos + IV_LEN]
            .try_into()
            .map_err(|_| internal_invariant("IV slice has wrong length"))?;
        pos += IV_LEN;

        let mac_offset = bytes.len() - MAC_LEN;
        let ciphertext = &bytes[pos..mac_offset];
        let mac: &[u8; MAC_LEN] = bytes[mac_offset..]
            .try_into()
            .map_err(|_| internal_invariant("MAC slice has wrong length"))?;

        Ok(Frame {
            cipher_salt,
            mac_salt,
            iv,
            ciphertext,
            mac,
            authenticated: &bytes[..mac_offset],
        })
    }

    /// The byte range covered by the MAC: magic through ciphertext.
    pub fn authenticated(&self) -> &'a [u8] {
        self.authenticated
    }
}

/// Concatenate the authenticated prefix of a frame: magic, salts, IV,
/// ciphertext. The caller appends the MAC it computes over the result.
pub fn assemble_prefix(
    cipher_salt: &[u8; CIPHER_SALT_LEN],
    mac_salt: &[u8; MAC_SALT_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        MAGIC.len() + CIPHER_SALT_LEN + MAC_SALT_LEN + IV_LEN + ciphertext.len() + MAC_LEN,
    );
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(cipher_salt);
    out.extend_from_slice(mac_salt);
    out.extend_from_slice(iv);
    out.extend_from_slice(ciphertext);
    out
}

fn internal_invariant(msg: &str) -> NotecryptError {
    NotecryptError::with_kind(
        ErrorCategory::Internal,
        ErrorKind::InternalInvariant,
        msg.to_string(),
    )
}
