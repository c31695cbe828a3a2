//! Notecrypt - password-based encryption of secrets embedded in plain-text notes
//!
//! Secret text is encrypted into a self-contained ENC0 token: a base64
//! string carrying its own salts, IV, ciphertext, and authentication tag,
//! portable across any plain-text container. See [`codec`] for the
//! string-level encode/decode entry points.

#![forbid(unsafe_code)]

pub mod armor;
pub mod codec;
pub mod error;
pub mod file_ops;
pub mod frame;
pub mod marker;
pub mod password;
pub mod secretcrypt;
