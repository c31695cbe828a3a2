//! Encryption/decryption using PBKDF2 + AES-128-CBC + HMAC-SHA-256
//!
//! This module implements password-based authenticated encryption using:
//! - PBKDF2-HMAC-SHA-256 (50 000 iterations) for key derivation
//! - AES-128 in CBC mode with PKCS#7 padding for confidentiality
//! - HMAC-SHA-256 over the frame prefix for integrity/authenticity
//!
//! The cipher key and the MAC key are derived from the same password but
//! from two independent random salts. Collapsing the two into a single
//! key would change the token format and weaken the scheme; both salts
//! travel in the frame (see [`crate::frame`]).
//!
//! Decryption verifies the MAC before the cipher key is even derived.
//! A wrong password and tampered ciphertext are indistinguishable to the
//! caller: same error kind, same amount of work performed.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, NotecryptError, Result};
use crate::frame::{self, CIPHER_SALT_LEN, Frame, IV_LEN, MAC_LEN, MAC_SALT_LEN};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// PBKDF2 iteration count. Part of the fixed format; never negotiable.
const PBKDF2_ITERATIONS: u32 = 50_000;

/// Length of a derived key in bytes (AES-128, and the same for the MAC key).
const KEY_LEN: usize = 16;

/// Derive a 16-byte key from a password and salt.
///
/// Deterministic given (password, salt). The cipher key and the MAC key
/// use identical parameters; their independence comes entirely from the
/// two distinct salts. The result is wiped from memory on drop.
fn derive_key(password: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut *key);
    key
}

/// Compute the HMAC-SHA-256 tag over `data`.
fn compute_mac(mac_key: &[u8], data: &[u8]) -> Result<[u8; MAC_LEN]> {
    let mut mac = HmacSha256::new_from_slice(mac_key).map_err(crypto_failure)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Verify the HMAC-SHA-256 tag over `data` in constant time.
///
/// The underlying comparison never early-exits on the first differing
/// byte; the tag length is fixed at 32 bytes by the frame layout.
fn verify_mac(mac_key: &[u8], data: &[u8], tag: &[u8; MAC_LEN]) -> Result<()> {
    let mut mac = HmacSha256::new_from_slice(mac_key).map_err(crypto_failure)?;
    mac.update(data);
    mac.verify_slice(tag).map_err(|_| {
        NotecryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::AuthenticationFailed,
            "authentication failed: wrong password, or corrupted or tampered-with data",
        )
    })
}

/// Encrypt plaintext with a password using fresh random salts and IV
///
/// Returns the binary frame: magic(4) + cipher salt(16) + MAC salt(16) +
/// IV(16) + ciphertext(variable) + MAC(32). Salts and IV come from the
/// operating system CSPRNG and are never reused across calls.
pub fn encrypt(password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut cipher_salt = [0u8; CIPHER_SALT_LEN];
    OsRng.fill_bytes(&mut cipher_salt);

    let mut mac_salt = [0u8; MAC_SALT_LEN];
    OsRng.fill_bytes(&mut mac_salt);

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    encrypt_deterministic(password, plaintext, &cipher_salt, &mac_salt, &iv)
}

/// Encrypt plaintext with a password using provided salts and IV
///
/// This function is ONLY for testing purposes to generate deterministic
/// output. NEVER use this in production - always use `encrypt()` which
/// generates random salts and IV.
pub fn encrypt_deterministic(
    password: &[u8],
    plaintext: &[u8],
    cipher_salt: &[u8; CIPHER_SALT_LEN],
    mac_salt: &[u8; MAC_SALT_LEN],
    iv: &[u8; IV_LEN],
) -> Result<Vec<u8>> {
    let cipher_key = derive_key(password, cipher_salt);

    let ciphertext = Aes128CbcEnc::new_from_slices(&cipher_key[..], iv)
        .map_err(crypto_failure)?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut output = frame::assemble_prefix(cipher_salt, mac_salt, iv, &ciphertext);

    let mac_key = derive_key(password, mac_salt);
    let tag = compute_mac(&mac_key[..], &output)?;
    output.extend_from_slice(&tag);

    Ok(output)
}

/// Decrypt a binary frame with a password
///
/// The MAC gates everything: no cipher key is derived and no block is
/// decrypted until the tag over the frame prefix has verified.
pub fn decrypt(password: &[u8], frame_bytes: &[u8]) -> Result<Vec<u8>> {
    let parsed = Frame::parse(frame_bytes)?;

    let mac_key = derive_key(password, parsed.mac_salt);
    verify_mac(&mac_key[..], parsed.authenticated(), parsed.mac)?;

    let cipher_key = derive_key(password, parsed.cipher_salt);
    let plaintext = Aes128CbcDec::new_from_slices(&cipher_key[..], parsed.iv)
        .map_err(crypto_failure)?
        .decrypt_padded_vec_mut::<Pkcs7>(parsed.ciphertext)
        .map_err(|_| {
            NotecryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidPadding,
                "decryption produced invalid padding",
            )
        })?;

    Ok(plaintext)
}

fn crypto_failure(err: impl std::error::Error + Send + Sync + 'static) -> NotecryptError {
    NotecryptError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::CryptoFailure,
        "cryptographic primitive failed",
        err,
    )
}
