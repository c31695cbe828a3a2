//! File-level encrypt/decrypt operations
//!
//! High-level operations for turning a plaintext file into a token file
//! and back, and for updating an existing token file in place. A token
//! file holds a single token, optionally in the document marker form
//! (`` `evernote_secret <token>` ``); decryption accepts either form.

use crate::codec;
use crate::error::{ErrorCategory, ErrorKind, NotecryptError, Result};
use crate::marker;
use crate::password::{self, PasswordReader};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Encrypt a file's text into a token file
///
/// Reads UTF-8 plaintext from `input_path`, encrypts it using a password
/// from `password_reader`, and writes the token to `output_path`. With
/// `marked` set, the token is wrapped in the document marker form so the
/// output can be pasted into a note as-is.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    password_reader: &mut dyn PasswordReader,
    marked: bool,
) -> Result<()> {
    let plaintext = read_text(input_path)?;
    let password = password_reader.read_password()?;
    password::reject_blank(&password)?;
    let token =
        codec::encode(&plaintext, &password).map_err(|e| e.with_context("encryption failed"))?;
    let output = if marked {
        marker::format_secret(&token)
    } else {
        token
    };
    write_file_secure(output_path, output.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    Ok(())
}

/// Decrypt a token file
///
/// Reads a token (marked or bare) from `input_path`, decrypts it using a
/// password from `password_reader`, and writes the plaintext to
/// `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    password_reader: &mut dyn PasswordReader,
) -> Result<()> {
    let text = read_text(input_path)?;
    let token = marker::strip_secret(&text);
    let password = password_reader.read_password()?;
    password::reject_blank(&password)?;
    let plaintext =
        codec::decode(token, &password).map_err(|e| e.with_context("failed to decrypt"))?;
    write_file_secure(output_path, plaintext.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Update a token file with new plaintext using the same password
///
/// This function:
/// 1. Decrypts the existing token at `crypt_path` to validate the password
/// 2. Reads new plaintext from `plain_path`
/// 3. Encrypts the new plaintext with the validated password
/// 4. Atomically writes to `crypt_path` (tempfile + fsync + rename)
///
/// The atomic write ensures that either the old file or the new file exists,
/// never a partial/corrupted file. If the existing file used the document
/// marker form, the rewritten file keeps it.
///
/// The password validation prevents accidental password changes.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    password_reader: &mut dyn PasswordReader,
) -> Result<()> {
    let existing = read_text(crypt_path)?;
    let token = marker::strip_secret(&existing);
    let was_marked = token != existing.trim();
    let password = password_reader.read_password()?;
    password::reject_blank(&password)?;

    // Validate password by decrypting existing token (discard plaintext)
    codec::decode(token, &password).map_err(|e| e.with_context("failed to decrypt"))?;

    // Great, let's re-write it (atomically).
    let crypt_dir = crypt_path.parent().ok_or_else(|| {
        NotecryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::Io,
            "crypt_path has no parent directory",
        )
    })?;
    let mut temp_file = tempfile::NamedTempFile::new_in(crypt_dir).map_err(|e| {
        NotecryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to create tempfile",
            e,
        )
    })?;
    let new_plaintext = read_text(plain_path)?;
    let new_token = codec::encode(&new_plaintext, &password)
        .map_err(|e| e.with_context("failed to encrypt"))?;
    let new_output = if was_marked {
        marker::format_secret(&new_token)
    } else {
        new_token
    };

    temp_file.write_all(new_output.as_bytes()).map_err(|e| {
        NotecryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file.flush().map_err(|e| {
        NotecryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        NotecryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    // Atomically rename temp file to target (persist with restrictive permissions)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = temp_file
            .as_file()
            .metadata()
            .map_err(|e| {
                NotecryptError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to get tempfile metadata",
                    e,
                )
            })?
            .permissions();
        perms.set_mode(0o600);
        temp_file.as_file().set_permissions(perms).map_err(|e| {
            NotecryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to set tempfile permissions",
                e,
            )
        })?;
    }
    temp_file.persist(crypt_path).map_err(|e| {
        NotecryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", crypt_path.display()),
            e,
        )
    })?;
    Ok(())
}

/// Read a file that must contain UTF-8 text.
fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        NotecryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidEncoding,
            format!("{} is not valid UTF-8", path.display()),
            e,
        )
    })
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                NotecryptError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            NotecryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            NotecryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> NotecryptError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    NotecryptError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
