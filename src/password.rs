//! Password reading functionality

use crate::error::{ErrorCategory, ErrorKind, NotecryptError, Result};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Trait for reading passwords from various sources
pub trait PasswordReader {
    /// Read a password as UTF-8 text.
    ///
    /// Returns the password wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped. The token format hashes the UTF-8
    /// bytes of the password, so text is the native representation.
    fn read_password(&mut self) -> Result<Zeroizing<String>>;
}

/// Rejects empty or whitespace-only passwords.
///
/// The codec itself accepts any password bytes; this check exists at the
/// boundary where a human types one, because a blank password is almost
/// always an accidental return key.
pub fn reject_blank(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(NotecryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::PasswordUnavailable,
            "password must not be empty",
        ));
    }
    Ok(())
}

/// Returns a fixed password (for testing)
pub struct ConstantPasswordReader {
    password: Zeroizing<String>,
}

impl ConstantPasswordReader {
    pub fn new(password: String) -> Self {
        Self {
            password: Zeroizing::new(password),
        }
    }
}

impl PasswordReader for ConstantPasswordReader {
    fn read_password(&mut self) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new((*self.password).clone()))
    }
}

/// Reads a password from any io::Read source
pub struct ReaderPasswordReader {
    reader: Box<dyn Read>,
}

impl ReaderPasswordReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl PasswordReader for ReaderPasswordReader {
    fn read_password(&mut self) -> Result<Zeroizing<String>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            NotecryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("error reading password: {}", e),
                e,
            )
        })?;
        let text = std::str::from_utf8(&data).map_err(|e| {
            NotecryptError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::InvalidEncoding,
                "password input is not valid UTF-8",
                e,
            )
        })?;
        // A trailing newline is an artifact of how the password was piped
        // in, not part of the password.
        let trimmed = text.strip_suffix('\n').unwrap_or(text);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Zeroizing::new(trimmed.to_string()))
    }
}

/// Reads a password from the terminal with no echo
pub struct TerminalPasswordReader;

impl TerminalPasswordReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPasswordReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordReader for TerminalPasswordReader {
    fn read_password(&mut self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(NotecryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::PasswordUnavailable,
                "cannot read password from terminal - stdin is not a terminal",
            ));
        }

        io::stderr()
            .write_all(b"Password (notecrypt): ")
            .map_err(|e| {
                NotecryptError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("failed to write prompt: {}", e),
                    e,
                )
            })?;
        io::stderr().flush().map_err(|e| {
            NotecryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to flush prompt: {}", e),
                e,
            )
        })?;

        // Read password *without echo*
        let password = rpassword::read_password().map_err(|e| {
            NotecryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PasswordUnavailable,
                format!("failure reading password: {}", e),
                e,
            )
        })?;

        Ok(Zeroizing::new(password))
    }
}

/// Wraps another PasswordReader and caches the result
///
/// Provides "at most once" semantics - the upstream reader is called
/// only on the first invocation, and subsequent calls return the cached
/// value. The cached password is wrapped in `Zeroizing` and will be
/// securely wiped when this reader is dropped.
pub struct CachingPasswordReader {
    upstream: Box<dyn PasswordReader>,
    cached: Option<Zeroizing<String>>,
}

impl CachingPasswordReader {
    pub fn new(upstream: Box<dyn PasswordReader>) -> Self {
        Self {
            upstream,
            cached: None,
        }
    }
}

impl PasswordReader for CachingPasswordReader {
    fn read_password(&mut self) -> Result<Zeroizing<String>> {
        if self.cached.is_none() {
            let password = self.upstream.read_password()?;
            self.cached = Some(password);
        }
        let inner: &String = self.cached.as_ref().unwrap();
        Ok(Zeroizing::new(inner.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCategory, ErrorKind, NotecryptError};

    #[test]
    fn test_constant_reader() {
        let mut reader = ConstantPasswordReader::new("test123".to_string());
        assert_eq!(&*reader.read_password().unwrap(), "test123");
        assert_eq!(&*reader.read_password().unwrap(), "test123");
    }

    #[test]
    fn test_reject_blank() {
        assert!(reject_blank("hunter2").is_ok());
        assert!(reject_blank("  spaced  ").is_ok());

        let err = reject_blank("").expect_err("expected rejection");
        assert_eq!(err.kind, Some(ErrorKind::PasswordUnavailable));

        let err = reject_blank("   \t\n").expect_err("expected rejection");
        assert_eq!(err.kind, Some(ErrorKind::PasswordUnavailable));
    }

    #[test]
    fn test_reader_password_reader() {
        let data = b"mypassword";
        let mut reader = ReaderPasswordReader::new(Box::new(&data[..]));
        assert_eq!(&*reader.read_password().unwrap(), "mypassword");
    }

    #[test]
    fn test_reader_password_reader_empty() {
        let data = b"";
        let mut reader = ReaderPasswordReader::new(Box::new(&data[..]));
        assert_eq!(&*reader.read_password().unwrap(), "");
    }

    #[test]
    fn test_reader_password_reader_strips_trailing_newline() {
        let data = b"mypassword\n";
        let mut reader = ReaderPasswordReader::new(Box::new(&data[..]));
        assert_eq!(&*reader.read_password().unwrap(), "mypassword");

        let data = b"mypassword\r\n";
        let mut reader = ReaderPasswordReader::new(Box::new(&data[..]));
        assert_eq!(&*reader.read_password().unwrap(), "mypassword");
    }

    #[test]
    fn test_reader_password_reader_keeps_interior_whitespace() {
        let data = b"correct horse battery staple";
        let mut reader = ReaderPasswordReader::new(Box::new(&data[..]));
        assert_eq!(&*reader.read_password().unwrap(), "correct horse battery staple");
    }

    #[test]
    fn test_reader_password_reader_non_utf8() {
        let data: &[u8] = &[0xff, 0xfe, 0x00, 0x01];
        let mut reader = ReaderPasswordReader::new(Box::new(data));
        let err = reader.read_password().expect_err("expected encoding error");
        assert_eq!(err.kind, Some(ErrorKind::InvalidEncoding));
    }

    #[test]
    fn test_caching_reader() {
        // Track how many times upstream is called
        use std::cell::RefCell;
        use std::rc::Rc;

        struct CountingReader {
            password: String,
            call_count: Rc<RefCell<usize>>,
        }

        impl PasswordReader for CountingReader {
            fn read_password(&mut self) -> Result<Zeroizing<String>> {
                *self.call_count.borrow_mut() += 1;
                Ok(Zeroizing::new(self.password.clone()))
            }
        }

        let call_count = Rc::new(RefCell::new(0));
        let upstream = CountingReader {
            password: "cached_pass".to_string(),
            call_count: call_count.clone(),
        };

        let mut caching = CachingPasswordReader::new(Box::new(upstream));

        // First call should invoke upstream
        assert_eq!(&*caching.read_password().unwrap(), "cached_pass");
        assert_eq!(*call_count.borrow(), 1);

        // Second call should return cached value without calling upstream
        assert_eq!(&*caching.read_password().unwrap(), "cached_pass");
        assert_eq!(*call_count.borrow(), 1);
    }

    #[test]
    fn test_caching_reader_with_error() {
        // Reader that always fails
        struct FailingReader;

        impl PasswordReader for FailingReader {
            fn read_password(&mut self) -> Result<Zeroizing<String>> {
                Err(NotecryptError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::PasswordUnavailable,
                    "simulated error",
                ))
            }
        }

        let mut caching = CachingPasswordReader::new(Box::new(FailingReader));

        // First call should propagate error
        assert!(caching.read_password().is_err());

        // Error should not be cached - subsequent call should try again
        assert!(caching.read_password().is_err());
    }
}
