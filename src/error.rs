// Copyright 2015-2023 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Error types for the crate

#![deny(missing_docs)]

use std::fmt;

#[cfg(feature = "backtrace")]
pub use backtrace::Backtrace as ExtBacktrace;
#[cfg(feature = "backtrace")]
use once_cell::sync::Lazy;
use thiserror::Error;

/// Boolean for checking if backtrace is enabled at runtime
#[cfg(feature = "backtrace")]
pub static ENABLE_BACKTRACE: Lazy<bool> = Lazy::new(|| {
    use std::env;
    let bt = env::var("RUST_BACKTRACE");
    matches!(bt.as_ref().map(|s| s as &str), Ok("full") | Ok("1"))
});

/// Generate a backtrace
///
/// If RUST_BACKTRACE is 1 or full then this will return Some(Backtrace), otherwise, NONE.
#[cfg(feature = "backtrace")]
#[macro_export]
macro_rules! trace {
    () => {{
        use $crate::ExtBacktrace as Backtrace;

        if *$crate::ENABLE_BACKTRACE {
            Some(Backtrace::new())
        } else {
            None
        }
    }};
}

/// An alias for results returned by functions of this crate
pub(crate) type NameResult<T> = ::core::result::Result<T, NameError>;

/// The error type for domain name parsing and validation
#[derive(Error, Clone, Debug)]
#[non_exhaustive]
pub struct NameError {
    /// Kind of error that occurred
    pub kind: NameErrorKind,
    /// Backtrace to the source of the error
    #[cfg(feature = "backtrace")]
    pub backtrack: Option<ExtBacktrace>,
}

impl NameError {
    /// Get the kind of the error
    #[inline]
    pub fn kind(&self) -> &NameErrorKind {
        &self.kind
    }

    /// Returns true if the error came from the trusted wire-bytes path, i.e. an upstream
    /// decoder handed over bytes violating the name invariants, rather than from user input.
    #[inline]
    pub fn is_internal(&self) -> bool {
        matches!(self.kind, NameErrorKind::InternalWireInvariant { .. })
    }
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        cfg_if::cfg_if! {
            if #[cfg(feature = "backtrace")] {
                if let Some(backtrace) = &self.backtrack {
                    fmt::Display::fmt(&self.kind, f)?;
                    fmt::Debug::fmt(backtrace, f)
                } else {
                    fmt::Display::fmt(&self.kind, f)
                }
            } else {
                fmt::Display::fmt(&self.kind, f)
            }
        }
    }
}

impl<E: Into<NameErrorKind>> From<E> for NameError {
    fn from(error: E) -> Self {
        Self {
            kind: error.into(),
            #[cfg(feature = "backtrace")]
            backtrack: trace!(),
        }
    }
}

/// The error kind for errors that get returned in the crate
///
/// All of these are synchronous validation failures produced at construction time. The
/// `name` fields hold a copy of the original, unparsed input so a diagnostic can be
/// rendered without re-deriving it.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum NameErrorKind {
    /// The input text was zero-length
    #[error("domain name was empty")]
    EmptyName,

    /// A non-ASCII byte was found on the ASCII-only byte-span parsing path
    ///
    /// The IDNA-bearing string path tolerates Unicode; this kind is only produced by
    /// [`Name::from_ascii`](crate::Name::from_ascii).
    #[non_exhaustive]
    #[error("domain name must be ascii, byte {byte:#04x} in '{}'", String::from_utf8_lossy(.name))]
    NotAscii {
        /// The first offending byte
        byte: u8,
        /// The original input
        name: Box<[u8]>,
    },

    /// The packed form, including the implicit terminating root label, exceeds 255 bytes
    #[non_exhaustive]
    #[error("domain name exceeds maximum length {max}: {len} in '{}'", String::from_utf8_lossy(.name))]
    NameTooLong {
        /// Encoded length the name would have had
        len: usize,
        /// Specified maximum, always 255
        max: usize,
        /// The original input
        name: Box<[u8]>,
    },

    /// A single label exceeds 63 bytes
    #[non_exhaustive]
    #[error("label exceeds maximum length {max}: {len} in '{}'", String::from_utf8_lossy(.name))]
    LabelTooLong {
        /// Length of the offending label
        len: usize,
        /// Specified maximum, always 63
        max: usize,
        /// The original input
        name: Box<[u8]>,
    },

    /// An empty label was found, including a lone leading separator
    #[non_exhaustive]
    #[error("label must not be empty in '{}'", String::from_utf8_lossy(.name))]
    EmptyLabel {
        /// The original input
        name: Box<[u8]>,
    },

    /// A label byte is outside the accepted character class `[a-z0-9-_* ]`
    #[non_exhaustive]
    #[error("label contains invalid byte {byte:#04x} in '{}'", String::from_utf8_lossy(.name))]
    InvalidLabelByte {
        /// The offending byte
        byte: u8,
        /// The original input
        name: Box<[u8]>,
    },

    /// The IDNA component failed to convert the input to its ASCII form
    #[non_exhaustive]
    #[error("idna conversion to ascii failed for '{}'", String::from_utf8_lossy(.name))]
    Idna {
        /// The original input
        name: Box<[u8]>,
    },

    /// A trusted-input contract violation: wire bytes handed to
    /// [`Name::from_wire_bytes`](crate::Name::from_wire_bytes) do not satisfy the name
    /// invariants
    ///
    /// This is never produced by the public parsing API; seeing it means an upstream
    /// collaborator broke its contract.
    #[non_exhaustive]
    #[error("wire data violates name invariants at offset {offset}: {reason}")]
    InternalWireInvariant {
        /// Byte offset into the wire data where the violation was found
        offset: usize,
        /// Which invariant was violated
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_original_input() {
        let err = NameError::from(NameErrorKind::InvalidLabelByte {
            byte: b'!',
            name: Box::from(&b"bad!label.example"[..]),
        });
        let msg = err.to_string();
        assert!(msg.contains("0x21"), "{msg}");
        assert!(msg.contains("bad!label.example"), "{msg}");
    }

    #[test]
    fn test_internal_kind_is_distinguishable() {
        let internal = NameError::from(NameErrorKind::InternalWireInvariant {
            offset: 3,
            reason: "label length out of range",
        });
        let user = NameError::from(NameErrorKind::EmptyName);

        assert!(internal.is_internal());
        assert!(!user.is_internal());
    }
}
