// Copyright 2015-2023 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Byte-level label primitives: separator detection and per-label validation.
//!
//! Labels are validated here as ASCII byte ranges; Unicode never reaches this module, the
//! IDNA conversion in [`Name`](crate::Name) happens first.

use crate::error::{NameErrorKind, NameResult};

/// Maximum length in bytes of a single label
pub(crate) const MAX_LABEL_LENGTH: usize = 63;

/// The ASCII label separator
pub(crate) const LABEL_SEPARATOR: u8 = b'.';

pub(crate) const WILDCARD: &[u8] = b"*";

/// U+3002 IDEOGRAPHIC FULL STOP
const IDEOGRAPHIC_FULL_STOP: &[u8] = "\u{3002}".as_bytes();
/// U+FF0E FULLWIDTH FULL STOP
const FULLWIDTH_FULL_STOP: &[u8] = "\u{ff0e}".as_bytes();
/// U+FF61 HALFWIDTH IDEOGRAPHIC FULL STOP
const HALFWIDTH_IDEOGRAPHIC_FULL_STOP: &[u8] = "\u{ff61}".as_bytes();

/// Returns true if `bytes` is the UTF-8 encoding of one of the three non-ASCII full stops
/// recognized as label separators.
///
/// Each of these encodes to exactly three bytes.
pub(crate) fn is_unicode_full_stop(bytes: &[u8]) -> bool {
    bytes == IDEOGRAPHIC_FULL_STOP
        || bytes == FULLWIDTH_FULL_STOP
        || bytes == HALFWIDTH_IDEOGRAPHIC_FULL_STOP
}

/// Splits a trailing root-label indicator off of `bytes`.
///
/// Returns the remaining span and whether an indicator was found, i.e. whether the name is
/// fully qualified. This must run before IDNA conversion, which does not accept a trailing
/// separator.
pub(crate) fn strip_root_indicator(bytes: &[u8]) -> (&[u8], bool) {
    if let Some(stripped) = bytes.strip_suffix(b".") {
        return (stripped, true);
    }

    if bytes.len() >= 3 && is_unicode_full_stop(&bytes[bytes.len() - 3..]) {
        return (&bytes[..bytes.len() - 3], true);
    }

    (bytes, false)
}

/// Byte class accepted inside a label, after case folding.
///
/// Underscores support service names (e.g. `_sip._tcp`), asterisks support wildcard labels,
/// and spaces show up in real-world device names.
fn is_allowed_label_byte(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'*' | b' ')
}

/// Validates a single ASCII label: non-empty, within the length limit, and made up of
/// accepted bytes only. Uppercase letters pass since the caller folds them while packing.
///
/// `original` is the unparsed input, carried into the error for diagnostics.
pub(crate) fn check_label(label: &[u8], original: &[u8]) -> NameResult<()> {
    if label.is_empty() {
        return Err(NameErrorKind::EmptyLabel {
            name: original.into(),
        }
        .into());
    }

    if label.len() > MAX_LABEL_LENGTH {
        return Err(NameErrorKind::LabelTooLong {
            len: label.len(),
            max: MAX_LABEL_LENGTH,
            name: original.into(),
        }
        .into());
    }

    for &b in label {
        if !is_allowed_label_byte(b.to_ascii_lowercase()) {
            return Err(NameErrorKind::InvalidLabelByte {
                byte: b,
                name: original.into(),
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_full_stops() {
        assert!(is_unicode_full_stop("\u{3002}".as_bytes()));
        assert!(is_unicode_full_stop("\u{ff0e}".as_bytes()));
        assert!(is_unicode_full_stop("\u{ff61}".as_bytes()));

        assert!(!is_unicode_full_stop(b"."));
        assert!(!is_unicode_full_stop(b"..."));
        // U+3001 IDEOGRAPHIC COMMA, same length, not a separator
        assert!(!is_unicode_full_stop("\u{3001}".as_bytes()));
    }

    #[test]
    fn test_strip_root_indicator() {
        assert_eq!(strip_root_indicator(b"example.com."), (&b"example.com"[..], true));
        assert_eq!(strip_root_indicator(b"example.com"), (&b"example.com"[..], false));
        assert_eq!(
            strip_root_indicator("example.com\u{3002}".as_bytes()),
            (&b"example.com"[..], true)
        );
        assert_eq!(
            strip_root_indicator("example.com\u{ff61}".as_bytes()),
            (&b"example.com"[..], true)
        );
        // only the trailing separator is stripped
        assert_eq!(strip_root_indicator(b"a.b"), (&b"a.b"[..], false));
    }

    #[test]
    fn test_check_label_charset() {
        assert!(check_label(b"example", b"example").is_ok());
        assert!(check_label(b"_sip", b"_sip").is_ok());
        assert!(check_label(b"*", b"*").is_ok());
        assert!(check_label(b"living room tv", b"living room tv").is_ok());
        assert!(check_label(b"a-b-c", b"a-b-c").is_ok());
        // uppercase passes here, the packer folds it
        assert!(check_label(b"EXAMPLE", b"EXAMPLE").is_ok());

        assert!(check_label(b"", b"").is_err());
        assert!(check_label(b"no/slash", b"no/slash").is_err());
        assert!(check_label(b"no@at", b"no@at").is_err());
        assert!(check_label("caf\u{e9}".as_bytes(), b"").is_err());
    }

    #[test]
    fn test_check_label_length() {
        let max = [b'a'; 63];
        assert!(check_label(&max, &max).is_ok());

        let over = [b'a'; 64];
        let err = check_label(&over, &over).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::NameErrorKind::LabelTooLong { len: 64, .. }
        ));
    }
}
