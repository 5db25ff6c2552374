// Copyright 2015-2023 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! domain name, aka labels, implementation

use std::fmt::{self, Write};
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use tinyvec::TinyVec;
use tracing::debug;

use crate::error::{NameErrorKind, NameResult};
use crate::label;

/// A DNS domain name
///
/// Holds the packed wire representation of the name: a sequence of length-prefixed labels,
/// without the terminating root label. All labels are ASCII and lowercase; Unicode input is
/// converted through IDNA at construction time. Values are immutable once constructed and
/// can be shared freely across threads.
#[derive(Clone, Default)]
pub struct Name {
    is_fqdn: bool,
    data: TinyVec<[u8; 32]>,
}

impl Name {
    /// Maximum legal length of a domain name in wire form, including the terminating root
    /// label
    pub const MAX_LENGTH: usize = 255;

    /// Maximum legal length of a single label
    pub const MAX_LABEL_LENGTH: usize = label::MAX_LABEL_LENGTH;

    /// Create a new empty, non-qualified domain name
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the root domain name, i.e. no labels
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_name::Name;
    ///
    /// let root = Name::root();
    /// assert!(root.is_root());
    /// assert_eq!(root.format_ascii(true), ".");
    /// ```
    pub fn root() -> Self {
        Self {
            is_fqdn: true,
            data: TinyVec::new(),
        }
    }

    /// Returns true if this is the root domain name
    ///
    /// In DNS the root is represented by `.`
    pub fn is_root(&self) -> bool {
        self.is_fqdn && self.data.is_empty()
    }

    /// Returns true if the name is fully qualified, i.e. anchored at the DNS root
    ///
    /// String-parsed names are fully qualified iff the source text ended with a root-label
    /// indicator; wire-format names always are.
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_name::Name;
    ///
    /// assert!(!Name::from_utf8("www.example.com").unwrap().is_fqdn());
    /// assert!(Name::from_utf8("www.example.com.").unwrap().is_fqdn());
    /// ```
    pub fn is_fqdn(&self) -> bool {
        self.is_fqdn
    }

    /// Returns the length this name takes in wire form, counting the terminating root label
    ///
    /// The `is_fqdn` flag is ignored: the root label always terminates the name in the DNS
    /// message format.
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_name::Name;
    ///
    /// assert_eq!(Name::from_utf8("www.example.com").unwrap().encoded_len(), 17);
    /// assert_eq!(Name::root().encoded_len(), 1);
    /// ```
    pub fn encoded_len(&self) -> usize {
        self.data.len() + 1
    }

    /// Returns the number of labels in the name, discounting a single leading `*`
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_name::Name;
    ///
    /// assert_eq!(Name::root().num_labels(), 0);
    /// assert_eq!(Name::from_utf8("example.com").unwrap().num_labels(), 2);
    /// assert_eq!(Name::from_utf8("*.example.com").unwrap().num_labels(), 2);
    /// ```
    pub fn num_labels(&self) -> u8 {
        let num = self.label_spans().count() as u8;
        if self.is_wildcard() { num - 1 } else { num }
    }

    /// True if the first label of this name is the wildcard, i.e. `*`
    pub fn is_wildcard(&self) -> bool {
        self.iter().next().is_some_and(|l| l == label::WILDCARD)
    }

    /// Returns an iterator over the labels, as byte slices into the packed representation
    ///
    /// Traversal is in storage order, most specific label first. No bytes are copied.
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_name::Name;
    ///
    /// let name = Name::from_utf8("www.example.com").unwrap();
    /// assert_eq!(name.iter().next(), Some(&b"www"[..]));
    /// ```
    pub fn iter(&self) -> LabelIter<'_> {
        LabelIter {
            spans: self.label_spans(),
        }
    }

    /// Returns an iterator over the `(start, len)` positions of each label's content within
    /// the packed representation
    ///
    /// This is the position form of [`Self::iter`]; both trust the invariants established
    /// at construction time and assert them only in debug builds.
    pub fn label_spans(&self) -> LabelSpans<'_> {
        LabelSpans {
            data: &self.data,
            offset: 0,
        }
    }

    /// Construct a name directly from already-valid wire bytes, without the terminating
    /// root label
    ///
    /// This is the trusted entry point for DNS-message decoders. The caller guarantees that
    /// `data` satisfies the name invariants (checked by [`Self::validate_wire_bytes`]); the
    /// constructor asserts them in debug builds only.
    pub fn from_wire_bytes(is_fqdn: bool, data: &[u8]) -> Self {
        debug_assert!(
            Self::validate_wire_bytes(data).is_ok(),
            "from_wire_bytes caller broke the wire contract: {:?}",
            Self::validate_wire_bytes(data),
        );
        Self {
            is_fqdn,
            data: data.iter().copied().collect(),
        }
    }

    /// Checks that `data` is a well-formed packed label sequence satisfying the name
    /// invariants
    ///
    /// Violations are reported as [`NameErrorKind::InternalWireInvariant`], distinguishable
    /// from the user-facing validation errors: they indicate an upstream decoder broke its
    /// contract, not bad user input.
    pub fn validate_wire_bytes(data: &[u8]) -> NameResult<()> {
        if data.len() + 1 > Self::MAX_LENGTH {
            return Err(NameErrorKind::InternalWireInvariant {
                offset: 0,
                reason: "name exceeds 255 bytes",
            }
            .into());
        }

        let mut offset = 0;
        while offset < data.len() {
            let len = data[offset] as usize;
            if len == 0 || len > Self::MAX_LABEL_LENGTH {
                return Err(NameErrorKind::InternalWireInvariant {
                    offset,
                    reason: "label length out of range 1..=63",
                }
                .into());
            }

            let start = offset + 1;
            let Some(content) = data.get(start..start + len) else {
                return Err(NameErrorKind::InternalWireInvariant {
                    offset,
                    reason: "label overruns the buffer",
                }
                .into());
            };

            for (i, &b) in content.iter().enumerate() {
                if !b.is_ascii() {
                    return Err(NameErrorKind::InternalWireInvariant {
                        offset: start + i,
                        reason: "non-ascii label byte",
                    }
                    .into());
                }
                if b.is_ascii_uppercase() {
                    return Err(NameErrorKind::InternalWireInvariant {
                        offset: start + i,
                        reason: "uppercase label byte",
                    }
                    .into());
                }
            }

            offset = start + len;
        }

        Ok(())
    }

    /// Will convert the string to a name using IDNA to encode Unicode labels as necessary
    ///
    /// A trailing label separator (ASCII `.`, or the ideographic, fullwidth, or halfwidth
    /// full stop) marks the name as fully qualified. Making names IDNA compatible has the
    /// side effect of lowercasing them.
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_name::Name;
    ///
    /// let name = Name::from_utf8("WWW.Example.COM").unwrap();
    /// assert_eq!(name.to_ascii(), "www.example.com");
    ///
    /// let name = Name::from_utf8("🦀.example.com").unwrap();
    /// assert_eq!(name.to_ascii(), "xn--zs9h.example.com");
    /// ```
    pub fn from_utf8<S: AsRef<str>>(name: S) -> NameResult<Self> {
        Self::from_utf8_with_config(name.as_ref(), to_ascii_config())
    }

    /// Same as [`Self::from_utf8`], with an explicit IDNA configuration
    ///
    /// The configuration is passed through to the IDNA component untouched, except that its
    /// length verification is always disabled: lengths are validated here, after
    /// conversion, against the DNS limits.
    pub fn from_utf8_with_config(name: &str, config: idna::Config) -> NameResult<Self> {
        let bytes = name.as_bytes();
        if bytes.is_empty() {
            return Err(NameErrorKind::EmptyName.into());
        }

        // short circuit root parse, for the ASCII dot and the three 3-byte full stops
        if bytes == b"." {
            return Ok(Self::root());
        }
        if bytes.len() == 3 {
            if label::is_unicode_full_stop(bytes) {
                return Ok(Self::root());
            }
            if bytes[0] == b'.' {
                return Err(NameErrorKind::EmptyLabel { name: bytes.into() }.into());
            }
        }

        // the IDNA conversion does not accept a trailing separator, strip it first
        let (stripped, is_fqdn) = label::strip_root_indicator(bytes);
        let stripped = &name[..stripped.len()];

        let ascii = match config.verify_dns_length(false).to_ascii(stripped) {
            Ok(ascii) => ascii,
            Err(_) => return Err(NameErrorKind::Idna { name: bytes.into() }.into()),
        };

        let mut this = Self {
            is_fqdn,
            data: TinyVec::new(),
        };
        this.push_ascii_labels(ascii.as_bytes(), bytes)?;
        Ok(this)
    }

    /// Will convert the byte span to a name, only allowing ASCII as valid input
    ///
    /// No IDNA conversion is involved; a non-ASCII byte fails with
    /// [`NameErrorKind::NotAscii`]. Labels are still folded to lowercase.
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_name::Name;
    ///
    /// let name = Name::from_ascii("WWW.example.COM.").unwrap();
    /// assert_eq!(name.to_ascii(), "www.example.com");
    /// assert!(name.is_fqdn());
    ///
    /// assert!(Name::from_ascii("🦀.example.com").is_err());
    /// ```
    pub fn from_ascii<B: AsRef<[u8]>>(name: B) -> NameResult<Self> {
        let bytes = name.as_ref();
        if bytes.is_empty() {
            return Err(NameErrorKind::EmptyName.into());
        }

        if let Some(&byte) = bytes.iter().find(|b| !b.is_ascii()) {
            return Err(NameErrorKind::NotAscii {
                byte,
                name: bytes.into(),
            }
            .into());
        }

        if bytes == b"." {
            return Ok(Self::root());
        }

        let (stripped, is_fqdn) = label::strip_root_indicator(bytes);

        let mut this = Self {
            is_fqdn,
            data: TinyVec::new(),
        };
        this.push_ascii_labels(stripped, bytes)?;
        Ok(this)
    }

    /// Splits `ascii` on the label separator, validates each label and appends it to the
    /// packed representation, folding to lowercase.
    ///
    /// `original` is the unparsed input, carried into errors for diagnostics. The first
    /// violated constraint wins; `self` must be discarded on error.
    fn push_ascii_labels(&mut self, ascii: &[u8], original: &[u8]) -> NameResult<()> {
        for lbl in ascii.split(|&b| b == label::LABEL_SEPARATOR) {
            label::check_label(lbl, original)?;

            // content bytes plus this label's length byte plus the implicit terminator
            let new_len = self.encoded_len() + lbl.len() + 1;
            if new_len > Self::MAX_LENGTH {
                return Err(NameErrorKind::NameTooLong {
                    len: new_len,
                    max: Self::MAX_LENGTH,
                    name: original.into(),
                }
                .into());
            }

            self.data.push(lbl.len() as u8);
            self.data.extend(lbl.iter().map(|b| b.to_ascii_lowercase()));
        }
        Ok(())
    }

    /// Converts this name into its dotted ASCII form, without a trailing root indicator
    ///
    /// IDNA labels are returned with the `xn--` prefix; see [`Self::to_utf8`] or the
    /// `Display` impl for the Unicode form.
    pub fn to_ascii(&self) -> String {
        self.format_ascii(false)
    }

    /// Converts this name into its dotted ASCII form
    ///
    /// With `with_root_label`, a fully qualified name gets a single trailing `.`; the root
    /// name formats as `"."` instead of `""`.
    pub fn format_ascii(&self, with_root_label: bool) -> String {
        let mut s = String::with_capacity(self.encoded_len() + 1);
        self.write_ascii(&mut s, with_root_label)
            .expect("string conversion of name should not fail");
        s
    }

    /// Writes the dotted ASCII form of this name to `f`, without allocating
    pub fn write_ascii<W: Write>(&self, f: &mut W, with_root_label: bool) -> fmt::Result {
        let mut iter = self.iter();
        if let Some(lbl) = iter.next() {
            write_label(f, lbl)?;
            for lbl in iter {
                f.write_char('.')?;
                write_label(f, lbl)?;
            }
        }

        if with_root_label && self.is_fqdn {
            f.write_char('.')?;
        }
        Ok(())
    }

    /// Converts this name into its Unicode form, without a trailing root indicator
    ///
    /// `xn--` labels are translated back through IDNA.
    pub fn to_utf8(&self) -> String {
        self.format_utf8(false)
    }

    /// Converts this name into its Unicode form
    ///
    /// Display must always produce some string: if the IDNA translation fails, the result
    /// degrades to `[invalid-domain](<ascii form>)` rather than an error.
    pub fn format_utf8(&self, with_root_label: bool) -> String {
        if self.data.is_empty() {
            return self.format_ascii(with_root_label);
        }

        let ascii = self.format_ascii(false);
        let (unicode, result) = to_unicode_config().to_unicode(&ascii);
        let mut unicode = match result {
            Ok(()) => unicode,
            Err(e) => {
                debug!("name did not translate via IDNA properly: {e:?}");
                format!("[invalid-domain]({ascii})")
            }
        };

        if with_root_label && self.is_fqdn {
            unicode.push('.');
        }
        unicode
    }

    /// Compares names considering the fully-qualified flag as well
    ///
    /// Regular equality considers only the labels, so `example.com` and `example.com.`
    /// compare equal; this comparison additionally requires the same trailing-dot-ness.
    ///
    /// # Examples
    ///
    /// ```
    /// use dns_name::Name;
    ///
    /// let relative = Name::from_utf8("example.com").unwrap();
    /// let fqdn = Name::from_utf8("example.com.").unwrap();
    /// assert_eq!(relative, fqdn);
    /// assert!(!relative.eq_exact(&fqdn));
    /// ```
    pub fn eq_exact(&self, other: &Self) -> bool {
        self.is_fqdn == other.is_fqdn && self.data == other.data
    }

    /// Construct a name holding the dotted-decimal text of `addr` as ONE opaque label
    ///
    /// The decimal string is not split on its internal dots: `127.0.0.1` becomes a single
    /// 9-byte label, distinct from parsing the same text (which yields four labels). This
    /// is the form used to embed an address where a wire-format name is expected.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    /// use dns_name::Name;
    ///
    /// let name = Name::from_ipv4(Ipv4Addr::new(127, 0, 0, 1));
    /// assert_eq!(name.num_labels(), 1);
    /// assert_ne!(name, Name::from_utf8("127.0.0.1").unwrap());
    /// ```
    pub fn from_ipv4(addr: Ipv4Addr) -> Self {
        let text = addr.to_string();
        // "255.255.255.255" is 15 bytes, always within the label limit
        let mut data = TinyVec::new();
        data.push(text.len() as u8);
        data.extend_from_slice(text.as_bytes());
        Self {
            is_fqdn: false,
            data,
        }
    }

    /// Extract the IPv4 address embedded by [`Self::from_ipv4`]
    ///
    /// Returns `None` unless the name holds exactly one label whose content is a strict
    /// dotted-decimal IPv4 literal.
    pub fn to_ipv4(&self) -> Option<Ipv4Addr> {
        let mut labels = self.iter();
        let lbl = labels.next()?;
        if labels.next().is_some() {
            return None;
        }
        std::str::from_utf8(lbl).ok()?.parse().ok()
    }

    /// Construct a name from an IP address, rejecting IPv6
    ///
    /// Only IPv4 addresses have a single-label embedding; IPv6 input yields `None`. See
    /// [`Self::from_ip_mapped`] for the variant that folds IPv4-mapped IPv6 addresses.
    pub fn from_ip(addr: IpAddr) -> Option<Self> {
        match addr {
            IpAddr::V4(v4) => Some(Self::from_ipv4(v4)),
            IpAddr::V6(_) => None,
        }
    }

    /// Construct a name from an IP address, folding IPv4-mapped IPv6 addresses down to
    /// their IPv4 form
    ///
    /// Still yields `None` for IPv6 addresses with no IPv4 mapping.
    pub fn from_ip_mapped(addr: IpAddr) -> Option<Self> {
        match addr {
            IpAddr::V4(v4) => Some(Self::from_ipv4(v4)),
            IpAddr::V6(v6) => v6.to_ipv4_mapped().map(Self::from_ipv4),
        }
    }

    /// Extract the embedded address as an [`IpAddr`]
    ///
    /// Only the IPv4 embedding exists, so this is [`Self::to_ipv4`] widened.
    pub fn to_ip(&self) -> Option<IpAddr> {
        self.to_ipv4().map(IpAddr::V4)
    }
}

/// labels are always ASCII per the name invariants
fn write_label<W: Write>(f: &mut W, lbl: &[u8]) -> fmt::Result {
    for &b in lbl {
        f.write_char(char::from(b))?;
    }
    Ok(())
}

fn to_ascii_config() -> idna::Config {
    // std3 rules stay off so that `_`, `*` and space survive to the local validation
    idna::Config::default()
        .use_std3_ascii_rules(false)
        .transitional_processing(true)
}

fn to_unicode_config() -> idna::Config {
    idna::Config::default()
        .use_std3_ascii_rules(false)
        .transitional_processing(false)
        .verify_dns_length(false)
}

impl fmt::Display for Name {
    /// Unicode form, without the root indicator
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_utf8(false))
    }
}

impl fmt::Debug for Name {
    /// ASCII form, with the root indicator
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Name(\"")?;
        self.write_ascii(f, true)?;
        f.write_str("\")")
    }
}

impl PartialEq for Name {
    /// Equality considers the labels only, not the fully-qualified flag; see
    /// [`Name::eq_exact`]. Case was folded at construction, so this is raw byte equality.
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Name {}

impl Hash for Name {
    /// Hashes the labels only, consistent with `PartialEq`
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl FromStr for Name {
    type Err = crate::NameError;

    /// Uses the [`Name::from_utf8`] conversion, see [`Name::from_ascii`] for ASCII-only input
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(s)
    }
}

impl TryFrom<&str> for Name {
    type Error = crate::NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_utf8(value)
    }
}

impl TryFrom<String> for Name {
    type Error = crate::NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_utf8(value)
    }
}

impl TryFrom<&[u8]> for Name {
    type Error = crate::NameError;

    /// The ASCII-only byte-span conversion, see [`Name::from_ascii`]
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_ascii(value)
    }
}

impl From<Ipv4Addr> for Name {
    fn from(addr: Ipv4Addr) -> Self {
        Self::from_ipv4(addr)
    }
}

impl<'a> IntoIterator for &'a Name {
    type Item = &'a [u8];
    type IntoIter = LabelIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

/// An iterator over the positions of the labels in a name
///
/// Yields `(start, len)` pairs addressing each label's content bytes within the packed
/// representation. Trusts the invariants established at construction; a malformed length
/// byte is an internal-contract violation caught by debug assertions, not a recoverable
/// error.
#[derive(Clone)]
pub struct LabelSpans<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Iterator for LabelSpans<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        let len = self.data[self.offset] as usize;
        debug_assert!(
            len >= 1 && len <= Name::MAX_LABEL_LENGTH,
            "corrupt label length {len} at offset {}",
            self.offset,
        );
        let start = self.offset + 1;
        debug_assert!(start + len <= self.data.len(), "label overruns the buffer");

        self.offset = start + len;
        Some((start, len))
    }
}

/// An iterator over the labels in a name, as byte slices
#[derive(Clone)]
pub struct LabelIter<'a> {
    spans: LabelSpans<'a>,
}

impl<'a> Iterator for LabelIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let (start, len) = self.spans.next()?;
        Some(&self.spans.data[start..start + len])
    }
}
