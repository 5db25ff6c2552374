// Copyright 2015-2023 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A canonical in-memory representation of DNS domain names, and the codec between that
//! representation, the human-readable textual forms (ASCII and Unicode via IDNA), and the
//! DNS wire format's length-prefixed label sequence.
//!
//! [`Name`] enforces the RFC-mandated structural invariants at construction time: 255-byte
//! total and 63-byte label limits, no empty labels, ASCII-only lowercase storage. Unicode
//! input is converted through IDNA, including the three non-ASCII full stops accepted as
//! label separators. Labels are iterated zero-copy out of the packed representation.
//!
//! ```
//! use std::str::FromStr;
//! use dns_name::Name;
//!
//! let name = Name::from_str("www.Example.COM.").unwrap();
//! assert!(name.is_fqdn());
//! assert_eq!(name.to_ascii(), "www.example.com");
//! assert_eq!(name.iter().count(), 3);
//!
//! // names differing only in the trailing dot compare equal
//! assert_eq!(name, Name::from_str("www.example.com").unwrap());
//! ```

#![warn(
    clippy::default_trait_access,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::unimplemented,
    clippy::use_self,
    missing_copy_implementations,
    missing_docs,
    non_snake_case,
    non_upper_case_globals,
    rust_2018_idioms,
    unreachable_pub
)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[doc(no_inline)]
pub use idna;

mod error;
mod label;
mod name;

#[cfg(feature = "backtrace")]
pub use crate::error::{ENABLE_BACKTRACE, ExtBacktrace};
pub use crate::error::{NameError, NameErrorKind};
pub use crate::name::{LabelIter, LabelSpans, Name};
