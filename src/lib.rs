//! This crate resolves GNU gettext messages
//! from locale data that has already been loaded into memory,
//! typically the JSON produced by `po2json`.
//!
//! It does not read files or fetch anything over the network.
//! Whoever loads the catalogs hands the parsed data to
//! [`Gettext::merge`] (or [`Options::locale_data`]) and every lookup
//! afterwards is a plain, synchronous read.
//!
//! Lookups never fail. A message that is missing from every catalog,
//! or that lacks the requested plural form, comes back as the
//! source-language text that was passed in.
//!
//! # Domain fallback
//!
//! When the requested domain has no catalog at all, every loaded domain
//! is searched in the order it was first merged and the first match wins.
//! A string may therefore be translated from a domain other than the one
//! asked for. A domain that *is* loaded is never supplemented by others.
//!
//! # Example
//!
//! ```
//! use gettext_json::{Options, Payload};
//!
//! let data = Payload::from_json(r#"{
//!     "messages": {
//!         "": { "plural-forms": "nplurals=2; plural=(n != 1);" },
//!         "Name": [null, "Nom"],
//!         "file": ["files", "fichier", "fichiers"]
//!     }
//! }"#).expect("could not parse the locale data");
//!
//! let gt = Options::new().locale_data(data).build().expect("invalid locale data");
//!
//! assert_eq!(gt.gettext("Name"), "Nom");
//! assert_eq!(gt.ngettext("file", "files", 3), "fichiers");
//! assert_eq!(gt.gettext("Untranslated"), "Untranslated");
//! ```

#![warn(clippy::all)]
// https://pascalhertleif.de/artikel/good-practices-for-writing-rust-libraries/
#![deny(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces
)]

mod error;
/// Catalog headers: the key/value fields stored under the empty msgid.
pub mod metadata;
mod options;
mod payload;
mod plurals;
mod store;
mod translator;

use std::collections::HashMap;

pub use crate::{
    error::Error,
    options::Options,
    payload::{DomainData, Payload, Variants},
    plurals::PluralForms,
    store::CatalogStore,
    translator::{Category, Gettext, Request},
};
use metadata::MetadataMap;

/// Domain used when none is given, or when an empty name is given.
pub const DEFAULT_DOMAIN: &str = "messages";

/// Separates the context from the msgid in a lookup key.
pub const CONTEXT_GLUE: char = '\x04';

pub(crate) fn key_with_context(context: &str, key: &str) -> String {
    let mut result = context.to_owned();
    result.push(CONTEXT_GLUE);
    result.push_str(key);
    result
}

pub(crate) fn normalize_domain(domain: &str) -> &str {
    if domain.is_empty() {
        DEFAULT_DOMAIN
    } else {
        domain
    }
}

/// Catalog represents the translations of one domain,
/// accumulated over every payload merged into the store.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    header: MetadataMap,
    entries: HashMap<String, Variants>,
    plural_forms: Option<PluralForms>,
    rejected_rule: Option<String>,
}

impl Catalog {
    /// Creates an empty catalog.
    ///
    /// All the translated strings will be the same as the original ones.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copies header fields and entries of `data` into this catalog.
    /// Later values win on conflicting keys.
    pub(crate) fn merge_data(&mut self, data: &DomainData) {
        if let Some(header) = data.header() {
            self.header.merge(header);
        }
        self.entries.extend(
            data.entries()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
    }

    pub(crate) fn set_plural_forms(&mut self, plural_forms: PluralForms) {
        self.plural_forms = Some(plural_forms);
        self.rejected_rule = None;
    }

    pub(crate) fn reject_plural_rule(&mut self, rule: String) {
        self.rejected_rule = Some(rule);
    }

    /// The `plural-forms` header that failed to compile, while the catalog
    /// has no classifier. Merges skip it until the header changes.
    pub fn rejected_plural_rule(&self) -> Option<&str> {
        self.rejected_rule.as_deref()
    }

    /// The header fields merged so far.
    pub fn header(&self) -> &MetadataMap {
        &self.header
    }

    /// Returns the raw variant list stored under a lookup key,
    /// the plural msgid slot included.
    pub fn get(&self, key: &str) -> Option<&Variants> {
        self.entries.get(key)
    }

    /// Returns the translation slots stored under a lookup key,
    /// i.e. the variant list without the plural msgid slot.
    pub fn translations(&self, key: &str) -> Option<&[Option<String>]> {
        self.entries
            .get(key)
            .map(|variants| variants.get(1..).unwrap_or(&[]))
    }

    /// Number of entries in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The compiled plural classifier, once a merge has installed one.
    pub fn plural_forms(&self) -> Option<&PluralForms> {
        self.plural_forms.as_ref()
    }

    /// Picks the plural form for `n` objects among `available` translations.
    ///
    /// Indices past the declared `nplurals` or past `available` fall back to 0.
    /// A catalog without a classifier uses `n != 1`.
    pub fn plural_index(&self, n: u64, available: usize) -> usize {
        let form = match self.plural_forms {
            Some(ref rule) => {
                let form = rule.resolve(n);
                match rule.nplurals() {
                    Some(bound) if form >= bound => 0,
                    _ => form,
                }
            }
            None => plurals::default_resolver(n),
        };
        if form >= available {
            0
        } else {
            form
        }
    }
}

#[test]
fn catalog_impls_send_sync() {
    fn check<T: Send + Sync>(_: T) {}
    check(Catalog::empty());
    check(Gettext::default());
}

#[test]
fn catalog_merge_data() {
    let mut cat = Catalog::empty();
    cat.merge_data(
        &DomainData::new()
            .header_field("lang", "lt")
            .message("thisisid", "a")
            .context_message("context", "thisisid", "b")
            .plural_message("anotherid", "thisispluralid", &["c", "d"]),
    );
    cat.merge_data(
        &DomainData::new()
            .header_field("lang", "en")
            .message("thisisid", "e"),
    );
    let mut keys = cat.entries.keys().collect::<Vec<_>>();
    keys.sort();
    assert_eq!(keys, &["anotherid", "context\x04thisisid", "thisisid"]);
    assert_eq!(cat.translations("thisisid"), Some(&[Some("e".to_owned())][..]));
    assert_eq!(cat.header().language(), Some("en"));
    assert_eq!(cat.len(), 3);
}

#[test]
fn catalog_translations_skip_plural_slot() {
    let mut cat = Catalog::empty();
    cat.merge_data(
        &DomainData::new()
            .entry("only plural id", vec![Some("ids".into())])
            .entry("nothing", vec![]),
    );
    assert_eq!(cat.translations("only plural id"), Some(&[][..]));
    assert_eq!(cat.translations("nothing"), Some(&[][..]));
    assert_eq!(cat.translations("absent"), None);
    assert_eq!(cat.get("only plural id"), Some(&vec![Some("ids".to_owned())]));
}

#[test]
fn catalog_plural_index_not_enough_forms() {
    fn resolver(count: u64) -> usize {
        count as usize
    }

    let mut cat = Catalog::empty();
    cat.set_plural_forms(PluralForms::from_fn(resolver));
    assert_eq!(cat.plural_index(0, 2), 0);
    assert_eq!(cat.plural_index(1, 2), 1);
    assert_eq!(cat.plural_index(2, 2), 0);
}

#[test]
fn catalog_plural_index_respects_nplurals() {
    let mut cat = Catalog::empty();
    // claims two forms but yields a third
    cat.set_plural_forms(PluralForms::compile("nplurals=2; plural=n;").unwrap());
    assert_eq!(cat.plural_index(1, 5), 1);
    assert_eq!(cat.plural_index(2, 5), 0);
    assert_eq!(cat.plural_index(4, 5), 0);
}

#[test]
fn catalog_plural_index_default_rule() {
    let cat = Catalog::empty();
    assert!(cat.plural_forms().is_none());
    assert_eq!(cat.plural_index(1, 2), 0);
    assert_eq!(cat.plural_index(0, 2), 1);
    assert_eq!(cat.plural_index(5, 2), 1);
}

#[test]
fn normalize_empty_domain() {
    assert_eq!(normalize_domain(""), "messages");
    assert_eq!(normalize_domain("app"), "app");
    assert_eq!(key_with_context("ctx", "id"), "ctx\x04id");
}
