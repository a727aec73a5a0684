use indexmap::IndexMap;
use log::{debug, trace, warn};

use crate::{normalize_domain, Catalog, Error, Payload, PluralForms};

/// Catalogs of every loaded domain, in the order the domains first appeared.
///
/// The store only grows: payloads are merged into it and nothing is ever
/// removed. Merges must not run concurrently with each other or with lookups.
#[derive(Clone, Debug, Default)]
pub struct CatalogStore {
    catalogs: IndexMap<String, Catalog>,
}

impl CatalogStore {
    /// Creates a store without any catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a whole payload into the store.
    ///
    /// Domains without any key are ignored, an empty domain name means
    /// `"messages"`. Header fields and entries overwrite earlier ones with
    /// the same key. Afterwards every catalog still lacking a plural
    /// classifier gets one compiled from its `plural-forms` header, or the
    /// `n != 1` rule when the header has none.
    ///
    /// Every catalog is handled even when some header fails to compile.
    /// Such a catalog keeps its entries but no classifier, and remembers the
    /// rejected rule so that later merges skip it until the header changes.
    /// The first failure is returned as [`Error::PluralRuleSyntax`] once all
    /// catalogs are done; [`CatalogStore::use_default_plural_forms`] recovers.
    pub fn merge(&mut self, payload: &Payload) -> Result<(), Error> {
        for (name, data) in payload {
            if data.is_empty() {
                trace!("skipping empty domain '{}'", name);
                continue;
            }
            let name = normalize_domain(name);
            let catalog = self
                .catalogs
                .entry(name.to_owned())
                .or_insert_with(Catalog::empty);
            catalog.merge_data(data);
            debug!(
                "merged {} entries into domain '{}' ({} total)",
                data.entries().len(),
                name,
                catalog.len()
            );
        }

        let mut first_err = None;
        for (name, catalog) in self.catalogs.iter_mut() {
            if catalog.plural_forms().is_some() {
                continue;
            }
            let rule = catalog.header().plural_forms().map(str::to_owned);
            let plural_forms = match rule {
                Some(rule) if catalog.rejected_plural_rule() == Some(rule.as_str()) => continue,
                Some(rule) => match PluralForms::compile(&rule) {
                    Ok(plural_forms) => plural_forms,
                    Err(err) => {
                        warn!("domain '{}': {}", name, err);
                        catalog.reject_plural_rule(rule);
                        first_err.get_or_insert(err);
                        continue;
                    }
                },
                None => PluralForms::default(),
            };
            debug!(
                "domain '{}' uses {:?} plural forms",
                name,
                plural_forms.nplurals()
            );
            catalog.set_plural_forms(plural_forms);
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Installs the `n != 1` classifier in a catalog that has none, typically
    /// one whose `plural-forms` header was rejected by [`CatalogStore::merge`].
    ///
    /// Returns whether a classifier was installed.
    pub fn use_default_plural_forms(&mut self, domain: &str) -> bool {
        match self.catalogs.get_mut(normalize_domain(domain)) {
            Some(catalog) if catalog.plural_forms().is_none() => {
                debug!("domain '{}' falls back to the default plural rule", domain);
                catalog.set_plural_forms(PluralForms::default());
                true
            }
            _ => false,
        }
    }

    /// Returns the catalog of `domain`; the empty name means `"messages"`.
    pub fn get(&self, domain: &str) -> Option<&Catalog> {
        self.catalogs.get(normalize_domain(domain))
    }

    /// Whether a catalog exists for `domain`.
    pub fn contains(&self, domain: &str) -> bool {
        self.get(domain).is_some()
    }

    /// Iterates over the catalogs in the order their domains first appeared.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Catalog)> {
        self.catalogs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The loaded domain names, in merge order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    /// Number of loaded domains.
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    /// Whether nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}
