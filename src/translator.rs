use std::borrow::Cow;

use log::trace;

use crate::plurals::default_resolver;
use crate::{
    key_with_context, normalize_domain, Catalog, CatalogStore, Error, Payload, DEFAULT_DOMAIN,
};

/// POSIX locale categories.
///
/// Every lookup method that takes one accepts any category
/// and behaves as if `Messages` had been given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
    /// `LC_CTYPE`
    Ctype = 0,
    /// `LC_NUMERIC`
    Numeric = 1,
    /// `LC_TIME`
    Time = 2,
    /// `LC_COLLATE`
    Collate = 3,
    /// `LC_MONETARY`
    Monetary = 4,
    /// `LC_MESSAGES`
    #[default]
    Messages = 5,
    /// `LC_ALL`
    All = 6,
}

/// A lookup with every optional part spelled out.
///
/// The `*gettext` methods of [`Gettext`] are shorthands for
/// [`Gettext::resolve`] with some of these fields set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Request<'a> {
    /// Domain to look in; the default domain when `None`.
    pub domain: Option<&'a str>,
    /// Disambiguating context (msgctxt).
    pub context: Option<&'a str>,
    /// Source text. A request without one resolves to `""`.
    pub msg_id: Option<&'a str>,
    /// Plural source text and the count choosing the form.
    pub plural: Option<(&'a str, u64)>,
}

impl<'a> Request<'a> {
    /// A singular lookup of `msg_id` in the default domain.
    pub fn new(msg_id: &'a str) -> Self {
        Request {
            msg_id: Some(msg_id),
            ..Default::default()
        }
    }

    /// Looks in `domain` instead of the default domain.
    pub fn domain(mut self, domain: &'a str) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Qualifies the msgid with a context.
    pub fn context(mut self, context: &'a str) -> Self {
        self.context = Some(context);
        self
    }

    /// Turns the lookup into a plural one for `n` objects.
    pub fn plural(mut self, msg_id_plural: &'a str, n: u64) -> Self {
        self.plural = Some((msg_id_plural, n));
        self
    }
}

/// Resolves messages against a [`CatalogStore`].
///
/// Holds the default domain used by the methods that take none.
#[derive(Clone, Debug)]
pub struct Gettext {
    store: CatalogStore,
    domain: String,
}

impl Default for Gettext {
    fn default() -> Self {
        Gettext::new(DEFAULT_DOMAIN)
    }
}

impl Gettext {
    /// Creates a resolver with nothing loaded and `domain` as default domain.
    pub fn new<S: Into<String>>(domain: S) -> Self {
        Gettext {
            store: CatalogStore::new(),
            domain: domain.into(),
        }
    }

    /// Merges locale data into the store. See [`CatalogStore::merge`].
    pub fn merge(&mut self, payload: &Payload) -> Result<(), Error> {
        self.store.merge(payload)
    }

    /// See [`CatalogStore::use_default_plural_forms`].
    pub fn use_default_plural_forms(&mut self, domain: &str) -> bool {
        self.store.use_default_plural_forms(domain)
    }

    /// The loaded catalogs.
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// The default domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Changes the default domain.
    pub fn set_domain<S: Into<String>>(&mut self, domain: S) {
        self.domain = domain.into();
    }

    /// Resolves a fully spelled out request.
    ///
    /// # Examples
    ///
    /// ```
    /// use gettext_json::{DomainData, Gettext, Payload, Request};
    ///
    /// let mut gt = Gettext::default();
    /// gt.merge(&Payload::new().domain(
    ///     "messages",
    ///     DomainData::new().context_message("month", "May", "Mai"),
    /// )).unwrap();
    ///
    /// assert_eq!(gt.resolve(&Request::new("May").context("month")), "Mai");
    /// assert_eq!(gt.resolve(&Request::new("May")), "May");
    /// assert_eq!(gt.resolve(&Request::default()), "");
    /// ```
    pub fn resolve<'a>(&'a self, request: &Request<'a>) -> &'a str {
        match request.msg_id {
            Some(msg_id) => self.lookup(request.domain, request.context, msg_id, request.plural),
            None => "",
        }
    }

    fn lookup<'a>(
        &'a self,
        domain: Option<&str>,
        context: Option<&str>,
        msg_id: &'a str,
        plural: Option<(&'a str, u64)>,
    ) -> &'a str {
        let key = match context {
            Some(ctx) => Cow::Owned(key_with_context(ctx, msg_id)),
            None => Cow::Borrowed(msg_id),
        };
        let domain = normalize_domain(domain.unwrap_or(self.domain.as_str()));

        let matched = self.find(domain, &key);
        let translations = matched.map(|(_, t)| t).filter(|t| !t.is_empty());
        let source = |form: usize| -> Option<&'a str> {
            match translations {
                Some(t) => t.get(form).and_then(|s| s.as_deref()),
                None => match form {
                    0 => Some(msg_id),
                    1 => plural.map(|(p, _)| p),
                    _ => None,
                },
            }
        };

        let form = match (plural, matched) {
            (None, _) => 0,
            (Some((_, n)), Some((catalog, _))) => {
                catalog.plural_index(n, translations.map_or(2, |t| t.len()))
            }
            (Some((_, n)), None) => default_resolver(n),
        };
        source(form).or_else(|| source(0)).unwrap_or(msg_id)
    }

    /// Only the requested domain is searched when it is loaded;
    /// otherwise every domain is, in merge order.
    fn find<'a>(&'a self, domain: &str, key: &str) -> Option<(&'a Catalog, &'a [Option<String>])> {
        let found = match self.store.get(domain) {
            Some(catalog) => catalog.translations(key).map(|t| (catalog, t)),
            None => {
                trace!("domain '{}' is not loaded, searching all domains", domain);
                self.store
                    .iter()
                    .find_map(|(_, catalog)| catalog.translations(key).map(|t| (catalog, t)))
            }
        };
        if found.is_none() {
            trace!("no translation for {:?} in domain '{}'", key, domain);
        }
        found
    }

    /// Returns the singular translation of `msg_id`
    /// or `msg_id` itself if a translation does not exist.
    pub fn gettext<'a>(&'a self, msg_id: &'a str) -> &'a str {
        self.lookup(None, None, msg_id, None)
    }

    /// Like [`gettext`](Self::gettext), looking in `domain`.
    pub fn dgettext<'a>(&'a self, domain: &str, msg_id: &'a str) -> &'a str {
        self.lookup(Some(domain), None, msg_id, None)
    }

    /// Like [`dgettext`](Self::dgettext); the category is ignored.
    pub fn dcgettext<'a>(&'a self, domain: &str, msg_id: &'a str, _category: Category) -> &'a str {
        self.lookup(Some(domain), None, msg_id, None)
    }

    /// Returns the plural translation of `msg_id`
    /// with the correct plural form for the number `n` of objects.
    /// Returns msg_id if a translation does not exist and `n == 1`,
    /// msg_id_plural otherwise.
    pub fn ngettext<'a>(&'a self, msg_id: &'a str, msg_id_plural: &'a str, n: u64) -> &'a str {
        self.lookup(None, None, msg_id, Some((msg_id_plural, n)))
    }

    /// Like [`ngettext`](Self::ngettext), looking in `domain`.
    pub fn dngettext<'a>(
        &'a self,
        domain: &str,
        msg_id: &'a str,
        msg_id_plural: &'a str,
        n: u64,
    ) -> &'a str {
        self.lookup(Some(domain), None, msg_id, Some((msg_id_plural, n)))
    }

    /// Like [`dngettext`](Self::dngettext); the category is ignored.
    pub fn dcngettext<'a>(
        &'a self,
        domain: &str,
        msg_id: &'a str,
        msg_id_plural: &'a str,
        n: u64,
        _category: Category,
    ) -> &'a str {
        self.lookup(Some(domain), None, msg_id, Some((msg_id_plural, n)))
    }

    /// Returns the singular translation of `msg_id`
    /// in the context `msg_context`
    /// or `msg_id` itself if a translation does not exist.
    pub fn pgettext<'a>(&'a self, msg_context: &str, msg_id: &'a str) -> &'a str {
        self.lookup(None, Some(msg_context), msg_id, None)
    }

    /// Like [`pgettext`](Self::pgettext), looking in `domain`.
    pub fn dpgettext<'a>(&'a self, domain: &str, msg_context: &str, msg_id: &'a str) -> &'a str {
        self.lookup(Some(domain), Some(msg_context), msg_id, None)
    }

    /// Like [`dpgettext`](Self::dpgettext); the category is ignored.
    pub fn dcpgettext<'a>(
        &'a self,
        domain: &str,
        msg_context: &str,
        msg_id: &'a str,
        _category: Category,
    ) -> &'a str {
        self.lookup(Some(domain), Some(msg_context), msg_id, None)
    }

    /// Returns the plural translation of `msg_id`
    /// in the context `msg_context`
    /// with the correct plural form for the number `n` of objects.
    /// Returns msg_id if a translation does not exist and `n == 1`,
    /// msg_id_plural otherwise.
    pub fn npgettext<'a>(
        &'a self,
        msg_context: &str,
        msg_id: &'a str,
        msg_id_plural: &'a str,
        n: u64,
    ) -> &'a str {
        self.lookup(None, Some(msg_context), msg_id, Some((msg_id_plural, n)))
    }

    /// Like [`npgettext`](Self::npgettext), looking in `domain`.
    pub fn dnpgettext<'a>(
        &'a self,
        domain: &str,
        msg_context: &str,
        msg_id: &'a str,
        msg_id_plural: &'a str,
        n: u64,
    ) -> &'a str {
        self.lookup(Some(domain), Some(msg_context), msg_id, Some((msg_id_plural, n)))
    }

    /// Like [`dnpgettext`](Self::dnpgettext); the category is ignored.
    pub fn dcnpgettext<'a>(
        &'a self,
        domain: &str,
        msg_context: &str,
        msg_id: &'a str,
        msg_id_plural: &'a str,
        n: u64,
        _category: Category,
    ) -> &'a str {
        self.lookup(Some(domain), Some(msg_context), msg_id, Some((msg_id_plural, n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainData;

    fn lt_data() -> DomainData {
        DomainData::new()
            .header_field(
                "Plural-Forms",
                "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && (n%100<10 || n%100>=20) ? 1 : 2);",
            )
            .message("Text", "Tekstas")
            .context_message("context", "Text", "Tekstas kontekste")
            .plural_message("Garlic", "Garlics", &["Česnakas", "Česnakai", "Česnakų"])
    }

    fn gettext_with(payload: Payload) -> Gettext {
        let mut gt = Gettext::default();
        gt.merge(&payload).unwrap();
        gt
    }

    #[test]
    fn gettext_fallback_and_match() {
        let gt = gettext_with(Payload::new().domain("messages", lt_data()));
        assert_eq!(gt.gettext("Text"), "Tekstas");
        assert_eq!(gt.gettext("Not translated"), "Not translated");
        assert_eq!(gt.pgettext("context", "Text"), "Tekstas kontekste");
        assert_eq!(gt.pgettext("other", "Text"), "Text");
    }

    #[test]
    fn ngettext_without_translation() {
        let gt = Gettext::default();
        assert_eq!(gt.ngettext("Text", "Texts", 1), "Text");
        assert_eq!(gt.ngettext("Text", "Texts", 0), "Texts");
        assert_eq!(gt.ngettext("Text", "Texts", 2), "Texts");
    }

    #[test]
    fn ngettext_lithuanian() {
        let gt = gettext_with(Payload::new().domain("messages", lt_data()));
        assert_eq!(gt.ngettext("Garlic", "Garlics", 0), "Česnakų");
        assert_eq!(gt.ngettext("Garlic", "Garlics", 1), "Česnakas");
        for i in 2..10 {
            assert_eq!(gt.ngettext("Garlic", "Garlics", i), "Česnakai");
        }
        for i in 10..20 {
            assert_eq!(gt.ngettext("Garlic", "Garlics", i), "Česnakų");
        }
        assert_eq!(gt.ngettext("Garlic", "Garlics", 21), "Česnakas");
    }

    #[test]
    fn ngettext_with_translation() {
        let gt = gettext_with(Payload::new().domain(
            "messages",
            DomainData::new().plural_message("Text", "Texts", &["Tekstas", "Tekstai"]),
        ));
        assert_eq!(gt.ngettext("Text", "Texts", 1), "Tekstas");
        assert_eq!(gt.ngettext("Text", "Texts", 0), "Tekstai");
        assert_eq!(gt.ngettext("Text", "Texts", 2), "Tekstai");
        assert_eq!(gt.gettext("Text"), "Tekstas");
    }

    #[test]
    fn context_entry_needs_its_context() {
        let gt = gettext_with(Payload::new().domain(
            "messages",
            DomainData::new().context_message("ctx", "id", "translated"),
        ));
        assert_eq!(gt.gettext("id"), "id");
        assert_eq!(gt.pgettext("ctx", "id"), "translated");
        assert_eq!(gt.npgettext("ctx", "id", "ids", 1), "translated");
    }

    #[test]
    fn plural_slot_missing_uses_first_translation() {
        let gt = gettext_with(Payload::new().domain(
            "messages",
            DomainData::new()
                .header_field("plural-forms", "nplurals=2; plural=(n != 1);")
                .entry("file", vec![Some("files".into()), Some("fichier".into())])
                .entry("dir", vec![Some("dirs".into()), Some("dossier".into()), None])
                .entry("null first", vec![None, None, Some("many".into())]),
        ));
        assert_eq!(gt.ngettext("file", "files", 5), "fichier");
        assert_eq!(gt.ngettext("dir", "dirs", 5), "dossier");
        assert_eq!(gt.ngettext("null first", "null firsts", 5), "many");
        assert_eq!(gt.ngettext("null first", "null firsts", 1), "null first");
        assert_eq!(gt.gettext("null first"), "null first");
    }

    #[test]
    fn matched_entry_without_translations() {
        let gt = gettext_with(Payload::new().domain(
            "messages",
            DomainData::new()
                .header_field("plural-forms", "nplurals=1; plural=0;")
                .entry("apple", vec![Some("apples".into())]),
        ));
        assert_eq!(gt.gettext("apple"), "apple");
        // the catalog's single-form rule still picks the form
        assert_eq!(gt.ngettext("apple", "apples", 5), "apple");
    }

    #[test]
    fn domain_selection() {
        let gt = gettext_with(
            Payload::new()
                .domain("messages", DomainData::new().message("test", "from messages"))
                .domain(
                    "app",
                    DomainData::new()
                        .message("only app", "from app")
                        .message("test", "from app"),
                ),
        );
        assert_eq!(gt.gettext("test"), "from messages");
        assert_eq!(gt.dgettext("app", "test"), "from app");
        // a loaded domain is not supplemented by the others
        assert_eq!(gt.gettext("only app"), "only app");
        // an unknown domain searches every loaded one, in merge order
        assert_eq!(gt.dgettext("other", "test"), "from messages");
        assert_eq!(gt.dgettext("other", "only app"), "from app");
        // the empty domain name is the default one
        assert_eq!(gt.dgettext("", "test"), "from messages");
    }

    #[test]
    fn default_domain_is_configurable() {
        let mut gt = gettext_with(
            Payload::new()
                .domain("messages", DomainData::new().message("test", "from messages"))
                .domain("app", DomainData::new().message("test", "from app")),
        );
        gt.set_domain("app");
        assert_eq!(gt.domain(), "app");
        assert_eq!(gt.gettext("test"), "from app");
        assert_eq!(gt.dgettext("messages", "test"), "from messages");
    }

    #[test]
    fn category_is_ignored() {
        let gt = gettext_with(Payload::new().domain("messages", lt_data()));
        for category in [Category::Messages, Category::Time, Category::All] {
            assert_eq!(gt.dcgettext("messages", "Text", category), "Tekstas");
            assert_eq!(
                gt.dcngettext("messages", "Garlic", "Garlics", 2, category),
                "Česnakai"
            );
            assert_eq!(
                gt.dcpgettext("messages", "context", "Text", category),
                "Tekstas kontekste"
            );
            assert_eq!(
                gt.dcnpgettext("messages", "context", "Garlic", "Garlics", 1, category),
                "Garlic"
            );
        }
        assert_eq!(Category::default(), Category::Messages);
        assert_eq!(Category::Messages as i32, 5);
    }

    #[test]
    fn every_adapter_matches_resolve() {
        let gt = gettext_with(Payload::new().domain(
            "messages",
            lt_data().entry(
                "context\x04Garlic",
                vec![
                    Some("Garlics".into()),
                    Some("ctx one".into()),
                    Some("ctx few".into()),
                    Some("ctx many".into()),
                ],
            ),
        ));
        let cases: Vec<(&str, Request)> = vec![
            (gt.gettext("Text"), Request::new("Text")),
            (gt.dgettext("messages", "Text"), Request::new("Text").domain("messages")),
            (gt.ngettext("Garlic", "Garlics", 5), Request::new("Garlic").plural("Garlics", 5)),
            (
                gt.dngettext("x", "Garlic", "Garlics", 3),
                Request::new("Garlic").domain("x").plural("Garlics", 3),
            ),
            (gt.pgettext("context", "Text"), Request::new("Text").context("context")),
            (
                gt.dpgettext("messages", "context", "Text"),
                Request::new("Text").domain("messages").context("context"),
            ),
            (
                gt.npgettext("context", "Garlic", "Garlics", 2),
                Request::new("Garlic").context("context").plural("Garlics", 2),
            ),
            (
                gt.dnpgettext("messages", "context", "Garlic", "Garlics", 11),
                Request::new("Garlic")
                    .domain("messages")
                    .context("context")
                    .plural("Garlics", 11),
            ),
        ];
        for (got, request) in cases {
            assert_eq!(got, gt.resolve(&request), "{:?}", request);
        }
        assert_eq!(gt.npgettext("context", "Garlic", "Garlics", 2), "ctx few");
        assert_eq!(gt.dnpgettext("messages", "context", "Garlic", "Garlics", 11), "ctx many");
    }

    #[test]
    fn request_without_msgid() {
        let gt = Gettext::default();
        assert_eq!(gt.resolve(&Request::default()), "");
        assert_eq!(
            gt.resolve(&Request {
                context: Some("ctx"),
                ..Default::default()
            }),
            ""
        );
    }

    #[test]
    fn bad_plural_rule_falls_back_to_default() {
        let mut gt = Gettext::default();
        let result = gt.merge(&Payload::new().domain(
            "messages",
            DomainData::new()
                .header_field("plural-forms", "nplurals=2; plural=import os")
                .plural_message("file", "files", &["fichier", "fichiers"]),
        ));
        assert!(matches!(result, Err(Error::PluralRuleSyntax(_))));
        assert_eq!(gt.ngettext("file", "files", 1), "fichier");
        assert_eq!(gt.ngettext("file", "files", 2), "fichiers");

        assert!(gt.use_default_plural_forms("messages"));
        assert_eq!(gt.ngettext("file", "files", 1), "fichier");
        assert_eq!(gt.ngettext("file", "files", 2), "fichiers");
    }
}
