use serde::Deserialize;

use crate::{Error, Gettext, Payload, DEFAULT_DOMAIN};

/// Options allows configuring a [`Gettext`] before it is built.
///
/// Unknown keys in a JSON configuration are ignored.
///
/// # Examples
/// ```
/// use gettext_json::Options;
///
/// let gt = Options::from_json(r#"{
///     "domain": "app",
///     "locale_data": { "app": { "Open": [null, "Ouvrir"] } }
/// }"#).unwrap().build().unwrap();
///
/// assert_eq!(gt.domain(), "app");
/// assert_eq!(gt.gettext("Open"), "Ouvrir");
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Options {
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    locale_data: Option<Payload>,
}

impl Options {
    /// Returns a new instance of Options with default options.
    pub fn new() -> Self {
        Default::default()
    }

    /// Reads options from a JSON object with the keys `domain` and `locale_data`.
    pub fn from_json(src: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(src)?)
    }

    /// Sets the default domain.
    /// If this option is not enabled, `"messages"` is used.
    pub fn domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Locale data merged while building.
    pub fn locale_data(mut self, payload: Payload) -> Self {
        self.locale_data = Some(payload);
        self
    }

    /// Builds the resolver, merging the locale data if any was given.
    ///
    /// Fails with [`Error::MissingDomain`] when both a domain and locale data
    /// were given but the data has nothing for that domain, and with any
    /// error of [`Gettext::merge`].
    pub fn build(self) -> Result<Gettext, Error> {
        let mut gettext = Gettext::new(self.domain.as_deref().unwrap_or(DEFAULT_DOMAIN));
        if let Some(ref payload) = self.locale_data {
            gettext.merge(payload)?;
            if let Some(domain) = self.domain {
                if !gettext.store().contains(&domain) {
                    return Err(Error::MissingDomain(domain));
                }
            }
        }
        Ok(gettext)
    }
}
