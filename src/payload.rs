use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

use crate::metadata::{parse_metadata, MetadataMap};
use crate::{key_with_context, Error};
use Error::MalformedPayload;

/// Variant list of one entry: slot 0 holds the plural msgid,
/// slots 1.. hold the translations by plural form.
pub type Variants = Vec<Option<String>>;

/// Locale data for any number of domains, in the layout produced by po2json:
///
/// ```json
/// {
///     "messages": {
///         "": { "plural-forms": "nplurals=2; plural=(n != 1);" },
///         "msgid": [ "msgid_plural", "msgstr", "msgstr_plural" ],
///         "msgctxt\u0004msgid": [ null, "msgstr" ]
///     }
/// }
/// ```
///
/// Domains keep the order of the source document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload(IndexMap<String, DomainData>);

impl Payload {
    /// Creates a payload with no domains.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses po2json output.
    ///
    /// # Examples
    ///
    /// ```
    /// use gettext_json::Payload;
    ///
    /// let payload = Payload::from_json(r#"{"messages": {"test": [null, "XXtestXX"]}}"#).unwrap();
    /// assert_eq!(payload.len(), 1);
    /// ```
    pub fn from_json(src: &str) -> Result<Self, Error> {
        Self::from_value(serde_json::from_str(src)?)
    }

    /// Converts an already parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        let domains = match value {
            Value::Object(domains) => domains,
            other => {
                return Err(MalformedPayload(format!(
                    "expected an object keyed by domain, found {}",
                    kind(&other)
                )))
            }
        };
        let mut payload = Payload::new();
        for (name, data) in domains {
            let data = DomainData::from_value(&name, data)?;
            payload.0.insert(name, data);
        }
        Ok(payload)
    }

    /// Adds (or replaces) the data of one domain.
    pub fn domain<S: Into<String>>(mut self, name: S, data: DomainData) -> Self {
        self.insert(name, data);
        self
    }

    /// Adds (or replaces) the data of one domain.
    pub fn insert<S: Into<String>>(&mut self, name: S, data: DomainData) {
        self.0.insert(name.into(), data);
    }

    /// Returns the data supplied for `name`.
    pub fn get(&self, name: &str) -> Option<&DomainData> {
        self.0.get(name)
    }

    /// Iterates over the domains in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, DomainData> {
        self.0.iter()
    }

    /// Number of domains in the payload, empty ones included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload names no domain at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Payload::from_value(value).map_err(de::Error::custom)
    }
}

/// The raw contents of one domain: an optional header and the entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DomainData {
    header: Option<MetadataMap>,
    entries: IndexMap<String, Variants>,
}

impl DomainData {
    /// Creates a domain with no header and no entries.
    pub fn new() -> Self {
        Self::default()
    }

    fn from_value(domain: &str, value: Value) -> Result<Self, Error> {
        let map = match value {
            // po2json may emit a domain without content
            Value::Null => return Ok(DomainData::new()),
            Value::Object(map) => map,
            other => {
                return Err(MalformedPayload(format!(
                    "domain '{}' must be an object, found {}",
                    domain,
                    kind(&other)
                )))
            }
        };

        let mut data = DomainData::new();
        for (key, value) in map {
            if key.is_empty() {
                data.header = Some(header_from_value(domain, value)?);
            } else {
                let variants = variants_from_value(domain, &key, value)?;
                data.entries.insert(key, variants);
            }
        }
        Ok(data)
    }

    /// Sets one header field.
    pub fn header_field<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.header
            .get_or_insert_with(MetadataMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Stores a variant list verbatim under a lookup key.
    pub fn entry<S: Into<String>>(mut self, key: S, variants: Variants) -> Self {
        self.entries.insert(key.into(), variants);
        self
    }

    /// Adds a singular translation.
    pub fn message(self, msg_id: &str, msg_str: &str) -> Self {
        self.entry(msg_id, vec![None, Some(msg_str.to_owned())])
    }

    /// Adds a translation in the context `msg_context`.
    pub fn context_message(self, msg_context: &str, msg_id: &str, msg_str: &str) -> Self {
        self.entry(
            key_with_context(msg_context, msg_id),
            vec![None, Some(msg_str.to_owned())],
        )
    }

    /// Adds a translation with one string per plural form.
    pub fn plural_message(self, msg_id: &str, msg_id_plural: &str, msg_strs: &[&str]) -> Self {
        let mut variants = vec![Some(msg_id_plural.to_owned())];
        variants.extend(msg_strs.iter().map(|s| Some((*s).to_owned())));
        self.entry(msg_id, variants)
    }

    /// The header, if the domain supplied one.
    pub fn header(&self) -> Option<&MetadataMap> {
        self.header.as_ref()
    }

    /// The entries in insertion order.
    pub fn entries(&self) -> &IndexMap<String, Variants> {
        &self.entries
    }

    /// True when the domain supplied neither a header nor entries.
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.entries.is_empty()
    }
}

fn header_from_value(domain: &str, value: Value) -> Result<MetadataMap, Error> {
    match value {
        Value::Object(fields) => fields
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k, s)),
                Value::Number(n) => Ok((k, n.to_string())),
                Value::Bool(b) => Ok((k, b.to_string())),
                other => Err(MalformedPayload(format!(
                    "header field '{}' of domain '{}' must be a string, found {}",
                    k,
                    domain,
                    kind(&other)
                ))),
            })
            .collect(),
        // a raw PO header, as stored under the empty msgid
        Value::String(blob) => parse_metadata(&blob),
        other => Err(MalformedPayload(format!(
            "header of domain '{}' must be an object, found {}",
            domain,
            kind(&other)
        ))),
    }
}

fn variants_from_value(domain: &str, key: &str, value: Value) -> Result<Variants, Error> {
    let malformed = |found: &Value| {
        MalformedPayload(format!(
            "entry '{}' of domain '{}' must be a list of strings, found {}",
            key.replace('\x04', "\\u0004"),
            domain,
            kind(found)
        ))
    };
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(Some(s)),
                Value::Null => Ok(None),
                other => Err(malformed(&other)),
            })
            .collect(),
        other => Err(malformed(&other)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

impl<'a> IntoIterator for &'a Payload {
    type Item = (&'a String, &'a DomainData);
    type IntoIter = indexmap::map::Iter<'a, String, DomainData>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
