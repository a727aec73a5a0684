use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;

use super::Error;
use Error::MalformedMetadata;

/// Header fields of a catalog, kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataMap(IndexMap<String, String>);

impl MetadataMap {
    /// Creates an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a header field, ignoring ASCII case of the key.
    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(|v| v.as_str())
    }

    /// Returns the raw plural rule, e.g. `nplurals=2; plural=(n != 1);`.
    pub fn plural_forms(&self) -> Option<&str> {
        self.get_field("plural-forms")
    }

    /// Returns a string that indicates the character set.
    pub fn charset(&self) -> Option<&str> {
        self.get_field("content-type")
            .and_then(|x| x.split("charset=").nth(1))
            .map(|x| x.trim_end_matches(';').trim())
            .filter(|x| !x.is_empty())
    }

    /// Returns the language of the catalog.
    ///
    /// po2json writes it as `lang`, PO headers as `Language`.
    pub fn language(&self) -> Option<&str> {
        self.get_field("language").or_else(|| self.get_field("lang"))
    }

    /// Copies every field of `other` into this header, overwriting on conflict.
    pub fn merge(&mut self, other: &MetadataMap) {
        for (k, v) in other.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

impl Deref for MetadataMap {
    type Target = IndexMap<String, String>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MetadataMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MetadataMap(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parses a raw PO header blob (`"Key: value\n..."`) into its fields.
pub fn parse_metadata(blob: &str) -> Result<MetadataMap, Error> {
    let mut map = MetadataMap::new();
    for line in blob.split('\n').filter(|s| !s.trim().is_empty()) {
        let pos = match line.bytes().position(|b| b == b':') {
            Some(p) => p,
            None => return Err(MalformedMetadata),
        };
        map.insert(line[..pos].trim().to_owned(), line[pos + 1..].trim().to_owned());
    }
    Ok(map)
}

#[test]
fn test_metadatamap_charset() {
    {
        let mut map = MetadataMap::new();
        assert!(map.charset().is_none());
        map.insert("Content-Type".into(), "".into());
        assert!(map.charset().is_none());
        map.insert("Content-Type".into(), "abc".into());
        assert!(map.charset().is_none());
        map.insert("Content-Type".into(), "text/plain; charset=utf-42".into());
        assert_eq!(map.charset().unwrap(), "utf-42");
    }
}

#[test]
fn test_metadatamap_plural_forms_any_case() {
    let map: MetadataMap = vec![("plural-forms", "nplurals=1; plural=0;")].into_iter().collect();
    assert_eq!(map.plural_forms(), Some("nplurals=1; plural=0;"));

    let map: MetadataMap = vec![("Plural-Forms", "nplurals=2; plural=(n != 1);")]
        .into_iter()
        .collect();
    assert_eq!(map.plural_forms(), Some("nplurals=2; plural=(n != 1);"));
    assert!(MetadataMap::new().plural_forms().is_none());
}

#[test]
fn test_metadatamap_language() {
    let map: MetadataMap = vec![("lang", "en")].into_iter().collect();
    assert_eq!(map.language(), Some("en"));
    let map: MetadataMap = vec![("Language", "lt"), ("lang", "en")].into_iter().collect();
    assert_eq!(map.language(), Some("lt"));
}

#[test]
fn test_metadatamap_merge_overwrites() {
    let mut a: MetadataMap = vec![("lang", "en"), ("domain", "messages")].into_iter().collect();
    let b: MetadataMap = vec![("lang", "ru")].into_iter().collect();
    a.merge(&b);
    assert_eq!(a.get("lang").map(String::as_str), Some("ru"));
    assert_eq!(a.get("domain").map(String::as_str), Some("messages"));
    assert_eq!(a.len(), 2);
}

#[test]
fn test_parse_metadata() {
    let map = parse_metadata(
        "Project-Id-Version: demo\nContent-Type: text/plain; charset=UTF-8\n\
         Plural-Forms: nplurals=3; plural=(n==1 ? 0 : 1);\n",
    )
    .unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.charset(), Some("UTF-8"));
    assert_eq!(map.plural_forms(), Some("nplurals=3; plural=(n==1 ? 0 : 1);"));

    assert!(matches!(
        parse_metadata("no colon on this line"),
        Err(MalformedMetadata)
    ));
}
