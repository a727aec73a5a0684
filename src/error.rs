use thiserror::Error as ThisError;

/// Represents an error encountered while merging or configuring locale data.
///
/// Lookups never fail; these only surface from merge and construction.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A Plural-Forms header failed structural validation or parsing
    #[error("invalid plural expression [{0}]")]
    PluralRuleSyntax(String),
    /// The declared default domain is absent from the supplied locale data
    #[error("locale data does not contain the domain '{0}'")]
    MissingDomain(String),
    /// The locale data does not follow the po2json layout
    #[error("malformed locale data: {0}")]
    MalformedPayload(String),
    /// Incorrect syntax encountered while parsing the meta information
    #[error("metadata syntax error")]
    MalformedMetadata,
    /// The locale data is not valid JSON
    #[error("invalid JSON in locale data: {0}")]
    Json(#[from] serde_json::Error),
}

#[test]
fn error_messages() {
    assert_eq!(
        Error::PluralRuleSyntax("nplurals=2; plural=import os".into()).to_string(),
        "invalid plural expression [nplurals=2; plural=import os]"
    );
    assert_eq!(
        Error::MissingDomain("app".into()).to_string(),
        "locale data does not contain the domain 'app'"
    );
    assert_eq!(Error::MalformedMetadata.to_string(), "metadata syntax error");
}
