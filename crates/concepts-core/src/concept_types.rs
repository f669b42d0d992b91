//! Concept-type registry.
//!
//! Maps public type URIs to the backend's `type` discriminator tokens and
//! back. `PublicCompany` has no discriminator of its own: it is stored under
//! `organisations` and recognised through the `directType` field, so it is
//! resolved to a flag rather than a token.

use crate::{Error, Result};

pub const THING_URI: &str = "http://www.ft.com/ontology/core/Thing";
pub const CONCEPT_URI: &str = "http://www.ft.com/ontology/concept/Concept";
pub const CLASSIFICATION_URI: &str = "http://www.ft.com/ontology/classification/Classification";
pub const GENRE_URI: &str = "http://www.ft.com/ontology/Genre";
pub const BRAND_URI: &str = "http://www.ft.com/ontology/product/Brand";
pub const PERSON_URI: &str = "http://www.ft.com/ontology/person/Person";
pub const ORGANISATION_URI: &str = "http://www.ft.com/ontology/organisation/Organisation";
pub const COMPANY_URI: &str = "http://www.ft.com/ontology/company/Company";
pub const PUBLIC_COMPANY_URI: &str = "http://www.ft.com/ontology/company/PublicCompany";
pub const LOCATION_URI: &str = "http://www.ft.com/ontology/Location";
pub const TOPIC_URI: &str = "http://www.ft.com/ontology/Topic";
pub const ALPHAVILLE_SERIES_URI: &str = "http://www.ft.com/ontology/AlphavilleSeries";
pub const SECTION_URI: &str = "http://www.ft.com/ontology/Section";
pub const SUBJECT_URI: &str = "http://www.ft.com/ontology/Subject";
pub const SPECIAL_REPORT_URI: &str = "http://www.ft.com/ontology/SpecialReport";

/// Discriminator tokens referenced directly by the query builder.
pub const PEOPLE: &str = "people";
pub const ORGANISATIONS: &str = "organisations";
pub const LOCATIONS: &str = "locations";
pub const TOPICS: &str = "topics";

/// The only supported value of the `boost` parameter.
pub const AUTHORS_BOOST: &str = "authors";

/// External URI ↔ internal discriminator token.
const TYPE_TOKENS: &[(&str, &str)] = &[
    (GENRE_URI, "genres"),
    (BRAND_URI, "brands"),
    (PERSON_URI, PEOPLE),
    (ORGANISATION_URI, ORGANISATIONS),
    (LOCATION_URI, LOCATIONS),
    (TOPIC_URI, TOPICS),
    (ALPHAVILLE_SERIES_URI, "alphaville-series"),
    (SECTION_URI, "sections"),
    (SUBJECT_URI, "subjects"),
    (SPECIAL_REPORT_URI, "special-reports"),
];

/// Child → parent edges of the type hierarchy.
const TYPE_PARENTS: &[(&str, &str)] = &[
    (CONCEPT_URI, THING_URI),
    (CLASSIFICATION_URI, CONCEPT_URI),
    (GENRE_URI, CLASSIFICATION_URI),
    (BRAND_URI, CLASSIFICATION_URI),
    (SECTION_URI, CLASSIFICATION_URI),
    (SUBJECT_URI, CLASSIFICATION_URI),
    (SPECIAL_REPORT_URI, CLASSIFICATION_URI),
    (ALPHAVILLE_SERIES_URI, CLASSIFICATION_URI),
    (PERSON_URI, CONCEPT_URI),
    (ORGANISATION_URI, CONCEPT_URI),
    (COMPANY_URI, ORGANISATION_URI),
    (PUBLIC_COMPANY_URI, COMPANY_URI),
    (LOCATION_URI, CONCEPT_URI),
    (TOPIC_URI, CONCEPT_URI),
];

/// Types accepted by the organisation-specialised text mode.
const TEXT_MODE_TYPES: &[&str] = &[ORGANISATION_URI, PUBLIC_COMPANY_URI];

/// Map an external type URI to its discriminator token.
pub fn to_internal(uri: &str) -> Option<&'static str> {
    TYPE_TOKENS
        .iter()
        .find(|(external, _)| *external == uri)
        .map(|(_, token)| *token)
}

/// Map a discriminator token back to its external type URI.
pub fn to_external(token: &str) -> Option<&'static str> {
    TYPE_TOKENS
        .iter()
        .find(|(_, internal)| *internal == token)
        .map(|(external, _)| *external)
}

/// Whether the URI names a type this service can search for.
pub fn is_supported(uri: &str) -> bool {
    uri == PUBLIC_COMPANY_URI || to_internal(uri).is_some()
}

/// Whether the URI is accepted by text mode.
pub fn is_text_mode_type(uri: &str) -> bool {
    TEXT_MODE_TYPES.contains(&uri)
}

/// Distance from the hierarchy root. Unknown types sit at depth 0.
pub fn depth(uri: &str) -> usize {
    let mut depth = 0;
    let mut current = uri;
    while let Some((_, parent)) = TYPE_PARENTS.iter().find(|(child, _)| *child == current) {
        depth += 1;
        current = parent;
    }
    depth
}

/// The most specific type of an ordered type list; ties go to the last entry.
pub fn most_specific(types: &[String]) -> Option<&str> {
    types
        .iter()
        .max_by_key(|uri| depth(uri))
        .map(String::as_str)
}

/// Types resolved for the backend's `type` discriminator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTypes {
    /// Discriminator tokens, deduplicated, in request order.
    pub tokens: Vec<&'static str>,
    /// `PublicCompany` was requested; match on `directType`.
    pub public_company: bool,
}

impl ResolvedTypes {
    /// No type restriction was requested.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && !self.public_company
    }
}

/// Resolve external URIs; unknown URIs are an input error.
pub fn resolve_types<S: AsRef<str>>(uris: &[S]) -> Result<ResolvedTypes> {
    let mut resolved = ResolvedTypes::default();
    for uri in uris {
        let uri = uri.as_ref();
        if uri == PUBLIC_COMPANY_URI {
            resolved.public_company = true;
            continue;
        }
        let token = to_internal(uri)
            .ok_or_else(|| Error::InvalidInput(format!("invalid concept type {}", uri)))?;
        if !resolved.tokens.contains(&token) {
            resolved.tokens.push(token);
        }
    }
    Ok(resolved)
}

/// Authors boosting requires exactly one type, `Person`, and `boost=authors`.
pub fn validate_for_authors_search<S: AsRef<str>>(types: &[S], boost: &str) -> Result<()> {
    if boost != AUTHORS_BOOST {
        return Err(Error::InvalidInput(format!("invalid boost type '{}'", boost)));
    }
    match types {
        [only] if only.as_ref() == PERSON_URI => Ok(()),
        _ => Err(Error::InvalidInput(
            "authors boost only supported for the person type".to_string(),
        )),
    }
}
