//! Request validation.
//!
//! Query strings are kept as raw pairs so repeated single-valued parameters
//! can be detected. Rules run in a fixed order and the first failure wins:
//!
//! 1. single-valued parameters occur at most once
//! 2. enumerated values (`mode`, `boost`, `include_field`, flags) are known
//! 3. `term` XOR `bestMatchTerms` in the search body
//! 4. `ids` stands alone
//! 5. mode-specific combinations

use std::str::FromStr;

use concepts_backend::IndexScope;
use concepts_core::concept_types::{is_text_mode_type, AUTHORS_BOOST};
use concepts_core::{
    resolve_types, validate_for_authors_search, Error, ResolvedTypes, Result, SearchCriteria,
};
use concepts_search::SearchParams;

pub const PARAM_Q: &str = "q";
pub const PARAM_MODE: &str = "mode";
pub const PARAM_BOOST: &str = "boost";
pub const PARAM_TYPE: &str = "type";
pub const PARAM_IDS: &str = "ids";
pub const PARAM_INCLUDE_DEPRECATED: &str = "include_deprecated";
pub const PARAM_INCLUDE_SCORE: &str = "include_score";
pub const PARAM_INCLUDE_FIELD: &str = "include_field";
pub const PARAM_SEARCH_ALL_AUTHORITIES: &str = "searchAllAuthorities";

const CATALOG_SINGLE_VALUED: &[&str] = &[
    PARAM_Q,
    PARAM_MODE,
    PARAM_BOOST,
    PARAM_INCLUDE_DEPRECATED,
    PARAM_SEARCH_ALL_AUTHORITIES,
];

const SEARCH_SINGLE_VALUED: &[&str] = &[
    PARAM_INCLUDE_SCORE,
    PARAM_INCLUDE_DEPRECATED,
    PARAM_INCLUDE_FIELD,
    PARAM_SEARCH_ALL_AUTHORITIES,
];

/// Raw query-string pairs in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl QueryParams {
    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(key, _)| key == name)
    }

    pub fn all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// The value of a single-valued parameter.
    pub fn single(&self, name: &str) -> Result<Option<&str>> {
        let mut values = self
            .pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str());
        match (values.next(), values.next()) {
            (None, _) => Ok(None),
            (Some(value), None) => Ok(Some(value)),
            _ => Err(duplicate(name)),
        }
    }

    /// A boolean flag; absent is false.
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.single(name)? {
            Some(value) => parse_bool(name, value),
            None => Ok(false),
        }
    }

    fn check_single_valued(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.single(name)?;
        }
        Ok(())
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(key, _)| key.as_str())
    }
}

fn duplicate(name: &str) -> Error {
    Error::Validation(format!(
        "specified multiple {} query parameters in the URL",
        name
    ))
}

/// Boolean flag values.
pub fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(Error::Validation(format!(
            "invalid value '{}' for {} query parameter",
            value, name
        ))),
    }
}

/// Query shape selected by `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Search,
    Text,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "search" => Ok(Mode::Search),
            "text" => Ok(Mode::Text),
            _ => Err(Error::Validation(format!(
                "'{}' is not a valid value for parameter 'mode'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boost {
    Authors,
}

impl FromStr for Boost {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            AUTHORS_BOOST => Ok(Boost::Authors),
            _ => Err(Error::Validation(format!(
                "'{}' is not a valid value for parameter 'boost'",
                s
            ))),
        }
    }
}

// =============================================================================
// CATALOG ENDPOINT
// =============================================================================

/// A validated `GET /concepts` request.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRequest {
    ByIds(Vec<String>),
    ByType {
        types: ResolvedTypes,
        include_deprecated: bool,
        scope: IndexScope,
    },
    Search {
        query: String,
        params: SearchParams,
    },
    Text {
        query: String,
        params: SearchParams,
    },
}

pub fn parse_catalog_request(params: &QueryParams) -> Result<CatalogRequest> {
    params.check_single_valued(CATALOG_SINGLE_VALUED)?;

    let mode = params.single(PARAM_MODE)?.map(Mode::from_str).transpose()?;
    let boost = params.single(PARAM_BOOST)?.map(Boost::from_str).transpose()?;

    if params.contains(PARAM_IDS) {
        return parse_ids(params);
    }

    let include_deprecated = params.flag(PARAM_INCLUDE_DEPRECATED)?;
    let scope = IndexScope::from_search_all_authorities(params.flag(PARAM_SEARCH_ALL_AUTHORITIES)?);
    let type_uris = params.all(PARAM_TYPE);
    let query = params.single(PARAM_Q)?;

    match mode {
        Some(Mode::Search) => {
            let query = required_query(query, "search")?;
            if type_uris.is_empty() {
                return Err(Error::Validation(
                    "at least one 'type' parameter is required in search mode".to_string(),
                ));
            }
            let types = resolve_types(&type_uris)?;
            if boost.is_some() {
                validate_for_authors_search(&type_uris, AUTHORS_BOOST)?;
            }
            Ok(CatalogRequest::Search {
                query,
                params: SearchParams {
                    include_deprecated,
                    boost_authors: boost == Some(Boost::Authors),
                    scope,
                    ..SearchParams::new(types)
                },
            })
        }
        Some(Mode::Text) => {
            let query = required_query(query, "text")?;
            if boost.is_some() {
                return Err(Error::Validation(
                    "'boost' is not supported in text mode".to_string(),
                ));
            }
            if type_uris.is_empty() {
                return Err(Error::Validation(
                    "at least one 'type' parameter is required in text mode".to_string(),
                ));
            }
            if let Some(uri) = type_uris.iter().find(|uri| !is_text_mode_type(uri)) {
                return Err(Error::InvalidInput(format!(
                    "type {} is not supported in text mode, use Organisation or PublicCompany",
                    uri
                )));
            }
            let types = resolve_types(&type_uris)?;
            Ok(CatalogRequest::Text {
                query,
                params: SearchParams {
                    include_deprecated,
                    scope,
                    ..SearchParams::new(types)
                },
            })
        }
        None => {
            if boost.is_some() {
                return Err(Error::Validation(
                    "'boost' requires the 'mode' parameter".to_string(),
                ));
            }
            if query.is_some() {
                return Err(Error::Validation(
                    "'q' requires the 'mode' parameter".to_string(),
                ));
            }
            match type_uris.as_slice() {
                [] => Err(Error::Validation(
                    "either 'type' or 'ids' query parameters are required".to_string(),
                )),
                [_] => Ok(CatalogRequest::ByType {
                    types: resolve_types(&type_uris)?,
                    include_deprecated,
                    scope,
                }),
                _ => Err(Error::Validation(
                    "only a single 'type' is supported without 'mode'".to_string(),
                )),
            }
        }
    }
}

fn parse_ids(params: &QueryParams) -> Result<CatalogRequest> {
    if params.names().any(|name| name != PARAM_IDS) {
        return Err(Error::Validation(
            "'ids' cannot be combined with any other query parameter".to_string(),
        ));
    }
    let ids = params.all(PARAM_IDS);
    if ids.iter().any(|id| id.trim().is_empty()) {
        return Err(Error::Validation(
            "'ids' query parameter must not be empty".to_string(),
        ));
    }
    Ok(CatalogRequest::ByIds(
        ids.into_iter().map(str::to_string).collect(),
    ))
}

fn required_query(query: Option<&str>, mode: &str) -> Result<String> {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => Ok(q.to_string()),
        _ => Err(Error::Validation(format!(
            "'q' query parameter is required in {} mode",
            mode
        ))),
    }
}

// =============================================================================
// SEARCH ENDPOINT
// =============================================================================

/// Query-string flags of `POST /concept/search`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFlags {
    pub include_score: bool,
    pub include_deprecated: bool,
    pub include_authors: bool,
    pub scope: IndexScope,
}

pub fn parse_search_flags(params: &QueryParams) -> Result<SearchFlags> {
    params.check_single_valued(SEARCH_SINGLE_VALUED)?;

    let include_authors = match params.single(PARAM_INCLUDE_FIELD)? {
        None => false,
        Some(AUTHORS_BOOST) => true,
        Some(other) => {
            return Err(Error::Validation(format!(
                "'{}' is not a valid value for parameter 'include_field'",
                other
            )))
        }
    };

    Ok(SearchFlags {
        include_score: params.flag(PARAM_INCLUDE_SCORE)?,
        include_deprecated: params.flag(PARAM_INCLUDE_DEPRECATED)?,
        include_authors,
        scope: IndexScope::from_search_all_authorities(
            params.flag(PARAM_SEARCH_ALL_AUTHORITIES)?,
        ),
    })
}

/// A validated `POST /concept/search` body.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchBody {
    Term { term: String, params: SearchParams },
    BestMatch { terms: Vec<String>, params: SearchParams },
}

enum SearchInput {
    Term(String),
    BestMatch(Vec<String>),
}

pub fn parse_search_body(body: &[u8], flags: &SearchFlags) -> Result<SearchBody> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::Validation("request body is empty".to_string()));
    }
    let criteria: SearchCriteria = serde_json::from_slice(body)
        .map_err(|e| Error::Validation(format!("invalid request body: {}", e)))?;

    let query = match (criteria.term, criteria.best_match_terms) {
        (Some(_), Some(_)) => {
            return Err(Error::Validation(
                "only one of 'term' or 'bestMatchTerms' may be specified".to_string(),
            ))
        }
        (None, None) => {
            return Err(Error::Validation(
                "one of 'term' or 'bestMatchTerms' is required".to_string(),
            ))
        }
        (Some(term), None) => {
            if term.trim().is_empty() {
                return Err(Error::Validation("'term' must not be empty".to_string()));
            }
            SearchInput::Term(term)
        }
        (None, Some(terms)) => {
            if terms.is_empty() {
                return Err(Error::Validation(
                    "'bestMatchTerms' must not be empty".to_string(),
                ));
            }
            SearchInput::BestMatch(terms)
        }
    };

    let type_uris = criteria.concept_types.unwrap_or_default();
    let types = resolve_types(&type_uris)?;

    let boost_authors = match criteria.boost.as_deref() {
        None => false,
        Some(boost) => {
            validate_for_authors_search(&type_uris, boost)?;
            true
        }
    };
    let filter_authors = match criteria.filter.as_deref() {
        None => false,
        Some(AUTHORS_BOOST) => true,
        Some(other) => {
            return Err(Error::InvalidInput(format!("invalid filter type '{}'", other)))
        }
    };

    let params = SearchParams {
        include_deprecated: flags.include_deprecated,
        include_score: flags.include_score,
        include_authors: flags.include_authors,
        boost_authors,
        filter_authors,
        scope: flags.scope,
        ..SearchParams::new(types)
    };

    Ok(match query {
        SearchInput::Term(term) => SearchBody::Term { term, params },
        SearchInput::BestMatch(terms) => SearchBody::BestMatch { terms, params },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use concepts_core::concept_types::{GENRE_URI, ORGANISATION_URI, PERSON_URI, PUBLIC_COMPANY_URI};

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into()
    }

    fn message(err: Error) -> String {
        match err {
            Error::Validation(msg) | Error::InvalidInput(msg) => msg,
            other => panic!("expected a client error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bool_accepted_spellings() {
        for value in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(parse_bool("x", value).unwrap());
        }
        for value in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!parse_bool("x", value).unwrap());
        }
        assert!(parse_bool("include_score", "yes").is_err());
    }

    #[test]
    fn test_duplicate_single_valued_parameter() {
        let err = parse_catalog_request(&query(&[
            ("type", GENRE_URI),
            ("mode", "search"),
            ("q", "a"),
            ("q", "b"),
        ]))
        .unwrap_err();
        assert_eq!(message(err), "specified multiple q query parameters in the URL");
    }

    #[test]
    fn test_by_type_listing() {
        let request = parse_catalog_request(&query(&[("type", GENRE_URI)])).unwrap();
        match request {
            CatalogRequest::ByType {
                types,
                include_deprecated,
                scope,
            } => {
                assert_eq!(types.tokens, vec!["genres"]);
                assert!(!include_deprecated);
                assert_eq!(scope, IndexScope::Default);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_multiple_types_without_mode_rejected() {
        let err = parse_catalog_request(&query(&[("type", GENRE_URI), ("type", PERSON_URI)]))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_q_and_boost_require_mode() {
        assert!(parse_catalog_request(&query(&[("type", GENRE_URI), ("q", "x")])).is_err());
        assert!(
            parse_catalog_request(&query(&[("type", PERSON_URI), ("boost", "authors")])).is_err()
        );
    }

    #[test]
    fn test_unknown_mode_and_boost_rejected() {
        let err = parse_catalog_request(&query(&[("type", GENRE_URI), ("mode", "fuzzy")]))
            .unwrap_err();
        assert!(message(err).contains("mode"));
        let err = parse_catalog_request(&query(&[
            ("type", PERSON_URI),
            ("mode", "search"),
            ("q", "x"),
            ("boost", "popular"),
        ]))
        .unwrap_err();
        assert!(message(err).contains("boost"));
    }

    #[test]
    fn test_search_mode_requires_q_and_type() {
        assert!(parse_catalog_request(&query(&[("type", PERSON_URI), ("mode", "search")])).is_err());
        assert!(parse_catalog_request(&query(&[("mode", "search"), ("q", "Eric")])).is_err());
    }

    #[test]
    fn test_search_mode_with_authors_boost() {
        let request = parse_catalog_request(&query(&[
            ("type", PERSON_URI),
            ("mode", "search"),
            ("q", "Eric"),
            ("boost", "authors"),
            ("searchAllAuthorities", "true"),
        ]))
        .unwrap();
        match request {
            CatalogRequest::Search { query, params } => {
                assert_eq!(query, "Eric");
                assert!(params.boost_authors);
                assert_eq!(params.scope, IndexScope::Extended);
                assert!(!params.include_score);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_authors_boost_requires_single_person_type() {
        let err = parse_catalog_request(&query(&[
            ("type", PERSON_URI),
            ("type", GENRE_URI),
            ("mode", "search"),
            ("q", "Eric"),
            ("boost", "authors"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_text_mode_type_rules() {
        let ok = parse_catalog_request(&query(&[
            ("type", ORGANISATION_URI),
            ("type", PUBLIC_COMPANY_URI),
            ("mode", "text"),
            ("q", "Barclays"),
        ]))
        .unwrap();
        match ok {
            CatalogRequest::Text { params, .. } => {
                assert!(params.types.public_company);
                assert_eq!(params.types.tokens, vec!["organisations"]);
            }
            other => panic!("unexpected {:?}", other),
        }

        let err = parse_catalog_request(&query(&[
            ("type", PERSON_URI),
            ("mode", "text"),
            ("q", "Barclays"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_ids_must_stand_alone() {
        let err = parse_catalog_request(&query(&[
            ("ids", "2d3e16e0-61cb-4322-8aff-3b01c59f4daa"),
            ("type", GENRE_URI),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_empty_ids_rejected() {
        let err = parse_catalog_request(&query(&[("ids", ""), ("ids", "")])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_ids_lookup() {
        let request = parse_catalog_request(&query(&[
            ("ids", "2d3e16e0-61cb-4322-8aff-3b01c59f4daa"),
            ("ids", "http://api.ft.com/things/3c6f7d48-9e28-4fbc-9b83-93f7c4d3e5a2"),
        ]))
        .unwrap();
        assert!(matches!(request, CatalogRequest::ByIds(ids) if ids.len() == 2));
    }

    #[test]
    fn test_unknown_type_is_input_error() {
        let err = parse_catalog_request(&query(&[("type", "http://www.ft.com/ontology/Nope")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_neither_type_nor_ids_rejected() {
        assert!(parse_catalog_request(&QueryParams::default()).is_err());
    }

    #[test]
    fn test_search_flags() {
        let flags = parse_search_flags(&query(&[
            ("include_score", "true"),
            ("include_field", "authors"),
        ]))
        .unwrap();
        assert!(flags.include_score);
        assert!(flags.include_authors);
        assert!(!flags.include_deprecated);

        assert!(parse_search_flags(&query(&[("include_field", "aliases")])).is_err());
        assert!(parse_search_flags(&query(&[
            ("include_score", "true"),
            ("include_score", "false")
        ]))
        .is_err());
    }

    #[test]
    fn test_body_term_xor_best_match() {
        let flags = SearchFlags::default();
        assert!(parse_search_body(b"", &flags).is_err());
        assert!(parse_search_body(b"{not json", &flags).is_err());
        assert!(parse_search_body(b"{}", &flags).is_err());
        assert!(parse_search_body(br#"{"term":"a","bestMatchTerms":["b"]}"#, &flags).is_err());
        assert!(parse_search_body(br#"{"bestMatchTerms":[]}"#, &flags).is_err());

        let body = parse_search_body(br#"{"term":"Rick And Morty"}"#, &flags).unwrap();
        assert!(matches!(body, SearchBody::Term { ref term, .. } if term == "Rick And Morty"));
    }

    #[test]
    fn test_body_requires_term_before_other_checks() {
        let flags = SearchFlags::default();
        for body in [
            &br#"{"conceptTypes":["http://bogus/Type"]}"#[..],
            &br#"{"boost":"authors"}"#[..],
            &br#"{"filter":"editors"}"#[..],
        ] {
            match parse_search_body(body, &flags).unwrap_err() {
                Error::Validation(msg) => {
                    assert_eq!(msg, "one of 'term' or 'bestMatchTerms' is required")
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_body_boost_and_filter() {
        let flags = SearchFlags::default();
        let body = parse_search_body(
            format!(
                r#"{{"term":"Eric","conceptTypes":["{}"],"boost":"authors","filter":"authors"}}"#,
                PERSON_URI
            )
            .as_bytes(),
            &flags,
        )
        .unwrap();
        match body {
            SearchBody::Term { params, .. } => {
                assert!(params.boost_authors);
                assert!(params.filter_authors);
            }
            other => panic!("unexpected {:?}", other),
        }

        let err = parse_search_body(br#"{"term":"Eric","boost":"authors"}"#, &flags).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let err = parse_search_body(br#"{"term":"Eric","filter":"editors"}"#, &flags).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
