//! Query builder.
//!
//! Turns a validated request into a [`SearchSource`] (or a bundle of them
//! for best-match). Every query carries the common filter layer: the type
//! filter, the deprecation filter and, where requested, the authors filter.
//! Authority scope is not part of the query; it selects the index alias in
//! the dispatcher.

use concepts_core::concept_types::{LOCATIONS, ORGANISATIONS, PEOPLE, PUBLIC_COMPANY_URI, TOPICS};
use concepts_core::ResolvedTypes;

use crate::dsl::{
    BoolQuery, BoostMode, FieldValueFactor, FunctionScoreQuery, Modifier, Query, ScoreFunction,
    ScoreMode, SearchSource, SortField,
};

// Backend field names.
pub const PREF_LABEL: &str = "prefLabel";
pub const PREF_LABEL_EDGE_NGRAM: &str = "prefLabel.edge_ngram";
pub const PREF_LABEL_EXACT_MATCH: &str = "prefLabel.exact_match";
pub const PREF_LABEL_RAW: &str = "prefLabel.raw";
pub const ALIASES: &str = "aliases";
pub const ALIASES_EDGE_NGRAM: &str = "aliases.edge_ngram";
pub const ALIASES_EXACT_MATCH: &str = "aliases.exact_match";
pub const TYPE: &str = "type";
pub const DIRECT_TYPE: &str = "directType";
pub const IS_DEPRECATED: &str = "isDeprecated";
pub const IS_FT_AUTHOR: &str = "isFTAuthor";
pub const SCOPE_NOTE: &str = "scopeNote";
pub const ANNOTATIONS_COUNT: &str = "metrics.annotationsCount";
pub const PREV_WEEK_ANNOTATIONS_COUNT: &str = "metrics.prevWeekAnnotationsCount";

// Term query weights.
const PREF_LABEL_TERM_BOOST: f64 = 0.1;
const PREF_LABEL_EXACT_BOOST: f64 = 0.5;
const ALIASES_EXACT_BOOST: f64 = 0.475;
const TOPICS_BOOST: f64 = 1.5;
const LOCATIONS_BOOST: f64 = 0.25;
const PEOPLE_BOOST: f64 = 0.1;
const SCOPE_NOTE_BOOST: f64 = 0.1;
const PHRASE_TOPICS_WEIGHT: f64 = 1.5;
const AUTHORS_TERM_BOOST: f64 = 1.8;

// Text mode weights.
const TEXT_ALIASES_BOOST: f64 = 8.0;
const TEXT_PREF_LABEL_BOOST: f64 = 10.0;
const TEXT_PUBLIC_COMPANY_BOOST: f64 = 6.0;
const TEXT_ORGANISATIONS_BOOST: f64 = 4.0;
const TEXT_MIN_SCORE: f64 = 1.0;

/// Filters and boosts shared by every query shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Requested types; empty means no type restriction.
    pub types: ResolvedTypes,
    /// Keep deprecated concepts.
    pub include_deprecated: bool,
    /// Boost concepts flagged as FT authors.
    pub boost_authors: bool,
    /// Keep only concepts flagged as FT authors.
    pub filter_authors: bool,
}

impl QueryOptions {
    pub fn new(types: ResolvedTypes) -> Self {
        Self {
            types,
            ..Self::default()
        }
    }

    pub fn include_deprecated(mut self, include: bool) -> Self {
        self.include_deprecated = include;
        self
    }

    pub fn boost_authors(mut self, boost: bool) -> Self {
        self.boost_authors = boost;
        self
    }

    pub fn filter_authors(mut self, filter: bool) -> Self {
        self.filter_authors = filter;
        self
    }
}

/// Type filter: discriminator membership OR `directType == PublicCompany`.
/// `None` when no type was requested.
pub fn type_filter(types: &ResolvedTypes) -> Option<Query> {
    if types.is_empty() {
        return None;
    }

    let mut filter = BoolQuery::new().minimum_should_match(1);
    if !types.tokens.is_empty() {
        filter = filter.should(Query::terms(TYPE, types.tokens.iter().copied()));
    }
    if types.public_company {
        filter = filter.should(Query::term(DIRECT_TYPE, PUBLIC_COMPANY_URI));
    }
    Some(filter.into_query())
}

/// Excludes concepts flagged as deprecated.
pub fn deprecation_filter() -> Query {
    Query::term(IS_DEPRECATED, true)
}

fn authors_term() -> Query {
    Query::term(IS_FT_AUTHOR, "true")
}

/// Add the common filter layer to a boolean query.
fn with_common_layer(mut query: BoolQuery, options: &QueryOptions) -> BoolQuery {
    if let Some(filter) = type_filter(&options.types) {
        query = query.filter(filter);
    }
    if options.filter_authors {
        query = query.filter(authors_term());
    }
    if options.boost_authors {
        query = query.should(authors_term().boost(AUTHORS_TERM_BOOST));
    }
    if !options.include_deprecated {
        query = query.must_not(deprecation_filter());
    }
    query
}

/// Loose candidate match on the prefLabel or aliases edge-ngram fields.
fn edge_ngram_candidates(text: &str) -> BoolQuery {
    BoolQuery::new()
        .should(Query::match_text(PREF_LABEL_EDGE_NGRAM, text))
        .should(Query::match_text(ALIASES_EDGE_NGRAM, text))
        .minimum_should_match(1)
}

/// Popularity composed multiplicatively for documents that contain the
/// input tokens in order.
fn phrase_popularity(text: &str) -> Query {
    let phrase = BoolQuery::new()
        .should(Query::match_phrase(PREF_LABEL_EDGE_NGRAM, text))
        .should(Query::match_phrase(ALIASES_EDGE_NGRAM, text))
        .minimum_should_match(1)
        .into_query();

    FunctionScoreQuery::new(phrase)
        .function(ScoreFunction::field_value_factor(
            FieldValueFactor::new(ANNOTATIONS_COUNT)
                .modifier(Modifier::Ln1p)
                .missing(0.0),
        ))
        .function(ScoreFunction::field_value_factor(
            FieldValueFactor::new(PREV_WEEK_ANNOTATIONS_COUNT)
                .modifier(Modifier::Ln2p)
                .missing(0.0),
        ))
        .function(ScoreFunction::weight(PHRASE_TOPICS_WEIGHT).with_filter(Query::term(TYPE, TOPICS)))
        .score_mode(ScoreMode::Multiply)
        .boost_mode(BoostMode::Replace)
        .into_query()
}

fn standalone_popularity(field: &str) -> Query {
    FunctionScoreQuery::new(Query::MatchAll)
        .function(ScoreFunction::field_value_factor(
            FieldValueFactor::new(field)
                .modifier(Modifier::Ln1p)
                .missing(0.0),
        ))
        .into_query()
}

/// Ranked free-text query used by typeahead and term search.
pub fn term_query(text: &str, options: &QueryOptions, size: usize) -> SearchSource {
    let query = BoolQuery::new()
        .must(edge_ngram_candidates(text).into_query())
        .should(Query::match_text(PREF_LABEL, text).boost(PREF_LABEL_TERM_BOOST))
        .should(Query::match_text(PREF_LABEL_EXACT_MATCH, text).boost(PREF_LABEL_EXACT_BOOST))
        .should(Query::match_text(ALIASES_EXACT_MATCH, text).boost(ALIASES_EXACT_BOOST))
        .should(Query::term(TYPE, TOPICS).boost(TOPICS_BOOST))
        .should(Query::term(TYPE, LOCATIONS).boost(LOCATIONS_BOOST))
        .should(Query::term(TYPE, PEOPLE).boost(PEOPLE_BOOST))
        .should(Query::exists(SCOPE_NOTE).boost(SCOPE_NOTE_BOOST))
        .should(phrase_popularity(text))
        .should(standalone_popularity(ANNOTATIONS_COUNT))
        .should(standalone_popularity(PREV_WEEK_ANNOTATIONS_COUNT));

    SearchSource::new(with_common_layer(query, options).into_query(), size)
}

/// Organisation lookup: edge-ngram or prefix match, no popularity, noise
/// cut by a minimum score. Callers sort the result by label length.
pub fn text_query(text: &str, options: &QueryOptions, size: usize) -> SearchSource {
    let candidates = BoolQuery::new()
        .should(Query::match_text(PREF_LABEL_EDGE_NGRAM, text))
        .should(Query::match_text(ALIASES_EDGE_NGRAM, text))
        .should(Query::prefix(PREF_LABEL_EXACT_MATCH, text))
        .should(Query::prefix(ALIASES_EXACT_MATCH, text))
        .minimum_should_match(1);

    let query = BoolQuery::new()
        .must(candidates.into_query())
        .should(Query::match_text(ALIASES_EDGE_NGRAM, text).boost(TEXT_ALIASES_BOOST))
        .should(Query::match_text(PREF_LABEL_EDGE_NGRAM, text).boost(TEXT_PREF_LABEL_BOOST))
        .should(Query::term(DIRECT_TYPE, PUBLIC_COMPANY_URI).boost(TEXT_PUBLIC_COMPANY_BOOST))
        .should(Query::term(TYPE, ORGANISATIONS).boost(TEXT_ORGANISATIONS_BOOST));

    SearchSource::new(with_common_layer(query, options).into_query(), size).min_score(TEXT_MIN_SCORE)
}

/// Catalog listing of a single type, sorted by label.
pub fn by_type_query(types: &ResolvedTypes, include_deprecated: bool, size: usize) -> SearchSource {
    let options = QueryOptions::new(types.clone()).include_deprecated(include_deprecated);
    let query = with_common_layer(BoolQuery::new(), &options);

    SearchSource::new(query.into_query(), size)
        .sort(SortField::asc(PREF_LABEL_RAW).unmapped_type("keyword"))
}

/// Id lookup. `uuids` are backend document ids. Deprecated concepts are
/// never returned.
pub fn by_ids_query(uuids: &[String]) -> SearchSource {
    let query = BoolQuery::new()
        .filter(Query::ids(uuids.iter().cloned()))
        .must_not(deprecation_filter());

    SearchSource::new(query.into_query(), uuids.len())
}

/// One best-match query per candidate, top hit only.
pub fn best_match_query(candidate: &str, options: &QueryOptions) -> SearchSource {
    let query = BoolQuery::new().must(Query::match_all_words(ALIASES, candidate));
    SearchSource::new(with_common_layer(query, options).into_query(), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use concepts_core::concept_types::{GENRE_URI, ORGANISATION_URI, PERSON_URI};
    use concepts_core::resolve_types;
    use serde_json::{json, Value};

    fn contains(haystack: &Value, needle: &Value) -> bool {
        if haystack == needle {
            return true;
        }
        match haystack {
            Value::Array(items) => items.iter().any(|item| contains(item, needle)),
            Value::Object(map) => map.values().any(|value| contains(value, needle)),
            _ => false,
        }
    }

    fn person_options() -> QueryOptions {
        QueryOptions::new(resolve_types(&[PERSON_URI]).unwrap())
    }

    #[test]
    fn test_type_filter_with_tokens_and_public_company() {
        let types = resolve_types(&[ORGANISATION_URI, PUBLIC_COMPANY_URI]).unwrap();
        let filter = type_filter(&types).unwrap().to_json();
        assert_eq!(
            filter,
            json!({"bool": {
                "should": [
                    {"terms": {"type": ["organisations"]}},
                    {"term": {"directType": {"value": PUBLIC_COMPANY_URI}}}
                ],
                "minimum_should_match": 1
            }})
        );
    }

    #[test]
    fn test_no_type_filter_without_types() {
        assert!(type_filter(&ResolvedTypes::default()).is_none());
    }

    #[test]
    fn test_term_query_structure() {
        let source = term_query("Eric", &person_options(), 10).to_json();
        assert_eq!(source["size"], 10);

        let bool_body = &source["query"]["bool"];
        assert_eq!(bool_body["must"].as_array().unwrap().len(), 1);
        assert!(contains(
            &bool_body["must"],
            &json!({"match": {"prefLabel.edge_ngram": {"query": "Eric"}}})
        ));
        assert!(contains(
            &bool_body["should"],
            &json!({"match": {"prefLabel.exact_match": {"query": "Eric", "boost": 0.5}}})
        ));
        assert!(contains(
            &bool_body["should"],
            &json!({"match": {"aliases.exact_match": {"query": "Eric", "boost": 0.475}}})
        ));
        assert!(contains(
            &bool_body["should"],
            &json!({"term": {"type": {"value": "topics", "boost": 1.5}}})
        ));
        assert!(contains(&bool_body["should"], &json!("ln2p")));
        assert!(contains(&bool_body["should"], &json!("replace")));
        assert!(contains(
            &bool_body["filter"],
            &json!({"terms": {"type": ["people"]}})
        ));
        assert_eq!(
            bool_body["must_not"],
            json!([{"term": {"isDeprecated": {"value": true}}}])
        );
    }

    #[test]
    fn test_term_query_include_deprecated_drops_filter() {
        let options = person_options().include_deprecated(true);
        let source = term_query("Rick", &options, 10).to_json();
        assert!(source["query"]["bool"].get("must_not").is_none());
    }

    #[test]
    fn test_term_query_authors_boost_and_filter() {
        let source = term_query("Eric", &person_options().boost_authors(true), 10).to_json();
        assert!(contains(
            &source["query"]["bool"]["should"],
            &json!({"term": {"isFTAuthor": {"value": "true", "boost": AUTHORS_TERM_BOOST}}})
        ));

        let source = term_query("Eric", &person_options().filter_authors(true), 10).to_json();
        assert!(contains(
            &source["query"]["bool"]["filter"],
            &json!({"term": {"isFTAuthor": {"value": "true"}}})
        ));
    }

    #[test]
    fn test_term_query_without_types_has_no_type_filter() {
        let source = term_query("Eric", &QueryOptions::default(), 10).to_json();
        assert!(source["query"]["bool"].get("filter").is_none());
    }

    #[test]
    fn test_text_query_uses_prefix_and_min_score() {
        let options = QueryOptions::new(resolve_types(&[ORGANISATION_URI]).unwrap());
        let source = text_query("IBM", &options, 10).to_json();
        assert_eq!(source["min_score"], 1.0);
        assert!(contains(
            &source["query"],
            &json!({"prefix": {"prefLabel.exact_match": {"value": "IBM"}}})
        ));
        assert!(contains(
            &source["query"],
            &json!({"prefix": {"aliases.exact_match": {"value": "IBM"}}})
        ));
        let rendered = source.to_string();
        assert!(!rendered.contains("field_value_factor"));
        assert!(!rendered.contains(ANNOTATIONS_COUNT));
    }

    #[test]
    fn test_by_type_query() {
        let types = resolve_types(&[GENRE_URI]).unwrap();
        let source = by_type_query(&types, false, 50).to_json();
        assert_eq!(source["size"], 50);
        assert_eq!(
            source["sort"],
            json!([{"prefLabel.raw": {"order": "asc", "unmapped_type": "keyword"}}])
        );
        assert!(contains(&source["query"], &json!({"terms": {"type": ["genres"]}})));
        assert!(contains(
            &source["query"],
            &json!({"term": {"isDeprecated": {"value": true}}})
        ));
    }

    #[test]
    fn test_by_type_public_company() {
        let types = resolve_types(&[PUBLIC_COMPANY_URI]).unwrap();
        let source = by_type_query(&types, true, 50).to_json();
        assert!(contains(
            &source["query"],
            &json!({"term": {"directType": {"value": PUBLIC_COMPANY_URI}}})
        ));
        assert!(!source.to_string().contains("\"terms\""));
        assert!(source["query"]["bool"].get("must_not").is_none());
    }

    #[test]
    fn test_by_ids_query() {
        let ids = vec![
            "2d3e16e0-61cb-4322-8aff-3b01c59f4daa".to_string(),
            "c7e0c1bb-9b3a-4a1e-8f43-0f2e3c1d1a11".to_string(),
        ];
        let source = by_ids_query(&ids).to_json();
        assert_eq!(source["size"], 2);
        assert!(contains(
            &source["query"],
            &json!({"ids": {"values": ids}})
        ));
        assert!(contains(
            &source["query"],
            &json!({"term": {"isDeprecated": {"value": true}}})
        ));
    }

    #[test]
    fn test_best_match_query() {
        let source = best_match_query("Platt Eric", &person_options()).to_json();
        assert_eq!(source["size"], 1);
        assert_eq!(
            source["query"]["bool"]["must"],
            json!([{"match": {"aliases": {"query": "Platt Eric", "operator": "and"}}}])
        );
        assert!(contains(&source["query"], &json!({"terms": {"type": ["people"]}})));
    }
}
