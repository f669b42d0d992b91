//! Typed query tree for the search backend.
//!
//! The builder composes [`Query`] values; [`Query::to_json`] renders them
//! into the backend's JSON query language. Only the clauses the service
//! actually uses are modelled.

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Word combination for `match` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    And,
    Or,
}

/// Modifier applied to a field value before it becomes a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    None,
    Log1p,
    Ln1p,
    Ln2p,
    Sqrt,
}

/// How function scores combine with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    Multiply,
    Sum,
    Avg,
    First,
    Max,
    Min,
}

/// How the combined function score combines with the query score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostMode {
    Multiply,
    Replace,
    Sum,
    Avg,
    Max,
    Min,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll,
    Bool(BoolQuery),
    Match {
        field: String,
        query: String,
        operator: Option<Operator>,
        boost: Option<f64>,
    },
    MatchPhrase {
        field: String,
        query: String,
        boost: Option<f64>,
    },
    Term {
        field: String,
        value: Value,
        boost: Option<f64>,
    },
    Terms {
        field: String,
        values: Vec<String>,
    },
    Prefix {
        field: String,
        value: String,
        boost: Option<f64>,
    },
    Exists {
        field: String,
        boost: Option<f64>,
    },
    Ids {
        values: Vec<String>,
    },
    FunctionScore(Box<FunctionScoreQuery>),
}

impl Query {
    pub fn match_text(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Match {
            field: field.into(),
            query: query.into(),
            operator: None,
            boost: None,
        }
    }

    pub fn match_all_words(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Match {
            field: field.into(),
            query: query.into(),
            operator: Some(Operator::And),
            boost: None,
        }
    }

    pub fn match_phrase(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self::MatchPhrase {
            field: field.into(),
            query: query.into(),
            boost: None,
        }
    }

    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn terms<S: Into<String>>(field: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefix(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Prefix {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists {
            field: field.into(),
            boost: None,
        }
    }

    pub fn ids<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::Ids {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the boost on clauses that carry one. Other clauses are returned
    /// unchanged.
    pub fn boost(mut self, value: f64) -> Self {
        match &mut self {
            Self::Match { boost, .. }
            | Self::MatchPhrase { boost, .. }
            | Self::Term { boost, .. }
            | Self::Prefix { boost, .. }
            | Self::Exists { boost, .. } => *boost = Some(value),
            Self::Bool(bool_query) => bool_query.boost = Some(value),
            Self::FunctionScore(function_score) => function_score.boost = Some(value),
            Self::MatchAll | Self::Terms { .. } | Self::Ids { .. } => {}
        }
        self
    }

    /// Render to the backend's JSON query language.
    pub fn to_json(&self) -> Value {
        match self {
            Self::MatchAll => json!({ "match_all": {} }),
            Self::Bool(bool_query) => bool_query.to_json(),
            Self::Match {
                field,
                query,
                operator,
                boost,
            } => {
                let mut params = Map::new();
                params.insert("query".to_string(), json!(query));
                if let Some(operator) = operator {
                    params.insert("operator".to_string(), json!(operator));
                }
                insert_boost(&mut params, *boost);
                json!({ "match": { field: params } })
            }
            Self::MatchPhrase { field, query, boost } => {
                let mut params = Map::new();
                params.insert("query".to_string(), json!(query));
                insert_boost(&mut params, *boost);
                json!({ "match_phrase": { field: params } })
            }
            Self::Term { field, value, boost } => {
                let mut params = Map::new();
                params.insert("value".to_string(), value.clone());
                insert_boost(&mut params, *boost);
                json!({ "term": { field: params } })
            }
            Self::Terms { field, values } => json!({ "terms": { field: values } }),
            Self::Prefix { field, value, boost } => {
                let mut params = Map::new();
                params.insert("value".to_string(), json!(value));
                insert_boost(&mut params, *boost);
                json!({ "prefix": { field: params } })
            }
            Self::Exists { field, boost } => {
                let mut params = Map::new();
                params.insert("field".to_string(), json!(field));
                insert_boost(&mut params, *boost);
                json!({ "exists": params })
            }
            Self::Ids { values } => json!({ "ids": { "values": values } }),
            Self::FunctionScore(function_score) => function_score.to_json(),
        }
    }
}

fn insert_boost(params: &mut Map<String, Value>, boost: Option<f64>) {
    if let Some(boost) = boost {
        params.insert("boost".to_string(), json!(boost));
    }
}

/// Boolean composition of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub should: Vec<Query>,
    pub filter: Vec<Query>,
    pub must_not: Vec<Query>,
    pub minimum_should_match: Option<u32>,
    pub boost: Option<f64>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    pub fn filter(mut self, query: Query) -> Self {
        self.filter.push(query);
        self
    }

    pub fn must_not(mut self, query: Query) -> Self {
        self.must_not.push(query);
        self
    }

    pub fn minimum_should_match(mut self, count: u32) -> Self {
        self.minimum_should_match = Some(count);
        self
    }

    pub fn into_query(self) -> Query {
        Query::Bool(self)
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (name, clauses) in [
            ("must", &self.must),
            ("should", &self.should),
            ("filter", &self.filter),
            ("must_not", &self.must_not),
        ] {
            if !clauses.is_empty() {
                body.insert(
                    name.to_string(),
                    Value::Array(clauses.iter().map(Query::to_json).collect()),
                );
            }
        }
        if let Some(count) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(count));
        }
        insert_boost(&mut body, self.boost);
        json!({ "bool": body })
    }
}

/// Field-value-factor scoring input.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValueFactor {
    pub field: String,
    pub modifier: Option<Modifier>,
    pub missing: Option<f64>,
    pub factor: Option<f64>,
}

impl FieldValueFactor {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            modifier: None,
            missing: None,
            factor: None,
        }
    }

    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    pub fn missing(mut self, missing: f64) -> Self {
        self.missing = Some(missing);
        self
    }

    pub fn factor(mut self, factor: f64) -> Self {
        self.factor = Some(factor);
        self
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("field".to_string(), json!(self.field));
        if let Some(modifier) = self.modifier {
            body.insert("modifier".to_string(), json!(modifier));
        }
        if let Some(missing) = self.missing {
            body.insert("missing".to_string(), json!(missing));
        }
        if let Some(factor) = self.factor {
            body.insert("factor".to_string(), json!(factor));
        }
        Value::Object(body)
    }
}

/// One scoring function of a function-score query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreFunction {
    pub filter: Option<Query>,
    pub weight: Option<f64>,
    pub field_value_factor: Option<FieldValueFactor>,
}

impl ScoreFunction {
    pub fn field_value_factor(factor: FieldValueFactor) -> Self {
        Self {
            field_value_factor: Some(factor),
            ..Self::default()
        }
    }

    pub fn weight(weight: f64) -> Self {
        Self {
            weight: Some(weight),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: Query) -> Self {
        self.filter = Some(filter);
        self
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        if let Some(filter) = &self.filter {
            body.insert("filter".to_string(), filter.to_json());
        }
        if let Some(weight) = self.weight {
            body.insert("weight".to_string(), json!(weight));
        }
        if let Some(factor) = &self.field_value_factor {
            body.insert("field_value_factor".to_string(), factor.to_json());
        }
        Value::Object(body)
    }
}

/// Query whose score is rewritten by scoring functions.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionScoreQuery {
    pub query: Query,
    pub functions: Vec<ScoreFunction>,
    pub score_mode: Option<ScoreMode>,
    pub boost_mode: Option<BoostMode>,
    pub boost: Option<f64>,
}

impl FunctionScoreQuery {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            functions: Vec::new(),
            score_mode: None,
            boost_mode: None,
            boost: None,
        }
    }

    pub fn function(mut self, function: ScoreFunction) -> Self {
        self.functions.push(function);
        self
    }

    pub fn score_mode(mut self, mode: ScoreMode) -> Self {
        self.score_mode = Some(mode);
        self
    }

    pub fn boost_mode(mut self, mode: BoostMode) -> Self {
        self.boost_mode = Some(mode);
        self
    }

    pub fn into_query(self) -> Query {
        Query::FunctionScore(Box::new(self))
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.to_json());
        if !self.functions.is_empty() {
            body.insert(
                "functions".to_string(),
                Value::Array(self.functions.iter().map(ScoreFunction::to_json).collect()),
            );
        }
        if let Some(mode) = self.score_mode {
            body.insert("score_mode".to_string(), json!(mode));
        }
        if let Some(mode) = self.boost_mode {
            body.insert("boost_mode".to_string(), json!(mode));
        }
        insert_boost(&mut body, self.boost);
        json!({ "function_score": body })
    }
}

/// Sort on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
    /// Type to assume on indices where the field is not mapped.
    pub unmapped_type: Option<String>,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
            unmapped_type: None,
        }
    }

    pub fn unmapped_type(mut self, unmapped_type: impl Into<String>) -> Self {
        self.unmapped_type = Some(unmapped_type.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut params = Map::new();
        params.insert("order".to_string(), json!(self.order));
        if let Some(unmapped_type) = &self.unmapped_type {
            params.insert("unmapped_type".to_string(), json!(unmapped_type));
        }
        json!({ self.field.clone(): params })
    }
}

/// A complete search request body.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSource {
    pub query: Query,
    pub size: usize,
    pub sort: Vec<SortField>,
    pub min_score: Option<f64>,
}

impl SearchSource {
    pub fn new(query: Query, size: usize) -> Self {
        Self {
            query,
            size,
            sort: Vec::new(),
            min_score: None,
        }
    }

    pub fn sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.to_json());
        body.insert("size".to_string(), json!(self.size));
        if !self.sort.is_empty() {
            body.insert(
                "sort".to_string(),
                Value::Array(self.sort.iter().map(SortField::to_json).collect()),
            );
        }
        if let Some(min_score) = self.min_score {
            body.insert("min_score".to_string(), json!(min_score));
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_with_operator_and_boost() {
        let query = Query::match_all_words("aliases", "Eric Platt").boost(2.0);
        assert_eq!(
            query.to_json(),
            json!({"match": {"aliases": {"query": "Eric Platt", "operator": "and", "boost": 2.0}}})
        );
    }

    #[test]
    fn test_term_and_terms() {
        assert_eq!(
            Query::term("isDeprecated", true).to_json(),
            json!({"term": {"isDeprecated": {"value": true}}})
        );
        assert_eq!(
            Query::terms("type", ["people", "topics"]).to_json(),
            json!({"terms": {"type": ["people", "topics"]}})
        );
    }

    #[test]
    fn test_boost_is_ignored_on_terms() {
        let query = Query::terms("type", ["people"]).boost(3.0);
        assert_eq!(query, Query::terms("type", ["people"]));
    }

    #[test]
    fn test_exists_and_prefix() {
        assert_eq!(
            Query::exists("scopeNote").boost(0.1).to_json(),
            json!({"exists": {"field": "scopeNote", "boost": 0.1}})
        );
        assert_eq!(
            Query::prefix("prefLabel.exact_match", "ibm").to_json(),
            json!({"prefix": {"prefLabel.exact_match": {"value": "ibm"}}})
        );
    }

    #[test]
    fn test_bool_omits_empty_clauses() {
        let query = BoolQuery::new()
            .should(Query::match_text("a", "x"))
            .should(Query::match_text("b", "x"))
            .minimum_should_match(1)
            .into_query();
        let json = query.to_json();
        let body = json["bool"].as_object().unwrap();
        assert!(!body.contains_key("must"));
        assert!(!body.contains_key("filter"));
        assert_eq!(body["should"].as_array().unwrap().len(), 2);
        assert_eq!(body["minimum_should_match"], 1);
    }

    #[test]
    fn test_function_score() {
        let query = FunctionScoreQuery::new(Query::MatchAll)
            .function(ScoreFunction::field_value_factor(
                FieldValueFactor::new("metrics.annotationsCount")
                    .modifier(Modifier::Ln1p)
                    .missing(0.0),
            ))
            .function(ScoreFunction::weight(1.5).with_filter(Query::term("type", "topics")))
            .score_mode(ScoreMode::Multiply)
            .boost_mode(BoostMode::Replace)
            .into_query();

        assert_eq!(
            query.to_json(),
            json!({"function_score": {
                "query": {"match_all": {}},
                "functions": [
                    {"field_value_factor": {"field": "metrics.annotationsCount", "modifier": "ln1p", "missing": 0.0}},
                    {"filter": {"term": {"type": {"value": "topics"}}}, "weight": 1.5}
                ],
                "score_mode": "multiply",
                "boost_mode": "replace"
            }})
        );
    }

    #[test]
    fn test_search_source() {
        let source = SearchSource::new(Query::MatchAll, 50)
            .sort(SortField::asc("prefLabel.raw").unmapped_type("keyword"))
            .min_score(1.0);
        assert_eq!(
            source.to_json(),
            json!({
                "query": {"match_all": {}},
                "size": 50,
                "sort": [{"prefLabel.raw": {"order": "asc", "unmapped_type": "keyword"}}],
                "min_score": 1.0
            })
        );
    }

    #[test]
    fn test_ids() {
        assert_eq!(
            Query::ids(["a", "b"]).to_json(),
            json!({"ids": {"values": ["a", "b"]}})
        );
    }
}
