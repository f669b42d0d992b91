//! Data models shared by the search service and the HTTP API.

use serde::{Deserialize, Serialize};

// =============================================================================
// PUBLIC CONCEPT
// =============================================================================

/// A concept as exposed by the public API.
///
/// Optional fields are omitted from the JSON when empty: `aliases` when the
/// list is empty, `score` and `isFTAuthor` when absent, `isDeprecated` when
/// false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    /// Canonical `http://api.ft.com/things/<uuid>` identifier
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_url: String,
    pub pref_label: String,
    /// Type URIs, most general first
    #[serde(default)]
    pub types: Vec<String>,
    /// Most specific type URI
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub direct_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(
        rename = "isFTAuthor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_ft_author: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_note: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_of_incorporation: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

// =============================================================================
// BACKEND CONCEPT
// =============================================================================

/// Popularity counters stored alongside a concept. Indexers write these as
/// integers, floats or null, so both are read as optional floats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMetrics {
    #[serde(default)]
    pub annotations_count: Option<f64>,
    #[serde(default)]
    pub prev_week_annotations_count: Option<f64>,
}

/// A concept document as stored in the search backend.
///
/// Superset of [`Concept`]: adds the `type` discriminator, popularity
/// metrics and provenance authorities. `isFTAuthor` is stored as a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConcept {
    pub id: String,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub pref_label: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub direct_type: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(rename = "type", default)]
    pub concept_type: Option<String>,
    #[serde(rename = "isFTAuthor", default)]
    pub is_ft_author: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub scope_note: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_of_incorporation: Option<String>,
    #[serde(default)]
    pub metrics: Option<ConceptMetrics>,
    #[serde(default)]
    pub authorities: Vec<String>,
}

// =============================================================================
// SEARCH CRITERIA
// =============================================================================

/// JSON body of the term/batch search endpoint.
///
/// Exactly one of `term` and `bestMatchTerms` must be present; that rule is
/// enforced by request validation, not by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub best_match_terms: Option<Vec<String>>,
    #[serde(default)]
    pub concept_types: Option<Vec<String>>,
    #[serde(default)]
    pub boost: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
}
