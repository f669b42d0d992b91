//! Concept search service.
//!
//! One method per query shape. Each builds the query, dispatches it to the
//! right index alias and projects the hits.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use tracing::{debug, instrument};

use concepts_backend::{Dispatch, Dispatcher, IndexScope};
use concepts_core::{defaults, extract_uuid, Concept, Error, ResolvedTypes, Result};

use crate::builder::{self, QueryOptions};
use crate::projection::{project_hits, ProjectionOptions, ResultOrder};

/// Page-size caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Page size of by-type listings.
    pub search_result_limit: usize,
    /// Page size of typeahead, term and text-mode searches.
    pub autocomplete_result_limit: usize,
    /// Maximum number of ids in one lookup.
    pub max_ids_limit: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            search_result_limit: defaults::SEARCH_RESULT_LIMIT,
            autocomplete_result_limit: defaults::AUTOCOMPLETE_RESULT_LIMIT,
            max_ids_limit: defaults::MAX_IDS_LIMIT,
        }
    }
}

impl SearchLimits {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("search result limit", self.search_result_limit),
            ("autocomplete result limit", self.autocomplete_result_limit),
            ("max ids limit", self.max_ids_limit),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{} must be greater than 0", name)));
            }
        }
        Ok(())
    }
}

/// Parameters shared by the ranked searches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub types: ResolvedTypes,
    pub include_deprecated: bool,
    pub include_score: bool,
    /// Keep `isFTAuthor` on returned concepts.
    pub include_authors: bool,
    pub boost_authors: bool,
    pub filter_authors: bool,
    pub scope: IndexScope,
}

impl SearchParams {
    pub fn new(types: ResolvedTypes) -> Self {
        Self {
            types,
            ..Self::default()
        }
    }

    fn query_options(&self) -> QueryOptions {
        QueryOptions::new(self.types.clone())
            .include_deprecated(self.include_deprecated)
            .boost_authors(self.boost_authors)
            .filter_authors(self.filter_authors)
    }

    fn projection(&self) -> ProjectionOptions {
        ProjectionOptions {
            include_score: self.include_score,
            include_authors: self.include_authors,
            include_deprecated: self.include_deprecated,
        }
    }
}

/// Search operations over the concept indices.
#[derive(Debug, Clone)]
pub struct ConceptSearchService {
    dispatcher: Dispatcher,
    limits: SearchLimits,
}

impl ConceptSearchService {
    pub fn new(dispatcher: Dispatcher, limits: SearchLimits) -> Self {
        Self { dispatcher, limits }
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Catalog listing of one type, sorted by label.
    #[instrument(skip(self, types), fields(subsystem = "search", component = "concept_search", op = "by_type"))]
    pub async fn find_by_type(
        &self,
        types: &ResolvedTypes,
        include_deprecated: bool,
        scope: IndexScope,
    ) -> Result<Vec<Concept>> {
        let start = Instant::now();
        let cap = self.limits.search_result_limit;
        let source = builder::by_type_query(types, include_deprecated, cap);

        let response = self
            .dispatcher
            .dispatch(Dispatch::new(scope, source.to_json()))
            .await?;

        let projection = ProjectionOptions {
            include_deprecated,
            ..ProjectionOptions::default()
        };
        let mut concepts = project_hits(&response.hits, &projection, ResultOrder::PrefLabel);
        concepts.truncate(cap);

        debug!(
            hit_count = response.hits.len(),
            result_count = concepts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "By-type listing completed"
        );
        Ok(concepts)
    }

    /// Lookup by id against the extended index. Ids may be bare UUIDs or
    /// any URI containing one.
    #[instrument(skip(self, ids), fields(subsystem = "search", component = "concept_search", op = "by_ids", id_count = ids.len()))]
    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Concept>> {
        if ids.len() > self.limits.max_ids_limit {
            return Err(Error::InvalidInput(format!(
                "the maximum number of ids allowed is {}",
                self.limits.max_ids_limit
            )));
        }

        let mut uuids: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let uuid = extract_uuid(id)?.to_string();
            if !uuids.contains(&uuid) {
                uuids.push(uuid);
            }
        }
        if uuids.is_empty() {
            return Ok(Vec::new());
        }

        let source = builder::by_ids_query(&uuids);
        let response = self
            .dispatcher
            .dispatch(Dispatch::new(IndexScope::Extended, source.to_json()))
            .await?;

        let mut concepts = project_hits(
            &response.hits,
            &ProjectionOptions::default(),
            ResultOrder::Backend,
        );
        concepts.truncate(self.limits.max_ids_limit);
        debug!(result_count = concepts.len(), "Id lookup completed");
        Ok(concepts)
    }

    /// Typeahead search; zero hits is an empty list.
    #[instrument(skip(self, params), fields(subsystem = "search", component = "concept_search", op = "search", query = %text))]
    pub async fn search(&self, text: &str, params: &SearchParams) -> Result<Vec<Concept>> {
        let cap = self.limits.autocomplete_result_limit;
        let source = builder::term_query(text, &params.query_options(), cap);

        let response = self
            .dispatcher
            .dispatch(Dispatch::new(params.scope, source.to_json()).dfs())
            .await?;

        let mut concepts = project_hits(&response.hits, &params.projection(), ResultOrder::Backend);
        concepts.truncate(cap);
        debug!(result_count = concepts.len(), "Search completed");
        Ok(concepts)
    }

    /// Organisation-specialised search, shortest label first.
    #[instrument(skip(self, params), fields(subsystem = "search", component = "concept_search", op = "text", query = %text))]
    pub async fn search_text(&self, text: &str, params: &SearchParams) -> Result<Vec<Concept>> {
        let cap = self.limits.autocomplete_result_limit;
        let source = builder::text_query(text, &params.query_options(), cap);

        let response = self
            .dispatcher
            .dispatch(Dispatch::new(params.scope, source.to_json()).dfs())
            .await?;

        let mut concepts = project_hits(
            &response.hits,
            &params.projection(),
            ResultOrder::PrefLabelLength,
        );
        concepts.truncate(cap);
        debug!(result_count = concepts.len(), "Text search completed");
        Ok(concepts)
    }

    /// Term search; zero results is `NotFound`.
    #[instrument(skip(self, params), fields(subsystem = "search", component = "concept_search", op = "term", query = %text))]
    pub async fn search_term(&self, text: &str, params: &SearchParams) -> Result<Vec<Concept>> {
        let concepts = self.search(text, params).await?;
        if concepts.is_empty() {
            return Err(Error::NotFound(format!("no concepts found for '{}'", text)));
        }
        Ok(concepts)
    }

    /// Best match per candidate, sent as one bundle. Keys are the distinct
    /// candidates; each maps to zero or one concept. `NotFound` when no
    /// candidate matched.
    #[instrument(skip(self, candidates, params), fields(subsystem = "search", component = "concept_search", op = "best_match", bundle_size = candidates.len()))]
    pub async fn best_match(
        &self,
        candidates: &[String],
        params: &SearchParams,
    ) -> Result<BTreeMap<String, Vec<Concept>>> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
        let distinct: Vec<&String> = candidates
            .iter()
            .filter(|&candidate| seen.insert(candidate.as_str()))
            .collect();
        if distinct.is_empty() {
            return Err(Error::Validation("bestMatchTerms must not be empty".to_string()));
        }

        let options = params.query_options();
        let bundle: Vec<Dispatch> = distinct
            .iter()
            .map(|candidate| {
                Dispatch::new(
                    params.scope,
                    builder::best_match_query(candidate, &options).to_json(),
                )
                .dfs()
            })
            .collect();

        let responses = self.dispatcher.dispatch_bundle(bundle).await?;

        let projection = params.projection();
        let mut results = BTreeMap::new();
        let mut matched = 0usize;
        for (candidate, response) in distinct.into_iter().zip(responses) {
            let mut concepts = project_hits(&response.hits, &projection, ResultOrder::Backend);
            concepts.truncate(1);
            if !concepts.is_empty() {
                matched += 1;
            }
            results.insert(candidate.clone(), concepts);
        }

        debug!(matched, candidates = results.len(), "Best match completed");
        if matched == 0 {
            return Err(Error::NotFound(
                "no concepts found for any of the best match terms".to_string(),
            ));
        }
        Ok(results)
    }
}
