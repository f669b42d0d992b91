//! Result projection.
//!
//! Converts backend hits into public [`Concept`] values. A hit whose source
//! cannot be read or whose id carries no UUID is skipped with a warning; it
//! never fails the whole response.

use tracing::warn;

use concepts_backend::Hit;
use concepts_core::concept_types::most_specific;
use concepts_core::{canonical_id, BackendConcept, Concept, Error, Result};

/// Which optional fields survive projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Attach the backend score
    pub include_score: bool,
    /// Keep the `isFTAuthor` flag
    pub include_authors: bool,
    /// Keep deprecated concepts
    pub include_deprecated: bool,
}

/// Order applied after projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultOrder {
    /// Keep the backend's relevance order.
    #[default]
    Backend,
    /// Ascending `prefLabel`.
    PrefLabel,
    /// Ascending `prefLabel` length, shortest first. Stable, so backend
    /// order breaks ties.
    PrefLabelLength,
}

/// Project one hit.
pub fn project_hit(hit: &Hit, options: &ProjectionOptions) -> Result<Concept> {
    let source = hit
        .source
        .clone()
        .ok_or_else(|| Error::Serialization("hit has no source".to_string()))?;
    let stored: BackendConcept = serde_json::from_value(source)?;

    let id = canonical_id(&stored.id)?;
    let direct_type = match stored.direct_type.filter(|t| !t.is_empty()) {
        Some(direct_type) => direct_type,
        None => most_specific(&stored.types).unwrap_or_default().to_string(),
    };

    let score = if options.include_score {
        hit.score
    } else {
        None
    };

    let is_ft_author = if options.include_authors {
        parse_author_flag(stored.is_ft_author.as_deref())
    } else {
        None
    };

    Ok(Concept {
        id,
        api_url: stored.api_url,
        pref_label: stored.pref_label,
        types: stored.types,
        direct_type,
        aliases: stored.aliases,
        score,
        is_ft_author,
        scope_note: stored.scope_note,
        is_deprecated: stored.is_deprecated,
        country_code: stored.country_code,
        country_of_incorporation: stored.country_of_incorporation,
    })
}

/// `"true"`/`"false"` become a flag; anything else drops the field.
fn parse_author_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// Project every readable hit and apply the requested order.
pub fn project_hits(hits: &[Hit], options: &ProjectionOptions, order: ResultOrder) -> Vec<Concept> {
    let mut concepts: Vec<Concept> = hits
        .iter()
        .filter_map(|hit| match project_hit(hit, options) {
            Ok(concept) => Some(concept),
            Err(e) => {
                warn!(
                    subsystem = "search",
                    component = "projector",
                    concept_id = hit.id.as_deref().unwrap_or("<none>"),
                    error = %e,
                    "Skipping unreadable hit"
                );
                None
            }
        })
        .filter(|concept| options.include_deprecated || !concept.is_deprecated)
        .collect();

    sort_concepts(&mut concepts, order);
    concepts
}

pub fn sort_concepts(concepts: &mut [Concept], order: ResultOrder) {
    match order {
        ResultOrder::Backend => {}
        ResultOrder::PrefLabel => concepts.sort_by(|a, b| a.pref_label.cmp(&b.pref_label)),
        ResultOrder::PrefLabelLength => concepts.sort_by_key(|c| c.pref_label.chars().count()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concepts_core::concept_types::{
        COMPANY_URI, CONCEPT_URI, ORGANISATION_URI, PERSON_URI, PUBLIC_COMPANY_URI, THING_URI,
    };
    use serde_json::json;

    const UUID: &str = "2d3e16e0-61cb-4322-8aff-3b01c59f4daa";

    fn person_hit(label: &str, author: Option<&str>) -> Hit {
        let mut source = json!({
            "id": format!("http://api.ft.com/people/{}", UUID),
            "apiUrl": format!("http://api.ft.com/people/{}", UUID),
            "prefLabel": label,
            "types": [THING_URI, CONCEPT_URI, PERSON_URI],
            "directType": PERSON_URI,
            "type": "people",
            "authorities": ["TME"],
            "metrics": {"annotationsCount": 3, "prevWeekAnnotationsCount": 1}
        });
        if let Some(author) = author {
            source["isFTAuthor"] = json!(author);
        }
        Hit::new(UUID, 2.75, source)
    }

    fn labelled(label: &str) -> Concept {
        project_hit(&person_hit(label, None), &ProjectionOptions::default()).unwrap()
    }

    #[test]
    fn test_projection_canonicalises_id() {
        let concept = labelled("Eric Platt");
        assert_eq!(concept.id, format!("http://api.ft.com/things/{}", UUID));
        assert_eq!(concept.api_url, format!("http://api.ft.com/people/{}", UUID));
    }

    #[test]
    fn test_projection_strips_internal_fields() {
        let json = serde_json::to_value(labelled("Eric Platt")).unwrap();
        let obj = json.as_object().unwrap();
        for internal in ["type", "metrics", "authorities", "score", "isFTAuthor"] {
            assert!(!obj.contains_key(internal), "{} leaked", internal);
        }
    }

    #[test]
    fn test_score_only_when_requested() {
        let options = ProjectionOptions {
            include_score: true,
            ..ProjectionOptions::default()
        };
        let concept = project_hit(&person_hit("Eric Platt", None), &options).unwrap();
        assert_eq!(concept.score, Some(2.75));
    }

    #[test]
    fn test_author_flag_tri_state() {
        let options = ProjectionOptions {
            include_authors: true,
            ..ProjectionOptions::default()
        };
        let yes = project_hit(&person_hit("A", Some("true")), &options).unwrap();
        let no = project_hit(&person_hit("B", Some("false")), &options).unwrap();
        let bogus = project_hit(&person_hit("C", Some("maybe")), &options).unwrap();
        let absent = project_hit(&person_hit("D", None), &options).unwrap();
        assert_eq!(yes.is_ft_author, Some(true));
        assert_eq!(no.is_ft_author, Some(false));
        assert_eq!(bogus.is_ft_author, None);
        assert_eq!(absent.is_ft_author, None);
    }

    #[test]
    fn test_author_flag_dropped_without_option() {
        let concept =
            project_hit(&person_hit("A", Some("true")), &ProjectionOptions::default()).unwrap();
        assert_eq!(concept.is_ft_author, None);
    }

    #[test]
    fn test_direct_type_computed_when_missing() {
        let hit = Hit::new(
            UUID,
            1.0,
            json!({
                "id": format!("http://api.ft.com/things/{}", UUID),
                "prefLabel": "Acme plc",
                "types": [THING_URI, CONCEPT_URI, ORGANISATION_URI, COMPANY_URI, PUBLIC_COMPANY_URI]
            }),
        );
        let concept = project_hit(&hit, &ProjectionOptions::default()).unwrap();
        assert_eq!(concept.direct_type, PUBLIC_COMPANY_URI);
    }

    #[test]
    fn test_unreadable_hits_are_skipped() {
        let hits = vec![
            person_hit("Eric Platt", None),
            Hit::new("x", 1.0, json!({"prefLabel": "no id"})),
            Hit::new("y", 1.0, json!({"id": "not-a-uuid", "prefLabel": "bad id"})),
            Hit {
                id: Some("z".to_string()),
                ..Hit::default()
            },
        ];
        let concepts = project_hits(&hits, &ProjectionOptions::default(), ResultOrder::Backend);
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].pref_label, "Eric Platt");
    }

    #[test]
    fn test_deprecated_dropped_unless_included() {
        let mut hit = person_hit("Rick And Morty", None);
        hit.source.as_mut().unwrap()["isDeprecated"] = json!(true);

        let hidden = project_hits(
            std::slice::from_ref(&hit),
            &ProjectionOptions::default(),
            ResultOrder::Backend,
        );
        assert!(hidden.is_empty());

        let options = ProjectionOptions {
            include_deprecated: true,
            ..ProjectionOptions::default()
        };
        let shown = project_hits(&[hit], &options, ResultOrder::Backend);
        assert_eq!(shown.len(), 1);
        assert!(shown[0].is_deprecated);
    }

    #[test]
    fn test_sort_by_pref_label() {
        let mut concepts = vec![labelled("News"), labelled("Analysis"), labelled("Comment")];
        sort_concepts(&mut concepts, ResultOrder::PrefLabel);
        let labels: Vec<_> = concepts.iter().map(|c| c.pref_label.as_str()).collect();
        assert_eq!(labels, vec!["Analysis", "Comment", "News"]);
    }

    #[test]
    fn test_sort_by_label_length_is_stable() {
        let mut concepts = vec![labelled("IBM Corp"), labelled("IBMX"), labelled("IBM1")];
        sort_concepts(&mut concepts, ResultOrder::PrefLabelLength);
        let labels: Vec<_> = concepts.iter().map(|c| c.pref_label.as_str()).collect();
        assert_eq!(labels, vec!["IBMX", "IBM1", "IBM Corp"]);
    }

    #[test]
    fn test_backend_order_preserved() {
        let mut concepts = vec![labelled("B"), labelled("A")];
        sort_concepts(&mut concepts, ResultOrder::Backend);
        assert_eq!(concepts[0].pref_label, "B");
    }
}
