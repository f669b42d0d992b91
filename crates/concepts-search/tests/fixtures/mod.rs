//! Test fixtures for concept search tests.
//!
//! Canned backend hits shaped like stored concept documents.

#![allow(dead_code)]

use concepts_backend::Hit;
use concepts_core::concept_types::{CONCEPT_URI, GENRE_URI, PERSON_URI, THING_URI};
use serde_json::{json, Value};

pub const ANALYSIS: &str = "1a4d5b26-7c06-4d9a-9f61-71d5a2b1c3e0";
pub const NEWS: &str = "2b5e6c37-8d17-4eab-8a72-82e6b3c2d4f1";
pub const ERIC_PLATT: &str = "3c6f7d48-9e28-4fbc-9b83-93f7c4d3e5a2";
pub const ADAM_SAMSON: &str = "4d708e59-af39-40cd-8c94-a408d5e4f6b3";
pub const MICHAEL_HUNTER: &str = "5e819f6a-b04a-41de-9da5-b519e6f507c4";
pub const RICK_AND_MORTY: &str = "6f92a07b-c15b-42ef-8eb6-c62af7a618d5";

/// A stored concept document.
pub fn source(uuid: &str, label: &str, type_uri: &str, token: &str) -> Value {
    json!({
        "id": format!("http://www.ft.com/thing/{}", uuid),
        "apiUrl": format!("http://api.ft.com/things/{}", uuid),
        "prefLabel": label,
        "types": [THING_URI, CONCEPT_URI, type_uri],
        "directType": type_uri,
        "type": token,
        "aliases": [label],
        "authorities": ["TME"],
        "metrics": {"annotationsCount": 10, "prevWeekAnnotationsCount": 2}
    })
}

pub fn genre(uuid: &str, label: &str) -> Hit {
    Hit::new(uuid, 1.0, source(uuid, label, GENRE_URI, "genres"))
}

pub fn person(uuid: &str, label: &str, score: f64) -> Hit {
    Hit::new(uuid, score, source(uuid, label, PERSON_URI, "people"))
}

pub fn author(uuid: &str, label: &str, score: f64, is_author: bool) -> Hit {
    let mut hit = person(uuid, label, score);
    if let Some(source) = hit.source.as_mut() {
        source["isFTAuthor"] = json!(is_author.to_string());
    }
    hit
}

pub fn deprecated(mut hit: Hit) -> Hit {
    if let Some(source) = hit.source.as_mut() {
        source["isDeprecated"] = json!(true);
    }
    hit
}
