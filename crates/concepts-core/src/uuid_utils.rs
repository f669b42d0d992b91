//! Concept identifier utilities.
//!
//! Concept ids are URIs that embed a lowercase UUID. The backend may store
//! them under any path (`/things/`, `/people/`, `/organisations/`, ...); the
//! public contract always exposes the canonical `http://api.ft.com/things/<uuid>`
//! form.
//!
//! ```
//! use concepts_core::uuid_utils::{canonical_id, extract_uuid};
//!
//! let id = "http://api.ft.com/people/7ab9c9b4-5d45-3d1e-9a25-0a3a8b6d1f2e";
//! assert_eq!(
//!     canonical_id(id).unwrap(),
//!     "http://api.ft.com/things/7ab9c9b4-5d45-3d1e-9a25-0a3a8b6d1f2e"
//! );
//! assert_eq!(
//!     extract_uuid(id).unwrap(),
//!     "7ab9c9b4-5d45-3d1e-9a25-0a3a8b6d1f2e"
//! );
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::THINGS_URI_PREFIX;
use crate::{Error, Result};

static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-([0-9a-f]{4}-){3}[0-9a-f]{12}").expect("static UUID pattern")
});

/// Find the canonical UUID substring inside an id.
pub fn extract_uuid(id: &str) -> Result<&str> {
    UUID_PATTERN
        .find(id)
        .map(|m| m.as_str())
        .ok_or_else(|| Error::InvalidInput(format!("'{}' does not contain a valid UUID", id)))
}

/// Rewrite an id to `http://api.ft.com/things/<uuid>`.
pub fn canonical_id(id: &str) -> Result<String> {
    extract_uuid(id).map(|uuid| format!("{}{}", THINGS_URI_PREFIX, uuid))
}

/// Whether the string is exactly a canonical concept id.
pub fn is_canonical_id(id: &str) -> bool {
    id.strip_prefix(THINGS_URI_PREFIX)
        .map(|rest| UUID_PATTERN.find(rest).map(|m| m.as_str()) == Some(rest))
        .unwrap_or(false)
}
