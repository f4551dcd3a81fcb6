//! # Tabmarks Matcher
//!
//! Destination normalization and equality.
//!
//! Two destinations are "the same place" when they agree on origin, path,
//! and query. Trailing-slash runs and fragments are trivial variation and
//! are discarded; path, query, and origin differences are meaningful.
//!
//! Pure functions, no state. `normalize` is also the key function for the
//! index's reverse destination index, so it must be deterministic and
//! total: unparseable input falls back to raw-string equality.

use url::Url;

/// Canonical form of a destination identifier.
///
/// Parsed as origin + path + query, with any trailing-slash run and any
/// fragment discarded. On parse failure the raw input is returned
/// unchanged, which defines the equality fallback.
pub fn normalize(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };
    parsed.set_fragment(None);
    let query = parsed.query().map(str::to_string);
    parsed.set_query(None);
    let mut canonical = parsed.as_str().trim_end_matches('/').to_string();
    if let Some(query) = query {
        canonical.push('?');
        canonical.push_str(&query);
    }
    canonical
}

/// Whether two optional destinations refer to the same place.
///
/// False if either side is absent.
pub fn matches(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => normalize(a) == normalize(b),
        _ => false,
    }
}
