//! Website URL handling: coercing user input into a fetchable URL and picking
//! which of a page's links are worth fetching next.

use once_cell::sync::Lazy;
use regex::RegexSet;
use std::collections::HashSet;
use url::Url;

/// Upper bound on subpages fetched per enrichment.
pub const MAX_SUBPAGES: usize = 4;

// Topics that tend to carry due-diligence signal
static SUBPAGE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)about",
        r"(?i)pricing",
        r"(?i)careers|jobs",
        r"(?i)blog",
        r"(?i)product",
        r"(?i)team",
        r"(?i)docs",
    ])
    .expect("Failed to compile subpage patterns")
});

/// A same-origin link selected for fetching, resolved to an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpageCandidate {
    pub url: String,
}

/// Trims the input and prefixes `https://` unless it already carries an
/// http(s) scheme. Purely textual.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn has_http_scheme(s: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        s.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Picks at most `limit` (never more than [`MAX_SUBPAGES`]) links that share
/// the primary URL's origin and whose path mentions a topic of interest.
/// Input order is preserved; the first matches win.
pub fn select_subpages(primary_url: &str, links: &[String], limit: usize) -> Vec<SubpageCandidate> {
    let limit = limit.min(MAX_SUBPAGES);
    let Ok(base) = Url::parse(primary_url) else {
        return Vec::new();
    };
    let origin = base.origin();
    let mut seen = HashSet::new();

    links
        .iter()
        .filter_map(|link| base.join(link).ok())
        .filter(|resolved| resolved.origin() == origin)
        .filter(|resolved| SUBPAGE_PATTERNS.is_match(resolved.path()))
        .map(String::from)
        .filter(|resolved| seen.insert(resolved.clone()))
        .take(limit)
        .map(|url| SubpageCandidate { url })
        .collect()
}
