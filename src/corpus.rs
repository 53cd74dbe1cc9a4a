//! Evidence corpus assembly: primary page first, then a bounded excerpt of
//! each subpage that could be fetched.

use futures::future::join_all;
use tracing::{info, warn};
use crate::scraper::{PageFetcher, ScrapeOptions, ScrapeResult};
use crate::site::SubpageCandidate;

/// Characters of primary page content kept in the corpus.
pub const PRIMARY_CHAR_LIMIT: usize = 6000;

/// Characters kept from each subpage.
pub const SUBPAGE_CHAR_LIMIT: usize = 2000;

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn subpage_excerpt(url: &str, content: &str) -> String {
    format!("\n\n--- PAGE: {} ---\n{}", url, truncate_chars(content, SUBPAGE_CHAR_LIMIT))
}

/// Fetches every candidate concurrently and appends the ones that succeed,
/// in candidate order, after the truncated primary content. A failed
/// subpage is logged and dropped.
pub async fn assemble<F>(fetcher: &F, primary: &ScrapeResult, candidates: &[SubpageCandidate]) -> String
where
    F: PageFetcher + ?Sized,
{
    let fetches = candidates
        .iter()
        .map(|candidate| fetcher.fetch_page(&candidate.url, ScrapeOptions::subpage()));
    // join_all yields in input order regardless of completion order
    let outcomes = join_all(fetches).await;

    let mut corpus = truncate_chars(&primary.content, PRIMARY_CHAR_LIMIT).to_string();
    let mut included = 0;

    for (candidate, outcome) in candidates.iter().zip(outcomes) {
        match outcome {
            Ok(page) => {
                corpus.push_str(&subpage_excerpt(&candidate.url, &page.content));
                included += 1;
            }
            Err(e) => {
                warn!(url = %candidate.url, kind = e.kind(), error = %e, "Dropping subpage");
            }
        }
    }

    info!(
        subpages = included,
        attempted = candidates.len(),
        chars = corpus.chars().count(),
        "Corpus assembled"
    );

    corpus
}
