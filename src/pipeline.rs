//! The enrichment pipeline: normalize, fetch the primary page, fetch a few
//! relevant subpages, assemble the corpus and run structured extraction.
//!
//! Each call is independent. Nothing is retried; every failure surfaces once
//! with its kind intact, except individual subpage failures which are
//! absorbed during corpus assembly.

use std::time::Instant;
use tracing::{info, instrument, warn};
use crate::config::Config;
use crate::corpus;
use crate::enrichment::EnrichmentResult;
use crate::error::{AppError, Result};
use crate::llm::ExtractionClient;
use crate::scraper::{build_http_client, PageFetcher, ScrapeClient, ScrapeOptions};
use crate::site::{normalize_url, select_subpages};

pub struct Pipeline {
    scraper: ScrapeClient,
    extractor: ExtractionClient,
    max_subpages: usize,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self> {
        let http = build_http_client(config.http_timeout)?;

        Ok(Self {
            scraper: ScrapeClient::new(http.clone(), &config.scrape_base_url, config.scrape_api_key.clone()),
            extractor: ExtractionClient::new(
                http,
                &config.model_base_url,
                config.model_api_key.clone(),
                config.model.clone(),
            ),
            max_subpages: config.max_subpages,
        })
    }

    /// Turns a website string into structured company intelligence.
    #[instrument(skip(self))]
    pub async fn enrich(&self, website: &str) -> Result<EnrichmentResult> {
        if website.trim().is_empty() {
            return Err(AppError::InvalidInput("website is required".to_string()));
        }

        let started = Instant::now();
        let url = normalize_url(website);
        info!(%url, "Scraping primary page");

        let primary = self.scraper.fetch_page(&url, ScrapeOptions::primary()).await?;

        let candidates = select_subpages(&url, &primary.links, self.max_subpages);
        info!(
            links = primary.links.len(),
            subpages = ?candidates.iter().map(|c| c.url.as_str()).collect::<Vec<_>>(),
            "Scraping subpages"
        );

        let corpus = corpus::assemble(&self.scraper, &primary, &candidates).await;

        let result = self.extractor.extract(&corpus, &primary.links, &url).await;
        match &result {
            Ok(_) => info!(elapsed = ?started.elapsed(), "Enrichment complete"),
            Err(e) => warn!(kind = e.kind(), error = %e, elapsed = ?started.elapsed(), "Extraction failed"),
        }

        result
    }
}
