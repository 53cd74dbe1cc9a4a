use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};
use crate::error::{AppError, Result, Upstream};

/// Builds the shared outbound client used for both the scraping and the
/// extraction service.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// What to ask the scraping service for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub include_links: bool,
    pub only_main_content: bool,
}

impl ScrapeOptions {
    /// Landing page: full content plus the outbound link inventory.
    pub const fn primary() -> Self {
        Self {
            include_links: true,
            only_main_content: false,
        }
    }

    /// Follow-up pages: main content only, links are not used.
    pub const fn subpage() -> Self {
        Self {
            include_links: false,
            only_main_content: true,
        }
    }
}

/// Text content and discovered links for one fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeResult {
    pub content: String,
    pub links: Vec<String>,
}

/// One page fetch. Implemented by [`ScrapeClient`]; the seam lets corpus
/// assembly run against anything that can produce pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str, options: ScrapeOptions) -> Result<ScrapeResult>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
    only_main_content: bool,
}

#[derive(Deserialize, Default)]
struct ScrapePayload {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    links: Option<Vec<String>>,
}

// The service nests results under `data`, older responses put them at the top level
#[derive(Deserialize)]
struct ScrapeEnvelope {
    #[serde(default)]
    data: Option<ScrapePayload>,
    #[serde(flatten)]
    top: ScrapePayload,
}

impl ScrapeEnvelope {
    fn into_result(self) -> ScrapeResult {
        let (nested_markdown, nested_links) = match self.data {
            Some(data) => (data.markdown, data.links),
            None => (None, None),
        };

        let content = nested_markdown
            .filter(|m| !m.is_empty())
            .or(self.top.markdown)
            .unwrap_or_default();
        let links = nested_links
            .filter(|l| !l.is_empty())
            .or(self.top.links)
            .unwrap_or_default();

        ScrapeResult { content, links }
    }
}

/// Client for the hosted page-scraping service.
#[derive(Clone)]
pub struct ScrapeClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl ScrapeClient {
    pub fn new(http: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: format!("{}/v1/scrape", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl PageFetcher for ScrapeClient {
    #[instrument(level = "debug", skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_page(&self, url: &str, options: ScrapeOptions) -> Result<ScrapeResult> {
        let mut formats = vec!["markdown"];
        if options.include_links {
            formats.push("links");
        }
        let body = ScrapeRequest {
            url,
            formats,
            only_main_content: options.only_main_content,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::transport(Upstream::Scraper, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %detail, "Scraping service error");
            return Err(AppError::ScrapeFailed {
                status: status.as_u16(),
            });
        }

        let envelope: ScrapeEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::transport(Upstream::Scraper, e))?;
        let result = envelope.into_result();
        debug!(chars = result.content.chars().count(), links = result.links.len(), "Page scraped");

        Ok(result)
    }
}
