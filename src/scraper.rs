//! Scraper for the Bundestag open-data listing.
//!
//! Pages through the AJAX listing behind the open-data service and stores
//! every linked plenary protocol XML document on disk.

use scraper::{Html, Selector};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::ScraperConfig;
use crate::constants::{BUNDESTAG_BASE_URL, USER_AGENT};
use crate::error::Result;

/// Outcome of one fetch run.
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub discovered: usize,
    pub downloaded: usize,
    pub skipped: usize,
}

pub struct OpenDataScraper {
    client: reqwest::Client,
    config: ScraperConfig,
}

impl OpenDataScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    /// Crawls the paginated listing and downloads every transcript that is
    /// not yet on disk. Requests are spaced by the configured delay to go
    /// easy on the source site; re-runs are idempotent.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, destination_dir: &Path) -> Result<FetchSummary> {
        std::fs::create_dir_all(destination_dir)?;
        let mut summary = FetchSummary::default();

        for page in 0..self.config.max_pages {
            let offset = page * self.config.page_size;
            let listing_url = format!(
                "{}?limit={}&noFilterSet=true&offset={}",
                self.config.listing_url, self.config.page_size, offset
            );
            debug!(%listing_url, "Fetching listing page");

            let body = self
                .client
                .get(&listing_url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;

            let links = extract_xml_links(&body);
            if links.is_empty() {
                info!(page, "Listing exhausted");
                break;
            }

            for url in links {
                summary.discovered += 1;

                let Some(file_name) = document_file_name(&url) else {
                    warn!(%url, "Could not derive a file name, skipping link");
                    continue;
                };

                let target = destination_dir.join(file_name);
                if target.exists() {
                    debug!(file = file_name, "Already downloaded, skipping");
                    summary.skipped += 1;
                    continue;
                }

                sleep(Duration::from_millis(self.config.delay_ms)).await;
                let bytes = self
                    .client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .bytes()
                    .await?;
                std::fs::write(&target, &bytes)?;
                info!(file = file_name, bytes = bytes.len(), "Stored transcript");
                summary.downloaded += 1;
            }

            sleep(Duration::from_millis(self.config.delay_ms)).await;
        }

        Ok(summary)
    }
}

/// Pulls all links to XML documents out of a listing fragment, resolving
/// relative hrefs against the Bundestag host.
fn extract_xml_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href$='.xml']").unwrap();

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| {
            if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{BUNDESTAG_BASE_URL}{href}")
            }
        })
        .collect()
}

/// Last path segment of a document URL, without any query string.
fn document_file_name(url: &str) -> Option<&str> {
    let name = url.rsplit('/').next()?.split('?').next()?;
    if name.ends_with(".xml") {
        Some(name)
    } else {
        None
    }
}
