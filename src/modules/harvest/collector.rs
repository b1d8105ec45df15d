use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use reqwest::Client;

use crate::shared::errors::{AppError, AppResult};
use crate::{log_error, log_info};

pub const DEFAULT_DIRECTORY_URL: &str = "https://blueskydirectory.com/starter-packs/all";

/// A starter pack link found in the directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackLink {
    pub creator_handle: String,
    pub rkey: String,
}

impl PackLink {
    /// Input file form, `handle|rkey`
    pub fn to_input_line(&self) -> String {
        format!("{}|{}", self.creator_handle, self.rkey)
    }
}

/// Finds `/starter-pack/{handle}/{rkey}` links in listing pages
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
}

impl LinkExtractor {
    pub fn new() -> AppResult<Self> {
        let pattern = Regex::new(r#"href="[^"]*/starter-pack/([^/"?#]+)/([^/"?#]+)/?""#)
            .map_err(|e| AppError::ConfigError(format!("Invalid link pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    /// Links in page order
    pub fn extract(&self, html: &str) -> Vec<PackLink> {
        self.pattern
            .captures_iter(html)
            .map(|caps| PackLink {
                creator_handle: caps[1].to_lowercase(),
                rkey: caps[2].to_string(),
            })
            .collect()
    }
}

/// Source of directory listing pages
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> AppResult<String>;
}

/// Fetches listing pages over HTTP
pub struct DirectoryHttpSource {
    client: Client,
    base_url: String,
}

impl DirectoryHttpSource {
    pub fn new(base_url: &str, user_agent: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PageSource for DirectoryHttpSource {
    async fn fetch_page(&self, page: u32) -> AppResult<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("page", page)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Directory page {} returned {}",
                page,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

/// Harvest report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub pages: u32,
    pub failed_pages: u32,
    pub links_seen: usize,
    pub unique_links: usize,
}

/// Walks the directory listing a batch of pages at a time
pub struct Collector {
    source: Arc<dyn PageSource>,
    extractor: LinkExtractor,
    concurrency: usize,
}

impl Collector {
    pub fn new(source: Arc<dyn PageSource>, concurrency: usize) -> AppResult<Self> {
        Ok(Self {
            source,
            extractor: LinkExtractor::new()?,
            concurrency: concurrency.max(1),
        })
    }

    /// Scrape pages `1..=pages`, returning unique links in discovery order
    pub async fn collect(&self, pages: u32) -> (Vec<PackLink>, HarvestSummary) {
        let mut seen = HashSet::new();
        let mut links = Vec::new();
        let mut summary = HarvestSummary {
            pages,
            ..HarvestSummary::default()
        };

        let page_numbers: Vec<u32> = (1..=pages).collect();
        for batch in page_numbers.chunks(self.concurrency) {
            let results = join_all(batch.iter().map(|&page| async move {
                log_info!("Scraping page {}/{}", page, pages);
                (page, self.source.fetch_page(page).await)
            }))
            .await;

            let mut found = 0;
            for (page, result) in results {
                match result {
                    Ok(html) => {
                        let page_links = self.extractor.extract(&html);
                        found += page_links.len();
                        for link in page_links {
                            if seen.insert(link.clone()) {
                                links.push(link);
                            }
                        }
                    }
                    Err(e) => {
                        log_error!("Error on page {}: {}", page, e);
                        summary.failed_pages += 1;
                    }
                }
            }

            summary.links_seen += found;
            log_info!(
                "Batch complete, found {} links (total: {})",
                found,
                links.len()
            );
        }

        summary.unique_links = links.len();
        (links, summary)
    }
}

/// Write links as the pipeline's input file, one `handle|rkey` per line
pub fn write_input_file(path: &Path, links: &[PackLink]) -> AppResult<()> {
    let mut content = links
        .iter()
        .map(PackLink::to_input_line)
        .collect::<Vec<_>>()
        .join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)?;
    log_info!("Saved {} unique links to {}", links.len(), path.display());
    Ok(())
}
