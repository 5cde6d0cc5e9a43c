pub mod cleaner;
pub mod http_client;
pub mod pagination;
pub mod parsers;

use crate::config::{AppConfig, LocatorKind, PaginationConfig, ScraperConfig, StrategyKind};
use crate::models::{Section, SectionReport, StopReason};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

use self::cleaner::clean_catalog_rows;
use self::http_client::{FetchError, HttpClient};
use self::pagination::{NextPage, PageCursor, Pagination};
use self::parsers::{CatalogParser, TableLocator};

// ── Fetcher trait ─────────────────────────────────────────────────────────────

/// Swappable page source: the live site in production, fixtures in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

// ── Catalog scraper ───────────────────────────────────────────────────────────

pub struct CatalogScraper<F> {
    fetcher: F,
    parser: CatalogParser,
    pagination: Pagination,
    locator: LocatorKind,
    origin: Url,
    /// Origin as written in config, without trailing slash; prefixes record URLs.
    origin_prefix: String,
    catalog_url: Url,
    delay: Duration,
}

impl CatalogScraper<HttpClient> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = HttpClient::new(&config.scraper)?;
        Self::new(client, &config.scraper, &config.pagination)
    }
}

impl<F: PageFetcher> CatalogScraper<F> {
    pub fn new(fetcher: F, scraper: &ScraperConfig, pagination: &PaginationConfig) -> Result<Self> {
        let origin = Url::parse(&scraper.origin)
            .with_context(|| format!("Invalid origin {:?}", scraper.origin))?;
        let catalog_url = Url::parse(&scraper.catalog_url)
            .with_context(|| format!("Invalid catalog URL {:?}", scraper.catalog_url))?;

        let strategy = match pagination.strategy {
            StrategyKind::Links => Pagination::FollowLinks,
            StrategyKind::Offsets => Pagination::Offsets {
                stride: pagination.page_stride,
            },
        };

        Ok(Self {
            fetcher,
            parser: CatalogParser::new()?,
            pagination: strategy,
            locator: pagination.effective_locator(),
            origin,
            origin_prefix: scraper.origin.trim_end_matches('/').to_string(),
            catalog_url,
            delay: Duration::from_millis(scraper.request_delay_ms),
        })
    }

    fn table_locator(&self, section: &Section) -> TableLocator {
        match self.locator {
            LocatorKind::Heading => TableLocator::HeadingMatch(section.label.clone()),
            LocatorKind::First => TableLocator::FirstTable,
        }
    }

    /// Scrape every page of one section. Never fails: a transport error ends
    /// the section early and the records gathered so far are kept.
    #[instrument(skip_all, fields(section = %section.key))]
    pub async fn scrape_section(&self, section: &Section) -> SectionReport {
        let locator = self.table_locator(section);
        let mut cursor = PageCursor::new(self.pagination, &self.catalog_url, &self.origin, section);
        let mut records = Vec::new();
        let mut next = cursor.first();

        info!("Scraping {} ({:?})", section.label, self.pagination);

        let stop = loop {
            let url = match next {
                NextPage::Continue(url) => url,
                NextPage::Stop(reason) => break reason,
            };

            if cursor.pages() > 0 && !self.delay.is_zero() {
                sleep(self.delay).await;
            }

            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", url, e);
                    break StopReason::FetchFailed(e.to_string());
                }
            };

            let mut page = self.parser.parse_page(&html, &locator);
            info!(
                "Scraping {} - Title: {}",
                url,
                page.title.as_deref().unwrap_or("No title")
            );

            if !page.table_found() {
                warn!("Table '{}' not found on this page", section.label);
            }
            for heading in &page.tables {
                debug!("Found table: {}", heading);
            }

            let page_records = clean_catalog_rows(std::mem::take(&mut page.rows), &self.origin_prefix);
            info!("  {} records on page {}", page_records.len(), cursor.pages() + 1);

            next = cursor.advance(&page, page_records.len());
            records.extend(page_records);

            if let NextPage::Continue(url) = &next {
                debug!("Following to next page: {}", url);
            }
        };

        match &stop {
            StopReason::FetchFailed(_) => {
                warn!("{}: stopped early ({}), keeping {} records", section.label, stop, records.len())
            }
            _ => info!("{}: {} records from {} pages ({})", section.label, records.len(), cursor.pages(), stop),
        }

        SectionReport {
            key: section.key.clone(),
            label: section.label.clone(),
            records,
            pages_fetched: cursor.pages(),
            stop,
        }
    }

    /// Scrape sections one after another, in the given order.
    pub async fn scrape_all(&self, sections: &[Section]) -> Vec<SectionReport> {
        let mut reports = Vec::with_capacity(sections.len());
        for section in sections {
            reports.push(self.scrape_section(section).await);
        }
        reports
    }
}
