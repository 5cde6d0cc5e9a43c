//! Pipeline orchestrator: ties scraper → CSV output together.
//!
//! `run()` scrapes each selected section in configuration order, concatenates
//! the records (section order preserved) and writes them once at the end.
//! A section that fails part-way keeps whatever it collected; the other
//! sections are unaffected.

use crate::config::AppConfig;
use crate::models::{Record, Section, SectionReport};
use crate::scraper::{CatalogScraper, PageFetcher};
use crate::storage::{SaveOutcome, save_records};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

pub struct Pipeline {
    config: AppConfig,
    sections: Vec<Section>,
    output: PathBuf,
}

impl Pipeline {
    pub fn new(config: AppConfig, sections: Vec<Section>) -> Self {
        let output = config.output.path.clone();
        Self {
            config,
            sections,
            output,
        }
    }

    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output = path;
        self
    }

    pub async fn run(&self) -> Result<PipelineStats> {
        let scraper = CatalogScraper::from_config(&self.config)
            .context("Failed to build scraper")?;
        self.run_with(&scraper).await
    }

    pub async fn run_with<F: PageFetcher>(&self, scraper: &CatalogScraper<F>) -> Result<PipelineStats> {
        let reports = scraper.scrape_all(&self.sections).await;

        for r in &reports {
            if r.stop.is_failure() {
                warn!("{} [{}]: incomplete ({})", r.label, r.key, r.stop);
            }
        }

        let stats_base = PipelineStats::from_reports(&reports);
        let records = concat_records(reports);

        let output = save_records(&self.output, &records)
            .with_context(|| format!("Failed to save {:?}", self.output))?;

        let stats = PipelineStats { output, ..stats_base };
        info!(
            "=== Done: {} sections | {} pages | {} records | {} failed ===",
            stats.sections, stats.pages_fetched, stats.records, stats.failed_sections
        );
        Ok(stats)
    }
}

/// Flatten section results in order.
pub fn concat_records(reports: Vec<SectionReport>) -> Vec<Record> {
    reports.into_iter().flat_map(|r| r.records).collect()
}

#[derive(Debug)]
pub struct PipelineStats {
    pub sections: usize,
    pub pages_fetched: u32,
    pub records: usize,
    pub failed_sections: usize,
    pub output: SaveOutcome,
}

impl PipelineStats {
    fn from_reports(reports: &[SectionReport]) -> Self {
        Self {
            sections: reports.len(),
            pages_fetched: reports.iter().map(|r| r.pages_fetched).sum(),
            records: reports.iter().map(|r| r.records.len()).sum(),
            failed_sections: reports.iter().filter(|r| r.stop.is_failure()).count(),
            output: SaveOutcome::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PaginationConfig, ScraperConfig, StrategyKind};
    use crate::models::{Flag, StopReason};
    use crate::scraper::http_client::FetchError;
    use async_trait::async_trait;
    use url::Url;

    fn record(name: &str) -> Record {
        Record {
            name: name.into(),
            url: String::new(),
            duration: "N/A".into(),
            test_type: "N/A".into(),
            remote_testing: Flag::No,
            adaptive_irt: Flag::No,
        }
    }

    fn report(key: &str, names: &[&str]) -> SectionReport {
        SectionReport {
            key: key.into(),
            label: key.into(),
            records: names.iter().map(|n| record(n)).collect(),
            pages_fetched: 1,
            stop: StopReason::NoNextLink,
        }
    }

    #[test]
    fn test_concat_preserves_section_order() {
        let reports = vec![report("prepackaged", &["p1", "p2"]), report("individual", &["i1"])];
        let records = concat_records(reports);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["p1", "p2", "i1"]);
    }

    /// Every type gets one page holding a single row named after the type.
    struct OneRowPerType;

    #[async_trait]
    impl PageFetcher for OneRowPerType {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            let ty = url
                .query_pairs()
                .find(|(k, _)| k == "type")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            Ok(format!(
                r#"<table><tr><th>h</th></tr>
                   <tr><td><a href="/t{ty}">type{ty}</a></td><td></td><td></td><td></td></tr></table>"#
            ))
        }
    }

    #[tokio::test]
    async fn test_run_writes_sections_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("catalog.csv");

        let config = AppConfig::default();
        let scraper_cfg = ScraperConfig {
            request_delay_ms: 0,
            ..ScraperConfig::default()
        };
        let pagination = PaginationConfig {
            strategy: StrategyKind::Offsets,
            ..PaginationConfig::default()
        };
        let scraper = CatalogScraper::new(OneRowPerType, &scraper_cfg, &pagination).unwrap();

        let sections = vec![
            Section::new("prepackaged", "Pre-packaged Job Solutions", 2, 1),
            Section::new("individual", "Individual Test Solutions", 1, 1),
        ];
        let stats = Pipeline::new(config, sections)
            .with_output(out.clone())
            .run_with(&scraper)
            .await
            .unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(stats.pages_fetched, 2);
        assert_eq!(stats.failed_sections, 0);
        assert_eq!(
            stats.output,
            SaveOutcome::Written {
                path: out.clone(),
                records: 2
            }
        );

        let text = std::fs::read_to_string(&out).unwrap();
        let names: Vec<_> = text.lines().skip(1).map(|l| l.split(',').next().unwrap()).collect();
        assert_eq!(names, vec!["type2", "type1"]);
    }
}
