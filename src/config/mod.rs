use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::Section;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default = "default_sections")]
    pub sections: Vec<Section>,
}

/// HTTP / site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Scheme + host used to absolutize catalog links.
    #[serde(default = "default_origin")]
    pub origin: String,

    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Courtesy delay between successive page fetches of a section.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Follow the "Next" anchor on every page
    Links,
    /// Step through `start=` offsets
    Offsets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    /// Tables whose heading contains the section label
    Heading,
    /// First table on the page
    First,
}

/// Pagination configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    #[serde(default = "default_strategy")]
    pub strategy: StrategyKind,

    /// Records per catalog page, used by the offset strategy.
    #[serde(default = "default_page_stride")]
    pub page_stride: u32,

    /// Table locator override; unset means the strategy's own default.
    #[serde(default)]
    pub locator: Option<LocatorKind>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_origin() -> String {
    "https://www.shl.com".to_string()
}
fn default_catalog_url() -> String {
    "https://www.shl.com/solutions/products/product-catalog/".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    1000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/91.0.4472.124 Safari/537.36".to_string()
}
fn default_strategy() -> StrategyKind {
    StrategyKind::Links
}
fn default_page_stride() -> u32 {
    12
}
fn default_output_path() -> PathBuf {
    PathBuf::from("shl_assessments.csv")
}
fn default_sections() -> Vec<Section> {
    vec![
        Section::new("prepackaged", "Pre-packaged Job Solutions", 2, 12),
        Section::new("individual", "Individual Test Solutions", 1, 32),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            pagination: PaginationConfig::default(),
            output: OutputConfig::default(),
            sections: default_sections(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            catalog_url: default_catalog_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            page_stride: default_page_stride(),
            locator: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl PaginationConfig {
    /// Locator in effect: the explicit override, else the strategy's pairing.
    pub fn effective_locator(&self) -> LocatorKind {
        self.locator.unwrap_or(match self.strategy {
            StrategyKind::Links => LocatorKind::Heading,
            StrategyKind::Offsets => LocatorKind::First,
        })
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("CATALOG").separator("__"))
            .build()
            .context("Failed to read configuration sources")?;

        let app_cfg: AppConfig = cfg
            .try_deserialize()
            .context("Invalid configuration")?;
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pagination.page_stride == 0 {
            bail!("pagination.page_stride must be greater than zero");
        }
        url::Url::parse(&self.scraper.origin)
            .with_context(|| format!("Invalid scraper.origin {:?}", self.scraper.origin))?;
        url::Url::parse(&self.scraper.catalog_url)
            .with_context(|| format!("Invalid scraper.catalog_url {:?}", self.scraper.catalog_url))?;
        Ok(())
    }

    /// Sections selected by key, in configuration order. Empty selection means all.
    pub fn select_sections(&self, keys: &[String]) -> Result<Vec<Section>> {
        if keys.is_empty() {
            return Ok(self.sections.clone());
        }
        for key in keys {
            if !self.sections.iter().any(|s| &s.key == key) {
                bail!("Unknown section {:?}", key);
            }
        }
        Ok(self
            .sections
            .iter()
            .filter(|s| keys.contains(&s.key))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_catalog() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.scraper.origin, "https://www.shl.com");
        assert_eq!(cfg.scraper.request_delay_ms, 1000);
        assert_eq!(cfg.pagination.page_stride, 12);
        assert_eq!(cfg.sections.len(), 2);
        assert_eq!(cfg.sections[0].label, "Pre-packaged Job Solutions");
        assert_eq!(cfg.sections[0].type_param, 2);
        assert_eq!(cfg.sections[1].max_pages, 32);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_effective_locator() {
        let mut p = PaginationConfig::default();
        assert_eq!(p.effective_locator(), LocatorKind::Heading);
        p.strategy = StrategyKind::Offsets;
        assert_eq!(p.effective_locator(), LocatorKind::First);
        p.locator = Some(LocatorKind::Heading);
        assert_eq!(p.effective_locator(), LocatorKind::Heading);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[pagination]\nstrategy = \"offsets\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.pagination.strategy, StrategyKind::Offsets);
        assert_eq!(cfg.pagination.page_stride, 12);
        assert_eq!(cfg.scraper.timeout_secs, 30);
        assert_eq!(cfg.sections.len(), 2);
    }

    #[test]
    fn test_select_sections() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.select_sections(&[]).unwrap().len(), 2);

        let picked = cfg.select_sections(&["individual".to_string()]).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].type_param, 1);

        assert!(cfg.select_sections(&["bogus".to_string()]).is_err());
    }

    #[test]
    fn test_zero_stride_rejected() {
        let mut cfg = AppConfig::default();
        cfg.pagination.page_stride = 0;
        assert!(cfg.validate().is_err());
    }
}
