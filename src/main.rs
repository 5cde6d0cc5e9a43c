mod config;
mod loader;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{AppConfig, LocatorKind, StrategyKind};
use crate::pipeline::Pipeline;
use crate::scraper::parsers::TableLocator;
use crate::storage::{SaveOutcome, save_records};

#[derive(Parser)]
#[command(name = "catalog-scraper", about = "Product catalog table scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape the configured catalog sections and write them to CSV
    Scrape {
        /// Pagination strategy (overrides config)
        #[arg(long, value_enum)]
        strategy: Option<StrategyKind>,

        /// Table locator (overrides config)
        #[arg(long, value_enum)]
        locator: Option<LocatorKind>,

        /// Output CSV path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only scrape these section keys (repeatable; default: all)
        #[arg(short, long = "section")]
        sections: Vec<String>,
    },

    /// Extract records from saved HTML pages instead of the live site
    Extract {
        /// Directory containing saved .html pages
        #[arg(short, long)]
        dir: PathBuf,

        /// Section heading to match (ignored with --locator first)
        #[arg(short, long)]
        label: String,

        #[arg(long, value_enum, default_value = "heading")]
        locator: LocatorKind,

        /// Output CSV path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configured sections and pagination settings
    Sections,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "catalog_scraper=info,warn",
        1 => "catalog_scraper=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Scrape {
            strategy,
            locator,
            output,
            sections,
        } => {
            let _t = utils::Timer::start("Catalog scrape");
            if let Some(strategy) = strategy {
                config.pagination.strategy = strategy;
            }
            if locator.is_some() {
                config.pagination.locator = locator;
            }

            let selected = config.select_sections(&sections)?;
            let mut pipeline = Pipeline::new(config, selected);
            if let Some(path) = output {
                pipeline = pipeline.with_output(path);
            }

            let stats = pipeline.run().await?;
            match &stats.output {
                SaveOutcome::Written { path, records } => {
                    info!("Saved {} records to {:?}", utils::fmt_count(*records), path)
                }
                SaveOutcome::Empty => info!("No records collected; nothing written"),
            }
        }

        Command::Extract {
            dir,
            label,
            locator,
            output,
        } => {
            let _t = utils::Timer::start("Offline extract");
            let locator = match locator {
                LocatorKind::Heading => TableLocator::HeadingMatch(label),
                LocatorKind::First => TableLocator::FirstTable,
            };
            let origin = config.scraper.origin.trim_end_matches('/');
            let records = loader::extract_dir(&dir, &locator, origin)?;
            let path = output.unwrap_or(config.output.path);
            save_records(&path, &records)?;
        }

        Command::Sections => {
            let p = &config.pagination;
            println!("─────────────────────────────────");
            println!("  Catalog: {}", config.scraper.catalog_url);
            println!("  Strategy: {:?} (stride {}, locator {:?})", p.strategy, p.page_stride, p.effective_locator());
            println!("  Delay   : {} ms", config.scraper.request_delay_ms);
            println!("─────────────────────────────────");
            for s in &config.sections {
                println!("  {:<12} type={:<3} max_pages={:<4} {}", s.key, s.type_param, s.max_pages, s.label);
            }
        }
    }

    Ok(())
}
