use crate::models::RawCatalogRow;
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

/// How the data table(s) on a catalog page are found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLocator {
    /// Every table whose heading cell contains the label.
    HeadingMatch(String),
    /// The first table on the page, heading ignored.
    FirstTable,
}

/// Everything the driver needs from one catalog page.
#[derive(Debug, Default)]
pub struct ParsedPage {
    pub title: Option<String>,
    /// Heading texts of the tables that were selected.
    pub tables: Vec<String>,
    pub rows: Vec<RawCatalogRow>,
    /// Raw `href` of the "Next" anchor, if any.
    pub next_href: Option<String>,
}

impl ParsedPage {
    pub fn table_found(&self) -> bool {
        !self.tables.is_empty()
    }
}

// ── Selectors ─────────────────────────────────────────────────────────────────

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow::anyhow!("selector {:?}: {:?}", s, e))
}

/// Compiled once, shared by every page of a run.
pub struct CatalogParser {
    table: Selector,
    heading: Selector,
    tr: Selector,
    td: Selector,
    a: Selector,
    yes_marker: Selector,
    key: Selector,
    title: Selector,
}

impl CatalogParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            table: selector("table")?,
            heading: selector("th.custom__table-heading__title")?,
            tr: selector("tr")?,
            td: selector("td")?,
            a: selector("a")?,
            yes_marker: selector(r#"span.catalogue__circle[class~="-yes"]"#)?,
            key: selector("span.product-catalogue__key")?,
            title: selector("title")?,
        })
    }

    /// Parse a full catalog page. Never fails: missing pieces stay empty.
    pub fn parse_page(&self, html: &str, locator: &TableLocator) -> ParsedPage {
        let doc = Html::parse_document(html);

        let title = doc
            .select(&self.title)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string());

        let mut page = ParsedPage {
            title,
            next_href: self.find_next_href(&doc),
            ..Default::default()
        };

        for table in self.locate_tables(&doc, locator) {
            page.tables.push(self.heading_text(table).unwrap_or_default());
            page.rows.extend(self.extract_rows(table));
        }

        page
    }

    // ── Table locator ─────────────────────────────────────────────────────────

    pub fn locate_tables<'a>(&self, doc: &'a Html, locator: &TableLocator) -> Vec<ElementRef<'a>> {
        match locator {
            TableLocator::FirstTable => doc.select(&self.table).take(1).collect(),
            TableLocator::HeadingMatch(label) => doc
                .select(&self.table)
                .filter(|table| {
                    self.heading_text(*table)
                        .is_some_and(|h| h.contains(label.as_str()))
                })
                .collect(),
        }
    }

    fn heading_text(&self, table: ElementRef) -> Option<String> {
        table
            .select(&self.heading)
            .next()
            .map(|th| th.text().collect::<String>().trim().to_string())
    }

    // ── Row extractor ─────────────────────────────────────────────────────────

    /// Header row and rows with fewer than 4 cells are skipped.
    pub fn extract_rows(&self, table: ElementRef) -> Vec<RawCatalogRow> {
        table
            .select(&self.tr)
            .skip(1)
            .filter_map(|tr| {
                let cells: Vec<ElementRef> = tr.select(&self.td).collect();
                if cells.len() < 4 {
                    return None;
                }
                Some(self.extract_row(&cells))
            })
            .collect()
    }

    fn extract_row(&self, cells: &[ElementRef]) -> RawCatalogRow {
        let link = cells[0].select(&self.a).next();

        RawCatalogRow {
            name: link.map(|a| a.text().collect::<String>().trim().to_string()),
            href: link.and_then(|a| a.value().attr("href")).map(str::to_string),
            remote_marker: cells[1].select(&self.yes_marker).next().is_some(),
            adaptive_marker: cells[2].select(&self.yes_marker).next().is_some(),
            keys: cells[3]
                .select(&self.key)
                .map(|k| k.text().collect::<String>().trim().to_string())
                .collect(),
        }
    }

    // ── Next link ─────────────────────────────────────────────────────────────

    /// `href` of the first anchor whose visible text is exactly "Next".
    /// An anchor without `href` counts as no next page.
    fn find_next_href(&self, doc: &Html) -> Option<String> {
        doc.select(&self.a)
            // Trimmed: pagination markup wraps the label in indentation whitespace.
            .find(|a| a.text().collect::<String>().trim() == "Next")
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    }
}
