//! Offline extraction from saved catalog pages.

use crate::models::Record;
use crate::scraper::cleaner::clean_catalog_rows;
use crate::scraper::parsers::{CatalogParser, TableLocator};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

/// `*.html` / `*.htm` files in `dir`, sorted by file name.
pub fn discover_html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() && is_html(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Run table location + row extraction over every saved page, in file order.
/// Unreadable files are skipped.
pub fn extract_dir(dir: &Path, locator: &TableLocator, origin: &str) -> Result<Vec<Record>> {
    let parser = CatalogParser::new()?;
    let files = discover_html_files(dir)?;
    info!("Found {} HTML files in {:?}", files.len(), dir);

    let mut records = Vec::new();
    for path in &files {
        let html = match std::fs::read_to_string(path) {
            Ok(html) => html,
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let page = parser.parse_page(&html, locator);
        if !page.table_found() {
            warn!("{:?}: no matching table", path);
            continue;
        }

        let page_records = clean_catalog_rows(page.rows, origin);
        debug!("{:?}: {} records", path, page_records.len());
        records.extend(page_records);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(heading: &str, name: &str) -> String {
        format!(
            r#"<table><tr><th class="custom__table-heading__title">{heading}</th></tr>
               <tr><td><a href="/{name}">{name}</a></td><td></td><td></td><td></td></tr></table>"#
        )
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_html_files(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_extract_dir_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("02.html"), page("Individual Test Solutions", "two")).unwrap();
        std::fs::write(dir.path().join("01.htm"), page("Individual Test Solutions", "one")).unwrap();
        std::fs::write(dir.path().join("03.html"), page("Pre-packaged Job Solutions", "skip")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let locator = TableLocator::HeadingMatch("Individual Test Solutions".into());
        let records = extract_dir(dir.path(), &locator, "https://www.shl.com").unwrap();

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
        assert_eq!(records[0].url, "https://www.shl.com/one");
        assert_eq!(records[0].test_type, "N/A");
    }
}
