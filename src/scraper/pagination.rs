//! Pagination strategies for catalog sections.
//!
//! A [`PageCursor`] is created per section and asked, after every page, where
//! to go next. Both strategies share the same stop rules for missing tables;
//! they differ in how the next URL is produced:
//!
//! - `FollowLinks` resolves the page's "Next" anchor against the origin and
//!   runs until there is none. A "Next" pointing at an already visited page
//!   ends the section instead of looping.
//! - `Offsets` walks `start=0, stride, 2*stride, ...` up to the section's
//!   `max_pages` and treats an empty page as end of data.

use crate::models::{Section, StopReason};
use crate::scraper::parsers::ParsedPage;
use std::collections::HashSet;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    FollowLinks,
    Offsets { stride: u32 },
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    Continue(Url),
    Stop(StopReason),
}

pub struct PageCursor {
    strategy: Pagination,
    catalog_url: Url,
    origin: Url,
    type_param: u32,
    max_pages: u32,
    pages: u32,
    visited: HashSet<Url>,
}

impl PageCursor {
    pub fn new(strategy: Pagination, catalog_url: &Url, origin: &Url, section: &Section) -> Self {
        Self {
            strategy,
            catalog_url: catalog_url.clone(),
            origin: origin.clone(),
            type_param: section.type_param,
            max_pages: section.max_pages,
            pages: 0,
            visited: HashSet::new(),
        }
    }

    /// Pages successfully fetched and handed to [`advance`](Self::advance).
    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn first(&mut self) -> NextPage {
        match self.strategy {
            Pagination::FollowLinks => {
                let url = self.listing_url(None);
                self.visited.insert(url.clone());
                NextPage::Continue(url)
            }
            Pagination::Offsets { .. } if self.max_pages == 0 => {
                NextPage::Stop(StopReason::PageLimit)
            }
            Pagination::Offsets { .. } => NextPage::Continue(self.listing_url(Some(0))),
        }
    }

    /// Decide what follows a fetched page that yielded `records` records.
    pub fn advance(&mut self, page: &ParsedPage, records: usize) -> NextPage {
        self.pages += 1;

        if !page.table_found() {
            return NextPage::Stop(StopReason::TableNotFound);
        }

        match self.strategy {
            Pagination::FollowLinks => self.follow_next(page),
            Pagination::Offsets { stride } => {
                if records == 0 {
                    return NextPage::Stop(StopReason::EmptyPage);
                }
                if self.pages >= self.max_pages {
                    return NextPage::Stop(StopReason::PageLimit);
                }
                match self.pages.checked_mul(stride) {
                    Some(start) => NextPage::Continue(self.listing_url(Some(start))),
                    None => {
                        warn!("Offset past u32 range after {} pages, stopping", self.pages);
                        NextPage::Stop(StopReason::PageLimit)
                    }
                }
            }
        }
    }

    fn follow_next(&mut self, page: &ParsedPage) -> NextPage {
        let Some(href) = page.next_href.as_deref() else {
            return NextPage::Stop(StopReason::NoNextLink);
        };
        let url = match self.origin.join(href) {
            Ok(url) => url,
            Err(e) => {
                warn!("Unusable next link {:?}: {}", href, e);
                return NextPage::Stop(StopReason::NoNextLink);
            }
        };
        if !self.visited.insert(url.clone()) {
            warn!("Next link {} was already visited", url);
            return NextPage::Stop(StopReason::LinkCycle);
        }
        NextPage::Continue(url)
    }

    /// `<catalog>?start=<n>&type=<t>` (start omitted for link-following).
    fn listing_url(&self, start: Option<u32>) -> Url {
        let mut url = self.catalog_url.clone();
        {
            let mut q = url.query_pairs_mut();
            if let Some(start) = start {
                q.append_pair("start", &start.to_string());
            }
            q.append_pair("type", &self.type_param.to_string());
        }
        url
    }
}
