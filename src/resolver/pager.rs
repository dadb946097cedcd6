//! Paginated search across the full result set of a term.

use anyhow::{Result, bail};
use futures_util::{StreamExt, TryStreamExt, stream};
use log::debug;
use std::collections::BTreeMap;

use crate::package::PackageSummary;
use crate::registry::{RegistryClient, SearchFilters};

/// Upper bound on sequential pages before the exhaustive strategy gives up.
/// A registry that keeps returning full pages past this point is broken,
/// and truncating silently would under-report compatible packages.
const MAX_PAGES: usize = 1000;

/// How the pager learns where the result set ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingStrategy {
    /// One preliminary count request, then a concurrent fan-out over
    /// ceil(total / page_size) pages.
    Counted,
    /// Sequential pages until an empty or short page, for registries whose
    /// count metadata is unreliable.
    Exhaustive,
}

/// Drives paginated search calls and merges the pages into a deduplicated
/// candidate set.
pub struct SearchPager {
    page_size: usize,
    concurrency: usize,
    strategy: PagingStrategy,
}

impl SearchPager {
    pub fn new(page_size: usize, concurrency: usize, strategy: PagingStrategy) -> Self {
        SearchPager {
            page_size: page_size.max(1),
            concurrency: concurrency.max(1),
            strategy,
        }
    }

    /// Collect every summary the registry returns for `term`, deduplicated
    /// by identifier. Any page failure fails the whole collection; a
    /// partial candidate set would silently under-report.
    pub async fn collect<C: RegistryClient>(
        &self,
        registry: &C,
        term: &str,
        filters: SearchFilters,
    ) -> Result<Vec<PackageSummary>> {
        let pages = match self.strategy {
            PagingStrategy::Counted => self.collect_counted(registry, term, filters).await?,
            PagingStrategy::Exhaustive => self.collect_exhaustive(registry, term, filters).await?,
        };

        // A package can straddle page boundaries when the registry index
        // shifts between requests; last writer wins.
        let mut by_id = BTreeMap::new();
        for summary in pages.into_iter().flatten() {
            by_id.insert(summary.identity.id.clone(), summary);
        }

        Ok(by_id.into_values().collect())
    }

    async fn collect_counted<C: RegistryClient>(
        &self,
        registry: &C,
        term: &str,
        filters: SearchFilters,
    ) -> Result<Vec<Vec<PackageSummary>>> {
        let total = registry.count(term, filters).await?;
        let pages = total.div_ceil(self.page_size);
        debug!(
            "Registry reports {} matches for '{}'; fetching {} pages",
            total, term, pages
        );

        let requests = (0..pages).map(|page| {
            let skip = page * self.page_size;
            async move { registry.search(term, filters, skip, self.page_size).await }
        });

        stream::iter(requests)
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn collect_exhaustive<C: RegistryClient>(
        &self,
        registry: &C,
        term: &str,
        filters: SearchFilters,
    ) -> Result<Vec<Vec<PackageSummary>>> {
        let mut pages = Vec::new();
        let mut skip = 0;

        for _ in 0..MAX_PAGES {
            debug!("Fetching search page for '{}' at offset {}...", term, skip);
            let page = registry.search(term, filters, skip, self.page_size).await?;

            let len = page.len();
            if len == 0 {
                return Ok(pages);
            }

            pages.push(page);
            if len < self.page_size {
                return Ok(pages);
            }
            skip += self.page_size;
        }

        bail!(
            "Search for '{}' did not terminate within {} pages",
            term,
            MAX_PAGES
        )
    }
}
