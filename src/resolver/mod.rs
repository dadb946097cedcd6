//! Compatible-package resolution pipeline.
//!
//! One resolution run flows left to right: paginated search, tag precision
//! filter, concurrent metadata screening, transitive closure over the
//! undetermined records, and a final deterministic aggregation. The run
//! owns all of its intermediate state; nothing survives across runs.

mod aggregate;
mod closure;
mod filter;
mod pager;

use anyhow::Result;
use log::{debug, info};
use std::collections::HashSet;

use crate::package::Package;
use crate::registry::{RegistryClient, SearchFilters};

use closure::WorkingSet;
use filter::{filter_by_tag, screen};
use pager::SearchPager;

pub use filter::{Compatibility, PlatformPrefixes, classify};
pub use pager::PagingStrategy;

/// Default search page size.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default bound on concurrent registry requests per stage.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Tuning knobs of a resolution run, read-only once the run starts.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub page_size: usize,
    pub concurrency: usize,
    pub paging: PagingStrategy,
    pub prefixes: PlatformPrefixes,
    pub filters: SearchFilters,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            paging: PagingStrategy::Counted,
            prefixes: PlatformPrefixes::default(),
            filters: SearchFilters::default(),
        }
    }
}

/// Discovers every package compatible with the modern platform lineage,
/// directly or through other compatible packages.
pub struct PackageResolver<C: RegistryClient> {
    registry: C,
    options: ResolverOptions,
}

impl<C: RegistryClient> PackageResolver<C> {
    pub fn new(registry: C, options: ResolverOptions) -> Self {
        PackageResolver { registry, options }
    }

    /// Run one full resolution for `tag` and return the ordered result.
    /// Any transport failure aborts the run with no partial result;
    /// dropping the returned future cancels all in-flight requests.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, tag: &str) -> Result<Vec<Package>> {
        let pager = SearchPager::new(
            self.options.page_size,
            self.options.concurrency,
            self.options.paging,
        );
        let candidates = pager
            .collect(&self.registry, tag, self.options.filters)
            .await?;
        info!("Search returned {} candidates for '{}'", candidates.len(), tag);

        let tagged = filter_by_tag(candidates, tag);
        debug!("{} candidates declare the tag '{}'", tagged.len(), tag);

        let screened = screen(
            &self.registry,
            tagged,
            &self.options.prefixes,
            self.options.concurrency,
        )
        .await?;

        let accepted: HashSet<String> = screened
            .direct
            .iter()
            .map(|record| record.identity.id.clone())
            .collect();
        let promoted = WorkingSet::new(accepted, screened.pending).expand();
        info!(
            "{} directly compatible, {} rescued transitively",
            screened.direct.len(),
            promoted.len()
        );

        Ok(aggregate::finalize(screened.direct, promoted))
    }
}
