//! Registry abstraction for package search and metadata.
//!
//! This module provides a unified interface over NuGet-style registries,
//! keeping the wire protocol out of the resolution pipeline so that the
//! pipeline can be tested against a mock registry.

mod nuget;

use anyhow::Result;
use async_trait::async_trait;

use crate::package::{PackageIdentity, PackageMetadata, PackageSummary};

pub use nuget::NuGetRegistry;

/// Service index of the public NuGet registry.
pub const DEFAULT_SERVICE_INDEX: &str = "https://api.nuget.org/v3/index.json";

/// Options applied to every search and count request of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchFilters {
    /// Include prerelease package versions in search results.
    pub include_prerelease: bool,
}

/// Trait for package registries.
///
/// All three operations are safe to call concurrently; callers make no
/// assumptions about request ordering.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Total number of packages matching `term`. Carries the same filters
    /// as the search it sizes.
    async fn count(&self, term: &str, filters: SearchFilters) -> Result<usize>;

    /// One page of search results. An empty page means the end of the
    /// result set; zero matches is not an error.
    async fn search(
        &self,
        term: &str,
        filters: SearchFilters,
        skip: usize,
        take: usize,
    ) -> Result<Vec<PackageSummary>>;

    /// Full metadata record for one package version. `None` means the
    /// registry cannot resolve the identity; transport failures are errors.
    async fn metadata(&self, identity: &PackageIdentity) -> Result<Option<PackageMetadata>>;
}
