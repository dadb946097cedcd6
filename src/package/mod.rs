//! Package domain model
//!
//! This module defines the entities flowing through a resolution run:
//! search summaries, full registry metadata, declared dependencies, and
//! the resolved package records handed to the output layer.

use serde::Serialize;
use std::fmt;

/// Unique key of a package version in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    pub id: String,
    pub version: String,
}

impl PackageIdentity {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        PackageIdentity {
            id: id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

/// One search hit: just enough to decide whether the candidate is worth
/// a metadata round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageSummary {
    pub identity: PackageIdentity,
    /// Raw comma-separated tag list as the registry returned it.
    pub tags: String,
    pub description: Option<String>,
}

impl PackageSummary {
    /// True if the declared tag list contains `tag` as a whole entry,
    /// comparing case-insensitively after trimming. A blank `tag` never
    /// matches; neither does a partial entry like "umbraco-forms" for
    /// "umbraco".
    pub fn declares_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim().to_lowercase();
        if wanted.is_empty() {
            return false;
        }
        self.tags
            .split(',')
            .any(|entry| entry.trim().to_lowercase() == wanted)
    }
}

/// A dependency declared by a package: target identifier plus the raw
/// version range string from the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDependency {
    pub id: String,
    pub range: Option<String>,
}

/// Dependencies declared for one target framework.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyGroup {
    pub target_framework: Option<String>,
    pub dependencies: Vec<PackageDependency>,
}

/// Full registry record for one package version.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
    pub identity: PackageIdentity,
    pub authors: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub license_url: Option<String>,
    pub project_url: Option<String>,
    /// Raw comma-separated tag list.
    pub tags: String,
    pub download_count: Option<u64>,
    pub dependency_groups: Vec<DependencyGroup>,
}

impl PackageMetadata {
    /// Every declared dependency identifier, flattened across all
    /// target-framework groups. Duplicates across groups are yielded
    /// as-is.
    pub fn dependency_ids(&self) -> impl Iterator<Item = &str> {
        self.dependency_groups
            .iter()
            .flat_map(|group| group.dependencies.iter())
            .map(|dep| dep.id.as_str())
    }

    /// True if any declared dependency identifier starts with `prefix`.
    /// Byte-wise comparison: registry identifiers preserve their
    /// canonical casing and the platform prefixes are matched exactly.
    pub fn depends_on_prefix(&self, prefix: &str) -> bool {
        self.dependency_ids().any(|id| id.starts_with(prefix))
    }
}

/// A resolved, platform-compatible package as reported to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    pub id: String,
    pub version: String,
    pub authors: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub license_url: Option<String>,
    pub project_url: Option<String>,
    pub tags: String,
    pub download_count: Option<u64>,
}

impl From<PackageMetadata> for Package {
    fn from(meta: PackageMetadata) -> Self {
        Package {
            id: meta.identity.id,
            version: meta.identity.version,
            authors: meta.authors,
            description: meta.description,
            summary: meta.summary,
            license_url: meta.license_url,
            project_url: meta.project_url,
            tags: meta.tags,
            download_count: meta.download_count,
        }
    }
}
