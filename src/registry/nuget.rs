//! NuGet v3 registry implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use crate::http::HttpClient;
use crate::package::{
    DependencyGroup, PackageDependency, PackageIdentity, PackageMetadata, PackageSummary,
};

use super::{RegistryClient, SearchFilters};

/// Service index resource kind of the search endpoint.
const SEARCH_RESOURCE: &str = "SearchQueryService";

/// Service index resource kind of the registration (metadata) base URL.
const REGISTRATION_RESOURCE: &str = "RegistrationsBaseUrl";

/// SemVer level sent with every search request; 2.0.0 makes the registry
/// return packages with SemVer 2 version strings instead of hiding them.
const SEMVER_LEVEL: &str = "2.0.0";

/// NuGet v3 API response types (internal).
mod api {
    use serde::{Deserialize, Deserializer};

    /// Deserialize a string that may be null as empty string
    fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        Ok(opt.unwrap_or_default())
    }

    /// Deserialize a tag field that may be an array of strings, a bare
    /// comma-separated string, or null, into the raw comma-separated form.
    fn deserialize_tag_list<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum TagList {
            Many(Vec<String>),
            One(String),
        }

        let tags: Option<TagList> = Option::deserialize(deserializer)?;
        Ok(match tags {
            Some(TagList::Many(tags)) => tags.join(","),
            Some(TagList::One(tags)) => tags,
            None => String::new(),
        })
    }

    #[derive(Deserialize, Debug)]
    pub struct ServiceIndex {
        #[serde(default)]
        pub resources: Vec<Resource>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Resource {
        #[serde(rename = "@id")]
        pub url: String,
        #[serde(rename = "@type")]
        pub kind: String,
    }

    impl ServiceIndex {
        /// First resource whose `@type` is `kind` or a versioned `kind/x.y.z`.
        pub fn resource_url(&self, kind: &str) -> Option<&str> {
            let versioned = format!("{}/", kind);
            self.resources
                .iter()
                .find(|r| r.kind == kind || r.kind.starts_with(&versioned))
                .map(|r| r.url.as_str())
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct SearchResponse {
        #[serde(rename = "totalHits", default)]
        pub total_hits: usize,
        #[serde(default)]
        pub data: Vec<SearchHit>,
    }

    #[derive(Deserialize, Debug)]
    pub struct SearchHit {
        pub id: String,
        pub version: String,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default, deserialize_with = "deserialize_tag_list")]
        pub tags: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct RegistrationIndex {
        #[serde(default)]
        pub items: Vec<RegistrationPage>,
    }

    /// One page of a registration index. Pages either inline their leaves
    /// or carry only the `@id` to fetch them from.
    #[derive(Deserialize, Debug)]
    pub struct RegistrationPage {
        #[serde(rename = "@id")]
        pub url: String,
        #[serde(default)]
        pub items: Option<Vec<RegistrationLeaf>>,
    }

    #[derive(Deserialize, Debug)]
    pub struct RegistrationLeaf {
        #[serde(rename = "catalogEntry")]
        pub catalog_entry: CatalogEntry,
    }

    #[derive(Deserialize, Debug)]
    pub struct CatalogEntry {
        pub id: String,
        pub version: String,
        #[serde(default, deserialize_with = "deserialize_nullable_string")]
        pub authors: String,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub summary: Option<String>,
        #[serde(rename = "licenseUrl", default)]
        pub license_url: Option<String>,
        #[serde(rename = "projectUrl", default)]
        pub project_url: Option<String>,
        #[serde(default, deserialize_with = "deserialize_tag_list")]
        pub tags: String,
        #[serde(rename = "dependencyGroups", default)]
        pub dependency_groups: Vec<DependencyGroup>,
    }

    #[derive(Deserialize, Debug)]
    pub struct DependencyGroup {
        #[serde(rename = "targetFramework", default)]
        pub target_framework: Option<String>,
        #[serde(default)]
        pub dependencies: Vec<Dependency>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Dependency {
        pub id: String,
        #[serde(default)]
        pub range: Option<String>,
    }
}

/// Client for a NuGet v3 registry, bound to its search and registration
/// endpoints.
#[derive(Debug)]
pub struct NuGetRegistry {
    http_client: HttpClient,
    search_url: String,
    registration_url: String,
}

impl NuGetRegistry {
    /// Discover the search and registration endpoints from a service index
    /// and bind a client to them.
    pub async fn connect(http_client: HttpClient, service_index_url: &str) -> Result<Self> {
        debug!(
            "Discovering registry endpoints from {}...",
            service_index_url
        );

        let index: api::ServiceIndex = http_client
            .get_json(service_index_url)
            .await
            .with_context(|| format!("Failed to read service index at {}", service_index_url))?;

        let search_url = index
            .resource_url(SEARCH_RESOURCE)
            .with_context(|| {
                format!(
                    "Service index at {} exposes no {} resource",
                    service_index_url, SEARCH_RESOURCE
                )
            })?
            .to_string();

        let registration_url = index
            .resource_url(REGISTRATION_RESOURCE)
            .with_context(|| {
                format!(
                    "Service index at {} exposes no {} resource",
                    service_index_url, REGISTRATION_RESOURCE
                )
            })?
            .to_string();

        debug!(
            "Using search endpoint {} and registration base {}",
            search_url, registration_url
        );

        Ok(Self::with_endpoints(
            http_client,
            &search_url,
            &registration_url,
        ))
    }

    /// Bind a client to known endpoints, skipping service index discovery.
    pub fn with_endpoints(
        http_client: HttpClient,
        search_url: &str,
        registration_url: &str,
    ) -> Self {
        Self {
            http_client,
            search_url: search_url.to_string(),
            registration_url: registration_url.trim_end_matches('/').to_string(),
        }
    }

    async fn query(
        &self,
        term: &str,
        filters: SearchFilters,
        skip: usize,
        take: usize,
    ) -> Result<api::SearchResponse> {
        debug!(
            "Searching {} for '{}' (skip {}, take {}, prerelease {})...",
            self.search_url, term, skip, take, filters.include_prerelease
        );

        self.http_client
            .get_json_with_query(
                &self.search_url,
                &[
                    ("q", term),
                    ("skip", &skip.to_string()),
                    ("take", &take.to_string()),
                    (
                        "prerelease",
                        if filters.include_prerelease {
                            "true"
                        } else {
                            "false"
                        },
                    ),
                    ("semVerLevel", SEMVER_LEVEL),
                ],
            )
            .await
    }
}

#[async_trait]
impl RegistryClient for NuGetRegistry {
    async fn count(&self, term: &str, filters: SearchFilters) -> Result<usize> {
        // take=0 returns no hits but still reports the total
        let response = self.query(term, filters, 0, 0).await?;
        debug!(
            "Registry reports {} matches for '{}'",
            response.total_hits, term
        );
        Ok(response.total_hits)
    }

    async fn search(
        &self,
        term: &str,
        filters: SearchFilters,
        skip: usize,
        take: usize,
    ) -> Result<Vec<PackageSummary>> {
        let response = self.query(term, filters, skip, take).await?;
        Ok(response.data.into_iter().map(Into::into).collect())
    }

    async fn metadata(&self, identity: &PackageIdentity) -> Result<Option<PackageMetadata>> {
        let url = format!(
            "{}/{}/index.json",
            self.registration_url,
            identity.id.to_lowercase()
        );
        debug!("Fetching registration index from {}...", url);

        let Some(index) = self
            .http_client
            .get_json_optional::<api::RegistrationIndex>(&url)
            .await?
        else {
            debug!("No registration index for {}", identity.id);
            return Ok(None);
        };

        for page in index.items {
            let leaves = match page.items {
                Some(leaves) => leaves,
                None => {
                    debug!("Following registration page {}...", page.url);
                    let page: api::RegistrationPage =
                        self.http_client.get_json(&page.url).await?;
                    page.items.unwrap_or_default()
                }
            };

            for leaf in leaves {
                if leaf
                    .catalog_entry
                    .version
                    .eq_ignore_ascii_case(&identity.version)
                {
                    return Ok(Some(leaf.catalog_entry.into()));
                }
            }
        }

        debug!("No registration entry for {}", identity);
        Ok(None)
    }
}

impl From<api::SearchHit> for PackageSummary {
    fn from(hit: api::SearchHit) -> Self {
        PackageSummary {
            identity: PackageIdentity::new(hit.id, hit.version),
            tags: hit.tags,
            description: hit.description,
        }
    }
}

impl From<api::CatalogEntry> for PackageMetadata {
    fn from(entry: api::CatalogEntry) -> Self {
        PackageMetadata {
            identity: PackageIdentity::new(entry.id, entry.version),
            authors: entry.authors,
            description: entry.description,
            summary: entry.summary,
            license_url: entry.license_url,
            project_url: entry.project_url,
            tags: entry.tags,
            // Registration documents do not carry download counts
            download_count: None,
            dependency_groups: entry
                .dependency_groups
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

impl From<api::DependencyGroup> for DependencyGroup {
    fn from(group: api::DependencyGroup) -> Self {
        DependencyGroup {
            target_framework: group.target_framework,
            dependencies: group.dependencies.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<api::Dependency> for PackageDependency {
    fn from(dep: api::Dependency) -> Self {
        PackageDependency {
            id: dep.id,
            range: dep.range,
        }
    }
}
