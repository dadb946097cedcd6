//! Tag and compatibility screening of search candidates.

use anyhow::Result;
use futures_util::{StreamExt, TryStreamExt, stream};
use log::debug;

use crate::package::{PackageMetadata, PackageSummary};
use crate::registry::RegistryClient;

/// Identifier prefixes that mark a dependency as belonging to the modern
/// or the legacy platform lineage. Prefix matching is a deliberate
/// heuristic: the platform renamed its package family at the major-version
/// boundary, so the identifier prefix separates the lineages without any
/// version-range evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformPrefixes {
    pub modern: String,
    pub legacy: String,
}

impl Default for PlatformPrefixes {
    fn default() -> Self {
        PlatformPrefixes {
            modern: "Umbraco.Cms.".to_string(),
            legacy: "UmbracoCms.".to_string(),
        }
    }
}

/// How a candidate relates to the platform, judged from its declared
/// dependencies alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// Declares a modern-prefix dependency.
    Direct,
    /// Declares a legacy-prefix dependency and no modern one; definitively
    /// irrelevant and never retained for closure.
    LegacyOnly,
    /// Declares neither prefix; may still be rescued transitively.
    Undetermined,
}

/// Classify a metadata record against the platform prefixes.
pub fn classify(metadata: &PackageMetadata, prefixes: &PlatformPrefixes) -> Compatibility {
    if metadata.depends_on_prefix(&prefixes.modern) {
        Compatibility::Direct
    } else if metadata.depends_on_prefix(&prefixes.legacy) {
        Compatibility::LegacyOnly
    } else {
        Compatibility::Undetermined
    }
}

/// Keep only candidates that declare `tag` in their tag list. Search
/// matches on description and identifier text too, so this is the
/// precision gate before any metadata round-trip.
pub fn filter_by_tag(candidates: Vec<PackageSummary>, tag: &str) -> Vec<PackageSummary> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.declares_tag(tag))
        .collect()
}

/// Outcome of screening tag-matching candidates against the platform
/// prefixes.
#[derive(Debug, Default)]
pub struct Screened {
    /// Directly compatible records.
    pub direct: Vec<PackageMetadata>,
    /// Undetermined records, retained for transitive closure.
    pub pending: Vec<PackageMetadata>,
}

/// Fetch metadata for every candidate with bounded concurrency and sort
/// the records into directly-compatible and undetermined. Candidates the
/// registry cannot resolve by identity are dropped; any transport failure
/// aborts the whole screen.
pub async fn screen<C: RegistryClient>(
    registry: &C,
    candidates: Vec<PackageSummary>,
    prefixes: &PlatformPrefixes,
    concurrency: usize,
) -> Result<Screened> {
    let total = candidates.len();
    let fetches = candidates.into_iter().map(|candidate| async move {
        let metadata = registry.metadata(&candidate.identity).await?;
        Ok::<_, anyhow::Error>((candidate, metadata))
    });

    let fetched: Vec<(PackageSummary, Option<PackageMetadata>)> = stream::iter(fetches)
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let mut screened = Screened::default();
    for (candidate, metadata) in fetched {
        let Some(metadata) = metadata else {
            // Search may surface entries the registry cannot resolve by
            // identity; those are exclusions, not errors.
            debug!(
                "Dropping {}: registry has no metadata for it",
                candidate.identity
            );
            continue;
        };

        match classify(&metadata, prefixes) {
            Compatibility::Direct => screened.direct.push(metadata),
            Compatibility::Undetermined => screened.pending.push(metadata),
            Compatibility::LegacyOnly => {
                debug!(
                    "Excluding {}: depends only on the legacy platform lineage",
                    metadata.identity
                );
            }
        }
    }

    debug!(
        "Screened {} candidates: {} direct, {} undetermined",
        total,
        screened.direct.len(),
        screened.pending.len()
    );
    Ok(screened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageIdentity;
    use crate::registry::MockRegistryClient;
    use crate::test_utils::{metadata, summary};

    fn prefixes() -> PlatformPrefixes {
        PlatformPrefixes {
            modern: "NewPlatform.".to_string(),
            legacy: "OldPlatform.".to_string(),
        }
    }

    #[test]
    fn test_classify_direct() {
        let meta = metadata("A", &["NewPlatform.Core"]);
        assert_eq!(classify(&meta, &prefixes()), Compatibility::Direct);
    }

    #[test]
    fn test_classify_legacy_only() {
        let meta = metadata("C", &["OldPlatform.Core", "Newtonsoft.Json"]);
        assert_eq!(classify(&meta, &prefixes()), Compatibility::LegacyOnly);
    }

    #[test]
    fn test_classify_undetermined() {
        let meta = metadata("D", &["Some.Helper"]);
        assert_eq!(classify(&meta, &prefixes()), Compatibility::Undetermined);
    }

    #[test]
    fn test_classify_no_dependencies_is_undetermined() {
        let meta = metadata("Lone", &[]);
        assert_eq!(classify(&meta, &prefixes()), Compatibility::Undetermined);
    }

    #[test]
    fn test_classify_modern_wins_over_legacy() {
        // A package straddling both lineages still counts as compatible.
        let meta = metadata("Both", &["OldPlatform.Core", "NewPlatform.Core"]);
        assert_eq!(classify(&meta, &prefixes()), Compatibility::Direct);
    }

    #[test]
    fn test_filter_by_tag() {
        let candidates = vec![
            summary("A", "umbraco,cms"),
            summary("B", "aspnet"),
            summary("C", " Umbraco "),
            summary("D", ""),
        ];

        let kept = filter_by_tag(candidates, "umbraco");
        let ids: Vec<&str> = kept.iter().map(|c| c.identity.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    fn mock_with_records(records: Vec<(&'static str, Option<Vec<&'static str>>)>) -> MockRegistryClient {
        let mut mock = MockRegistryClient::new();
        mock.expect_metadata().returning(move |identity| {
            let record = records
                .iter()
                .find(|(id, _)| *id == identity.id)
                .and_then(|(id, deps)| deps.as_ref().map(|deps| metadata(id, deps)));
            Ok(record)
        });
        mock
    }

    #[test_log::test(tokio::test)]
    async fn test_screen_splits_candidates() {
        let mock = mock_with_records(vec![
            ("Direct", Some(vec!["NewPlatform.Web"])),
            ("Legacy", Some(vec!["OldPlatform.Core"])),
            ("Maybe", Some(vec!["Some.Helper"])),
        ]);

        let candidates = vec![
            summary("Direct", "umbraco"),
            summary("Legacy", "umbraco"),
            summary("Maybe", "umbraco"),
        ];

        let screened = screen(&mock, candidates, &prefixes(), 2).await.unwrap();

        let direct: Vec<&str> = screened.direct.iter().map(|m| m.identity.id.as_str()).collect();
        let pending: Vec<&str> = screened.pending.iter().map(|m| m.identity.id.as_str()).collect();
        assert_eq!(direct, vec!["Direct"]);
        assert_eq!(pending, vec!["Maybe"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_screen_drops_unresolvable_candidates() {
        let mock = mock_with_records(vec![
            ("Direct", Some(vec!["NewPlatform.Web"])),
            ("Ghost", None),
        ]);

        let candidates = vec![summary("Direct", "umbraco"), summary("Ghost", "umbraco")];
        let screened = screen(&mock, candidates, &prefixes(), 2).await.unwrap();

        assert_eq!(screened.direct.len(), 1);
        assert!(screened.pending.is_empty());
    }

    #[tokio::test]
    async fn test_screen_propagates_transport_failure() {
        let mut mock = MockRegistryClient::new();
        mock.expect_metadata().returning(|identity| {
            if identity.id == "Broken" {
                anyhow::bail!("connection reset")
            }
            Ok(Some(metadata(&identity.id, &[])))
        });

        let candidates = vec![summary("Fine", "umbraco"), summary("Broken", "umbraco")];
        let result = screen(&mock, candidates, &prefixes(), 2).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_screen_with_no_candidates() {
        let mock = MockRegistryClient::new();
        let screened = screen(&mock, vec![], &prefixes(), 4).await.unwrap();
        assert!(screened.direct.is_empty());
        assert!(screened.pending.is_empty());
    }

    #[tokio::test]
    async fn test_screen_fetches_each_candidate_once() {
        let mut mock = MockRegistryClient::new();
        mock.expect_metadata()
            .times(3)
            .returning(|identity| Ok(Some(metadata(&identity.id, &["NewPlatform.Web"]))));

        let candidates = vec![
            summary("One", "umbraco"),
            summary("Two", "umbraco"),
            summary("Three", "umbraco"),
        ];
        let screened = screen(&mock, candidates, &prefixes(), 8).await.unwrap();
        assert_eq!(screened.direct.len(), 3);
    }

    #[test]
    fn test_default_prefixes_follow_platform_rename() {
        let defaults = PlatformPrefixes::default();
        let modern = metadata("M", &["Umbraco.Cms.Core"]);
        let legacy = metadata("L", &["UmbracoCms.Web"]);
        assert_eq!(classify(&modern, &defaults), Compatibility::Direct);
        assert_eq!(classify(&legacy, &defaults), Compatibility::LegacyOnly);
    }
}
