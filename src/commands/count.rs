use anyhow::Result;

use crate::registry::{RegistryClient, SearchFilters};

use super::connect_registry;

/// Show the total number of raw search matches for a tag.
#[tracing::instrument]
pub async fn count(service_index: &str, tag: &str, filters: SearchFilters) -> Result<()> {
    let registry = connect_registry(service_index).await?;
    run(&registry, tag, filters).await
}

#[tracing::instrument(skip(registry))]
pub(crate) async fn run<C: RegistryClient>(
    registry: &C,
    tag: &str,
    filters: SearchFilters,
) -> Result<()> {
    let total = registry.count(tag, filters).await?;
    println!("Total number of packages found: {}", total);
    Ok(())
}
