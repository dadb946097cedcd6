use anyhow::Result;
use log::debug;

use crate::package::Package;
use crate::registry::RegistryClient;
use crate::resolver::{PackageResolver, ResolverOptions};

use super::{connect_registry, truncate};

/// Widest description shown per package row.
const DESCRIPTION_WIDTH: usize = 50;

/// Resolve every package compatible with the modern platform lineage and
/// print the result.
#[tracing::instrument(skip(options))]
pub async fn resolve(
    service_index: &str,
    tag: &str,
    options: ResolverOptions,
    json: bool,
) -> Result<()> {
    let registry = connect_registry(service_index).await?;
    run(registry, tag, options, json).await
}

#[tracing::instrument(skip(registry, options))]
pub(crate) async fn run<C: RegistryClient>(
    registry: C,
    tag: &str,
    options: ResolverOptions,
    json: bool,
) -> Result<()> {
    debug!("Resolving tag '{}' with {:?}", tag, options);
    let resolver = PackageResolver::new(registry, options);
    let packages = resolver.resolve(tag).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    if packages.is_empty() {
        println!("No compatible packages found for '{}'.", tag);
        return Ok(());
    }

    println!("Number of packages retrieved: {}", packages.len());
    for package in &packages {
        print_package(package);
    }

    Ok(())
}

fn print_package(package: &Package) {
    println!(" - {} {}", package.id, package.version);
    println!(
        "      Description: {}",
        truncate(
            package.description.as_deref().unwrap_or(""),
            DESCRIPTION_WIDTH
        )
    );
    println!("      Authors: {}", package.authors);
    println!("      Tags: {}", package.tags);
    println!();
}
