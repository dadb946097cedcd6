use anyhow::Result;
use clap::Parser;
use nuscout::registry::{DEFAULT_SERVICE_INDEX, SearchFilters};
use nuscout::resolver::{
    DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE, PagingStrategy, PlatformPrefixes, ResolverOptions,
};

/// nuscout - compatible-package discovery for NuGet-style registries
///
/// Searches a registry for packages carrying an identifying tag and reports
/// every one that works with the modern platform lineage, including packages
/// that reach the platform only through their own dependencies.
///
/// Examples:
///   nuscout resolve             # Resolve packages tagged "umbraco"
///   nuscout count umbraco       # Show the raw number of search matches
#[derive(Parser, Debug)]
#[command(author, version = env!("NUSCOUT_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry service index URL (also via NUSCOUT_SERVICE_INDEX)
    #[arg(
        long = "service-index",
        env = "NUSCOUT_SERVICE_INDEX",
        value_name = "URL",
        default_value = DEFAULT_SERVICE_INDEX,
        global = true
    )]
    pub service_index: String,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Resolve every package compatible with the modern platform lineage
    Resolve(ResolveArgs),

    /// Show the total number of raw search matches for a tag
    Count(CountArgs),
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Identifying tag a package must declare to be considered
    #[arg(value_name = "TAG", default_value = "umbraco")]
    pub tag: String,

    /// Search page size
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Bound on concurrent registry requests per stage
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Page until an empty page instead of trusting the reported total
    #[arg(long)]
    pub exhaustive: bool,

    /// Include prerelease packages
    #[arg(long)]
    pub prerelease: bool,

    /// Dependency prefix marking a package directly compatible
    #[arg(long, value_name = "PREFIX")]
    pub modern_prefix: Option<String>,

    /// Dependency prefix marking a package legacy-only
    #[arg(long, value_name = "PREFIX")]
    pub legacy_prefix: Option<String>,

    /// Print the resolved packages as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct CountArgs {
    /// Identifying tag to count raw search matches for
    #[arg(value_name = "TAG", default_value = "umbraco")]
    pub tag: String,

    /// Include prerelease packages
    #[arg(long)]
    pub prerelease: bool,
}

fn resolver_options(args: &ResolveArgs) -> ResolverOptions {
    let mut prefixes = PlatformPrefixes::default();
    if let Some(ref modern) = args.modern_prefix {
        prefixes.modern = modern.clone();
    }
    if let Some(ref legacy) = args.legacy_prefix {
        prefixes.legacy = legacy.clone();
    }

    ResolverOptions {
        page_size: args.page_size,
        concurrency: args.concurrency,
        paging: if args.exhaustive {
            PagingStrategy::Exhaustive
        } else {
            PagingStrategy::Counted
        },
        prefixes,
        filters: SearchFilters {
            include_prerelease: args.prerelease,
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve(args) => {
            let options = resolver_options(&args);
            nuscout::commands::resolve(&cli.service_index, &args.tag, options, args.json).await?
        }
        Commands::Count(args) => {
            let filters = SearchFilters {
                include_prerelease: args.prerelease,
            };
            nuscout::commands::count(&cli.service_index, &args.tag, filters).await?
        }
    }
    Ok(())
}
