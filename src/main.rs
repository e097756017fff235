// src/main.rs

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use omnitruck::platform::normalize_platform_version;
use omnitruck::{Endpoint, EndpointConfig, FilterSet, FilterSetBuilder, Metadata};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "omnitruck")]
#[command(author, version, about = "Query an Omnitruck package catalog", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, global = true, default_value = omnitruck::endpoint::DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

// Platform triple; all three or none
#[derive(Args, Debug, Clone)]
struct TargetArgs {
    /// Platform name (e.g. el, ubuntu, mac_os_x, windows)
    #[arg(short, long)]
    platform: Option<String>,

    /// Platform version as reported by the host (e.g. 6.5, 10.9.5, 6.1.7601)
    #[arg(long)]
    platform_version: Option<String>,

    /// Machine architecture (e.g. x86_64, i686)
    #[arg(short, long)]
    machine_arch: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the package matching a platform
    Metadata {
        /// Project name (e.g. chef, chef_dk)
        project: String,
        #[command(flatten)]
        target: TargetArgs,
        /// Package version to resolve
        #[arg(long, default_value = omnitruck::filters::DEFAULT_VERSION)]
        package_version: String,
        /// Include prerelease packages
        #[arg(long)]
        prerelease: bool,
        /// Include nightly packages
        #[arg(long)]
        nightlies: bool,
        /// Print JSON instead of key/value lines
        #[arg(long)]
        json: bool,
    },
    /// List the full package catalog, optionally narrowed by platform
    List {
        /// Project name (e.g. chef, chef_dk)
        project: String,
        /// Only show this platform
        #[arg(short, long)]
        platform: Option<String>,
        /// Only show this platform version (requires --platform)
        #[arg(long, requires = "platform")]
        platform_version: Option<String>,
        /// Only show this machine architecture
        #[arg(short, long)]
        machine_arch: Option<String>,
        /// Print JSON instead of one package per line
        #[arg(long)]
        json: bool,
    },
    /// Check a downloaded package against the catalog's SHA-256
    Verify {
        /// Project name (e.g. chef, chef_dk)
        project: String,
        /// Downloaded package file
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
        /// Package version the file should match
        #[arg(long, default_value = omnitruck::filters::DEFAULT_VERSION)]
        package_version: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn open_endpoint(cli: &Cli) -> Result<Endpoint> {
    let config = EndpointConfig::default()
        .with_base_url(&cli.base_url)?
        .with_timeout(Duration::from_secs(cli.timeout));
    Ok(Endpoint::new(config)?)
}

fn with_target(mut builder: FilterSetBuilder, target: TargetArgs) -> FilterSetBuilder {
    if let Some(platform) = target.platform {
        builder = builder.platform(platform);
    }
    if let Some(platform_version) = target.platform_version {
        builder = builder.platform_version(platform_version);
    }
    if let Some(machine_arch) = target.machine_arch {
        builder = builder.machine_arch(machine_arch);
    }
    builder
}

fn print_metadata(metadata: &Metadata, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(metadata)?);
    } else {
        for (key, value) in metadata.iter() {
            println!("{} {}", key, value);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Metadata {
            project,
            target,
            package_version,
            prerelease,
            nightlies,
            json,
        }) => {
            let filters = with_target(FilterSet::builder(project.as_str()), target.clone())
                .version(package_version.as_str())
                .prerelease(*prerelease)
                .nightlies(*nightlies)
                .build()?;

            let endpoint = open_endpoint(&cli)?;
            let metadata = endpoint.metadata(&filters)?;
            print_metadata(&metadata, *json)
        }
        Some(Commands::List {
            project,
            platform,
            platform_version,
            machine_arch,
            json,
        }) => {
            let filters = FilterSet::builder(project.as_str()).build()?;
            let endpoint = open_endpoint(&cli)?;
            let catalog = endpoint.catalog(&filters)?;

            // Catalog keys use the API's platform version vocabulary
            let platform_version = match (platform, platform_version) {
                (Some(p), Some(pv)) => Some(normalize_platform_version(p, pv)?),
                _ => None,
            };

            let packages: Vec<_> = catalog
                .packages()
                .into_iter()
                .filter(|e| platform.as_deref().is_none_or(|p| e.platform == p))
                .filter(|e| platform_version.as_deref().is_none_or(|pv| e.platform_version == pv))
                .filter(|e| machine_arch.as_deref().is_none_or(|m| e.machine_arch == m))
                .collect();

            if *json {
                println!("{}", serde_json::to_string_pretty(&packages)?);
            } else if packages.is_empty() {
                println!("No packages found.");
            } else {
                for entry in &packages {
                    println!(
                        "  {} {} [{}] {} {}",
                        entry.platform,
                        entry.platform_version,
                        entry.machine_arch,
                        entry.version,
                        entry.url
                    );
                }
                println!("\nTotal: {} package(s)", packages.len());
            }
            Ok(())
        }
        Some(Commands::Verify {
            project,
            file,
            target,
            package_version,
        }) => {
            let filters = with_target(FilterSet::builder(project.as_str()), target.clone())
                .version(package_version.as_str())
                .build()?;

            let endpoint = open_endpoint(&cli)?;
            let metadata = endpoint.metadata(&filters)?;
            info!("Verifying {} against {}", file.display(), metadata.filename()?);
            metadata.verify_sha256(file)?;

            println!("{}: OK ({} {})", file.display(), filters.project(), metadata.version());
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(*shell, &mut Cli::command(), "omnitruck", &mut io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("omnitruck v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'omnitruck --help' for usage information");
            Ok(())
        }
    }
}
