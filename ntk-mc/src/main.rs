//! Map Catalog (ntk-mc) - catalog inspection tool
//!
//! Parses a map-catalog JSON file and prints a summary, one package, or the
//! parent chain of a package code.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ntk_mc::{MapCatalog, MapType};
use tracing::info;

/// Command-line arguments for ntk-mc
#[derive(Parser, Debug)]
#[command(name = "ntk-mc")]
#[command(about = "Inspect an NTK map catalog")]
#[command(version)]
struct Args {
    /// Catalog JSON file
    catalog: PathBuf,

    /// Show the package with this code
    #[arg(long)]
    show: Option<String>,

    /// Print the parent chain of this code
    #[arg(long)]
    parents: Option<String>,

    /// Print the direct children of this code
    #[arg(long)]
    children: Option<String>,

    /// Language for package names
    #[arg(short, long, default_value = "en")]
    language: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting NTK Map Catalog (ntk-mc) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let catalog = MapCatalog::load(&args.catalog)
        .with_context(|| format!("Failed to load {}", args.catalog.display()))?;

    if let Some(code) = &args.show {
        let map = catalog
            .find(code)
            .with_context(|| format!("No package with code {}", code))?;
        println!("{} ({})", map.display_name(&args.language), map.code);
        println!("  type:      {}", map.map_type);
        println!("  parent:    {}", map.parent_code);
        println!("  skm file:  {} ({} bytes)", map.skm_file_path, map.skm_file_size);
        println!("  zip file:  {} ({} bytes unzipped)", map.zip_file_path, map.unzipped_file_size);
        println!("  txg file:  {} ({} bytes)", map.txg_file_path, map.txg_file_size);
        println!("  download:  {} bytes", map.skm_and_zip_files_size);
        let bbox = map.bounding_box;
        println!(
            "  bbox:      lat {}..{}, long {}..{}",
            bbox.lat_min, bbox.lat_max, bbox.long_min, bbox.long_max
        );
        if let Some(region) = catalog.region_of(code) {
            println!("  region:    {}", region);
        }
    }

    if let Some(code) = &args.parents {
        let mut chain = vec![code.as_str()];
        chain.extend(catalog.ancestors(code));
        println!("{}", chain.join(" -> "));
    }

    if let Some(code) = &args.children {
        for child in catalog.children(code) {
            let name = catalog
                .find(child)
                .map(|map| map.display_name(&args.language))
                .unwrap_or("");
            println!("{}\t{}", child, name);
        }
    }

    if args.show.is_none() && args.parents.is_none() && args.children.is_none() {
        println!("{} packages", catalog.maps.len());
        for map_type in [
            MapType::Continent,
            MapType::Region,
            MapType::Country,
            MapType::State,
            MapType::City,
            MapType::Unknown,
        ] {
            println!("  {:<10}{}", map_type.as_str(), catalog.of_type(map_type).count());
        }
        println!("{} hierarchy links", catalog.map_parents.len());
        println!("{} region links", catalog.region_parents.len());
    }

    Ok(())
}
