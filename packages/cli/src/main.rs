#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the hydrant map.
//!
//! Runs the same resolution pipeline as the server, printing the ranked
//! hydrants to the terminal. Settings default to the same environment
//! variables the server reads; flags override them.

use std::fmt::Write as _;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hydrant_map_catalog::HydrantCatalog;
use hydrant_map_geocoder::{build_client, chain::GeocoderChain};
use hydrant_map_resolver::{AppConfig, Resolution, ResolutionPipeline};
use hydrant_map_static_map::StaticMapStyle;
use hydrant_map_static_map::renderer::{HttpMapRenderer, MapRenderer};

#[derive(Debug, Parser)]
#[command(name = "hydrant_map_cli", version, about = "Find the nearest fire hydrants to an address")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve an address and print the nearest hydrants.
    Resolve {
        /// Free-text address, including the city.
        address: String,
        /// Number of hydrants to list (overrides `NEAREST_COUNT`).
        #[arg(long)]
        k: Option<NonZeroUsize>,
        /// `GeoJSON` dataset (overrides `HYDRANTS_PATH`).
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Render the answer map and write the PNG here.
        #[arg(long)]
        map_out: Option<PathBuf>,
    },
    /// Load a dataset and report how many hydrants it holds.
    CheckCatalog {
        /// `GeoJSON` dataset (overrides `HYDRANTS_PATH`).
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();

    match cli.command {
        Command::Resolve {
            address,
            k,
            catalog,
            map_out,
        } => {
            if let Some(k) = k {
                config.resolver.nearest_count = k;
            }
            if let Some(path) = catalog {
                config.hydrants_path = path;
            }
            resolve(&config, &address, map_out.as_deref()).await?;
        }
        Command::CheckCatalog { catalog } => {
            let path = catalog.unwrap_or(config.hydrants_path);
            let catalog = HydrantCatalog::load_path(&path)?;
            println!("{}: {} hydrants", path.display(), catalog.len());
        }
    }

    Ok(())
}

async fn resolve(
    config: &AppConfig,
    address: &str,
    map_out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Arc::new(HydrantCatalog::load_path(&config.hydrants_path)?);
    let client = build_client(config.resolver.geocode_timeout)?;
    let geocoder = Arc::new(GeocoderChain::from_registry(&client));
    let pipeline = ResolutionPipeline::new(catalog, geocoder, config.resolver);

    let resolution = pipeline.resolve(address).await?;
    println!("{}", render_resolution(&resolution));

    if let Some(path) = map_out {
        let renderer = HttpMapRenderer::new(
            StaticMapStyle::default(),
            config.static_map_key.clone(),
            config.render_timeout,
        )?;
        match renderer.render(&resolution.map_request).await {
            Ok(png) => {
                std::fs::write(path, png)?;
                println!("Map written to {}", path.display());
            }
            // The list above is still a complete answer.
            Err(e) => log::error!("Failed to render map: {e}"),
        }
    }

    Ok(())
}

fn render_resolution(resolution: &Resolution) -> String {
    let location = &resolution.location;
    let mut out = format!(
        "{} ({}, {}) via {}\n\n",
        location.matched_address.as_deref().unwrap_or("<unnamed>"),
        location.coordinate.latitude(),
        location.coordinate.longitude(),
        location.provider
    );

    for entry in &resolution.entries {
        let _ = writeln!(
            out,
            "{:>3}. {:<24} {:>6} m  {}",
            entry.rank, entry.label, entry.distance_meters, entry.link_url
        );
    }

    if resolution.map_request.truncated > 0 {
        let _ = writeln!(
            out,
            "({} hydrants not shown on the map)",
            resolution.map_request.truncated
        );
    }

    if !resolution.entries.is_empty() {
        out.push('\n');
    }
    out.push_str(&resolution.caption());
    out
}

#[cfg(test)]
mod tests {
    use hydrant_map_geocoder::{GeocodedAddress, GeocodingProvider};
    use hydrant_map_hydrant_models::{Coordinate, DisplayEntry};

    use super::*;

    fn resolution(entries: Vec<DisplayEntry>) -> Resolution {
        let center = Coordinate::new(52.965, 36.063).unwrap();
        Resolution {
            location: GeocodedAddress {
                coordinate: center,
                matched_address: Some("Россия, Орёл, Комсомольская улица, 100".to_string()),
                provider: GeocodingProvider::Yandex,
            },
            map_request: hydrant_map_static_map::build(center, &[]),
            entries,
        }
    }

    #[test]
    fn lists_entries_then_caption() {
        let output = render_resolution(&resolution(vec![DisplayEntry {
            rank: 1,
            label: "ПГ-1".to_string(),
            distance_meters: 71,
            link_url: "https://yandex.ru/maps/?pt=36.061997,52.964795&z=18".to_string(),
        }]));

        assert!(output.starts_with("Россия, Орёл, Комсомольская улица, 100 (52.965, 36.063) via yandex\n"));
        assert!(output.contains("  1. ПГ-1"), "{output}");
        assert!(
            output.ends_with(
                "Ближайшие гидранты:\n[Гидрант 1 — 71 м](https://yandex.ru/maps/?pt=36.061997,52.964795&z=18)"
            ),
            "{output}"
        );
    }

    #[test]
    fn empty_answer_prints_caption_only() {
        let output = render_resolution(&resolution(Vec::new()));
        assert!(output.ends_with("\n\nРядом не найдено ни одного гидранта."), "{output}");
    }
}
