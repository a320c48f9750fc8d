//! depomap CLI - depot coverage maps

mod config;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use depomap_algorithms::coverage::{compute_rings, AnchorSource, CoverageResult, DepotSelection};
use depomap_algorithms::dashboard::{Dashboard, ZOOM_OUT_FACTOR};
use depomap_algorithms::export::a3_layout;
use depomap_algorithms::input::{validate_count, validate_radius, MapView};
use depomap_algorithms::svg::{render_plan, render_rings};
use depomap_cloud::blocking::{load_basemap, AttributeSyncBlocking};
use depomap_cloud::{AttributeValue, Collection, StoreConfig, SupabaseStore, SyncStatus};
use depomap_colormap::Rgb;
use depomap_core::io::BaseMap;
use depomap_core::{GeoPoint, Viewport, WebMercator};

use crate::config::DashboardConfig;

/// Side of the square Web Mercator plane used for the world view.
const WORLD_PLANE_SIZE: f64 = 4096.0;
/// Padding around the rings when framing the world view.
const WORLD_FRAME_PADDING: f64 = 0.05;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "depomap")]
#[command(author, version, about = "Depot coverage maps", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dashboard configuration (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// Attribute store project URL
    #[arg(long, global = true, env = "DEPOMAP_STORE_URL")]
    store_url: Option<String>,

    /// Attribute store API key
    #[arg(long, global = true, env = "DEPOMAP_STORE_KEY", hide_env_values = true)]
    store_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the province map with coverage rings, fills and labels
    Render {
        /// Base map SVG (path or http(s) URL)
        map: String,
        /// Output SVG file
        output: PathBuf,
        /// Depots to draw, in color order (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<String>,
        /// Global coverage radius in km
        #[arg(short, long)]
        radius: Option<f64>,
        /// Hide region names and store counts
        #[arg(long)]
        no_labels: bool,
        /// Do not read counts, colors or radii from the store
        #[arg(long)]
        offline: bool,
    },
    /// Compute coverage rings only
    Rings {
        /// Output file (SVG, or JSON with --json)
        output: PathBuf,
        /// Base map for the province view
        #[arg(short, long, required_unless_present = "world")]
        map: Option<String>,
        /// Use depot coordinates on a Web Mercator world map
        #[arg(long)]
        world: bool,
        /// Depots to draw, in color order (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<String>,
        /// Global coverage radius in km
        #[arg(short, long)]
        radius: Option<f64>,
        /// Write a JSON ring summary instead of SVG
        #[arg(long)]
        json: bool,
    },
    /// Store counts per city
    Counts {
        #[command(subcommand)]
        action: AttributeAction,
    },
    /// Region fill colors per city
    Colors {
        #[command(subcommand)]
        action: AttributeAction,
    },
    /// Coverage radius per depot
    Radii {
        #[command(subcommand)]
        action: AttributeAction,
    },
    /// Seed empty store tables with every province
    Init,
    /// Show the A3 print layout for a base map
    Layout {
        /// Base map SVG (path or http(s) URL)
        map: String,
    },
}

#[derive(Subcommand)]
enum AttributeAction {
    /// List stored values
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store one value under a city's display name
    Set {
        /// City display name, e.g. "İzmir" or "İstanbul - AVR"
        city: String,
        value: String,
    },
    /// Delete every stored value
    Clear,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_map(source: &str) -> Result<BaseMap> {
    let pb = spinner("Loading base map...");
    let map = load_basemap(source).with_context(|| format!("Failed to load base map {source}"));
    pb.finish_and_clear();
    let map = map?;
    info!("Base map: {} regions", map.regions.len());
    Ok(map)
}

fn write_output(contents: &str, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    let written = std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()));
    pb.finish_and_clear();
    written
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

type Store = AttributeSyncBlocking<SupabaseStore>;

/// Store client from flags or environment, `None` when neither is set.
fn open_store(args: &StoreArgs) -> Result<Option<Store>> {
    match (&args.store_url, &args.store_key) {
        (None, None) => Ok(None),
        (Some(url), Some(key)) => {
            let config = StoreConfig::new(url.as_str(), key.as_str()).context("Invalid store settings")?;
            Ok(Some(AttributeSyncBlocking::connect(config).context("Failed to create store client")?))
        }
        _ => bail!("Both --store-url and --store-key (or DEPOMAP_STORE_URL and DEPOMAP_STORE_KEY) are required"),
    }
}

fn require_store(args: &StoreArgs) -> Result<Store> {
    open_store(args)?.context("No attribute store configured (set DEPOMAP_STORE_URL and DEPOMAP_STORE_KEY)")
}

fn warn_if_stale(store: &Store) {
    if store.status() == SyncStatus::Stale {
        warn!("Attribute store unavailable; stored data may be missing");
    }
}

/// Parse a value typed for `collection`, rejecting invalid input.
fn parse_value(collection: Collection, raw: &str) -> Result<AttributeValue> {
    let value = match collection {
        Collection::StoreCounts => {
            let n: f64 = raw.trim().parse().with_context(|| format!("Not a number: {raw}"))?;
            AttributeValue::Count(validate_count(n)?)
        }
        Collection::Colors => AttributeValue::Color(Rgb::from_hex(raw)?),
        Collection::Radii => {
            let r: f64 = raw.trim().parse().with_context(|| format!("Not a number: {raw}"))?;
            AttributeValue::Radius(validate_radius(MapView::Turkey, r)?)
        }
    };
    Ok(value)
}

fn run_attribute(collection: Collection, action: AttributeAction, store: &Store) -> Result<()> {
    match action {
        AttributeAction::List { json } => {
            let values = store.read_all(collection);
            warn_if_stale(store);
            if json {
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for (city, value) in &values {
                    println!("{city}: {value}");
                }
                println!("{} entries in {}", values.len(), collection);
            }
        }
        AttributeAction::Set { city, value } => {
            let value = parse_value(collection, &value)?;
            if !store.upsert(&city, value) {
                bail!("Failed to store {} for {}", value, city);
            }
            println!("{city}: {value}");
        }
        AttributeAction::Clear => {
            if !store.delete_all(collection) {
                bail!("Failed to clear {}", collection);
            }
            println!("Cleared {}", collection);
        }
    }
    Ok(())
}

/// Apply stored counts, colors and radii to the dashboard.
fn apply_stored(dashboard: &mut Dashboard, store: &Store) {
    let pb = spinner("Reading attribute store...");
    let counts = store.counts();
    let colors = store.colors();
    let radii = store.radii();
    pb.finish_and_clear();
    warn_if_stale(store);

    info!("Stored: {} counts, {} colors, {} radii", counts.len(), colors.len(), radii.len());
    dashboard.set_counts(counts);
    dashboard.set_colors(colors);
    for (depot, radius_km) in radii {
        if let Err(e) = dashboard.set_radius_override(&depot, radius_km) {
            warn!("Ignoring stored radius for {}: {}", depot, e);
        }
    }
}

fn report_skipped(coverage: &CoverageResult) {
    if !coverage.skipped.is_empty() {
        println!("  Skipped depots: {}", coverage.skipped.join(", "));
    }
}

#[derive(Serialize)]
struct RingSummary<'a> {
    depot_id: &'a str,
    label: &'a str,
    color: Rgb,
    radius_km: f64,
    center: GeoPoint,
    anchor: [f64; 2],
    points: usize,
}

fn rings_json(coverage: &CoverageResult) -> Result<String> {
    let summary: Vec<RingSummary<'_>> = coverage
        .rings
        .iter()
        .map(|r| RingSummary {
            depot_id: &r.depot_id,
            label: &r.label,
            color: r.color,
            radius_km: r.radius_km,
            center: r.center,
            anchor: [r.anchor.x, r.anchor.y],
            points: r.polygon.0.len(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&summary)?)
}

fn selection_from(select: &[String]) -> Option<DepotSelection> {
    if select.is_empty() {
        None
    } else {
        Some(select.iter().map(String::as_str).collect())
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let cfg = DashboardConfig::load(cli.config.as_deref())?;

    match cli.command {
        // ── Province map ─────────────────────────────────────────────
        Commands::Render {
            map,
            output,
            select,
            radius,
            no_labels,
            offline,
        } => {
            let base = read_map(&map)?;
            let start = Instant::now();
            let mut dashboard = cfg.dashboard();
            dashboard.load_geometry(base).context("Failed to index base map")?;

            if !offline {
                match open_store(&cli.store)? {
                    Some(store) => apply_stored(&mut dashboard, &store),
                    None => info!("No attribute store configured, rendering defaults"),
                }
            }
            if let Some(selection) = selection_from(&select) {
                dashboard.set_selection(selection);
            }
            if let Some(r) = radius {
                dashboard.set_global_radius(r).context("Invalid --radius")?;
            }
            if no_labels {
                dashboard.set_show_labels(false);
            }

            let plan = dashboard.draw_plan().context("Failed to build draw plan")?;
            let svg = render_plan(plan);
            let elapsed = start.elapsed();
            println!(
                "{} regions, {} rings, {} labels",
                plan.regions.len(),
                plan.coverage.rings.len(),
                plan.labels.len()
            );
            report_skipped(&plan.coverage);
            write_output(&svg, &output)?;
            done("Coverage map", &output, elapsed);
        }

        // ── Rings only ───────────────────────────────────────────────
        Commands::Rings {
            output,
            map,
            world,
            select,
            radius,
            json,
        } => {
            let selection = selection_from(&select).unwrap_or_else(|| cfg.selection.clone());
            let start = Instant::now();

            let (coverage, viewport) = if world {
                let mut coverage = cfg.world.coverage();
                if let Some(r) = radius {
                    coverage.global_radius_km =
                        validate_radius(MapView::World, r).context("Invalid --radius")?;
                }
                let plane = Viewport::new(0.0, 0.0, WORLD_PLANE_SIZE, WORLD_PLANE_SIZE);
                let projection = WebMercator::new(plane)?;
                let source = AnchorSource::Coordinates {
                    coords: &cfg.depots,
                    projection: &projection,
                };
                let result = compute_rings(&selection, &coverage, source)?;
                let viewport = result
                    .planar_bounds()
                    .map(|b| Viewport::framing(&b, WORLD_FRAME_PADDING))
                    .unwrap_or(plane);
                (result, viewport)
            } else {
                let Some(map) = map else {
                    bail!("--map is required for the province view");
                };
                let base = read_map(&map)?;
                let mut dashboard = cfg.dashboard();
                dashboard.load_geometry(base).context("Failed to index base map")?;
                dashboard.set_selection(selection);
                if let Some(r) = radius {
                    dashboard.set_global_radius(r).context("Invalid --radius")?;
                }
                let viewport = dashboard
                    .projection()
                    .map(|p| p.viewport())
                    .unwrap_or_else(|| Viewport::DEFAULT.zoomed_out(ZOOM_OUT_FACTOR));
                (dashboard.compute_rings()?.clone(), viewport)
            };

            let contents = if json {
                rings_json(&coverage)?
            } else {
                render_rings(&viewport, &coverage)
            };
            let elapsed = start.elapsed();
            println!("{} rings", coverage.rings.len());
            report_skipped(&coverage);
            write_output(&contents, &output)?;
            done("Coverage rings", &output, elapsed);
        }

        // ── Store tables ─────────────────────────────────────────────
        Commands::Counts { action } => {
            let store = require_store(&cli.store)?;
            run_attribute(Collection::StoreCounts, action, &store)?;
        }
        Commands::Colors { action } => {
            let store = require_store(&cli.store)?;
            run_attribute(Collection::Colors, action, &store)?;
        }
        Commands::Radii { action } => {
            let store = require_store(&cli.store)?;
            run_attribute(Collection::Radii, action, &store)?;
        }
        Commands::Init => {
            let store = require_store(&cli.store)?;
            let pb = spinner("Seeding attribute store...");
            let start = Instant::now();
            let ok = store.initialize(&cfg.reference);
            pb.finish_and_clear();
            if !ok {
                bail!("Failed to initialize the attribute store");
            }
            println!("Attribute store initialized");
            println!("  Processing time: {:.2?}", start.elapsed());
        }

        // ── Print layout ─────────────────────────────────────────────
        Commands::Layout { map } => {
            let base = read_map(&map)?;
            let viewport = base.viewport.zoomed_out(ZOOM_OUT_FACTOR);
            let layout = a3_layout(&viewport)?;
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(Collection::StoreCounts, " 12 ").unwrap(), AttributeValue::Count(12));
        assert!(parse_value(Collection::StoreCounts, "-1").is_err());
        assert!(parse_value(Collection::StoreCounts, "2.5").is_err());
        assert_eq!(
            parse_value(Collection::Colors, "#FF0000").unwrap(),
            AttributeValue::Color(Rgb::new(255, 0, 0))
        );
        assert_eq!(parse_value(Collection::Radii, "120").unwrap(), AttributeValue::Radius(120.0));
        assert!(parse_value(Collection::Radii, "5").is_err());
    }

    #[test]
    fn test_store_args_pairing() {
        let none = StoreArgs { store_url: None, store_key: None };
        assert!(open_store(&none).unwrap().is_none());
        let half = StoreArgs { store_url: Some("https://x.supabase.co".into()), store_key: None };
        assert!(open_store(&half).is_err());
    }

    #[test]
    fn test_rings_subcommand_parses() {
        let cli = Cli::try_parse_from(["depomap", "rings", "out.svg", "--world", "-s", "ankara,izmir", "-r", "200"]).unwrap();
        match cli.command {
            Commands::Rings { world, select, radius, .. } => {
                assert!(world);
                assert_eq!(select, vec!["ankara", "izmir"]);
                assert_eq!(radius, Some(200.0));
            }
            _ => panic!("expected rings"),
        }
        assert!(Cli::try_parse_from(["depomap", "rings", "out.svg"]).is_err());
    }
}
