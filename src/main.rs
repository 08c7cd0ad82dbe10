use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use reachable_poi::config::Config;
use reachable_poi::geometry;
use reachable_poi::session::AppState;
use reachable_poi::{Coordinate, Explorer, Poi, TransportMode};

#[derive(Parser)]
#[command(name = "reachable-poi", about = "Find POIs inside the area reachable within a travel-time budget")]
struct Cli {
    /// TOML config file (credentials can also come from APP_ID / API_KEY)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where origins, POIs and routes are kept between invocations
    #[arg(long, default_value = "reachable_poi_state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Area and POIs reachable from one origin
    Area {
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lng: Option<f64>,
        #[arg(long, default_value = "PublicTransport")]
        mode: TransportMode,
        #[arg(long, default_value_t = 20)]
        minutes: u32,
        /// RFC 3339 departure time, defaults to now
        #[arg(long)]
        depart: Option<DateTime<FixedOffset>>,
        /// Print the area as GeoJSON
        #[arg(long)]
        geojson: bool,
    },
    /// Area and POIs reachable from both origins
    Meet {
        #[arg(long, allow_negative_numbers = true)]
        lat_a: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lng_a: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lat_b: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lng_b: Option<f64>,
        #[arg(long, default_value = "PublicTransport")]
        mode: TransportMode,
        #[arg(long, default_value_t = 20)]
        minutes: u32,
        #[arg(long)]
        depart: Option<DateTime<FixedOffset>>,
        #[arg(long)]
        geojson: bool,
    },
    /// Route from origin A to a POI listed by the last `area` or `meet`
    Route {
        /// 1-based POI number
        #[arg(long)]
        poi: usize,
        /// Defaults to the mode of the last search
        #[arg(long)]
        mode: Option<TransportMode>,
    },
}

fn merge(current: Coordinate, lat: Option<f64>, lng: Option<f64>) -> Coordinate {
    Coordinate::new(lat.unwrap_or(current.lat), lng.unwrap_or(current.lng))
}

fn print_pois(pois: &[Poi]) {
    if pois.is_empty() {
        println!("No POIs found in this area");
        return;
    }
    println!("POIs:");
    for (i, poi) in pois.iter().enumerate() {
        println!("{:>3}. {} ({:.5}, {:.5})", i + 1, poi.name, poi.lat, poi.lng);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let explorer = Explorer::new(&config).context("Failed to set up clients")?;
    let mut state = AppState::load(&cli.state)?;
    let now: DateTime<FixedOffset> = Local::now().into();

    match cli.command {
        Command::Area {
            lat,
            lng,
            mode,
            minutes,
            depart,
            geojson,
        } => {
            state.set_origin_a(merge(state.origin_a, lat, lng));
            let (area, pois) = explorer
                .reachable_pois(state.origin_a, mode, minutes, &depart.unwrap_or(now))
                .await
                .context("Failed to compute reachable area")?;
            if geojson {
                println!("{}", geometry::area_to_geojson_string(&area));
            }
            println!("Reachable area: {} polygons", area.shells.len());
            print_pois(&pois);
            state.record_area(mode, area, pois);
        }
        Command::Meet {
            lat_a,
            lng_a,
            lat_b,
            lng_b,
            mode,
            minutes,
            depart,
            geojson,
        } => {
            state.set_origin_a(merge(state.origin_a, lat_a, lng_a));
            state.set_origin_b(merge(state.origin_b, lat_b, lng_b));
            let (area, pois) = explorer
                .common_pois(
                    state.origin_a,
                    state.origin_b,
                    mode,
                    minutes,
                    &depart.unwrap_or(now),
                )
                .await
                .context("Failed to compute common area")?;
            if geojson {
                println!("{}", geometry::area_to_geojson_string(&area));
            }
            println!("Common area: {} polygons", area.shells.len());
            print_pois(&pois);
            state.record_area(mode, area, pois);
        }
        Command::Route { poi, mode } => {
            let target = state.poi(poi)?.clone();
            let mode = mode.unwrap_or(state.mode);
            let route = explorer
                .route_to(state.origin_a, target.coordinate(), mode)
                .await
                .with_context(|| format!("Failed to route to {}", target.name))?;
            state.record_route(&target, route);
            if let Some(summary) = &state.trip_summary {
                println!("{}", summary);
            }
            if let Some(route) = &state.route {
                println!("Directions:");
                for (i, step) in route.directions.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, step);
                }
            }
        }
    }

    state.save(&cli.state)?;
    Ok(())
}
