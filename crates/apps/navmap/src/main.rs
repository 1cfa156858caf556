use std::path::PathBuf;

use clap::Parser;
use foundation::math::GeoPoint;
use foundation::units::Distance;
use layers::{AirportSize, CanvasId, CanvasSink, IconDraw};
use navmap::{MapConfig, MapEvent, NavMap};
use runtime::Counter;
use streaming::{Facility, FacilityType, InMemoryFacilityService};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replays a scripted flight through the moving-map engine")]
struct Args {
    /// Map configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Facility database (JSON array). A generated grid is used when omitted.
    #[arg(long)]
    facilities: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value_t = 1800)]
    frames: u64,

    /// Frame length in milliseconds
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f64,

    /// Start latitude (degrees)
    #[arg(long, default_value_t = 47.45)]
    lat: f64,

    /// Start longitude (degrees)
    #[arg(long, default_value_t = -122.31)]
    lon: f64,

    /// True ground track (degrees)
    #[arg(long, default_value_t = 90.0)]
    track: f64,

    /// Ground speed (knots)
    #[arg(long, default_value_t = 600.0)]
    speed_kts: f64,
}

/// Counts draw calls instead of rasterizing.
#[derive(Debug, Default)]
struct CountingCanvas {
    clears: u64,
    icons: u64,
}

impl CanvasSink for CountingCanvas {
    fn clear(&mut self, _canvas: CanvasId) {
        self.clears += 1;
    }

    fn draw_icon(&mut self, canvas: CanvasId, draw: &IconDraw) {
        self.icons += 1;
        debug!("canvas {}: {} at {:?}", canvas.0, draw.icon.uid, draw.position);
    }
}

/// Facilities on a 0.2 degree grid around `center`, cycling through every
/// facility kind.
fn facility_grid(center: GeoPoint, half_extent: i32) -> Vec<Facility> {
    const STEP_DEG: f64 = 0.2;
    let mut facilities = Vec::new();
    for i in -half_extent..=half_extent {
        for j in -half_extent..=half_extent {
            let location = GeoPoint::new(
                center.lat + f64::from(i) * STEP_DEG,
                center.lon + f64::from(j) * STEP_DEG,
            );
            let n = (i + half_extent) * (2 * half_extent + 1) + (j + half_extent);
            let ident = format!("G{n:04}");
            let (prefix, facility_type, size) = match n % 6 {
                0 => ('A', FacilityType::Airport, Some(AirportSize::Large)),
                1 => ('A', FacilityType::Airport, Some(AirportSize::Medium)),
                2 => ('A', FacilityType::Airport, Some(AirportSize::Small)),
                3 => ('V', FacilityType::Vor, None),
                4 => ('N', FacilityType::Ndb, None),
                _ => ('W', FacilityType::Intersection, None),
            };
            let mut facility =
                Facility::new(format!("{prefix}      {ident}"), &ident, facility_type, location);
            facility.airport_size = size;
            facilities.push(facility);
        }
    }
    facilities
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => MapConfig::from_path(path)?,
        None => MapConfig::default(),
    };
    let start = GeoPoint::new(args.lat, args.lon);
    let service = match &args.facilities {
        Some(path) => InMemoryFacilityService::from_path(path)?,
        None => {
            let service = InMemoryFacilityService::new(facility_grid(start, 15));
            info!("generated {} facilities around the start point", service.len());
            service
        }
    };

    let mut map = NavMap::new(&config, service);
    map.emit(MapEvent::OnGround(false));
    map.emit(MapEvent::GroundTrack(args.track));
    map.emit(MapEvent::TrueHeading(args.track));

    let speed_ga_per_ms = Distance::nautical_miles(args.speed_kts).as_ga_radians() / 3_600_000.0;
    let frames_per_second = (1000.0 / args.frame_ms).round().max(1.0) as u64;
    let mut canvas = CountingCanvas::default();
    let mut elapsed_total = 0.0;

    for frame in 0..args.frames {
        let position = start.offset(args.track, speed_ga_per_ms * elapsed_total);
        map.emit(MapEvent::AirplanePosition(position));
        let stats = map.on_updated(args.frame_ms, &mut canvas);
        elapsed_total += args.frame_ms;

        if (frame + 1) % frames_per_second == 0 {
            let metrics = map.metrics();
            info!(
                "t={:.0}s pos=({:.4}, {:.4}) range_index={} registered={} drawn={} searches={}",
                elapsed_total / 1000.0,
                position.lat,
                position.lon,
                map.camera().range_index(),
                stats.registered,
                stats.drawn,
                metrics.counter(Counter::SearchesIssued),
            );
        }
    }

    let snapshot = map.metrics().snapshot();
    for (name, value) in snapshot.counters {
        info!("{name} = {value}");
    }
    for (name, value) in snapshot.gauges {
        info!("{name} = {value}");
    }
    info!("{} icons drawn, {} canvas clears", canvas.icons, canvas.clears);
    Ok(())
}
