// Demo viewer: loads a warehouse payload (or a built-in sample) and
// runs one visualization session.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use warehouse3d::{
    VizSettings, WallLoop, WarehouseKind, bevy_init, parse_color, warehouse_from_slice,
    warehouse_from_str,
};

/**** Project patterns ****************************************************************************
 * No abbreviations in names
 * Geographic order is always longitude before latitude, like GeoJSON
 * Every failure in the pipeline degrades to the default ground, never to a blank window
 */

/// A closed 55 m x 44 m warehouse near Istanbul.
static SAMPLE_WAREHOUSE: &str = r#"{
    "type": "closed",
    "height": 8,
    "footprint": { "geometry": {
        "type": "Polygon",
        "coordinates": [[
            [28.9784, 41.0082],
            [28.9784, 41.0087],
            [28.9789, 41.0087],
            [28.9789, 41.0082],
            [28.9784, 41.0082]
        ]]
    }}
}"#;

#[derive(Parser, Debug)]
#[command(about = "Interactive 3D view of a warehouse footprint")]
struct Args {
    /// Warehouse JSON payload; the built-in sample is shown if absent
    #[arg(long)]
    file: Option<PathBuf>,

    /// Override the wall height, meters
    #[arg(long)]
    height: Option<f64>,

    /// Treat the warehouse as open (no walls)
    #[arg(long)]
    open: bool,

    /// Also wall the final footprint pair when the ring does not repeat
    /// its first vertex
    #[arg(long)]
    close_ring: bool,

    /// Wall color, CSS name/hex or a material name like "brick"
    #[arg(long)]
    wall_color: Option<String>,

    /// Floor color
    #[arg(long)]
    floor_color: Option<String>,

    /// Camera speed, meters per second
    #[arg(long, default_value_t = 250.0)]
    speed: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut warehouse = match &args.file {
        Some(path) => warehouse_from_slice(&std::fs::read(path)?)?,
        None => warehouse_from_str(SAMPLE_WAREHOUSE)?,
    };
    if let Some(height) = args.height {
        warehouse.height = Some(height);
    }
    if args.open {
        warehouse.kind = WarehouseKind::Open;
    }

    let defaults = VizSettings::default();
    let settings = VizSettings {
        wall_color: parse_color(args.wall_color.as_deref(), defaults.wall_color),
        floor_color: parse_color(args.floor_color.as_deref(), defaults.floor_color),
        wall_loop: if args.close_ring {
            WallLoop::ClosedRing
        } else {
            WallLoop::ArrayOrder
        },
        camera_speed: args.speed,
        ..defaults
    };

    bevy_init(Some(warehouse), settings);
    Ok(())
}
