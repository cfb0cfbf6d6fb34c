//// Warehouse 3D visualization core: a drawn geographic footprint and a
//// height go in, a framed, navigable 3D building comes out. The CRUD
//// shell around it (forms, auth, map widget) lives elsewhere.

// Input boundary: loosely structured payload -> strict types
mod input_geojson;
mod kernel_in;

// Geometry pipeline: degrees -> meters -> meshes
mod build_3d;
mod geo;
mod kernel_out;
mod projection;

// Scene orchestration, render output and camera control
mod bevy_ui;
mod control;
mod scene;

pub use bevy_ui::*;
pub use build_3d::*;
pub use control::*;
pub use geo::*;
pub use input_geojson::*;
pub use kernel_in::*;
pub use kernel_out::*;
pub use projection::project;
pub use projection::{GeographicBounds, ProjectedFootprint};
pub use scene::*;
