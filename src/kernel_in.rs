// Internal interface of the crate/lib between the input module and the geometry pipeline

use thiserror::Error;

/// Spherical-earth radius used by the degree-to-meters conversion.
pub static EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Thickness of an extruded wall box, meters.
pub static WALL_THICKNESS: f32 = 0.1;
/// Depth of the extruded floor slab, meters.
pub static FLOOR_DEPTH: f32 = 0.1;
/// Side length of the fallback ground plane, meters.
pub static DEFAULT_GROUND_SIZE: f32 = 10.0;
/// Wall height used when the payload carries none.
pub static DEFAULT_WALL_HEIGHT: f64 = 5.0;
/// A projected footprint narrower than this (1 mm) is degenerate.
pub static MIN_FOOTPRINT_DIMENSION: f64 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeographicVertex {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeographicVertex {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }
}

impl std::fmt::Display for GeographicVertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

/// Ordered ground outline of a warehouse, decimal degrees (WGS84).
/// Map-drawn rings usually repeat the first vertex at the end; that
/// duplicate is kept as supplied.
#[derive(Clone, Debug, Default)]
pub struct Footprint {
    pub vertices: Vec<GeographicVertex>,
}

impl Footprint {
    pub fn new(vertices: Vec<GeographicVertex>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarehouseKind {
    Open,
    Closed,
}

/// Validated warehouse data, produced once at the ingestion boundary.
#[derive(Clone, Debug)]
pub struct Warehouse {
    pub kind: WarehouseKind,
    pub height: Option<f64>,
    pub footprint: Option<Footprint>,
}

impl Warehouse {
    /// Wall height to build with. Missing heights default, invalid ones
    /// stay invalid and are rejected later by the geometry builder.
    pub fn wall_height(&self) -> f64 {
        self.height.unwrap_or(DEFAULT_WALL_HEIGHT)
    }

    pub fn is_closed(&self) -> bool {
        self.kind == WarehouseKind::Closed
    }
}

/// Everything that can go wrong between a drawn polygon and a framed
/// scene. All of it is recoverable: callers fall back to the default
/// ground plane, nothing here aborts the render.
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("footprint needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("footprint vertex {0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),
    #[error("degenerate footprint: {width} m x {length} m")]
    DegenerateFootprint { width: f64, length: f64 },
    #[error("scale factors invalid at latitude {0}")]
    ConversionFailure(f64),
    #[error("floor triangulation produced no triangles")]
    FloorConstruction,
    #[error("bounding box is not finite")]
    UnboundedGeometry,
    #[error("characteristic dimension {0} unusable for framing")]
    Framing(f32),
    #[error("payload carries no usable polygon ring")]
    MissingRing,
}
