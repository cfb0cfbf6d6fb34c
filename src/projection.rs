// Projection of a geographic footprint onto a local tangent plane.
// Origin of the plane is the footprint's minimum-longitude/minimum-
// latitude corner; axes are meters east (x) and meters north (z).

use bevy::log::warn;
use bevy::math::Vec3;

use crate::geo::scale_factors;
use crate::kernel_in::{Footprint, GeometryError, MIN_FOOTPRINT_DIMENSION};

#[derive(Clone, Copy, Debug)]
pub struct GeographicBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

#[derive(Clone, Debug)]
pub struct ProjectedFootprint {
    /// Ground-level points, meters, y always 0.
    pub points: Vec<Vec3>,
    pub width_meters: f64,
    pub length_meters: f64,
    pub bounds: GeographicBounds,
}

pub fn project(footprint: &Footprint) -> Result<ProjectedFootprint, GeometryError> {
    if footprint.len() < 3 {
        return Err(GeometryError::TooFewVertices(footprint.len()));
    }
    for (index, vertex) in footprint.vertices.iter().enumerate() {
        if !vertex.is_finite() {
            return Err(GeometryError::NonFiniteCoordinate(index));
        }
    }

    let mut bounds = GeographicBounds {
        min_lon: f64::MAX,
        max_lon: f64::MIN,
        min_lat: f64::MAX,
        max_lat: f64::MIN,
    };
    for vertex in &footprint.vertices {
        bounds.min_lon = bounds.min_lon.min(vertex.longitude);
        bounds.max_lon = bounds.max_lon.max(vertex.longitude);
        bounds.min_lat = bounds.min_lat.min(vertex.latitude);
        bounds.max_lat = bounds.max_lat.max(vertex.latitude);
    }

    // One set of scale factors for the whole footprint, taken at its
    // mean latitude. Good enough for building-sized patches.
    let avg_lat = (bounds.min_lat + bounds.max_lat) / 2.0;
    let factors = scale_factors(avg_lat);
    if !factors.is_usable() {
        return Err(GeometryError::ConversionFailure(avg_lat));
    }

    let points = footprint
        .vertices
        .iter()
        .map(|vertex| {
            let x = (vertex.longitude - bounds.min_lon) * factors.meters_per_lon_degree;
            let z = (vertex.latitude - bounds.min_lat) * factors.meters_per_lat_degree;
            Vec3::new(x as f32, 0.0, z as f32)
        })
        .collect();

    let width_meters = (bounds.max_lon - bounds.min_lon) * factors.meters_per_lon_degree;
    let length_meters = (bounds.max_lat - bounds.min_lat) * factors.meters_per_lat_degree;

    if width_meters <= MIN_FOOTPRINT_DIMENSION || length_meters <= MIN_FOOTPRINT_DIMENSION {
        warn!("footprint is degenerate: {width_meters} m x {length_meters} m");
        return Err(GeometryError::DegenerateFootprint {
            width: width_meters,
            length: length_meters,
        });
    }

    Ok(ProjectedFootprint {
        points,
        width_meters,
        length_meters,
        bounds,
    })
}
