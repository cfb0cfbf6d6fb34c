// Builds the warehouse meshes: an extruded floor slab from the
// projected footprint and one box per footprint edge as walls.

use bevy::log::warn;
use bevy::math::Vec3;

use crate::kernel_in::{FLOOR_DEPTH, GeometryError, WALL_THICKNESS};
use crate::kernel_out::{Bounds3, MeshAttributes, WallSegment};

/// Edges shorter than this never become walls.
static MIN_WALL_LENGTH: f32 = 1e-6;

/// Polygon triangulation, injected so the builder never depends on a
/// concrete triangulator being wired up as a global.
pub trait Triangulate {
    /// `ground_ring` is flat `[x0, z0, x1, z1, ..]`; returns triangle
    /// indices into the ring.
    fn triangulate(&self, ground_ring: &[f32]) -> Result<Vec<usize>, GeometryError>;
}

/// The stock triangulator, backed by earcut.
pub struct Earcut;

impl Triangulate for Earcut {
    fn triangulate(&self, ground_ring: &[f32]) -> Result<Vec<usize>, GeometryError> {
        earcutr::earcut(&ground_ring.to_vec(), &vec![], 2)
            .map_err(|_| GeometryError::FloorConstruction)
    }
}

/// Which consecutive point pairs become walls. Map-drawn GeoJSON rings
/// repeat their first vertex at the end, so `ArrayOrder` already walls
/// the full outline there; `ClosedRing` additionally wraps the final
/// pair for rings that do not repeat it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WallLoop {
    #[default]
    ArrayOrder,
    ClosedRing,
}

#[derive(Clone, Debug)]
pub struct WarehouseGeometry {
    pub floor: MeshAttributes,
    pub walls: Vec<WallSegment>,
    pub bounds: Bounds3,
}

pub struct GeometryBuilder<T: Triangulate> {
    triangulator: T,
    wall_loop: WallLoop,
}

impl GeometryBuilder<Earcut> {
    pub fn with_earcut(wall_loop: WallLoop) -> Self {
        Self::new(Earcut, wall_loop)
    }
}

impl<T: Triangulate> GeometryBuilder<T> {
    pub fn new(triangulator: T, wall_loop: WallLoop) -> Self {
        Self {
            triangulator,
            wall_loop,
        }
    }

    /// Builds floor and walls from ground-level points. A failing floor
    /// is the fallback signal for the caller; a single failing wall is
    /// only skipped.
    pub fn build(
        &self,
        points: &[Vec3],
        height: Option<f64>,
        is_closed: bool,
    ) -> Result<WarehouseGeometry, GeometryError> {
        let floor = self.build_floor(points)?;

        let mut walls = Vec::new();
        if is_closed {
            match height {
                Some(height) if height.is_finite() && height > 0.0 => {
                    walls = self.build_walls(points, height as f32);
                }
                other => {
                    warn!("no walls: invalid warehouse height {other:?}");
                }
            }
        }

        let mut bounds = floor.bounds();
        for wall in &walls {
            bounds.union(&wall.bounds());
        }

        Ok(WarehouseGeometry {
            floor,
            walls,
            bounds,
        })
    }

    /// Flat polygon extruded downward by the slab depth: triangulated
    /// top and bottom face plus one quad per outline edge.
    fn build_floor(&self, points: &[Vec3]) -> Result<MeshAttributes, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::FloorConstruction);
        }

        let mut ground_ring = Vec::with_capacity(points.len() * 2);
        for point in points {
            ground_ring.push(point.x);
            ground_ring.push(point.z);
        }
        let indices = self.triangulator.triangulate(&ground_ring)?;
        if indices.is_empty() {
            // duplicate or collinear points, zero-area triangulation
            return Err(GeometryError::FloorConstruction);
        }

        let mut floor = MeshAttributes::new();
        let count = points.len() as u32;
        for point in points {
            floor.push_position([point.x, 0.0, point.z]);
        }
        for point in points {
            floor.push_position([point.x, -FLOOR_DEPTH, point.z]);
        }

        for triangle in indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0] as u32, triangle[1] as u32, triangle[2] as u32];
            floor.push_triangle([a, b, c]);
            // bottom face, winding reversed
            floor.push_triangle([count + a, count + c, count + b]);
        }

        // side band around the slab; rendered double-sided anyway
        for index in 0..count {
            let next = (index + 1) % count;
            floor.push_triangle([index, count + index, next]);
            floor.push_triangle([next, count + index, count + next]);
        }

        Ok(floor)
    }

    fn build_walls(&self, points: &[Vec3], height: f32) -> Vec<WallSegment> {
        let pair_count = match self.wall_loop {
            WallLoop::ArrayOrder => points.len().saturating_sub(1),
            WallLoop::ClosedRing => points.len(),
        };

        let mut walls = Vec::with_capacity(pair_count);
        for index in 0..pair_count {
            let p1 = points[index];
            let p2 = points[(index + 1) % points.len()];

            let length = p1.distance(p2);
            if !length.is_finite() || length <= MIN_WALL_LENGTH {
                warn!("skipping wall {index}: edge length {length}");
                continue;
            }
            let direction = (p2 - p1) / length;
            let rotation_y = f32::atan2(direction.x, direction.z);
            if !rotation_y.is_finite() {
                warn!("skipping wall {index}: unusable edge direction");
                continue;
            }

            let midpoint = p1.lerp(p2, 0.5);
            walls.push(WallSegment {
                midpoint: Vec3::new(midpoint.x, height / 2.0, midpoint.z),
                rotation_y,
                width: WALL_THICKNESS,
                // a little longer than the edge to close the corner gaps
                depth: length + WALL_THICKNESS,
                height,
            });
        }
        walls
    }
}
