// Internal interface of the crate/lib between the geometry builder and the render output

use bevy::math::Vec3;

// The usual format a GPU renderer wants its vertex positions in.
pub type GpuPosition = [f32; 3];

/// Raw mesh data handed to the render engine.
#[derive(Clone, Debug, Default)]
pub struct MeshAttributes {
    pub indices_to_vertices: Vec<u32>,
    pub vertices_positions: Vec<GpuPosition>,
}

impl MeshAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_position(&mut self, position: GpuPosition) -> u32 {
        self.vertices_positions.push(position);
        (self.vertices_positions.len() - 1) as u32
    }

    pub fn push_triangle(&mut self, indices: [u32; 3]) {
        self.indices_to_vertices.extend_from_slice(&indices);
    }

    pub fn bounds(&self) -> Bounds3 {
        let mut bounds = Bounds3::EMPTY;
        for position in &self.vertices_positions {
            bounds.include(Vec3::from_array(*position));
        }
        bounds
    }
}

/// Axis-aligned box over built geometry, in the container's local
/// space. Drives recentering and camera framing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds3 {
    pub const EMPTY: Self = Self {
        min: Vec3::MAX,
        max: Vec3::MIN,
    };

    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&mut self, other: &Bounds3) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Characteristic dimension: the largest of width/height/depth.
    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// One extruded wall box along a footprint edge. The box is thin in
/// its local x, tall in y and long in z; `rotation_y` aligns local z
/// with the edge direction. Local +x is the outward side used by the
/// visibility culling.
#[derive(Clone, Copy, Debug)]
pub struct WallSegment {
    pub midpoint: Vec3,
    pub rotation_y: f32,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl WallSegment {
    /// World-extents of the rotated box.
    pub fn bounds(&self) -> Bounds3 {
        let half_x = self.width / 2.0;
        let half_y = self.height / 2.0;
        let half_z = self.depth / 2.0;
        let (sin, cos) = self.rotation_y.sin_cos();
        let extent = Vec3::new(
            cos.abs() * half_x + sin.abs() * half_z,
            half_y,
            sin.abs() * half_x + cos.abs() * half_z,
        );
        Bounds3 {
            min: self.midpoint - extent,
            max: self.midpoint + extent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Pose before any framing happened.
    pub const DEFAULT: Self = Self {
        position: Vec3::new(0.0, 5.0, -10.0),
        target: Vec3::ZERO,
    };

    /// Elevated pose over the fallback ground plane.
    pub const FALLBACK: Self = Self {
        position: Vec3::new(0.0, 10.0, -10.0),
        target: Vec3::ZERO,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bounds_grow_by_inclusion_and_union() {
        let mut bounds = Bounds3::EMPTY;
        bounds.include(Vec3::new(-5.0, 0.0, -5.0));
        bounds.include(Vec3::new(5.0, 10.0, 5.0));
        assert_eq!(bounds.center(), Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(bounds.max_dimension(), 10.0);

        let mut other = Bounds3::EMPTY;
        other.include(Vec3::new(0.0, 20.0, 0.0));
        bounds.union(&other);
        assert_eq!(bounds.max.y, 20.0);
        assert_eq!(bounds.max_dimension(), 20.0);
        assert!(bounds.is_finite());
    }

    #[test]
    fn poisoned_bounds_are_not_finite() {
        let bounds = Bounds3 {
            min: Vec3::ZERO,
            max: Vec3::new(f32::NAN, 1.0, 1.0),
        };
        assert!(!bounds.is_finite());
    }

    #[test]
    fn wall_bounds_follow_the_rotation() {
        let wall = WallSegment {
            midpoint: Vec3::new(0.0, 2.5, 0.0),
            rotation_y: 0.0,
            width: 0.1,
            height: 5.0,
            depth: 10.0,
        };
        let bounds = wall.bounds();
        assert_relative_eq!(bounds.size().x, 0.1);
        assert_relative_eq!(bounds.size().y, 5.0);
        assert_relative_eq!(bounds.size().z, 10.0);

        // a quarter turn swaps the ground extents
        let turned = WallSegment {
            rotation_y: std::f32::consts::FRAC_PI_2,
            ..wall
        };
        let bounds = turned.bounds();
        assert_relative_eq!(bounds.size().x, 10.0, max_relative = 1e-5);
        assert_relative_eq!(bounds.size().z, 0.1, max_relative = 1e-3);
    }
}
