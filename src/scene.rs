// One visualization session, from warehouse data to a framed scene.
// The assembler is engine-free: it resolves to a blueprint (meshes,
// container offset, camera pose) that the render output then spawns.

use bevy::log::{info, warn};
use bevy::math::Vec3;

use crate::build_3d::{GeometryBuilder, Triangulate};
use crate::kernel_in::{GeometryError, Warehouse};
use crate::kernel_out::{Bounds3, CameraPose, MeshAttributes, WallSegment};
use crate::projection::project;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    BuildingGeometry,
    /// Real geometry built, container recentered, camera framed.
    Framed,
    /// Default ground plane instead of real geometry.
    Fallback,
    Rendering,
    Disposed,
}

/// Everything the render output needs to spawn one session.
#[derive(Clone, Debug)]
pub struct SceneBlueprint {
    /// None on fallback; the output spawns the default ground instead.
    pub floor: Option<MeshAttributes>,
    pub walls: Vec<WallSegment>,
    /// Applied to the container transform only; the mesh vertices
    /// themselves are never rewritten.
    pub container_offset: Vec3,
    pub camera: CameraPose,
}

impl SceneBlueprint {
    pub fn fallback() -> Self {
        Self {
            floor: None,
            walls: Vec::new(),
            container_offset: Vec3::ZERO,
            camera: CameraPose::FALLBACK,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.floor.is_none()
    }
}

/// Recentering offset and camera pose for a finished bounding box.
fn frame(bounds: &Bounds3) -> Result<(Vec3, CameraPose), GeometryError> {
    if !bounds.is_finite() {
        return Err(GeometryError::UnboundedGeometry);
    }
    let max_dim = bounds.max_dimension();
    if !max_dim.is_finite() || max_dim <= 0.0 {
        return Err(GeometryError::Framing(max_dim));
    }

    let camera = CameraPose {
        position: Vec3::new(0.0, max_dim * 0.8, -max_dim * 1.5),
        target: Vec3::ZERO,
    };
    Ok((-bounds.center(), camera))
}

#[derive(Debug, Default)]
pub struct SceneAssembler {
    phase: SessionPhase,
    blueprint: Option<SceneBlueprint>,
}

impl SceneAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn blueprint(&self) -> Option<&SceneBlueprint> {
        self.blueprint.as_ref()
    }

    /// Resolves the session to Framed or Fallback. Never fails: any
    /// invalid input or degenerate geometry degrades to the default
    /// ground plane, so the user always gets a renderable scene.
    pub fn build<T: Triangulate>(
        &mut self,
        warehouse: Option<&Warehouse>,
        builder: &GeometryBuilder<T>,
    ) -> &SceneBlueprint {
        self.phase = SessionPhase::BuildingGeometry;
        let blueprint = match self.try_build(warehouse, builder) {
            Ok(blueprint) => {
                self.phase = SessionPhase::Framed;
                blueprint
            }
            Err(error) => {
                warn!("drawing the default ground instead: {error}");
                self.phase = SessionPhase::Fallback;
                SceneBlueprint::fallback()
            }
        };
        self.blueprint.insert(blueprint)
    }

    fn try_build<T: Triangulate>(
        &self,
        warehouse: Option<&Warehouse>,
        builder: &GeometryBuilder<T>,
    ) -> Result<SceneBlueprint, GeometryError> {
        let warehouse = warehouse.ok_or(GeometryError::MissingRing)?;
        let footprint = warehouse
            .footprint
            .as_ref()
            .ok_or(GeometryError::MissingRing)?;

        let projected = project(footprint)?;
        info!(
            "footprint projected: {:.1} m x {:.1} m, {} points",
            projected.width_meters,
            projected.length_meters,
            projected.points.len()
        );

        let geometry = builder.build(
            &projected.points,
            Some(warehouse.wall_height()),
            warehouse.is_closed(),
        )?;
        let (container_offset, camera) = frame(&geometry.bounds)?;

        Ok(SceneBlueprint {
            floor: Some(geometry.floor),
            walls: geometry.walls,
            container_offset,
            camera,
        })
    }

    /// The build always resolves before the frame loop starts; the
    /// engine only ever renders a Framed or Fallback scene.
    pub fn start_rendering(&mut self) {
        match self.phase {
            SessionPhase::Framed | SessionPhase::Fallback => {
                self.phase = SessionPhase::Rendering;
            }
            other => warn!("start_rendering in phase {other:?} ignored"),
        }
    }

    /// Tears the session down. Safe to call in any phase, including a
    /// second time.
    pub fn dispose(&mut self) {
        if self.phase == SessionPhase::Disposed {
            return;
        }
        self.blueprint = None;
        self.phase = SessionPhase::Disposed;
        info!("scene session disposed");
    }
}
