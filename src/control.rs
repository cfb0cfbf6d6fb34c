/*
 * Free-fly camera control for one warehouse session, with the same key
 * layout the map shell uses: WASD/arrows on the ground plane, E/Space
 * and Q/Shift for elevation. Runs once per rendered frame, together
 * with the wall-visibility culling that lets the camera look into a
 * closed building from outside.
 */

use bevy::prelude::*;

/// Camera has crossed to the outward side of a wall once its signed
/// distance to the wall's outer surface drops below this, meters.
pub static WALL_VISIBILITY_THRESHOLD: f32 = -0.5;

/// Movement speed, meters per second; scaled by the frame delta.
#[derive(Resource)]
pub struct ControlValues {
    pub speed: f32,
}

impl Default for ControlValues {
    fn default() -> Self {
        Self { speed: 250.0 }
    }
}

/// Key configuration
#[derive(Resource)]
pub struct KeyBindings {
    pub move_forward: KeyCode,
    pub move_forward2: KeyCode,
    pub move_backward: KeyCode,
    pub move_backward2: KeyCode,
    pub move_left: KeyCode,
    pub move_left2: KeyCode,
    pub move_right: KeyCode,
    pub move_right2: KeyCode,
    pub move_ascend: KeyCode,
    pub move_ascend2: KeyCode,
    pub move_descend: KeyCode,
    pub move_descend2: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_forward: KeyCode::KeyW,
            move_forward2: KeyCode::ArrowUp,
            move_backward: KeyCode::KeyS,
            move_backward2: KeyCode::ArrowDown,
            move_left: KeyCode::KeyA,
            move_left2: KeyCode::ArrowLeft,
            move_right: KeyCode::KeyD,
            move_right2: KeyCode::ArrowRight,
            move_ascend: KeyCode::KeyE,
            move_ascend2: KeyCode::Space,
            move_descend: KeyCode::KeyQ,
            move_descend2: KeyCode::ShiftLeft,
        }
    }
}

/// Marker for the one session camera.
#[derive(Component)]
pub struct FlyCam;

/// Wall mesh taking part in the visibility culling. Local +x is the
/// outward side of the box.
#[derive(Component)]
pub struct CulledWall {
    pub thickness: f32,
}

/// Direction keys currently held down.
#[derive(Clone, Copy, Debug, Default)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub ascend: bool,
    pub descend: bool,
}

/// Drops the vertical component and renormalizes, so the vertical look
/// angle never changes the horizontal movement speed.
pub fn flatten_horizontal(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

/// Accumulated movement for one frame. Horizontal movement follows the
/// flattened camera basis, vertical movement the world up axis.
pub fn movement_vector(
    forward: Vec3,
    right: Vec3,
    keys: MovementKeys,
    frame_speed: f32,
) -> Vec3 {
    let mut movement = Vec3::ZERO;
    if keys.forward {
        movement += forward * frame_speed;
    }
    if keys.backward {
        movement -= forward * frame_speed;
    }
    if keys.right {
        movement += right * frame_speed;
    }
    if keys.left {
        movement -= right * frame_speed;
    }
    if keys.ascend {
        movement += Vec3::Y * frame_speed;
    }
    if keys.descend {
        movement -= Vec3::Y * frame_speed;
    }
    movement
}

/// Signed distance of the camera to the plane through the wall's outer
/// surface (half a thickness out along the outward normal).
pub fn wall_signed_distance(
    camera_position: Vec3,
    wall_position: Vec3,
    outward_normal: Vec3,
    thickness: f32,
) -> f32 {
    let outer_surface_point = wall_position + outward_normal * (thickness / 2.0);
    outward_normal.dot(camera_position - outer_surface_point)
}

pub fn wall_is_visible(signed_distance: f32) -> bool {
    !(signed_distance < WALL_VISIBILITY_THRESHOLD)
}

/// Handles keyboard input and movement
fn player_move(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    key_bindings: Res<KeyBindings>,
    control_values: Res<ControlValues>,
    mut camera: Single<&mut Transform, With<FlyCam>>,
) {
    let frame_speed = control_values.speed * time.delta_secs();

    let local_z = *camera.local_z();
    let forward = flatten_horizontal(-local_z);
    let right = flatten_horizontal(*camera.local_x());

    let pressed = MovementKeys {
        forward: keys.pressed(key_bindings.move_forward) || keys.pressed(key_bindings.move_forward2),
        backward: keys.pressed(key_bindings.move_backward)
            || keys.pressed(key_bindings.move_backward2),
        left: keys.pressed(key_bindings.move_left) || keys.pressed(key_bindings.move_left2),
        right: keys.pressed(key_bindings.move_right) || keys.pressed(key_bindings.move_right2),
        ascend: keys.pressed(key_bindings.move_ascend) || keys.pressed(key_bindings.move_ascend2),
        descend: keys.pressed(key_bindings.move_descend)
            || keys.pressed(key_bindings.move_descend2),
    };

    camera.translation += movement_vector(forward, right, pressed, frame_speed);
}

/// Hides a wall once the camera stands on its outward side, so the
/// observer can see into the building across it.
fn cull_walls(
    camera: Single<&Transform, With<FlyCam>>,
    mut walls: Query<(&GlobalTransform, &CulledWall, &mut Visibility)>,
) {
    let camera_position = camera.translation;
    for (global, wall, mut visibility) in &mut walls {
        let (_, rotation, position) = global.to_scale_rotation_translation();
        let outward_normal = (rotation * Vec3::X).normalize();
        let signed_distance =
            wall_signed_distance(camera_position, position, outward_normal, wall.thickness);
        *visibility = if wall_is_visible(signed_distance) {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// Per-frame camera movement and wall culling for the session camera.
/// The systems die with the app; nothing leaks into a later session.
pub struct CameraControlPlugin;

impl Plugin for CameraControlPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlValues>()
            .init_resource::<KeyBindings>()
            .add_systems(Update, (player_move, cull_walls).chain());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn visibility_threshold() {
        assert!(!wall_is_visible(-1.0));
        assert!(wall_is_visible(0.2));
        // exactly at the threshold the wall stays visible
        assert!(wall_is_visible(WALL_VISIBILITY_THRESHOLD));
    }

    #[test]
    fn signed_distance_is_measured_from_the_outer_surface() {
        let wall_position = Vec3::ZERO;
        let outward = Vec3::X;
        let thickness = 0.1;

        let outside =
            wall_signed_distance(Vec3::new(1.0, 0.0, 0.0), wall_position, outward, thickness);
        assert_relative_eq!(outside, 0.95, max_relative = 1e-6);
        assert!(wall_is_visible(outside));

        let crossed =
            wall_signed_distance(Vec3::new(-1.0, 0.0, 0.0), wall_position, outward, thickness);
        assert_relative_eq!(crossed, -1.05, max_relative = 1e-6);
        assert!(!wall_is_visible(crossed));
    }

    #[test]
    fn flattening_removes_the_look_pitch() {
        let pitched_forward = Vec3::new(0.0, -0.7, 0.7);
        let flat = flatten_horizontal(pitched_forward);
        assert_relative_eq!(flat.y, 0.0);
        assert_relative_eq!(flat.length(), 1.0, max_relative = 1e-6);

        // looking straight down leaves no horizontal direction
        assert_eq!(flatten_horizontal(Vec3::new(0.0, -1.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn movement_stays_horizontal_except_for_elevation_keys() {
        let forward = flatten_horizontal(Vec3::new(0.0, -0.5, 1.0));
        let right = Vec3::X;

        let keys = MovementKeys {
            forward: true,
            right: true,
            ..Default::default()
        };
        let movement = movement_vector(forward, right, keys, 2.0);
        assert_eq!(movement.y, 0.0);
        assert_relative_eq!(movement.z, 2.0, max_relative = 1e-6);
        assert_relative_eq!(movement.x, 2.0, max_relative = 1e-6);

        let keys = MovementKeys {
            ascend: true,
            ..Default::default()
        };
        assert_eq!(movement_vector(forward, right, keys, 2.0), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn opposite_keys_cancel() {
        let keys = MovementKeys {
            forward: true,
            backward: true,
            ascend: true,
            descend: true,
            ..Default::default()
        };
        let movement = movement_vector(Vec3::Z, Vec3::X, keys, 5.0);
        assert_eq!(movement, Vec3::ZERO);
    }
}
