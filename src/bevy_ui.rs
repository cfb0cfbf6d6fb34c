///////////////////////////////////////////////////////////////////////////////////////////////////
// BEVY ///////////////////////////////////////////////////////////////////////////////////////////

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::Indices;
use bevy::render::render_resource::PrimitiveTopology;

use crate::build_3d::{GeometryBuilder, WallLoop};
use crate::control::{CameraControlPlugin, ControlValues, CulledWall, FlyCam};
use crate::kernel_in::{DEFAULT_GROUND_SIZE, Warehouse};
use crate::kernel_out::MeshAttributes;
use crate::scene::SceneAssembler;

/// Render settings of one visualization session.
#[derive(Resource, Clone)]
pub struct VizSettings {
    pub floor_color: Color,
    pub wall_color: Color,
    pub ground_color: Color,
    pub wall_loop: WallLoop,
    pub camera_speed: f32,
}

impl Default for VizSettings {
    fn default() -> Self {
        Self {
            floor_color: Color::srgb(0.5, 0.25, 0.1),
            wall_color: Color::srgb(0.8, 0.8, 0.8),
            ground_color: Color::srgb(0.5, 0.5, 0.5),
            wall_loop: WallLoop::ArrayOrder,
            camera_speed: 250.0,
        }
    }
}

/// CSS color names/hex plus a few material names the CSS parser does
/// not know.
pub fn parse_color(color: Option<&str>, default: Color) -> Color {
    let Some(color_string) = color else {
        return default;
    };

    match csscolorparser::parse(color_string) {
        Ok(css) => Color::srgba(css.r as f32, css.g as f32, css.b as f32, css.a as f32),
        Err(_error) => match color_string {
            "stone" => Color::srgb_u8(200, 200, 200),
            "brick" => Color::srgb_u8(255, 128, 128),
            "concrete" => Color::srgb_u8(128, 128, 128),
            "glass" => Color::srgb_u8(150, 150, 220),
            "wood" => Color::srgb_u8(145, 106, 47),
            _ => {
                warn!("unknown color {color_string:?}: {_error}");
                default
            }
        },
    }
}

/// Warehouse data handed into the app; `None` draws the default ground.
#[derive(Resource)]
struct SessionInput {
    warehouse: Option<Warehouse>,
}

/// The session's state machine, kept for the teardown path.
#[derive(Resource)]
struct ActiveSession(SceneAssembler);

/// Marker on every entity owned by the session (container, camera,
/// lights, fallback ground), so teardown despawns exactly one session.
#[derive(Component)]
struct SessionRoot;

pub fn mesh_from_attributes(attributes: &MeshAttributes) -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_indices(Indices::U32(attributes.indices_to_vertices.clone()))
    .with_inserted_attribute(
        Mesh::ATTRIBUTE_POSITION,
        attributes.vertices_positions.clone(),
    )
    .with_computed_normals()
}

/// Resolves the session before the first frame: geometry, recentering
/// and camera framing all happen here, the frame loop only ever sees a
/// finished scene.
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut control_values: ResMut<ControlValues>,
    mut session: ResMut<ActiveSession>,
    input: Res<SessionInput>,
    settings: Res<VizSettings>,
) {
    control_values.speed = settings.camera_speed;

    let builder = GeometryBuilder::with_earcut(settings.wall_loop);
    let blueprint = session
        .0
        .build(input.warehouse.as_ref(), &builder)
        .clone();

    // Camera at the framed (or fallback) pose.
    commands.spawn((
        Camera3d::default(),
        FlyCam,
        SessionRoot,
        Transform::from_translation(blueprint.camera.position)
            .looking_at(blueprint.camera.target, Vec3::Y),
    ));

    // Sky-style fill light plus one directional light, like an
    // overcast day.
    commands.spawn((
        DirectionalLight {
            illuminance: 4_000.0,
            ..default()
        },
        SessionRoot,
        Transform::from_xyz(0.0, 20.0, -20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    match &blueprint.floor {
        Some(floor) => {
            let floor_mesh = meshes.add(mesh_from_attributes(floor));
            let floor_material = materials.add(StandardMaterial {
                base_color: settings.floor_color,
                perceptual_roughness: 0.9,
                double_sided: true,
                cull_mode: None,
                ..default()
            });
            let wall_material = materials.add(StandardMaterial {
                base_color: settings.wall_color,
                perceptual_roughness: 0.8,
                ..default()
            });

            // The container transform is the only thing that moves the
            // model to the origin.
            commands
                .spawn((
                    Transform::from_translation(blueprint.container_offset),
                    Visibility::default(),
                    SessionRoot,
                ))
                .with_children(|container| {
                    container.spawn((Mesh3d(floor_mesh), MeshMaterial3d(floor_material)));
                    for wall in &blueprint.walls {
                        let wall_mesh =
                            meshes.add(Cuboid::new(wall.width, wall.height, wall.depth));
                        container.spawn((
                            Mesh3d(wall_mesh),
                            MeshMaterial3d(wall_material.clone()),
                            Transform::from_translation(wall.midpoint)
                                .with_rotation(Quat::from_rotation_y(wall.rotation_y)),
                            CulledWall {
                                thickness: wall.width,
                            },
                        ));
                    }
                });
        }
        None => {
            let ground_mesh = meshes.add(
                Plane3d::default()
                    .mesh()
                    .size(DEFAULT_GROUND_SIZE, DEFAULT_GROUND_SIZE),
            );
            let ground_material = materials.add(StandardMaterial {
                base_color: settings.ground_color,
                ..default()
            });
            commands.spawn((
                Mesh3d(ground_mesh),
                MeshMaterial3d(ground_material),
                SessionRoot,
            ));
        }
    }

    session.0.start_rendering();
}

/// Explicit session teardown on Escape: despawns everything the
/// session owns, resolves the state machine to Disposed and releases
/// the engine. Window and input listeners die with the app.
fn teardown_on_escape(
    keys: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    owned: Query<Entity, With<SessionRoot>>,
    mut session: ResMut<ActiveSession>,
    mut app_exit: EventWriter<AppExit>,
) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }
    for entity in &owned {
        commands.entity(entity).despawn();
    }
    session.0.dispose();
    app_exit.write(AppExit::Success);
}

pub fn bevy_init(warehouse: Option<Warehouse>, settings: VizSettings) {
    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(ClearColor(Color::srgb(0.9, 0.9, 0.9)))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 300.0,
            ..default()
        })
        .insert_resource(settings)
        .insert_resource(SessionInput { warehouse })
        .insert_resource(ActiveSession(SceneAssembler::new()))
        .add_plugins(CameraControlPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, teardown_on_escape)
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_3d::Earcut;

    #[test]
    fn parse_color_accepts_css_and_material_names() {
        let default = Color::srgb(0.1, 0.2, 0.3);
        assert_eq!(parse_color(None, default), default);
        assert_eq!(parse_color(Some("no-such-color"), default), default);
        assert_eq!(parse_color(Some("wood"), default), Color::srgb_u8(145, 106, 47));

        let red = parse_color(Some("#ff0000"), default);
        assert_eq!(red, Color::srgba(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn floor_mesh_attributes_become_a_triangle_list() {
        let builder = GeometryBuilder::new(Earcut, WallLoop::ArrayOrder);
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, 0.0),
        ];
        let geometry = builder.build(&points, None, false).unwrap();
        let mesh = mesh_from_attributes(&geometry.floor);
        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::TriangleList);
        assert!(mesh.indices().is_some());
    }
}
