//! Camera setup and control for the Outpost client.
//!
//! The 3D camera renders into the part of the window right of the story
//! panel and orbits the habitat. A second camera draws the UI over the whole
//! window.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::render::camera::{ClearColorConfig, Viewport};
use bevy::ui::IsDefaultUiCamera;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::state::{OrbitState, PlayerCamera, PublishedHabitat};

/// Share of the window width taken by the story panel.
pub const PANEL_FRACTION: f32 = 0.42;

const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 40.0;
const DRAG_SPEED: f32 = 0.005;

pub fn setup_camera(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let orbit = OrbitState::default();
    commands.spawn((
        Camera3d::default(),
        Camera {
            order: 0,
            ..default()
        },
        Transform::from_translation(orbit_eye(orbit.target, orbit.yaw, orbit.pitch, orbit.distance))
            .looking_at(orbit.target, Vec3::Y),
        PlayerCamera,
    ));
    commands.insert_resource(orbit);

    // UI camera on top, full window
    commands.spawn((
        Camera2d,
        Camera {
            order: 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        IsDefaultUiCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(1.0, 0.85, 0.75),
        brightness: 300.0,
    });

    // Low sun
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            color: Color::srgb(1.0, 0.9, 0.8),
            ..default()
        },
        Transform::from_xyz(6.0, 10.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Regolith
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(60.0, 60.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.55, 0.27, 0.15),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::from_xyz(0.0, -0.01, 0.0),
    ));
}

/// Camera position for an orbit around `target`.
pub fn orbit_eye(target: Vec3, yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    let horizontal = distance * pitch.cos();
    target + Vec3::new(horizontal * yaw.sin(), distance * pitch.sin(), horizontal * yaw.cos())
}

/// Viewport for the 3D view in a window of the given physical size, or
/// `None` while the window has no area.
pub fn habitat_viewport(width: u32, height: u32) -> Option<Viewport> {
    let left = (width as f32 * PANEL_FRACTION).round() as u32;
    let view_width = width.saturating_sub(left);
    if view_width == 0 || height == 0 {
        return None;
    }
    Some(Viewport {
        physical_position: UVec2::new(left, 0),
        physical_size: UVec2::new(view_width, height),
        ..default()
    })
}

pub fn fit_viewport(
    mut resized: EventReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<&mut Camera, With<PlayerCamera>>,
) {
    let Ok(mut camera) = cameras.get_single_mut() else {
        return;
    };
    let was_resized = resized.read().count() > 0;
    if !was_resized && camera.viewport.is_some() {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    camera.viewport = habitat_viewport(window.physical_width(), window.physical_height());
}

pub fn orbit_camera(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut scroll: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    published: Res<PublishedHabitat>,
    mut orbit: ResMut<OrbitState>,
    mut camera_q: Query<&mut Transform, With<PlayerCamera>>,
) {
    let drag: Vec2 = motion.read().map(|m| m.delta).sum();
    let zoom: f32 = scroll.read().map(|s| s.y).sum();

    let over_view = windows
        .get_single()
        .ok()
        .and_then(|w| w.cursor_position().map(|c| c.x > w.width() * PANEL_FRACTION))
        .unwrap_or(false);

    if over_view {
        if mouse.pressed(MouseButton::Left) {
            orbit.yaw -= drag.x * DRAG_SPEED;
            orbit.pitch = (orbit.pitch + drag.y * DRAG_SPEED).clamp(0.05, 1.45);
        }
        if zoom != 0.0 {
            orbit.distance = (orbit.distance * (1.0 - zoom * 0.1)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    let c = published.0.centroid();
    let goal = Vec3::new(c.x, c.y, c.z);
    orbit.target = orbit.target.lerp(goal, 0.08);

    let Ok(mut cam_tf) = camera_q.get_single_mut() else {
        return;
    };
    *cam_tf = Transform::from_translation(orbit_eye(orbit.target, orbit.yaw, orbit.pitch, orbit.distance))
        .looking_at(orbit.target, Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_eye_keeps_distance() {
        let target = Vec3::new(1.0, 0.5, -2.0);
        for (yaw, pitch) in [(0.0, 0.3), (2.0, 1.2), (-1.0, 0.05)] {
            let eye = orbit_eye(target, yaw, pitch, 7.0);
            assert!((eye.distance(target) - 7.0).abs() < 1e-4);
            assert!(eye.y > target.y);
        }
    }

    #[test]
    fn test_viewport_leaves_room_for_panel() {
        let viewport = habitat_viewport(1000, 600).unwrap();
        assert_eq!(viewport.physical_position, UVec2::new(420, 0));
        assert_eq!(viewport.physical_size, UVec2::new(580, 600));
    }

    #[test]
    fn test_minimized_window_has_no_viewport() {
        assert!(habitat_viewport(0, 0).is_none());
        assert!(habitat_viewport(1280, 0).is_none());
    }
}
