//! 3D rendering for the Outpost client.
//!
//! Turns the published habitat snapshot into mesh entities. Whenever the
//! snapshot version changes, every habitat entity is despawned and the whole
//! habitat is spawned again from scratch.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use outpost_logic::geometry::{part_geometry, TriMesh};
use outpost_logic::habitat::{HabitatPart, PartType};

use crate::state::{HabitatMesh, PublishedHabitat, ViewState};

pub struct PartVisual {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// Shared mesh and material per buildable part type.
#[derive(Resource, Default)]
pub struct PartMeshLibrary {
    visuals: HashMap<PartType, PartVisual>,
}

impl PartMeshLibrary {
    pub fn get(&self, part_type: PartType) -> Option<&PartVisual> {
        self.visuals.get(&part_type)
    }
}

/// Convert a logic-side triangle mesh into a Bevy mesh. Data stays readable
/// in the main world so the export can walk it.
pub fn tri_mesh_to_bevy(mesh: &TriMesh) -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, mesh.positions.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, mesh.normals.clone())
        .with_inserted_indices(Indices::U32(mesh.indices.clone()))
}

fn part_material(part_type: PartType) -> StandardMaterial {
    match part_type {
        PartType::Cylinder => StandardMaterial {
            base_color: Color::srgb(0.85, 0.85, 0.82),
            perceptual_roughness: 0.5,
            metallic: 0.4,
            ..default()
        },
        PartType::Dome => StandardMaterial {
            base_color: Color::srgba(0.55, 0.75, 0.9, 0.6),
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 0.1,
            ..default()
        },
        PartType::Tube => StandardMaterial {
            base_color: Color::srgb(0.6, 0.6, 0.62),
            perceptual_roughness: 0.6,
            metallic: 0.3,
            ..default()
        },
        PartType::Airlock | PartType::Unknown => StandardMaterial {
            base_color: Color::srgb(0.9, 0.5, 0.15),
            perceptual_roughness: 0.7,
            ..default()
        },
    }
}

pub fn init_part_library(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut library = PartMeshLibrary::default();
    for part_type in PartType::BUILDABLE {
        let Some(geometry) = part_geometry(part_type) else {
            continue;
        };
        library.visuals.insert(
            part_type,
            PartVisual {
                mesh: meshes.add(tri_mesh_to_bevy(&geometry)),
                material: materials.add(part_material(part_type)),
            },
        );
    }
    commands.insert_resource(library);
}

/// Position, rotation (Euler XYZ, radians) and scale of a placed part.
pub fn part_transform(part: &HabitatPart) -> Transform {
    let r = part.rotation;
    Transform {
        translation: Vec3::from_array(part.position.to_array()),
        rotation: Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
        scale: Vec3::from_array(part.scale.to_array()),
    }
}

pub fn sync_habitat(
    mut commands: Commands,
    published: Res<PublishedHabitat>,
    mut view: ResMut<ViewState>,
    library: Res<PartMeshLibrary>,
    existing: Query<Entity, With<HabitatMesh>>,
) {
    let snapshot = &published.0;
    if view.rendered_version == Some(snapshot.version) {
        return;
    }
    view.rendered_version = Some(snapshot.version);

    // Full replace, no diffing
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let mut drawn = 0;
    for part in snapshot.parts.iter() {
        let Some(visual) = library.get(part.part_type) else {
            debug!("Skipping part {} of unknown type", part.id);
            continue;
        };
        commands.spawn((
            Mesh3d(visual.mesh.clone()),
            MeshMaterial3d(visual.material.clone()),
            part_transform(part),
            HabitatMesh {
                part_id: part.id.clone(),
            },
        ));
        drawn += 1;
    }
    info!(
        "Habitat rebuilt: {} of {} parts drawn (version {})",
        drawn,
        snapshot.parts.len(),
        snapshot.version
    );
}
