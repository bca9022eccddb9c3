//! File exports: the habitat as binary STL and the session journal as JSON.
//!
//! The STL is built from the meshes actually in the scene, so it always
//! matches what is on screen. Parts are root entities, so their local
//! `Transform` is their world placement even in the frame they were spawned.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use bevy::prelude::*;
use bevy::render::mesh::VertexAttributeValues;
use outpost_logic::geometry::Triangle;
use outpost_logic::journal::SessionSnapshot;
use outpost_logic::stl;
use thiserror::Error;

use crate::state::{ClientConfig, GameSession, HabitatMesh, PlayerAction, UiState};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode journal: {0}")]
    Json(#[from] serde_json::Error),
}

/// World-space triangles of one mesh. Meshes without float3 positions yield nothing.
pub fn mesh_triangles(mesh: &Mesh, transform: &Transform) -> Vec<Triangle> {
    let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
        return Vec::new();
    };
    let world: Vec<[f32; 3]> = positions
        .iter()
        .map(|p| transform.transform_point(Vec3::from_array(*p)).to_array())
        .collect();
    let indices: Vec<usize> = match mesh.indices() {
        Some(indices) => indices.iter().collect(),
        None => (0..world.len()).collect(),
    };
    indices
        .chunks_exact(3)
        .filter_map(|t| Some([*world.get(t[0])?, *world.get(t[1])?, *world.get(t[2])?]))
        .collect()
}

pub fn write_stl(path: &Path, triangles: &[Triangle]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    stl::write_binary(&mut out, triangles)?;
    out.flush()
}

pub fn write_journal(path: &Path, snapshot: &SessionSnapshot) -> Result<(), ExportError> {
    let json = snapshot.to_json_pretty()?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn export_habitat(
    mut actions: EventReader<PlayerAction>,
    config: Res<ClientConfig>,
    meshes: Res<Assets<Mesh>>,
    parts: Query<(&HabitatMesh, &Mesh3d, &Transform)>,
    mut ui: ResMut<UiState>,
) {
    let requested = actions
        .read()
        .filter(|a| **a == PlayerAction::ExportHabitat)
        .count();
    if requested == 0 {
        return;
    }

    // Query order is arbitrary; sort so repeated exports are byte-identical.
    let mut visible: Vec<_> = parts.iter().collect();
    visible.sort_by(|a, b| a.0.part_id.cmp(&b.0.part_id));
    let triangles: Vec<Triangle> = visible
        .into_iter()
        .filter_map(|(_, mesh, transform)| meshes.get(&mesh.0).map(|m| mesh_triangles(m, transform)))
        .flatten()
        .collect();

    let path = &config.export_path;
    match write_stl(path, &triangles) {
        Ok(()) => {
            info!("Exported {} triangles to {}", triangles.len(), path.display());
            ui.toast(
                format!("Habitat saved to {}", path.display()),
                Color::srgb(0.6, 1.0, 0.6),
                4.0,
            );
        }
        Err(e) => {
            error!("STL export to {} failed: {}", path.display(), e);
            ui.toast(format!("Export failed: {}", e), Color::srgb(1.0, 0.4, 0.4), 5.0);
        }
    }
}

pub fn save_journal(
    mut actions: EventReader<PlayerAction>,
    config: Res<ClientConfig>,
    session: Res<GameSession>,
    mut ui: ResMut<UiState>,
) {
    if !actions.read().any(|a| *a == PlayerAction::SaveJournal) {
        return;
    }
    // Drain the rest so nothing carries into the next frame.
    actions.clear();

    // Unknown part types are not kept verbatim, so a reviewed journal is never rewritten.
    if config.review_journal.is_some() {
        warn!("Journal save ignored in review mode");
        ui.toast(
            "Reviewing a saved journal; nothing to save",
            Color::srgb(1.0, 0.8, 0.4),
            4.0,
        );
        return;
    }

    let path = &config.journal_path;
    match write_journal(path, &SessionSnapshot::capture(&session.0)) {
        Ok(()) => {
            info!("Journal written to {}", path.display());
            ui.toast(
                format!("Journal saved to {}", path.display()),
                Color::srgb(0.6, 1.0, 0.6),
                4.0,
            );
        }
        Err(e) => {
            error!("Journal save to {} failed: {}", path.display(), e);
            ui.toast(format!("Journal not saved: {}", e), Color::srgb(1.0, 0.4, 0.4), 5.0);
        }
    }
}
