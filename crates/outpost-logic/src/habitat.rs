//! Append-only habitat model.
//!
//! The habitat is the cumulative build state of the outpost: an ordered list
//! of placed structural parts. Parts are only ever added, never edited or
//! removed, so the list doubles as the construction history.
//!
//! ```
//! use outpost_logic::habitat::{HabitatModel, HabitatPartDescriptor, PartType, Vec3};
//!
//! let mut habitat = HabitatModel::new();
//! let lander = habitat.add_part(HabitatPartDescriptor {
//!     part_type: PartType::Cylinder,
//!     position: Vec3::ZERO,
//!     rotation: Vec3::ZERO,
//!     scale: Vec3::ONE,
//! });
//! assert_eq!(habitat.parts()[0].id, lander.id);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A plain 3-component vector, serialized as `{x, y, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Structural part types the backend may place.
///
/// `Unknown` is never accepted from the story backend. It only appears when
/// a saved journal names a part type this build does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartType {
    Cylinder,
    Dome,
    Tube,
    Airlock,
    #[serde(other)]
    Unknown,
}

impl PartType {
    /// Types the story backend is allowed to request, in schema order.
    pub const BUILDABLE: [PartType; 4] = [
        PartType::Cylinder,
        PartType::Dome,
        PartType::Tube,
        PartType::Airlock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PartType::Cylinder => "CYLINDER",
            PartType::Dome => "DOME",
            PartType::Tube => "TUBE",
            PartType::Airlock => "AIRLOCK",
            PartType::Unknown => "UNKNOWN",
        }
    }

    pub fn is_buildable(self) -> bool {
        self != PartType::Unknown
    }
}

/// A part placement as described by the backend, before it has an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitatPartDescriptor {
    pub part_type: PartType,
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// A placed part with its stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitatPart {
    pub id: String,
    pub part_type: PartType,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// Immutable view of the habitat at one version, shared with the renderer.
#[derive(Debug, Clone, Default)]
pub struct HabitatSnapshot {
    pub version: u64,
    pub parts: Arc<[HabitatPart]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HabitatError {
    #[error("stored part identities leave no room for new parts")]
    IdsExhausted,
}

/// Ordered, append-only collection of habitat parts.
#[derive(Debug, Clone, Default)]
pub struct HabitatModel {
    parts: Vec<HabitatPart>,
    next_id: u64,
    version: u64,
}

impl HabitatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a model from previously stored parts.
    ///
    /// Fresh identities continue past the highest `part-<n>` suffix found,
    /// so parts added afterwards never collide with restored ones.
    pub fn from_parts(parts: Vec<HabitatPart>) -> Result<Self, HabitatError> {
        let next_id = match parts
            .iter()
            .filter_map(|p| p.id.strip_prefix("part-"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
        {
            Some(n) => n.checked_add(1).ok_or(HabitatError::IdsExhausted)?,
            None => 0,
        };
        let version = parts.len() as u64;
        Ok(Self {
            parts,
            next_id,
            version,
        })
    }

    /// Assign a fresh identity to `descriptor`, append it and return the stored part.
    pub fn add_part(&mut self, descriptor: HabitatPartDescriptor) -> HabitatPart {
        let part = HabitatPart {
            id: format!("part-{}", self.next_id),
            part_type: descriptor.part_type,
            position: descriptor.position,
            rotation: descriptor.rotation,
            scale: descriptor.scale,
        };
        self.next_id += 1;
        self.version += 1;
        self.parts.push(part.clone());
        part
    }

    /// Parts in insertion order.
    pub fn parts(&self) -> &[HabitatPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Bumped on every append.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> HabitatSnapshot {
        HabitatSnapshot {
            version: self.version,
            parts: Arc::from(self.parts.as_slice()),
        }
    }
}

impl HabitatSnapshot {
    /// Mean of all part positions, or the origin for an empty habitat.
    pub fn centroid(&self) -> Vec3 {
        if self.parts.is_empty() {
            return Vec3::ZERO;
        }
        let n = self.parts.len() as f32;
        let (x, y, z) = self.parts.iter().fold((0.0, 0.0, 0.0), |acc, p| {
            (acc.0 + p.position.x, acc.1 + p.position.y, acc.2 + p.position.z)
        });
        Vec3::new(x / n, y / n, z / n)
    }
}
