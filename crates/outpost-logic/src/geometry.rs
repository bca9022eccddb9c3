//! Triangle meshes for habitat parts.
//!
//! Geometry depends only on the part type:
//!
//! | Part | Shape |
//! |------|-------|
//! | `CYLINDER` | cylinder, radius 0.5, height 1, centered on the origin |
//! | `DOME` | hemisphere, radius 0.5, flat base on y = 0 |
//! | `TUBE` | cylinder, radius 0.2, height 1, centered on the origin |
//! | `AIRLOCK` | box 0.4 × 0.6 × 0.4, centered on the origin |
//!
//! Winding is counter-clockwise seen from outside, normals point outward.
//! Part transforms apply scale, then rotation (Euler X·Y·Z), then translation.

use std::f32::consts::{FRAC_PI_2, TAU};

use crate::habitat::{HabitatPart, PartType, Vec3};

pub const CYLINDER_RADIUS: f32 = 0.5;
pub const CYLINDER_HEIGHT: f32 = 1.0;
pub const DOME_RADIUS: f32 = 0.5;
pub const TUBE_RADIUS: f32 = 0.2;
pub const TUBE_HEIGHT: f32 = 1.0;
pub const AIRLOCK_SIZE: [f32; 3] = [0.4, 0.6, 0.4];

const RADIAL_SEGMENTS: u32 = 32;
const DOME_RINGS: u32 = 16;

pub type Triangle = [[f32; 3]; 3];

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TriMesh {
    fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) -> u32 {
        self.positions.push(position);
        self.normals.push(normal);
        (self.positions.len() - 1) as u32
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }
}

/// Mesh for a part type, or `None` for types this build cannot draw.
pub fn part_geometry(part_type: PartType) -> Option<TriMesh> {
    match part_type {
        PartType::Cylinder => Some(cylinder(CYLINDER_RADIUS, CYLINDER_HEIGHT, RADIAL_SEGMENTS)),
        PartType::Dome => Some(hemisphere(DOME_RADIUS, RADIAL_SEGMENTS, DOME_RINGS)),
        PartType::Tube => Some(cylinder(TUBE_RADIUS, TUBE_HEIGHT, RADIAL_SEGMENTS)),
        PartType::Airlock => Some(cuboid(AIRLOCK_SIZE)),
        PartType::Unknown => None,
    }
}

/// Closed cylinder along Y.
pub fn cylinder(radius: f32, height: f32, segments: u32) -> TriMesh {
    let mut mesh = TriMesh::default();
    let half = height / 2.0;
    let ring = |i: u32| {
        let theta = TAU * i as f32 / segments as f32;
        (theta.sin(), theta.cos())
    };

    // Side wall: a seam column is duplicated so every quad has its own vertices.
    let mut bottom = Vec::with_capacity(segments as usize + 1);
    let mut top = Vec::with_capacity(segments as usize + 1);
    for i in 0..=segments {
        let (s, c) = ring(i);
        let normal = [s, 0.0, c];
        bottom.push(mesh.push_vertex([radius * s, -half, radius * c], normal));
        top.push(mesh.push_vertex([radius * s, half, radius * c], normal));
    }
    for i in 0..segments as usize {
        mesh.push_triangle(bottom[i], bottom[i + 1], top[i]);
        mesh.push_triangle(bottom[i + 1], top[i + 1], top[i]);
    }

    for (y, normal) in [(half, [0.0, 1.0, 0.0]), (-half, [0.0, -1.0, 0.0])] {
        let center = mesh.push_vertex([0.0, y, 0.0], normal);
        let rim: Vec<u32> = (0..=segments)
            .map(|i| {
                let (s, c) = ring(i);
                mesh.push_vertex([radius * s, y, radius * c], normal)
            })
            .collect();
        for i in 0..segments as usize {
            if y > 0.0 {
                mesh.push_triangle(center, rim[i], rim[i + 1]);
            } else {
                mesh.push_triangle(center, rim[i + 1], rim[i]);
            }
        }
    }
    mesh
}

/// Upper half of a sphere centered on the origin, closed by a base disc.
pub fn hemisphere(radius: f32, segments: u32, rings: u32) -> TriMesh {
    let mut mesh = TriMesh::default();
    let columns = segments as usize + 1;

    // Row 0 is the pole, row `rings` is the equator.
    for j in 0..=rings {
        let phi = FRAC_PI_2 * j as f32 / rings as f32;
        for i in 0..=segments {
            let theta = TAU * i as f32 / segments as f32;
            let normal = [phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos()];
            mesh.push_vertex(
                [radius * normal[0], radius * normal[1], radius * normal[2]],
                normal,
            );
        }
    }
    for j in 0..rings as usize {
        for i in 0..segments as usize {
            let a = (j * columns + i) as u32;
            let b = (j * columns + i + 1) as u32;
            let c = ((j + 1) * columns + i) as u32;
            let d = ((j + 1) * columns + i + 1) as u32;
            mesh.push_triangle(c, d, a);
            // The pole row collapses to a point, so its second triangle is degenerate.
            if j > 0 {
                mesh.push_triangle(d, b, a);
            }
        }
    }

    let normal = [0.0, -1.0, 0.0];
    let center = mesh.push_vertex([0.0, 0.0, 0.0], normal);
    let rim: Vec<u32> = (0..=segments)
        .map(|i| {
            let theta = TAU * i as f32 / segments as f32;
            mesh.push_vertex([radius * theta.sin(), 0.0, radius * theta.cos()], normal)
        })
        .collect();
    for i in 0..segments as usize {
        mesh.push_triangle(center, rim[i + 1], rim[i]);
    }
    mesh
}

/// Box centered on the origin with full extents `size`.
pub fn cuboid(size: [f32; 3]) -> TriMesh {
    let mut mesh = TriMesh::default();
    let h = [size[0] / 2.0, size[1] / 2.0, size[2] / 2.0];
    // (normal, u, v) with u × v = normal.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];
    for (n, u, v) in faces {
        let corner = |su: f32, sv: f32| {
            let mut p = [0.0; 3];
            for axis in 0..3 {
                p[axis] = (n[axis] + su * u[axis] + sv * v[axis]) * h[axis];
            }
            p
        };
        let base = mesh.push_vertex(corner(-1.0, -1.0), n);
        mesh.push_vertex(corner(1.0, -1.0), n);
        mesh.push_vertex(corner(1.0, 1.0), n);
        mesh.push_vertex(corner(-1.0, 1.0), n);
        mesh.push_triangle(base, base + 1, base + 2);
        mesh.push_triangle(base, base + 2, base + 3);
    }
    mesh
}

/// Rotate `p` by Euler angles (radians) in X·Y·Z order: Z first, then Y, then X.
pub fn rotate_euler_xyz(p: [f32; 3], rotation: Vec3) -> [f32; 3] {
    let [x, y, z] = p;
    let (sz, cz) = rotation.z.sin_cos();
    let (x, y) = (x * cz - y * sz, x * sz + y * cz);
    let (sy, cy) = rotation.y.sin_cos();
    let (x, z) = (x * cy + z * sy, -x * sy + z * cy);
    let (sx, cx) = rotation.x.sin_cos();
    let (y, z) = (y * cx - z * sx, y * sx + z * cx);
    [x, y, z]
}

/// Map a point from part space into habitat space.
pub fn transform_point(part: &HabitatPart, p: [f32; 3]) -> [f32; 3] {
    let scaled = [p[0] * part.scale.x, p[1] * part.scale.y, p[2] * part.scale.z];
    let [x, y, z] = rotate_euler_xyz(scaled, part.rotation);
    [x + part.position.x, y + part.position.y, z + part.position.z]
}

/// World-space triangles for every drawable part, in part order.
pub fn habitat_triangles(parts: &[HabitatPart]) -> Vec<Triangle> {
    let mut out = Vec::new();
    for part in parts {
        let Some(mesh) = part_geometry(part.part_type) else {
            continue;
        };
        out.extend(mesh.triangles().map(|tri| tri.map(|v| transform_point(part, v))));
    }
    out
}
