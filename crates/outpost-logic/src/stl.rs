//! Binary STL encoding.
//!
//! Layout: 80-byte header, little-endian `u32` triangle count, then 50 bytes
//! per triangle (normal, three vertices, all `f32` LE, and a zero `u16`
//! attribute word).

use std::io::{self, Write};

use crate::geometry::{habitat_triangles, Triangle};
use crate::habitat::HabitatPart;

pub const HEADER_LEN: usize = 80;
pub const TRIANGLE_LEN: usize = 50;
const HEADER_TEXT: &[u8] = b"Outpost habitat export";

/// Unit face normal from the winding of `tri`, or zero for a degenerate triangle.
pub fn face_normal(tri: &Triangle) -> [f32; 3] {
    let [a, b, c] = tri;
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len <= f32::EPSILON {
        return [0.0; 3];
    }
    [n[0] / len, n[1] / len, n[2] / len]
}

pub fn write_binary<W: Write>(mut out: W, triangles: &[Triangle]) -> io::Result<()> {
    let count = u32::try_from(triangles.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many triangles for STL"))?;

    let mut header = [0u8; HEADER_LEN];
    header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT);
    out.write_all(&header)?;
    out.write_all(&count.to_le_bytes())?;

    for tri in triangles {
        for component in face_normal(tri) {
            out.write_all(&component.to_le_bytes())?;
        }
        for vertex in tri {
            for component in vertex {
                out.write_all(&component.to_le_bytes())?;
            }
        }
        out.write_all(&0u16.to_le_bytes())?;
    }
    out.flush()
}

pub fn encode_binary(triangles: &[Triangle]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + 4 + triangles.len() * TRIANGLE_LEN);
    // Vec writes are infallible.
    let _ = write_binary(&mut buf, triangles);
    buf
}

/// Binary STL of every drawable part, straight from the model.
pub fn export_parts(parts: &[HabitatPart]) -> Vec<u8> {
    encode_binary(&habitat_triangles(parts))
}

/// Triangle count stored in an STL blob, if the blob is long enough.
pub fn triangle_count(bytes: &[u8]) -> Option<u32> {
    let raw = bytes.get(HEADER_LEN..HEADER_LEN + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}
