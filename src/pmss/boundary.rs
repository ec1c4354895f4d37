//! Spatial domain decomposition geometry.
//!
//! The simulation cube is split into `nx * ny * nz` sub-boxes, indexed
//! 1-based in row-major order with x fastest, y next, z slowest. Each file
//! stores one sub-box plus a halo buffer; only the region computed here is
//! the file's own.

use std::fmt;

use super::models::{OwnershipBox, PmssHeader};

/// Absolute tolerance, in box-length units, when comparing the computed
/// buffered extents against the extents declared in the header. Producers
/// round the stored extents to float precision, so exact equality is never
/// expected.
pub const EXTENT_TOLERANCE: f32 = 1e-3;

/// Compute the non-overlapping ownership region of a sub-box.
///
/// Deterministic in its inputs; the grid indices are recovered from the
/// 1-based `node_index` as
/// `k = (n-1)/(nx*ny) + 1`, `j = (n - (k-1)*nx*ny - 1)/nx + 1`,
/// `i = n - (k-1)*nx*ny - (j-1)*nx`, then scaled by the per-axis cell width
/// `box_size / n{x,y,z}`.
pub fn ownership_box(node_index: i32, nx: i32, ny: i32, nz: i32, box_size: f32) -> OwnershipBox {
    let k = (node_index - 1) / (nx * ny) + 1;
    let j = (node_index - (k - 1) * nx * ny - 1) / nx + 1;
    let i = node_index - (k - 1) * nx * ny - (j - 1) * nx;

    let qx = box_size / nx as f32;
    let qy = box_size / ny as f32;
    let qz = box_size / nz as f32;

    OwnershipBox {
        x_left: (i - 1) as f32 * qx,
        x_right: i as f32 * qx,
        y_left: (j - 1) as f32 * qy,
        y_right: j as f32 * qy,
        z_left: (k - 1) as f32 * qz,
        z_right: k as f32 * qz,
    }
}

/// One axis bound where computed and declared geometry disagree.
///
/// Not a [`PmssError`](super::error::PmssError): legacy producers tolerate
/// small buffer variance, so the stream logs this and keeps decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryMismatch {
    /// Which bound disagreed, e.g. `"xL"`.
    pub axis: &'static str,
    /// Ownership bound expanded by the header's buffer width.
    pub computed: f32,
    /// Raw extent declared in the header.
    pub declared: f32,
}

impl fmt::Display for GeometryMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "geometry mismatch at {}: computed buffered bound {} vs header {} (tolerance {})",
            self.axis, self.computed, self.declared, EXTENT_TOLERANCE
        )
    }
}

/// Cross-check the ownership box against the header's buffered extents.
///
/// The header stores the sub-box extents with the halo buffer included, so
/// every ownership bound pushed outward by `buffer_width` must land on the
/// declared extent within [`EXTENT_TOLERANCE`]. The first violating axis is
/// reported.
pub fn verify_buffered_extents(
    bounds: &OwnershipBox,
    header: &PmssHeader,
) -> Result<(), GeometryMismatch> {
    let buffer = header.buffer_width;
    let checks = [
        ("xL", bounds.x_left - buffer, header.x_left),
        ("xR", bounds.x_right + buffer, header.x_right),
        ("yL", bounds.y_left - buffer, header.y_left),
        ("yR", bounds.y_right + buffer, header.y_right),
        ("zL", bounds.z_left - buffer, header.z_left),
        ("zR", bounds.z_right + buffer, header.z_right),
    ];
    for (axis, computed, declared) in checks {
        if (computed - declared).abs() > EXTENT_TOLERANCE {
            return Err(GeometryMismatch {
                axis,
                computed,
                declared,
            });
        }
    }
    Ok(())
}
