//! PMss header parsing.
//!
//! The header is a fixed sequence of four Fortran records at offset 0. Each
//! record is wrapped in 4-byte markers that must equal its payload length;
//! any mismatch means the file is corrupt or was opened with the wrong
//! byte-swap flag, and parsing fails immediately.

use std::io::Read;

use log::{debug, info};

use super::error::{PmssError, Result};
use super::models::PmssHeader;
use super::swap::Codec;

const COSMOLOGY_BYTES: i64 = 24;
const GRID_BYTES: i64 = 24;
const EXTENT_BYTES: i64 = 24;
const COUNT_BYTES: i64 = 4;

/// Parse the PMss file header.
///
/// Record layout:
/// ```text
/// [24] aexpn omega0 omega_l0 hubble box_size particle_mass [24]
/// [24] node_index nx ny nz buffer_width buffer_count       [24]
/// [24] x_left x_right y_left y_right z_left z_right        [24]
/// [ 4] num_particles                                       [ 4]
/// ```
///
/// On success the reader is positioned exactly at the leading marker of the
/// first data block's row-count record.
pub fn parse<R: Read>(file: &mut R, codec: &Codec) -> Result<PmssHeader> {
    info!("Parsing PMss header");

    expect_marker(file, codec, COSMOLOGY_BYTES, "cosmology record")?;
    let aexpn = codec.read_f32(file)?;
    let omega0 = codec.read_f32(file)?;
    let omega_l0 = codec.read_f32(file)?;
    let hubble = codec.read_f32(file)?;
    let box_size = codec.read_f32(file)?;
    let particle_mass = codec.read_f32(file)?;
    expect_marker(file, codec, COSMOLOGY_BYTES, "cosmology record")?;

    expect_marker(file, codec, GRID_BYTES, "grid record")?;
    let node_index = codec.read_i32(file)?;
    let nx = codec.read_i32(file)?;
    let ny = codec.read_i32(file)?;
    let nz = codec.read_i32(file)?;
    let buffer_width = codec.read_f32(file)?;
    let buffer_count = codec.read_i32(file)?;
    expect_marker(file, codec, GRID_BYTES, "grid record")?;

    expect_marker(file, codec, EXTENT_BYTES, "extent record")?;
    let x_left = codec.read_f32(file)?;
    let x_right = codec.read_f32(file)?;
    let y_left = codec.read_f32(file)?;
    let y_right = codec.read_f32(file)?;
    let z_left = codec.read_f32(file)?;
    let z_right = codec.read_f32(file)?;
    expect_marker(file, codec, EXTENT_BYTES, "extent record")?;

    expect_marker(file, codec, COUNT_BYTES, "particle count record")?;
    let num_particles = codec.read_i32(file)?;
    expect_marker(file, codec, COUNT_BYTES, "particle count record")?;

    info!(
        "Header parsed: aexpn={}, box={}, node={} of {}x{}x{}, np={}",
        aexpn, box_size, node_index, nx, ny, nz, num_particles
    );
    debug!(
        "Cosmology: omega0={}, omega_l0={}, hubble={}, mass={}",
        omega0, omega_l0, hubble, particle_mass
    );
    debug!(
        "Buffered extents: x {}..{}, y {}..{}, z {}..{} (buffer width {}, {} buffer particles)",
        x_left, x_right, y_left, y_right, z_left, z_right, buffer_width, buffer_count
    );

    Ok(PmssHeader {
        aexpn,
        omega0,
        omega_l0,
        hubble,
        box_size,
        particle_mass,
        node_index,
        nx,
        ny,
        nz,
        buffer_width,
        buffer_count,
        x_left,
        x_right,
        y_left,
        y_right,
        z_left,
        z_right,
        num_particles,
    })
}

/// Consume one record marker and require it to match the payload length.
fn expect_marker<R: Read>(
    file: &mut R,
    codec: &Codec,
    expected: i64,
    context: &'static str,
) -> Result<()> {
    let found = codec
        .read_i32(file)
        .map_err(|e| PmssError::from_read(e, context))? as i64;
    if found != expected {
        return Err(PmssError::MarkerMismatch {
            context,
            expected,
            found,
        });
    }
    Ok(())
}
