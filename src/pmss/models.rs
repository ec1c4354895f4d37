//! Core data structures for PMss snapshot components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The decoded file header
//! - The ownership region of a sub-box
//! - Particle rows and the logical column contract

use std::str::FromStr;

use super::error::{PmssError, Result};

/// Byte width of one particle row: six 4-byte reals plus one 8-byte id.
/// Fixed by the format, independent of platform.
pub const ROW_BYTES: usize = 6 * 4 + 8;

/// Complete decoded header of a PMss snapshot file.
///
/// Stored once at the top of each file as four Fortran records:
///
/// ```text
/// [24] aexpn omega0 omega_l0 hubble box_size particle_mass [24]
/// [24] node_index nx ny nz buffer_width buffer_count       [24]
/// [24] x_left x_right y_left y_right z_left z_right        [24]
/// [ 4] num_particles                                       [ 4]
/// ```
///
/// The bracketed numbers are the leading/trailing record markers; each must
/// equal the payload length of its record.
#[derive(Debug, Clone)]
pub struct PmssHeader {
    /// Expansion factor of the universe at this snapshot.
    pub aexpn: f32,
    /// Matter density parameter at z=0.
    pub omega0: f32,
    /// Dark energy density parameter at z=0.
    pub omega_l0: f32,
    /// Hubble constant at z=0 (h).
    pub hubble: f32,
    /// Side length of the full cosmological box, Mpc/h.
    pub box_size: f32,
    /// Mass of one particle.
    pub particle_mass: f32,

    /// 1-based index of this sub-box/file within the grid.
    pub node_index: i32,
    /// Number of sub-boxes along each axis.
    pub nx: i32,
    pub ny: i32,
    pub nz: i32,
    /// Width of the halo overlap region around the sub-box, Mpc/h.
    pub buffer_width: f32,
    /// Number of buffer (halo duplicate) particles in this file.
    pub buffer_count: i32,

    /// Raw spatial extents of this file, buffer included.
    pub x_left: f32,
    pub x_right: f32,
    pub y_left: f32,
    pub y_right: f32,
    pub z_left: f32,
    pub z_right: f32,

    /// Total number of particles stored in this file, buffer included.
    pub num_particles: i32,
}

/// The non-overlapping spatial region one file is authoritative for.
///
/// Derived from the node index and grid geometry alone, never read from the
/// file. Containment is half-open on every axis so that a particle sitting
/// exactly on a face shared by two sub-boxes is claimed by exactly one of
/// them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnershipBox {
    pub x_left: f32,
    pub x_right: f32,
    pub y_left: f32,
    pub y_right: f32,
    pub z_left: f32,
    pub z_right: f32,
}

impl OwnershipBox {
    /// True when the position lies inside this box.
    ///
    /// Left/bottom/near faces are inclusive, right/top/far faces exclusive.
    pub fn contains(&self, x: f32, y: f32, z: f32) -> bool {
        x >= self.x_left
            && x < self.x_right
            && y >= self.y_left
            && y < self.y_right
            && z >= self.z_left
            && z < self.z_right
    }
}

/// One decoded particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRow {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    /// Particle identifier as stored in the file.
    pub id: i64,
    /// Stable external identifier: `node_index * id_factor + rows_consumed`.
    ///
    /// Strictly increasing over all rows read from one file, emitted or
    /// skipped, so a resumed ingestion can deduplicate on it.
    pub file_row_id: i64,
}

/// Closed enumeration of the logical columns a row can export.
///
/// Resolved once at schema-binding time via [`FromStr`]; per-row access goes
/// through [`ParticleRow::column`] and never through string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    PositionX,
    PositionY,
    PositionZ,
    VelocityX,
    VelocityY,
    VelocityZ,
    ParticleId,
    /// Peano-Hilbert grid key slot. The reader never computes it; the value
    /// is always null and downstream loaders fill the column themselves.
    GridKeyPlaceholder,
    FileRowId,
}

impl FromStr for Column {
    type Err = PmssError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "x" => Ok(Self::PositionX),
            "y" => Ok(Self::PositionY),
            "z" => Ok(Self::PositionZ),
            "vx" => Ok(Self::VelocityX),
            "vy" => Ok(Self::VelocityY),
            "vz" => Ok(Self::VelocityZ),
            "id" => Ok(Self::ParticleId),
            "phkey" => Ok(Self::GridKeyPlaceholder),
            "rowid" => Ok(Self::FileRowId),
            _ => Err(PmssError::UnknownColumn(name.to_string())),
        }
    }
}

/// A single exported column value, with nullability made explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue {
    Real(f32),
    Int(i64),
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}

impl ParticleRow {
    /// Export one logical column of this row.
    pub fn column(&self, column: Column) -> ColumnValue {
        match column {
            Column::PositionX => ColumnValue::Real(self.x),
            Column::PositionY => ColumnValue::Real(self.y),
            Column::PositionZ => ColumnValue::Real(self.z),
            Column::VelocityX => ColumnValue::Real(self.vx),
            Column::VelocityY => ColumnValue::Real(self.vy),
            Column::VelocityZ => ColumnValue::Real(self.vz),
            Column::ParticleId => ColumnValue::Int(self.id),
            Column::GridKeyPlaceholder => ColumnValue::Null,
            Column::FileRowId => ColumnValue::Int(self.file_row_id),
        }
    }
}
