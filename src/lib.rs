//! # pmss-reader
//!
//! A reader for PMss unformatted binary snapshot files, as written by
//! particle-mesh N-body simulations. Each file holds the particles of one
//! spatial sub-box of the simulation domain, plus a buffer of duplicated
//! halo particles that are owned by neighboring sub-boxes.
//!
//! The reader parses the Fortran-record header, derives the sub-box's
//! non-overlapping ownership region, and streams particle rows out of the
//! length-delimited data blocks, dropping buffer particles that belong to
//! other files.
pub mod pmss;

// Re-export the main types for convenience
pub use pmss::{
    boundary::{ownership_box, GeometryMismatch},
    error::{PmssError, Result},
    models::{Column, ColumnValue, OwnershipBox, ParticleRow, PmssHeader},
    swap::{swap32, swap64},
    ParticleStream, PmssReadOptions,
};
