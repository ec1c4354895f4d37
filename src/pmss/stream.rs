//! The particle stream: the public, forward-only iterator over one file.
//!
//! Composes the header decoder, the boundary calculator and the block
//! sequencer into a lazy sequence of [`ParticleRow`]s. Buffer particles
//! (halo duplicates stored for neighboring sub-boxes) are filtered out
//! transparently; filtering never terminates the stream, only end of file,
//! corruption or an exhausted row budget do.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info, trace, warn};

use super::blocks::BlockSequencer;
use super::boundary;
use super::error::Result;
use super::header;
use super::models::{OwnershipBox, ParticleRow, PmssHeader, ROW_BYTES};
use super::swap::Codec;

/// Caller-supplied parameters for opening a PMss file.
#[derive(Debug, Clone)]
pub struct PmssReadOptions {
    /// True when the file was written with the opposite byte order.
    pub swap: bool,
    /// Snapshot number of this output. Only the historical id formula ever
    /// used it; accepted for compatibility and reported at open time.
    pub snapnum: i32,
    /// Scale factor separating the node-index part of `file_row_id` from
    /// the row counter.
    pub id_factor: i64,
    /// Expected rows per data block. Each block declares its own count, so
    /// this only seeds the sequencer before the first block header is read.
    pub block_rows_hint: i32,
    /// Number of rows to consume and discard before emitting any.
    pub start_row: i64,
    /// Maximum number of rows to emit, -1 for unbounded.
    pub max_rows: i64,
}

impl Default for PmssReadOptions {
    fn default() -> Self {
        Self {
            swap: false,
            snapnum: 0,
            id_factor: 100_000_000_000,
            block_rows_hint: 500_000,
            start_row: 0,
            max_rows: -1,
        }
    }
}

/// Sequential decoder for one PMss snapshot file.
///
/// Create with [`ParticleStream::open`], then drive through the [`Iterator`]
/// implementation. The stream is forward-only and non-restartable: the
/// format has no random access without replaying block markers from the
/// start.
///
/// The iterator yields `Result<ParticleRow>`. A corruption error is yielded
/// once and ends the stream; a clean end of file or a reached row budget
/// ends it without an error. That distinction lets the driving pipeline
/// decide whether a partial drain is acceptable.
#[derive(Debug)]
pub struct ParticleStream {
    file: BufReader<File>,
    codec: Codec,
    header: PmssHeader,
    bounds: OwnershipBox,
    sequencer: BlockSequencer,
    id_factor: i64,
    max_rows: i64,
    /// All rows read from disk, inside or outside the ownership box.
    rows_consumed: i64,
    /// Rows that passed the filter and were handed to the caller.
    rows_emitted: i64,
    done: bool,
}

impl ParticleStream {
    /// Open a PMss file, decode its header and derive the ownership box.
    ///
    /// A disagreement between the computed and the declared geometry is
    /// logged as a warning and does not abort the stream. `start_row` rows
    /// are consumed (through the validated block machinery) before this
    /// returns.
    pub fn open(path: impl AsRef<Path>, options: PmssReadOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening PMss file: {}", path.display());
        debug!(
            "Options: swap={}, snapnum={}, id_factor={}, start_row={}, max_rows={}",
            options.swap, options.snapnum, options.id_factor, options.start_row, options.max_rows
        );

        let mut file = BufReader::new(File::open(path)?);
        let codec = Codec::new(options.swap);
        let header = header::parse(&mut file, &codec)?;

        let bounds = boundary::ownership_box(
            header.node_index,
            header.nx,
            header.ny,
            header.nz,
            header.box_size,
        );
        info!(
            "Ownership box: x {}..{}, y {}..{}, z {}..{}",
            bounds.x_left, bounds.x_right, bounds.y_left, bounds.y_right, bounds.z_left,
            bounds.z_right
        );
        if let Err(mismatch) = boundary::verify_buffered_extents(&bounds, &header) {
            warn!("{} (node {}); continuing", mismatch, header.node_index);
        }

        let mut stream = Self {
            file,
            codec,
            header,
            bounds,
            sequencer: BlockSequencer::new(options.block_rows_hint),
            id_factor: options.id_factor,
            max_rows: options.max_rows,
            rows_consumed: 0,
            rows_emitted: 0,
            done: false,
        };
        stream.skip_rows(options.start_row)?;
        Ok(stream)
    }

    pub fn header(&self) -> &PmssHeader {
        &self.header
    }

    pub fn ownership_box(&self) -> &OwnershipBox {
        &self.bounds
    }

    /// All rows read from disk so far, emitted or skipped.
    pub fn rows_consumed(&self) -> i64 {
        self.rows_consumed
    }

    /// Rows handed to the caller so far.
    pub fn rows_emitted(&self) -> i64 {
        self.rows_emitted
    }

    fn skip_rows(&mut self, n: i64) -> Result<()> {
        if n <= 0 {
            return Ok(());
        }
        info!("Skipping {} rows before first emission", n);
        while self.rows_consumed < n {
            if self.consume_row()?.is_none() {
                warn!(
                    "File ended after {} rows, before the requested start row {}",
                    self.rows_consumed, n
                );
                self.done = true;
                break;
            }
        }
        Ok(())
    }

    /// Read the next row off the disk regardless of the filter.
    fn consume_row(&mut self) -> Result<Option<ParticleRow>> {
        if !self.sequencer.ensure_in_block(&mut self.file, &self.codec)? {
            return Ok(None);
        }

        // One fixed-width row; sized by the format, not the platform.
        let mut raw = [0u8; ROW_BYTES];
        self.file
            .read_exact(&mut raw)
            .map_err(|e| self.sequencer.fail_row(e))?;
        self.sequencer.note_row();
        self.rows_consumed += 1;

        let codec = self.codec;
        let f = |i: usize| codec.f32_from(raw[i * 4..i * 4 + 4].try_into().unwrap());
        let row = ParticleRow {
            x: f(0),
            y: f(1),
            z: f(2),
            vx: f(3),
            vy: f(4),
            vz: f(5),
            id: self.codec.i64_from(raw[24..32].try_into().unwrap()),
            file_row_id: self.header.node_index as i64 * self.id_factor + self.rows_consumed,
        };

        if self.rows_consumed % 100_000 == 0 {
            trace!(
                "Row {}: x,y,z = {},{},{}",
                self.rows_consumed,
                row.x,
                row.y,
                row.z
            );
        }
        Ok(Some(row))
    }

    /// Advance to the next row inside the ownership box, honoring the
    /// row budget.
    fn next_inside(&mut self) -> Result<Option<ParticleRow>> {
        loop {
            let row = match self.consume_row()? {
                Some(row) => row,
                None => return Ok(None),
            };
            if !self.bounds.contains(row.x, row.y, row.z) {
                continue;
            }
            if self.max_rows >= 0 && self.rows_emitted == self.max_rows {
                info!("Row budget of {} emitted rows reached", self.max_rows);
                return Ok(None);
            }
            self.rows_emitted += 1;
            return Ok(Some(row));
        }
    }
}

impl Iterator for ParticleStream {
    type Item = Result<ParticleRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_inside() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                debug!(
                    "Stream complete: {} rows consumed, {} emitted",
                    self.rows_consumed, self.rows_emitted
                );
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
