//! Fortran-record framing of the particle section.
//!
//! After the header the file is a run of data blocks, each preceded by a
//! small record declaring its row count:
//!
//! ```text
//! [4] nrecord [4]  [nrecord*32] row row row ... [nrecord*32]
//! [4] nrecord [4]  [nrecord*32] row row ...
//! ```
//!
//! The sequencer validates the framing at block granularity and tracks how
//! many rows of the current block have been consumed; the fixed-width row
//! decode itself lives with the stream. A clean end of file is only legal at
//! the leading marker of a row-count record; a short read anywhere else is
//! corruption.

use std::io::Read;

use log::{debug, trace};

use super::error::{PmssError, Result};
use super::models::ROW_BYTES;
use super::swap::Codec;

/// Byte length of the row-count mini-record payload (one i32).
const COUNT_RECORD_BYTES: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    /// Between blocks; the next row request must first re-synchronize.
    NeedsNewBlock,
    /// Inside a validated block with rows left to read.
    InBlock,
    /// The file ended cleanly at a block boundary. Terminal.
    EndOfStream,
    /// A marker check failed or the file ended mid-record. Terminal.
    Corrupt,
}

/// State machine driving the block structure of the particle section.
#[derive(Debug)]
pub(crate) struct BlockSequencer {
    state: BlockState,
    /// Row count declared by the current block. Seeded from the caller's
    /// hint; overwritten as each block header is read.
    declared_rows: i32,
    count_in_block: i32,
    blocks_entered: u64,
}

impl BlockSequencer {
    pub fn new(rows_hint: i32) -> Self {
        Self {
            state: BlockState::NeedsNewBlock,
            declared_rows: rows_hint,
            count_in_block: 0,
            blocks_entered: 0,
        }
    }

    /// Drive the sequencer until a validated block is positioned under the
    /// reader.
    ///
    /// Returns `Ok(true)` when a row may be read, `Ok(false)` when the
    /// stream has ended (cleanly or, after a previous error, terminally).
    /// An `Err` marks the sequencer corrupt; it will never produce rows
    /// again.
    pub fn ensure_in_block<R: Read>(&mut self, file: &mut R, codec: &Codec) -> Result<bool> {
        match self.state {
            BlockState::InBlock => Ok(true),
            BlockState::EndOfStream | BlockState::Corrupt => Ok(false),
            BlockState::NeedsNewBlock => self.enter_next_block(file, codec),
        }
    }

    /// Record one row consumed from the current block.
    pub fn note_row(&mut self) {
        debug_assert_eq!(self.state, BlockState::InBlock);
        self.count_in_block += 1;
        if self.count_in_block == self.declared_rows {
            trace!("Data block exhausted after {} rows", self.count_in_block);
            self.state = BlockState::NeedsNewBlock;
        }
    }

    fn enter_next_block<R: Read>(&mut self, file: &mut R, codec: &Codec) -> Result<bool> {
        // Trailing marker of the previous block's payload, absent before the
        // very first block.
        if self.blocks_entered > 0 {
            let expected = self.declared_rows as i64 * ROW_BYTES as i64;
            let found = self.read_marker(file, codec, "data block trailer")?;
            if found != expected {
                return Err(self.corrupt(PmssError::MarkerMismatch {
                    context: "data block trailer",
                    expected,
                    found,
                }));
            }
        }

        // Leading marker of the row-count record. The only spot where EOF
        // means a well-formed end of the file.
        let lead = match codec.read_i32(file) {
            Ok(v) => v as i64,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("End of file after {} data blocks", self.blocks_entered);
                self.state = BlockState::EndOfStream;
                return Ok(false);
            }
            Err(e) => return Err(self.corrupt(PmssError::Io(e))),
        };
        if lead != COUNT_RECORD_BYTES {
            return Err(self.corrupt(PmssError::MarkerMismatch {
                context: "row count record",
                expected: COUNT_RECORD_BYTES,
                found: lead,
            }));
        }

        let nrecord = codec
            .read_i32(file)
            .map_err(|e| self.corrupt(PmssError::from_read(e, "row count record")))?;
        if nrecord <= 0 {
            return Err(self.corrupt(PmssError::InvalidRowCount(nrecord)));
        }

        let close = self.read_marker(file, codec, "row count record")?;
        if close != COUNT_RECORD_BYTES {
            return Err(self.corrupt(PmssError::MarkerMismatch {
                context: "row count record",
                expected: COUNT_RECORD_BYTES,
                found: close,
            }));
        }

        // Opening marker of the payload must equal the declared byte length.
        let expected = nrecord as i64 * ROW_BYTES as i64;
        let opening = self.read_marker(file, codec, "data block header")?;
        if opening != expected {
            return Err(self.corrupt(PmssError::MarkerMismatch {
                context: "data block header",
                expected,
                found: opening,
            }));
        }

        self.declared_rows = nrecord;
        self.count_in_block = 0;
        self.blocks_entered += 1;
        self.state = BlockState::InBlock;
        debug!(
            "Entered data block {}: {} rows declared",
            self.blocks_entered, nrecord
        );
        Ok(true)
    }

    fn read_marker<R: Read>(
        &mut self,
        file: &mut R,
        codec: &Codec,
        context: &'static str,
    ) -> Result<i64> {
        match codec.read_i32(file) {
            Ok(v) => Ok(v as i64),
            Err(e) => Err(self.corrupt(PmssError::from_read(e, context))),
        }
    }

    fn corrupt(&mut self, e: PmssError) -> PmssError {
        self.state = BlockState::Corrupt;
        e
    }

    /// Classify a failed row read: EOF inside a block is truncation.
    pub fn fail_row(&mut self, e: std::io::Error) -> PmssError {
        self.corrupt(PmssError::from_read(e, "particle row"))
    }
}
