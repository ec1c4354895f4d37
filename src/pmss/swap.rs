//! Byte-order normalization for PMss fields.
//!
//! PMss files carry no magic number, so the byte order of a file cannot be
//! detected; the caller states whether the file was written on a machine
//! with the opposite endianness. When it was, every 4- and 8-byte field is
//! reversed before being reinterpreted as a native value.

use std::io::{self, Read};

use byteorder::{NativeEndian, ReadBytesExt};

// The format fixes field widths at 4 and 8 bytes. Rust guarantees these
// widths for f32/i32/i64 on every supported target, so the platform
// precondition is checked once, at compile time.
const _: () = assert!(std::mem::size_of::<f32>() == 4);
const _: () = assert!(std::mem::size_of::<i32>() == 4);
const _: () = assert!(std::mem::size_of::<i64>() == 8);

/// Reverse the byte order of a 4-byte field.
pub fn swap32(b: [u8; 4]) -> [u8; 4] {
    [b[3], b[2], b[1], b[0]]
}

/// Reverse the byte order of an 8-byte field.
pub fn swap64(b: [u8; 8]) -> [u8; 8] {
    [b[7], b[6], b[5], b[4], b[3], b[2], b[1], b[0]]
}

/// Field decoder bound to one file's byte-order flag.
///
/// When `swap` is false every operation is the identity read; the flag is
/// fixed for the lifetime of the file and shared by header, markers and
/// particle rows alike.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    swap: bool,
}

impl Codec {
    pub fn new(swap: bool) -> Self {
        Self { swap }
    }

    pub fn swaps(&self) -> bool {
        self.swap
    }

    /// Read one 4-byte signed integer, normalizing byte order.
    pub fn read_i32<R: Read>(&self, reader: &mut R) -> io::Result<i32> {
        let v = reader.read_i32::<NativeEndian>()?;
        Ok(if self.swap { v.swap_bytes() } else { v })
    }

    /// Read one 8-byte signed integer, normalizing byte order.
    pub fn read_i64<R: Read>(&self, reader: &mut R) -> io::Result<i64> {
        let v = reader.read_i64::<NativeEndian>()?;
        Ok(if self.swap { v.swap_bytes() } else { v })
    }

    /// Read one 4-byte float, normalizing byte order.
    ///
    /// The swap happens on the raw bits; the value is reinterpreted as f32
    /// only after normalization.
    pub fn read_f32<R: Read>(&self, reader: &mut R) -> io::Result<f32> {
        let bits = reader.read_u32::<NativeEndian>()?;
        let bits = if self.swap { bits.swap_bytes() } else { bits };
        Ok(f32::from_bits(bits))
    }

    /// Decode a 4-byte float from an in-memory field.
    pub fn f32_from(&self, b: [u8; 4]) -> f32 {
        let b = if self.swap { swap32(b) } else { b };
        f32::from_bits(u32::from_ne_bytes(b))
    }

    /// Decode an 8-byte signed integer from an in-memory field.
    pub fn i64_from(&self, b: [u8; 8]) -> i64 {
        let b = if self.swap { swap64(b) } else { b };
        i64::from_ne_bytes(b)
    }
}
