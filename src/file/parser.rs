//! Cursor-based byte parser used by the container walk and the heap accessors.
//!
//! [`Parser`] keeps a position within a borrowed byte slice and provides bounds-checked
//! reads of little-endian primitives, ECMA-335 compressed unsigned integers and raw byte
//! runs. It never allocates for the data it hands out; slices borrow from the input.
//!
//! # Examples
//!
//! ```rust
//! use metascope::Parser;
//!
//! let data = [0x03, 0x80, 0x80, 0x41, 0x42, 0x43];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_compressed_uint()?, 3);
//! assert_eq!(parser.read_compressed_uint()?, 0x80);
//! assert_eq!(parser.read_bytes(3)?, b"ABC");
//! assert!(!parser.has_more_data());
//! # Ok::<(), metascope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    Result,
};

/// A cursor over a byte slice for reading metadata structures.
///
/// All reads validate that enough data remains before consuming it. A failed read leaves
/// the position unchanged.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if there is more data to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes between the current position and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the cursor to an absolute position. Seeking to `len()` is allowed.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the cursor forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if this would move past the end of the data.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        let Some(next) = self.position.checked_add(step) else {
            return Err(out_of_bounds_error!());
        };

        self.seek(next)
    }

    /// Get the current position within the data.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Read a little-endian value of type `T` and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if insufficient data remains.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read `length` raw bytes, borrowed from the underlying data.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let Some(end) = self.position.checked_add(length) else {
            return Err(out_of_bounds_error!());
        };

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Read an ECMA-335 II.23.2 compressed unsigned integer.
    ///
    /// * `0xxxxxxx` - 1 byte, value in the low 7 bits
    /// * `10xxxxxx` - 2 bytes, 14 bit value
    /// * `110xxxxx` - 4 bytes, 29 bit value
    ///
    /// A first byte of the form `111xxxxx` is rejected.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the encoding is truncated, or
    /// [`crate::Error::Malformed`] for the reserved `111` pattern.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let start = self.position;
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let Ok(second_byte) = self.read_le::<u8>() else {
                self.position = start;
                return Err(out_of_bounds_error!());
            };
            return Ok(((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte));
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let Ok(rest) = self.read_bytes(3) else {
                self.position = start;
                return Err(out_of_bounds_error!());
            };
            let value = ((u32::from(first_byte) & 0x1F) << 24)
                | (u32::from(rest[0]) << 16)
                | (u32::from(rest[1]) << 8)
                | u32::from(rest[2]);
            return Ok(value);
        }

        self.position = start;
        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }

    /// Read a NUL-terminated byte string of at most `max_len` bytes including the terminator.
    ///
    /// Returns the bytes before the terminator and advances past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if no terminator is found within `max_len` bytes
    /// or before the end of the data.
    pub fn read_cstr(&mut self, max_len: usize) -> Result<&'a [u8]> {
        let window = &self.data[self.position..];
        let limit = window.len().min(max_len);

        match window[..limit].iter().position(|&b| b == 0) {
            Some(len) => {
                let value = &window[..len];
                self.position += len + 1;
                Ok(value)
            }
            None => Err(malformed_error!(
                "Unterminated string at offset {} (limit {})",
                self.position,
                max_len
            )),
        }
    }

    /// Advance the position to the next multiple of `alignment`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the aligned position is past the end.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        if alignment == 0 {
            return Ok(());
        }

        let rem = self.position % alignment;
        if rem == 0 {
            return Ok(());
        }

        self.advance_by(alignment - rem)
    }
}
