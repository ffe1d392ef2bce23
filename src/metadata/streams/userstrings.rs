use std::borrow::Cow;

use widestring::{U16Str, U16String};

use crate::{file::parser::Parser, Result};

/// The `#US` heap: length-prefixed UTF-16 string literals addressed by byte offset.
///
/// Entries use the same compressed length prefix as blobs. The length counts bytes; an entry
/// with an odd length carries one trailing flag byte after its code units, which is not part of
/// the string.
///
/// # Examples
///
/// ```rust
/// use metascope::metadata::streams::UserStrings;
///
/// let heap = UserStrings::from(&[0x00, 0x05, 0x48, 0x00, 0x69, 0x00, 0x00])?;
/// assert_eq!(&*heap.get(1)?, &[0x48, 0x69]);
/// assert_eq!(heap.get_str(1)?.to_string_lossy(), "Hi");
/// # Ok::<(), metascope::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct UserStrings<'a> {
    data: &'a [u8],
}

impl<'a> UserStrings<'a> {
    /// Create a `UserStrings` view over the heap bytes
    ///
    /// ## Arguments
    /// * 'data' - The heap bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is non-empty and does not start with the
    /// empty entry
    pub fn from(data: &'a [u8]) -> Result<UserStrings<'a>> {
        if data.first().is_some_and(|first| *first != 0) {
            return Err(malformed_error!("#US heap does not start with an empty entry"));
        }

        Ok(UserStrings { data })
    }

    /// The raw bytes of the entry at `offset`, without the length prefix
    fn entry(&self, offset: usize) -> Result<&'a [u8]> {
        if offset >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(&self.data[offset..]);
        let len = parser.read_compressed_uint()? as usize;
        parser.read_bytes(len)
    }

    /// Get the UTF-16 code units of the entry at `offset`
    ///
    /// The units borrow from the heap when the entry is suitably aligned in memory on a
    /// little-endian host, and are copied otherwise.
    ///
    /// ## Arguments
    /// * 'offset' - The byte offset into the heap
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset or the entry is not within the heap,
    /// and [`crate::Error::Malformed`] for an invalid length prefix
    pub fn get(&self, offset: usize) -> Result<Cow<'a, [u16]>> {
        let entry = self.entry(offset)?;
        let bytes = &entry[..entry.len() & !1];

        if cfg!(target_endian = "little") {
            // SAFETY: every bit pattern is a valid u16
            let (head, units, tail) = unsafe { bytes.align_to::<u16>() };
            if head.is_empty() && tail.is_empty() {
                return Ok(Cow::Borrowed(units));
            }
        }

        Ok(Cow::Owned(
            bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
        ))
    }

    /// Get the entry at `offset` as a wide string
    ///
    /// # Errors
    /// See [`UserStrings::get`]
    pub fn get_str(&self, offset: usize) -> Result<U16String> {
        Ok(U16Str::from_slice(&self.get(offset)?).to_ustring())
    }

    /// Offset of the entry following the one at `offset`, `None` at the end of the heap
    ///
    /// # Errors
    /// See [`UserStrings::get`]
    pub fn next(&self, offset: usize) -> Result<Option<usize>> {
        let entry = self.entry(offset)?;
        let prefix = {
            let mut parser = Parser::new(&self.data[offset..]);
            parser.read_compressed_uint()?;
            parser.pos()
        };

        let next = offset + prefix + entry.len();
        Ok((next < self.data.len()).then_some(next))
    }

    /// Size of the heap in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the heap has no bytes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
