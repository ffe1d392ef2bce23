use std::{ffi::CStr, str};

use crate::Result;

/// The `#Strings` heap: NUL-terminated UTF-8 identifiers addressed by byte offset.
///
/// Offset 0 is always the empty string. The heap is expected to have been trimmed of its
/// trailing alignment padding by the stream index, so [`Strings::len`] is the logical size.
///
/// # Examples
///
/// ```rust
/// use metascope::metadata::streams::Strings;
///
/// let heap = Strings::from(b"\0Program\0Main\0")?;
/// assert_eq!(heap.get(1)?, "Program");
/// assert_eq!(heap.get(9)?, "Main");
/// assert_eq!(heap.get(0)?, "");
/// # Ok::<(), metascope::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a `Strings` view over the heap bytes
    ///
    /// ## Arguments
    /// * 'data' - The heap, already trimmed to its logical size
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is non-empty and does not start with the
    /// empty string
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.first().is_some_and(|first| *first != 0) {
            return Err(malformed_error!("#Strings heap does not start with a NUL byte"));
        }

        Ok(Strings { data })
    }

    /// Get the string starting at a byte offset
    ///
    /// ## Arguments
    /// * 'offset' - The byte offset into the heap
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset is not within the heap, and
    /// [`crate::Error::Malformed`] if the string is unterminated or not valid UTF-8
    pub fn get(&self, offset: usize) -> Result<&'a str> {
        if offset >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        match CStr::from_bytes_until_nul(&self.data[offset..]) {
            Ok(result) => match result.to_str() {
                Ok(result) => Ok(result),
                Err(_) => Err(malformed_error!("Invalid UTF-8 string at offset - {}", offset)),
            },
            Err(_) => Err(malformed_error!("Unterminated string at offset - {}", offset)),
        }
    }

    /// Offset of the string following the one at `offset`, `None` at the end of the heap
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `offset` is not within the heap
    pub fn next(&self, offset: usize) -> Result<Option<usize>> {
        if offset >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let next = match self.data[offset..].iter().position(|b| *b == 0) {
            Some(len) => offset + len + 1,
            None => self.data.len(),
        };

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

    /// Iterate all strings as `(offset, string)`, starting after the leading empty string
    #[must_use]
    pub fn iter(&self) -> StringsIterator<'a> {
        StringsIterator {
            strings: *self,
            position: Some(1),
        }
    }
}

/// Iterator over the entries of a [`Strings`] heap
pub struct StringsIterator<'a> {
    strings: Strings<'a>,
    position: Option<usize>,
}

impl<'a> Iterator for StringsIterator<'a> {
    type Item = Result<(usize, &'a str)>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.position?;
        if offset >= self.strings.len() {
            self.position = None;
            return None;
        }

        let item = self.strings.get(offset).map(|value| (offset, value));
        self.position = match self.strings.next(offset) {
            Ok(next) => next,
            Err(_) => None,
        };

        if item.is_err() {
            self.position = None;
        }

        Some(item)
    }
}
