use crate::{file::parser::Parser, Result};

/// The `#Blob` heap: length-prefixed byte sequences addressed by byte offset.
///
/// Every entry starts with an ECMA-335 compressed unsigned length (1, 2 or 4 bytes) followed
/// by that many bytes. Offset 0 is the empty blob.
///
/// # Examples
///
/// ```rust
/// use metascope::metadata::streams::Blob;
///
/// let heap = Blob::from(&[0x00, 0x03, 0x20, 0x00, 0x01])?;
/// assert_eq!(heap.get(1)?, &[0x20, 0x00, 0x01]);
/// assert!(heap.get(0)?.is_empty());
/// # Ok::<(), metascope::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Create a `Blob` view over the heap bytes
    ///
    /// ## Arguments
    /// * 'data' - The heap bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is non-empty and does not start with the
    /// empty blob
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.first().is_some_and(|first| *first != 0) {
            return Err(malformed_error!("#Blob heap does not start with an empty blob"));
        }

        Ok(Blob { data })
    }

    /// Decode the entry header at `offset`: returns the entry's length and the offset of its
    /// first data byte
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset, the prefix or the data is not within
    /// the heap, and [`crate::Error::Malformed`] for an invalid prefix
    pub fn entry(&self, offset: usize) -> Result<(usize, usize)> {
        if offset >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(&self.data[offset..]);
        let len = parser.read_compressed_uint()? as usize;
        let data_start = offset + parser.pos();

        let Some(data_end) = data_start.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        if data_end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok((len, data_start))
    }

    /// Get the blob starting at a byte offset, without its length prefix
    ///
    /// ## Arguments
    /// * 'offset' - The byte offset into the heap
    ///
    /// # Errors
    /// See [`Blob::entry`]
    pub fn get(&self, offset: usize) -> Result<&'a [u8]> {
        let (len, start) = self.entry(offset)?;
        Ok(&self.data[start..start + len])
    }

    /// Offset of the entry following the one at `offset`, `None` at the end of the heap
    ///
    /// # Errors
    /// See [`Blob::entry`]
    pub fn next(&self, offset: usize) -> Result<Option<usize>> {
        let (len, start) = self.entry(offset)?;
        let next = start + len;

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

    /// Iterate all entries as `(offset, bytes)`, starting after the leading empty blob
    #[must_use]
    pub fn iter(&self) -> BlobIterator<'a> {
        BlobIterator {
            blob: *self,
            position: Some(1),
        }
    }
}

/// Iterator over the entries of a [`Blob`] heap
///
/// Stops after the first entry that fails to decode.
pub struct BlobIterator<'a> {
    blob: Blob<'a>,
    position: Option<usize>,
}

impl<'a> Iterator for BlobIterator<'a> {
    type Item = Result<(usize, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.position?;
        if offset >= self.blob.len() {
            self.position = None;
            return None;
        }

        match self.blob.get(offset) {
            Ok(value) => {
                self.position = self.blob.next(offset).unwrap_or(None);
                Some(Ok((offset, value)))
            }
            Err(error) => {
                self.position = None;
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = [
            0x00,                               // empty
            0x03, 0x20, 0x00, 0x01,             // 3 bytes
            0x00,                               // empty
            0x02, 0xAA, 0xBB,                   // 2 bytes
        ];

        let blob = Blob::from(&data).unwrap();
        assert_eq!(blob.get(0).unwrap(), &[] as &[u8]);
        assert_eq!(blob.get(1).unwrap(), &[0x20, 0x00, 0x01]);
        assert_eq!(blob.get(5).unwrap(), &[] as &[u8]);
        assert_eq!(blob.get(6).unwrap(), &[0xAA, 0xBB]);
        assert_eq!(blob.entry(6).unwrap(), (2, 7));

        assert_eq!(blob.next(1).unwrap(), Some(5));
        assert_eq!(blob.next(6).unwrap(), None);

        let offsets: Vec<_> = blob.iter().map(|item| item.unwrap().0).collect();
        assert_eq!(offsets, vec![1, 5, 6]);
    }

    #[test]
    fn prefix_boundaries() {
        // 127 bytes: 1 byte prefix
        let mut data = vec![0x00, 0x7F];
        data.extend(std::iter::repeat(0x11).take(127));
        let blob = Blob::from(&data).unwrap();
        assert_eq!(blob.entry(1).unwrap(), (127, 2));

        // 128 bytes: 2 byte prefix
        let mut data = vec![0x00, 0x80, 0x80];
        data.extend(std::iter::repeat(0x22).take(128));
        let blob = Blob::from(&data).unwrap();
        assert_eq!(blob.entry(1).unwrap(), (128, 3));

        // 16384 bytes: 4 byte prefix
        let mut data = vec![0x00, 0xC0, 0x00, 0x40, 0x00];
        data.extend(std::iter::repeat(0x33).take(16384));
        let blob = Blob::from(&data).unwrap();
        assert_eq!(blob.entry(1).unwrap(), (16384, 5));
    }

    #[test]
    fn invalid() {
        // reserved 111 prefix
        let blob = Blob::from(&[0x00, 0xE0, 0x01, 0x02, 0x03]).unwrap();
        assert!(matches!(blob.get(1), Err(crate::Error::Malformed { .. })));

        // length past the heap
        let blob = Blob::from(&[0x00, 0x05, 0x01]).unwrap();
        assert!(matches!(blob.get(1), Err(crate::Error::OutOfBounds { .. })));

        // offset past the heap
        assert!(blob.get(3).is_err());

        assert!(Blob::from(&[0x01]).is_err());
    }
}
