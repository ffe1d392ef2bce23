use crate::Result;

/// The `#GUID` heap: a packed array of 16-byte GUIDs addressed by 1-based index.
///
/// # Examples
///
/// ```rust
/// use metascope::metadata::streams::Guid;
///
/// let data = [0x11_u8; 32];
/// let heap = Guid::from(&data);
/// assert_eq!(heap.get(2)?, &[0x11; 16]);
/// assert!(heap.get(0).is_err());
/// assert!(heap.get(3).is_err());
/// # Ok::<(), metascope::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a `Guid` view over the heap bytes
    ///
    /// A trailing partial entry is ignored.
    ///
    /// ## Arguments
    /// * 'data' - The heap bytes
    #[must_use]
    pub fn from(data: &'a [u8]) -> Guid<'a> {
        Guid { data }
    }

    /// Get the raw bytes of the GUID at a 1-based index
    ///
    /// ## Arguments
    /// * 'index' - The 1-based index
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for index 0 or an index past the last entry
    pub fn get(&self, index: usize) -> Result<&'a [u8; 16]> {
        let Some(start) = index.checked_sub(1).and_then(|i| i.checked_mul(16)) else {
            return Err(out_of_bounds_error!());
        };

        let Some(end) = start.checked_add(16) else {
            return Err(out_of_bounds_error!());
        };

        match self.data.get(start..end).map(<&[u8; 16]>::try_from) {
            Some(Ok(bytes)) => Ok(bytes),
            _ => Err(out_of_bounds_error!()),
        }
    }

    /// Get the GUID at a 1-based index as a [`uguid::Guid`]
    ///
    /// # Errors
    /// See [`Guid::get`]
    pub fn value(&self, index: usize) -> Result<uguid::Guid> {
        Ok(uguid::Guid::from_bytes(*self.get(index)?))
    }

    /// Number of complete entries
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / 16
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
