//! Heap buffer backend.

use super::Backend;
use crate::Result;

/// Image bytes owned as a boxed slice
#[derive(Debug)]
pub struct OwnedBuffer {
    bytes: Box<[u8]>,
}

impl OwnedBuffer {
    /// Take ownership of `bytes`; spare capacity is released
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> OwnedBuffer {
        OwnedBuffer {
            bytes: bytes.into_boxed_slice(),
        }
    }
}

impl Backend for OwnedBuffer {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(end) = offset.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        self.bytes.get(offset..end).ok_or(out_of_bounds_error!())
    }

    fn data(&self) -> &[u8] {
        &self.bytes
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }
}
