//! Memory-mapped file backend.
//!
//! The file is mapped read-only, so pages of a large image are only brought in when the
//! metadata reader touches them.

use std::{fs, path::Path};

use memmap2::Mmap;

use super::Backend;
use crate::{Error::FileError, Result};

/// A file on disk, accessed through a read-only memory mapping
#[derive(Debug)]
pub struct Physical {
    data: Mmap,
}

impl Physical {
    /// Open and map the file at `path`
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path).map_err(FileError)?;
        Self::from_std_file(&file)
    }

    /// Map an already opened file
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the mapping fails
    pub fn from_std_file(file: &fs::File) -> Result<Physical> {
        // SAFETY: mapped read-only; the file must not be truncated while mapped
        let data = unsafe { Mmap::map(file) }.map_err(FileError)?;

        Ok(Physical { data })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(out_of_bounds_error!())
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
