//! Byte sources and low-level readers.
//!
//! [`MetadataImage`] only needs a byte slice. This module supplies the slices: the
//! [`Backend`] trait over an owned buffer or a memory-mapped file, and [`MetadataFile`], which
//! owns a backend together with the image borrowing from it. It also holds the bounds-checked
//! little-endian readers ([`io`], [`parser`]) and the PE walk that finds the metadata ([`pe`]).
//!
//! # Examples
//!
//! ```rust,no_run
//! use metascope::MetadataFile;
//! use std::path::Path;
//!
//! let file = MetadataFile::from_file(Path::new("tests/samples/WindowsBase.dll"))?;
//! let image = file.image();
//! println!("metadata {} with {} types", image.version(), image.enum_type_definitions().total_count());
//! # Ok::<(), metascope::Error>(())
//! ```

pub mod io;
pub mod parser;
pub mod pe;

mod memory;
mod physical;

use std::path::Path;

use memory::OwnedBuffer;
use ouroboros::self_referencing;
use physical::Physical;

use crate::{
    metadata::{config::LoaderConfig, image::MetadataImage},
    Error::Empty,
    Result,
};

/// A source of image bytes
///
/// Implementations must be thread-safe so that an owned image can be shared between readers.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range is not within the data
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer
    fn len(&self) -> usize;

    /// True if the buffer holds no bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[self_referencing]
/// An opened image that owns its bytes
///
/// Dropping the file releases the buffer or unmaps the file.
///
/// # Examples
///
/// ```rust,no_run
/// use metascope::{LoaderConfig, MetadataFile};
///
/// let data = std::fs::read("tests/samples/WindowsBase.dll")?;
/// let file = MetadataFile::from_mem_with(data, LoaderConfig::lenient())?;
///
/// for token in file.image().enum_type_definitions() {
///     println!("{}", file.image().type_name(token)?);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MetadataFile {
    data: Box<dyn Backend>,
    #[borrows(data)]
    #[covariant]
    image: MetadataImage<'this>,
}

impl MetadataFile {
    /// Map and open the image at `path` with the default configuration
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped,
    /// [`crate::Error::Empty`] if it is empty, and any error of [`MetadataImage::open`]
    pub fn from_file(path: &Path) -> Result<MetadataFile> {
        Self::from_file_with(path, LoaderConfig::default())
    }

    /// Map and open the image at `path`
    ///
    /// # Errors
    /// See [`MetadataFile::from_file`]
    pub fn from_file_with(path: &Path, config: LoaderConfig) -> Result<MetadataFile> {
        Self::load(Physical::new(path)?, config)
    }

    /// Open an image held in memory with the default configuration
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty buffer, and any error of
    /// [`MetadataImage::open`]
    pub fn from_mem(data: Vec<u8>) -> Result<MetadataFile> {
        Self::from_mem_with(data, LoaderConfig::default())
    }

    /// Open an image held in memory
    ///
    /// # Errors
    /// See [`MetadataFile::from_mem`]
    pub fn from_mem_with(data: Vec<u8>, config: LoaderConfig) -> Result<MetadataFile> {
        Self::load(OwnedBuffer::new(data), config)
    }

    fn load<T: Backend + 'static>(data: T, config: LoaderConfig) -> Result<MetadataFile> {
        if data.is_empty() {
            return Err(Empty);
        }

        MetadataFile::try_new(Box::new(data), |data| {
            MetadataImage::open_with(data.data(), config)
        })
    }

    /// The opened metadata
    #[must_use]
    pub fn image(&self) -> &MetadataImage<'_> {
        self.borrow_image()
    }

    /// Total size of the image in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.borrow_data().len()
    }

    /// True if the image has no bytes; never the case for a successfully opened file
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.borrow_data().is_empty()
    }

    /// Bounds-checked slice of the image bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range is not within the image
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.borrow_data().data_slice(offset, len)
    }
}
