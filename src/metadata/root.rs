//! Metadata root header and stream directory (ECMA-335 II.24.2.1).
//!
//! [`Root`] is the fixed header at the start of the metadata: signature, version string and the
//! list of [`StreamHeader`]s. [`Streams`] matches those headers against the five stream roles
//! and turns each into an absolute, bounds-checked [`StreamRegion`] of the image.
//!
//! # Example
//!
//! ```rust
//! use metascope::metadata::root::Root;
//!
//! let root = Root::read(&[
//!     0x42, 0x53, 0x4A, 0x42,
//!     0x01, 0x00,
//!     0x01, 0x00,
//!     0x00, 0x00, 0x00, 0x00,
//!     0x04, 0x00, 0x00, 0x00,
//!     b'v', b'4', 0x00, 0x00,
//!     0x00, 0x00,
//!     0x01, 0x00,
//!     0x20, 0x00, 0x00, 0x00, // StreamHeader
//!     0x18, 0x00, 0x00, 0x00,
//!     0x23, 0x7E, 0x00, 0x00,
//! ])?;
//! assert_eq!(root.version, "v4");
//! assert_eq!(root.stream_headers[0].name, "#~");
//! # Ok::<(), metascope::Error>(())
//! ```

use tracing::{debug, trace, warn};

use crate::{
    file::parser::Parser,
    metadata::{config::LoaderConfig, streams::StreamHeader},
    Result,
};

/// The MAGIC value indicating the CIL header
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// Smallest possible stream header: offset, size and a 4 byte padded name
const MIN_STREAM_HEADER_SIZE: usize = 12;

/// The header of the present metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Root {
    /// Magic signature for physical metadata: 0x424A5342
    pub signature: u32,
    /// `MajorVersion`
    pub major_version: u16,
    /// `MinorVersion`
    pub minor_version: u16,
    /// Always 0
    pub reserved: u32,
    /// Number of bytes allocated to hold the version string, including padding
    pub length: u32,
    /// The version string, up to its first NUL
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// The stream directory in declaration order
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Read the metadata root header and its stream directory
    ///
    /// ## Arguments
    /// * 'data' - The bytes starting at the metadata root
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a bad signature, a version string or stream
    /// directory that runs past `data`, or an empty stream directory
    pub fn read(data: &[u8]) -> Result<Root> {
        let mut parser = Parser::new(data);

        let signature = parser.read_le::<u32>()?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - 0x{:08x}",
                signature
            ));
        }

        let major_version = parser.read_le::<u16>()?;
        let minor_version = parser.read_le::<u16>()?;
        let reserved = parser.read_le::<u32>()?;
        let length = parser.read_le::<u32>()?;

        let version_bytes = parser
            .read_bytes(length as usize)
            .map_err(|_| malformed_error!("Version string of {} bytes is truncated", length))?;
        let version_end = version_bytes
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(version_bytes.len());
        let version = String::from_utf8_lossy(&version_bytes[..version_end]).into_owned();

        let flags = parser.read_le::<u16>()?;
        let stream_count = parser.read_le::<u16>()?;
        if stream_count == 0 {
            return Err(malformed_error!("Metadata root declares no streams"));
        }

        let directory_min = usize::from(stream_count) * MIN_STREAM_HEADER_SIZE;
        if directory_min > parser.remaining() {
            return Err(malformed_error!(
                "Stream directory of {} entries does not fit in {} bytes",
                stream_count,
                parser.remaining()
            ));
        }

        let mut stream_headers = Vec::with_capacity(usize::from(stream_count));
        for _ in 0..stream_count {
            let header = StreamHeader::read(&mut parser).map_err(|error| match error {
                crate::Error::OutOfBounds { .. } => malformed_error!("Stream directory truncated"),
                other => other,
            })?;
            stream_headers.push(header);
        }

        Ok(Root {
            signature,
            major_version,
            minor_version,
            reserved,
            length,
            version,
            flags,
            stream_headers,
        })
    }
}

/// Absolute byte range of one stream inside the image
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamRegion {
    /// Image offset of the first byte
    pub offset: usize,
    /// Length in bytes
    pub size: usize,
}

impl StreamRegion {
    /// The bytes of this region
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the region does not lie within `data`
    pub fn slice<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        self.offset
            .checked_add(self.size)
            .and_then(|end| data.get(self.offset..end))
            .ok_or(out_of_bounds_error!())
    }
}

/// Role of a stream, by its name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamRole {
    Tables,
    Strings,
    Blob,
    Guid,
    UserStrings,
}

impl StreamRole {
    fn from_name(name: &str) -> Option<StreamRole> {
        match name {
            "#~" => Some(StreamRole::Tables),
            "#Strings" => Some(StreamRole::Strings),
            "#Blob" => Some(StreamRole::Blob),
            "#GUID" => Some(StreamRole::Guid),
            "#US" => Some(StreamRole::UserStrings),
            _ => None,
        }
    }
}

/// The stream directory resolved into regions, one per role
///
/// The table stream is mandatory; every heap is optional and accessors report
/// [`crate::Error::NotFound`] for a missing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Streams {
    /// The parsed metadata root the regions were taken from
    pub root: Root,
    /// `#~`
    pub tables: StreamRegion,
    /// `#Strings`, after the padding trim if enabled
    pub strings: Option<StreamRegion>,
    /// `#Blob`
    pub blob: Option<StreamRegion>,
    /// `#GUID`
    pub guid: Option<StreamRegion>,
    /// `#US`
    pub user_strings: Option<StreamRegion>,
}

impl Streams {
    /// Parse the metadata root at `root_offset` and resolve its stream directory
    ///
    /// ## Arguments
    /// * 'image'       - The complete image
    /// * 'root_offset' - Image offset of the metadata root
    /// * 'config'      - Handling of unknown, duplicated and truncated streams
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the root is invalid, the table stream is missing,
    /// or a stream violates the configured checks
    pub fn parse(image: &[u8], root_offset: usize, config: &LoaderConfig) -> Result<Streams> {
        let root_data = image
            .get(root_offset..)
            .ok_or_else(|| malformed_error!("Metadata root offset 0x{:x} past the image", root_offset))?;
        let root = Root::read(root_data)?;

        let mut tables = None;
        let mut strings = None;
        let mut blob = None;
        let mut guid = None;
        let mut user_strings = None;

        for header in &root.stream_headers {
            let Some(role) = StreamRole::from_name(&header.name) else {
                if config.reject_unknown_streams {
                    return Err(malformed_error!("Unknown metadata stream - {}", header.name));
                }
                warn!(name = %header.name, "skipping unknown metadata stream");
                continue;
            };

            let slot = match role {
                StreamRole::Tables => &mut tables,
                StreamRole::Strings => &mut strings,
                StreamRole::Blob => &mut blob,
                StreamRole::Guid => &mut guid,
                StreamRole::UserStrings => &mut user_strings,
            };

            if slot.is_some() {
                if config.reject_duplicate_streams {
                    return Err(malformed_error!("Duplicate metadata stream - {}", header.name));
                }
                warn!(name = %header.name, "ignoring duplicate metadata stream");
                continue;
            }

            let mut region = Self::region(image, root_offset, header, config)?;
            if role == StreamRole::Strings && config.trim_string_padding {
                region = Self::trim_padding(image, region);
            }

            trace!(
                name = %header.name,
                offset = region.offset,
                size = region.size,
                "stream resolved"
            );
            *slot = Some(region);
        }

        let Some(tables) = tables else {
            return Err(malformed_error!("Metadata has no '#~' table stream"));
        };

        debug!(
            version = %root.version,
            streams = root.stream_headers.len(),
            strings = strings.is_some(),
            blob = blob.is_some(),
            guid = guid.is_some(),
            user_strings = user_strings.is_some(),
            "stream directory parsed"
        );

        Ok(Streams {
            root,
            tables,
            strings,
            blob,
            guid,
            user_strings,
        })
    }

    /// Absolute region of one stream header, checked against the image
    fn region(
        image: &[u8],
        root_offset: usize,
        header: &StreamHeader,
        config: &LoaderConfig,
    ) -> Result<StreamRegion> {
        let Some(offset) = root_offset.checked_add(header.offset as usize) else {
            return Err(malformed_error!("Stream {} offset overflows", header.name));
        };
        if offset > image.len() {
            return Err(malformed_error!(
                "Stream {} starts at 0x{:x}, past the image end 0x{:x}",
                header.name,
                offset,
                image.len()
            ));
        }

        let available = image.len() - offset;
        let mut size = header.size as usize;
        if size > available {
            if config.reject_truncated_streams {
                return Err(malformed_error!(
                    "Stream {} of {} bytes at 0x{:x} extends past the image end",
                    header.name,
                    size,
                    offset
                ));
            }
            warn!(name = %header.name, declared = size, available, "clamping truncated stream");
            size = available;
        }

        Ok(StreamRegion { offset, size })
    }

    /// Drop trailing NUL padding from the string heap, keeping at least one byte
    fn trim_padding(image: &[u8], region: StreamRegion) -> StreamRegion {
        let mut size = region.size;
        while size > 1 && image[region.offset + size - 1] == 0 && image[region.offset + size - 2] == 0 {
            size -= 1;
        }

        StreamRegion {
            offset: region.offset,
            size,
        }
    }
}
