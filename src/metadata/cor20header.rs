//! The CLI header (`IMAGE_COR20_HEADER`, ECMA-335 II.25.3.3).
//!
//! The header is referenced by data directory 14 of the PE optional header and, among other
//! things, points at the metadata root. Only the fields needed to find and describe the
//! metadata are validated; everything else is carried as read.

use crate::{file::parser::Parser, Result};

/// Size of the CLI header in bytes; also the only valid value of its `cb` field
pub const COR20_HEADER_SIZE: usize = 72;

/// The CLI header of a managed image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cor20Header {
    /// Size of the header in bytes, always 72
    pub cb: u32,
    /// Minimum major runtime version required
    pub major_runtime_version: u16,
    /// Minor runtime version
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub meta_data_rva: u32,
    /// Size of the metadata in bytes
    pub meta_data_size: u32,
    /// Runtime image flags (`COMIMAGE_FLAGS_*`)
    pub flags: u32,
    /// Entry point method token, or RVA of a native entry point
    pub entry_point_token: u32,
    /// RVA of the managed resources
    pub resource_rva: u32,
    /// Size of the managed resources
    pub resource_size: u32,
    /// RVA of the strong name signature
    pub strong_name_signature_rva: u32,
    /// Size of the strong name signature
    pub strong_name_signature_size: u32,
}

impl Cor20Header {
    /// Read and validate a CLI header
    ///
    /// ## Arguments
    /// * 'data' - The bytes starting at the header
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than 72 bytes are available, and
    /// [`crate::Error::Malformed`] if `cb` is not 72 or the metadata directory is empty
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        if data.len() < COR20_HEADER_SIZE {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(data);

        let cb = parser.read_le::<u32>()?;
        if cb as usize != COR20_HEADER_SIZE {
            return Err(malformed_error!(
                "Invalid CLR header size: expected 72, got {}",
                cb
            ));
        }

        let major_runtime_version = parser.read_le::<u16>()?;
        let minor_runtime_version = parser.read_le::<u16>()?;

        let meta_data_rva = parser.read_le::<u32>()?;
        let meta_data_size = parser.read_le::<u32>()?;
        if meta_data_rva == 0 || meta_data_size == 0 {
            return Err(malformed_error!(
                "CLR header has no metadata - rva: 0x{:x}, size: {}",
                meta_data_rva,
                meta_data_size
            ));
        }

        Ok(Cor20Header {
            cb,
            major_runtime_version,
            minor_runtime_version,
            meta_data_rva,
            meta_data_size,
            flags: parser.read_le::<u32>()?,
            entry_point_token: parser.read_le::<u32>()?,
            resource_rva: parser.read_le::<u32>()?,
            resource_size: parser.read_le::<u32>()?,
            strong_name_signature_rva: parser.read_le::<u32>()?,
            strong_name_signature_size: parser.read_le::<u32>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const HEADER: [u8; 72] = [
        0x48, 0x00, 0x00, 0x00, // cb
        0x02, 0x00,             // MajorRuntimeVersion
        0x05, 0x00,             // MinorRuntimeVersion
        0x6C, 0x20, 0x00, 0x00, // MetaData.VirtualAddress
        0x10, 0x06, 0x00, 0x00, // MetaData.Size
        0x01, 0x00, 0x00, 0x00, // Flags: ILONLY
        0x01, 0x00, 0x00, 0x06, // EntryPointToken
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // Resources
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // StrongNameSignature
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // CodeManagerTable
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // VTableFixups
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ExportAddressTableJumps
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ManagedNativeHeader
    ];

    #[test]
    fn crafted() {
        let header = Cor20Header::read(&HEADER).unwrap();

        assert_eq!(header.cb, 72);
        assert_eq!(header.major_runtime_version, 2);
        assert_eq!(header.minor_runtime_version, 5);
        assert_eq!(header.meta_data_rva, 0x206C);
        assert_eq!(header.meta_data_size, 0x610);
        assert_eq!(header.flags, 1);
        assert_eq!(header.entry_point_token, 0x0600_0001);
    }

    #[test]
    fn invalid() {
        let mut bad_cb = HEADER;
        bad_cb[0] = 0x40;
        assert!(matches!(
            Cor20Header::read(&bad_cb),
            Err(crate::Error::Malformed { .. })
        ));

        let mut no_metadata = HEADER;
        no_metadata[8..12].copy_from_slice(&[0, 0, 0, 0]);
        assert!(Cor20Header::read(&no_metadata).is_err());

        assert!(matches!(
            Cor20Header::read(&HEADER[..71]),
            Err(crate::Error::OutOfBounds { .. })
        ));
    }
}
