//! Locating the metadata root inside a PE image.
//!
//! Only the parts of the PE/COFF container needed to reach the metadata are read: the DOS
//! header's `e_lfanew`, the COFF file header, the optional header's data directory for the
//! CLI header (index 14), and the section table for RVA to file offset translation. No
//! relocation or loader semantics are applied; the image is treated as the on-disk file.
//!
//! Every failure in here is reported as [`crate::Error::Malformed`]; callers are only expected
//! to refuse the input, not to tell apart why.

use tracing::debug;

use crate::{
    file::io::{read_le_at, CilIO},
    metadata::cor20header::Cor20Header,
    metadata::root::CIL_HEADER_MAGIC,
    Result,
};

const DOS_SIGNATURE: u16 = 0x5A4D;
const PE_SIGNATURE: u32 = 0x0000_4550;
const OPTIONAL_MAGIC_PE32: u16 = 0x10B;
const OPTIONAL_MAGIC_PE32_PLUS: u16 = 0x20B;
const COFF_HEADER_SIZE: usize = 20;
const SECTION_HEADER_SIZE: usize = 40;
const CLR_DIRECTORY_INDEX: u32 = 14;

/// Size of the metadata root up to and including the version length field
const ROOT_FIXED_SIZE: usize = 16;

/// Read a field of the container, reporting truncation as a malformed image
fn field<T: CilIO>(data: &[u8], offset: usize, what: &str) -> Result<T> {
    let mut offset = offset;
    read_le_at::<T>(data, &mut offset)
        .map_err(|_| malformed_error!("Image too small to contain {}", what))
}

/// One entry of the section table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionHeader {
    /// Section name, NUL padded
    pub name: [u8; 8],
    /// Size of the section when loaded
    pub virtual_size: u32,
    /// RVA of the section when loaded
    pub virtual_address: u32,
    /// Size of the section's data in the file
    pub size_of_raw_data: u32,
    /// File offset of the section's data
    pub pointer_to_raw_data: u32,
}

impl SectionHeader {
    /// The section's name with NUL padding removed
    #[must_use]
    pub fn name(&self) -> String {
        let len = self.name.iter().position(|b| *b == 0).unwrap_or(8);
        String::from_utf8_lossy(&self.name[..len]).into_owned()
    }

    /// Size of the section's virtual range, falling back to the raw size if the virtual size is 0
    #[must_use]
    pub fn extent(&self) -> u32 {
        if self.virtual_size == 0 {
            self.size_of_raw_data
        } else {
            self.virtual_size
        }
    }

    /// True if `rva` falls inside the section's virtual range
    #[must_use]
    pub fn contains(&self, rva: u32) -> bool {
        rva >= self.virtual_address
            && u64::from(rva) < u64::from(self.virtual_address) + u64::from(self.extent())
    }
}

/// The parts of a PE image this crate needs: the section table and the CLI header directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeImage {
    /// True for a PE32+ (64-bit) optional header
    pub is_pe32_plus: bool,
    /// RVA of the CLI header
    pub clr_rva: u32,
    /// Declared size of the CLI header
    pub clr_size: u32,
    /// The section table
    pub sections: Vec<SectionHeader>,
}

impl PeImage {
    /// Parse the container headers of a PE image
    ///
    /// ## Arguments
    /// * 'data' - The complete image as stored on disk
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a bad signature, a truncated header, an unknown
    /// optional header, a missing CLI header directory or an empty section table
    pub fn parse(data: &[u8]) -> Result<PeImage> {
        if field::<u16>(data, 0, "a DOS header")? != DOS_SIGNATURE {
            return Err(malformed_error!("Invalid DOS signature"));
        }

        let pe_offset = field::<u32>(data, 0x3C, "a DOS header")? as usize;
        if field::<u32>(data, pe_offset, "a PE signature")? != PE_SIGNATURE {
            return Err(malformed_error!("Invalid PE signature at 0x{:x}", pe_offset));
        }

        let coff = pe_offset + 4;
        let number_of_sections = field::<u16>(data, coff + 2, "a COFF header")?;
        let size_of_optional_header = field::<u16>(data, coff + 16, "a COFF header")?;
        if number_of_sections == 0 {
            return Err(malformed_error!("Image has no sections"));
        }

        let optional = coff + COFF_HEADER_SIZE;
        let (is_pe32_plus, rva_count_offset, directories_offset) =
            match field::<u16>(data, optional, "an optional header")? {
                OPTIONAL_MAGIC_PE32 => (false, 92, 96),
                OPTIONAL_MAGIC_PE32_PLUS => (true, 108, 112),
                magic => {
                    return Err(malformed_error!(
                        "Unknown optional header magic - 0x{:x}",
                        magic
                    ))
                }
            };

        let rva_count = field::<u32>(data, optional + rva_count_offset, "an optional header")?;
        if rva_count <= CLR_DIRECTORY_INDEX {
            return Err(malformed_error!(
                "Optional header has no CLI header directory - {} directories",
                rva_count
            ));
        }

        let clr_directory = optional + directories_offset + CLR_DIRECTORY_INDEX as usize * 8;
        if clr_directory + 8 > optional + usize::from(size_of_optional_header) {
            return Err(malformed_error!(
                "CLI header directory lies outside the optional header"
            ));
        }

        let clr_rva = field::<u32>(data, clr_directory, "a data directory")?;
        let clr_size = field::<u32>(data, clr_directory + 4, "a data directory")?;
        if clr_rva == 0 {
            return Err(malformed_error!("Image has no CLI header"));
        }

        let section_table = optional + usize::from(size_of_optional_header);
        let mut sections = Vec::with_capacity(usize::from(number_of_sections));
        for index in 0..usize::from(number_of_sections) {
            let base = section_table + index * SECTION_HEADER_SIZE;
            let Some(raw) = data.get(base..base + SECTION_HEADER_SIZE) else {
                return Err(malformed_error!("Section table truncated at entry {}", index));
            };

            let mut name = [0_u8; 8];
            name.copy_from_slice(&raw[..8]);

            sections.push(SectionHeader {
                name,
                virtual_size: field::<u32>(raw, 8, "a section header")?,
                virtual_address: field::<u32>(raw, 12, "a section header")?,
                size_of_raw_data: field::<u32>(raw, 16, "a section header")?,
                pointer_to_raw_data: field::<u32>(raw, 20, "a section header")?,
            });
        }

        Ok(PeImage {
            is_pe32_plus,
            clr_rva,
            clr_size,
            sections,
        })
    }

    /// Translate an RVA to a file offset using the section table
    ///
    /// ## Arguments
    /// * 'rva' - The relative virtual address to translate
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if no section contains the RVA, or if the RVA lies in
    /// the part of a section that has no file data
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        let Some(section) = self.sections.iter().find(|section| section.contains(rva)) else {
            return Err(malformed_error!("No section contains RVA 0x{:x}", rva));
        };

        let delta = rva - section.virtual_address;
        if delta >= section.size_of_raw_data {
            return Err(malformed_error!(
                "RVA 0x{:x} is not backed by file data in section {}",
                rva,
                section.name()
            ));
        }

        (section.pointer_to_raw_data as usize)
            .checked_add(delta as usize)
            .ok_or_else(|| malformed_error!("RVA 0x{:x} overflows the file offset range", rva))
    }
}

/// Where the metadata root lives in an image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataRootInfo {
    /// File offset of the metadata root
    pub offset: usize,
    /// Size of the metadata as declared by the CLI header
    pub size: u32,
    /// The CLI header
    pub cor20: Cor20Header,
}

/// Find the metadata root of a managed PE image
///
/// Walks PE headers → CLI header → metadata root, and validates the root's signature and
/// that its version string keeps the fixed part of the root within the image.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for any structural violation on the way
pub fn locate(data: &[u8]) -> Result<MetadataRootInfo> {
    let pe = PeImage::parse(data)?;

    let cor20_offset = pe.rva_to_offset(pe.clr_rva)?;
    if (pe.clr_size as usize) < crate::metadata::cor20header::COR20_HEADER_SIZE {
        return Err(malformed_error!(
            "CLI header directory too small - {} bytes",
            pe.clr_size
        ));
    }

    let cor20 = Cor20Header::read(&data[cor20_offset.min(data.len())..])
        .map_err(|error| match error {
            crate::Error::OutOfBounds { .. } => malformed_error!("CLI header truncated"),
            other => other,
        })?;

    let root = pe.rva_to_offset(cor20.meta_data_rva)?;
    if field::<u32>(data, root, "a metadata root")? != CIL_HEADER_MAGIC {
        return Err(malformed_error!("Invalid metadata root signature at 0x{:x}", root));
    }

    let version_length = field::<u32>(data, root + 12, "a metadata root")? as usize;
    let fixed_end = (root + ROOT_FIXED_SIZE)
        .checked_add(version_length)
        .and_then(|end| end.checked_add(4));
    match fixed_end {
        Some(end) if end <= data.len() => {}
        _ => {
            return Err(malformed_error!(
                "Metadata root version length {} runs past the image",
                version_length
            ))
        }
    }

    debug!(
        cor20 = cor20_offset,
        root,
        size = cor20.meta_data_size,
        pe32_plus = pe.is_pe32_plus,
        "metadata root located"
    );

    Ok(MetadataRootInfo {
        offset: root,
        size: cor20.meta_data_size,
        cor20,
    })
}
