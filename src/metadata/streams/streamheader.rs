use crate::{file::parser::Parser, Result};

/// Maximum length of a stream name including its NUL terminator
const MAX_NAME_LEN: usize = 32;

/// One entry of the metadata root's stream directory (ECMA-335 II.24.2.2)
///
/// ```text
/// Offset  Size  Field
/// 0       4     Offset of the stream, relative to the metadata root
/// 4       4     Size of the stream in bytes
/// 8       n     NUL-terminated ASCII name, padded to a 4 byte boundary, at most 32 bytes
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    /// Offset of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes, as declared
    pub size: u32,
    /// Name of the stream, e.g. `#Strings`
    pub name: String,
}

impl StreamHeader {
    /// Read one stream header and advance the parser past its name padding
    ///
    /// ## Arguments
    /// * 'parser' - Positioned at the header, with positions relative to a 4 byte aligned base
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header is truncated, and
    /// [`crate::Error::Malformed`] if the name is unterminated within 32 bytes or not ASCII
    pub fn read(parser: &mut Parser) -> Result<StreamHeader> {
        let offset = parser.read_le::<u32>()?;
        let size = parser.read_le::<u32>()?;

        let name_bytes = parser.read_cstr(MAX_NAME_LEN)?;
        if !name_bytes.is_ascii() {
            return Err(malformed_error!("Stream name is not ASCII - {:?}", name_bytes));
        }

        parser.align(4)?;

        Ok(StreamHeader {
            offset,
            size,
            name: String::from_utf8_lossy(name_bytes).into_owned(),
        })
    }
}
