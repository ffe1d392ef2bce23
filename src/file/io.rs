//! Bounds-checked little-endian primitives for reading metadata structures.
//!
//! Every reader in this module validates that the requested value fits into the provided
//! buffer before touching it, and advances a caller-owned offset only on success. All
//! structures in managed metadata are little-endian, so no big-endian variants are needed.
//!
//! # Examples
//!
//! ```rust
//! use metascope::file::io::{read_le, read_le_at, read_le_at_width};
//!
//! let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
//! assert_eq!(read_le::<u16>(&data)?, 0x0201);
//!
//! let mut offset = 2;
//! assert_eq!(read_le_at::<u16>(&data, &mut offset)?, 0x0403);
//! assert_eq!(offset, 4);
//!
//! // a 2 byte column, widened to u32
//! assert_eq!(read_le_at_width(&data, &mut offset, 2)?, 0x0605);
//! # Ok::<(), metascope::Error>(())
//! ```

use crate::Result;

/// Trait for the fixed-size primitives that can be decoded from a metadata buffer.
pub trait CilIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cil_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_cil_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Read a value of type T from the start of a buffer
///
/// ## Arguments
/// * 'data' - The buffer to read from
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is too short
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a value of type T at the provided offset, advancing the offset past the value
///
/// ## Arguments
/// * 'data'    - The buffer to read from
/// * 'offset'  - The position to read at, advanced on success
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit into the buffer
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };

    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Read an unsigned value of 1, 2 or 4 bytes width at the provided offset, widened to u32
///
/// ## Arguments
/// * 'data'    - The buffer to read from
/// * 'offset'  - The position to read at, advanced on success
/// * 'width'   - The byte width of the value
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit, or a malformed error
/// for any width other than 1, 2 or 4
pub fn read_le_at_width(data: &[u8], offset: &mut usize, width: u8) -> Result<u32> {
    match width {
        1 => Ok(u32::from(read_le_at::<u8>(data, offset)?)),
        2 => Ok(u32::from(read_le_at::<u16>(data, offset)?)),
        4 => read_le_at::<u32>(data, offset),
        _ => Err(malformed_error!("Unsupported column width - {}", width)),
    }
}
