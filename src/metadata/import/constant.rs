use widestring::U16String;

use crate::{
    file::io::read_le,
    metadata::{
        image::MetadataImage,
        tables::{columns, CodedIndexType, TableId},
        token::Token,
    },
    Error, Result,
};

#[allow(non_snake_case)]
/// Element type bytes that can appear in `Constant.Type`
pub(crate) mod ELEMENT_TYPE {
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // null object reference, value is a 4 byte zero
    pub const CLASS: u8 = 0x12;
}

/// The default value of a field, parameter or property
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    /// No `Constant` row refers to the entity
    None,
    /// `bool`
    Bool(bool),
    /// `char`, one UTF-16 code unit
    Char(u16),
    /// `sbyte`
    I1(i8),
    /// `byte`
    U1(u8),
    /// `short`
    I2(i16),
    /// `ushort`
    U2(u16),
    /// `int`
    I4(i32),
    /// `uint`
    U4(u32),
    /// `long`
    I8(i64),
    /// `ulong`
    U8(u64),
    /// `float`
    R4(f32),
    /// `double`
    R8(f64),
    /// `string`, as stored UTF-16
    String(U16String),
    /// A null object reference
    NullRef,
}

impl ConstantValue {
    /// Decode a constant from its element type and value blob
    ///
    /// ## Arguments
    /// * 'element_type' - `Constant.Type`
    /// * 'blob'         - The `Constant.Value` blob, without its length prefix
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the blob is shorter than the type, and
    /// [`crate::Error::Malformed`] for an element type that cannot carry a constant or an odd
    /// length string
    pub fn decode(element_type: u8, blob: &[u8]) -> Result<ConstantValue> {
        Ok(match element_type {
            ELEMENT_TYPE::BOOLEAN => ConstantValue::Bool(read_le::<u8>(blob)? != 0),
            ELEMENT_TYPE::CHAR => ConstantValue::Char(read_le::<u16>(blob)?),
            ELEMENT_TYPE::I1 => ConstantValue::I1(read_le::<i8>(blob)?),
            ELEMENT_TYPE::U1 => ConstantValue::U1(read_le::<u8>(blob)?),
            ELEMENT_TYPE::I2 => ConstantValue::I2(read_le::<i16>(blob)?),
            ELEMENT_TYPE::U2 => ConstantValue::U2(read_le::<u16>(blob)?),
            ELEMENT_TYPE::I4 => ConstantValue::I4(read_le::<i32>(blob)?),
            ELEMENT_TYPE::U4 => ConstantValue::U4(read_le::<u32>(blob)?),
            ELEMENT_TYPE::I8 => ConstantValue::I8(read_le::<i64>(blob)?),
            ELEMENT_TYPE::U8 => ConstantValue::U8(read_le::<u64>(blob)?),
            ELEMENT_TYPE::R4 => ConstantValue::R4(read_le::<f32>(blob)?),
            ELEMENT_TYPE::R8 => ConstantValue::R8(read_le::<f64>(blob)?),
            ELEMENT_TYPE::STRING => {
                if blob.len() % 2 != 0 {
                    return Err(malformed_error!(
                        "Invalid UTF-16 constant length: {} (must be even)",
                        blob.len()
                    ));
                }

                let units: Vec<u16> = blob
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                ConstantValue::String(U16String::from_vec(units))
            }
            ELEMENT_TYPE::CLASS => {
                if read_le::<u32>(blob)? != 0 {
                    return Err(malformed_error!("Class constant is not a null reference"));
                }
                ConstantValue::NullRef
            }
            _ => {
                return Err(malformed_error!(
                    "Element type 0x{:02x} cannot carry a constant",
                    element_type
                ))
            }
        })
    }

    /// True for [`ConstantValue::None`]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, ConstantValue::None)
    }

    /// The value widened to `i64`, for the signed and unsigned integer kinds that fit
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ConstantValue::I1(value) => Some(i64::from(value)),
            ConstantValue::U1(value) => Some(i64::from(value)),
            ConstantValue::I2(value) => Some(i64::from(value)),
            ConstantValue::U2(value) | ConstantValue::Char(value) => Some(i64::from(value)),
            ConstantValue::I4(value) => Some(i64::from(value)),
            ConstantValue::U4(value) => Some(i64::from(value)),
            ConstantValue::I8(value) => Some(value),
            ConstantValue::U8(value) => i64::try_from(value).ok(),
            _ => None,
        }
    }

    /// The string value, lossily converted
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        match self {
            ConstantValue::String(value) => Some(value.to_string_lossy()),
            _ => None,
        }
    }
}

impl MetadataImage<'_> {
    /// The default value of a `Field`, `Param` or `Property`
    ///
    /// Scans the `Constant` table in row order; the first row whose parent is `token` wins.
    /// Parents are compared in their stored coded form, so only the matching row is decoded.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a nil token or one of another table, and
    /// [`crate::Error::Malformed`] if the matching row cannot be decoded
    pub fn constant_of(&self, token: Token) -> Result<ConstantValue> {
        let owner_table = match token.table_id() {
            Some(table @ (TableId::Field | TableId::Param | TableId::Property)) => table,
            _ => return Err(Error::InvalidToken(token)),
        };
        Self::expect_row(token, owner_table)?;
        let Some(target) = CodedIndexType::HasConstant.encode(token) else {
            return Err(Error::InvalidToken(token));
        };

        for rid in 1..=self.row_count(TableId::Constant) {
            let parent = self.read_column_raw(TableId::Constant, columns::CONSTANT_PARENT, rid)?;
            if parent != target {
                continue;
            }

            let element_type = self.read_column(TableId::Constant, columns::CONSTANT_TYPE, rid)?;
            let value = self.read_column(TableId::Constant, columns::CONSTANT_VALUE, rid)?;

            return ConstantValue::decode(element_type as u8, self.blob_at(value)?);
        }

        Ok(ConstantValue::None)
    }
}
