use std::fmt;

use crate::metadata::tables::TableId;

/// A metadata token identifying one row of one table.
///
/// Tokens are 32-bit values where:
/// - The high byte (bits 24-31) is the table number ([`TableId`])
/// - The low 24 bits (bits 0-23) are the 1-based row id within that table
///
/// A row id of `0` is "nil": the token names a table kind but no row. Decoded coded
/// references keep their table byte even when nil, so callers can still tell which table
/// the reference pointed into. Row ids are validated against row counts lazily, when a token
/// is dereferenced, not when it is decoded.
///
/// # Examples
///
/// ```rust
/// use metascope::{TableId, Token};
///
/// let token = Token::from_parts(TableId::MethodDef, 3);
/// assert_eq!(token.value(), 0x0600_0003);
/// assert_eq!(token.table_id(), Some(TableId::MethodDef));
/// assert_eq!(token.row(), 3);
/// assert!(!token.is_null());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// The all-zero token, used for absent references
    pub const NULL: Token = Token(0);

    /// The largest row id a token can carry
    pub const MAX_ROW: u32 = 0x00FF_FFFF;

    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table kind and a row id
    ///
    /// Only the low 24 bits of `row` are kept.
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token((u32::from(table as u8) << 24) | (row & Self::MAX_ROW))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table number from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table kind, or `None` if the high byte is not a known table
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_u8(self.table())
    }

    /// Extracts the row id from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if the token has no referent (row id 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row() == 0
    }

    /// Returns true if the token names a row of `table`
    #[must_use]
    pub fn is_table(&self, table: TableId) -> bool {
        self.table() == table as u8
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
