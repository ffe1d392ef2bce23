//! Header of the compressed table stream (`#~`, ECMA-335 II.24.2.6).
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Reserved, always 0
//! 4       1     MajorVersion
//! 5       1     MinorVersion
//! 6       1     HeapSizes    (0x01 strings, 0x02 guids, 0x04 blobs use 4 byte indexes)
//! 7       1     Reserved, always 1
//! 8       8     Valid        (bit per present table)
//! 16      8     Sorted       (bit per sorted table)
//! 24      4*n   Rows         (one u32 per set bit of Valid, ascending table number)
//! ```

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::parser::Parser,
    metadata::{
        tables::{HeapKind, TableId},
        token::Token,
    },
    Result,
};

/// Parsed header of the table stream
#[derive(Clone, Debug, PartialEq)]
pub struct TablesHeader {
    /// Major version of the table schema
    pub major_version: u8,
    /// Minor version of the table schema
    pub minor_version: u8,
    /// Heap index width flags
    pub heap_sizes: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables; informational only
    pub sorted: u64,
    /// Row count per table kind, 0 for absent tables
    pub row_counts: [u32; TableId::COUNT],
    /// Size of the header including the row counts; row data starts here
    pub size: usize,
}

impl TablesHeader {
    /// Parse the header at the start of the table stream
    ///
    /// ## Arguments
    /// * 'data' - The table stream, starting at its first byte
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header or the row counts are truncated, and
    /// [`crate::Error::Malformed`] if `valid` has a bit set for a table number outside the catalog
    /// or a row count does not fit a token's 24-bit row id
    pub fn from(data: &[u8]) -> Result<TablesHeader> {
        let mut parser = Parser::new(data);

        let _reserved = parser.read_le::<u32>()?;
        let major_version = parser.read_le::<u8>()?;
        let minor_version = parser.read_le::<u8>()?;
        let heap_sizes = parser.read_le::<u8>()?;
        let _reserved = parser.read_le::<u8>()?;
        let valid = parser.read_le::<u64>()?;
        let sorted = parser.read_le::<u64>()?;

        let unknown = valid >> TableId::COUNT;
        if unknown != 0 {
            return Err(malformed_error!(
                "Table stream marks unknown tables as present - valid: 0x{:016x}",
                valid
            ));
        }

        let mut row_counts = [0_u32; TableId::COUNT];
        for table_id in TableId::iter() {
            if valid & (1_u64 << table_id as u64) == 0 {
                continue;
            }

            let rows = parser.read_le::<u32>()?;
            if rows > Token::MAX_ROW {
                return Err(malformed_error!(
                    "Table {} declares {} rows, more than a token can address",
                    table_id.name(),
                    rows
                ));
            }
            row_counts[table_id as usize] = rows;
        }

        Ok(TablesHeader {
            major_version,
            minor_version,
            heap_sizes,
            valid,
            sorted,
            row_counts,
            size: parser.pos(),
        })
    }

    /// True if the table's bit is set in the `valid` mask
    #[must_use]
    pub fn is_present(&self, table: TableId) -> bool {
        self.valid & (1_u64 << table as u64) != 0
    }

    /// True if the table's bit is set in the `sorted` mask
    #[must_use]
    pub fn is_sorted(&self, table: TableId) -> bool {
        self.sorted & (1_u64 << table as u64) != 0
    }

    /// Number of tables marked present
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Row count of a table, 0 if absent
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.row_counts[table as usize]
    }

    /// True if indexes into `heap` are 4 bytes wide
    #[must_use]
    pub fn is_large_heap(&self, heap: HeapKind) -> bool {
        self.heap_sizes & heap.size_flag() != 0
    }
}
