//! Row and column access over a computed [`TableLayout`].

use crate::{
    file::io::read_le_at_width,
    metadata::tables::{ColumnCategory, TableId, TableLayout, TableSchema},
    Error, Result,
};

impl TableLayout {
    /// The raw bytes of one row
    ///
    /// ## Arguments
    /// * 'data'    - The image the layout was computed for
    /// * 'table'   - The table kind
    /// * 'rid'     - The 1-based row id
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for row id 0 or a row id past the row count
    pub fn row_bytes<'a>(&self, data: &'a [u8], table: TableId, rid: u32) -> Result<&'a [u8]> {
        let instance = self.get(table);
        let start = instance.row_offset(rid)?;
        let end = start + instance.row_size() as usize;

        data.get(start..end).ok_or(out_of_bounds_error!())
    }

    /// Read one column of one row as an unsigned value
    ///
    /// Coded indexes are returned normalized to a token value (table number in the high byte,
    /// row id in the low 24 bits); every other category is returned as stored.
    ///
    /// ## Arguments
    /// * 'data'    - The image the layout was computed for
    /// * 'table'   - The table kind
    /// * 'column'  - The 0-based column index
    /// * 'rid'     - The 1-based row id
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownColumn`] for a column index outside the schema,
    /// [`crate::Error::OutOfBounds`] for a bad row id, and [`crate::Error::Malformed`] for a coded
    /// index whose tag names no table
    pub fn read_column(&self, data: &[u8], table: TableId, column: usize, rid: u32) -> Result<u32> {
        let value = self.read_column_raw(data, table, column, rid)?;

        match TableSchema::of(table).columns[column].category {
            ColumnCategory::Coded(kind) => Ok(kind.decode_token(value)?.value()),
            _ => Ok(value),
        }
    }

    /// Read one column of one row exactly as stored, coded indexes included
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownColumn`] for a column index outside the schema and
    /// [`crate::Error::OutOfBounds`] for a bad row id
    pub fn read_column_raw(
        &self,
        data: &[u8],
        table: TableId,
        column: usize,
        rid: u32,
    ) -> Result<u32> {
        if column >= TableSchema::of(table).columns.len() {
            return Err(Error::UnknownColumn { table, column });
        }

        let instance = self.get(table);
        let (Some(offset), Some(width)) = (instance.offset(column), instance.width(column)) else {
            return Err(Error::UnknownColumn { table, column });
        };

        let row = self.row_bytes(data, table, rid)?;
        let mut offset = usize::from(offset);
        read_le_at_width(row, &mut offset, width)
    }
}
