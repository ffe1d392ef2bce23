//! Per-image table layout: column widths, row sizes and row data offsets.
//!
//! Layout happens in two passes over the catalog. The first computes every column's width,
//! which for row ids and coded indexes depends on other tables' row counts. The second walks
//! the present tables in ascending order and assigns each one its slice of the row data region,
//! checking every advance against the end of the image.

use strum::{EnumCount, IntoEnumIterator};
use tracing::trace;

use crate::{
    metadata::{
        streams::TablesHeader,
        tables::{ColumnCategory, TableId, TableSchema, MAX_COLUMNS},
    },
    Result,
};

/// Computed layout of one table kind in one image
///
/// Absent tables have a row count of 0 and no data offset, but still carry column widths so
/// that schema introspection works for every kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableInstance {
    row_count: u32,
    row_size: u32,
    column_count: u8,
    widths: [u8; MAX_COLUMNS],
    offsets: [u8; MAX_COLUMNS],
    data_offset: Option<usize>,
}

impl TableInstance {
    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Size of one row in bytes
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Number of columns, equal to the schema's column count
    #[must_use]
    pub fn column_count(&self) -> usize {
        usize::from(self.column_count)
    }

    /// Byte widths of the columns, in schema order
    #[must_use]
    pub fn widths(&self) -> &[u8] {
        &self.widths[..self.column_count()]
    }

    /// Byte width of one column
    #[must_use]
    pub fn width(&self, column: usize) -> Option<u8> {
        self.widths().get(column).copied()
    }

    /// Byte offset of one column within a row
    #[must_use]
    pub fn offset(&self, column: usize) -> Option<u8> {
        self.offsets[..self.column_count()].get(column).copied()
    }

    /// Absolute image offset of the first row, `None` if the table is absent
    #[must_use]
    pub fn data_offset(&self) -> Option<usize> {
        self.data_offset
    }

    /// Image offset of a 1-based row id
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for row id 0, a row id past the row count, or an
    /// absent table
    pub fn row_offset(&self, rid: u32) -> Result<usize> {
        if rid == 0 || rid > self.row_count {
            return Err(out_of_bounds_error!());
        }

        let Some(base) = self.data_offset else {
            return Err(out_of_bounds_error!());
        };

        // rid <= row_count, and row_count * row_size was validated during layout
        Ok(base + (rid as usize - 1) * self.row_size as usize)
    }
}

/// The table store of one image: the parsed table stream header and a layout per table kind
#[derive(Clone, Debug, PartialEq)]
pub struct TableLayout {
    header: TablesHeader,
    tables: [TableInstance; TableId::COUNT],
}

impl TableLayout {
    /// Compute the layout of every table kind
    ///
    /// ## Arguments
    /// * 'header'      - The parsed table stream header
    /// * 'rows_offset' - Image offset of the first byte after the header
    /// * 'image_len'   - Total length of the image
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if any present table's rows would extend past the end
    /// of the image
    pub fn new(header: TablesHeader, rows_offset: usize, image_len: usize) -> Result<TableLayout> {
        let mut tables = [TableInstance::default(); TableId::COUNT];

        for table_id in TableId::iter() {
            tables[table_id as usize] = Self::size_table(&header, table_id);
        }

        let mut cursor = rows_offset;
        for table_id in TableId::iter() {
            if !header.is_present(table_id) {
                continue;
            }

            let instance = &mut tables[table_id as usize];
            instance.data_offset = Some(cursor);

            let extent = (instance.row_count as usize).checked_mul(instance.row_size as usize);
            let end = extent.and_then(|extent| cursor.checked_add(extent));
            match end {
                Some(end) if end <= image_len => cursor = end,
                _ => {
                    return Err(malformed_error!(
                        "Table {} with {} rows of {} bytes at 0x{:x} extends past the image end 0x{:x}",
                        table_id.name(),
                        instance.row_count,
                        instance.row_size,
                        cursor,
                        image_len
                    ))
                }
            }

            trace!(
                table = table_id.name(),
                rows = instance.row_count,
                row_size = instance.row_size,
                offset = instance.data_offset,
                "table laid out"
            );
        }

        Ok(TableLayout { header, tables })
    }

    /// Column widths and offsets of one table kind
    fn size_table(header: &TablesHeader, table_id: TableId) -> TableInstance {
        let schema = TableSchema::of(table_id);
        let mut instance = TableInstance {
            row_count: header.rows(table_id),
            column_count: schema.columns.len() as u8,
            ..TableInstance::default()
        };

        let mut offset = 0_u8;
        for (index, column) in schema.columns.iter().enumerate() {
            let width = Self::column_width(header, column.category);
            instance.widths[index] = width;
            instance.offsets[index] = offset;
            offset += width;
        }

        instance.row_size = u32::from(offset);
        instance
    }

    /// Width of one column for the given header
    ///
    /// Row ids are 2 bytes if the target table has fewer than 2^16 rows. Coded indexes are
    /// 2 bytes if the largest candidate table has fewer than 2^(16 - tag bits) rows; reserved
    /// tags do not count.
    #[must_use]
    pub fn column_width(header: &TablesHeader, category: ColumnCategory) -> u8 {
        match category {
            ColumnCategory::Scalar(width) => width,
            ColumnCategory::Heap(heap) => {
                if header.is_large_heap(heap) {
                    4
                } else {
                    2
                }
            }
            ColumnCategory::Row(target) => {
                if header.rows(target) < 0x1_0000 {
                    2
                } else {
                    4
                }
            }
            ColumnCategory::Coded(kind) => {
                let max_rows = kind
                    .tables()
                    .iter()
                    .flatten()
                    .map(|table| header.rows(*table))
                    .max()
                    .unwrap_or(0);

                if u64::from(max_rows) < (1_u64 << (16 - kind.tag_bits())) {
                    2
                } else {
                    4
                }
            }
        }
    }

    /// The parsed table stream header
    #[must_use]
    pub fn header(&self) -> &TablesHeader {
        &self.header
    }

    /// Layout of one table kind
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableInstance {
        &self.tables[table as usize]
    }

    /// Row count of one table kind, 0 if absent
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.tables[table as usize].row_count
    }

    /// Iterate the present table kinds in ascending order
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        TableId::iter().filter(|table| self.header.is_present(*table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{CodedIndexType, HeapKind};

    fn header_with(rows: &[(TableId, u32)], heap_sizes: u8) -> TablesHeader {
        let mut header = TablesHeader {
            major_version: 2,
            minor_version: 0,
            heap_sizes,
            valid: 0,
            sorted: 0,
            row_counts: [0; TableId::COUNT],
            size: 24,
        };

        for (table, count) in rows {
            header.valid |= 1 << *table as u64;
            header.row_counts[*table as usize] = *count;
        }

        header.size += 4 * rows.len();
        header
    }

    #[test]
    fn small_widths() {
        let header = header_with(&[(TableId::TypeDef, 3), (TableId::MethodDef, 5)], 0);
        let layout = TableLayout::new(header, 32, 1024).unwrap();

        let typedef = layout.get(TableId::TypeDef);
        assert_eq!(typedef.widths(), &[4, 2, 2, 2, 2, 2]);
        assert_eq!(typedef.row_size(), 14);
        assert_eq!(typedef.offset(5), Some(12));
        assert_eq!(typedef.data_offset(), Some(32));

        let method = layout.get(TableId::MethodDef);
        assert_eq!(method.widths(), &[4, 2, 2, 2, 2, 2]);
        assert_eq!(method.data_offset(), Some(32 + 3 * 14));

        let field = layout.get(TableId::Field);
        assert_eq!(field.row_count(), 0);
        assert_eq!(field.data_offset(), None);
        assert_eq!(field.row_size(), 6);

        assert_eq!(
            layout.present_tables().collect::<Vec<_>>(),
            vec![TableId::TypeDef, TableId::MethodDef]
        );
    }

    #[test]
    fn heap_widths() {
        let header = header_with(&[(TableId::Module, 1)], 0x07);
        let layout = TableLayout::new(header, 28, 1024).unwrap();
        assert_eq!(layout.get(TableId::Module).widths(), &[2, 4, 4, 4, 4]);

        let header = header_with(&[(TableId::Module, 1)], 0x02);
        assert!(header.is_large_heap(HeapKind::Guid));
        let layout = TableLayout::new(header, 28, 1024).unwrap();
        assert_eq!(layout.get(TableId::Module).widths(), &[2, 2, 4, 4, 4]);
    }

    #[test]
    fn row_width_boundary() {
        let header = header_with(&[(TableId::Field, 0xFFFF)], 0);
        assert_eq!(
            TableLayout::column_width(&header, ColumnCategory::Row(TableId::Field)),
            2
        );

        let header = header_with(&[(TableId::Field, 0x1_0000)], 0);
        assert_eq!(
            TableLayout::column_width(&header, ColumnCategory::Row(TableId::Field)),
            4
        );
    }

    #[test]
    fn coded_width_boundary() {
        // TypeDefOrRef uses 2 tag bits: 2 byte form up to 2^14 - 1 rows
        let kind = ColumnCategory::Coded(CodedIndexType::TypeDefOrRef);

        let header = header_with(&[(TableId::TypeDef, 10), (TableId::TypeRef, 0x3FFF)], 0);
        assert_eq!(TableLayout::column_width(&header, kind), 2);

        let header = header_with(&[(TableId::TypeDef, 10), (TableId::TypeRef, 0x4000)], 0);
        assert_eq!(TableLayout::column_width(&header, kind), 4);
    }

    #[test]
    fn coded_width_ignores_reserved_tags() {
        // CustomAttributeType has 5 tags, 3 tag bits: 2 byte form up to 2^13 - 1 rows
        let kind = ColumnCategory::Coded(CodedIndexType::CustomAttributeType);

        let header = header_with(&[(TableId::MemberRef, 0x1FFF)], 0);
        assert_eq!(TableLayout::column_width(&header, kind), 2);

        let header = header_with(&[(TableId::MethodDef, 0x2000)], 0);
        assert_eq!(TableLayout::column_width(&header, kind), 4);

        // Module is not a candidate of CustomAttributeType
        let header = header_with(&[(TableId::Module, 0x2000)], 0);
        assert_eq!(TableLayout::column_width(&header, kind), 2);
    }

    #[test]
    fn extent_past_image() {
        let header = header_with(&[(TableId::TypeDef, 3), (TableId::MethodDef, 5)], 0);
        // 32 + 3 * 14 + 5 * 14 = 144
        assert!(TableLayout::new(header.clone(), 32, 144).is_ok());
        assert!(matches!(
            TableLayout::new(header, 32, 143),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn huge_row_count() {
        let header = header_with(&[(TableId::Assembly, u32::MAX)], 0);
        assert!(TableLayout::new(header, 28, 4096).is_err());

        let header = header_with(&[(TableId::Module, 1)], 0);
        assert!(TableLayout::new(header, usize::MAX, usize::MAX).is_err());
    }

    #[test]
    fn row_offsets() {
        let header = header_with(&[(TableId::TypeDef, 3)], 0);
        let layout = TableLayout::new(header, 28, 1024).unwrap();
        let typedef = layout.get(TableId::TypeDef);

        assert_eq!(typedef.row_offset(1).unwrap(), 28);
        assert_eq!(typedef.row_offset(3).unwrap(), 28 + 2 * 14);
        assert!(typedef.row_offset(0).is_err());
        assert!(typedef.row_offset(4).is_err());
        assert!(layout.get(TableId::Field).row_offset(1).is_err());
    }
}
