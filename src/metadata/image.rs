//! The opened metadata of one image.
//!
//! [`MetadataImage`] is the result of walking PE headers, the metadata root, the stream directory
//! and the table stream header once. Afterwards it is immutable: every table, column and heap
//! query is a bounds-checked read over the borrowed bytes, and the image can be shared between
//! threads for concurrent reads.
//!
//! # Example
//!
//! ```rust,no_run
//! use metascope::{metadata::tables::TableId, MetadataImage};
//!
//! let data = std::fs::read("tests/samples/WindowsBase.dll")?;
//! let image = MetadataImage::open(&data)?;
//!
//! let info = image.table_info(TableId::TypeDef);
//! println!("{}: {} rows of {} bytes", info.name, info.row_count, info.row_size);
//! println!("first type name: {}", image.string_at(image.read_column(TableId::TypeDef, 1, 1)?)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{borrow::Cow, fmt};

use tracing::debug;
use widestring::U16String;

use crate::{
    file::pe::{locate, MetadataRootInfo},
    metadata::{
        config::LoaderConfig,
        cor20header::Cor20Header,
        root::{Root, Streams},
        streams::{Blob, BlobIterator, Guid, Strings, StringsIterator, TablesHeader, UserStrings},
        tables::{ColumnCategory, TableId, TableLayout, TableSchema},
    },
    Error, Result,
};

/// Summary of one table kind, as laid out in this image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableProps {
    /// Number of rows, 0 if the table is absent
    pub row_count: u32,
    /// Size of one row in bytes
    pub row_size: u32,
    /// Number of columns
    pub column_count: usize,
    /// Index of the primary key column, if the table has one
    pub key_column: Option<usize>,
    /// Name of the table kind
    pub name: &'static str,
}

/// Description of one column, as laid out in this image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnProps {
    /// Byte offset of the column within a row
    pub offset: usize,
    /// Byte width of the column
    pub width: usize,
    /// What the column holds
    pub category: ColumnCategory,
    /// Numeric column type code of the category
    pub type_code: u8,
    /// Name of the column
    pub name: &'static str,
}

/// The validated metadata of one image, borrowing the image bytes
#[derive(Clone)]
pub struct MetadataImage<'a> {
    data: &'a [u8],
    location: MetadataRootInfo,
    streams: Streams,
    strings: Option<Strings<'a>>,
    blob: Option<Blob<'a>>,
    guid: Option<Guid<'a>>,
    user_strings: Option<UserStrings<'a>>,
    tables: TableLayout,
}

impl<'a> MetadataImage<'a> {
    /// Open an image with the default [`LoaderConfig`]
    ///
    /// ## Arguments
    /// * 'data' - The complete PE image
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`] if any structure on
    /// the way to the table rows is invalid or extends past the image
    pub fn open(data: &'a [u8]) -> Result<MetadataImage<'a>> {
        Self::open_with(data, LoaderConfig::default())
    }

    /// Open an image with an explicit [`LoaderConfig`]
    ///
    /// ## Arguments
    /// * 'data'    - The complete PE image
    /// * 'config'  - Stream directory handling
    ///
    /// # Errors
    /// See [`MetadataImage::open`]
    pub fn open_with(data: &'a [u8], config: LoaderConfig) -> Result<MetadataImage<'a>> {
        let location = locate(data)?;
        let streams = Streams::parse(data, location.offset, &config)?;

        let strings = match streams.strings {
            Some(region) => Some(Strings::from(region.slice(data)?)?),
            None => None,
        };
        let blob = match streams.blob {
            Some(region) => Some(Blob::from(region.slice(data)?)?),
            None => None,
        };
        let guid = match streams.guid {
            Some(region) => Some(Guid::from(region.slice(data)?)),
            None => None,
        };
        let user_strings = match streams.user_strings {
            Some(region) => Some(UserStrings::from(region.slice(data)?)?),
            None => None,
        };

        let header = TablesHeader::from(streams.tables.slice(data)?)?;
        let rows_offset = streams
            .tables
            .offset
            .checked_add(header.size)
            .ok_or_else(|| malformed_error!("Table stream header overflows"))?;
        let tables = TableLayout::new(header, rows_offset, data.len())?;

        debug!(
            version = %streams.root.version,
            present = tables.header().table_count(),
            typedefs = tables.rows(TableId::TypeDef),
            methods = tables.rows(TableId::MethodDef),
            "metadata image opened"
        );

        Ok(MetadataImage {
            data,
            location,
            streams,
            strings,
            blob,
            guid,
            user_strings,
            tables,
        })
    }

    /// The image bytes
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The CLI header
    #[must_use]
    pub fn cor20(&self) -> &Cor20Header {
        &self.location.cor20
    }

    /// Image offset of the metadata root
    #[must_use]
    pub fn root_offset(&self) -> usize {
        self.location.offset
    }

    /// The metadata root header and stream directory
    #[must_use]
    pub fn root(&self) -> &Root {
        &self.streams.root
    }

    /// The resolved stream regions
    #[must_use]
    pub fn streams(&self) -> &Streams {
        &self.streams
    }

    /// The metadata version string, e.g. `v4.0.30319`
    #[must_use]
    pub fn version(&self) -> &str {
        &self.streams.root.version
    }

    /// The computed table layout
    #[must_use]
    pub fn tables(&self) -> &TableLayout {
        &self.tables
    }

    /// Number of rows of a table kind, 0 if absent
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        self.tables.rows(table)
    }

    /// Iterate the present table kinds in ascending order
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        self.tables.present_tables()
    }

    /// Summary of one table kind
    #[must_use]
    pub fn table_info(&self, table: TableId) -> TableProps {
        let instance = self.tables.get(table);
        let schema = TableSchema::of(table);

        TableProps {
            row_count: instance.row_count(),
            row_size: instance.row_size(),
            column_count: instance.column_count(),
            key_column: schema.key.map(usize::from),
            name: table.name(),
        }
    }

    /// Description of one column of a table kind
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownColumn`] if `column` is outside the table's schema
    pub fn column_info(&self, table: TableId, column: usize) -> Result<ColumnProps> {
        let schema = TableSchema::of(table);
        let instance = self.tables.get(table);

        match (
            schema.columns.get(column),
            instance.offset(column),
            instance.width(column),
        ) {
            (Some(column_schema), Some(offset), Some(width)) => Ok(ColumnProps {
                offset: usize::from(offset),
                width: usize::from(width),
                category: column_schema.category,
                type_code: column_schema.category.type_code(),
                name: column_schema.name,
            }),
            _ => Err(Error::UnknownColumn { table, column }),
        }
    }

    /// The raw bytes of one row
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for row id 0 or past the row count
    pub fn row_bytes(&self, table: TableId, rid: u32) -> Result<&'a [u8]> {
        self.tables.row_bytes(self.data, table, rid)
    }

    /// Read one column of one row; coded indexes come back as token values
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownColumn`] for a column outside the schema and
    /// [`crate::Error::OutOfBounds`] for a bad row id
    pub fn read_column(&self, table: TableId, column: usize, rid: u32) -> Result<u32> {
        self.tables.read_column(self.data, table, column, rid)
    }

    /// Read one column of one row as stored, without decoding coded indexes
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownColumn`] for a column outside the schema and
    /// [`crate::Error::OutOfBounds`] for a bad row id
    pub fn read_column_raw(&self, table: TableId, column: usize, rid: u32) -> Result<u32> {
        self.tables.read_column_raw(self.data, table, column, rid)
    }

    /// The `#Strings` heap
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] if the image has no `#Strings` stream
    pub fn string_heap(&self) -> Result<Strings<'a>> {
        self.strings.ok_or(Error::NotFound)
    }

    /// The `#Blob` heap
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] if the image has no `#Blob` stream
    pub fn blob_heap(&self) -> Result<Blob<'a>> {
        self.blob.ok_or(Error::NotFound)
    }

    /// The `#GUID` heap
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] if the image has no `#GUID` stream
    pub fn guid_heap(&self) -> Result<Guid<'a>> {
        self.guid.ok_or(Error::NotFound)
    }

    /// The `#US` heap
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] if the image has no `#US` stream
    pub fn user_string_heap(&self) -> Result<UserStrings<'a>> {
        self.user_strings.ok_or(Error::NotFound)
    }

    /// The string at a `#Strings` offset
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] without a string heap, [`crate::Error::OutOfBounds`]
    /// for an offset past the heap, and [`crate::Error::Malformed`] for an unterminated or
    /// non UTF-8 entry
    pub fn string_at(&self, offset: u32) -> Result<&'a str> {
        self.string_heap()?.get(offset as usize)
    }

    /// The blob at a `#Blob` offset, without its length prefix
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] without a blob heap, and [`crate::Error::OutOfBounds`]
    /// or [`crate::Error::Malformed`] for a bad offset or length prefix
    pub fn blob_at(&self, offset: u32) -> Result<&'a [u8]> {
        self.blob_heap()?.get(offset as usize)
    }

    /// The raw 16 bytes of a 1-based `#GUID` index
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] without a GUID heap and [`crate::Error::OutOfBounds`]
    /// for index 0 or past the heap
    pub fn guid_at(&self, index: u32) -> Result<&'a [u8; 16]> {
        self.guid_heap()?.get(index as usize)
    }

    /// The GUID at a 1-based `#GUID` index
    ///
    /// # Errors
    /// See [`MetadataImage::guid_at`]
    pub fn guid_value_at(&self, index: u32) -> Result<uguid::Guid> {
        self.guid_heap()?.value(index as usize)
    }

    /// The UTF-16 code units of a `#US` entry, excluding the trailing terminal byte
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] without a user string heap, and
    /// [`crate::Error::OutOfBounds`] or [`crate::Error::Malformed`] for a bad offset or prefix
    pub fn user_string_at(&self, offset: u32) -> Result<Cow<'a, [u16]>> {
        self.user_string_heap()?.get(offset as usize)
    }

    /// A `#US` entry as an owned wide string
    ///
    /// # Errors
    /// See [`MetadataImage::user_string_at`]
    pub fn user_string(&self, offset: u32) -> Result<U16String> {
        self.user_string_heap()?.get_str(offset as usize)
    }

    /// Size of the `#Strings` heap after padding trim, 0 if absent
    #[must_use]
    pub fn string_heap_size(&self) -> usize {
        self.strings.map_or(0, |heap| heap.len())
    }

    /// Size of the `#Blob` heap, 0 if absent
    #[must_use]
    pub fn blob_heap_size(&self) -> usize {
        self.blob.map_or(0, |heap| heap.len())
    }

    /// Size of the `#GUID` heap, 0 if absent
    #[must_use]
    pub fn guid_heap_size(&self) -> usize {
        self.guid.map_or(0, |heap| heap.len())
    }

    /// Size of the `#US` heap, 0 if absent
    #[must_use]
    pub fn user_string_heap_size(&self) -> usize {
        self.user_strings.map_or(0, |heap| heap.len())
    }

    /// Offset of the string following the one at `offset`, `None` at the end of the heap
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] without a string heap, and [`crate::Error::OutOfBounds`]
    /// or [`crate::Error::Malformed`] for a bad offset
    pub fn next_string(&self, offset: u32) -> Result<Option<u32>> {
        Self::narrow(self.string_heap()?.next(offset as usize)?)
    }

    /// Offset of the blob following the one at `offset`, `None` at the end of the heap
    ///
    /// # Errors
    /// See [`MetadataImage::next_string`]
    pub fn next_blob(&self, offset: u32) -> Result<Option<u32>> {
        Self::narrow(self.blob_heap()?.next(offset as usize)?)
    }

    /// Offset of the user string following the one at `offset`, `None` at the end of the heap
    ///
    /// # Errors
    /// See [`MetadataImage::next_string`]
    pub fn next_user_string(&self, offset: u32) -> Result<Option<u32>> {
        Self::narrow(self.user_string_heap()?.next(offset as usize)?)
    }

    /// Iterate `(offset, string)` over the `#Strings` heap, skipping the empty string at 0
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] without a string heap
    pub fn strings(&self) -> Result<StringsIterator<'a>> {
        Ok(self.string_heap()?.iter())
    }

    /// Iterate `(offset, blob)` over the `#Blob` heap, skipping the empty blob at 0
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] without a blob heap
    pub fn blobs(&self) -> Result<BlobIterator<'a>> {
        Ok(self.blob_heap()?.iter())
    }

    fn narrow(offset: Option<usize>) -> Result<Option<u32>> {
        offset
            .map(|offset| u32::try_from(offset).map_err(|_| out_of_bounds_error!()))
            .transpose()
    }
}

impl fmt::Debug for MetadataImage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataImage")
            .field("len", &self.data.len())
            .field("root_offset", &self.location.offset)
            .field("version", &self.streams.root.version)
            .field("tables", &self.tables.header().table_count())
            .finish_non_exhaustive()
    }
}
