//! Re-exports for glob imports.

pub use crate::{Error, Result};

pub use crate::{LoaderConfig, MetadataFile, MetadataImage, Parser};

pub use crate::metadata::{
    flags::{FieldAttributes, MethodAttributes, MethodImplAttributes, ParamAttributes, TypeAttributes},
    image::{ColumnProps, TableProps},
    import::{
        ConstantValue, EnumerationCursor, FieldDefProps, MethodDefProps, ParamDefProps,
        TypeDefProps, TypeRefProps,
    },
    root::CIL_HEADER_MAGIC,
    streams::{Blob, Guid, Strings, UserStrings},
    tables::{CodedIndexType, ColumnCategory, HeapKind, TableId},
    token::Token,
};
