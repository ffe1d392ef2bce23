//! The table catalog: a compile-time description of every table kind's columns.
//!
//! Each [`TableSchema`] lists its columns in on-disk order. A column is a fixed-size scalar,
//! an index into one of the heaps, a row id of another table, or a coded index spanning
//! several tables. Only the scalar widths are known up front; everything else is resolved per
//! image by [`crate::metadata::tables::TableLayout`].
//!
//! Column layouts follow ECMA-335 II.22. The `Constant` table carries its one-byte padding
//! after `Type` as an explicit column.

use crate::metadata::tables::{CodedIndexType, CodedIndexType as C, TableId, TableId as T};

/// Largest column count of any table in the catalog (`Assembly`, `AssemblyRef`)
pub const MAX_COLUMNS: usize = 9;

/// The heaps a column can index into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeapKind {
    /// `#Strings`, width selected by heap-size bit 0x01
    String,
    /// `#GUID`, width selected by heap-size bit 0x02
    Guid,
    /// `#Blob`, width selected by heap-size bit 0x04
    Blob,
}

impl HeapKind {
    /// The bit in the table stream's heap-size flags selecting 4 byte indexes for this heap
    #[must_use]
    pub fn size_flag(self) -> u8 {
        match self {
            HeapKind::String => 0x01,
            HeapKind::Guid => 0x02,
            HeapKind::Blob => 0x04,
        }
    }
}

/// What a column holds, and therefore how its width is determined
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnCategory {
    /// Fixed-size unsigned value of the given byte width (1, 2 or 4)
    Scalar(u8),
    /// Offset or index into a heap
    Heap(HeapKind),
    /// 1-based row id of the given table
    Row(TableId),
    /// Coded index of the given kind
    Coded(CodedIndexType),
}

impl ColumnCategory {
    /// Conventional numeric column type code
    ///
    /// | Category          | Code                  |
    /// |-------------------|-----------------------|
    /// | Row id            | target table (0..63)  |
    /// | Coded index       | 64 + coded kind       |
    /// | 2 byte scalar     | 97 (`UInt16`)         |
    /// | 4 byte scalar     | 99 (`UInt32`)         |
    /// | 1 byte scalar     | 100 (`Byte`)          |
    /// | String heap       | 101                   |
    /// | GUID heap         | 102                   |
    /// | Blob heap         | 103                   |
    #[must_use]
    pub fn type_code(&self) -> u8 {
        match self {
            ColumnCategory::Row(table) => *table as u8,
            ColumnCategory::Coded(kind) => 64 + *kind as u8,
            ColumnCategory::Scalar(1) => 100,
            ColumnCategory::Scalar(2) => 97,
            ColumnCategory::Scalar(_) => 99,
            ColumnCategory::Heap(HeapKind::String) => 101,
            ColumnCategory::Heap(HeapKind::Guid) => 102,
            ColumnCategory::Heap(HeapKind::Blob) => 103,
        }
    }
}

/// One column of a table schema
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Column name as used in ECMA-335
    pub name: &'static str,
    /// What the column holds
    pub category: ColumnCategory,
}

/// The static description of one table kind
#[derive(Debug)]
pub struct TableSchema {
    /// The table kind
    pub id: TableId,
    /// Columns in on-disk order
    pub columns: &'static [ColumnSchema],
    /// Index of the primary key column, if the table is keyed
    pub key: Option<u8>,
}

impl TableSchema {
    /// Look up the schema of a table kind
    #[must_use]
    pub fn of(table: TableId) -> &'static TableSchema {
        &CATALOG[table as usize]
    }
}

const fn u8_(name: &'static str) -> ColumnSchema {
    ColumnSchema {
        name,
        category: ColumnCategory::Scalar(1),
    }
}

const fn u16_(name: &'static str) -> ColumnSchema {
    ColumnSchema {
        name,
        category: ColumnCategory::Scalar(2),
    }
}

const fn u32_(name: &'static str) -> ColumnSchema {
    ColumnSchema {
        name,
        category: ColumnCategory::Scalar(4),
    }
}

const fn string(name: &'static str) -> ColumnSchema {
    ColumnSchema {
        name,
        category: ColumnCategory::Heap(HeapKind::String),
    }
}

const fn guid(name: &'static str) -> ColumnSchema {
    ColumnSchema {
        name,
        category: ColumnCategory::Heap(HeapKind::Guid),
    }
}

const fn blob(name: &'static str) -> ColumnSchema {
    ColumnSchema {
        name,
        category: ColumnCategory::Heap(HeapKind::Blob),
    }
}

const fn row(name: &'static str, table: TableId) -> ColumnSchema {
    ColumnSchema {
        name,
        category: ColumnCategory::Row(table),
    }
}

const fn coded(name: &'static str, kind: CodedIndexType) -> ColumnSchema {
    ColumnSchema {
        name,
        category: ColumnCategory::Coded(kind),
    }
}

const fn table(
    id: TableId,
    columns: &'static [ColumnSchema],
    key: Option<u8>,
) -> TableSchema {
    TableSchema { id, columns, key }
}

/// Schemas of all table kinds, indexed by table number
#[rustfmt::skip]
pub static CATALOG: [TableSchema; 45] = [
    table(T::Module, &[
        u16_("Generation"), string("Name"), guid("Mvid"), guid("EncId"), guid("EncBaseId"),
    ], None),
    table(T::TypeRef, &[
        coded("ResolutionScope", C::ResolutionScope), string("TypeName"), string("TypeNamespace"),
    ], None),
    table(T::TypeDef, &[
        u32_("Flags"), string("TypeName"), string("TypeNamespace"),
        coded("Extends", C::TypeDefOrRef), row("FieldList", T::Field),
        row("MethodList", T::MethodDef),
    ], None),
    table(T::FieldPtr, &[row("Field", T::Field)], None),
    table(T::Field, &[u16_("Flags"), string("Name"), blob("Signature")], None),
    table(T::MethodPtr, &[row("Method", T::MethodDef)], None),
    table(T::MethodDef, &[
        u32_("RVA"), u16_("ImplFlags"), u16_("Flags"), string("Name"), blob("Signature"),
        row("ParamList", T::Param),
    ], None),
    table(T::ParamPtr, &[row("Param", T::Param)], None),
    table(T::Param, &[u16_("Flags"), u16_("Sequence"), string("Name")], None),
    table(T::InterfaceImpl, &[
        row("Class", T::TypeDef), coded("Interface", C::TypeDefOrRef),
    ], Some(0)),
    table(T::MemberRef, &[
        coded("Class", C::MemberRefParent), string("Name"), blob("Signature"),
    ], None),
    table(T::Constant, &[
        u8_("Type"), u8_("Padding"), coded("Parent", C::HasConstant), blob("Value"),
    ], Some(2)),
    table(T::CustomAttribute, &[
        coded("Parent", C::HasCustomAttribute), coded("Type", C::CustomAttributeType),
        blob("Value"),
    ], Some(0)),
    table(T::FieldMarshal, &[
        coded("Parent", C::HasFieldMarshal), blob("NativeType"),
    ], Some(0)),
    table(T::DeclSecurity, &[
        u16_("Action"), coded("Parent", C::HasDeclSecurity), blob("PermissionSet"),
    ], Some(1)),
    table(T::ClassLayout, &[
        u16_("PackingSize"), u32_("ClassSize"), row("Parent", T::TypeDef),
    ], Some(2)),
    table(T::FieldLayout, &[u32_("Offset"), row("Field", T::Field)], Some(1)),
    table(T::StandAloneSig, &[blob("Signature")], None),
    table(T::EventMap, &[row("Parent", T::TypeDef), row("EventList", T::Event)], Some(0)),
    table(T::EventPtr, &[row("Event", T::Event)], None),
    table(T::Event, &[
        u16_("EventFlags"), string("Name"), coded("EventType", C::TypeDefOrRef),
    ], None),
    table(T::PropertyMap, &[
        row("Parent", T::TypeDef), row("PropertyList", T::Property),
    ], Some(0)),
    table(T::PropertyPtr, &[row("Property", T::Property)], None),
    table(T::Property, &[u16_("Flags"), string("Name"), blob("Type")], None),
    table(T::MethodSemantics, &[
        u16_("Semantics"), row("Method", T::MethodDef), coded("Association", C::HasSemantics),
    ], Some(2)),
    table(T::MethodImpl, &[
        row("Class", T::TypeDef), coded("MethodBody", C::MethodDefOrRef),
        coded("MethodDeclaration", C::MethodDefOrRef),
    ], Some(0)),
    table(T::ModuleRef, &[string("Name")], None),
    table(T::TypeSpec, &[blob("Signature")], None),
    table(T::ImplMap, &[
        u16_("MappingFlags"), coded("MemberForwarded", C::MemberForwarded),
        string("ImportName"), row("ImportScope", T::ModuleRef),
    ], Some(1)),
    table(T::FieldRVA, &[u32_("RVA"), row("Field", T::Field)], Some(1)),
    table(T::EncLog, &[u32_("Token"), u32_("FuncCode")], None),
    table(T::EncMap, &[u32_("Token")], None),
    table(T::Assembly, &[
        u32_("HashAlgId"), u16_("MajorVersion"), u16_("MinorVersion"), u16_("BuildNumber"),
        u16_("RevisionNumber"), u32_("Flags"), blob("PublicKey"), string("Name"),
        string("Culture"),
    ], None),
    table(T::AssemblyProcessor, &[u32_("Processor")], None),
    table(T::AssemblyOS, &[
        u32_("OSPlatformID"), u32_("OSMajorVersion"), u32_("OSMinorVersion"),
    ], None),
    table(T::AssemblyRef, &[
        u16_("MajorVersion"), u16_("MinorVersion"), u16_("BuildNumber"),
        u16_("RevisionNumber"), u32_("Flags"), blob("PublicKeyOrToken"), string("Name"),
        string("Culture"), blob("HashValue"),
    ], None),
    table(T::AssemblyRefProcessor, &[
        u32_("Processor"), row("AssemblyRef", T::AssemblyRef),
    ], None),
    table(T::AssemblyRefOS, &[
        u32_("OSPlatformID"), u32_("OSMajorVersion"), u32_("OSMinorVersion"),
        row("AssemblyRef", T::AssemblyRef),
    ], None),
    table(T::File, &[u32_("Flags"), string("Name"), blob("HashValue")], None),
    table(T::ExportedType, &[
        u32_("Flags"), u32_("TypeDefId"), string("TypeName"), string("TypeNamespace"),
        coded("Implementation", C::Implementation),
    ], None),
    table(T::ManifestResource, &[
        u32_("Offset"), u32_("Flags"), string("Name"), coded("Implementation", C::Implementation),
    ], None),
    table(T::NestedClass, &[
        row("NestedClass", T::TypeDef), row("EnclosingClass", T::TypeDef),
    ], Some(0)),
    table(T::GenericParam, &[
        u16_("Number"), u16_("Flags"), coded("Owner", C::TypeOrMethodDef), string("Name"),
    ], Some(2)),
    table(T::MethodSpec, &[
        coded("Method", C::MethodDefOrRef), blob("Instantiation"),
    ], None),
    table(T::GenericParamConstraint, &[
        row("Owner", T::GenericParam), coded("Constraint", C::TypeDefOrRef),
    ], Some(0)),
];

/// Column indexes used by the object browser
pub(crate) mod columns {
    pub const TYPEREF_SCOPE: usize = 0;
    pub const TYPEREF_NAME: usize = 1;
    pub const TYPEREF_NAMESPACE: usize = 2;

    pub const TYPEDEF_FLAGS: usize = 0;
    pub const TYPEDEF_NAME: usize = 1;
    pub const TYPEDEF_NAMESPACE: usize = 2;
    pub const TYPEDEF_EXTENDS: usize = 3;
    pub const TYPEDEF_FIELD_LIST: usize = 4;
    pub const TYPEDEF_METHOD_LIST: usize = 5;

    pub const FIELD_FLAGS: usize = 0;
    pub const FIELD_NAME: usize = 1;
    pub const FIELD_SIGNATURE: usize = 2;

    pub const METHOD_RVA: usize = 0;
    pub const METHOD_IMPL_FLAGS: usize = 1;
    pub const METHOD_FLAGS: usize = 2;
    pub const METHOD_NAME: usize = 3;
    pub const METHOD_SIGNATURE: usize = 4;
    pub const METHOD_PARAM_LIST: usize = 5;

    pub const PARAM_FLAGS: usize = 0;
    pub const PARAM_SEQUENCE: usize = 1;
    pub const PARAM_NAME: usize = 2;

    pub const CONSTANT_TYPE: usize = 0;
    pub const CONSTANT_PARENT: usize = 2;
    pub const CONSTANT_VALUE: usize = 3;
}

#[cfg(test)]
mod tests {
    use strum::{EnumCount, IntoEnumIterator};

    use super::*;

    #[test]
    fn catalog_order() {
        assert_eq!(CATALOG.len(), TableId::COUNT);
        for id in TableId::iter() {
            assert_eq!(CATALOG[id as usize].id, id);
        }
    }

    #[test]
    fn column_bounds() {
        for schema in &CATALOG {
            assert!(!schema.columns.is_empty());
            assert!(schema.columns.len() <= MAX_COLUMNS);
            if let Some(key) = schema.key {
                assert!((key as usize) < schema.columns.len());
            }
        }

        assert_eq!(TableSchema::of(TableId::Assembly).columns.len(), MAX_COLUMNS);
        assert_eq!(TableSchema::of(TableId::AssemblyRef).columns.len(), MAX_COLUMNS);
    }

    #[test]
    fn keys() {
        let constant = TableSchema::of(TableId::Constant);
        assert_eq!(constant.key, Some(2));
        assert_eq!(constant.columns[2].name, "Parent");

        let nested = TableSchema::of(TableId::NestedClass);
        assert_eq!(nested.columns[nested.key.unwrap() as usize].name, "NestedClass");

        assert_eq!(TableSchema::of(TableId::TypeDef).key, None);
    }

    #[test]
    fn browser_columns() {
        let typedef = TableSchema::of(TableId::TypeDef);
        assert_eq!(typedef.columns[columns::TYPEDEF_METHOD_LIST].name, "MethodList");
        assert_eq!(typedef.columns[columns::TYPEDEF_FIELD_LIST].name, "FieldList");
        assert_eq!(typedef.columns[columns::TYPEDEF_EXTENDS].name, "Extends");

        let method = TableSchema::of(TableId::MethodDef);
        assert_eq!(method.columns[columns::METHOD_PARAM_LIST].name, "ParamList");
        assert_eq!(method.columns[columns::METHOD_SIGNATURE].name, "Signature");

        let constant = TableSchema::of(TableId::Constant);
        assert_eq!(constant.columns[columns::CONSTANT_VALUE].name, "Value");
    }

    #[test]
    fn type_codes() {
        assert_eq!(ColumnCategory::Row(TableId::Field).type_code(), 0x04);
        assert_eq!(ColumnCategory::Coded(CodedIndexType::TypeDefOrRef).type_code(), 64);
        assert_eq!(ColumnCategory::Coded(CodedIndexType::TypeOrMethodDef).type_code(), 76);
        assert_eq!(ColumnCategory::Scalar(2).type_code(), 97);
        assert_eq!(ColumnCategory::Scalar(4).type_code(), 99);
        assert_eq!(ColumnCategory::Scalar(1).type_code(), 100);
        assert_eq!(ColumnCategory::Heap(HeapKind::String).type_code(), 101);
        assert_eq!(ColumnCategory::Heap(HeapKind::Guid).type_code(), 102);
        assert_eq!(ColumnCategory::Heap(HeapKind::Blob).type_code(), 103);
    }
}
