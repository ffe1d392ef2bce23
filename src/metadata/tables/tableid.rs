use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Identifiers for every table kind a compressed table stream can carry.
///
/// The numeric values are the table numbers of ECMA-335 II.22; they double as the bit
/// position in the table stream's `valid` mask and as the high byte of a [`crate::Token`].
/// The numbering is dense from `0x00` to `0x2C`, so the discriminant is also the index of the
/// table's entry in [`crate::metadata::tables::CATALOG`].
///
/// The pointer tables (`FieldPtr`, `MethodPtr`, ...) and the edit-and-continue tables
/// (`EncLog`, `EncMap`) only appear in uncompressed or delta metadata, but they are part of the
/// numbering and must be sized correctly if they are present.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, EnumIter, EnumCount, IntoStaticStr,
)]
#[repr(u8)]
pub enum TableId {
    /// `Module` table (0x00): the single row describing the current module
    Module = 0x00,
    /// `TypeRef` table (0x01): references to types defined elsewhere
    TypeRef = 0x01,
    /// `TypeDef` table (0x02): types defined in this module; row 1 is the `<Module>` pseudo-type
    TypeDef = 0x02,
    /// `FieldPtr` table (0x03): indirection for uncompressed metadata
    FieldPtr = 0x03,
    /// `Field` table (0x04): field definitions, owned in runs by `TypeDef`
    Field = 0x04,
    /// `MethodPtr` table (0x05): indirection for uncompressed metadata
    MethodPtr = 0x05,
    /// `MethodDef` table (0x06): method definitions, owned in runs by `TypeDef`
    MethodDef = 0x06,
    /// `ParamPtr` table (0x07): indirection for uncompressed metadata
    ParamPtr = 0x07,
    /// `Param` table (0x08): parameter definitions, owned in runs by `MethodDef`
    Param = 0x08,
    /// `InterfaceImpl` table (0x09)
    InterfaceImpl = 0x09,
    /// `MemberRef` table (0x0A)
    MemberRef = 0x0A,
    /// `Constant` table (0x0B): compile-time values of fields, params and properties
    Constant = 0x0B,
    /// `CustomAttribute` table (0x0C)
    CustomAttribute = 0x0C,
    /// `FieldMarshal` table (0x0D)
    FieldMarshal = 0x0D,
    /// `DeclSecurity` table (0x0E)
    DeclSecurity = 0x0E,
    /// `ClassLayout` table (0x0F)
    ClassLayout = 0x0F,
    /// `FieldLayout` table (0x10)
    FieldLayout = 0x10,
    /// `StandAloneSig` table (0x11)
    StandAloneSig = 0x11,
    /// `EventMap` table (0x12)
    EventMap = 0x12,
    /// `EventPtr` table (0x13)
    EventPtr = 0x13,
    /// `Event` table (0x14)
    Event = 0x14,
    /// `PropertyMap` table (0x15)
    PropertyMap = 0x15,
    /// `PropertyPtr` table (0x16)
    PropertyPtr = 0x16,
    /// `Property` table (0x17)
    Property = 0x17,
    /// `MethodSemantics` table (0x18)
    MethodSemantics = 0x18,
    /// `MethodImpl` table (0x19)
    MethodImpl = 0x19,
    /// `ModuleRef` table (0x1A)
    ModuleRef = 0x1A,
    /// `TypeSpec` table (0x1B)
    TypeSpec = 0x1B,
    /// `ImplMap` table (0x1C)
    ImplMap = 0x1C,
    /// `FieldRVA` table (0x1D)
    FieldRVA = 0x1D,
    /// `EncLog` table (0x1E)
    EncLog = 0x1E,
    /// `EncMap` table (0x1F)
    EncMap = 0x1F,
    /// `Assembly` table (0x20)
    Assembly = 0x20,
    /// `AssemblyProcessor` table (0x21)
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` table (0x22)
    AssemblyOS = 0x22,
    /// `AssemblyRef` table (0x23)
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` table (0x24)
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` table (0x25)
    AssemblyRefOS = 0x25,
    /// `File` table (0x26)
    File = 0x26,
    /// `ExportedType` table (0x27)
    ExportedType = 0x27,
    /// `ManifestResource` table (0x28)
    ManifestResource = 0x28,
    /// `NestedClass` table (0x29)
    NestedClass = 0x29,
    /// `GenericParam` table (0x2A)
    GenericParam = 0x2A,
    /// `MethodSpec` table (0x2B)
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` table (0x2C)
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Look up the table kind for a raw table number
    ///
    /// Returns `None` for numbers outside the catalog (`> 0x2C`).
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TableId> {
        TableId::iter().nth(usize::from(value))
    }

    /// The table's name as it appears in ECMA-335, e.g. `"TypeDef"`
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The table's position in per-table arrays
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for TableId {
    type Error = crate::Error;

    fn try_from(value: u8) -> crate::Result<Self> {
        TableId::from_u8(value).ok_or(crate::Error::UnknownTable(value))
    }
}

/// Number of table kinds in the catalog
#[must_use]
pub const fn table_count() -> usize {
    TableId::COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_numbering() {
        assert_eq!(TableId::COUNT, 45);
        assert_eq!(table_count(), 45);

        for (index, id) in TableId::iter().enumerate() {
            assert_eq!(id as usize, index);
            assert_eq!(TableId::from_u8(index as u8), Some(id));
        }
    }

    #[test]
    fn lookup() {
        assert_eq!(TableId::from_u8(0x02), Some(TableId::TypeDef));
        assert_eq!(TableId::from_u8(0x1D), Some(TableId::FieldRVA));
        assert_eq!(TableId::from_u8(0x2C), Some(TableId::GenericParamConstraint));
        assert_eq!(TableId::from_u8(0x2D), None);
        assert!(matches!(
            TableId::try_from(0x30),
            Err(crate::Error::UnknownTable(0x30))
        ));
    }

    #[test]
    fn names() {
        assert_eq!(TableId::TypeDef.name(), "TypeDef");
        assert_eq!(TableId::AssemblyRefOS.name(), "AssemblyRefOS");
        assert_eq!(TableId::FieldRVA.name(), "FieldRVA");
    }
}
