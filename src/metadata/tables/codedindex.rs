//! Coded index kinds (ECMA-335 II.24.2.6).
//!
//! A coded index packs a tag selecting one of several tables into its low bits and the row id
//! into the remaining bits. Each [`CodedIndexType`] lists its candidate tables in tag order;
//! tag values that the format reserves without assigning a table are `None`.

use strum::{EnumCount, EnumIter, IntoStaticStr};

use crate::{metadata::tables::TableId, metadata::token::Token, Result};

/// The coded index kinds of the table catalog, in their conventional numbering.
///
/// The discriminant is the kind's index; the column type code of a coded column is
/// `64 + index`.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount, IntoStaticStr)]
#[repr(u8)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef` or `TypeSpec`
    TypeDefOrRef,
    /// `Field`, `Param` or `Property`
    HasConstant,
    /// Any table that can carry a custom attribute
    HasCustomAttribute,
    /// `Field` or `Param`
    HasFieldMarshal,
    /// `TypeDef`, `MethodDef` or `Assembly`
    HasDeclSecurity,
    /// `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef` or `TypeSpec`
    MemberRefParent,
    /// `Event` or `Property`
    HasSemantics,
    /// `MethodDef` or `MemberRef`
    MethodDefOrRef,
    /// `Field` or `MethodDef`
    MemberForwarded,
    /// `File`, `AssemblyRef` or `ExportedType`
    Implementation,
    /// `MethodDef` or `MemberRef`, at tags 2 and 3
    CustomAttributeType,
    /// `Module`, `ModuleRef`, `AssemblyRef` or `TypeRef`
    ResolutionScope,
    /// `TypeDef` or `MethodDef`
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// The candidate tables in tag order; reserved tags are `None`
    #[must_use]
    pub fn tables(&self) -> &'static [Option<TableId>] {
        match self {
            CodedIndexType::TypeDefOrRef => &[
                Some(TableId::TypeDef),
                Some(TableId::TypeRef),
                Some(TableId::TypeSpec),
            ],
            CodedIndexType::HasConstant => &[
                Some(TableId::Field),
                Some(TableId::Param),
                Some(TableId::Property),
            ],
            CodedIndexType::HasCustomAttribute => &[
                Some(TableId::MethodDef),
                Some(TableId::Field),
                Some(TableId::TypeRef),
                Some(TableId::TypeDef),
                Some(TableId::Param),
                Some(TableId::InterfaceImpl),
                Some(TableId::MemberRef),
                Some(TableId::Module),
                Some(TableId::DeclSecurity),
                Some(TableId::Property),
                Some(TableId::Event),
                Some(TableId::StandAloneSig),
                Some(TableId::ModuleRef),
                Some(TableId::TypeSpec),
                Some(TableId::Assembly),
                Some(TableId::AssemblyRef),
                Some(TableId::File),
                Some(TableId::ExportedType),
                Some(TableId::ManifestResource),
                Some(TableId::GenericParam),
                Some(TableId::GenericParamConstraint),
                Some(TableId::MethodSpec),
            ],
            CodedIndexType::HasFieldMarshal => &[Some(TableId::Field), Some(TableId::Param)],
            CodedIndexType::HasDeclSecurity => &[
                Some(TableId::TypeDef),
                Some(TableId::MethodDef),
                Some(TableId::Assembly),
            ],
            CodedIndexType::MemberRefParent => &[
                Some(TableId::TypeDef),
                Some(TableId::TypeRef),
                Some(TableId::ModuleRef),
                Some(TableId::MethodDef),
                Some(TableId::TypeSpec),
            ],
            CodedIndexType::HasSemantics => &[Some(TableId::Event), Some(TableId::Property)],
            CodedIndexType::MethodDefOrRef => &[Some(TableId::MethodDef), Some(TableId::MemberRef)],
            CodedIndexType::MemberForwarded => &[Some(TableId::Field), Some(TableId::MethodDef)],
            CodedIndexType::Implementation => &[
                Some(TableId::File),
                Some(TableId::AssemblyRef),
                Some(TableId::ExportedType),
            ],
            CodedIndexType::CustomAttributeType => &[
                None,
                None,
                Some(TableId::MethodDef),
                Some(TableId::MemberRef),
                None,
            ],
            CodedIndexType::ResolutionScope => &[
                Some(TableId::Module),
                Some(TableId::ModuleRef),
                Some(TableId::AssemblyRef),
                Some(TableId::TypeRef),
            ],
            CodedIndexType::TypeOrMethodDef => &[Some(TableId::TypeDef), Some(TableId::MethodDef)],
        }
    }

    /// Name of the coded index kind, e.g. `"HasConstant"`
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Number of low bits holding the tag: `ceil(log2(number of tags))`
    #[must_use]
    pub fn tag_bits(&self) -> u32 {
        let tags = self.tables().len();
        if tags <= 1 {
            0
        } else {
            usize::BITS - (tags - 1).leading_zeros()
        }
    }

    /// Split a raw coded value into its target table and row id
    ///
    /// ## Arguments
    /// * 'value' - The raw column value
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag is outside the kind's tag list or names a
    /// reserved tag value
    pub fn decode(&self, value: u32) -> Result<(TableId, u32)> {
        let bits = self.tag_bits();
        let tag = value & ((1_u32 << bits) - 1);
        let row = value >> bits;

        match self.tables().get(tag as usize) {
            Some(Some(table)) => Ok((*table, row)),
            _ => Err(malformed_error!(
                "Invalid tag {} for coded index {}",
                tag,
                self.name()
            )),
        }
    }

    /// Decode a raw coded value straight into a token
    ///
    /// A nil row keeps the table prefix, so `Token::row` is `0` but `Token::table_id` still
    /// names the selected table.
    ///
    /// # Errors
    /// See [`CodedIndexType::decode`]
    pub fn decode_token(&self, value: u32) -> Result<Token> {
        let (table, row) = self.decode(value)?;
        Ok(Token::from_parts(table, row))
    }

    /// Encode a token as a raw coded value of this kind
    ///
    /// Returns `None` if the token's table is not one of this kind's candidates.
    #[must_use]
    pub fn encode(&self, token: Token) -> Option<u32> {
        let table = token.table_id()?;
        let tag = self.tables().iter().position(|t| *t == Some(table))?;
        let tag = u32::try_from(tag).ok()?;

        Some((token.row() << self.tag_bits()) | tag)
    }
}

/// The candidate tables and the name of a coded index kind
#[must_use]
pub fn coded_token_info(kind: CodedIndexType) -> (&'static [Option<TableId>], &'static str) {
    (kind.tables(), kind.name())
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn tag_widths() {
        assert_eq!(CodedIndexType::COUNT, 13);
        assert_eq!(CodedIndexType::TypeDefOrRef.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasConstant.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasCustomAttribute.tag_bits(), 5);
        assert_eq!(CodedIndexType::HasFieldMarshal.tag_bits(), 1);
        assert_eq!(CodedIndexType::MemberRefParent.tag_bits(), 3);
        assert_eq!(CodedIndexType::CustomAttributeType.tag_bits(), 3);
        assert_eq!(CodedIndexType::ResolutionScope.tag_bits(), 2);
        assert_eq!(CodedIndexType::TypeOrMethodDef.tag_bits(), 1);
    }

    #[test]
    fn declsecurity_tag() {
        let tables = CodedIndexType::HasCustomAttribute.tables();
        assert_eq!(tables.len(), 22);
        assert_eq!(tables[8], Some(TableId::DeclSecurity));
    }

    #[test]
    fn decode() {
        // HasConstant: Param (tag 1), row 5
        let (table, row) = CodedIndexType::HasConstant.decode((5 << 2) | 1).unwrap();
        assert_eq!(table, TableId::Param);
        assert_eq!(row, 5);

        // HasConstant has no tag 3
        assert!(CodedIndexType::HasConstant.decode((5 << 2) | 3).is_err());

        // CustomAttributeType: tag 0 is reserved, tag 3 is MemberRef
        assert!(CodedIndexType::CustomAttributeType.decode(8).is_err());
        let token = CodedIndexType::CustomAttributeType
            .decode_token((7 << 3) | 3)
            .unwrap();
        assert_eq!(token, Token::new(0x0A00_0007));
    }

    #[test]
    fn nil_keeps_prefix() {
        // TypeDefOrRef with tag TypeRef and row 0
        let token = CodedIndexType::TypeDefOrRef.decode_token(1).unwrap();
        assert_eq!(token.row(), 0);
        assert_eq!(token.table_id(), Some(TableId::TypeRef));
        assert!(token.is_null());
    }

    #[test]
    fn encode_decode() {
        for kind in CodedIndexType::iter() {
            for table in kind.tables().iter().flatten() {
                let token = Token::from_parts(*table, 0x1234);
                let raw = kind.encode(token).unwrap();
                assert_eq!(kind.decode_token(raw).unwrap(), token);
            }
        }

        assert!(CodedIndexType::HasConstant
            .encode(Token::from_parts(TableId::MethodDef, 1))
            .is_none());
    }

    #[test]
    fn info() {
        let (tables, name) = coded_token_info(CodedIndexType::ResolutionScope);
        assert_eq!(name, "ResolutionScope");
        assert_eq!(tables.len(), 4);
    }
}
