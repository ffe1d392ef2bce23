use crate::{
    metadata::{
        flags::{MethodAttributes, MethodImplAttributes},
        image::MetadataImage,
        import::EnumerationCursor,
        tables::{columns, TableId},
        token::Token,
    },
    Result,
};

/// Properties of one `MethodDef` row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDefProps<'a> {
    /// Method name
    pub name: &'a str,
    /// The owning type definition, [`Token::NULL`] if no type's method run contains the method
    pub owning_type: Token,
    /// Raw `MethodAttributes`
    pub flags: u16,
    /// Raw `MethodImplAttributes`
    pub impl_flags: u16,
    /// The method signature blob
    pub signature: &'a [u8],
    /// RVA of the method body, 0 for abstract, runtime and PInvoke methods
    pub rva: u32,
}

impl MethodDefProps<'_> {
    /// The flags as [`MethodAttributes`]
    #[must_use]
    pub fn attributes(&self) -> MethodAttributes {
        MethodAttributes::from_bits_retain(self.flags)
    }

    /// The implementation flags as [`MethodImplAttributes`]
    #[must_use]
    pub fn impl_attributes(&self) -> MethodImplAttributes {
        MethodImplAttributes::from_bits_retain(self.impl_flags)
    }
}

impl<'a> MetadataImage<'a> {
    /// Enumerate the methods owned by a type definition
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `TypeDef` token,
    /// and [`crate::Error::OutOfBounds`] for a row past the table
    pub fn enum_methods_of(&self, type_token: Token) -> Result<EnumerationCursor> {
        let rid = Self::expect_row(type_token, TableId::TypeDef)?;
        self.child_run(
            TableId::TypeDef,
            columns::TYPEDEF_METHOD_LIST,
            TableId::MethodDef,
            rid,
        )
    }

    /// The type definition whose method run contains `method`
    ///
    /// Scans every type definition in row order and returns the first match.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `MethodDef` token
    pub fn owning_type_of_method(&self, method: Token) -> Result<Option<Token>> {
        let rid = Self::expect_row(method, TableId::MethodDef)?;
        let owner = self.owner_of(
            TableId::TypeDef,
            columns::TYPEDEF_METHOD_LIST,
            TableId::MethodDef,
            rid,
        )?;

        Ok(owner.map(|owner| Token::from_parts(TableId::TypeDef, owner)))
    }

    /// Properties of a method definition
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `MethodDef` token,
    /// [`crate::Error::OutOfBounds`] for a row past the table, and heap errors for its name or
    /// signature
    pub fn method_def_props(&self, token: Token) -> Result<MethodDefProps<'a>> {
        let rid = Self::expect_row(token, TableId::MethodDef)?;

        let rva = self.read_column(TableId::MethodDef, columns::METHOD_RVA, rid)?;
        let impl_flags = self.read_column(TableId::MethodDef, columns::METHOD_IMPL_FLAGS, rid)?;
        let flags = self.read_column(TableId::MethodDef, columns::METHOD_FLAGS, rid)?;
        let name = self.read_column(TableId::MethodDef, columns::METHOD_NAME, rid)?;
        let signature = self.read_column(TableId::MethodDef, columns::METHOD_SIGNATURE, rid)?;

        Ok(MethodDefProps {
            name: self.string_at(name)?,
            owning_type: self.owning_type_of_method(token)?.unwrap_or(Token::NULL),
            flags: flags as u16,
            impl_flags: impl_flags as u16,
            signature: self.blob_at(signature)?,
            rva,
        })
    }
}
