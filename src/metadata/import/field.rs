use crate::{
    metadata::{
        flags::FieldAttributes,
        image::MetadataImage,
        import::{ConstantValue, EnumerationCursor},
        tables::{columns, TableId},
        token::Token,
    },
    Result,
};

/// Properties of one `Field` row
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefProps<'a> {
    /// Field name
    pub name: &'a str,
    /// The owning type definition, [`Token::NULL`] if no type's field run contains the field
    pub owning_type: Token,
    /// Raw `FieldAttributes`
    pub flags: u16,
    /// The field signature blob
    pub signature: &'a [u8],
    /// The default value from the `Constant` table
    pub constant: ConstantValue,
}

impl FieldDefProps<'_> {
    /// The flags as [`FieldAttributes`]
    #[must_use]
    pub fn attributes(&self) -> FieldAttributes {
        FieldAttributes::from_bits_retain(self.flags)
    }
}

impl<'a> MetadataImage<'a> {
    /// Enumerate the fields owned by a type definition
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `TypeDef` token,
    /// and [`crate::Error::OutOfBounds`] for a row past the table
    pub fn enum_fields_of(&self, type_token: Token) -> Result<EnumerationCursor> {
        let rid = Self::expect_row(type_token, TableId::TypeDef)?;
        self.child_run(
            TableId::TypeDef,
            columns::TYPEDEF_FIELD_LIST,
            TableId::Field,
            rid,
        )
    }

    /// The type definition whose field run contains `field`, first match in row order
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `Field` token
    pub fn owning_type_of_field(&self, field: Token) -> Result<Option<Token>> {
        let rid = Self::expect_row(field, TableId::Field)?;
        let owner = self.owner_of(
            TableId::TypeDef,
            columns::TYPEDEF_FIELD_LIST,
            TableId::Field,
            rid,
        )?;

        Ok(owner.map(|owner| Token::from_parts(TableId::TypeDef, owner)))
    }

    /// Properties of a field definition
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `Field` token,
    /// [`crate::Error::OutOfBounds`] for a row past the table, and heap errors for its name,
    /// signature or constant
    pub fn field_def_props(&self, token: Token) -> Result<FieldDefProps<'a>> {
        let rid = Self::expect_row(token, TableId::Field)?;

        let flags = self.read_column(TableId::Field, columns::FIELD_FLAGS, rid)?;
        let name = self.read_column(TableId::Field, columns::FIELD_NAME, rid)?;
        let signature = self.read_column(TableId::Field, columns::FIELD_SIGNATURE, rid)?;

        Ok(FieldDefProps {
            name: self.string_at(name)?,
            owning_type: self.owning_type_of_field(token)?.unwrap_or(Token::NULL),
            flags: flags as u16,
            signature: self.blob_at(signature)?,
            constant: self.constant_of(token)?,
        })
    }
}
