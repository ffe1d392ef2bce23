use crate::{
    metadata::{
        flags::ParamAttributes,
        image::MetadataImage,
        import::{ConstantValue, EnumerationCursor},
        tables::{columns, TableId},
        token::Token,
    },
    Result,
};

/// Properties of one `Param` row
#[derive(Clone, Debug, PartialEq)]
pub struct ParamDefProps<'a> {
    /// Parameter name, empty if unnamed
    pub name: &'a str,
    /// The owning method definition, [`Token::NULL`] if no method's param run contains it
    pub owning_method: Token,
    /// Position in the signature; 0 is the return value
    pub sequence: u16,
    /// Raw `ParamAttributes`
    pub flags: u16,
    /// The default value from the `Constant` table
    pub constant: ConstantValue,
}

impl ParamDefProps<'_> {
    /// The flags as [`ParamAttributes`]
    #[must_use]
    pub fn attributes(&self) -> ParamAttributes {
        ParamAttributes::from_bits_retain(self.flags)
    }
}

impl<'a> MetadataImage<'a> {
    /// Enumerate the parameters owned by a method definition
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `MethodDef`
    /// token, and [`crate::Error::OutOfBounds`] for a row past the table
    pub fn enum_params_of(&self, method: Token) -> Result<EnumerationCursor> {
        let rid = Self::expect_row(method, TableId::MethodDef)?;
        self.child_run(
            TableId::MethodDef,
            columns::METHOD_PARAM_LIST,
            TableId::Param,
            rid,
        )
    }

    /// The method definition whose param run contains `param`, first match in row order
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `Param` token
    pub fn owning_method_of_param(&self, param: Token) -> Result<Option<Token>> {
        let rid = Self::expect_row(param, TableId::Param)?;
        let owner = self.owner_of(
            TableId::MethodDef,
            columns::METHOD_PARAM_LIST,
            TableId::Param,
            rid,
        )?;

        Ok(owner.map(|owner| Token::from_parts(TableId::MethodDef, owner)))
    }

    /// Properties of a parameter
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `Param` token,
    /// [`crate::Error::OutOfBounds`] for a row past the table, and heap errors for its name or
    /// constant
    pub fn param_def_props(&self, token: Token) -> Result<ParamDefProps<'a>> {
        let rid = Self::expect_row(token, TableId::Param)?;

        let flags = self.read_column(TableId::Param, columns::PARAM_FLAGS, rid)?;
        let sequence = self.read_column(TableId::Param, columns::PARAM_SEQUENCE, rid)?;
        let name = self.read_column(TableId::Param, columns::PARAM_NAME, rid)?;

        Ok(ParamDefProps {
            name: self.string_at(name)?,
            owning_method: self.owning_method_of_param(token)?.unwrap_or(Token::NULL),
            sequence: sequence as u16,
            flags: flags as u16,
            constant: self.constant_of(token)?,
        })
    }
}
