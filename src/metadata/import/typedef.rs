use tracing::trace;

use crate::{
    metadata::{
        flags::TypeAttributes,
        image::MetadataImage,
        import::EnumerationCursor,
        tables::{columns, TableId},
        token::Token,
    },
    Result,
};

/// Properties of one `TypeDef` row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDefProps<'a> {
    /// Simple name
    pub name: &'a str,
    /// Namespace, empty for the global namespace and for nested types
    pub namespace: &'a str,
    /// Raw `TypeAttributes`
    pub flags: u32,
    /// `TypeDef`, `TypeRef` or `TypeSpec` token of the base type, [`Token::NULL`] if none
    pub base_type: Token,
}

impl TypeDefProps<'_> {
    /// The flags as [`TypeAttributes`]
    #[must_use]
    pub fn attributes(&self) -> TypeAttributes {
        TypeAttributes::from_bits_retain(self.flags)
    }

    /// `namespace.name`, or whichever part is non-empty
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(self.namespace, self.name)
    }
}

/// Properties of one `TypeRef` row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRefProps<'a> {
    /// Simple name
    pub name: &'a str,
    /// Namespace
    pub namespace: &'a str,
    /// `Module`, `ModuleRef`, `AssemblyRef` or `TypeRef` token, [`Token::NULL`] if none
    pub resolution_scope: Token,
}

impl TypeRefProps<'_> {
    /// `namespace.name`, or whichever part is non-empty
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(self.namespace, self.name)
    }
}

fn join_name(namespace: &str, name: &str) -> String {
    match (namespace.is_empty(), name.is_empty()) {
        (false, false) => format!("{namespace}.{name}"),
        (false, true) => namespace.to_string(),
        _ => name.to_string(),
    }
}

/// A coded index read back as a token; a nil row becomes [`Token::NULL`]
fn non_nil(value: u32) -> Token {
    let token = Token::new(value);
    if token.is_null() {
        Token::NULL
    } else {
        token
    }
}

impl<'a> MetadataImage<'a> {
    /// Enumerate the type definitions, skipping the `<Module>` pseudo type in row 1
    #[must_use]
    pub fn enum_type_definitions(&self) -> EnumerationCursor {
        let rows = self.row_count(TableId::TypeDef);
        if rows < 2 {
            return EnumerationCursor::empty(TableId::TypeDef);
        }

        EnumerationCursor::new(TableId::TypeDef, 2, rows)
    }

    /// Find the first type definition, in row order, with the given namespace and name
    ///
    /// Every row is compared, including row 1, and nested types match on their empty
    /// namespace. Rows whose names cannot be decoded never match and are skipped.
    ///
    /// # Errors
    /// Returns an error if a row cannot be read; a miss is `Ok(None)`
    pub fn find_type_by_name(&self, namespace: &str, name: &str) -> Result<Option<Token>> {
        for rid in 1..=self.row_count(TableId::TypeDef) {
            let row_name = self.read_column(TableId::TypeDef, columns::TYPEDEF_NAME, rid)?;
            let Ok(row_name) = self.string_at(row_name) else {
                trace!(rid, "skipping TypeDef with an unreadable name");
                continue;
            };
            if row_name != name {
                continue;
            }

            let row_namespace =
                self.read_column(TableId::TypeDef, columns::TYPEDEF_NAMESPACE, rid)?;
            if self
                .string_at(row_namespace)
                .is_ok_and(|row_namespace| row_namespace == namespace)
            {
                return Ok(Some(Token::from_parts(TableId::TypeDef, rid)));
            }
        }

        Ok(None)
    }

    /// Find a type definition by its dotted full name, split at the last `.`
    ///
    /// # Errors
    /// See [`MetadataImage::find_type_by_name`]
    pub fn find_type_by_full_name(&self, full_name: &str) -> Result<Option<Token>> {
        match full_name.rsplit_once('.') {
            Some((namespace, name)) => self.find_type_by_name(namespace, name),
            None => self.find_type_by_name("", full_name),
        }
    }

    /// Properties of a type definition
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `TypeDef` token,
    /// and [`crate::Error::OutOfBounds`] for a row past the table
    pub fn type_def_props(&self, token: Token) -> Result<TypeDefProps<'a>> {
        let rid = Self::expect_row(token, TableId::TypeDef)?;

        let flags = self.read_column(TableId::TypeDef, columns::TYPEDEF_FLAGS, rid)?;
        let name = self.read_column(TableId::TypeDef, columns::TYPEDEF_NAME, rid)?;
        let namespace = self.read_column(TableId::TypeDef, columns::TYPEDEF_NAMESPACE, rid)?;
        let extends = self.read_column(TableId::TypeDef, columns::TYPEDEF_EXTENDS, rid)?;

        Ok(TypeDefProps {
            name: self.string_at(name)?,
            namespace: self.string_at(namespace)?,
            flags,
            base_type: non_nil(extends),
        })
    }

    /// Full name of a type definition
    ///
    /// # Errors
    /// See [`MetadataImage::type_def_props`]
    pub fn type_name(&self, token: Token) -> Result<String> {
        Ok(self.type_def_props(token)?.full_name())
    }

    /// Properties of a type reference
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a token that is not a non-nil `TypeRef` token,
    /// and [`crate::Error::OutOfBounds`] for a row past the table
    pub fn type_ref_props(&self, token: Token) -> Result<TypeRefProps<'a>> {
        let rid = Self::expect_row(token, TableId::TypeRef)?;

        let scope = self.read_column(TableId::TypeRef, columns::TYPEREF_SCOPE, rid)?;
        let name = self.read_column(TableId::TypeRef, columns::TYPEREF_NAME, rid)?;
        let namespace = self.read_column(TableId::TypeRef, columns::TYPEREF_NAMESPACE, rid)?;

        Ok(TypeRefProps {
            name: self.string_at(name)?,
            namespace: self.string_at(namespace)?,
            resolution_scope: non_nil(scope),
        })
    }
}
