//! Object browsing over an opened [`MetadataImage`].
//!
//! Type definitions own their methods and fields as contiguous runs: `TypeDef.MethodList` of row
//! `R` names the first method of `R`, and the run ends just before the first method of row
//! `R + 1`, or at the end of the method table for the last type. Methods own parameters the same
//! way through `MethodDef.ParamList`. Every enumeration here is that one rule applied to a
//! different parent/child pair, and every reverse lookup scans the parents in ascending order
//! and reports the first run that contains the child.
//!
//! Nothing is cached; each query reads the rows it needs.
//!
//! # Example
//!
//! ```rust,no_run
//! use metascope::MetadataImage;
//!
//! let data = std::fs::read("tests/samples/WindowsBase.dll")?;
//! let image = MetadataImage::open(&data)?;
//!
//! for type_token in image.enum_type_definitions() {
//!     println!("{}", image.type_name(type_token)?);
//!     for method in image.enum_methods_of(type_token)? {
//!         println!("  {}", image.method_def_props(method)?.name);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod constant;
mod cursor;
mod field;
mod method;
mod param;
mod typedef;

pub use constant::ConstantValue;
pub use cursor::EnumerationCursor;
pub use field::FieldDefProps;
pub use method::MethodDefProps;
pub use param::ParamDefProps;
pub use typedef::{TypeDefProps, TypeRefProps};

use crate::{
    metadata::{image::MetadataImage, tables::TableId, token::Token},
    Error, Result,
};

impl MetadataImage<'_> {
    /// Row id of `token`, which must be a non-nil token of `table`
    pub(crate) fn expect_row(token: Token, table: TableId) -> Result<u32> {
        if !token.is_table(table) || token.is_null() {
            return Err(Error::InvalidToken(token));
        }

        Ok(token.row())
    }

    /// The run of `child` rows owned by `parent` row `rid` through its `list_column`
    ///
    /// The run starts at the list value of `rid` and ends one before the list value of `rid + 1`,
    /// or at the last child row if `rid` is the last parent. The end is clamped to the child
    /// table, and a run whose end precedes its start is empty.
    pub(crate) fn child_run(
        &self,
        parent: TableId,
        list_column: usize,
        child: TableId,
        rid: u32,
    ) -> Result<EnumerationCursor> {
        let child_rows = self.row_count(child);
        let start = self.read_column(parent, list_column, rid)?;

        let end = if rid < self.row_count(parent) {
            self.read_column(parent, list_column, rid + 1)?
                .saturating_sub(1)
        } else {
            child_rows
        };

        Ok(EnumerationCursor::new(child, start, end.min(child_rows)))
    }

    /// First parent row, in ascending order, whose run contains child row `child_rid`
    pub(crate) fn owner_of(
        &self,
        parent: TableId,
        list_column: usize,
        child: TableId,
        child_rid: u32,
    ) -> Result<Option<u32>> {
        for rid in 1..=self.row_count(parent) {
            if self.child_run(parent, list_column, child, rid)?.contains(child_rid) {
                return Ok(Some(rid));
            }
        }

        Ok(None)
    }
}
