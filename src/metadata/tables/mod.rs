//! Table catalog, per-image table layout and row access.
//!
//! - [`TableId`] enumerates the 45 table kinds of the compressed table stream
//! - [`CATALOG`] / [`TableSchema`] describe every kind's columns
//! - [`CodedIndexType`] lists the candidate tables of each coded index kind
//! - [`TableLayout`] computes column widths and row offsets for one image and reads rows
//!   and columns out of it

mod codedindex;
mod layout;
mod row;
mod schema;
mod tableid;

pub(crate) use schema::columns;

pub use codedindex::{coded_token_info, CodedIndexType};
pub use layout::{TableInstance, TableLayout};
pub use schema::{
    ColumnCategory, ColumnSchema, HeapKind, TableSchema, CATALOG, MAX_COLUMNS,
};
pub use tableid::{table_count, TableId};
