//! Metadata streams: the stream directory entries, the four heaps and the table stream header.
//!
//! - [`StreamHeader`] - one entry of the metadata root's stream directory
//! - [`Strings`] - `#Strings`, NUL-terminated UTF-8 identifiers
//! - [`Blob`] - `#Blob`, length-prefixed binary data (signatures, constant values)
//! - [`Guid`] - `#GUID`, 16-byte identifiers addressed by 1-based index
//! - [`UserStrings`] - `#US`, length-prefixed UTF-16 literals
//! - [`TablesHeader`] - header of the compressed table stream `#~`

mod blob;
mod guid;
mod streamheader;
mod strings;
mod tablesheader;
mod userstrings;

pub use blob::{Blob, BlobIterator};
pub use guid::Guid;
pub use streamheader::StreamHeader;
pub use strings::{Strings, StringsIterator};
pub use tablesheader::TablesHeader;
pub use userstrings::UserStrings;
