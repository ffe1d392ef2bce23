// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'file/physical.rs' uses mmap to map a file into memory
// - 'metadata/streams/userstrings.rs' reinterprets aligned heap bytes as u16 units

//! # metascope
//!
//! A reader for ECMA-335 metadata: the relational tables and heaps that describe the types,
//! methods and fields of a compiled .NET component, read straight from the PE image without
//! loading or executing it.
//!
//! # Architecture
//!
//! Opening an image happens once and in order:
//!
//! 1. [`file::pe::locate`] walks the PE headers and the CLI header to the metadata root
//! 2. [`metadata::root::Streams`] resolves the stream directory into heap and table regions
//! 3. [`metadata::tables::TableLayout`] reads the table stream header and computes every
//!    column width, row size and row offset against the static [`metadata::tables::CATALOG`]
//!
//! The resulting [`MetadataImage`] is immutable. Row, column and heap reads are bounds-checked
//! lookups over the borrowed bytes, and the object browsing queries
//! ([`MetadataImage::enum_type_definitions`], [`MetadataImage::enum_methods_of`],
//! [`MetadataImage::type_def_props`], ...) are built on top of them.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use metascope::prelude::*;
//!
//! let data = std::fs::read("tests/samples/WindowsBase.dll")?;
//! let image = MetadataImage::open(&data)?;
//!
//! let info = image.table_info(TableId::MethodDef);
//! println!("{} methods, {} bytes each", info.row_count, info.row_size);
//!
//! if let Some(object) = image.find_type_by_name("System", "Object")? {
//!     for method in image.enum_methods_of(object)? {
//!         let props = image.method_def_props(method)?;
//!         println!("{} at rva 0x{:x}", props.name, props.rva);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Owning the bytes instead of borrowing them:
//!
//! ```rust,no_run
//! use metascope::MetadataFile;
//! use std::path::Path;
//!
//! let file = MetadataFile::from_file(Path::new("tests/samples/WindowsBase.dll"))?;
//! println!("{}", file.image().version());
//! # Ok::<(), metascope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Every operation returns [`Result`]. Structural problems of the image surface as
//! [`Error::Malformed`] or [`Error::OutOfBounds`]; [`Error::NotFound`] marks a lookup that is
//! valid but has no answer, such as reading from a heap the image does not carry.
//!
//! # Logging
//!
//! Open-time milestones are emitted through [`tracing`] at `debug` level and per-table and
//! per-stream details at `trace`. The library never installs a subscriber.

#[macro_use]
pub(crate) mod error;

/// Byte sources, bounds-checked readers and the PE walk
pub mod file;

/// The metadata root, streams, tables and the object browser
pub mod metadata;

/// Convenient re-exports of the most commonly used types
///
/// ```rust
/// use metascope::prelude::*;
///
/// let token = Token::from_parts(TableId::TypeDef, 2);
/// assert_eq!(token.value(), 0x0200_0002);
/// ```
pub mod prelude;

pub use error::Error;

/// The result type used throughout metascope
pub type Result<T> = std::result::Result<T, Error>;

pub use file::{parser::Parser, MetadataFile};
pub use metadata::{
    config::LoaderConfig,
    image::{ColumnProps, MetadataImage, TableProps},
    tables::TableId,
    token::Token,
};
