//! ECMA-335 metadata: the root, its streams, the tables and the object browser.
//!
//! # Key Components
//!
//! - [`cor20header`] - the CLI header that points at the metadata
//! - [`root`] - the metadata root and its stream directory
//! - [`streams`] - the `#Strings`, `#Blob`, `#GUID` and `#US` heaps and the table stream header
//! - [`tables`] - the static table catalog, the per-image layout and row/column access
//! - [`image`] - [`image::MetadataImage`], the opened and validated metadata
//! - [`import`] - enumeration and property queries over types, methods, fields and params
//! - [`token`] - metadata tokens
//! - [`flags`] - attribute flags of the browsed tables
//! - [`config`] - loader configuration

/// Loader configuration
pub mod config;
/// The CLI header
pub mod cor20header;
/// Attribute flag sets
pub mod flags;
/// The opened metadata image
pub mod image;
/// Object browsing over an opened image
pub mod import;
/// The metadata root and stream directory
pub mod root;
/// Heaps and the table stream header
pub mod streams;
/// Table catalog, layout and row access
pub mod tables;
/// Metadata tokens
pub mod token;
