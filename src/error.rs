use thiserror::Error;

use crate::metadata::{tables::TableId, token::Token};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Structural errors
/// - [`Error::Malformed`] - the container, metadata root, stream directory or table stream
///   violates the format (bad signature, truncated header, table rows past the image end)
/// - [`Error::OutOfBounds`] - a computed offset, row id or heap index would read past the
///   buffer or past a table's declared extent
///
/// ## Lookup errors
/// - [`Error::UnknownTable`] / [`Error::UnknownColumn`] - schema lookup for a caller-supplied
///   table kind or column index failed
/// - [`Error::InvalidToken`] - a token of the wrong table kind was passed to a query
/// - [`Error::NotFound`] - a valid lookup that legitimately has no result, e.g. reading from
///   an optional heap that the image does not carry. This is not a failure of the image.
///
/// ## Input errors
/// - [`Error::FileError`] / [`Error::Empty`] - acquiring bytes for an owned [`crate::MetadataFile`]
///
/// # Examples
///
/// ```rust
/// use metascope::{Error, MetadataImage};
///
/// match MetadataImage::open(&[0u8; 16]) {
///     Ok(_) => unreachable!(),
///     Err(Error::Malformed { message, .. }) => eprintln!("not a managed image: {message}"),
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The image is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted.
    #[error("Out of bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The requested table kind does not exist in the table catalog.
    #[error("Unknown table - 0x{0:02x}")]
    UnknownTable(u8),

    /// The requested column index does not exist in the table's schema.
    #[error("Unknown column {column} in table {table:?}")]
    UnknownColumn {
        /// The table which was queried
        table: TableId,
        /// The column index which was requested
        column: usize,
    },

    /// A token did not reference the table kind the operation requires.
    #[error("Token does not reference the expected table - {0}")]
    InvalidToken(Token),

    /// The lookup was valid but there is nothing to return.
    #[error("The requested item does not exist")]
    NotFound,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error denotes legitimate absence rather than a broken image
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    /// Returns true if this error was caused by structurally invalid input data
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. } | Error::OutOfBounds { .. })
    }
}
