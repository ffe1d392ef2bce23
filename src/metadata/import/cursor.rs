use std::ops::RangeInclusive;

use crate::metadata::{tables::TableId, token::Token};

/// A bounded walk over a contiguous range of row ids in one table
///
/// Cursors are returned by the enumeration queries of [`crate::MetadataImage`]. They hold no
/// reference to the image, only the table kind, the inclusive row range and a position, so any
/// number of them can be used independently.
///
/// # Examples
///
/// ```rust,no_run
/// use metascope::MetadataImage;
///
/// # fn example(image: &MetadataImage) -> metascope::Result<()> {
/// let mut types = image.enum_type_definitions();
/// println!("{} types", types.total_count());
/// while let Some(token) = types.next_token() {
///     println!("{token}: {}", image.type_name(token)?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumerationCursor {
    table: TableId,
    start: u32,
    end: u32,
    position: u64,
}

impl EnumerationCursor {
    /// A cursor over `start..=end`; empty if `end < start` or `start` is 0
    #[must_use]
    pub fn new(table: TableId, start: u32, end: u32) -> Self {
        if start == 0 || end < start {
            return Self::empty(table);
        }

        EnumerationCursor {
            table,
            start,
            end,
            position: u64::from(start),
        }
    }

    /// A cursor that yields nothing
    #[must_use]
    pub fn empty(table: TableId) -> Self {
        EnumerationCursor {
            table,
            start: 1,
            end: 0,
            position: 1,
        }
    }

    /// The table the cursor walks
    #[must_use]
    pub fn table(&self) -> TableId {
        self.table
    }

    /// The full row id range, independent of the current position
    #[must_use]
    pub fn rows(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// True if `rid` is within the cursor's range
    #[must_use]
    pub fn contains(&self, rid: u32) -> bool {
        self.rows().contains(&rid)
    }

    /// Number of rows in the range
    #[must_use]
    pub fn total_count(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Number of rows not yet returned
    #[must_use]
    pub fn remaining(&self) -> u32 {
        let end = u64::from(self.end);
        if self.position > end {
            0
        } else {
            // at most end - start + 1
            (end - self.position + 1) as u32
        }
    }

    /// True once every row has been returned
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Return the token at the current position and advance, `None` once exhausted
    pub fn next_token(&mut self) -> Option<Token> {
        if self.is_exhausted() {
            return None;
        }

        let token = Token::from_parts(self.table, self.position as u32);
        self.position += 1;
        Some(token)
    }

    /// Rewind to the first row
    pub fn reset(&mut self) {
        self.position = u64::from(self.start);
    }

    /// Release the cursor
    pub fn close(self) {}
}

impl Iterator for EnumerationCursor {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EnumerationCursor {}
