//! Write transaction planning
//!
//! The device commits at most one physical page per write transaction, and
//! its internal address pointer wraps around *within the current page* if a
//! transaction carries more data than the page has room for - silently
//! overwriting the start of that page. A logical write therefore has to be
//! split so that no transaction crosses a multiple of the page size.
//!
//! [`WritePlan`] performs that split up front, as a plain iterator of
//! [`Segment`]s, so the boundary arithmetic is testable without a bus.
//! Reads are not planned: the device auto-increments across page boundaries
//! on reads, so any in-range read is a single transaction.

use crate::geometry::Geometry;

/// One page-aligned slice of a logical write
///
/// Invariant: `[offset, offset + len)` never crosses a multiple of the
/// page size it was planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Device offset this segment starts at
    pub offset: u32,
    /// Payload length in bytes (1..=page_size)
    pub len: u32,
}

impl Segment {
    /// First offset past this segment
    pub const fn end(&self) -> u32 {
        self.offset + self.len
    }

    /// Index range of this segment's payload within the caller's buffer,
    /// given the offset the whole request started at
    pub fn payload_range(&self, request_offset: u32) -> core::ops::Range<usize> {
        let start = (self.offset - request_offset) as usize;
        start..start + self.len as usize
    }
}

/// Iterator of page-aligned write segments
///
/// Yields, in device order: a first segment running from the request offset
/// to the next page boundary (or the end of the data, if nearer), then full
/// pages, then the remainder. A zero-length request yields nothing.
///
/// Concatenating the yielded segments reproduces the request exactly: they
/// are contiguous and their lengths sum to the request length.
#[derive(Debug, Clone)]
pub struct WritePlan {
    page_size: u32,
    cursor: u32,
    end: u32,
}

impl WritePlan {
    /// Plan a write of `len` bytes starting at `offset`
    ///
    /// The range must already have been validated against the geometry;
    /// planning itself never touches a bus.
    pub fn new(geometry: &Geometry, offset: u32, len: usize) -> Self {
        Self {
            page_size: geometry.page_size,
            cursor: offset,
            end: offset + len as u32,
        }
    }
}

impl Iterator for WritePlan {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.cursor >= self.end {
            return None;
        }

        // Next multiple of page_size strictly above the cursor
        let page_end = (self.cursor / self.page_size + 1) * self.page_size;
        let segment_end = page_end.min(self.end);

        let segment = Segment {
            offset: self.cursor,
            len: segment_end - self.cursor,
        };
        self.cursor = segment_end;
        Some(segment)
    }
}
