//! Source locations.
//!
//! A [`Span`] is a byte range inside one file; a [`Location`] pairs it with
//! the interned file path so declarations from different compilation units
//! stay distinguishable.

use std::fmt;

use crate::Name;

/// Source location span.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from file start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for generated declarations.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create a point span (zero-length).
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if another span is fully contained within this span.
    #[inline]
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A span inside a specific file.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Location {
    /// Interned file path, relative to the project root.
    pub file: Name,
    pub span: Span,
}

impl Location {
    pub const fn new(file: Name, span: Span) -> Self {
        Location { file, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basic() {
        let span = Span::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(span.contains_span(Span::new(12, 18)));
        assert!(!span.contains_span(Span::new(12, 21)));
    }

    #[test]
    fn test_point_span() {
        let span = Span::point(7);
        assert!(span.is_empty());
        assert_eq!(format!("{span}"), "7..7");
    }

    #[test]
    fn test_location_ordering_is_file_first() {
        let a = Location::new(Name::new(0, 1), Span::new(50, 60));
        let b = Location::new(Name::new(0, 2), Span::new(0, 10));
        assert!(a < b);
    }
}
