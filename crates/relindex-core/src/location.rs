//! Locations: token spans inside a resource, owned by an element.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// A token span in the source text of the resource being indexed.
///
/// `element` is the innermost enclosing declaration of the span (or the
/// library element at the top level of a unit). Offsets are byte offsets;
/// the span is the half-open interval `[offset, offset + length)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Element containing the location.
    pub element: Element,
    /// Byte offset of the first byte of the span.
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Create a location.
    pub fn new(element: Element, offset: usize, length: usize) -> Self {
        Location {
            element,
            offset,
            length,
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Check that the span lies within a source text of `source_len` bytes.
    pub fn fits_within(&self, source_len: usize) -> bool {
        self.end() <= source_len
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@[{}, {})", self.element, self.offset, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;

    #[test]
    fn end_is_exclusive() {
        let loc = Location::new(Element::new(Resource::new("a.dart"), "A"), 10, 3);
        assert_eq!(loc.end(), 13);
        assert!(loc.fits_within(13));
        assert!(!loc.fits_within(12));
    }

    #[test]
    fn display_includes_span() {
        let loc = Location::new(Element::new(Resource::new("a.dart"), "A"), 6, 1);
        assert_eq!(loc.to_string(), "a.dart::A@[6, 7)");
    }
}
