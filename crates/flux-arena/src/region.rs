//! Write regions handed out by [`GrowableArena::reserve`](crate::GrowableArena::reserve).
//!
//! A [`WriteRegion`] names a writable span of the arena by offset rather
//! than by address, and carries the generation it was issued in so that
//! stale regions can be detected in O(1).

use std::fmt;

/// Writable span of an arena, valid until the next `reserve` or resize.
///
/// Regions never hold a borrow of the arena. They are plain values and
/// are resolved against the arena on every use, which is where the
/// generation check happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct WriteRegion {
    pub(crate) generation: u32,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl WriteRegion {
    pub(crate) fn new(generation: u32, offset: usize, len: usize) -> Self {
        Self {
            generation,
            offset,
            len,
        }
    }

    /// Arena generation this region was issued in.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Byte offset of the first writable byte (the committed count at
    /// the time of the reserve).
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of writable bytes in the region.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the region has no writable bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last writable byte.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl fmt::Display for WriteRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WriteRegion(gen={}, off={}, len={})",
            self.generation, self.offset, self.len
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_accessors() {
        let r = WriteRegion::new(3, 100, 28);
        assert_eq!(r.generation(), 3);
        assert_eq!(r.offset(), 100);
        assert_eq!(r.len(), 28);
        assert_eq!(r.end(), 128);
        assert!(!r.is_empty());
    }

    #[test]
    fn display_names_all_parts() {
        let r = WriteRegion::new(1, 2, 3);
        assert_eq!(r.to_string(), "WriteRegion(gen=1, off=2, len=3)");
    }
}
