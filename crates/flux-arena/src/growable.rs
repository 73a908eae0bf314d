//! The growable byte arena backing an in-progress asset load.
//!
//! [`GrowableArena`] is a bump-style buffer over a single `Vec<u8>`.
//! Bytes are written into space handed out by [`reserve`](GrowableArena::reserve)
//! and become part of the asset once [`commit`](GrowableArena::commit)ted.
//! The committed prefix never shrinks and never moves relative to the
//! start of the buffer, but the buffer itself may be reallocated by any
//! `reserve` or [`resize_exact`](GrowableArena::resize_exact).

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::region::WriteRegion;

/// Single contiguous growable buffer with a monotonic commit cursor.
///
/// Invariant: `extent() >= committed()` at all times.
pub struct GrowableArena {
    /// Writable extent. Everything past `committed` is zero-filled
    /// scratch space waiting for the next write.
    data: Vec<u8>,
    /// Bytes confirmed written. Never decreases.
    committed: usize,
    /// Bumped on every reserve, commit and resize.
    generation: u32,
    /// Number of times the backing storage moved while holding data.
    relocations: u32,
    config: ArenaConfig,
}

impl GrowableArena {
    /// Create an empty arena. Nothing is allocated until the first `reserve`.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            data: Vec::new(),
            committed: 0,
            generation: 0,
            relocations: 0,
            config,
        })
    }

    /// Ensure at least `additional` writable bytes exist past the commit cursor.
    ///
    /// Returns a region starting at the current commit cursor and
    /// spanning every writable byte. All previously issued regions are
    /// invalidated, whether or not the buffer actually moved.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidRequest`] if `additional` is zero and nothing
    ///   has been committed yet.
    /// - [`ArenaError::CapacityExceeded`] if the required extent exceeds
    ///   the configured ceiling.
    /// - [`ArenaError::AllocationFailed`] if the allocator refuses the growth.
    pub fn reserve(&mut self, additional: usize) -> Result<WriteRegion, ArenaError> {
        if additional == 0 && self.committed == 0 {
            return Err(ArenaError::InvalidRequest);
        }

        let required = self
            .committed
            .checked_add(additional)
            .ok_or(ArenaError::CapacityExceeded {
                requested: usize::MAX,
                capacity: self.config.max_capacity,
            })?;
        if required > self.config.max_capacity {
            return Err(ArenaError::CapacityExceeded {
                requested: required,
                capacity: self.config.max_capacity,
            });
        }

        if required > self.data.len() {
            let target = if self.data.is_empty() {
                required.max(self.config.initial_capacity)
            } else {
                required
            };
            if target > self.data.capacity() {
                let capacity = target
                    .max(self.data.capacity().saturating_mul(2))
                    .min(self.config.max_capacity);
                let before = self.data.as_ptr();
                self.grow_to(capacity)?;
                self.note_move(before);
            }
            self.data.resize(target, 0);
        }

        self.generation = self.generation.wrapping_add(1);
        Ok(WriteRegion::new(
            self.generation,
            self.committed,
            self.data.len() - self.committed,
        ))
    }

    /// Resolve a region to a mutable slice of the buffer.
    ///
    /// The returned slice borrows the arena, so it cannot outlive the
    /// next `reserve`. The region itself is checked against the current
    /// generation.
    pub fn region_mut(&mut self, region: WriteRegion) -> Result<&mut [u8], ArenaError> {
        self.check_region(region)?;
        Ok(&mut self.data[region.offset..region.end()])
    }

    /// Copy `bytes` to the start of `region`.
    ///
    /// Does not commit; call [`commit`](Self::commit) afterwards.
    pub fn write(&mut self, region: WriteRegion, bytes: &[u8]) -> Result<(), ArenaError> {
        if bytes.len() > region.len {
            return Err(ArenaError::OutOfBounds {
                requested_end: region.offset + bytes.len(),
                extent: region.end(),
            });
        }
        let dst = self.region_mut(region)?;
        dst[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Advance the commit cursor by `amount` bytes.
    ///
    /// The caller vouches that the bytes have been written. Returns the
    /// new committed count. Invalidates outstanding regions, since their
    /// start now lies inside the committed prefix.
    pub fn commit(&mut self, amount: usize) -> Result<usize, ArenaError> {
        let end = self
            .committed
            .checked_add(amount)
            .filter(|&end| end <= self.data.len())
            .ok_or(ArenaError::OutOfBounds {
                requested_end: self.committed.saturating_add(amount),
                extent: self.data.len(),
            })?;
        self.committed = end;
        self.generation = self.generation.wrapping_add(1);
        Ok(end)
    }

    /// Resize the writable extent to exactly `len` bytes and release any
    /// spare capacity. May relocate the buffer.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::OutOfBounds`] if `len` would cut into committed bytes.
    /// - [`ArenaError::CapacityExceeded`] if `len` exceeds the ceiling.
    /// - [`ArenaError::AllocationFailed`] if the allocator refuses the growth.
    pub fn resize_exact(&mut self, len: usize) -> Result<(), ArenaError> {
        if len < self.committed {
            return Err(ArenaError::OutOfBounds {
                requested_end: self.committed,
                extent: len,
            });
        }
        if len > self.config.max_capacity {
            return Err(ArenaError::CapacityExceeded {
                requested: len,
                capacity: self.config.max_capacity,
            });
        }

        let before = self.data.as_ptr();
        if len > self.data.capacity() {
            self.grow_to(len)?;
        }
        self.data.resize(len, 0);
        self.data.shrink_to_fit();
        self.note_move(before);

        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }

    /// The committed prefix followed by the next `amount` written but not
    /// yet committed bytes.
    ///
    /// Lets a caller inspect what a `commit(amount)` would produce before
    /// making it permanent.
    pub fn prefix_with(&self, amount: usize) -> Result<&[u8], ArenaError> {
        let end = self.committed.saturating_add(amount);
        if end > self.data.len() {
            return Err(ArenaError::OutOfBounds {
                requested_end: end,
                extent: self.data.len(),
            });
        }
        Ok(&self.data[..end])
    }

    /// Give up the arena and return exactly the committed bytes.
    pub fn into_committed(mut self) -> Box<[u8]> {
        self.data.truncate(self.committed);
        self.data.into_boxed_slice()
    }

    /// The committed prefix.
    pub fn committed_bytes(&self) -> &[u8] {
        &self.data[..self.committed]
    }

    /// Number of committed bytes.
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Current writable extent in bytes (committed plus reserved).
    pub fn extent(&self) -> usize {
        self.data.len()
    }

    /// Remaining writable bytes past the commit cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.committed
    }

    /// Current generation.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// How many times the buffer has moved while holding committed data.
    pub fn relocations(&self) -> u32 {
        self.relocations
    }

    /// Memory usage of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.capacity()
    }

    /// The configuration this arena was created with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    fn check_region(&self, region: WriteRegion) -> Result<(), ArenaError> {
        if region.generation != self.generation {
            return Err(ArenaError::StaleRegion {
                region_generation: region.generation,
                current: self.generation,
            });
        }
        if region.end() > self.data.len() {
            return Err(ArenaError::OutOfBounds {
                requested_end: region.end(),
                extent: self.data.len(),
            });
        }
        Ok(())
    }

    /// Move the contents into a fresh allocation with room for `capacity`
    /// bytes. The extent is unchanged.
    ///
    /// Written but uncommitted bytes move along. The old buffer stays alive
    /// until the copy is done, so the contents always change address.
    fn grow_to(&mut self, capacity: usize) -> Result<(), ArenaError> {
        let mut grown = Vec::new();
        grown
            .try_reserve_exact(capacity)
            .map_err(|_| ArenaError::AllocationFailed {
                requested: capacity,
            })?;
        grown.extend_from_slice(&self.data);
        self.data = grown;
        Ok(())
    }

    fn note_move(&mut self, before: *const u8) {
        if self.committed > 0 && self.data.as_ptr() != before {
            self.relocations += 1;
            tracing::trace!(
                committed = self.committed,
                extent = self.data.len(),
                relocations = self.relocations,
                "arena relocated"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> GrowableArena {
        GrowableArena::new(ArenaConfig::new(1 << 20).with_initial_capacity(16)).unwrap()
    }

    fn push(arena: &mut GrowableArena, bytes: &[u8]) {
        let region = arena.reserve(bytes.len()).unwrap();
        arena.write(region, bytes).unwrap();
        arena.commit(bytes.len()).unwrap();
    }

    #[test]
    fn reserve_zero_before_any_write_is_invalid() {
        let mut a = arena();
        assert_eq!(a.reserve(0), Err(ArenaError::InvalidRequest));
    }

    #[test]
    fn reserve_zero_after_write_is_allowed() {
        let mut a = arena();
        push(&mut a, b"abc");
        let region = a.reserve(0).unwrap();
        assert_eq!(region.offset(), 3);
    }

    #[test]
    fn first_reserve_uses_initial_capacity() {
        let mut a = arena();
        let region = a.reserve(4).unwrap();
        assert_eq!(region.offset(), 0);
        assert_eq!(region.len(), 16);
        assert_eq!(a.extent(), 16);
    }

    #[test]
    fn commits_accumulate_content() {
        let mut a = arena();
        push(&mut a, b"hello ");
        push(&mut a, b"world");
        assert_eq!(a.committed(), 11);
        assert_eq!(a.committed_bytes(), b"hello world");
    }

    #[test]
    fn every_reserve_invalidates_older_regions() {
        let mut a = arena();
        let first = a.reserve(4).unwrap();
        let second = a.reserve(4).unwrap();
        assert!(matches!(
            a.write(first, b"abcd"),
            Err(ArenaError::StaleRegion { .. })
        ));
        a.write(second, b"abcd").unwrap();
    }

    #[test]
    fn commit_invalidates_region() {
        let mut a = arena();
        let region = a.reserve(4).unwrap();
        a.write(region, b"ab").unwrap();
        a.commit(2).unwrap();
        assert!(matches!(
            a.write(region, b"cd"),
            Err(ArenaError::StaleRegion { .. })
        ));
    }

    #[test]
    fn growth_past_capacity_relocates_and_preserves_prefix() {
        let mut a = arena();
        push(&mut a, &[7u8; 16]);
        let stale = a.reserve(1).unwrap();
        // Far beyond anything the allocator could extend in place.
        let fresh = a.reserve(1 << 19).unwrap();
        assert!(matches!(
            a.write(stale, &[1]),
            Err(ArenaError::StaleRegion { .. })
        ));
        a.write(fresh, &[1]).unwrap();
        a.commit(1).unwrap();
        assert_eq!(&a.committed_bytes()[..16], &[7u8; 16]);
        assert_eq!(a.committed_bytes()[16], 1);
    }

    #[test]
    fn every_growth_with_data_counts_a_relocation() {
        let mut a = arena();
        let _ = a.reserve(4).unwrap();
        assert_eq!(a.relocations(), 0);
        push(&mut a, &[1u8; 16]);
        assert_eq!(a.relocations(), 0);
        push(&mut a, &[2u8; 100]);
        assert_eq!(a.relocations(), 1);
        a.resize_exact(4096).unwrap();
        assert!(a.relocations() >= 2);
        assert_eq!(&a.committed_bytes()[16..], &[2u8; 100]);
    }

    #[test]
    fn growth_keeps_written_but_uncommitted_bytes() {
        let mut a = arena();
        let region = a.reserve(4).unwrap();
        a.write(region, b"abcd").unwrap();
        a.resize_exact(64).unwrap();
        a.commit(4).unwrap();
        assert_eq!(a.committed_bytes(), b"abcd");
    }

    #[test]
    fn unsatisfiable_reserve_is_an_error_not_an_abort() {
        let mut a = GrowableArena::new(ArenaConfig::new(usize::MAX)).unwrap();
        push(&mut a, b"abc");
        let huge = isize::MAX as usize;
        assert_eq!(
            a.reserve(huge),
            Err(ArenaError::AllocationFailed {
                requested: huge + 3
            })
        );
        assert_eq!(a.committed_bytes(), b"abc");
        assert!(a.reserve(1).is_ok());
    }

    #[test]
    fn unsatisfiable_resize_is_an_error_not_an_abort() {
        let mut a = GrowableArena::new(ArenaConfig::new(usize::MAX)).unwrap();
        push(&mut a, b"abc");
        let huge = isize::MAX as usize + 1;
        assert_eq!(
            a.resize_exact(huge),
            Err(ArenaError::AllocationFailed { requested: huge })
        );
        assert_eq!(a.committed_bytes(), b"abc");
    }

    #[test]
    fn prefix_with_shows_uncommitted_tail() {
        let mut a = arena();
        push(&mut a, b"ab");
        let region = a.reserve(2).unwrap();
        a.write(region, b"cd").unwrap();
        assert_eq!(a.prefix_with(2).unwrap(), b"abcd");
        assert_eq!(a.prefix_with(0).unwrap(), b"ab");
        assert!(matches!(
            a.prefix_with(a.remaining() + 1),
            Err(ArenaError::OutOfBounds { .. })
        ));
        assert_eq!(a.committed(), 2);
    }

    #[test]
    fn memory_tracks_extent_after_exact_resize() {
        let mut a = arena();
        assert_eq!(a.memory_bytes(), 0);
        push(&mut a, b"abc");
        assert!(a.memory_bytes() >= 16);
        a.resize_exact(40).unwrap();
        assert!(a.memory_bytes() >= 40);
        assert_eq!(a.config().max_capacity, 1 << 20);
        assert_eq!(a.config().initial_capacity, 16);
    }

    #[test]
    fn write_larger_than_region_is_out_of_bounds() {
        let mut a = GrowableArena::new(ArenaConfig::new(8).with_initial_capacity(0)).unwrap();
        let region = a.reserve(4).unwrap();
        assert!(matches!(
            a.write(region, b"abcdef"),
            Err(ArenaError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn commit_past_extent_is_out_of_bounds() {
        let mut a = arena();
        let _ = a.reserve(4).unwrap();
        let extent = a.extent();
        assert!(matches!(
            a.commit(extent + 1),
            Err(ArenaError::OutOfBounds { .. })
        ));
        assert_eq!(a.committed(), 0);
    }

    #[test]
    fn ceiling_is_enforced() {
        let mut a = GrowableArena::new(ArenaConfig::new(32)).unwrap();
        assert!(a.reserve(32).is_ok());
        assert_eq!(
            a.reserve(33),
            Err(ArenaError::CapacityExceeded {
                requested: 33,
                capacity: 32
            })
        );
    }

    #[test]
    fn resize_exact_sets_extent_and_keeps_content() {
        let mut a = arena();
        push(&mut a, b"header");
        a.resize_exact(100).unwrap();
        assert_eq!(a.extent(), 100);
        assert_eq!(a.remaining(), 94);
        assert_eq!(a.committed_bytes(), b"header");

        a.resize_exact(6).unwrap();
        assert_eq!(a.extent(), 6);
    }

    #[test]
    fn resize_exact_below_committed_fails() {
        let mut a = arena();
        push(&mut a, b"header");
        assert_eq!(
            a.resize_exact(3),
            Err(ArenaError::OutOfBounds {
                requested_end: 6,
                extent: 3
            })
        );
    }

    #[test]
    fn into_committed_drops_reserved_tail() {
        let mut a = arena();
        push(&mut a, b"abc");
        let _ = a.reserve(100).unwrap();
        assert_eq!(&*a.into_committed(), b"abc");
    }

    #[test]
    fn invalid_config_rejected_at_construction() {
        let result = GrowableArena::new(ArenaConfig::new(0));
        assert!(matches!(result, Err(ArenaError::InvalidConfig { .. })));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn committed_is_monotonic_and_content_preserved(
                chunks in proptest::collection::vec(
                    proptest::collection::vec(any::<u8>(), 1..64),
                    1..40,
                ),
            ) {
                let mut a = arena();
                let mut expected = Vec::new();
                let mut last = 0;
                for chunk in &chunks {
                    push(&mut a, chunk);
                    expected.extend_from_slice(chunk);
                    prop_assert!(a.committed() >= last);
                    prop_assert!(a.extent() >= a.committed());
                    last = a.committed();
                }
                prop_assert_eq!(a.committed_bytes(), &expected[..]);
            }
        }
    }
}
