use std::ops::Range;

use glam::Vec3;

use crate::physics::collidables::shape::IBoundsQueryableCompound;
use crate::utilities::memory::buffer::Buffer;
use crate::utilities::memory::buffer_pool::BufferPool;

/// Subpair overlap storage that can allocate new overlap entries.
pub trait ICollisionTaskSubpairOverlaps {
    /// Allocates a new overlap entry and returns a mutable reference to the child index slot.
    fn allocate(&mut self, pool: &mut BufferPool) -> &mut i32;
}

/// Stores overlapping child indices for one child of a compound pair.
#[derive(Debug, Default)]
pub struct ChildOverlapsCollection {
    /// Buffer of overlapping child indices. Only the first `count` entries are meaningful.
    pub overlaps: Buffer<i32>,
    /// Number of overlaps.
    pub count: usize,
    /// Index of the child in the parent compound.
    pub child_index: usize,
}

impl ChildOverlapsCollection {
    /// Allocates a new overlap entry and returns a mutable reference to the child index slot.
    #[inline(always)]
    pub fn allocate(&mut self, pool: &mut BufferPool) -> &mut i32 {
        if self.count == self.overlaps.len() {
            let new_size = (self.count * 2).max(4);
            pool.resize(&mut self.overlaps, new_size, self.count);
        }
        let index = self.count;
        self.count += 1;
        &mut self.overlaps[index]
    }

    /// Gets the overlapping child indices found so far.
    #[inline(always)]
    pub fn as_slice(&self) -> &[i32] {
        &self.overlaps[..self.count]
    }

    /// Returns the overlaps buffer to the pool.
    pub fn dispose(&mut self, pool: &mut BufferPool) {
        pool.return_buffer(&mut self.overlaps);
        self.count = 0;
    }
}

impl ICollisionTaskSubpairOverlaps for ChildOverlapsCollection {
    #[inline(always)]
    fn allocate(&mut self, pool: &mut BufferPool) -> &mut i32 {
        ChildOverlapsCollection::allocate(self, pool)
    }
}

/// Query bounds for overlap testing against one container.
#[derive(Clone, Copy)]
pub struct OverlapQueryForPair<'a> {
    /// Container whose sub-elements are tested.
    pub container: &'a dyn IBoundsQueryableCompound,
    /// Minimum of the query bounding box in the container's local space.
    pub min: Vec3,
    /// Maximum of the query bounding box in the container's local space.
    pub max: Vec3,
}

/// Stores overlap results for all children of all pairs in a compound-compound collision task batch.
///
/// Children are laid out contiguously: pair `i` owns the subpair range returned by
/// [`get_pair_region`](Self::get_pair_region), in registration order.
#[derive(Debug)]
pub struct CompoundPairOverlaps {
    child_overlaps: Buffer<ChildOverlapsCollection>,
    /// (start, count) regions mapping pairs to their children in `child_overlaps`.
    pair_regions: Buffer<(usize, usize)>,
    pair_count: usize,
    registered_pair_count: usize,
    child_cursor: usize,
}

impl CompoundPairOverlaps {
    /// Creates storage for `pair_count` pairs with `total_compound_child_count` children between them.
    pub fn new(pool: &mut BufferPool, pair_count: usize, total_compound_child_count: usize) -> Self {
        Self {
            child_overlaps: pool.take(total_compound_child_count),
            pair_regions: pool.take(pair_count),
            pair_count,
            registered_pair_count: 0,
            child_cursor: 0,
        }
    }

    /// Registers the next pair's region with the given child count. Returns the region's first subpair index.
    #[inline(always)]
    pub fn create_pair_overlaps(&mut self, child_count: usize) -> usize {
        debug_assert!(
            self.registered_pair_count < self.pair_count,
            "More pairs registered than were allocated."
        );
        debug_assert!(
            self.child_cursor + child_count <= self.child_overlaps.len(),
            "Pair regions exceed the allocated subpair count."
        );
        let start = self.child_cursor;
        self.pair_regions[self.registered_pair_count] = (start, child_count);
        self.registered_pair_count += 1;
        self.child_cursor += child_count;
        start
    }

    /// Gets a mutable reference to the overlaps for a specific subpair.
    #[inline(always)]
    pub fn get_overlaps_for_pair(&mut self, subpair_index: usize) -> &mut ChildOverlapsCollection {
        &mut self.child_overlaps[subpair_index]
    }

    /// Gets the overlaps for a specific subpair.
    #[inline(always)]
    pub fn get_overlaps(&self, subpair_index: usize) -> &ChildOverlapsCollection {
        &self.child_overlaps[subpair_index]
    }

    /// Gets every subpair's overlaps, ordered by pair and then by child.
    pub fn child_overlaps(&self) -> &[ChildOverlapsCollection] {
        &self.child_overlaps
    }

    pub(crate) fn child_overlaps_mut(&mut self) -> &mut [ChildOverlapsCollection] {
        &mut self.child_overlaps
    }

    /// Gets the range of subpair indices owned by a pair.
    #[inline(always)]
    pub fn get_pair_region(&self, pair_index: usize) -> Range<usize> {
        let (start, count) = self.pair_regions[pair_index];
        start..start + count
    }

    /// Gets the subpair overlaps owned by a pair.
    pub fn pair_overlaps(&self, pair_index: usize) -> &[ChildOverlapsCollection] {
        &self.child_overlaps[self.get_pair_region(pair_index)]
    }

    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    pub fn subpair_count(&self) -> usize {
        self.child_overlaps.len()
    }

    /// Returns every buffer, including each subpair's overlap list, to the pool.
    pub fn dispose(&mut self, pool: &mut BufferPool) {
        for subpair in self.child_overlaps.iter_mut() {
            subpair.dispose(pool);
        }
        pool.return_buffer(&mut self.child_overlaps);
        pool.return_buffer(&mut self.pair_regions);
        self.pair_count = 0;
        self.registered_pair_count = 0;
        self.child_cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_grows_and_keeps_entries() {
        let mut pool = BufferPool::new();
        let mut collection = ChildOverlapsCollection::default();
        for i in 0..11 {
            *collection.allocate(&mut pool) = i;
        }
        assert_eq!(collection.count, 11);
        assert_eq!(collection.as_slice(), &(0..11).collect::<Vec<_>>()[..]);
        collection.dispose(&mut pool);
        assert_eq!(pool.outstanding_count(), 0);
    }

    #[test]
    fn pair_regions_are_contiguous() {
        let mut pool = BufferPool::new();
        let mut overlaps = CompoundPairOverlaps::new(&mut pool, 3, 5);
        assert_eq!(overlaps.create_pair_overlaps(2), 0);
        assert_eq!(overlaps.create_pair_overlaps(0), 2);
        assert_eq!(overlaps.create_pair_overlaps(3), 2);
        assert_eq!(overlaps.get_pair_region(0), 0..2);
        assert!(overlaps.get_pair_region(1).is_empty());
        assert_eq!(overlaps.get_pair_region(2), 2..5);
        assert_eq!(overlaps.pair_overlaps(2).len(), 3);

        *overlaps.get_overlaps_for_pair(4).allocate(&mut pool) = 9;
        assert_eq!(overlaps.get_overlaps(4).as_slice(), &[9]);
        overlaps.dispose(&mut pool);
        assert_eq!(pool.outstanding_count(), 0);
    }
}
