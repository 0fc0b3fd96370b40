use crate::utilities::vector::{Vector, LANES};

/// A structure-of-arrays bundle whose lanes can be read and written as narrow values.
pub trait LaneAccess {
    /// The array-of-structures form of a single lane.
    type Narrow;

    /// Reads the lane at `slot_index` into its narrow form.
    fn read_slot(&self, slot_index: usize) -> Self::Narrow;

    /// Writes a narrow value into the lane at `slot_index`, leaving every other lane untouched.
    fn write_slot(&mut self, slot_index: usize, source: Self::Narrow);
}

impl LaneAccess for Vector {
    type Narrow = f32;

    #[inline(always)]
    fn read_slot(&self, slot_index: usize) -> f32 {
        self[slot_index]
    }

    #[inline(always)]
    fn write_slot(&mut self, slot_index: usize, source: f32) {
        self[slot_index] = source;
    }
}

/// Transposition helpers between narrow values and wide bundles.
pub struct GatherScatter;

impl GatherScatter {
    /// Gets a single lane of a vector.
    #[inline(always)]
    pub fn get(vector: &Vector, index: usize) -> f32 {
        vector[index]
    }

    /// Gets a mutable reference to a single lane of a vector.
    #[inline(always)]
    pub fn get_mut(vector: &mut Vector, index: usize) -> &mut f32 {
        &mut vector[index]
    }

    /// Scatters a narrow value into one lane of a bundle.
    #[inline(always)]
    pub fn pack_lane<T: LaneAccess>(bundle: &mut T, slot_index: usize, source: T::Narrow) {
        debug_assert!(slot_index < LANES, "Lane index must be within the bundle width.");
        bundle.write_slot(slot_index, source);
    }

    /// Gathers one lane of a bundle into its narrow form.
    #[inline(always)]
    pub fn unpack_lane<T: LaneAccess>(bundle: &T, slot_index: usize) -> T::Narrow {
        debug_assert!(slot_index < LANES, "Lane index must be within the bundle width.");
        bundle.read_slot(slot_index)
    }

    /// Copies from one bundle lane to another.
    #[inline(always)]
    pub fn copy_lane<T: LaneAccess>(
        source_bundle: &T,
        source_inner_index: usize,
        target_bundle: &mut T,
        target_inner_index: usize,
    ) {
        let value = Self::unpack_lane(source_bundle, source_inner_index);
        Self::pack_lane(target_bundle, target_inner_index, value);
    }

    /// Resets a bundle lane to the narrow type's default value.
    #[inline(always)]
    pub fn clear_lane<T: LaneAccess>(bundle: &mut T, inner_index: usize)
    where
        T::Narrow: Default,
    {
        Self::pack_lane(bundle, inner_index, T::Narrow::default());
    }
}
