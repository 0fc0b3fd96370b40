use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::utilities::memory::buffer::Buffer;

/// Largest power of two a pooled buffer may span, in elements.
pub const MAXIMUM_SPAN_SIZE_POWER: u32 = 30;

/// Pooled buffers of one element type and one power-of-two capacity.
#[derive(Default)]
struct PowerPool {
    free: Vec<Box<dyn Any + Send>>,
}

/// Hands out typed buffers and recycles them by element type and power-of-two capacity.
///
/// Each independent caller (for example one per worker thread) should own its own pool;
/// the pool itself performs no synchronization.
#[derive(Default)]
pub struct BufferPool {
    power_pools: HashMap<(TypeId, u32), PowerPool>,
    outstanding_count: usize,
}

impl BufferPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn power_for_count(count: usize) -> u32 {
        let power = count.max(1).next_power_of_two().trailing_zeros();
        debug_assert!(
            power <= MAXIMUM_SPAN_SIZE_POWER,
            "Requested buffer exceeds the maximum pooled span size."
        );
        power
    }

    fn take_memory<T: Send + 'static>(&mut self, count: usize) -> Vec<T> {
        let power = Self::power_for_count(count);
        let pooled = self
            .power_pools
            .get_mut(&(TypeId::of::<T>(), power))
            .and_then(|pool| pool.free.pop())
            .and_then(|memory| memory.downcast::<Vec<T>>().ok());
        self.outstanding_count += 1;
        match pooled {
            Some(memory) => *memory,
            None => Vec::with_capacity(1 << power),
        }
    }

    /// Takes a buffer holding exactly `count` default-initialized elements.
    /// Taking zero elements performs no allocation and returns an unallocated buffer.
    pub fn take<T: Default + Send + 'static>(&mut self, count: usize) -> Buffer<T> {
        if count == 0 {
            return Buffer::default();
        }
        let mut memory = self.take_memory::<T>(count);
        memory.resize_with(count, T::default);
        Buffer { memory }
    }

    /// Takes a buffer with at least `count` default-initialized elements. The length is rounded up
    /// to the pooled power of two.
    pub fn take_at_least<T: Default + Send + 'static>(&mut self, count: usize) -> Buffer<T> {
        let length = 1usize << Self::power_for_count(count);
        self.take(length)
    }

    /// Resizes a buffer to `target_size` elements, keeping the first `copy_count` elements.
    /// The previous backing memory is returned to the pool.
    pub fn resize<T: Default + Copy + Send + 'static>(
        &mut self,
        buffer: &mut Buffer<T>,
        target_size: usize,
        copy_count: usize,
    ) {
        debug_assert!(
            copy_count <= target_size && copy_count <= buffer.len(),
            "Can't copy more elements than exist in either buffer."
        );
        let mut resized = self.take::<T>(target_size);
        if copy_count > 0 {
            buffer.copy_to(0, &mut resized, 0, copy_count);
        }
        self.return_buffer(buffer);
        *buffer = resized;
    }

    /// Returns a buffer's memory to the pool, leaving the buffer unallocated.
    /// Returning an unallocated buffer does nothing.
    pub fn return_buffer<T: Send + 'static>(&mut self, buffer: &mut Buffer<T>) {
        let mut memory = std::mem::take(&mut buffer.memory);
        let capacity = memory.capacity();
        if capacity == 0 {
            return;
        }
        debug_assert!(
            self.outstanding_count > 0,
            "Buffers returned to a pool must have been taken from a pool."
        );
        self.outstanding_count = self.outstanding_count.saturating_sub(1);
        memory.clear();
        // Floor, so a recycled buffer always satisfies requests for its power.
        let power = usize::BITS - 1 - capacity.leading_zeros();
        if power > MAXIMUM_SPAN_SIZE_POWER {
            return;
        }
        self.power_pools
            .entry((TypeId::of::<T>(), power))
            .or_default()
            .free
            .push(Box::new(memory));
    }

    /// Number of buffers taken from the pool and not yet returned.
    pub fn outstanding_count(&self) -> usize {
        self.outstanding_count
    }

    /// Number of buffers sitting in the pool ready for reuse.
    pub fn pooled_count(&self) -> usize {
        self.power_pools.values().map(|pool| pool.free.len()).sum()
    }

    /// Releases all pooled memory. Outstanding buffers are unaffected.
    pub fn clear(&mut self) {
        self.power_pools.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_take_does_not_allocate() {
        let mut pool = BufferPool::new();
        let buffer = pool.take::<i32>(0);
        assert!(!buffer.allocated());
        assert_eq!(pool.outstanding_count(), 0);
    }

    #[test]
    fn returned_memory_is_reused() {
        let mut pool = BufferPool::new();
        let mut buffer = pool.take::<i32>(5);
        assert_eq!(buffer.len(), 5);
        buffer[4] = 7;
        assert_eq!(pool.outstanding_count(), 1);
        pool.return_buffer(&mut buffer);
        assert!(!buffer.allocated());
        assert_eq!(pool.outstanding_count(), 0);
        assert_eq!(pool.pooled_count(), 1);

        let reused = pool.take::<i32>(8);
        assert_eq!(pool.pooled_count(), 0);
        assert!(reused.iter().all(|&value| value == 0));
    }

    #[test]
    fn owning_elements_can_be_pooled() {
        #[derive(Debug, Default, PartialEq)]
        struct Owner(Vec<u8>);

        let mut pool = BufferPool::new();
        let mut owners = pool.take::<Owner>(3);
        owners[1].0.push(9);
        assert_eq!(owners[1], Owner(vec![9]));
        pool.return_buffer(&mut owners);
        assert_eq!(pool.outstanding_count(), 0);
        let reused = pool.take::<Owner>(2);
        assert!(reused.iter().all(|owner| owner.0.is_empty()));
    }

    #[test]
    fn pools_are_separated_by_type() {
        let mut pool = BufferPool::new();
        let mut ints = pool.take::<i32>(4);
        pool.return_buffer(&mut ints);
        let floats = pool.take::<f32>(4);
        assert_eq!(floats.len(), 4);
        assert_eq!(pool.pooled_count(), 1);
    }

    #[test]
    fn resize_keeps_prefix() {
        let mut pool = BufferPool::new();
        let mut buffer = pool.take_at_least::<i32>(3);
        assert_eq!(buffer.len(), 4);
        for (i, value) in buffer.iter_mut().enumerate() {
            *value = i as i32 + 1;
        }
        pool.resize(&mut buffer, 8, 4);
        assert_eq!(&buffer[..5], &[1, 2, 3, 4, 0]);
        assert_eq!(pool.outstanding_count(), 1);
    }
}
