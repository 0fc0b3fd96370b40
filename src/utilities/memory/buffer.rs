use std::ops::{Deref, DerefMut};

/// Represents a typed span of memory taken from a [`BufferPool`](super::BufferPool).
///
/// A default-constructed buffer holds no memory. Buffers taken from a pool should be handed back
/// with `BufferPool::return_buffer` so the backing storage can be reused; dropping one simply
/// frees it.
///
/// Buffers are not `Clone`. Each pooled span has exactly one handle that can be returned.
#[derive(Debug)]
pub struct Buffer<T> {
    pub(super) memory: Vec<T>,
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self { memory: Vec::new() }
    }
}

impl<T> Buffer<T> {
    /// Returns the length of the buffer in typed elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Gets whether the buffer owns backing memory.
    #[inline]
    pub fn allocated(&self) -> bool {
        self.memory.capacity() > 0
    }

    /// Copies `count` elements starting at `source_start` into `target` starting at `target_start`.
    pub fn copy_to(&self, source_start: usize, target: &mut Buffer<T>, target_start: usize, count: usize)
    where
        T: Copy,
    {
        debug_assert!(source_start + count <= self.len(), "Source region out of bounds");
        debug_assert!(target_start + count <= target.len(), "Target region out of bounds");
        target.memory[target_start..target_start + count]
            .copy_from_slice(&self.memory[source_start..source_start + count]);
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.memory
    }
}

impl<T> DerefMut for Buffer<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.memory
    }
}
