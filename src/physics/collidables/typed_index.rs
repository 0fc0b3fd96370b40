use std::fmt;

/// Represents an index with an associated type packed into a single integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TypedIndex {
    /// Bit packed representation of the typed index.
    pub packed: u32,
}

impl TypedIndex {
    /// Creates a new TypedIndex.
    #[inline(always)]
    pub fn new(type_id: i32, index: usize) -> Self {
        debug_assert!(
            (0..128).contains(&type_id),
            "Do you really have that many type indices, or is the index corrupt?"
        );
        debug_assert!(
            index < (1 << 24),
            "Do you really have that many instances, or is the index corrupt?"
        );
        // The most significant bit marks the index as explicitly constructed, so a default
        // TypedIndex can stand in for an empty reference.
        Self {
            packed: ((type_id as u32) << 24) | (index as u32) | (1u32 << 31),
        }
    }

    /// Gets the type index of the object.
    #[inline(always)]
    pub fn type_id(&self) -> i32 {
        ((self.packed & 0x7F00_0000) >> 24) as i32
    }

    /// Gets the index of the object.
    #[inline(always)]
    pub fn index(&self) -> usize {
        (self.packed & 0x00FF_FFFF) as usize
    }

    /// Gets whether this index actually refers to anything.
    /// The Type and Index should only be used if this is true.
    #[inline(always)]
    pub fn exists(&self) -> bool {
        (self.packed & (1 << 31)) > 0
    }
}

impl fmt::Display for TypedIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}, {}>", self.type_id(), self.index())
    }
}
