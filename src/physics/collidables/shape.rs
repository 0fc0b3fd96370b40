use glam::{Quat, Vec3};

use crate::physics::collision_detection::collision_tasks::compound_pair_overlaps::{
    ChildOverlapsCollection, ICollisionTaskSubpairOverlaps, OverlapQueryForPair,
};
use crate::utilities::memory::buffer_pool::BufferPool;

use super::compound::CompoundChild;
use super::shapes::{Shapes, ShapesError};

/// Defines a type usable as a shape by collidables.
pub trait IShape {
    /// Unique type id for this shape type.
    fn type_id() -> i32
    where
        Self: Sized;
}

/// Defines functions available on all convex shapes.
/// Convex shapes have no hollowed out regions; any line passing through a convex shape
/// will never enter and exit more than once.
pub trait IConvexShape: IShape {
    /// Computes the bounding box of a shape given an orientation.
    fn compute_bounds(&self, orientation: Quat, min: &mut Vec3, max: &mut Vec3);

    /// Computes information about how the bounding box should be expanded in response to angular velocity.
    ///
    /// `maximum_radius` is the distance from the shape's local origin to its farthest point.
    /// `maximum_angular_expansion` bounds how far any bounding box face can move under rotation.
    fn compute_angular_expansion_data(
        &self,
        maximum_radius: &mut f32,
        maximum_angular_expansion: &mut f32,
    );
}

/// A shape made of a fixed list of posed children.
pub trait ICompoundShape {
    /// Gets the number of children in the compound.
    fn child_count(&self) -> usize;

    /// Gets a reference to a child by index.
    fn get_child(&self, child_index: usize) -> &CompoundChild;
}

/// A shape whose sub-elements can be queried with a local space bounding box.
/// Covers both compound shapes (with child poses) and mesh shapes (with triangles).
pub trait IBoundsQueryableCompound {
    /// Type id of the implementing shape. Queries against containers with the same id may be batched together.
    fn shape_type_id(&self) -> i32;

    /// Finds every sub-element whose local bounds intersect `min`/`max` and appends its index to `overlaps`.
    fn find_local_overlaps(
        &self,
        min: Vec3,
        max: Vec3,
        shapes: &Shapes,
        pool: &mut BufferPool,
        overlaps: &mut dyn ICollisionTaskSubpairOverlaps,
    ) -> Result<(), ShapesError>;

    /// Finds overlaps for a batch of queries. `overlaps[i]` receives the results for `queries[i]`.
    ///
    /// Every query names its own container; the receiver is only used to pick the implementation,
    /// so queries against different instances of the same shape type can share one call.
    fn find_local_overlaps_batch(
        &self,
        queries: &[OverlapQueryForPair<'_>],
        pool: &mut BufferPool,
        shapes: &Shapes,
        overlaps: &mut [ChildOverlapsCollection],
    ) -> Result<(), ShapesError> {
        debug_assert_eq!(
            queries.len(),
            overlaps.len(),
            "Every query needs exactly one overlap slot."
        );
        for (query, slot) in queries.iter().zip(overlaps.iter_mut()) {
            query
                .container
                .find_local_overlaps(query.min, query.max, shapes, pool, slot)?;
        }
        Ok(())
    }
}
