use glam::{Quat, Vec3};

use crate::physics::body_properties::RigidPose;
use crate::physics::collision_detection::collision_tasks::compound_pair_overlaps::ICollisionTaskSubpairOverlaps;
use crate::utilities::bounding_box::BoundingBox;
use crate::utilities::memory::buffer::Buffer;
use crate::utilities::memory::buffer_pool::BufferPool;
use crate::utilities::quaternion_ex;

use super::shape::{IBoundsQueryableCompound, ICompoundShape, IShape};
use super::shapes::{Shapes, ShapesError};
use super::typed_index::TypedIndex;

/// Shape and pose of a child within a compound shape.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompoundChild {
    /// Local orientation of the child in the compound.
    pub local_orientation: Quat,
    /// Local position of the child in the compound.
    pub local_position: Vec3,
    /// Index of the shape within whatever shape collection holds the compound's child shape data.
    pub shape_index: TypedIndex,
}

impl CompoundChild {
    /// Creates a compound child.
    pub fn new(pose: &RigidPose, shape_index: TypedIndex) -> Self {
        Self {
            local_orientation: pose.orientation,
            local_position: pose.position,
            shape_index,
        }
    }

    /// Gets the child's pose relative to its compound.
    #[inline(always)]
    pub fn local_pose(&self) -> RigidPose {
        RigidPose::new(self.local_position, self.local_orientation)
    }
}

/// Minimalist compound shape containing a list of child shapes.
/// Does not make use of any internal acceleration structure;
/// should be used only with small groups of shapes.
pub struct Compound {
    /// Buffer of children within this compound.
    pub children: Buffer<CompoundChild>,
}

impl Compound {
    /// Type id of list based compound shapes.
    pub const ID: i32 = 6;

    /// Creates a compound shape with no acceleration structure.
    pub fn new(children: Buffer<CompoundChild>) -> Self {
        debug_assert!(
            !children.is_empty(),
            "Compounds must have a nonzero number of children."
        );
        Self { children }
    }

    /// Creates a compound by copying children into a buffer taken from the pool.
    pub fn from_children(children: &[CompoundChild], pool: &mut BufferPool) -> Self {
        let mut buffer = pool.take::<CompoundChild>(children.len());
        buffer.copy_from_slice(children);
        Self::new(buffer)
    }

    pub fn get_child_mut(&mut self, compound_child_index: usize) -> &mut CompoundChild {
        &mut self.children[compound_child_index]
    }

    /// Computes a rotated child pose from local pose and parent orientation.
    #[inline(always)]
    pub fn get_rotated_child_pose(
        local_position: Vec3,
        local_orientation: Quat,
        parent_orientation: Quat,
        rotated_position: &mut Vec3,
        rotated_orientation: &mut Quat,
    ) {
        quaternion_ex::concatenate_without_overlap(
            local_orientation,
            parent_orientation,
            rotated_orientation,
        );
        *rotated_position = quaternion_ex::transform(local_position, parent_orientation);
    }

    /// Validates that a child's shape index points to a registered convex shape.
    pub fn validate_child_index(shape_index: &TypedIndex, shape_batches: &Shapes) -> bool {
        if !shape_index.exists() {
            return false;
        }
        match shape_batches.get_batch(shape_index.type_id()) {
            Some(batch) => !batch.compound() && shape_index.index() < batch.len(),
            None => false,
        }
    }

    /// Computes the bounds of a single child in the compound given a parent orientation.
    #[inline(always)]
    pub fn compute_child_bounds(
        child: &CompoundChild,
        orientation: Quat,
        shape_batches: &Shapes,
    ) -> Result<BoundingBox, ShapesError> {
        let mut rotated_position = Vec3::ZERO;
        let mut rotated_orientation = Quat::IDENTITY;
        Self::get_rotated_child_pose(
            child.local_position,
            child.local_orientation,
            orientation,
            &mut rotated_position,
            &mut rotated_orientation,
        );
        shape_batches.compute_bounds_by_pose(
            child.shape_index,
            &RigidPose::new(rotated_position, rotated_orientation),
        )
    }

    /// Computes the bounding box for the entire compound given an orientation.
    pub fn compute_bounds(
        &self,
        orientation: Quat,
        shape_batches: &Shapes,
    ) -> Result<BoundingBox, ShapesError> {
        let mut bounds = BoundingBox::new(Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
        for child in self.children.iter() {
            let child_bounds = Self::compute_child_bounds(child, orientation, shape_batches)?;
            let (min, max) = BoundingBox::create_merged(
                bounds.min,
                bounds.max,
                child_bounds.min,
                child_bounds.max,
            );
            bounds = BoundingBox::new(min, max);
        }
        Ok(bounds)
    }

    /// Adds a child to the compound.
    pub fn add(&mut self, child: CompoundChild, pool: &mut BufferPool) {
        let old_len = self.children.len();
        pool.resize(&mut self.children, old_len + 1, old_len);
        self.children[old_len] = child;
    }

    /// Removes a child from the compound by index.
    /// The last child is pulled to fill the gap left by the removed child.
    pub fn remove_at(&mut self, child_index: usize, pool: &mut BufferPool) {
        debug_assert!(
            child_index < self.children.len(),
            "Child index must refer to an existing child."
        );
        let Some(last_index) = self.children.len().checked_sub(1) else {
            return;
        };
        if child_index < last_index {
            self.children[child_index] = self.children[last_index];
        }
        pool.resize(&mut self.children, last_index, last_index);
    }

    /// Returns the children buffer to the pool.
    pub fn dispose(&mut self, pool: &mut BufferPool) {
        pool.return_buffer(&mut self.children);
    }
}

impl IShape for Compound {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl ICompoundShape for Compound {
    #[inline(always)]
    fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline(always)]
    fn get_child(&self, child_index: usize) -> &CompoundChild {
        &self.children[child_index]
    }
}

impl IBoundsQueryableCompound for Compound {
    fn shape_type_id(&self) -> i32 {
        Self::ID
    }

    fn find_local_overlaps(
        &self,
        min: Vec3,
        max: Vec3,
        shapes: &Shapes,
        pool: &mut BufferPool,
        overlaps: &mut dyn ICollisionTaskSubpairOverlaps,
    ) -> Result<(), ShapesError> {
        for (child_index, child) in self.children.iter().enumerate() {
            let bounds = shapes.compute_bounds(child.shape_index, child.local_orientation)?;
            if BoundingBox::intersects_bounds(
                bounds.min + child.local_position,
                bounds.max + child.local_position,
                min,
                max,
            ) {
                *overlaps.allocate(pool) = child_index as i32;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collidables::box_shape::BoxShape;
    use crate::physics::collidables::sphere::Sphere;
    use crate::physics::collision_detection::collision_tasks::compound_pair_overlaps::ChildOverlapsCollection;

    fn row_of_spheres(shapes: &mut Shapes, pool: &mut BufferPool, count: usize) -> Compound {
        let sphere = shapes.add(Sphere::new(0.5)).unwrap();
        let children: Vec<_> = (0..count)
            .map(|i| {
                CompoundChild::new(
                    &RigidPose::from_position(Vec3::new(i as f32 * 2.0, 0.0, 0.0)),
                    sphere,
                )
            })
            .collect();
        Compound::from_children(&children, pool)
    }

    #[test]
    fn local_query_finds_touched_children() {
        let mut shapes = Shapes::default();
        let mut pool = BufferPool::new();
        let compound = row_of_spheres(&mut shapes, &mut pool, 4);
        let mut overlaps = ChildOverlapsCollection::default();
        compound
            .find_local_overlaps(
                Vec3::new(1.9, -0.1, -0.1),
                Vec3::new(4.2, 0.1, 0.1),
                &shapes,
                &mut pool,
                &mut overlaps,
            )
            .unwrap();
        assert_eq!(overlaps.as_slice(), &[1, 2]);
        overlaps.dispose(&mut pool);
    }

    #[test]
    fn bounds_merge_rotated_children() {
        let mut shapes = Shapes::default();
        let mut pool = BufferPool::new();
        let compound = row_of_spheres(&mut shapes, &mut pool, 3);
        let bounds = compound
            .compute_bounds(
                Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
                &shapes,
            )
            .unwrap();
        assert!(bounds.min.abs_diff_eq(Vec3::new(-0.5, -0.5, -0.5), 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec3::new(0.5, 4.5, 0.5), 1e-5));
    }

    #[test]
    fn add_and_remove_keep_children_packed() {
        let mut shapes = Shapes::default();
        let mut pool = BufferPool::new();
        let mut compound = row_of_spheres(&mut shapes, &mut pool, 3);
        let cube = shapes.add(BoxShape::new(1.0, 1.0, 1.0)).unwrap();
        compound.add(CompoundChild::new(&RigidPose::IDENTITY, cube), &mut pool);
        assert_eq!(compound.child_count(), 4);
        compound.remove_at(0, &mut pool);
        assert_eq!(compound.child_count(), 3);
        assert_eq!(compound.get_child(0).shape_index, cube);
        assert!(compound
            .children
            .iter()
            .all(|child| Compound::validate_child_index(&child.shape_index, &shapes)));
        compound.dispose(&mut pool);
        assert_eq!(pool.outstanding_count(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Child index must refer to an existing child.")]
    fn removing_from_an_empty_compound_is_rejected() {
        let mut shapes = Shapes::default();
        let mut pool = BufferPool::new();
        let mut compound = row_of_spheres(&mut shapes, &mut pool, 1);
        compound.remove_at(0, &mut pool);
        assert_eq!(compound.child_count(), 0);
        compound.remove_at(0, &mut pool);
    }

    #[test]
    fn nonconvex_children_fail_validation() {
        let mut shapes = Shapes::default();
        let mut pool = BufferPool::new();
        let inner = row_of_spheres(&mut shapes, &mut pool, 2);
        let inner_index = shapes.add_nonconvex(inner).unwrap();
        assert!(!Compound::validate_child_index(&inner_index, &shapes));
        assert_eq!(
            shapes.compute_bounds(inner_index, Quat::IDENTITY),
            Err(ShapesError::NotConvex { type_id: Compound::ID })
        );
    }
}
