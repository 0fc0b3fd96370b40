use std::any::Any;

use glam::{Quat, Vec3};
use thiserror::Error;

use crate::physics::body_properties::RigidPose;
use crate::utilities::bounding_box::BoundingBox;

use super::shape::{IConvexShape, IShape};
use super::typed_index::TypedIndex;

/// Failures raised while resolving shape references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapesError {
    #[error("shape reference does not point at anything")]
    NonexistentReference,
    #[error("no shape batch is registered for type id {type_id}")]
    UnregisteredType { type_id: i32 },
    #[error("shape index {index} is out of range for type id {type_id}")]
    IndexOutOfRange { type_id: i32, index: usize },
    #[error("shape type {type_id} is not convex and has no angular expansion data")]
    NotConvex { type_id: i32 },
    #[error("shape batch for type id {type_id} does not store the requested shape type")]
    TypeMismatch { type_id: i32 },
}

/// Local bounds of a convex shape under some orientation along with its angular expansion data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeBounds {
    pub min: Vec3,
    pub max: Vec3,
    /// Distance from the shape's origin to its farthest point.
    pub maximum_radius: f32,
    /// Upper bound on how far a bounding box face can move due to rotation.
    pub maximum_angular_expansion: f32,
}

/// Abstract base trait for shape batches. Each shape type gets its own batch.
pub trait ShapeBatch: Send + Sync {
    /// Gets the type id of the shape type in this batch.
    fn shape_type_id(&self) -> i32;

    /// Gets the number of shapes stored in the batch.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets whether this batch's shape type potentially contains children requiring other batches.
    fn compound(&self) -> bool;

    /// Gets the shape at the given index for downcasting.
    fn get_shape_any(&self, shape_index: usize) -> Option<&dyn Any>;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Computes bounds for a shape at the given index with the given orientation,
    /// also returning maximum radius and angular expansion data.
    /// Only convex batches can provide this.
    fn compute_bounds_with_angular_data(
        &self,
        shape_index: usize,
        orientation: Quat,
    ) -> Result<ShapeBounds, ShapesError> {
        let _ = (shape_index, orientation);
        Err(ShapesError::NotConvex {
            type_id: self.shape_type_id(),
        })
    }
}

/// A batch of convex shapes of one type.
pub struct ConvexShapeBatch<TShape> {
    shapes: Vec<TShape>,
}

impl<TShape: IConvexShape> ConvexShapeBatch<TShape> {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            shapes: Vec::with_capacity(initial_capacity),
        }
    }

    /// Adds a shape and returns the index assigned to it.
    pub fn add(&mut self, shape: TShape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&TShape> {
        self.shapes.get(index)
    }
}

impl<TShape: IConvexShape + Send + Sync + 'static> ShapeBatch for ConvexShapeBatch<TShape> {
    fn shape_type_id(&self) -> i32 {
        <TShape as IShape>::type_id()
    }

    fn len(&self) -> usize {
        self.shapes.len()
    }

    fn compound(&self) -> bool {
        false
    }

    fn get_shape_any(&self, shape_index: usize) -> Option<&dyn Any> {
        self.shapes.get(shape_index).map(|shape| shape as &dyn Any)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn compute_bounds_with_angular_data(
        &self,
        shape_index: usize,
        orientation: Quat,
    ) -> Result<ShapeBounds, ShapesError> {
        let shape = self
            .shapes
            .get(shape_index)
            .ok_or(ShapesError::IndexOutOfRange {
                type_id: <TShape as IShape>::type_id(),
                index: shape_index,
            })?;
        let mut bounds = ShapeBounds {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
            maximum_radius: 0.0,
            maximum_angular_expansion: 0.0,
        };
        shape.compute_bounds(orientation, &mut bounds.min, &mut bounds.max);
        shape.compute_angular_expansion_data(
            &mut bounds.maximum_radius,
            &mut bounds.maximum_angular_expansion,
        );
        Ok(bounds)
    }
}

/// A batch of shapes that contain other shapes, like compounds and meshes.
pub struct NonconvexShapeBatch<TShape> {
    shapes: Vec<TShape>,
}

impl<TShape: IShape> NonconvexShapeBatch<TShape> {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            shapes: Vec::with_capacity(initial_capacity),
        }
    }

    pub fn add(&mut self, shape: TShape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }
}

impl<TShape: IShape + Send + Sync + 'static> ShapeBatch for NonconvexShapeBatch<TShape> {
    fn shape_type_id(&self) -> i32 {
        <TShape as IShape>::type_id()
    }

    fn len(&self) -> usize {
        self.shapes.len()
    }

    fn compound(&self) -> bool {
        true
    }

    fn get_shape_any(&self, shape_index: usize) -> Option<&dyn Any> {
        self.shapes.get(shape_index).map(|shape| shape as &dyn Any)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The central shape storage. Manages batches of shapes indexed by type id.
///
/// The registry is only read during overlap finding, so a single instance can be shared
/// across threads by reference.
pub struct Shapes {
    /// Batches indexed by type id. Not all slots may be filled.
    batches: Vec<Option<Box<dyn ShapeBatch>>>,
    initial_capacity_per_type_batch: usize,
}

impl Default for Shapes {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Shapes {
    /// Creates a new shapes collection.
    pub fn new(initial_capacity_per_type_batch: usize) -> Self {
        Self {
            batches: Vec::with_capacity(16),
            initial_capacity_per_type_batch,
        }
    }

    /// Gets the span of registered types.
    pub fn registered_type_span(&self) -> usize {
        self.batches.len()
    }

    /// Gets a reference to a shape batch by type id.
    pub fn get_batch(&self, type_id: i32) -> Option<&dyn ShapeBatch> {
        usize::try_from(type_id)
            .ok()
            .and_then(|type_index| self.batches.get(type_index))
            .and_then(|batch| batch.as_deref())
    }

    fn batch_slot(&mut self, type_id: i32) -> &mut Option<Box<dyn ShapeBatch>> {
        let type_index = type_id as usize;
        if self.batches.len() <= type_index {
            self.batches.resize_with(type_index + 1, || None);
        }
        &mut self.batches[type_index]
    }

    /// Adds a convex shape, creating its type's batch on first use.
    pub fn add<TShape: IConvexShape + Send + Sync + 'static>(
        &mut self,
        shape: TShape,
    ) -> Result<TypedIndex, ShapesError> {
        let type_id = <TShape as IShape>::type_id();
        let capacity = self.initial_capacity_per_type_batch;
        let batch = self
            .batch_slot(type_id)
            .get_or_insert_with(|| Box::new(ConvexShapeBatch::<TShape>::new(capacity)) as Box<dyn ShapeBatch>);
        let batch = batch
            .as_any_mut()
            .downcast_mut::<ConvexShapeBatch<TShape>>()
            .ok_or(ShapesError::TypeMismatch { type_id })?;
        Ok(TypedIndex::new(type_id, batch.add(shape)))
    }

    /// Adds a shape that contains other shapes, like a compound or mesh.
    pub fn add_nonconvex<TShape: IShape + Send + Sync + 'static>(
        &mut self,
        shape: TShape,
    ) -> Result<TypedIndex, ShapesError> {
        let type_id = <TShape as IShape>::type_id();
        let capacity = self.initial_capacity_per_type_batch;
        let batch = self
            .batch_slot(type_id)
            .get_or_insert_with(|| Box::new(NonconvexShapeBatch::<TShape>::new(capacity)) as Box<dyn ShapeBatch>);
        let batch = batch
            .as_any_mut()
            .downcast_mut::<NonconvexShapeBatch<TShape>>()
            .ok_or(ShapesError::TypeMismatch { type_id })?;
        Ok(TypedIndex::new(type_id, batch.add(shape)))
    }

    fn resolve(&self, shape_index: TypedIndex) -> Result<&dyn ShapeBatch, ShapesError> {
        if !shape_index.exists() {
            return Err(ShapesError::NonexistentReference);
        }
        let type_id = shape_index.type_id();
        self.get_batch(type_id)
            .ok_or(ShapesError::UnregisteredType { type_id })
    }

    /// Gets a reference to a specific shape by its typed index.
    pub fn get_shape<TShape: IShape + 'static>(
        &self,
        shape_index: TypedIndex,
    ) -> Result<&TShape, ShapesError> {
        let batch = self.resolve(shape_index)?;
        let type_id = shape_index.type_id();
        batch
            .get_shape_any(shape_index.index())
            .ok_or(ShapesError::IndexOutOfRange {
                type_id,
                index: shape_index.index(),
            })?
            .downcast_ref::<TShape>()
            .ok_or(ShapesError::TypeMismatch { type_id })
    }

    /// Computes the local bounds and angular expansion data of a convex shape under an orientation.
    pub fn compute_bounds(
        &self,
        shape_index: TypedIndex,
        orientation: Quat,
    ) -> Result<ShapeBounds, ShapesError> {
        self.resolve(shape_index)?
            .compute_bounds_with_angular_data(shape_index.index(), orientation)
    }

    /// Computes the world space bounding box of a convex shape at a pose.
    pub fn compute_bounds_by_pose(
        &self,
        shape_index: TypedIndex,
        pose: &RigidPose,
    ) -> Result<BoundingBox, ShapesError> {
        let bounds = self.compute_bounds(shape_index, pose.orientation)?;
        Ok(BoundingBox::new(
            bounds.min + pose.position,
            bounds.max + pose.position,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collidables::box_shape::BoxShape;
    use crate::physics::collidables::sphere::Sphere;

    #[test]
    fn shapes_are_indexed_per_type() {
        let mut shapes = Shapes::default();
        let a = shapes.add(Sphere::new(1.0)).unwrap();
        let b = shapes.add(BoxShape::new(1.0, 2.0, 3.0)).unwrap();
        let c = shapes.add(Sphere::new(2.0)).unwrap();
        assert_eq!((a.type_id(), a.index()), (Sphere::ID, 0));
        assert_eq!((b.type_id(), b.index()), (BoxShape::ID, 0));
        assert_eq!((c.type_id(), c.index()), (Sphere::ID, 1));
        assert_eq!(shapes.get_shape::<Sphere>(c).unwrap().radius, 2.0);
        assert_eq!(
            shapes.get_shape::<BoxShape>(a),
            Err(ShapesError::TypeMismatch { type_id: Sphere::ID })
        );
    }

    #[test]
    fn bad_references_are_reported() {
        let mut shapes = Shapes::default();
        shapes.add(Sphere::new(1.0)).unwrap();
        assert_eq!(
            shapes.compute_bounds(TypedIndex::default(), Quat::IDENTITY),
            Err(ShapesError::NonexistentReference)
        );
        assert_eq!(
            shapes.compute_bounds(TypedIndex::new(BoxShape::ID, 0), Quat::IDENTITY),
            Err(ShapesError::UnregisteredType { type_id: BoxShape::ID })
        );
        assert_eq!(
            shapes.compute_bounds(TypedIndex::new(Sphere::ID, 3), Quat::IDENTITY),
            Err(ShapesError::IndexOutOfRange {
                type_id: Sphere::ID,
                index: 3
            })
        );
    }

    #[test]
    fn bounds_by_pose_are_offset() {
        let mut shapes = Shapes::default();
        let sphere = shapes.add(Sphere::new(0.5)).unwrap();
        let bounds = shapes
            .compute_bounds_by_pose(sphere, &RigidPose::from_position(Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        assert_eq!(bounds.min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(bounds.max, Vec3::new(1.5, 2.5, 3.5));
    }
}
