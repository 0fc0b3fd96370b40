use glam::{Quat, Vec3};

use crate::physics::collision_detection::collision_tasks::compound_pair_overlaps::ICollisionTaskSubpairOverlaps;
use crate::utilities::bounding_box::BoundingBox;
use crate::utilities::memory::buffer::Buffer;
use crate::utilities::memory::buffer_pool::BufferPool;
use crate::utilities::quaternion_ex;

use super::shape::{IBoundsQueryableCompound, IShape};
use super::shapes::{Shapes, ShapesError};
use super::triangle::Triangle;

/// Shape designed to contain a whole bunch of triangles.
/// Triangle bounds are cached in unscaled local space and tested linearly.
pub struct Mesh {
    /// Buffer of triangles composing the mesh. Triangles are stored without scaling.
    pub triangles: Buffer<Triangle>,
    leaf_bounds: Buffer<BoundingBox>,
    scale: Vec3,
    inverse_scale: Vec3,
}

impl Mesh {
    /// Type id of mesh shapes.
    pub const ID: i32 = 8;

    /// Creates a mesh shape, caching the bounds of every triangle.
    pub fn new(triangles: Buffer<Triangle>, scale: Vec3, pool: &mut BufferPool) -> Self {
        let mut leaf_bounds = pool.take::<BoundingBox>(triangles.len());
        for (bounds, triangle) in leaf_bounds.iter_mut().zip(triangles.iter()) {
            bounds.min = triangle.a.min(triangle.b.min(triangle.c));
            bounds.max = triangle.a.max(triangle.b.max(triangle.c));
        }
        let mut mesh = Self {
            triangles,
            leaf_bounds,
            scale: Vec3::ONE,
            inverse_scale: Vec3::ONE,
        };
        mesh.set_scale(scale);
        mesh
    }

    /// Creates a mesh by copying triangles into a buffer taken from the pool.
    pub fn from_triangles(triangles: &[Triangle], scale: Vec3, pool: &mut BufferPool) -> Self {
        let mut buffer = pool.take::<Triangle>(triangles.len());
        buffer.copy_from_slice(triangles);
        Self::new(buffer, scale, pool)
    }

    /// Gets the scale of the mesh.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Sets the scale of the mesh.
    pub fn set_scale(&mut self, value: Vec3) {
        let invert = |component: f32| {
            if component != 0.0 {
                1.0 / component
            } else {
                f32::MAX
            }
        };
        self.scale = value;
        self.inverse_scale = Vec3::new(invert(value.x), invert(value.y), invert(value.z));
    }

    pub fn inverse_scale(&self) -> Vec3 {
        self.inverse_scale
    }

    /// Gets a local child triangle with scale applied.
    #[inline(always)]
    pub fn get_local_child(&self, triangle_index: usize) -> Triangle {
        let source = &self.triangles[triangle_index];
        Triangle::new(
            self.scale * source.a,
            self.scale * source.b,
            self.scale * source.c,
        )
    }

    /// Computes the bounding box of the mesh given an orientation.
    pub fn compute_bounds(&self, orientation: Quat) -> BoundingBox {
        let mut bounds = BoundingBox::new(Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
        for triangle_index in 0..self.triangles.len() {
            let triangle = self.get_local_child(triangle_index);
            for vertex in [triangle.a, triangle.b, triangle.c] {
                let rotated = quaternion_ex::transform(vertex, orientation);
                bounds.min = bounds.min.min(rotated);
                bounds.max = bounds.max.max(rotated);
            }
        }
        bounds
    }

    /// Returns the mesh's buffers to the pool.
    pub fn dispose(&mut self, pool: &mut BufferPool) {
        pool.return_buffer(&mut self.triangles);
        pool.return_buffer(&mut self.leaf_bounds);
    }
}

impl IShape for Mesh {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl IBoundsQueryableCompound for Mesh {
    fn shape_type_id(&self) -> i32 {
        Self::ID
    }

    fn find_local_overlaps(
        &self,
        min: Vec3,
        max: Vec3,
        _shapes: &Shapes,
        pool: &mut BufferPool,
        overlaps: &mut dyn ICollisionTaskSubpairOverlaps,
    ) -> Result<(), ShapesError> {
        let scaled_min = self.inverse_scale * min;
        let scaled_max = self.inverse_scale * max;
        // Take a min/max to compensate for negative scales.
        let query_min = scaled_min.min(scaled_max);
        let query_max = scaled_min.max(scaled_max);
        for (leaf_index, bounds) in self.leaf_bounds.iter().enumerate() {
            if BoundingBox::intersects_bounds(bounds.min, bounds.max, query_min, query_max) {
                *overlaps.allocate(pool) = leaf_index as i32;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision_detection::collision_tasks::compound_pair_overlaps::ChildOverlapsCollection;

    fn strip(pool: &mut BufferPool, scale: Vec3) -> Mesh {
        let triangles: Vec<_> = (0..4)
            .map(|i| {
                let x = i as f32;
                Triangle::new(
                    Vec3::new(x, 0.0, 0.0),
                    Vec3::new(x + 1.0, 0.0, 0.0),
                    Vec3::new(x, 0.0, 1.0),
                )
            })
            .collect();
        Mesh::from_triangles(&triangles, scale, pool)
    }

    #[test]
    fn query_respects_scale() {
        let mut pool = BufferPool::new();
        let shapes = Shapes::default();
        let mesh = strip(&mut pool, Vec3::new(2.0, 1.0, 1.0));
        let mut overlaps = ChildOverlapsCollection::default();
        // Scaled triangle 2 spans x in [4, 6].
        mesh.find_local_overlaps(
            Vec3::new(4.5, -0.1, 0.2),
            Vec3::new(5.5, 0.1, 0.3),
            &shapes,
            &mut pool,
            &mut overlaps,
        )
        .unwrap();
        assert_eq!(overlaps.as_slice(), &[2]);
        overlaps.dispose(&mut pool);
    }

    #[test]
    fn negative_scale_mirrors_query() {
        let mut pool = BufferPool::new();
        let shapes = Shapes::default();
        let mesh = strip(&mut pool, Vec3::new(-1.0, 1.0, 1.0));
        let mut overlaps = ChildOverlapsCollection::default();
        mesh.find_local_overlaps(
            Vec3::new(-3.5, -0.1, 0.2),
            Vec3::new(-3.2, 0.1, 0.3),
            &shapes,
            &mut pool,
            &mut overlaps,
        )
        .unwrap();
        assert_eq!(overlaps.as_slice(), &[3]);
        overlaps.dispose(&mut pool);
    }

    #[test]
    fn bounds_cover_scaled_vertices() {
        let mut pool = BufferPool::new();
        let mut mesh = strip(&mut pool, Vec3::splat(2.0));
        let bounds = mesh.compute_bounds(Quat::IDENTITY);
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(8.0, 0.0, 2.0));
        mesh.dispose(&mut pool);
        assert_eq!(pool.outstanding_count(), 0);
    }
}
