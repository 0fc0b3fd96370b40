use glam::{Quat, Vec3};

use crate::utilities::quaternion_ex;

use super::shape::{IConvexShape, IShape};

/// Collision shape representing an individual triangle.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Triangle {
    /// First vertex of the triangle in local space.
    pub a: Vec3,
    /// Second vertex of the triangle in local space.
    pub b: Vec3,
    /// Third vertex of the triangle in local space.
    pub c: Vec3,
}

impl Triangle {
    /// Type id of triangle shapes.
    pub const ID: i32 = 3;

    /// Creates a triangle shape.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }
}

impl IShape for Triangle {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl IConvexShape for Triangle {
    #[inline(always)]
    fn compute_bounds(&self, orientation: Quat, min: &mut Vec3, max: &mut Vec3) {
        let world_a = quaternion_ex::transform(self.a, orientation);
        let world_b = quaternion_ex::transform(self.b, orientation);
        let world_c = quaternion_ex::transform(self.c, orientation);
        *min = world_a.min(world_b.min(world_c));
        *max = world_a.max(world_b.max(world_c));
    }

    #[inline(always)]
    fn compute_angular_expansion_data(
        &self,
        maximum_radius: &mut f32,
        maximum_angular_expansion: &mut f32,
    ) {
        *maximum_radius = self
            .a
            .length_squared()
            .max(self.b.length_squared().max(self.c.length_squared()))
            .sqrt();
        *maximum_angular_expansion = *maximum_radius;
    }
}
