use glam::{Quat, Vec3};

use crate::utilities::quaternion_ex;

use super::shape::{IConvexShape, IShape};

/// Collision shape representing a sphere-expanded line segment.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Spherical expansion applied to the internal line segment.
    pub radius: f32,
    /// Half of the length of the internal line segment. Oriented along the local Y axis.
    pub half_length: f32,
}

impl Capsule {
    /// Type id of capsule shapes.
    pub const ID: i32 = 1;

    /// Creates a capsule shape.
    #[inline(always)]
    pub fn new(radius: f32, length: f32) -> Self {
        Self {
            radius,
            half_length: length * 0.5,
        }
    }

    /// Gets the length of the capsule's internal line segment along the local Y axis.
    pub fn length(&self) -> f32 {
        self.half_length * 2.0
    }

    pub fn set_length(&mut self, value: f32) {
        self.half_length = value * 0.5;
    }
}

impl IShape for Capsule {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl IConvexShape for Capsule {
    #[inline(always)]
    fn compute_bounds(&self, orientation: Quat, min: &mut Vec3, max: &mut Vec3) {
        let segment_offset = quaternion_ex::transform(Vec3::Y * self.half_length, orientation);
        *max = segment_offset.abs() + Vec3::splat(self.radius);
        *min = -*max;
    }

    #[inline(always)]
    fn compute_angular_expansion_data(
        &self,
        maximum_radius: &mut f32,
        maximum_angular_expansion: &mut f32,
    ) {
        *maximum_radius = self.half_length + self.radius;
        *maximum_angular_expansion = self.half_length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bounds_follow_segment_direction() {
        let capsule = Capsule::new(0.5, 4.0);
        let mut min = Vec3::ZERO;
        let mut max = Vec3::ZERO;
        capsule.compute_bounds(Quat::IDENTITY, &mut min, &mut max);
        assert_relative_eq!(max.x, 0.5);
        assert_relative_eq!(max.y, 2.5);
        assert_relative_eq!(min.z, -0.5);

        // Lying along X after a quarter turn about Z.
        capsule.compute_bounds(
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            &mut min,
            &mut max,
        );
        assert_relative_eq!(max.x, 2.5, epsilon = 1e-5);
        assert_relative_eq!(max.y, 0.5, epsilon = 1e-5);
    }
}
