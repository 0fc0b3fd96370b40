use glam::{Quat, Vec3};

use crate::utilities::quaternion_ex;

use super::shape::{IConvexShape, IShape};

/// Collision shape representing a solid cuboid.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    /// Half of the box's width along its local X axis.
    pub half_width: f32,
    /// Half of the box's height along its local Y axis.
    pub half_height: f32,
    /// Half of the box's length along its local Z axis.
    pub half_length: f32,
}

impl BoxShape {
    /// Type id of box shapes.
    pub const ID: i32 = 2;

    /// Creates a box shape from full extents.
    #[inline(always)]
    pub fn new(width: f32, height: f32, length: f32) -> Self {
        Self {
            half_width: width * 0.5,
            half_height: height * 0.5,
            half_length: length * 0.5,
        }
    }

    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    pub fn height(&self) -> f32 {
        self.half_height * 2.0
    }

    pub fn length(&self) -> f32 {
        self.half_length * 2.0
    }
}

impl IShape for BoxShape {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl IConvexShape for BoxShape {
    #[inline(always)]
    fn compute_bounds(&self, orientation: Quat, min: &mut Vec3, max: &mut Vec3) {
        let x = quaternion_ex::transform(Vec3::X * self.half_width, orientation);
        let y = quaternion_ex::transform(Vec3::Y * self.half_height, orientation);
        let z = quaternion_ex::transform(Vec3::Z * self.half_length, orientation);
        *max = x.abs() + y.abs() + z.abs();
        *min = -*max;
    }

    #[inline(always)]
    fn compute_angular_expansion_data(
        &self,
        maximum_radius: &mut f32,
        maximum_angular_expansion: &mut f32,
    ) {
        *maximum_radius = (self.half_width * self.half_width
            + self.half_height * self.half_height
            + self.half_length * self.half_length)
            .sqrt();
        *maximum_angular_expansion = *maximum_radius
            - self
                .half_width
                .min(self.half_height.min(self.half_length));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotated_bounds_contain_corners() {
        let shape = BoxShape::new(2.0, 4.0, 6.0);
        let orientation = Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0).normalize(), 1.1);
        let mut min = Vec3::ZERO;
        let mut max = Vec3::ZERO;
        shape.compute_bounds(orientation, &mut min, &mut max);
        for corner in 0..8 {
            let local = Vec3::new(
                if corner & 1 == 0 { -1.0 } else { 1.0 },
                if corner & 2 == 0 { -2.0 } else { 2.0 },
                if corner & 4 == 0 { -3.0 } else { 3.0 },
            );
            let world = quaternion_ex::transform(local, orientation);
            assert!(world.cmpge(min - 1e-5).all() && world.cmple(max + 1e-5).all());
        }
    }

    #[test]
    fn angular_expansion_uses_smallest_half_extent() {
        let shape = BoxShape::new(2.0, 4.0, 4.0);
        let mut radius = 0.0;
        let mut expansion = 0.0;
        shape.compute_angular_expansion_data(&mut radius, &mut expansion);
        assert_relative_eq!(radius, 3.0);
        assert_relative_eq!(expansion, 2.0);
    }
}
