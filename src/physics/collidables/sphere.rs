use glam::{Quat, Vec3};

use super::shape::{IConvexShape, IShape};

/// Collision shape representing a sphere.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Radius of the sphere.
    pub radius: f32,
}

impl Sphere {
    /// Type id of sphere shapes.
    pub const ID: i32 = 0;

    /// Creates a sphere shape.
    #[inline(always)]
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl IShape for Sphere {
    #[inline(always)]
    fn type_id() -> i32 {
        Self::ID
    }
}

impl IConvexShape for Sphere {
    #[inline(always)]
    fn compute_bounds(&self, _orientation: Quat, min: &mut Vec3, max: &mut Vec3) {
        *min = Vec3::splat(-self.radius);
        *max = Vec3::splat(self.radius);
    }

    #[inline(always)]
    fn compute_angular_expansion_data(
        &self,
        maximum_radius: &mut f32,
        maximum_angular_expansion: &mut f32,
    ) {
        *maximum_radius = self.radius;
        // Spheres have perfectly symmetric bounding boxes; rotation never changes them.
        *maximum_angular_expansion = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_ignore_orientation() {
        let sphere = Sphere::new(1.5);
        let mut min = Vec3::ZERO;
        let mut max = Vec3::ZERO;
        sphere.compute_bounds(Quat::from_rotation_z(0.7), &mut min, &mut max);
        assert_eq!(min, Vec3::splat(-1.5));
        assert_eq!(max, Vec3::splat(1.5));

        let mut radius = 0.0;
        let mut expansion = 1.0;
        sphere.compute_angular_expansion_data(&mut radius, &mut expansion);
        assert_eq!(radius, 1.5);
        assert_eq!(expansion, 0.0);
    }
}
