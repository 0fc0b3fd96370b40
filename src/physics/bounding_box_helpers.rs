use glam::Vec3;

use crate::utilities::vector::Vector;
use crate::utilities::vector3_wide::Vector3Wide;

/// Helper functions for computing bounding box expansions.
pub struct BoundingBoxHelpers;

impl BoundingBoxHelpers {
    /// Computes how far any point on a shape can move along a single axis due to angular motion.
    #[inline(always)]
    pub fn get_angular_bounds_expansion(
        angular_speed: f32,
        dt: f32,
        maximum_radius: f32,
        maximum_angular_expansion: f32,
    ) -> f32 {
        /*
        Using v = w * r would work, but a tighter bound is available:
        1) Rotating by more than pi/3 can't push a point further than the maximum radius, so larger angles are clamped.
        2) The largest displacement along any axis is the chord between the starting position and the position at dt:
           ||position(dt) - position(0)|| = sqrt(2 * radius^2 * (1 - cos(dt * w)))
        3) cos(x) is approximated by 1 - x^2 / 2! + x^4 / 4! - x^6 / 6!, which is plenty accurate below pi/3.
        */
        let a = (angular_speed * dt).min(std::f32::consts::FRAC_PI_3);
        let a2 = a * a;
        let a4 = a2 * a2;
        let a6 = a4 * a2;
        let cos_angle_minus_one = a2 * (-1.0 / 2.0) + a4 * (1.0 / 24.0) - a6 * (1.0 / 720.0);
        // Angular motion can't grow the bounds on an axis by more than the shape's angular expansion limit.
        maximum_angular_expansion
            .min((-2.0 * maximum_radius * maximum_radius * cos_angle_minus_one).sqrt())
    }

    /// Computes the angular bounds expansion for bundled data.
    #[inline(always)]
    pub fn get_angular_bounds_expansion_wide(
        angular_speed: Vector,
        dt: Vector,
        maximum_radius: Vector,
        maximum_angular_expansion: Vector,
    ) -> Vector {
        let a = (angular_speed * dt).min(Vector::splat(std::f32::consts::FRAC_PI_3));
        let a2 = a * a;
        let a4 = a2 * a2;
        let a6 = a4 * a2;
        let cos_angle_minus_one = a2 * Vector::splat(-1.0 / 2.0)
            + a4 * Vector::splat(1.0 / 24.0)
            - a6 * Vector::splat(1.0 / 720.0);
        maximum_angular_expansion.min(
            (Vector::splat(-2.0) * maximum_radius * maximum_radius * cos_angle_minus_one).sqrt(),
        )
    }

    /// Expands a box, already expressed relative to the child's placement, by one timestep of relative motion
    /// and offsets it by the child's local position.
    ///
    /// The linear displacement only grows the box in the direction of motion and is clamped per axis to
    /// `maximum_allowed_expansion`. The angular margins are symmetric. A's rotation sweeps the child around A's
    /// origin, so its arc has radius `radius_a + maximum_radius` and is capped by `maximum_angular_expansion + radius_a`.
    /// B's rotation sweeps the child around B's origin, using the worst case distance the child can reach from it
    /// during the step as the lever arm.
    #[inline(always)]
    pub fn expand_local_bounding_box(
        min: &mut Vec3,
        max: &mut Vec3,
        radius_a: f32,
        local_position_a: Vec3,
        local_relative_linear_velocity_a: Vec3,
        angular_velocity_a: Vec3,
        angular_velocity_b: Vec3,
        dt: f32,
        maximum_radius: f32,
        maximum_angular_expansion: f32,
        maximum_allowed_expansion: f32,
    ) {
        let displacement = local_relative_linear_velocity_a * dt;
        let allowed = Vec3::splat(maximum_allowed_expansion);
        let min_displacement = displacement.min(Vec3::ZERO).max(-allowed);
        let max_displacement = displacement.max(Vec3::ZERO).min(allowed);

        let mut angular_expansion = Self::get_angular_bounds_expansion(
            angular_velocity_a.length(),
            dt,
            radius_a + maximum_radius,
            maximum_angular_expansion + radius_a,
        );
        let angular_speed_b = angular_velocity_b.length();
        if angular_speed_b > 0.0 {
            // Worst case radius assumes the linear motion is separating the objects as directly as possible.
            let worst_case_radius =
                local_position_a.length() + local_relative_linear_velocity_a.length() * dt;
            angular_expansion += Self::get_angular_bounds_expansion(
                angular_speed_b,
                dt,
                worst_case_radius + maximum_radius,
                maximum_angular_expansion + worst_case_radius,
            );
        }
        let angular_expansion = Vec3::splat(angular_expansion);

        *min = local_position_a + *min + min_displacement - angular_expansion;
        *max = local_position_a + *max + max_displacement + angular_expansion;
    }

    /// Bundled version of [`expand_local_bounding_box`](Self::expand_local_bounding_box).
    /// Every lane is computed independently.
    #[inline(always)]
    pub fn expand_local_bounding_boxes(
        min: &mut Vector3Wide,
        max: &mut Vector3Wide,
        radius_a: Vector,
        local_position_a: &Vector3Wide,
        local_relative_linear_velocity_a: &Vector3Wide,
        angular_velocity_a: &Vector3Wide,
        angular_velocity_b: &Vector3Wide,
        dt: f32,
        maximum_radius: Vector,
        maximum_angular_expansion: Vector,
        maximum_allowed_expansion: Vector,
    ) {
        let dt_wide = Vector::splat(dt);
        let zero = Vector::default();
        let displacement = *local_relative_linear_velocity_a * dt_wide;
        let mut min_displacement = Vector3Wide::default();
        let mut max_displacement = Vector3Wide::default();
        Vector3Wide::min_scalar(zero, &displacement, &mut min_displacement);
        Vector3Wide::max_scalar(zero, &displacement, &mut max_displacement);
        let unclamped_min_displacement = min_displacement;
        let unclamped_max_displacement = max_displacement;
        Vector3Wide::max_scalar(
            -maximum_allowed_expansion,
            &unclamped_min_displacement,
            &mut min_displacement,
        );
        Vector3Wide::min_scalar(
            maximum_allowed_expansion,
            &unclamped_max_displacement,
            &mut max_displacement,
        );

        let angular_expansion_a = Self::get_angular_bounds_expansion_wide(
            angular_velocity_a.length(),
            dt_wide,
            radius_a + maximum_radius,
            maximum_angular_expansion + radius_a,
        );
        // Lanes where B doesn't rotate produce a zero chord, so B's term needs no mask.
        let worst_case_radius =
            local_position_a.length() + local_relative_linear_velocity_a.length() * dt_wide;
        let angular_expansion_b = Self::get_angular_bounds_expansion_wide(
            angular_velocity_b.length(),
            dt_wide,
            worst_case_radius + maximum_radius,
            maximum_angular_expansion + worst_case_radius,
        );
        let angular_expansion = angular_expansion_a + angular_expansion_b;

        let mut expanded_min = *local_position_a + *min + min_displacement;
        let mut expanded_max = *local_position_a + *max + max_displacement;
        let unexpanded_min = expanded_min;
        let unexpanded_max = expanded_max;
        Vector3Wide::subtract_scalar(&unexpanded_min, angular_expansion, &mut expanded_min);
        Vector3Wide::add_scalar(&unexpanded_max, angular_expansion, &mut expanded_max);
        *min = expanded_min;
        *max = expanded_max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::gather_scatter::GatherScatter;
    use crate::utilities::vector::LANES;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    struct Motion {
        radius_a: f32,
        local_position_a: Vec3,
        linear: Vec3,
        angular_a: Vec3,
        angular_b: Vec3,
        maximum_radius: f32,
        maximum_angular_expansion: f32,
        maximum_allowed_expansion: f32,
    }

    fn expand(motion: &Motion, dt: f32) -> (Vec3, Vec3) {
        let mut min = Vec3::new(-1.0, -2.0, -0.5);
        let mut max = Vec3::new(1.0, 2.0, 0.5);
        BoundingBoxHelpers::expand_local_bounding_box(
            &mut min,
            &mut max,
            motion.radius_a,
            motion.local_position_a,
            motion.linear,
            motion.angular_a,
            motion.angular_b,
            dt,
            motion.maximum_radius,
            motion.maximum_angular_expansion,
            motion.maximum_allowed_expansion,
        );
        (min - motion.local_position_a, max - motion.local_position_a)
    }

    fn vec3() -> impl Strategy<Value = Vec3> {
        (-50.0f32..50.0, -50.0f32..50.0, -50.0f32..50.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    #[test]
    fn zero_motion_leaves_bounds_untouched() {
        let motion = Motion {
            radius_a: 3.0,
            local_position_a: Vec3::ZERO,
            linear: Vec3::new(4.0, -2.0, 1.0),
            angular_a: Vec3::new(0.0, 5.0, 0.0),
            angular_b: Vec3::ZERO,
            maximum_radius: 2.3,
            maximum_angular_expansion: 1.3,
            maximum_allowed_expansion: 10.0,
        };
        let (min, max) = expand(&motion, 0.0);
        assert_eq!(min, Vec3::new(-1.0, -2.0, -0.5));
        assert_eq!(max, Vec3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn linear_motion_only_grows_toward_displacement() {
        let motion = Motion {
            radius_a: 0.0,
            local_position_a: Vec3::new(5.0, 0.0, 0.0),
            linear: Vec3::new(2.0, -4.0, 0.0),
            angular_a: Vec3::ZERO,
            angular_b: Vec3::ZERO,
            maximum_radius: 2.3,
            maximum_angular_expansion: 1.3,
            maximum_allowed_expansion: 10.0,
        };
        let (min, max) = expand(&motion, 0.5);
        assert_relative_eq!(min.x, -1.0);
        assert_relative_eq!(max.x, 2.0);
        assert_relative_eq!(min.y, -4.0);
        assert_relative_eq!(max.y, 2.0);
        assert_relative_eq!(min.z, -0.5);
    }

    #[test]
    fn angular_expansion_matches_chord_length() {
        let expansion = BoundingBoxHelpers::get_angular_bounds_expansion(0.5, 1.0, 2.0, 100.0);
        let chord = (2.0f32 * 4.0 * (1.0 - 0.5f32.cos())).sqrt();
        assert_relative_eq!(expansion, chord, epsilon = 1e-4);
        assert_eq!(BoundingBoxHelpers::get_angular_bounds_expansion(0.0, 1.0, 2.0, 1.0), 0.0);
    }

    #[test]
    fn orbiting_child_is_covered_beyond_shape_slack() {
        // A sphere has no rotational slack of its own, but spinning A still carries it around A's origin.
        let motion = Motion {
            radius_a: 2.0,
            local_position_a: Vec3::new(2.0, 0.0, 0.0),
            linear: Vec3::ZERO,
            angular_a: Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_3),
            angular_b: Vec3::ZERO,
            maximum_radius: 1.0,
            maximum_angular_expansion: 0.0,
            maximum_allowed_expansion: 10.0,
        };
        let (min, max) = expand(&motion, 1.0);
        assert_relative_eq!(min.x, -1.0 - 2.0, epsilon = 1e-4);
        assert_relative_eq!(max.y, 2.0 + 2.0, epsilon = 1e-4);

        // B's rotation swings the child about B's origin instead, using the distance to it as the lever arm.
        let spun_by_b = Motion {
            angular_a: Vec3::ZERO,
            angular_b: Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_3),
            radius_a: 0.0,
            local_position_a: Vec3::new(3.0, 0.0, 0.0),
            ..motion
        };
        let (min, max) = expand(&spun_by_b, 1.0);
        assert_relative_eq!(min.z, -0.5 - 3.0, epsilon = 1e-4);
        assert_relative_eq!(max.z, 0.5 + 3.0, epsilon = 1e-4);
    }

    #[test]
    fn wide_lanes_match_scalar() {
        let mut mins = Vector3Wide::default();
        let mut maxes = Vector3Wide::default();
        let mut radius_a = Vector::default();
        let mut positions = Vector3Wide::default();
        let mut linear = Vector3Wide::default();
        let mut angular_a = Vector3Wide::default();
        let mut angular_b = Vector3Wide::default();
        let mut maximum_radius = Vector::default();
        let mut maximum_angular_expansion = Vector::default();
        let mut maximum_allowed_expansion = Vector::default();
        let mut expected = Vec::new();
        for lane in 0..LANES {
            let f = lane as f32;
            let min = Vec3::new(-1.0 - f, -0.5, -2.0);
            let max = Vec3::new(1.0, 0.5 + f, 2.0);
            let motion = Motion {
                radius_a: f * 0.5,
                local_position_a: Vec3::new(f, -f, 1.0),
                linear: Vec3::new(3.0 - f, f * 2.0, -1.0),
                angular_a: Vec3::new(0.1 * f, 0.0, 1.0),
                angular_b: Vec3::new(0.0, 0.3, -0.2 * f),
                maximum_radius: 1.0 + f,
                maximum_angular_expansion: 0.5 + 0.1 * f,
                maximum_allowed_expansion: 0.75 + f,
            };
            GatherScatter::pack_lane(&mut mins, lane, min);
            GatherScatter::pack_lane(&mut maxes, lane, max);
            *GatherScatter::get_mut(&mut radius_a, lane) = motion.radius_a;
            GatherScatter::pack_lane(&mut positions, lane, motion.local_position_a);
            GatherScatter::pack_lane(&mut linear, lane, motion.linear);
            GatherScatter::pack_lane(&mut angular_a, lane, motion.angular_a);
            GatherScatter::pack_lane(&mut angular_b, lane, motion.angular_b);
            *GatherScatter::get_mut(&mut maximum_radius, lane) = motion.maximum_radius;
            *GatherScatter::get_mut(&mut maximum_angular_expansion, lane) =
                motion.maximum_angular_expansion;
            *GatherScatter::get_mut(&mut maximum_allowed_expansion, lane) =
                motion.maximum_allowed_expansion;

            let mut scalar_min = min;
            let mut scalar_max = max;
            BoundingBoxHelpers::expand_local_bounding_box(
                &mut scalar_min,
                &mut scalar_max,
                motion.radius_a,
                motion.local_position_a,
                motion.linear,
                motion.angular_a,
                motion.angular_b,
                0.25,
                motion.maximum_radius,
                motion.maximum_angular_expansion,
                motion.maximum_allowed_expansion,
            );
            expected.push((scalar_min, scalar_max));
        }
        BoundingBoxHelpers::expand_local_bounding_boxes(
            &mut mins,
            &mut maxes,
            radius_a,
            &positions,
            &linear,
            &angular_a,
            &angular_b,
            0.25,
            maximum_radius,
            maximum_angular_expansion,
            maximum_allowed_expansion,
        );
        for (lane, (min, max)) in expected.into_iter().enumerate() {
            assert!(GatherScatter::unpack_lane(&mins, lane).abs_diff_eq(min, 1e-5));
            assert!(GatherScatter::unpack_lane(&maxes, lane).abs_diff_eq(max, 1e-5));
        }
    }

    proptest! {
        #[test]
        fn expansion_grows_with_speed_and_dt(
            linear in vec3(),
            angular_a in vec3(),
            angular_b in vec3(),
            speed_scale in 1.0f32..4.0,
            dt in 0.0f32..0.1,
            dt_scale in 1.0f32..4.0,
        ) {
            let motion = Motion {
                radius_a: 1.5,
                local_position_a: Vec3::ZERO,
                linear,
                angular_a,
                angular_b,
                maximum_radius: 0.8,
                maximum_angular_expansion: 0.6,
                maximum_allowed_expansion: 3.0,
            };
            let faster = Motion {
                linear: linear * speed_scale,
                angular_a: angular_a * speed_scale,
                angular_b: angular_b * speed_scale,
                ..motion
            };
            let (base_min, base_max) = expand(&motion, dt);
            let (fast_min, fast_max) = expand(&faster, dt);
            let (long_min, long_max) = expand(&motion, dt * dt_scale);
            prop_assert!(fast_min.cmple(base_min + 1e-4).all());
            prop_assert!(fast_max.cmpge(base_max - 1e-4).all());
            prop_assert!(long_min.cmple(base_min + 1e-4).all());
            prop_assert!(long_max.cmpge(base_max - 1e-4).all());
        }

        #[test]
        fn expansion_respects_caps(
            linear in vec3(),
            angular_a in vec3(),
            angular_b in vec3(),
            velocity_scale in 1.0f32..1000.0,
            dt in 0.0f32..100.0,
            maximum_allowed_expansion in 0.0f32..5.0,
            maximum_angular_expansion in 0.0f32..2.0,
        ) {
            let motion = Motion {
                radius_a: 4.0,
                local_position_a: Vec3::ZERO,
                linear: linear * velocity_scale,
                angular_a: angular_a * velocity_scale,
                angular_b,
                maximum_radius: 2.0,
                maximum_angular_expansion,
                maximum_allowed_expansion,
            };
            let (min, max) = expand(&motion, dt);
            // Each body's angular term saturates at the shape's slack plus that body's lever arm.
            let worst_case_radius_b = motion.linear.length() * dt;
            let limit = (maximum_allowed_expansion
                + (maximum_angular_expansion + motion.radius_a)
                + (maximum_angular_expansion + worst_case_radius_b))
                * (1.0 + 1e-5)
                + 1e-3;
            let growth_min = Vec3::new(-1.0, -2.0, -0.5) - min;
            let growth_max = max - Vec3::new(1.0, 2.0, 0.5);
            prop_assert!(growth_min.cmple(Vec3::splat(limit)).all());
            prop_assert!(growth_max.cmple(Vec3::splat(limit)).all());
            prop_assert!(growth_min.cmpge(Vec3::splat(-1e-3)).all());
            prop_assert!(growth_max.cmpge(Vec3::splat(-1e-3)).all());
        }
    }
}
