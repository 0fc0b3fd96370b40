//! Scalar quaternion helpers following the same conventions as `QuaternionWide`.

use glam::{Quat, Vec3};

/// Concatenates the transforms of two quaternions together such that the resulting quaternion,
/// applied as an orientation to a vector v, is equivalent to transformed = (v * a) * b.
/// Assumes that the memory backing the input and output do not overlap.
#[inline(always)]
pub fn concatenate_without_overlap(a: Quat, b: Quat, result: &mut Quat) {
    *result = Quat::from_xyzw(
        a.w * b.x + a.x * b.w + a.z * b.y - a.y * b.z,
        a.w * b.y + a.y * b.w + a.x * b.z - a.z * b.x,
        a.w * b.z + a.z * b.w + a.y * b.x - a.x * b.y,
        a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
    );
}

/// Concatenates the transforms of two quaternions together such that the resulting quaternion,
/// applied as an orientation to a vector v, is equivalent to transformed = (v * a) * b.
#[inline(always)]
pub fn concatenate(a: Quat, b: Quat) -> Quat {
    let mut result = Quat::IDENTITY;
    concatenate_without_overlap(a, b, &mut result);
    result
}

/// Computes the conjugate of the quaternion.
#[inline(always)]
pub fn conjugate(quaternion: Quat) -> Quat {
    Quat::from_xyzw(-quaternion.x, -quaternion.y, -quaternion.z, quaternion.w)
}

/// Transforms the vector using a quaternion. Assumes that the memory backing the input and output do not overlap.
#[inline(always)]
pub fn transform_without_overlap(v: Vec3, rotation: Quat, result: &mut Vec3) {
    // This operation is an optimized-down version of v' = q * v * q^-1.
    // The expanded form would be to treat v as an 'axis only' quaternion
    // and perform standard quaternion multiplication. Assuming q is normalized,
    // q^-1 can be replaced by a conjugation.
    let x2 = rotation.x + rotation.x;
    let y2 = rotation.y + rotation.y;
    let z2 = rotation.z + rotation.z;
    let xx2 = rotation.x * x2;
    let xy2 = rotation.x * y2;
    let xz2 = rotation.x * z2;
    let yy2 = rotation.y * y2;
    let yz2 = rotation.y * z2;
    let zz2 = rotation.z * z2;
    let wx2 = rotation.w * x2;
    let wy2 = rotation.w * y2;
    let wz2 = rotation.w * z2;
    // Defer the component setting since they're used in computation.
    result.x = v.x * (1.0 - yy2 - zz2) + v.y * (xy2 - wz2) + v.z * (xz2 + wy2);
    result.y = v.x * (xy2 + wz2) + v.y * (1.0 - xx2 - zz2) + v.z * (yz2 - wx2);
    result.z = v.x * (xz2 - wy2) + v.y * (yz2 + wx2) + v.z * (1.0 - xx2 - yy2);
}

/// Transforms the vector using a quaternion.
#[inline(always)]
pub fn transform(v: Vec3, rotation: Quat) -> Vec3 {
    let mut result = Vec3::ZERO;
    transform_without_overlap(v, rotation, &mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenation_applies_a_then_b() {
        let a = Quat::from_rotation_x(0.4);
        let b = Quat::from_rotation_y(-1.3);
        let v = Vec3::new(1.0, 2.0, 3.0);
        let chained = transform(transform(v, a), b);
        let combined = transform(v, concatenate(a, b));
        assert!(chained.abs_diff_eq(combined, 1e-5));
        assert!(concatenate(a, b).abs_diff_eq(b * a, 1e-6));
    }

    #[test]
    fn conjugate_undoes_rotation() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 0.6, 0.8), 2.1);
        let v = Vec3::new(-3.0, 0.5, 7.0);
        let round_trip = transform(transform(v, q), conjugate(q));
        assert!(round_trip.abs_diff_eq(v, 1e-5));
    }
}
