use crate::utilities::gather_scatter::LaneAccess;
use crate::utilities::vector::Vector;
use crate::utilities::vector3_wide::Vector3Wide;
use glam::Quat;
use std::ops::Neg;

/// Quaternion with SIMD lanes.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuaternionWide {
    pub x: Vector,
    pub y: Vector,
    pub z: Vector,
    pub w: Vector,
}

impl QuaternionWide {
    /// Creates a bundle with the same quaternion in every lane.
    #[inline(always)]
    pub fn broadcast(source: Quat) -> Self {
        Self {
            x: Vector::splat(source.x),
            y: Vector::splat(source.y),
            z: Vector::splat(source.z),
            w: Vector::splat(source.w),
        }
    }

    /// Creates a bundle holding the identity orientation in every lane.
    #[inline(always)]
    pub fn identity() -> Self {
        Self::broadcast(Quat::IDENTITY)
    }

    #[inline(always)]
    pub fn length_squared(&self) -> Vector {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Transforms the vector using a quaternion. Assumes that the memory backing the input and output do not overlap.
    #[inline(always)]
    pub fn transform_without_overlap(v: &Vector3Wide, rotation: &Self, result: &mut Vector3Wide) {
        // This operation is an optimized-down version of v' = q * v * q^-1.
        // The expanded form would be to treat v as an 'axis only' quaternion
        // and perform standard quaternion multiplication.  Assuming q is normalized,
        // q^-1 can be replaced by a conjugation.
        let one = Vector::splat(1.0);
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
        result.x = v.x * (one - yy2 - zz2) + v.y * (xy2 - wz2) + v.z * (xz2 + wy2);
        result.y = v.x * (xy2 + wz2) + v.y * (one - xx2 - zz2) + v.z * (yz2 - wx2);
        result.z = v.x * (xz2 - wy2) + v.y * (yz2 + wx2) + v.z * (one - xx2 - yy2);
    }

    /// Transforms the vector using a quaternion.
    #[inline(always)]
    pub fn transform(v: &Vector3Wide, rotation: &Self) -> Vector3Wide {
        let mut result = Vector3Wide::default();
        Self::transform_without_overlap(v, rotation, &mut result);
        result
    }

    /// Concatenates the transforms of two quaternions together such that the resulting quaternion, applied as an orientation to a vector v, is equivalent to
    /// transformed = (v * a) * b. Assumes that the memory backing the input and output do not overlap.
    #[inline(always)]
    pub fn concatenate_without_overlap(a: &Self, b: &Self, result: &mut Self) {
        result.x = a.w * b.x + a.x * b.w + a.z * b.y - a.y * b.z;
        result.y = a.w * b.y + a.y * b.w + a.x * b.z - a.z * b.x;
        result.z = a.w * b.z + a.z * b.w + a.y * b.x - a.x * b.y;
        result.w = a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z;
    }

    /// Concatenates the transforms of two quaternions together such that the resulting quaternion, applied as an orientation to a vector v, is equivalent to
    /// transformed = (v * a) * b.
    #[inline(always)]
    pub fn concatenate(a: &Self, b: &Self) -> Self {
        let mut result = Self::default();
        Self::concatenate_without_overlap(a, b, &mut result);
        result
    }

    /// Computes the conjugate of the quaternion into another QuaternionWide.
    #[inline(always)]
    pub fn conjugate_into(quaternion: &Self, result: &mut Self) {
        result.x = -quaternion.x;
        result.y = -quaternion.y;
        result.z = -quaternion.z;
        result.w = quaternion.w;
    }

    /// Computes the conjugate of the quaternion.
    #[inline(always)]
    pub fn conjugate(quaternion: &Self) -> Self {
        let mut result = Self::default();
        Self::conjugate_into(quaternion, &mut result);
        result
    }

    /// Pulls one lane out of the bundle as a narrow quaternion.
    #[inline(always)]
    pub fn read_slot(&self, slot_index: usize) -> Quat {
        Quat::from_xyzw(
            self.x[slot_index],
            self.y[slot_index],
            self.z[slot_index],
            self.w[slot_index],
        )
    }

    /// Writes a narrow quaternion into one lane of the bundle.
    #[inline(always)]
    pub fn write_slot(&mut self, source: Quat, slot_index: usize) {
        self.x[slot_index] = source.x;
        self.y[slot_index] = source.y;
        self.z[slot_index] = source.z;
        self.w[slot_index] = source.w;
    }
}

impl LaneAccess for QuaternionWide {
    type Narrow = Quat;

    #[inline(always)]
    fn read_slot(&self, slot_index: usize) -> Quat {
        QuaternionWide::read_slot(self, slot_index)
    }

    #[inline(always)]
    fn write_slot(&mut self, slot_index: usize, source: Quat) {
        QuaternionWide::write_slot(self, source, slot_index)
    }
}

impl Neg for QuaternionWide {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: -self.w,
        }
    }
}
