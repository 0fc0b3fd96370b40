use crate::utilities::gather_scatter::LaneAccess;
use crate::utilities::vector::Vector;
use glam::Vec3;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default)]
/// Three dimensional vector with SIMD lanes.
pub struct Vector3Wide {
    /// First component of the vector.
    pub x: Vector,
    /// Second component of the vector.
    pub y: Vector,
    /// Third component of the vector.
    pub z: Vector,
}

impl From<Vector> for Vector3Wide {
    #[inline(always)]
    fn from(s: Vector) -> Self {
        Self::new(s)
    }
}

impl Vector3Wide {
    /// Creates a vector by populating each component with the given scalars.
    #[inline(always)]
    pub fn new(s: Vector) -> Self {
        Self { x: s, y: s, z: s }
    }

    /// Creates a bundle with the same narrow vector in every lane.
    #[inline(always)]
    pub fn broadcast(source: Vec3) -> Self {
        Self {
            x: Vector::splat(source.x),
            y: Vector::splat(source.y),
            z: Vector::splat(source.z),
        }
    }

    /// Performs a componentwise add between two vectors.
    #[inline(always)]
    pub fn add(a: &Self, b: &Self, result: &mut Self) {
        result.x = a.x + b.x;
        result.y = a.y + b.y;
        result.z = a.z + b.z;
    }

    /// Finds the result of adding a scalar to every component of a vector.
    #[inline(always)]
    pub fn add_scalar(v: &Self, s: Vector, result: &mut Self) {
        result.x = v.x + s;
        result.y = v.y + s;
        result.z = v.z + s;
    }

    /// Subtracts one vector from another.
    #[inline(always)]
    pub fn subtract(a: &Self, b: &Self, result: &mut Self) {
        result.x = a.x - b.x;
        result.y = a.y - b.y;
        result.z = a.z - b.z;
    }

    /// Finds the result of subtracting a scalar from every component of a vector.
    #[inline(always)]
    pub fn subtract_scalar(v: &Self, s: Vector, result: &mut Self) {
        result.x = v.x - s;
        result.y = v.y - s;
        result.z = v.z - s;
    }

    /// Scales every component of the vector by a per-lane scalar.
    #[inline(always)]
    pub fn scale(vector: &Self, scalar: Vector, result: &mut Self) {
        result.x = vector.x * scalar;
        result.y = vector.y * scalar;
        result.z = vector.z * scalar;
    }

    /// Computes the inner product between two vectors.
    #[inline(always)]
    pub fn dot(a: &Self, b: &Self) -> Vector {
        a.x * b.x + a.y * b.y + a.z * b.z
    }

    /// Computes the per-component minimum between a scalar value and the components of a vector.
    #[inline(always)]
    pub fn min_scalar(s: Vector, v: &Self, result: &mut Self) {
        result.x = s.min(v.x);
        result.y = s.min(v.y);
        result.z = s.min(v.z);
    }

    /// Computes the per-component maximum between a scalar value and the components of a vector.
    #[inline(always)]
    pub fn max_scalar(s: Vector, v: &Self, result: &mut Self) {
        result.x = s.max(v.x);
        result.y = s.max(v.y);
        result.z = s.max(v.z);
    }

    /// Computes the per-component minimum of two vectors.
    #[inline(always)]
    pub fn min(a: &Self, b: &Self, result: &mut Self) {
        result.x = a.x.min(b.x);
        result.y = a.y.min(b.y);
        result.z = a.z.min(b.z);
    }

    /// Computes the per-component maximum of two vectors.
    #[inline(always)]
    pub fn max(a: &Self, b: &Self, result: &mut Self) {
        result.x = a.x.max(b.x);
        result.y = a.y.max(b.y);
        result.z = a.z.max(b.z);
    }

    #[inline(always)]
    pub fn length_squared(&self) -> Vector {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn length(&self) -> Vector {
        self.length_squared().sqrt()
    }

    /// Pulls one lane out of the bundle as a narrow vector.
    #[inline(always)]
    pub fn read_slot(&self, slot_index: usize) -> Vec3 {
        Vec3::new(self.x[slot_index], self.y[slot_index], self.z[slot_index])
    }

    /// Writes a narrow vector into one lane of the bundle.
    #[inline(always)]
    pub fn write_slot(&mut self, source: Vec3, slot_index: usize) {
        self.x[slot_index] = source.x;
        self.y[slot_index] = source.y;
        self.z[slot_index] = source.z;
    }
}

impl LaneAccess for Vector3Wide {
    type Narrow = Vec3;

    #[inline(always)]
    fn read_slot(&self, slot_index: usize) -> Vec3 {
        Vector3Wide::read_slot(self, slot_index)
    }

    #[inline(always)]
    fn write_slot(&mut self, slot_index: usize, source: Vec3) {
        Vector3Wide::write_slot(self, source, slot_index)
    }
}

impl Add for Vector3Wide {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vector3Wide {
    #[inline(always)]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vector3Wide {
    type Output = Self;

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl SubAssign for Vector3Wide {
    #[inline(always)]
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<Vector> for Vector3Wide {
    type Output = Self;

    #[inline(always)]
    fn mul(self, scalar: Vector) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Neg for Vector3Wide {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}
