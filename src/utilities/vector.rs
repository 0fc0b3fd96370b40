//! Fixed-width lane type used by every wide bundle in the crate.
//!
//! By default the lanes are stored in a plain array and every operation is a
//! per-lane loop; the compiler autovectorizes these on targets that support it.
//! With the `portable_simd` feature the same API is backed by `std::simd::Simd`.
//! Both backends produce identical results lane for lane.

use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

#[cfg(feature = "portable_simd")]
use std::simd::{num::SimdFloat, Simd, StdFloat};

#[cfg(target_arch = "x86_64")]
const fn preferred_byte_size() -> usize {
    #[cfg(target_feature = "avx")]
    {
        32
    }
    #[cfg(not(target_feature = "avx"))]
    {
        16
    }
}

#[cfg(target_arch = "aarch64")]
const fn preferred_byte_size() -> usize {
    16
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
const fn preferred_byte_size() -> usize {
    16
}

/// Number of f32 lanes processed per bundle.
pub const LANES: usize = preferred_byte_size() / std::mem::size_of::<f32>();

#[cfg(not(feature = "portable_simd"))]
type Lanes = [f32; LANES];
#[cfg(feature = "portable_simd")]
type Lanes = Simd<f32, LANES>;

/// `LANES` single precision values operated on together.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector(Lanes);

impl Vector {
    /// Creates a vector with every lane set to `value`.
    #[inline(always)]
    pub fn splat(value: f32) -> Self {
        #[cfg(feature = "portable_simd")]
        {
            Self(Simd::splat(value))
        }
        #[cfg(not(feature = "portable_simd"))]
        {
            Self([value; LANES])
        }
    }

    #[inline(always)]
    pub fn from_array(lanes: [f32; LANES]) -> Self {
        #[cfg(feature = "portable_simd")]
        {
            Self(Simd::from_array(lanes))
        }
        #[cfg(not(feature = "portable_simd"))]
        {
            Self(lanes)
        }
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; LANES] {
        #[cfg(feature = "portable_simd")]
        {
            self.0.to_array()
        }
        #[cfg(not(feature = "portable_simd"))]
        {
            self.0
        }
    }

    /// Per-lane minimum.
    #[inline(always)]
    pub fn min(self, other: Self) -> Self {
        #[cfg(feature = "portable_simd")]
        {
            Self(self.0.simd_min(other.0))
        }
        #[cfg(not(feature = "portable_simd"))]
        {
            self.zip(other, f32::min)
        }
    }

    /// Per-lane maximum.
    #[inline(always)]
    pub fn max(self, other: Self) -> Self {
        #[cfg(feature = "portable_simd")]
        {
            Self(self.0.simd_max(other.0))
        }
        #[cfg(not(feature = "portable_simd"))]
        {
            self.zip(other, f32::max)
        }
    }

    #[inline(always)]
    pub fn sqrt(self) -> Self {
        #[cfg(feature = "portable_simd")]
        {
            Self(self.0.sqrt())
        }
        #[cfg(not(feature = "portable_simd"))]
        {
            self.map(f32::sqrt)
        }
    }

    #[inline(always)]
    pub fn abs(self) -> Self {
        #[cfg(feature = "portable_simd")]
        {
            Self(self.0.abs())
        }
        #[cfg(not(feature = "portable_simd"))]
        {
            self.map(f32::abs)
        }
    }

    #[cfg(not(feature = "portable_simd"))]
    #[inline(always)]
    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        let mut result = self.0;
        for lane in result.iter_mut() {
            *lane = f(*lane);
        }
        Self(result)
    }

    #[cfg(not(feature = "portable_simd"))]
    #[inline(always)]
    fn zip(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        let mut result = self.0;
        for (lane, other_lane) in result.iter_mut().zip(other.0.iter()) {
            *lane = f(*lane, *other_lane);
        }
        Self(result)
    }
}

macro_rules! impl_binary_op {
    ($op_trait:ident, $op_method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $op_trait for Vector {
            type Output = Self;

            #[inline(always)]
            fn $op_method(self, rhs: Self) -> Self {
                #[cfg(feature = "portable_simd")]
                {
                    Self(self.0 $op rhs.0)
                }
                #[cfg(not(feature = "portable_simd"))]
                {
                    self.zip(rhs, |a, b| a $op b)
                }
            }
        }

        impl $assign_trait for Vector {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, +);
impl_binary_op!(Sub, sub, SubAssign, sub_assign, -);
impl_binary_op!(Mul, mul, MulAssign, mul_assign, *);
impl_binary_op!(Div, div, DivAssign, div_assign, /);

impl Neg for Vector {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        #[cfg(feature = "portable_simd")]
        {
            Self(-self.0)
        }
        #[cfg(not(feature = "portable_simd"))]
        {
            self.map(|lane| -lane)
        }
    }
}

impl Index<usize> for Vector {
    type Output = f32;

    #[inline(always)]
    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Vector {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.0[index]
    }
}
