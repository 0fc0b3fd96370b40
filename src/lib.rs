//! Motion-expanded overlap finding between compound children and queryable containers.
#![cfg_attr(feature = "portable_simd", feature(portable_simd))]

pub mod physics;
pub mod utilities;
