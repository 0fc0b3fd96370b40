pub mod bounding_box;
pub mod gather_scatter;
pub mod memory;
pub mod quaternion_ex;
pub mod quaternion_wide;
pub mod vector;
pub mod vector3_wide;

pub use self::bounding_box::BoundingBox;
pub use self::gather_scatter::{GatherScatter, LaneAccess};
pub use self::quaternion_wide::QuaternionWide;
pub use self::vector::{Vector, LANES};
pub use self::vector3_wide::Vector3Wide;
