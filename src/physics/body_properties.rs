use glam::{Quat, Vec3};

use crate::utilities::gather_scatter::LaneAccess;
use crate::utilities::quaternion_ex;
use crate::utilities::quaternion_wide::QuaternionWide;
use crate::utilities::vector3_wide::Vector3Wide;

/// Represents a rigid transformation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidPose {
    /// Orientation of the pose.
    pub orientation: Quat,
    /// Position of the pose.
    pub position: Vec3,
}

impl Default for RigidPose {
    #[inline(always)]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RigidPose {
    /// Returns a pose with a position at (0,0,0) and identity orientation.
    pub const IDENTITY: Self = Self {
        orientation: Quat::IDENTITY,
        position: Vec3::ZERO,
    };

    /// Creates a rigid pose with the given position and orientation.
    #[inline(always)]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Creates a rigid pose with the given position and identity orientation.
    #[inline(always)]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Transforms a vector by the rigid pose: v * pose.Orientation + pose.Position.
    #[inline(always)]
    pub fn transform(v: Vec3, pose: &RigidPose) -> Vec3 {
        quaternion_ex::transform(v, pose.orientation) + pose.position
    }

    /// Transforms a vector by the inverse of a rigid pose: (v - pose.Position) * pose.Orientation^-1.
    #[inline(always)]
    pub fn transform_by_inverse(v: Vec3, pose: &RigidPose) -> Vec3 {
        quaternion_ex::transform(v - pose.position, quaternion_ex::conjugate(pose.orientation))
    }
}

/// Rigid poses with SIMD lanes.
#[derive(Clone, Copy, Debug)]
pub struct RigidPoseWide {
    pub position: Vector3Wide,
    pub orientation: QuaternionWide,
}

impl Default for RigidPoseWide {
    #[inline(always)]
    fn default() -> Self {
        Self::broadcast(&RigidPose::IDENTITY)
    }
}

impl RigidPoseWide {
    #[inline(always)]
    pub fn broadcast(pose: &RigidPose) -> Self {
        Self {
            position: Vector3Wide::broadcast(pose.position),
            orientation: QuaternionWide::broadcast(pose.orientation),
        }
    }
}

impl LaneAccess for RigidPoseWide {
    type Narrow = RigidPose;

    #[inline(always)]
    fn read_slot(&self, slot_index: usize) -> RigidPose {
        RigidPose::new(
            self.position.read_slot(slot_index),
            self.orientation.read_slot(slot_index),
        )
    }

    #[inline(always)]
    fn write_slot(&mut self, slot_index: usize, source: RigidPose) {
        self.position.write_slot(source.position, slot_index);
        self.orientation.write_slot(source.orientation, slot_index);
    }
}
