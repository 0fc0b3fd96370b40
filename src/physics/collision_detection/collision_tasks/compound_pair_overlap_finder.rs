use std::marker::PhantomData;

use glam::{Quat, Vec3};
use log::{debug, trace};

use crate::physics::body_properties::{RigidPose, RigidPoseWide};
use crate::physics::bounding_box_helpers::BoundingBoxHelpers;
use crate::physics::collidables::compound::{Compound, CompoundChild};
use crate::physics::collidables::shape::{IBoundsQueryableCompound, ICompoundShape};
use crate::physics::collidables::shapes::{Shapes, ShapesError};
use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::memory::buffer_pool::BufferPool;
use crate::utilities::quaternion_ex;
use crate::utilities::quaternion_wide::QuaternionWide;
use crate::utilities::vector::{Vector, LANES};
use crate::utilities::vector3_wide::Vector3Wide;

use super::compound_pair_overlaps::{CompoundPairOverlaps, OverlapQueryForPair};

/// A pair whose A side is a compound and whose B side can be queried with local bounding boxes.
///
/// All state is relative: B's offset is measured from A's position, and A's linear velocity is
/// relative to B's.
pub struct BoundsTestedPair<'a, TCompoundA: ?Sized> {
    pub a: &'a TCompoundA,
    pub b: &'a dyn IBoundsQueryableCompound,
    pub offset_b: Vec3,
    pub orientation_a: Quat,
    pub orientation_b: Quat,
    pub relative_linear_velocity_a: Vec3,
    pub angular_velocity_a: Vec3,
    pub angular_velocity_b: Vec3,
    /// Upper bound on how far linear motion may expand a child's bounds along any axis.
    pub maximum_expansion: f32,
}

impl<'a, TCompoundA: ?Sized> BoundsTestedPair<'a, TCompoundA> {
    /// Creates a motionless pair.
    pub fn new(
        a: &'a TCompoundA,
        b: &'a dyn IBoundsQueryableCompound,
        offset_b: Vec3,
        orientation_a: Quat,
        orientation_b: Quat,
    ) -> Self {
        Self {
            a,
            b,
            offset_b,
            orientation_a,
            orientation_b,
            relative_linear_velocity_a: Vec3::ZERO,
            angular_velocity_a: Vec3::ZERO,
            angular_velocity_b: Vec3::ZERO,
            maximum_expansion: f32::MAX,
        }
    }
}

impl<TCompoundA: ?Sized> Clone for BoundsTestedPair<'_, TCompoundA> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<TCompoundA: ?Sized> Copy for BoundsTestedPair<'_, TCompoundA> {}

/// Selects how the per-child query bounds are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundsPath {
    /// Full batches of `LANES` children are computed together; a partial final batch uses the scalar path.
    #[default]
    Wide,
    /// Every child is computed one at a time.
    Scalar,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlapFinderSettings {
    pub bounds_path: BoundsPath,
}

/// Finds the overlaps between the children of compound A and the sub-elements of B for a set of pairs.
pub trait ICompoundPairOverlapFinder<TCompoundA: ?Sized> {
    fn find_local_overlaps(
        &self,
        pairs: &[BoundsTestedPair<'_, TCompoundA>],
        pool: &mut BufferPool,
        shapes: &Shapes,
        dt: f32,
    ) -> Result<CompoundPairOverlaps, ShapesError>;
}

/// Pose and motion of a child of A, expressed in B's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalChildFrame {
    pub local_orientation_a: Quat,
    /// Offset from A's origin to the child, rotated into B's space.
    pub local_offset_a: Vec3,
    pub local_position_a: Vec3,
    pub local_relative_linear_velocity_a: Vec3,
    /// Length of the child's offset; the lever arm used for angular expansion.
    pub radius_a: f32,
}

impl LocalChildFrame {
    #[inline(always)]
    pub fn compose(
        child_pose: &RigidPose,
        orientation_a: Quat,
        offset_b: Vec3,
        orientation_b: Quat,
        relative_linear_velocity_a: Vec3,
    ) -> Self {
        let child_orientation_a = quaternion_ex::concatenate(child_pose.orientation, orientation_a);
        let to_local_b = quaternion_ex::conjugate(orientation_b);
        let local_orientation_a = quaternion_ex::concatenate(child_orientation_a, to_local_b);
        // The child's offset lives in A's space, so it only passes through A's orientation on the way to B.
        let orientation_a_in_b = quaternion_ex::concatenate(orientation_a, to_local_b);
        let local_offset_a = quaternion_ex::transform(child_pose.position, orientation_a_in_b);
        let local_offset_b = quaternion_ex::transform(offset_b, to_local_b);
        Self {
            local_orientation_a,
            local_offset_a,
            local_position_a: local_offset_a - local_offset_b,
            local_relative_linear_velocity_a: quaternion_ex::transform(
                relative_linear_velocity_a,
                to_local_b,
            ),
            radius_a: local_offset_a.length(),
        }
    }
}

/// Bundled version of [`LocalChildFrame`].
#[derive(Clone, Copy, Debug)]
pub struct LocalChildFramesWide {
    pub local_orientation_a: QuaternionWide,
    pub local_offset_a: Vector3Wide,
    pub local_position_a: Vector3Wide,
    pub local_relative_linear_velocity_a: Vector3Wide,
    pub radius_a: Vector,
}

impl LocalChildFramesWide {
    #[inline(always)]
    pub fn compose(
        child_poses: &RigidPoseWide,
        orientation_a: &QuaternionWide,
        offset_b: &Vector3Wide,
        orientation_b: &QuaternionWide,
        relative_linear_velocity_a: &Vector3Wide,
    ) -> Self {
        let mut child_orientation_a = QuaternionWide::default();
        QuaternionWide::concatenate_without_overlap(
            &child_poses.orientation,
            orientation_a,
            &mut child_orientation_a,
        );
        let to_local_b = QuaternionWide::conjugate(orientation_b);
        let mut local_orientation_a = QuaternionWide::default();
        QuaternionWide::concatenate_without_overlap(
            &child_orientation_a,
            &to_local_b,
            &mut local_orientation_a,
        );
        let mut orientation_a_in_b = QuaternionWide::default();
        QuaternionWide::concatenate_without_overlap(orientation_a, &to_local_b, &mut orientation_a_in_b);
        let mut local_offset_a = Vector3Wide::default();
        QuaternionWide::transform_without_overlap(
            &child_poses.position,
            &orientation_a_in_b,
            &mut local_offset_a,
        );
        let mut local_offset_b = Vector3Wide::default();
        QuaternionWide::transform_without_overlap(offset_b, &to_local_b, &mut local_offset_b);
        let mut local_position_a = Vector3Wide::default();
        Vector3Wide::subtract(&local_offset_a, &local_offset_b, &mut local_position_a);
        let mut local_relative_linear_velocity_a = Vector3Wide::default();
        QuaternionWide::transform_without_overlap(
            relative_linear_velocity_a,
            &to_local_b,
            &mut local_relative_linear_velocity_a,
        );
        Self {
            local_orientation_a,
            local_offset_a,
            local_position_a,
            local_relative_linear_velocity_a,
            radius_a: local_offset_a.length(),
        }
    }
}

/// Links a flattened subpair back to its source pair and child.
struct SubpairData<'a, TCompoundA: ?Sized> {
    pair: &'a BoundsTestedPair<'a, TCompoundA>,
    child: &'a CompoundChild,
}

/// Finds the children of compound A whose motion-expanded bounds may touch sub-elements of B.
///
/// Each child's bounds are computed in B's local space, expanded by one timestep of relative motion,
/// and handed to B's local overlap query.
pub struct CompoundPairOverlapFinder<TCompoundA: ?Sized> {
    settings: OverlapFinderSettings,
    _marker: PhantomData<fn(&TCompoundA)>,
}

/// Overlap finder for pairs of list based compounds and any queryable B.
pub type CompoundOverlapFinder = CompoundPairOverlapFinder<Compound>;

impl<TCompoundA: ?Sized> Default for CompoundPairOverlapFinder<TCompoundA> {
    fn default() -> Self {
        Self::new(OverlapFinderSettings::default())
    }
}

impl<TCompoundA: ?Sized> CompoundPairOverlapFinder<TCompoundA> {
    pub fn new(settings: OverlapFinderSettings) -> Self {
        Self {
            settings,
            _marker: PhantomData,
        }
    }

    pub fn settings(&self) -> OverlapFinderSettings {
        self.settings
    }
}

impl<TCompoundA: ICompoundShape + ?Sized> CompoundPairOverlapFinder<TCompoundA> {
    /// Computes query bounds for up to `LANES` subpairs at once. Lanes past `subpairs.len()` hold
    /// identity poses and are never read back.
    fn compute_batch_bounds_wide(
        subpairs: &[SubpairData<'_, TCompoundA>],
        shapes: &Shapes,
        dt: f32,
        queries: &mut [OverlapQueryForPair<'_>],
    ) -> Result<(), ShapesError> {
        debug_assert!(!subpairs.is_empty() && subpairs.len() <= LANES);
        debug_assert_eq!(subpairs.len(), queries.len());
        let mut offset_b = Vector3Wide::default();
        let mut orientation_a = QuaternionWide::identity();
        let mut orientation_b = QuaternionWide::identity();
        let mut relative_linear_velocity_a = Vector3Wide::default();
        let mut angular_velocity_a = Vector3Wide::default();
        let mut angular_velocity_b = Vector3Wide::default();
        let mut maximum_allowed_expansion = Vector::default();
        let mut local_poses_a = RigidPoseWide::default();
        for (lane, subpair) in subpairs.iter().enumerate() {
            let pair = subpair.pair;
            GatherScatter::pack_lane(&mut offset_b, lane, pair.offset_b);
            GatherScatter::pack_lane(&mut orientation_a, lane, pair.orientation_a);
            GatherScatter::pack_lane(&mut orientation_b, lane, pair.orientation_b);
            GatherScatter::pack_lane(
                &mut relative_linear_velocity_a,
                lane,
                pair.relative_linear_velocity_a,
            );
            GatherScatter::pack_lane(&mut angular_velocity_a, lane, pair.angular_velocity_a);
            GatherScatter::pack_lane(&mut angular_velocity_b, lane, pair.angular_velocity_b);
            *GatherScatter::get_mut(&mut maximum_allowed_expansion, lane) = pair.maximum_expansion;
            GatherScatter::pack_lane(&mut local_poses_a, lane, subpair.child.local_pose());
        }

        let frames = LocalChildFramesWide::compose(
            &local_poses_a,
            &orientation_a,
            &offset_b,
            &orientation_b,
            &relative_linear_velocity_a,
        );

        let mut mins = Vector3Wide::default();
        let mut maxes = Vector3Wide::default();
        let mut maximum_radius = Vector::default();
        let mut maximum_angular_expansion = Vector::default();
        for (lane, subpair) in subpairs.iter().enumerate() {
            let bounds = shapes.compute_bounds(
                subpair.child.shape_index,
                GatherScatter::unpack_lane(&frames.local_orientation_a, lane),
            )?;
            GatherScatter::pack_lane(&mut mins, lane, bounds.min);
            GatherScatter::pack_lane(&mut maxes, lane, bounds.max);
            *GatherScatter::get_mut(&mut maximum_radius, lane) = bounds.maximum_radius;
            *GatherScatter::get_mut(&mut maximum_angular_expansion, lane) =
                bounds.maximum_angular_expansion;
        }

        BoundingBoxHelpers::expand_local_bounding_boxes(
            &mut mins,
            &mut maxes,
            frames.radius_a,
            &frames.local_position_a,
            &frames.local_relative_linear_velocity_a,
            &angular_velocity_a,
            &angular_velocity_b,
            dt,
            maximum_radius,
            maximum_angular_expansion,
            maximum_allowed_expansion,
        );

        for (lane, query) in queries.iter_mut().enumerate() {
            query.min = GatherScatter::unpack_lane(&mins, lane);
            query.max = GatherScatter::unpack_lane(&maxes, lane);
        }
        Ok(())
    }

    fn compute_subpair_bounds(
        subpair: &SubpairData<'_, TCompoundA>,
        shapes: &Shapes,
        dt: f32,
        query: &mut OverlapQueryForPair<'_>,
    ) -> Result<(), ShapesError> {
        let pair = subpair.pair;
        let frame = LocalChildFrame::compose(
            &subpair.child.local_pose(),
            pair.orientation_a,
            pair.offset_b,
            pair.orientation_b,
            pair.relative_linear_velocity_a,
        );
        let bounds = shapes.compute_bounds(subpair.child.shape_index, frame.local_orientation_a)?;
        query.min = bounds.min;
        query.max = bounds.max;
        BoundingBoxHelpers::expand_local_bounding_box(
            &mut query.min,
            &mut query.max,
            frame.radius_a,
            frame.local_position_a,
            frame.local_relative_linear_velocity_a,
            pair.angular_velocity_a,
            pair.angular_velocity_b,
            dt,
            bounds.maximum_radius,
            bounds.maximum_angular_expansion,
            pair.maximum_expansion,
        );
        Ok(())
    }

    fn compute_query_bounds(
        &self,
        subpairs: &[SubpairData<'_, TCompoundA>],
        shapes: &Shapes,
        dt: f32,
        queries: &mut [OverlapQueryForPair<'_>],
    ) -> Result<(), ShapesError> {
        match self.settings.bounds_path {
            BoundsPath::Wide => {
                let mut batches = subpairs.chunks_exact(LANES);
                let mut query_batches = queries.chunks_exact_mut(LANES);
                for (batch, query_batch) in (&mut batches).zip(&mut query_batches) {
                    Self::compute_batch_bounds_wide(batch, shapes, dt, query_batch)?;
                }
                for (subpair, query) in batches
                    .remainder()
                    .iter()
                    .zip(query_batches.into_remainder())
                {
                    Self::compute_subpair_bounds(subpair, shapes, dt, query)?;
                }
            }
            BoundsPath::Scalar => {
                for (subpair, query) in subpairs.iter().zip(queries.iter_mut()) {
                    Self::compute_subpair_bounds(subpair, shapes, dt, query)?;
                }
            }
        }
        Ok(())
    }

    /// Hands the queries to B's implementation, one batched call per run of entries sharing a container type.
    fn dispatch_queries(
        queries: &[OverlapQueryForPair<'_>],
        pool: &mut BufferPool,
        shapes: &Shapes,
        overlaps: &mut CompoundPairOverlaps,
    ) -> Result<(), ShapesError> {
        let child_overlaps = overlaps.child_overlaps_mut();
        let mut run_start = 0;
        while run_start < queries.len() {
            let type_id = queries[run_start].container.shape_type_id();
            let run_length = queries[run_start..]
                .iter()
                .take_while(|query| query.container.shape_type_id() == type_id)
                .count();
            let run = run_start..run_start + run_length;
            // Any container of the run can serve as the source of the implementation.
            queries[run_start].container.find_local_overlaps_batch(
                &queries[run.clone()],
                pool,
                shapes,
                &mut child_overlaps[run.clone()],
            )?;
            run_start = run.end;
        }
        Ok(())
    }
}

impl<TCompoundA: ICompoundShape + ?Sized> ICompoundPairOverlapFinder<TCompoundA>
    for CompoundPairOverlapFinder<TCompoundA>
{
    fn find_local_overlaps(
        &self,
        pairs: &[BoundsTestedPair<'_, TCompoundA>],
        pool: &mut BufferPool,
        shapes: &Shapes,
        dt: f32,
    ) -> Result<CompoundPairOverlaps, ShapesError> {
        let total_compound_child_count: usize = pairs.iter().map(|pair| pair.a.child_count()).sum();
        let mut overlaps = CompoundPairOverlaps::new(pool, pairs.len(), total_compound_child_count);
        if total_compound_child_count == 0 {
            for _ in pairs {
                overlaps.create_pair_overlaps(0);
            }
            debug!(
                "No compound children across {} pairs; skipping overlap queries.",
                pairs.len()
            );
            return Ok(overlaps);
        }
        trace!(
            "Finding local overlaps for {} pairs with {} compound children.",
            pairs.len(),
            total_compound_child_count
        );

        let mut subpair_data = Vec::with_capacity(total_compound_child_count);
        let mut queries = Vec::with_capacity(total_compound_child_count);
        for pair in pairs {
            let child_count = pair.a.child_count();
            overlaps.create_pair_overlaps(child_count);
            for j in 0..child_count {
                overlaps.get_overlaps_for_pair(subpair_data.len()).child_index = j;
                queries.push(OverlapQueryForPair {
                    container: pair.b,
                    min: Vec3::ZERO,
                    max: Vec3::ZERO,
                });
                subpair_data.push(SubpairData {
                    pair,
                    child: pair.a.get_child(j),
                });
            }
        }

        let result = self
            .compute_query_bounds(&subpair_data, shapes, dt, &mut queries)
            .and_then(|()| Self::dispatch_queries(&queries, pool, shapes, &mut overlaps));
        match result {
            Ok(()) => Ok(overlaps),
            Err(error) => {
                debug!("Compound pair overlap finding failed: {error}");
                overlaps.dispose(pool);
                Err(error)
            }
        }
    }
}
