pub mod compound_pair_overlap_finder;
pub mod compound_pair_overlaps;

pub use compound_pair_overlap_finder::{
    BoundsPath, BoundsTestedPair, CompoundOverlapFinder, CompoundPairOverlapFinder,
    ICompoundPairOverlapFinder, OverlapFinderSettings,
};
pub use compound_pair_overlaps::{
    ChildOverlapsCollection, CompoundPairOverlaps, ICollisionTaskSubpairOverlaps,
    OverlapQueryForPair,
};
