//! Aggregation of survey answers.
//!
//! Pure computation only; nothing in here performs I/O.

pub mod aggregator;
pub mod distribution;

pub use aggregator::*;
pub use distribution::{
    build_distribution, build_distribution_from_raw, distributions_by_scale, BucketOrder,
    DistributionBucket, ScaleDistribution,
};
