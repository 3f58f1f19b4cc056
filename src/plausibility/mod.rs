//! Plausibility evaluation for cluster ruptures
//!
//! Rules that accept or reject a candidate rupture, the two ways of walking a
//! rupture tree with a per-jump rule, and composite evaluation of a
//! configured filter list.

pub mod config;
pub mod evaluator;
pub mod filter;
pub mod filters;
pub mod result;

pub use config::{
    BoxedFilter, FilterFactory, FilterRegistry, FilterSpec, PlausibilityConfig,
    PlausibilityConfiguration, PlausibilityConfigurationBuilder,
};
pub use evaluator::{EvaluationReport, FilterVerdict, RuptureEvaluator};
pub use filter::{
    apply_to_all_jumps, apply_to_junctions, JumpPlausibilityFilter, JumpRule,
    JunctionPlausibilityFilter, PlausibilityFilter,
};
pub use filters::{
    CumulativeJumpDistanceFilter, JumpDistanceFilter, JumpDistanceRule, MaxClustersFilter,
    MinSectsPerParentFilter, MinSectsPerParentRule, SplayCountFilter,
};
pub use result::PlausibilityResult;
