//! # Rupture Plausibility
//!
//! Plausibility evaluation for multi-fault earthquake ruptures. A candidate
//! rupture is a tree of connected fault-subsection clusters with optional
//! splays; a configurable list of filters decides whether it is plausible.
//!
//! ## Features
//!
//! - **Rupture trees**: Validated clusters, jumps and splayed ruptures
//! - **Ternary verdicts**: Pass, soft fail and hard stop, composed with AND
//! - **Traversals**: Recursive (all jumps) and junction-only rule application with early exit
//! - **Built-in filters**: Jump distance, cluster size, cluster and splay counts
//! - **Configuration**: Builder API or JSON, with a registry for custom filter types
//! - **Batch evaluation**: Parallel candidate screening with Rayon
//! - **Metrics**: Prometheus-compatible verdict counters and latency
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rupture_plausibility::{
//!     ClusterRupture, FaultSubsectionCluster, Jump, PlausibilityConfiguration, RuptureEvaluator,
//! };
//!
//! fn main() -> rupture_plausibility::Result<()> {
//!     let a = Arc::new(FaultSubsectionCluster::new(1u32, [0u32, 1, 2])?);
//!     let b = Arc::new(FaultSubsectionCluster::new(2u32, [3u32, 4])?);
//!     let jump = Jump::new(Arc::clone(&a), 2u32, Arc::clone(&b), 3u32, 3.2)?;
//!     let rupture = ClusterRupture::single(a).take(&jump)?;
//!
//!     let config = PlausibilityConfiguration::builder()
//!         .jump_distance(5.0)
//!         .max_clusters(8)
//!         .build()?;
//!     let evaluator = RuptureEvaluator::new(config);
//!
//!     println!("{} -> {}", rupture, evaluator.evaluate(&rupture, false)?);
//!     Ok(())
//! }
//! ```
//!
//! ## JSON configuration
//!
//! ```rust,no_run
//! use rupture_plausibility::PlausibilityConfig;
//!
//! fn main() -> rupture_plausibility::Result<()> {
//!     let config = PlausibilityConfig::from_json(
//!         r#"{"filters": [{"type": "jump_distance", "max_distance": 5.0}]}"#,
//!     )?
//!     .build()?;
//!     assert_eq!(config.len(), 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cluster;
pub mod error;
pub mod jump;
pub mod metrics;
pub mod plausibility;
pub mod rupture;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-exports for ergonomic API
pub use cluster::FaultSubsectionCluster;
pub use error::{PlausibilityError, Result};
pub use jump::Jump;
pub use metrics::{PlausibilityMetrics, Timer};
pub use plausibility::{
    apply_to_all_jumps, apply_to_junctions, EvaluationReport, FilterRegistry,
    JumpPlausibilityFilter, JumpRule, JunctionPlausibilityFilter, PlausibilityConfig,
    PlausibilityConfiguration, PlausibilityFilter, PlausibilityResult, RuptureEvaluator,
};
pub use rupture::ClusterRupture;
pub use types::{ParentId, SectionId};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cluster::FaultSubsectionCluster;
    pub use crate::error::Result;
    pub use crate::jump::Jump;
    pub use crate::plausibility::{
        JumpRule, PlausibilityConfiguration, PlausibilityFilter, PlausibilityResult,
        RuptureEvaluator,
    };
    pub use crate::rupture::ClusterRupture;
    pub use crate::types::{ParentId, SectionId};
}
