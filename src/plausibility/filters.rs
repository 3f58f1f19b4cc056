//! Built-in plausibility filters
//!
//! Thresholds are plain configuration data. Filters judged per jump are
//! [`JumpRule`]s wrapped by one of the two traversal strategies; filters that
//! need the whole rupture implement [`PlausibilityFilter`] directly.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::filter::{
    JumpPlausibilityFilter, JumpRule, JunctionPlausibilityFilter, PlausibilityFilter,
};
use super::PlausibilityResult;
use crate::error::{PlausibilityError, Result};
use crate::jump::Jump;
use crate::rupture::ClusterRupture;

/// Rejects any jump longer than a maximum separation distance
///
/// Only [`new`](Self::new) builds one, so the threshold is always valid.
#[derive(Debug, Clone, Serialize)]
pub struct JumpDistanceRule {
    max_distance: f64,
    failure: PlausibilityResult,
}

impl JumpDistanceRule {
    /// Create a rule that hard-stops on jumps longer than `max_distance`
    pub fn new(max_distance: f64) -> Result<Self> {
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(PlausibilityError::config(format!(
                "max jump distance must be finite and non-negative, got {}",
                max_distance
            )));
        }
        Ok(Self {
            max_distance,
            failure: PlausibilityResult::FailHardStop,
        })
    }

    /// Override the failure verdict
    pub fn with_failure(mut self, failure: PlausibilityResult) -> Self {
        self.failure = failure;
        self
    }

    /// Maximum allowed jump distance (km)
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Verdict for a jump that is too long
    pub fn failure(&self) -> PlausibilityResult {
        self.failure
    }
}

impl JumpRule for JumpDistanceRule {
    fn name(&self) -> &str {
        "Maximum Jump Distance"
    }

    fn short_name(&self) -> &str {
        "JumpDist"
    }

    fn test_jump(
        &self,
        _rupture: &ClusterRupture,
        jump: &Jump,
        verbose: bool,
    ) -> Result<PlausibilityResult> {
        if jump.distance() > self.max_distance {
            if verbose {
                info!(
                    jump = %jump,
                    max_distance = self.max_distance,
                    "Jump exceeds maximum distance"
                );
            }
            return Ok(self.failure);
        }
        Ok(PlausibilityResult::Pass)
    }
}

/// Jump distance filter over every jump, splays included
pub type JumpDistanceFilter = JumpPlausibilityFilter<JumpDistanceRule>;

/// Requires every cluster at a junction to have a minimum number of subsections.
///
/// The last cluster of the strand can still grow, so a short last cluster is
/// a soft failure. A short cluster anywhere else is a hard stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinSectsPerParentRule {
    /// Minimum subsections per cluster
    pub min_sects: usize,
}

impl MinSectsPerParentRule {
    /// Create the rule
    pub fn new(min_sects: usize) -> Self {
        Self { min_sects }
    }
}

impl JumpRule for MinSectsPerParentRule {
    fn name(&self) -> &str {
        "Minimum Subsections Per Parent"
    }

    fn short_name(&self) -> &str {
        "MinSectsPerParent"
    }

    fn test_jump(
        &self,
        rupture: &ClusterRupture,
        jump: &Jump,
        verbose: bool,
    ) -> Result<PlausibilityResult> {
        let mut result = PlausibilityResult::Pass;
        for cluster in [jump.from_cluster(), jump.to_cluster()] {
            if cluster.len() >= self.min_sects {
                continue;
            }
            let is_tip = rupture
                .clusters()
                .last()
                .map(|last| **last == **cluster)
                .unwrap_or(false);
            let verdict = if is_tip {
                PlausibilityResult::FailSoft
            } else {
                PlausibilityResult::FailHardStop
            };
            if verbose {
                info!(
                    cluster = %cluster,
                    len = cluster.len(),
                    min_sects = self.min_sects,
                    result = %verdict,
                    "Cluster below minimum subsection count"
                );
            }
            result &= verdict;
        }
        Ok(result)
    }
}

/// Minimum subsections filter over the primary strand's junctions
pub type MinSectsPerParentFilter = JunctionPlausibilityFilter<MinSectsPerParentRule>;

/// Caps the total number of clusters in a rupture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxClustersFilter {
    /// Maximum clusters across the whole tree
    pub max_clusters: usize,
}

impl MaxClustersFilter {
    /// Create the filter
    pub fn new(max_clusters: usize) -> Self {
        Self { max_clusters }
    }
}

impl PlausibilityFilter for MaxClustersFilter {
    fn name(&self) -> &str {
        "Maximum Cluster Count"
    }

    fn short_name(&self) -> &str {
        "MaxClusters"
    }

    fn apply(&self, rupture: &ClusterRupture, verbose: bool) -> Result<PlausibilityResult> {
        let count = rupture.total_num_clusters();
        if count > self.max_clusters {
            if verbose {
                info!(count, max_clusters = self.max_clusters, "Too many clusters");
            }
            return Ok(PlausibilityResult::FailHardStop);
        }
        Ok(PlausibilityResult::Pass)
    }
}

/// True if taking `jump` would fork a new splay somewhere in the tree.
///
/// Mirrors [`ClusterRupture::take`]: a jump from an end section of the last
/// cluster of a strand extends that strand, a jump from any other section of
/// the strand forks, and a jump from inside a splay is decided by that splay.
fn adds_splay(rupture: &ClusterRupture, jump: &Jump) -> bool {
    let from = jump.from_section();
    if rupture.contains_internal(from) {
        if rupture.internal_jumps().contains(jump) || rupture.splay(jump).is_some() {
            return false;
        }
        let extends = rupture
            .clusters()
            .last()
            .map(|last| last.is_end_section(from))
            .unwrap_or(false);
        return !extends;
    }
    rupture
        .splays()
        .iter()
        .find(|(_, splay)| splay.contains(from))
        .map(|(_, splay)| adds_splay(splay, jump))
        .unwrap_or(false)
}

/// Caps the total number of splays in a rupture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplayCountFilter {
    /// Maximum splays across the whole tree
    pub max_splays: usize,
}

impl SplayCountFilter {
    /// Create the filter
    pub fn new(max_splays: usize) -> Self {
        Self { max_splays }
    }
}

impl PlausibilityFilter for SplayCountFilter {
    fn name(&self) -> &str {
        "Splay Count"
    }

    fn short_name(&self) -> &str {
        "SplayCount"
    }

    fn apply(&self, rupture: &ClusterRupture, verbose: bool) -> Result<PlausibilityResult> {
        let count = rupture.total_num_splays();
        if count > self.max_splays {
            if verbose {
                info!(count, max_splays = self.max_splays, "Too many splays");
            }
            return Ok(PlausibilityResult::FailHardStop);
        }
        Ok(PlausibilityResult::Pass)
    }

    fn test(
        &self,
        rupture: &ClusterRupture,
        jump: &Jump,
        verbose: bool,
    ) -> Result<PlausibilityResult> {
        let after = rupture.total_num_splays() + usize::from(adds_splay(rupture, jump));
        if after > self.max_splays {
            if verbose {
                info!(
                    jump = %jump,
                    count = after,
                    max_splays = self.max_splays,
                    "Jump exceeds splay budget"
                );
            }
            return Ok(PlausibilityResult::FailHardStop);
        }
        Ok(PlausibilityResult::Pass)
    }
}

/// Caps the summed distance of every jump in the rupture tree
#[derive(Debug, Clone, Serialize)]
pub struct CumulativeJumpDistanceFilter {
    max_total: f64,
}

impl CumulativeJumpDistanceFilter {
    /// Create the filter
    pub fn new(max_total: f64) -> Result<Self> {
        if !max_total.is_finite() || max_total < 0.0 {
            return Err(PlausibilityError::config(format!(
                "max cumulative jump distance must be finite and non-negative, got {}",
                max_total
            )));
        }
        Ok(Self { max_total })
    }

    /// Maximum summed jump distance (km)
    pub fn max_total(&self) -> f64 {
        self.max_total
    }
}

impl PlausibilityFilter for CumulativeJumpDistanceFilter {
    fn name(&self) -> &str {
        "Cumulative Jump Distance"
    }

    fn short_name(&self) -> &str {
        "CumJumpDist"
    }

    fn apply(&self, rupture: &ClusterRupture, verbose: bool) -> Result<PlausibilityResult> {
        let total: f64 = rupture.all_jumps().iter().map(|j| j.distance()).sum();
        if total > self.max_total {
            if verbose {
                info!(total, max_total = self.max_total, "Cumulative jump distance exceeded");
            }
            return Ok(PlausibilityResult::FailHardStop);
        }
        Ok(PlausibilityResult::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cluster, jump, splayed_rupture, splayed_rupture_with, strand};
    use std::sync::Arc;
    use PlausibilityResult::*;

    fn two_cluster(distance: f64) -> ClusterRupture {
        strand(&[cluster(1, &[0, 1]), cluster(2, &[2, 3])], &[distance])
    }

    #[test]
    fn test_jump_distance_scenario() {
        let filter = JumpDistanceFilter::new(JumpDistanceRule::new(5.0).unwrap());

        let near = two_cluster(3.0);
        assert_eq!(filter.test(&near, &near.jumps()[0], false).unwrap(), Pass);
        assert_eq!(filter.apply(&near, false).unwrap(), Pass);

        let far = two_cluster(7.0);
        assert_eq!(filter.test(&far, &far.jumps()[0], false).unwrap(), FailHardStop);
        assert_eq!(filter.apply(&far, false).unwrap(), FailHardStop);
    }

    #[test]
    fn test_jump_distance_boundary_passes() {
        let filter = JumpDistanceFilter::new(JumpDistanceRule::new(5.0).unwrap());
        assert_eq!(filter.apply(&two_cluster(5.0), false).unwrap(), Pass);
    }

    #[test]
    fn test_jump_distance_checks_splays() {
        let filter = JumpDistanceFilter::new(JumpDistanceRule::new(5.0).unwrap());
        let long_attachment = splayed_rupture_with(&[1.0, 2.0], 6.0, 1.0);
        assert_eq!(filter.apply(&long_attachment, false).unwrap(), FailHardStop);

        let long_inside = splayed_rupture_with(&[1.0, 2.0], 1.0, 6.0);
        assert_eq!(filter.apply(&long_inside, false).unwrap(), FailHardStop);
    }

    #[test]
    fn test_jump_distance_custom_failure() {
        let rule = JumpDistanceRule::new(1.0).unwrap().with_failure(FailSoft);
        let filter = JumpDistanceFilter::new(rule);
        assert_eq!(filter.apply(&two_cluster(2.0), false).unwrap(), FailSoft);
    }

    #[test]
    fn test_jump_distance_rejects_bad_threshold() {
        assert!(JumpDistanceRule::new(-1.0).is_err());
        assert!(JumpDistanceRule::new(f64::NAN).is_err());
    }

    #[test]
    fn test_min_sects_soft_fail_on_tip() {
        let a = cluster(1, &[0, 1, 2]);
        let short = cluster(2, &[3]);
        let rupture = strand(&[a, short], &[1.0]);
        let filter = MinSectsPerParentFilter::new(MinSectsPerParentRule::new(2));
        assert_eq!(filter.apply(&rupture, false).unwrap(), FailSoft);
    }

    #[test]
    fn test_min_sects_hard_stop_inside_strand() {
        let a = cluster(1, &[0, 1, 2]);
        let short = cluster(2, &[3]);
        let c = cluster(3, &[4, 5]);
        let rupture = strand(&[a, short, c], &[1.0, 1.0]);
        let filter = MinSectsPerParentFilter::new(MinSectsPerParentRule::new(2));
        assert_eq!(filter.apply(&rupture, false).unwrap(), FailHardStop);
    }

    #[test]
    fn test_min_sects_ignores_splays() {
        // the splay's clusters have 2 sections, below the threshold of 3,
        // but junction traversal only looks at the primary strand
        let a = cluster(1, &[0, 1, 2]);
        let b = cluster(2, &[3, 4, 5]);
        let d = cluster(4, &[8, 9]);
        let main = strand(&[Arc::clone(&a), Arc::clone(&b)], &[1.0]);
        let rupture = ClusterRupture::new(
            main.clusters().to_vec(),
            main.internal_jumps().to_vec(),
            vec![(
                crate::test_support::jump_from(&a, 1, &d, 1.0),
                ClusterRupture::single(d),
            )],
        )
        .unwrap();
        let filter = MinSectsPerParentFilter::new(MinSectsPerParentRule::new(3));
        assert_eq!(filter.apply(&rupture, false).unwrap(), Pass);
    }

    #[test]
    fn test_max_clusters() {
        let rupture = splayed_rupture();
        assert_eq!(MaxClustersFilter::new(5).apply(&rupture, false).unwrap(), Pass);
        assert_eq!(MaxClustersFilter::new(4).apply(&rupture, false).unwrap(), FailHardStop);
    }

    #[test]
    fn test_splay_count() {
        let rupture = splayed_rupture();
        assert_eq!(SplayCountFilter::new(1).apply(&rupture, false).unwrap(), Pass);
        assert_eq!(SplayCountFilter::new(0).apply(&rupture, false).unwrap(), FailHardStop);
    }

    #[test]
    fn test_splay_count_single_jump() {
        let rupture = splayed_rupture();
        let filter = SplayCountFilter::new(1);
        // existing strand jump adds nothing
        assert_eq!(filter.test(&rupture, &rupture.jumps()[0], false).unwrap(), Pass);
        // existing splay attachment is already counted
        assert_eq!(filter.test(&rupture, &rupture.splays()[0].0, false).unwrap(), Pass);
        // a new fork would be the second splay
        let a = &rupture.clusters()[0];
        let g = cluster(7, &[30, 31]);
        let fork = crate::test_support::jump_from(a, 1, &g, 1.0);
        assert_eq!(filter.test(&rupture, &fork, false).unwrap(), FailHardStop);
    }

    #[test]
    fn test_splay_count_strand_extension_agrees_with_apply() {
        let a = cluster(1, &[0, 1]);
        let b = cluster(2, &[2, 3]);
        let c = cluster(3, &[4, 5]);
        let rupture = strand(&[a, Arc::clone(&b)], &[1.0]);
        let extend = jump(&b, &c, 1.0);
        let filter = SplayCountFilter::new(0);

        let grown = rupture.take(&extend).unwrap();
        assert_eq!(grown.total_num_splays(), 0);
        assert_eq!(filter.test(&rupture, &extend, false).unwrap(), Pass);
        assert_eq!(filter.apply(&grown, false).unwrap(), Pass);
    }

    #[test]
    fn test_splay_count_jumps_inside_splay() {
        let rupture = splayed_rupture();
        let filter = SplayCountFilter::new(1);
        let (_, splay) = &rupture.splays()[0];
        let d = Arc::clone(&splay.clusters()[0]);
        let e = Arc::clone(&splay.clusters()[1]);

        // continuing the splay's own strand keeps one splay
        let extend = jump(&e, &cluster(6, &[20, 21]), 1.0);
        let grown = rupture.take(&extend).unwrap();
        assert_eq!(filter.test(&rupture, &extend, false).unwrap(), Pass);
        assert_eq!(filter.apply(&grown, false).unwrap(), Pass);

        // existing jump inside the splay adds nothing
        assert_eq!(filter.test(&rupture, &splay.jumps()[0], false).unwrap(), Pass);

        // forking off the splay's first cluster is a second splay
        let fork = crate::test_support::jump_from(&d, 8, &cluster(7, &[30, 31]), 1.0);
        let forked = rupture.take(&fork).unwrap();
        assert_eq!(forked.total_num_splays(), 2);
        assert_eq!(filter.test(&rupture, &fork, false).unwrap(), FailHardStop);
        assert_eq!(filter.apply(&forked, false).unwrap(), FailHardStop);
    }

    #[test]
    fn test_cumulative_jump_distance() {
        // 1 + 2 + 3 + 4 = 10 km across the tree
        let rupture = splayed_rupture();
        let within = CumulativeJumpDistanceFilter::new(10.0).unwrap();
        assert_eq!(within.apply(&rupture, false).unwrap(), Pass);
        let below = CumulativeJumpDistanceFilter::new(9.5).unwrap();
        assert_eq!(below.apply(&rupture, false).unwrap(), FailHardStop);
    }

    #[test]
    fn test_whole_rupture_filters_do_not_test_jumps() {
        let rupture = two_cluster(1.0);
        let j = jump(&rupture.clusters()[0], &rupture.clusters()[1], 1.0);
        assert!(MaxClustersFilter::new(3).test(&rupture, &j, false).is_err());
    }
}
