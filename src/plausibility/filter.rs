//! Plausibility filter contract and traversal strategies
//!
//! ## Table of Contents
//! - **PlausibilityFilter**: Whole-rupture / single-jump rule contract
//! - **JumpRule**: Rule expressed purely per jump
//! - **apply_to_all_jumps**: Recursive traversal of the primary strand and every splay
//! - **apply_to_junctions**: Flat traversal of the primary strand only
//! - **JumpPlausibilityFilter / JunctionPlausibilityFilter**: Filters built from a `JumpRule`
//!   with one of the two traversals

use crate::error::{PlausibilityError, Result};
use crate::jump::Jump;
use crate::rupture::ClusterRupture;
use tracing::{debug, info};

use super::PlausibilityResult;

/// Rule that accepts or rejects a candidate rupture.
///
/// Filters are shared read-only across worker threads and must not keep any
/// per-rupture state. A filter that fails internally returns `Err`; that is
/// never folded into a verdict.
pub trait PlausibilityFilter: Send + Sync {
    /// Human readable filter name
    fn name(&self) -> &str;

    /// Short name for logs and metric labels
    fn short_name(&self) -> &str {
        self.name()
    }

    /// Evaluate the whole rupture, splays included.
    ///
    /// With `verbose` set the filter traces each decision through `tracing`.
    /// The verdict must be the same either way.
    fn apply(&self, rupture: &ClusterRupture, verbose: bool) -> Result<PlausibilityResult>;

    /// Evaluate the rule at a single jump, in the context of `rupture`
    fn test(
        &self,
        _rupture: &ClusterRupture,
        _jump: &Jump,
        _verbose: bool,
    ) -> Result<PlausibilityResult> {
        Err(PlausibilityError::unsupported(format!(
            "{} cannot test individual jumps",
            self.name()
        )))
    }
}

/// Rule defined entirely by a per-jump test
pub trait JumpRule: Send + Sync {
    /// Human readable rule name
    fn name(&self) -> &str;

    /// Short name for logs and metric labels
    fn short_name(&self) -> &str {
        self.name()
    }

    /// Test a single jump. `rupture` is the strand the jump belongs to, or the
    /// parent strand for a splay attachment.
    fn test_jump(
        &self,
        rupture: &ClusterRupture,
        jump: &Jump,
        verbose: bool,
    ) -> Result<PlausibilityResult>;
}

fn test_traced<R: JumpRule + ?Sized>(
    rule: &R,
    rupture: &ClusterRupture,
    jump: &Jump,
    verbose: bool,
) -> Result<PlausibilityResult> {
    let result = rule.test_jump(rupture, jump, verbose)?;
    if verbose {
        info!(filter = rule.short_name(), jump = %jump, result = %result, "Jump tested");
    }
    Ok(result)
}

/// Test `rule` at every jump of the rupture tree.
///
/// Primary-strand jumps are tested first, in order. Each splay's attachment
/// jump is then tested before the splay itself is recursed into. Evaluation
/// stops at the first non-continuable result, so nothing past a failing
/// jump or a failing fork is tested.
pub fn apply_to_all_jumps<R: JumpRule + ?Sized>(
    rule: &R,
    rupture: &ClusterRupture,
    verbose: bool,
) -> Result<PlausibilityResult> {
    let mut result = PlausibilityResult::Pass;

    for jump in rupture.internal_jumps() {
        result &= test_traced(rule, rupture, jump, verbose)?;
        if !result.can_continue() {
            debug!(
                filter = rule.short_name(),
                jump = %jump,
                result = %result,
                "Short-circuit on strand jump"
            );
            return Ok(result);
        }
    }

    for (jump, splay) in rupture.splays() {
        result &= test_traced(rule, rupture, jump, verbose)?;
        if !result.can_continue() {
            debug!(
                filter = rule.short_name(),
                jump = %jump,
                result = %result,
                "Short-circuit on splay attachment"
            );
            return Ok(result);
        }

        result &= apply_to_all_jumps(rule, splay, verbose)?;
        if !result.can_continue() {
            return Ok(result);
        }
    }

    Ok(result)
}

/// Test `rule` at each jump of the primary strand only, in order, stopping
/// at the first non-continuable result. Splays are not visited.
pub fn apply_to_junctions<R: JumpRule + ?Sized>(
    rule: &R,
    rupture: &ClusterRupture,
    verbose: bool,
) -> Result<PlausibilityResult> {
    let mut result = PlausibilityResult::Pass;

    for jump in rupture.jumps() {
        result &= test_traced(rule, rupture, jump, verbose)?;
        if !result.can_continue() {
            debug!(
                filter = rule.short_name(),
                jump = %jump,
                result = %result,
                "Short-circuit on junction"
            );
            return Ok(result);
        }
    }

    Ok(result)
}

/// Filter applying a [`JumpRule`] at every jump, recursing into splays
#[derive(Debug, Clone)]
pub struct JumpPlausibilityFilter<R> {
    rule: R,
}

impl<R: JumpRule> JumpPlausibilityFilter<R> {
    /// Wrap a jump rule with the recursive traversal
    pub fn new(rule: R) -> Self {
        Self { rule }
    }

    /// The wrapped rule
    pub fn rule(&self) -> &R {
        &self.rule
    }
}

impl<R: JumpRule> PlausibilityFilter for JumpPlausibilityFilter<R> {
    fn name(&self) -> &str {
        self.rule.name()
    }

    fn short_name(&self) -> &str {
        self.rule.short_name()
    }

    fn apply(&self, rupture: &ClusterRupture, verbose: bool) -> Result<PlausibilityResult> {
        apply_to_all_jumps(&self.rule, rupture, verbose)
    }

    fn test(
        &self,
        rupture: &ClusterRupture,
        jump: &Jump,
        verbose: bool,
    ) -> Result<PlausibilityResult> {
        self.rule.test_jump(rupture, jump, verbose)
    }
}

/// Filter applying a [`JumpRule`] only at the junctions of the primary strand
#[derive(Debug, Clone)]
pub struct JunctionPlausibilityFilter<R> {
    rule: R,
}

impl<R: JumpRule> JunctionPlausibilityFilter<R> {
    /// Wrap a jump rule with the flat primary-strand traversal
    pub fn new(rule: R) -> Self {
        Self { rule }
    }

    /// The wrapped rule
    pub fn rule(&self) -> &R {
        &self.rule
    }
}

impl<R: JumpRule> PlausibilityFilter for JunctionPlausibilityFilter<R> {
    fn name(&self) -> &str {
        self.rule.name()
    }

    fn short_name(&self) -> &str {
        self.rule.short_name()
    }

    fn apply(&self, rupture: &ClusterRupture, verbose: bool) -> Result<PlausibilityResult> {
        apply_to_junctions(&self.rule, rupture, verbose)
    }

    fn test(
        &self,
        rupture: &ClusterRupture,
        jump: &Jump,
        verbose: bool,
    ) -> Result<PlausibilityResult> {
        self.rule.test_jump(rupture, jump, verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cluster, jump, splayed_rupture, splayed_rupture_with, strand};
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;
    use PlausibilityResult::*;

    /// Rule that records every jump it is asked about
    struct RecordingRule {
        tested: Mutex<Vec<Jump>>,
        verdict: Box<dyn Fn(&Jump) -> PlausibilityResult + Send + Sync>,
    }

    impl RecordingRule {
        fn new(verdict: impl Fn(&Jump) -> PlausibilityResult + Send + Sync + 'static) -> Self {
            Self {
                tested: Mutex::new(Vec::new()),
                verdict: Box::new(verdict),
            }
        }

        fn always_pass() -> Self {
            Self::new(|_| Pass)
        }

        fn calls(&self) -> usize {
            self.tested.lock().len()
        }

        fn tested(&self) -> Vec<Jump> {
            self.tested.lock().clone()
        }
    }

    impl JumpRule for RecordingRule {
        fn name(&self) -> &str {
            "Recording"
        }

        fn test_jump(
            &self,
            _rupture: &ClusterRupture,
            jump: &Jump,
            _verbose: bool,
        ) -> Result<PlausibilityResult> {
            self.tested.lock().push(jump.clone());
            Ok((self.verdict)(jump))
        }
    }

    struct BrokenRule;

    impl JumpRule for BrokenRule {
        fn name(&self) -> &str {
            "Broken"
        }

        fn test_jump(
            &self,
            _rupture: &ClusterRupture,
            _jump: &Jump,
            _verbose: bool,
        ) -> Result<PlausibilityResult> {
            Err(PlausibilityError::filter("distance table missing"))
        }
    }

    struct TotalOnly;

    impl PlausibilityFilter for TotalOnly {
        fn name(&self) -> &str {
            "Total only"
        }

        fn apply(&self, _rupture: &ClusterRupture, _verbose: bool) -> Result<PlausibilityResult> {
            Ok(Pass)
        }
    }

    fn long_strand(n: usize) -> ClusterRupture {
        let clusters: Vec<_> = (0..=n as u32).map(|i| cluster(i, &[i * 10, i * 10 + 1])).collect();
        let distances: Vec<f64> = (0..n).map(|i| i as f64).collect();
        strand(&clusters, &distances)
    }

    #[test]
    fn test_all_pass_visits_every_jump_once() {
        let rupture = splayed_rupture();
        let filter = JumpPlausibilityFilter::new(RecordingRule::always_pass());

        assert_eq!(filter.apply(&rupture, false).unwrap(), Pass);
        // 2 primary + 1 attachment + 1 inside the splay
        assert_eq!(filter.rule().calls(), 4);

        let tested: HashSet<Jump> = filter.rule().tested().into_iter().collect();
        let expected: HashSet<Jump> = rupture.all_jumps().into_iter().cloned().collect();
        assert_eq!(tested, expected);
    }

    #[test]
    fn test_primary_jumps_tested_before_splays() {
        let rupture = splayed_rupture();
        let filter = JumpPlausibilityFilter::new(RecordingRule::always_pass());
        filter.apply(&rupture, false).unwrap();

        let distances: Vec<f64> = filter.rule().tested().iter().map(|j| j.distance()).collect();
        assert_eq!(distances, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_hard_stop_on_kth_jump() {
        let n = 6;
        let rupture = long_strand(n);
        for k in 0..n {
            let filter = JumpPlausibilityFilter::new(RecordingRule::new(move |j| {
                if j.distance() == k as f64 {
                    FailHardStop
                } else {
                    Pass
                }
            }));
            assert_eq!(filter.apply(&rupture, false).unwrap(), FailHardStop);
            assert_eq!(filter.rule().calls(), k + 1);
        }
    }

    #[test]
    fn test_primary_failure_skips_splays() {
        let rupture = splayed_rupture();
        let filter = JumpPlausibilityFilter::new(RecordingRule::new(|j| {
            if j.distance() == 2.0 {
                FailHardStop
            } else {
                Pass
            }
        }));
        assert_eq!(filter.apply(&rupture, false).unwrap(), FailHardStop);
        assert_eq!(filter.rule().calls(), 2);
    }

    #[test]
    fn test_failed_attachment_skips_splay_interior() {
        let rupture = splayed_rupture();
        let (attachment, splay) = &rupture.splays()[0];
        let attachment = attachment.clone();
        let interior: Vec<Jump> = splay.all_jumps().into_iter().cloned().collect();

        let filter = JumpPlausibilityFilter::new(RecordingRule::new(move |j| {
            if *j == attachment {
                FailSoft
            } else {
                Pass
            }
        }));
        assert_eq!(filter.apply(&rupture, false).unwrap(), FailSoft);
        assert_eq!(filter.rule().calls(), 3);
        for jump in filter.rule().tested() {
            assert!(!interior.contains(&jump));
        }
    }

    #[test]
    fn test_soft_failure_inside_splay_propagates() {
        let rupture = splayed_rupture_with(&[1.0, 2.0], 3.0, 9.0);
        let filter = JumpPlausibilityFilter::new(RecordingRule::new(|j| {
            if j.distance() > 5.0 {
                FailSoft
            } else {
                Pass
            }
        }));
        assert_eq!(filter.apply(&rupture, false).unwrap(), FailSoft);
        assert_eq!(filter.rule().calls(), 4);
    }

    #[test]
    fn test_nested_splays_are_visited() {
        let a = cluster(1, &[0, 1, 2]);
        let d = cluster(4, &[8, 9, 10]);
        let f = cluster(6, &[20, 21]);
        let rupture = crate::ClusterRupture::single(Arc::clone(&a))
            .take(&crate::test_support::jump_from(&a, 1, &d, 1.0))
            .unwrap()
            .take(&crate::test_support::jump_from(&d, 9, &f, 2.0))
            .unwrap();
        assert_eq!(rupture.total_num_splays(), 2);

        let filter = JumpPlausibilityFilter::new(RecordingRule::always_pass());
        assert_eq!(filter.apply(&rupture, false).unwrap(), Pass);
        assert_eq!(filter.rule().calls(), 2);
    }

    #[test]
    fn test_junction_filter_never_visits_splays() {
        let rupture = splayed_rupture();
        let splay_jumps: Vec<Jump> = rupture
            .splays()
            .iter()
            .flat_map(|(j, s)| std::iter::once(j.clone()).chain(s.all_jumps().into_iter().cloned()))
            .collect();

        let filter = JunctionPlausibilityFilter::new(RecordingRule::always_pass());
        assert_eq!(filter.apply(&rupture, false).unwrap(), Pass);
        assert_eq!(filter.rule().tested(), rupture.jumps().to_vec());
        for jump in filter.rule().tested() {
            assert!(!splay_jumps.contains(&jump));
        }
    }

    #[test]
    fn test_junction_short_circuit() {
        let rupture = long_strand(5);
        let filter = JunctionPlausibilityFilter::new(RecordingRule::new(|j| {
            if j.distance() >= 1.0 {
                FailSoft
            } else {
                Pass
            }
        }));
        assert_eq!(filter.apply(&rupture, false).unwrap(), FailSoft);
        assert_eq!(filter.rule().calls(), 2);
    }

    #[test]
    fn test_single_cluster_rupture_passes_without_tests() {
        let rupture = crate::ClusterRupture::single(cluster(1, &[0, 1]));
        let filter = JumpPlausibilityFilter::new(RecordingRule::always_pass());
        assert_eq!(filter.apply(&rupture, false).unwrap(), Pass);
        assert_eq!(filter.rule().calls(), 0);
    }

    #[test]
    fn test_rule_error_propagates() {
        let rupture = splayed_rupture();
        let err = JumpPlausibilityFilter::new(BrokenRule).apply(&rupture, false).unwrap_err();
        assert!(matches!(err, PlausibilityError::Filter(_)));

        let err = JunctionPlausibilityFilter::new(BrokenRule).apply(&rupture, false).unwrap_err();
        assert!(matches!(err, PlausibilityError::Filter(_)));
    }

    #[test]
    fn test_single_jump_test_delegates_to_rule() {
        let a = cluster(1, &[0, 1]);
        let b = cluster(2, &[2, 3]);
        let rupture = strand(&[Arc::clone(&a), Arc::clone(&b)], &[3.0]);
        let filter = JunctionPlausibilityFilter::new(RecordingRule::always_pass());
        assert_eq!(filter.test(&rupture, &jump(&a, &b, 3.0), false).unwrap(), Pass);
        assert_eq!(filter.rule().calls(), 1);
    }

    #[test]
    fn test_whole_rupture_filter_rejects_single_jump_test() {
        let rupture = splayed_rupture();
        let err = TotalOnly.test(&rupture, &rupture.jumps()[0], false).unwrap_err();
        assert!(matches!(err, PlausibilityError::Unsupported(_)));
    }

    #[test]
    fn test_verbose_does_not_change_verdict() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let rupture = splayed_rupture();
        let quiet = JumpPlausibilityFilter::new(RecordingRule::new(|j| {
            if j.distance() == 3.0 {
                FailSoft
            } else {
                Pass
            }
        }));
        let loud = JumpPlausibilityFilter::new(RecordingRule::new(|j| {
            if j.distance() == 3.0 {
                FailSoft
            } else {
                Pass
            }
        }));
        assert_eq!(quiet.apply(&rupture, false).unwrap(), loud.apply(&rupture, true).unwrap());
        assert_eq!(quiet.rule().calls(), loud.rule().calls());
    }
}
