//! Composite rupture evaluation
//!
//! ## Table of Contents
//! - **RuptureEvaluator**: Runs a configuration's filters in order with one short-circuit
//! - **EvaluationReport**: Per-filter verdicts for a single rupture
//!
//! Filters are ANDed exactly as jumps are within a filter. The first
//! non-continuable verdict stops evaluation of the whole list, not just of one
//! filter.

use super::config::PlausibilityConfiguration;
use super::filter::PlausibilityFilter;
use super::PlausibilityResult;
use crate::error::Result;
use crate::metrics::{PlausibilityMetrics, Timer};
use crate::rupture::ClusterRupture;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Verdict of one filter within an evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterVerdict {
    /// Filter short name
    pub filter: String,
    /// Filter verdict
    pub result: PlausibilityResult,
}

/// Outcome of evaluating one rupture, with every filter verdict up to the stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    /// Combined verdict
    pub result: PlausibilityResult,
    /// Verdicts of the filters that ran, in order
    pub verdicts: Vec<FilterVerdict>,
    /// Short name of the filter that stopped evaluation, if any
    pub stopped_by: Option<String>,
}

/// Evaluates candidate ruptures against a filter configuration
pub struct RuptureEvaluator {
    config: PlausibilityConfiguration,
    metrics: Option<Arc<PlausibilityMetrics>>,
    evaluated: AtomicU64,
    passed: AtomicU64,
}

impl RuptureEvaluator {
    /// Create an evaluator
    pub fn new(config: PlausibilityConfiguration) -> Self {
        Self {
            config,
            metrics: None,
            evaluated: AtomicU64::new(0),
            passed: AtomicU64::new(0),
        }
    }

    /// Record verdicts and latency into the given metrics
    pub fn with_metrics(mut self, metrics: Arc<PlausibilityMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The filter configuration
    pub fn config(&self) -> &PlausibilityConfiguration {
        &self.config
    }

    /// Ruptures evaluated so far (errors excluded)
    pub fn evaluated(&self) -> u64 {
        self.evaluated.load(Ordering::Relaxed)
    }

    /// Ruptures that passed every filter
    pub fn passed(&self) -> u64 {
        self.passed.load(Ordering::Relaxed)
    }

    fn run<F>(
        &self,
        rupture: &ClusterRupture,
        verbose: bool,
        mut on_verdict: F,
    ) -> Result<(PlausibilityResult, Option<String>)>
    where
        F: FnMut(&dyn PlausibilityFilter, PlausibilityResult),
    {
        let timer = Timer::start();
        let mut result = PlausibilityResult::Pass;
        let mut stopped_by = None;

        for filter in self.config.filters() {
            let verdict = filter.apply(rupture, verbose)?;
            on_verdict(filter.as_ref(), verdict);
            if let Some(metrics) = &self.metrics {
                metrics.record_filter(filter.short_name(), verdict);
            }
            if verbose {
                info!(filter = filter.short_name(), result = %verdict, "Filter verdict");
            }
            result &= verdict;
            if !result.can_continue() {
                debug!(filter = filter.short_name(), result = %result, "Evaluation stopped");
                stopped_by = Some(filter.short_name().to_string());
                break;
            }
        }

        self.evaluated.fetch_add(1, Ordering::Relaxed);
        if result.is_pass() {
            self.passed.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_evaluation(result, timer.stop());
        }
        Ok((result, stopped_by))
    }

    /// Evaluate every filter in order, stopping at the first non-continuable verdict
    pub fn evaluate(&self, rupture: &ClusterRupture, verbose: bool) -> Result<PlausibilityResult> {
        self.run(rupture, verbose, |_, _| {}).map(|(result, _)| result)
    }

    /// Evaluate and keep every filter verdict
    pub fn evaluate_detailed(&self, rupture: &ClusterRupture) -> Result<EvaluationReport> {
        let mut verdicts = Vec::with_capacity(self.config.len());
        let (result, stopped_by) = self.run(rupture, false, |filter, result| {
            verdicts.push(FilterVerdict {
                filter: filter.short_name().to_string(),
                result,
            })
        })?;
        Ok(EvaluationReport {
            result,
            verdicts,
            stopped_by,
        })
    }

    /// Evaluate candidates in parallel. Results are in input order.
    pub fn evaluate_batch(&self, ruptures: &[ClusterRupture]) -> Vec<Result<PlausibilityResult>> {
        let results: Vec<_> = ruptures
            .par_iter()
            .map(|rupture| self.evaluate(rupture, false))
            .collect();
        debug!(
            candidates = ruptures.len(),
            passed = results.iter().filter(|r| matches!(r, Ok(PlausibilityResult::Pass))).count(),
            "Batch evaluated"
        );
        results
    }

    /// Keep the candidates that pass, in input order.
    ///
    /// The first filter error (in input order) is returned instead.
    pub fn retain_plausible(&self, ruptures: Vec<ClusterRupture>) -> Result<Vec<ClusterRupture>> {
        let verdicts = self.evaluate_batch(&ruptures);
        let mut kept = Vec::new();
        for (rupture, verdict) in ruptures.into_iter().zip(verdicts) {
            if verdict?.is_pass() {
                kept.push(rupture);
            }
        }
        Ok(kept)
    }
}

impl std::fmt::Debug for RuptureEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuptureEvaluator")
            .field("config", &self.config)
            .field("evaluated", &self.evaluated())
            .field("passed", &self.passed())
            .finish()
    }
}
