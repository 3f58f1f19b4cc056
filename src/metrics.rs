//! Metrics for plausibility evaluation
//!
//! ## Table of Contents
//! - **PlausibilityMetrics**: Prometheus counters and histograms for evaluation
//! - **Timer**: Wall-clock timer for evaluation latency

use crate::error::{PlausibilityError, Result};
use crate::plausibility::PlausibilityResult;
use prometheus::{CounterVec, Histogram, HistogramOpts, Opts, Registry};
use std::time::{Duration, Instant};

/// Core metrics for rupture evaluation
pub struct PlausibilityMetrics {
    registry: Registry,

    /// Ruptures evaluated, by final verdict
    pub ruptures_evaluated: CounterVec,
    /// Verdicts returned by individual filters
    pub filter_verdicts: CounterVec,
    /// Time spent evaluating one rupture
    pub evaluation_duration: Histogram,
}

impl PlausibilityMetrics {
    /// Create a new metrics instance with its own registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let ruptures_evaluated = CounterVec::new(
            Opts::new(
                "plausibility_ruptures_evaluated_total",
                "Total ruptures evaluated",
            ),
            &["result"],
        )?;
        let filter_verdicts = CounterVec::new(
            Opts::new(
                "plausibility_filter_verdicts_total",
                "Verdicts returned by each filter",
            ),
            &["filter", "result"],
        )?;
        let evaluation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "plausibility_evaluation_duration_seconds",
                "Rupture evaluation duration",
            )
            .buckets(vec![1e-6, 1e-5, 1e-4, 0.001, 0.01, 0.1, 1.0]),
        )?;

        registry.register(Box::new(ruptures_evaluated.clone()))?;
        registry.register(Box::new(filter_verdicts.clone()))?;
        registry.register(Box::new(evaluation_duration.clone()))?;

        Ok(Self {
            registry,
            ruptures_evaluated,
            filter_verdicts,
            evaluation_duration,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record the final verdict for a rupture
    pub fn record_evaluation(&self, result: PlausibilityResult, duration_secs: f64) {
        self.ruptures_evaluated
            .with_label_values(&[result.as_str()])
            .inc();
        self.evaluation_duration.observe(duration_secs);
    }

    /// Record one filter's verdict
    pub fn record_filter(&self, filter: &str, result: PlausibilityResult) {
        self.filter_verdicts
            .with_label_values(&[filter, result.as_str()])
            .inc();
    }

    /// Render every registered metric in the Prometheus text exposition format
    pub fn gather_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let families = self.registry.gather();
        let mut text = Vec::with_capacity(1024);
        prometheus::TextEncoder::new()
            .encode(&families, &mut text)
            .map_err(|e| {
                PlausibilityError::metrics(format!("failed to encode plausibility metrics: {}", e))
            })?;
        String::from_utf8(text).map_err(|e| {
            PlausibilityError::metrics(format!("plausibility metrics are not valid UTF-8: {}", e))
        })
    }
}

impl std::fmt::Debug for PlausibilityMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlausibilityMetrics").finish_non_exhaustive()
    }
}

/// Wall-clock timer for one rupture evaluation.
///
/// Feeds `plausibility_evaluation_duration_seconds`.
#[derive(Debug, Clone, Copy)]
pub struct Timer(Instant);

impl Timer {
    /// Start timing now
    pub fn start() -> Self {
        Self(Instant::now())
    }

    /// Time since [`start`](Self::start)
    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }

    /// Finish and return the elapsed time in seconds, the unit the histogram uses
    pub fn stop(self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}
