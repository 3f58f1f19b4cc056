//! Error types for the plausibility engine
//!
//! ## Table of Contents
//! - **PlausibilityError**: Main error enum covering structural and configuration failures
//! - **Result**: Type alias for `Result<T, PlausibilityError>`
//!
//! Rule failures are not errors. A rupture that fails a filter is reported as
//! a [`PlausibilityResult`](crate::PlausibilityResult) value.

use thiserror::Error;

/// Result type alias for plausibility operations
pub type Result<T> = std::result::Result<T, PlausibilityError>;

/// Main error type for plausibility operations
#[derive(Error, Debug)]
pub enum PlausibilityError {
    /// Cluster could not be constructed (empty, duplicate subsections, bad endpoints)
    #[error("invalid cluster: {0}")]
    InvalidCluster(String),

    /// Jump endpoints or distance are malformed
    #[error("invalid jump: {0}")]
    InvalidJump(String),

    /// Rupture tree violates a structural invariant
    #[error("invalid rupture: {0}")]
    InvalidRupture(String),

    /// Filter does not support the requested operation
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Filter implementation failed while evaluating
    #[error("filter error: {0}")]
    Filter(String),

    /// Configuration error while building filters
    #[error("configuration error: {0}")]
    Config(String),

    /// Metrics collection or export failure
    #[error("metrics error: {0}")]
    Metrics(String),

    /// Generic IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlausibilityError {
    /// Create an invalid cluster error
    pub fn invalid_cluster(msg: impl Into<String>) -> Self {
        Self::InvalidCluster(msg.into())
    }

    /// Create an invalid jump error
    pub fn invalid_jump(msg: impl Into<String>) -> Self {
        Self::InvalidJump(msg.into())
    }

    /// Create an invalid rupture error
    pub fn invalid_rupture(msg: impl Into<String>) -> Self {
        Self::InvalidRupture(msg.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a filter error
    pub fn filter(msg: impl Into<String>) -> Self {
        Self::Filter(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a metrics error
    pub fn metrics(msg: impl Into<String>) -> Self {
        Self::Metrics(msg.into())
    }

    /// True for errors raised while validating a rupture, jump or cluster
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidCluster(_) | Self::InvalidJump(_) | Self::InvalidRupture(_)
        )
    }
}

impl From<prometheus::Error> for PlausibilityError {
    fn from(err: prometheus::Error) -> Self {
        Self::Metrics(err.to_string())
    }
}
