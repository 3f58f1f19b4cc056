//! Filter configuration
//!
//! ## Table of Contents
//! - **PlausibilityConfiguration**: Ordered, immutable filter list
//! - **PlausibilityConfigurationBuilder**: Builder for the built-in filters plus custom ones
//! - **PlausibilityConfig**: Serde model of a filter list (`{"filters": [{"type": ..}]}`)
//! - **FilterRegistry**: Filter type name to factory mapping

use super::filter::PlausibilityFilter;
use super::filters::{
    CumulativeJumpDistanceFilter, JumpDistanceFilter, JumpDistanceRule, MaxClustersFilter,
    MinSectsPerParentFilter, MinSectsPerParentRule, SplayCountFilter,
};
use super::PlausibilityResult;
use crate::error::{PlausibilityError, Result};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared, type-erased filter
pub type BoxedFilter = Arc<dyn PlausibilityFilter>;

/// Ordered list of filters applied to every candidate rupture.
///
/// Order only affects performance (cheap filters first). Filters never see
/// each other's verdicts.
#[derive(Clone)]
pub struct PlausibilityConfiguration {
    filters: Vec<BoxedFilter>,
}

impl PlausibilityConfiguration {
    /// Create a configuration from an ordered filter list
    pub fn new(filters: Vec<BoxedFilter>) -> Result<Self> {
        if filters.is_empty() {
            return Err(PlausibilityError::config(
                "plausibility configuration needs at least 1 filter",
            ));
        }
        info!(
            filters = ?filters.iter().map(|f| f.short_name()).collect::<Vec<_>>(),
            "Built plausibility configuration"
        );
        Ok(Self { filters })
    }

    /// Start a builder
    pub fn builder() -> PlausibilityConfigurationBuilder {
        PlausibilityConfigurationBuilder::new()
    }

    /// Build from a serde model using the given registry
    pub fn from_config(config: &PlausibilityConfig, registry: &FilterRegistry) -> Result<Self> {
        let filters = config
            .filters
            .iter()
            .map(|spec| {
                let params = serde_json::Value::Object(spec.params.clone());
                registry.create(&spec.kind, &params)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(filters)
    }

    /// Filters in evaluation order
    pub fn filters(&self) -> &[BoxedFilter] {
        &self.filters
    }

    /// Short names in evaluation order
    pub fn short_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.short_name()).collect()
    }

    /// Number of filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Always false for a built configuration
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for PlausibilityConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlausibilityConfiguration")
            .field("filters", &self.short_names())
            .finish()
    }
}

/// Builder for [`PlausibilityConfiguration`]
///
/// Invalid thresholds are reported by [`build`](Self::build).
#[derive(Default)]
pub struct PlausibilityConfigurationBuilder {
    filters: Vec<BoxedFilter>,
    error: Option<PlausibilityError>,
}

impl PlausibilityConfigurationBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, filter: Result<BoxedFilter>) -> Self {
        match filter {
            Ok(filter) => self.filters.push(filter),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
            }
        }
        self
    }

    /// Add a maximum jump distance filter (hard stop)
    pub fn jump_distance(self, max_distance: f64) -> Self {
        let filter = JumpDistanceRule::new(max_distance)
            .map(|rule| Arc::new(JumpDistanceFilter::new(rule)) as BoxedFilter);
        self.push(filter)
    }

    /// Add a minimum subsections per cluster filter
    pub fn min_sects_per_parent(self, min_sects: usize) -> Self {
        let filter = MinSectsPerParentFilter::new(MinSectsPerParentRule::new(min_sects));
        self.push(Ok(Arc::new(filter)))
    }

    /// Add a maximum cluster count filter
    pub fn max_clusters(self, max_clusters: usize) -> Self {
        self.push(Ok(Arc::new(MaxClustersFilter::new(max_clusters))))
    }

    /// Add a maximum splay count filter
    pub fn splay_count(self, max_splays: usize) -> Self {
        self.push(Ok(Arc::new(SplayCountFilter::new(max_splays))))
    }

    /// Add a cumulative jump distance filter
    pub fn cumulative_jump_distance(self, max_total: f64) -> Self {
        let filter =
            CumulativeJumpDistanceFilter::new(max_total).map(|f| Arc::new(f) as BoxedFilter);
        self.push(filter)
    }

    /// Add any filter
    pub fn add<F: PlausibilityFilter + 'static>(self, filter: F) -> Self {
        self.push(Ok(Arc::new(filter)))
    }

    /// Add an already shared filter
    pub fn add_shared(self, filter: BoxedFilter) -> Self {
        self.push(Ok(filter))
    }

    /// Build the configuration
    pub fn build(self) -> Result<PlausibilityConfiguration> {
        if let Some(e) = self.error {
            return Err(e);
        }
        PlausibilityConfiguration::new(self.filters)
    }
}

/// One filter entry of a serialized configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Registered filter type name
    #[serde(rename = "type")]
    pub kind: String,
    /// Remaining keys, passed to the filter factory
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl FilterSpec {
    /// Create an entry from a type name and a JSON object of parameters
    pub fn new(kind: impl Into<String>, params: serde_json::Value) -> Result<Self> {
        let params = match params {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                return Err(PlausibilityError::config(format!(
                    "filter parameters must be an object, got {}",
                    other
                )))
            }
        };
        Ok(Self {
            kind: kind.into(),
            params,
        })
    }
}

/// Serialized filter list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlausibilityConfig {
    /// Filters in evaluation order
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

impl PlausibilityConfig {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!(path = %path.display(), filters = config.filters.len(), "Loaded plausibility config");
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build filters with the built-in registry
    pub fn build(&self) -> Result<PlausibilityConfiguration> {
        self.build_with(&FilterRegistry::with_builtins())
    }

    /// Build filters with a caller-supplied registry
    pub fn build_with(&self, registry: &FilterRegistry) -> Result<PlausibilityConfiguration> {
        PlausibilityConfiguration::from_config(self, registry)
    }
}

/// Factory turning JSON parameters into a filter
pub type FilterFactory = Arc<dyn Fn(&serde_json::Value) -> Result<BoxedFilter> + Send + Sync>;

/// Maps filter type names to factories
pub struct FilterRegistry {
    factories: RwLock<HashMap<String, FilterFactory>>,
}

fn params<T: DeserializeOwned>(kind: &str, value: &serde_json::Value) -> Result<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| PlausibilityError::config(format!("bad parameters for {}: {}", kind, e)))
}

#[derive(Deserialize)]
struct JumpDistanceParams {
    max_distance: f64,
    #[serde(default)]
    failure: Option<PlausibilityResult>,
}

#[derive(Deserialize)]
struct CumulativeParams {
    max_total: f64,
}

impl FilterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with every built-in filter type
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register("jump_distance", |value| {
            let p: JumpDistanceParams = params("jump_distance", value)?;
            let mut rule = JumpDistanceRule::new(p.max_distance)?;
            if let Some(failure) = p.failure {
                rule = rule.with_failure(failure);
            }
            Ok(Arc::new(JumpDistanceFilter::new(rule)) as BoxedFilter)
        });
        registry.register("min_sects_per_parent", |value| {
            let rule: MinSectsPerParentRule = params("min_sects_per_parent", value)?;
            Ok(Arc::new(MinSectsPerParentFilter::new(rule)) as BoxedFilter)
        });
        registry.register("max_clusters", |value| {
            let filter: MaxClustersFilter = params("max_clusters", value)?;
            Ok(Arc::new(filter) as BoxedFilter)
        });
        registry.register("splay_count", |value| {
            let filter: SplayCountFilter = params("splay_count", value)?;
            Ok(Arc::new(filter) as BoxedFilter)
        });
        registry.register("cumulative_jump_distance", |value| {
            let p: CumulativeParams = params("cumulative_jump_distance", value)?;
            Ok(Arc::new(CumulativeJumpDistanceFilter::new(p.max_total)?) as BoxedFilter)
        });
        registry
    }

    /// Register a factory. Returns true if it replaced an existing one.
    pub fn register<F>(&self, kind: impl Into<String>, factory: F) -> bool
    where
        F: Fn(&serde_json::Value) -> Result<BoxedFilter> + Send + Sync + 'static,
    {
        let kind = kind.into();
        let replaced = self
            .factories
            .write()
            .insert(kind.clone(), Arc::new(factory))
            .is_some();
        if replaced {
            warn!(kind = %kind, "Replaced registered filter factory");
        }
        replaced
    }

    /// Build a filter of the given type
    pub fn create(&self, kind: &str, params: &serde_json::Value) -> Result<BoxedFilter> {
        // clone the factory out so user code never runs under the lock
        let factory = self
            .factories
            .read()
            .get(kind)
            .cloned()
            .ok_or_else(|| PlausibilityError::config(format!("unknown filter type: {}", kind)))?;
        factory(params)
    }

    /// Check if a type is registered
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.read().contains_key(kind)
    }

    /// Registered type names, sorted
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.factories.read().keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
