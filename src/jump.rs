//! Jumps between clusters
//!
//! A jump is the directed link across which a rupture propagates from a
//! subsection already in the rupture onto a subsection of a new cluster.
//! Distances are computed by the geometry layer and only carried here.

use crate::cluster::FaultSubsectionCluster;
use crate::error::{PlausibilityError, Result};
use crate::types::SectionId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Directed connection from one cluster to another
#[derive(Debug, Clone)]
pub struct Jump {
    from_cluster: Arc<FaultSubsectionCluster>,
    from_section: SectionId,
    to_cluster: Arc<FaultSubsectionCluster>,
    to_section: SectionId,
    distance: f64,
}

impl Jump {
    /// Create a jump between two cluster endpoints with a precomputed distance (km)
    pub fn new(
        from_cluster: Arc<FaultSubsectionCluster>,
        from_section: impl Into<SectionId>,
        to_cluster: Arc<FaultSubsectionCluster>,
        to_section: impl Into<SectionId>,
        distance: f64,
    ) -> Result<Self> {
        let from_section = from_section.into();
        let to_section = to_section.into();

        if !from_cluster.contains(from_section) {
            return Err(PlausibilityError::invalid_jump(format!(
                "from section {} is not part of cluster {}",
                from_section, from_cluster
            )));
        }
        if !to_cluster.contains(to_section) {
            return Err(PlausibilityError::invalid_jump(format!(
                "to section {} is not part of cluster {}",
                to_section, to_cluster
            )));
        }
        if !distance.is_finite() || distance < 0.0 {
            return Err(PlausibilityError::invalid_jump(format!(
                "distance must be finite and non-negative, got {}",
                distance
            )));
        }

        Ok(Self {
            from_cluster,
            from_section,
            to_cluster,
            to_section,
            // fold -0.0 into 0.0 so equality and hashing agree
            distance: if distance == 0.0 { 0.0 } else { distance },
        })
    }

    /// Cluster the rupture propagates from
    pub fn from_cluster(&self) -> &Arc<FaultSubsectionCluster> {
        &self.from_cluster
    }

    /// Subsection the rupture propagates from
    pub fn from_section(&self) -> SectionId {
        self.from_section
    }

    /// Cluster the rupture propagates onto
    pub fn to_cluster(&self) -> &Arc<FaultSubsectionCluster> {
        &self.to_cluster
    }

    /// Subsection the rupture propagates onto
    pub fn to_section(&self) -> SectionId {
        self.to_section
    }

    /// Separation distance in km (0 for a direct-contact junction)
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Same connection taken in the opposite direction
    pub fn reverse(&self) -> Self {
        Self {
            from_cluster: Arc::clone(&self.to_cluster),
            from_section: self.to_section,
            to_cluster: Arc::clone(&self.from_cluster),
            to_section: self.from_section,
            distance: self.distance,
        }
    }
}

impl PartialEq for Jump {
    fn eq(&self, other: &Self) -> bool {
        self.from_section == other.from_section
            && self.to_section == other.to_section
            && self.distance.to_bits() == other.distance.to_bits()
            && (Arc::ptr_eq(&self.from_cluster, &other.from_cluster)
                || self.from_cluster == other.from_cluster)
            && (Arc::ptr_eq(&self.to_cluster, &other.to_cluster)
                || self.to_cluster == other.to_cluster)
    }
}

impl Eq for Jump {}

impl Hash for Jump {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from_cluster.parent_id().hash(state);
        self.from_section.hash(state);
        self.to_cluster.parent_id().hash(state);
        self.to_section.hash(state);
        self.distance.to_bits().hash(state);
    }
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}]=>[{}:{}], {:.1} km",
            self.from_cluster.parent_id(),
            self.from_section,
            self.to_cluster.parent_id(),
            self.to_section,
            self.distance
        )
    }
}
