//! Cluster ruptures
//!
//! A [`ClusterRupture`] is a recursive tree. Its primary strand is an ordered
//! list of clusters linked by internal jumps. Splays fork off a subsection of
//! the primary strand into a separately structured sub-rupture, which may
//! itself carry splays.
//!
//! ## Invariants
//! - `internal_jumps.len() == clusters.len() - 1`, each linking consecutive clusters
//! - splay jumps leave from a primary-strand cluster and land on the splay's first cluster
//! - no subsection (and so no cluster) appears twice anywhere in the tree
//!
//! Ruptures are immutable. Growing one with [`ClusterRupture::take`] returns a
//! new rupture.

use crate::cluster::FaultSubsectionCluster;
use crate::error::{PlausibilityError, Result};
use crate::jump::Jump;
use crate::types::SectionId;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

fn same_cluster(a: &Arc<FaultSubsectionCluster>, b: &Arc<FaultSubsectionCluster>) -> bool {
    Arc::ptr_eq(a, b) || **a == **b
}

/// Rupture built from connected subsection clusters, with optional splays
#[derive(Debug, Clone)]
pub struct ClusterRupture {
    clusters: Vec<Arc<FaultSubsectionCluster>>,
    internal_jumps: Vec<Jump>,
    splays: Vec<(Jump, ClusterRupture)>,
    sections: HashSet<SectionId>,
    internal_sections: HashSet<SectionId>,
    single_strand: bool,
}

impl ClusterRupture {
    /// Create a rupture from its primary strand and splays, validating the tree
    pub fn new(
        clusters: Vec<Arc<FaultSubsectionCluster>>,
        internal_jumps: Vec<Jump>,
        splays: Vec<(Jump, ClusterRupture)>,
    ) -> Result<Self> {
        if clusters.is_empty() {
            return Err(PlausibilityError::invalid_rupture(
                "rupture must contain at least 1 cluster",
            ));
        }
        let expected_jumps = clusters.len() - 1;
        if internal_jumps.len() != expected_jumps {
            return Err(PlausibilityError::invalid_rupture(format!(
                "expected {} internal jumps but have {}",
                expected_jumps,
                internal_jumps.len()
            )));
        }

        let mut internal_sections = HashSet::new();
        for cluster in &clusters {
            for sect in cluster.subsections() {
                if !internal_sections.insert(*sect) {
                    return Err(PlausibilityError::invalid_rupture(format!(
                        "subsection {} appears more than once (cluster {})",
                        sect, cluster
                    )));
                }
            }
        }

        for (i, jump) in internal_jumps.iter().enumerate() {
            if !same_cluster(jump.from_cluster(), &clusters[i]) {
                return Err(PlausibilityError::invalid_rupture(format!(
                    "internal jump {} ({}) does not leave from cluster {}",
                    i, jump, clusters[i]
                )));
            }
            if !same_cluster(jump.to_cluster(), &clusters[i + 1]) {
                return Err(PlausibilityError::invalid_rupture(format!(
                    "internal jump {} ({}) does not land on cluster {}",
                    i,
                    jump,
                    clusters[i + 1]
                )));
            }
        }

        let mut sections = internal_sections.clone();
        let mut splay_jumps: HashSet<&Jump> = HashSet::with_capacity(splays.len());
        for (jump, splay) in &splays {
            if !splay_jumps.insert(jump) {
                return Err(PlausibilityError::invalid_rupture(format!(
                    "duplicate splay jump {}",
                    jump
                )));
            }
            if !internal_sections.contains(&jump.from_section())
                || !clusters.iter().any(|c| same_cluster(c, jump.from_cluster()))
            {
                return Err(PlausibilityError::invalid_rupture(format!(
                    "splay jump {} does not leave from the primary strand",
                    jump
                )));
            }
            if !same_cluster(jump.to_cluster(), &splay.clusters[0]) {
                return Err(PlausibilityError::invalid_rupture(format!(
                    "splay jump {} does not land on the splay's first cluster {}",
                    jump, splay.clusters[0]
                )));
            }
            for sect in &splay.sections {
                if !sections.insert(*sect) {
                    return Err(PlausibilityError::invalid_rupture(format!(
                        "subsection {} appears more than once (splay via {})",
                        sect, jump
                    )));
                }
            }
        }

        let single_strand = splays.is_empty()
            && internal_jumps.iter().all(|j| {
                j.from_section() == j.from_cluster().last()
                    && j.to_section() == j.to_cluster().first()
            });

        Ok(Self {
            clusters,
            internal_jumps,
            splays,
            sections,
            internal_sections,
            single_strand,
        })
    }

    /// Create a single-cluster rupture, the seed for growth via [`take`](Self::take)
    pub fn single(cluster: Arc<FaultSubsectionCluster>) -> Self {
        let sections: HashSet<SectionId> = cluster.subsections().iter().copied().collect();
        Self {
            clusters: vec![cluster],
            internal_jumps: Vec::new(),
            splays: Vec::new(),
            internal_sections: sections.clone(),
            sections,
            single_strand: true,
        }
    }

    /// Return a new rupture that has taken the given jump.
    ///
    /// A jump from an end section of the last primary cluster extends the
    /// strand. A jump from any other primary section starts a new splay. A
    /// jump from a section inside a splay grows that splay.
    pub fn take(&self, jump: &Jump) -> Result<Self> {
        if !self.contains(jump.from_section()) {
            return Err(PlausibilityError::invalid_rupture(format!(
                "cannot take jump {}: rupture does not contain the from section",
                jump
            )));
        }
        if jump.to_section() != jump.to_cluster().start_section() {
            return Err(PlausibilityError::invalid_rupture(format!(
                "cannot take jump {}: to section is not the start of cluster {}",
                jump,
                jump.to_cluster()
            )));
        }
        if let Some(dup) = jump
            .to_cluster()
            .subsections()
            .iter()
            .find(|s| self.contains(**s))
        {
            return Err(PlausibilityError::invalid_rupture(format!(
                "cannot take jump {}: rupture already contains subsection {}",
                jump, dup
            )));
        }

        if self.contains_internal(jump.from_section()) {
            let last = &self.clusters[self.clusters.len() - 1];
            if last.is_end_section(jump.from_section()) {
                if !same_cluster(last, jump.from_cluster()) {
                    return Err(PlausibilityError::invalid_rupture(format!(
                        "cannot take jump {}: from cluster does not match last cluster {}",
                        jump, last
                    )));
                }
                let mut clusters = self.clusters.clone();
                clusters.push(Arc::clone(jump.to_cluster()));
                let mut internal_jumps = self.internal_jumps.clone();
                internal_jumps.push(jump.clone());
                Self::new(clusters, internal_jumps, self.splays.clone())
            } else {
                let mut splays = self.splays.clone();
                splays.push((jump.clone(), Self::single(Arc::clone(jump.to_cluster()))));
                Self::new(self.clusters.clone(), self.internal_jumps.clone(), splays)
            }
        } else {
            let mut splays = Vec::with_capacity(self.splays.len());
            for (splay_jump, splay) in &self.splays {
                if splay.contains(jump.from_section()) {
                    splays.push((splay_jump.clone(), splay.take(jump)?));
                } else {
                    splays.push((splay_jump.clone(), splay.clone()));
                }
            }
            Self::new(self.clusters.clone(), self.internal_jumps.clone(), splays)
        }
    }

    /// Clusters of the primary strand, in propagation order
    pub fn clusters(&self) -> &[Arc<FaultSubsectionCluster>] {
        &self.clusters
    }

    /// Jumps internal to the primary strand, in order
    pub fn internal_jumps(&self) -> &[Jump] {
        &self.internal_jumps
    }

    /// Jumps of the primary strand only (splays are not descended into)
    pub fn jumps(&self) -> &[Jump] {
        &self.internal_jumps
    }

    /// Splay jumps and their sub-ruptures, in insertion order
    pub fn splays(&self) -> &[(Jump, ClusterRupture)] {
        &self.splays
    }

    /// Sub-rupture reached through the given splay jump
    pub fn splay(&self, jump: &Jump) -> Option<&ClusterRupture> {
        self.splays
            .iter()
            .find(|(j, _)| j == jump)
            .map(|(_, rupture)| rupture)
    }

    /// True if the rupture is one strand whose jumps all go from the last
    /// section of a cluster to the first section of the next
    pub fn is_single_strand(&self) -> bool {
        self.single_strand
    }

    /// Check if the primary strand contains the subsection
    pub fn contains_internal(&self, section: SectionId) -> bool {
        self.internal_sections.contains(&section)
    }

    /// Check if the rupture or any of its splays contains the subsection
    pub fn contains(&self, section: SectionId) -> bool {
        self.sections.contains(&section)
    }

    /// Total number of subsections across this rupture and its splays
    pub fn total_num_sects(&self) -> usize {
        self.sections.len()
    }

    /// Number of subsections on the primary strand
    pub fn num_internal_sects(&self) -> usize {
        self.internal_sections.len()
    }

    /// Total number of jumps, including splay attachments and jumps inside splays
    pub fn total_num_jumps(&self) -> usize {
        self.internal_jumps.len()
            + self.splays.len()
            + self
                .splays
                .iter()
                .map(|(_, s)| s.total_num_jumps())
                .sum::<usize>()
    }

    /// Total number of clusters across this rupture and its splays
    pub fn total_num_clusters(&self) -> usize {
        self.clusters.len()
            + self
                .splays
                .iter()
                .map(|(_, s)| s.total_num_clusters())
                .sum::<usize>()
    }

    /// Total number of splays, counting splays of splays
    pub fn total_num_splays(&self) -> usize {
        self.splays.len()
            + self
                .splays
                .iter()
                .map(|(_, s)| s.total_num_splays())
                .sum::<usize>()
    }

    /// Every jump in the tree: internal jumps, then splay attachments, then
    /// the jumps of each splay
    pub fn all_jumps(&self) -> Vec<&Jump> {
        let mut jumps: Vec<&Jump> = self.internal_jumps.iter().collect();
        jumps.extend(self.splays.iter().map(|(j, _)| j));
        for (_, splay) in &self.splays {
            jumps.extend(splay.all_jumps());
        }
        jumps
    }

    /// Every cluster in the tree, primary strand first
    pub fn all_clusters(&self) -> Vec<&Arc<FaultSubsectionCluster>> {
        let mut clusters: Vec<&Arc<FaultSubsectionCluster>> = self.clusters.iter().collect();
        for (_, splay) in &self.splays {
            clusters.extend(splay.all_clusters());
        }
        clusters
    }

    /// This rupture followed by every splay strand, depth first
    pub fn strands(&self) -> Vec<&ClusterRupture> {
        let mut strands = vec![self];
        for (_, splay) in &self.splays {
            strands.extend(splay.strands());
        }
        strands
    }

    /// Subsections in rupture order. A splay's subsections follow the
    /// cluster it branches from.
    pub fn ordered_sections(&self) -> Vec<SectionId> {
        let mut out = Vec::with_capacity(self.sections.len());
        for cluster in &self.clusters {
            out.extend_from_slice(cluster.subsections());
            for sect in cluster.subsections() {
                for (jump, splay) in &self.splays {
                    if jump.from_section() == *sect {
                        out.extend(splay.ordered_sections());
                    }
                }
            }
        }
        out
    }

    /// Same rupture propagating in the opposite direction. Only single-strand
    /// ruptures can be reversed.
    pub fn reversed(&self) -> Result<Self> {
        if !self.single_strand {
            return Err(PlausibilityError::invalid_rupture(
                "can only reverse single strand ruptures",
            ));
        }

        let clusters: Vec<Arc<FaultSubsectionCluster>> = self
            .clusters
            .iter()
            .rev()
            .map(|c| Arc::new(c.reversed()))
            .collect();

        let mut internal_jumps = Vec::with_capacity(self.internal_jumps.len());
        for (i, old) in self.internal_jumps.iter().rev().enumerate() {
            let from = &clusters[i];
            let to = &clusters[i + 1];
            internal_jumps.push(Jump::new(
                Arc::clone(from),
                from.last(),
                Arc::clone(to),
                to.start_section(),
                old.distance(),
            )?);
        }

        Self::new(clusters, internal_jumps, Vec::new())
    }

    /// Format with parent names when `verbose` is set
    pub fn describe(&self, verbose: bool) -> String {
        let mut out = String::new();
        for (i, cluster) in self.clusters.iter().enumerate() {
            let jump_to = if i == 0 {
                Some(cluster.start_section()).filter(|s| *s != cluster.first())
            } else {
                Some(self.internal_jumps[i - 1].to_section()).filter(|s| *s != cluster.first())
            };
            out.push_str(&cluster.describe(verbose, jump_to));
        }
        for (jump, splay) in &self.splays {
            out.push_str("\n\t--splay from [");
            out.push_str(&jump.from_cluster().parent_id().to_string());
            if verbose {
                if let Some(name) = jump.from_cluster().parent_name() {
                    out.push_str(". ");
                    out.push_str(name);
                }
            }
            out.push(':');
            out.push_str(&jump.from_section().to_string());
            out.push_str("]: ");
            out.push_str(&splay.describe(verbose));
        }
        out
    }
}

impl fmt::Display for ClusterRupture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(false))
    }
}
