//! Fault subsection clusters
//!
//! A cluster is a contiguous, ordered run of subsections on one parent fault
//! section. Clusters are immutable once built and are shared read-only (via
//! `Arc`) by every jump and rupture that references them.

use crate::error::{PlausibilityError, Result};
use crate::types::{ParentId, SectionId};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Ordered, immutable run of subsections forming one rupture strand
#[derive(Debug, Clone)]
pub struct FaultSubsectionCluster {
    parent_id: ParentId,
    parent_name: Option<String>,
    subsections: Vec<SectionId>,
    start_section: SectionId,
    end_sections: Vec<SectionId>,
}

impl FaultSubsectionCluster {
    /// Create a simple unilateral cluster that starts at the first subsection
    /// and can only be extended from the last one
    pub fn new<I, S>(parent_id: impl Into<ParentId>, subsections: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SectionId>,
    {
        let subsections: Vec<SectionId> = subsections.into_iter().map(Into::into).collect();
        let (start, end) = match (subsections.first(), subsections.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(PlausibilityError::invalid_cluster(
                    "must supply at least 1 subsection",
                ))
            }
        };
        Self::with_endpoints(parent_id, subsections, start, vec![end])
    }

    /// Create a cluster with an explicit entry point and set of exit points
    pub fn with_endpoints(
        parent_id: impl Into<ParentId>,
        subsections: Vec<SectionId>,
        start_section: SectionId,
        end_sections: Vec<SectionId>,
    ) -> Result<Self> {
        let parent_id = parent_id.into();
        if subsections.is_empty() {
            return Err(PlausibilityError::invalid_cluster(
                "must supply at least 1 subsection",
            ));
        }

        let mut seen = HashSet::with_capacity(subsections.len());
        for sect in &subsections {
            if !seen.insert(*sect) {
                return Err(PlausibilityError::invalid_cluster(format!(
                    "duplicate subsection {} in cluster on parent {}",
                    sect, parent_id
                )));
            }
        }

        if !seen.contains(&start_section) {
            return Err(PlausibilityError::invalid_cluster(format!(
                "start section {} is not part of cluster on parent {}",
                start_section, parent_id
            )));
        }
        if end_sections.is_empty() {
            return Err(PlausibilityError::invalid_cluster(format!(
                "cluster on parent {} has no end sections",
                parent_id
            )));
        }
        if let Some(bad) = end_sections.iter().find(|s| !seen.contains(s)) {
            return Err(PlausibilityError::invalid_cluster(format!(
                "end section {} is not part of cluster on parent {}",
                bad, parent_id
            )));
        }

        Ok(Self {
            parent_id,
            parent_name: None,
            subsections,
            start_section,
            end_sections,
        })
    }

    /// Attach the parent section name (used in verbose output)
    pub fn with_parent_name(mut self, name: impl Into<String>) -> Self {
        self.parent_name = Some(name.into());
        self
    }

    /// Parent fault section ID
    pub fn parent_id(&self) -> ParentId {
        self.parent_id
    }

    /// Parent fault section name, if known
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Subsections in along-strike order
    pub fn subsections(&self) -> &[SectionId] {
        &self.subsections
    }

    /// Entry point of this cluster
    pub fn start_section(&self) -> SectionId {
        self.start_section
    }

    /// Exit points from which a jump extends the strand rather than splaying
    pub fn end_sections(&self) -> &[SectionId] {
        &self.end_sections
    }

    /// Number of subsections
    pub fn len(&self) -> usize {
        self.subsections.len()
    }

    /// Always false: clusters hold at least one subsection
    pub fn is_empty(&self) -> bool {
        self.subsections.is_empty()
    }

    /// First subsection
    pub fn first(&self) -> SectionId {
        self.subsections[0]
    }

    /// Last subsection
    pub fn last(&self) -> SectionId {
        self.subsections[self.subsections.len() - 1]
    }

    /// Check if the subsection belongs to this cluster
    pub fn contains(&self, section: SectionId) -> bool {
        self.subsections.contains(&section)
    }

    /// Check if the subsection is one of this cluster's exit points
    pub fn is_end_section(&self, section: SectionId) -> bool {
        self.end_sections.contains(&section)
    }

    /// Cluster with the subsection order reversed, starting at the old last
    /// subsection and ending at the old first one
    pub fn reversed(&self) -> Self {
        let mut subsections = self.subsections.clone();
        subsections.reverse();
        let start_section = subsections[0];
        let end_sections = vec![subsections[subsections.len() - 1]];
        Self {
            parent_id: self.parent_id,
            parent_name: self.parent_name.clone(),
            subsections,
            start_section,
            end_sections,
        }
    }

    /// Format with the parent name and a `->` marker on the given entry section
    pub fn describe(&self, verbose: bool, jump_to: Option<SectionId>) -> String {
        let mut out = String::from("[");
        out.push_str(&self.parent_id.to_string());
        match (&self.parent_name, verbose) {
            (Some(name), true) if !name.trim().is_empty() => {
                out.push_str(". ");
                out.push_str(name);
                out.push_str(": ");
            }
            _ => out.push(':'),
        }
        for (i, sect) in self.subsections.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if Some(*sect) == jump_to {
                out.push_str("->");
            }
            out.push_str(&sect.to_string());
        }
        out.push(']');
        out
    }
}

impl PartialEq for FaultSubsectionCluster {
    fn eq(&self, other: &Self) -> bool {
        self.parent_id == other.parent_id
            && self.start_section == other.start_section
            && self.subsections == other.subsections
            && self.end_sections == other.end_sections
    }
}

impl Eq for FaultSubsectionCluster {}

impl Hash for FaultSubsectionCluster {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parent_id.hash(state);
        self.start_section.hash(state);
        self.subsections.hash(state);
    }
}

impl fmt::Display for FaultSubsectionCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let jump_to = if self.start_section != self.first() {
            Some(self.start_section)
        } else {
            None
        };
        f.write_str(&self.describe(false, jump_to))
    }
}
