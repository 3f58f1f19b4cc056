//! Core identifier types
//!
//! ## Table of Contents
//! - **SectionId**: Unique identifier for a fault subsection
//! - **ParentId**: Identifier of the parent fault section a cluster belongs to

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a fault subsection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(u32);

impl SectionId {
    /// Create a new SectionId from a u32
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SectionId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// Identifier of a parent fault section
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentId(u32);

impl ParentId {
    /// Create a new ParentId from a u32
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ParentId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_id_display() {
        let id = SectionId::new(42);
        assert_eq!(format!("{}", id), "42");
        assert_eq!(id.as_u32(), 42);
    }

    #[test]
    fn test_section_id_ordering() {
        let mut ids: Vec<SectionId> = vec![5u32, 1, 3].into_iter().map(SectionId::from).collect();
        ids.sort();
        assert_eq!(ids, vec![SectionId::new(1), SectionId::new(3), SectionId::new(5)]);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&SectionId::new(7)).unwrap();
        assert_eq!(json, "7");
        let parent: ParentId = serde_json::from_str("12").unwrap();
        assert_eq!(parent, ParentId::new(12));
    }
}
