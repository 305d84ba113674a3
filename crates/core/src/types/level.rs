//! Levels of the Country → State → City hierarchy.

use serde::{Deserialize, Serialize};

/// Which level of the catalog hierarchy an operation targets.
///
/// Used to pick the right user-facing message when a constraint fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    Country,
    State,
    City,
}

impl HierarchyLevel {
    /// The level directly above this one, if any.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Country => None,
            Self::State => Some(Self::Country),
            Self::City => Some(Self::State),
        }
    }
}

impl std::fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Country => write!(f, "country"),
            Self::State => write!(f, "state"),
            Self::City => write!(f, "city"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_levels() {
        assert_eq!(HierarchyLevel::Country.parent(), None);
        assert_eq!(
            HierarchyLevel::State.parent(),
            Some(HierarchyLevel::Country)
        );
        assert_eq!(HierarchyLevel::City.parent(), Some(HierarchyLevel::State));
    }
}
