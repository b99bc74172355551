//! Enumeration types for the Crowdwatch API.

use serde::{Deserialize, Serialize};

/// Urgency attached to a staffing recommendation.
///
/// Serialized as the lowercase wire strings `"low"`, `"medium"`, `"high"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Informational; no action needed soon.
    Low,
    /// Act within the current shift.
    Medium,
    /// Act immediately.
    High,
}

impl Priority {
    /// The wire representation of this priority.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl core::fmt::Display for Priority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
